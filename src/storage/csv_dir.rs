//! Directory of cleaned CSV documents

use crate::storage::traits::{StorageError, StorageResult};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Highest numeric suffix tried when a file name is taken
const MAX_NAME_SUFFIX: u32 = 9999;

/// Directory holding one cleaned CSV per document
#[derive(Debug, Clone)]
pub struct CsvDirectory {
    root: PathBuf,
}

impl CsvDirectory {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the directory if it does not exist yet
    pub fn ensure(&self) -> StorageResult<()> {
        if !self.root.exists() {
            tracing::info!("Creating directory: {}", self.root.display());
        }
        std::fs::create_dir_all(&self.root)?;
        Ok(())
    }

    /// Path a document named `file_name` is stored at
    pub fn path_for(&self, file_name: &str) -> StorageResult<PathBuf> {
        let name = Path::new(file_name);
        let is_plain = name.components().count() == 1
            && name.file_name().map(|n| n == name.as_os_str()).unwrap_or(false);
        if !is_plain {
            return Err(StorageError::InvalidPath(file_name.to_string()));
        }
        Ok(self.root.join(name))
    }

    /// Writes a complete document, replacing any previous file of that name
    ///
    /// Content goes to a sibling temporary file first and is renamed into place,
    /// so readers never observe a partially written CSV.
    pub fn write(&self, file_name: &str, content: &str) -> StorageResult<PathBuf> {
        let path = self.path_for(file_name)?;
        self.write_at(&path, file_name, content)?;
        Ok(path)
    }

    /// Writes a complete document under a name no existing file uses
    ///
    /// `data.csv` is tried first, then `data-1.csv`, `data-2.csv` and so on.
    pub fn write_new(&self, file_name: &str, content: &str) -> StorageResult<PathBuf> {
        let path = self.free_path(file_name)?;
        let chosen = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(file_name)
            .to_string();
        if chosen != file_name {
            tracing::info!("{} already exists, writing {} instead", file_name, chosen);
        }
        self.write_at(&path, &chosen, content)?;
        Ok(path)
    }

    fn free_path(&self, file_name: &str) -> StorageResult<PathBuf> {
        let path = self.path_for(file_name)?;
        if !path.exists() {
            return Ok(path);
        }

        let name = Path::new(file_name);
        let stem = name
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(file_name);
        let extension = name.extension().and_then(|e| e.to_str());

        for n in 1..=MAX_NAME_SUFFIX {
            let candidate = match extension {
                Some(ext) => format!("{}-{}.{}", stem, n, ext),
                None => format!("{}-{}", stem, n),
            };
            let path = self.path_for(&candidate)?;
            if !path.exists() {
                return Ok(path);
            }
        }

        Err(StorageError::InvalidPath(format!(
            "no free file name left for {}",
            file_name
        )))
    }

    fn write_at(&self, path: &Path, file_name: &str, content: &str) -> StorageResult<()> {
        let tmp_path = self.root.join(format!(".{}.partial", file_name));

        let written = std::fs::File::create(&tmp_path)
            .and_then(|mut file| {
                file.write_all(content.as_bytes())?;
                file.sync_all()
            })
            .and_then(|()| std::fs::rename(&tmp_path, path));

        if let Err(e) = written {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(e.into());
        }

        Ok(())
    }

    /// Lists stored documents with the given extension, sorted by path
    pub fn list(&self, extension: &str) -> StorageResult<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default();
            if !name.starts_with('.') && crate::url::has_extension(name, extension) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}
