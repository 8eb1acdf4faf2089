//! Parsed CSV documents
//!
//! A `CsvDocument` holds the header and the well-formed rows of a delimited
//! text blob. Documents are never edited in place; cleaning builds a new one.

use csv::{ReaderBuilder, WriterBuilder};

/// A header-driven CSV document
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CsvDocument {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl CsvDocument {
    /// Builds a document from a header and rows aligned to it
    ///
    /// Rows whose length differs from the header are discarded.
    pub fn new(header: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = header.len();
        let rows = rows.into_iter().filter(|r| r.len() == width).collect();
        Self { header, rows }
    }

    /// Parses delimited text using the first record as the header
    ///
    /// Records that fail to decode, or whose field count differs from the
    /// header, are dropped without failing the document. Blank lines are
    /// skipped. Only an unreadable header is an error.
    pub fn parse(raw: &str) -> Result<Self, csv::Error> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(raw.as_bytes());

        let header: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

        let mut rows = Vec::new();
        let mut dropped = 0usize;
        for result in reader.records() {
            match result {
                Ok(record) if record.len() == header.len() => {
                    rows.push(record.iter().map(|v| v.to_string()).collect());
                }
                Ok(record) => {
                    tracing::trace!(
                        "Dropping row with {} fields (header has {})",
                        record.len(),
                        header.len()
                    );
                    dropped += 1;
                }
                Err(e) => {
                    tracing::trace!("Dropping unreadable row: {}", e);
                    dropped += 1;
                }
            }
        }

        if dropped > 0 {
            tracing::debug!("Dropped {} malformed rows", dropped);
        }

        Ok(Self { header, rows })
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Looks up a value by row index and column name
    pub fn value(&self, row: usize, column: &str) -> Option<&str> {
        let index = self.header.iter().position(|h| h == column)?;
        self.rows.get(row).map(|r| r[index].as_str())
    }

    /// Serializes the document with its header as the first record
    pub fn to_csv_string(&self) -> Result<String, csv::Error> {
        let mut writer = WriterBuilder::new().from_writer(Vec::new());
        writer.write_record(&self.header)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| csv::Error::from(e.into_error()))?;
        // Every field came from a String, so the output is valid UTF-8
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
