//! Harvest coordinator - main run orchestration logic
//!
//! This module sequences one run:
//! - Loading the link history
//! - Collecting new links through the search crawler
//! - Fetching and cleaning each link, one at a time, in collection order
//! - Persisting the collected links
//! - Releasing the search session and invoking the formatter

use crate::config::{Config, PipelineConfig};
use crate::crawler::fetcher::{CsvFetcher, FetchResult};
use crate::crawler::search::SearchCrawler;
use crate::output::{Formatter, HarvestStatistics};
use crate::pipeline::{process_csv, PipelineOutcome, SkipReason};
use crate::provider::SearchProvider;
use crate::state::LinkCollection;
use crate::storage::{CsvDirectory, HistoryStore};
use crate::url::file_name_for;
use crate::{HarvestError, Result};
use std::path::{Path, PathBuf};

/// What happened to one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    /// A cleaned CSV was written
    Written {
        path: PathBuf,
        rows: usize,
        columns: Vec<String>,
    },

    /// Nothing was written
    Skipped(SkipReason),
}

/// Cleans documents and writes the survivors to the CSV directory
#[derive(Debug, Clone)]
pub struct DocumentSink {
    pipeline: PipelineConfig,
    csv_dir: CsvDirectory,
    formatter: Option<Formatter>,
    overwrite: bool,
}

impl DocumentSink {
    /// Creates a sink that never replaces a file already in the directory
    pub fn new(config: &Config) -> Self {
        Self {
            pipeline: config.pipeline.clone(),
            csv_dir: CsvDirectory::new(Path::new(&config.storage.csv_dir)),
            formatter: Formatter::from_config(&config.formatter),
            overwrite: false,
        }
    }

    /// Makes the sink replace files of the same name instead of renaming
    pub fn overwriting(mut self) -> Self {
        self.overwrite = true;
        self
    }

    pub fn csv_dir(&self) -> &CsvDirectory {
        &self.csv_dir
    }

    /// Runs the pipeline over `raw` and writes the result as `file_name`
    ///
    /// The file is either written completely or not at all. Unless the sink is
    /// overwriting, a taken name gets a numeric suffix. The split step, if
    /// configured, runs after a successful write; its failure is logged and
    /// does not undo the write.
    pub async fn store(&self, file_name: &str, raw: &str) -> LinkOutcome {
        let cleaned = match process_csv(raw, &self.pipeline) {
            PipelineOutcome::Cleaned(cleaned) => cleaned,
            PipelineOutcome::Skipped(reason) => return LinkOutcome::Skipped(reason),
        };

        let written = if self.overwrite {
            self.csv_dir.write(file_name, &cleaned.content)
        } else {
            self.csv_dir.write_new(file_name, &cleaned.content)
        };

        let path = match written {
            Ok(path) => path,
            Err(e) => return LinkOutcome::Skipped(SkipReason::WriteFailed(e.to_string())),
        };

        if let Some(formatter) = &self.formatter {
            if let Err(e) = formatter.split_file(&path).await {
                tracing::error!("Split step failed for {}: {}", path.display(), e);
            }
        }

        LinkOutcome::Written {
            path,
            rows: cleaned.rows,
            columns: cleaned.columns,
        }
    }

    /// Aggregates the CSV directory into `output_path`, logging any failure
    pub async fn format(&self, output_path: &Path) {
        let Some(formatter) = &self.formatter else {
            return;
        };

        if let Err(e) = formatter
            .format_directory(self.csv_dir.root(), output_path)
            .await
        {
            tracing::error!("Formatter failed: {}", e);
        }
    }
}

/// Logs an outcome and adds it to the statistics
fn record_outcome(stats: &mut HarvestStatistics, source: &str, outcome: &LinkOutcome) {
    match outcome {
        LinkOutcome::Written {
            path,
            rows,
            columns,
        } => {
            tracing::info!("Processed and saved cleaned CSV: {}", path.display());
            tracing::info!("Columns retained: {}", columns.join(", "));
            tracing::info!("Rows after cleaning: {}", rows);
            stats.record_written(*rows);
        }
        LinkOutcome::Skipped(reason) => {
            match reason {
                SkipReason::FetchFailed(_)
                | SkipReason::ParseFailed(_)
                | SkipReason::WriteFailed(_) => {
                    tracing::warn!("Skipping {}: {}", source, reason)
                }
                _ => tracing::info!("Skipping {}: {}", source, reason),
            }
            stats.record_skipped(reason);
        }
    }
}

/// Main harvest coordinator structure
pub struct Coordinator<P, H>
where
    P: SearchProvider,
    H: HistoryStore,
{
    config: Config,
    provider: P,
    history: H,
    crawler: SearchCrawler,
    fetcher: CsvFetcher,
    sink: DocumentSink,
    stats: HarvestStatistics,
}

impl<P, H> Coordinator<P, H>
where
    P: SearchProvider,
    H: HistoryStore,
{
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The run configuration
    /// * `provider` - The search session; released when `run` returns
    /// * `history` - Backing store for previously collected links
    /// * `fetcher` - Downloader for collected links
    pub fn new(config: Config, provider: P, history: H, fetcher: CsvFetcher) -> Self {
        let crawler = SearchCrawler::new(&config.search);
        let sink = DocumentSink::new(&config);

        Self {
            config,
            provider,
            history,
            crawler,
            fetcher,
            sink,
            stats: HarvestStatistics::new(),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn statistics(&self) -> &HarvestStatistics {
        &self.stats
    }

    /// Runs one harvest for `query`
    ///
    /// The search session is released on every exit path. The formatter only
    /// runs after a successful harvest, once every document has been written.
    pub async fn run(&mut self, query: &str) -> Result<HarvestStatistics> {
        tracing::info!("Starting CSV harvest for \"{}\"", query);

        let result = self.harvest(query).await;

        match self.provider.close().await {
            Ok(()) => tracing::info!("Search session released"),
            Err(e) => tracing::warn!("Failed to release search session: {}", e),
        }

        result?;

        self.sink
            .format(Path::new(&self.config.storage.output_path))
            .await;

        tracing::info!(
            "Harvest completed: {} links collected, {} documents written",
            self.stats.links_collected,
            self.stats.documents_written
        );

        Ok(self.stats.clone())
    }

    async fn harvest(&mut self, query: &str) -> Result<()> {
        let history = self.history.load()?;

        let links = match self.crawler.crawl(&mut self.provider, query, &history).await {
            Ok(report) => {
                self.stats.links_collected = report.links.len() as u64;
                self.stats.pages_visited = report.pages;
                self.stats.crawl_stop = Some(report.stop);
                report.links
            }
            Err(abort) => {
                tracing::error!("Search failed: {}", abort.error);
                self.stats.links_collected = abort.collected.len() as u64;
                if abort.collected.is_empty() {
                    return Err(abort.error);
                }

                if let Err(e) = self.history.persist(abort.collected.as_slice(), &history) {
                    tracing::error!("Failed to save collected links: {}", e);
                }
                for link in abort.collected.iter() {
                    tracing::warn!("Collected but not downloaded: {}", link);
                }
                return Err(HarvestError::SearchAborted {
                    undownloaded: abort.collected.into_vec(),
                    source: Box::new(abort.error),
                });
            }
        };

        let downloaded = self.download_all(&links).await;
        let persisted = self.history.persist(links.as_slice(), &history);

        downloaded?;
        persisted?;
        Ok(())
    }

    /// Fetches and stores every link, strictly in collection order
    async fn download_all(&mut self, links: &LinkCollection) -> Result<()> {
        self.sink.csv_dir().ensure()?;

        for link in links.iter() {
            let outcome = self.process_link(link).await;
            record_outcome(&mut self.stats, link, &outcome);
        }

        Ok(())
    }

    /// Fetches one link and runs it through the pipeline
    pub async fn process_link(&self, link: &str) -> LinkOutcome {
        tracing::info!("Processing CSV link: {}", link);

        let body = match self.fetcher.fetch(link).await {
            FetchResult::Success {
                final_url,
                content_type,
                body,
            } => {
                if final_url != link {
                    tracing::info!("{} redirected to {}", link, final_url);
                }
                if content_type.starts_with("text/html") {
                    tracing::warn!("{} was served as {}", link, content_type);
                }
                body
            }
            failed => {
                let reason = failed.failure_reason().unwrap_or_default();
                return LinkOutcome::Skipped(SkipReason::FetchFailed(reason));
            }
        };

        self.sink.store(&file_name_for(link), &body).await
    }
}

/// Re-runs the pipeline over every CSV already in the storage directory
///
/// Cleaned files are rewritten in place; skipped files are left untouched.
/// No search is performed.
pub async fn clean_directory(config: &Config) -> Result<HarvestStatistics> {
    let sink = DocumentSink::new(config).overwriting();
    let mut stats = HarvestStatistics::new();

    let files = sink.csv_dir().list(&config.search.file_extension)?;
    tracing::info!(
        "Re-cleaning {} files in {}",
        files.len(),
        sink.csv_dir().root().display()
    );

    for path in files {
        let source = path.display().to_string();
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };

        let outcome = match std::fs::read_to_string(&path) {
            Ok(raw) => sink.store(file_name, &raw).await,
            Err(e) => LinkOutcome::Skipped(SkipReason::ParseFailed(e.to_string())),
        };
        record_outcome(&mut stats, &source, &outcome);
    }

    sink.format(Path::new(&config.storage.output_path)).await;

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FormatterConfig, StorageConfig};
    use crate::provider::ResultsContext;
    use crate::storage::{open_history, FileHistoryStore};
    use async_trait::async_trait;
    use reqwest::Client;
    use tempfile::TempDir;
    use url::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Provider with a single results page that can be told to fail
    #[derive(Default)]
    struct OnePageProvider {
        links: Vec<String>,
        fail_submit: bool,
        fail_advance: bool,
        closed: bool,
    }

    #[async_trait]
    impl SearchProvider for OnePageProvider {
        async fn submit_query(&mut self, _query: &str) -> Result<ResultsContext> {
            if self.fail_submit {
                return Err(HarvestError::Provider("search unavailable".to_string()));
            }
            Ok(ResultsContext {
                url: Url::parse("https://search.example.com/?q=contacts").unwrap(),
                page_number: 1,
                body: String::new(),
            })
        }

        async fn extract_candidate_links(&mut self, _ctx: &ResultsContext) -> Result<Vec<String>> {
            Ok(self.links.clone())
        }

        async fn advance_page(&mut self, _ctx: &ResultsContext) -> Result<Option<ResultsContext>> {
            if self.fail_advance {
                return Err(HarvestError::Provider("HTTP 503".to_string()));
            }
            Ok(None)
        }

        async fn close(&mut self) -> Result<()> {
            self.closed = true;
            Ok(())
        }
    }

    fn coordinator(
        config: Config,
        provider: OnePageProvider,
    ) -> Coordinator<OnePageProvider, FileHistoryStore> {
        let history = open_history(Path::new(&config.storage.links_file));
        Coordinator::new(config, provider, history, CsvFetcher::new(Client::new()))
    }

    fn create_test_config(dir: &TempDir) -> Config {
        Config {
            storage: StorageConfig {
                links_file: dir.path().join("links.txt").to_string_lossy().into_owned(),
                csv_dir: dir.path().join("csv").to_string_lossy().into_owned(),
                output_path: dir.path().join("out.csv").to_string_lossy().into_owned(),
            },
            formatter: FormatterConfig {
                enabled: false,
                ..FormatterConfig::default()
            },
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn test_sink_writes_cleaned_document() {
        let dir = TempDir::new().unwrap();
        let sink = DocumentSink::new(&create_test_config(&dir));
        sink.csv_dir().ensure().unwrap();

        let outcome = sink
            .store("people.csv", "Name,Phone\nJane,(555) 123-4567\n")
            .await;

        let path = dir.path().join("csv").join("people.csv");
        assert_eq!(
            outcome,
            LinkOutcome::Written {
                path: path.clone(),
                rows: 1,
                columns: vec!["Name".to_string(), "Phone".to_string()],
            }
        );
        assert_eq!(
            std::fs::read_to_string(path).unwrap(),
            "Name,Phone\nJane,5551234567\n"
        );
    }

    #[tokio::test]
    async fn test_sink_writes_nothing_for_skipped_document() {
        let dir = TempDir::new().unwrap();
        let sink = DocumentSink::new(&create_test_config(&dir));
        sink.csv_dir().ensure().unwrap();

        let outcome = sink.store("people.csv", "Name,Email\nJane,j@example.com\n").await;

        assert_eq!(outcome, LinkOutcome::Skipped(SkipReason::NoPhoneColumn));
        assert!(!dir.path().join("csv").join("people.csv").exists());
    }

    #[tokio::test]
    async fn test_clean_directory_rewrites_in_place() {
        let dir = TempDir::new().unwrap();
        let config = create_test_config(&dir);
        let csv_dir = dir.path().join("csv");
        std::fs::create_dir_all(&csv_dir).unwrap();
        std::fs::write(
            csv_dir.join("a.csv"),
            "ID,Name,Phone\n1,Jane,555-123-4567\n2,Bob,12\n",
        )
        .unwrap();
        std::fs::write(csv_dir.join("b.csv"), "ID,Amount\n1,20\n").unwrap();

        let stats = clean_directory(&config).await.unwrap();

        assert_eq!(stats.documents_written, 1);
        assert_eq!(stats.skipped.get("no-relevant-columns"), Some(&1));
        assert_eq!(
            std::fs::read_to_string(csv_dir.join("a.csv")).unwrap(),
            "Name,Phone\nJane,5551234567\n"
        );
        assert_eq!(
            std::fs::read_to_string(csv_dir.join("b.csv")).unwrap(),
            "ID,Amount\n1,20\n"
        );
    }

    #[tokio::test]
    async fn test_run_closes_provider_on_search_failure() {
        let dir = TempDir::new().unwrap();
        let config = create_test_config(&dir);
        let provider = OnePageProvider {
            links: Vec::new(),
            fail_submit: true,
            ..OnePageProvider::default()
        };

        let mut coordinator = coordinator(config, provider);
        let result = coordinator.run("contacts").await;

        assert!(matches!(result, Err(HarvestError::Provider(_))));
        assert!(coordinator.provider().closed);
        assert!(!dir.path().join("links.txt").exists());
    }

    #[tokio::test]
    async fn test_run_with_no_results_persists_nothing_new() {
        let dir = TempDir::new().unwrap();
        let config = create_test_config(&dir);
        std::fs::write(dir.path().join("links.txt"), "https://data.example.gov/old.csv\n").unwrap();
        let provider = OnePageProvider {
            links: vec!["https://data.example.gov/old.csv".to_string()],
            ..OnePageProvider::default()
        };

        let mut coordinator = coordinator(config, provider);
        let stats = coordinator.run("contacts").await.unwrap();

        assert_eq!(stats.links_collected, 0);
        assert_eq!(stats.crawl_stop, Some(crate::state::CrawlStop::Exhausted));
        assert!(coordinator.provider().closed);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("links.txt")).unwrap(),
            "https://data.example.gov/old.csv\n"
        );
    }

    #[tokio::test]
    async fn test_unreachable_link_is_skipped_and_still_recorded() {
        let dir = TempDir::new().unwrap();
        let mut config = create_test_config(&dir);
        config.search.settle_delay_ms = 0;
        let provider = OnePageProvider {
            links: vec!["http://127.0.0.1:1/gone.csv".to_string()],
            ..OnePageProvider::default()
        };

        let mut coordinator = coordinator(config, provider);
        let stats = coordinator.run("contacts").await.unwrap();

        assert_eq!(stats.links_collected, 1);
        assert_eq!(stats.skipped.get("fetch-failed"), Some(&1));
        assert_eq!(
            std::fs::read_to_string(dir.path().join("links.txt")).unwrap(),
            "http://127.0.0.1:1/gone.csv\n"
        );
    }

    #[tokio::test]
    async fn test_same_file_name_keeps_both_documents() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/a/data.csv"))
            .respond_with(ResponseTemplate::new(200).set_body_string("Name,Phone\nAnn,5551110000\n"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/b/data.csv"))
            .respond_with(ResponseTemplate::new(200).set_body_string("Name,Phone\nBob,5552220000\n"))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let csv_dir = dir.path().join("csv");
        std::fs::create_dir_all(&csv_dir).unwrap();
        std::fs::write(csv_dir.join("data.csv"), "Name,Phone\nOld,5550000000\n").unwrap();

        let provider = OnePageProvider {
            links: vec![
                format!("{}/a/data.csv", server.uri()),
                format!("{}/b/data.csv", server.uri()),
            ],
            ..OnePageProvider::default()
        };

        let mut coordinator = coordinator(create_test_config(&dir), provider);
        let stats = coordinator.run("contacts").await.unwrap();

        assert_eq!(stats.documents_written, 2);
        assert_eq!(
            std::fs::read_to_string(csv_dir.join("data.csv")).unwrap(),
            "Name,Phone\nOld,5550000000\n"
        );
        assert_eq!(
            std::fs::read_to_string(csv_dir.join("data-1.csv")).unwrap(),
            "Name,Phone\nAnn,5551110000\n"
        );
        assert_eq!(
            std::fs::read_to_string(csv_dir.join("data-2.csv")).unwrap(),
            "Name,Phone\nBob,5552220000\n"
        );
    }

    #[tokio::test]
    async fn test_search_abort_reports_undownloaded_links() {
        let dir = TempDir::new().unwrap();
        let provider = OnePageProvider {
            links: vec!["https://data.example.gov/good.csv".to_string()],
            fail_advance: true,
            ..OnePageProvider::default()
        };

        let mut coordinator = coordinator(create_test_config(&dir), provider);
        let result = coordinator.run("contacts").await;

        match result {
            Err(HarvestError::SearchAborted {
                undownloaded,
                source,
            }) => {
                assert_eq!(undownloaded, vec!["https://data.example.gov/good.csv"]);
                assert!(matches!(*source, HarvestError::Provider(_)));
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(coordinator.provider().closed);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("links.txt")).unwrap(),
            "https://data.example.gov/good.csv\n"
        );
    }

    #[test]
    fn test_record_outcome_counts() {
        let mut stats = HarvestStatistics::new();
        record_outcome(
            &mut stats,
            "https://data.example.gov/a.csv",
            &LinkOutcome::Skipped(SkipReason::NoValidRows),
        );
        record_outcome(
            &mut stats,
            "https://data.example.gov/b.csv",
            &LinkOutcome::Written {
                path: PathBuf::from("b.csv"),
                rows: 4,
                columns: vec!["Phone".to_string()],
            },
        );

        assert_eq!(stats.documents_processed, 2);
        assert_eq!(stats.rows_written, 4);
    }
}
