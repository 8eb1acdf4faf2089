use serde::Deserialize;

/// Main configuration structure for CSV-Harvest
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub search: SearchConfig,
    pub fetch: FetchConfig,
    pub pipeline: PipelineConfig,
    pub storage: StorageConfig,
    pub formatter: FormatterConfig,
}

/// Search pagination configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SearchConfig {
    /// Search URL template; `{query}` is replaced by the encoded query
    pub endpoint: String,

    /// CSS selector of the link that leads to the next results page
    pub next_selector: String,

    /// Extension a candidate link must end with
    pub file_extension: String,

    /// Maximum number of new links collected per run
    pub max_links: usize,

    /// Maximum number of results pages read per run
    pub max_pages: u32,

    /// Delay observed after advancing to the next results page (milliseconds)
    pub settle_delay_ms: u64,

    /// Timeout for loading one results page (milliseconds)
    pub page_timeout_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://www.google.com/search?q={query}".to_string(),
            next_selector: "a#pnnext".to_string(),
            file_extension: ".csv".to_string(),
            max_links: 50,
            max_pages: 25,
            settle_delay_ms: 4000,
            page_timeout_ms: 10_000,
        }
    }
}

/// CSV download configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FetchConfig {
    /// Whole-request timeout for a single download (seconds)
    pub timeout_secs: u64,

    /// Connection timeout (seconds)
    pub connect_timeout_secs: u64,

    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            connect_timeout_secs: 10,
            user_agent: format!("csv-harvest/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Cleaning rules applied to every fetched document
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PipelineConfig {
    /// Case-insensitive substrings that select relevant columns
    pub column_keywords: Vec<String>,

    /// Substring marking a selected column as phone-bearing
    pub phone_keyword: String,

    /// Terms that exclude a whole document when found anywhere in its text
    pub forbidden_terms: Vec<String>,

    /// Minimum digit count for a phone value to be kept
    pub min_phone_digits: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            column_keywords: ["name", "phone", "zip", "contact", "email", "state"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            phone_keyword: "phone".to_string(),
            forbidden_terms: ["agent", "broker", "realtor"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            min_phone_digits: 10,
        }
    }
}

/// Filesystem locations
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct StorageConfig {
    /// Newline-delimited history of previously collected links
    pub links_file: String,

    /// Directory receiving one cleaned CSV per document
    pub csv_dir: String,

    /// Final aggregated output handed to the formatter
    pub output_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            links_file: "./links.txt".to_string(),
            csv_dir: "./csv_files".to_string(),
            output_path: "out.csv".to_string(),
        }
    }
}

/// External formatting collaborator
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FormatterConfig {
    /// Whether the collaborators are invoked at all
    pub enabled: bool,

    /// Interpreter or executable used to run the scripts
    pub program: String,

    /// Script aggregating the CSV directory into the output path
    pub format_script: Option<String>,

    /// Script run on each cleaned file after it is written
    pub split_script: Option<String>,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            program: "python3".to_string(),
            format_script: Some("utils/format.py".to_string()),
            split_script: None,
        }
    }
}
