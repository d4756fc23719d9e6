use thiserror::Error;

/// Failure to obtain the sheet export.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned status {status}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("fetch timed out after {0}s")]
    Timeout(u64),

    #[error("invalid source URL '{0}'")]
    InvalidUrl(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Batch-level shape problems. Row-level defects never surface here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("export contained no header line")]
    EmptyInput,

    #[error("no valid records after filtering {raw} rows")]
    NoValidRecords { raw: usize },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML deserialization failed: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid query deny pattern: {0}")]
    Pattern(#[from] regex::Error),
}
