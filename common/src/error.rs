use thiserror::Error;

// Every variant renders as a single user-facing sentence.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Corpus error: {0}")]
    Corpus(String),
    #[error("Enter a search query.")]
    EmptyQuery,
    #[error("The corpus contains no documents.")]
    EmptyCorpus,
    #[error("No documents are selected.")]
    EmptySelection,
    #[error("None of the selected documents has a numeric id.")]
    NoValidIds,
    #[error("Search failed: {0}")]
    SearchService(String),
    #[error("Export failed: {0}")]
    Export(String),
    #[error("IoError: {0}")]
    Io(#[from] std::io::Error),
    #[error("Reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        Self::Corpus(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl AppError {
    /// True for the local search preconditions that never reach the network.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::EmptyQuery | Self::EmptyCorpus | Self::EmptySelection | Self::NoValidIds
        )
    }
}
