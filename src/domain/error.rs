//! Domain error types.

/// Top-level error type for trendlens.
#[derive(Debug, thiserror::Error)]
pub enum TrendError {
    #[error("invalid window {window}: need at least 2 bars")]
    InvalidWindow { window: usize },

    #[error("insufficient data: have {bars} bars, need {required}")]
    InsufficientData { bars: usize, required: usize },

    #[error("series is not strictly increasing by timestamp at index {index}")]
    UnorderedSeries { index: usize },

    #[error("no data for {ticker}")]
    NoData { ticker: String },

    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("data fetch error from {source_name}: {reason}")]
    DataFetch { source_name: String, reason: String },

    #[error("screener error: {reason}")]
    Screener {
        status: Option<u16>,
        reason: String,
    },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TrendError {
    pub fn fetch(source_name: &str, reason: impl Into<String>) -> Self {
        TrendError::DataFetch {
            source_name: source_name.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&TrendError> for std::process::ExitCode {
    fn from(err: &TrendError) -> Self {
        let code: u8 = match err {
            TrendError::Io(_) | TrendError::Report { .. } => 1,
            TrendError::ConfigParse { .. }
            | TrendError::ConfigMissing { .. }
            | TrendError::ConfigInvalid { .. } => 2,
            TrendError::DataFetch { .. } | TrendError::Screener { .. } => 3,
            TrendError::InvalidWindow { .. }
            | TrendError::InvalidInput { .. }
            | TrendError::UnorderedSeries { .. } => 4,
            TrendError::NoData { .. } | TrendError::InsufficientData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
