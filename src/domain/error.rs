//! Domain error types.

/// Top-level error type for coinwatch.
#[derive(Debug, thiserror::Error)]
pub enum CoinwatchError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("storage error: {reason}")]
    Storage { reason: String },

    #[error("unknown symbol: {symbol}")]
    UnknownSymbol { symbol: String },

    #[error("invalid alert: {reason}")]
    InvalidAlert { reason: String },

    #[error("quote source error: {reason}")]
    Quote { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&CoinwatchError> for std::process::ExitCode {
    fn from(err: &CoinwatchError) -> Self {
        let code: u8 = match err {
            CoinwatchError::Io(_) => 1,
            CoinwatchError::ConfigParse { .. } | CoinwatchError::ConfigInvalid { .. } => 2,
            CoinwatchError::Storage { .. } => 3,
            CoinwatchError::UnknownSymbol { .. } | CoinwatchError::InvalidAlert { .. } => 4,
            CoinwatchError::Quote { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
