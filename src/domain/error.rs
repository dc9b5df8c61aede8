//! Domain error types.

use crate::domain::date_key::DateKey;

/// Top-level error type for basketrader.
#[derive(Debug, thiserror::Error)]
pub enum TraderError {
    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },

    #[error("{date} is not a trading day")]
    InvalidDate { date: DateKey },

    #[error("invalid date range: {reason}")]
    InvalidRange { reason: String },

    #[error("insufficient history for {label}: need {days} trading days, found {available}")]
    InsufficientHistory {
        label: String,
        days: usize,
        available: usize,
    },

    #[error("no trading day for {symbol} within two weeks of {date}")]
    UnresolvedTradingDay { symbol: String, date: DateKey },

    #[error("{date} is outside the simulated window {start}..={end}")]
    OutOfRange {
        date: DateKey,
        start: DateKey,
        end: DateKey,
    },

    #[error("data source error: {reason}")]
    DataSource { reason: String },

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

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TraderError {
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        TraderError::InvalidArgument {
            reason: reason.into(),
        }
    }

    pub fn invalid_range(reason: impl Into<String>) -> Self {
        TraderError::InvalidRange {
            reason: reason.into(),
        }
    }
}

impl From<&TraderError> for std::process::ExitCode {
    fn from(err: &TraderError) -> Self {
        let code: u8 = match err {
            TraderError::Io(_) | TraderError::DataSource { .. } => 1,
            TraderError::ConfigParse { .. }
            | TraderError::ConfigMissing { .. }
            | TraderError::ConfigInvalid { .. } => 2,
            TraderError::InvalidArgument { .. } | TraderError::InvalidDate { .. } => 3,
            TraderError::InvalidRange { .. }
            | TraderError::InsufficientHistory { .. }
            | TraderError::OutOfRange { .. } => 4,
            TraderError::UnresolvedTradingDay { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
