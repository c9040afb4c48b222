use crate::models::PollId;
use thiserror::Error;

// Local precondition failures, raised before any request is sent
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("the question must not be empty")]
    EmptyQuestion,
    #[error("a poll needs at least {min} options, got {found}")]
    TooFewOptions { min: usize, found: usize },
    #[error("a poll can have at most {max} options, got {found}")]
    TooManyOptions { max: usize, found: usize },
    #[error("duplicate option: {0}")]
    DuplicateOption(String),
    #[error("no option selected")]
    NoOptionSelected,
    #[error("option {index} is out of range for a poll with {len} options")]
    OptionOutOfRange { index: usize, len: usize },
}

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("poll {0} not found")]
    NotFound(PollId),
    #[error("server responded with {status}: {detail}")]
    Status { status: u16, detail: String },
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed response: {0}")]
    Decode(String),
}

// Push channel failures are logged, never shown to the user
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("failed to connect to {url}: {reason}")]
    Connect { url: String, reason: String },
    #[error("push transport error: {0}")]
    Transport(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} is not a valid URL: {source}")]
    InvalidUrl {
        key: &'static str,
        #[source]
        source: url::ParseError,
    },
    #[error("{key} must use one of {expected}, got {found}")]
    UnsupportedScheme {
        key: &'static str,
        expected: &'static str,
        found: String,
    },
    #[error("{key} must be a non-negative integer, got {value:?}")]
    InvalidNumber { key: &'static str, value: String },
}
