use std::num::ParseIntError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BlackDuckError {
    #[error("Property {property} holds a non-integer value '{value}': {source}")]
    Parse {
        property: String,
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("Date '{value}' does not match the pattern '{pattern}': {source}")]
    DateFormat {
        value: String,
        pattern: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("Invalid date time pattern: {0}")]
    InvalidDatePattern(String),

    #[error("Invalid time zone '{zone}': {message}")]
    InvalidTimeZone { zone: String, message: String },

    #[error("Invalid repository path: '{0}'")]
    InvalidRepoPath(String),

    #[error("Unknown property: {0}")]
    UnknownProperty(String),

    #[error("Unknown inspection status: '{0}'")]
    InvalidInspectionStatus(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Artifactory responded with HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] confique::Error),

    #[error("Logging error: {0}")]
    Logging(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Api Error: {0}")]
    Api(String),
}

pub type Result<T> = std::result::Result<T, BlackDuckError>;
