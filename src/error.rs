// src/error.rs

//! Unified error handling for the snapshot pipeline.

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Number of characters of the offending text kept in a [`AppError::Decode`].
pub const DECODE_SAMPLE_CHARS: usize = 200;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Source page could not be fetched
    #[error("Failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Embedded array marker or bracket structure not found
    #[error("Embedded array \"{key}\" not found in page")]
    Extraction { key: String },

    /// Extracted text was not valid JSON after unescaping
    #[error("Embedded array is not valid JSON ({source}); sample: {sample}")]
    Decode {
        sample: String,
        #[source]
        source: serde_json::Error,
    },

    /// Short-link resolution gave up
    #[error("Failed to resolve {url} after {attempts} attempt(s): {message}")]
    Resolve {
        url: String,
        attempts: u32,
        message: String,
    },

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create a fetch error for the given URL.
    pub fn fetch(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Fetch {
            url: url.into(),
            source,
        }
    }

    /// Create an extraction error for the given array key.
    pub fn extraction(key: impl Into<String>) -> Self {
        Self::Extraction { key: key.into() }
    }

    /// Create a decode error, keeping a short prefix of `text` for diagnostics.
    pub fn decode(text: &str, source: serde_json::Error) -> Self {
        Self::Decode {
            sample: text.chars().take(DECODE_SAMPLE_CHARS).collect(),
            source,
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Whether this error aborts a pipeline run before anything is written.
    pub fn is_fatal_for_run(&self) -> bool {
        matches!(
            self,
            Self::Fetch { .. } | Self::Extraction { .. } | Self::Decode { .. }
        )
    }
}
