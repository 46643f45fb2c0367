/*!
 * Error types for the chapterwai application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// A required credential or endpoint is missing; raised before any request is sent
    #[error("Configuration error for {provider}: {message}")]
    Configuration {
        /// Provider that could not be used
        provider: String,
        /// What is missing
        message: String,
    },

    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),
}

impl ProviderError {
    /// Build a configuration error for a named provider.
    pub fn configuration(provider: &str, message: impl Into<String>) -> Self {
        Self::Configuration {
            provider: provider.to_string(),
            message: message.into(),
        }
    }

    /// Backend status code, when the backend reported one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::ApiError { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }

    /// Map a reqwest transport error onto the closest provider error.
    pub fn from_transport(error: reqwest::Error) -> Self {
        if error.is_connect() || error.is_timeout() {
            Self::ConnectionError(error.to_string())
        } else {
            Self::RequestFailed(error.to_string())
        }
    }
}

/// Errors raised while building or loading a glossary
#[derive(Error, Debug, PartialEq, Eq)]
pub enum GlossaryError {
    /// Source term is empty or whitespace
    #[error("Glossary source term must not be empty")]
    EmptySourceTerm,

    /// Target term is empty or whitespace
    #[error("Glossary target term for '{term}' must not be empty")]
    EmptyTargetTerm {
        /// Source term the empty target belongs to
        term: String,
    },

    /// A glossary file line could not be parsed
    #[error("Invalid glossary entry at line {line}: {content}")]
    InvalidLine {
        /// 1-based line number
        line: usize,
        /// Offending line
        content: String,
    },
}

/// Step of the two-pass pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    /// Context extraction request
    Analyze,
    /// Grounded translation request
    Translate,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Analyze => write!(f, "analyze"),
            Self::Translate => write!(f, "translate"),
        }
    }
}

/// Errors that can occur during translation
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// A pipeline request failed; the whole run is aborted
    #[error("Pipeline {stage} step failed: {source}")]
    Pipeline {
        /// Step that failed
        stage: PipelineStage,
        /// Underlying provider failure
        source: ProviderError,
    },
}
