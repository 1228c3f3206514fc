use thiserror::Error;

#[derive(Debug, Error)]
pub enum JailError {
    /// A failure or ignore pattern could not be compiled. Raised at
    /// registration time only, never while processing lines.
    #[error("invalid pattern `{pattern}`: {detail}")]
    Pattern { pattern: String, detail: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid IP address: {0}")]
    InvalidAddress(String),
}

pub type Result<T> = std::result::Result<T, JailError>;
