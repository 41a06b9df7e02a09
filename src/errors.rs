//! # Error Types
//!
//! Error taxonomy for smoke-test steps using `thiserror`.

/// Custom result type for smoke-test operations
pub type Result<T> = std::result::Result<T, SmokeError>;

/// Errors raised while executing a smoke-test step
#[derive(thiserror::Error, Debug)]
pub enum SmokeError {
    /// Step 1 could not obtain a bearer token
    #[error("Authentication error: {message}")]
    Authentication { message: String, status: Option<u16> },

    /// The service answered, but not with the fields we expect
    #[error("Unexpected response from {path}: {message}")]
    UnexpectedResponse { path: String, message: String },

    /// Network failure reaching the service
    #[error("Connectivity error calling {path}: {source}")]
    Connectivity {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    /// Session token was assigned twice
    #[error("Session error: {0}")]
    Session(String),
}

impl SmokeError {
    /// Create a new authentication error
    pub fn authentication<S: Into<String>>(message: S, status: Option<u16>) -> Self {
        Self::Authentication { message: message.into(), status }
    }

    /// Create a new unexpected response error
    pub fn unexpected_response<P: Into<String>, S: Into<String>>(path: P, message: S) -> Self {
        Self::UnexpectedResponse { path: path.into(), message: message.into() }
    }

    /// Wrap a transport error with the path that was being called
    pub fn connectivity<P: Into<String>>(path: P, source: reqwest::Error) -> Self {
        Self::Connectivity { path: path.into(), source }
    }

    /// Short kind label used in reports and logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Authentication { .. } => "authentication",
            Self::UnexpectedResponse { .. } => "unexpected_response",
            Self::Connectivity { .. } => "connectivity",
            Self::Session(_) => "session",
        }
    }
}
