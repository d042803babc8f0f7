use serde::{Deserialize, Serialize};
use std::fmt;

/// Single structured error shape shared by the core, AI and CLI layers.
///
/// `code` is a stable machine-readable identifier (`EMBEDDING_FAILED`, `STORE_FAILED`,
/// `UNSUPPORTED_FORMAT`, `TIMEOUT`, ...). Callers branch on the code, never on the message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppError {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
    pub retryable: bool,
}

impl AppError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            retryable: false,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    pub fn is_timeout(&self) -> bool {
        self.code == "TIMEOUT"
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {}
