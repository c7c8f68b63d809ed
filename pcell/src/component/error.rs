//! Error types for creating components.

use thiserror::Error;

use super::View;

/// An error for the component API.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("unsupported view: {0:?}")]
    ViewUnsupported(View),

    /// A parameter was outside of its legal range.
    #[error("invalid params: {0}")]
    InvalidParams(String),
}

impl Error {
    /// Creates an [`Error::InvalidParams`] naming the offending parameter and its value.
    pub fn invalid_param(name: &str, value: impl std::fmt::Display, reason: &str) -> Self {
        Self::InvalidParams(format!("`{name}` = {value} {reason}"))
    }
}

/// A result for the component API.
pub type Result<T> = std::result::Result<T, Error>;
