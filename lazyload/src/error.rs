use alloc::string::String;

use thiserror::Error;

/// An operation was invoked on a controller in a phase that forbids it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("controller has been destroyed")]
    Destroyed,
}

/// A failed load, reported through the `on_error` callback.
///
/// The `Display` output is the user-facing message.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LoadError {
    /// The loader's completion reported a failure.
    #[error("{0}")]
    Failed(String),
    /// The loader refused the request before issuing it.
    #[error("{0}")]
    Rejected(String),
    /// The loader dropped its [`crate::Completion`] without reporting.
    #[error("loader dropped its completion without reporting a result")]
    Abandoned,
    /// The loader panicked while being invoked.
    #[error("Loading error.")]
    Panicked,
}

impl LoadError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }
}

impl From<String> for LoadError {
    fn from(message: String) -> Self {
        Self::Failed(message)
    }
}

impl From<&str> for LoadError {
    fn from(message: &str) -> Self {
        Self::Failed(message.into())
    }
}
