//! Error types for the session crate

use thiserror::Error;

/// Identity provider errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The provider's event channel could not be reached
    #[error("Identity provider unreachable: {0}")]
    Unreachable(String),

    /// The provider only supports a single subscriber
    #[error("Identity provider already has a subscriber")]
    AlreadySubscribed,

    /// Interactive sign-in did not complete
    #[error("Sign-in failed: {0}")]
    SignInFailed(String),

    /// Sign-out could not be delivered
    #[error("Sign-out failed: {0}")]
    SignOutFailed(String),
}

/// Session store lifecycle errors
#[derive(Debug, Error)]
pub enum SessionError {
    /// `start()` was called on a store that already has a running pump
    #[error("Session store already started - call shutdown() first")]
    AlreadyStarted,

    /// Provider error surfaced to the caller
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}
