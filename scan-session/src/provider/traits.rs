//! Core trait for identity providers.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::ProviderError;
use crate::identity::Identity;

/// One push from the external identity channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityEvent {
    /// A user is signed in (initial state or a fresh sign-in)
    SignedIn(Identity),
    /// The provider confirmed there is no session (sign-out, expiry)
    SignedOut,
    /// The channel hit an error; the store treats this as "no session"
    Failed(String),
}

/// Receiving half of a provider subscription.
pub type IdentityEvents = mpsc::UnboundedReceiver<IdentityEvent>;

/// External authentication provider.
///
/// Implementations deliver the current state as their first event after
/// `subscribe()` and every change after that.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Provider identifier for logs (e.g. "mock", "static").
    fn id(&self) -> &str;

    /// Open the push channel of identity changes.
    async fn subscribe(&self) -> Result<IdentityEvents, ProviderError>;

    /// Run the provider's interactive sign-in.
    async fn sign_in(&self) -> Result<Identity, ProviderError>;

    /// End the current session.
    async fn sign_out(&self) -> Result<(), ProviderError>;
}
