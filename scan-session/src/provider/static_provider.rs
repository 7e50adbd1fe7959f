//! Provider backed by a fixed identity from configuration.
//!
//! Used by command-line hosts that receive the signed-in user from a
//! config file or environment instead of an interactive flow.

use async_trait::async_trait;
use std::sync::{Mutex, PoisonError};
use tokio::sync::mpsc;
use tracing::debug;

use super::traits::*;
use crate::error::ProviderError;
use crate::identity::Identity;

/// Emits one event on subscribe: `SignedIn` for a configured identity,
/// `SignedOut` otherwise. The channel stays open until `sign_out()` or drop.
pub struct StaticProvider {
    identity: Option<Identity>,
    sender: Mutex<Option<mpsc::UnboundedSender<IdentityEvent>>>,
}

impl StaticProvider {
    /// Create a provider for the given (optional) identity.
    pub fn new(identity: Option<Identity>) -> Self {
        Self {
            identity,
            sender: Mutex::new(None),
        }
    }

    /// Provider with no signed-in user.
    pub fn signed_out() -> Self {
        Self::new(None)
    }

    fn push(&self, event: IdentityEvent) -> bool {
        let sender = self.sender.lock().unwrap_or_else(PoisonError::into_inner);
        sender.as_ref().map(|tx| tx.send(event).is_ok()).unwrap_or(false)
    }
}

#[async_trait]
impl IdentityProvider for StaticProvider {
    fn id(&self) -> &str {
        "static"
    }

    async fn subscribe(&self) -> Result<IdentityEvents, ProviderError> {
        let mut sender = self.sender.lock().unwrap_or_else(PoisonError::into_inner);
        if sender.is_some() {
            return Err(ProviderError::AlreadySubscribed);
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let initial = match &self.identity {
            Some(identity) => IdentityEvent::SignedIn(identity.clone()),
            None => IdentityEvent::SignedOut,
        };
        debug!(signed_in = self.identity.is_some(), "Static provider subscribed");

        tx.send(initial)
            .map_err(|e| ProviderError::Unreachable(e.to_string()))?;
        *sender = Some(tx);
        Ok(rx)
    }

    async fn sign_in(&self) -> Result<Identity, ProviderError> {
        let identity = self.identity.clone().ok_or_else(|| {
            ProviderError::SignInFailed("no identity configured".to_string())
        })?;
        self.push(IdentityEvent::SignedIn(identity.clone()));
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        self.push(IdentityEvent::SignedOut);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_configured_identity_signs_in() {
        let provider = StaticProvider::new(Some(Identity::new("u1").with_display_name("Ada")));
        let mut events = provider.subscribe().await.unwrap();

        match events.recv().await {
            Some(IdentityEvent::SignedIn(identity)) => assert_eq!(identity.uid, "u1"),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_identity_signs_out() {
        let provider = StaticProvider::signed_out();
        let mut events = provider.subscribe().await.unwrap();
        assert_eq!(events.recv().await, Some(IdentityEvent::SignedOut));
        assert!(provider.sign_in().await.is_err());
    }

    #[tokio::test]
    async fn test_sign_out_pushes_event() {
        let provider = StaticProvider::new(Some(Identity::new("u1")));
        let mut events = provider.subscribe().await.unwrap();
        let _ = events.recv().await;

        provider.sign_out().await.unwrap();
        assert_eq!(events.recv().await, Some(IdentityEvent::SignedOut));
        assert!(provider.subscribe().await.is_err());
    }
}
