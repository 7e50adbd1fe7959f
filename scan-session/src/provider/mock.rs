//! Mock identity provider for testing.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Mutex, PoisonError};
use tokio::sync::mpsc;

use super::traits::*;
use crate::error::ProviderError;
use crate::identity::Identity;

/// Mock provider for testing.
///
/// Events are pushed by the test through `emit()`; events emitted before
/// the store subscribes are buffered and delivered in order.
pub struct MockProvider {
    provider_id: String,
    sender: Mutex<Option<mpsc::UnboundedSender<IdentityEvent>>>,
    receiver: Mutex<Option<IdentityEvents>>,
    account: Mutex<Option<Identity>>,
    reachable: AtomicBool,
    subscribe_count: AtomicU32,
}

impl MockProvider {
    /// Create a new mock provider.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            provider_id: "mock".to_string(),
            sender: Mutex::new(Some(tx)),
            receiver: Mutex::new(Some(rx)),
            account: Mutex::new(None),
            reachable: AtomicBool::new(true),
            subscribe_count: AtomicU32::new(0),
        }
    }

    /// Set the account returned by `sign_in()`.
    pub fn with_account(self, identity: Identity) -> Self {
        *self.account.lock().unwrap_or_else(PoisonError::into_inner) = Some(identity);
        self
    }

    /// Set reachability; an unreachable provider fails `subscribe()`.
    pub fn with_reachable(self, reachable: bool) -> Self {
        self.reachable.store(reachable, Ordering::SeqCst);
        self
    }

    /// Push an event to the subscriber. Returns false once the channel is closed.
    pub fn emit(&self, event: IdentityEvent) -> bool {
        let sender = self.sender.lock().unwrap_or_else(PoisonError::into_inner);
        match sender.as_ref() {
            Some(tx) => tx.send(event).is_ok(),
            None => false,
        }
    }

    /// Close the event channel, as if the provider went away.
    pub fn close(&self) {
        self.sender.lock().unwrap_or_else(PoisonError::into_inner).take();
    }

    /// Get the number of times subscribe was called.
    pub fn subscribe_count(&self) -> u32 {
        self.subscribe_count.load(Ordering::SeqCst)
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityProvider for MockProvider {
    fn id(&self) -> &str {
        &self.provider_id
    }

    async fn subscribe(&self) -> Result<IdentityEvents, ProviderError> {
        self.subscribe_count.fetch_add(1, Ordering::SeqCst);

        if !self.reachable.load(Ordering::SeqCst) {
            return Err(ProviderError::Unreachable("mock provider offline".to_string()));
        }

        self.receiver
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or(ProviderError::AlreadySubscribed)
    }

    async fn sign_in(&self) -> Result<Identity, ProviderError> {
        let account = self
            .account
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(|| ProviderError::SignInFailed("no account configured".to_string()))?;

        self.emit(IdentityEvent::SignedIn(account.clone()));
        Ok(account)
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        if !self.emit(IdentityEvent::SignedOut) {
            return Err(ProviderError::SignOutFailed("channel closed".to_string()));
        }
        Ok(())
    }
}
