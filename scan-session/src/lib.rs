//! Scan Session - authenticated identity tracking
//!
//! Provides the session side of the plugin scanner client:
//! - An explicit, owned `SessionStore` observing the current identity
//! - A push-based `IdentityProvider` seam (mock and static built-ins)
//! - A three-way `ViewGate` deciding what a screen may render
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐  IdentityEvent   ┌──────────────────────┐
//! │ IdentityProvider │ ───────────────► │     SessionStore     │
//! │ (mock / static)  │   (mpsc push)    │  signal + listeners  │
//! └──────────────────┘                  └──────────┬───────────┘
//!                                                  │ SessionSignal
//!                                 ┌────────────────┼────────────────┐
//!                                 ▼                ▼                ▼
//!                           on_change()        watch()          ViewGate
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use scan_session::{SessionStore, SessionConfig, MockProvider, ViewGate};
//!
//! let provider = Arc::new(MockProvider::new());
//! let store = SessionStore::new(SessionConfig::default());
//! store.start(provider.clone()).await?;
//!
//! let signal = store.resolved().await;
//! match ViewGate::Protected.decide(&signal) { /* ... */ }
//! ```

pub mod error;
pub mod gate;
pub mod identity;
pub mod provider;
pub mod signal;
pub mod store;

pub use error::{ProviderError, SessionError};
pub use gate::{GateDecision, Route, ViewGate};
pub use identity::Identity;
pub use provider::{IdentityEvent, IdentityEvents, IdentityProvider, MockProvider, StaticProvider};
pub use signal::SessionSignal;
pub use store::{SessionConfig, SessionStore, Subscription};
