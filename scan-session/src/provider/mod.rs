//! Identity provider abstraction layer.
//!
//! The store never polls: providers push `IdentityEvent`s into a channel
//! handed out once by `subscribe()`.
//! - Mock provider for tests and demos
//! - Static provider fed from configuration

pub mod mock;
pub mod static_provider;
pub mod traits;

pub use mock::MockProvider;
pub use static_provider::StaticProvider;
pub use traits::{IdentityEvent, IdentityEvents, IdentityProvider};
