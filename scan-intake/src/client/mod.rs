//! Intake service abstraction.
//!
//! Trait-based interface over the scan intake service:
//! - HTTP client for the real service (`POST /v1/scan`, `GET /ping`)
//! - Mock service for testing

pub mod http;
pub mod mock;
pub mod traits;

pub use http::{HttpIntakeClient, IntakeConfig};
pub use mock::{MockIntake, MockReply};
pub use traits::{IntakeService, ScanRequest};
