//! Scan Intake - submission workflow for the plugin scanner
//!
//! Owns everything between "the user picked a target" and "the intake
//! service answered":
//! - Mutually exclusive targets (repository URL or `.zip` archive)
//! - Local validation that never touches the network
//! - The `Idle → Validating → InFlight → Succeeded | Failed` state machine
//! - A trait-based intake service with an HTTP client and a mock
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │         SubmissionController            │
//! │  draft target · state · generation      │
//! └────────────────┬────────────────────────┘
//!                  │ ScanRequest
//!      ┌───────────┴───────────┐
//!      ▼                       ▼
//! ┌──────────────────┐  ┌─────────────┐
//! │ HttpIntakeClient │  │ MockIntake  │
//! │ POST /v1/scan    │  │ (tests)     │
//! └──────────────────┘  └─────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use scan_intake::{HttpIntakeClient, IntakeConfig, SubmissionController, TargetKind, TargetValue};
//!
//! let client = Arc::new(HttpIntakeClient::new(IntakeConfig::default())?);
//! let controller = SubmissionController::new(client, ControllerConfig::default());
//!
//! controller.set_mode(TargetKind::Url)?;
//! controller.set_value(TargetValue::Text("https://github.com/user/repo.git".into()))?;
//! let state = controller.submit().await?;
//! ```

pub mod client;
pub mod controller;
pub mod error;
pub mod report;
pub mod state;
pub mod target;
pub mod validate;

pub use client::{HttpIntakeClient, IntakeConfig, IntakeService, MockIntake, MockReply, ScanRequest};
pub use controller::{ControllerConfig, SubmissionController};
pub use error::{SubmitError, ValidationError};
pub use report::{Finding, PingResponse, ScanReport};
pub use state::SubmissionState;
pub use target::{ArchivePayload, SubmissionTarget, TargetDraft, TargetKind, TargetValue};
pub use validate::ArchiveLimits;
