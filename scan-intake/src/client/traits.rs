//! Core trait for intake services.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::SubmitError;
use crate::report::{PingResponse, ScanReport};
use crate::target::SubmissionTarget;

/// A validated scan request.
///
/// Only `target` goes into the request body. The id is sent as a request
/// header and the timestamp is kept for logging.
#[derive(Debug, Clone)]
pub struct ScanRequest {
    pub submission_id: Uuid,
    pub target: SubmissionTarget,
    pub requested_at: DateTime<Utc>,
}

impl ScanRequest {
    pub fn new(target: SubmissionTarget) -> Self {
        Self {
            submission_id: Uuid::new_v4(),
            target,
            requested_at: Utc::now(),
        }
    }
}

/// Remote service that accepts scan submissions.
#[async_trait]
pub trait IntakeService: Send + Sync {
    /// Service identifier for logs.
    fn id(&self) -> &str;

    /// Submit one target. Resolves once the service has answered.
    async fn submit(&self, request: ScanRequest) -> Result<ScanReport, SubmitError>;

    /// Liveness check.
    async fn ping(&self) -> Result<PingResponse, SubmitError>;
}
