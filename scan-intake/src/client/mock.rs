//! Mock intake service for testing.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, PoisonError};
use tokio::sync::watch;

use super::traits::*;
use crate::error::SubmitError;
use crate::report::{PingResponse, ScanReport};

/// How the mock answers a submission.
#[derive(Debug, Clone)]
pub enum MockReply {
    Accept(ScanReport),
    Reject { status: u16, body: String },
    Unreachable(String),
}

impl Default for MockReply {
    fn default() -> Self {
        MockReply::Accept(ScanReport::new("Scan started"))
    }
}

/// Mock service with scripted replies.
///
/// Can hold every response until [`MockIntake::release`] is called, which
/// lets tests observe the in-flight state or dispose mid-request.
pub struct MockIntake {
    reply: Mutex<MockReply>,
    release_tx: watch::Sender<bool>,
    requests: Mutex<Vec<ScanRequest>>,
    call_count: AtomicU32,
}

impl MockIntake {
    pub fn new() -> Self {
        let (release_tx, _) = watch::channel(true);
        Self {
            reply: Mutex::new(MockReply::default()),
            release_tx,
            requests: Mutex::new(Vec::new()),
            call_count: AtomicU32::new(0),
        }
    }

    /// Set the reply.
    pub fn with_reply(self, reply: MockReply) -> Self {
        self.set_reply(reply);
        self
    }

    /// Hold responses until released.
    pub fn held(self) -> Self {
        self.release_tx.send_replace(false);
        self
    }

    pub fn set_reply(&self, reply: MockReply) {
        *self.reply.lock().unwrap_or_else(PoisonError::into_inner) = reply;
    }

    /// Let held responses through.
    pub fn release(&self) {
        self.release_tx.send_replace(true);
    }

    /// Number of submissions received.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Submissions received, in order.
    pub fn requests(&self) -> Vec<ScanRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for MockIntake {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IntakeService for MockIntake {
    fn id(&self) -> &str {
        "mock-intake"
    }

    async fn submit(&self, request: ScanRequest) -> Result<ScanReport, SubmitError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);

        let mut release_rx = self.release_tx.subscribe();
        if release_rx.wait_for(|released| *released).await.is_err() {
            return Err(SubmitError::Transport("mock dropped".to_string()));
        }

        let reply = self
            .reply
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        match reply {
            MockReply::Accept(report) => Ok(report),
            MockReply::Reject { status, body } => Err(SubmitError::Service { status, body }),
            MockReply::Unreachable(reason) => Err(SubmitError::Transport(reason)),
        }
    }

    async fn ping(&self) -> Result<PingResponse, SubmitError> {
        Ok(PingResponse {
            message: "pong".to_string(),
        })
    }
}
