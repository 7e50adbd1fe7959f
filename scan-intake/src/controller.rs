//! Submission controller.
//!
//! Holds the form draft and drives one submission at a time through
//! `Idle → Validating → InFlight → Succeeded | Failed`.
//!
//! Every submission is tagged with a generation number. `dispose` bumps the
//! generation, so a response that arrives afterwards no longer matches and
//! is dropped without touching state. The lock is never held across the
//! service call. If the `submit` future itself is dropped mid-request, the
//! submission settles to `Failed` so the controller does not stay busy.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::client::{IntakeService, ScanRequest};
use crate::error::{SubmitError, ValidationError};
use crate::report::ScanReport;
use crate::state::SubmissionState;
use crate::target::{SubmissionTarget, TargetDraft, TargetKind, TargetValue};
use crate::validate::{validate_archive, validate_target, ArchiveLimits};

/// Controller settings.
#[derive(Debug, Clone, Default)]
pub struct ControllerConfig {
    pub limits: ArchiveLimits,
}

struct Inner {
    draft: TargetDraft,
    state: SubmissionState,
    generation: u64,
    disposed: bool,
    last_report: Option<ScanReport>,
    last_error: Option<SubmitError>,
}

struct Shared {
    service: Arc<dyn IntakeService>,
    config: ControllerConfig,
    inner: Mutex<Inner>,
    state_tx: watch::Sender<SubmissionState>,
}

/// Drives scan submissions against an [`IntakeService`].
///
/// Cheap to clone; clones share the same draft and state.
#[derive(Clone)]
pub struct SubmissionController {
    shared: Arc<Shared>,
}

impl SubmissionController {
    pub fn new(service: Arc<dyn IntakeService>, config: ControllerConfig) -> Self {
        let (state_tx, _) = watch::channel(SubmissionState::Idle);
        Self {
            shared: Arc::new(Shared {
                service,
                config,
                inner: Mutex::new(Inner {
                    draft: TargetDraft::default(),
                    state: SubmissionState::Idle,
                    generation: 0,
                    disposed: false,
                    last_report: None,
                    last_error: None,
                }),
                state_tx,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.shared
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, inner: &mut Inner, next: SubmissionState) {
        debug!(from = %inner.state, to = %next, "Submission state changed");
        inner.state = next.clone();
        self.shared.state_tx.send_replace(next);
    }

    /// Current state.
    pub fn state(&self) -> SubmissionState {
        self.lock().state.clone()
    }

    /// Receiver that observes every state change.
    pub fn subscribe(&self) -> watch::Receiver<SubmissionState> {
        self.shared.state_tx.subscribe()
    }

    /// Active input mode.
    pub fn mode(&self) -> TargetKind {
        self.lock().draft.mode
    }

    /// Snapshot of the form contents.
    pub fn draft(&self) -> TargetDraft {
        self.lock().draft.clone()
    }

    /// The target `submit` would send, before validation.
    pub fn active_target(&self) -> Option<SubmissionTarget> {
        self.lock().draft.active_target()
    }

    /// Report of the most recent successful submission.
    pub fn last_report(&self) -> Option<ScanReport> {
        self.lock().last_report.clone()
    }

    /// Error behind the most recent `Failed` state.
    pub fn last_error(&self) -> Option<SubmitError> {
        self.lock().last_error.clone()
    }

    pub fn is_disposed(&self) -> bool {
        self.lock().disposed
    }

    /// Whether a submit would start now.
    pub fn can_submit(&self) -> bool {
        let inner = self.lock();
        !inner.disposed && inner.state.accepts_submit() && inner.draft.has_active_value()
    }

    /// Switch the input mode. Both slots keep their contents.
    pub fn set_mode(&self, mode: TargetKind) -> Result<(), SubmitError> {
        let mut inner = self.lock();
        if inner.disposed {
            return Err(SubmitError::Disposed);
        }
        if inner.state.is_busy() {
            return Err(SubmitError::Busy);
        }

        if inner.draft.mode != mode {
            debug!(mode = %mode, "Input mode changed");
            inner.draft.mode = mode;
        }
        Ok(())
    }

    /// Store a value in the active slot.
    ///
    /// Archives are checked against the size and extension bounds right
    /// away. A rejected archive clears the archive slot and, unless a
    /// submission is running, moves the state to `Failed`.
    pub fn set_value(&self, value: TargetValue) -> Result<(), SubmitError> {
        let mut inner = self.lock();
        if inner.disposed {
            return Err(SubmitError::Disposed);
        }
        if value.kind() != inner.draft.mode {
            return Err(ValidationError::ModeMismatch.into());
        }

        match value {
            TargetValue::Text(text) => {
                inner.draft.url = text;
                Ok(())
            }
            TargetValue::Archive(archive) => {
                match validate_archive(&archive, &self.shared.config.limits) {
                    Ok(()) => {
                        debug!(
                            file_name = %archive.file_name,
                            size = archive.len(),
                            sha256 = %archive.sha256_hex(),
                            "Archive selected"
                        );
                        inner.draft.archive = Some(archive);
                        Ok(())
                    }
                    Err(e) => {
                        warn!(file_name = %archive.file_name, error = %e, "Archive rejected");
                        inner.draft.archive = None;
                        if !inner.state.is_busy() {
                            let err = SubmitError::Validation(e.clone());
                            self.set_state(&mut inner, SubmissionState::Failed(err.user_message()));
                            inner.last_error = Some(err);
                        }
                        Err(e.into())
                    }
                }
            }
        }
    }

    /// Validate the active target and send it.
    ///
    /// Returns the terminal state when the service was contacted, including
    /// `Failed` for transport and service errors. Local validation failures
    /// return `Err(Validation)` after recording `Failed`. A second call while
    /// one is running returns `Err(Busy)` and changes nothing.
    pub async fn submit(&self) -> Result<SubmissionState, SubmitError> {
        let (request, generation) = {
            let mut inner = self.lock();
            if inner.disposed {
                return Err(SubmitError::Disposed);
            }
            if !inner.state.accepts_submit() {
                debug!(state = %inner.state, "Submit ignored while busy");
                return Err(SubmitError::Busy);
            }

            self.set_state(&mut inner, SubmissionState::Validating);

            let checked = match inner.draft.active_target() {
                Some(target) => validate_target(target, &self.shared.config.limits),
                None => Err(match inner.draft.mode {
                    TargetKind::Url => ValidationError::EmptyUrl,
                    TargetKind::Archive => ValidationError::MissingArchive,
                }),
            };

            let target = match checked {
                Ok(target) => target,
                Err(e) => {
                    let err = SubmitError::Validation(e);
                    self.set_state(&mut inner, SubmissionState::Failed(err.user_message()));
                    inner.last_error = Some(err.clone());
                    return Err(err);
                }
            };

            inner.generation += 1;
            inner.last_error = None;
            self.set_state(&mut inner, SubmissionState::InFlight);
            (ScanRequest::new(target), inner.generation)
        };

        let submission_id = request.submission_id;
        info!(
            submission_id = %submission_id,
            service = %self.shared.service.id(),
            target = %request.target.describe(),
            requested_at = %request.requested_at.to_rfc3339(),
            "Submitting scan"
        );

        let mut guard = InFlightGuard {
            controller: self,
            generation,
            armed: true,
        };
        let result = self.shared.service.submit(request).await;
        guard.armed = false;

        let mut inner = self.lock();
        if inner.disposed || inner.generation != generation {
            debug!(submission_id = %submission_id, "Dropping response for abandoned submission");
            return Err(SubmitError::Abandoned);
        }

        let next = match result {
            Ok(report) => {
                info!(
                    submission_id = %submission_id,
                    findings = report.findings.len(),
                    "Scan accepted: {}",
                    report.message
                );
                let next = SubmissionState::Succeeded(report.message.clone());
                inner.last_report = Some(report);
                next
            }
            Err(e) => {
                warn!(submission_id = %submission_id, error = %e, "Scan submission failed");
                let next = SubmissionState::Failed(e.user_message());
                inner.last_error = Some(e);
                next
            }
        };

        self.set_state(&mut inner, next.clone());
        Ok(next)
    }

    /// Return to `Idle` after a terminal state. Form contents are kept.
    pub fn reset(&self) -> Result<(), SubmitError> {
        let mut inner = self.lock();
        if inner.disposed {
            return Err(SubmitError::Disposed);
        }
        if inner.state.is_busy() {
            return Err(SubmitError::Busy);
        }

        inner.last_error = None;
        if inner.state != SubmissionState::Idle {
            self.set_state(&mut inner, SubmissionState::Idle);
        }
        Ok(())
    }

    /// Stop observing results. A response still in flight is dropped when it
    /// arrives and the state no longer changes. Idempotent.
    pub fn dispose(&self) {
        let mut inner = self.lock();
        if inner.disposed {
            return;
        }
        inner.disposed = true;
        inner.generation += 1;
        debug!(state = %inner.state, "Submission controller disposed");
    }
}

/// Settles a submission whose future was dropped while waiting on the service.
struct InFlightGuard<'a> {
    controller: &'a SubmissionController,
    generation: u64,
    armed: bool,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        let mut inner = self.controller.lock();
        if inner.disposed || inner.generation != self.generation {
            return;
        }

        warn!("Submission dropped before the service answered");
        let err = SubmitError::Abandoned;
        self.controller
            .set_state(&mut inner, SubmissionState::Failed(err.user_message()));
        inner.last_error = Some(err);
    }
}
