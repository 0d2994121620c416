use crate::handle::{PortalError, RequestHandle};
use holorec_core::timer::RecordingTimer;
use holorec_core::types::RequestKind;
use std::time::Instant;

// Stable status strings for host display.
pub const STATUS_AUTHENTICATED: &str = "auth response received";
pub const STATUS_RECORDING_STARTED: &str = "start response received";
pub const STATUS_RECORDING_STOPPED: &str = "stop response received";
pub const STATUS_STOP_REQUESTED: &str = "stopping";
pub const STATUS_DURATION_ELAPSED: &str = "recording time elapsed";

/// Something the host should react to, reported by `SessionClient::poll`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Authenticated,
    // `deadline` equals the poll time when a stop was already issued for this start.
    RecordingStarted { deadline: Instant },
    RecordingStopped,
    // Emitted by `tick` when it issues the automatic stop.
    DurationElapsed,
    RequestFailed { kind: RequestKind, error: PortalError },
}

/// Mutable state of one logical connection to a device.
#[derive(Debug, Default)]
pub struct SessionState {
    pub(crate) csrf_token: Option<String>,
    pub(crate) authenticated: bool,
    pub(crate) recording: bool,
    pub(crate) pending_auth: Option<RequestHandle>,
    pub(crate) pending_start: Option<RequestHandle>,
    pub(crate) pending_stop: Option<RequestHandle>,
    pub(crate) timer: RecordingTimer,
    pub(crate) status: Option<String>,
    // A stop went out while the start was in flight; its success must not re-arm.
    pub(crate) start_overtaken: bool,
}

impl SessionState {
    pub fn csrf_token(&self) -> Option<&str> {
        self.csrf_token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    pub fn recording_deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }

    pub fn timer(&self) -> &RecordingTimer {
        &self.timer
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn is_pending(&self, kind: RequestKind) -> bool {
        self.slot(kind).is_some()
    }

    pub fn any_pending(&self) -> bool {
        RequestKind::POLL_ORDER.iter().any(|k| self.is_pending(*k))
    }

    pub(crate) fn slot(&self, kind: RequestKind) -> &Option<RequestHandle> {
        match kind {
            RequestKind::Auth => &self.pending_auth,
            RequestKind::Start => &self.pending_start,
            RequestKind::Stop => &self.pending_stop,
        }
    }

    pub(crate) fn slot_mut(&mut self, kind: RequestKind) -> &mut Option<RequestHandle> {
        match kind {
            RequestKind::Auth => &mut self.pending_auth,
            RequestKind::Start => &mut self.pending_start,
            RequestKind::Stop => &mut self.pending_stop,
        }
    }

    pub(crate) fn forget_token(&mut self) {
        self.csrf_token = None;
        self.authenticated = false;
    }

    pub(crate) fn set_status(&mut self, status: impl Into<String>) {
        self.status = Some(status.into());
    }
}
