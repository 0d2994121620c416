use holorec_core::types::RequestKind;
use holorec_providers::request::HttpResponse;
use std::time::Instant;
use thiserror::Error;
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PortalError {
    /// The request never produced an HTTP response (DNS, refused, timeout, ...).
    #[error("transport error: {0}")]
    Transport(String),

    #[error("device portal returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("device portal response is missing the {0} header")]
    MissingHeader(&'static str),
}

impl PortalError {
    pub fn is_transport(&self) -> bool {
        matches!(self, PortalError::Transport(_))
    }
}

pub type PortalResult = Result<HttpResponse, PortalError>;

/// One dispatched request whose outcome has not been observed yet.
#[derive(Debug)]
pub struct RequestHandle {
    kind: RequestKind,
    dispatched_at: Instant,
    rx: oneshot::Receiver<PortalResult>,
}

impl RequestHandle {
    pub fn new(kind: RequestKind, rx: oneshot::Receiver<PortalResult>) -> Self {
        Self {
            kind,
            dispatched_at: Instant::now(),
            rx,
        }
    }

    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    pub fn dispatched_at(&self) -> Instant {
        self.dispatched_at
    }

    /// Non-blocking. `None` while the request is still in flight.
    pub fn try_resolve(&mut self) -> Option<PortalResult> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Closed) => Some(Err(PortalError::Transport(
                "request task dropped before completing".into(),
            ))),
        }
    }
}
