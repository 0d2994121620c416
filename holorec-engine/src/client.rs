use crate::handle::{PortalError, PortalResult, RequestHandle};
use crate::session::{
    STATUS_AUTHENTICATED, STATUS_DURATION_ELAPSED, STATUS_RECORDING_STARTED,
    STATUS_RECORDING_STOPPED, STATUS_STOP_REQUESTED, SessionEvent, SessionState,
};
use crate::traits::PortalTransport;
use holorec_core::config::{ConfigError, DeviceConfig};
use holorec_core::types::RequestKind;
use holorec_providers::device_portal::{
    PortalEndpoints, build_auth_request, build_start_request, build_stop_request,
    extract_csrf_cookie,
};
use holorec_providers::request::{HttpRequest, HttpResponse};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::oneshot;

/// Local refusals. Nothing is sent to the device when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("a {0} request is already in flight")]
    AlreadyPending(RequestKind),

    #[error("already recording")]
    AlreadyRecording,

    #[error("cannot reconfigure while recording or while requests are in flight")]
    Busy,

    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),
}

/// Drives the Device Portal auth/start/stop protocol for one device.
///
/// Requests run on the supplied tokio runtime; their outcome is only observed through
/// `poll`/`tick`, which never block. All mutation happens through `&mut self`, so a
/// client belongs to a single host loop.
pub struct SessionClient {
    config: DeviceConfig,
    duration: Duration,
    endpoints_override: Option<PortalEndpoints>,
    transport: Arc<dyn PortalTransport>,
    runtime: Handle,
    state: SessionState,
}

impl SessionClient {
    pub fn new(
        config: DeviceConfig,
        transport: Arc<dyn PortalTransport>,
        runtime: Handle,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let duration = config.duration()?;
        Ok(Self {
            config,
            duration,
            endpoints_override: None,
            transport,
            runtime,
            state: SessionState::default(),
        })
    }

    /// Send every request to `endpoints` instead of the ones derived from the host.
    pub fn with_endpoints(mut self, endpoints: PortalEndpoints) -> Self {
        self.endpoints_override = Some(endpoints);
        self
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn endpoints(&self) -> PortalEndpoints {
        self.endpoints_override
            .clone()
            .unwrap_or_else(|| PortalEndpoints::for_host(&self.config.host))
    }

    /// Replace the device configuration between recordings.
    ///
    /// A token is bound to host and credentials; changing either drops it.
    pub fn configure(&mut self, config: DeviceConfig) -> Result<(), DispatchError> {
        config.validate()?;
        let duration = config.duration()?;
        if self.state.recording || self.state.any_pending() {
            return Err(DispatchError::Busy);
        }

        if !self.config.same_identity(&config) {
            log::info!("device identity changed; discarding session token");
            self.state.forget_token();
        }
        self.config = config;
        self.duration = duration;
        Ok(())
    }

    pub fn request_token(&mut self) -> Result<(), DispatchError> {
        self.ensure_idle(RequestKind::Auth)?;
        let req = build_auth_request(&self.endpoints(), &self.config);
        self.dispatch(RequestKind::Auth, req);
        Ok(())
    }

    /// Lazy login: ask for a token only if none was ever obtained and none is on its way.
    ///
    /// Returns whether a request was dispatched.
    pub fn ensure_token(&mut self) -> bool {
        if self.state.authenticated || self.state.is_pending(RequestKind::Auth) {
            return false;
        }
        self.request_token().is_ok()
    }

    pub fn start_recording(&mut self) -> Result<(), DispatchError> {
        if self.state.recording {
            return Err(DispatchError::AlreadyRecording);
        }
        self.ensure_idle(RequestKind::Start)?;

        if self.state.csrf_token.is_none() {
            log::warn!("starting recording without a session token; the device may refuse it");
        }
        let req = build_start_request(
            &self.endpoints(),
            &self.config,
            self.state.csrf_token.as_deref(),
        );
        self.state.start_overtaken = false;
        self.dispatch(RequestKind::Start, req);
        Ok(())
    }

    /// Stops the recording. Local state flips to "not recording" right away, whatever
    /// the device ends up answering. A start still in flight will not re-arm the timer.
    pub fn stop_recording(&mut self) -> Result<(), DispatchError> {
        self.ensure_idle(RequestKind::Stop)?;

        if self.state.is_pending(RequestKind::Start) {
            self.state.start_overtaken = true;
        }
        self.state.recording = false;
        self.state.timer.disarm();
        self.state.set_status(STATUS_STOP_REQUESTED);

        let req = build_stop_request(
            &self.endpoints(),
            &self.config,
            self.state.csrf_token.as_deref(),
        );
        self.dispatch(RequestKind::Stop, req);
        Ok(())
    }

    /// Collects every request that finished since the last call, in auth, start, stop
    /// order. Never blocks.
    pub fn poll(&mut self, now: Instant) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        for kind in RequestKind::POLL_ORDER {
            let Some(handle) = self.state.slot_mut(kind).as_mut() else {
                continue;
            };
            let Some(result) = handle.try_resolve() else {
                continue;
            };
            let took = now.saturating_duration_since(handle.dispatched_at());
            *self.state.slot_mut(kind) = None;
            log::debug!("{kind} request resolved after ~{}ms", took.as_millis());

            let event = match self.complete(kind, result, now) {
                Ok(event) => event,
                Err(error) => {
                    log::warn!("{kind} request failed: {error}");
                    self.state.set_status(error.to_string());
                    SessionEvent::RequestFailed { kind, error }
                }
            };
            events.push(event);
        }
        events
    }

    /// One host tick: `poll`, then stop the recording if its time is up.
    pub fn tick(&mut self, now: Instant) -> Vec<SessionEvent> {
        let mut events = self.poll(now);
        if self.state.recording
            && self.state.timer.expired(now)
            && !self.state.is_pending(RequestKind::Stop)
            && self.stop_recording().is_ok()
        {
            log::info!("recording duration elapsed; stopping");
            self.state.set_status(STATUS_DURATION_ELAPSED);
            events.push(SessionEvent::DurationElapsed);
        }
        events
    }

    pub fn is_recording(&self) -> bool {
        self.state.recording
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.authenticated
    }

    pub fn is_pending(&self, kind: RequestKind) -> bool {
        self.state.is_pending(kind)
    }

    pub fn csrf_token(&self) -> Option<&str> {
        self.state.csrf_token()
    }

    pub fn status(&self) -> Option<&str> {
        self.state.status()
    }

    pub fn remaining_time(&self, now: Instant) -> Duration {
        if !self.state.recording {
            return Duration::ZERO;
        }
        self.state.timer.remaining(now)
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        if !self.state.recording {
            return Duration::ZERO;
        }
        self.state.timer.elapsed(now)
    }

    pub fn progress(&self, now: Instant) -> f32 {
        if !self.state.recording {
            return 0.0;
        }
        self.state.timer.progress(now)
    }

    fn ensure_idle(&self, kind: RequestKind) -> Result<(), DispatchError> {
        if self.state.is_pending(kind) {
            return Err(DispatchError::AlreadyPending(kind));
        }
        Ok(())
    }

    fn dispatch(&mut self, kind: RequestKind, req: HttpRequest) {
        log::debug!("dispatching {kind} request: {req:?}");
        let (tx, rx) = oneshot::channel::<PortalResult>();
        let transport = Arc::clone(&self.transport);
        self.runtime.spawn(async move {
            let result = transport
                .send(&req)
                .await
                .map_err(|e| PortalError::Transport(format!("{e:#}")));
            // The receiver is gone if the session ended first; nothing to report to.
            let _ = tx.send(result);
        });
        *self.state.slot_mut(kind) = Some(RequestHandle::new(kind, rx));
    }

    fn complete(
        &mut self,
        kind: RequestKind,
        result: PortalResult,
        now: Instant,
    ) -> Result<SessionEvent, PortalError> {
        let resp = result.and_then(check_status)?;
        match kind {
            RequestKind::Auth => {
                let cookie =
                    extract_csrf_cookie(&resp).ok_or(PortalError::MissingHeader("Set-Cookie"))?;
                self.state.csrf_token = Some(cookie);
                self.state.authenticated = true;
                self.state.set_status(STATUS_AUTHENTICATED);
                log::info!("obtained device portal session token");
                Ok(SessionEvent::Authenticated)
            }
            RequestKind::Start => {
                if self.state.csrf_token.is_none() {
                    log::warn!("device accepted a recording start without a session token");
                }
                self.state.set_status(STATUS_RECORDING_STARTED);
                if std::mem::take(&mut self.state.start_overtaken) {
                    log::info!("device confirmed a start that was already stopped");
                    return Ok(SessionEvent::RecordingStarted { deadline: now });
                }

                self.state.recording = true;
                if !self.state.timer.arm(now, self.duration) {
                    log::warn!("recording deadline is out of range; it will not stop on its own");
                }
                let deadline = self.state.timer.deadline().unwrap_or(now);
                log::info!("recording started for {:.1}s", self.duration.as_secs_f32());
                Ok(SessionEvent::RecordingStarted { deadline })
            }
            RequestKind::Stop => {
                self.state.set_status(STATUS_RECORDING_STOPPED);
                log::info!("recording stopped");
                Ok(SessionEvent::RecordingStopped)
            }
        }
    }
}

impl std::fmt::Debug for SessionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionClient")
            .field("config", &self.config)
            .field("endpoints", &self.endpoints())
            .field("authenticated", &self.state.authenticated)
            .field("recording", &self.state.recording)
            .finish()
    }
}

fn check_status(resp: HttpResponse) -> PortalResult {
    if resp.is_success() {
        return Ok(resp);
    }
    Err(PortalError::Status {
        status: resp.status,
        body: resp.body_text(),
    })
}
