use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_DURATION_SECS: f32 = 5.0;

/// Longest recording a single start may ask for (one day).
pub const MAX_DURATION_SECS: f32 = 86_400.0;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("device host is empty")]
    EmptyHost,

    #[error("device host must not include a scheme: {0}")]
    HostHasScheme(String),

    #[error("recording duration must be above 0 and at most 86400 seconds, got {0}")]
    InvalidDuration(String),
}

/// Which MRC layers the device should mix into the recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureOptions {
    pub hologram: bool,
    // Photo/video camera ("pv" on the wire).
    pub camera: bool,
    pub microphone: bool,
    // Application audio ("loopback" on the wire).
    pub loopback: bool,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            hologram: true,
            camera: true,
            microphone: true,
            loopback: true,
        }
    }
}

#[derive(Clone, PartialEq)]
pub struct DeviceConfig {
    /// Host or `host:port` of the Device Portal, without scheme.
    pub host: String,
    pub username: String,
    pub password: String,
    pub capture: CaptureOptions,
    pub duration_secs: f32,
}

impl std::fmt::Debug for DeviceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceConfig")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("capture", &self.capture)
            .field("duration_secs", &self.duration_secs)
            .finish()
    }
}

impl DeviceConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            username: String::new(),
            password: String::new(),
            capture: CaptureOptions::default(),
            duration_secs: DEFAULT_DURATION_SECS,
        }
    }

    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    pub fn with_capture(mut self, capture: CaptureOptions) -> Self {
        self.capture = capture;
        self
    }

    pub fn with_duration_secs(mut self, secs: f32) -> Self {
        self.duration_secs = secs;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let host = self.host.trim();
        if host.is_empty() {
            return Err(ConfigError::EmptyHost);
        }
        if host.contains("://") {
            return Err(ConfigError::HostHasScheme(host.to_string()));
        }
        self.duration()?;
        Ok(())
    }

    /// Requested recording length, checked against `0 < secs <= MAX_DURATION_SECS`.
    pub fn duration(&self) -> Result<Duration, ConfigError> {
        let secs = self.duration_secs;
        let invalid = || ConfigError::InvalidDuration(secs.to_string());
        if !secs.is_finite() || secs <= 0.0 || secs > MAX_DURATION_SECS {
            return Err(invalid());
        }
        Duration::try_from_secs_f32(secs).map_err(|_| invalid())
    }

    /// True when switching to `other` would invalidate a token obtained with `self`.
    pub fn same_identity(&self, other: &DeviceConfig) -> bool {
        self.host.trim() == other.host.trim()
            && self.username == other.username
            && self.password == other.password
    }
}

/// What a front-end remembers between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceProfile {
    pub host: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub capture: CaptureOptions,
    #[serde(default = "default_duration_secs")]
    pub duration_secs: f32,

    // The password is stored outside this struct at rest.
    #[serde(default)]
    pub password_present: bool,
}

fn default_duration_secs() -> f32 {
    DEFAULT_DURATION_SECS
}

impl DeviceProfile {
    pub fn into_device_config(self, password: impl Into<String>) -> DeviceConfig {
        DeviceConfig {
            host: self.host,
            username: self.username,
            password: password.into(),
            capture: self.capture,
            duration_secs: self.duration_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_fills_defaults_for_missing_fields() {
        let profile: DeviceProfile = serde_json::from_str(r#"{"host":"10.0.0.5"}"#).unwrap();
        assert_eq!(profile.duration_secs, DEFAULT_DURATION_SECS);
        assert_eq!(profile.capture, CaptureOptions::default());
        assert!(!profile.password_present);

        let cfg = profile.into_device_config("pw");
        assert_eq!(cfg.host, "10.0.0.5");
        assert_eq!(cfg.password, "pw");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn defaults_capture_everything() {
        let cfg = DeviceConfig::new("10.0.0.5");
        assert_eq!(cfg.capture, CaptureOptions::default());
        assert!(cfg.capture.hologram && cfg.capture.camera);
        assert!(cfg.capture.microphone && cfg.capture.loopback);
        assert_eq!(cfg.duration(), Ok(Duration::from_secs(5)));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn rejects_bad_host() {
        assert_eq!(DeviceConfig::new("  ").validate(), Err(ConfigError::EmptyHost));
        assert!(matches!(
            DeviceConfig::new("https://10.0.0.5").validate(),
            Err(ConfigError::HostHasScheme(_))
        ));
        assert!(DeviceConfig::new("127.0.0.1:10080").validate().is_ok());
    }

    #[test]
    fn rejects_non_positive_duration() {
        for secs in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let cfg = DeviceConfig::new("h").with_duration_secs(secs);
            assert!(matches!(cfg.validate(), Err(ConfigError::InvalidDuration(_))));
        }
    }

    #[test]
    fn rejects_durations_too_long_to_schedule() {
        // 1e19 fits in a Duration but not after an Instant; 1e30 fits in neither.
        for secs in [MAX_DURATION_SECS + 1.0, 1e19, 1e30, f32::MAX] {
            let cfg = DeviceConfig::new("h").with_duration_secs(secs);
            assert!(matches!(cfg.validate(), Err(ConfigError::InvalidDuration(_))));
            assert!(cfg.duration().is_err());
        }

        let longest = DeviceConfig::new("h").with_duration_secs(MAX_DURATION_SECS);
        assert!(longest.validate().is_ok());
        assert_eq!(longest.duration(), Ok(Duration::from_secs(86_400)));
    }

    #[test]
    fn debug_redacts_password() {
        let cfg = DeviceConfig::new("h").with_credentials("admin", "hunter2");
        let s = format!("{cfg:?}");
        assert!(s.contains("admin"));
        assert!(!s.contains("hunter2"));
    }

    #[test]
    fn identity_ignores_capture_and_duration() {
        let a = DeviceConfig::new("h").with_credentials("u", "p");
        let b = a.clone().with_duration_secs(30.0).with_capture(CaptureOptions {
            microphone: false,
            ..Default::default()
        });
        assert!(a.same_identity(&b));
        assert!(!a.same_identity(&a.clone().with_credentials("u", "other")));
    }
}
