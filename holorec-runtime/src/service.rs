use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use holorec_core::config::{DeviceConfig, DeviceProfile};
use holorec_engine::client::SessionClient;
use holorec_providers::runtime::ClientOptions;

use crate::config_store::ConfigStore;
use crate::secrets::{delete_password, get_password, set_password};
use crate::transport::ReqwestTransport;

/// Env var consulted before the keyring, for headless use.
pub const PASSWORD_ENV: &str = "HOLOREC_PASSWORD";

/// Front-end wiring shared by every host: stored profile, password lookup, and
/// construction of a ready-to-use `SessionClient`.
#[derive(Debug, Clone)]
pub struct RecorderService {
    config_store: ConfigStore,
    client_options: ClientOptions,
}

impl RecorderService {
    pub fn new(config_path: PathBuf) -> Self {
        Self {
            config_store: ConfigStore::at_path(config_path),
            client_options: ClientOptions::default(),
        }
    }

    pub fn with_client_options(mut self, opts: ClientOptions) -> Self {
        self.client_options = opts;
        self
    }

    pub fn config_store(&self) -> &ConfigStore {
        &self.config_store
    }

    pub fn load_profile(&self) -> anyhow::Result<DeviceProfile> {
        self.config_store.load_or_default()
    }

    pub fn save_profile(&self, profile: &DeviceProfile) -> anyhow::Result<()> {
        self.config_store.save(profile)
    }

    pub fn store_password(
        &self,
        profile: &mut DeviceProfile,
        password: &str,
    ) -> anyhow::Result<()> {
        set_password(&profile.host, &profile.username, password)?;
        profile.password_present = true;
        self.save_profile(profile)
    }

    pub fn clear_password(&self, profile: &mut DeviceProfile) -> anyhow::Result<()> {
        delete_password(&profile.host, &profile.username)?;
        profile.password_present = false;
        self.save_profile(profile)
    }

    /// Password precedence: explicit value, then `HOLOREC_PASSWORD`, then keyring.
    pub fn resolve_password(
        &self,
        profile: &DeviceProfile,
        explicit: Option<String>,
    ) -> anyhow::Result<String> {
        if let Some(p) = explicit {
            return Ok(p);
        }
        if let Ok(p) = std::env::var(PASSWORD_ENV) {
            return Ok(p);
        }
        if !profile.password_present {
            log::warn!("no device portal password configured; using an empty one");
            return Ok(String::new());
        }
        let stored = get_password(&profile.host, &profile.username)
            .context("read device portal password from keyring")?;
        Ok(stored.unwrap_or_default())
    }

    pub fn device_config(
        &self,
        profile: DeviceProfile,
        explicit_password: Option<String>,
    ) -> anyhow::Result<DeviceConfig> {
        let password = self.resolve_password(&profile, explicit_password)?;
        let cfg = profile.into_device_config(password);
        cfg.validate().context("invalid device configuration")?;
        Ok(cfg)
    }

    /// Must be called from within a tokio runtime.
    pub fn open_session(&self, cfg: DeviceConfig) -> anyhow::Result<SessionClient> {
        let transport = Arc::new(ReqwestTransport::new(&self.client_options)?);
        let runtime = tokio::runtime::Handle::try_current()
            .context("session client needs a tokio runtime")?;
        let client = SessionClient::new(cfg, transport, runtime)?;
        Ok(client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::default_profile;

    #[test]
    fn explicit_password_wins() {
        let dir = tempfile::tempdir().unwrap();
        let svc = RecorderService::new(dir.path().join("holorec.json"));
        let mut profile = default_profile();
        profile.host = "10.0.0.5".into();

        let cfg = svc.device_config(profile, Some("pw".into())).unwrap();
        assert_eq!(cfg.password, "pw");
        assert_eq!(cfg.host, "10.0.0.5");
    }

    #[test]
    fn rejects_invalid_profile() {
        let dir = tempfile::tempdir().unwrap();
        let svc = RecorderService::new(dir.path().join("holorec.json"));
        let mut profile = default_profile();
        profile.host = "https://10.0.0.5".into();
        assert!(svc.device_config(profile, Some(String::new())).is_err());
    }

    #[tokio::test]
    async fn opens_session_inside_runtime() {
        let dir = tempfile::tempdir().unwrap();
        let svc = RecorderService::new(dir.path().join("holorec.json")).with_client_options(
            ClientOptions {
                accept_invalid_certs: false,
                ..Default::default()
            },
        );
        let cfg = DeviceConfig::new("10.0.0.5");
        let client = svc.open_session(cfg).unwrap();
        assert!(!client.is_authenticated());
        assert_eq!(client.endpoints().auth_base, "https://10.0.0.5");
    }

    #[test]
    fn open_session_outside_runtime_fails() {
        let dir = tempfile::tempdir().unwrap();
        let svc = RecorderService::new(dir.path().join("holorec.json"));
        assert!(svc.open_session(DeviceConfig::new("10.0.0.5")).is_err());
    }
}
