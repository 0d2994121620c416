use anyhow::Context;
use holorec_core::config::DeviceProfile;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> anyhow::Result<DeviceProfile> {
        let bytes = std::fs::read(&self.path)
            .with_context(|| format!("read config: {}", self.path.display()))?;
        let profile: DeviceProfile =
            serde_json::from_slice(&bytes).context("decode config JSON")?;
        Ok(profile)
    }

    /// Falls back to the built-in defaults when nothing has been saved yet.
    pub fn load_or_default(&self) -> anyhow::Result<DeviceProfile> {
        if !self.path.exists() {
            log::debug!("no config at {}; using defaults", self.path.display());
            return Ok(crate::defaults::default_profile());
        }
        self.load()
    }

    pub fn save(&self, profile: &DeviceProfile) -> anyhow::Result<()> {
        let json = serde_json::to_vec_pretty(profile).context("encode config JSON")?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create config directory: {}", parent.display()))?;
        }

        // Atomic-ish write: write temp then replace.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).with_context(|| format!("write temp: {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("replace file: {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use holorec_core::config::CaptureOptions;

    #[test]
    fn round_trips_profile() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("holorec.json");
        let store = ConfigStore::at_path(path);

        let profile = DeviceProfile {
            host: "10.0.0.5".into(),
            username: "admin".into(),
            capture: CaptureOptions {
                loopback: false,
                ..Default::default()
            },
            duration_secs: 42.5,
            password_present: true,
        };

        store.save(&profile).unwrap();
        assert_eq!(store.load().unwrap(), profile);
        assert!(!store.path().with_extension("json.tmp").exists());
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::at_path(dir.path().join("absent.json"));
        assert!(store.load().is_err());
        assert_eq!(
            store.load_or_default().unwrap(),
            crate::defaults::default_profile()
        );
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("holorec.json");
        std::fs::write(&path, b"{not json").unwrap();
        let err = ConfigStore::at_path(path).load_or_default().unwrap_err();
        assert!(format!("{err:#}").contains("decode config JSON"));
    }
}
