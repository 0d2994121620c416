use holorec_core::config::{CaptureOptions, DEFAULT_DURATION_SECS, DeviceProfile};

/// Wi-Fi address prefix most home routers hand out; the user completes it.
pub const DEFAULT_HOST: &str = "192.168.0.";

/// Device Portal address when the headset is attached over USB.
pub const USB_HOST: &str = "127.0.0.1:10080";

pub fn default_profile() -> DeviceProfile {
    DeviceProfile {
        host: DEFAULT_HOST.into(),
        username: String::new(),
        capture: CaptureOptions::default(),
        duration_secs: DEFAULT_DURATION_SECS,
        password_present: false,
    }
}
