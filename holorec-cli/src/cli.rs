use clap::{Args, Parser, Subcommand};
use holorec_core::config::DeviceProfile;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "holorec")]
#[command(about = "Start and stop HoloLens Mixed Reality Capture through the Device Portal")]
pub struct Cli {
    /// Where the device profile is stored
    #[arg(long, env = "HOLOREC_CONFIG", default_value = "holorec.json", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Record for the configured duration, then stop
    Record {
        #[command(flatten)]
        device: DeviceArgs,
    },

    /// Only fetch a session token, to check address and credentials
    Auth {
        #[command(flatten)]
        device: DeviceArgs,
    },

    /// Show or update the stored device profile
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Manage the Device Portal password in the OS keyring
    Password {
        #[command(subcommand)]
        command: PasswordCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the stored profile
    Show,

    /// Merge the given options into the stored profile
    Save {
        #[command(flatten)]
        device: DeviceArgs,
    },
}

#[derive(Subcommand, Debug)]
pub enum PasswordCommands {
    /// Store the password for the profile's host and user
    Set {
        #[arg(long, env = "HOLOREC_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Remove the stored password
    Clear,
}

/// Per-invocation overrides on top of the stored profile.
#[derive(Args, Debug, Default)]
pub struct DeviceArgs {
    /// Device Portal host or host:port, without scheme
    #[arg(long)]
    pub host: Option<String>,

    /// Use the USB Device Portal address (127.0.0.1:10080)
    #[arg(long, conflicts_with = "host")]
    pub usb: bool,

    /// Device Portal user name
    #[arg(short, long)]
    pub user: Option<String>,

    /// Device Portal password (otherwise HOLOREC_PASSWORD or the keyring)
    #[arg(long)]
    pub password: Option<String>,

    /// Recording length in seconds
    #[arg(short, long)]
    pub duration: Option<f32>,

    /// Do not capture holograms
    #[arg(long)]
    pub no_holo: bool,

    /// Do not capture the photo/video camera
    #[arg(long)]
    pub no_pv: bool,

    /// Do not capture the microphone
    #[arg(long)]
    pub no_mic: bool,

    /// Do not capture application audio
    #[arg(long)]
    pub no_loopback: bool,
}

impl DeviceArgs {
    pub fn apply(&self, profile: &mut DeviceProfile) {
        if self.usb {
            profile.host = holorec_runtime::defaults::USB_HOST.into();
        }
        if let Some(host) = &self.host {
            profile.host = host.clone();
        }
        if let Some(user) = &self.user {
            profile.username = user.clone();
        }
        if let Some(secs) = self.duration {
            profile.duration_secs = secs;
        }
        // Flags only ever turn capture sources off; `config save` without them
        // leaves the stored choice untouched.
        if self.no_holo {
            profile.capture.hologram = false;
        }
        if self.no_pv {
            profile.capture.camera = false;
        }
        if self.no_mic {
            profile.capture.microphone = false;
        }
        if self.no_loopback {
            profile.capture.loopback = false;
        }
    }
}
