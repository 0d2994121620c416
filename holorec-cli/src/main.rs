mod cli;
mod record;

use anyhow::Context;
use clap::Parser;
use holorec_runtime::service::RecorderService;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands, ConfigCommands, PasswordCommands};

const DEFAULT_LOG_FILTER: &str = "holorec_cli=info,holorec_engine=info,holorec_runtime=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Library crates log through `log`; the fmt subscriber picks those records up.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let svc = RecorderService::new(cli.config.clone());

    match cli.command {
        Commands::Record { device } => {
            let mut profile = svc.load_profile()?;
            device.apply(&mut profile);
            let cfg = svc.device_config(profile, device.password.clone())?;
            log::info!("using device {:?}", cfg);

            let mut client = svc.open_session(cfg)?;
            record::run_record(&mut client).await?;
        }
        Commands::Auth { device } => {
            let mut profile = svc.load_profile()?;
            device.apply(&mut profile);
            let cfg = svc.device_config(profile, device.password.clone())?;

            let mut client = svc.open_session(cfg)?;
            record::run_auth(&mut client).await?;
        }
        Commands::Config { command } => match command {
            ConfigCommands::Show => {
                let profile = svc.load_profile()?;
                println!("config: {}", svc.config_store().path().display());
                println!("host: {}", profile.host);
                println!("user: {}", profile.username);
                println!("duration: {}s", profile.duration_secs);
                println!(
                    "capture: holo={} pv={} mic={} loopback={}",
                    profile.capture.hologram,
                    profile.capture.camera,
                    profile.capture.microphone,
                    profile.capture.loopback
                );
                println!("password stored: {}", profile.password_present);
            }
            ConfigCommands::Save { device } => {
                let mut profile = svc.load_profile()?;
                device.apply(&mut profile);
                // Validate before persisting; the password is irrelevant here.
                profile
                    .clone()
                    .into_device_config(String::new())
                    .validate()
                    .context("refusing to save invalid profile")?;
                match &device.password {
                    Some(password) => svc.store_password(&mut profile, password)?,
                    None => svc.save_profile(&profile)?,
                }
                println!("saved {}", svc.config_store().path().display());
            }
        },
        Commands::Password { command } => {
            let mut profile = svc.load_profile()?;
            match command {
                PasswordCommands::Set { password } => {
                    svc.store_password(&mut profile, &password)?;
                    println!("password stored for {}@{}", profile.username, profile.host);
                }
                PasswordCommands::Clear => {
                    svc.clear_password(&mut profile)?;
                    println!("password removed");
                }
            }
        }
    }

    Ok(())
}
