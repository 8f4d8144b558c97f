//! Jetson control - operator console binary
//!
//! This is the binary entry point. All logic lives in the library crates.

use std::path::PathBuf;

use clap::Parser;
use jetctl_app::config::{default_config_path, init_config_file, resolve_settings};
use jetctl_core::logging;

/// Remote-control console for a Jetson device
#[derive(Parser, Debug)]
#[command(name = "jetctl")]
#[command(about = "Remote-control console for a Jetson device", long_about = None)]
struct Args {
    /// Backend base URL (overrides the config file and JETCTL_BACKEND_URL)
    #[arg(long, value_name = "URL")]
    backend_url: Option<String>,

    /// Path to the settings file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write a default settings file and exit
    #[arg(long)]
    init_config: bool,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    if args.init_config {
        let path = args
            .config
            .or_else(default_config_path)
            .ok_or_else(|| color_eyre::eyre::eyre!("No config directory available"))?;
        if init_config_file(&path)? {
            eprintln!("Wrote {}", path.display());
        } else {
            eprintln!("{} already exists", path.display());
        }
        return Ok(());
    }

    logging::init()?;

    let settings = resolve_settings(args.config.as_deref(), args.backend_url)?;

    if let Err(e) = jetson_control::run_headless(settings).await {
        tracing::error!("Fatal: {}", e);
        eprintln!("See {} for details", logging::current_log_file().display());
        return Err(e.into());
    }
    Ok(())
}
