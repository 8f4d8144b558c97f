//! Settings file loading and initialisation

use std::path::{Path, PathBuf};

use jetctl_client::validate_base_url;
use jetctl_core::prelude::*;

use super::types::Settings;

/// Directory name under the platform config dir
pub const APP_DIR: &str = "jetson-control";

/// Settings file name
pub const CONFIG_FILENAME: &str = "config.toml";

/// Environment variable overriding `backend.url`
pub const BACKEND_URL_ENV: &str = "JETCTL_BACKEND_URL";

/// `<config_dir>/jetson-control/config.toml`, if the platform has a config dir
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILENAME))
}

/// Load settings from `config_path`.
///
/// A missing file yields defaults. An unreadable or unparseable file is
/// logged and also yields defaults.
pub fn load_settings(config_path: &Path) -> Settings {
    if !config_path.exists() {
        debug!("No config file at {:?}, using defaults", config_path);
        return Settings::default();
    }

    match std::fs::read_to_string(config_path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(settings) => {
                debug!("Loaded settings from {:?}", config_path);
                settings
            }
            Err(e) => {
                warn!("Failed to parse {:?}: {}", config_path, e);
                Settings::default()
            }
        },
        Err(e) => {
            warn!("Failed to read {:?}: {}", config_path, e);
            Settings::default()
        }
    }
}

/// Apply the backend URL overrides. The command-line value wins over the
/// environment, which wins over the file.
pub fn apply_overrides(settings: &mut Settings, env_url: Option<String>, cli_url: Option<String>) {
    if let Some(url) = env_url.filter(|u| !u.trim().is_empty()) {
        debug!("Backend URL from {}: {}", BACKEND_URL_ENV, url);
        settings.backend.url = url;
    }
    if let Some(url) = cli_url.filter(|u| !u.trim().is_empty()) {
        debug!("Backend URL from command line: {}", url);
        settings.backend.url = url;
    }
}

/// Load, override and validate settings.
///
/// `config_path` defaults to [`default_config_path`]. An invalid backend URL
/// is the only fatal outcome.
pub fn resolve_settings(config_path: Option<&Path>, cli_url: Option<String>) -> Result<Settings> {
    let mut settings = match config_path.map(Path::to_path_buf).or_else(default_config_path) {
        Some(path) => load_settings(&path),
        None => {
            warn!("No config directory available, using default settings");
            Settings::default()
        }
    };

    apply_overrides(&mut settings, std::env::var(BACKEND_URL_ENV).ok(), cli_url);
    validate_base_url(&settings.backend.url)?;

    info!(
        "Backend {} (poll every {:?})",
        settings.backend.url,
        settings.polling.interval()
    );
    Ok(settings)
}

const DEFAULT_CONFIG: &str = r#"# Jetson control client configuration

[backend]
url = "http://localhost:8001"   # Relay that owns the SSH session
request_timeout_secs = 10       # Whole-request timeout
connect_timeout_secs = 5

[polling]
interval_secs = 5               # Status check period while configured (minimum 1)

[history]
default_limit = 20              # Entries fetched by `history` without a count
"#;

/// Write a commented default settings file if none exists.
///
/// Returns `true` when a file was created.
pub fn init_config_file(config_path: &Path) -> Result<bool> {
    if config_path.exists() {
        debug!("Config file already exists at {:?}", config_path);
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| Error::config(format!("Failed to create {:?}: {}", parent, e)))?;
    }

    std::fs::write(config_path, DEFAULT_CONFIG)
        .map_err(|e| Error::config(format!("Failed to write {:?}: {}", config_path, e)))?;
    info!("Created default config at {:?}", config_path);
    Ok(true)
}
