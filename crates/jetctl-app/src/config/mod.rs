//! Client settings
//!
//! Supports `<config_dir>/jetson-control/config.toml` with environment and
//! command-line overrides for the backend URL.

pub mod settings;
pub mod types;

pub use settings::{
    apply_overrides, default_config_path, init_config_file, load_settings, resolve_settings,
    BACKEND_URL_ENV, CONFIG_FILENAME,
};
pub use types::*;
