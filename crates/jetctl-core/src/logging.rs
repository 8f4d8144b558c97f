//! File logging for the console
//!
//! stdout carries the NDJSON event stream, so diagnostics only ever go to a
//! daily log file under `<data_local_dir>/jetson-control/logs/`. The level is
//! controlled by `JETCTL_LOG`:
//!
//! ```bash
//! JETCTL_LOG=debug jetctl
//! JETCTL_LOG=jetctl_app=trace,jetctl_client=debug jetctl
//! ```

use std::path::PathBuf;

use chrono::{NaiveDate, Utc};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::{Error, Result};

/// Environment variable holding the tracing filter
pub const LOG_ENV: &str = "JETCTL_LOG";

/// Filter used when `JETCTL_LOG` is unset or invalid
pub const DEFAULT_FILTER: &str =
    "jetctl=info,jetctl_app=info,jetctl_client=info,jetctl_core=info,warn";

/// Days of log files kept on disk
pub const RETAINED_LOG_FILES: usize = 7;

const FILE_PREFIX: &str = "jetctl";
const FILE_SUFFIX: &str = "log";

/// Install the file subscriber
pub fn init() -> Result<()> {
    let log_dir = log_directory();
    std::fs::create_dir_all(&log_dir)?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(FILE_PREFIX)
        .filename_suffix(FILE_SUFFIX)
        .max_log_files(RETAINED_LOG_FILES)
        .build(&log_dir)
        .map_err(|e| Error::config(format!("cannot open log file in {:?}: {}", log_dir, e)))?;

    tracing_subscriber::registry()
        .with(env_filter())
        .with(
            fmt::layer()
                .with_writer(appender)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_timer(fmt::time::ChronoLocal::new(
                    "%Y-%m-%d %H:%M:%S%.3f".to_string(),
                )),
        )
        .init();

    tracing::info!(
        "jetctl {} starting, logging to {}",
        env!("CARGO_PKG_VERSION"),
        log_dir.display()
    );
    Ok(())
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

fn log_directory() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("jetson-control")
        .join("logs")
}

/// File name the daily appender writes on `date`.
///
/// The appender dates its files in UTC.
pub fn log_file_name(date: NaiveDate) -> String {
    format!("{}.{}.{}", FILE_PREFIX, date.format("%Y-%m-%d"), FILE_SUFFIX)
}

/// Path of the file being written right now
pub fn current_log_file() -> PathBuf {
    log_directory().join(log_file_name(Utc::now().date_naive()))
}
