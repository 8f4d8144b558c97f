//! # jetctl-core - Core Domain Types
//!
//! Foundation crate for the Jetson control client. Provides domain types,
//! the bounded operation log, error handling and logging setup.
//!
//! This crate has **zero internal dependencies** -- it only depends on external
//! crates (serde, chrono, thiserror, tracing).
//!
//! ## Public API
//!
//! ### Domain Types (`types`)
//! - [`ConnectionState`] - Session lifecycle (Unconfigured, Disconnected, Connecting, Connected)
//! - [`Peripheral`], [`Switch`], [`PeripheralStates`] - Controllable features and their confirmed state
//! - [`DeviceConfig`] - Host/username/port; the password is never stored
//! - [`ActionKey`], [`CommandTemplates`] - The seven operator-editable remote commands
//!
//! ### Operation Log (`oplog`)
//! - [`OperationLog`] - Five-entry, newest-first log shown to the operator
//! - [`LogEntry`] - Timestamped line
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Error enum; `is_fatal` separates startup failures from retryable operations
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`
//!
//! ## Prelude
//!
//! ```rust
//! use jetctl_core::prelude::*;
//! ```

pub mod error;
pub mod logging;
pub mod oplog;
pub mod types;

/// Prelude for common imports used throughout the jetctl crates
pub mod prelude {
    pub use super::error::{Error, Result};
    pub use tracing::{debug, error, info, instrument, trace, warn};
}

pub use error::{Error, Result};
pub use oplog::{LogEntry, OperationLog, OPERATION_LOG_CAPACITY};
pub use types::{
    ActionKey, AppPhase, CommandTemplates, ConnectionState, DeviceConfig, Password, Peripheral,
    PeripheralStates, Switch, DEFAULT_SSH_PORT,
};
