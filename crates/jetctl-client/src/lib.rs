//! # jetctl-client - Backend Relay Client
//!
//! Talks to the HTTP relay that owns the SSH session with the device.
//!
//! - [`DeviceBackend`] - async trait for every relay operation
//! - [`HttpBackend`] - `reqwest` implementation with request/connect timeouts
//! - [`protocol`] - JSON wire types
//! - `test_utils::FakeBackend` - scripted in-memory backend (`test-helpers` feature)

pub mod backend;
pub mod http;
pub mod protocol;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_utils;

pub use backend::{DeviceBackend, LocalDeviceBackend};
pub use http::{validate_base_url, HttpBackend, HttpBackendConfig, DEFAULT_BACKEND_URL};
pub use protocol::{
    CommandEcho, CommandMap, ConnectResponse, ExecuteResult, HealthResponse, RemoteLogRecord,
    SaveConfigRequest, StatusResponse,
};
