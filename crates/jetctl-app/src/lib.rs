//! jetctl-app - Session state machine and orchestration for the Jetson
//! control client
//!
//! This crate implements the TEA (The Elm Architecture) pattern for the
//! remote-control session, the Engine that drives it against a
//! [`jetctl_client::DeviceBackend`], the status poller and settings loading.

pub mod actions;
pub mod config;
pub mod confirm_dialog;
pub mod engine;
pub mod engine_event;
pub mod handler;
pub mod message;
pub mod poller;
pub mod process;
pub mod signals;
pub mod state;
pub mod stores;

// Re-export primary types
pub use engine::Engine;
pub use engine_event::EngineEvent;
pub use handler::{UpdateAction, UpdateResult};
pub use message::Message;
pub use state::{AppState, Notice, NoticeLevel, Screen, ShutdownPhase};
