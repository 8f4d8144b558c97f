//! Jetson control - operator console for a Jetson device behind an SSH relay
//! backend
//!
//! The state machine lives in `jetctl-app`; this crate wires it to stdin and
//! an NDJSON event stream on stdout.

pub mod headless;

pub use headless::runner::run_headless;
