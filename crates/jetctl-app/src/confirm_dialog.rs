//! Confirm dialog state.
//!
//! Data model for the confirmation step in front of destructive actions.

use crate::message::Message;

#[derive(Debug, Clone)]
pub struct ConfirmDialogState {
    pub title: String,
    pub message: String,
    pub options: Vec<(String, Message)>,
}

impl ConfirmDialogState {
    /// Create a generic confirmation dialog
    pub fn new(
        title: impl Into<String>,
        message: impl Into<String>,
        options: Vec<(&str, Message)>,
    ) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            options: options
                .into_iter()
                .map(|(label, msg)| (label.to_string(), msg))
                .collect(),
        }
    }

    /// Device shutdown confirmation
    pub fn shutdown_confirmation(target: &str) -> Self {
        Self::new(
            "Confirm Shutdown",
            format!("Are you sure you want to shut down {}?", target),
            vec![
                ("Shutdown", Message::ConfirmShutdown),
                ("Cancel", Message::CancelShutdown),
            ],
        )
    }
}
