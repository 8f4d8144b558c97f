//! Client-side caches of backend-owned data
//!
//! The backend is the system of record for both the device configuration and
//! the command templates. These stores hold the client's copy and the rules
//! for when that copy may change.

use jetctl_client::{CommandMap, SaveConfigRequest};
use jetctl_core::prelude::*;
use jetctl_core::{ActionKey, CommandTemplates, DeviceConfig, Password};

// ─────────────────────────────────────────────────────────────────────────────
// ConfigStore
// ─────────────────────────────────────────────────────────────────────────────

/// Device connection parameters as last loaded or saved.
///
/// No password is ever held here.
#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    config: DeviceConfig,
    /// A save request is outstanding
    pub saving: bool,
}

impl ConfigStore {
    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    pub fn is_configured(&self) -> bool {
        self.config.configured
    }

    /// Replace the cached value with what the backend reported
    pub fn apply_loaded(&mut self, config: DeviceConfig) {
        self.config = config;
    }

    /// Record a confirmed save
    pub fn apply_saved(&mut self, config: DeviceConfig) {
        self.saving = false;
        self.config = config;
    }

    /// Check operator input and build the one request that carries the
    /// password. Rejected input never reaches the network.
    pub fn prepare_save(
        host: &str,
        username: &str,
        password: Password,
        port: u16,
    ) -> Result<SaveConfigRequest> {
        let host = host.trim();
        let username = username.trim();
        if host.is_empty() {
            return Err(Error::validation("host", "must not be empty"));
        }
        if username.is_empty() {
            return Err(Error::validation("username", "must not be empty"));
        }
        if password.is_empty() {
            return Err(Error::validation("password", "must not be empty"));
        }
        if port == 0 {
            return Err(Error::validation("port", "must be between 1 and 65535"));
        }
        Ok(SaveConfigRequest {
            host: host.to_string(),
            username: username.to_string(),
            password: password.into_inner(),
            port,
        })
    }
}

/// The configuration a successful save leaves behind
pub fn saved_config(request: &SaveConfigRequest) -> DeviceConfig {
    DeviceConfig {
        host: request.host.clone(),
        username: request.username.clone(),
        port: request.port,
        configured: true,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// CommandTemplateStore
// ─────────────────────────────────────────────────────────────────────────────

/// Cached command templates. Starts from built-in defaults so all seven keys
/// are always present.
#[derive(Debug, Clone, Default)]
pub struct CommandTemplateStore {
    templates: CommandTemplates,
    /// A save request is outstanding
    pub saving: bool,
    /// At least one load from the backend succeeded
    pub loaded: bool,
}

impl CommandTemplateStore {
    pub fn templates(&self) -> &CommandTemplates {
        &self.templates
    }

    pub fn get(&self, key: ActionKey) -> &str {
        self.templates.get(key)
    }

    /// Merge a backend mapping; unknown keys are dropped, missing keys keep
    /// their current value.
    pub fn merge_loaded(&mut self, commands: &CommandMap) -> usize {
        let applied = self.templates.merge(commands);
        if applied < commands.len() {
            debug!(
                "Ignored {} unknown command key(s) from backend",
                commands.len() - applied
            );
        }
        self.loaded = true;
        applied
    }

    /// Full mapping with one key replaced, ready to save
    pub fn derive_edit(&self, key: ActionKey, command: impl Into<String>) -> CommandTemplates {
        self.templates.with(key, command)
    }

    /// Record a confirmed save
    pub fn apply_saved(&mut self, templates: CommandTemplates) {
        self.saving = false;
        self.templates = templates;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_save_rejects_empty_fields() {
        assert!(ConfigStore::prepare_save("", "jetson", Password::new("pw"), 22).is_err());
        assert!(ConfigStore::prepare_save("host", "  ", Password::new("pw"), 22).is_err());
        assert!(ConfigStore::prepare_save("host", "jetson", Password::default(), 22).is_err());
        assert!(ConfigStore::prepare_save("host", "jetson", Password::new("pw"), 0).is_err());
    }

    #[test]
    fn test_prepare_save_trims_and_keeps_password_in_request_only() {
        let req = ConfigStore::prepare_save(" 192.168.1.50 ", "jetson", Password::new("pw"), 22).unwrap();
        assert_eq!(req.host, "192.168.1.50");
        assert_eq!(req.password, "pw");

        let config = saved_config(&req);
        assert!(config.configured);
        assert_eq!(config.host, "192.168.1.50");
        assert_eq!(config.port, 22);
    }

    #[test]
    fn test_config_store_apply() {
        let mut store = ConfigStore::default();
        assert!(!store.is_configured());

        store.saving = true;
        store.apply_saved(DeviceConfig::configured("h", "u", 22).unwrap());
        assert!(store.is_configured());
        assert!(!store.saving);

        store.apply_loaded(DeviceConfig::unconfigured());
        assert!(!store.is_configured());
    }

    #[test]
    fn test_template_store_merge() {
        let mut store = CommandTemplateStore::default();
        let mut map = CommandMap::new();
        map.insert("camera_on".into(), "camctl start".into());
        map.insert("bogus".into(), "x".into());

        assert_eq!(store.merge_loaded(&map), 1);
        assert!(store.loaded);
        assert_eq!(store.get(ActionKey::CameraOn), "camctl start");
        assert_eq!(
            store.get(ActionKey::CameraOff),
            CommandTemplates::default().camera_off
        );
    }

    #[test]
    fn test_derive_edit_does_not_mutate_cache() {
        let store = CommandTemplateStore::default();
        let edited = store.derive_edit(ActionKey::Shutdown, "poweroff");
        assert_eq!(edited.shutdown_cmd, "poweroff");
        assert_eq!(store.get(ActionKey::Shutdown), "sudo shutdown -h now");
    }
}
