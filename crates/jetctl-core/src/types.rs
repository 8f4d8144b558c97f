//! Core domain types for the device session

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default SSH port used when the backend does not report one
pub const DEFAULT_SSH_PORT: u16 = 22;

/// Application lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppPhase {
    /// Configuration not yet loaded from the backend
    #[default]
    Initializing,
    /// Startup routing done, accepting operator input
    Running,
    /// Shutting down
    Quitting,
}

// ─────────────────────────────────────────────────────────────────────────────
// Connection State
// ─────────────────────────────────────────────────────────────────────────────

/// Logical session state with the device.
///
/// `Unconfigured → Disconnected → Connecting → Connected`, with
/// `Connected → Disconnected` on disconnect, shutdown or poll-detected loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    #[default]
    Unconfigured,
    Disconnected,
    Connecting,
    Connected,
}

impl ConnectionState {
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionState::Unconfigured => "Unconfigured",
            ConnectionState::Disconnected => "Disconnected",
            ConnectionState::Connecting => "Connecting",
            ConnectionState::Connected => "Connected",
        }
    }

    pub fn is_configured(&self) -> bool {
        !matches!(self, ConnectionState::Unconfigured)
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Peripherals
// ─────────────────────────────────────────────────────────────────────────────

/// A controllable device feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Peripheral {
    Fan,
    Camera,
    Lights,
}

impl Peripheral {
    pub const ALL: [Peripheral; 3] = [Peripheral::Fan, Peripheral::Camera, Peripheral::Lights];

    /// Backend route segment (`/api/{endpoint}`)
    pub fn endpoint(&self) -> &'static str {
        match self {
            Peripheral::Fan => "fan",
            Peripheral::Camera => "camera",
            Peripheral::Lights => "lights",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Peripheral::Fan => "Fan",
            Peripheral::Camera => "Camera",
            Peripheral::Lights => "Lights",
        }
    }
}

impl fmt::Display for Peripheral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.endpoint())
    }
}

impl FromStr for Peripheral {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "fan" => Ok(Peripheral::Fan),
            "camera" => Ok(Peripheral::Camera),
            "lights" | "light" => Ok(Peripheral::Lights),
            other => Err(Error::validation(
                "peripheral",
                format!("unknown peripheral '{}'", other),
            )),
        }
    }
}

/// Desired on/off state for a peripheral
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Switch {
    On,
    Off,
}

impl Switch {
    pub fn as_str(&self) -> &'static str {
        match self {
            Switch::On => "on",
            Switch::Off => "off",
        }
    }

    pub fn is_on(&self) -> bool {
        matches!(self, Switch::On)
    }
}

impl From<bool> for Switch {
    fn from(on: bool) -> Self {
        if on {
            Switch::On
        } else {
            Switch::Off
        }
    }
}

impl fmt::Display for Switch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Switch {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "on" | "1" | "true" => Ok(Switch::On),
            "off" | "0" | "false" => Ok(Switch::Off),
            other => Err(Error::validation(
                "action",
                format!("expected 'on' or 'off', got '{}'", other),
            )),
        }
    }
}

/// Last backend-confirmed on/off flag for each peripheral
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PeripheralStates {
    pub fan: bool,
    pub camera: bool,
    pub lights: bool,
}

impl PeripheralStates {
    pub fn get(&self, peripheral: Peripheral) -> bool {
        match peripheral {
            Peripheral::Fan => self.fan,
            Peripheral::Camera => self.camera,
            Peripheral::Lights => self.lights,
        }
    }

    pub fn set(&mut self, peripheral: Peripheral, on: bool) {
        match peripheral {
            Peripheral::Fan => self.fan = on,
            Peripheral::Camera => self.camera = on,
            Peripheral::Lights => self.lights = on,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Device Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Connection parameters for the device, as known to the client.
///
/// The password is write-only: it is sent once when saving and never held here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceConfig {
    pub host: String,
    pub username: String,
    pub port: u16,
    pub configured: bool,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self::unconfigured()
    }
}

impl DeviceConfig {
    /// Empty configuration reported when the backend has none (or is unreachable)
    pub fn unconfigured() -> Self {
        Self {
            host: String::new(),
            username: String::new(),
            port: DEFAULT_SSH_PORT,
            configured: false,
        }
    }

    /// Build a configured value, enforcing the non-empty invariant
    pub fn configured(host: impl Into<String>, username: impl Into<String>, port: u16) -> Result<Self> {
        let config = Self {
            host: host.into(),
            username: username.into(),
            port,
            configured: true,
        };
        config.validate()?;
        Ok(config)
    }

    /// `configured == true` implies host, username and port are usable
    pub fn validate(&self) -> Result<()> {
        if !self.configured {
            return Ok(());
        }
        if self.host.trim().is_empty() {
            return Err(Error::validation("host", "must not be empty"));
        }
        if self.username.trim().is_empty() {
            return Err(Error::validation("username", "must not be empty"));
        }
        if self.port == 0 {
            return Err(Error::validation("port", "must be between 1 and 65535"));
        }
        Ok(())
    }

    /// `user@host:port`, used in operator-facing text
    pub fn target(&self) -> String {
        format!("{}@{}:{}", self.username, self.host, self.port)
    }
}

/// Write-only device password.
///
/// Carried from operator input to the save request and then dropped.
/// `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Password(String);

impl Password {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Command Templates
// ─────────────────────────────────────────────────────────────────────────────

/// Logical action with an operator-editable remote command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActionKey {
    FanOn,
    FanOff,
    CameraOn,
    CameraOff,
    LightsOn,
    LightsOff,
    Shutdown,
}

impl ActionKey {
    pub const ALL: [ActionKey; 7] = [
        ActionKey::FanOn,
        ActionKey::FanOff,
        ActionKey::CameraOn,
        ActionKey::CameraOff,
        ActionKey::LightsOn,
        ActionKey::LightsOff,
        ActionKey::Shutdown,
    ];

    /// Wire key in the backend's template mapping
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKey::FanOn => "fan_on",
            ActionKey::FanOff => "fan_off",
            ActionKey::CameraOn => "camera_on",
            ActionKey::CameraOff => "camera_off",
            ActionKey::LightsOn => "lights_on",
            ActionKey::LightsOff => "lights_off",
            ActionKey::Shutdown => "shutdown_cmd",
        }
    }

    pub fn for_toggle(peripheral: Peripheral, switch: Switch) -> Self {
        match (peripheral, switch) {
            (Peripheral::Fan, Switch::On) => ActionKey::FanOn,
            (Peripheral::Fan, Switch::Off) => ActionKey::FanOff,
            (Peripheral::Camera, Switch::On) => ActionKey::CameraOn,
            (Peripheral::Camera, Switch::Off) => ActionKey::CameraOff,
            (Peripheral::Lights, Switch::On) => ActionKey::LightsOn,
            (Peripheral::Lights, Switch::Off) => ActionKey::LightsOff,
        }
    }
}

impl fmt::Display for ActionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ActionKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| Error::validation("key", format!("unknown command key '{}'", s)))
    }
}

/// Literal remote command for each of the seven action keys.
///
/// Field names are the wire keys, so the struct serializes directly to the
/// backend's full-replace mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandTemplates {
    pub fan_on: String,
    pub fan_off: String,
    pub camera_on: String,
    pub camera_off: String,
    pub lights_on: String,
    pub lights_off: String,
    pub shutdown_cmd: String,
}

impl Default for CommandTemplates {
    fn default() -> Self {
        Self {
            fan_on: "echo 1 > /sys/class/gpio/gpio_fan/value".to_string(),
            fan_off: "echo 0 > /sys/class/gpio/gpio_fan/value".to_string(),
            camera_on: "nohup python3 /home/camera_script.py > /dev/null 2>&1 &".to_string(),
            camera_off: "pkill -f camera_script.py".to_string(),
            lights_on: "echo 1 > /sys/class/gpio/gpio_lights/value".to_string(),
            lights_off: "echo 0 > /sys/class/gpio/gpio_lights/value".to_string(),
            shutdown_cmd: "sudo shutdown -h now".to_string(),
        }
    }
}

impl CommandTemplates {
    pub fn get(&self, key: ActionKey) -> &str {
        match key {
            ActionKey::FanOn => &self.fan_on,
            ActionKey::FanOff => &self.fan_off,
            ActionKey::CameraOn => &self.camera_on,
            ActionKey::CameraOff => &self.camera_off,
            ActionKey::LightsOn => &self.lights_on,
            ActionKey::LightsOff => &self.lights_off,
            ActionKey::Shutdown => &self.shutdown_cmd,
        }
    }

    pub fn set(&mut self, key: ActionKey, command: impl Into<String>) {
        let slot = match key {
            ActionKey::FanOn => &mut self.fan_on,
            ActionKey::FanOff => &mut self.fan_off,
            ActionKey::CameraOn => &mut self.camera_on,
            ActionKey::CameraOff => &mut self.camera_off,
            ActionKey::LightsOn => &mut self.lights_on,
            ActionKey::LightsOff => &mut self.lights_off,
            ActionKey::Shutdown => &mut self.shutdown_cmd,
        };
        *slot = command.into();
    }

    /// Copy with a single key replaced
    pub fn with(&self, key: ActionKey, command: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.set(key, command);
        next
    }

    /// Merge a loosely-typed mapping from the backend.
    ///
    /// Known keys overwrite, unknown keys are ignored and missing keys keep
    /// their current value. Returns the number of keys applied.
    pub fn merge<'a, I>(&mut self, entries: I) -> usize
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        let mut applied = 0;
        for (key, command) in entries {
            match key.parse::<ActionKey>() {
                Ok(action) => {
                    self.set(action, command.clone());
                    applied += 1;
                }
                Err(_) => tracing::debug!("Ignoring unknown command key '{}'", key),
            }
        }
        applied
    }

    pub fn iter(&self) -> impl Iterator<Item = (ActionKey, &str)> + '_ {
        ActionKey::ALL.into_iter().map(move |key| (key, self.get(key)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_connection_state_default_is_unconfigured() {
        assert_eq!(ConnectionState::default(), ConnectionState::Unconfigured);
        assert!(!ConnectionState::Unconfigured.is_configured());
        assert!(ConnectionState::Disconnected.is_configured());
        assert!(ConnectionState::Connected.is_connected());
        assert!(!ConnectionState::Connecting.is_connected());
    }

    #[test]
    fn test_peripheral_parse_and_endpoint() {
        assert_eq!("fan".parse::<Peripheral>().unwrap(), Peripheral::Fan);
        assert_eq!("Camera".parse::<Peripheral>().unwrap(), Peripheral::Camera);
        assert_eq!("light".parse::<Peripheral>().unwrap(), Peripheral::Lights);
        assert!("pump".parse::<Peripheral>().is_err());
        assert_eq!(Peripheral::Lights.endpoint(), "lights");
    }

    #[test]
    fn test_switch_parse() {
        assert_eq!("on".parse::<Switch>().unwrap(), Switch::On);
        assert_eq!("OFF".parse::<Switch>().unwrap(), Switch::Off);
        assert!("maybe".parse::<Switch>().is_err());
        assert_eq!(Switch::from(true), Switch::On);
    }

    #[test]
    fn test_peripheral_states_get_set() {
        let mut states = PeripheralStates::default();
        assert!(!states.get(Peripheral::Camera));
        states.set(Peripheral::Camera, true);
        assert!(states.get(Peripheral::Camera));
        assert!(!states.get(Peripheral::Fan));
    }

    #[test]
    fn test_configured_config_rejects_empty_fields() {
        assert!(DeviceConfig::configured("", "jetson", 22).is_err());
        assert!(DeviceConfig::configured("192.168.1.50", " ", 22).is_err());
        assert!(DeviceConfig::configured("192.168.1.50", "jetson", 0).is_err());

        let config = DeviceConfig::configured("192.168.1.50", "jetson", 22).unwrap();
        assert!(config.configured);
        assert_eq!(config.target(), "jetson@192.168.1.50:22");
    }

    #[test]
    fn test_unconfigured_config_is_empty() {
        let config = DeviceConfig::unconfigured();
        assert!(!config.configured);
        assert!(config.host.is_empty());
        assert_eq!(config.port, DEFAULT_SSH_PORT);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_password_debug_is_redacted() {
        let pw = Password::new("hunter2");
        assert!(!format!("{:?}", pw).contains("hunter2"));
        assert_eq!(pw.expose(), "hunter2");
        assert!(Password::default().is_empty());
    }

    #[test]
    fn test_action_key_wire_names() {
        let keys: Vec<&str> = ActionKey::ALL.iter().map(|k| k.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "fan_on",
                "fan_off",
                "camera_on",
                "camera_off",
                "lights_on",
                "lights_off",
                "shutdown_cmd"
            ]
        );
        assert_eq!("shutdown_cmd".parse::<ActionKey>().unwrap(), ActionKey::Shutdown);
        assert!("shutdown".parse::<ActionKey>().is_err());
    }

    #[test]
    fn test_action_key_for_toggle() {
        assert_eq!(
            ActionKey::for_toggle(Peripheral::Camera, Switch::Off),
            ActionKey::CameraOff
        );
        assert_eq!(
            ActionKey::for_toggle(Peripheral::Lights, Switch::On),
            ActionKey::LightsOn
        );
    }

    #[test]
    fn test_default_templates_cover_every_key() {
        let templates = CommandTemplates::default();
        for (key, command) in templates.iter() {
            assert!(!command.is_empty(), "{} has no default", key);
        }
        assert_eq!(templates.get(ActionKey::Shutdown), "sudo shutdown -h now");
    }

    #[test]
    fn test_merge_ignores_unknown_and_keeps_missing() {
        let mut templates = CommandTemplates::default();
        let mut incoming = HashMap::new();
        incoming.insert("fan_on".to_string(), "fanctl 1".to_string());
        incoming.insert("self_destruct".to_string(), "rm -rf /".to_string());

        let applied = templates.merge(&incoming);

        assert_eq!(applied, 1);
        assert_eq!(templates.fan_on, "fanctl 1");
        assert_eq!(templates.fan_off, CommandTemplates::default().fan_off);
    }

    #[test]
    fn test_with_replaces_single_key() {
        let base = CommandTemplates::default();
        let next = base.with(ActionKey::LightsOff, "lightsctl off");
        assert_eq!(next.lights_off, "lightsctl off");
        assert_eq!(next.lights_on, base.lights_on);
        assert_ne!(base, next);
    }

    #[test]
    fn test_templates_serialize_to_seven_wire_keys() {
        let value = serde_json::to_value(CommandTemplates::default()).unwrap();
        let map = value.as_object().unwrap();
        assert_eq!(map.len(), 7);
        for key in ActionKey::ALL {
            assert!(map.contains_key(key.as_str()));
        }
    }
}
