//! Full operator sessions against the mock relay

use std::time::Duration;

use jetctl_app::{EngineEvent, Message, Screen};
use jetctl_core::{
    ActionKey, AppPhase, CommandTemplates, ConnectionState, Password, Peripheral, Switch,
};

use super::mock_backend::{MockBackend, BAD_PASSWORD};
use crate::{pump_for, pump_until, start_engine};

const WAIT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn test_unconfigured_startup_then_save_and_connect() {
    let mock = MockBackend::new();
    let mut engine = start_engine(&mock).await;

    pump_until(&mut engine, WAIT, |s| {
        s.phase == AppPhase::Running && s.commands.loaded && s.backend_health.is_some()
    })
    .await;
    assert_eq!(engine.state.connection, ConnectionState::Unconfigured);
    assert_eq!(engine.state.screen, Screen::Configuration);
    assert!(!engine.is_polling());

    engine.process_message(Message::SaveConfiguration {
        host: "192.168.1.50".into(),
        username: "nvidia".into(),
        password: Password::new("jetson"),
        port: 22,
    });
    pump_until(&mut engine, WAIT, |s| !s.config.saving).await;

    assert_eq!(engine.state.connection, ConnectionState::Disconnected);
    assert_eq!(engine.state.screen, Screen::Dashboard);
    assert!(engine.is_polling());
    assert_eq!(
        mock.state().config.as_ref().map(|c| c.3.clone()).as_deref(),
        Some("jetson")
    );

    engine.process_message(Message::Connect);
    pump_until(&mut engine, WAIT, |s| {
        s.connection == ConnectionState::Connected
    })
    .await;
    assert_eq!(
        engine.state.log.latest().unwrap().message,
        "Connected to nvidia@192.168.1.50:22"
    );
}

#[tokio::test]
async fn test_bad_credentials_surface_backend_detail() {
    let mock = MockBackend::with_config("192.168.1.50", "nvidia", 22, BAD_PASSWORD);
    let mut engine = start_engine(&mock).await;
    let mut events = engine.subscribe();

    pump_until(&mut engine, WAIT, |s| s.connection == ConnectionState::Disconnected).await;
    engine.process_message(Message::Connect);
    pump_until(&mut engine, WAIT, |s| s.connection != ConnectionState::Connecting).await;

    assert_eq!(engine.state.connection, ConnectionState::Disconnected);
    let mut saw_detail = false;
    while let Ok(event) = events.try_recv() {
        if let EngineEvent::Notice(notice) = event {
            saw_detail |= notice.message == "Authentication failed. Check username/password.";
        }
    }
    assert!(saw_detail);
}

#[tokio::test]
async fn test_toggle_without_echo_logs_cached_template() {
    let mock = MockBackend::with_config("192.168.1.50", "nvidia", 22, "jetson");
    let mut engine = start_engine(&mock).await;
    pump_until(&mut engine, WAIT, |s| s.connection == ConnectionState::Disconnected).await;
    engine.process_message(Message::Connect);
    pump_until(&mut engine, WAIT, |s| s.connection == ConnectionState::Connected).await;

    engine.process_message(Message::Toggle {
        peripheral: Peripheral::Fan,
        switch: Switch::On,
    });
    pump_until(&mut engine, WAIT, |s| s.peripherals.get(Peripheral::Fan)).await;

    assert_eq!(
        engine.state.log.latest().unwrap().message,
        format!(
            "fan on: {}",
            CommandTemplates::default().get(ActionKey::FanOn)
        )
    );
    assert_eq!(
        mock.state().toggles,
        vec![("fan".to_string(), "on".to_string())]
    );
}

#[tokio::test]
async fn test_shutdown_confirm_disconnects() {
    let mock = MockBackend::with_config("192.168.1.50", "nvidia", 22, "jetson");
    let mut engine = start_engine(&mock).await;
    pump_until(&mut engine, WAIT, |s| s.connection == ConnectionState::Disconnected).await;
    engine.process_message(Message::Connect);
    pump_until(&mut engine, WAIT, |s| s.connection == ConnectionState::Connected).await;

    engine.process_message(Message::RequestShutdown);
    assert_eq!(mock.state().shutdowns, 0);
    engine.process_message(Message::ConfirmShutdown);
    pump_until(&mut engine, WAIT, |s| s.connection == ConnectionState::Disconnected).await;

    assert_eq!(mock.state().shutdowns, 1);
    assert_eq!(
        engine.state.log.latest().unwrap().message,
        "Shutdown: sudo shutdown -h now"
    );
}

#[tokio::test]
async fn test_poll_detects_relay_dropping_session() {
    let mock = MockBackend::with_config("192.168.1.50", "nvidia", 22, "jetson");
    let mut engine = start_engine(&mock).await;
    pump_until(&mut engine, WAIT, |s| s.connection == ConnectionState::Disconnected).await;
    engine.process_message(Message::Connect);
    pump_until(&mut engine, WAIT, |s| s.connection == ConnectionState::Connected).await;

    mock.state().connected = false;
    pump_until(&mut engine, WAIT, |s| s.connection == ConnectionState::Disconnected).await;

    assert_eq!(
        engine.state.log.latest().unwrap().message,
        "Connection to device lost"
    );
}

#[tokio::test]
async fn test_template_edit_and_remote_history() {
    let mock = MockBackend::with_config("192.168.1.50", "nvidia", 22, "jetson");
    let mut engine = start_engine(&mock).await;
    pump_until(&mut engine, WAIT, |s| {
        s.commands.loaded && s.connection == ConnectionState::Disconnected
    })
    .await;

    engine.process_message(Message::EditCommandTemplate {
        key: ActionKey::LightsOn,
        command: "lightctl 1".into(),
    });
    pump_until(&mut engine, WAIT, |s| !s.commands.saving).await;
    assert_eq!(engine.state.commands.get(ActionKey::LightsOn), "lightctl 1");
    assert_eq!(
        mock.state().commands.get("lights_on").map(String::as_str),
        Some("lightctl 1")
    );
    assert_eq!(mock.state().commands.len(), 7);

    engine.process_message(Message::Connect);
    pump_until(&mut engine, WAIT, |s| s.connection == ConnectionState::Connected).await;
    engine.process_message(Message::ExecuteCommand {
        command: "uptime".into(),
    });
    pump_until(&mut engine, WAIT, |s| {
        s.log.latest().is_some_and(|e| e.message == "$ uptime: ok")
    })
    .await;

    engine.process_message(Message::FetchRemoteHistory { limit: Some(5) });
    pump_until(&mut engine, WAIT, |s| s.remote_history_version > 0).await;
    assert_eq!(engine.state.remote_history[0].command, "uptime");

    pump_for(&mut engine, Duration::from_millis(100)).await;
    engine.shutdown();
    assert!(!engine.is_polling());
}
