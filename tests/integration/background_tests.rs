//! Gas poll, health poll and display rotation, stepped by hand and on
//! their scheduler threads.

use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

use hangar_heater::app::ports::{BatteryCondition, GasReading, LightReading};
use hangar_heater::config::SystemConfig;
use hangar_heater::events::GasSensorEvent;
use hangar_heater::scheduler::Panel;

use crate::mock_hw::{DisplayCall, Rig};

fn text(s: &str) -> DisplayCall {
    DisplayCall::Text(s.to_string())
}

fn write(row: u8, col: u8, s: &str) -> DisplayCall {
    DisplayCall::Write {
        row,
        col,
        text: s.to_string(),
    }
}

// ── Gas poll ──────────────────────────────────────────────────

#[test]
fn gas_poll_without_sensor_queues_nothing() {
    let rig = Rig::new();
    let poll = rig.orchestrator.gas_poll();

    assert_eq!(poll.run_once().unwrap(), None);
    assert!(rig.orchestrator.gas_queue().is_empty());
}

#[test]
fn gas_poll_classifies_readings() {
    let mut rig = Rig::new();
    let poll = rig.orchestrator.gas_poll();

    *rig.sensors.gas.lock().unwrap() = Some(GasReading {
        value: 350.0,
        detected: true,
    });
    assert_eq!(
        poll.run_once().unwrap(),
        Some(GasSensorEvent::Detected(350.0))
    );

    *rig.sensors.gas.lock().unwrap() = Some(GasReading {
        value: 20.0,
        detected: false,
    });
    assert_eq!(poll.run_once().unwrap(), Some(GasSensorEvent::Clear(20.0)));
    assert_eq!(rig.orchestrator.gas_queue().len(), 2);

    // Both events reach the monitor on the next main-loop cycle.
    rig.orchestrator.run_cycle();
    assert!(!rig.orchestrator.gas_flag().is_detected());
    assert_eq!(rig.sink.broadcasts().len(), 2);
    assert!(rig.orchestrator.gas_queue().is_empty());
}

// ── Health poll ───────────────────────────────────────────────

#[test]
fn health_poll_quiet_when_battery_ok() {
    let rig = Rig::new();
    assert!(!rig.orchestrator.health_poll().run_once().unwrap());
    assert!(rig.sink.broadcasts().is_empty());
}

#[test]
fn health_poll_warns_on_low_battery() {
    let rig = Rig::new();
    *rig.modem.battery.lock().unwrap() = BatteryCondition {
        percent: 9,
        voltage_mv: 3400,
        is_ok: false,
    };

    assert!(rig.orchestrator.health_poll().run_once().unwrap());
    assert_eq!(
        rig.sink.broadcasts(),
        vec!["WARNING: LOW BATTERY for modem. Currently 9%"]
    );
}

// ── Display rotation ──────────────────────────────────────────

#[test]
fn rotation_walks_every_panel_and_wraps() {
    let rig = Rig::new();
    *rig.sensors.light.lock().unwrap() = Some(LightReading { lux: 45.0 });
    *rig.sensors.temperature.lock().unwrap() = Some(38.5);
    let mut rotation = rig.orchestrator.display_rotation();

    for _ in 0..Panel::ROTATION.len() {
        rotation.refresh();
    }
    assert_eq!(rotation.index(), 0);

    assert_eq!(
        rig.display.take(),
        vec![
            DisplayCall::Clear,
            text("CSQ:17 Good\nBAT:87% V:4.1"),
            DisplayCall::Clear,
            text("Heater is OFF."),
            DisplayCall::Clear,
            text("Gas sensor NOT enabled."),
            DisplayCall::Clear,
            text("45 LUX of light.\nHangar is dim."),
            DisplayCall::Clear,
            text("TEMP: 38.5F"),
            DisplayCall::Clear,
            write(0, 0, "UPTIME:"),
            write(1, 0, "0d 01h 02m 05s"),
        ]
    );

    rotation.refresh();
    assert_eq!(rotation.index(), 1);
    assert_eq!(
        rig.display.take(),
        vec![DisplayCall::Clear, text("CSQ:17 Good\nBAT:87% V:4.1")]
    );
}

#[test]
fn failed_panel_shows_error_and_rotation_continues() {
    let rig = Rig::new();
    rig.sensors.fail_light.store(true, Ordering::SeqCst);
    let mut rotation = rig.orchestrator.display_rotation();

    for _ in 0..3 {
        rotation.refresh();
    }
    rig.display.take();

    rotation.refresh();
    assert_eq!(
        rig.display.take(),
        vec![DisplayCall::Clear, write(0, 0, "ERROR: PANEL=3")]
    );

    rotation.refresh();
    assert_eq!(rotation.index(), 5);
    assert_eq!(
        rig.display.take(),
        vec![DisplayCall::Clear, text("Temp probe not enabled.")]
    );
}

#[test]
fn rotation_stops_after_power_command() {
    let mut rig = Rig::new();
    let mut rotation = rig.orchestrator.display_rotation();
    rig.sms(1, "quit", 0);

    rig.orchestrator.run_cycle();
    assert!(rig.orchestrator.is_display_frozen());
    assert_eq!(rig.display.take(), vec![text("Quitting")]);

    rotation.refresh();
    rotation.refresh();
    assert!(rig.display.calls().is_empty());
    assert_eq!(rotation.index(), 0);
}

#[test]
fn display_failure_falls_back_to_error_panel() {
    let rig = Rig::new();
    rig.display.fail.store(true, Ordering::SeqCst);
    let mut rotation = rig.orchestrator.display_rotation();

    rotation.refresh();
    rotation.refresh();

    assert_eq!(rotation.index(), 2);
    assert_eq!(
        rig.display.take(),
        vec![
            DisplayCall::Clear,
            write(0, 0, "ERROR: PANEL=0"),
            DisplayCall::Clear,
            write(0, 0, "ERROR: PANEL=1"),
        ]
    );
}

// ── Scheduler threads ─────────────────────────────────────────

#[test]
fn scheduler_threads_feed_the_main_loop_and_stop() {
    let mut rig = Rig::with_config(SystemConfig {
        gas_poll_interval_secs: 1,
        health_poll_interval_secs: 1,
        display_refresh_interval_secs: 1,
        ..Rig::config()
    });
    *rig.sensors.gas.lock().unwrap() = Some(GasReading {
        value: 380.0,
        detected: true,
    });

    let scheduler = rig.orchestrator.start_background();

    let deadline = Instant::now() + Duration::from_secs(10);
    while (rig.orchestrator.gas_queue().is_empty() || rig.display.calls().is_empty())
        && Instant::now() < deadline
    {
        std::thread::sleep(Duration::from_millis(20));
    }
    assert!(!rig.orchestrator.gas_queue().is_empty());
    assert!(!rig.display.calls().is_empty());

    rig.orchestrator.run_cycle();
    assert!(rig.orchestrator.gas_flag().is_detected());
    assert!(rig.relay.offs() >= 1);
    assert!(rig.sink.broadcasts()[0].starts_with("WARNING! GAS DETECTED! Level=380"));

    let stopping = Instant::now();
    scheduler.stop();
    assert!(stopping.elapsed() < Duration::from_secs(2));
}
