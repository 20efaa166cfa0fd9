//! Integration tests for the dispatcher → context → controller-intent
//! pipeline.
//!
//! These run on the host against the in-memory GPIO backend and mock
//! ports; no real hardware required.  Controller task loops are not
//! spawned here, the assertions read the intents the tasks would
//! consume.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use enviroctl::app::dispatcher::{Dispatcher, Flow};
use enviroctl::app::messages::{
    HardwareState, InboundMessage, OutboundMessage, SwitchCommand, ToggleState,
};
use enviroctl::app::ports::{
    EndpointError, MessageEndpoint, PowerError, SettingsError, SettingsStore, SystemPower,
};
use enviroctl::config::EngineConfig;
use enviroctl::context::DeviceContext;
use enviroctl::control::aux::AuxTarget;
use enviroctl::control::curtain::CurtainTarget;
use enviroctl::control::main_light::LightTarget;
use enviroctl::drivers::button::{PressClassifier, SwitchEvent};
use enviroctl::drivers::gpio::{GpioBackend, MemoryGpio};
use enviroctl::drivers::pin_register::PinRegister;
use enviroctl::drivers::status_led::SignalState;
use enviroctl::pins::LogicalPin;

// ── Mock ports ────────────────────────────────────────────────

/// Endpoint with a scripted inbound queue; records everything sent.
#[derive(Clone, Default)]
struct MockEndpoint {
    inbound: Arc<Mutex<VecDeque<InboundMessage>>>,
    sent: Arc<Mutex<Vec<OutboundMessage>>>,
}

impl MockEndpoint {
    fn push_inbound(&self, message: InboundMessage) {
        self.inbound.lock().unwrap().push_back(message);
    }

    fn sent(&self) -> Vec<OutboundMessage> {
        self.sent.lock().unwrap().clone()
    }
}

impl MessageEndpoint for MockEndpoint {
    fn connect(&mut self) -> Result<(), EndpointError> {
        Ok(())
    }

    fn send(&mut self, message: &OutboundMessage) -> Result<(), EndpointError> {
        self.sent.lock().unwrap().push(*message);
        Ok(())
    }

    fn recv_timeout(
        &mut self,
        _timeout: Duration,
    ) -> Result<Option<InboundMessage>, EndpointError> {
        Ok(self.inbound.lock().unwrap().pop_front())
    }
}

#[derive(Clone, Default)]
struct MockPower {
    shutdowns: Arc<Mutex<u32>>,
    reboots: Arc<Mutex<u32>>,
}

impl SystemPower for MockPower {
    fn shutdown(&self) -> Result<(), PowerError> {
        *self.shutdowns.lock().unwrap() += 1;
        Ok(())
    }

    fn reboot(&self) -> Result<(), PowerError> {
        *self.reboots.lock().unwrap() += 1;
        Ok(())
    }
}

#[derive(Clone, Default)]
struct MockSettings {
    stored: Arc<Mutex<Vec<i32>>>,
}

impl SettingsStore for MockSettings {
    fn curtain_position(&self) -> Result<i32, SettingsError> {
        Ok(self.stored.lock().unwrap().last().copied().unwrap_or(0))
    }

    fn set_curtain_position(&mut self, position: i32) -> Result<(), SettingsError> {
        self.stored.lock().unwrap().push(position);
        Ok(())
    }
}

// ── Harness ───────────────────────────────────────────────────

struct Harness {
    ctx: Arc<DeviceContext>,
    gpio: Arc<MemoryGpio>,
    endpoint: MockEndpoint,
    power: MockPower,
    settings: MockSettings,
    dispatcher: Dispatcher<MockEndpoint, MockPower, MockSettings>,
}

fn make_engine() -> Harness {
    let gpio = Arc::new(MemoryGpio::new());
    let backend: Box<dyn GpioBackend> = Box::new(Arc::clone(&gpio));
    let register = Arc::new(PinRegister::new(backend));
    let ctx = Arc::new(DeviceContext::new(0));

    let endpoint = MockEndpoint::default();
    let power = MockPower::default();
    let settings = MockSettings::default();
    let dispatcher = Dispatcher::new(
        Arc::clone(&ctx),
        register,
        endpoint.clone(),
        power.clone(),
        settings.clone(),
        EngineConfig::default().reconnect_backoff,
    );

    Harness {
        ctx,
        gpio,
        endpoint,
        power,
        settings,
        dispatcher,
    }
}

fn hw(state: HardwareState) -> InboundMessage {
    InboundMessage::HardwareStateChanged(state)
}

// ── Automatic / eclipse sequence ──────────────────────────────

#[test]
fn automatic_message_starts_the_eclipse() {
    let mut h = make_engine();
    assert!(!h.ctx.standby());

    let flow = h.dispatcher.handle_message(hw(HardwareState::Automatic)).unwrap();

    assert_eq!(flow, Flow::Continue);
    assert_eq!(h.ctx.curtain_target(), CurtainTarget::Eclipse);
    assert_eq!(h.ctx.light_target(), LightTarget::Off);
    assert_eq!(h.ctx.status(), SignalState::Automatic);
    assert!(h.ctx.automatic());
}

#[test]
fn leaving_automatic_restores_the_lit_lamp() {
    let mut h = make_engine();
    // Sensor active-low: lamp is lit when the eclipse starts.
    h.gpio.set_level(LogicalPin::LightSense, false);

    h.dispatcher.handle_message(hw(HardwareState::Automatic)).unwrap();
    assert_eq!(h.ctx.light_target(), LightTarget::Off);

    h.dispatcher.handle_message(hw(HardwareState::Manual)).unwrap();

    assert_eq!(h.ctx.curtain_target(), CurtainTarget::Open);
    assert_eq!(h.ctx.light_target(), LightTarget::On);
    assert_eq!(h.ctx.status(), SignalState::Manual);
    assert!(!h.ctx.automatic());
}

#[test]
fn leaving_automatic_keeps_a_dark_lamp_dark() {
    let mut h = make_engine();
    // Lamp off when the eclipse starts (sensor pin high).
    h.dispatcher.handle_message(hw(HardwareState::Automatic)).unwrap();
    h.dispatcher.handle_message(hw(HardwareState::Manual)).unwrap();

    assert_eq!(h.ctx.curtain_target(), CurtainTarget::Open);
    assert_eq!(h.ctx.light_target(), LightTarget::Off);
}

#[test]
fn emergency_stop_during_automatic_forces_light_on() {
    let mut h = make_engine();
    h.dispatcher.handle_message(hw(HardwareState::Automatic)).unwrap();

    h.dispatcher.handle_message(hw(HardwareState::EmergencyStop)).unwrap();

    assert_eq!(h.ctx.light_target(), LightTarget::On);
    assert_eq!(h.ctx.status(), SignalState::EmergencyStop);
    assert!(h.ctx.emergency());
}

#[test]
fn emergency_stop_in_manual_leaves_light_alone() {
    let mut h = make_engine();
    h.dispatcher.handle_message(hw(HardwareState::EmergencyStop)).unwrap();

    assert_eq!(h.ctx.light_target(), LightTarget::Idle);
    assert_eq!(h.ctx.status(), SignalState::EmergencyStop);
}

#[test]
fn standby_message_sets_flag_and_status() {
    let mut h = make_engine();
    h.dispatcher.handle_message(hw(HardwareState::Standby)).unwrap();
    assert!(h.ctx.standby());
    assert_eq!(h.ctx.status(), SignalState::Standby);

    h.dispatcher.handle_message(hw(HardwareState::Manual)).unwrap();
    assert!(!h.ctx.standby());
}

// ── Ambience commands ─────────────────────────────────────────

#[test]
fn ambience_rejected_while_automatic() {
    let mut h = make_engine();
    h.dispatcher.handle_message(hw(HardwareState::Automatic)).unwrap();
    let light_before = h.ctx.light_target();
    let curtain_before = h.ctx.curtain_target();

    h.dispatcher
        .handle_message(InboundMessage::SetAmbience {
            curtain_up: ToggleState::On,
            main_light_on: ToggleState::On,
        })
        .unwrap();

    assert_eq!(h.ctx.light_target(), light_before);
    assert_eq!(h.ctx.curtain_target(), curtain_before);
}

#[test]
fn ambience_applies_in_manual_mode() {
    let mut h = make_engine();

    h.dispatcher
        .handle_message(InboundMessage::SetAmbience {
            curtain_up: ToggleState::Off,
            main_light_on: ToggleState::On,
        })
        .unwrap();

    assert_eq!(h.ctx.curtain_target(), CurtainTarget::Eclipse);
    assert_eq!(h.ctx.light_target(), LightTarget::On);
}

#[test]
fn ambience_unset_fields_change_nothing() {
    let mut h = make_engine();
    h.dispatcher
        .handle_message(InboundMessage::SetAmbience {
            curtain_up: ToggleState::Unset,
            main_light_on: ToggleState::Unset,
        })
        .unwrap();

    assert_eq!(h.ctx.curtain_target(), CurtainTarget::Stop);
    assert_eq!(h.ctx.light_target(), LightTarget::Idle);
}

// ── Environment commands ──────────────────────────────────────

fn environment(
    thunder_storm: SwitchCommand,
    aux1: SwitchCommand,
    aux2: SwitchCommand,
    aux3: SwitchCommand,
) -> InboundMessage {
    InboundMessage::SetEnvironment {
        thunder_storm,
        aux1,
        aux2,
        aux3,
    }
}

#[test]
fn environment_switches_the_storm_on_and_off() {
    let mut h = make_engine();
    assert!(!h.ctx.storm_enabled());

    h.dispatcher
        .handle_message(environment(
            SwitchCommand::On,
            SwitchCommand::Off,
            SwitchCommand::Off,
            SwitchCommand::Off,
        ))
        .unwrap();
    assert!(h.ctx.storm_enabled());

    h.dispatcher
        .handle_message(environment(
            SwitchCommand::Off,
            SwitchCommand::Off,
            SwitchCommand::Off,
            SwitchCommand::Off,
        ))
        .unwrap();
    assert!(!h.ctx.storm_enabled());
}

#[test]
fn environment_trigger_fires_one_storm_strike() {
    let mut h = make_engine();
    h.dispatcher
        .handle_message(environment(
            SwitchCommand::Trigger,
            SwitchCommand::Off,
            SwitchCommand::Off,
            SwitchCommand::Off,
        ))
        .unwrap();

    assert!(!h.ctx.storm_enabled(), "trigger must not latch the storm");
    assert!(h.ctx.take_storm_trigger());
    assert!(!h.ctx.take_storm_trigger(), "trigger is one-shot");
}

#[test]
fn environment_drives_each_aux_channel() {
    let mut h = make_engine();
    h.dispatcher
        .handle_message(environment(
            SwitchCommand::Off,
            SwitchCommand::Trigger,
            SwitchCommand::On,
            SwitchCommand::Auto,
        ))
        .unwrap();

    assert!(h.ctx.aux_trigger(0));
    assert_eq!(h.ctx.aux_target(1), AuxTarget::On);
    // Auto defers to a layout clock this unit does not have; it reads On.
    assert_eq!(h.ctx.aux_target(2), AuxTarget::On);
}

// ── Manual curtain toggle ─────────────────────────────────────

#[test]
fn curtain_toggle_starts_then_stops_a_manual_run() {
    let mut h = make_engine();

    h.dispatcher
        .handle_message(InboundMessage::CurtainToggle { up: true })
        .unwrap();
    assert_eq!(h.ctx.curtain_target(), CurtainTarget::ManualUp);

    h.dispatcher
        .handle_message(InboundMessage::CurtainToggle { up: true })
        .unwrap();
    assert_eq!(h.ctx.curtain_target(), CurtainTarget::Stop);
}

#[test]
fn curtain_toggle_rejected_while_automatic() {
    let mut h = make_engine();
    h.dispatcher.handle_message(hw(HardwareState::Automatic)).unwrap();
    assert_eq!(h.ctx.curtain_target(), CurtainTarget::Eclipse);

    h.dispatcher
        .handle_message(InboundMessage::CurtainToggle { up: true })
        .unwrap();
    assert_eq!(h.ctx.curtain_target(), CurtainTarget::Eclipse);
}

// ── Button events ─────────────────────────────────────────────

#[test]
fn long_hold_yields_exactly_one_shutdown_command() {
    let mut h = make_engine();

    // A 2000 ms hold at the 5 ms poll cadence is 400 pressed ticks.
    let mut classifier = PressClassifier::new();
    let mut events = Vec::new();
    for _ in 0..400 {
        events.extend(classifier.tick(true));
    }
    events.extend(classifier.tick(false));
    assert_eq!(events, vec![SwitchEvent::LongPress]);

    h.ctx.offer_switch_event(events[0]);
    h.dispatcher.poll_switch().unwrap();
    // Event was consumed; a second poll must not resend.
    h.dispatcher.poll_switch().unwrap();

    assert_eq!(h.endpoint.sent(), vec![OutboundMessage::HardwareShutdown]);
}

#[test]
fn short_press_toggles_standby() {
    let mut h = make_engine();
    h.ctx.offer_switch_event(SwitchEvent::ShortPress);
    h.dispatcher.poll_switch().unwrap();
    assert_eq!(h.endpoint.sent(), vec![OutboundMessage::ToggleStandbyMode]);
}

// ── Terminal commands ─────────────────────────────────────────

#[test]
fn client_shutdown_is_terminal_and_persists() {
    let mut h = make_engine();
    h.ctx.set_curtain_position(48);

    let flow = h.dispatcher.handle_message(InboundMessage::ClientShutdown).unwrap();

    assert_eq!(flow, Flow::Terminate);
    assert_eq!(*h.power.shutdowns.lock().unwrap(), 1);
    assert_eq!(h.settings.stored.lock().unwrap().as_slice(), &[48]);
    // Acknowledge pulse finished low.
    assert!(!h.gpio.level(LogicalPin::Shutdown));
}

#[test]
fn client_reset_is_terminal_and_reboots() {
    let mut h = make_engine();
    let flow = h.dispatcher.handle_message(InboundMessage::ClientReset).unwrap();

    assert_eq!(flow, Flow::Terminate);
    assert_eq!(*h.power.reboots.lock().unwrap(), 1);
    assert_eq!(*h.power.shutdowns.lock().unwrap(), 0);
    assert_eq!(h.settings.stored.lock().unwrap().len(), 1);
}

#[test]
fn self_test_command_raises_the_flag() {
    let mut h = make_engine();
    assert!(!h.ctx.selftest_active());
    h.dispatcher.handle_message(InboundMessage::ClientSelfTest).unwrap();
    assert!(h.ctx.selftest_active());
}

#[test]
fn timer_tick_is_accepted_and_ignored() {
    let mut h = make_engine();
    let flow = h.dispatcher.handle_message(InboundMessage::GlobalTimerTick).unwrap();
    assert_eq!(flow, Flow::Continue);
    assert_eq!(h.ctx.curtain_target(), CurtainTarget::Stop);
}

// ── Full loop ─────────────────────────────────────────────────

#[test]
fn run_announces_then_processes_until_terminal() {
    let mut h = make_engine();
    h.endpoint.push_inbound(hw(HardwareState::Automatic));
    h.endpoint.push_inbound(InboundMessage::ClientShutdown);

    h.dispatcher.run().unwrap();

    let sent = h.endpoint.sent();
    assert_eq!(sent.first(), Some(&OutboundMessage::GetHardwareState));
    assert_eq!(h.ctx.status(), SignalState::Automatic);
    assert_eq!(*h.power.shutdowns.lock().unwrap(), 1);
}
