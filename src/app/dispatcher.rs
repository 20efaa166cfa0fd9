//! The dispatch loop.
//!
//! Owns the orchestration link and the operating-mode flags, and
//! translates inbound messages plus classified button events into
//! controller intents.  All decisions live in [`Dispatcher::handle_message`]
//! and [`Dispatcher::poll_switch`] so the test harness can drive them
//! directly; [`Dispatcher::run`] is only the connect/receive/backoff
//! shell around them.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::{debug, error, info, warn};

use crate::app::messages::{
    HardwareState, InboundMessage, OutboundMessage, SwitchCommand, ToggleState,
};
use crate::app::ports::{MessageEndpoint, SettingsStore, SystemPower};
use crate::context::DeviceContext;
use crate::control::aux::AuxTarget;
use crate::control::curtain::{self, CurtainTarget, Direction};
use crate::control::main_light::LightTarget;
use crate::drivers::button::SwitchEvent;
use crate::drivers::pin_register::PinRegister;
use crate::drivers::status_led::SignalState;
use crate::error::Result;
use crate::pins::LogicalPin;

/// Width of the shutdown-acknowledge pulse to the power board.
const SHUTDOWN_ACK_PULSE: Duration = Duration::from_millis(500);
/// Receive window per loop iteration; bounds switch-event latency.
const RECV_WINDOW: Duration = Duration::from_millis(100);

/// What to do after handling a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// A shutdown or reset was issued; leave the loop.
    Terminate,
}

pub struct Dispatcher<E, P, S> {
    ctx: Arc<DeviceContext>,
    register: Arc<PinRegister>,
    endpoint: E,
    power: P,
    settings: S,
    reconnect_backoff: Duration,
    /// Lamp state sampled when the eclipse started, restored on leave.
    light_was_on: bool,
}

impl<E, P, S> Dispatcher<E, P, S>
where
    E: MessageEndpoint,
    P: SystemPower,
    S: SettingsStore,
{
    pub fn new(
        ctx: Arc<DeviceContext>,
        register: Arc<PinRegister>,
        endpoint: E,
        power: P,
        settings: S,
        reconnect_backoff: Duration,
    ) -> Self {
        Self {
            ctx,
            register,
            endpoint,
            power,
            settings,
            reconnect_backoff,
            light_was_on: false,
        }
    }

    /// Connect, announce, then translate messages and button events
    /// until a terminal command or an engine stop.  Transport failures
    /// restart the whole loop after a fixed backoff, forever.
    pub fn run(&mut self) -> Result<()> {
        while self.ctx.is_running() {
            if let Err(e) = self.connect_and_announce() {
                warn!("endpoint connect failed: {e}, retrying");
                thread::sleep(self.reconnect_backoff);
                continue;
            }
            info!("orchestration link up");

            loop {
                if !self.ctx.is_running() {
                    return Ok(());
                }
                if let Err(e) = self.poll_switch() {
                    warn!("forwarding button event failed: {e}");
                    break;
                }
                match self.endpoint.recv_timeout(RECV_WINDOW) {
                    Ok(Some(message)) => match self.handle_message(message)? {
                        Flow::Continue => {}
                        Flow::Terminate => return Ok(()),
                    },
                    Ok(None) => {}
                    Err(e) => {
                        warn!("orchestration link lost: {e}");
                        break;
                    }
                }
            }
            thread::sleep(self.reconnect_backoff);
        }
        Ok(())
    }

    fn connect_and_announce(&mut self) -> Result<()> {
        self.endpoint.connect()?;
        self.endpoint.send(&OutboundMessage::GetHardwareState)?;
        Ok(())
    }

    /// Forward a pending button event to the orchestration system.
    pub fn poll_switch(&mut self) -> Result<()> {
        if let Some(event) = self.ctx.take_switch_event() {
            let outbound = match event {
                SwitchEvent::ShortPress => OutboundMessage::ToggleStandbyMode,
                SwitchEvent::LongPress => OutboundMessage::HardwareShutdown,
            };
            info!("button {:?} -> {:?}", event, outbound);
            self.endpoint.send(&outbound)?;
        }
        Ok(())
    }

    /// Translate one inbound message into controller intents.
    pub fn handle_message(&mut self, message: InboundMessage) -> Result<Flow> {
        debug!("inbound: {:?}", message);
        match message {
            InboundMessage::HardwareStateChanged(state) => {
                self.apply_hardware_state(state);
                Ok(Flow::Continue)
            }
            InboundMessage::ClientShutdown => {
                info!("shutdown command, halting");
                self.acknowledge_shutdown();
                self.persist_position()?;
                self.power.shutdown()?;
                Ok(Flow::Terminate)
            }
            InboundMessage::ClientReset => {
                info!("reset command, rebooting");
                self.persist_position()?;
                self.power.reboot()?;
                Ok(Flow::Terminate)
            }
            InboundMessage::ClientSelfTest => {
                info!("self-test requested");
                self.ctx.set_selftest(true);
                Ok(Flow::Continue)
            }
            InboundMessage::SetAmbience {
                curtain_up,
                main_light_on,
            } => {
                self.apply_ambience(curtain_up, main_light_on);
                Ok(Flow::Continue)
            }
            InboundMessage::SetEnvironment {
                thunder_storm,
                aux1,
                aux2,
                aux3,
            } => {
                self.apply_environment(thunder_storm, [aux1, aux2, aux3]);
                Ok(Flow::Continue)
            }
            InboundMessage::CurtainToggle { up } => {
                self.apply_curtain_toggle(up);
                Ok(Flow::Continue)
            }
            InboundMessage::GlobalTimerTick => {
                debug!("global timer tick");
                Ok(Flow::Continue)
            }
        }
    }

    fn apply_hardware_state(&mut self, state: HardwareState) {
        self.ctx.set_standby(state == HardwareState::Standby);
        match state {
            HardwareState::Error => {
                self.ctx.set_status(SignalState::Error);
            }
            HardwareState::Standby => {
                self.ctx.set_status(SignalState::Standby);
            }
            HardwareState::EmergencyStop => {
                self.ctx.set_emergency(true);
                if self.ctx.automatic() {
                    // The layout froze mid-eclipse; give the operator light.
                    self.ctx.set_light_target(LightTarget::On);
                }
                self.ctx.set_status(SignalState::EmergencyStop);
            }
            HardwareState::Manual => {
                self.ctx.set_emergency(false);
                if self.ctx.automatic() {
                    self.leave_eclipse();
                }
                self.ctx.set_automatic(false);
                self.ctx.set_status(SignalState::Manual);
            }
            HardwareState::Automatic => {
                self.ctx.set_emergency(false);
                if !self.ctx.automatic() {
                    self.enter_eclipse();
                }
                self.ctx.set_automatic(true);
                self.ctx.set_status(SignalState::Automatic);
            }
        }
    }

    fn enter_eclipse(&mut self) {
        // Sensor is active-low: pin low means the lamp is lit.
        self.light_was_on = !self.register.read_debounced(LogicalPin::LightSense);
        self.ctx.set_curtain_target(CurtainTarget::Eclipse);
        self.ctx.set_light_target(LightTarget::Off);
    }

    fn leave_eclipse(&mut self) {
        self.ctx.set_curtain_target(CurtainTarget::Open);
        if self.light_was_on {
            self.ctx.set_light_target(LightTarget::On);
        }
    }

    fn apply_ambience(&mut self, curtain_up: ToggleState, main_light_on: ToggleState) {
        if self.ctx.automatic() {
            warn!("setAmbience rejected: automatic mode owns the ambience");
            return;
        }
        match curtain_up {
            ToggleState::On => self.ctx.set_curtain_target(CurtainTarget::Open),
            ToggleState::Off => self.ctx.set_curtain_target(CurtainTarget::Eclipse),
            ToggleState::Unset => {}
        }
        match main_light_on {
            ToggleState::On => self.ctx.set_light_target(LightTarget::On),
            ToggleState::Off => self.ctx.set_light_target(LightTarget::Off),
            ToggleState::Unset => {}
        }
    }

    fn apply_environment(&mut self, thunder_storm: SwitchCommand, aux: [SwitchCommand; 3]) {
        match thunder_storm {
            SwitchCommand::On | SwitchCommand::Auto => self.ctx.set_storm_enabled(true),
            SwitchCommand::Off => self.ctx.set_storm_enabled(false),
            SwitchCommand::Trigger => self.ctx.set_storm_trigger(),
        }
        for (channel, command) in aux.into_iter().enumerate() {
            match command {
                SwitchCommand::On | SwitchCommand::Auto => {
                    self.ctx.set_aux_target(channel, AuxTarget::On);
                }
                SwitchCommand::Off => self.ctx.set_aux_target(channel, AuxTarget::Off),
                SwitchCommand::Trigger => self.ctx.set_aux_trigger(channel),
            }
        }
    }

    fn apply_curtain_toggle(&mut self, up: bool) {
        let dir = if up { Direction::Up } else { Direction::Down };
        match curtain::toggle(self.ctx.curtain_target(), dir, self.ctx.automatic()) {
            Some(next) => self.ctx.set_curtain_target(next),
            None => warn!("curtain toggle rejected: automatic mode owns the curtain"),
        }
    }

    fn acknowledge_shutdown(&self) {
        self.register.set_high(LogicalPin::Shutdown);
        thread::sleep(SHUTDOWN_ACK_PULSE);
        self.register.set_low(LogicalPin::Shutdown);
    }

    fn persist_position(&mut self) -> Result<()> {
        let position = self.ctx.curtain_position();
        if let Err(e) = self.settings.set_curtain_position(position) {
            // Losing one position integer is not worth blocking a
            // shutdown over.
            error!("persisting curtain position failed: {e}");
        }
        Ok(())
    }

    /// Persist state at engine shutdown (SIGINT path).
    pub fn persist_on_exit(&mut self) -> Result<()> {
        self.persist_position()
    }
}
