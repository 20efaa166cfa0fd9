//! Main-light reconciler.
//!
//! The main light sits behind a bistable relay: one pulse flips it, the
//! engine cannot drive it to a level. The only way to know the lamp state
//! is the light-presence sensor, so the controller runs a reconciliation
//! loop: poll the sensor, pulse only when it disagrees with the commanded
//! target, then go idle. A satisfied target pulses zero times; a target
//! that is already met on arrival pulses zero times too.
//!
//! The target is held until the sensor confirms it, so a mismatch keeps
//! re-pulsing at the poll cadence. Known failure mode: a dead sensor
//! (stuck level) makes the relay toggle at roughly 1 Hz until a new
//! target or Idle is commanded.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::{debug, info};

use crate::context::DeviceContext;
use crate::drivers::pin_register::PinRegister;
use crate::pins::LogicalPin;

/// Relay pulse width.
pub const PULSE: Duration = Duration::from_millis(500);

/// Commanded light level. `Idle` means no outstanding command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LightTarget {
    Idle = 0,
    On = 1,
    Off = 2,
}

impl LightTarget {
    pub fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::On,
            2 => Self::Off,
            _ => Self::Idle,
        }
    }
}

/// Whether the relay needs a pulse to bring the lamp to `target` given
/// the sensed state.
pub fn needs_pulse(target: LightTarget, lamp_on: bool) -> bool {
    match target {
        LightTarget::Idle => false,
        LightTarget::On => !lamp_on,
        LightTarget::Off => lamp_on,
    }
}

/// Main-light task body.
pub fn run(ctx: Arc<DeviceContext>, register: Arc<PinRegister>, poll: Duration) {
    info!("main light task up");

    while ctx.is_running() {
        if ctx.selftest_active() {
            thread::sleep(Duration::from_millis(500));
            continue;
        }

        let target = ctx.light_target();
        if target == LightTarget::Idle {
            thread::sleep(poll);
            continue;
        }

        // Sensor is active-low: pin low means the lamp is lit.
        let lamp_on = !register.read_debounced(LogicalPin::LightSense);
        if needs_pulse(target, lamp_on) {
            debug!("main light pulse towards {:?}", target);
            register.set_high(LogicalPin::MainLight);
            thread::sleep(PULSE);
            register.set_low(LogicalPin::MainLight);
        } else {
            // Sensor agrees, command satisfied.
            ctx.set_light_target(LightTarget::Idle);
        }
        thread::sleep(poll);
    }

    register.set_low(LogicalPin::MainLight);
}
