//! Auxiliary relay channels.
//!
//! Three independent relays for layout extras (smoke generator, water
//! pump, spare). Each channel runs the same four-state machine: `On` and
//! `Off` drive the relay to a level and settle into the matching park
//! state, the park states hold that level, and a one-shot trigger fires a
//! 500 ms pulse. The trigger is legal only from `OffIdle`; firing it
//! anywhere else is consumed silently as a no-op. The split keeps "hold"
//! commands apart from momentary behaviour, since a channel may be wired
//! to either kind of device.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::{debug, info};

use crate::context::DeviceContext;
use crate::drivers::pin_register::PinRegister;
use crate::pins::AUX_PINS;

/// Trigger pulse width.
pub const PULSE: Duration = Duration::from_millis(500);

/// Channel state and intent combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AuxTarget {
    /// Command: drive the relay low, then park in `OffIdle`.
    Off = 0,
    /// Command: drive the relay high, then park in `OnIdle`.
    On = 1,
    /// Parked low; the only state a trigger may fire from.
    OffIdle = 2,
    /// Parked high; triggers are swallowed.
    OnIdle = 3,
}

impl AuxTarget {
    pub fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::On,
            2 => Self::OffIdle,
            3 => Self::OnIdle,
            _ => Self::Off,
        }
    }

    /// Relay level this state holds.
    pub fn energized(self) -> bool {
        matches!(self, Self::On | Self::OnIdle)
    }
}

/// What one poll step must do for a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuxAction {
    /// Drive the relay to the given level.
    Drive(bool),
    /// Fire a one-shot high pulse.
    Pulse,
}

/// Decide the action and follow-up state for one poll step. The trigger
/// flag is consumed by the caller regardless of legality.
pub fn step(state: AuxTarget, triggered: bool) -> (AuxAction, AuxTarget) {
    match state {
        AuxTarget::On => (AuxAction::Drive(true), AuxTarget::OnIdle),
        AuxTarget::Off => (AuxAction::Drive(false), AuxTarget::OffIdle),
        AuxTarget::OffIdle if triggered => (AuxAction::Pulse, AuxTarget::OffIdle),
        parked => (AuxAction::Drive(parked.energized()), parked),
    }
}

/// Aux channels task body. One task walks all three channels.
pub fn run(ctx: Arc<DeviceContext>, register: Arc<PinRegister>, poll: Duration) {
    info!("aux task up, {} channels", AUX_PINS.len());

    while ctx.is_running() {
        if ctx.selftest_active() {
            thread::sleep(Duration::from_millis(500));
            continue;
        }

        for (channel, pin) in AUX_PINS.iter().enumerate() {
            let triggered = ctx.aux_trigger(channel);
            if triggered {
                ctx.clear_aux_trigger(channel);
            }
            let (action, next) = step(ctx.aux_target(channel), triggered);
            match action {
                AuxAction::Drive(level) => register.set(*pin, level),
                AuxAction::Pulse => {
                    debug!("aux {} trigger pulse", channel);
                    register.set_high(*pin);
                    thread::sleep(PULSE);
                    register.set_low(*pin);
                }
            }
            ctx.set_aux_target(channel, next);
        }
        thread::sleep(poll);
    }

    for pin in AUX_PINS {
        register.set_low(pin);
    }
}
