//! Two-colour status signal driver.
//!
//! One LED package with a red and a green die shows the engine state to
//! the operator. Each state maps to a colour and a blink profile; the
//! task replays the profile in a fixed three-window cycle and re-reads
//! the shared state at every cycle start, so a state change shows up
//! within one cycle (about 1.5 s).
//!
//! Cycle windows: 25 ms, 700 ms, 750 ms, every state lit at the cycle
//! top. A profile says at which window edge the lit die goes dark,
//! which yields three visible patterns: solid, a 25 ms strobe, and a
//! half-duty blink. Combined with the two colours every state reads
//! differently to an observer.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::info;

use crate::context::DeviceContext;
use crate::drivers::pin_register::PinRegister;
use crate::pins::LogicalPin;

/// Engine state as shown on the status signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SignalState {
    Init = 0,
    Error = 1,
    EmergencyStop = 2,
    Standby = 3,
    Manual = 4,
    Automatic = 5,
}

impl SignalState {
    /// Decode a stored discriminant. Unknown values fall back to `Init`,
    /// the most conservative display.
    pub fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Init,
            1 => Self::Error,
            2 => Self::EmergencyStop,
            3 => Self::Standby,
            4 => Self::Manual,
            5 => Self::Automatic,
            _ => {
                debug_assert!(false, "unknown signal state {raw}");
                Self::Init
            }
        }
    }

    /// Which die this state lights.
    pub fn colour(self) -> SignalColour {
        match self {
            Self::Init | Self::Error | Self::EmergencyStop => SignalColour::Red,
            Self::Standby | Self::Manual | Self::Automatic => SignalColour::Green,
        }
    }

    /// The state's blink profile.
    pub fn profile(self) -> BlinkProfile {
        match self {
            Self::Error | Self::Automatic => BlinkProfile {
                off_edge: OffEdge::Never,
            },
            Self::EmergencyStop | Self::Standby => BlinkProfile {
                off_edge: OffEdge::AfterStrobe,
            },
            Self::Init | Self::Manual => BlinkProfile {
                off_edge: OffEdge::AfterHold,
            },
        }
    }
}

/// The two dies of the status LED.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalColour {
    Red,
    Green,
}

impl SignalColour {
    pub fn pin(self) -> LogicalPin {
        match self {
            Self::Red => LogicalPin::StatusRed,
            Self::Green => LogicalPin::StatusGreen,
        }
    }
}

/// When in the cycle the lit die goes dark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffEdge {
    /// Solid: never dark.
    Never,
    /// Strobe: dark after the 25 ms window (dark 1450 ms per cycle).
    AfterStrobe,
    /// Blink: dark after the 25+700 ms windows (dark 750 ms per cycle).
    AfterHold,
}

/// One state's display pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlinkProfile {
    pub off_edge: OffEdge,
}

impl BlinkProfile {
    /// Whether the die is lit in the given cycle window (0..3).
    pub fn lit(self, window: u8) -> bool {
        match self.off_edge {
            OffEdge::Never => true,
            OffEdge::AfterStrobe => window == 0,
            OffEdge::AfterHold => window < 2,
        }
    }
}

/// Strobe window.
pub const WINDOW_STROBE: Duration = Duration::from_millis(25);
/// First hold window.
pub const WINDOW_HOLD: Duration = Duration::from_millis(700);
/// Second hold window.
pub const WINDOW_TAIL: Duration = Duration::from_millis(750);

/// Status signal task body.
pub fn run(ctx: Arc<DeviceContext>, register: Arc<PinRegister>) {
    info!("status signal task up");

    while ctx.is_running() {
        if ctx.selftest_active() {
            thread::sleep(Duration::from_millis(500));
            continue;
        }

        let state = ctx.status();
        let colour = state.colour();
        let profile = state.profile();

        let other = match colour {
            SignalColour::Red => SignalColour::Green,
            SignalColour::Green => SignalColour::Red,
        };
        register.set_low(other.pin());

        register.set(colour.pin(), profile.lit(0));
        thread::sleep(WINDOW_STROBE);
        register.set(colour.pin(), profile.lit(1));
        thread::sleep(WINDOW_HOLD);
        register.set(colour.pin(), profile.lit(2));
        thread::sleep(WINDOW_TAIL);
    }

    register.set_low(LogicalPin::StatusRed);
    register.set_low(LogicalPin::StatusGreen);
}
