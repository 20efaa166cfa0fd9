//! GPIO pin assignments for the environment unit main board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.
//!
//! Numbers follow the wiringPi scheme of the reference unit (Pi 2 header).

/// Logical name for every pin the engine touches.
///
/// Outputs and inputs are disjoint sets; [`LogicalPin::is_output`] encodes
/// the split so the register can refuse a debounced read on an output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalPin {
    // ── Outputs ──────────────────────────────────────────────
    /// Green half of the two-colour status LED (header pin 35).
    StatusGreen,
    /// Red half of the two-colour status LED (header pin 36).
    StatusRed,
    /// Shutdown-acknowledge line to the power board (header pin 33).
    Shutdown,
    /// Bistable main-light relay pulse line (header pin 32).
    MainLight,
    /// Curtain motor direction: HIGH = up (header pin 31).
    CurtainDir,
    /// Curtain motor power (header pin 29).
    CurtainOn,
    /// Auxiliary relay 1 (header pin 18).
    Aux1,
    /// Auxiliary relay 2 (header pin 16).
    Aux2,
    /// Auxiliary relay 3 (header pin 15).
    Aux3,
    /// Flash lamp 1 (header pin 13).
    Flash1,
    /// Flash lamp 2 (header pin 12).
    Flash2,
    /// Flash lamp 3 (header pin 11).
    Flash3,

    // ── Inputs ───────────────────────────────────────────────
    /// Light-presence sensor, active-low: pin low = main light is on
    /// (header pin 40).
    LightSense,
    /// Momentary push-button, active-low with external pull-up
    /// (header pin 38).
    PushButton,
}

impl LogicalPin {
    /// Physical pin index (wiringPi numbering).
    pub const fn index(self) -> u8 {
        match self {
            Self::StatusGreen => 24,
            Self::StatusRed => 27,
            Self::Shutdown => 23,
            Self::MainLight => 26,
            Self::CurtainDir => 22,
            Self::CurtainOn => 21,
            Self::Aux1 => 5,
            Self::Aux2 => 4,
            Self::Aux3 => 3,
            Self::Flash1 => 2,
            Self::Flash2 => 1,
            Self::Flash3 => 0,
            Self::LightSense => 29,
            Self::PushButton => 28,
        }
    }

    /// BCM number of the same pin, for the Raspberry Pi GPIO backend.
    pub const fn bcm(self) -> u8 {
        match self {
            Self::StatusGreen => 19,
            Self::StatusRed => 16,
            Self::Shutdown => 13,
            Self::MainLight => 12,
            Self::CurtainDir => 6,
            Self::CurtainOn => 5,
            Self::Aux1 => 24,
            Self::Aux2 => 23,
            Self::Aux3 => 22,
            Self::Flash1 => 27,
            Self::Flash2 => 18,
            Self::Flash3 => 17,
            Self::LightSense => 21,
            Self::PushButton => 20,
        }
    }

    /// Whether this pin is configured as an output.
    pub const fn is_output(self) -> bool {
        !matches!(self, Self::LightSense | Self::PushButton)
    }
}

/// Every output pin, in de-energize order for shutdown.
pub const OUTPUT_PINS: [LogicalPin; 12] = [
    LogicalPin::CurtainOn,
    LogicalPin::CurtainDir,
    LogicalPin::MainLight,
    LogicalPin::Shutdown,
    LogicalPin::Aux1,
    LogicalPin::Aux2,
    LogicalPin::Aux3,
    LogicalPin::Flash1,
    LogicalPin::Flash2,
    LogicalPin::Flash3,
    LogicalPin::StatusRed,
    LogicalPin::StatusGreen,
];

/// The three auxiliary relay pins, indexed by channel number.
pub const AUX_PINS: [LogicalPin; 3] = [LogicalPin::Aux1, LogicalPin::Aux2, LogicalPin::Aux3];

/// The three flash lamp pins the thunderstorm generator picks from.
pub const FLASH_PINS: [LogicalPin; 3] =
    [LogicalPin::Flash1, LogicalPin::Flash2, LogicalPin::Flash3];
