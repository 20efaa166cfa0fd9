//! Raw GPIO backends.
//!
//! ## Dual-target design
//!
//! With the `raspi` feature: [`RaspiGpio`] drives the Pi's GPIO block via
//! `rppal`.  On host/test builds: [`MemoryGpio`] tracks levels in-memory
//! and lets tests script the input pins.
//!
//! Backends are dumb; all serialization and debouncing happens one layer
//! up in [`PinRegister`](super::pin_register::PinRegister), which is the
//! only code allowed to call these methods.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::pins::LogicalPin;

/// Raw digital I/O.  Writes have no failure channel by contract; a backend
/// that hits an OS-level error logs it and carries on.
pub trait GpioBackend: Send {
    /// Drive an output pin to the given level.
    fn write(&mut self, pin: LogicalPin, high: bool);

    /// Sample an input pin once, raw (no debounce).
    fn read(&mut self, pin: LogicalPin) -> bool;
}

// ───────────────────────────────────────────────────────────────
// In-memory backend (host builds, tests)
// ───────────────────────────────────────────────────────────────

/// In-memory pin levels.  Inputs default to high because both physical
/// inputs are active-low (button released, light off).
pub struct MemoryGpio {
    levels: [AtomicBool; 32],
}

impl MemoryGpio {
    pub fn new() -> Self {
        let levels = [const { AtomicBool::new(false) }; 32];
        let gpio = Self { levels };
        gpio.levels[LogicalPin::LightSense.index() as usize].store(true, Ordering::Release);
        gpio.levels[LogicalPin::PushButton.index() as usize].store(true, Ordering::Release);
        gpio
    }

    /// Current level of any pin (test observation).
    pub fn level(&self, pin: LogicalPin) -> bool {
        self.levels[pin.index() as usize].load(Ordering::Acquire)
    }

    /// Script an input pin's level (test stimulus).
    pub fn set_level(&self, pin: LogicalPin, high: bool) {
        self.levels[pin.index() as usize].store(high, Ordering::Release);
    }
}

impl Default for MemoryGpio {
    fn default() -> Self {
        Self::new()
    }
}

impl GpioBackend for MemoryGpio {
    fn write(&mut self, pin: LogicalPin, high: bool) {
        self.levels[pin.index() as usize].store(high, Ordering::Release);
    }

    fn read(&mut self, pin: LogicalPin) -> bool {
        self.levels[pin.index() as usize].load(Ordering::Acquire)
    }
}

/// Shared handle so tests can keep poking inputs after the register has
/// taken ownership of the backend.
impl GpioBackend for Arc<MemoryGpio> {
    fn write(&mut self, pin: LogicalPin, high: bool) {
        self.levels[pin.index() as usize].store(high, Ordering::Release);
    }

    fn read(&mut self, pin: LogicalPin) -> bool {
        self.level(pin)
    }
}

// ───────────────────────────────────────────────────────────────
// Raspberry Pi backend
// ───────────────────────────────────────────────────────────────

#[cfg(feature = "raspi")]
pub use raspi::RaspiGpio;

#[cfg(feature = "raspi")]
mod raspi {
    use std::collections::HashMap;

    use log::error;
    use rppal::gpio::{Gpio, InputPin, OutputPin};

    use super::GpioBackend;
    use crate::pins::{LogicalPin, OUTPUT_PINS};

    /// `rppal`-backed GPIO.  Outputs are claimed low at construction;
    /// inputs are plain reads (the board provides external pull-ups).
    pub struct RaspiGpio {
        outputs: HashMap<u8, OutputPin>,
        inputs: HashMap<u8, InputPin>,
    }

    impl RaspiGpio {
        pub fn new() -> rppal::gpio::Result<Self> {
            let gpio = Gpio::new()?;
            let mut outputs = HashMap::new();
            for pin in OUTPUT_PINS {
                outputs.insert(pin.bcm(), gpio.get(pin.bcm())?.into_output_low());
            }
            let mut inputs = HashMap::new();
            for pin in [LogicalPin::LightSense, LogicalPin::PushButton] {
                inputs.insert(pin.bcm(), gpio.get(pin.bcm())?.into_input());
            }
            Ok(Self { outputs, inputs })
        }
    }

    impl GpioBackend for RaspiGpio {
        fn write(&mut self, pin: LogicalPin, high: bool) {
            match self.outputs.get_mut(&pin.bcm()) {
                Some(out) if high => out.set_high(),
                Some(out) => out.set_low(),
                None => error!("write to unclaimed pin {:?}", pin),
            }
        }

        fn read(&mut self, pin: LogicalPin) -> bool {
            match self.inputs.get(&pin.bcm()) {
                Some(input) => input.is_high(),
                None => {
                    error!("read from unclaimed pin {:?}", pin);
                    // Active-low inputs: high = inactive, the safe default.
                    true
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inputs_default_inactive() {
        let gpio = MemoryGpio::new();
        assert!(gpio.level(LogicalPin::PushButton));
        assert!(gpio.level(LogicalPin::LightSense));
    }

    #[test]
    fn outputs_default_low() {
        let gpio = MemoryGpio::new();
        assert!(!gpio.level(LogicalPin::CurtainOn));
        assert!(!gpio.level(LogicalPin::MainLight));
    }

    #[test]
    fn write_then_read_back() {
        let mut gpio = MemoryGpio::new();
        gpio.write(LogicalPin::Aux1, true);
        assert!(gpio.level(LogicalPin::Aux1));
        gpio.write(LogicalPin::Aux1, false);
        assert!(!gpio.level(LogicalPin::Aux1));
    }

    #[test]
    fn shared_handle_sees_writes() {
        let shared = Arc::new(MemoryGpio::new());
        let mut handle = Arc::clone(&shared);
        handle.write(LogicalPin::Flash2, true);
        assert!(shared.level(LogicalPin::Flash2));
    }
}
