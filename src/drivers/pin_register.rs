//! Serialized access to the GPIO backend.
//!
//! Six controller tasks share the pins, so every level change goes through
//! this register. The mutex makes each write-plus-settle atomic with
//! respect to the other tasks; holders keep the lock only for the duration
//! of one backend call (or one debounce burst).

use std::sync::{Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use crate::drivers::gpio::GpioBackend;
use crate::pins::{LogicalPin, OUTPUT_PINS};

/// Number of raw samples per debounced read.
const DEBOUNCE_SAMPLES: u32 = 6;
/// Gap between raw samples.
const DEBOUNCE_GAP: Duration = Duration::from_micros(25);

/// Mutex-serialized pin front end shared by all controller tasks.
pub struct PinRegister {
    inner: Mutex<Box<dyn GpioBackend>>,
}

impl PinRegister {
    pub fn new(backend: Box<dyn GpioBackend>) -> Self {
        Self {
            inner: Mutex::new(backend),
        }
    }

    /// Drive an output pin high.
    pub fn set_high(&self, pin: LogicalPin) {
        self.lock().write(pin, true);
    }

    /// Drive an output pin low.
    pub fn set_low(&self, pin: LogicalPin) {
        self.lock().write(pin, false);
    }

    /// Drive an output pin to the given level.
    pub fn set(&self, pin: LogicalPin, high: bool) {
        self.lock().write(pin, high);
    }

    /// Majority-vote read of an input pin: six raw samples 25 us apart,
    /// more than half high reads as high.
    pub fn read_debounced(&self, pin: LogicalPin) -> bool {
        debug_assert!(!pin.is_output(), "debounced read on output {:?}", pin);
        let mut backend = self.lock();
        let mut high = 0;
        for _ in 0..DEBOUNCE_SAMPLES {
            if backend.read(pin) {
                high += 1;
            }
            thread::sleep(DEBOUNCE_GAP);
        }
        high > DEBOUNCE_SAMPLES / 2
    }

    /// De-energize every output. Called once at engine shutdown.
    pub fn all_off(&self) {
        let mut backend = self.lock();
        for pin in OUTPUT_PINS {
            backend.write(pin, false);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Box<dyn GpioBackend>> {
        // A poisoned lock means a panicking task died mid-write; the pin
        // level itself is still consistent, so keep going.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
