//! Hardware self-test sequence.
//!
//! Walks every actuator so an operator can verify the wiring: both
//! status dies lit, each flash/aux pair blinked three times, two main
//! light relay pulses, then a curtain run in each direction. While the
//! `selftest` flag is set every other controller loop idles, so this
//! task has the pins to itself. The flag is cleared when the walk
//! completes.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::info;

use crate::context::DeviceContext;
use crate::control::sleep_while_running;
use crate::drivers::pin_register::PinRegister;
use crate::pins::{AUX_PINS, FLASH_PINS, LogicalPin};

/// Self-test task body.
pub fn run(ctx: Arc<DeviceContext>, register: Arc<PinRegister>) {
    while ctx.is_running() {
        if !ctx.selftest_active() {
            thread::sleep(Duration::from_millis(500));
            continue;
        }
        info!("self-test sequence start");
        sleep_while_running(&ctx, Duration::from_secs(1));

        register.set_high(LogicalPin::StatusRed);
        register.set_high(LogicalPin::StatusGreen);

        for (flash, aux) in FLASH_PINS.iter().zip(AUX_PINS.iter()) {
            for _ in 0..3 {
                register.set_high(*flash);
                register.set_high(*aux);
                thread::sleep(Duration::from_millis(500));
                register.set_low(*flash);
                register.set_low(*aux);
                thread::sleep(Duration::from_millis(500));
            }
            sleep_while_running(&ctx, Duration::from_secs(3));
        }

        // Two relay pulses: flips the bistable main light there and back.
        for gap in [Duration::from_millis(1500), Duration::ZERO] {
            register.set_high(LogicalPin::MainLight);
            thread::sleep(Duration::from_millis(500));
            register.set_low(LogicalPin::MainLight);
            thread::sleep(gap);
        }

        // Short curtain run each way.
        for dir_up in [false, true] {
            register.set(LogicalPin::CurtainDir, dir_up);
            register.set_high(LogicalPin::CurtainOn);
            sleep_while_running(&ctx, Duration::from_secs(3));
            register.set_low(LogicalPin::CurtainOn);
            register.set_low(LogicalPin::CurtainDir);
        }

        register.set_low(LogicalPin::StatusRed);
        register.set_low(LogicalPin::StatusGreen);

        info!("self-test sequence done");
        ctx.set_selftest(false);
    }
}
