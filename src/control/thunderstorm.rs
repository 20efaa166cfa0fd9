//! Thunderstorm effect generator.
//!
//! Produces irregular lightning-and-thunder effects: pick a random flash
//! lamp, fire a single 500 ms pulse, wait 200 to 1000 ms, play one of
//! five thunder clips, then sleep up to 25 s before reconsidering. Two
//! inputs feed it, a sustained `enabled` flag for a running storm and a
//! one-shot trigger for a lone strike; either starts a cycle.
//!
//! No determinism is wanted here, the generator samples `thread_rng`
//! unseeded.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::{debug, info, warn};
use rand::Rng;

use crate::app::ports::AudioPlayer;
use crate::context::DeviceContext;
use crate::control::sleep_while_running;
use crate::drivers::pin_register::PinRegister;
use crate::pins::FLASH_PINS;

/// Flash pulse width.
pub const FLASH_PULSE: Duration = Duration::from_millis(500);

/// The five thunder clips, picked uniformly.
pub const THUNDER_CLIPS: [&str; 5] = [
    "thunder0.mp3",
    "thunder1.mp3",
    "thunder2.mp3",
    "thunder3.mp3",
    "thunder4.mp3",
];

/// Thunderstorm task body.
pub fn run<A: AudioPlayer>(
    ctx: Arc<DeviceContext>,
    register: Arc<PinRegister>,
    audio: A,
    poll: Duration,
) {
    info!("thunderstorm task up");
    let mut rng = rand::thread_rng();

    while ctx.is_running() {
        if ctx.selftest_active() {
            thread::sleep(Duration::from_millis(500));
            continue;
        }

        let triggered = ctx.take_storm_trigger();
        if !ctx.storm_enabled() && !triggered {
            thread::sleep(poll);
            continue;
        }

        let flash = FLASH_PINS[rng.gen_range(0..FLASH_PINS.len())];
        debug!("lightning on {:?}", flash);
        register.set_high(flash);
        thread::sleep(FLASH_PULSE);
        register.set_low(flash);

        thread::sleep(Duration::from_millis(rng.gen_range(200..1000)));

        let clip = THUNDER_CLIPS[rng.gen_range(0..THUNDER_CLIPS.len())];
        if let Err(e) = audio.play(clip) {
            warn!("thunder clip {clip} failed: {e}");
        }

        sleep_while_running(&ctx, Duration::from_secs(rng.gen_range(0..25)));
    }

    for pin in FLASH_PINS {
        register.set_low(pin);
    }
}
