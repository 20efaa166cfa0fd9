//! Controller tasks.
//!
//! One module per actuator, each with a pure decision core and a task
//! loop. [`ControllerSet`] spawns the loops on named threads and joins
//! them on shutdown; the register's outputs are de-energized once every
//! task is down.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{info, warn};

use crate::app::ports::AudioPlayer;
use crate::config::EngineConfig;
use crate::context::DeviceContext;
use crate::drivers::pin_register::PinRegister;
use crate::drivers::{button, status_led};

pub mod aux;
pub mod curtain;
pub mod main_light;
pub mod selftest;
pub mod thunderstorm;

/// Sleep up to `total` in short slices, returning early once the engine
/// stop flag is set. Keeps long effect sleeps from delaying shutdown.
pub fn sleep_while_running(ctx: &DeviceContext, total: Duration) {
    const SLICE: Duration = Duration::from_millis(250);
    let mut remaining = total;
    while ctx.is_running() && !remaining.is_zero() {
        let step = remaining.min(SLICE);
        thread::sleep(step);
        remaining -= step;
    }
}

/// Handles of all running controller tasks.
pub struct ControllerSet {
    handles: Vec<JoinHandle<()>>,
}

impl ControllerSet {
    /// Spawn every controller loop on its own named thread.
    pub fn spawn<A>(
        ctx: &Arc<DeviceContext>,
        register: &Arc<PinRegister>,
        audio: A,
        config: &EngineConfig,
    ) -> Self
    where
        A: AudioPlayer + Send + 'static,
    {
        let mut handles = Vec::new();
        let mut spawn = |name: &str, body: Box<dyn FnOnce() + Send>| {
            let handle = thread::Builder::new()
                .name(name.to_string())
                .spawn(body)
                .unwrap_or_else(|e| panic!("spawning {name} task: {e}"));
            handles.push(handle);
        };

        {
            let (ctx, reg) = (Arc::clone(ctx), Arc::clone(register));
            spawn("status-led", Box::new(move || status_led::run(ctx, reg)));
        }
        {
            let (ctx, reg) = (Arc::clone(ctx), Arc::clone(register));
            let poll = config.button_poll;
            spawn("button", Box::new(move || button::run(ctx, reg, poll)));
        }
        {
            let (ctx, reg) = (Arc::clone(ctx), Arc::clone(register));
            let tick = config.curtain_tick;
            spawn("curtain", Box::new(move || curtain::run(ctx, reg, tick)));
        }
        {
            let (ctx, reg) = (Arc::clone(ctx), Arc::clone(register));
            let poll = config.light_poll;
            spawn("main-light", Box::new(move || main_light::run(ctx, reg, poll)));
        }
        {
            let (ctx, reg) = (Arc::clone(ctx), Arc::clone(register));
            let poll = config.light_poll;
            spawn("aux", Box::new(move || aux::run(ctx, reg, poll)));
        }
        {
            let (ctx, reg) = (Arc::clone(ctx), Arc::clone(register));
            let poll = config.storm_poll;
            spawn(
                "thunderstorm",
                Box::new(move || thunderstorm::run(ctx, reg, audio, poll)),
            );
        }
        {
            let (ctx, reg) = (Arc::clone(ctx), Arc::clone(register));
            spawn("selftest", Box::new(move || selftest::run(ctx, reg)));
        }

        info!("{} controller tasks spawned", handles.len());
        Self { handles }
    }

    /// Set the stop flag, join every task, then de-energize all outputs.
    pub fn shutdown(self, ctx: &DeviceContext, register: &PinRegister) {
        ctx.stop();
        for handle in self.handles {
            let name = handle
                .thread()
                .name()
                .unwrap_or("controller")
                .to_string();
            if handle.join().is_err() {
                warn!("{name} task panicked before shutdown");
            }
        }
        register.all_off();
        info!("all controller tasks down, outputs released");
    }
}
