//! Environment unit control engine — main entry point.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  Adapters (outer ring)                   │
//! │                                                          │
//! │  NullEndpoint      Mpg123Player   OsPower  FileSettings  │
//! │  (MessageEndpoint) (AudioPlayer)  (Power)  (Settings)    │
//! │                                                          │
//! │  ──────────────── Port Trait Boundary ────────────────   │
//! │                                                          │
//! │  ┌────────────────────────────────────────────────────┐  │
//! │  │  Dispatcher + controller tasks (pure cores)        │  │
//! │  │  curtain · main light · aux · storm · status LED   │  │
//! │  └────────────────────────────────────────────────────┘  │
//! │                                                          │
//! │  PinRegister (the only lock) ── GPIO backend             │
//! └──────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use anyhow::{Context as _, Result};
use log::info;

use enviroctl::adapters::audio::Mpg123Player;
use enviroctl::adapters::endpoint::NullEndpoint;
use enviroctl::adapters::power::OsPower;
use enviroctl::adapters::settings::FileSettings;
use enviroctl::app::dispatcher::Dispatcher;
use enviroctl::app::ports::SettingsStore;
use enviroctl::config::EngineConfig;
use enviroctl::context::DeviceContext;
use enviroctl::control::ControllerSet;
use enviroctl::drivers::gpio::GpioBackend;
use enviroctl::drivers::pin_register::PinRegister;

fn parse_args(config: &mut EngineConfig) -> Result<()> {
    let mut args = std::env::args().skip(1);
    if let Some(host) = args.next() {
        config.host = host;
    }
    if let Some(port) = args.next() {
        config.port = port.parse().context("port argument must be a number")?;
    }
    Ok(())
}

fn gpio_backend() -> Result<Box<dyn GpioBackend>> {
    #[cfg(feature = "raspi")]
    {
        let gpio = enviroctl::drivers::gpio::RaspiGpio::new().context("claiming GPIO pins")?;
        Ok(Box::new(gpio))
    }
    #[cfg(not(feature = "raspi"))]
    {
        Ok(Box::new(enviroctl::drivers::gpio::MemoryGpio::new()))
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let mut config = EngineConfig::default();
    parse_args(&mut config)?;
    info!(
        "environment engine starting, orchestrator at {}:{}",
        config.host, config.port
    );

    let settings = FileSettings::load(&config.settings_path).context("loading settings")?;
    let position = settings.curtain_position().context("reading position")?;

    let ctx = Arc::new(DeviceContext::new(position));
    let register = Arc::new(PinRegister::new(gpio_backend()?));

    {
        let ctx = Arc::clone(&ctx);
        ctrlc::set_handler(move || {
            info!("interrupt received, stopping");
            ctx.stop();
        })
        .context("installing interrupt handler")?;
    }

    let audio = Mpg123Player::new(config.audio_dir.clone());
    let controllers = ControllerSet::spawn(&ctx, &register, audio, &config);

    let mut dispatcher = Dispatcher::new(
        Arc::clone(&ctx),
        Arc::clone(&register),
        NullEndpoint,
        OsPower,
        settings,
        config.reconnect_backoff,
    );
    let outcome = dispatcher.run();

    dispatcher.persist_on_exit()?;
    controllers.shutdown(&ctx, &register);
    info!("environment engine stopped");
    outcome.map_err(Into::into)
}
