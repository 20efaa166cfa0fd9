//! Engine configuration parameters.
//!
//! Collects every tunable the engine reads at startup.  The orchestrator
//! host/port can be overridden on the command line; everything else ships
//! with the defaults tuned for the reference unit.

use std::path::PathBuf;
use std::time::Duration;

/// Core engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Orchestration system host.
    pub host: String,
    /// Orchestration system port.
    pub port: u16,

    /// Path of the settings file holding the persisted curtain position.
    pub settings_path: PathBuf,
    /// Directory containing the five thunder audio clips.
    pub audio_dir: PathBuf,

    // --- Timing ---
    /// Switch classifier poll interval.
    pub button_poll: Duration,
    /// Main light reconciler poll interval.
    pub light_poll: Duration,
    /// Curtain motor tick (one position step per tick).
    pub curtain_tick: Duration,
    /// Thunderstorm idle poll interval.
    pub storm_poll: Duration,
    /// Delay before the dispatcher reconnects after a transport failure.
    pub reconnect_backoff: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 7000,
            settings_path: PathBuf::from("/var/lib/enviroctl/settings.json"),
            audio_dir: PathBuf::from("/usr/share/enviroctl/sounds"),

            button_poll: Duration::from_millis(5),
            light_poll: Duration::from_millis(500),
            curtain_tick: Duration::from_secs(1),
            storm_poll: Duration::from_secs(1),
            reconnect_backoff: Duration::from_millis(500),
        }
    }
}
