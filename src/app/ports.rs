//! Port traits — the boundary between the engine core and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Dispatcher (domain)
//! ```
//!
//! Adapters (orchestration link, audio player, OS power, settings file)
//! implement these traits.  The dispatcher consumes them via generics, so
//! the engine core never touches a socket, a child process or the
//! filesystem directly, and the test harness can swap in mocks.

use std::time::Duration;

use crate::app::messages::{InboundMessage, OutboundMessage};

// ───────────────────────────────────────────────────────────────
// Orchestration endpoint (driven adapter: network ↔ domain)
// ───────────────────────────────────────────────────────────────

/// Link to the external orchestration system.
///
/// Framing and transport live entirely in the adapter; the dispatcher
/// only sees typed messages.  `recv_timeout` returning `Ok(None)` means
/// no message arrived within the window, which is not an error.
pub trait MessageEndpoint {
    /// (Re)establish the link.  Called before the first receive and
    /// after every transport failure.
    fn connect(&mut self) -> Result<(), EndpointError>;

    /// Send one outbound message.
    fn send(&mut self, message: &OutboundMessage) -> Result<(), EndpointError>;

    /// Wait up to `timeout` for one inbound message.
    fn recv_timeout(&mut self, timeout: Duration)
    -> Result<Option<InboundMessage>, EndpointError>;
}

// ───────────────────────────────────────────────────────────────
// Audio player (driven adapter: domain → child process)
// ───────────────────────────────────────────────────────────────

/// Plays a named clip, blocking until playback ends.
pub trait AudioPlayer {
    fn play(&self, clip: &str) -> Result<(), AudioError>;
}

// ───────────────────────────────────────────────────────────────
// System power (driven adapter: domain → OS)
// ───────────────────────────────────────────────────────────────

/// OS-level halt and reboot.  Both are terminal: the engine persists its
/// state and exits right after a successful call.
pub trait SystemPower {
    fn shutdown(&self) -> Result<(), PowerError>;
    fn reboot(&self) -> Result<(), PowerError>;
}

// ───────────────────────────────────────────────────────────────
// Settings store (driven adapter: domain ↔ persistent file)
// ───────────────────────────────────────────────────────────────

/// Persists the handful of values that survive a restart.  Today that is
/// one integer, the curtain position.
pub trait SettingsStore {
    /// Stored curtain position, or the default (0, fully open) when no
    /// settings file exists yet.
    fn curtain_position(&self) -> Result<i32, SettingsError>;

    /// Persist the curtain position atomically.
    fn set_curtain_position(&mut self, position: i32) -> Result<(), SettingsError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`MessageEndpoint`] operations.
#[derive(Debug)]
pub enum EndpointError {
    /// Could not reach the orchestration system.
    ConnectFailed(std::io::Error),
    /// The link dropped mid-send or mid-receive.
    Disconnected(std::io::Error),
    /// An inbound frame did not decode to a known message.
    Malformed(String),
}

/// Errors from [`AudioPlayer`] operations.
#[derive(Debug)]
pub enum AudioError {
    /// The player process could not be started.
    SpawnFailed(std::io::Error),
    /// The player exited with a non-zero status.
    PlaybackFailed(i32),
}

/// Errors from [`SystemPower`] operations.
#[derive(Debug)]
pub enum PowerError {
    /// The shutdown command could not be invoked.
    InvokeFailed(std::io::Error),
    /// The shutdown command exited with a non-zero status.
    CommandFailed(i32),
}

/// Errors from [`SettingsStore`] operations.
#[derive(Debug)]
pub enum SettingsError {
    /// Settings file I/O failed.
    Io(std::io::Error),
    /// The settings file exists but did not parse.
    Corrupted(String),
}

impl core::fmt::Display for EndpointError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ConnectFailed(e) => write!(f, "connect failed: {}", e),
            Self::Disconnected(e) => write!(f, "link dropped: {}", e),
            Self::Malformed(msg) => write!(f, "malformed message: {}", msg),
        }
    }
}

impl core::fmt::Display for AudioError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::SpawnFailed(e) => write!(f, "player spawn failed: {}", e),
            Self::PlaybackFailed(code) => write!(f, "player exited with status {}", code),
        }
    }
}

impl core::fmt::Display for PowerError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvokeFailed(e) => write!(f, "power command failed to start: {}", e),
            Self::CommandFailed(code) => write!(f, "power command exited with status {}", code),
        }
    }
}

impl core::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "settings I/O: {}", e),
            Self::Corrupted(msg) => write!(f, "settings corrupted: {}", msg),
        }
    }
}

impl std::error::Error for EndpointError {}
impl std::error::Error for AudioError {}
impl std::error::Error for PowerError {}
impl std::error::Error for SettingsError {}
