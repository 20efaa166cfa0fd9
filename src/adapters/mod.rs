//! Port implementations backed by the host system.

pub mod audio;
pub mod endpoint;
pub mod power;
pub mod settings;
