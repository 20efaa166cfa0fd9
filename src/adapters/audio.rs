//! `mpg123` child-process audio player.
//!
//! The unit has a bare ALSA output and a directory of thunder clips;
//! shelling out to `mpg123` is all the playback the engine needs.  The
//! call blocks until the clip ends, which the thunderstorm generator
//! relies on for its pacing.

use std::path::PathBuf;
use std::process::Command;

use log::debug;

use crate::app::ports::{AudioError, AudioPlayer};

pub struct Mpg123Player {
    clip_dir: PathBuf,
}

impl Mpg123Player {
    pub fn new(clip_dir: PathBuf) -> Self {
        Self { clip_dir }
    }
}

impl AudioPlayer for Mpg123Player {
    fn play(&self, clip: &str) -> Result<(), AudioError> {
        let path = self.clip_dir.join(clip);
        debug!("playing {}", path.display());
        let status = Command::new("mpg123")
            .arg("-q")
            .arg(&path)
            .status()
            .map_err(AudioError::SpawnFailed)?;
        if status.success() {
            Ok(())
        } else {
            Err(AudioError::PlaybackFailed(status.code().unwrap_or(-1)))
        }
    }
}
