//! JSON file-backed settings store.
//!
//! One small JSON document holds everything the engine persists across
//! restarts.  Writes go through a temp file plus rename so a power cut
//! mid-write leaves the old document intact.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};

use crate::app::ports::{SettingsError, SettingsStore};
use crate::control::curtain::MAX_POS;

#[derive(Debug, Default, Serialize, Deserialize)]
struct SettingsDoc {
    #[serde(default)]
    curtain_pos: i32,
}

/// Settings persisted as a JSON file at a fixed path.
pub struct FileSettings {
    path: PathBuf,
    doc: SettingsDoc,
}

impl FileSettings {
    /// Load the settings file, falling back to defaults when it does not
    /// exist yet.  A file that exists but does not parse is an error; we
    /// never silently overwrite it.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let doc = match fs::read_to_string(path) {
            Ok(raw) => {
                serde_json::from_str(&raw).map_err(|e| SettingsError::Corrupted(e.to_string()))?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("no settings file at {}, using defaults", path.display());
                SettingsDoc::default()
            }
            Err(e) => return Err(SettingsError::Io(e)),
        };
        Ok(Self {
            path: path.to_path_buf(),
            doc,
        })
    }

    fn write_back(&self) -> Result<(), SettingsError> {
        let raw = serde_json::to_string_pretty(&self.doc)
            .map_err(|e| SettingsError::Corrupted(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, raw).map_err(SettingsError::Io)?;
        fs::rename(&tmp, &self.path).map_err(SettingsError::Io)
    }
}

impl SettingsStore for FileSettings {
    fn curtain_position(&self) -> Result<i32, SettingsError> {
        Ok(self.doc.curtain_pos.clamp(0, MAX_POS))
    }

    fn set_curtain_position(&mut self, position: i32) -> Result<(), SettingsError> {
        self.doc.curtain_pos = position.clamp(0, MAX_POS);
        self.write_back()
    }
}
