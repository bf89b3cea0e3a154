use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use thiserror::Error;
use crate::System;

#[derive(Debug, Error)]
pub enum SaveLoadError {
    #[error("can't open {path}: {source}")]
    CantOpen {
        path: String,
        source: std::io::Error,
    },
    #[error("can't create {path}: {source}")]
    CantCreate {
        path: String,
        source: std::io::Error,
    },
    #[error("can't write system: {0}")]
    CantWrite(serde_json::Error),
    #[error("can't read system: {0}")]
    CantRead(serde_json::Error),
}

/// Save system snapshot as JSON, replacing the file if it exists.
pub fn save_system_to_file(system: &System, path: &Path, pretty_print: bool) -> Result<(), SaveLoadError> {
    let file = File::create(path).map_err(|source| SaveLoadError::CantCreate {
        path: path.to_string_lossy().into_owned(),
        source,
    })?;
    let writer = BufWriter::new(file);
    if pretty_print {
        serde_json::to_writer_pretty(writer, system).map_err(SaveLoadError::CantWrite)
    } else {
        serde_json::to_writer(writer, system).map_err(SaveLoadError::CantWrite)
    }
}

/// Load system snapshot. Pair lists and rank ownership of the loaded state are
/// always marked stale.
pub fn load_system_from_file(path: &Path) -> Result<System, SaveLoadError> {
    let file = File::open(path).map_err(|source| SaveLoadError::CantOpen {
        path: path.to_string_lossy().into_owned(),
        source,
    })?;
    let mut system: System = serde_json::from_reader(BufReader::new(file)).map_err(SaveLoadError::CantRead)?;
    system.state.invalidate();
    log::debug!("Loaded {} particles from {}", system.state.particles.len(), path.to_string_lossy());
    Ok(system)
}
