pub mod config;
pub mod meter;
pub mod util;

use std::fs::File;
use std::io::{Read, Write};
use std::path::PathBuf;

pub use config::palette::{HexColor, Palette, PriceRole};
pub use config::render::{Features, Fonts, Positioning, RenderConfig};
pub use config::state::{DisplaySpec, State};
pub use config::{Interaction, Modifier, ScaleFactor};
pub use meter::{AdaptiveScale, DeltaMeasurement, DisplayId, MarkerBook, MarkerChange, PriceMarker};

use ::log::{error, info, warn};

pub const SAVED_STATE_PATH: &str = "saved-state.json";

#[derive(thiserror::Error, Debug, Clone)]
pub enum InternalError {
    #[error("Layout error: {0}")]
    Layout(String),
    #[error("State error: {0}")]
    State(String),
}

pub fn write_json_to_file(json: &str, file_name: &str) -> std::io::Result<()> {
    let path = data_path(Some(file_name));

    let parent = path.parent().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "Invalid state file path")
    })?;

    if !parent.exists() {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = File::create(path)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

pub fn read_from_file(file_name: &str) -> Result<State, Box<dyn std::error::Error>> {
    let path = data_path(Some(file_name));

    let mut file = File::open(&path)?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;

    match serde_json::from_str(&contents) {
        Ok(state) => Ok(state),
        Err(e) => {
            drop(file);

            let backup_file_name = backup_name(file_name);
            let backup_path = data_path(Some(&backup_file_name));

            if let Err(rename_err) = std::fs::rename(&path, &backup_path) {
                warn!(
                    "Failed to backup corrupted state file '{}' to '{}': {}",
                    path.display(),
                    backup_path.display(),
                    rename_err
                );
            } else {
                info!(
                    "Backed up corrupted state file to '{}'. It can be restored manually.",
                    backup_path.display()
                );
            }

            Err(Box::new(e))
        }
    }
}

fn backup_name(file_name: &str) -> String {
    if let Some(pos) = file_name.rfind('.') {
        format!("{}_old{}", &file_name[..pos], &file_name[pos..])
    } else {
        format!("{file_name}_old")
    }
}

/// Loads the saved state, or defaults when there is none or it can't be read.
pub fn load_state() -> State {
    match read_from_file(SAVED_STATE_PATH) {
        Ok(state) => {
            info!("Loaded state with {} display(s)", state.displays.len());
            state
        }
        Err(e) => {
            warn!("Failed to load state, using defaults: {e}");
            State::default()
        }
    }
}

pub fn save_state(state: &State) -> Result<(), InternalError> {
    let json = serde_json::to_string_pretty(state)
        .map_err(|e| InternalError::State(format!("Failed to serialize state: {e}")))?;

    write_json_to_file(&json, SAVED_STATE_PATH).map_err(|e| {
        error!("Failed to write state file: {e}");
        InternalError::State(format!("Failed to write state file: {e}"))
    })?;

    info!("State saved to {}", data_path(Some(SAVED_STATE_PATH)).display());
    Ok(())
}

pub fn data_path(path_name: Option<&str>) -> PathBuf {
    let base = if let Ok(path) = std::env::var("DAYRANGE_DATA_PATH") {
        PathBuf::from(path)
    } else {
        dirs_next::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("dayrange")
    };

    match path_name {
        Some(path_name) => base.join(path_name),
        None => base,
    }
}
