//! RON data loader
//!
//! Loads stage tables from an external RON file, with fallback to the
//! hardcoded defaults when the file does not exist.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::DataError;
use crate::game::StageId;

use super::stages::{default_stage_tables, StageTable, StageTables};

/// File name looked up inside a data directory
pub const STAGES_FILE: &str = "stages.ron";

/// Manages all external game data
#[derive(Debug, Clone, Default)]
pub struct DataManager {
    /// Monster and companion tables per stage
    pub stages: StageTables,
}

impl DataManager {
    /// Load data from a directory. A missing file means defaults; a file
    /// that exists but does not parse is an error.
    pub fn load_from(dir: &Path) -> Result<Self, DataError> {
        let stages = load_stage_tables(&dir.join(STAGES_FILE))?;
        Ok(Self { stages })
    }

    pub fn stage(&self, stage: StageId) -> Result<&StageTable, DataError> {
        self.stages.get(stage)
    }

    /// Write the current tables into a directory, e.g. as a modding template
    pub fn export_to(&self, dir: &Path) -> Result<(), DataError> {
        save_stage_tables(&self.stages, &dir.join(STAGES_FILE))
    }
}

/// Parse and validate stage tables from RON text
pub fn parse_stage_tables(source: &str) -> Result<StageTables, DataError> {
    let tables: StageTables = ron::from_str(source)?;
    tables.validate()?;
    Ok(tables)
}

/// Load stage tables from a RON file
pub fn load_stage_tables(path: &Path) -> Result<StageTables, DataError> {
    match fs::read_to_string(path) {
        Ok(content) => {
            let tables = parse_stage_tables(&content)?;
            log::info!("Loaded {} stage tables from {:?}", tables.stages.len(), path);
            Ok(tables)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            log::warn!("{:?} not found, using default stage tables", path);
            Ok(default_stage_tables())
        }
        Err(source) => Err(DataError::Read { path: path.to_path_buf(), source }),
    }
}

/// Save stage tables as pretty RON
pub fn save_stage_tables(tables: &StageTables, path: &Path) -> Result<(), DataError> {
    let content = ron::ser::to_string_pretty(tables, ron::ser::PrettyConfig::default())?;
    fs::write(path, content).map_err(|source| DataError::Write { path: path.to_path_buf(), source })
}
