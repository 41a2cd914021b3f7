//! Configuration for arksave
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{ArkError, Result};

/// Blueprint class of the creature currently targeted
pub const REX_CLASS: &str = "/Game/PrimalEarth/Dinos/Rex/Rex_Character_BP.Rex_Character_BP_C";

/// Blueprint class of the Rex status component
pub const REX_STATUS_CLASS: &str = "/Game/PrimalEarth/CoreBlueprints/DinoCharacterStatusComponent_BP_Rex.DinoCharacterStatusComponent_BP_Rex_C";

/// Main configuration for a save session
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Store Configuration
    // -------------------------------------------------------------------------
    /// `.ark` save database
    pub save_path: PathBuf,

    /// Snapshot file backing the store
    pub snapshot_path: PathBuf,

    /// Key of the custom record holding the name table header
    pub header_key: String,

    // -------------------------------------------------------------------------
    // Query Configuration
    // -------------------------------------------------------------------------
    /// Blueprint class queried when the caller gives no filter
    pub target_class: String,

    /// Property whose name id marks a creature as tamed
    pub tamed_flag_property: String,

    // -------------------------------------------------------------------------
    // Decode Configuration
    // -------------------------------------------------------------------------
    /// Worker threads used to decode instance/status pairs
    pub worker_threads: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            save_path: PathBuf::from("./data/TheIsland_WP.ark"),
            snapshot_path: PathBuf::from("./data/TheIsland_WP.arks"),
            header_key: "SaveHeader".to_string(),
            target_class: REX_CLASS.to_string(),
            tamed_flag_property: "TamedAtTime".to_string(),
            worker_threads: 1,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Reject settings no session can run with
    pub fn validate(&self) -> Result<()> {
        if self.worker_threads == 0 {
            return Err(ArkError::Config(
                "worker_threads must be at least 1".to_string(),
            ));
        }
        if self.header_key.is_empty() {
            return Err(ArkError::Config("header_key must not be empty".to_string()));
        }
        if self.tamed_flag_property.is_empty() {
            return Err(ArkError::Config(
                "tamed_flag_property must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the save database path
    pub fn save_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.save_path = path.into();
        self
    }

    /// Set the snapshot file path
    pub fn snapshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.snapshot_path = path.into();
        self
    }

    /// Set the custom record key of the name table header
    pub fn header_key(mut self, key: impl Into<String>) -> Self {
        self.config.header_key = key.into();
        self
    }

    /// Set the default class for unfiltered queries
    pub fn target_class(mut self, class: impl Into<String>) -> Self {
        self.config.target_class = class.into();
        self
    }

    /// Set the property name used as the tamed marker
    pub fn tamed_flag_property(mut self, name: impl Into<String>) -> Self {
        self.config.tamed_flag_property = name.into();
        self
    }

    /// Set the number of decode workers
    pub fn worker_threads(mut self, count: usize) -> Self {
        self.config.worker_threads = count;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
