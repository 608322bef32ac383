//! Engine configuration with persistence
//!
//! Configuration is read from `~/.config/lorebound/engine.toml`

use std::fs;
use std::path::{Path, PathBuf};

use lorebound_core::TickConfig;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Tunables for the spell engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Ticks per game second; effect durations are given in seconds
    pub ticks_per_second: u64,
    /// Redraws allowed when a weighted draw lands on an ineligible entry
    pub selection_retries: usize,
    /// Fixed RNG seed for reproducible runs
    pub rng_seed: Option<u64>,
    /// Tell the wearer when duplicate armor spells are suppressed
    pub announce_duplicates: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ticks_per_second: 20,
            selection_retries: 10,
            rng_seed: None,
            announce_duplicates: true,
        }
    }
}

impl EngineConfig {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("lorebound"))
    }

    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("engine.toml"))
    }

    /// Load config from the user config directory, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            warn!("Could not determine config directory");
            return Self::default();
        };

        if !path.exists() {
            info!("No engine config found, using defaults");
            return Self::default();
        }

        Self::load_from(&path)
    }

    /// Load config from an explicit file, falling back to defaults on any error
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => {
                    info!("Loaded engine config from {:?}", path);
                    config
                }
                Err(e) => {
                    warn!("Failed to parse engine config: {}, using defaults", e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read engine config: {}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Save config to an explicit file, creating parent directories
    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        fs::write(path, content)?;
        info!("Saved engine config to {:?}", path);
        Ok(())
    }

    /// Tick settings derived from this config
    pub fn tick_config(&self) -> TickConfig {
        TickConfig {
            ticks_per_second: self.ticks_per_second.max(1),
        }
    }
}
