// src/config.rs

use crate::types::EngineConfig;
use anyhow::Result;
use std::fs;
use std::path::Path;

impl EngineConfig {
    /// Load engine configuration from a YAML file. Missing sections fall
    /// back to the reference defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: EngineConfig = serde_yaml::from_str(&contents)?;
        Ok(config)
    }
}
