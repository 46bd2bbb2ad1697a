//! Configuration loading for synapse instances

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{error::*, params::TmgParams, simulation::SimulationParams, synapse::TmgSynapse};

/// Startup configuration for one synapse instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynapseConfig {
    /// Initialization time of the run (ms)
    pub start_time: f64,

    /// Area of the node the synapse sits on (µm²)
    pub area: f64,

    /// Mechanism parameters
    pub params: TmgParams,
}

impl Default for SynapseConfig {
    fn default() -> Self {
        Self {
            start_time: 0.0,
            area: 100.0,
            params: TmgParams::default(),
        }
    }
}

impl SynapseConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| SynapseError::config(format!("Invalid config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file, falling back to defaults when it does not exist
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_toml_str(&content)
        } else {
            log::debug!("no config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Serialize to a TOML document
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| SynapseError::config(format!("Failed to serialize config: {}", e)))
    }

    /// Save configuration to file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = self.to_toml_string()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate parameters and node area
    pub fn validate(&self) -> Result<()> {
        self.params.validate()?;
        if !(self.area > 0.0) {
            return Err(SynapseError::invalid_parameter("area", self.area.to_string(), "> 0.0"));
        }
        if !self.start_time.is_finite() {
            return Err(SynapseError::invalid_parameter(
                "start_time",
                self.start_time.to_string(),
                "finite",
            ));
        }
        Ok(())
    }

    /// Build a synapse initialized at `start_time`
    pub fn build(&self) -> Result<TmgSynapse> {
        self.validate()?;
        TmgSynapse::new_at(self.params.clone(), self.start_time)
    }

    /// Driver parameters for a run of `duration` ms on the configured node area
    pub fn simulation_params(&self, dt: f64, duration: f64) -> Result<SimulationParams> {
        let params = SimulationParams::new(dt, duration)?.with_area(self.area);
        params.validate()?;
        Ok(params)
    }
}
