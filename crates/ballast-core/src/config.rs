// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Governor configuration.
//!
//! The tunables are set once at initialization and are read-only afterwards.
//! They can be built in code (`GovernorConfig::default()` plus field updates)
//! or loaded from a RON file; any field missing from the file keeps its
//! default.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::reclaim::ReclaimLevel;

/// Errors raised while loading or validating a [`GovernorConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The document is not valid RON for a [`GovernorConfig`].
    #[error("Failed to parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// The values parsed but cannot be used.
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// The build flavour of the host application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AppMode {
    /// Day-to-day development build.
    #[default]
    Develop,
    /// QA/test build.
    Test,
    /// Shipping build. Diagnostic surfaces are disabled.
    Release,
}

/// Tunables of the frame resource governor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernorConfig {
    /// Hard ceiling for total process memory, in megabytes.
    pub max_total_memory_mb: u32,
    /// Hard ceiling for heap memory, in megabytes.
    pub max_heap_memory_mb: u32,
    /// Soft ceiling as a fraction of the hard ceiling.
    pub soft_ratio: f32,
    /// Build flavour; the memory overlay is unavailable in [`AppMode::Release`].
    pub app_mode: AppMode,
    /// Reclamation fired when heap memory first crosses its soft ceiling.
    pub heap_soft_reclaim: Option<ReclaimLevel>,
    /// Reclamation fired when heap memory first crosses its hard ceiling.
    pub heap_critical_reclaim: Option<ReclaimLevel>,
}

impl Default for GovernorConfig {
    fn default() -> Self {
        Self {
            max_total_memory_mb: 170,
            max_heap_memory_mb: 50,
            soft_ratio: 0.7,
            app_mode: AppMode::Develop,
            heap_soft_reclaim: None,
            heap_critical_reclaim: None,
        }
    }
}

impl GovernorConfig {
    /// Parses and validates a RON document.
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        let config: GovernorConfig = ron::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses, and validates a RON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path)?;
        let config = Self::from_ron_str(&source)?;
        log::info!("Loaded governor config from {}", path.display());
        Ok(config)
    }

    /// Serializes the config as pretty RON.
    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        let pretty = ron::ser::PrettyConfig::default().indentor("  ".to_string());
        ron::ser::to_string_pretty(self, pretty)
            .map_err(|e| ConfigError::Invalid(format!("cannot serialize config: {e}")))
    }

    /// Checks that every ceiling is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_total_memory_mb == 0 {
            return Err(ConfigError::Invalid(
                "max_total_memory_mb must be greater than zero".into(),
            ));
        }
        if self.max_heap_memory_mb == 0 {
            return Err(ConfigError::Invalid(
                "max_heap_memory_mb must be greater than zero".into(),
            ));
        }
        if !(self.soft_ratio > 0.0 && self.soft_ratio <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "soft_ratio must be in (0, 1], got {}",
                self.soft_ratio
            )));
        }
        Ok(())
    }

    /// Whether the on-screen memory overlay may be shown.
    pub fn overlay_enabled(&self) -> bool {
        self.app_mode != AppMode::Release
    }
}
