//! Configuration for a simulation run.
//!
//! Deserialized from a JSON file when a path is given, otherwise built from
//! defaults. All values are fixed at process start; there is no runtime
//! reconfiguration. Defaults follow the reference setup: a 20x20 grid split
//! across 4 ranks for 10 steps.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{RunError, RunResult};
use crate::patterns;

/// Complete configuration for one run.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Global grid shape.
    pub grid: GridConfig,
    /// Partitioning and iteration settings.
    pub run: RunConfig,
    /// Snapshot output settings.
    pub output: OutputConfig,
}

/// Global grid dimensions, in cells.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub width: usize,
    pub height: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        GridConfig {
            width: 20,
            height: 20,
        }
    }
}

/// Partitioning and stepping settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Number of horizontal partitions (ranks in the ring).
    pub ring_size: usize,
    /// Number of evolution steps to drive.
    pub steps: usize,
    /// Bound on each halo receive before the run is declared dead.
    pub halo_timeout_ms: u64,
    /// Name of the initial configuration to seed.
    pub pattern: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            ring_size: 4,
            steps: 10,
            halo_timeout_ms: 5_000,
            pattern: "glider".to_string(),
        }
    }
}

/// Snapshot output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Whether to write VTK snapshots at all.
    pub enabled: bool,
    /// Directory the pieces and master files land in.
    pub directory: PathBuf,
    /// Filename and scalar-array prefix.
    pub prefix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            enabled: false,
            directory: PathBuf::from("."),
            prefix: "gol".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn load(path: &Path) -> RunResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|err| {
            RunError::config(format!("cannot read {}: {}", path.display(), err))
        })?;
        let config: Config = serde_json::from_str(&text).map_err(|err| {
            RunError::config(format!("cannot parse {}: {}", path.display(), err))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check the startup invariants the rest of the core relies on.
    pub fn validate(&self) -> RunResult<()> {
        if self.grid.width == 0 || self.grid.height == 0 {
            return Err(RunError::config(format!(
                "grid dimensions must be positive (got {}x{})",
                self.grid.width, self.grid.height
            )));
        }
        if self.run.ring_size == 0 {
            return Err(RunError::config("ring size must be at least 1"));
        }
        if self.run.ring_size > self.grid.width {
            return Err(RunError::config(format!(
                "ring size {} exceeds grid width {}: some ranks would own no columns",
                self.run.ring_size, self.grid.width
            )));
        }
        if patterns::by_name(&self.run.pattern).is_none() {
            return Err(RunError::config(format!(
                "unknown pattern '{}'",
                self.run.pattern
            )));
        }
        Ok(())
    }

    /// Halo receive bound as a `Duration`.
    pub fn halo_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.run.halo_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"grid": {"width": 40}, "run": {"ring_size": 2}}"#)
                .unwrap();
        assert_eq!(config.grid.width, 40);
        assert_eq!(config.grid.height, 20);
        assert_eq!(config.run.ring_size, 2);
        assert_eq!(config.run.steps, 10);
        config.validate().unwrap();
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        let mut config = Config::default();
        config.grid.height = 0;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, RunError::Configuration(_)));
    }

    #[test]
    fn oversized_ring_is_rejected() {
        let mut config = Config::default();
        config.run.ring_size = 30;
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_pattern_is_rejected() {
        let mut config = Config::default();
        config.run.pattern = "spaceship".to_string();
        assert!(config.validate().is_err());
    }
}
