//! Run configuration.
//!
//! A run is described by a [`DriverConfig`] (loop shape) and a
//! [`SimulatorConfig`] (telemetry distributions). Both can be loaded together
//! from a JSON [`RunConfig`] file; missing fields take their defaults.

use crate::error::{ForecastError, Result};
use crate::model::DEFAULT_MODEL_PATH;
use crate::simulator::SimulatorConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Which gas types are simulated in one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TickGases {
    /// CH₄ then CO₂ every tick
    #[default]
    Both,
    /// A single gas chosen at random every tick
    RandomOne,
}

impl TickGases {
    /// Readings produced per tick
    pub fn per_tick(&self) -> usize {
        match self {
            TickGases::Both => 2,
            TickGases::RandomOne => 1,
        }
    }
}

impl FromStr for TickGases {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "both" => Ok(TickGases::Both),
            "random-one" | "random" | "one" => Ok(TickGases::RandomOne),
            other => Err(ForecastError::InvalidConfig(format!(
                "unknown gas selection '{}' (expected both or random-one)",
                other
            ))),
        }
    }
}

impl fmt::Display for TickGases {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TickGases::Both => write!(f, "both"),
            TickGases::RandomOne => write!(f, "random-one"),
        }
    }
}

/// How often the aggregate table is recomputed and shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Redraw {
    /// After every tick
    #[default]
    EveryTick,
    /// Once, after the last tick
    EndOfRun,
}

impl FromStr for Redraw {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "every-tick" | "tick" => Ok(Redraw::EveryTick),
            "end-of-run" | "end" => Ok(Redraw::EndOfRun),
            other => Err(ForecastError::InvalidConfig(format!(
                "unknown redraw mode '{}' (expected every-tick or end-of-run)",
                other
            ))),
        }
    }
}

impl fmt::Display for Redraw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Redraw::EveryTick => write!(f, "every-tick"),
            Redraw::EndOfRun => write!(f, "end-of-run"),
        }
    }
}

/// Driver loop configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Number of ticks
    pub iterations: usize,
    /// Gas types simulated per tick
    pub gases: TickGases,
    /// Aggregate redraw granularity
    pub redraw: Redraw,
    /// Pause between ticks in milliseconds
    pub pause_ms: u64,
    /// Records shown in the "latest observations" view
    pub tail_len: usize,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            iterations: 20,
            gases: TickGases::Both,
            redraw: Redraw::EveryTick,
            pause_ms: 1500,
            tail_len: 5,
        }
    }
}

impl DriverConfig {
    /// Create a new driver config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set number of iterations
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set gases per tick
    pub fn with_gases(mut self, gases: TickGases) -> Self {
        self.gases = gases;
        self
    }

    /// Set redraw granularity
    pub fn with_redraw(mut self, redraw: Redraw) -> Self {
        self.redraw = redraw;
        self
    }

    /// Set pause between ticks, in whole milliseconds (saturating)
    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause_ms = u64::try_from(pause.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Set tail length
    pub fn with_tail_len(mut self, tail_len: usize) -> Self {
        self.tail_len = tail_len;
        self
    }

    /// Pause between ticks
    pub fn pause(&self) -> Duration {
        Duration::from_millis(self.pause_ms)
    }

    /// Records the run will produce
    pub fn expected_records(&self) -> usize {
        self.iterations * self.gases.per_tick()
    }

    /// Check the configuration is runnable
    pub fn validate(&self) -> Result<()> {
        if self.iterations == 0 {
            return Err(ForecastError::InvalidConfig(
                "iterations must be at least 1".to_string(),
            ));
        }
        if self.tail_len == 0 {
            return Err(ForecastError::InvalidConfig(
                "tail_len must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Complete run description, as stored in a JSON config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Model artifact path
    pub model_path: String,
    pub driver: DriverConfig,
    pub simulator: SimulatorConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            model_path: DEFAULT_MODEL_PATH.to_string(),
            driver: DriverConfig::default(),
            simulator: SimulatorConfig::default(),
        }
    }
}

impl RunConfig {
    /// Parse from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| ForecastError::InvalidConfig(format!("run config: {}", e)))
    }

    /// Load from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }
}
