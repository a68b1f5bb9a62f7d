//! # GHGcast - Greenhouse-gas emission forecaster
//!
//! Simulates telemetry from industrial sites, feeds each reading to a
//! pre-trained regression model and aggregates the predicted emission levels
//! per timestamp and gas type for live tables and charts.
//!
//! ## Key Features
//!
//! - **Telemetry simulation**: seedable generator drawing every reading field from fixed distributions
//! - **Model boundary**: linear and oblivious-tree models loaded from JSON artifacts
//! - **Aggregation**: stable `(timestamp, gas)` grouping with mean predictions
//! - **Driver**: fixed-length tick loop with configurable gases per tick and redraw granularity
//!
//! ## Quick Start
//!
//! ```rust
//! use ghgcast::{
//!     Driver, DriverConfig, LinearModel, NullSink, TelemetrySimulator, FEATURE_COUNT,
//! };
//! use std::time::Duration;
//!
//! let model = LinearModel::from_weights(100.0, [0.5; FEATURE_COUNT]);
//! let simulator = TelemetrySimulator::seeded(42).unwrap();
//! let config = DriverConfig::new()
//!     .with_iterations(3)
//!     .with_pause(Duration::ZERO);
//!
//! let mut driver = Driver::new(config, model, simulator).unwrap();
//! driver.run(&mut NullSink).unwrap();
//!
//! // Two gases per tick
//! assert_eq!(driver.log().len(), 6);
//! // Every record lands in exactly one (timestamp, gas) group
//! let rows = ghgcast::aggregate(driver.log().records());
//! assert_eq!(rows.iter().map(|r| r.count).sum::<usize>(), 6);
//! ```
//!
//! ## Modules
//!
//! - [`reading`]: Gas types, readings and the model feature layout
//! - [`record`]: Prediction records and the append-only log
//! - [`simulator`]: Telemetry simulator
//! - [`model`]: Emission model trait and artifact loading
//! - [`aggregate`]: Per-timestamp, per-gas mean predictions
//! - [`driver`]: The tick loop
//! - [`display`]: Display boundary and console tables
//! - [`config`]: Run configuration

// Modules
pub mod aggregate;
pub mod config;
pub mod display;
pub mod driver;
pub mod error;
pub mod model;
pub mod reading;
pub mod record;
pub mod simulator;

// Re-exports for convenient access
pub use aggregate::{aggregate, series, summarize, AggregateRow, GasSummary};
pub use config::{DriverConfig, Redraw, RunConfig, TickGases};
pub use display::{ConsoleSink, DisplaySink, NullSink, SummaryFrame, TickFrame};
pub use driver::{Clock, Driver, Sleeper};
pub use error::{ForecastError, InvalidGasType, ModelError, Result, SimulatorError};
pub use model::{
    load_model, EmissionModel, LinearModel, LoadedModel, ModelArtifact, TreeEnsemble,
    DEFAULT_MODEL_PATH,
};
pub use reading::{GasType, Reading, FEATURE_COUNT, FEATURE_NAMES};
pub use record::{wall_clock_seconds, EmissionLog, Record};
pub use simulator::{SimulatorConfig, TelemetrySimulator};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_basic_run() {
        let model = LinearModel::from_weights(1.0, [0.0; FEATURE_COUNT]);
        let simulator = TelemetrySimulator::seeded(5).unwrap();
        let config = DriverConfig::new()
            .with_iterations(2)
            .with_pause(std::time::Duration::ZERO);

        let mut driver = Driver::new(config, model, simulator).unwrap();
        driver.run(&mut NullSink).unwrap();

        let log = driver.into_log();
        assert_eq!(log.len(), 4);
        assert!(log.iter().all(|r| r.prediction == 1.0));
    }
}
