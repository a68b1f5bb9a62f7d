//! Error types for GHGcast
//!
//! This module defines all error types used throughout the library.

use thiserror::Error;

/// Result type alias for GHGcast operations
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Main error type for a forecasting run
#[derive(Error, Debug)]
pub enum ForecastError {
    /// The emission model failed to load or to predict
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// The telemetry simulator rejected its configuration
    #[error("Simulator error: {0}")]
    Simulator(#[from] SimulatorError),

    /// Run configuration is unusable
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Display or export surface failed to write
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised at the model boundary
#[derive(Error, Debug)]
pub enum ModelError {
    /// Artifact could not be read
    #[error("Failed to read model artifact: {0}")]
    Io(#[from] std::io::Error),

    /// Artifact is not valid JSON for any known model type
    #[error("Failed to parse model artifact: {0}")]
    Parse(#[from] serde_json::Error),

    /// A feature required by the reading layout has no weight
    #[error("Model artifact is missing feature: {0}")]
    MissingFeature(String),

    /// The artifact references a feature the reading does not carry
    #[error("Model artifact references unknown feature: {0}")]
    UnknownFeature(String),

    /// A tree has the wrong number of leaves for its depth
    #[error("Invalid tree {index}: {reason}")]
    InvalidTree { index: usize, reason: String },

    /// The model produced NaN or infinity
    #[error("Model returned a non-finite prediction: {0}")]
    NonFinitePrediction(f64),
}

/// Errors from simulator configuration
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulatorError {
    /// Normal distribution with a negative or non-finite deviation
    #[error("Invalid normal distribution for {field}: mean={mean}, std_dev={std_dev}")]
    InvalidNormal {
        field: &'static str,
        mean: f64,
        std_dev: f64,
    },

    /// Empty or inverted range
    #[error("Invalid range for {field}: [{low}, {high}]")]
    InvalidRange {
        field: &'static str,
        low: f64,
        high: f64,
    },

    /// Probability outside [0, 1]
    #[error("Invalid probability for {field}: {value}")]
    InvalidProbability { field: &'static str, value: f64 },

    /// No sites to draw from
    #[error("Site count must be at least 1")]
    NoSites,
}

/// An integer that is not a known gas code
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Unknown gas type code: {0} (expected 0 = CH4 or 1 = CO2)")]
pub struct InvalidGasType(pub u8);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ModelError::MissingFeature("temp".to_string());
        assert_eq!(err.to_string(), "Model artifact is missing feature: temp");

        let err = SimulatorError::InvalidProbability {
            field: "maintenance_probability",
            value: 1.5,
        };
        assert!(err.to_string().contains("maintenance_probability"));
    }

    #[test]
    fn test_error_conversion() {
        let model_err = ModelError::NonFinitePrediction(f64::NAN);
        let err: ForecastError = model_err.into();
        assert!(matches!(
            err,
            ForecastError::Model(ModelError::NonFinitePrediction(_))
        ));

        let sim_err = SimulatorError::NoSites;
        let err: ForecastError = sim_err.into();
        assert!(matches!(err, ForecastError::Simulator(SimulatorError::NoSites)));
    }

    #[test]
    fn test_invalid_gas_type_display() {
        assert!(InvalidGasType(7).to_string().contains('7'));
    }
}
