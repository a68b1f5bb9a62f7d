//! Reading definitions for GHGcast
//!
//! This module defines the core types produced by the telemetry simulator:
//! - Gas types and their numeric codes
//! - One simulated site observation
//! - The fixed feature layout handed to emission models

use crate::error::InvalidGasType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of model features carried by a reading
pub const FEATURE_COUNT: usize = 8;

/// Feature names in the column order models are evaluated with
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "site_id",
    "temp",
    "pressure",
    "humidity",
    "load",
    "maintenance_flag",
    "gas_type",
    "operational_hours",
];

/// Greenhouse gas a reading is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum GasType {
    /// Methane
    Ch4 = 0,
    /// Carbon dioxide
    Co2 = 1,
}

impl GasType {
    /// All gas types, in code order
    pub const ALL: [GasType; 2] = [GasType::Ch4, GasType::Co2];

    /// Numeric code used as the model feature
    pub fn code(&self) -> u8 {
        *self as u8
    }

    /// Convert from a numeric code
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(GasType::Ch4),
            1 => Some(GasType::Co2),
            _ => None,
        }
    }

    /// Chemical formula used in tables and chart legends
    pub fn label(&self) -> &'static str {
        match self {
            GasType::Ch4 => "CH₄",
            GasType::Co2 => "CO₂",
        }
    }
}

impl fmt::Display for GasType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl TryFrom<u8> for GasType {
    type Error = InvalidGasType;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        GasType::from_u8(value).ok_or(InvalidGasType(value))
    }
}

impl From<GasType> for u8 {
    fn from(gas: GasType) -> Self {
        gas.code()
    }
}

/// One simulated observation from an industrial site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Site identifier
    pub site_id: u8,
    /// Ambient temperature (°C)
    pub temp: f64,
    /// Atmospheric pressure (hPa)
    pub pressure: f64,
    /// Relative humidity (%)
    pub humidity: f64,
    /// Plant load (%)
    pub load: f64,
    /// 1 when the site is under maintenance
    pub maintenance_flag: u8,
    /// Gas the reading is attributed to
    pub gas_type: GasType,
    /// Hours of operation in the current day
    pub operational_hours: u8,
}

impl Reading {
    /// Feature vector in [`FEATURE_NAMES`] order
    pub fn features(&self) -> [f64; FEATURE_COUNT] {
        [
            self.site_id as f64,
            self.temp,
            self.pressure,
            self.humidity,
            self.load,
            self.maintenance_flag as f64,
            self.gas_type.code() as f64,
            self.operational_hours as f64,
        ]
    }

    /// Position of a named feature in the feature vector
    pub fn feature_index(name: &str) -> Option<usize> {
        FEATURE_NAMES.iter().position(|f| *f == name)
    }

    /// Whether the site reported maintenance
    pub fn under_maintenance(&self) -> bool {
        self.maintenance_flag != 0
    }
}
