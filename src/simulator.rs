//! Telemetry simulator.
//!
//! Draws synthetic site readings from fixed statistical distributions.
//! Each field is sampled independently; the caller decides the gas type.

use crate::error::SimulatorError;
use crate::reading::{GasType, Reading};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::{Bernoulli, Normal, Uniform};
use serde::{Deserialize, Serialize};

/// Parameters of a normal distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalParams {
    pub mean: f64,
    pub std_dev: f64,
}

/// Closed real interval `[low, high]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeParams {
    pub low: f64,
    pub high: f64,
}

/// Simulator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Random seed for reproducibility.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Sites are drawn uniformly from `0..site_count`.
    pub site_count: u8,
    /// Ambient temperature (°C).
    pub temp: NormalParams,
    /// Atmospheric pressure (hPa).
    pub pressure: NormalParams,
    /// Relative humidity (%).
    pub humidity: RangeParams,
    /// Plant load (%).
    pub load: RangeParams,
    /// Probability that a site reports maintenance.
    pub maintenance_probability: f64,
    /// Operational hours are drawn from `[min, max)`.
    pub operational_hours_min: u8,
    pub operational_hours_max: u8,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            seed: None,
            site_count: 5,
            temp: NormalParams {
                mean: 10.0,
                std_dev: 5.0,
            },
            pressure: NormalParams {
                mean: 1013.0,
                std_dev: 5.0,
            },
            humidity: RangeParams {
                low: 30.0,
                high: 90.0,
            },
            load: RangeParams {
                low: 50.0,
                high: 100.0,
            },
            maintenance_probability: 0.05,
            operational_hours_min: 16,
            operational_hours_max: 24,
        }
    }
}

impl SimulatorConfig {
    /// Create a new simulator config with default distributions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set number of sites.
    pub fn with_site_count(mut self, site_count: u8) -> Self {
        self.site_count = site_count;
        self
    }

    /// Set maintenance probability.
    pub fn with_maintenance_probability(mut self, p: f64) -> Self {
        self.maintenance_probability = p;
        self
    }
}

/// Sampler set built from a validated [`SimulatorConfig`].
#[derive(Debug, Clone)]
struct Distributions {
    site: Uniform<u8>,
    temp: Normal<f64>,
    pressure: Normal<f64>,
    humidity: Uniform<f64>,
    load: Uniform<f64>,
    maintenance: Bernoulli,
    operational_hours: Uniform<u8>,
}

impl Distributions {
    fn from_config(config: &SimulatorConfig) -> Result<Self, SimulatorError> {
        if config.site_count == 0 {
            return Err(SimulatorError::NoSites);
        }
        if config.operational_hours_min >= config.operational_hours_max {
            return Err(SimulatorError::InvalidRange {
                field: "operational_hours",
                low: config.operational_hours_min as f64,
                high: config.operational_hours_max as f64,
            });
        }

        Ok(Self {
            site: Uniform::new(0, config.site_count),
            temp: normal("temp", config.temp)?,
            pressure: normal("pressure", config.pressure)?,
            humidity: inclusive("humidity", config.humidity)?,
            load: inclusive("load", config.load)?,
            maintenance: Bernoulli::new(config.maintenance_probability).map_err(|_| {
                SimulatorError::InvalidProbability {
                    field: "maintenance_probability",
                    value: config.maintenance_probability,
                }
            })?,
            operational_hours: Uniform::new(
                config.operational_hours_min,
                config.operational_hours_max,
            ),
        })
    }
}

fn normal(field: &'static str, params: NormalParams) -> Result<Normal<f64>, SimulatorError> {
    let invalid = SimulatorError::InvalidNormal {
        field,
        mean: params.mean,
        std_dev: params.std_dev,
    };
    if !params.mean.is_finite() {
        return Err(invalid);
    }
    Normal::new(params.mean, params.std_dev).map_err(|_| invalid)
}

fn inclusive(field: &'static str, params: RangeParams) -> Result<Uniform<f64>, SimulatorError> {
    if !(params.low.is_finite() && params.high.is_finite()) || params.low > params.high {
        return Err(SimulatorError::InvalidRange {
            field,
            low: params.low,
            high: params.high,
        });
    }
    Ok(Uniform::new_inclusive(params.low, params.high))
}

/// Synthetic telemetry source owning its random generator.
pub struct TelemetrySimulator {
    dists: Distributions,
    rng: StdRng,
    generated: u64,
}

impl TelemetrySimulator {
    /// Create a simulator, validating the distribution parameters.
    pub fn new(config: SimulatorConfig) -> Result<Self, SimulatorError> {
        let dists = Distributions::from_config(&config)?;
        let rng = match config.seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            dists,
            rng,
            generated: 0,
        })
    }

    /// Create a simulator with default distributions and a fixed seed.
    pub fn seeded(seed: u64) -> Result<Self, SimulatorError> {
        Self::new(SimulatorConfig::default().with_seed(seed))
    }

    /// Draw one reading for `gas_type`.
    pub fn generate_reading(&mut self, gas_type: GasType) -> Reading {
        self.generated += 1;
        let rng = &mut self.rng;
        Reading {
            site_id: self.dists.site.sample(rng),
            temp: self.dists.temp.sample(rng),
            pressure: self.dists.pressure.sample(rng),
            humidity: self.dists.humidity.sample(rng),
            load: self.dists.load.sample(rng),
            maintenance_flag: u8::from(self.dists.maintenance.sample(rng)),
            gas_type,
            operational_hours: self.dists.operational_hours.sample(rng),
        }
    }

    /// Draw a gas type uniformly.
    pub fn random_gas(&mut self) -> GasType {
        if self.rng.gen_bool(0.5) {
            GasType::Co2
        } else {
            GasType::Ch4
        }
    }

    /// Number of readings generated so far.
    pub fn generated(&self) -> u64 {
        self.generated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulator_config_default() {
        let config = SimulatorConfig::default();
        assert_eq!(config.site_count, 5);
        assert_eq!(config.temp.mean, 10.0);
        assert_eq!(config.pressure.mean, 1013.0);
        assert_eq!(config.maintenance_probability, 0.05);
        assert_eq!(config.operational_hours_min, 16);
        assert_eq!(config.operational_hours_max, 24);
    }

    #[test]
    fn test_reading_ranges() {
        let mut sim = TelemetrySimulator::seeded(42).unwrap();

        for i in 0..2000 {
            let gas = GasType::ALL[i % 2];
            let r = sim.generate_reading(gas);
            assert!(r.site_id <= 4);
            assert!(r.maintenance_flag <= 1);
            assert!((16..24).contains(&r.operational_hours));
            assert!((30.0..=90.0).contains(&r.humidity));
            assert!((50.0..=100.0).contains(&r.load));
            assert_eq!(r.gas_type, gas);
        }
        assert_eq!(sim.generated(), 2000);
    }

    #[test]
    fn test_distribution_means() {
        let mut sim = TelemetrySimulator::seeded(7).unwrap();
        let n = 5000;
        let readings: Vec<Reading> = (0..n).map(|_| sim.generate_reading(GasType::Ch4)).collect();

        let mean = |f: fn(&Reading) -> f64| readings.iter().map(f).sum::<f64>() / n as f64;

        assert!((mean(|r| r.temp) - 10.0).abs() < 0.5);
        assert!((mean(|r| r.pressure) - 1013.0).abs() < 0.5);
        assert!((mean(|r| r.humidity) - 60.0).abs() < 1.5);
        assert!((mean(|r| r.load) - 75.0).abs() < 1.5);

        let maintenance_rate = mean(|r| r.maintenance_flag as f64);
        assert!(maintenance_rate > 0.02 && maintenance_rate < 0.08);
    }

    #[test]
    fn test_every_site_drawn() {
        let mut sim = TelemetrySimulator::seeded(3).unwrap();
        let mut seen = [false; 5];
        for _ in 0..500 {
            seen[sim.generate_reading(GasType::Co2).site_id as usize] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_reproducibility() {
        let mut a = TelemetrySimulator::new(SimulatorConfig::new().with_seed(12345)).unwrap();
        let mut b = TelemetrySimulator::new(SimulatorConfig::new().with_seed(12345)).unwrap();

        for _ in 0..20 {
            assert_eq!(a.generate_reading(GasType::Ch4), b.generate_reading(GasType::Ch4));
            assert_eq!(a.random_gas(), b.random_gas());
        }
    }

    #[test]
    fn test_random_gas_covers_both() {
        let mut sim = TelemetrySimulator::seeded(11).unwrap();
        let co2 = (0..1000).filter(|_| sim.random_gas() == GasType::Co2).count();
        assert!(co2 > 400 && co2 < 600);
    }

    #[test]
    fn test_invalid_configs() {
        let mut config = SimulatorConfig::new();
        config.temp.std_dev = -1.0;
        assert!(matches!(
            TelemetrySimulator::new(config),
            Err(SimulatorError::InvalidNormal { field: "temp", .. })
        ));

        let config = SimulatorConfig::new().with_maintenance_probability(1.5);
        assert!(matches!(
            TelemetrySimulator::new(config),
            Err(SimulatorError::InvalidProbability { .. })
        ));

        let config = SimulatorConfig::new().with_site_count(0);
        assert_eq!(
            TelemetrySimulator::new(config).err(),
            Some(SimulatorError::NoSites)
        );

        let mut config = SimulatorConfig::new();
        config.humidity = RangeParams {
            low: 90.0,
            high: 30.0,
        };
        assert!(matches!(
            TelemetrySimulator::new(config),
            Err(SimulatorError::InvalidRange {
                field: "humidity",
                ..
            })
        ));

        let mut config = SimulatorConfig::new();
        config.operational_hours_min = 24;
        assert!(TelemetrySimulator::new(config).is_err());
    }

    #[test]
    fn test_config_from_partial_json() {
        let config: SimulatorConfig =
            serde_json::from_str(r#"{"seed": 9, "site_count": 3}"#).unwrap();
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.site_count, 3);
        assert_eq!(config.load, SimulatorConfig::default().load);
    }
}
