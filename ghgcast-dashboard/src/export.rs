// GHGcast Dashboard - CSV export
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! CSV export of the emission log.

use ghgcast::{EmissionLog, Record};
use serde::Serialize;
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Errors from writing an export.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One flat CSV row.
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    timestamp: String,
    site_id: u8,
    temp: f64,
    pressure: f64,
    humidity: f64,
    load: f64,
    maintenance_flag: u8,
    gas_type: u8,
    gas: &'a str,
    operational_hours: u8,
    prediction: f64,
}

impl<'a> From<&'a Record> for CsvRow<'a> {
    fn from(record: &'a Record) -> Self {
        let r = &record.reading;
        Self {
            timestamp: record.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            site_id: r.site_id,
            temp: r.temp,
            pressure: r.pressure,
            humidity: r.humidity,
            load: r.load,
            maintenance_flag: r.maintenance_flag,
            gas_type: r.gas_type.code(),
            gas: r.gas_type.label(),
            operational_hours: r.operational_hours,
            prediction: record.prediction,
        }
    }
}

/// Write every record of `log` to `path`, header included.
pub fn export_csv(log: &EmissionLog, path: impl AsRef<Path>) -> Result<usize, ExportError> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path)?;
    for record in log {
        writer.serialize(CsvRow::from(record))?;
    }
    writer.flush()?;
    info!("Exported {} records to {}", log.len(), path.display());
    Ok(log.len())
}
