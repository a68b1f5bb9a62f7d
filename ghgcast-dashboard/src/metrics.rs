// GHGcast Dashboard - Prometheus metrics definitions
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Prometheus metrics for the emission forecast run.
//!
//! This module defines all Prometheus metrics exposed by the dashboard
//! and provides functions to update them from driver frames.

use ghgcast::{AggregateRow, GasType, Record};
use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec, register_gauge, register_gauge_vec, CounterVec, Encoder, Gauge, GaugeVec,
    TextEncoder,
};

lazy_static! {
    // ============================================================
    // Prediction Metrics
    // ============================================================

    /// Most recent predicted emission per gas.
    pub static ref PREDICTION: GaugeVec = register_gauge_vec!(
        "ghgcast_prediction",
        "Most recent predicted emission level",
        &["gas"]
    ).unwrap();

    /// Mean prediction of the latest aggregate group per gas.
    pub static ref MEAN_PREDICTION: GaugeVec = register_gauge_vec!(
        "ghgcast_mean_prediction",
        "Mean predicted emission of the latest (timestamp, gas) group",
        &["gas"]
    ).unwrap();

    /// Records produced per gas and site.
    pub static ref RECORDS_TOTAL: CounterVec = register_counter_vec!(
        "ghgcast_records_total",
        "Records produced by the forecast run",
        &["gas", "site"]
    ).unwrap();

    /// Readings that reported maintenance.
    pub static ref MAINTENANCE_READINGS_TOTAL: CounterVec = register_counter_vec!(
        "ghgcast_maintenance_readings_total",
        "Readings with the maintenance flag set",
        &["gas"]
    ).unwrap();

    // ============================================================
    // Run Metrics
    // ============================================================

    /// Current iteration of the run.
    pub static ref ITERATION: Gauge = register_gauge!(
        "ghgcast_iteration",
        "Current driver iteration"
    ).unwrap();

    /// Configured number of iterations.
    pub static ref ITERATIONS_TOTAL: Gauge = register_gauge!(
        "ghgcast_iterations_total",
        "Configured driver iterations"
    ).unwrap();

    /// Rows in the latest aggregate table.
    pub static ref AGGREGATE_ROWS: Gauge = register_gauge!(
        "ghgcast_aggregate_rows",
        "Rows in the latest aggregate table"
    ).unwrap();

    /// Whether the run has completed (1 = finished).
    pub static ref RUN_FINISHED: Gauge = register_gauge!(
        "ghgcast_run_finished",
        "Forecast run finished (1) or in progress (0)"
    ).unwrap();
}

fn gas_label(gas: GasType) -> &'static str {
    match gas {
        GasType::Ch4 => "ch4",
        GasType::Co2 => "co2",
    }
}

/// Update per-record metrics for one iteration.
pub fn record_tick(iteration: usize, total: usize, fresh: &[Record]) {
    ITERATION.set(iteration as f64);
    ITERATIONS_TOTAL.set(total as f64);

    for record in fresh {
        let gas = gas_label(record.gas_type());
        let site = record.reading.site_id.to_string();
        PREDICTION.with_label_values(&[gas]).set(record.prediction);
        RECORDS_TOTAL.with_label_values(&[gas, site.as_str()]).inc();
        if record.reading.under_maintenance() {
            MAINTENANCE_READINGS_TOTAL.with_label_values(&[gas]).inc();
        }
    }
}

/// Update aggregate metrics from the latest table.
pub fn record_summary(rows: &[AggregateRow], is_final: bool) {
    AGGREGATE_ROWS.set(rows.len() as f64);
    for gas in GasType::ALL {
        if let Some(row) = rows.iter().rev().find(|r| r.gas_type == gas) {
            MEAN_PREDICTION
                .with_label_values(&[gas_label(gas)])
                .set(row.mean_prediction);
        }
    }
    RUN_FINISHED.set(if is_final { 1.0 } else { 0.0 });
}

/// Encode all metrics to Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::warn!("Failed to encode metrics: {}", e);
    }
    String::from_utf8(buffer).unwrap_or_default()
}
