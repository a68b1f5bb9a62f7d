// GHGcast Dashboard - Shared run state
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Shared state between the forecast driver and the HTTP handlers.
//!
//! The driver runs on a blocking worker thread and publishes every frame
//! through [`SharedSink`]. Handlers only ever read the latest [`Snapshot`].

use crate::metrics::{record_summary, record_tick};
use ghgcast::{series, AggregateRow, DisplaySink, GasType, Record, SummaryFrame, TickFrame};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Progress counters readable without taking the snapshot lock.
#[derive(Debug, Default)]
pub struct RunProgress {
    /// Iterations completed.
    pub iteration: AtomicUsize,
    /// Configured iterations.
    pub total: AtomicUsize,
    /// Records produced so far.
    pub records: AtomicUsize,
    /// Set once the last summary was published.
    pub finished: AtomicBool,
    /// Set when the run aborted.
    pub failed: AtomicBool,
}

impl RunProgress {
    /// Completion percentage.
    pub fn percent(&self) -> f64 {
        let total = self.total.load(Ordering::SeqCst);
        if total == 0 {
            return 0.0;
        }
        self.iteration.load(Ordering::SeqCst) as f64 / total as f64 * 100.0
    }
}

/// Chart-ready series, one line per gas.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ChartSeries {
    pub gas: String,
    pub points: Vec<ChartPoint>,
}

/// One chart point.
#[derive(Debug, Clone, Serialize)]
pub struct ChartPoint {
    pub time: String,
    pub mean_prediction: f64,
}

/// Everything the dashboard renders.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Snapshot {
    pub model: String,
    pub iteration: usize,
    pub total: usize,
    /// Records generated by the latest iteration.
    pub latest: Vec<Record>,
    pub aggregates: Vec<AggregateRow>,
    pub chart: Vec<ChartSeries>,
    /// Most recent records of the log.
    pub tail: Vec<Record>,
    pub log_len: usize,
    pub finished: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// State shared with HTTP handlers.
#[derive(Debug)]
pub struct DashboardState {
    pub snapshot: RwLock<Snapshot>,
    pub progress: RunProgress,
}

impl DashboardState {
    /// Create state for a run of `total` iterations.
    pub fn new(model: &str, total: usize) -> Arc<Self> {
        let progress = RunProgress::default();
        progress.total.store(total, Ordering::SeqCst);
        Arc::new(Self {
            snapshot: RwLock::new(Snapshot {
                model: model.to_string(),
                total,
                ..Default::default()
            }),
            progress,
        })
    }

    /// Record a fatal run error. Must not be called from async context.
    pub fn mark_failed(&self, message: String) {
        self.progress.failed.store(true, Ordering::SeqCst);
        self.snapshot.blocking_write().error = Some(message);
    }
}

/// Display sink publishing frames into [`DashboardState`].
///
/// Uses blocking lock acquisition, so it must be driven from a blocking
/// thread rather than from inside the async runtime.
pub struct SharedSink {
    state: Arc<DashboardState>,
}

impl SharedSink {
    pub fn new(state: Arc<DashboardState>) -> Self {
        Self { state }
    }
}

impl DisplaySink for SharedSink {
    fn show_tick(&mut self, frame: &TickFrame<'_>) -> ghgcast::Result<()> {
        record_tick(frame.iteration, frame.total, frame.fresh);

        let progress = &self.state.progress;
        progress.iteration.store(frame.iteration, Ordering::SeqCst);
        progress
            .records
            .fetch_add(frame.fresh.len(), Ordering::SeqCst);

        let mut snapshot = self.state.snapshot.blocking_write();
        snapshot.iteration = frame.iteration;
        snapshot.total = frame.total;
        snapshot.latest = frame.fresh.to_vec();
        debug!(iteration = frame.iteration, "Published tick");
        Ok(())
    }

    fn show_summary(&mut self, frame: &SummaryFrame<'_>) -> ghgcast::Result<()> {
        record_summary(frame.aggregates, frame.is_final);

        let chart = GasType::ALL
            .iter()
            .map(|&gas| ChartSeries {
                gas: gas.label().to_string(),
                points: series(frame.aggregates, gas)
                    .into_iter()
                    .map(|(ts, mean)| ChartPoint {
                        time: ts.format(ghgcast::record::TIME_FORMAT).to_string(),
                        mean_prediction: mean,
                    })
                    .collect(),
            })
            .collect();

        {
            let mut snapshot = self.state.snapshot.blocking_write();
            snapshot.aggregates = frame.aggregates.to_vec();
            snapshot.chart = chart;
            snapshot.tail = frame.tail.to_vec();
            snapshot.log_len = frame.log_len;
            snapshot.finished = frame.is_final;
        }

        if frame.is_final {
            self.state.progress.finished.store(true, Ordering::SeqCst);
        }
        Ok(())
    }
}
