//! Driver loop.
//!
//! Runs a fixed number of ticks. Each tick captures one timestamp, simulates
//! a reading per gas, asks the model for a prediction, appends the records to
//! the log and hands the results to the display. The loop is synchronous; a
//! model error ends the run and the failed tick leaves no records behind.

use crate::aggregate::aggregate;
use crate::config::{DriverConfig, Redraw, TickGases};
use crate::display::{DisplaySink, SummaryFrame, TickFrame};
use crate::error::Result;
use crate::model::EmissionModel;
use crate::reading::GasType;
use crate::record::{wall_clock_seconds, EmissionLog, Record};
use crate::simulator::TelemetrySimulator;
use chrono::NaiveDateTime;
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

/// Timestamp source for ticks
pub type Clock = Box<dyn FnMut() -> NaiveDateTime + Send>;

/// Blocks between ticks
pub type Sleeper = Box<dyn FnMut(Duration) + Send>;

/// Drives simulator, model and display for one run
pub struct Driver<M> {
    config: DriverConfig,
    model: M,
    simulator: TelemetrySimulator,
    clock: Clock,
    sleeper: Sleeper,
    log: EmissionLog,
    iteration: usize,
}

impl<M: EmissionModel> Driver<M> {
    /// Create a driver; the configuration is validated here
    pub fn new(config: DriverConfig, model: M, simulator: TelemetrySimulator) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            model,
            simulator,
            clock: Box::new(wall_clock_seconds),
            sleeper: Box::new(thread::sleep),
            log: EmissionLog::new(),
            iteration: 0,
        })
    }

    /// Replace the wall clock
    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: FnMut() -> NaiveDateTime + Send + 'static,
    {
        self.clock = Box::new(clock);
        self
    }

    /// Replace the pause between ticks
    pub fn with_sleeper<F>(mut self, sleeper: F) -> Self
    where
        F: FnMut(Duration) + Send + 'static,
    {
        self.sleeper = Box::new(sleeper);
        self
    }

    /// Run every remaining tick, pausing between them
    pub fn run<S: DisplaySink + ?Sized>(&mut self, sink: &mut S) -> Result<()> {
        info!(
            iterations = self.config.iterations,
            gases = %self.config.gases,
            redraw = %self.config.redraw,
            model = self.model.name(),
            "Starting emission forecast run"
        );

        let pause = self.config.pause();
        while self.step(sink)? {
            if !self.is_finished() && !pause.is_zero() {
                (self.sleeper)(pause);
            }
        }

        if self.config.redraw == Redraw::EndOfRun {
            self.publish_summary(sink)?;
        }

        info!(records = self.log.len(), "Emission forecast run complete");
        Ok(())
    }

    /// Execute one tick. Returns `false` once all iterations are done.
    pub fn step<S: DisplaySink + ?Sized>(&mut self, sink: &mut S) -> Result<bool> {
        if self.is_finished() {
            return Ok(false);
        }
        let iteration = self.iteration + 1;

        let timestamp = (self.clock)();
        let gases: Vec<GasType> = match self.config.gases {
            TickGases::Both => GasType::ALL.to_vec(),
            TickGases::RandomOne => vec![self.simulator.random_gas()],
        };

        let mut fresh = Vec::with_capacity(gases.len());
        for gas in gases {
            let reading = self.simulator.generate_reading(gas);
            let prediction = self.model.predict(&reading)?;
            debug!(
                iteration,
                site = reading.site_id,
                gas = %gas,
                prediction,
                "Predicted emission"
            );
            fresh.push(Record::new(reading, prediction, timestamp));
        }

        let start = self.log.len();
        for record in fresh {
            self.log.push(record);
        }

        sink.show_tick(&TickFrame {
            iteration,
            total: self.config.iterations,
            fresh: &self.log.records()[start..],
        })?;
        self.iteration = iteration;

        if self.config.redraw == Redraw::EveryTick {
            self.publish_summary(sink)?;
        }

        info!(
            iteration = self.iteration,
            total = self.config.iterations,
            records = self.log.len(),
            "Tick complete"
        );
        Ok(true)
    }

    fn publish_summary<S: DisplaySink + ?Sized>(&self, sink: &mut S) -> Result<()> {
        let rows = aggregate(self.log.records());
        sink.show_summary(&SummaryFrame {
            iteration: self.iteration,
            aggregates: &rows,
            tail: self.log.tail(self.config.tail_len),
            log_len: self.log.len(),
            is_final: self.is_finished(),
        })
    }

    /// Whether every iteration has run
    pub fn is_finished(&self) -> bool {
        self.iteration >= self.config.iterations
    }

    /// Iterations completed so far
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// The log accumulated so far
    pub fn log(&self) -> &EmissionLog {
        &self.log
    }

    /// Consume the driver and keep its log
    pub fn into_log(self) -> EmissionLog {
        self.log
    }
}
