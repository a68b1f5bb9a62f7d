//! Display boundary.
//!
//! The driver hands each iteration's fresh records, and periodically the
//! aggregate table plus the log tail, to a [`DisplaySink`]. Rendering is up
//! to the sink.

use crate::aggregate::AggregateRow;
use crate::error::Result;
use crate::record::Record;
use std::io::Write;

/// Records produced by one driver iteration
#[derive(Debug, Clone, Copy)]
pub struct TickFrame<'a> {
    /// 1-based iteration number
    pub iteration: usize,
    /// Total iterations of the run
    pub total: usize,
    /// Records generated in this iteration
    pub fresh: &'a [Record],
}

/// Aggregate view of the log
#[derive(Debug, Clone, Copy)]
pub struct SummaryFrame<'a> {
    /// Iteration after which the summary was computed
    pub iteration: usize,
    /// Mean prediction per `(timestamp, gas_type)`
    pub aggregates: &'a [AggregateRow],
    /// Most recent records
    pub tail: &'a [Record],
    /// Total records in the log
    pub log_len: usize,
    /// Set on the last summary of the run
    pub is_final: bool,
}

/// Rendering surface for driver output
pub trait DisplaySink {
    /// Show the records generated by one iteration
    fn show_tick(&mut self, frame: &TickFrame<'_>) -> Result<()>;

    /// Show the aggregate table and log tail
    fn show_summary(&mut self, frame: &SummaryFrame<'_>) -> Result<()>;
}

impl<S: DisplaySink + ?Sized> DisplaySink for &mut S {
    fn show_tick(&mut self, frame: &TickFrame<'_>) -> Result<()> {
        (**self).show_tick(frame)
    }

    fn show_summary(&mut self, frame: &SummaryFrame<'_>) -> Result<()> {
        (**self).show_summary(frame)
    }
}

/// Sink that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DisplaySink for NullSink {
    fn show_tick(&mut self, _frame: &TickFrame<'_>) -> Result<()> {
        Ok(())
    }

    fn show_summary(&mut self, _frame: &SummaryFrame<'_>) -> Result<()> {
        Ok(())
    }
}

/// Plain-text tables written to any [`Write`]
pub struct ConsoleSink<W: Write> {
    out: W,
}

impl<W: Write> ConsoleSink<W> {
    /// Create a sink writing to `out`
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Recover the underlying writer
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl ConsoleSink<std::io::Stdout> {
    /// Sink writing to standard output
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> DisplaySink for ConsoleSink<W> {
    fn show_tick(&mut self, frame: &TickFrame<'_>) -> Result<()> {
        writeln!(self.out, "[{}/{}]", frame.iteration, frame.total)?;
        for record in frame.fresh {
            let r = &record.reading;
            writeln!(
                self.out,
                "  {} site={} gas={} temp={:.2} pressure={:.2} humidity={:.1} load={:.1} maintenance={} hours={}",
                record.time_label(),
                r.site_id,
                r.gas_type,
                r.temp,
                r.pressure,
                r.humidity,
                r.load,
                r.maintenance_flag,
                r.operational_hours
            )?;
            writeln!(
                self.out,
                "  predicted emission ({}): {:.2} units",
                r.gas_type, record.prediction
            )?;
        }
        self.out.flush()?;
        Ok(())
    }

    fn show_summary(&mut self, frame: &SummaryFrame<'_>) -> Result<()> {
        writeln!(
            self.out,
            "-- Emission forecast ({} records{}) --",
            frame.log_len,
            if frame.is_final { ", final" } else { "" }
        )?;
        writeln!(self.out, "{:<10} {:<5} {:>12} {:>6}", "time", "gas", "mean", "n")?;
        for row in frame.aggregates {
            writeln!(
                self.out,
                "{:<10} {:<5} {:>12.2} {:>6}",
                row.time_label(),
                row.gas_type.label(),
                row.mean_prediction,
                row.count
            )?;
        }

        writeln!(self.out, "-- Latest observations --")?;
        writeln!(
            self.out,
            "{:<10} {:>8} {:>10} {:>8} {:<5} {:>12}",
            "time", "temp", "pressure", "load", "gas", "prediction"
        )?;
        for record in frame.tail {
            let r = &record.reading;
            writeln!(
                self.out,
                "{:<10} {:>8.2} {:>10.2} {:>8.2} {:<5} {:>12.2}",
                record.time_label(),
                r.temp,
                r.pressure,
                r.load,
                r.gas_type.label(),
                record.prediction
            )?;
        }
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::reading::{GasType, Reading};
    use chrono::NaiveDate;

    fn records() -> Vec<Record> {
        let ts = NaiveDate::from_ymd_opt(2025, 1, 15)
            .unwrap()
            .and_hms_opt(14, 5, 9)
            .unwrap();
        GasType::ALL
            .iter()
            .enumerate()
            .map(|(i, &gas_type)| {
                let reading = Reading {
                    site_id: i as u8,
                    temp: 11.0,
                    pressure: 1012.5,
                    humidity: 40.0,
                    load: 66.0,
                    maintenance_flag: 0,
                    gas_type,
                    operational_hours: 22,
                };
                Record::new(reading, 10.0 * (i + 1) as f64, ts)
            })
            .collect()
    }

    #[test]
    fn test_console_tick_output() {
        let records = records();
        let mut sink = ConsoleSink::new(Vec::new());
        sink.show_tick(&TickFrame {
            iteration: 3,
            total: 20,
            fresh: &records,
        })
        .unwrap();

        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert!(text.starts_with("[3/20]"));
        assert!(text.contains("14:05:09"));
        assert!(text.contains("predicted emission (CH₄): 10.00 units"));
        assert!(text.contains("predicted emission (CO₂): 20.00 units"));
    }

    #[test]
    fn test_console_summary_output() {
        let records = records();
        let rows = aggregate(&records);
        let mut sink = ConsoleSink::new(Vec::new());
        sink.show_summary(&SummaryFrame {
            iteration: 1,
            aggregates: &rows,
            tail: &records,
            log_len: records.len(),
            is_final: true,
        })
        .unwrap();

        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert!(text.contains("2 records, final"));
        assert!(text.contains("Latest observations"));
        assert_eq!(text.matches("14:05:09").count(), 4);
    }

    #[test]
    fn test_null_sink() {
        let records = records();
        let mut sink = NullSink;
        assert!(sink
            .show_tick(&TickFrame {
                iteration: 1,
                total: 1,
                fresh: &records,
            })
            .is_ok());
    }
}
