//! Prediction records and the append-only emission log.

use crate::reading::{GasType, Reading};
use chrono::{Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// Display format for record timestamps
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// Current local time truncated to whole seconds
pub fn wall_clock_seconds() -> NaiveDateTime {
    truncate_to_seconds(Local::now().naive_local())
}

/// Drop the sub-second part of a timestamp
pub fn truncate_to_seconds(time: NaiveDateTime) -> NaiveDateTime {
    time.with_nanosecond(0).unwrap_or(time)
}

/// A reading together with its model prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// The simulated observation
    #[serde(flatten)]
    pub reading: Reading,
    /// Predicted emission level
    pub prediction: f64,
    /// Generation time, second resolution
    pub timestamp: NaiveDateTime,
}

impl Record {
    /// Create a record, truncating the timestamp to seconds
    pub fn new(reading: Reading, prediction: f64, timestamp: NaiveDateTime) -> Self {
        Self {
            reading,
            prediction,
            timestamp: truncate_to_seconds(timestamp),
        }
    }

    /// Gas the record is attributed to
    pub fn gas_type(&self) -> GasType {
        self.reading.gas_type
    }

    /// Timestamp rendered as `HH:MM:SS`
    pub fn time_label(&self) -> String {
        self.timestamp.format(TIME_FORMAT).to_string()
    }
}

/// Append-only log of records in generation order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmissionLog {
    records: Vec<Record>,
}

impl EmissionLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record
    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    /// All records, oldest first
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// The most recent `n` records (fewer if the log is shorter)
    pub fn tail(&self, n: usize) -> &[Record] {
        let start = self.records.len().saturating_sub(n);
        &self.records[start..]
    }

    /// Most recently appended record
    pub fn last(&self) -> Option<&Record> {
        self.records.last()
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check whether the log is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate over records in generation order
    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    /// Number of records for one gas type
    pub fn count_for(&self, gas: GasType) -> usize {
        self.records.iter().filter(|r| r.gas_type() == gas).count()
    }
}

impl<'a> IntoIterator for &'a EmissionLog {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn reading(gas_type: GasType) -> Reading {
        Reading {
            site_id: 0,
            temp: 10.0,
            pressure: 1013.0,
            humidity: 50.0,
            load: 75.0,
            maintenance_flag: 0,
            gas_type,
            operational_hours: 18,
        }
    }

    #[test]
    fn test_record_truncates_timestamp() {
        let precise = at(9, 30, 15).with_nanosecond(750_000_000).unwrap();
        let record = Record::new(reading(GasType::Ch4), 1.0, precise);
        assert_eq!(record.timestamp, at(9, 30, 15));
        assert_eq!(record.time_label(), "09:30:15");
    }

    #[test]
    fn test_wall_clock_has_no_subseconds() {
        assert_eq!(wall_clock_seconds().nanosecond(), 0);
    }

    #[test]
    fn test_log_tail() {
        let mut log = EmissionLog::new();
        assert!(log.tail(5).is_empty());

        for i in 0..8 {
            log.push(Record::new(reading(GasType::Co2), i as f64, at(10, 0, i)));
        }

        let tail = log.tail(5);
        assert_eq!(tail.len(), 5);
        assert_eq!(tail[0].prediction, 3.0);
        assert_eq!(tail[4].prediction, 7.0);
        assert_eq!(log.tail(100).len(), 8);
        assert_eq!(log.last().map(|r| r.prediction), Some(7.0));
    }

    #[test]
    fn test_log_count_for() {
        let mut log = EmissionLog::new();
        log.push(Record::new(reading(GasType::Ch4), 1.0, at(10, 0, 0)));
        log.push(Record::new(reading(GasType::Co2), 2.0, at(10, 0, 0)));
        log.push(Record::new(reading(GasType::Co2), 3.0, at(10, 0, 1)));

        assert_eq!(log.len(), 3);
        assert_eq!(log.count_for(GasType::Ch4), 1);
        assert_eq!(log.count_for(GasType::Co2), 2);
    }

    #[test]
    fn test_record_serializes_flat() {
        let record = Record::new(reading(GasType::Co2), 42.5, at(8, 15, 0));
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["gas_type"], 1);
        assert_eq!(value["prediction"], 42.5);
        assert_eq!(value["timestamp"], "2025-03-01T08:15:00");
    }
}
