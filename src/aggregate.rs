//! Emission aggregator.
//!
//! Groups records by `(timestamp, gas_type)` and averages their predictions.
//! Groups come out in the order their key first appears in the input, so a
//! chronological log yields a chronological chart.

use crate::reading::GasType;
use crate::record::{Record, TIME_FORMAT};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Mean prediction of one `(timestamp, gas_type)` group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRow {
    pub timestamp: NaiveDateTime,
    pub gas_type: GasType,
    pub mean_prediction: f64,
    /// Number of records in the group
    pub count: usize,
}

impl AggregateRow {
    /// Timestamp rendered as `HH:MM:SS`
    pub fn time_label(&self) -> String {
        self.timestamp.format(TIME_FORMAT).to_string()
    }
}

/// Group `log` by `(timestamp, gas_type)` and average each group's predictions.
///
/// Returns one row per distinct key in first-appearance order. The input is
/// never modified; an empty log yields no rows.
pub fn aggregate(log: &[Record]) -> Vec<AggregateRow> {
    let mut index: HashMap<(NaiveDateTime, GasType), usize> = HashMap::new();
    let mut groups: Vec<(NaiveDateTime, GasType, f64, usize)> = Vec::new();

    for record in log {
        let key = (record.timestamp, record.gas_type());
        let slot = *index.entry(key).or_insert_with(|| {
            groups.push((key.0, key.1, 0.0, 0));
            groups.len() - 1
        });
        let group = &mut groups[slot];
        group.2 += record.prediction;
        group.3 += 1;
    }

    groups
        .into_iter()
        .map(|(timestamp, gas_type, sum, count)| AggregateRow {
            timestamp,
            gas_type,
            mean_prediction: sum / count as f64,
            count,
        })
        .collect()
}

/// Chart series of one gas: `(timestamp, mean)` pairs in row order
pub fn series(rows: &[AggregateRow], gas_type: GasType) -> Vec<(NaiveDateTime, f64)> {
    rows.iter()
        .filter(|r| r.gas_type == gas_type)
        .map(|r| (r.timestamp, r.mean_prediction))
        .collect()
}

/// Summary statistics of the predictions for one gas
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GasSummary {
    pub gas_type: GasType,
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

/// Per-gas prediction statistics over the whole log, in gas code order.
/// Gases without records are omitted.
pub fn summarize(log: &[Record]) -> Vec<GasSummary> {
    GasType::ALL
        .iter()
        .filter_map(|&gas| {
            let predictions: Vec<f64> = log
                .iter()
                .filter(|r| r.gas_type() == gas)
                .map(|r| r.prediction)
                .collect();
            if predictions.is_empty() {
                return None;
            }
            let count = predictions.len();
            Some(GasSummary {
                gas_type: gas,
                count,
                mean: predictions.iter().sum::<f64>() / count as f64,
                min: predictions.iter().copied().fold(f64::INFINITY, f64::min),
                max: predictions.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reading::Reading;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn at(s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(12, 0, s)
            .unwrap()
    }

    fn record(s: u32, gas_type: GasType, prediction: f64) -> Record {
        let reading = Reading {
            site_id: 1,
            temp: 10.0,
            pressure: 1013.0,
            humidity: 50.0,
            load: 70.0,
            maintenance_flag: 0,
            gas_type,
            operational_hours: 17,
        };
        Record::new(reading, prediction, at(s))
    }

    #[test]
    fn test_aggregate_empty() {
        assert!(aggregate(&[]).is_empty());
    }

    #[test]
    fn test_aggregate_single_record() {
        let rows = aggregate(&[record(0, GasType::Ch4, 7.25)]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].mean_prediction, 7.25);
        assert_eq!(rows[0].count, 1);
    }

    #[test]
    fn test_aggregate_same_group_mean() {
        let log = vec![record(0, GasType::Co2, 2.0), record(0, GasType::Co2, 4.0)];
        let rows = aggregate(&log);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].mean_prediction, 3.0);
        assert_eq!(rows[0].count, 2);
        assert_eq!(rows[0].gas_type, GasType::Co2);
        assert_eq!(rows[0].time_label(), "12:00:00");
    }

    #[test]
    fn test_aggregate_distinct_groups() {
        let log = vec![
            record(0, GasType::Ch4, 10.0),
            record(0, GasType::Co2, 100.0),
            record(0, GasType::Ch4, 20.0),
        ];
        let rows = aggregate(&log);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].gas_type, GasType::Ch4);
        assert_relative_eq!(rows[0].mean_prediction, 15.0);
        assert_eq!(rows[1].gas_type, GasType::Co2);
        assert_relative_eq!(rows[1].mean_prediction, 100.0);
    }

    #[test]
    fn test_aggregate_first_appearance_order() {
        // CO2 appears first at t=0, CH4 first at t=1; later t=0 CH4 must come after both
        let log = vec![
            record(0, GasType::Co2, 1.0),
            record(1, GasType::Ch4, 2.0),
            record(0, GasType::Ch4, 3.0),
            record(1, GasType::Co2, 4.0),
            record(0, GasType::Co2, 5.0),
        ];
        let keys: Vec<(u32, GasType)> = aggregate(&log)
            .iter()
            .map(|r| (chrono::Timelike::second(&r.timestamp), r.gas_type))
            .collect();

        assert_eq!(
            keys,
            vec![
                (0, GasType::Co2),
                (1, GasType::Ch4),
                (0, GasType::Ch4),
                (1, GasType::Co2),
            ]
        );
    }

    #[test]
    fn test_aggregate_idempotent() {
        let log = vec![
            record(0, GasType::Ch4, 1.5),
            record(0, GasType::Co2, 2.5),
            record(1, GasType::Ch4, 3.5),
        ];
        let snapshot = log.clone();

        let first = aggregate(&log);
        let second = aggregate(&log);
        assert_eq!(first, second);
        assert_eq!(log, snapshot);
    }

    #[test]
    fn test_series() {
        let log = vec![
            record(0, GasType::Ch4, 1.0),
            record(0, GasType::Co2, 2.0),
            record(1, GasType::Ch4, 3.0),
        ];
        let rows = aggregate(&log);

        let ch4 = series(&rows, GasType::Ch4);
        assert_eq!(ch4, vec![(at(0), 1.0), (at(1), 3.0)]);
        assert_eq!(series(&rows, GasType::Co2), vec![(at(0), 2.0)]);
    }

    #[test]
    fn test_summarize() {
        let log = vec![
            record(0, GasType::Co2, 2.0),
            record(1, GasType::Co2, 6.0),
            record(2, GasType::Co2, 4.0),
        ];
        let summary = summarize(&log);

        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].gas_type, GasType::Co2);
        assert_eq!(summary[0].count, 3);
        assert_relative_eq!(summary[0].mean, 4.0);
        assert_eq!(summary[0].min, 2.0);
        assert_eq!(summary[0].max, 6.0);
        assert!(summarize(&[]).is_empty());
    }
}
