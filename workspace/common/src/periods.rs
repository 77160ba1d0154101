//! Fixed teaching periods of a school day.
//!
//! Class schedules are entered by period index; the table below is the only
//! source of the clock times behind an index.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// (index, start hour, start minute, end hour, end minute)
const PERIOD_TABLE: [(i32, u32, u32, u32, u32); 6] = [
    (1, 7, 15, 9, 15),
    (2, 9, 25, 11, 25),
    (3, 12, 0, 14, 0),
    (4, 14, 10, 16, 10),
    (5, 16, 20, 18, 20),
    (6, 18, 30, 20, 30),
];

/// Period index used when a stored start time matches no period.
pub const DEFAULT_PERIOD: i32 = 1;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PeriodError {
    #[error("Invalid period index: {0}")]
    InvalidPeriod(i32),
}

/// One row of the period table, ready for form rendering.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct PeriodSlot {
    pub index: i32,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub label: String,
}

fn clock(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

fn label(index: i32, start: NaiveTime, end: NaiveTime) -> String {
    format!(
        "Period {} ({} - {})",
        index,
        start.format("%H:%M"),
        end.format("%H:%M")
    )
}

/// Returns the (start, end) clock times of a period.
pub fn period_to_time(index: i32) -> Result<(NaiveTime, NaiveTime), PeriodError> {
    PERIOD_TABLE
        .iter()
        .find(|(i, ..)| *i == index)
        .map(|&(_, sh, sm, eh, em)| (clock(sh, sm), clock(eh, em)))
        .ok_or(PeriodError::InvalidPeriod(index))
}

/// Returns the period starting exactly at `start`, if any.
pub fn time_to_period(start: NaiveTime) -> Option<i32> {
    PERIOD_TABLE
        .iter()
        .find(|&&(_, sh, sm, ..)| clock(sh, sm) == start)
        .map(|(i, ..)| *i)
}

/// All periods in teaching order.
pub fn periods() -> Vec<PeriodSlot> {
    PERIOD_TABLE
        .iter()
        .map(|&(index, sh, sm, eh, em)| {
            let (start, end) = (clock(sh, sm), clock(eh, em));
            PeriodSlot {
                index,
                start,
                end,
                label: label(index, start, end),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_period_times() {
        let (start, end) = period_to_time(1).unwrap();
        assert_eq!(start, NaiveTime::from_hms_opt(7, 15, 0).unwrap());
        assert_eq!(end, NaiveTime::from_hms_opt(9, 15, 0).unwrap());
    }

    #[test]
    fn test_unknown_period_is_rejected() {
        assert_eq!(period_to_time(99), Err(PeriodError::InvalidPeriod(99)));
        assert_eq!(period_to_time(0), Err(PeriodError::InvalidPeriod(0)));
        assert_eq!(
            period_to_time(-3).unwrap_err().to_string(),
            "Invalid period index: -3"
        );
    }

    #[test]
    fn test_reverse_lookup_requires_exact_start() {
        assert_eq!(time_to_period(NaiveTime::from_hms_opt(12, 0, 0).unwrap()), Some(3));
        assert_eq!(time_to_period(NaiveTime::from_hms_opt(18, 30, 0).unwrap()), Some(6));
        assert_eq!(time_to_period(NaiveTime::from_hms_opt(12, 1, 0).unwrap()), None);
        // An end time is not a start time
        assert_eq!(time_to_period(NaiveTime::from_hms_opt(9, 15, 0).unwrap()), None);
    }

    #[test]
    fn test_every_period_round_trips_and_is_ordered() {
        let all = periods();
        assert_eq!(all.len(), 6);
        for pair in all.windows(2) {
            assert!(pair[0].end <= pair[1].start);
        }
        for slot in &all {
            assert!(slot.start < slot.end);
            assert_eq!(time_to_period(slot.start), Some(slot.index));
        }
    }

    #[test]
    fn test_labels_follow_clock_times() {
        let all = periods();
        assert_eq!(all[1].label, "Period 2 (09:25 - 11:25)");
        assert!(all.iter().all(|slot| slot.label.starts_with(&format!("Period {} (", slot.index))));
    }
}
