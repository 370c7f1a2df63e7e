//! Time step metadata.

use chrono::NaiveDateTime;
use rg_core::{Time, days};
use serde::{Deserialize, Serialize};

use crate::{ResultsError, ResultsResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeStepInfo {
    pub date: NaiveDateTime,
    pub days_since_start: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_number: Option<i32>,
}

impl TimeStepInfo {
    pub fn new(date: NaiveDateTime, days_since_start: f64, report_number: Option<i32>) -> Self {
        Self {
            date,
            days_since_start,
            report_number,
        }
    }

    /// Simulated time since the start date.
    pub fn elapsed(&self) -> Time {
        days(self.days_since_start)
    }

    /// Zip parallel arrays. `report_numbers` may be empty (no report numbers).
    pub fn from_parts(
        dates: &[NaiveDateTime],
        days_since_start: &[f64],
        report_numbers: &[i32],
    ) -> ResultsResult<Vec<Self>> {
        let reports_ok = report_numbers.is_empty() || report_numbers.len() == dates.len();
        if dates.len() != days_since_start.len() || !reports_ok {
            return Err(ResultsError::TimeStepInfoMismatch {
                dates: dates.len(),
                days: days_since_start.len(),
                reports: report_numbers.len(),
            });
        }

        Ok(dates
            .iter()
            .zip(days_since_start)
            .enumerate()
            .map(|(i, (date, d))| Self::new(*date, *d, report_numbers.get(i).copied()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rg_core::in_days;

    fn date(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2020, 1, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn zips_parallel_arrays() {
        let infos = TimeStepInfo::from_parts(&[date(1), date(11)], &[0.0, 10.0], &[1, 2]).unwrap();
        assert_eq!(infos.len(), 2);
        assert_eq!(infos[1].report_number, Some(2));
        assert!((in_days(infos[1].elapsed()) - 10.0).abs() < 1e-12);

        let no_reports = TimeStepInfo::from_parts(&[date(1)], &[0.0], &[]).unwrap();
        assert_eq!(no_reports[0].report_number, None);
    }

    #[test]
    fn rejects_mismatched_lengths() {
        let err = TimeStepInfo::from_parts(&[date(1), date(2)], &[0.0], &[]).unwrap_err();
        assert!(matches!(err, ResultsError::TimeStepInfoMismatch { dates: 2, days: 1, .. }));
        assert!(TimeStepInfo::from_parts(&[date(1)], &[0.0], &[1, 2]).is_err());
    }

    #[test]
    fn serde_round_trip() {
        let info = TimeStepInfo::new(date(3), 2.0, None);
        let json = serde_json::to_string(&info).unwrap();
        assert!(!json.contains("report_number"));
        let back: TimeStepInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(back, info);
    }
}
