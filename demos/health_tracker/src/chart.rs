//! Time-windowed chart series: the data shaping behind the line chart.

use chrono::{Days, Months, NaiveDate};

use crate::records::HealthRecord;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Period {
    Week,
    Month,
    Year,
}

impl Period {
    /// First date inside the window ending at `today` (inclusive).
    pub fn window_start(&self, today: NaiveDate) -> NaiveDate {
        match self {
            // last 7 days including today
            Period::Week => today.checked_sub_days(Days::new(6)).unwrap_or(today),
            Period::Month => today
                .checked_sub_months(Months::new(1))
                .unwrap_or(today),
            Period::Year => today
                .checked_sub_months(Months::new(12))
                .unwrap_or(today),
        }
    }
}

/// Parallel series for the three measurements, oldest first.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub weight: Vec<f32>,
    pub fat: Vec<f32>,
    pub muscle: Vec<f32>,
}

pub fn series(records: &[HealthRecord], period: Period, today: NaiveDate) -> ChartSeries {
    let start = period.window_start(today);
    let mut windowed: Vec<&HealthRecord> =
        records.iter().filter(|r| r.date >= start).collect();
    windowed.sort_by_key(|r| r.date);

    let mut out = ChartSeries::default();
    for r in windowed {
        out.labels.push(r.date.to_string());
        out.weight.push(r.weight);
        out.fat.push(r.fat);
        out.muscle.push(r.muscle);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn rec(d: &str, weight: f32) -> HealthRecord {
        HealthRecord {
            date: date(d),
            weight,
            fat: 25.0,
            muscle: 30.0,
        }
    }

    #[test]
    fn week_window_is_seven_days_inclusive() {
        let today = date("2026-08-24");
        assert_eq!(Period::Week.window_start(today), date("2026-08-18"));
    }

    #[test]
    fn month_and_year_windows_use_calendar_arithmetic() {
        let today = date("2026-03-31");
        assert_eq!(Period::Month.window_start(today), date("2026-02-28"));
        assert_eq!(Period::Year.window_start(today), date("2025-03-31"));
    }

    #[test]
    fn series_filters_and_sorts_ascending() {
        let records = [
            rec("2026-08-23", 59.5),
            rec("2026-08-10", 61.0), // outside the week window
            rec("2026-08-19", 60.2),
        ];
        let s = series(&records, Period::Week, date("2026-08-24"));
        assert_eq!(s.labels, ["2026-08-19", "2026-08-23"]);
        assert_eq!(s.weight, [60.2, 59.5]);
        assert_eq!(s.fat.len(), 2);
        assert_eq!(s.muscle.len(), 2);

        let all = series(&records, Period::Year, date("2026-08-24"));
        assert_eq!(all.labels.len(), 3);
        assert_eq!(all.labels[0], "2026-08-10");
    }
}
