//! Calendar-week rollup of the daily forecast.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::Serialize;

use crate::numeric::round_to;

use super::workload::DailyForecast;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyForecast {
    pub week_index: u32,
    /// Calendar bounds of the week
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    /// Forecast days that fall inside this week (fewer than 7 at the edges)
    pub days: u32,
    pub existing_reviews: u32,
    pub new_lesson_reviews: u32,
    pub total: u32,
    pub daily_average: f64,
}

impl WeeklyForecast {
    pub fn is_partial(&self) -> bool {
        self.days < 7
    }
}

/// First day of the calendar week containing `date`
pub fn week_start_of(date: NaiveDate, week_start: Weekday) -> NaiveDate {
    let back = (7 + date.weekday().num_days_from_monday() - week_start.num_days_from_monday()) % 7;
    date - Duration::days(back as i64)
}

pub fn aggregate_weeks(daily: &[DailyForecast], week_start: Weekday) -> Vec<WeeklyForecast> {
    let mut weeks: Vec<WeeklyForecast> = Vec::new();

    for day in daily {
        let start = week_start_of(day.date, week_start);
        let same_week = weeks.last().is_some_and(|w| w.week_start == start);
        if !same_week {
            weeks.push(WeeklyForecast {
                week_index: weeks.len() as u32,
                week_start: start,
                week_end: start + Duration::days(6),
                days: 0,
                existing_reviews: 0,
                new_lesson_reviews: 0,
                total: 0,
                daily_average: 0.0,
            });
        }
        if let Some(week) = weeks.last_mut() {
            week.days += 1;
            week.existing_reviews += day.existing_reviews;
            week.new_lesson_reviews += day.new_lesson_reviews;
            week.total += day.total;
        }
    }

    for week in &mut weeks {
        if week.days > 0 {
            week.daily_average = round_to(week.total as f64 / week.days as f64, 1);
        }
    }

    weeks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(start: NaiveDate, totals: &[u32]) -> Vec<DailyForecast> {
        totals
            .iter()
            .enumerate()
            .map(|(i, &total)| DailyForecast {
                day_index: i as u32,
                date: start + Duration::days(i as i64),
                existing_reviews: total / 2,
                new_lesson_reviews: total - total / 2,
                total,
            })
            .collect()
    }

    #[test]
    fn test_week_start_of() {
        // 2024-05-10 is a Friday
        let friday = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        assert_eq!(
            week_start_of(friday, Weekday::Mon),
            NaiveDate::from_ymd_opt(2024, 5, 6).unwrap()
        );
        assert_eq!(
            week_start_of(friday, Weekday::Sun),
            NaiveDate::from_ymd_opt(2024, 5, 5).unwrap()
        );
        assert_eq!(week_start_of(friday, Weekday::Fri), friday);
    }

    #[test]
    fn test_partial_first_and_last_weeks() {
        let friday = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        // Fri..Sun (3), Mon..Sun (7), Mon..Tue (2)
        let daily = series(friday, &[10; 12]);
        let weeks = aggregate_weeks(&daily, Weekday::Mon);

        assert_eq!(weeks.len(), 3);
        assert_eq!(weeks[0].days, 3);
        assert!(weeks[0].is_partial());
        assert_eq!(weeks[1].days, 7);
        assert!(!weeks[1].is_partial());
        assert_eq!(weeks[2].days, 2);
        assert_eq!(weeks[1].total, 70);
        assert_eq!(weeks[2].daily_average, 10.0);
        assert_eq!(weeks[1].week_start, NaiveDate::from_ymd_opt(2024, 5, 13).unwrap());
        assert_eq!(weeks[1].week_end, NaiveDate::from_ymd_opt(2024, 5, 19).unwrap());
    }

    #[test]
    fn test_totals_are_conserved() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        let daily = series(start, &[1, 4, 9, 16, 25, 36, 49, 64, 81, 100]);
        let weeks = aggregate_weeks(&daily, Weekday::Sun);
        let weekly_total: u32 = weeks.iter().map(|w| w.total).sum();
        let daily_total: u32 = daily.iter().map(|d| d.total).sum();
        assert_eq!(weekly_total, daily_total);
        let existing: u32 = weeks.iter().map(|w| w.existing_reviews).sum();
        let new: u32 = weeks.iter().map(|w| w.new_lesson_reviews).sum();
        assert_eq!(existing + new, weekly_total);
    }

    #[test]
    fn test_daily_average_rounds() {
        let monday = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap();
        let weeks = aggregate_weeks(&series(monday, &[1, 2, 2]), Weekday::Mon);
        assert_eq!(weeks[0].daily_average, 1.7);
        assert!(aggregate_weeks(&[], Weekday::Mon).is_empty());
    }
}
