// ABOUTME: Week/month completion ratios and calendar aggregation over plan days
// ABOUTME: Pure functions over (date, status) pairs so they are testable without storage
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};

use super::workout::DayStatus;

/// Counts and ratio for one date window
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CompletionWindow {
    /// First date of the window (inclusive)
    pub start: NaiveDate,
    /// Last date of the window (inclusive)
    pub end: NaiveDate,
    /// Plan days scheduled in the window
    pub scheduled: u32,
    /// Days completed
    pub completed: u32,
    /// Days failed
    pub failed: u32,
    /// Days still pending
    pub pending: u32,
    /// `completed / scheduled`, two decimals, 0.0 when nothing is scheduled
    pub ratio: f64,
}

impl CompletionWindow {
    /// Aggregate the days falling inside `[start, end]`
    #[must_use]
    pub fn compute(start: NaiveDate, end: NaiveDate, days: &[(NaiveDate, DayStatus)]) -> Self {
        let mut window = Self {
            start,
            end,
            scheduled: 0,
            completed: 0,
            failed: 0,
            pending: 0,
            ratio: 0.0,
        };

        for (_, status) in days.iter().filter(|(date, _)| *date >= start && *date <= end) {
            window.scheduled += 1;
            match status {
                DayStatus::Completed => window.completed += 1,
                DayStatus::Failed => window.failed += 1,
                DayStatus::Pending => window.pending += 1,
            }
        }

        if window.scheduled > 0 {
            let raw = f64::from(window.completed) / f64::from(window.scheduled);
            window.ratio = (raw * 100.0).round() / 100.0;
        }
        window
    }
}

/// Week and month completion around a reference date
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ProgressSummary {
    /// Date the windows were computed for
    pub reference_date: NaiveDate,
    /// Monday..Sunday week containing the reference date
    pub week: CompletionWindow,
    /// Calendar month containing the reference date
    pub month: CompletionWindow,
}

impl ProgressSummary {
    /// Compute week and month windows for `reference`
    ///
    /// # Errors
    ///
    /// Returns an error if the month bounds cannot be represented
    pub fn compute(reference: NaiveDate, days: &[(NaiveDate, DayStatus)]) -> AppResult<Self> {
        let (week_start, week_end) = week_bounds(reference);
        let (month_start, month_end) = month_bounds(reference.year(), reference.month())?;
        Ok(Self {
            reference_date: reference,
            week: CompletionWindow::compute(week_start, week_end, days),
            month: CompletionWindow::compute(month_start, month_end, days),
        })
    }
}

/// Monday and Sunday of the week containing `date`
#[must_use]
pub fn week_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = date - Duration::days(i64::from(date.weekday().num_days_from_monday()));
    (start, start + Duration::days(6))
}

/// First and last date of a calendar month
///
/// # Errors
///
/// Returns an error for an invalid year/month
pub fn month_bounds(year: i32, month: u32) -> AppResult<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| AppError::invalid_format(format!("Invalid month: {year}-{month:02}")))?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(|| AppError::invalid_format(format!("Invalid month: {year}-{month:02}")))?;
    Ok((start, next - Duration::days(1)))
}

/// Parse a `YYYY-MM` month parameter
///
/// # Errors
///
/// Returns `INVALID_FORMAT` for anything else
pub fn parse_month(value: &str) -> AppResult<(i32, u32)> {
    let (year, month) = value
        .split_once('-')
        .ok_or_else(|| AppError::invalid_format("Month must be formatted as YYYY-MM"))?;
    let year: i32 = year
        .parse()
        .map_err(|_| AppError::invalid_format("Month must be formatted as YYYY-MM"))?;
    let month: u32 = month
        .parse()
        .map_err(|_| AppError::invalid_format("Month must be formatted as YYYY-MM"))?;
    if !(1..=12).contains(&month) {
        return Err(AppError::invalid_format("Month must be between 01 and 12"));
    }
    Ok((year, month))
}

/// Overall state of one calendar date
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CalendarDayStatus {
    /// Every scheduled day completed
    Completed,
    /// At least one scheduled day failed
    Failed,
    /// Some completed, some still pending
    Mixed,
    /// Nothing reported yet
    Pending,
}

/// Aggregated plan days for one date
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CalendarDay {
    /// Calendar date
    pub date: NaiveDate,
    /// Completed days
    pub completed: u32,
    /// Failed days
    pub failed: u32,
    /// Pending days
    pub pending: u32,
    /// Overall state
    pub status: CalendarDayStatus,
}

/// Group plan days by date for the given month, ordered by date
///
/// # Errors
///
/// Returns an error for an invalid year/month
pub fn calendar_month(
    year: i32,
    month: u32,
    days: &[(NaiveDate, DayStatus)],
) -> AppResult<Vec<CalendarDay>> {
    let (start, end) = month_bounds(year, month)?;
    let mut grouped: BTreeMap<NaiveDate, (u32, u32, u32)> = BTreeMap::new();

    for (date, status) in days.iter().filter(|(date, _)| *date >= start && *date <= end) {
        let entry = grouped.entry(*date).or_default();
        match status {
            DayStatus::Completed => entry.0 += 1,
            DayStatus::Failed => entry.1 += 1,
            DayStatus::Pending => entry.2 += 1,
        }
    }

    Ok(grouped
        .into_iter()
        .map(|(date, (completed, failed, pending))| {
            let status = if failed > 0 {
                CalendarDayStatus::Failed
            } else if pending == 0 {
                CalendarDayStatus::Completed
            } else if completed > 0 {
                CalendarDayStatus::Mixed
            } else {
                CalendarDayStatus::Pending
            };
            CalendarDay {
                date,
                completed,
                failed,
                pending,
                status,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_week_bounds_start_on_monday() {
        // 2025-03-13 is a Thursday
        let (start, end) = week_bounds(d(2025, 3, 13));
        assert_eq!(start, d(2025, 3, 10));
        assert_eq!(end, d(2025, 3, 16));

        let (start, _) = week_bounds(d(2025, 3, 10));
        assert_eq!(start, d(2025, 3, 10));
    }

    #[test]
    fn test_month_bounds_handle_december_and_leap_years() {
        assert_eq!(
            month_bounds(2024, 12).unwrap(),
            (d(2024, 12, 1), d(2024, 12, 31))
        );
        assert_eq!(month_bounds(2024, 2).unwrap().1, d(2024, 2, 29));
        assert!(month_bounds(2024, 13).is_err());
    }

    #[test]
    fn test_progress_ratios() {
        let days = vec![
            (d(2025, 3, 10), DayStatus::Completed),
            (d(2025, 3, 11), DayStatus::Failed),
            (d(2025, 3, 12), DayStatus::Completed),
            (d(2025, 3, 14), DayStatus::Pending),
            (d(2025, 3, 3), DayStatus::Completed),
            (d(2025, 4, 1), DayStatus::Completed),
        ];
        let summary = ProgressSummary::compute(d(2025, 3, 13), &days).unwrap();

        assert_eq!(summary.week.scheduled, 4);
        assert_eq!(summary.week.completed, 2);
        assert_eq!(summary.week.failed, 1);
        assert_eq!(summary.week.pending, 1);
        assert!((summary.week.ratio - 0.5).abs() < f64::EPSILON);

        assert_eq!(summary.month.scheduled, 5);
        assert!((summary.month.ratio - 0.6).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_window_has_zero_ratio() {
        let summary = ProgressSummary::compute(d(2025, 3, 13), &[]).unwrap();
        assert_eq!(summary.week.scheduled, 0);
        assert!(summary.week.ratio.abs() < f64::EPSILON);
    }

    #[test]
    fn test_ratio_is_rounded_to_two_decimals() {
        let days = vec![
            (d(2025, 3, 10), DayStatus::Completed),
            (d(2025, 3, 11), DayStatus::Pending),
            (d(2025, 3, 12), DayStatus::Pending),
        ];
        let window = CompletionWindow::compute(d(2025, 3, 10), d(2025, 3, 16), &days);
        assert!((window.ratio - 0.33).abs() < f64::EPSILON);
    }

    #[test]
    fn test_calendar_groups_by_date() {
        let days = vec![
            (d(2025, 3, 10), DayStatus::Completed),
            (d(2025, 3, 10), DayStatus::Pending),
            (d(2025, 3, 11), DayStatus::Completed),
            (d(2025, 3, 12), DayStatus::Failed),
            (d(2025, 3, 12), DayStatus::Completed),
            (d(2025, 3, 13), DayStatus::Pending),
            (d(2025, 2, 28), DayStatus::Completed),
        ];
        let calendar = calendar_month(2025, 3, &days).unwrap();
        assert_eq!(calendar.len(), 4);
        assert_eq!(calendar[0].status, CalendarDayStatus::Mixed);
        assert_eq!(calendar[1].status, CalendarDayStatus::Completed);
        assert_eq!(calendar[2].status, CalendarDayStatus::Failed);
        assert_eq!(calendar[3].status, CalendarDayStatus::Pending);
    }

    #[test]
    fn test_parse_month() {
        assert_eq!(parse_month("2025-03").unwrap(), (2025, 3));
        assert!(parse_month("2025-13").is_err());
        assert!(parse_month("March").is_err());
    }
}
