// ABOUTME: Date partitioner splitting a plan's date range into week windows and day slots
// ABOUTME: Pure calendar arithmetic with no I/O, used to seed prompts and cross-check generated dates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Date Partitioner
//!
//! `[start, end]` is cut into runs of seven consecutive days beginning at
//! `start`. The last window is shortened (1 to 7 days) so that it ends exactly
//! on `end`. Windows are contiguous, never overlap, and are numbered from 1.

use chrono::{Datelike, Days, NaiveDate, Weekday};

use crate::errors::InvalidRangeError;
use crate::models::WeekWindow;
use stride_core::constants::DAYS_PER_WEEK;

/// Partition `[start, end]` into week windows
///
/// # Errors
///
/// Returns `InvalidRangeError` if `start` is after `end`.
pub fn compute_week_windows(
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<WeekWindow>, InvalidRangeError> {
    if start > end {
        return Err(InvalidRangeError::new(start, end));
    }

    let mut windows = Vec::new();
    let mut cursor = start;
    let mut week_number = 1;
    loop {
        let window_end = cursor
            .checked_add_days(Days::new(DAYS_PER_WEEK - 1))
            .map_or(end, |candidate| candidate.min(end));
        windows.push(WeekWindow {
            week_number,
            start_date: cursor,
            end_date: window_end,
        });

        match window_end.succ_opt() {
            Some(next) if window_end < end => {
                cursor = next;
                week_number += 1;
            }
            _ => break,
        }
    }
    Ok(windows)
}

/// Consecutive calendar dates from `start` through `end`, capped at seven
///
/// Returns an empty list when `start` is after `end`.
#[must_use]
pub fn compute_day_slots(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start
        .iter_days()
        .take_while(|day| *day <= end)
        .take(DAYS_PER_WEEK as usize)
        .collect()
}

/// Day slots of a week window
#[must_use]
pub fn window_day_slots(window: &WeekWindow) -> Vec<NaiveDate> {
    compute_day_slots(window.start_date, window.end_date)
}

/// Full English weekday name of a date, as used in outlines
#[must_use]
pub fn weekday_name(date: NaiveDate) -> &'static str {
    match date.weekday() {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_three_full_weeks() {
        let windows = compute_week_windows(date(2024, 1, 1), date(2024, 1, 21)).unwrap();
        let bounds: Vec<_> = windows
            .iter()
            .map(|w| (w.week_number, w.start_date, w.end_date))
            .collect();
        assert_eq!(
            bounds,
            vec![
                (1, date(2024, 1, 1), date(2024, 1, 7)),
                (2, date(2024, 1, 8), date(2024, 1, 14)),
                (3, date(2024, 1, 15), date(2024, 1, 21)),
            ]
        );
    }

    #[test]
    fn test_same_day_is_one_single_day_window() {
        let day = date(2024, 6, 9);
        let windows = compute_week_windows(day, day).unwrap();
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].len_days(), 1);
        assert_eq!(window_day_slots(&windows[0]), vec![day]);
    }

    #[test]
    fn test_partial_final_week() {
        let windows = compute_week_windows(date(2024, 2, 26), date(2024, 3, 5)).unwrap();
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].end_date, date(2024, 3, 3));
        assert_eq!(windows[1].start_date, date(2024, 3, 4));
        assert_eq!(windows[1].len_days(), 2);
    }

    #[test]
    fn test_inverted_range_fails() {
        let error = compute_week_windows(date(2024, 1, 2), date(2024, 1, 1)).unwrap_err();
        assert_eq!(error.start, date(2024, 1, 2));
    }

    #[test]
    fn test_day_slots_capped_at_seven() {
        let slots = compute_day_slots(date(2024, 1, 1), date(2024, 3, 1));
        assert_eq!(slots.len(), 7);
        assert_eq!(slots[6], date(2024, 1, 7));
        assert!(compute_day_slots(date(2024, 1, 2), date(2024, 1, 1)).is_empty());
    }

    #[test]
    fn test_weekday_name() {
        assert_eq!(weekday_name(date(2024, 1, 1)), "Monday");
        assert_eq!(weekday_name(date(2024, 1, 7)), "Sunday");
    }
}
