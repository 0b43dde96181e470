//! Calendar math for projecting rotation weeks onto real dates.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::error::CoreError;

/// Real date of a rotation day within the week starting at `monday`.
///
/// Rotation days count from Sunday (0) but calendar weeks start on Monday,
/// so Sunday lands at the end of the week: `0 -> monday + 6`,
/// `1..=6 -> monday + 0..=5`.
pub fn date_for_day(monday: NaiveDate, day_of_week: i16) -> NaiveDate {
    let offset = if day_of_week == 0 {
        6
    } else {
        i64::from(day_of_week) - 1
    };
    monday + Duration::days(offset)
}

/// Monday of ISO week `week` in ISO year `year`.
pub fn iso_week_monday(year: i32, week: u32) -> Result<NaiveDate, CoreError> {
    NaiveDate::from_isoywd_opt(year, week, Weekday::Mon)
        .ok_or_else(|| CoreError::Validation(format!("Invalid ISO week {year}-W{week:02}")))
}

/// Inclusive Monday..Sunday date range of an ISO week.
pub fn iso_week_range(year: i32, week: u32) -> Result<(NaiveDate, NaiveDate), CoreError> {
    let monday = iso_week_monday(year, week)?;
    Ok((monday, monday + Duration::days(6)))
}

/// Rotation week that a calendar ISO week maps onto: `((iso_week - 1) mod week_count) + 1`.
pub fn rotation_week_for(iso_week: u32, week_count: i32) -> Result<i32, CoreError> {
    if week_count < 1 {
        return Err(CoreError::Validation(format!(
            "week_count must be at least 1, got {week_count}"
        )));
    }
    let iso_week = iso_week as i64;
    Ok(((iso_week - 1).rem_euclid(i64::from(week_count)) + 1) as i32)
}

/// Reject dates that are not Mondays.
pub fn validate_monday(date: NaiveDate) -> Result<(), CoreError> {
    if date.weekday() != Weekday::Mon {
        return Err(CoreError::Validation(format!(
            "monday_date must be a Monday, got {date} ({})",
            date.weekday()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn sunday_is_end_of_week() {
        let monday = d(2026, 10, 12);
        assert_eq!(date_for_day(monday, 0), d(2026, 10, 18));
        assert_eq!(date_for_day(monday, 1), monday);
        assert_eq!(date_for_day(monday, 6), d(2026, 10, 17));
    }

    #[test]
    fn iso_week_range_covers_monday_to_sunday() {
        let (start, end) = iso_week_range(2026, 42).unwrap();
        assert_eq!(start, d(2026, 10, 12));
        assert_eq!(end, d(2026, 10, 18));
    }

    #[test]
    fn iso_week_one_can_start_in_previous_year() {
        assert_eq!(iso_week_monday(2025, 1).unwrap(), d(2024, 12, 30));
    }

    #[test]
    fn invalid_iso_week_is_rejected() {
        assert!(iso_week_monday(2026, 54).is_err());
        assert!(iso_week_monday(2026, 0).is_err());
    }

    #[test]
    fn rotation_week_cycles() {
        assert_eq!(rotation_week_for(1, 6).unwrap(), 1);
        assert_eq!(rotation_week_for(6, 6).unwrap(), 6);
        assert_eq!(rotation_week_for(7, 6).unwrap(), 1);
        assert_eq!(rotation_week_for(42, 6).unwrap(), 6);
        assert_eq!(rotation_week_for(53, 6).unwrap(), 5);
    }

    #[test]
    fn rotation_week_rejects_empty_template() {
        assert!(rotation_week_for(3, 0).is_err());
    }

    #[test]
    fn monday_check() {
        assert!(validate_monday(d(2026, 10, 12)).is_ok());
        assert!(validate_monday(d(2026, 10, 13)).is_err());
    }
}
