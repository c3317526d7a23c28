//! Calendar arithmetic and solar time.
//!
//! Day-of-year indices are 1-based (`1` = January 1st) and run to 365, or 366
//! in leap years.
use core::f64::consts::PI;

use chrono::{Datelike, NaiveDate};

use crate::error::CalculationError;

/// Days elapsed before the first of each month in a common year.
const CUMULATIVE_DAYS: [u32; 12] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];

/// Minutes of solar time per degree of longitude.
const MINUTES_PER_DEGREE: f64 = 4.0;

/// Gregorian leap-year rule: divisible by 400, or by 4 and not by 100.
pub fn is_leap_year(year: i32) -> bool {
    year % 400 == 0 || (year % 4 == 0 && year % 100 != 0)
}

/// Number of days in `year` (365 or 366).
pub fn days_in_year(year: i32) -> u32 {
    if is_leap_year(year) {
        366
    } else {
        365
    }
}

/// Validates a calendar date and returns it as a [`NaiveDate`].
///
/// Years are bounded by chrono's representable range, roughly ±262 000.
///
/// # Errors
///
/// Returns [`CalculationError::InvalidDate`] if the month or day does not exist
/// in that year, or the year is outside that range.
pub fn calendar_date(year: i32, month: u32, day: u32) -> Result<NaiveDate, CalculationError> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or(CalculationError::InvalidDate { year, month, day })
}

/// Compute the 1-based day of year from a calendar date.
///
/// Uses the cumulative-day table, adding one day for dates after February in
/// leap years.
///
/// # Errors
///
/// Returns [`CalculationError::InvalidDate`] for any date [`calendar_date`]
/// rejects.
///
/// # Example
///
/// ```
/// use solar_climate::time::day_of_year;
///
/// assert_eq!(day_of_year(2024, 3, 1).unwrap(), 61);
/// assert_eq!(day_of_year(2023, 12, 31).unwrap(), 365);
/// assert!(day_of_year(2023, 2, 29).is_err());
/// ```
pub fn day_of_year(year: i32, month: u32, day: u32) -> Result<u32, CalculationError> {
    let date = calendar_date(year, month, day)?;
    let mut doy = CUMULATIVE_DAYS[date.month0() as usize] + date.day();
    if month > 2 && is_leap_year(year) {
        doy += 1;
    }
    Ok(doy)
}

/// Fractional year of a month: `year + (month - 1) / 12`.
pub fn fractional_year_of_month(year: i32, month: u32) -> f64 {
    f64::from(year) + f64::from(month.saturating_sub(1)) / 12.0
}

/// Fractional year of a day: `year + (month - 1) / 12 + (day - 1) / 365`.
///
/// This is the coarse time axis used for plotting individual observations; it
/// does not account for month lengths.
pub fn fractional_year_of_day(year: i32, month: u32, day: u32) -> f64 {
    fractional_year_of_month(year, month) + f64::from(day.saturating_sub(1)) / 365.0
}

/// Compute the equation of time (`EoT`) in minutes.
///
/// Low-order Fourier approximation with `B = 2π(J - 81) / 364`:
///
/// `EoT = 9.87 sin(2B) - 7.53 cos(B) - 1.5 sin(B)`
///
/// Positive values mean apparent solar time runs ahead of mean solar time.
pub fn equation_of_time_minutes(day_of_year: u32) -> f64 {
    let b = 2.0 * PI * (f64::from(day_of_year) - 81.0) / 364.0;
    9.87 * (2.0 * b).sin() - 7.53 * b.cos() - 1.5 * b.sin()
}

/// Local apparent solar time in hours for a UTC hour at `longitude_deg`
/// (east positive).
///
/// The result is not wrapped into `[0, 24)`; the hour angle it feeds is
/// periodic anyway.
pub fn local_solar_time(hour_utc: f64, longitude_deg: f64, day_of_year: u32) -> f64 {
    hour_utc + (longitude_deg * MINUTES_PER_DEGREE + equation_of_time_minutes(day_of_year)) / 60.0
}

/// Hour angle in radians for a local solar time: `15° · (lst - 12)`.
pub fn hour_angle_rad(local_solar_time: f64) -> f64 {
    (15.0 * (local_solar_time - 12.0)).to_radians()
}
