//! Continuity tests for the irradiance model.
//!
//! TOA irradiance at a fixed clock hour should drift slowly from one day to
//! the next, and the hour-to-hour change is bounded by 15° of hour angle.
//! A jump beyond either bound means the day-of-year or solar-time arithmetic
//! went wrong somewhere.

use chrono::{Datelike, Days, NaiveDate};
use proptest::prelude::*;

use crate::solar::Site;

proptest! {
    #[test]
    fn irradiance_changes_smoothly_over_consecutive_days(
        year in 1800i32..2100,
        start_doy in 1u64..330,
        hour in 0u32..24,
        latitude in -89.0f64..=89.0,
        longitude in -180.0f64..=180.0,
    ) {
        let site = Site::new(latitude, longitude).unwrap();
        let start = NaiveDate::from_ymd_opt(year, 1, 1)
            .unwrap()
            .checked_add_days(Days::new(start_doy - 1))
            .unwrap();

        let mut prev: Option<f64> = None;
        for offset in 0..30 {
            let date = start.checked_add_days(Days::new(offset)).unwrap();
            // Stay inside one year; the day-of-year index restarts at January 1st
            if date.year() != year {
                break;
            }
            let g0h = site
                .toa_horizontal_irradiance(date.year(), date.month(), date.day(), f64::from(hour))
                .unwrap();
            if let Some(prev) = prev {
                prop_assert!(
                    (g0h - prev).abs() < 20.0,
                    "irradiance jumped from {} to {} W/m² on {} at {}:00 UTC",
                    prev, g0h, date, hour
                );
            }
            prev = Some(g0h);
        }
    }

    #[test]
    fn irradiance_changes_boundedly_between_hours(
        date_offset in 0u64..36_500,
        latitude in -90.0f64..=90.0,
        longitude in -180.0f64..=180.0,
    ) {
        let date = NaiveDate::from_ymd_opt(1900, 1, 1)
            .unwrap()
            .checked_add_days(Days::new(date_offset))
            .unwrap();
        let site = Site::new(latitude, longitude).unwrap();
        let hourly: Vec<f64> = (0..24)
            .map(|hour| {
                site.toa_horizontal_irradiance(date.year(), date.month(), date.day(), f64::from(hour))
                    .unwrap()
            })
            .collect();
        for pair in hourly.windows(2) {
            prop_assert!((pair[1] - pair[0]).abs() < 400.0, "hourly jump {:?} on {}", pair, date);
        }
    }
}
