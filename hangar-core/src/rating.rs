//! Rating derived from speed, usage, and age.

use chrono::{DateTime, Datelike, Utc};

/// The year ratings are computed against. Fixed by the domain, not the clock.
pub const CURRENT_YEAR: i32 = 3019;

/// Compute a ship rating rounded to two decimals.
pub fn compute_rating(speed: f64, used: bool, prod_date: DateTime<Utc>) -> f64 {
    let k = if used { 0.5 } else { 1.0 };
    let age = f64::from(CURRENT_YEAR - prod_date.year() + 1);
    let rating = 80.0 * speed * k / age;
    (rating * 100.0).round() / 100.0
}
