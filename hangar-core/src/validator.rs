//! Field constraints enforced on create and update.

use chrono::{DateTime, TimeZone, Utc};

use crate::domain::ShipInput;
use crate::error::{HangarError, Result};

/// Maximum length of names and planets, in characters.
pub const MAX_TEXT_LEN: usize = 50;
/// Earliest production year; the date must be strictly after January 1 of it.
pub const MIN_PROD_YEAR: i32 = 2800;
/// Production dates must be strictly before January 1 of this year.
pub const MAX_PROD_YEAR: i32 = 3019;
/// Inclusive speed bounds.
pub const SPEED_RANGE: (f64, f64) = (0.01, 0.99);
/// Inclusive crew size bounds.
pub const CREW_SIZE_RANGE: (i32, i32) = (1, 9999);

fn is_text_valid(value: Option<&str>) -> bool {
    value.is_some_and(|text| !text.is_empty() && text.chars().count() <= MAX_TEXT_LEN)
}

/// Check a ship name.
pub fn is_name_valid(name: Option<&str>) -> bool {
    is_text_valid(name)
}

/// Check a planet name.
pub fn is_planet_valid(planet: Option<&str>) -> bool {
    is_text_valid(planet)
}

/// Midnight UTC on January 1 of `year`.
pub fn start_of_year(year: i32) -> Option<DateTime<Utc>> {
    Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).single()
}

/// Check that a production date lies strictly inside the accepted window.
pub fn is_prod_date_valid(prod_date: Option<DateTime<Utc>>) -> bool {
    let (Some(date), Some(start), Some(end)) = (
        prod_date,
        start_of_year(MIN_PROD_YEAR),
        start_of_year(MAX_PROD_YEAR),
    ) else {
        return false;
    };
    date > start && date < end
}

/// Check a speed value. NaN is rejected.
pub fn is_speed_valid(speed: Option<f64>) -> bool {
    speed.is_some_and(|value| value >= SPEED_RANGE.0 && value <= SPEED_RANGE.1)
}

/// Check a crew size.
pub fn is_crew_size_valid(crew_size: Option<i32>) -> bool {
    crew_size.is_some_and(|value| (CREW_SIZE_RANGE.0..=CREW_SIZE_RANGE.1).contains(&value))
}

/// Validate a full record for creation, naming the first offending field.
pub fn validate_record(input: &ShipInput) -> Result<()> {
    if !is_name_valid(input.name.as_deref()) {
        return Err(HangarError::invalid_field("name"));
    }
    if !is_planet_valid(input.planet.as_deref()) {
        return Err(HangarError::invalid_field("planet"));
    }
    if input.ship_type.is_none() {
        return Err(HangarError::invalid_field("shipType"));
    }
    if !is_prod_date_valid(input.prod_date) {
        return Err(HangarError::invalid_field("prodDate"));
    }
    if !is_speed_valid(input.speed) {
        return Err(HangarError::invalid_field("speed"));
    }
    if !is_crew_size_valid(input.crew_size) {
        return Err(HangarError::invalid_field("crewSize"));
    }
    Ok(())
}

/// Whether a record may be created as-is.
pub fn is_record_valid(input: &ShipInput) -> bool {
    validate_record(input).is_ok()
}
