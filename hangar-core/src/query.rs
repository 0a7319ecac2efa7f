//! Filter, sort, and pagination primitives for ship listings.
//!
//! A [`ShipFilter`] is lowered into a list of [`Predicate`] values, one per
//! parameter the caller supplied. Stores AND them together: the in-memory
//! store calls [`Predicate::matches`], the SQL store translates each variant
//! into a `WHERE` clause.

use std::cmp::Ordering;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Ship, ShipType};
use crate::error::{HangarError, Result};

/// Default zero-based page number.
pub const DEFAULT_PAGE_NUMBER: u32 = 0;
/// Default page size.
pub const DEFAULT_PAGE_SIZE: u32 = 3;

/// A comparison against one or two inclusive limits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RangeBound<T> {
    /// `value >= min`
    AtLeast(T),
    /// `value <= max`
    AtMost(T),
    /// `min <= value <= max`
    Between(T, T),
}

impl<T: PartialOrd> RangeBound<T> {
    /// Build a bound from optional limits; `None` when neither is set.
    pub fn from_limits(min: Option<T>, max: Option<T>) -> Option<Self> {
        match (min, max) {
            (None, None) => None,
            (Some(min), None) => Some(Self::AtLeast(min)),
            (None, Some(max)) => Some(Self::AtMost(max)),
            (Some(min), Some(max)) => Some(Self::Between(min, max)),
        }
    }

    /// Whether `value` satisfies the bound.
    pub fn contains(&self, value: &T) -> bool {
        match self {
            Self::AtLeast(min) => value >= min,
            Self::AtMost(max) => value <= max,
            Self::Between(min, max) => value >= min && value <= max,
        }
    }
}

/// A single constraint on listed ships.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Name contains the text (case-sensitive).
    NameContains(String),
    /// Planet contains the text (case-sensitive).
    PlanetContains(String),
    /// Exact ship type.
    ShipTypeIs(ShipType),
    /// Production date within the bound.
    ProdDate(RangeBound<DateTime<Utc>>),
    /// Exact used flag.
    UsedIs(bool),
    /// Speed within the bound.
    Speed(RangeBound<f64>),
    /// Crew size within the bound.
    CrewSize(RangeBound<i32>),
    /// Rating within the bound.
    Rating(RangeBound<f64>),
}

impl Predicate {
    /// Evaluate the predicate against a ship.
    pub fn matches(&self, ship: &Ship) -> bool {
        match self {
            Predicate::NameContains(text) => ship.name.contains(text.as_str()),
            Predicate::PlanetContains(text) => ship.planet.contains(text.as_str()),
            Predicate::ShipTypeIs(ship_type) => ship.ship_type == *ship_type,
            Predicate::ProdDate(bound) => bound.contains(&ship.prod_date),
            Predicate::UsedIs(used) => ship.used == *used,
            Predicate::Speed(bound) => bound.contains(&ship.speed),
            Predicate::CrewSize(bound) => bound.contains(&ship.crew_size),
            Predicate::Rating(bound) => bound.contains(&ship.rating),
        }
    }
}

/// Optional filter parameters for listing and counting ships.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShipFilter {
    /// Name substring.
    pub name: Option<String>,
    /// Planet substring.
    pub planet: Option<String>,
    /// Exact ship type.
    pub ship_type: Option<ShipType>,
    /// Earliest production date, inclusive.
    pub after: Option<DateTime<Utc>>,
    /// Latest production date, inclusive.
    pub before: Option<DateTime<Utc>>,
    /// Exact used flag.
    pub used: Option<bool>,
    /// Minimum speed.
    pub min_speed: Option<f64>,
    /// Maximum speed.
    pub max_speed: Option<f64>,
    /// Minimum crew size.
    pub min_crew_size: Option<i32>,
    /// Maximum crew size.
    pub max_crew_size: Option<i32>,
    /// Minimum rating.
    pub min_rating: Option<f64>,
    /// Maximum rating.
    pub max_rating: Option<f64>,
}

impl ShipFilter {
    /// Reject `NaN` and infinite float bounds, which stores order differently.
    pub fn check(&self) -> Result<()> {
        let bounds = [
            ("minSpeed", self.min_speed),
            ("maxSpeed", self.max_speed),
            ("minRating", self.min_rating),
            ("maxRating", self.max_rating),
        ];
        match bounds
            .into_iter()
            .find(|(_, value)| value.is_some_and(|value| !value.is_finite()))
        {
            Some((field, _)) => Err(HangarError::invalid_field(field)),
            None => Ok(()),
        }
    }

    /// Lower the filter into predicates; absent parameters add nothing.
    pub fn predicates(&self) -> Vec<Predicate> {
        let mut predicates = Vec::new();
        if let Some(name) = &self.name {
            predicates.push(Predicate::NameContains(name.clone()));
        }
        if let Some(planet) = &self.planet {
            predicates.push(Predicate::PlanetContains(planet.clone()));
        }
        if let Some(ship_type) = self.ship_type {
            predicates.push(Predicate::ShipTypeIs(ship_type));
        }
        if let Some(bound) = RangeBound::from_limits(self.after, self.before) {
            predicates.push(Predicate::ProdDate(bound));
        }
        if let Some(used) = self.used {
            predicates.push(Predicate::UsedIs(used));
        }
        if let Some(bound) = RangeBound::from_limits(self.min_speed, self.max_speed) {
            predicates.push(Predicate::Speed(bound));
        }
        if let Some(bound) = RangeBound::from_limits(self.min_crew_size, self.max_crew_size) {
            predicates.push(Predicate::CrewSize(bound));
        }
        if let Some(bound) = RangeBound::from_limits(self.min_rating, self.max_rating) {
            predicates.push(Predicate::Rating(bound));
        }
        predicates
    }

    /// Whether a ship passes every predicate.
    pub fn matches(&self, ship: &Ship) -> bool {
        self.predicates()
            .iter()
            .all(|predicate| predicate.matches(ship))
    }
}

/// Sort key for ship listings. Sorting is always ascending.
#[derive(
    Debug, Copy, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShipOrder {
    /// By identifier.
    #[default]
    Id,
    /// By name.
    Name,
    /// By production date.
    Date,
    /// By speed.
    Speed,
    /// By crew size.
    CrewSize,
    /// By rating.
    Rating,
}

impl ShipOrder {
    /// Query-string label.
    pub fn as_str(&self) -> &'static str {
        match self {
            ShipOrder::Id => "ID",
            ShipOrder::Name => "NAME",
            ShipOrder::Date => "DATE",
            ShipOrder::Speed => "SPEED",
            ShipOrder::CrewSize => "CREW_SIZE",
            ShipOrder::Rating => "RATING",
        }
    }

    /// Compare two ships by this key, breaking ties by id.
    pub fn compare(&self, left: &Ship, right: &Ship) -> Ordering {
        let primary = match self {
            ShipOrder::Id => Ordering::Equal,
            ShipOrder::Name => left.name.cmp(&right.name),
            ShipOrder::Date => left.prod_date.cmp(&right.prod_date),
            ShipOrder::Speed => left.speed.total_cmp(&right.speed),
            ShipOrder::CrewSize => left.crew_size.cmp(&right.crew_size),
            ShipOrder::Rating => left.rating.total_cmp(&right.rating),
        };
        primary.then_with(|| left.id.cmp(&right.id))
    }
}

/// A zero-based page of results.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PageRequest {
    number: u32,
    size: u32,
}

impl PageRequest {
    /// Build a page request; the size must be positive.
    pub fn new(number: u32, size: u32) -> Result<Self> {
        if size == 0 {
            return Err(HangarError::invalid_field("pageSize"));
        }
        Ok(Self { number, size })
    }

    /// Page number.
    pub fn number(&self) -> u32 {
        self.number
    }

    /// Page size.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Index of the first item on the page.
    pub fn offset(&self) -> u64 {
        u64::from(self.number) * u64::from(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            number: DEFAULT_PAGE_NUMBER,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Flat query-string parameters for listing and counting ships.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ShipQuery {
    /// Name substring.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Planet substring.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub planet: Option<String>,
    /// Exact ship type.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[param(value_type = Option<String>)]
    pub ship_type: Option<ShipType>,
    /// Earliest production date in epoch milliseconds, inclusive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<i64>,
    /// Latest production date in epoch milliseconds, inclusive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<i64>,
    /// Exact used flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_used: Option<bool>,
    /// Minimum speed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_speed: Option<f64>,
    /// Maximum speed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_speed: Option<f64>,
    /// Minimum crew size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_crew_size: Option<i32>,
    /// Maximum crew size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_crew_size: Option<i32>,
    /// Minimum rating.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_rating: Option<f64>,
    /// Maximum rating.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_rating: Option<f64>,
    /// Sort key, `ID` when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[param(value_type = Option<String>)]
    pub order: Option<ShipOrder>,
    /// Zero-based page number, 0 when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,
    /// Page size, 3 when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

fn millis_to_date(field: &str, millis: Option<i64>) -> Result<Option<DateTime<Utc>>> {
    millis
        .map(|value| {
            Utc.timestamp_millis_opt(value)
                .single()
                .ok_or_else(|| HangarError::invalid_field(field))
        })
        .transpose()
}

impl ShipQuery {
    /// Filter parameters carried by the query.
    ///
    /// Float bounds must be finite.
    pub fn filter(&self) -> Result<ShipFilter> {
        let filter = ShipFilter {
            name: self.name.clone(),
            planet: self.planet.clone(),
            ship_type: self.ship_type,
            after: millis_to_date("after", self.after)?,
            before: millis_to_date("before", self.before)?,
            used: self.is_used,
            min_speed: self.min_speed,
            max_speed: self.max_speed,
            min_crew_size: self.min_crew_size,
            max_crew_size: self.max_crew_size,
            min_rating: self.min_rating,
            max_rating: self.max_rating,
        };
        filter.check()?;
        Ok(filter)
    }

    /// Sort key, defaulting to id.
    pub fn order(&self) -> ShipOrder {
        self.order.unwrap_or_default()
    }

    /// Requested page, applying defaults.
    pub fn page(&self) -> Result<PageRequest> {
        PageRequest::new(
            self.page_number.unwrap_or(DEFAULT_PAGE_NUMBER),
            self.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        )
    }
}
