#![deny(missing_docs)]
//! Hangar core library.
//!
//! Domain types, validation, rating, and the filter/sort/page query model for
//! the Hangar ship registry, plus the service that ties them to a store.

pub mod domain;
pub mod error;
pub mod memory;
pub mod query;
pub mod rating;
pub mod service;
pub mod store;
pub mod validator;

pub use domain::{NewShip, Ship, ShipInput, ShipType};
pub use error::{HangarError, Result};
pub use memory::MemoryShipStore;
pub use query::{
    DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE, PageRequest, Predicate, RangeBound, ShipFilter,
    ShipOrder, ShipQuery,
};
pub use rating::{CURRENT_YEAR, compute_rating};
pub use service::ShipService;
pub use store::ShipStore;
pub use validator::{
    is_crew_size_valid, is_name_valid, is_planet_valid, is_prod_date_valid, is_record_valid,
    is_speed_valid, validate_record,
};
