//! Persistence seam for ship records.

use crate::domain::{NewShip, Ship};
use crate::error::Result;
use crate::query::{PageRequest, ShipFilter, ShipOrder};

/// Storage backend for ships.
///
/// Implementations apply every predicate of the filter with AND semantics.
#[cfg_attr(test, mockall::automock)]
pub trait ShipStore {
    /// Fetch one sorted page of ships matching the filter.
    fn find(&mut self, filter: &ShipFilter, order: ShipOrder, page: PageRequest)
    -> Result<Vec<Ship>>;
    /// Count ships matching the filter.
    fn count(&mut self, filter: &ShipFilter) -> Result<i64>;
    /// Fetch a ship by id.
    fn get(&mut self, id: i64) -> Result<Option<Ship>>;
    /// Whether a ship with the id is stored.
    fn exists(&mut self, id: i64) -> Result<bool>;
    /// Persist a new ship and return it with its assigned id.
    fn insert(&mut self, ship: NewShip) -> Result<Ship>;
    /// Overwrite an existing ship.
    fn save(&mut self, ship: &Ship) -> Result<Ship>;
    /// Remove a ship, returning whether a row was deleted.
    fn delete(&mut self, id: i64) -> Result<bool>;
}

impl<S: ShipStore + ?Sized> ShipStore for &mut S {
    fn find(
        &mut self,
        filter: &ShipFilter,
        order: ShipOrder,
        page: PageRequest,
    ) -> Result<Vec<Ship>> {
        (**self).find(filter, order, page)
    }

    fn count(&mut self, filter: &ShipFilter) -> Result<i64> {
        (**self).count(filter)
    }

    fn get(&mut self, id: i64) -> Result<Option<Ship>> {
        (**self).get(id)
    }

    fn exists(&mut self, id: i64) -> Result<bool> {
        (**self).exists(id)
    }

    fn insert(&mut self, ship: NewShip) -> Result<Ship> {
        (**self).insert(ship)
    }

    fn save(&mut self, ship: &Ship) -> Result<Ship> {
        (**self).save(ship)
    }

    fn delete(&mut self, id: i64) -> Result<bool> {
        (**self).delete(id)
    }
}
