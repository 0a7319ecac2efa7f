//! In-process ship store.

use std::collections::BTreeMap;

use crate::domain::{NewShip, Ship};
use crate::error::{HangarError, Result};
use crate::query::{PageRequest, ShipFilter, ShipOrder};
use crate::store::ShipStore;

/// Ship store backed by a sorted map. Ids start at 1 and are never reused.
#[derive(Debug, Clone)]
pub struct MemoryShipStore {
    ships: BTreeMap<i64, Ship>,
    next_id: i64,
}

impl MemoryShipStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            ships: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Number of stored ships.
    pub fn len(&self) -> usize {
        self.ships.len()
    }

    /// Whether the store holds no ships.
    pub fn is_empty(&self) -> bool {
        self.ships.is_empty()
    }
}

impl Default for MemoryShipStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ShipStore for MemoryShipStore {
    fn find(
        &mut self,
        filter: &ShipFilter,
        order: ShipOrder,
        page: PageRequest,
    ) -> Result<Vec<Ship>> {
        let predicates = filter.predicates();
        let mut matched: Vec<&Ship> = self
            .ships
            .values()
            .filter(|ship| predicates.iter().all(|predicate| predicate.matches(ship)))
            .collect();
        matched.sort_by(|left, right| order.compare(left, right));
        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        Ok(matched
            .into_iter()
            .skip(offset)
            .take(page.size() as usize)
            .cloned()
            .collect())
    }

    fn count(&mut self, filter: &ShipFilter) -> Result<i64> {
        let predicates = filter.predicates();
        let count = self
            .ships
            .values()
            .filter(|ship| predicates.iter().all(|predicate| predicate.matches(ship)))
            .count();
        i64::try_from(count).map_err(|err| HangarError::Store(err.to_string()))
    }

    fn get(&mut self, id: i64) -> Result<Option<Ship>> {
        Ok(self.ships.get(&id).cloned())
    }

    fn exists(&mut self, id: i64) -> Result<bool> {
        Ok(self.ships.contains_key(&id))
    }

    fn insert(&mut self, ship: NewShip) -> Result<Ship> {
        let id = self.next_id;
        self.next_id += 1;
        let stored = ship.with_id(id);
        self.ships.insert(id, stored.clone());
        Ok(stored)
    }

    fn save(&mut self, ship: &Ship) -> Result<Ship> {
        match self.ships.get_mut(&ship.id) {
            Some(existing) => {
                *existing = ship.clone();
                Ok(ship.clone())
            }
            None => Err(HangarError::NotFound(ship.id)),
        }
    }

    fn delete(&mut self, id: i64) -> Result<bool> {
        Ok(self.ships.remove(&id).is_some())
    }
}
