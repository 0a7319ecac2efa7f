//! Ship registry operations.

use log::{debug, info};

use crate::domain::{NewShip, Ship, ShipInput};
use crate::error::{HangarError, Result};
use crate::query::{PageRequest, ShipFilter, ShipOrder};
use crate::rating::compute_rating;
use crate::store::ShipStore;
use crate::validator::{
    is_crew_size_valid, is_name_valid, is_planet_valid, is_prod_date_valid, is_speed_valid,
    validate_record,
};

/// Validates input, derives ratings, and delegates persistence to a store.
#[derive(Debug)]
pub struct ShipService<S> {
    store: S,
}

fn ensure_positive_id(id: i64) -> Result<()> {
    if id <= 0 {
        return Err(HangarError::invalid_field("id"));
    }
    Ok(())
}

fn accept<T>(field: &str, value: Option<T>, valid: impl Fn(&T) -> bool) -> Result<Option<T>> {
    match value {
        Some(value) if valid(&value) => Ok(Some(value)),
        Some(_) => Err(HangarError::invalid_field(field)),
        None => Ok(None),
    }
}

/// Check each present field of a partial update, in declaration order.
fn validate_changes(input: ShipInput) -> Result<ShipInput> {
    Ok(ShipInput {
        name: accept("name", input.name, |name| is_name_valid(Some(name.as_str())))?,
        planet: accept("planet", input.planet, |planet| is_planet_valid(Some(planet.as_str())))?,
        ship_type: input.ship_type,
        prod_date: accept("prodDate", input.prod_date, |date| {
            is_prod_date_valid(Some(*date))
        })?,
        used: input.used,
        speed: accept("speed", input.speed, |speed| is_speed_valid(Some(*speed)))?,
        crew_size: accept("crewSize", input.crew_size, |crew| {
            is_crew_size_valid(Some(*crew))
        })?,
    })
}

impl<S: ShipStore> ShipService<S> {
    /// Wrap a store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Fetch one sorted page of matching ships.
    pub fn list(
        &mut self,
        filter: &ShipFilter,
        order: ShipOrder,
        page: PageRequest,
    ) -> Result<Vec<Ship>> {
        filter.check()?;
        self.store.find(filter, order, page)
    }

    /// Count matching ships, ignoring pagination.
    pub fn count(&mut self, filter: &ShipFilter) -> Result<i64> {
        filter.check()?;
        self.store.count(filter)
    }

    /// Validate and persist a new ship.
    pub fn add(&mut self, input: ShipInput) -> Result<Ship> {
        if let Err(err) = validate_record(&input) {
            debug!("rejected new ship: {err}");
            return Err(err);
        }
        let (
            Some(name),
            Some(planet),
            Some(ship_type),
            Some(prod_date),
            Some(speed),
            Some(crew_size),
        ) = (
            input.name,
            input.planet,
            input.ship_type,
            input.prod_date,
            input.speed,
            input.crew_size,
        )
        else {
            return Err(HangarError::Validation("incomplete ship".to_string()));
        };
        let used = input.used.unwrap_or(false);
        let ship = NewShip {
            name,
            planet,
            ship_type,
            prod_date,
            used,
            speed,
            crew_size,
            rating: compute_rating(speed, used, prod_date),
        };
        let stored = self.store.insert(ship)?;
        info!("created ship {} with rating {}", stored.id, stored.rating);
        Ok(stored)
    }

    /// Apply the present fields of `input` to an existing ship.
    ///
    /// Nothing is written unless every present field is valid.
    pub fn update(&mut self, id: i64, input: ShipInput) -> Result<Ship> {
        ensure_positive_id(id)?;
        let mut ship = self.store.get(id)?.ok_or(HangarError::NotFound(id))?;

        let changes = match validate_changes(input) {
            Ok(changes) => changes,
            Err(err) => {
                debug!("rejected update of ship {id}: {err}");
                return Err(err);
            }
        };

        if let Some(name) = changes.name {
            ship.name = name;
        }
        if let Some(planet) = changes.planet {
            ship.planet = planet;
        }
        if let Some(ship_type) = changes.ship_type {
            ship.ship_type = ship_type;
        }
        if let Some(prod_date) = changes.prod_date {
            ship.prod_date = prod_date;
        }
        if let Some(used) = changes.used {
            ship.used = used;
        }
        if let Some(speed) = changes.speed {
            ship.speed = speed;
        }
        if let Some(crew_size) = changes.crew_size {
            ship.crew_size = crew_size;
        }
        ship.rating = compute_rating(ship.speed, ship.used, ship.prod_date);

        let stored = self.store.save(&ship)?;
        info!("updated ship {id} with rating {}", stored.rating);
        Ok(stored)
    }

    /// Remove a ship.
    pub fn delete(&mut self, id: i64) -> Result<()> {
        ensure_positive_id(id)?;
        if !self.store.exists(id)? {
            return Err(HangarError::NotFound(id));
        }
        if !self.store.delete(id)? {
            return Err(HangarError::NotFound(id));
        }
        info!("deleted ship {id}");
        Ok(())
    }

    /// Fetch a ship by id.
    pub fn get_by_id(&mut self, id: i64) -> Result<Option<Ship>> {
        self.store.get(id)
    }

    /// Whether a ship with the id exists.
    pub fn exists_by_id(&mut self, id: i64) -> Result<bool> {
        self.store.exists(id)
    }
}

#[cfg(test)]
mod tests {
    use super::ShipService;
    use crate::domain::{NewShip, ShipInput, ShipType};
    use crate::error::HangarError;
    use crate::memory::MemoryShipStore;
    use crate::query::{PageRequest, ShipFilter, ShipOrder};
    use crate::store::MockShipStore;
    use crate::validator::start_of_year;

    fn earhart() -> ShipInput {
        ShipInput {
            name: Some("Earhart".to_string()),
            planet: Some("Proxima".to_string()),
            ship_type: Some(ShipType::Transport),
            prod_date: start_of_year(3000),
            used: Some(false),
            speed: Some(0.5),
            crew_size: Some(10),
        }
    }

    fn seeded() -> ShipService<MemoryShipStore> {
        let mut service = ShipService::new(MemoryShipStore::new());
        let fleet = [
            ("Earhart", "Proxima", 0.5, 10, false),
            ("Vostok", "Earth", 0.2, 3, true),
            ("Enterprise", "Earth", 0.9, 430, false),
            ("Serenity", "Persephone", 0.6, 9, true),
            ("Nostromo", "Thedus", 0.3, 7, true),
        ];
        for (name, planet, speed, crew, used) in fleet {
            service
                .add(ShipInput {
                    name: Some(name.to_string()),
                    planet: Some(planet.to_string()),
                    speed: Some(speed),
                    crew_size: Some(crew),
                    used: Some(used),
                    ..earhart()
                })
                .expect("add");
        }
        service
    }

    fn all() -> PageRequest {
        PageRequest::new(0, 100).expect("page")
    }

    #[test]
    fn add_computes_rating() {
        let mut service = ShipService::new(MemoryShipStore::new());
        let ship = service.add(earhart()).expect("add");
        assert_eq!(ship.id, 1);
        assert_eq!(ship.rating, 2.0);

        let used = service
            .add(ShipInput {
                used: Some(true),
                ..earhart()
            })
            .expect("add");
        assert_eq!(used.rating, 1.0);
    }

    #[test]
    fn add_defaults_used_to_false() {
        let mut service = ShipService::new(MemoryShipStore::new());
        let ship = service
            .add(ShipInput {
                used: None,
                ..earhart()
            })
            .expect("add");
        assert!(!ship.used);
    }

    #[test]
    fn add_rejects_invalid_record() {
        let mut service = ShipService::new(MemoryShipStore::new());
        let result = service.add(ShipInput {
            crew_size: Some(10_000),
            ..earhart()
        });
        assert_eq!(result, Err(HangarError::invalid_field("crewSize")));
        assert_eq!(service.count(&ShipFilter::default()).expect("count"), 0);
    }

    #[test]
    fn unfiltered_list_returns_everything() {
        let mut service = seeded();
        let ships = service
            .list(&ShipFilter::default(), ShipOrder::Id, all())
            .expect("list");
        assert_eq!(ships.len(), 5);
        assert_eq!(service.count(&ShipFilter::default()).expect("count"), 5);
    }

    #[test]
    fn default_page_holds_three() {
        let mut service = seeded();
        let ships = service
            .list(&ShipFilter::default(), ShipOrder::Id, PageRequest::default())
            .expect("list");
        let ids: Vec<i64> = ships.iter().map(|ship| ship.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn last_page_is_short_and_beyond_is_empty() {
        let mut service = seeded();
        let last = PageRequest::new(1, 3).expect("page");
        assert_eq!(
            service
                .list(&ShipFilter::default(), ShipOrder::Id, last)
                .expect("list")
                .len(),
            2
        );
        let beyond = PageRequest::new(7, 3).expect("page");
        assert!(
            service
                .list(&ShipFilter::default(), ShipOrder::Id, beyond)
                .expect("list")
                .is_empty()
        );
    }

    #[test]
    fn sort_by_speed_is_ascending() {
        let mut service = seeded();
        let ships = service
            .list(&ShipFilter::default(), ShipOrder::Speed, all())
            .expect("list");
        let names: Vec<&str> = ships.iter().map(|ship| ship.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Vostok", "Nostromo", "Earhart", "Serenity", "Enterprise"]
        );
    }

    #[test]
    fn widening_a_range_never_shrinks_results() {
        let mut service = seeded();
        let narrow = ShipFilter {
            min_speed: Some(0.3),
            max_speed: Some(0.6),
            ..ShipFilter::default()
        };
        let wide = ShipFilter {
            min_speed: Some(0.1),
            ..narrow.clone()
        };
        let narrow_count = service.count(&narrow).expect("count");
        let wide_count = service.count(&wide).expect("count");
        assert_eq!(narrow_count, 3);
        assert!(wide_count >= narrow_count);
        assert_eq!(wide_count, 4);
    }

    #[test]
    fn filters_combine() {
        let mut service = seeded();
        let filter = ShipFilter {
            planet: Some("Earth".to_string()),
            used: Some(false),
            ..ShipFilter::default()
        };
        let ships = service.list(&filter, ShipOrder::Id, all()).expect("list");
        assert_eq!(ships.len(), 1);
        assert_eq!(ships[0].name, "Enterprise");
        assert_eq!(service.count(&filter).expect("count"), 1);
    }

    fn mixed_fleet() -> ShipService<MemoryShipStore> {
        let mut service = ShipService::new(MemoryShipStore::new());
        let fleet = [
            ("Albatross", ShipType::Transport, 2900, false),
            ("Bulwark", ShipType::Military, 3000, false),
            ("Caravel", ShipType::Merchant, 3010, false),
            ("Dreadnought", ShipType::Military, 3018, true),
        ];
        for (name, ship_type, year, used) in fleet {
            service
                .add(ShipInput {
                    name: Some(name.to_string()),
                    ship_type: Some(ship_type),
                    prod_date: start_of_year(year),
                    used: Some(used),
                    ..earhart()
                })
                .expect("add");
        }
        service
    }

    fn names(service: &mut ShipService<MemoryShipStore>, filter: &ShipFilter) -> Vec<String> {
        service
            .list(filter, ShipOrder::Id, all())
            .expect("list")
            .into_iter()
            .map(|ship| ship.name)
            .collect()
    }

    #[test]
    fn date_bounds_are_inclusive() {
        let mut service = mixed_fleet();
        let filter = ShipFilter {
            after: start_of_year(2900),
            before: start_of_year(3010),
            ..ShipFilter::default()
        };
        assert_eq!(names(&mut service, &filter), vec!["Albatross", "Bulwark", "Caravel"]);

        let narrowed = ShipFilter {
            after: start_of_year(3000),
            ..filter.clone()
        };
        assert_eq!(names(&mut service, &narrowed), vec!["Bulwark", "Caravel"]);
        assert!(service.count(&narrowed).expect("count") <= service.count(&filter).expect("count"));
    }

    #[test]
    fn ship_type_filter_is_exact() {
        let mut service = mixed_fleet();
        let filter = ShipFilter {
            ship_type: Some(ShipType::Military),
            ..ShipFilter::default()
        };
        assert_eq!(names(&mut service, &filter), vec!["Bulwark", "Dreadnought"]);
        assert_eq!(service.count(&filter).expect("count"), 2);
    }

    #[test]
    fn rating_bounds_are_inclusive() {
        let mut service = mixed_fleet();
        let ratings: Vec<f64> = service
            .list(&ShipFilter::default(), ShipOrder::Rating, all())
            .expect("list")
            .into_iter()
            .map(|ship| ship.rating)
            .collect();
        assert_eq!(ratings, vec![0.33, 2.0, 4.0, 10.0]);

        let filter = ShipFilter {
            min_rating: Some(2.0),
            max_rating: Some(4.0),
            ..ShipFilter::default()
        };
        assert_eq!(names(&mut service, &filter), vec!["Bulwark", "Caravel"]);

        let narrowed = ShipFilter {
            max_rating: Some(3.0),
            ..filter.clone()
        };
        assert_eq!(names(&mut service, &narrowed), vec!["Bulwark"]);
    }

    #[test]
    fn non_finite_bounds_are_rejected_before_the_store() {
        let mut store = MockShipStore::new();
        store.expect_count().never();
        store.expect_find().never();
        let mut service = ShipService::new(store);

        let nan_speed = ShipFilter {
            max_speed: Some(f64::NAN),
            ..ShipFilter::default()
        };
        assert_eq!(
            service.count(&nan_speed),
            Err(HangarError::invalid_field("maxSpeed"))
        );
        let infinite_rating = ShipFilter {
            min_rating: Some(f64::INFINITY),
            ..ShipFilter::default()
        };
        assert_eq!(
            service.list(&infinite_rating, ShipOrder::Id, all()),
            Err(HangarError::invalid_field("minRating"))
        );
    }

    #[test]
    fn update_applies_present_fields_and_rerates() {
        let mut service = seeded();
        let updated = service
            .update(
                1,
                ShipInput {
                    used: Some(true),
                    crew_size: Some(12),
                    ..ShipInput::default()
                },
            )
            .expect("update");
        assert_eq!(updated.name, "Earhart");
        assert_eq!(updated.crew_size, 12);
        assert_eq!(updated.rating, 1.0);
        assert_eq!(service.get_by_id(1).expect("get"), Some(updated));
    }

    #[test]
    fn update_is_all_or_nothing() {
        let mut service = seeded();
        let before = service.get_by_id(1).expect("get");
        let result = service.update(
            1,
            ShipInput {
                name: Some("Renamed".to_string()),
                speed: Some(5.0),
                ..ShipInput::default()
            },
        );
        assert_eq!(result, Err(HangarError::invalid_field("speed")));
        assert_eq!(service.get_by_id(1).expect("get"), before);
    }

    #[test]
    fn update_unknown_ship_is_not_found() {
        let mut service = seeded();
        let result = service.update(404, earhart());
        assert_eq!(result, Err(HangarError::NotFound(404)));
    }

    #[test]
    fn update_with_empty_input_keeps_fields() {
        let mut service = seeded();
        let before = service.get_by_id(2).expect("get").expect("ship");
        let after = service.update(2, ShipInput::default()).expect("update");
        assert_eq!(after, before);
    }

    #[test]
    fn delete_removes_and_reports_missing() {
        let mut service = seeded();
        service.delete(3).expect("delete");
        assert!(!service.exists_by_id(3).expect("exists"));
        assert_eq!(service.delete(99999), Err(HangarError::NotFound(99999)));
        assert_eq!(service.count(&ShipFilter::default()).expect("count"), 4);
    }

    #[test]
    fn non_positive_ids_are_invalid() {
        let mut service = seeded();
        assert_eq!(service.delete(0), Err(HangarError::invalid_field("id")));
        assert_eq!(
            service.update(-1, ShipInput::default()),
            Err(HangarError::invalid_field("id"))
        );
    }

    #[test]
    fn invalid_update_never_reaches_the_store() {
        let mut store = MockShipStore::new();
        let ship = NewShip {
            name: "Earhart".to_string(),
            planet: "Proxima".to_string(),
            ship_type: ShipType::Transport,
            prod_date: start_of_year(3000).expect("date"),
            used: false,
            speed: 0.5,
            crew_size: 10,
            rating: 2.0,
        }
        .with_id(1);
        store
            .expect_get()
            .withf(|id| *id == 1)
            .times(1)
            .returning(move |_| Ok(Some(ship.clone())));
        store.expect_save().never();

        let mut service = ShipService::new(store);
        let result = service.update(
            1,
            ShipInput {
                planet: Some(String::new()),
                ..ShipInput::default()
            },
        );
        assert_eq!(result, Err(HangarError::invalid_field("planet")));
    }

    #[test]
    fn store_failures_propagate() {
        let mut store = MockShipStore::new();
        store
            .expect_count()
            .returning(|_| Err(HangarError::Store("offline".to_string())));
        let mut service = ShipService::new(store);
        assert_eq!(
            service.count(&ShipFilter::default()),
            Err(HangarError::Store("offline".to_string()))
        );
    }

    #[test]
    fn delete_checks_existence_first() {
        let mut store = MockShipStore::new();
        store.expect_exists().returning(|_| Ok(false));
        store.expect_delete().never();
        let mut service = ShipService::new(store);
        assert_eq!(service.delete(7), Err(HangarError::NotFound(7)));
    }
}
