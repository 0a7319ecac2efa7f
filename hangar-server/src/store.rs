//! PostgreSQL ship store and per-request backend selection.

use std::sync::{Arc, Mutex};

use diesel::dsl::sql;
use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use diesel::result::OptionalExtension;
use diesel::sql_types::Text;
use hangar_core::{
    HangarError, MemoryShipStore, NewShip, PageRequest, Predicate, RangeBound, Ship, ShipFilter,
    ShipOrder, ShipStore,
};

use crate::db::DbPool;
use crate::models::{NewShipRow, ShipRow};
use crate::schema::ships;

type BoxedShips<'a> = ships::BoxedQuery<'a, Pg>;

fn store_error(err: diesel::result::Error) -> HangarError {
    log::error!("ship query failed: {err}");
    HangarError::Store(err.to_string())
}

/// `LIKE` pattern matching `text` literally anywhere in the column.
fn contains_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for ch in text.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

macro_rules! filter_range {
    ($query:expr, $column:expr, $bound:expr) => {
        match $bound {
            RangeBound::AtLeast(min) => $query.filter($column.ge(min)),
            RangeBound::AtMost(max) => $query.filter($column.le(max)),
            RangeBound::Between(min, max) => $query.filter($column.between(min, max)),
        }
    };
}

fn apply_predicate(query: BoxedShips<'_>, predicate: Predicate) -> BoxedShips<'_> {
    match predicate {
        Predicate::NameContains(text) => {
            query.filter(ships::name.like(contains_pattern(&text)).escape('\\'))
        }
        Predicate::PlanetContains(text) => {
            query.filter(ships::planet.like(contains_pattern(&text)).escape('\\'))
        }
        Predicate::ShipTypeIs(ship_type) => query.filter(ships::ship_type.eq(ship_type.as_str())),
        Predicate::ProdDate(bound) => filter_range!(query, ships::prod_date, bound),
        Predicate::UsedIs(used) => query.filter(ships::is_used.eq(used)),
        Predicate::Speed(bound) => filter_range!(query, ships::speed, bound),
        Predicate::CrewSize(bound) => filter_range!(query, ships::crew_size, bound),
        Predicate::Rating(bound) => filter_range!(query, ships::rating, bound),
    }
}

fn filtered<'a>(filter: &ShipFilter) -> BoxedShips<'a> {
    filter
        .predicates()
        .into_iter()
        .fold(ships::table.into_boxed(), apply_predicate)
}

/// Byte-order name sort, matching `ShipOrder::compare` regardless of database collation.
const NAME_BYTE_ORDER: &str = r#"ships.name COLLATE "C""#;

fn sorted(query: BoxedShips<'_>, order: ShipOrder) -> BoxedShips<'_> {
    let query = match order {
        ShipOrder::Id => return query.order(ships::id.asc()),
        ShipOrder::Name => query.order(sql::<Text>(NAME_BYTE_ORDER).asc()),
        ShipOrder::Date => query.order(ships::prod_date.asc()),
        ShipOrder::Speed => query.order(ships::speed.asc()),
        ShipOrder::CrewSize => query.order(ships::crew_size.asc()),
        ShipOrder::Rating => query.order(ships::rating.asc()),
    };
    query.then_order_by(ships::id.asc())
}

/// Ship store over a single PostgreSQL connection.
pub struct PgShipStore<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> PgShipStore<'c> {
    /// Wrap a connection, typically one inside a transaction.
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }
}

impl ShipStore for PgShipStore<'_> {
    fn find(
        &mut self,
        filter: &ShipFilter,
        order: ShipOrder,
        page: PageRequest,
    ) -> hangar_core::Result<Vec<Ship>> {
        let offset = i64::try_from(page.offset()).unwrap_or(i64::MAX);
        let rows = sorted(filtered(filter), order)
            .limit(i64::from(page.size()))
            .offset(offset)
            .load::<ShipRow>(self.conn)
            .map_err(store_error)?;
        rows.into_iter().map(Ship::try_from).collect()
    }

    fn count(&mut self, filter: &ShipFilter) -> hangar_core::Result<i64> {
        filtered(filter)
            .count()
            .get_result::<i64>(self.conn)
            .map_err(store_error)
    }

    fn get(&mut self, id: i64) -> hangar_core::Result<Option<Ship>> {
        ships::table
            .find(id)
            .first::<ShipRow>(self.conn)
            .optional()
            .map_err(store_error)?
            .map(Ship::try_from)
            .transpose()
    }

    fn exists(&mut self, id: i64) -> hangar_core::Result<bool> {
        diesel::select(diesel::dsl::exists(ships::table.find(id)))
            .get_result::<bool>(self.conn)
            .map_err(store_error)
    }

    fn insert(&mut self, ship: NewShip) -> hangar_core::Result<Ship> {
        let row = diesel::insert_into(ships::table)
            .values(&NewShipRow::from(ship))
            .get_result::<ShipRow>(self.conn)
            .map_err(store_error)?;
        Ship::try_from(row)
    }

    fn save(&mut self, ship: &Ship) -> hangar_core::Result<Ship> {
        let row = diesel::update(ships::table.find(ship.id))
            .set(&ShipRow::from(ship))
            .get_result::<ShipRow>(self.conn)
            .optional()
            .map_err(store_error)?
            .ok_or(HangarError::NotFound(ship.id))?;
        Ship::try_from(row)
    }

    fn delete(&mut self, id: i64) -> hangar_core::Result<bool> {
        let deleted = diesel::delete(ships::table.find(id))
            .execute(self.conn)
            .map_err(store_error)?;
        Ok(deleted > 0)
    }
}

/// Carries service errors out of a diesel transaction.
struct TxError(HangarError);

impl From<diesel::result::Error> for TxError {
    fn from(err: diesel::result::Error) -> Self {
        Self(store_error(err))
    }
}

/// Where ships live for the lifetime of the server.
#[derive(Clone)]
pub enum ShipBackend {
    /// PostgreSQL through a connection pool.
    Postgres(DbPool),
    /// Process-local store, lost on restart.
    Memory(Arc<Mutex<MemoryShipStore>>),
}

impl ShipBackend {
    /// An empty in-memory backend.
    pub fn memory() -> Self {
        Self::Memory(Arc::new(Mutex::new(MemoryShipStore::new())))
    }

    /// Run `op` against the store as one unit of work.
    ///
    /// On PostgreSQL the work runs in a transaction that rolls back on error.
    /// Blocking; call from `web::block`.
    pub fn run<T>(
        &self,
        op: impl FnOnce(&mut dyn ShipStore) -> hangar_core::Result<T>,
    ) -> hangar_core::Result<T> {
        match self {
            ShipBackend::Postgres(pool) => {
                let mut pooled = pool.get().map_err(|err| {
                    log::error!("database pool unavailable: {err}");
                    HangarError::Store(err.to_string())
                })?;
                let conn: &mut PgConnection = &mut pooled;
                conn.transaction(|conn| {
                    let mut store = PgShipStore::new(conn);
                    op(&mut store).map_err(TxError)
                })
                .map_err(|TxError(err)| err)
            }
            ShipBackend::Memory(store) => {
                let mut guard = store
                    .lock()
                    .map_err(|_| HangarError::Store("memory store poisoned".to_string()))?;
                op(&mut *guard)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::TestDatabase;
    use hangar_core::validator::start_of_year;
    use hangar_core::{ShipInput, ShipService, ShipType};

    #[test]
    fn contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("Star"), "%Star%");
        assert_eq!(contains_pattern("100%_ok"), "%100\\%\\_ok%");
        assert_eq!(contains_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn memory_backend_runs_service_calls() {
        let backend = ShipBackend::memory();
        let created = backend
            .run(|store| ShipService::new(store).add(sample("Tycho", 0.4)))
            .expect("add");
        let found = backend
            .run(|store| ShipService::new(store).get_by_id(created.id))
            .expect("get");
        assert_eq!(found, Some(created));
    }

    fn sample(name: &str, speed: f64) -> ShipInput {
        built(name, ShipType::Merchant, 3001, speed)
    }

    fn built(name: &str, ship_type: ShipType, year: i32, speed: f64) -> ShipInput {
        ShipInput {
            name: Some(name.to_string()),
            planet: Some("Ceres".to_string()),
            ship_type: Some(ship_type),
            prod_date: start_of_year(year),
            used: None,
            speed: Some(speed),
            crew_size: Some(12),
        }
    }

    fn names_matching(backend: &ShipBackend, filter: ShipFilter, order: ShipOrder) -> Vec<String> {
        let page = PageRequest::new(0, 10).expect("page");
        backend
            .run(|store| ShipService::new(store).list(&filter, order, page))
            .expect("list")
            .into_iter()
            .map(|ship| ship.name)
            .collect()
    }

    fn names_in_name_order(backend: &ShipBackend) -> Vec<String> {
        for name in ["alpha", "Zulu", "Bravo", "_under"] {
            backend
                .run(|store| ShipService::new(store).add(sample(name, 0.5)))
                .expect("add");
        }
        names_matching(backend, ShipFilter::default(), ShipOrder::Name)
    }

    #[test]
    fn memory_backend_sorts_names_by_byte_order() {
        let names = names_in_name_order(&ShipBackend::memory());
        assert_eq!(names, vec!["Bravo", "Zulu", "_under", "alpha"]);
    }

    #[test]
    #[ignore = "requires PostgreSQL via TEST_DATABASE_URL"]
    fn postgres_sorts_names_like_memory() {
        let test_db = TestDatabase::new();
        let postgres = names_in_name_order(&ShipBackend::Postgres(test_db.pool()));
        let memory = names_in_name_order(&ShipBackend::memory());
        assert_eq!(postgres, memory);
    }

    #[test]
    #[ignore = "requires PostgreSQL via TEST_DATABASE_URL"]
    fn postgres_store_filters_sorts_and_pages() {
        let test_db = TestDatabase::new();
        let backend = ShipBackend::Postgres(test_db.pool());
        let fleet = [
            ("Rocinante", ShipType::Military, 3001, 0.8),
            ("Canterbury", ShipType::Transport, 2950, 0.2),
            ("Razorback", ShipType::Merchant, 3010, 0.5),
        ];
        for (name, ship_type, year, speed) in fleet {
            backend
                .run(|store| ShipService::new(store).add(built(name, ship_type, year, speed)))
                .expect("add");
        }

        let by_name = ShipFilter {
            name: Some("R".to_string()),
            ..ShipFilter::default()
        };
        assert_eq!(
            names_matching(&backend, by_name, ShipOrder::Speed),
            vec!["Razorback", "Rocinante"]
        );

        let count = backend
            .run(|store| ShipService::new(store).count(&ShipFilter::default()))
            .expect("count");
        assert_eq!(count, 3);

        let dates = ShipFilter {
            after: start_of_year(2950),
            before: start_of_year(3001),
            ..ShipFilter::default()
        };
        assert_eq!(
            names_matching(&backend, dates.clone(), ShipOrder::Id),
            vec!["Rocinante", "Canterbury"]
        );
        let later = ShipFilter {
            after: start_of_year(3001),
            ..dates
        };
        assert_eq!(names_matching(&backend, later, ShipOrder::Id), vec!["Rocinante"]);

        let military = ShipFilter {
            ship_type: Some(ShipType::Military),
            ..ShipFilter::default()
        };
        assert_eq!(names_matching(&backend, military, ShipOrder::Id), vec!["Rocinante"]);

        let ratings = ShipFilter {
            min_rating: Some(3.37),
            max_rating: Some(4.0),
            ..ShipFilter::default()
        };
        assert_eq!(
            names_matching(&backend, ratings.clone(), ShipOrder::Rating),
            vec!["Rocinante", "Razorback"]
        );
        let lower = ShipFilter {
            max_rating: Some(3.5),
            ..ratings
        };
        assert_eq!(names_matching(&backend, lower, ShipOrder::Id), vec!["Rocinante"]);

        let crew = ShipFilter {
            min_crew_size: Some(12),
            max_crew_size: Some(12),
            ..ShipFilter::default()
        };
        assert_eq!(names_matching(&backend, crew.clone(), ShipOrder::Id).len(), 3);
        let no_crew = ShipFilter {
            min_crew_size: Some(13),
            ..crew
        };
        assert!(names_matching(&backend, no_crew, ShipOrder::Id).is_empty());

        let beyond = PageRequest::new(4, 3).expect("page");
        let empty = backend
            .run(|store| {
                ShipService::new(store).list(&ShipFilter::default(), ShipOrder::Id, beyond)
            })
            .expect("list");
        assert!(empty.is_empty());
    }
    #[test]
    #[ignore = "requires PostgreSQL via TEST_DATABASE_URL"]
    fn postgres_update_rolls_back_on_invalid_field() {
        let test_db = TestDatabase::new();
        let backend = ShipBackend::Postgres(test_db.pool());
        let created = backend
            .run(|store| ShipService::new(store).add(sample("Donnager", 0.3)))
            .expect("add");

        let result = backend.run(|store| {
            ShipService::new(store).update(
                created.id,
                ShipInput {
                    name: Some("Renamed".to_string()),
                    crew_size: Some(0),
                    ..ShipInput::default()
                },
            )
        });
        assert_eq!(result, Err(HangarError::invalid_field("crewSize")));

        let stored = backend
            .run(|store| ShipService::new(store).get_by_id(created.id))
            .expect("get");
        assert_eq!(stored, Some(created));

        let missing = backend.run(|store| ShipService::new(store).delete(99999));
        assert_eq!(missing, Err(HangarError::NotFound(99999)));
    }
}
