//! Read-only access to the local countries/cities database.

use rusqlite::{Connection, OpenFlags, Row, params};
use std::path::{Path, PathBuf};

use crate::{
    error::StoreError,
    model::{City, Country},
};

const COUNTRIES_QUERY: &str = "SELECT id, name, iso2 FROM country ORDER BY name";

const CITIES_QUERY: &str = "
    SELECT
        city.id,
        city.name,
        city.latitude,
        city.longitude,
        (SELECT admin.name FROM admin WHERE admin.id = city.admin_id) AS admin
    FROM city
    WHERE city.country_id = ?1
    ORDER BY city.name";

#[derive(Debug, Clone)]
pub struct LocationStore {
    path: PathBuf,
}

impl LocationStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every country, ordered by name, with its cities ordered by name.
    ///
    /// Any failure aborts the whole load; a partial list is never returned.
    /// The connection is dropped on every exit path.
    pub fn list_countries(&self) -> Result<Vec<Country>, StoreError> {
        let conn = Connection::open_with_flags(&self.path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|e| {
                StoreError::new(
                    format!("Could not open locations database {}", self.path.display()),
                    e,
                )
            })?;

        let countries = load_countries(&conn)
            .map_err(|e| StoreError::new("Could not read locations database", e))?;

        let mut result = Vec::with_capacity(countries.len());
        for (id, name, iso2) in countries {
            let cities = load_cities(&conn, id).map_err(|e| {
                StoreError::new(format!("Could not read cities of {name} (id {id})"), e)
            })?;
            result.push(Country { id, name, iso2, cities });
        }

        tracing::debug!(countries = result.len(), path = %self.path.display(), "loaded locations");
        Ok(result)
    }
}

fn load_countries(conn: &Connection) -> rusqlite::Result<Vec<(i64, String, String)>> {
    let mut stmt = conn.prepare(COUNTRIES_QUERY)?;
    let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?;
    rows.collect()
}

fn load_cities(conn: &Connection, country_id: i64) -> rusqlite::Result<Vec<City>> {
    let mut stmt = conn.prepare_cached(CITIES_QUERY)?;
    let rows = stmt.query_map(params![country_id], row_to_city)?;
    rows.collect()
}

fn row_to_city(row: &Row) -> rusqlite::Result<City> {
    Ok(City {
        id: row.get(0)?,
        name: row.get(1)?,
        latitude: row.get(2)?,
        longitude: row.get(3)?,
        admin: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
    })
}
