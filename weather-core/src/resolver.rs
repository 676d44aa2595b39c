//! Turns a user selection into a [`ResolvedLocation`].

use crate::model::{City, Country, FetchMode, ResolvedLocation};

/// What the user picked: a city from the database, or raw coordinates.
#[derive(Debug, Clone, Copy)]
pub enum Selection<'a> {
    City { country: &'a Country, city: &'a City },
    Coordinates { latitude: f64, longitude: f64 },
}

/// Build the location the orchestrator works on. Performs no I/O.
///
/// Coordinate selections carry no country code; it is learned later from the
/// reverse-geocoding result.
pub fn resolve(selection: Selection<'_>) -> ResolvedLocation {
    match selection {
        Selection::City { country, city } => ResolvedLocation {
            mode: FetchMode::ByCity,
            latitude: city.latitude,
            longitude: city.longitude,
            display_name: Some(format!("{}, {}", city.name, country.name)),
            country_code: Some(country.iso2.clone()).filter(|c| !c.trim().is_empty()),
        },
        Selection::Coordinates { latitude, longitude } => ResolvedLocation {
            mode: FetchMode::ByCoordinates,
            latitude,
            longitude,
            display_name: None,
            country_code: None,
        },
    }
}

/// Find a country and one of its cities by name, ignoring case.
pub fn find_city<'a>(
    countries: &'a [Country],
    country_name: &str,
    city_name: &str,
) -> Option<(&'a Country, &'a City)> {
    let country = find_country(countries, country_name)?;
    let city = country.cities.iter().find(|c| c.name.eq_ignore_ascii_case(city_name.trim()))?;
    Some((country, city))
}

/// Find a country by name or two-letter code, ignoring case.
pub fn find_country<'a>(countries: &'a [Country], name: &str) -> Option<&'a Country> {
    let name = name.trim();
    countries
        .iter()
        .find(|c| c.name.eq_ignore_ascii_case(name))
        .or_else(|| countries.iter().find(|c| c.iso2.eq_ignore_ascii_case(name)))
}
