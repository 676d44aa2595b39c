//! Terminal output. Each printer is the single consumer of its event channel,
//! so lines appear in the order the core published them.

use anyhow::Context;
use std::path::PathBuf;
use tokio::sync::mpsc::UnboundedReceiver;

use weather_core::{
    CityTemperature, Country, DisplayEvent, RankingEvent, TemperatureUnit,
    units::celsius_to_fahrenheit,
};

pub async fn print_display_events(
    mut rx: UnboundedReceiver<DisplayEvent>,
    unit: TemperatureUnit,
    flag_out: Option<PathBuf>,
) -> anyhow::Result<()> {
    while let Some(event) = rx.recv().await {
        match event {
            DisplayEvent::Weather { latitude, longitude, temperature_c, temperature_f, description } => {
                println!("Temperature: {}", temperature_line(unit, temperature_c, temperature_f));
                println!("Weather:     {description}");
                println!("Coordinates: LAT: {latitude} - LONG: {longitude}");
            }
            DisplayEvent::Location(location) => println!("Location:    {location}"),
            DisplayEvent::Time(time) => println!("Time:        {}", time.format("%Y-%m-%dT%H:%M:%S")),
            DisplayEvent::Flag { country_code, image } => match &flag_out {
                Some(path) => {
                    tokio::fs::write(path, &image)
                        .await
                        .with_context(|| format!("Failed to write flag image: {}", path.display()))?;
                    println!("Flag:        {country_code} (saved to {})", path.display());
                }
                None => println!("Flag:        {country_code} ({} bytes)", image.len()),
            },
            DisplayEvent::FlagCleared => println!("Flag:        unavailable"),
            DisplayEvent::Notice(message) => eprintln!("warning: {message}"),
        }
    }
    Ok(())
}

fn temperature_line(unit: TemperatureUnit, celsius: f64, fahrenheit: f64) -> String {
    let (first, other, second) = match unit {
        TemperatureUnit::Celsius => (celsius, TemperatureUnit::Fahrenheit, fahrenheit),
        TemperatureUnit::Fahrenheit => (fahrenheit, TemperatureUnit::Celsius, celsius),
    };
    format!("{first} {} / {second} {}", unit.symbol(), other.symbol())
}

pub async fn print_progress(mut rx: UnboundedReceiver<RankingEvent>) {
    while let Some(RankingEvent::Progress { completed, total }) = rx.recv().await {
        eprint!("\rFetched {completed}/{total} cities");
    }
    eprintln!();
}

/// Ranked row temperature, e.g. `"20.5 °C - 68.9 °F"`.
pub fn ranked_temperature(celsius: f64) -> String {
    format!("{celsius} °C - {} °F", celsius_to_fahrenheit(celsius))
}

pub fn print_ranking(country: &Country, rows: &[CityTemperature]) {
    println!("Temperatures in {} ({} of {} cities)", country.name, rows.len(), country.cities.len());
    println!("{:<28} {:<28} Temperature", "City", "Admin");
    for row in rows {
        println!("{:<28} {:<28} {}", row.city, row.admin, ranked_temperature(row.temperature_c));
    }
}

pub fn print_countries(countries: &[Country]) {
    for country in countries {
        println!("{:<4} {:<40} {} cities", country.iso2, country.name, country.cities.len());
    }
}

pub fn print_cities(country: &Country) {
    println!("{} ({})", country.name, country.iso2);
    for city in &country.cities {
        println!(
            "  {:<28} {:<28} {:>9.4} {:>10.4}",
            city.name, city.admin, city.latitude, city.longitude
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranked_temperature_shows_both_units() {
        assert_eq!(ranked_temperature(20.0), "20 °C - 68 °F");
        assert_eq!(ranked_temperature(-3.5), "-3.5 °C - 25.7 °F");
    }

    #[test]
    fn temperature_line_puts_preferred_unit_first() {
        assert_eq!(temperature_line(TemperatureUnit::Celsius, 20.0, 68.0), "20 °C / 68 °F");
        assert_eq!(temperature_line(TemperatureUnit::Fahrenheit, 20.0, 68.0), "68 °F / 20 °C");
    }
}
