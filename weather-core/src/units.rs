use std::cmp::Ordering;

/// Convert Celsius to Fahrenheit, rounded half-to-even at two decimals.
pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    round_half_even(celsius * 9.0 / 5.0 + 32.0, 2)
}

/// Round `value` to `places` decimals using banker's rounding.
///
/// Rounding is decided on the shortest decimal representation of the value
/// (the same digits `Display` prints), so `32.225` rounds to `32.22` even
/// though its binary approximation sits slightly above or below the tie.
pub fn round_half_even(value: f64, places: usize) -> f64 {
    if !value.is_finite() {
        return value;
    }

    let repr = value.abs().to_string();
    let (int_part, frac_part) = repr.split_once('.').unwrap_or((repr.as_str(), ""));
    if frac_part.len() <= places {
        return value;
    }

    let (kept, rest) = frac_part.split_at(places);
    let Ok(mut scaled) = format!("{int_part}{kept}").parse::<u128>() else {
        return value;
    };

    let first = rest.as_bytes()[0];
    let tail_nonzero = rest.bytes().skip(1).any(|b| b != b'0');
    let round_up = match first.cmp(&b'5') {
        Ordering::Greater => true,
        Ordering::Less => false,
        Ordering::Equal => tail_nonzero || scaled % 2 == 1,
    };
    if round_up {
        scaled += 1;
    }

    let magnitude = scaled as f64 / 10f64.powi(places as i32);
    if value.is_sign_negative() { -magnitude } else { magnitude }
}
