pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

pub fn fahrenheit_to_celsius(fahrenheit: f64) -> f64 {
    (fahrenheit - 32.0) * 5.0 / 9.0
}

pub const METERS_PER_STATUTE_MILE: f64 = 1609.344;
pub const FEET_PER_METER: f64 = 3.28084;

pub fn meters_to_statute_miles(meters: f64) -> f64 {
    meters / METERS_PER_STATUTE_MILE
}
