use nom::{
    Finish, IResult, Parser,
    bytes::complete::take,
    character::complete::u16,
    combinator::{all_consuming, map_parser},
};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

/// Forecast altitudes in bulletin column order.
pub const ALTITUDE_LADDER_FT: [u32; 9] = [3000, 6000, 9000, 12000, 18000, 24000, 30000, 34000, 39000];

/// Direction reported for light and variable winds (`9900`).
pub const LIGHT_AND_VARIABLE_DEG: u16 = 990;

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindsAloftLevel {
    pub altitude_ft: u32,
    pub direction_deg: Option<u16>,
    pub speed_kt: Option<u16>,
    pub temperature_c: Option<i32>,
    /// Set when a nearby station supplied the row instead of the requested one.
    pub source_station_code: Option<String>,
}

impl WindsAloftLevel {
    pub fn is_light_and_variable(&self) -> bool {
        self.direction_deg == Some(LIGHT_AND_VARIABLE_DEG)
    }
}

/// Decodes one bulletin cell such as `2714`, `2714+05`, `2714-05`, `9900` or `731960`.
pub fn decode_level(
    token: &str,
    altitude_ft: u32,
    source_station: Option<&str>,
) -> Option<WindsAloftLevel> {
    let (wind_part, temperature_c) = split_temperature(token);
    if wind_part.len() < 4 {
        return None;
    }
    let (remaining, (direction_tens, speed)) = nom_direction_and_speed(wind_part).finish().ok()?;

    let (direction_deg, speed_kt) = match (direction_tens, speed) {
        (99, 0) => (LIGHT_AND_VARIABLE_DEG, 0),
        // 100 kt and above is encoded by adding 50 to the direction
        (51..=86, speed) => ((direction_tens - 50) * 10, speed + 100),
        (tens, speed) => (tens * 10, speed),
    };

    // above 24000 ft the sign is left out and the temperature is always negative
    let temperature_c = temperature_c.or_else(|| match remaining.len() {
        2 => remaining.parse::<i32>().ok().map(|t| -t),
        _ => None,
    });

    Some(WindsAloftLevel {
        altitude_ft,
        direction_deg: Some(direction_deg),
        speed_kt: Some(speed_kt),
        temperature_c,
        source_station_code: source_station.map(str::to_string),
    })
}

/// Splits at a `+` anywhere or at a `-` that is not the first character.
fn split_temperature(token: &str) -> (&str, Option<i32>) {
    let split_at = token
        .find('+')
        .or_else(|| token.char_indices().skip(1).find(|(_, c)| *c == '-').map(|(i, _)| i));
    match split_at {
        Some(index) => {
            let (wind, temperature) = token.split_at(index);
            (wind, temperature.parse().ok())
        }
        None => (token, None),
    }
}

fn nom_two_digits(input: &str) -> IResult<&str, u16> {
    map_parser(take(2usize), all_consuming(u16)).parse(input)
}

fn nom_direction_and_speed(input: &str) -> IResult<&str, (u16, u16)> {
    (nom_two_digits, nom_two_digits).parse(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(altitude_ft: u32, direction: u16, speed: u16, temperature: Option<i32>) -> WindsAloftLevel {
        WindsAloftLevel {
            altitude_ft,
            direction_deg: Some(direction),
            speed_kt: Some(speed),
            temperature_c: temperature,
            source_station_code: None,
        }
    }

    const CELLS: [(&str, u32, (u16, u16, Option<i32>)); 8] = [
        ("2714", 3000, (270, 14, None)),
        ("2714+05", 6000, (270, 14, Some(5))),
        ("2714-05", 6000, (270, 14, Some(-5))),
        ("9900", 9000, (990, 0, None)),
        ("9900+12", 9000, (990, 0, Some(12))),
        ("0507-14", 12000, (50, 7, Some(-14))),
        ("731960", 34000, (230, 119, Some(-60))),
        ("2545-43", 30000, (250, 45, Some(-43))),
    ];

    #[test]
    fn test_decode_cells() {
        for (token, altitude, (direction, speed, temperature)) in CELLS {
            assert_eq!(
                decode_level(token, altitude, None),
                Some(level(altitude, direction, speed, temperature)),
                "token {token}"
            );
        }
    }

    #[test]
    fn test_light_and_variable() {
        let lv = decode_level("9900", 9000, None).unwrap();
        assert!(lv.is_light_and_variable());
        assert_eq!(lv.speed_kt, Some(0));
    }

    #[test]
    fn test_malformed_cells() {
        for token in ["", "271", "-05", "27X4", "AB14+05", "27+05", "ATL"] {
            assert_eq!(decode_level(token, 3000, None), None, "token {token}");
        }
    }

    #[test]
    fn test_bad_temperature_keeps_wind() {
        let decoded = decode_level("2714+X5", 6000, None).unwrap();
        assert_eq!(decoded.direction_deg, Some(270));
        assert_eq!(decoded.temperature_c, None);
    }

    #[test]
    fn test_source_station_is_tagged() {
        let decoded = decode_level("2714", 3000, Some("ATL")).unwrap();
        assert_eq!(decoded.source_station_code.as_deref(), Some("ATL"));
    }
}
