use nom::{
    Finish, IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take, take_while_m_n},
    character::complete::{char, u16, u32},
    combinator::{all_consuming, map, map_parser, map_res, opt, value},
    sequence::{preceded, separated_pair, terminated},
};
use serde::Serialize;

use crate::units::meters_to_statute_miles;

/// One decoded element of a change group, e.g. `("Wind", "320° at 15kt gusting 22kt")`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TafRow {
    pub label: &'static str,
    pub value: String,
}

impl TafRow {
    fn new(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
        }
    }
}

const WEATHER_CODES: [(&str, &str); 22] = [
    ("RA", "Rain"),
    ("SN", "Snow"),
    ("TS", "Thunderstorm"),
    ("TSRA", "Thunderstorm with rain"),
    ("TSSN", "Thunderstorm with snow"),
    ("FG", "Fog"),
    ("FZFG", "Freezing fog"),
    ("BR", "Mist"),
    ("HZ", "Haze"),
    ("FU", "Smoke"),
    ("DZ", "Drizzle"),
    ("FZRA", "Freezing rain"),
    ("FZDZ", "Freezing drizzle"),
    ("PL", "Ice pellets"),
    ("SH", "Showers"),
    ("SHRA", "Rain showers"),
    ("SHSN", "Snow showers"),
    ("VCSH", "Showers in vicinity"),
    ("VCTS", "Thunderstorm in vicinity"),
    ("BLSN", "Blowing snow"),
    ("NSW", "No significant weather"),
    ("CAVOK", "Ceiling and visibility OK"),
];

/// Codes that never take an intensity prefix.
const WITHOUT_INTENSITY: [&str; 2] = ["NSW", "CAVOK"];

/// Decodes one token of a change group. Tokens that are not weather, such as the
/// station or the validity period, and tokens not understood give `None`.
pub fn decode_element(token: &str) -> Option<TafRow> {
    if is_station_or_validity(token) {
        return None;
    }
    decode_wind(token)
        .or_else(|| decode_visibility(token))
        .or_else(|| decode_clouds(token))
        .or_else(|| decode_vertical_visibility(token))
        .or_else(|| decode_weather(token))
}

fn is_station_or_validity(token: &str) -> bool {
    let station = token.len() == 4
        && token.chars().all(|c| c.is_ascii_alphabetic())
        && weather_label(token).is_none();
    let validity = token.len() == 9 && token.contains('/');
    station || validity
}

fn nom_speed(input: &str) -> IResult<&str, u16> {
    map_parser(take_while_m_n(2, 3, |c: char| c.is_ascii_digit()), u16).parse(input)
}

/// `dddssKT`, `dddssGggKT` or `VRBssKT`. Direction is `None` for variable.
fn nom_wind(input: &str) -> IResult<&str, (Option<u16>, u16, Option<u16>)> {
    terminated(
        (
            alt((
                value(None, tag("VRB")),
                map(map_parser(take(3usize), all_consuming(u16)), Some),
            )),
            nom_speed,
            opt(preceded(char('G'), nom_speed)),
        ),
        tag("KT"),
    )
    .parse(input)
}

fn decode_wind(token: &str) -> Option<TafRow> {
    let (_, (direction, speed, gust)) = all_consuming(nom_wind).parse(token).finish().ok()?;
    let mut text = match direction {
        Some(0) if speed == 0 && gust.is_none() => return Some(TafRow::new("Wind", "Calm")),
        Some(direction) => format!("{direction:03}° at {speed}kt"),
        None => format!("Variable at {speed}kt"),
    };
    if let Some(gust) = gust {
        text.push_str(&format!(" gusting {gust}kt"));
    }
    Some(TafRow::new("Wind", text))
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Modifier {
    LessThan,
    GreaterThan,
}

fn nom_modifier(input: &str) -> IResult<&str, Modifier> {
    alt((
        value(Modifier::LessThan, char('M')),
        value(Modifier::GreaterThan, char('P')),
    ))
    .parse(input)
}

/// Statute mile visibility, `6SM`, `1/2SM`, `1 1/2SM`, `M1/4SM` or `P6SM`.
fn nom_statute_miles(
    input: &str,
) -> IResult<&str, (Option<Modifier>, Option<u32>, u32, Option<u32>)> {
    terminated(
        (
            opt(nom_modifier),
            alt((
                map(
                    (terminated(u32, char(' ')), separated_pair(u32, char('/'), u32)),
                    |(whole, (n, d))| (Some(whole), n, Some(d)),
                ),
                map(separated_pair(u32, char('/'), u32), |(n, d)| (None, n, Some(d))),
                map(u32, |whole| (None, whole, None)),
            )),
        ),
        tag("SM"),
    )
    .map(|(modifier, (whole, numerator, denominator))| (modifier, whole, numerator, denominator))
    .parse(input)
}

fn is_fraction_of_mile(token: &str) -> bool {
    all_consuming(terminated(separated_pair(u32, char('/'), u32), tag::<_, _, nom::error::Error<&str>>("SM")))
        .parse(token)
        .is_ok()
}

/// Splits the text of a group into tokens. A whole number of miles stays joined
/// to the fraction after it, so `1 1/2SM` is one token.
pub(crate) fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut words = text.split_whitespace().peekable();
    while let Some(word) = words.next() {
        let whole_miles = (1..=2).contains(&word.len()) && word.bytes().all(|b| b.is_ascii_digit());
        match words.next_if(|next| whole_miles && is_fraction_of_mile(next)) {
            Some(fraction) => tokens.push(format!("{word} {fraction}")),
            None => tokens.push(word.to_string()),
        }
    }
    tokens
}

fn nom_meters(input: &str) -> IResult<&str, u32> {
    map_res(
        take_while_m_n(4, 4, |c: char| c.is_ascii_digit()),
        str::parse::<u32>,
    )
    .parse(input)
}

/// Visibility of a token in statute miles. Metric tokens are converted.
pub(crate) fn visibility_statute_miles(token: &str) -> Option<f64> {
    if let Ok((_, (_, whole, numerator, denominator))) = all_consuming(nom_statute_miles)
        .parse(token)
        .finish()
    {
        let whole = f64::from(whole.unwrap_or_default());
        return match denominator {
            Some(0) => None,
            Some(d) => Some(whole + f64::from(numerator) / f64::from(d)),
            None => Some(f64::from(numerator)),
        };
    }
    let (_, meters) = all_consuming(nom_meters).parse(token).finish().ok()?;
    (1..=9999)
        .contains(&meters)
        .then(|| meters_to_statute_miles(f64::from(meters)))
}

fn decode_visibility(token: &str) -> Option<TafRow> {
    if token == "P6SM" || token == "9999" {
        return Some(TafRow::new("Visibility", "6+ SM"));
    }
    if let Ok((_, (modifier, whole, numerator, denominator))) =
        all_consuming(nom_statute_miles).parse(token).finish()
    {
        let amount = match (whole, denominator) {
            (_, Some(0)) => return None,
            (Some(whole), Some(d)) => format!("{whole} {numerator}/{d}"),
            (None, Some(d)) => format!("{numerator}/{d}"),
            (_, None) => numerator.to_string(),
        };
        let text = match modifier {
            Some(Modifier::GreaterThan) => format!("{amount}+ SM"),
            Some(Modifier::LessThan) => format!("<{amount} SM"),
            None => format!("{amount} SM"),
        };
        return Some(TafRow::new("Visibility", text));
    }
    let miles = visibility_statute_miles(token)?;
    let text = if miles >= 6.0 {
        "6+ SM".to_string()
    } else if miles >= 1.0 {
        format!("{} SM", miles.floor())
    } else {
        format!("{miles:.1} SM")
    };
    Some(TafRow::new("Visibility", text))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LayerCover {
    Few,
    Scattered,
    Broken,
    Overcast,
    VerticalVisibility,
}

impl LayerCover {
    const fn label(&self) -> &'static str {
        match self {
            LayerCover::Few => "Few",
            LayerCover::Scattered => "Scattered",
            LayerCover::Broken => "Broken",
            LayerCover::Overcast => "Overcast",
            LayerCover::VerticalVisibility => "Vertical visibility",
        }
    }

    pub(crate) const fn is_ceiling(&self) -> bool {
        matches!(
            self,
            LayerCover::Broken | LayerCover::Overcast | LayerCover::VerticalVisibility
        )
    }
}

/// A cloud layer or vertical visibility with its height in feet.
pub(crate) fn nom_sky_layer(input: &str) -> IResult<&str, (LayerCover, u32)> {
    (
        alt((
            value(LayerCover::Few, tag("FEW")),
            value(LayerCover::Scattered, tag("SCT")),
            value(LayerCover::Broken, tag("BKN")),
            value(LayerCover::Overcast, tag("OVC")),
            value(LayerCover::VerticalVisibility, tag("VV")),
        )),
        map_parser(take(3usize), all_consuming(u32)),
    )
        .map(|(cover, hundreds)| (cover, hundreds * 100))
        .parse(input)
}

fn nom_cloud_type(input: &str) -> IResult<&str, &str> {
    alt((tag("CB"), tag("TCU"))).parse(input)
}

fn decode_clouds(token: &str) -> Option<TafRow> {
    match token {
        "SKC" => return Some(TafRow::new("Clouds", "Sky clear")),
        "CLR" => return Some(TafRow::new("Clouds", "Clear")),
        "NSC" => return Some(TafRow::new("Clouds", "No significant clouds")),
        _ => {}
    }
    let (_, ((cover, height), cloud_type)) = all_consuming((nom_sky_layer, opt(nom_cloud_type)))
        .parse(token)
        .finish()
        .ok()?;
    if cover == LayerCover::VerticalVisibility {
        return None;
    }
    let text = match cloud_type {
        Some(cloud_type) => format!("{} {height}' {cloud_type}", cover.label()),
        None => format!("{} {height}'", cover.label()),
    };
    Some(TafRow::new("Clouds", text))
}

fn decode_vertical_visibility(token: &str) -> Option<TafRow> {
    let (_, (cover, height)) = all_consuming(nom_sky_layer).parse(token).finish().ok()?;
    (cover == LayerCover::VerticalVisibility)
        .then(|| TafRow::new("Vertical Visibility", format!("{height}'")))
}

fn weather_label(code: &str) -> Option<&'static str> {
    WEATHER_CODES
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, label)| *label)
}

fn decode_weather(token: &str) -> Option<TafRow> {
    let (intensity, code) = match token.split_at_checked(1) {
        Some(("-", code)) => (Some("Light"), code),
        Some(("+", code)) => (Some("Heavy"), code),
        _ => (None, token),
    };
    let label = weather_label(code)?;
    let text = match intensity {
        None => label.to_string(),
        Some(_) if WITHOUT_INTENSITY.contains(&code) => return None,
        Some(intensity) => format!("{intensity} {}", lowercase_first(label)),
    };
    Some(TafRow::new("Weather", text))
}

fn lowercase_first(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decoded(token: &str) -> Option<(&'static str, String)> {
        decode_element(token).map(|row| (row.label, row.value))
    }

    const ELEMENTS: [(&str, &str, &str); 28] = [
        ("32015G22KT", "Wind", "320° at 15kt gusting 22kt"),
        ("28008KT", "Wind", "280° at 8kt"),
        ("VRB03KT", "Wind", "Variable at 3kt"),
        ("00000KT", "Wind", "Calm"),
        ("250105G120KT", "Wind", "250° at 105kt gusting 120kt"),
        ("P6SM", "Visibility", "6+ SM"),
        ("9999", "Visibility", "6+ SM"),
        ("6SM", "Visibility", "6 SM"),
        ("1/2SM", "Visibility", "1/2 SM"),
        ("2 3/4SM", "Visibility", "2 3/4 SM"),
        ("M1/4SM", "Visibility", "<1/4 SM"),
        ("4000", "Visibility", "2 SM"),
        ("0800", "Visibility", "0.5 SM"),
        ("9000", "Visibility", "5 SM"),
        ("OVC020", "Clouds", "Overcast 2000'"),
        ("FEW250", "Clouds", "Few 25000'"),
        ("BKN035CB", "Clouds", "Broken 3500' CB"),
        ("SCT008", "Clouds", "Scattered 800'"),
        ("SKC", "Clouds", "Sky clear"),
        ("CLR", "Clouds", "Clear"),
        ("VV002", "Vertical Visibility", "200'"),
        ("-RA", "Weather", "Light rain"),
        ("+TSRA", "Weather", "Heavy thunderstorm with rain"),
        ("TSRA", "Weather", "Thunderstorm with rain"),
        ("SHSN", "Weather", "Snow showers"),
        ("FZDZ", "Weather", "Freezing drizzle"),
        ("BR", "Weather", "Mist"),
        ("CAVOK", "Weather", "Ceiling and visibility OK"),
    ];

    #[test]
    fn test_decode_elements() {
        for (token, label, value) in ELEMENTS {
            assert_eq!(
                decoded(token),
                Some((label, value.to_string())),
                "token {token}"
            );
        }
    }

    #[test]
    fn test_skipped_tokens() {
        for token in [
            "KATL", "0112/0218", "011200Z", "AMD", "WS020/24045KT", "+CAVOK", "0000", "VV///",
            "QNH2992INS", "", "-",
        ] {
            assert_eq!(decoded(token), None, "token {token}");
        }
    }

    #[test]
    fn test_visibility_in_miles() {
        assert_eq!(visibility_statute_miles("3SM"), Some(3.0));
        assert_eq!(visibility_statute_miles("1/4SM"), Some(0.25));
        assert_eq!(visibility_statute_miles("M1/4SM"), Some(0.25));
        assert!(visibility_statute_miles("9999").unwrap() > 6.0);
        assert!((visibility_statute_miles("1600").unwrap() - 0.994).abs() < 0.001);
        assert_eq!(visibility_statute_miles("1 1/2SM"), Some(1.5));
        assert_eq!(visibility_statute_miles("1/0SM"), None);
        assert_eq!(visibility_statute_miles("0000"), None);
        assert_eq!(visibility_statute_miles("FEW020"), None);
    }

    #[test]
    fn test_tokenize_joins_mixed_miles() {
        assert_eq!(
            tokenize("28008KT 1 1/2SM BKN040"),
            vec!["28008KT", "1 1/2SM", "BKN040"]
        );
        assert_eq!(tokenize("FM1200Z 2 SCT020"), vec!["FM1200Z", "2", "SCT020"]);
        assert_eq!(tokenize("0112/0218 1/2SM"), vec!["0112/0218", "1/2SM"]);
        assert!(tokenize("  ").is_empty());
    }
}
