use std::sync::LazyLock;

use nom::{Finish, Parser, combinator::all_consuming};
use regex::Regex;
use serde::Serialize;

use super::element::{LayerCover, nom_sky_layer, tokenize, visibility_statute_miles};
use crate::flight_category::FlightCategory;

/// Display hint for a change group, independent of any UI toolkit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WeatherIcon {
    Thunderstorm,
    HeavyRain,
    Rain,
    Snow,
    FreezingRain,
    Fog,
    Haze,
    ReducedVisibility,
    Overcast,
    Cloudy,
    PartlyCloudy,
    Clear,
    Unknown,
}

impl WeatherIcon {
    pub const fn name(&self) -> &'static str {
        match self {
            WeatherIcon::Thunderstorm => "thunderstorm",
            WeatherIcon::HeavyRain => "heavy-rain",
            WeatherIcon::Rain => "rain",
            WeatherIcon::Snow => "snow",
            WeatherIcon::FreezingRain => "freezing-rain",
            WeatherIcon::Fog => "fog",
            WeatherIcon::Haze => "haze",
            WeatherIcon::ReducedVisibility => "reduced-visibility",
            WeatherIcon::Overcast => "overcast",
            WeatherIcon::Cloudy => "cloudy",
            WeatherIcon::PartlyCloudy => "partly-cloudy",
            WeatherIcon::Clear => "clear",
            WeatherIcon::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentEstimate {
    pub category: Option<FlightCategory>,
    pub icon: WeatherIcon,
}

impl SegmentEstimate {
    const fn new(category: FlightCategory, icon: WeatherIcon) -> Self {
        Self {
            category: Some(category),
            icon,
        }
    }

    const UNKNOWN: SegmentEstimate = SegmentEstimate {
        category: None,
        icon: WeatherIcon::Unknown,
    };
}

static THUNDERSTORM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-+]?(?:VC)?TS(?:RA|SN|PL|GR|GS)*$").unwrap());
static HEAVY_RAIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+(?:SH)?RA(?:DZ|SN)?$").unwrap());
static RAIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?(?:SH)?(?:RA|DZ)(?:RA|DZ)?$").unwrap());
static SNOW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[-+]?(?:SH|BL|DR)?(?:RA)?(?:SN|SG|PL)(?:RA)?$").unwrap()
});
static FREEZING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[-+]?FZ(?:RA|DZ)$").unwrap());
static FOG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(?:MI|BC|PR|FZ)?FG$").unwrap());
static MIST_OR_HAZE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(?:BR|HZ|FU)$").unwrap());

const CLEAR_SKY: [&str; 6] = ["SKC", "CLR", "CAVOK", "P6SM", "9999", "NSC"];

/// Estimates the flight category and icon of one change group from its raw text.
///
/// Rules are tried in order and the first one that matches wins: present weather
/// first, then visibility, then the lowest ceiling, then the sky condition.
pub fn analyze_segment(text: &str) -> SegmentEstimate {
    let upper = text.to_ascii_uppercase();
    let tokens = tokenize(&upper);
    let any = |pattern: &LazyLock<Regex>| tokens.iter().any(|token| pattern.is_match(token));

    if any(&THUNDERSTORM) {
        return SegmentEstimate::new(FlightCategory::Ifr, WeatherIcon::Thunderstorm);
    }
    if any(&HEAVY_RAIN) {
        return SegmentEstimate::new(FlightCategory::Ifr, WeatherIcon::HeavyRain);
    }
    if any(&RAIN) {
        return SegmentEstimate::new(FlightCategory::Mvfr, WeatherIcon::Rain);
    }
    if any(&SNOW) {
        return SegmentEstimate::new(FlightCategory::Ifr, WeatherIcon::Snow);
    }
    if any(&FREEZING) {
        return SegmentEstimate::new(FlightCategory::Lifr, WeatherIcon::FreezingRain);
    }
    if any(&FOG) {
        return SegmentEstimate::new(FlightCategory::Lifr, WeatherIcon::Fog);
    }
    if any(&MIST_OR_HAZE) {
        return SegmentEstimate::new(FlightCategory::Mvfr, WeatherIcon::Haze);
    }
    if let Some(estimate) = by_visibility(&tokens) {
        return estimate;
    }

    let layers: Vec<(LayerCover, u32)> = tokens
        .iter()
        .filter_map(|token| {
            all_consuming(nom_sky_layer)
                .parse(token.trim_end_matches("CB").trim_end_matches("TCU"))
                .finish()
                .ok()
                .map(|(_, layer)| layer)
        })
        .collect();
    if let Some(estimate) = by_ceiling(&layers) {
        return estimate;
    }
    if layers
        .iter()
        .any(|(cover, _)| matches!(cover, LayerCover::Few | LayerCover::Scattered))
    {
        return SegmentEstimate::new(FlightCategory::Vfr, WeatherIcon::PartlyCloudy);
    }
    if tokens.iter().any(|token| CLEAR_SKY.contains(&token.as_str())) {
        return SegmentEstimate::new(FlightCategory::Vfr, WeatherIcon::Clear);
    }
    SegmentEstimate::UNKNOWN
}

fn by_visibility(tokens: &[String]) -> Option<SegmentEstimate> {
    let lowest = tokens
        .iter()
        .filter_map(|token| visibility_statute_miles(token))
        .min_by(f64::total_cmp)?;
    let category = match lowest {
        v if v < 1.0 => FlightCategory::Lifr,
        v if v < 3.0 => FlightCategory::Ifr,
        v if v <= 5.0 => FlightCategory::Mvfr,
        _ => return None,
    };
    Some(SegmentEstimate::new(category, WeatherIcon::ReducedVisibility))
}

fn by_ceiling(layers: &[(LayerCover, u32)]) -> Option<SegmentEstimate> {
    let (cover, height) = layers
        .iter()
        .filter(|(cover, _)| cover.is_ceiling())
        .min_by_key(|(_, height)| *height)?;
    let icon = match cover {
        LayerCover::VerticalVisibility => WeatherIcon::Fog,
        LayerCover::Overcast => WeatherIcon::Overcast,
        _ => WeatherIcon::Cloudy,
    };
    let category = match height {
        h if *h < 500 => FlightCategory::Lifr,
        h if *h < 1000 => FlightCategory::Ifr,
        h if *h < 3000 => FlightCategory::Mvfr,
        _ if *cover == LayerCover::Broken => FlightCategory::Vfr,
        _ => FlightCategory::Mvfr,
    };
    Some(SegmentEstimate::new(category, icon))
}
