use std::str::FromStr;

use jiff::Timestamp;
use nom::{Finish, Parser, combinator::all_consuming};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use thiserror::Error;
use tracing::trace;

use crate::{
    flight_category::FlightCategory,
    pressure::{Pressure, density_altitude_ft, nom_pressure},
    units::{FEET_PER_METER, celsius_to_fahrenheit},
    wind::WindObservation,
};

/// A single observation as delivered by the upstream JSON decode.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetarObservation {
    pub icao_id: String,
    #[serde(default, with = "jiff::fmt::serde::timestamp::second::optional")]
    pub obs_time: Option<Timestamp>,
    #[serde(default)]
    pub temp: Option<f64>,
    #[serde(default)]
    pub dewp: Option<f64>,
    #[serde(default)]
    pub wdir: Option<WindDirectionField>,
    #[serde(default)]
    pub wspd: Option<u16>,
    #[serde(default)]
    pub wgst: Option<u16>,
    #[serde(default)]
    pub visib: Option<VisibilityField>,
    #[serde(default)]
    pub altim: Option<f64>,
    /// Field elevation in meters.
    #[serde(default)]
    pub elev: Option<f64>,
    #[serde(default)]
    pub flt_cat: Option<String>,
    #[serde(default)]
    pub raw_ob: Option<String>,
    #[serde(default)]
    pub clouds: Vec<CloudLayer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WindDirectionField {
    Degrees(u16),
    Variable(String),
}

/// Statute miles, either numeric or text such as `10+`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VisibilityField {
    Miles(f64),
    Text(String),
}

impl VisibilityField {
    pub fn statute_miles(&self) -> Option<f64> {
        match self {
            VisibilityField::Miles(miles) => Some(*miles),
            VisibilityField::Text(text) => text.trim().trim_end_matches('+').parse().ok(),
        }
    }
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudLayer {
    pub cover: CloudCover,
    #[serde(default)]
    pub base: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CloudCover {
    SkyClear,
    Clear,
    Few,
    Scattered,
    Broken,
    Overcast,
    /// Sky obscured, reported as vertical visibility.
    Obscured,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown cloud cover: {0}")]
pub struct UnknownCloudCover(pub String);

impl CloudCover {
    pub const fn code(&self) -> &'static str {
        match self {
            CloudCover::SkyClear => "SKC",
            CloudCover::Clear => "CLR",
            CloudCover::Few => "FEW",
            CloudCover::Scattered => "SCT",
            CloudCover::Broken => "BKN",
            CloudCover::Overcast => "OVC",
            CloudCover::Obscured => "OVX",
        }
    }

    pub const fn is_ceiling(&self) -> bool {
        matches!(
            self,
            CloudCover::Broken | CloudCover::Overcast | CloudCover::Obscured
        )
    }
}

impl FromStr for CloudCover {
    type Err = UnknownCloudCover;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SKC" | "NSC" | "NCD" => Ok(CloudCover::SkyClear),
            "CLR" | "CAVOK" => Ok(CloudCover::Clear),
            "FEW" => Ok(CloudCover::Few),
            "SCT" => Ok(CloudCover::Scattered),
            "BKN" => Ok(CloudCover::Broken),
            "OVC" => Ok(CloudCover::Overcast),
            "OVX" | "VV" => Ok(CloudCover::Obscured),
            _ => Err(UnknownCloudCover(s.to_string())),
        }
    }
}

impl TryFrom<String> for CloudCover {
    type Error = UnknownCloudCover;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CloudCover> for String {
    fn from(value: CloudCover) -> Self {
        value.code().to_string()
    }
}

impl MetarObservation {
    pub fn wind(&self) -> Option<WindObservation> {
        let speed_kt = self.wspd?;
        let direction_deg = match &self.wdir {
            Some(WindDirectionField::Degrees(deg)) => Some(*deg),
            Some(WindDirectionField::Variable(_)) | None => None,
        };
        Some(WindObservation::new(direction_deg, speed_kt, self.wgst))
    }

    /// `270@12G18kt`, `VRB 5kt`, `Calm`, or `Missing` without a speed.
    pub fn wind_text(&self) -> String {
        self.wind()
            .map_or_else(|| "Missing".to_string(), |wind| wind.to_string())
    }

    /// Altimeter from the structured field, falling back to the pressure group of the raw text.
    pub fn altimeter(&self) -> Option<Pressure> {
        if let Some(raw) = self.altim {
            return Some(Pressure::from_altimeter(raw));
        }
        let raw_ob = self.raw_ob.as_deref()?;
        let pressure = raw_ob
            .split_whitespace()
            .find_map(|token| all_consuming(nom_pressure).parse(token).finish().ok())
            .map(|(_, pressure)| pressure);
        trace!(icao = self.icao_id, ?pressure, "Altimeter taken from raw observation");
        pressure
    }

    pub fn altimeter_in_hg(&self) -> Option<f64> {
        self.altimeter().map(|p| p.in_hg())
    }

    pub fn altimeter_hpa(&self) -> Option<f64> {
        self.altimeter().map(|p| p.hpa())
    }

    pub fn temperature_f(&self) -> Option<f64> {
        self.temp.map(celsius_to_fahrenheit)
    }

    pub fn dewpoint_f(&self) -> Option<f64> {
        self.dewp.map(celsius_to_fahrenheit)
    }

    pub fn temperature_spread_c(&self) -> Option<f64> {
        Some(self.temp? - self.dewp?)
    }

    pub fn elevation_ft(&self) -> Option<f64> {
        self.elev.map(|m| m * FEET_PER_METER)
    }

    pub fn visibility_sm(&self) -> Option<f64> {
        self.visib.as_ref().and_then(VisibilityField::statute_miles)
    }

    /// Lowest broken, overcast or obscured layer.
    pub fn ceiling_ft(&self) -> Option<u32> {
        self.clouds
            .iter()
            .filter(|layer| layer.cover.is_ceiling())
            .filter_map(|layer| layer.base)
            .min()
    }

    /// The upstream category when present and valid, otherwise computed from ceiling and visibility.
    pub fn flight_category(&self) -> FlightCategory {
        self.flt_cat
            .as_deref()
            .and_then(|cat| cat.parse().ok())
            .unwrap_or_else(|| {
                FlightCategory::from_ceiling_and_visibility(self.ceiling_ft(), self.visibility_sm())
            })
    }

    pub fn density_altitude_ft(&self) -> Option<f64> {
        Some(density_altitude_ft(
            self.altimeter()?,
            self.elevation_ft()?,
            self.temp?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KATL: &str = r#"{
        "icaoId": "KATL",
        "obsTime": 1727787600,
        "temp": 22.2,
        "dewp": 17.8,
        "wdir": 270,
        "wspd": 12,
        "wgst": 18,
        "visib": "10+",
        "altim": 1015.2,
        "elev": 308,
        "fltCat": "VFR",
        "rawOb": "KATL 011300Z 27012G18KT 10SM FEW025 BKN250 22/18 A2998",
        "clouds": [{"cover": "FEW", "base": 2500}, {"cover": "BKN", "base": 25000}]
    }"#;

    fn katl() -> MetarObservation {
        serde_json::from_str(KATL).unwrap()
    }

    #[test]
    fn test_decode_upstream_json() {
        let metar = katl();
        assert_eq!(metar.icao_id, "KATL");
        assert_eq!(metar.obs_time, Some(Timestamp::from_second(1727787600).unwrap()));
        assert_eq!(metar.visibility_sm(), Some(10.0));
        assert_eq!(metar.ceiling_ft(), Some(25000));
        assert_eq!(metar.flight_category(), FlightCategory::Vfr);
    }

    #[test]
    fn test_wind_text() {
        let mut metar = katl();
        assert_eq!(metar.wind_text(), "270@12G18kt");
        metar.wdir = Some(WindDirectionField::Variable("VRB".to_string()));
        metar.wspd = Some(5);
        metar.wgst = None;
        assert_eq!(metar.wind_text(), "VRB 5kt");
        metar.wdir = Some(WindDirectionField::Degrees(0));
        metar.wspd = Some(0);
        assert_eq!(metar.wind_text(), "Calm");
        metar.wspd = None;
        assert_eq!(metar.wind_text(), "Missing");
    }

    #[test]
    fn test_variable_direction_from_json() {
        let metar: MetarObservation =
            serde_json::from_str(r#"{"icaoId": "KPDK", "wdir": "VRB", "wspd": 3}"#).unwrap();
        assert_eq!(metar.wind(), Some(WindObservation::new(None, 3, None)));
        assert!(metar.clouds.is_empty());
    }

    #[test]
    fn test_hectopascal_altimeter_is_converted() {
        let metar = katl();
        let in_hg = metar.altimeter_in_hg().unwrap();
        assert!((in_hg - 29.979).abs() < 0.001, "got {in_hg}");
        assert_eq!(metar.altimeter_hpa(), Some(1015.2));
    }

    #[test]
    fn test_altimeter_from_raw_text() {
        let mut metar = katl();
        metar.altim = None;
        assert_eq!(metar.altimeter_in_hg(), Some(29.98));
        metar.raw_ob = None;
        assert_eq!(metar.altimeter(), None);
    }

    #[test]
    fn test_density_altitude() {
        let metar = katl();
        let elevation = 308.0 * FEET_PER_METER;
        let isa = 15.0 - elevation / 1000.0 * 2.0;
        let expected = (29.92 - 1015.2 / 33.8639) * 1000.0 + elevation + 120.0 * (22.2 - isa);
        let da = metar.density_altitude_ft().unwrap();
        assert!((da - expected).abs() < 1e-6, "got {da}, expected {expected}");

        let mut no_elevation = katl();
        no_elevation.elev = None;
        assert_eq!(no_elevation.density_altitude_ft(), None);
    }

    #[test]
    fn test_category_computed_without_upstream_value() {
        let mut metar = katl();
        metar.flt_cat = None;
        metar.clouds = vec![CloudLayer {
            cover: CloudCover::Overcast,
            base: Some(800),
        }];
        assert_eq!(metar.flight_category(), FlightCategory::Ifr);
    }

    #[test]
    fn test_unknown_cloud_cover_is_rejected() {
        let result = serde_json::from_str::<CloudLayer>(r#"{"cover": "XXX", "base": 100}"#);
        assert!(result.is_err());
        assert_eq!("OVX".parse(), Ok(CloudCover::Obscured));
    }

    #[test]
    fn test_temperatures() {
        let metar = katl();
        assert!((metar.temperature_f().unwrap() - 71.96).abs() < 1e-9);
        assert!((metar.temperature_spread_c().unwrap() - 4.4).abs() < 1e-9);
    }
}
