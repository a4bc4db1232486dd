use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::{flight_category::FlightCategory, units::fahrenheit_to_celsius, wind::WindObservation};

/// One forecast hour of model output statistics for a station.
///
/// Field names follow the MOS bulletin columns. Temperatures are in Fahrenheit,
/// `wdr` is in tens of degrees, `cig` and `vis` are category codes.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MosForecastHour {
    pub station: String,
    pub valid_time: Timestamp,
    #[serde(default)]
    pub tmp: Option<i32>,
    #[serde(default)]
    pub dpt: Option<i32>,
    #[serde(default)]
    pub cld: Option<MosSkyCover>,
    #[serde(default)]
    pub wdr: Option<u16>,
    #[serde(default)]
    pub wsp: Option<u16>,
    #[serde(default)]
    pub gst: Option<u16>,
    #[serde(default)]
    pub p06: Option<u8>,
    #[serde(default)]
    pub t06: Option<u8>,
    #[serde(default)]
    pub cig: Option<u8>,
    #[serde(default)]
    pub vis: Option<u8>,
    #[serde(default)]
    pub obv: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MosSkyCover {
    #[serde(rename = "CL")]
    Clear,
    #[serde(rename = "FW")]
    Few,
    #[serde(rename = "SC")]
    Scattered,
    #[serde(rename = "BK")]
    Broken,
    #[serde(rename = "OV")]
    Overcast,
}

impl MosSkyCover {
    pub const fn label(&self) -> &'static str {
        match self {
            MosSkyCover::Clear => "Clear",
            MosSkyCover::Few => "Few",
            MosSkyCover::Scattered => "Scattered",
            MosSkyCover::Broken => "Broken",
            MosSkyCover::Overcast => "Overcast",
        }
    }
}

impl MosForecastHour {
    pub fn wind(&self) -> Option<WindObservation> {
        let speed_kt = self.wsp?;
        Some(WindObservation::new(
            self.wdr.map(|tens| tens % 36 * 10),
            speed_kt,
            self.gst,
        ))
    }

    pub fn temperature_c(&self) -> Option<f64> {
        self.tmp.map(|f| fahrenheit_to_celsius(f64::from(f)))
    }

    pub fn dewpoint_c(&self) -> Option<f64> {
        self.dpt.map(|f| fahrenheit_to_celsius(f64::from(f)))
    }

    /// Category from the ceiling and visibility codes, `None` when both are missing.
    ///
    /// Ceiling codes: 1 <200 ft, 2 200-400, 3 500-900, 4 1000-1900, 5 2000-3000, 6+ above.
    /// Visibility codes: 1 <1/2 SM, 2 1/2-<1, 3 1-<2, 4 2-<3, 5 3-5, 6+ above.
    pub fn flight_category(&self) -> Option<FlightCategory> {
        let by_ceiling = self.cig.map(|code| match code {
            0..=2 => FlightCategory::Lifr,
            3 => FlightCategory::Ifr,
            4 | 5 => FlightCategory::Mvfr,
            _ => FlightCategory::Vfr,
        });
        let by_visibility = self.vis.map(|code| match code {
            0..=2 => FlightCategory::Lifr,
            3 | 4 => FlightCategory::Ifr,
            5 => FlightCategory::Mvfr,
            _ => FlightCategory::Vfr,
        });
        FlightCategory::worst(by_ceiling.into_iter().chain(by_visibility))
    }

    pub fn obstruction_label(&self) -> Option<&'static str> {
        match self.obv.as_deref()? {
            "HZ" => Some("Haze"),
            "BR" => Some("Mist"),
            "FG" => Some("Fog"),
            "BL" => Some("Blowing"),
            _ => None,
        }
    }
}

/// Hours for one station in valid time order.
pub fn hours_for_station<'a>(hours: &'a [MosForecastHour], station: &str) -> Vec<&'a MosForecastHour> {
    let mut selected = hours
        .iter()
        .filter(|hour| hour.station.eq_ignore_ascii_case(station))
        .collect::<Vec<_>>();
    selected.sort_by_key(|hour| hour.valid_time);
    selected
}
