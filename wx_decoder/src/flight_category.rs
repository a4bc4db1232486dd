use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Ordered worst to best, so `min` picks the most restrictive category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FlightCategory {
    Lifr,
    Ifr,
    Mvfr,
    Vfr,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown flight category: {0}")]
pub struct UnknownFlightCategory(pub String);

impl FlightCategory {
    /// Ceiling in feet AGL, visibility in statute miles. A missing value never restricts.
    pub fn from_ceiling_and_visibility(ceiling_ft: Option<u32>, visibility_sm: Option<f64>) -> Self {
        let by_ceiling = match ceiling_ft {
            Some(c) if c < 500 => FlightCategory::Lifr,
            Some(c) if c < 1000 => FlightCategory::Ifr,
            Some(c) if c <= 3000 => FlightCategory::Mvfr,
            _ => FlightCategory::Vfr,
        };
        let by_visibility = match visibility_sm {
            Some(v) if v < 1.0 => FlightCategory::Lifr,
            Some(v) if v < 3.0 => FlightCategory::Ifr,
            Some(v) if v <= 5.0 => FlightCategory::Mvfr,
            _ => FlightCategory::Vfr,
        };
        by_ceiling.min(by_visibility)
    }

    /// The most restrictive of all given categories.
    pub fn worst<I: IntoIterator<Item = FlightCategory>>(categories: I) -> Option<Self> {
        categories.into_iter().min()
    }

    pub const fn code(&self) -> &'static str {
        match self {
            FlightCategory::Lifr => "LIFR",
            FlightCategory::Ifr => "IFR",
            FlightCategory::Mvfr => "MVFR",
            FlightCategory::Vfr => "VFR",
        }
    }
}

impl fmt::Display for FlightCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for FlightCategory {
    type Err = UnknownFlightCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LIFR" => Ok(FlightCategory::Lifr),
            "IFR" => Ok(FlightCategory::Ifr),
            "MVFR" => Ok(FlightCategory::Mvfr),
            "VFR" => Ok(FlightCategory::Vfr),
            _ => Err(UnknownFlightCategory(s.to_string())),
        }
    }
}
