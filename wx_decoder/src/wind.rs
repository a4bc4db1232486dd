use std::fmt;

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

/// A surface or forecast wind. `direction_deg` is `None` when the wind is variable or missing.
#[skip_serializing_none]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindObservation {
    pub direction_deg: Option<u16>,
    pub speed_kt: u16,
    pub gust_kt: Option<u16>,
}

impl WindObservation {
    pub const fn new(direction_deg: Option<u16>, speed_kt: u16, gust_kt: Option<u16>) -> Self {
        Self {
            direction_deg,
            speed_kt,
            gust_kt,
        }
    }

    pub const fn calm() -> Self {
        Self::new(Some(0), 0, None)
    }

    pub fn is_calm(&self) -> bool {
        self.speed_kt == 0 && self.gust_kt.unwrap_or(0) == 0
    }
}

impl fmt::Display for WindObservation {
    /// `270@12G18kt`, `VRB 5kt` or `Calm`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_calm() {
            return write!(f, "Calm");
        }
        match self.direction_deg {
            Some(dir) => write!(f, "{dir:03}@{}", self.speed_kt)?,
            None => write!(f, "VRB {}", self.speed_kt)?,
        }
        if let Some(gust) = self.gust_kt {
            write!(f, "G{gust}")?;
        }
        write!(f, "kt")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrosswindSide {
    Left,
    Right,
    None,
}

/// Runway relative wind. Positive headwind blows from ahead, positive crosswind from the right.
#[skip_serializing_none]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindComponents {
    pub headwind_kt: i32,
    pub crosswind_kt: i32,
    pub gust_crosswind_kt: Option<i32>,
}

impl WindComponents {
    /// Resolves a full observation, the gust contributes only its crosswind.
    pub fn for_runway(wind: &WindObservation, runway_heading_deg: u16) -> Self {
        let sustained = resolve(wind.direction_deg, wind.speed_kt, runway_heading_deg);
        let gust_crosswind_kt = wind
            .gust_kt
            .map(|gust| resolve(wind.direction_deg, gust, runway_heading_deg).crosswind_kt);
        Self {
            gust_crosswind_kt,
            ..sustained
        }
    }

    pub fn max_crosswind_kt(&self) -> u32 {
        self.crosswind_kt
            .unsigned_abs()
            .max(self.gust_crosswind_kt.map_or(0, i32::unsigned_abs))
    }

    pub fn crosswind_side(&self) -> CrosswindSide {
        match self.crosswind_kt {
            0 => CrosswindSide::None,
            c if c > 0 => CrosswindSide::Right,
            _ => CrosswindSide::Left,
        }
    }

    pub fn is_tailwind(&self) -> bool {
        self.headwind_kt < 0
    }

    pub fn favorability(&self) -> RunwayFavorability {
        RunwayFavorability::from_crosswind(self.max_crosswind_kt())
    }
}

/// Splits a wind into headwind and crosswind against a runway heading.
///
/// A missing direction yields zero for both components.
pub fn resolve(wind_dir_deg: Option<u16>, wind_speed_kt: u16, runway_heading_deg: u16) -> WindComponents {
    let Some(wind_dir) = wind_dir_deg else {
        return WindComponents {
            headwind_kt: 0,
            crosswind_kt: 0,
            gust_crosswind_kt: None,
        };
    };
    let delta = signed_angle_deg(wind_dir, runway_heading_deg).to_radians();
    let speed = f64::from(wind_speed_kt);
    WindComponents {
        headwind_kt: (speed * delta.cos()).round() as i32,
        crosswind_kt: (speed * delta.sin()).round() as i32,
        gust_crosswind_kt: None,
    }
}

/// Angle from `reference` to `angle` in degrees, normalised to (-180, 180].
pub fn signed_angle_deg(angle: u16, reference: u16) -> f64 {
    let diff = (i32::from(angle) - i32::from(reference)).rem_euclid(360);
    f64::from(if diff > 180 { diff - 360 } else { diff })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RunwayFavorability {
    Excellent,
    Good,
    Moderate,
    Challenging,
    Exceeds,
}

impl RunwayFavorability {
    /// Inclusive upper crosswind bound for each tier, `Exceeds` has none.
    const THRESHOLDS: [(u32, RunwayFavorability); 4] = [
        (5, RunwayFavorability::Excellent),
        (10, RunwayFavorability::Good),
        (15, RunwayFavorability::Moderate),
        (25, RunwayFavorability::Challenging),
    ];

    pub fn from_crosswind(max_abs_crosswind_kt: u32) -> Self {
        Self::THRESHOLDS
            .iter()
            .find(|(limit, _)| max_abs_crosswind_kt <= *limit)
            .map_or(RunwayFavorability::Exceeds, |(_, tier)| *tier)
    }

    pub const fn label(&self) -> &'static str {
        match self {
            RunwayFavorability::Excellent => "Excellent",
            RunwayFavorability::Good => "Good",
            RunwayFavorability::Moderate => "Moderate",
            RunwayFavorability::Challenging => "Challenging",
            RunwayFavorability::Exceeds => "Exceeds limits",
        }
    }
}

impl fmt::Display for RunwayFavorability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
