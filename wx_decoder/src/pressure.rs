use nom::{
    IResult, Parser,
    bytes::complete::take,
    character::complete::{self, u32},
    combinator::{all_consuming, map_parser, value},
};
use serde::{Deserialize, Serialize};

pub const HPA_PER_IN_HG: f64 = 33.8639;
pub const STANDARD_ALTIMETER_IN_HG: f64 = 29.92;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PressureUnit {
    Hectopascals,
    InchesOfMercury,
}

impl PressureUnit {
    const fn pressure_letter(&self) -> char {
        match self {
            PressureUnit::Hectopascals => 'Q',
            PressureUnit::InchesOfMercury => 'A',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pressure {
    pub value: f64,
    pub unit: PressureUnit,
}

impl Pressure {
    /// Upstream altimeter fields come in either unit, anything above 100 is taken as hectopascals.
    pub fn from_altimeter(raw: f64) -> Self {
        if raw > 100.0 {
            Self {
                value: raw,
                unit: PressureUnit::Hectopascals,
            }
        } else {
            Self {
                value: raw,
                unit: PressureUnit::InchesOfMercury,
            }
        }
    }

    pub fn in_hg(&self) -> f64 {
        match self.unit {
            PressureUnit::Hectopascals => self.value / HPA_PER_IN_HG,
            PressureUnit::InchesOfMercury => self.value,
        }
    }

    pub fn hpa(&self) -> f64 {
        match self.unit {
            PressureUnit::Hectopascals => self.value,
            PressureUnit::InchesOfMercury => self.value * HPA_PER_IN_HG,
        }
    }
}

/// `(29.92 - altimeter) * 1000 + elevation`.
pub fn pressure_altitude_ft(altimeter: Pressure, field_elevation_ft: f64) -> f64 {
    (STANDARD_ALTIMETER_IN_HG - altimeter.in_hg()) * 1000.0 + field_elevation_ft
}

/// Density altitude from pressure altitude and the deviation from ISA temperature.
pub fn density_altitude_ft(altimeter: Pressure, field_elevation_ft: f64, temperature_c: f64) -> f64 {
    let isa_temperature_c = 15.0 - field_elevation_ft / 1000.0 * 2.0;
    pressure_altitude_ft(altimeter, field_elevation_ft) + 120.0 * (temperature_c - isa_temperature_c)
}

/// Parses a raw METAR pressure group such as `Q1013` or `A2992`.
pub(crate) fn nom_pressure(input: &str) -> IResult<&str, Pressure> {
    let hectopascals = move |i| nom_pressure_single(i, PressureUnit::Hectopascals);
    let inches_of_mercury = move |i| nom_pressure_single(i, PressureUnit::InchesOfMercury);
    nom::branch::alt((hectopascals, inches_of_mercury)).parse(input)
}

fn nom_pressure_single(input: &str, pressure_unit: PressureUnit) -> IResult<&str, Pressure> {
    (
        nom_pressure_unit(pressure_unit),
        map_parser(take(4usize), all_consuming(u32)),
    )
        .map(|(unit, raw)| Pressure {
            value: match unit {
                PressureUnit::Hectopascals => f64::from(raw),
                PressureUnit::InchesOfMercury => f64::from(raw) / 100.0,
            },
            unit,
        })
        .parse(input)
}

fn nom_pressure_unit<'a>(
    pressure_unit: PressureUnit,
) -> impl Parser<&'a str, Output = PressureUnit, Error = nom::error::Error<&'a str>> {
    value(
        pressure_unit,
        complete::char(pressure_unit.pressure_letter()),
    )
}
