use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{geo::Coordinate, runway::RunwaySpec};

/// Read-only view of the airport reference database.
pub trait AirportLookup {
    fn coordinate(&self, ident: &str) -> Option<Coordinate>;

    fn runways(&self, ident: &str) -> &[RunwaySpec];

    fn elevation_ft(&self, _ident: &str) -> Option<f64> {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirportRecord {
    pub ident: String,
    #[serde(flatten)]
    pub coordinate: Coordinate,
    #[serde(default)]
    pub elevation_ft: Option<f64>,
    #[serde(default, rename = "runway")]
    pub runways: Vec<RunwaySpec>,
}

/// Airports keyed by identifier, in load order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "AirportFile", into = "AirportFile")]
pub struct AirportTable {
    pub airports: IndexMap<String, AirportRecord>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct AirportFile {
    #[serde(default)]
    airport: Vec<AirportRecord>,
}

impl From<AirportFile> for AirportTable {
    fn from(file: AirportFile) -> Self {
        file.airport.into_iter().collect()
    }
}

impl From<AirportTable> for AirportFile {
    fn from(table: AirportTable) -> Self {
        Self {
            airport: table.airports.into_values().collect(),
        }
    }
}

impl FromIterator<AirportRecord> for AirportTable {
    fn from_iter<T: IntoIterator<Item = AirportRecord>>(iter: T) -> Self {
        Self {
            airports: iter
                .into_iter()
                .map(|airport| (airport.ident.to_ascii_uppercase(), airport))
                .collect(),
        }
    }
}

impl AirportTable {
    pub fn get(&self, ident: &str) -> Option<&AirportRecord> {
        self.airports.get(ident.to_ascii_uppercase().as_str())
    }

    pub fn len(&self) -> usize {
        self.airports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.airports.is_empty()
    }
}

impl AirportLookup for AirportTable {
    fn coordinate(&self, ident: &str) -> Option<Coordinate> {
        self.get(ident).map(|a| a.coordinate)
    }

    fn runways(&self, ident: &str) -> &[RunwaySpec] {
        self.get(ident).map_or(&[], |a| a.runways.as_slice())
    }

    fn elevation_ft(&self, ident: &str) -> Option<f64> {
        self.get(ident).and_then(|a| a.elevation_ft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AIRPORTS: &str = r#"
[[airport]]
ident = "KATL"
latitude = 33.6367
longitude = -84.4281
elevation_ft = 1026.0

[[airport.runway]]
identifier = "08L"
heading_deg_true = 90
length_ft = 9000
width_ft = 150
surface = "CON"

[[airport.runway]]
identifier = "26R"
heading_deg_true = 270

[[airport]]
ident = "kjfk"
latitude = 40.6398
longitude = -73.7789
"#;

    #[test]
    fn test_load_from_toml() {
        let table: AirportTable = toml::from_str(AIRPORTS).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.runways("katl").len(), 2);
        assert_eq!(table.runways("KATL")[0].length_ft, 9000);
        assert_eq!(table.runways("KATL")[1].surface, "");
        assert_eq!(table.elevation_ft("KATL"), Some(1026.0));
        assert_eq!(
            table.coordinate("KJFK"),
            Some(Coordinate::new(40.6398, -73.7789))
        );
        assert!(table.runways("KJFK").is_empty());
    }

    #[test]
    fn test_unknown_airport() {
        let table = AirportTable::default();
        assert!(table.coordinate("KXYZ").is_none());
        assert!(table.runways("KXYZ").is_empty());
        assert!(table.elevation_ft("KXYZ").is_none());
    }
}
