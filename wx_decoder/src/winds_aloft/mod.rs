//! Winds and temperatures aloft bulletins.
//!
//! A bulletin holds one row per reporting station with one cell per altitude of
//! [`ALTITUDE_LADDER_FT`]. Only a few hundred stations report, so an airport without its
//! own row gets the row of the nearest network station, tagged with that station's code.

mod level;
mod network;

use itertools::Itertools;
use tracing::{debug, trace};

pub use level::{ALTITUDE_LADDER_FT, LIGHT_AND_VARIABLE_DEG, WindsAloftLevel, decode_level};
pub use network::{STATIONS, StationRef, find_station, nearest_station};

use crate::airport::AirportLookup;

/// How the station code was found in a bulletin row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowMatch {
    /// A whitespace separated token equals the code.
    Column,
    /// The code is only part of a longer token.
    Substring,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationRow<'a> {
    pub row_match: RowMatch,
    pub station_token: &'a str,
    /// Cells after the station token, in altitude order.
    pub cells: Vec<&'a str>,
}

/// `KATL` becomes `ATL`, other identifiers are only upper cased.
pub fn station_code(ident: &str) -> String {
    let ident = ident.trim().to_ascii_uppercase();
    match ident.strip_prefix('K') {
        Some(code) if ident.len() == 4 => code.to_string(),
        _ => ident,
    }
}

/// First bulletin line containing `code`, case insensitive.
///
/// The station column is not fixed width between sources, so any token containing the
/// code is accepted. [`RowMatch`] tells an exact column match from a looser one.
pub fn find_station_row<'a>(bulletin: &'a str, code: &str) -> Option<StationRow<'a>> {
    let code = code.to_ascii_uppercase();
    if code.is_empty() {
        return None;
    }
    bulletin.lines().find_map(|line| {
        let tokens = line.split_whitespace().collect_vec();
        let position = tokens
            .iter()
            .position(|token| token.to_ascii_uppercase().contains(&code))?;
        let station_token = tokens[position];
        let row_match = if station_token.eq_ignore_ascii_case(&code) {
            RowMatch::Column
        } else {
            RowMatch::Substring
        };
        Some(StationRow {
            row_match,
            station_token,
            cells: tokens[position + 1..].to_vec(),
        })
    })
}

/// Decodes every cell of a row onto the altitude ladder, skipping cells that do not decode.
pub fn decode_row(row: &StationRow, source_station: Option<&str>) -> Vec<WindsAloftLevel> {
    row.cells
        .iter()
        .zip(ALTITUDE_LADDER_FT)
        .filter_map(|(cell, altitude_ft)| {
            let level = decode_level(cell, altitude_ft, source_station);
            if level.is_none() {
                trace!(cell, altitude_ft, "Skipping undecodable winds aloft cell");
            }
            level
        })
        .collect()
}

pub struct WindsAloftDecoder<'n> {
    network: &'n [StationRef],
}

impl Default for WindsAloftDecoder<'static> {
    fn default() -> Self {
        Self::new(&STATIONS)
    }
}

impl<'n> WindsAloftDecoder<'n> {
    pub fn new(network: &'n [StationRef]) -> Self {
        Self { network }
    }

    /// Levels for `requested`, falling back to the nearest network station when the
    /// bulletin has no row for it. An empty result means no data, not an error.
    #[tracing::instrument(skip(self, bulletin, airports))]
    pub fn decode<A: AirportLookup + ?Sized>(
        &self,
        bulletin: &str,
        requested: &str,
        airports: &A,
    ) -> Vec<WindsAloftLevel> {
        let code = station_code(requested);
        if let Some(row) = find_station_row(bulletin, &code) {
            debug!(station = code, row_match = ?row.row_match, "Found winds aloft row");
            return decode_row(&row, None);
        }

        let Some(coordinate) = airports.coordinate(requested) else {
            debug!(station = code, "Not in bulletin and no coordinate for fallback");
            return Vec::new();
        };
        let Some((fallback, distance_nm)) = nearest_station(self.network, &coordinate) else {
            return Vec::new();
        };
        debug!(
            station = code,
            fallback = fallback.code,
            distance_nm,
            "Not in bulletin, using nearest reporting station"
        );
        find_station_row(bulletin, fallback.code)
            .map(|row| decode_row(&row, Some(fallback.code)))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use tracing_test::traced_test;

    use super::*;
    use crate::{airport::AirportTable, airport::AirportRecord, geo::Coordinate};

    const BULLETIN: &str = "\
(Extracted from FBUS31 KWNO 011358)
FD1US1
DATA BASED ON 011200Z
VALID 011800Z   FOR USE 1400-2100Z. TEMPS NEG ABV 24000

FT  3000    6000    9000   12000   18000   24000  30000  34000  39000
ATL 2714 2620+14 2525+08 2432+02 2445-11 2458-23 246038 256547 256956
BNA 3011 2915+12 2822+06 XXXX 2748-13 2762-25 277440 277948 278457
DEN              2810-01 2618-06 2531-18 2542-30 245745 246553 247161
";

    fn airports() -> AirportTable {
        [
            AirportRecord {
                ident: "KPDK".to_string(),
                coordinate: Coordinate::new(33.8756, -84.3020),
                elevation_ft: Some(1003.0),
                runways: Vec::new(),
            },
            AirportRecord {
                ident: "KMQY".to_string(),
                coordinate: Coordinate::new(36.0090, -86.5201),
                elevation_ft: None,
                runways: Vec::new(),
            },
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_station_code() {
        assert_eq!(station_code("KATL"), "ATL");
        assert_eq!(station_code("katl"), "ATL");
        assert_eq!(station_code("ATL"), "ATL");
        assert_eq!(station_code("PANC"), "PANC");
        assert_eq!(station_code("K1"), "K1");
    }

    #[test]
    fn test_direct_station() {
        let levels = WindsAloftDecoder::default().decode(BULLETIN, "KATL", &airports());
        assert_eq!(levels.len(), 9);
        assert_eq!(levels[0].altitude_ft, 3000);
        assert_eq!(levels[0].direction_deg, Some(270));
        assert_eq!(levels[0].speed_kt, Some(14));
        assert_eq!(levels[0].temperature_c, None);
        assert_eq!(levels[1].temperature_c, Some(14));
        assert_eq!(levels[6].altitude_ft, 30000);
        assert_eq!(levels[6].temperature_c, Some(-38));
        assert!(levels.iter().all(|l| l.source_station_code.is_none()));
    }

    #[test]
    fn test_bad_cell_is_skipped() {
        let levels = WindsAloftDecoder::default().decode(BULLETIN, "BNA", &airports());
        assert_eq!(levels.len(), 8);
        assert!(levels.iter().all(|l| l.altitude_ft != 12000));
    }

    #[test]
    fn test_cells_map_positionally() {
        // DEN has no low level cells, its first cell lands on 3000 ft
        let levels = WindsAloftDecoder::default().decode(BULLETIN, "KDEN", &airports());
        assert_eq!(levels.len(), 7);
        assert_eq!(levels[0].altitude_ft, 3000);
        assert_eq!(levels[0].direction_deg, Some(280));
    }

    #[traced_test]
    #[test]
    fn test_fallback_to_nearest_station() {
        let levels = WindsAloftDecoder::default().decode(BULLETIN, "KPDK", &airports());
        assert_eq!(levels.len(), 9);
        assert!(
            levels
                .iter()
                .all(|l| l.source_station_code.as_deref() == Some("ATL"))
        );
        assert!(logs_contain("using nearest reporting station"));

        let nashville = WindsAloftDecoder::default().decode(BULLETIN, "KMQY", &airports());
        assert_eq!(nashville[0].source_station_code.as_deref(), Some("BNA"));
    }

    #[test]
    fn test_unknown_airport_gives_nothing() {
        let levels = WindsAloftDecoder::default().decode(BULLETIN, "KXYZ", &airports());
        assert!(levels.is_empty());
    }

    #[test]
    fn test_fallback_station_missing_from_bulletin() {
        let only_den = "DEN              2810-01 2618-06";
        let levels = WindsAloftDecoder::default().decode(only_den, "KPDK", &airports());
        assert!(levels.is_empty());
    }

    #[test]
    fn test_custom_network() {
        let network = [StationRef {
            code: "BNA",
            coordinate: Coordinate::new(36.14, -86.68),
        }];
        let levels = WindsAloftDecoder::new(&network).decode(BULLETIN, "KPDK", &airports());
        assert_eq!(levels[0].source_station_code.as_deref(), Some("BNA"));
    }

    #[test]
    fn test_row_match_kind() {
        let exact = find_station_row(BULLETIN, "atl").unwrap();
        assert_eq!(exact.row_match, RowMatch::Column);
        assert_eq!(exact.cells.len(), 9);

        let loose = find_station_row("XABIX 2714 2620+14", "ABI").unwrap();
        assert_eq!(loose.row_match, RowMatch::Substring);
        assert_eq!(loose.station_token, "XABIX");
        assert_eq!(loose.cells, ["2714", "2620+14"]);

        assert!(find_station_row(BULLETIN, "").is_none());
    }

    #[test]
    fn test_decoding_is_repeatable() {
        let decoder = WindsAloftDecoder::default();
        assert_eq!(
            decoder.decode(BULLETIN, "KPDK", &airports()),
            decoder.decode(BULLETIN, "KPDK", &airports())
        );
    }
}
