use serde::Serialize;

use crate::geo::Coordinate;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StationRef {
    pub code: &'static str,
    pub coordinate: Coordinate,
}

const fn station(code: &'static str, latitude: f64, longitude: f64) -> StationRef {
    StationRef {
        code,
        coordinate: Coordinate::new(latitude, longitude),
    }
}

/// Reporting stations of the contiguous US winds and temperatures aloft bulletin.
pub static STATIONS: [StationRef; 175] = [
    station("ABI", 32.48, -99.86),
    station("ABQ", 35.04, -106.82),
    station("ABR", 45.42, -98.37),
    station("ACK", 41.28, -70.03),
    station("ACY", 39.46, -74.58),
    station("AGC", 40.27, -80.04),
    station("ALB", 42.75, -73.80),
    station("ALS", 37.35, -105.82),
    station("AMA", 35.29, -101.64),
    station("AST", 46.16, -123.88),
    station("ATL", 33.63, -84.44),
    station("AVP", 41.27, -75.69),
    station("AXN", 45.96, -95.23),
    station("BAM", 40.57, -116.92),
    station("BCE", 37.69, -112.30),
    station("BDL", 41.94, -72.69),
    station("BFF", 41.89, -103.48),
    station("BGR", 44.84, -68.87),
    station("BHM", 33.56, -86.75),
    station("BIH", 37.37, -118.36),
    station("BIL", 45.81, -108.63),
    station("BLH", 33.62, -114.72),
    station("BML", 44.64, -71.19),
    station("BNA", 36.14, -86.68),
    station("BOI", 43.55, -116.19),
    station("BOS", 42.36, -70.99),
    station("BRL", 40.72, -90.92),
    station("BRO", 25.92, -97.38),
    station("BUF", 42.93, -78.65),
    station("CAE", 33.86, -81.05),
    station("CAR", 46.87, -68.02),
    station("CGI", 37.23, -89.57),
    station("CHS", 32.90, -80.04),
    station("CLE", 41.42, -81.85),
    station("CLL", 30.61, -96.42),
    station("CMH", 39.99, -82.88),
    station("COU", 38.82, -92.22),
    station("CRP", 27.90, -97.45),
    station("CRW", 38.35, -81.77),
    station("CSG", 32.62, -85.00),
    station("CVG", 39.02, -84.70),
    station("CZI", 43.99, -106.44),
    station("DAL", 32.85, -96.85),
    station("DBQ", 42.40, -90.71),
    station("DEN", 39.81, -104.66),
    station("DIK", 46.86, -102.77),
    station("DLH", 46.80, -92.20),
    station("DLN", 45.25, -112.55),
    station("DRT", 29.37, -100.92),
    station("DSM", 41.44, -93.65),
    station("ECK", 43.26, -82.72),
    station("EKN", 38.89, -79.86),
    station("ELP", 31.82, -106.28),
    station("ELY", 39.30, -114.84),
    station("EMI", 39.50, -76.98),
    station("EVV", 38.04, -87.53),
    station("EYW", 24.59, -81.80),
    station("FAT", 36.89, -119.80),
    station("FLO", 34.23, -79.66),
    station("FMN", 36.75, -108.10),
    station("FOT", 40.67, -124.23),
    station("FSD", 43.65, -96.78),
    station("FSM", 35.39, -94.27),
    station("FWA", 40.98, -85.19),
    station("GAG", 36.34, -99.88),
    station("GCK", 37.92, -100.72),
    station("GEG", 47.56, -117.63),
    station("GFK", 47.95, -97.19),
    station("GGW", 48.21, -106.63),
    station("GJT", 39.06, -108.79),
    station("GLD", 39.39, -101.69),
    station("GRB", 44.56, -88.19),
    station("GRI", 40.98, -98.31),
    station("GSO", 36.05, -79.98),
    station("GTF", 47.45, -111.41),
    station("H51", 26.00, -95.00),
    station("H52", 26.00, -90.00),
    station("H61", 26.00, -85.00),
    station("HAT", 35.27, -75.55),
    station("HOU", 29.65, -95.28),
    station("HSV", 34.64, -86.77),
    station("ICT", 37.75, -97.58),
    station("ILM", 34.35, -77.88),
    station("IMB", 44.65, -119.71),
    station("IND", 39.81, -86.37),
    station("INK", 31.87, -103.24),
    station("INL", 48.57, -93.40),
    station("JAN", 32.51, -90.17),
    station("JAX", 30.44, -81.56),
    station("JFK", 40.63, -73.77),
    station("JOT", 41.55, -88.32),
    station("LAS", 36.08, -115.16),
    station("LBB", 33.71, -101.91),
    station("LCH", 30.14, -93.11),
    station("LIT", 34.68, -92.18),
    station("LKV", 42.49, -120.51),
    station("LND", 42.82, -108.73),
    station("LOU", 38.10, -85.58),
    station("LRD", 27.48, -99.42),
    station("LSE", 43.88, -91.25),
    station("LWS", 46.37, -117.02),
    station("MBW", 41.85, -106.00),
    station("MCW", 43.09, -93.33),
    station("MEM", 35.06, -89.98),
    station("MGM", 32.22, -86.32),
    station("MIA", 25.80, -80.30),
    station("MKC", 39.28, -94.86),
    station("MKG", 43.17, -86.04),
    station("MLB", 28.10, -80.64),
    station("MLS", 46.38, -105.95),
    station("MOB", 30.69, -88.24),
    station("MOT", 48.26, -101.29),
    station("MQT", 46.53, -87.59),
    station("MRF", 30.30, -103.95),
    station("MSP", 44.88, -93.23),
    station("MSY", 30.00, -90.27),
    station("OKC", 35.36, -97.61),
    station("OMA", 41.17, -95.74),
    station("ONL", 42.47, -98.69),
    station("ONT", 34.06, -117.58),
    station("ORF", 36.90, -76.21),
    station("OTH", 43.42, -124.25),
    station("PDX", 45.59, -122.60),
    station("PFN", 30.21, -85.68),
    station("PHX", 33.43, -112.01),
    station("PIE", 27.91, -82.68),
    station("PIH", 42.87, -112.65),
    station("PIR", 44.40, -100.17),
    station("PLB", 44.69, -73.52),
    station("PRC", 34.70, -112.48),
    station("PSB", 40.92, -77.99),
    station("PSX", 28.76, -96.31),
    station("PUB", 38.29, -104.43),
    station("PWM", 43.65, -70.31),
    station("RAP", 44.05, -103.05),
    station("RBL", 40.10, -122.24),
    station("RDM", 44.25, -121.30),
    station("RDU", 35.87, -78.78),
    station("RIC", 37.50, -77.32),
    station("RKS", 41.59, -109.07),
    station("RNO", 39.50, -119.77),
    station("ROA", 37.33, -80.07),
    station("ROW", 33.30, -104.53),
    station("SAC", 38.44, -121.55),
    station("SAN", 32.73, -117.19),
    station("SAT", 29.64, -98.46),
    station("SAV", 32.16, -81.11),
    station("SBA", 34.51, -119.77),
    station("SEA", 47.44, -122.31),
    station("SFO", 37.62, -122.37),
    station("SGF", 37.36, -93.33),
    station("SHV", 32.77, -93.81),
    station("SIY", 41.78, -122.47),
    station("SLC", 40.85, -111.98),
    station("SLN", 38.93, -97.62),
    station("SPI", 39.84, -89.68),
    station("SPS", 33.99, -98.59),
    station("SSM", 46.41, -84.31),
    station("STL", 38.86, -90.48),
    station("SYR", 43.16, -76.20),
    station("T01", 28.50, -93.50),
    station("T06", 28.50, -91.00),
    station("T07", 28.60, -88.50),
    station("TCC", 35.18, -103.60),
    station("TLH", 30.56, -84.37),
    station("TRI", 36.48, -82.41),
    station("TUL", 36.20, -95.79),
    station("TUS", 32.10, -110.91),
    station("TVC", 44.67, -85.55),
    station("TYS", 35.90, -83.89),
    station("WJF", 34.74, -118.22),
    station("YKM", 46.57, -120.44),
    station("ZUN", 34.97, -109.15),
    station("2XG", 30.33, -78.50),
    station("4J3", 28.50, -85.00),
];

/// The network station closest to `coordinate`, with its distance in nautical miles.
pub fn nearest_station<'a>(
    network: &'a [StationRef],
    coordinate: &Coordinate,
) -> Option<(&'a StationRef, f64)> {
    network
        .iter()
        .map(|station| (station, station.coordinate.distance_nm(coordinate)))
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
}

pub fn find_station<'a>(network: &'a [StationRef], code: &str) -> Option<&'a StationRef> {
    network.iter().find(|station| station.code.eq_ignore_ascii_case(code))
}
