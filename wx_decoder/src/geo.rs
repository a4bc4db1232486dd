use serde::{Deserialize, Serialize};

/// Earth radius in nautical miles.
pub const EARTH_RADIUS_NM: f64 = 3440.065;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn distance_nm(&self, other: &Coordinate) -> f64 {
        distance_nm(self.latitude, self.longitude, other.latitude, other.longitude)
    }
}

/// Great-circle distance between two points using the Haversine formula.
///
/// Coordinates are not validated, out of range values give a meaningless but finite distance.
pub fn distance_nm(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_NM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_point_is_zero() {
        assert_eq!(distance_nm(33.64, -84.43, 33.64, -84.43), 0.0);
    }

    #[test]
    fn test_one_degree_of_latitude_is_sixty_nm() {
        let d = distance_nm(10.0, 20.0, 11.0, 20.0);
        assert!((d - 60.04).abs() < 0.1, "got {d}");
    }

    #[test]
    fn test_atl_to_jfk() {
        let atl = Coordinate::new(33.6367, -84.4281);
        let jfk = Coordinate::new(40.6398, -73.7789);
        let d = atl.distance_nm(&jfk);
        assert!((d - 661.0).abs() < 5.0, "got {d}");
        assert_eq!(d, jfk.distance_nm(&atl));
    }

    #[test]
    fn test_out_of_range_is_not_rejected() {
        assert!(distance_nm(200.0, 400.0, -95.0, 0.0).is_finite());
    }
}
