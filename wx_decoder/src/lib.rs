pub mod airport;
pub mod flight_category;
pub mod geo;
pub mod metar;
pub mod mos;
pub mod pressure;
pub mod runway;
pub mod taf;
pub mod units;
pub mod wind;
pub mod winds_aloft;
