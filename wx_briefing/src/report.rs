use askama::Template;
use itertools::Itertools;
use serde::Serialize;
use serde_with::skip_serializing_none;
use tracing::debug;
use wx_decoder::{
    airport::AirportTable,
    flight_category::FlightCategory,
    metar::MetarObservation,
    mos::{MosForecastHour, hours_for_station},
    pressure::density_altitude_ft,
    runway::{RunwayWindAnalysis, preferred, rank},
    taf::TafForecast,
    wind::{CrosswindSide, WindComponents},
    winds_aloft::{WindsAloftDecoder, WindsAloftLevel},
};

use crate::{
    error::{ApplicationError, ApplicationResult},
    input::{ProductCache, ProductSources},
};

/// Derived values of an observation, computed once for both renderings.
#[skip_serializing_none]
#[derive(Debug, Serialize)]
pub(crate) struct MetarSummary<'a> {
    pub observation: &'a MetarObservation,
    pub wind: String,
    pub flight_category: FlightCategory,
    pub altimeter_in_hg: Option<f64>,
    pub altimeter_hpa: Option<f64>,
    pub temperature_f: Option<f64>,
    pub dewpoint_f: Option<f64>,
    pub temperature_spread_c: Option<f64>,
    pub visibility_sm: Option<f64>,
    pub ceiling_ft: Option<u32>,
    pub density_altitude_ft: Option<f64>,
}

impl<'a> MetarSummary<'a> {
    /// `field_elevation_ft` stands in when the observation carries no elevation.
    pub fn new(observation: &'a MetarObservation, field_elevation_ft: Option<f64>) -> Self {
        let density_altitude = observation.density_altitude_ft().or_else(|| {
            Some(density_altitude_ft(
                observation.altimeter()?,
                field_elevation_ft?,
                observation.temp?,
            ))
        });
        Self {
            observation,
            wind: observation.wind_text(),
            flight_category: observation.flight_category(),
            altimeter_in_hg: observation.altimeter_in_hg(),
            altimeter_hpa: observation.altimeter_hpa(),
            temperature_f: observation.temperature_f(),
            dewpoint_f: observation.dewpoint_f(),
            temperature_spread_c: observation.temperature_spread_c(),
            visibility_sm: observation.visibility_sm(),
            ceiling_ft: observation.ceiling_ft(),
            density_altitude_ft: density_altitude,
        }
    }
}

#[skip_serializing_none]
#[derive(Debug, Serialize)]
pub(crate) struct AirportBriefing<'a> {
    pub ident: String,
    pub metar: Option<MetarSummary<'a>>,
    pub runways: Vec<RunwayWindAnalysis<'a>>,
    pub preferred_runway: Option<String>,
    pub taf: Option<TafForecast>,
    pub winds_aloft: Vec<WindsAloftLevel>,
    pub mos: Vec<&'a MosForecastHour>,
}

/// Products shared by every airport of one briefing.
pub(crate) struct Products<'p> {
    pub metars: &'p [MetarObservation],
    pub mos: &'p [MosForecastHour],
}

impl<'a> AirportBriefing<'a> {
    #[tracing::instrument(skip(airports, products, sources))]
    pub fn build<C: ProductCache>(
        ident: &str,
        airports: &'a AirportTable,
        products: &Products<'a>,
        sources: &mut ProductSources<C>,
    ) -> ApplicationResult<Self> {
        let ident = ident.trim().to_ascii_uppercase();
        let record = airports
            .get(&ident)
            .ok_or_else(|| ApplicationError::UnknownAirport(ident.clone()))?;

        let observation = products
            .metars
            .iter()
            .find(|metar| metar.icao_id.eq_ignore_ascii_case(&ident));
        let wind = observation.and_then(MetarObservation::wind);
        let runways = rank(&record.runways, wind.as_ref());
        let preferred_runway = preferred(&record.runways, wind.as_ref())
            .map(|analysis| analysis.runway.identifier.clone());

        let taf = sources.taf(&ident)?.map(|raw| TafForecast::decode(&raw));
        let winds_aloft = match sources.winds_aloft()? {
            Some(bulletin) => WindsAloftDecoder::default().decode(&bulletin, &ident, airports),
            None => Vec::new(),
        };
        let mos = hours_for_station(products.mos, &ident);
        debug!(
            metar = observation.is_some(),
            runways = runways.len(),
            taf = taf.is_some(),
            winds_aloft = winds_aloft.len(),
            mos = mos.len(),
            "Built briefing"
        );

        Ok(Self {
            metar: observation.map(|metar| MetarSummary::new(metar, record.elevation_ft)),
            ident,
            runways,
            preferred_runway,
            taf,
            winds_aloft,
            mos,
        })
    }
}

#[derive(Debug)]
struct Row {
    label: String,
    value: String,
}

impl Row {
    fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug)]
struct TafGroupView {
    label: String,
    category: String,
    icon: &'static str,
    rows: Vec<Row>,
}

#[derive(Debug)]
struct AirportView {
    ident: String,
    metar: Vec<Row>,
    runways: Vec<Row>,
    preferred_runway: String,
    taf: Vec<TafGroupView>,
    taf_worst: String,
    winds_aloft: Vec<Row>,
    mos: Vec<Row>,
}

#[derive(Template)]
#[template(path = "briefing.txt")]
struct BriefingTemplate<'a> {
    airports: &'a [AirportView],
}

fn or_missing<T>(value: Option<T>, format: impl FnOnce(T) -> String) -> String {
    value.map_or_else(|| "-".to_string(), format)
}

fn metar_rows(metar: &MetarSummary) -> Vec<Row> {
    let mut rows = Vec::new();
    if let Some(raw) = &metar.observation.raw_ob {
        rows.push(Row::new("Raw", raw.as_str()));
    }
    rows.extend([
        Row::new("Category", metar.flight_category.code()),
        Row::new("Wind", metar.wind.as_str()),
        Row::new(
            "Visibility",
            or_missing(metar.visibility_sm, |v| format!("{v} SM")),
        ),
        Row::new(
            "Ceiling",
            or_missing(metar.ceiling_ft, |c| format!("{c} ft")),
        ),
        Row::new(
            "Temperature",
            or_missing(
                metar.observation.temp.zip(metar.temperature_f),
                |(c, f)| format!("{c:.0}°C / {f:.0}°F"),
            ),
        ),
        Row::new(
            "Dew point",
            or_missing(
                metar.observation.dewp.zip(metar.dewpoint_f),
                |(c, f)| format!("{c:.0}°C / {f:.0}°F"),
            ),
        ),
        Row::new(
            "Altimeter",
            or_missing(metar.altimeter_in_hg.zip(metar.altimeter_hpa), |(hg, hpa)| {
                format!("{hg:.2} inHg / {hpa:.0} hPa")
            }),
        ),
        Row::new(
            "Density altitude",
            or_missing(metar.density_altitude_ft, |da| format!("{da:.0} ft")),
        ),
    ]);
    rows
}

/// `↑10 →6 (G9) Good`: head or tail arrow, then crosswind arrow pointing the way it blows.
fn format_components(components: &WindComponents) -> String {
    let head = match components.headwind_kt {
        h if h < 0 => format!("↓{}", h.unsigned_abs()),
        h => format!("↑{h}"),
    };
    let cross = components.crosswind_kt.unsigned_abs();
    let cross = match components.crosswind_side() {
        CrosswindSide::Left => format!("→{cross}"),
        CrosswindSide::Right => format!("{cross}←"),
        CrosswindSide::None => "○".to_string(),
    };
    match components.gust_crosswind_kt {
        Some(gust) => format!("{head} {cross} (G{})", gust.unsigned_abs()),
        None => format!("{head} {cross}"),
    }
}

fn runway_rows(runways: &[RunwayWindAnalysis]) -> Vec<Row> {
    runways
        .iter()
        .map(|analysis| {
            let mut value = format!(
                "{} {}",
                format_components(&analysis.components),
                analysis.favorability
            );
            if analysis.components.is_tailwind() {
                value.push_str(", tailwind");
            }
            Row::new(analysis.runway.identifier.as_str(), value)
        })
        .collect()
}

fn category_text(category: Option<FlightCategory>) -> String {
    or_missing(category, |c| c.code().to_string())
}

fn taf_groups(taf: &TafForecast) -> Vec<TafGroupView> {
    taf.groups
        .iter()
        .map(|group| TafGroupView {
            label: group.label.clone(),
            category: category_text(group.estimated_category),
            icon: group.icon.name(),
            rows: group
                .rows
                .iter()
                .map(|row| Row::new(row.label, row.value.as_str()))
                .collect(),
        })
        .collect()
}

fn winds_aloft_rows(levels: &[WindsAloftLevel]) -> Vec<Row> {
    levels
        .iter()
        .map(|level| {
            let wind = if level.is_light_and_variable() {
                "Light and variable".to_string()
            } else {
                format!(
                    "{:03}@{}kt",
                    level.direction_deg.unwrap_or_default(),
                    level.speed_kt.unwrap_or_default()
                )
            };
            let temperature = level
                .temperature_c
                .map_or_else(String::new, |t| format!(" {t:+}°C"));
            let source = level
                .source_station_code
                .as_deref()
                .map_or_else(String::new, |code| format!(" (from {code})"));
            Row::new(
                format!("{} ft", level.altitude_ft),
                format!("{wind}{temperature}{source}"),
            )
        })
        .collect()
}

fn mos_rows(hours: &[&MosForecastHour]) -> Vec<Row> {
    hours
        .iter()
        .map(|hour| {
            let parts = [
                hour.flight_category().map(|c| c.code().to_string()),
                hour.wind().map(|wind| wind.to_string()),
                hour.tmp.map(|t| format!("{t}°F")),
                hour.cld.map(|cover| cover.label().to_string()),
                hour.p06.map(|p| format!("precip {p}%")),
                hour.t06.map(|t| format!("thunder {t}%")),
                hour.obstruction_label().map(str::to_string),
            ];
            Row::new(
                hour.valid_time.strftime("%d %H:%MZ").to_string(),
                parts.into_iter().flatten().join(", "),
            )
        })
        .collect()
}

impl From<&AirportBriefing<'_>> for AirportView {
    fn from(briefing: &AirportBriefing<'_>) -> Self {
        Self {
            ident: briefing.ident.clone(),
            metar: briefing.metar.as_ref().map(metar_rows).unwrap_or_default(),
            runways: runway_rows(&briefing.runways),
            preferred_runway: or_missing(briefing.preferred_runway.as_deref(), str::to_string),
            taf: briefing.taf.as_ref().map(taf_groups).unwrap_or_default(),
            taf_worst: category_text(briefing.taf.as_ref().and_then(TafForecast::worst_category)),
            winds_aloft: winds_aloft_rows(&briefing.winds_aloft),
            mos: mos_rows(&briefing.mos),
        }
    }
}

pub(crate) fn render_text(briefings: &[AirportBriefing]) -> ApplicationResult<String> {
    let airports = briefings.iter().map(AirportView::from).collect_vec();
    Ok(BriefingTemplate {
        airports: &airports,
    }
    .render()?)
}

pub(crate) fn render_json(briefings: &[AirportBriefing]) -> ApplicationResult<String> {
    Ok(serde_json::to_string_pretty(briefings)?)
}

#[cfg(test)]
mod tests {
    use std::{fs, path::Path};

    use tracing_test::traced_test;

    use super::*;
    use crate::{
        airports::load_airports,
        config::Configurable,
        input::{MemoryCache, ProductReader, TtlPolicy},
    };

    const METARS: &str = r#"[{
        "icaoId": "KATL",
        "obsTime": 1727805600,
        "temp": 28,
        "dewp": 17,
        "wdir": 250,
        "wspd": 12,
        "wgst": 20,
        "visib": "10+",
        "altim": 1015.2,
        "fltCat": "VFR",
        "rawOb": "KATL 011751Z 25012G20KT 10SM FEW250 28/17 A2998",
        "clouds": [{"cover": "FEW", "base": 25000}]
    }]"#;

    const MOS: &str = r#"[
        {"station": "KATL", "valid_time": "2024-10-02T00:00:00Z", "tmp": 78, "dpt": 62,
         "cld": "SC", "wdr": 27, "wsp": 8, "p06": 10, "t06": 2, "cig": 8, "vis": 7},
        {"station": "KATL", "valid_time": "2024-10-01T21:00:00Z", "tmp": 84, "dpt": 63,
         "cld": "FW", "wdr": 26, "wsp": 11, "cig": 8, "vis": 7}
    ]"#;

    const BULLETIN: &str = "\
FT  3000    6000    9000   12000   18000   24000  30000  34000  39000
ATL 2714 2620+14 2525+08 2432+02 2445-11 2458-23 246038 256547 256956
";

    fn configuration(dir: &Path) -> Configurable {
        let taf_dir = dir.join("taf");
        fs::create_dir_all(&taf_dir).unwrap();
        fs::write(
            taf_dir.join("KATL.taf"),
            "TAF KATL 011200Z 0112/0218 28008KT P6SM FEW250 FM011800 32015G22KT 6SM -RA OVC020",
        )
        .unwrap();
        fs::write(dir.join("metars.json"), METARS).unwrap();
        fs::write(dir.join("mos.json"), MOS).unwrap();
        fs::write(dir.join("fd.txt"), BULLETIN).unwrap();
        Configurable {
            airports_file: None,
            winds_aloft_file: Some(dir.join("fd.txt")),
            taf_dir: Some(taf_dir),
            metar_file: Some(dir.join("metars.json")),
            mos_file: Some(dir.join("mos.json")),
            cache_ttl_seconds: 600,
            log_level: "debug".to_string(),
        }
    }

    fn sources(config: &Configurable) -> ProductSources<'_, MemoryCache> {
        ProductSources::new(
            config,
            ProductReader::new(MemoryCache::default(), TtlPolicy::from_seconds(600)),
        )
    }

    #[test]
    fn test_format_components() {
        let components = WindComponents {
            headwind_kt: 10,
            crosswind_kt: -6,
            gust_crosswind_kt: Some(-9),
        };
        assert_eq!(format_components(&components), "↑10 →6 (G9)");
        let components = WindComponents {
            headwind_kt: -4,
            crosswind_kt: 3,
            gust_crosswind_kt: None,
        };
        assert_eq!(format_components(&components), "↓4 3←");
        let components = WindComponents {
            headwind_kt: 0,
            crosswind_kt: 0,
            gust_crosswind_kt: None,
        };
        assert_eq!(format_components(&components), "↑0 ○");
    }

    #[test]
    fn test_full_briefing() {
        let dir = tempfile::tempdir().unwrap();
        let config = configuration(dir.path());
        let mut sources = sources(&config);
        let airports = load_airports(None, sources.reader()).unwrap();
        let metars = sources.metars().unwrap();
        let mos = sources.mos_hours().unwrap();
        let products = Products {
            metars: &metars,
            mos: &mos,
        };

        let briefing = AirportBriefing::build("katl", &airports, &products, &mut sources).unwrap();
        assert_eq!(briefing.ident, "KATL");
        assert_eq!(briefing.runways.len(), 4);
        assert_eq!(briefing.runways[0].runway.identifier, "26R");
        assert_eq!(briefing.preferred_runway.as_deref(), Some("26R"));
        assert_eq!(briefing.taf.as_ref().unwrap().groups.len(), 2);
        assert_eq!(briefing.winds_aloft.len(), 9);
        assert_eq!(briefing.mos.len(), 2);
        assert!(briefing.mos[0].valid_time < briefing.mos[1].valid_time);
        let metar = briefing.metar.as_ref().unwrap();
        assert_eq!(metar.flight_category, FlightCategory::Vfr);
        assert!(metar.density_altitude_ft.is_some());

        let fallback = AirportBriefing::build("KPDK", &airports, &products, &mut sources).unwrap();
        assert!(fallback.metar.is_none());
        assert!(fallback.runways.is_empty());
        assert_eq!(fallback.preferred_runway, None);
        assert!(fallback.taf.is_none());
        assert!(
            fallback
                .winds_aloft
                .iter()
                .all(|level| level.source_station_code.as_deref() == Some("ATL"))
        );

        let text = render_text(&[briefing, fallback]).unwrap();
        assert!(text.contains("=== KATL ==="));
        assert!(text.contains("Wind: 250@12G20kt"));
        assert!(text.contains("Runways (preferred 26R)"));
        assert!(text.contains("Runways (preferred -)"));
        assert!(text.contains("08L: ↓11"));
        assert!(text.contains(", tailwind"));
        assert!(text.contains("From 1800Z [MVFR, rain]"));
        assert!(text.contains("Wind: 320° at 15kt gusting 22kt"));
        assert!(text.contains("TAF (worst MVFR)"));
        assert!(text.contains("3000 ft: 270@14kt (from ATL)"));
        assert!(text.contains("=== KPDK ==="));
        assert!(text.contains("No observation"));
        assert!(text.contains("No forecast"));
    }

    #[test]
    fn test_json_briefing() {
        let dir = tempfile::tempdir().unwrap();
        let config = configuration(dir.path());
        let mut sources = sources(&config);
        let airports = load_airports(None, sources.reader()).unwrap();
        let metars = sources.metars().unwrap();
        let products = Products {
            metars: &metars,
            mos: &[],
        };
        let briefing = AirportBriefing::build("KATL", &airports, &products, &mut sources).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&render_json(&[briefing]).unwrap()).unwrap();
        assert_eq!(json[0]["ident"], "KATL");
        assert_eq!(json[0]["preferred_runway"], "26R");
        assert_eq!(json[0]["metar"]["flight_category"], "VFR");
        assert_eq!(json[0]["taf"]["station"], "KATL");
        assert_eq!(json[0]["taf"]["groups"][1]["estimated_category"], "MVFR");
        assert_eq!(json[0]["winds_aloft"][0]["altitude_ft"], 3000);
    }

    #[test]
    fn test_unknown_airport() {
        let dir = tempfile::tempdir().unwrap();
        let config = configuration(dir.path());
        let mut sources = sources(&config);
        let airports = load_airports(None, sources.reader()).unwrap();
        let products = Products {
            metars: &[],
            mos: &[],
        };
        let result = AirportBriefing::build("ENGM", &airports, &products, &mut sources);
        assert!(matches!(result, Err(ApplicationError::UnknownAirport(ident)) if ident == "ENGM"));
    }

    #[test]
    #[traced_test]
    fn test_bulletin_read_once() {
        let dir = tempfile::tempdir().unwrap();
        let config = configuration(dir.path());
        let mut sources = sources(&config);
        let airports = load_airports(None, sources.reader()).unwrap();
        let products = Products {
            metars: &[],
            mos: &[],
        };
        for ident in ["KATL", "KPDK", "KBNA"] {
            AirportBriefing::build(ident, &airports, &products, &mut sources).unwrap();
        }
        assert!(logs_contain("Using cached product"));
    }
}
