use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::wind::{RunwayFavorability, WindComponents, WindObservation};

/// One runway end, e.g. `09L`. Owned by the airport reference data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunwaySpec {
    pub identifier: String,
    pub heading_deg_true: u16,
    #[serde(default)]
    pub length_ft: u32,
    #[serde(default)]
    pub width_ft: u32,
    #[serde(default)]
    pub surface: String,
}

impl RunwaySpec {
    pub fn new(identifier: impl Into<String>, heading_deg_true: u16) -> Self {
        Self {
            identifier: identifier.into(),
            heading_deg_true,
            length_ft: 0,
            width_ft: 0,
            surface: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunwayWindAnalysis<'a> {
    pub runway: &'a RunwaySpec,
    pub components: WindComponents,
    pub favorability: RunwayFavorability,
}

impl<'a> RunwayWindAnalysis<'a> {
    pub fn new(runway: &'a RunwaySpec, wind: &WindObservation) -> Self {
        let components = WindComponents::for_runway(wind, runway.heading_deg_true);
        Self {
            runway,
            favorability: components.favorability(),
            components,
        }
    }
}

/// Orders runways by least crosswind, then by most headwind.
///
/// Without a wind direction every runway resolves to zero and there is nothing to rank,
/// so an empty list is returned.
pub fn rank<'a>(
    runways: &'a [RunwaySpec],
    wind: Option<&WindObservation>,
) -> Vec<RunwayWindAnalysis<'a>> {
    let Some(wind) = wind.filter(|w| w.direction_deg.is_some()) else {
        trace!("No wind direction, runways are not ranked");
        return Vec::new();
    };
    let mut analyses = runways
        .iter()
        .map(|runway| RunwayWindAnalysis::new(runway, wind))
        .collect::<Vec<_>>();
    // stable: equal runways keep reference order
    analyses.sort_by(|a, b| {
        a.components
            .crosswind_kt
            .unsigned_abs()
            .cmp(&b.components.crosswind_kt.unsigned_abs())
            .then(b.components.headwind_kt.cmp(&a.components.headwind_kt))
    });
    analyses
}

/// The best runway for the wind, if any could be ranked.
pub fn preferred<'a>(
    runways: &'a [RunwaySpec],
    wind: Option<&WindObservation>,
) -> Option<RunwayWindAnalysis<'a>> {
    rank(runways, wind).into_iter().next()
}
