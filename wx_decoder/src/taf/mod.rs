//! Terminal aerodrome forecasts.
//!
//! A raw TAF is split into change groups at every `TAF <station>`, `FM`, `TEMPO`,
//! `BECMG` and `PROB` marker. The text following a marker belongs to that group
//! until the next marker.

mod analysis;
mod element;

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::Serialize;
use tracing::trace;

pub use analysis::{SegmentEstimate, WeatherIcon, analyze_segment};
pub use element::{TafRow, decode_element};

use element::tokenize;

use crate::flight_category::FlightCategory;

static CHANGE_GROUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        \b(?:
            TAF(?:\s+(?:AMD|COR))?\s+(?P<station>[A-Z0-9]{4})
          | FM(?P<from>[0-9]{6}|[0-9]{4}Z?)
          | TEMPO\s+(?P<tempo>[0-9]{4}/[0-9]{4})
          | BECMG\s+(?P<becoming>[0-9]{4}/[0-9]{4})
          | PROB(?P<probability>[0-9]{2})(?:\s+TEMPO)?\s+(?P<probability_period>[0-9]{4}/[0-9]{4})
        )\b",
    )
    .unwrap()
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "percent")]
pub enum ChangeKind {
    Initial,
    From,
    Tempo,
    Becoming,
    Probability(u8),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TafChangeGroup {
    pub kind: ChangeKind,
    pub label: String,
    pub rows: Vec<TafRow>,
    pub estimated_category: Option<FlightCategory>,
    pub icon: WeatherIcon,
    /// The text of the group without its marker.
    pub text: String,
}

impl TafChangeGroup {
    pub fn row(&self, label: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|row| row.label == label)
            .map(|row| row.value.as_str())
    }
}

/// Accumulates the text and rows of the group that is currently open.
#[derive(Debug)]
struct GroupBuilder {
    kind: ChangeKind,
    label: String,
    rows: Vec<TafRow>,
    text: String,
    estimate: SegmentEstimate,
}

impl GroupBuilder {
    fn open(kind: ChangeKind, label: String) -> Self {
        Self {
            kind,
            label,
            rows: Vec::new(),
            text: String::new(),
            estimate: analyze_segment(""),
        }
    }

    fn implicit() -> Self {
        Self::open(ChangeKind::Initial, "Forecast".to_string())
    }

    fn from_marker(captures: &Captures) -> Self {
        let group = |name| captures.name(name).map(|m| m.as_str());
        if let Some(station) = group("station") {
            trace!(station, "Forecast for station");
            Self::open(ChangeKind::Initial, "Initial Forecast".to_string())
        } else if let Some(digits) = group("from") {
            let label = from_hour(digits)
                .map_or_else(|| "From".to_string(), |hour| format!("From {hour}00Z"));
            Self::open(ChangeKind::From, label)
        } else if let Some(period) = group("tempo") {
            Self::open(ChangeKind::Tempo, format!("Temporary {period}"))
        } else if let Some(period) = group("becoming") {
            Self::open(ChangeKind::Becoming, format!("Becoming {period}"))
        } else {
            let percent = group("probability")
                .and_then(|digits| digits.parse().ok())
                .unwrap_or_default();
            Self::open(
                ChangeKind::Probability(percent),
                format!("Probability {percent}%"),
            )
        }
    }

    fn feed(&mut self, text: &str) {
        self.rows
            .extend(tokenize(text).iter().filter_map(|token| decode_element(token)));
        if !self.text.is_empty() {
            self.text.push(' ');
        }
        self.text.push_str(text.trim());
        self.estimate = analyze_segment(&self.text);
    }

    fn finish(self) -> TafChangeGroup {
        TafChangeGroup {
            kind: self.kind,
            label: self.label,
            rows: self.rows,
            estimated_category: self.estimate.category,
            icon: self.estimate.icon,
            text: self.text,
        }
    }
}

/// `FM011800` carries day, hour and minute, `FM1200Z` only hour and minute.
fn from_hour(digits: &str) -> Option<&str> {
    let digits = digits.trim_end_matches('Z');
    match digits.len() {
        6 => digits.get(2..4),
        _ => digits.get(..2),
    }
}

#[derive(Debug)]
enum SegmenterState {
    OutsideGroup,
    InGroup(GroupBuilder),
}

impl SegmenterState {
    fn feed(self, text: &str) -> Self {
        match self {
            SegmenterState::InGroup(mut builder) => {
                builder.feed(text);
                SegmenterState::InGroup(builder)
            }
            SegmenterState::OutsideGroup if text.trim().is_empty() => SegmenterState::OutsideGroup,
            SegmenterState::OutsideGroup => {
                let mut builder = GroupBuilder::implicit();
                builder.feed(text);
                SegmenterState::InGroup(builder)
            }
        }
    }

    fn close(self, groups: &mut Vec<TafChangeGroup>) {
        if let SegmenterState::InGroup(builder) = self {
            groups.push(builder.finish());
        }
    }
}

/// Splits a raw TAF into its change groups in the order they appear.
///
/// Text without any change group marker, including an empty string, is a single
/// group labelled "Forecast".
pub fn segment(raw: &str) -> Vec<TafChangeGroup> {
    let mut groups = Vec::new();
    let mut state = SegmenterState::OutsideGroup;
    let mut cursor = 0;
    for captures in CHANGE_GROUP.captures_iter(raw) {
        let Some(marker) = captures.get(0) else {
            continue;
        };
        state = state.feed(&raw[cursor..marker.start()]);
        state.close(&mut groups);
        state = SegmenterState::InGroup(GroupBuilder::from_marker(&captures));
        cursor = marker.end();
    }
    state = state.feed(&raw[cursor..]);
    state.close(&mut groups);
    if groups.is_empty() {
        groups.push(GroupBuilder::implicit().finish());
    }
    trace!(groups = groups.len(), "Segmented TAF");
    groups
}

/// A decoded TAF.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TafForecast {
    pub station: Option<String>,
    pub groups: Vec<TafChangeGroup>,
}

impl TafForecast {
    pub fn decode(raw: &str) -> Self {
        let station = CHANGE_GROUP
            .captures(raw)
            .and_then(|captures| captures.name("station"))
            .map(|m| m.as_str().to_string());
        Self {
            station,
            groups: segment(raw),
        }
    }

    /// The most restrictive category over all groups that could be estimated.
    pub fn worst_category(&self) -> Option<FlightCategory> {
        FlightCategory::worst(
            self.groups
                .iter()
                .filter_map(|group| group.estimated_category),
        )
    }
}
