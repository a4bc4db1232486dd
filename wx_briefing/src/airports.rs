use std::path::Path;

use tracing::debug;
use wx_decoder::airport::AirportTable;

use crate::{
    error::ApplicationResult,
    input::{ProductCache, ProductReader},
};

const BUNDLED_AIRPORTS: &str = include_str!("../airports.toml");

/// The airport reference file, or the bundled sample when none is configured.
pub(crate) fn load_airports<C: ProductCache>(
    path: Option<&Path>,
    reader: &mut ProductReader<C>,
) -> ApplicationResult<AirportTable> {
    let airports: AirportTable = match path {
        Some(path) => toml::from_str(&reader.read(path)?)?,
        None => toml::from_str(BUNDLED_AIRPORTS)?,
    };
    debug!(count = airports.len(), "Loaded airports");
    Ok(airports)
}
