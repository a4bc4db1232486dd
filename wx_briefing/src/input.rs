use std::{
    fs::File,
    io::{ErrorKind, Read},
    path::Path,
};

use encoding::{
    DecoderTrap, Encoding,
    all::{ISO_8859_1, UTF_8},
};
use indexmap::IndexMap;
use jiff::{SignedDuration, Timestamp};
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use wx_decoder::{metar::MetarObservation, mos::MosForecastHour};

use crate::{
    config::Configurable,
    error::{ApplicationError, ApplicationResult},
};

pub(crate) fn read_with_encodings<R: Read>(reader: &mut R) -> ApplicationResult<String> {
    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer)?;

    let utf8_decoded = UTF_8.decode(&buffer, DecoderTrap::Strict);

    match utf8_decoded {
        Ok(text) => Ok(text),
        Err(e) => ISO_8859_1
            .decode(&buffer, DecoderTrap::Strict)
            .map_err(|_| ApplicationError::EncodingError(e.to_string())),
    }
}

/// Raw product text keyed by source, with the time it was fetched.
pub(crate) trait ProductCache {
    fn get(&self, key: &str) -> Option<(&str, Timestamp)>;

    fn put(&mut self, key: String, value: String, fetched_at: Timestamp);
}

#[derive(Debug, Default)]
pub(crate) struct MemoryCache {
    entries: IndexMap<String, (String, Timestamp)>,
}

impl ProductCache for MemoryCache {
    fn get(&self, key: &str) -> Option<(&str, Timestamp)> {
        self.entries
            .get(key)
            .map(|(value, fetched_at)| (value.as_str(), *fetched_at))
    }

    fn put(&mut self, key: String, value: String, fetched_at: Timestamp) {
        self.entries.insert(key, (value, fetched_at));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TtlPolicy {
    ttl: SignedDuration,
}

impl TtlPolicy {
    pub fn from_seconds(seconds: u64) -> Self {
        Self {
            ttl: SignedDuration::from_secs(i64::try_from(seconds).unwrap_or(i64::MAX)),
        }
    }

    pub fn is_fresh(&self, fetched_at: Timestamp, now: Timestamp) -> bool {
        now.duration_since(fetched_at) < self.ttl
    }
}

/// Reads product files through a cache so that a file shared by several airports is
/// read once per TTL window.
#[derive(Debug)]
pub(crate) struct ProductReader<C: ProductCache> {
    cache: C,
    policy: TtlPolicy,
}

impl<C: ProductCache> ProductReader<C> {
    pub fn new(cache: C, policy: TtlPolicy) -> Self {
        Self { cache, policy }
    }

    pub fn read(&mut self, path: &Path) -> ApplicationResult<String> {
        self.read_at(path, Timestamp::now())
    }

    pub fn read_at(&mut self, path: &Path, now: Timestamp) -> ApplicationResult<String> {
        let key = path.to_string_lossy().to_string();
        if let Some((value, fetched_at)) = self.cache.get(&key)
            && self.policy.is_fresh(fetched_at, now)
        {
            trace!(path = %key, "Using cached product");
            return Ok(value.to_string());
        }
        let text = read_with_encodings(&mut File::open(path)?)?;
        debug!(path = %key, bytes = text.len(), "Read product file");
        self.cache.put(key, text.clone(), now);
        Ok(text)
    }

    /// Like [`Self::read`], but a missing file is `None`.
    pub fn read_optional(&mut self, path: &Path) -> ApplicationResult<Option<String>> {
        match self.read(path) {
            Ok(text) => Ok(Some(text)),
            Err(ApplicationError::IoError(e)) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "No product file");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

/// The configured product files, read through one [`ProductReader`].
pub(crate) struct ProductSources<'c, C: ProductCache> {
    config: &'c Configurable,
    reader: ProductReader<C>,
}

impl<'c, C: ProductCache> ProductSources<'c, C> {
    pub fn new(config: &'c Configurable, reader: ProductReader<C>) -> Self {
        Self { config, reader }
    }

    pub fn reader(&mut self) -> &mut ProductReader<C> {
        &mut self.reader
    }

    fn json_array<T: DeserializeOwned>(&mut self, path: Option<&Path>) -> ApplicationResult<Vec<T>> {
        let Some(path) = path else {
            return Ok(Vec::new());
        };
        let raw = self.reader.read(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn metars(&mut self) -> ApplicationResult<Vec<MetarObservation>> {
        let config = self.config;
        self.json_array(config.metar_file.as_deref())
    }

    pub fn mos_hours(&mut self) -> ApplicationResult<Vec<MosForecastHour>> {
        let config = self.config;
        self.json_array(config.mos_file.as_deref())
    }

    pub fn winds_aloft(&mut self) -> ApplicationResult<Option<String>> {
        match self.config.winds_aloft_file.as_deref() {
            Some(path) => self.reader.read(path).map(Some),
            None => Ok(None),
        }
    }

    /// The TAF in `<taf_dir>/<ICAO>.taf`.
    pub fn taf(&mut self, ident: &str) -> ApplicationResult<Option<String>> {
        let Some(taf_dir) = self.config.taf_dir.as_deref() else {
            return Ok(None);
        };
        let path = taf_dir.join(format!("{}.taf", ident.to_ascii_uppercase()));
        self.reader.read_optional(&path)
    }
}
