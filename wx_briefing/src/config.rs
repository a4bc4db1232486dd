use std::{
    fs,
    path::{Path, PathBuf},
};

use config::{Config, FileFormat};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use tracing::debug;

use crate::{
    Cli,
    error::{ApplicationError, ApplicationResult},
    input::TtlPolicy,
};

const DEFAULT_CONFIG: &str = include_str!("../config.toml");

pub(crate) fn wx_briefing_project_dir() -> Option<ProjectDirs> {
    ProjectDirs::from("", "meltinglava", "wx_briefing")
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Configurable {
    pub airports_file: Option<PathBuf>,
    pub winds_aloft_file: Option<PathBuf>,
    pub taf_dir: Option<PathBuf>,
    pub metar_file: Option<PathBuf>,
    pub mos_file: Option<PathBuf>,
    #[serde(default = "default_cache_ttl_seconds")]
    pub cache_ttl_seconds: u64,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_cache_ttl_seconds() -> u64 {
    600
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Configurable {
    /// Paths given on the command line win over the config file.
    pub fn apply_cli(&mut self, cli: &Cli) {
        let overrides = [
            (&mut self.taf_dir, &cli.taf),
            (&mut self.winds_aloft_file, &cli.winds),
            (&mut self.metar_file, &cli.metar),
            (&mut self.mos_file, &cli.mos),
        ];
        for (setting, value) in overrides {
            if value.is_some() {
                setting.clone_from(value);
            }
        }
    }

    pub fn cache_ttl(&self) -> TtlPolicy {
        TtlPolicy::from_seconds(self.cache_ttl_seconds)
    }
}

fn default_config_file() -> ApplicationResult<PathBuf> {
    let project_dir = wx_briefing_project_dir().ok_or(ApplicationError::NoConfigDirectory)?;
    Ok(project_dir.config_dir().join("config.toml"))
}

/// Loads the config file, writing the bundled default first when it is missing or when
/// `clean_config` is set.
pub(crate) fn setup_configuration(
    config_file: Option<&Path>,
    clean_config: bool,
) -> ApplicationResult<(Configurable, PathBuf)> {
    let config_file = match config_file {
        Some(path) => path.to_path_buf(),
        None => default_config_file()?,
    };
    if clean_config || !config_file.exists() {
        if let Some(config_dir) = config_file.parent() {
            fs::create_dir_all(config_dir)?;
        }
        fs::write(&config_file, DEFAULT_CONFIG)?;
        debug!(path = %config_file.display(), "Wrote default config file");
    }
    let configurable = Config::builder()
        .add_source(config::File::from(config_file.clone()).format(FileFormat::Toml))
        .build()?
        .try_deserialize::<Configurable>()?;
    Ok((configurable, config_file))
}

#[cfg(test)]
fn configuration_from_str(raw: &str) -> ApplicationResult<Configurable> {
    Ok(Config::builder()
        .add_source(config::File::from_str(raw, FileFormat::Toml))
        .build()?
        .try_deserialize::<Configurable>()?)
}
