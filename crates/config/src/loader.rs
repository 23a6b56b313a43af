use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{
    Error, Result,
    env_subst::substitute_env,
    schema::CourierConfig,
};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "courier.toml",
    "courier.yaml",
    "courier.yml",
    "courier.json",
];

/// Supported on-disk formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Yaml,
    Json,
}

impl ConfigFormat {
    /// Pick the format from a file extension. Files without one are read as TOML.
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()).unwrap_or("toml") {
            "toml" => Ok(Self::Toml),
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            other => Err(Error::UnsupportedFormat {
                extension: other.to_string(),
            }),
        }
    }
}

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> Result<CourierConfig> {
    let format = ConfigFormat::from_path(path)?;
    let raw = std::fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&substitute_env(&raw), format)
}

/// Parse already-substituted config text.
pub fn parse_config(raw: &str, format: ConfigFormat) -> Result<CourierConfig> {
    match format {
        ConfigFormat::Toml => Ok(toml::from_str(raw)?),
        ConfigFormat::Yaml => Ok(serde_yaml::from_str(raw)?),
        ConfigFormat::Json => Ok(serde_json::from_str(raw)?),
    }
}

/// Discover and load config from the working directory.
///
/// Returns `CourierConfig::default()` when no file is found or the file
/// fails to load.
pub fn discover_and_load() -> CourierConfig {
    discover_in(Path::new("."))
}

fn discover_in(dir: &Path) -> CourierConfig {
    let Some(path) = find_config_file(dir) else {
        debug!(dir = %dir.display(), "no config file found, using defaults");
        return CourierConfig::default();
    };

    debug!(path = %path.display(), "loading config");
    match load_config(&path) {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            CourierConfig::default()
        },
    }
}

fn find_config_file(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.exists())
}
