use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use super::types::Config;

/// Name of the per-directory config file.
pub const CONFIG_FILE: &str = ".docker-get-run.yaml";

/// Load config from a `.docker-get-run.yaml` file in the given directory.
pub fn load(dir: &Path) -> Result<Option<Config>> {
    let path = dir.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(None);
    }
    load_file(&path).map(Some)
}

/// Load config from an explicit path. The file must exist.
pub fn load_file(path: &Path) -> Result<Config> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config: Config = serde_yaml::from_str(&contents)
        .with_context(|| format!("invalid config {}", path.display()))?;
    debug!(path = %path.display(), "loaded config");
    Ok(config)
}

/// Resolve the effective config: an explicit file wins, then the working
/// directory, then the user config directory, then built-in defaults.
pub fn resolve(explicit: Option<&Path>, cwd: &Path) -> Result<Config> {
    if let Some(path) = explicit {
        return load_file(path);
    }
    if let Some(cfg) = load(cwd)? {
        return Ok(cfg);
    }
    if let Some(path) = user_config_path()
        && path.is_file()
    {
        return load_file(&path);
    }
    Ok(Config::default())
}

fn user_config_path() -> Option<PathBuf> {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
    Some(base.join("docker-get-run").join("config.yaml"))
}
