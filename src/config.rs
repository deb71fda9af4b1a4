use std::path::{Path, PathBuf};

use crate::models::Config;

const SAMPLE_CONFIG: &str = include_str!("../config.sample.toml");

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("config file already exists: {0}")]
    Exists(PathBuf),
    #[error("no config files specified")]
    Empty,
}

/// Load and merge one or more config files. Later files override earlier ones.
pub fn load_all(paths: &[PathBuf]) -> Result<Config, ConfigError> {
    let mut config: Option<Config> = None;

    for path in paths {
        log::info!("loading config: {}", path.display());
        let c = read_file(path)?;
        if let Some(ref mut existing) = config {
            merge(existing, c);
        } else {
            config = Some(c);
        }
    }

    config.ok_or(ConfigError::Empty)
}

/// Generate sample config file.
pub fn generate_sample(path: &Path) -> Result<(), ConfigError> {
    if path.exists() {
        return Err(ConfigError::Exists(path.to_path_buf()));
    }
    std::fs::write(path, SAMPLE_CONFIG)?;
    Ok(())
}

/// Parse a TOML config string.
pub fn parse(content: &str) -> Result<Config, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Load configuration from a given TOML file.
fn read_file(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

/// Merge the given src config into the dest config struct.
fn merge(dest: &mut Config, src: Config) {
    // Merge app config.
    if src.app.max_top.is_some() {
        dest.app.max_top = src.app.max_top;
    }
    if src.app.default_limit.is_some() {
        dest.app.default_limit = src.app.default_limit;
    }
    if src.app.max_limit.is_some() {
        dest.app.max_limit = src.app.max_limit;
    }
    if src.app.default_sort.is_some() {
        dest.app.default_sort = src.app.default_sort;
    }
    if src.app.fold_accents.is_some() {
        dest.app.fold_accents = src.app.fold_accents;
    }

    // Merge DB config.
    if !src.db.path.is_empty() {
        dest.db.path = src.db.path;
    }
    if src.db.max_conns > 0 {
        dest.db.max_conns = src.db.max_conns;
    }
}
