//! coattain configuration.
//!
//! Holds the storage locations, header labels, and scoring policy that a
//! run needs. Nothing here is global: the loaded value is handed to the
//! pipeline explicitly.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::attainment::AttainmentPolicy;
use crate::model::FieldLabels;

/// Top-level coattain configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoattainConfig {
    /// Directory the run's documents are read from.
    #[serde(default = "default_document_dir")]
    pub document_dir: PathBuf,
    /// Directory reports are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Institution line shown at the top of rendered reports.
    #[serde(default)]
    pub institution: Option<String>,
    /// Output formats used when `--format` is not given.
    #[serde(default = "default_format")]
    pub default_format: String,
    /// Header line prefixes.
    #[serde(default)]
    pub fields: FieldLabels,
    /// Target ratio and level cut-offs.
    #[serde(default)]
    pub policy: AttainmentPolicy,
}

fn default_document_dir() -> PathBuf {
    PathBuf::from("./uploads")
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./results")
}
fn default_format() -> String {
    "json,html".to_string()
}

impl Default for CoattainConfig {
    fn default() -> Self {
        Self {
            document_dir: default_document_dir(),
            output_dir: default_output_dir(),
            institution: None,
            default_format: default_format(),
            fields: FieldLabels::default(),
            policy: AttainmentPolicy::default(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

fn resolve_path(p: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&p.to_string_lossy()))
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `coattain.toml` in the current directory
/// 2. `~/.config/coattain/config.toml`
///
/// Environment variable override: `COATTAIN_OUTPUT_DIR`.
pub fn load_config() -> Result<CoattainConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<CoattainConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("coattain.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<CoattainConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => CoattainConfig::default(),
    };

    if let Ok(dir) = std::env::var("COATTAIN_OUTPUT_DIR") {
        config.output_dir = PathBuf::from(dir);
    }

    config.document_dir = resolve_path(&config.document_dir);
    config.output_dir = resolve_path(&config.output_dir);

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("coattain"))
}
