//! Settings resolution: defaults, then `reaprun.toml`, then flags and
//! environment variables.

use crate::cli::Cli;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "reaprun.toml";
pub const DEFAULT_ENV_FILE: &str = ".env";
pub const DEFAULT_CARGO: &str = "cargo";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Empty pattern would match every process")]
    EmptyPattern,
}

/// Contents of `reaprun.toml`. Relative paths are taken relative to the
/// file's own directory.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    patterns: Vec<String>,
    project_dir: Option<PathBuf>,
    env_file: Option<PathBuf>,
    cargo: Option<String>,
}

/// Where the environment comes from before the build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvFile {
    pub path: PathBuf,
    /// Explicitly configured files must exist; the default one may not.
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub patterns: Vec<String>,
    pub project_dir: PathBuf,
    pub env_file: EnvFile,
    pub cargo: String,
    pub skip_reap: bool,
}

impl Settings {
    /// Resolve settings against the current working directory.
    pub fn resolve(cli: &Cli) -> Result<Self, ConfigError> {
        Self::resolve_in(cli, Path::new("."))
    }

    /// Resolve settings, looking for the default config file in `cwd`.
    pub fn resolve_in(cli: &Cli, cwd: &Path) -> Result<Self, ConfigError> {
        let (file, file_dir) = match &cli.config {
            Some(path) => (load_file(path)?, parent_dir(path)),
            None => {
                let path = cwd.join(DEFAULT_CONFIG_FILE);
                if path.is_file() {
                    (load_file(&path)?, cwd.to_path_buf())
                } else {
                    tracing::debug!(path = %path.display(), "no config file");
                    (FileConfig::default(), cwd.to_path_buf())
                }
            }
        };

        let patterns = if cli.patterns.is_empty() {
            file.patterns
        } else {
            cli.patterns.clone()
        };
        if patterns.iter().any(|p| p.is_empty()) {
            return Err(ConfigError::EmptyPattern);
        }

        let project_dir = cli
            .project_dir
            .clone()
            .or_else(|| file.project_dir.map(|dir| file_dir.join(dir)))
            .unwrap_or_else(|| cwd.to_path_buf());

        let env_file = match (&cli.env_file, file.env_file) {
            (Some(path), _) => EnvFile {
                path: path.clone(),
                required: true,
            },
            (None, Some(path)) => EnvFile {
                path: file_dir.join(path),
                required: true,
            },
            (None, None) => EnvFile {
                path: project_dir.join(DEFAULT_ENV_FILE),
                required: false,
            },
        };

        Ok(Self {
            patterns,
            project_dir,
            env_file,
            cargo: file.cargo.unwrap_or_else(|| DEFAULT_CARGO.to_string()),
            skip_reap: cli.skip_reap,
        })
    }
}

fn load_file(path: &Path) -> Result<FileConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = toml::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "loaded config file");
    Ok(config)
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
