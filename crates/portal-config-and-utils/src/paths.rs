//! File system paths for the portal.

use crate::{CoreError, CoreResult};
use std::path::{Path, PathBuf};

/// Base directory name under the home directory.
const BASE_DIR_NAME: &str = observability::BASE_DIR_NAME;

/// Resolves where the portal keeps its config and logs.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Base directory (~/.registry-portal)
    base_dir: PathBuf,
}

impl Paths {
    /// Uses `~/.registry-portal`.
    pub fn new() -> CoreResult<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| CoreError::Path("Could not determine home directory".to_string()))?;

        Ok(Self {
            base_dir: home.join(BASE_DIR_NAME),
        })
    }

    /// Uses a custom base directory.
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Uses `base_dir` when given, otherwise the home default.
    pub fn resolve(base_dir: Option<PathBuf>) -> CoreResult<Self> {
        match base_dir {
            Some(dir) => Ok(Self::with_base_dir(dir)),
            None => Self::new(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Config file (~/.registry-portal/config.json).
    pub fn config_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Logs directory (~/.registry-portal/logs).
    pub fn logs_dir(&self) -> PathBuf {
        self.base_dir.join("logs")
    }

    /// Central JSONL log (~/.registry-portal/logs/dev.jsonl).
    pub fn log_file(&self) -> PathBuf {
        self.logs_dir().join("dev.jsonl")
    }

    /// Ensure all required directories exist.
    pub fn ensure_dirs(&self) -> CoreResult<()> {
        std::fs::create_dir_all(&self.base_dir)?;
        std::fs::create_dir_all(self.logs_dir())?;
        Ok(())
    }
}
