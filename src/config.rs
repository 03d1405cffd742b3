use std::path::PathBuf;

use anyhow::Context;
use serde::Deserialize;

pub const DEFAULT_SERVICE_NAME: &str = "user-manager.sh";
pub const DEFAULT_EXPORT_FILE: &str = "user_data.csv";

/// Where the records service lives and how it is launched.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub path: Option<PathBuf>,
    pub name: String,
    pub search_root: PathBuf,
    pub interpreter: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub service: ServiceConfig,
    pub export_path: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let service = ServiceConfig {
            path: get("RECORDS_SERVICE_PATH").map(PathBuf::from),
            name: get("RECORDS_SERVICE_NAME").unwrap_or_else(|| DEFAULT_SERVICE_NAME.into()),
            search_root: get("RECORDS_SERVICE_SEARCH_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            interpreter: get("RECORDS_SERVICE_INTERPRETER").map(PathBuf::from),
        };

        let export = PathBuf::from(get("EXPORT_PATH").unwrap_or_else(|| DEFAULT_EXPORT_FILE.into()));
        let export_path = if export.is_absolute() {
            export
        } else {
            std::env::current_dir()
                .context("resolve current directory for export path")?
                .join(export)
        };

        Ok(Self {
            service,
            export_path,
        })
    }
}
