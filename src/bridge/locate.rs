use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;
use walkdir::WalkDir;

use crate::config::ServiceConfig;

/// Resolved launch target for the records service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceLocation {
    program: PathBuf,
    leading_args: Vec<OsString>,
    service_path: PathBuf,
}

impl ServiceLocation {
    /// With an interpreter the service path becomes its first argument,
    /// otherwise the service is executed directly.
    pub fn new(service_path: PathBuf, interpreter: Option<PathBuf>) -> Self {
        match interpreter {
            Some(program) => Self {
                program,
                leading_args: vec![service_path.clone().into_os_string()],
                service_path,
            },
            None => Self {
                program: service_path.clone(),
                leading_args: Vec::new(),
                service_path,
            },
        }
    }

    /// Resolves the configured path, or searches for the service by name.
    pub fn resolve(cfg: &ServiceConfig) -> io::Result<Option<Self>> {
        let found = match &cfg.path {
            Some(path) if path.is_file() => Some(path.canonicalize()?),
            Some(path) => {
                debug!(path = %path.display(), "configured records service path is not a file");
                None
            }
            None => find_executable(&cfg.search_root, &cfg.name)?,
        };
        Ok(found.map(|p| Self::new(p, cfg.interpreter.clone())))
    }

    pub fn service_path(&self) -> &Path {
        &self.service_path
    }

    pub(crate) fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.leading_args);
        cmd
    }
}

/// Depth-first search for a file called `name` below `root`.
///
/// Entries are visited in file-name order so the first match is stable across
/// runs. Entries that cannot be read are skipped and symlinked directories
/// are not followed.
pub fn find_executable(root: &Path, name: &str) -> io::Result<Option<PathBuf>> {
    let found = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!(error = %e, "skipping unreadable entry");
                None
            }
        })
        .find(|entry| entry.file_type().is_file() && entry.file_name() == name);

    match found {
        Some(entry) => Ok(Some(entry.path().canonicalize()?)),
        None => Ok(None),
    }
}
