use std::process::Stdio;

use tracing::{debug, error, info, warn};

use super::{BridgeError, Command, RecordsService, ServiceLocation, ServiceReply};
use crate::config::ServiceConfig;

/// Runs the records service as a child process, one command per process.
#[derive(Debug, Clone)]
pub struct ScriptBridge {
    location: Option<ServiceLocation>,
}

impl ScriptBridge {
    pub fn new(location: Option<ServiceLocation>) -> Self {
        Self { location }
    }

    /// Resolves the service once; a miss is logged here and reported by every call.
    pub fn from_config(cfg: &ServiceConfig) -> Self {
        let location = match ServiceLocation::resolve(cfg) {
            Ok(Some(location)) => {
                info!(path = %location.service_path().display(), "records service located");
                Some(location)
            }
            Ok(None) => {
                warn!(name = %cfg.name, root = %cfg.search_root.display(), "records service not found");
                None
            }
            Err(e) => {
                warn!(error = %e, name = %cfg.name, "records service lookup failed");
                None
            }
        };
        Self::new(location)
    }

    pub fn is_available(&self) -> bool {
        self.location.is_some()
    }
}

impl RecordsService for ScriptBridge {
    fn call(&self, command: &Command) -> Result<ServiceReply, BridgeError> {
        let location = self.location.as_ref().ok_or(BridgeError::ScriptNotFound)?;
        let keyword = command.keyword();

        // output() drains both pipes and reaps the child on every path.
        let output = location
            .command()
            .arg(keyword)
            .args(command.args())
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                error!(error = %e, command = keyword, "records service failed to run");
                BridgeError::Io(e)
            })?;

        let reply = ServiceReply::from_output(&output);
        if !reply.success() {
            warn!(command = keyword, exit_code = ?reply.exit_code, "records service exited with failure");
        }
        for line in &reply.stderr {
            debug!(command = keyword, stderr = %line, "records service diagnostic");
        }
        debug!(command = keyword, bytes = reply.stdout.len(), "records service replied");
        Ok(reply)
    }
}
