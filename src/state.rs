use std::sync::Arc;

use crate::bridge::RecordsService;
use crate::config::AppConfig;
use crate::users::User;

/// Everything a workflow needs, passed explicitly instead of held in globals.
pub struct Session {
    pub config: Arc<AppConfig>,
    pub service: Arc<dyn RecordsService>,
    user: Option<User>,
}

impl Session {
    pub fn from_parts(config: Arc<AppConfig>, service: Arc<dyn RecordsService>) -> Self {
        Self {
            config,
            service,
            user: None,
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn user_mut(&mut self) -> Option<&mut User> {
        self.user.as_mut()
    }

    pub fn sign_in(&mut self, user: User) {
        self.user = Some(user);
    }

    pub fn logout(&mut self) -> Option<User> {
        self.user.take()
    }

    #[cfg(test)]
    pub fn fake(service: Arc<dyn RecordsService>) -> Self {
        use crate::config::ServiceConfig;
        use std::path::PathBuf;

        let config = Arc::new(AppConfig {
            service: ServiceConfig {
                path: None,
                name: "user-manager.sh".into(),
                search_root: PathBuf::from("."),
                interpreter: None,
            },
            export_path: std::env::temp_dir().join("clinic-console-test-export.csv"),
        });
        Self::from_parts(config, service)
    }
}
