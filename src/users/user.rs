use std::fmt;

use tracing::{debug, instrument};

use super::{Admin, Patient, UserRole};
use crate::bridge::{BridgeError, Command, RecordsService, ServiceReply};

/// Name, email and password shared by every role.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Identity {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

impl Identity {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    /// Identity known right after login: only the email.
    pub fn with_email(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ..Self::default()
        }
    }

    /// Sends `login` with these credentials and returns the raw reply.
    ///
    /// This is the login shared by every role: the role is only known from the
    /// reply, so the caller builds the matching [`User`] afterwards.
    #[instrument(skip_all)]
    pub fn login(&self, service: &dyn RecordsService) -> Result<ServiceReply, BridgeError> {
        let reply = service.call(&Command::Login {
            email: self.email.clone(),
            password: self.password.clone(),
        })?;
        debug!(success = reply.success(), "login reply received");
        Ok(reply)
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A signed-in user. The role set is closed.
#[derive(Debug, Clone)]
pub enum User {
    Admin(Admin),
    Patient(Patient),
}

impl User {
    pub fn role(&self) -> UserRole {
        match self {
            User::Admin(a) => a.role(),
            User::Patient(p) => p.role(),
        }
    }
}
