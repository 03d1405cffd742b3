use std::io;

use tracing::{info, warn};

use super::pause;
use crate::bridge::ServiceReply;
use crate::state::Session;
use crate::terminal::Terminal;
use crate::users::{Admin, Identity, Patient, User, UserRole};

/// How the service classified a login attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Admin,
    Patient { uuid: String },
    Denied(String),
}

impl LoginOutcome {
    /// `ADMIN`, `PATIENT,<uuid>`, anything else is shown to the user as is.
    pub fn from_reply(reply: &ServiceReply) -> Self {
        let body = reply.body().trim();
        if body.starts_with(UserRole::Admin.as_str()) {
            return LoginOutcome::Admin;
        }
        if let Some(rest) = body.strip_prefix(UserRole::Patient.as_str()) {
            let uuid = rest
                .strip_prefix(',')
                .and_then(|r| r.split(',').next())
                .map(str::trim)
                .unwrap_or_default();
            if uuid.is_empty() {
                return LoginOutcome::Denied("Login response did not include a patient id.".into());
            }
            return LoginOutcome::Patient {
                uuid: uuid.to_string(),
            };
        }
        LoginOutcome::Denied(reply.display_text())
    }
}

/// Prompts for credentials and signs the session in. Returns whether it did.
pub fn login(session: &mut Session, term: &mut dyn Terminal) -> io::Result<bool> {
    term.clear();
    term.say("Log in to the Health Management System");
    let email = term.prompt("Email: ")?.trim().to_string();
    let password = term.prompt_secret("Password: ")?;

    let reply = match Identity::new("", "", email.clone(), password).login(session.service.as_ref()) {
        Ok(reply) => reply,
        Err(e) => {
            warn!(error = %e, "login call failed");
            term.say(&e.user_message("System error, please contact the administrator"));
            pause(term)?;
            return Ok(false);
        }
    };

    let user = match LoginOutcome::from_reply(&reply) {
        LoginOutcome::Admin => User::Admin(Admin::new(Identity::with_email(email))),
        LoginOutcome::Patient { uuid } => {
            User::Patient(Patient::with_uuid(uuid, Identity::with_email(email)))
        }
        LoginOutcome::Denied(message) => {
            info!("login denied");
            term.say(&message);
            pause(term)?;
            return Ok(false);
        }
    };
    info!(role = %user.role(), "user signed in");
    session.sign_in(user);
    Ok(true)
}
