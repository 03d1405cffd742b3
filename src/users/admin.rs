use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use thiserror::Error;
use tracing::{error, info, instrument, warn};

use super::{Identity, UserRole};
use crate::bridge::{Command, RecordsService, ServiceReply};
use crate::terminal::Terminal;

pub const EXPORT_HEADER: &str = "UUID,Email,FirstName,LastName,DateOfBirth,IsHivPositive,DateOfInfection,OnARTDrugs,StartARTDate,Country,LifeExpectancy";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AdminError {
    #[error("{0} is not available yet.")]
    NotAvailable(&'static str),
}

#[derive(Debug, Clone)]
pub struct Admin {
    identity: Identity,
}

impl Admin {
    pub const ROLE: UserRole = UserRole::Admin;

    pub fn new(identity: Identity) -> Self {
        Self { identity }
    }

    pub fn role(&self) -> UserRole {
        Self::ROLE
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Writes every row from `get-all-users` under the fixed header at `path`.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn export_user_data(&self, service: &dyn RecordsService, path: &Path) -> String {
        let reply = match service.call(&Command::GetAllUsers) {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "get-all-users failed");
                return e.user_message("Error exporting user data.");
            }
        };

        let rows = match write_export(path, reply.body()) {
            Ok(rows) => rows,
            Err(e) => {
                error!(error = %e, "writing export failed");
                return format!("Could not write {}: {e}", path.display());
            }
        };
        info!(rows, "user data exported");

        let mut message = format!("User data exported successfully to {}", path.display());
        let diagnostics = ServiceReply {
            stdout: String::new(),
            ..reply
        }
        .display_text();
        if !diagnostics.is_empty() {
            message.push('\n');
            message.push_str(&diagnostics);
        }
        message
    }

    /// Asks for an email and relays `initiate-registration` for `role`.
    #[instrument(skip_all, fields(role = %role))]
    pub fn initiate_registration(
        &self,
        term: &mut dyn Terminal,
        service: &dyn RecordsService,
        role: UserRole,
    ) -> io::Result<String> {
        term.say("Initiate Registration");
        let mut email = term.prompt("Enter Email: ")?.trim().to_string();
        while email.is_empty() {
            email = term
                .prompt("Email cannot be empty. Please enter again: ")?
                .trim()
                .to_string();
        }

        match service.call(&Command::InitiateRegistration { role, email }) {
            Ok(reply) => Ok(reply.display_text()),
            Err(e) => {
                warn!(error = %e, "initiate-registration failed");
                Ok(e.user_message("Error initiating registration."))
            }
        }
    }

    pub fn delete_users(&self) -> Result<String, AdminError> {
        Err(AdminError::NotAvailable("Deleting users"))
    }

    pub fn aggregate_user_data(&self) -> Result<String, AdminError> {
        Err(AdminError::NotAvailable("Aggregating user data"))
    }

    pub fn get_all_users(&self) -> Result<String, AdminError> {
        Err(AdminError::NotAvailable("Listing all users"))
    }
}

fn write_export(path: &Path, rows: &str) -> io::Result<usize> {
    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "{EXPORT_HEADER}")?;
    let mut count = 0;
    for row in rows.lines() {
        writeln!(out, "{row}")?;
        count += 1;
    }
    out.flush()?;
    Ok(count)
}
