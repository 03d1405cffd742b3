//! Interactive menus: the session controller.

mod admin;
mod login;
mod patient;

use std::io;

use tracing::info;

use crate::state::Session;
use crate::terminal::Terminal;
use crate::users::{Registration, RegistrationOutcome, User};

/// Main menu loop. Returns when the user exits; terminal errors propagate.
pub fn run(session: &mut Session, term: &mut dyn Terminal) -> io::Result<()> {
    loop {
        term.clear();
        term.say("Welcome to the Health Management System");
        term.say("1. Log in");
        term.say("2. Complete Registration");
        term.say("3. Exit");

        match read_choice(term)? {
            Some(1) => {
                if login::login(session, term)? {
                    match session.user() {
                        Some(User::Admin(_)) => admin::menu(session, term)?,
                        Some(User::Patient(_)) => patient::menu(session, term)?,
                        None => {}
                    }
                }
            }
            Some(2) => register(session, term)?,
            Some(3) => {
                term.say("Exiting...");
                return Ok(());
            }
            _ => {
                term.say("Invalid choice, please try again.");
                pause(term)?;
            }
        }
    }
}

fn register(session: &mut Session, term: &mut dyn Terminal) -> io::Result<()> {
    term.clear();
    let outcome = Registration::new(term, session.service.as_ref()).run()?;
    if let RegistrationOutcome::Submitted { patient, .. } = &outcome {
        info!(uuid = %patient.uuid(), "registration workflow finished");
    }
    term.say(outcome.message());
    pause(term)
}

fn read_choice(term: &mut dyn Terminal) -> io::Result<Option<u32>> {
    Ok(term.prompt("Choose an option: ")?.trim().parse().ok())
}

fn pause(term: &mut dyn Terminal) -> io::Result<()> {
    term.prompt("Press Enter to continue...")?;
    Ok(())
}
