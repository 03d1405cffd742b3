use std::io;

use tracing::info;

use super::{pause, read_choice};
use crate::state::Session;
use crate::terminal::Terminal;
use crate::users::User;

pub fn menu(session: &mut Session, term: &mut dyn Terminal) -> io::Result<()> {
    let service = session.service.clone();

    loop {
        let patient = match session.user_mut() {
            Some(User::Patient(patient)) => patient,
            _ => return Ok(()),
        };

        term.clear();
        term.say("Patient Menu");
        term.say(&format!("Signed in as {}", patient.identity().email));
        term.say("1. Modify Profile");
        term.say("2. View Profile");
        term.say("3. Compute Life Expectancy");
        term.say("4. Logout");

        match read_choice(term)? {
            Some(1) => {
                let message = patient.modify_profile(term, service.as_ref())?;
                term.say(&message);
            }
            Some(2) => term.say(&patient.view_profile(service.as_ref())),
            Some(3) => {
                let message = patient.compute_life_expectancy(term, service.as_ref())?;
                term.say(&message);
            }
            Some(4) => {
                session.logout();
                info!("patient logged out");
                return Ok(());
            }
            _ => term.say("Invalid choice, please try again."),
        }
        pause(term)?;
    }
}
