use std::io;

use tracing::info;

use super::{pause, read_choice};
use crate::state::Session;
use crate::terminal::Terminal;
use crate::users::{AdminError, User, UserRole};

pub fn menu(session: &mut Session, term: &mut dyn Terminal) -> io::Result<()> {
    let admin = match session.user() {
        Some(User::Admin(admin)) => admin.clone(),
        _ => return Ok(()),
    };
    let service = session.service.clone();
    let export_path = session.config.export_path.clone();

    loop {
        term.clear();
        term.say("Admin Menu");
        term.say(&format!("Signed in as {}", admin.identity().email));
        term.say("1. Delete Users");
        term.say("2. Export User Data");
        term.say("3. Aggregate User Data");
        term.say("4. Initiate Registration");
        term.say("5. Get All Users");
        term.say("6. Logout");

        match read_choice(term)? {
            Some(1) => say_result(term, admin.delete_users()),
            Some(2) => term.say(&admin.export_user_data(service.as_ref(), &export_path)),
            Some(3) => say_result(term, admin.aggregate_user_data()),
            Some(4) => {
                term.clear();
                let role = choose_role(term)?;
                let message = admin.initiate_registration(term, service.as_ref(), role)?;
                term.say(&message);
            }
            Some(5) => say_result(term, admin.get_all_users()),
            Some(6) => {
                session.logout();
                info!("admin logged out");
                return Ok(());
            }
            _ => term.say("Invalid choice, please try again."),
        }
        pause(term)?;
    }
}

fn say_result(term: &mut dyn Terminal, result: Result<String, AdminError>) {
    match result {
        Ok(message) => term.say(&message),
        Err(e) => term.say(&e.to_string()),
    }
}

fn choose_role(term: &mut dyn Terminal) -> io::Result<UserRole> {
    term.say("Register which kind of user?");
    term.say("1. Patient");
    term.say("2. Admin");
    loop {
        match read_choice(term)? {
            Some(1) => return Ok(UserRole::Patient),
            Some(2) => return Ok(UserRole::Admin),
            _ => term.say("Please choose 1 or 2."),
        }
    }
}
