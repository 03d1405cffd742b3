use std::io;

use thiserror::Error;
use time::Date;
use tracing::{error, info, instrument, warn};

use super::validation::{format_date, is_valid_name, parse_bool, parse_date};
use super::{Identity, UserRole};
use crate::bridge::{BridgeError, Command, ProfileFields, RecordsService};
use crate::terminal::Terminal;

/// Cross-field violations of a patient's clinical record.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProfileError {
    #[error("date of infection is required for an HIV positive patient")]
    MissingInfectionDate,
    #[error("date of infection given for a patient who is not HIV positive")]
    UnexpectedInfectionDate,
    #[error("date of infection should be after the date of birth")]
    InfectionBeforeBirth,
    #[error("start ART date is required for a patient on ART drugs")]
    MissingArtStartDate,
    #[error("start ART date given for a patient who is not on ART drugs")]
    UnexpectedArtStartDate,
    #[error("start ART date should be after the date of infection")]
    ArtBeforeInfection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HealthProfile {
    pub date_of_birth: Option<Date>,
    pub is_hiv_positive: bool,
    pub date_of_infection: Option<Date>,
    pub on_art_drugs: bool,
    pub start_art_date: Option<Date>,
    pub country: String,
    pub demise_date: Option<Date>,
}

impl HealthProfile {
    /// Checks presence and ordering of the conditional dates. Comparisons
    /// against an unknown date of birth are skipped.
    pub fn validate(&self) -> Result<(), ProfileError> {
        match (self.is_hiv_positive, self.date_of_infection) {
            (true, None) => return Err(ProfileError::MissingInfectionDate),
            (false, Some(_)) => return Err(ProfileError::UnexpectedInfectionDate),
            (true, Some(doi)) => {
                if let Some(dob) = self.date_of_birth {
                    check_infection_date(dob, doi)?;
                }
            }
            (false, None) => {}
        }
        match (self.on_art_drugs, self.start_art_date) {
            (true, None) => Err(ProfileError::MissingArtStartDate),
            (false, Some(_)) => Err(ProfileError::UnexpectedArtStartDate),
            (true, Some(art)) => check_art_start(self.art_baseline(), art),
            (false, None) => Ok(()),
        }
    }

    /// Drops conditional dates whose flag is off.
    pub fn normalized(mut self) -> Self {
        if !self.is_hiv_positive {
            self.date_of_infection = None;
        }
        if !self.on_art_drugs {
            self.start_art_date = None;
        }
        self
    }

    /// Earliest allowed ART start: the infection date, else the birth date.
    pub fn art_baseline(&self) -> Option<Date> {
        self.date_of_infection.or(self.date_of_birth)
    }
}

pub fn check_infection_date(date_of_birth: Date, date_of_infection: Date) -> Result<(), ProfileError> {
    if date_of_infection < date_of_birth {
        return Err(ProfileError::InfectionBeforeBirth);
    }
    Ok(())
}

pub fn check_art_start(baseline: Option<Date>, start_art_date: Date) -> Result<(), ProfileError> {
    match baseline {
        Some(earliest) if start_art_date < earliest => Err(ProfileError::ArtBeforeInfection),
        _ => Ok(()),
    }
}

/// Asks the service whether `country` has a life-expectancy entry.
pub fn country_is_known(service: &dyn RecordsService, country: &str) -> Result<bool, BridgeError> {
    let reply = service.call(&Command::GetLifeExpectancy {
        country: country.to_string(),
    })?;
    let body = reply.body().trim();
    Ok(reply.success() && !body.is_empty() && !body.starts_with("Invalid"))
}

#[derive(Debug, Clone)]
pub struct Patient {
    uuid: String,
    identity: Identity,
    health: HealthProfile,
    /// False until the full record is known locally; a login only yields the uuid.
    record_loaded: bool,
}

impl Patient {
    pub const ROLE: UserRole = UserRole::Patient;

    pub fn new(uuid: impl Into<String>, identity: Identity, health: HealthProfile) -> Self {
        Self {
            uuid: uuid.into(),
            identity,
            health,
            record_loaded: true,
        }
    }

    /// Patient known only by token and login identity.
    pub fn with_uuid(uuid: impl Into<String>, identity: Identity) -> Self {
        Self {
            record_loaded: false,
            ..Self::new(uuid, identity, HealthProfile::default())
        }
    }

    pub fn role(&self) -> UserRole {
        Self::ROLE
    }

    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    #[cfg(test)]
    pub fn health(&self) -> &HealthProfile {
        &self.health
    }

    pub fn profile_fields(&self) -> ProfileFields {
        ProfileFields {
            uuid: self.uuid.clone(),
            first_name: self.identity.first_name.clone(),
            last_name: self.identity.last_name.clone(),
            date_of_birth: format_date(self.health.date_of_birth),
            is_hiv_positive: self.health.is_hiv_positive.to_string(),
            date_of_infection: format_date(self.health.date_of_infection),
            on_art_drugs: self.health.on_art_drugs.to_string(),
            start_art_date: format_date(self.health.start_art_date),
            country: self.health.country.clone(),
        }
    }

    /// Sends the full record with `complete-registration`; the reply text is returned as is.
    #[instrument(skip_all, fields(uuid = %self.uuid))]
    pub fn complete_registration(&self, service: &dyn RecordsService) -> String {
        let command = Command::CompleteRegistration {
            profile: self.profile_fields(),
            password: self.identity.password.clone(),
        };
        match service.call(&command) {
            Ok(reply) => {
                info!(success = reply.success(), "registration submitted");
                reply.display_text()
            }
            Err(e) => {
                error!(error = %e, "complete-registration failed");
                e.user_message("Error completing registration.")
            }
        }
    }

    #[instrument(skip_all, fields(uuid = %self.uuid))]
    pub fn view_profile(&self, service: &dyn RecordsService) -> String {
        match service.call(&Command::ViewProfile {
            uuid: self.uuid.clone(),
        }) {
            Ok(reply) => reply.display_text(),
            Err(e) => {
                warn!(error = %e, "view-profile failed");
                e.user_message("Error retrieving profile.")
            }
        }
    }

    /// Interactive edit of every field, then a full-record overwrite.
    ///
    /// Empty answers keep the current value. Answers that fail validation are
    /// not applied and print as "Not changed". When the record was never
    /// loaded there is nothing to keep, so every field that applies must be
    /// answered. The result must still satisfy [`HealthProfile::validate`] or
    /// nothing is sent.
    #[instrument(skip_all, fields(uuid = %self.uuid))]
    pub fn modify_profile(
        &mut self,
        term: &mut dyn Terminal,
        service: &dyn RecordsService,
    ) -> io::Result<String> {
        let current = match service.call(&Command::ViewProfile {
            uuid: self.uuid.clone(),
        }) {
            Ok(reply) => reply.display_text(),
            Err(e) => {
                warn!(error = %e, "view-profile failed");
                return Ok(e.user_message("Error retrieving profile."));
            }
        };
        term.say("Current Profile Information:");
        term.say(&current);

        let unknown = !self.record_loaded;
        if unknown {
            term.say("Stored values are not available in this session. Please answer every field.");
        }

        let first_name = required(term, unknown, |t| {
            edit_name(t, "Enter new first name (or press Enter to keep current): ")
        })?;
        let last_name = required(term, unknown, |t| {
            edit_name(t, "Enter new last name (or press Enter to keep current): ")
        })?;
        let dob = required(term, unknown, |t| {
            edit_date(t, "Enter new date of birth (yyyy-MM-dd) or press Enter to keep current: ")
        })?;
        let hiv = required(term, unknown, |t| {
            edit_bool(t, "Is HIV Positive (true/false) or press Enter to keep current: ")
        })?;
        let hiv_now = hiv.apply(&self.health.is_hiv_positive);
        let doi = required(term, unknown && hiv_now, |t| {
            edit_date(t, "Enter new date of infection (yyyy-MM-dd) or press Enter to keep current: ")
        })?;
        let art = required(term, unknown, |t| {
            edit_bool(t, "On ART Drugs (true/false) or press Enter to keep current: ")
        })?;
        let art_now = art.apply(&self.health.on_art_drugs);
        let art_start = required(term, unknown && art_now, |t| {
            edit_date(t, "Enter new start ART date (yyyy-MM-dd) or press Enter to keep current: ")
        })?;
        let country = required(term, unknown, |t| edit_country(t, service))?;

        let identity = Identity {
            first_name: first_name.apply(&self.identity.first_name),
            last_name: last_name.apply(&self.identity.last_name),
            ..self.identity.clone()
        };
        let health = HealthProfile {
            date_of_birth: dob.apply_optional(self.health.date_of_birth),
            is_hiv_positive: hiv.apply(&self.health.is_hiv_positive),
            date_of_infection: doi.apply_optional(self.health.date_of_infection),
            on_art_drugs: art.apply(&self.health.on_art_drugs),
            start_art_date: art_start.apply_optional(self.health.start_art_date),
            country: country.apply(&self.health.country),
            demise_date: self.health.demise_date,
        }
        .normalized();

        term.say("New User Information:");
        term.say(&format!("First Name: {}", identity.first_name));
        term.say(&format!("Last Name: {}", identity.last_name));
        term.say(&format!("Date of Birth: {}", describe_date(&dob, health.date_of_birth)));
        term.say(&format!("Is HIV Positive: {}", health.is_hiv_positive));
        term.say(&format!(
            "Date of Infection: {}",
            describe_date(&doi, health.date_of_infection)
        ));
        term.say(&format!("On ART Drugs: {}", health.on_art_drugs));
        term.say(&format!(
            "Start ART Date: {}",
            describe_date(&art_start, health.start_art_date)
        ));
        term.say(&format!("Country: {}", health.country));

        if let Err(e) = health.validate() {
            warn!(error = %e, "edited profile rejected");
            return Ok(format!("Profile not updated: {e}."));
        }

        let updated = Patient::new(self.uuid.clone(), identity, health);
        let reply = match service.call(&Command::ModifyPatientProfile {
            profile: updated.profile_fields(),
        }) {
            Ok(reply) => reply,
            Err(e) => {
                error!(error = %e, "modify-patient-profile failed");
                return Ok(e.user_message("Error updating profile."));
            }
        };

        if !reply.success() {
            return Ok(reply.display_text());
        }
        *self = updated;
        info!("profile updated");
        if reply.body().is_empty() {
            Ok("Profile updated successfully.".to_string())
        } else {
            Ok(reply.display_text())
        }
    }

    /// Looks up life expectancy for a country, defaulting to the patient's own.
    pub fn compute_life_expectancy(
        &self,
        term: &mut dyn Terminal,
        service: &dyn RecordsService,
    ) -> io::Result<String> {
        let prompt = if self.health.country.is_empty() {
            "Country (Alpha-3 code): ".to_string()
        } else {
            format!("Country (Alpha-3 code) or press Enter for {}: ", self.health.country)
        };
        let answer = term.prompt(&prompt)?;
        let country = match answer.trim() {
            "" => self.health.country.clone(),
            code => code.to_string(),
        };
        if country.is_empty() {
            return Ok("Country cannot be empty.".to_string());
        }

        match service.call(&Command::GetLifeExpectancy {
            country: country.clone(),
        }) {
            Ok(reply) if reply.success() && !reply.body().starts_with("Invalid") => {
                Ok(format!("Life expectancy for {country}: {}", reply.display_text()))
            }
            Ok(reply) => Ok(reply.display_text()),
            Err(e) => Ok(e.user_message("Error retrieving life expectancy.")),
        }
    }
}

/// Outcome of one "press Enter to keep" prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Edit<T> {
    Keep,
    Set(T),
    Rejected,
}

impl<T: Clone> Edit<T> {
    fn apply(&self, current: &T) -> T {
        match self {
            Edit::Set(v) => v.clone(),
            Edit::Keep | Edit::Rejected => current.clone(),
        }
    }

    fn apply_optional(&self, current: Option<T>) -> Option<T> {
        match self {
            Edit::Set(v) => Some(v.clone()),
            Edit::Keep | Edit::Rejected => current,
        }
    }
}

/// Repeats `edit` until it yields a value when `needed` is set.
fn required<T, F>(term: &mut dyn Terminal, needed: bool, mut edit: F) -> io::Result<Edit<T>>
where
    F: FnMut(&mut dyn Terminal) -> io::Result<Edit<T>>,
{
    loop {
        let answer = edit(term)?;
        if !needed || matches!(answer, Edit::Set(_)) {
            return Ok(answer);
        }
        term.say("No current value on record. Please enter a value.");
    }
}

fn describe_date(edit: &Edit<Date>, effective: Option<Date>) -> String {
    match (edit, effective) {
        (Edit::Rejected, _) | (_, None) => "Not changed".to_string(),
        (_, Some(d)) => format_date(Some(d)),
    }
}

fn edit_name(term: &mut dyn Terminal, prompt: &str) -> io::Result<Edit<String>> {
    let answer = term.prompt(prompt)?;
    let answer = answer.trim();
    if answer.is_empty() {
        return Ok(Edit::Keep);
    }
    if !is_valid_name(answer) {
        term.say("Invalid input. Name should only contain letters. Keeping current value.");
        return Ok(Edit::Rejected);
    }
    Ok(Edit::Set(answer.to_string()))
}

fn edit_date(term: &mut dyn Terminal, prompt: &str) -> io::Result<Edit<Date>> {
    let answer = term.prompt(prompt)?;
    if answer.trim().is_empty() {
        return Ok(Edit::Keep);
    }
    match parse_date(&answer) {
        Some(d) => Ok(Edit::Set(d)),
        None => {
            term.say("Invalid date format. Please enter date in yyyy-MM-dd format.");
            Ok(Edit::Rejected)
        }
    }
}

fn edit_bool(term: &mut dyn Terminal, prompt: &str) -> io::Result<Edit<bool>> {
    let answer = term.prompt(prompt)?;
    if answer.trim().is_empty() {
        return Ok(Edit::Keep);
    }
    match parse_bool(&answer) {
        Some(b) => Ok(Edit::Set(b)),
        None => {
            term.say("Invalid input. Expected true or false. Keeping current value.");
            Ok(Edit::Rejected)
        }
    }
}

fn edit_country(term: &mut dyn Terminal, service: &dyn RecordsService) -> io::Result<Edit<String>> {
    let answer = term.prompt("Enter new country or press Enter to keep current: ")?;
    let code = answer.trim();
    if code.is_empty() {
        return Ok(Edit::Keep);
    }
    match country_is_known(service, code) {
        Ok(true) => Ok(Edit::Set(code.to_string())),
        Ok(false) => {
            term.say("Invalid country code. Keeping current value.");
            Ok(Edit::Rejected)
        }
        Err(e) => {
            warn!(error = %e, "country lookup failed");
            term.say("Country could not be verified. Keeping current value.");
            Ok(Edit::Rejected)
        }
    }
}
