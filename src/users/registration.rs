//! Guided patient registration.
//!
//! Steps run strictly in order and never go back:
//!
//! ```text
//! CollectUuid -> ValidateUuid -> CollectName -> CollectPassword -> CollectDob
//!   -> CollectHivStatus -> [CollectInfectionDate] -> CollectArtStatus
//!   -> [CollectArtStartDate] -> CollectCountry -> Submit -> Done
//! ```
//!
//! Invalid input re-prompts on the same step. A rejected UUID or an
//! unreachable service ends the workflow early.

use std::io;

use time::Date;
use tracing::{debug, info, warn};

use super::patient::{check_art_start, check_infection_date, country_is_known, HealthProfile, Patient};
use super::validation::{is_valid_name, parse_bool, parse_date};
use super::Identity;
use crate::bridge::{Command, RecordsService};
use crate::terminal::Terminal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    CollectUuid,
    ValidateUuid,
    CollectName,
    CollectPassword,
    CollectDob,
    CollectHivStatus,
    CollectInfectionDate,
    CollectArtStatus,
    CollectArtStartDate,
    CollectCountry,
    Submit,
    Done,
}

#[derive(Debug)]
pub enum RegistrationOutcome {
    /// The record was sent; `response` is the service's reply text.
    Submitted { patient: Patient, response: String },
    /// The service did not accept the UUID.
    Rejected(String),
    /// The service could not be reached.
    Unavailable(String),
}

impl RegistrationOutcome {
    pub fn message(&self) -> &str {
        match self {
            RegistrationOutcome::Submitted { response, .. } => response,
            RegistrationOutcome::Rejected(m) | RegistrationOutcome::Unavailable(m) => m,
        }
    }
}

#[derive(Debug, Default)]
struct Draft {
    uuid: String,
    email: String,
    first_name: String,
    last_name: String,
    password: String,
    date_of_birth: Option<Date>,
    is_hiv_positive: bool,
    date_of_infection: Option<Date>,
    on_art_drugs: bool,
    start_art_date: Option<Date>,
    country: String,
}

impl Draft {
    fn health(&self) -> HealthProfile {
        HealthProfile {
            date_of_birth: self.date_of_birth,
            is_hiv_positive: self.is_hiv_positive,
            date_of_infection: self.date_of_infection,
            on_art_drugs: self.on_art_drugs,
            start_art_date: self.start_art_date,
            country: self.country.clone(),
            demise_date: None,
        }
    }

    fn art_baseline(&self) -> Option<Date> {
        self.date_of_infection.or(self.date_of_birth)
    }
}

pub struct Registration<'a> {
    term: &'a mut dyn Terminal,
    service: &'a dyn RecordsService,
    step: Step,
    draft: Draft,
}

impl<'a> Registration<'a> {
    pub fn new(term: &'a mut dyn Terminal, service: &'a dyn RecordsService) -> Self {
        Self {
            term,
            service,
            step: Step::CollectUuid,
            draft: Draft::default(),
        }
    }

    #[cfg(test)]
    pub fn step(&self) -> Step {
        self.step
    }

    /// Drives the workflow to an outcome. Only terminal I/O errors escape.
    pub fn run(mut self) -> io::Result<RegistrationOutcome> {
        loop {
            if let Some(outcome) = self.advance()? {
                return Ok(outcome);
            }
        }
    }

    /// Executes the current step and moves to the next one.
    pub fn advance(&mut self) -> io::Result<Option<RegistrationOutcome>> {
        debug!(step = ?self.step, "registration step");
        let next = match self.step {
            Step::CollectUuid => {
                self.draft.uuid = self.collect_uuid()?;
                Step::ValidateUuid
            }
            Step::ValidateUuid => match self.validate_uuid() {
                Ok(email) => {
                    self.term
                        .say(&format!("Complete registration for user with email: {email}"));
                    self.draft.email = email;
                    Step::CollectName
                }
                Err(outcome) => {
                    self.step = Step::Done;
                    return Ok(Some(outcome));
                }
            },
            Step::CollectName => {
                self.draft.first_name = self.collect_name("First Name")?;
                self.draft.last_name = self.collect_name("Last Name")?;
                Step::CollectPassword
            }
            Step::CollectPassword => {
                self.draft.password = self.collect_password()?;
                Step::CollectDob
            }
            Step::CollectDob => {
                let dob = ask(
                    self.term,
                    "Date of Birth (yyyy-MM-dd): ",
                    |input| {
                        parse_date(input).ok_or_else(|| {
                            "Invalid date format. Please enter Date of Birth (yyyy-MM-dd): ".to_string()
                        })
                    },
                )?;
                self.draft.date_of_birth = Some(dob);
                Step::CollectHivStatus
            }
            Step::CollectHivStatus => {
                self.draft.is_hiv_positive = ask(self.term, "Is HIV Positive (true/false): ", |input| {
                    parse_bool(input).ok_or_else(|| {
                        "Invalid input. Please enter true or false for HIV Positive: ".to_string()
                    })
                })?;
                if self.draft.is_hiv_positive {
                    Step::CollectInfectionDate
                } else {
                    Step::CollectArtStatus
                }
            }
            Step::CollectInfectionDate => {
                let dob = self.draft.date_of_birth;
                let doi = ask(self.term, "Date of Infection (yyyy-MM-dd): ", |input| {
                    let date = parse_date(input).ok_or_else(|| {
                        "Invalid date format. Please enter Date of Infection (yyyy-MM-dd): ".to_string()
                    })?;
                    match dob {
                        Some(dob) if check_infection_date(dob, date).is_err() => Err(
                            "Invalid date. Date of infection should be after the date of birth: "
                                .to_string(),
                        ),
                        _ => Ok(date),
                    }
                })?;
                self.draft.date_of_infection = Some(doi);
                Step::CollectArtStatus
            }
            Step::CollectArtStatus => {
                self.draft.on_art_drugs = ask(self.term, "On ART Drugs (true/false): ", |input| {
                    parse_bool(input).ok_or_else(|| {
                        "Invalid input. Please enter true or false for On ART Drugs: ".to_string()
                    })
                })?;
                if self.draft.on_art_drugs {
                    Step::CollectArtStartDate
                } else {
                    Step::CollectCountry
                }
            }
            Step::CollectArtStartDate => {
                let baseline = self.draft.art_baseline();
                let reference = if self.draft.date_of_infection.is_some() {
                    "Date of infection"
                } else {
                    "Date of birth"
                };
                let start = ask(self.term, "Start ART Date (yyyy-MM-dd): ", |input| {
                    let date = parse_date(input).ok_or_else(|| {
                        "Invalid date format. Please enter Start ART Date (yyyy-MM-dd): ".to_string()
                    })?;
                    check_art_start(baseline, date).map_err(|_| {
                        format!("Invalid date. Start ART Date should be after the {reference}: ")
                    })?;
                    Ok(date)
                })?;
                self.draft.start_art_date = Some(start);
                Step::CollectCountry
            }
            Step::CollectCountry => match self.collect_country()? {
                Ok(country) => {
                    self.draft.country = country;
                    Step::Submit
                }
                Err(outcome) => {
                    self.step = Step::Done;
                    return Ok(Some(outcome));
                }
            },
            Step::Submit => {
                let outcome = self.submit();
                self.step = Step::Done;
                return Ok(Some(outcome));
            }
            Step::Done => {
                return Err(io::Error::new(
                    io::ErrorKind::Other,
                    "registration already finished",
                ))
            }
        };
        self.step = next;
        Ok(None)
    }

    fn collect_uuid(&mut self) -> io::Result<String> {
        ask(self.term, "Enter UUID Code: ", |input| {
            let uuid = input.trim();
            if uuid.is_empty() {
                Err("UUID Code cannot be empty. Please enter again: ".to_string())
            } else {
                Ok(uuid.to_string())
            }
        })
    }

    /// Returns the email tied to the UUID, or the outcome that ends the workflow.
    fn validate_uuid(&mut self) -> Result<String, RegistrationOutcome> {
        let reply = self
            .service
            .call(&Command::ValidateUuid {
                uuid: self.draft.uuid.clone(),
            })
            .map_err(|e| {
                warn!(error = %e, "validate-uuid failed");
                RegistrationOutcome::Unavailable(
                    e.user_message("System error, please contact the administrator"),
                )
            })?;

        let email = reply.body().trim();
        if !reply.success() || email.is_empty() || email.starts_with("Invalid") {
            info!("registration token rejected");
            let text = reply.display_text();
            return Err(RegistrationOutcome::Rejected(if text.is_empty() {
                "Invalid UUID code.".to_string()
            } else {
                text
            }));
        }
        Ok(email.to_string())
    }

    fn collect_name(&mut self, label: &str) -> io::Result<String> {
        ask(self.term, &format!("{label}: "), |input| {
            let name = input.trim();
            if name.is_empty() {
                Err(format!("{label} cannot be empty. Please enter again: "))
            } else if !is_valid_name(name) {
                Err("Invalid input. Name should only contain letters. Please enter again: ".to_string())
            } else {
                Ok(name.to_string())
            }
        })
    }

    fn collect_password(&mut self) -> io::Result<String> {
        let mut password = self.term.prompt_secret("Password: ")?;
        while password.is_empty() {
            password = self
                .term
                .prompt_secret("Password cannot be empty. Please enter again: ")?;
        }
        Ok(password)
    }

    /// Outer error is terminal I/O; inner error means the service is unreachable.
    fn collect_country(&mut self) -> io::Result<Result<String, RegistrationOutcome>> {
        let mut prompt = "Country: ".to_string();
        loop {
            let input = self.term.prompt(&prompt)?;
            let country = input.trim();
            if country.is_empty() {
                prompt = "Country cannot be empty. Please enter again: ".to_string();
                continue;
            }
            match country_is_known(self.service, country) {
                Ok(true) => return Ok(Ok(country.to_string())),
                Ok(false) => {
                    prompt = "Invalid country code. Please enter again using Alpha-3 code: ".to_string();
                }
                Err(e) => {
                    warn!(error = %e, "get-life-expectancy failed");
                    return Ok(Err(RegistrationOutcome::Unavailable(
                        e.user_message("System error, please contact the administrator"),
                    )));
                }
            }
        }
    }

    fn submit(&mut self) -> RegistrationOutcome {
        let draft = std::mem::take(&mut self.draft);
        let health = draft.health();
        debug_assert!(health.validate().is_ok());

        let identity = Identity::new(draft.first_name, draft.last_name, draft.email, draft.password);
        let patient = Patient::new(draft.uuid, identity, health);
        let response = patient.complete_registration(self.service);
        RegistrationOutcome::Submitted { patient, response }
    }
}

/// Prompts until `check` accepts; a rejection supplies the next prompt.
fn ask<T, F>(term: &mut dyn Terminal, first_prompt: &str, mut check: F) -> io::Result<T>
where
    F: FnMut(&str) -> Result<T, String>,
{
    let mut prompt = first_prompt.to_string();
    loop {
        let input = term.prompt(&prompt)?;
        match check(&input) {
            Ok(value) => return Ok(value),
            Err(next) => prompt = next,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::ScriptBridge;
    use crate::testing::{FakeService, ScriptedTerminal};
    use time::macros::date;

    fn service() -> FakeService {
        FakeService::new()
            .respond("validate-uuid", "patient@example.com")
            .respond("complete-registration", "Registration completed successfully.")
            .with_countries(&["USA", "KEN"])
    }

    fn run(inputs: &[&str], service: &dyn RecordsService) -> (RegistrationOutcome, ScriptedTerminal) {
        let mut term = ScriptedTerminal::new(inputs.iter().copied());
        let outcome = Registration::new(&mut term, service)
            .run()
            .expect("workflow should finish");
        (outcome, term)
    }

    #[test]
    fn full_registration_sends_ten_ordered_fields() {
        let service = service();
        let (outcome, term) = run(
            &[
                "ABC123", "Mary", "Jane", "pw", "1990-05-01", "true", "2010-01-01", "yes",
                "2011-06-15", "USA",
            ],
            &service,
        );

        assert_eq!(outcome.message(), "Registration completed successfully.");
        assert!(term
            .transcript()
            .contains("Complete registration for user with email: patient@example.com"));
        let keywords: Vec<String> = service.calls().into_iter().map(|(k, _)| k).collect();
        assert_eq!(
            keywords,
            vec!["validate-uuid", "get-life-expectancy", "complete-registration"]
        );
        assert_eq!(
            service.calls_to("complete-registration"),
            vec![vec![
                "ABC123".to_string(),
                "Mary".into(),
                "Jane".into(),
                "1990-05-01".into(),
                "true".into(),
                "2010-01-01".into(),
                "true".into(),
                "2011-06-15".into(),
                "USA".into(),
                "pw".into(),
            ]]
        );

        match outcome {
            RegistrationOutcome::Submitted { patient, .. } => {
                assert_eq!(patient.identity().email, "patient@example.com");
                assert_eq!(patient.health().start_art_date, Some(date!(2011 - 06 - 15)));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn negative_flags_skip_conditional_dates() {
        let service = service();
        let (outcome, term) = run(
            &["ABC123", "Mary", "Jane", "pw", "1990-05-01", "false", "no", "USA"],
            &service,
        );

        assert!(matches!(outcome, RegistrationOutcome::Submitted { .. }));
        assert!(!term.transcript().contains("Date of Infection"));
        assert!(!term.transcript().contains("Start ART Date"));
        let args = &service.calls_to("complete-registration")[0];
        assert_eq!(args[4], "false");
        assert_eq!(args[5], "");
        assert_eq!(args[6], "false");
        assert_eq!(args[7], "");
    }

    #[test]
    fn infection_before_birth_reprompts() {
        let service = service();
        let (outcome, term) = run(
            &[
                "ABC123", "Mary", "Jane", "pw", "1990-05-01", "true", "1980-01-01", "2010-01-01",
                "false", "USA",
            ],
            &service,
        );

        assert!(matches!(outcome, RegistrationOutcome::Submitted { .. }));
        assert_eq!(term.count("Date of infection should be after the date of birth"), 1);
        assert_eq!(service.calls_to("complete-registration")[0][5], "2010-01-01");
    }

    #[test]
    fn art_start_before_infection_reprompts() {
        let service = service();
        let (_, term) = run(
            &[
                "ABC123", "Mary", "Jane", "pw", "1990-05-01", "true", "2010-01-01", "true",
                "2009-12-31", "2010-01-01", "USA",
            ],
            &service,
        );

        assert_eq!(term.count("Start ART Date should be after the Date of infection"), 1);
        assert_eq!(service.calls_to("complete-registration")[0][7], "2010-01-01");
    }

    #[test]
    fn art_start_is_checked_against_birth_without_infection() {
        let service = service();
        let (_, term) = run(
            &[
                "ABC123", "Mary", "Jane", "pw", "1990-05-01", "false", "true", "1989-01-01",
                "1995-01-01", "USA",
            ],
            &service,
        );
        assert_eq!(term.count("Start ART Date should be after the Date of birth"), 1);
        assert_eq!(service.calls_to("complete-registration")[0][7], "1995-01-01");
    }

    #[test]
    fn format_errors_have_their_own_message() {
        let service = service();
        let (_, term) = run(
            &[
                "ABC123", "Mary", "Jane", "pw", "2020-02-30", "20-01-01", "2020-02-29", "maybe",
                "true", "not-a-date", "2021-01-01", "false", "USA",
            ],
            &service,
        );

        assert_eq!(term.count("Invalid date format. Please enter Date of Birth"), 2);
        assert_eq!(term.count("Invalid input. Please enter true or false for HIV Positive"), 1);
        assert_eq!(term.count("Invalid date format. Please enter Date of Infection"), 1);
        assert_eq!(term.count("should be after"), 0);
        assert_eq!(service.calls_to("complete-registration")[0][3], "2020-02-29");
    }

    #[test]
    fn names_are_reprompted_until_valid() {
        let service = service();
        let (_, term) = run(
            &[
                "ABC123", "John123", "  ", "Jean-Luc", "O'Brien", "pw", "1990-05-01", "false",
                "false", "USA",
            ],
            &service,
        );

        assert_eq!(term.count("Name should only contain letters"), 1);
        assert_eq!(term.count("First Name cannot be empty"), 1);
        let args = &service.calls_to("complete-registration")[0];
        assert_eq!(args[1], "Jean-Luc");
        assert_eq!(args[2], "O'Brien");
    }

    #[test]
    fn unknown_country_is_reprompted() {
        let service = service();
        let (_, term) = run(
            &["ABC123", "Mary", "Jane", "pw", "1990-05-01", "false", "false", "ZZZ", "", "USA"],
            &service,
        );

        assert_eq!(term.count("Invalid country code. Please enter again"), 1);
        assert_eq!(term.count("Country cannot be empty"), 1);
        assert_eq!(
            service.calls_to("get-life-expectancy"),
            vec![vec!["ZZZ".to_string()], vec!["USA".to_string()]]
        );
        assert_eq!(service.calls_to("complete-registration")[0][8], "USA");
    }

    #[test]
    fn empty_password_is_reprompted() {
        let service = service();
        let (_, term) = run(
            &["ABC123", "Mary", "Jane", "", "pw", "1990-05-01", "false", "false", "USA"],
            &service,
        );
        assert_eq!(term.count("Password cannot be empty"), 1);
        assert_eq!(service.calls_to("complete-registration")[0][9], "pw");
    }

    #[test]
    fn invalid_uuid_aborts_without_retry() {
        let service = FakeService::new().respond("validate-uuid", "Invalid UUID code");
        let mut term = ScriptedTerminal::new(["", "NOPE", "Mary"]);

        let outcome = Registration::new(&mut term, &service).run().unwrap();
        assert!(matches!(outcome, RegistrationOutcome::Rejected(_)));
        assert_eq!(outcome.message(), "Invalid UUID code");
        assert_eq!(term.count("UUID Code cannot be empty"), 1);
        assert_eq!(term.remaining_inputs(), 1);
        assert_eq!(service.calls().len(), 1);
    }

    #[test]
    fn missing_script_ends_registration() {
        let bridge = ScriptBridge::new(None);
        let mut term = ScriptedTerminal::new(["ABC123", "Mary"]);

        let outcome = Registration::new(&mut term, &bridge).run().unwrap();
        assert!(matches!(outcome, RegistrationOutcome::Unavailable(_)));
        assert_eq!(outcome.message(), "Script not found.");
        assert_eq!(term.remaining_inputs(), 1);
    }

    #[test]
    fn steps_advance_linearly() {
        let service = service();
        let mut term = ScriptedTerminal::new(["ABC123", "Mary", "Jane", "pw"]);
        let mut registration = Registration::new(&mut term, &service);

        assert_eq!(registration.step(), Step::CollectUuid);
        registration.advance().unwrap();
        assert_eq!(registration.step(), Step::ValidateUuid);
        registration.advance().unwrap();
        assert_eq!(registration.step(), Step::CollectName);
        registration.advance().unwrap();
        assert_eq!(registration.step(), Step::CollectPassword);
        registration.advance().unwrap();
        assert_eq!(registration.step(), Step::CollectDob);
    }

    #[test]
    fn closed_input_surfaces_as_io_error() {
        let service = service();
        let mut term = ScriptedTerminal::new(["ABC123", "Mary"]);
        let err = Registration::new(&mut term, &service).run().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
