use std::fmt;

use crate::users::UserRole;

/// A patient record flattened to the service's positional string form.
#[derive(Clone, PartialEq, Eq)]
pub struct ProfileFields {
    pub uuid: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: String,
    pub is_hiv_positive: String,
    pub date_of_infection: String,
    pub on_art_drugs: String,
    pub start_art_date: String,
    pub country: String,
}

impl ProfileFields {
    fn to_args(&self) -> Vec<String> {
        vec![
            self.uuid.clone(),
            self.first_name.clone(),
            self.last_name.clone(),
            self.date_of_birth.clone(),
            self.is_hiv_positive.clone(),
            self.date_of_infection.clone(),
            self.on_art_drugs.clone(),
            self.start_art_date.clone(),
            self.country.clone(),
        ]
    }
}

#[derive(Clone, PartialEq, Eq)]
pub enum Command {
    Login { email: String, password: String },
    ValidateUuid { uuid: String },
    CompleteRegistration { profile: ProfileFields, password: String },
    ModifyPatientProfile { profile: ProfileFields },
    ViewProfile { uuid: String },
    GetAllUsers,
    GetLifeExpectancy { country: String },
    InitiateRegistration { role: UserRole, email: String },
}

impl Command {
    pub fn keyword(&self) -> &'static str {
        match self {
            Command::Login { .. } => "login",
            Command::ValidateUuid { .. } => "validate-uuid",
            Command::CompleteRegistration { .. } => "complete-registration",
            Command::ModifyPatientProfile { .. } => "modify-patient-profile",
            Command::ViewProfile { .. } => "view-profile",
            Command::GetAllUsers => "get-all-users",
            Command::GetLifeExpectancy { .. } => "get-life-expectancy",
            Command::InitiateRegistration { .. } => "initiate-registration",
        }
    }

    /// Positional arguments passed after the keyword.
    pub fn args(&self) -> Vec<String> {
        match self {
            Command::Login { email, password } => vec![email.clone(), password.clone()],
            Command::ValidateUuid { uuid } | Command::ViewProfile { uuid } => vec![uuid.clone()],
            Command::CompleteRegistration { profile, password } => {
                let mut args = profile.to_args();
                args.push(password.clone());
                args
            }
            Command::ModifyPatientProfile { profile } => profile.to_args(),
            Command::GetAllUsers => Vec::new(),
            Command::GetLifeExpectancy { country } => vec![country.clone()],
            Command::InitiateRegistration { role, email } => {
                vec![role.as_str().to_string(), email.clone()]
            }
        }
    }
}

// Arguments can carry credentials; only the shape is printed.
impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("keyword", &self.keyword())
            .field("args", &self.args().len())
            .finish()
    }
}
