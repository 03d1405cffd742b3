mod admin;
mod patient;
pub mod registration;
mod role;
mod user;
pub mod validation;

pub use admin::{Admin, AdminError};
#[cfg(test)]
pub use admin::EXPORT_HEADER;
pub use patient::Patient;
pub use registration::{Registration, RegistrationOutcome};
pub use role::UserRole;
pub use user::{Identity, User};
