use lazy_static::lazy_static;
use regex::Regex;
use time::{macros::format_description, Date};

lazy_static! {
    static ref NAME_RE: Regex = Regex::new(r"^[A-Za-z]+([\s'-][A-Za-z]+)*$").unwrap();
    static ref DATE_SHAPE_RE: Regex = Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap();
}

/// Letters, optionally joined by single spaces, apostrophes or hyphens.
pub fn is_valid_name(name: &str) -> bool {
    NAME_RE.is_match(name)
}

/// Strict `YYYY-MM-DD` calendar date.
pub fn parse_date(input: &str) -> Option<Date> {
    let input = input.trim();
    if !DATE_SHAPE_RE.is_match(input) {
        return None;
    }
    let format = format_description!("[year]-[month]-[day]");
    Date::parse(input, &format).ok()
}

/// `YYYY-MM-DD`, or the empty string for an absent date.
pub fn format_date(date: Option<Date>) -> String {
    match date {
        Some(d) => format!("{:04}-{:02}-{:02}", d.year(), u8::from(d.month()), d.day()),
        None => String::new(),
    }
}

pub fn parse_bool(input: &str) -> Option<bool> {
    match input.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" => Some(true),
        "false" | "no" | "n" => Some(false),
        _ => None,
    }
}
