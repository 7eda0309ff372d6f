//! Synchronous form checks run before anything reaches the network.

use std::collections::BTreeMap;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::constants::MIN_PASSWORD_LEN;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\S+@\S+\.\S+").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Email,
    Username,
    Password,
    /// Whole-form message (server rejection, transport failure).
    Form,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Email => "email",
            Field::Username => "username",
            Field::Password => "password",
            Field::Form => "form",
        };
        f.write_str(name)
    }
}

/// Per-field error messages, shown inline next to the offending input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors(BTreeMap<Field, String>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: Field, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.set(field, message);
        errors
    }

    pub fn set(&mut self, field: Field, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(f, m)| (*f, m.as_str()))
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// The entry gate deliberately says only "Incorrect" for short input.
pub fn validate_entry_password(password: &str) -> Option<String> {
    if password.is_empty() {
        return Some("Password cannot be empty.".into());
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Some("Incorrect".into());
    }
    None
}

fn check_password(errors: &mut FormErrors, password: &str) {
    if password.is_empty() {
        errors.set(Field::Password, "Password cannot be empty.");
    } else if password.chars().count() < MIN_PASSWORD_LEN {
        errors.set(Field::Password, "Password must be at least 8 characters long.");
    }
}

fn check_username(errors: &mut FormErrors, username: &str) {
    if username.is_empty() {
        errors.set(Field::Username, "Username cannot be empty.");
    }
}

pub fn validate_email(email: &str) -> Option<String> {
    if email.is_empty() {
        Some("Email cannot be empty.".into())
    } else if !is_valid_email(email) {
        Some("Email address is invalid.".into())
    } else {
        None
    }
}

pub fn validate_login(username: &str, password: &str) -> FormErrors {
    let mut errors = FormErrors::new();
    check_username(&mut errors, username);
    check_password(&mut errors, password);
    errors
}

pub fn validate_register(email: &str, username: &str, password: &str) -> FormErrors {
    let mut errors = FormErrors::new();
    if let Some(message) = validate_email(email) {
        errors.set(Field::Email, message);
    }
    check_username(&mut errors, username);
    check_password(&mut errors, password);
    errors
}
