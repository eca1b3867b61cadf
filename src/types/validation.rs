use once_cell::sync::Lazy;
use regex::Regex;
use serde::{ser::SerializeMap, Serialize};

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9-]+(?:\.[a-zA-Z0-9-]+)*$")
        .expect("compile email regex")
});

static USERNAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9\.\-_]*[A-Za-z0-9]$").expect("compile username regex"));

const USERNAME_MAX: usize = 30;

pub const PASSWORD_MIN: usize = 8;
pub const PASSWORD_MAX: usize = 128;

pub const CATEGORY_MAX: usize = 50;
pub const TITLE_MAX: usize = 200;
pub const CONTENT_MAX: usize = 65_536;

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email) && email.len() <= 254
}

pub fn is_valid_password(pass: &str) -> bool {
    let len = pass.len();
    (PASSWORD_MIN..=PASSWORD_MAX).contains(&len)
}

pub fn is_valid_username(name: &str) -> bool {
    USERNAME_REGEX.is_match(name) && name.len() <= USERNAME_MAX
}

/// Request bodies that can reject themselves before any store
/// interaction happens.
pub trait Validate {
    fn validate(&self) -> Result<(), FieldErrors>;
}

/// Per-field rejection messages, serialized as a `"errors"` object in
/// the failure envelope. Field order is kept stable for predictable
/// output.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct FieldErrors(Vec<(&'static str, &'static str)>);

impl FieldErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: &'static str, message: &'static str) {
        self.0.push((field, message));
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Turns the accumulated rejections into a `Result`, erroring when
    /// at least one field was rejected.
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl Serialize for FieldErrors {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (field, message) in &self.0 {
            map.serialize_entry(field, message)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("gush@gmail.com"));
        assert!(is_valid_email("mark.robes@forum.example.org"));
        assert!(!is_valid_email("nada_neutho"));
        assert!(!is_valid_email("@example.com"));
    }

    #[test]
    fn test_is_valid_username() {
        assert!(is_valid_username("memothelemo"));
        assert!(is_valid_username("mark.robes"));
        assert!(is_valid_username("salmon-ella"));
        assert!(is_valid_username("crossword_puzzle"));
        assert!(is_valid_username("slime_lover.123"));
        assert!(is_valid_username("2pac"));
        assert!(is_valid_username("_apple"));

        assert!(!is_valid_username("overlong_username_that_keeps_going_on"));
        assert!(!is_valid_username("pretty ugly"));
        assert!(!is_valid_username("x"));
    }

    #[test]
    fn test_is_valid_password() {
        assert!(is_valid_password("longenough"));
        assert!(!is_valid_password("short"));
        assert!(!is_valid_password(&"x".repeat(PASSWORD_MAX + 1)));
    }

    #[test]
    fn field_errors_serialize_as_object() {
        let mut errors = FieldErrors::new();
        errors.insert("username", "Invalid username");
        errors.insert("email", "Invalid e-mail address");

        let json = serde_json::to_value(&errors).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "username": "Invalid username",
                "email": "Invalid e-mail address",
            })
        );
    }

    #[test]
    fn empty_field_errors_are_ok() {
        assert!(FieldErrors::new().into_result().is_ok());

        let mut errors = FieldErrors::new();
        errors.insert("title", "Title is required");
        assert!(errors.into_result().is_err());
    }
}
