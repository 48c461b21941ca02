//! Login identifier: an email address or a phone number.
//!
//! The backend accepts either in a single `email_or_phone` field. Parsing up
//! front lets the harness reject obvious typos before a round-trip.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Contact`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ContactError {
    /// The input string is empty.
    #[error("contact cannot be empty")]
    Empty,
    /// The input contains an @ but is not a usable email address.
    #[error("invalid email address: {0}")]
    InvalidEmail(String),
    /// The input is neither an email nor a phone number.
    #[error("invalid phone number: {0}")]
    InvalidPhone(String),
}

/// An email address or a phone number.
///
/// ## Rules
///
/// - Anything containing `@` is treated as an email and must have a non-empty
///   local part and domain.
/// - Otherwise it must be a phone number: an optional leading `+`, then
///   digits with optional spaces, dashes or parentheses, at least 7 digits.
///
/// ## Examples
///
/// ```
/// use appetit_core::Contact;
///
/// assert!(matches!(Contact::parse("chef@appetit.kz"), Ok(Contact::Email(_))));
/// assert!(matches!(Contact::parse("+7 701 123-45-67"), Ok(Contact::Phone(_))));
/// assert!(Contact::parse("@nowhere").is_err());
/// assert!(Contact::parse("12ab").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum Contact {
    /// An email address, stored as given.
    Email(String),
    /// A phone number, stored as given.
    Phone(String),
}

impl Contact {
    /// Minimum number of digits in a phone number.
    pub const MIN_PHONE_DIGITS: usize = 7;

    /// Parse a contact from user input.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, a malformed email, or a
    /// malformed phone number.
    pub fn parse(s: &str) -> Result<Self, ContactError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ContactError::Empty);
        }

        if let Some((local, domain)) = s.split_once('@') {
            if local.is_empty() || domain.is_empty() || domain.contains('@') {
                return Err(ContactError::InvalidEmail(s.to_owned()));
            }
            return Ok(Self::Email(s.to_owned()));
        }

        let body = s.strip_prefix('+').unwrap_or(s);
        let well_formed = body
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '(' | ')'));
        let digits = body.chars().filter(char::is_ascii_digit).count();

        if !well_formed || digits < Self::MIN_PHONE_DIGITS {
            return Err(ContactError::InvalidPhone(s.to_owned()));
        }

        Ok(Self::Phone(s.to_owned()))
    }

    /// Returns the contact as entered.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Email(s) | Self::Phone(s) => s,
        }
    }
}

impl fmt::Display for Contact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Contact {
    type Err = ContactError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_email() {
        assert_eq!(
            Contact::parse(" admin@appetit.kz "),
            Ok(Contact::Email("admin@appetit.kz".to_owned()))
        );
    }

    #[test]
    fn test_parse_bad_email() {
        assert!(matches!(
            Contact::parse("user@"),
            Err(ContactError::InvalidEmail(_))
        ));
        assert!(matches!(
            Contact::parse("a@b@c"),
            Err(ContactError::InvalidEmail(_))
        ));
    }

    #[test]
    fn test_parse_phone() {
        assert!(matches!(
            Contact::parse("+77011234567"),
            Ok(Contact::Phone(_))
        ));
        assert!(matches!(
            Contact::parse("(701) 123-4567"),
            Ok(Contact::Phone(_))
        ));
    }

    #[test]
    fn test_parse_short_phone() {
        assert!(matches!(
            Contact::parse("12345"),
            Err(ContactError::InvalidPhone(_))
        ));
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(Contact::parse("   "), Err(ContactError::Empty));
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let contact = Contact::parse("+77011234567").unwrap();
        assert_eq!(serde_json::to_string(&contact).unwrap(), "\"+77011234567\"");
    }
}
