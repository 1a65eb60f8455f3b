//! Contact entity, its relationship type, and request validation

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::ValidationError;

/// Maximum length for the free-text fields
const MAX_TEXT_LEN: usize = 255;

const MIN_AGE: i64 = 0;
const MAX_AGE: i64 = 150;

/// One `@`, non-empty local part and domain, no whitespace
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+$").expect("invalid email regex"));

/// How close the owner is to a contact
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactType {
    #[default]
    FamiliarPerson,
    Companion,
    Friend,
    BestFriend,
}

impl ContactType {
    pub const ALL: [Self; 4] = [
        Self::FamiliarPerson,
        Self::Companion,
        Self::Friend,
        Self::BestFriend,
    ];

    /// Wire and column representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FamiliarPerson => "familiar_person",
            Self::Companion => "companion",
            Self::Friend => "friend",
            Self::BestFriend => "best_friend",
        }
    }
}

impl FromStr for ContactType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ValidationError::InvalidVariant {
                field: "type",
                value: s.to_owned(),
            })
    }
}

impl fmt::Display for ContactType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored contact, as returned by list and get
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: i32,
    pub name: String,
    pub age: i32,
    pub email: String,
    pub phone: String,
    #[serde(rename = "type")]
    pub kind: ContactType,
}

/// Validated field values for an insert or a full replace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContact {
    pub name: String,
    pub age: i32,
    pub email: String,
    pub phone: String,
    pub kind: ContactType,
}

impl NewContact {
    /// Attach a store-assigned id.
    pub fn into_contact(self, id: i32) -> Contact {
        Contact {
            id,
            name: self.name,
            age: self.age,
            email: self.email,
            phone: self.phone,
            kind: self.kind,
        }
    }
}

/// Unvalidated contact body as posted by a client.
///
/// Every field is optional here so that a missing field is reported as a
/// validation error naming it, rather than as an opaque decode failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactDraft {
    pub name: Option<String>,
    pub age: Option<i64>,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

impl ContactDraft {
    /// Validate a body for creation; `type` falls back to `familiar_person`.
    pub fn validate_new(self) -> Result<NewContact, ValidationError> {
        self.validate(false)
    }

    /// Validate a body for a full replace; every field including `type` is required.
    pub fn validate_replacement(self) -> Result<NewContact, ValidationError> {
        self.validate(true)
    }

    fn validate(self, require_type: bool) -> Result<NewContact, ValidationError> {
        let name = required_text("name", self.name)?;

        let age = self.age.ok_or(ValidationError::Missing { field: "age" })?;
        if !(MIN_AGE..=MAX_AGE).contains(&age) {
            return Err(ValidationError::OutOfRange {
                field: "age",
                min: MIN_AGE,
                max: MAX_AGE,
            });
        }

        let email = required_text("email", self.email)?;
        if !EMAIL_RE.is_match(&email) {
            return Err(ValidationError::InvalidFormat {
                field: "email",
                reason: "must look like user@domain",
            });
        }

        let phone = required_text("phone", self.phone)?;

        let kind = match self.kind {
            Some(raw) => raw.trim().parse::<ContactType>()?,
            None if require_type => return Err(ValidationError::Missing { field: "type" }),
            None => ContactType::default(),
        };

        Ok(NewContact {
            name,
            // range-checked above
            age: age as i32,
            email,
            phone,
            kind,
        })
    }
}

fn required_text(field: &'static str, value: Option<String>) -> Result<String, ValidationError> {
    let value = value.ok_or(ValidationError::Missing { field })?;

    // Blank check only; the stored value is exactly what was submitted
    if value.trim().is_empty() {
        return Err(ValidationError::Empty { field });
    }
    if value.chars().count() > MAX_TEXT_LEN {
        return Err(ValidationError::TooLong {
            field,
            max: MAX_TEXT_LEN,
        });
    }

    Ok(value)
}
