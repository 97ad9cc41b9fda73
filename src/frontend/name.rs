//! Strongly typed frontend identifier.
//!
//! # Rules
//! - 1 to 1024 characters
//! - Only cookie-token characters (the name is embedded in cookie names)
//!
//! # Design Decisions
//! - `parse` reports every violated rule, never just the first
//! - `FromStr` / `TryFrom` exist for trusted configuration code

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Maximum length of a frontend name, in characters.
pub const MAX_NAME_LENGTH: usize = 1024;

/// A single rule a candidate name broke.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameRule {
    #[error("name must not be empty")]
    Empty,

    #[error("name is {length} characters long, maximum is {max}")]
    TooLong { length: usize, max: usize },

    #[error("character {ch:?} at position {position} is not allowed in a cookie name")]
    InvalidCharacter { ch: char, position: usize },
}

/// Every rule violated by a rejected name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid frontend name {value:?}: {}", join_rules(.rules))]
pub struct InvalidFrontendName {
    pub value: String,
    pub rules: Vec<NameRule>,
}

fn join_rules(rules: &[NameRule]) -> String {
    rules
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Name of a frontend. Registry key and seed for derived scheme names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrontendName(String);

impl FrontendName {
    /// Validate `value` and wrap it.
    pub fn parse(value: impl Into<String>) -> Result<Self, InvalidFrontendName> {
        let value = value.into();
        let mut rules = Vec::new();

        let length = value.chars().count();
        if length == 0 {
            rules.push(NameRule::Empty);
        }
        if length > MAX_NAME_LENGTH {
            rules.push(NameRule::TooLong {
                length,
                max: MAX_NAME_LENGTH,
            });
        }
        // First offending character only.
        if let Some((position, ch)) = value.chars().enumerate().find(|(_, c)| !is_token_char(*c)) {
            rules.push(NameRule::InvalidCharacter { ch, position });
        }

        if rules.is_empty() {
            Ok(Self(value))
        } else {
            Err(InvalidFrontendName { value, rules })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// RFC 6265 cookie-name token characters (ASCII, no CTLs or separators).
fn is_token_char(c: char) -> bool {
    c.is_ascii_graphic()
        && !matches!(
            c,
            '(' | ')' | '<' | '>' | '@' | ',' | ';' | ':' | '\\' | '"' | '/' | '[' | ']' | '?'
                | '=' | '{' | '}'
        )
}

impl fmt::Display for FrontendName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for FrontendName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for FrontendName {
    type Err = InvalidFrontendName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for FrontendName {
    type Error = InvalidFrontendName;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl TryFrom<String> for FrontendName {
    type Error = InvalidFrontendName;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl Serialize for FrontendName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for FrontendName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(raw).map_err(serde::de::Error::custom)
    }
}
