//! How multiple conditions of a single test combine.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RuleError;

/// Tests are typically composed of multiple conditions, e.g. contains ANY of
/// X, Y or Z.
///
/// Serialized as a lowercase token (`"none"`, `"any"`, `"all"`); parsing is
/// case-insensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum Quantifier {
    /// No condition may hold.
    None,
    /// At least one condition must hold.
    Any,
    /// Every condition must hold.
    All,
}

impl Quantifier {
    /// Token used in the serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Any => "any",
            Self::All => "all",
        }
    }

    /// Combine a lazy sequence of conditions.
    ///
    /// Conditions are pulled in order and evaluation stops at the first
    /// decisive one, so pass an iterator adaptor (e.g. `.map(..)`) rather
    /// than a pre-computed collection when conditions are expensive.
    pub fn evaluate<I>(self, conditions: I) -> bool
    where
        I: IntoIterator<Item = bool>,
    {
        let mut conditions = conditions.into_iter();
        match self {
            Self::None => !conditions.any(|holds| holds),
            Self::Any => conditions.any(|holds| holds),
            Self::All => conditions.all(|holds| holds),
        }
    }
}

impl fmt::Display for Quantifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Quantifier {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "any" => Ok(Self::Any),
            "all" => Ok(Self::All),
            _ => Err(RuleError::UnknownQuantifier(s.to_string())),
        }
    }
}

impl TryFrom<String> for Quantifier {
    type Error = RuleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Quantifier> for &'static str {
    fn from(quantifier: Quantifier) -> Self {
        quantifier.as_str()
    }
}
