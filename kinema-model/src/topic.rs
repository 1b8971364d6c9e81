use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// School year a topic is taught in
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum SchoolClass {
    Seven,
    Eight,
    Nine,
    Ten,
    Eleven,
}

impl SchoolClass {
    pub fn all() -> &'static [SchoolClass] {
        use SchoolClass::*;
        &[Seven, Eight, Nine, Ten, Eleven]
    }

    /// Numeric grade, 7 through 11
    pub fn grade(&self) -> u8 {
        match self {
            SchoolClass::Seven => 7,
            SchoolClass::Eight => 8,
            SchoolClass::Nine => 9,
            SchoolClass::Ten => 10,
            SchoolClass::Eleven => 11,
        }
    }

    pub fn api_name(&self) -> &'static str {
        match self {
            SchoolClass::Seven => "SEVEN",
            SchoolClass::Eight => "EIGHT",
            SchoolClass::Nine => "NINE",
            SchoolClass::Ten => "TEN",
            SchoolClass::Eleven => "ELEVEN",
        }
    }
}

impl fmt::Display for SchoolClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.grade())
    }
}

impl FromStr for SchoolClass {
    type Err = ModelError;

    /// Accepts either the API spelling (`"NINE"`) or the grade (`"9"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        SchoolClass::all()
            .iter()
            .copied()
            .find(|class| {
                class.api_name().eq_ignore_ascii_case(trimmed)
                    || class.grade().to_string() == trimmed
            })
            .ok_or_else(|| ModelError::UnknownVariant {
                kind: "school class",
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Topic {
    pub id: String,
    pub title: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub slug: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: String,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub parent_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Missing on topics created before classes were introduced
    #[cfg_attr(feature = "serde", serde(default))]
    pub school_class: Option<SchoolClass>,
}

/// Payload for creating a topic
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct NewTopic {
    pub title: String,
    pub school_class: SchoolClass,
}

/// Payload for updating a topic; same shape as creation
pub type TopicUpdate = NewTopic;
