//! Closed value sets for enumerated columns
//!
//! Each enum is stored as a short string. Anything outside the set is
//! rejected when parsed, never stored.

use crate::errors::{AppError, Result};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveEnum, Iterable};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Kind of bibliographic record
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum ReferenceType {
    #[sea_orm(string_value = "paper")]
    Paper,
    #[sea_orm(string_value = "book")]
    Book,
    #[sea_orm(string_value = "thesis")]
    Thesis,
    #[sea_orm(string_value = "preprint")]
    Preprint,
    #[sea_orm(string_value = "article")]
    Article,
}

/// Lifecycle state of a project
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "on_hold")]
    OnHold,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    #[sea_orm(string_value = "workshop")]
    Workshop,
    #[sea_orm(string_value = "tutorial")]
    Tutorial,
    #[sea_orm(string_value = "special_session")]
    SpecialSession,
    #[sea_orm(string_value = "session")]
    Session,
    #[sea_orm(string_value = "conference")]
    Conference,
    #[sea_orm(string_value = "meetup")]
    Meetup,
    #[sea_orm(string_value = "seminar")]
    Seminar,
}

/// Slot type inside an event schedule
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum TalkType {
    #[default]
    #[sea_orm(string_value = "talk")]
    Talk,
    #[sea_orm(string_value = "panel")]
    Panel,
    #[sea_orm(string_value = "opening")]
    Opening,
    #[sea_orm(string_value = "closing")]
    Closing,
    #[sea_orm(string_value = "break")]
    Break,
    #[sea_orm(string_value = "demo")]
    Demo,
}

/// Parse a raw string into a closed-set value, naming the field on failure
pub fn parse_choice<T>(field: &str, raw: &str) -> Result<T>
where
    T: ActiveEnum<Value = String> + Iterable,
{
    T::try_from_value(&raw.to_string()).map_err(|_| AppError::InvalidChoice {
        field: field.to_string(),
        value: raw.to_string(),
        allowed: allowed_values::<T>().join(", "),
    })
}

/// Every stored value of a closed set, in declaration order
pub fn allowed_values<T>() -> Vec<String>
where
    T: ActiveEnum<Value = String> + Iterable,
{
    T::iter().map(|v| v.to_value()).collect()
}

impl FromStr for ReferenceType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        parse_choice("reference_type", s)
    }
}

impl FromStr for ProjectStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        parse_choice("status", s)
    }
}

impl FromStr for EventType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        parse_choice("event_type", s)
    }
}

impl FromStr for TalkType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        parse_choice("talk_type", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_known_values() {
        assert_eq!("on_hold".parse::<ProjectStatus>().unwrap(), ProjectStatus::OnHold);
        assert_eq!("special_session".parse::<EventType>().unwrap(), EventType::SpecialSession);
        assert_eq!("break".parse::<TalkType>().unwrap(), TalkType::Break);
        assert_eq!("preprint".parse::<ReferenceType>().unwrap(), ReferenceType::Preprint);
    }

    #[test]
    fn test_rejects_values_outside_set() {
        let err = "archived".parse::<ProjectStatus>().unwrap_err();
        match err {
            AppError::InvalidChoice { field, value, allowed } => {
                assert_eq!(field, "status");
                assert_eq!(value, "archived");
                assert_eq!(allowed, "active, completed, on_hold, cancelled");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        // Matching is exact, not case-insensitive
        assert!("Paper".parse::<ReferenceType>().is_err());
        assert!("".parse::<TalkType>().is_err());
    }

    #[test]
    fn test_serde_uses_stored_values() {
        let json = serde_json::to_string(&EventType::SpecialSession).unwrap();
        assert_eq!(json, "\"special_session\"");
        assert!(serde_json::from_str::<TalkType>("\"keynote\"").is_err());
    }

    #[test]
    fn test_defaults() {
        assert_eq!(ProjectStatus::default(), ProjectStatus::Active);
        assert_eq!(TalkType::default(), TalkType::Talk);
    }
}
