use std::fmt;

use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

/// Disposition a participant assigns to a transaction.
///
/// Known tags get their own variant; anything else is kept verbatim in
/// `Other` so tags written by older clients survive a round trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Action {
    Ignore,
    Split,
    Person1,
    Person2,
    Other(String),
}

impl Action {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Ignore => "Ignore",
            Self::Split => "Split",
            Self::Person1 => "Person1",
            Self::Person2 => "Person2",
            Self::Other(tag) => tag,
        }
    }

    /// Parse an optional tag where the empty string means "no action".
    pub fn from_optional(raw: Option<&str>) -> Option<Action> {
        match raw.map(str::trim) {
            None | Some("") => None,
            Some(tag) => Some(Action::from(tag)),
        }
    }
}

impl From<&str> for Action {
    fn from(raw: &str) -> Self {
        match raw {
            "Ignore" => Self::Ignore,
            "Split" => Self::Split,
            "Person1" => Self::Person1,
            "Person2" => Self::Person2,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for Action {
    fn from(raw: String) -> Self {
        Action::from(raw.as_str())
    }
}

impl From<Action> for String {
    fn from(action: Action) -> Self {
        action.as_str().to_string()
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToSql for Action {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Action {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value.as_str().map(Action::from)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Group {
    pub id: i64,
    pub name: String,
    pub person1: String,
    pub person2: String,
    pub hidden: bool,
    pub archived: bool,
    pub settled: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct File {
    pub id: i64,
    pub group_id: i64,
    pub name: String,
    pub owner: String,
    pub balance_person1: f64,
    pub balance_person2: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub id: i64,
    pub file_id: i64,
    pub date: String,
    pub description: String,
    pub amount: f64,
    pub action: Action,
    pub owner: String,
    pub previous_action: Option<Action>,
}

/// A transaction as submitted by a caller, before it has an identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub file_id: i64,
    pub date: String,
    pub description: String,
    pub amount: f64,
    pub action: Action,
    pub owner: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub previous_action: Option<Action>,
}

fn empty_as_none<'de, D>(deserializer: D) -> std::result::Result<Option<Action>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(Action::from_optional(raw.as_deref()))
}

/// Intermediate representation of one canonical CSV row before it is
/// attached to a file.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRow {
    pub date: String,
    pub description: String,
    pub amount: f64,
}

/// Running balances of the two participants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Balances {
    pub person1: f64,
    pub person2: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_known_tags() {
        assert_eq!(Action::from("Ignore"), Action::Ignore);
        assert_eq!(Action::from("Split"), Action::Split);
        assert_eq!(Action::Person2.as_str(), "Person2");
    }

    #[test]
    fn test_action_keeps_unknown_tags() {
        let action = Action::from("Half-ish");
        assert_eq!(action, Action::Other("Half-ish".to_string()));
        assert_eq!(action.to_string(), "Half-ish");
    }

    #[test]
    fn test_empty_previous_action_is_none() {
        assert_eq!(Action::from_optional(Some("")), None);
        assert_eq!(Action::from_optional(None), None);
        assert_eq!(Action::from_optional(Some("Split")), Some(Action::Split));
    }

    #[test]
    fn test_new_transaction_from_json() {
        let json = r#"{"file_id": 3, "date": "01/15/2025", "description": "NETFLIX",
            "amount": -15.49, "action": "Split", "owner": "alice", "previous_action": ""}"#;
        let txn: NewTransaction = serde_json::from_str(json).unwrap();
        assert_eq!(txn.action, Action::Split);
        assert_eq!(txn.previous_action, None);
        assert_eq!(txn.amount, -15.49);
    }

    #[test]
    fn test_new_transaction_without_previous_action() {
        let json = r#"{"file_id": 3, "date": "01/15/2025", "description": "NETFLIX",
            "amount": -15.49, "action": "Ignore", "owner": "alice"}"#;
        let txn: NewTransaction = serde_json::from_str(json).unwrap();
        assert_eq!(txn.previous_action, None);
    }
}
