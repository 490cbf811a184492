use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which roster a file belongs to. Each kind maps onto one store collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RosterKind {
    Teacher,
    Student,
}

impl RosterKind {
    pub fn collection(self) -> &'static str {
        match self {
            RosterKind::Teacher => "teachers",
            RosterKind::Student => "students",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RosterKind::Teacher => "teacher",
            RosterKind::Student => "student",
        }
    }
}

impl fmt::Display for RosterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown roster kind '{0}' (expected teacher or student)")]
pub struct UnknownRosterKind(pub String);

impl FromStr for RosterKind {
    type Err = UnknownRosterKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "teacher" | "teachers" => Ok(Self::Teacher),
            "student" | "students" => Ok(Self::Student),
            other => Err(UnknownRosterKind(other.to_string())),
        }
    }
}

/// Student row fields as they appear in the upload; all are required and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentDetails {
    pub email: String,
    pub name: String,
    pub phone: String,
    pub department: String,
    pub year: String,
    pub division: String,
    pub roll_number: String,
}

/// One validated row or cell awaiting reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportCandidate {
    Teacher { email: String },
    Student(StudentDetails),
}

impl ImportCandidate {
    pub fn email(&self) -> &str {
        match self {
            ImportCandidate::Teacher { email } => email,
            ImportCandidate::Student(details) => &details.email,
        }
    }

    /// Builds the stored record for a first-time import. Teachers only carry credentials.
    pub fn into_account(
        self,
        email: String,
        password: String,
        created_at: DateTime<Utc>,
    ) -> PersistedAccount {
        match self {
            ImportCandidate::Teacher { .. } => PersistedAccount {
                email,
                password,
                created_at,
                ..PersistedAccount::default()
            },
            ImportCandidate::Student(details) => PersistedAccount {
                email,
                name: Some(details.name),
                password,
                phone_number: Some(details.phone),
                department: Some(details.department),
                year: Some(details.year),
                division: Some(details.division),
                batch: Some(String::new()),
                roll_number: Some(details.roll_number),
                address: Some(String::new()),
                parent_phone: Some(String::new()),
                created_at,
                mentor_email: None,
            },
        }
    }
}

/// Account document as kept in the `teachers` or `students` collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PersistedAccount {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub division: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roll_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_phone: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mentor_email: Option<String>,
}
