//! Stored records. Rows are decoded with `sqlx::FromRow`; the in-memory store keeps the same structs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Default number of seats when a workshop is created without a capacity.
pub const DEFAULT_CAPACITY: i32 = 20;
/// Default status for new workshops.
pub const DEFAULT_STATUS: &str = "active";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    Student,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Student => "student",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "student" => Ok(Role::Student),
            other => Err(format!("invalid role: {} (expected admin or student)", other)),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    /// Stored as given. Never part of a response projection.
    pub password: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct Student {
    pub id: i64,
    pub user_id: Option<i64>,
}

/// Workshop row joined with its registration count.
#[derive(Clone, Debug, PartialEq, sqlx::FromRow)]
pub struct Workshop {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub date: String,
    pub time: String,
    pub location: String,
    pub category: String,
    pub capacity: i32,
    pub status: String,
    pub enrolled: i64,
}

impl Workshop {
    pub fn is_full(&self) -> bool {
        self.enrolled >= i64::from(self.capacity)
    }
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct Registration {
    pub id: i64,
    pub workshop_id: i64,
    pub student_id: i64,
    pub registered_at: DateTime<Utc>,
}

/// A student together with the account it is linked to.
#[derive(Clone, Debug, sqlx::FromRow)]
pub struct StudentProfile {
    pub id: i64,
    pub user_id: Option<i64>,
    pub name: String,
    pub email: String,
}

/// Registration listed with its student.
#[derive(Clone, Debug, sqlx::FromRow)]
pub struct Attendee {
    pub id: i64,
    pub workshop_id: i64,
    pub registered_at: DateTime<Utc>,
    pub student_id: i64,
    pub user_id: Option<i64>,
    pub name: String,
    pub email: String,
}

/// Result of a successful registration.
#[derive(Clone, Debug)]
pub struct Enrollment {
    pub registration: Registration,
    pub student: StudentProfile,
    pub workshop: Workshop,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(" student ".parse::<Role>().unwrap(), Role::Student);
        assert!("teacher".parse::<Role>().is_err());
    }

    #[test]
    fn full_when_enrolled_reaches_capacity() {
        let mut w = Workshop {
            id: 1,
            title: "Rust".into(),
            description: "d".into(),
            date: "2025-01-15".into(),
            time: "10:00".into(),
            location: "Room 1".into(),
            category: "Programming".into(),
            capacity: 2,
            status: DEFAULT_STATUS.into(),
            enrolled: 1,
        };
        assert!(!w.is_full());
        w.enrolled = 2;
        assert!(w.is_full());
        w.capacity = 0;
        w.enrolled = 0;
        assert!(w.is_full());
    }
}
