//! Request payloads. Every field is optional on the wire so a missing value becomes a
//! 400 with a field-specific message instead of a generic deserialization failure.

use crate::error::AppError;
use crate::models::{Role, DEFAULT_CAPACITY, DEFAULT_STATUS};
use serde::Deserialize;
use utoipa::ToSchema;

fn required(field: &str, value: Option<String>) -> Result<String, AppError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AppError::Validation(format!("{} is required", field))),
    }
}

fn optional(field: &str, value: Option<String>) -> Result<Option<String>, AppError> {
    match value {
        None => Ok(None),
        Some(v) => required(field, Some(v)).map(Some),
    }
}

fn capacity(value: Option<i64>) -> Result<Option<i32>, AppError> {
    match value {
        None => Ok(None),
        Some(n) => i32::try_from(n)
            .ok()
            .filter(|n| *n >= 0)
            .map(Some)
            .ok_or_else(|| AppError::Validation("capacity must be a non-negative integer".into())),
    }
}

/// Trimmed, lowercased email. Rejects values without an `@`.
pub fn normalize_email(field: &str, value: Option<String>) -> Result<String, AppError> {
    let email = required(field, value)?.to_lowercase();
    if !email.contains('@') || email.len() < 3 {
        return Err(AppError::Validation(format!("{} must be a valid email", field)));
    }
    Ok(email)
}

#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
pub struct WorkshopPayload {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub location: Option<String>,
    pub category: Option<String>,
    pub capacity: Option<i64>,
    pub status: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewWorkshop {
    pub title: String,
    pub description: String,
    pub date: String,
    pub time: String,
    pub location: String,
    pub category: String,
    pub capacity: i32,
    pub status: String,
}

/// Fields to overwrite on update; `None` leaves the stored value unchanged.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WorkshopPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub location: Option<String>,
    pub category: Option<String>,
    pub capacity: Option<i32>,
    pub status: Option<String>,
}

impl WorkshopPatch {
    pub fn is_empty(&self) -> bool {
        *self == WorkshopPatch::default()
    }
}

impl TryFrom<WorkshopPayload> for NewWorkshop {
    type Error = AppError;

    fn try_from(p: WorkshopPayload) -> Result<Self, Self::Error> {
        Ok(NewWorkshop {
            title: required("title", p.title)?,
            description: required("description", p.description)?,
            date: required("date", p.date)?,
            time: required("time", p.time)?,
            location: required("location", p.location)?,
            category: required("category", p.category)?,
            capacity: capacity(p.capacity)?.unwrap_or(DEFAULT_CAPACITY),
            status: optional("status", p.status)?.unwrap_or_else(|| DEFAULT_STATUS.to_string()),
        })
    }
}

impl TryFrom<WorkshopPayload> for WorkshopPatch {
    type Error = AppError;

    fn try_from(p: WorkshopPayload) -> Result<Self, Self::Error> {
        Ok(WorkshopPatch {
            title: optional("title", p.title)?,
            description: optional("description", p.description)?,
            date: optional("date", p.date)?,
            time: optional("time", p.time)?,
            location: optional("location", p.location)?,
            category: optional("category", p.category)?,
            capacity: capacity(p.capacity)?,
            status: optional("status", p.status)?,
        })
    }
}

#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationPayload {
    pub student_name: Option<String>,
    pub student_email: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StudentRegistration {
    pub name: String,
    pub email: String,
}

impl TryFrom<RegistrationPayload> for StudentRegistration {
    type Error = AppError;

    fn try_from(p: RegistrationPayload) -> Result<Self, Self::Error> {
        Ok(StudentRegistration {
            name: required("studentName", p.student_name)?,
            email: normalize_email("studentEmail", p.student_email)?,
        })
    }
}

#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
pub struct UserPayload {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl TryFrom<UserPayload> for NewUser {
    type Error = AppError;

    fn try_from(p: UserPayload) -> Result<Self, Self::Error> {
        let name = required("name", p.name)?;
        let email = normalize_email("email", p.email)?;
        // Passwords are compared verbatim, so no trimming.
        let password = p
            .password
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::Validation("password is required".into()))?;
        let role = match p.role {
            None => Role::default(),
            Some(r) => r.parse().map_err(AppError::Validation)?,
        };
        Ok(NewUser {
            name,
            email,
            password,
            role,
        })
    }
}

#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
pub struct LoginPayload {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl TryFrom<LoginPayload> for Credentials {
    type Error = AppError;

    fn try_from(p: LoginPayload) -> Result<Self, Self::Error> {
        let email = required("email", p.email)?.to_lowercase();
        let password = p
            .password
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::Validation("password is required".into()))?;
        Ok(Credentials { email, password })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_payload() -> WorkshopPayload {
        WorkshopPayload {
            title: Some("Advanced Python".into()),
            description: Some("Decorators and generators".into()),
            date: Some("2025-01-15".into()),
            time: Some("10:00".into()),
            location: Some("Room 1".into()),
            category: Some("Programming".into()),
            capacity: None,
            status: None,
        }
    }

    #[test]
    fn new_workshop_applies_defaults() {
        let w = NewWorkshop::try_from(full_payload()).unwrap();
        assert_eq!(w.capacity, DEFAULT_CAPACITY);
        assert_eq!(w.status, "active");
    }

    #[test]
    fn new_workshop_names_missing_field() {
        let mut p = full_payload();
        p.location = None;
        let err = NewWorkshop::try_from(p).unwrap_err();
        assert_eq!(err.to_string(), "location is required");

        let mut p = full_payload();
        p.title = Some("   ".into());
        assert_eq!(NewWorkshop::try_from(p).unwrap_err().to_string(), "title is required");
    }

    #[test]
    fn negative_capacity_rejected() {
        let mut p = full_payload();
        p.capacity = Some(-1);
        assert!(matches!(NewWorkshop::try_from(p), Err(AppError::Validation(_))));
    }

    #[test]
    fn patch_keeps_only_provided_fields() {
        let patch = WorkshopPatch::try_from(WorkshopPayload {
            capacity: Some(5),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(patch.capacity, Some(5));
        assert!(patch.title.is_none());
        assert!(!patch.is_empty());
        assert!(WorkshopPatch::try_from(WorkshopPayload::default()).unwrap().is_empty());
    }

    #[test]
    fn registration_normalizes_email() {
        let r = StudentRegistration::try_from(RegistrationPayload {
            student_name: Some("Ana".into()),
            student_email: Some("  Ana@X.com ".into()),
        })
        .unwrap();
        assert_eq!(r.email, "ana@x.com");

        let err = StudentRegistration::try_from(RegistrationPayload {
            student_name: Some("Ana".into()),
            student_email: Some("not-an-email".into()),
        })
        .unwrap_err();
        assert_eq!(err.to_string(), "studentEmail must be a valid email");
    }

    #[test]
    fn user_role_defaults_to_student() {
        let u = NewUser::try_from(UserPayload {
            name: Some("Ana".into()),
            email: Some("ana@x.com".into()),
            password: Some("secret".into()),
            role: None,
        })
        .unwrap();
        assert_eq!(u.role, Role::Student);

        let err = NewUser::try_from(UserPayload {
            name: Some("Ana".into()),
            email: Some("ana@x.com".into()),
            password: None,
            role: None,
        })
        .unwrap_err();
        assert_eq!(err.to_string(), "password is required");
    }

    #[test]
    fn unknown_role_rejected() {
        let err = NewUser::try_from(UserPayload {
            name: Some("Ana".into()),
            email: Some("ana@x.com".into()),
            password: Some("x".into()),
            role: Some("teacher".into()),
        })
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
