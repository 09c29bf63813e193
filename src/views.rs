//! Response projections of stored records.

use crate::models::{Attendee, Role, StudentProfile, User, Workshop};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct WorkshopView {
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

impl From<Workshop> for WorkshopView {
    fn from(w: Workshop) -> Self {
        WorkshopView {
            id: w.id,
            title: w.title,
            description: w.description,
            date: w.date,
            time: w.time,
            location: w.location,
            category: w.category,
            capacity: w.capacity,
            status: w.status,
            enrolled: w.enrolled,
        }
    }
}

/// Public user projection; the stored password is dropped here.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct UserView {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<User> for UserView {
    fn from(u: User) -> Self {
        UserView {
            id: u.id,
            name: u.name,
            email: u.email,
            role: u.role,
        }
    }
}

#[derive(Clone, Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentView {
    pub id: i64,
    pub user_id: Option<i64>,
    pub name: String,
    pub email: String,
}

impl From<StudentProfile> for StudentView {
    fn from(s: StudentProfile) -> Self {
        StudentView {
            id: s.id,
            user_id: s.user_id,
            name: s.name,
            email: s.email,
        }
    }
}

#[derive(Clone, Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendeeView {
    pub id: i64,
    pub workshop_id: i64,
    pub registered_at: DateTime<Utc>,
    pub student: StudentView,
}

impl From<Attendee> for AttendeeView {
    fn from(a: Attendee) -> Self {
        AttendeeView {
            id: a.id,
            workshop_id: a.workshop_id,
            registered_at: a.registered_at,
            student: StudentView {
                id: a.student_id,
                user_id: a.user_id,
                name: a.name,
                email: a.email,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_projection_has_no_password() {
        let view = UserView::from(User {
            id: 7,
            name: "Admin".into(),
            email: "admin@x.com".into(),
            password: "admin123".into(),
            role: Role::Admin,
        });
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["role"], "admin");
        assert!(json.get("password").is_none());
        assert!(!json.to_string().contains("admin123"));
    }

    #[test]
    fn student_projection_uses_camel_case() {
        let json = serde_json::to_value(StudentView::from(StudentProfile {
            id: 1,
            user_id: Some(3),
            name: "Ana".into(),
            email: "ana@x.com".into(),
        }))
        .unwrap();
        assert_eq!(json["userId"], 3);
    }
}
