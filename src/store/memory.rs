//! Process-local store with the same semantics as `PgStore`. One mutex guards all tables,
//! so each call behaves like a serializable transaction.

use super::Store;
use crate::dto::{Credentials, NewUser, NewWorkshop, StudentRegistration, WorkshopPatch};
use crate::error::AppError;
use crate::models::{Attendee, Enrollment, Registration, Role, Student, StudentProfile, User, Workshop};
use crate::service::{ensure_seat_available, require_new_registration};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::Mutex;

/// Workshop as stored; `enrolled` is derived on read.
#[derive(Clone, Debug)]
struct WorkshopRecord {
    title: String,
    description: String,
    date: String,
    time: String,
    location: String,
    category: String,
    capacity: i32,
    status: String,
}

/// Per-table id counters, like one `BIGSERIAL` sequence per table. Ids are never reused.
#[derive(Default)]
struct Sequences {
    users: i64,
    students: i64,
    workshops: i64,
    registrations: i64,
}

fn advance(seq: &mut i64) -> i64 {
    *seq += 1;
    *seq
}

#[derive(Default)]
struct Tables {
    seq: Sequences,
    users: BTreeMap<i64, User>,
    students: BTreeMap<i64, Student>,
    workshops: BTreeMap<i64, WorkshopRecord>,
    registrations: BTreeMap<i64, Registration>,
}

impl Tables {
    fn enrolled(&self, workshop_id: i64) -> i64 {
        self.registrations
            .values()
            .filter(|r| r.workshop_id == workshop_id)
            .count() as i64
    }

    fn workshop(&self, id: i64) -> Option<Workshop> {
        self.workshops.get(&id).map(|w| Workshop {
            id,
            title: w.title.clone(),
            description: w.description.clone(),
            date: w.date.clone(),
            time: w.time.clone(),
            location: w.location.clone(),
            category: w.category.clone(),
            capacity: w.capacity,
            status: w.status.clone(),
            enrolled: self.enrolled(id),
        })
    }

    fn user_by_email(&self, email: &str) -> Option<&User> {
        self.users.values().find(|u| u.email == email)
    }

    fn find_or_create_user(&mut self, req: &StudentRegistration) -> User {
        if let Some(user) = self.user_by_email(&req.email) {
            return user.clone();
        }
        let id = advance(&mut self.seq.users);
        let user = User {
            id,
            name: req.name.clone(),
            email: req.email.clone(),
            password: String::new(),
            role: Role::Student,
        };
        self.users.insert(id, user.clone());
        tracing::info!(user_id = id, email = %user.email, "student account created");
        user
    }

    fn find_or_create_student(&mut self, user_id: i64) -> i64 {
        if let Some(s) = self.students.values().find(|s| s.user_id == Some(user_id)) {
            return s.id;
        }
        let id = advance(&mut self.seq.students);
        self.students.insert(
            id,
            Student {
                id,
                user_id: Some(user_id),
            },
        );
        id
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn list_workshops(&self, status: Option<&str>) -> Result<Vec<Workshop>, AppError> {
        let t = self.tables.lock().await;
        Ok(t.workshops
            .iter()
            .filter(|(_, w)| status.map_or(true, |s| w.status == s))
            .filter_map(|(id, _)| t.workshop(*id))
            .collect())
    }

    async fn create_workshop(&self, new: &NewWorkshop) -> Result<Workshop, AppError> {
        let mut t = self.tables.lock().await;
        let id = advance(&mut t.seq.workshops);
        t.workshops.insert(
            id,
            WorkshopRecord {
                title: new.title.clone(),
                description: new.description.clone(),
                date: new.date.clone(),
                time: new.time.clone(),
                location: new.location.clone(),
                category: new.category.clone(),
                capacity: new.capacity,
                status: new.status.clone(),
            },
        );
        t.workshop(id)
            .ok_or_else(|| AppError::Internal("workshop vanished after insert".into()))
    }

    async fn get_workshop(&self, id: i64) -> Result<Option<Workshop>, AppError> {
        Ok(self.tables.lock().await.workshop(id))
    }

    async fn update_workshop(&self, id: i64, patch: &WorkshopPatch) -> Result<Option<Workshop>, AppError> {
        let mut t = self.tables.lock().await;
        let Some(w) = t.workshops.get_mut(&id) else {
            return Ok(None);
        };
        let p = patch.clone();
        if let Some(v) = p.title {
            w.title = v;
        }
        if let Some(v) = p.description {
            w.description = v;
        }
        if let Some(v) = p.date {
            w.date = v;
        }
        if let Some(v) = p.time {
            w.time = v;
        }
        if let Some(v) = p.location {
            w.location = v;
        }
        if let Some(v) = p.category {
            w.category = v;
        }
        if let Some(v) = p.capacity {
            w.capacity = v;
        }
        if let Some(v) = p.status {
            w.status = v;
        }
        Ok(t.workshop(id))
    }

    async fn delete_workshop(&self, id: i64) -> Result<bool, AppError> {
        let mut t = self.tables.lock().await;
        if t.workshops.remove(&id).is_none() {
            return Ok(false);
        }
        t.registrations.retain(|_, r| r.workshop_id != id);
        Ok(true)
    }

    async fn register_student(&self, workshop_id: i64, req: &StudentRegistration) -> Result<Enrollment, AppError> {
        let mut t = self.tables.lock().await;
        let workshop = t.workshop(workshop_id).ok_or_else(AppError::workshop_not_found)?;
        ensure_seat_available(&workshop)?;

        let user = t.find_or_create_user(req);
        let student_id = t.find_or_create_student(user.id);

        let exists = t
            .registrations
            .values()
            .any(|r| r.workshop_id == workshop_id && r.student_id == student_id);
        let candidate = if exists {
            None
        } else {
            Some(Registration {
                id: advance(&mut t.seq.registrations),
                workshop_id,
                student_id,
                registered_at: Utc::now(),
            })
        };
        let registration = require_new_registration(workshop_id, student_id, candidate)?;
        t.registrations.insert(registration.id, registration.clone());

        tracing::info!(workshop_id, student_id, registration_id = registration.id, "student registered");
        Ok(Enrollment {
            registration,
            student: StudentProfile {
                id: student_id,
                user_id: Some(user.id),
                name: user.name,
                email: user.email,
            },
            workshop: Workshop {
                enrolled: workshop.enrolled + 1,
                ..workshop
            },
        })
    }

    async fn list_attendees(&self, workshop_id: i64) -> Result<Option<Vec<Attendee>>, AppError> {
        let t = self.tables.lock().await;
        if !t.workshops.contains_key(&workshop_id) {
            return Ok(None);
        }
        let mut rows: Vec<Attendee> = t
            .registrations
            .values()
            .filter(|r| r.workshop_id == workshop_id)
            .map(|r| {
                let user_id = t.students.get(&r.student_id).and_then(|s| s.user_id);
                let user = user_id.and_then(|id| t.users.get(&id));
                Attendee {
                    id: r.id,
                    workshop_id: r.workshop_id,
                    registered_at: r.registered_at,
                    student_id: r.student_id,
                    user_id,
                    name: user.map(|u| u.name.clone()).unwrap_or_default(),
                    email: user.map(|u| u.email.clone()).unwrap_or_default(),
                }
            })
            .collect();
        rows.sort_by_key(|a| (a.registered_at, a.id));
        Ok(Some(rows))
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        Ok(self.tables.lock().await.users.values().cloned().collect())
    }

    async fn create_user(&self, new: &NewUser) -> Result<User, AppError> {
        let mut t = self.tables.lock().await;
        if t.user_by_email(&new.email).is_some() {
            return Err(AppError::DuplicateEmail);
        }
        let id = advance(&mut t.seq.users);
        let user = User {
            id,
            name: new.name.clone(),
            email: new.email.clone(),
            password: new.password.clone(),
            role: new.role,
        };
        t.users.insert(id, user.clone());
        Ok(user)
    }

    async fn find_by_credentials(&self, creds: &Credentials) -> Result<Option<User>, AppError> {
        let t = self.tables.lock().await;
        Ok(t.user_by_email(&creds.email)
            .filter(|u| u.password == creds.password)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workshop(capacity: i32) -> NewWorkshop {
        NewWorkshop {
            title: "UX basics".into(),
            description: "Intro to UX".into(),
            date: "2025-01-20".into(),
            time: "14:00".into(),
            location: "Room 3".into(),
            category: "Design".into(),
            capacity,
            status: "active".into(),
        }
    }

    fn student(email: &str) -> StudentRegistration {
        StudentRegistration {
            name: "Student".into(),
            email: email.into(),
        }
    }

    #[tokio::test]
    async fn find_or_create_reuses_user_and_student() {
        let store = MemoryStore::new();
        let a = store.create_workshop(&workshop(5)).await.unwrap();
        let b = store.create_workshop(&workshop(5)).await.unwrap();
        let first = store.register_student(a.id, &student("a@x.com")).await.unwrap();
        let second = store.register_student(b.id, &student("a@x.com")).await.unwrap();
        assert_eq!(first.student.id, second.student.id);
        assert_eq!(first.student.user_id, second.student.user_id);
        assert_eq!(store.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn ids_are_sequential_per_table() {
        let store = MemoryStore::new();
        let a = store.create_workshop(&workshop(5)).await.unwrap();
        let enrollment = store.register_student(a.id, &student("a@x.com")).await.unwrap();
        let b = store.create_workshop(&workshop(5)).await.unwrap();
        assert_eq!((a.id, b.id), (1, 2));
        assert_eq!(enrollment.registration.id, 1);
        assert_eq!(enrollment.student.id, 1);
        assert_eq!(enrollment.student.user_id, Some(1));

        store.delete_workshop(b.id).await.unwrap();
        let c = store.create_workshop(&workshop(5)).await.unwrap();
        assert_eq!(c.id, 3);
    }

    #[tokio::test]
    async fn delete_cascades_registrations() {
        let store = MemoryStore::new();
        let w = store.create_workshop(&workshop(5)).await.unwrap();
        store.register_student(w.id, &student("a@x.com")).await.unwrap();
        assert!(store.delete_workshop(w.id).await.unwrap());
        assert!(store.tables.lock().await.registrations.is_empty());
        assert!(!store.delete_workshop(w.id).await.unwrap());
    }

    #[tokio::test]
    async fn concurrent_last_seat_has_one_winner() {
        let store = std::sync::Arc::new(MemoryStore::new());
        let id = store.create_workshop(&workshop(1)).await.unwrap().id;
        let mut handles = Vec::new();
        for i in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.register_student(id, &student(&format!("s{}@x.com", i))).await
            }));
        }
        let mut ok = 0;
        for h in handles {
            if h.await.unwrap().is_ok() {
                ok += 1;
            }
        }
        assert_eq!(ok, 1);
        assert_eq!(store.get_workshop(id).await.unwrap().unwrap().enrolled, 1);
    }
}
