//! Repository seam. Handlers only see `dyn Store`; the concrete backend is picked at startup.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::{ensure_database_exists, PgStore};
pub(crate) use postgres::quote_ident;

use crate::dto::{Credentials, NewUser, NewWorkshop, StudentRegistration, WorkshopPatch};
use crate::error::AppError;
use crate::models::{Attendee, Enrollment, User, Workshop};
use async_trait::async_trait;

#[async_trait]
pub trait Store: Send + Sync {
    /// Cheap round-trip used by the readiness probe.
    async fn ping(&self) -> Result<(), AppError>;

    /// All workshops ordered by id, optionally restricted to one status.
    async fn list_workshops(&self, status: Option<&str>) -> Result<Vec<Workshop>, AppError>;

    async fn create_workshop(&self, new: &NewWorkshop) -> Result<Workshop, AppError>;

    async fn get_workshop(&self, id: i64) -> Result<Option<Workshop>, AppError>;

    /// Applies the provided fields only. `None` when the workshop does not exist.
    async fn update_workshop(&self, id: i64, patch: &WorkshopPatch) -> Result<Option<Workshop>, AppError>;

    /// Deletes the workshop and its registrations. Returns false when nothing was deleted.
    async fn delete_workshop(&self, id: i64) -> Result<bool, AppError>;

    /// Registers a student for a workshop as one unit:
    /// lock workshop, check capacity, find-or-create user and student, insert registration.
    /// Fails with `NotFound`, `CapacityExceeded` or `DuplicateRegistration`.
    async fn register_student(&self, workshop_id: i64, req: &StudentRegistration) -> Result<Enrollment, AppError>;

    /// Registrations of one workshop with their students. `None` when the workshop does not exist.
    async fn list_attendees(&self, workshop_id: i64) -> Result<Option<Vec<Attendee>>, AppError>;

    async fn list_users(&self) -> Result<Vec<User>, AppError>;

    /// Fails with `DuplicateEmail` when the email is taken.
    async fn create_user(&self, new: &NewUser) -> Result<User, AppError>;

    /// Exact match on email and password.
    async fn find_by_credentials(&self, creds: &Credentials) -> Result<Option<User>, AppError>;
}
