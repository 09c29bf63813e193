//! PostgreSQL store. Every write request runs in one transaction; tables live in the
//! schema given at construction (`DATABASE_SCHEMA`, default `public`).

use super::Store;
use crate::dto::{Credentials, NewUser, NewWorkshop, StudentRegistration, WorkshopPatch};
use crate::error::AppError;
use crate::models::{Attendee, Enrollment, Registration, StudentProfile, User, Workshop};
use crate::service::{ensure_seat_available, require_new_registration};
use async_trait::async_trait;
use sqlx::{ConnectOptions, PgConnection, PgPool};
use std::str::FromStr;

/// Quote an identifier for PostgreSQL.
pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

const USER_COLUMNS: &str = "id, name, email, password, role";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    schema: String,
}

impl PgStore {
    pub fn new(pool: PgPool, schema: impl Into<String>) -> Self {
        PgStore {
            pool,
            schema: schema.into(),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Schema-qualified table name (e.g. `"public"."workshops"`).
    fn table(&self, name: &str) -> String {
        format!("{}.{}", quote_ident(&self.schema), quote_ident(name))
    }

    fn workshop_select(&self) -> String {
        format!(
            r#"SELECT w.id, w.title, w.description, w."date", w."time", w.location, w.category,
                      w.capacity, w.status,
                      (SELECT COUNT(*) FROM {} r WHERE r.workshop_id = w.id) AS enrolled
               FROM {} w"#,
            self.table("registrations"),
            self.table("workshops")
        )
    }

    async fn fetch_workshop(&self, conn: &mut PgConnection, id: i64) -> Result<Option<Workshop>, AppError> {
        let sql = format!("{} WHERE w.id = $1", self.workshop_select());
        tracing::debug!(sql = %sql, id, "query");
        let row = sqlx::query_as::<_, Workshop>(&sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(row)
    }

    async fn find_or_create_user(&self, conn: &mut PgConnection, req: &StudentRegistration) -> Result<User, AppError> {
        let users = self.table("users");
        let insert = format!(
            "INSERT INTO {} (name, email, password, role) VALUES ($1, $2, '', 'student') \
             ON CONFLICT (email) DO NOTHING RETURNING {}",
            users, USER_COLUMNS
        );
        tracing::debug!(sql = %insert, email = %req.email, "query (tx)");
        let created = sqlx::query_as::<_, User>(&insert)
            .bind(&req.name)
            .bind(&req.email)
            .fetch_optional(&mut *conn)
            .await?;
        if let Some(user) = created {
            tracing::info!(user_id = user.id, email = %user.email, "student account created");
            return Ok(user);
        }
        let select = format!("SELECT {} FROM {} WHERE email = $1", USER_COLUMNS, users);
        let user = sqlx::query_as::<_, User>(&select)
            .bind(&req.email)
            .fetch_one(&mut *conn)
            .await?;
        Ok(user)
    }

    async fn find_or_create_student(&self, conn: &mut PgConnection, user_id: i64) -> Result<i64, AppError> {
        let students = self.table("students");
        let insert = format!(
            "INSERT INTO {} (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING RETURNING id",
            students
        );
        tracing::debug!(sql = %insert, user_id, "query (tx)");
        let created: Option<(i64,)> = sqlx::query_as(&insert)
            .bind(user_id)
            .fetch_optional(&mut *conn)
            .await?;
        if let Some((id,)) = created {
            return Ok(id);
        }
        let (id,): (i64,) = sqlx::query_as(&format!("SELECT id FROM {} WHERE user_id = $1", students))
            .bind(user_id)
            .fetch_one(&mut *conn)
            .await?;
        Ok(id)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn list_workshops(&self, status: Option<&str>) -> Result<Vec<Workshop>, AppError> {
        let sql = format!(
            "{} WHERE ($1::TEXT IS NULL OR w.status = $1) ORDER BY w.id",
            self.workshop_select()
        );
        tracing::debug!(sql = %sql, status = ?status, "query");
        let rows = sqlx::query_as::<_, Workshop>(&sql)
            .bind(status)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn create_workshop(&self, new: &NewWorkshop) -> Result<Workshop, AppError> {
        let sql = format!(
            r#"INSERT INTO {} (title, description, "date", "time", location, category, capacity, status)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
               RETURNING id, title, description, "date", "time", location, category, capacity, status,
                         0::BIGINT AS enrolled"#,
            self.table("workshops")
        );
        tracing::debug!(sql = %sql, "query");
        let row = sqlx::query_as::<_, Workshop>(&sql)
            .bind(&new.title)
            .bind(&new.description)
            .bind(&new.date)
            .bind(&new.time)
            .bind(&new.location)
            .bind(&new.category)
            .bind(new.capacity)
            .bind(&new.status)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn get_workshop(&self, id: i64) -> Result<Option<Workshop>, AppError> {
        let mut conn = self.pool.acquire().await?;
        self.fetch_workshop(&mut conn, id).await
    }

    async fn update_workshop(&self, id: i64, patch: &WorkshopPatch) -> Result<Option<Workshop>, AppError> {
        let sql = format!(
            r#"UPDATE {} SET
                   title = COALESCE($2, title),
                   description = COALESCE($3, description),
                   "date" = COALESCE($4, "date"),
                   "time" = COALESCE($5, "time"),
                   location = COALESCE($6, location),
                   category = COALESCE($7, category),
                   capacity = COALESCE($8, capacity),
                   status = COALESCE($9, status)
               WHERE id = $1 RETURNING id"#,
            self.table("workshops")
        );
        let mut tx = self.pool.begin().await?;
        tracing::debug!(sql = %sql, id, "query (tx)");
        let updated: Option<(i64,)> = sqlx::query_as(&sql)
            .bind(id)
            .bind(&patch.title)
            .bind(&patch.description)
            .bind(&patch.date)
            .bind(&patch.time)
            .bind(&patch.location)
            .bind(&patch.category)
            .bind(patch.capacity)
            .bind(&patch.status)
            .fetch_optional(&mut *tx)
            .await?;
        if updated.is_none() {
            return Ok(None);
        }
        let workshop = self.fetch_workshop(&mut tx, id).await?;
        tx.commit().await?;
        Ok(workshop)
    }

    async fn delete_workshop(&self, id: i64) -> Result<bool, AppError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", self.table("workshops"));
        tracing::debug!(sql = %sql, id, "query");
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn register_student(&self, workshop_id: i64, req: &StudentRegistration) -> Result<Enrollment, AppError> {
        let mut tx = self.pool.begin().await?;

        // Row lock serializes registrations for the same workshop until commit.
        let lock = format!("SELECT id FROM {} WHERE id = $1 FOR UPDATE", self.table("workshops"));
        tracing::debug!(sql = %lock, workshop_id, "query (tx)");
        let locked: Option<(i64,)> = sqlx::query_as(&lock)
            .bind(workshop_id)
            .fetch_optional(&mut *tx)
            .await?;
        if locked.is_none() {
            return Err(AppError::workshop_not_found());
        }
        let workshop = self
            .fetch_workshop(&mut tx, workshop_id)
            .await?
            .ok_or_else(AppError::workshop_not_found)?;
        ensure_seat_available(&workshop)?;

        let user = self.find_or_create_user(&mut tx, req).await?;
        let student_id = self.find_or_create_student(&mut tx, user.id).await?;

        let insert = format!(
            "INSERT INTO {} (workshop_id, student_id) VALUES ($1, $2) \
             ON CONFLICT (workshop_id, student_id) DO NOTHING \
             RETURNING id, workshop_id, student_id, registered_at",
            self.table("registrations")
        );
        tracing::debug!(sql = %insert, workshop_id, student_id, "query (tx)");
        let inserted = sqlx::query_as::<_, Registration>(&insert)
            .bind(workshop_id)
            .bind(student_id)
            .fetch_optional(&mut *tx)
            .await?;
        let registration = require_new_registration(workshop_id, student_id, inserted)?;
        tx.commit().await?;

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
        let mut conn = self.pool.acquire().await?;
        if self.fetch_workshop(&mut conn, workshop_id).await?.is_none() {
            return Ok(None);
        }
        let sql = format!(
            r#"SELECT r.id, r.workshop_id, r.registered_at, s.id AS student_id, s.user_id,
                      COALESCE(u.name, '') AS name, COALESCE(u.email, '') AS email
               FROM {} r
               JOIN {} s ON s.id = r.student_id
               LEFT JOIN {} u ON u.id = s.user_id
               WHERE r.workshop_id = $1
               ORDER BY r.registered_at, r.id"#,
            self.table("registrations"),
            self.table("students"),
            self.table("users")
        );
        tracing::debug!(sql = %sql, workshop_id, "query");
        let rows = sqlx::query_as::<_, Attendee>(&sql)
            .bind(workshop_id)
            .fetch_all(&mut *conn)
            .await?;
        Ok(Some(rows))
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let sql = format!("SELECT {} FROM {} ORDER BY id", USER_COLUMNS, self.table("users"));
        tracing::debug!(sql = %sql, "query");
        let rows = sqlx::query_as::<_, User>(&sql).fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn create_user(&self, new: &NewUser) -> Result<User, AppError> {
        let sql = format!(
            "INSERT INTO {} (name, email, password, role) VALUES ($1, $2, $3, $4) \
             ON CONFLICT (email) DO NOTHING RETURNING {}",
            self.table("users"),
            USER_COLUMNS
        );
        tracing::debug!(sql = %sql, email = %new.email, "query");
        let row = sqlx::query_as::<_, User>(&sql)
            .bind(&new.name)
            .bind(&new.email)
            .bind(&new.password)
            .bind(new.role.as_str())
            .fetch_optional(&self.pool)
            .await?;
        row.ok_or(AppError::DuplicateEmail)
    }

    async fn find_by_credentials(&self, creds: &Credentials) -> Result<Option<User>, AppError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE email = $1 AND password = $2",
            USER_COLUMNS,
            self.table("users")
        );
        tracing::debug!(sql = %sql, email = %creds.email, "query");
        let row = sqlx::query_as::<_, User>(&sql)
            .bind(&creds.email)
            .bind(&creds.password)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}

/// Ensure the database in `database_url` exists; create it if not. Connects to the
/// default `postgres` database to run CREATE DATABASE. Call before creating the main pool.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)
        .map_err(|e| AppError::Internal(format!("invalid DATABASE_URL: {}", e)))?;
    let mut conn: PgConnection = opts.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

fn parse_db_name_from_url(url: &str) -> Result<(String, String), AppError> {
    let path_start = url
        .rfind('/')
        .ok_or_else(|| AppError::Internal("DATABASE_URL: no path".into()))?
        + 1;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let mut parts = path_and_query.splitn(2, '?');
    let db_name = parts.next().unwrap_or("").trim();
    let query = parts.next().map(|q| format!("?{}", q)).unwrap_or_default();
    let base = url.get(..path_start).unwrap_or(url);
    Ok((format!("{}postgres{}", base, query), db_name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_url_points_at_postgres_db() {
        let (admin, name) = parse_db_name_from_url("postgres://u:p@localhost:5432/workshops").unwrap();
        assert_eq!(admin, "postgres://u:p@localhost:5432/postgres");
        assert_eq!(name, "workshops");
    }

    #[test]
    fn query_string_is_kept_on_admin_url() {
        let (admin, name) = parse_db_name_from_url("postgres://localhost/app?sslmode=disable").unwrap();
        assert_eq!(admin, "postgres://localhost/postgres?sslmode=disable");
        assert_eq!(name, "app");
    }

    #[test]
    fn identifiers_are_quoted() {
        assert_eq!(quote_ident("public"), "\"public\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }
}
