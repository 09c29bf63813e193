//! Schema DDL for users, students, workshops and registrations. Idempotent; run at startup.

use crate::error::AppError;
use crate::store::quote_ident;
use sqlx::PgPool;

/// CREATE SCHEMA / TABLE / INDEX IF NOT EXISTS for every table, in dependency order.
/// The unique and foreign-key constraints here back the registration invariants:
/// one registration per (workshop, student), one student per user, cascade on workshop delete.
pub async fn apply_migrations(pool: &PgPool, schema: &str) -> Result<(), AppError> {
    let s = quote_ident(schema);
    let statements = [
        format!("CREATE SCHEMA IF NOT EXISTS {s}"),
        format!(
            r#"CREATE TABLE IF NOT EXISTS {s}."users" (
                id BIGSERIAL PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                password TEXT NOT NULL DEFAULT '',
                role TEXT NOT NULL DEFAULT 'student' CHECK (role IN ('admin', 'student'))
            )"#
        ),
        format!(
            r#"CREATE TABLE IF NOT EXISTS {s}."students" (
                id BIGSERIAL PRIMARY KEY,
                user_id BIGINT UNIQUE REFERENCES {s}."users" (id) ON DELETE SET NULL
            )"#
        ),
        format!(
            r#"CREATE TABLE IF NOT EXISTS {s}."workshops" (
                id BIGSERIAL PRIMARY KEY,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                "date" TEXT NOT NULL,
                "time" TEXT NOT NULL,
                location TEXT NOT NULL,
                category TEXT NOT NULL,
                capacity INTEGER NOT NULL DEFAULT 20 CHECK (capacity >= 0),
                status TEXT NOT NULL DEFAULT 'active'
            )"#
        ),
        format!(
            r#"CREATE TABLE IF NOT EXISTS {s}."registrations" (
                id BIGSERIAL PRIMARY KEY,
                workshop_id BIGINT NOT NULL REFERENCES {s}."workshops" (id) ON DELETE CASCADE,
                student_id BIGINT NOT NULL REFERENCES {s}."students" (id) ON DELETE CASCADE,
                registered_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                UNIQUE (workshop_id, student_id)
            )"#
        ),
        format!(
            r#"CREATE INDEX IF NOT EXISTS "registrations_student_id_idx" ON {s}."registrations" (student_id)"#
        ),
    ];
    for sql in &statements {
        tracing::debug!(sql = %sql, "migration");
        sqlx::query(sql).execute(pool).await?;
    }
    tracing::info!(schema = %schema, "schema ready");
    Ok(())
}
