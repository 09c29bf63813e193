//! Workshop id from the `:id` path segment. Non-numeric ids are reported as a missing workshop.

use crate::error::AppError;
use async_trait::async_trait;
use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorkshopId(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for WorkshopId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::workshop_not_found())?;
        raw.parse::<i64>()
            .map(WorkshopId)
            .map_err(|_| AppError::workshop_not_found())
    }
}
