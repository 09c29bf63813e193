//! Workshop CRUD handlers.

use crate::dto::{NewWorkshop, WorkshopPatch, WorkshopPayload};
use crate::error::AppError;
use crate::extractors::{JsonBody, WorkshopId};
use crate::response::{created, message, ok, MessageBody};
use crate::state::AppState;
use crate::views::WorkshopView;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct WorkshopFilter {
    pub status: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/workshops",
    operation_id = "list_workshops",
    tag = "workshops",
    params(("status" = Option<String>, Query, description = "Only workshops with this status")),
    responses((status = 200, description = "Workshops with enrolled counts", body = [WorkshopView]))
)]
pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<WorkshopFilter>,
) -> Result<impl IntoResponse, AppError> {
    let status = filter.status.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let rows = state.store.list_workshops(status).await?;
    let data: Vec<WorkshopView> = rows.into_iter().map(WorkshopView::from).collect();
    Ok(ok(data))
}

#[utoipa::path(
    post,
    path = "/api/workshops",
    operation_id = "create_workshop",
    tag = "workshops",
    request_body = WorkshopPayload,
    responses(
        (status = 201, description = "Workshop created", body = WorkshopView),
        (status = 400, description = "Missing or invalid field", body = MessageBody)
    )
)]
pub async fn create(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<WorkshopPayload>,
) -> Result<impl IntoResponse, AppError> {
    let new = NewWorkshop::try_from(payload)?;
    let workshop = state.store.create_workshop(&new).await?;
    tracing::info!(workshop_id = workshop.id, title = %workshop.title, "workshop created");
    Ok(created(WorkshopView::from(workshop)))
}

#[utoipa::path(
    get,
    path = "/api/workshops/{id}",
    operation_id = "get_workshop",
    tag = "workshops",
    params(("id" = i64, Path, description = "Workshop id")),
    responses(
        (status = 200, description = "Workshop", body = WorkshopView),
        (status = 404, description = "No such workshop", body = MessageBody)
    )
)]
pub async fn read(
    State(state): State<AppState>,
    WorkshopId(id): WorkshopId,
) -> Result<impl IntoResponse, AppError> {
    let workshop = state
        .store
        .get_workshop(id)
        .await?
        .ok_or_else(AppError::workshop_not_found)?;
    Ok(ok(WorkshopView::from(workshop)))
}

#[utoipa::path(
    put,
    path = "/api/workshops/{id}",
    operation_id = "update_workshop",
    tag = "workshops",
    params(("id" = i64, Path, description = "Workshop id")),
    request_body = WorkshopPayload,
    responses(
        (status = 200, description = "Updated workshop; an empty body leaves it unchanged", body = WorkshopView),
        (status = 400, description = "Invalid field", body = MessageBody),
        (status = 404, description = "No such workshop", body = MessageBody)
    )
)]
pub async fn update(
    State(state): State<AppState>,
    WorkshopId(id): WorkshopId,
    JsonBody(payload): JsonBody<WorkshopPayload>,
) -> Result<impl IntoResponse, AppError> {
    let patch = WorkshopPatch::try_from(payload)?;
    if patch.is_empty() {
        // Nothing to write; answer with the current row.
        let workshop = state
            .store
            .get_workshop(id)
            .await?
            .ok_or_else(AppError::workshop_not_found)?;
        return Ok(ok(WorkshopView::from(workshop)));
    }
    let workshop = state
        .store
        .update_workshop(id, &patch)
        .await?
        .ok_or_else(AppError::workshop_not_found)?;
    tracing::info!(workshop_id = id, "workshop updated");
    Ok(ok(WorkshopView::from(workshop)))
}

#[utoipa::path(
    delete,
    path = "/api/workshops/{id}",
    operation_id = "delete_workshop",
    tag = "workshops",
    params(("id" = i64, Path, description = "Workshop id")),
    responses(
        (status = 200, description = "Workshop and its registrations deleted", body = MessageBody),
        (status = 404, description = "No such workshop", body = MessageBody)
    )
)]
pub async fn delete(
    State(state): State<AppState>,
    WorkshopId(id): WorkshopId,
) -> Result<impl IntoResponse, AppError> {
    if !state.store.delete_workshop(id).await? {
        return Err(AppError::workshop_not_found());
    }
    tracing::info!(workshop_id = id, "workshop deleted");
    Ok(message("Workshop deleted"))
}
