//! Student registration for a workshop, and the attendee list.

use crate::dto::{RegistrationPayload, StudentRegistration};
use crate::error::AppError;
use crate::extractors::{JsonBody, WorkshopId};
use crate::response::{created, ok, EnrollmentBody, MessageBody};
use crate::state::AppState;
use crate::views::{AttendeeView, StudentView, WorkshopView};
use axum::extract::State;
use axum::response::IntoResponse;

#[utoipa::path(
    post,
    path = "/api/workshops/{id}/register",
    operation_id = "register_student",
    tag = "workshops",
    params(("id" = i64, Path, description = "Workshop id")),
    request_body = RegistrationPayload,
    responses(
        (status = 201, description = "Student registered", body = EnrollmentBody),
        (status = 400, description = "Workshop full, duplicate registration or invalid field", body = MessageBody),
        (status = 404, description = "No such workshop", body = MessageBody)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    WorkshopId(id): WorkshopId,
    JsonBody(payload): JsonBody<RegistrationPayload>,
) -> Result<impl IntoResponse, AppError> {
    let req = StudentRegistration::try_from(payload)?;
    let enrollment = state.store.register_student(id, &req).await?;
    Ok(created(EnrollmentBody {
        message: "Registration successful".into(),
        student: StudentView::from(enrollment.student),
        workshop: WorkshopView::from(enrollment.workshop),
    }))
}

#[utoipa::path(
    get,
    path = "/api/workshops/{id}/registrations",
    operation_id = "list_registrations",
    tag = "workshops",
    params(("id" = i64, Path, description = "Workshop id")),
    responses(
        (status = 200, description = "Registrations with their students", body = [AttendeeView]),
        (status = 404, description = "No such workshop", body = MessageBody)
    )
)]
pub async fn list(
    State(state): State<AppState>,
    WorkshopId(id): WorkshopId,
) -> Result<impl IntoResponse, AppError> {
    let rows = state
        .store
        .list_attendees(id)
        .await?
        .ok_or_else(AppError::workshop_not_found)?;
    let data: Vec<AttendeeView> = rows.into_iter().map(AttendeeView::from).collect();
    Ok(ok(data))
}
