//! Credential check against stored accounts.

use crate::dto::{Credentials, LoginPayload};
use crate::error::AppError;
use crate::extractors::JsonBody;
use crate::response::{ok, MessageBody, UserBody};
use crate::state::AppState;
use crate::views::UserView;
use axum::extract::State;
use axum::response::IntoResponse;

#[utoipa::path(
    post,
    path = "/api/login",
    operation_id = "login",
    tag = "users",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Credentials match", body = UserBody),
        (status = 400, description = "Missing field", body = MessageBody),
        (status = 401, description = "Invalid credentials", body = MessageBody)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginPayload>,
) -> Result<impl IntoResponse, AppError> {
    let creds = Credentials::try_from(payload)?;
    let user = state.store.find_by_credentials(&creds).await?.ok_or_else(|| {
        tracing::warn!(email = %creds.email, "login rejected");
        AppError::InvalidCredentials
    })?;
    Ok(ok(UserBody {
        message: "Login successful".into(),
        user: UserView::from(user),
    }))
}
