//! User accounts: list and register.

use crate::dto::{NewUser, UserPayload};
use crate::error::AppError;
use crate::extractors::JsonBody;
use crate::response::{created, ok, MessageBody, UserBody};
use crate::state::AppState;
use crate::views::UserView;
use axum::extract::State;
use axum::response::IntoResponse;

#[utoipa::path(
    get,
    path = "/api/users",
    operation_id = "list_users",
    tag = "users",
    responses((status = 200, description = "All users, without passwords", body = [UserView]))
)]
pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let users = state.store.list_users().await?;
    let data: Vec<UserView> = users.into_iter().map(UserView::from).collect();
    Ok(ok(data))
}

#[utoipa::path(
    post,
    path = "/api/users",
    operation_id = "register_user",
    tag = "users",
    request_body = UserPayload,
    responses(
        (status = 201, description = "User registered", body = UserBody),
        (status = 400, description = "Missing field or email already registered", body = MessageBody)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<UserPayload>,
) -> Result<impl IntoResponse, AppError> {
    let new = NewUser::try_from(payload)?;
    let user = state.store.create_user(&new).await?;
    tracing::info!(user_id = user.id, role = %user.role, "user registered");
    Ok(created(UserBody {
        message: "User registered successfully".into(),
        user: UserView::from(user),
    }))
}
