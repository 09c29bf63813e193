//! Response body helpers.

use crate::views::{StudentView, UserView, WorkshopView};
use axum::{http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct MessageBody {
    pub message: String,
}

#[derive(Serialize, ToSchema)]
pub struct EnrollmentBody {
    pub message: String,
    pub student: StudentView,
    pub workshop: WorkshopView,
}

#[derive(Serialize, ToSchema)]
pub struct UserBody {
    pub message: String,
    pub user: UserView,
}

pub fn ok<T: Serialize>(data: T) -> (StatusCode, Json<T>) {
    (StatusCode::OK, Json(data))
}

pub fn created<T: Serialize>(data: T) -> (StatusCode, Json<T>) {
    (StatusCode::CREATED, Json(data))
}

pub fn message(text: &str) -> (StatusCode, Json<MessageBody>) {
    ok(MessageBody {
        message: text.to_string(),
    })
}
