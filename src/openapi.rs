//! OpenAPI document for the REST API.

use crate::dto::{LoginPayload, RegistrationPayload, UserPayload, WorkshopPayload};
use crate::handlers::{login, registration, users, workshops};
use crate::models::Role;
use crate::response::{EnrollmentBody, MessageBody, UserBody};
use crate::views::{AttendeeView, StudentView, UserView, WorkshopView};
use axum::Json;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        workshops::list,
        workshops::create,
        workshops::read,
        workshops::update,
        workshops::delete,
        registration::register,
        registration::list,
        users::list,
        users::register,
        login::login,
    ),
    components(schemas(
        WorkshopPayload,
        RegistrationPayload,
        UserPayload,
        LoginPayload,
        WorkshopView,
        StudentView,
        AttendeeView,
        UserView,
        Role,
        MessageBody,
        EnrollmentBody,
        UserBody,
    )),
    tags(
        (name = "workshops", description = "Workshops and student registrations"),
        (name = "users", description = "User accounts and login")
    )
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
