//! User management handlers.

use axum::{Extension, http::StatusCode, response::Json};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use super::validate_request;
use crate::{
    database::Database,
    errors::AppError,
    models::{Role, User},
};

fn default_role() -> Role {
    Role::Student
}

/// User creation request.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Name must be between 1 and 100 characters"
    ))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[serde(default = "default_role")]
    pub role: Role,
}

/// Create a new user.
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created successfully", body = User),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn create_user(
    Extension(db): Extension<Database>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), AppError> {
    validate_request(&req)?;

    let user = User::new(req.name.trim().to_string(), req.email.to_lowercase(), req.role);
    db.create_user(&user).await?;

    tracing::info!(user_id = %user.id, role = ?user.role, "User created");
    Ok((StatusCode::CREATED, Json(user)))
}

/// Get all users.
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    responses(
        (status = 200, description = "List of all users", body = Vec<User>)
    )
)]
pub async fn all_users(Extension(db): Extension<Database>) -> Result<Json<Vec<User>>, AppError> {
    let users = db.all_users().await?;
    Ok(Json(users))
}
