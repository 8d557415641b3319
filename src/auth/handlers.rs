use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{
            LoginResponse, LookupQuery, MessageResponse, PublicUser, RegisterResponse, UserForm,
        },
        errors::AccountError,
        extractors::{FormFields, QueryFields},
        services,
    },
    state::AppState,
};

/// Routes called by the storefront.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/api/register/", post(register))
        .route("/api/login/", post(login))
        .route("/api/authorize/", post(authorize))
        .route("/api/logout/", post(logout))
}

/// Routes called by the product service.
pub fn lookup_routes() -> Router<AppState> {
    Router::new().route("/api/user/", get(get_user))
}

#[instrument(skip(state, fields))]
pub async fn register(
    State(state): State<AppState>,
    FormFields(fields): FormFields,
) -> Result<Json<RegisterResponse>, AccountError> {
    let user = services::register(&state, UserForm::from_fields(fields)).await?;
    Ok(Json(RegisterResponse {
        message: "User registered!",
        id: user.id,
    }))
}

#[instrument(skip(state, fields))]
pub async fn login(
    State(state): State<AppState>,
    FormFields(fields): FormFields,
) -> Result<Json<LoginResponse>, AccountError> {
    let session = services::login(&state, UserForm::from_fields(fields)).await?;
    Ok(Json(LoginResponse {
        message: "User logged in!",
        token: session.token,
        role: session.user.role,
    }))
}

#[instrument(skip(state, fields))]
pub async fn authorize(
    State(state): State<AppState>,
    mut fields: FormFields,
) -> Result<Json<PublicUser>, AccountError> {
    let user = services::authorize(&state, &fields.take("token")).await?;
    Ok(Json(user))
}

#[instrument(skip(state, fields))]
pub async fn logout(
    State(state): State<AppState>,
    mut fields: FormFields,
) -> Result<Json<MessageResponse>, AccountError> {
    services::logout(&state, &fields.take("token")).await?;
    Ok(Json(MessageResponse::new("User logged out")))
}

#[instrument(skip(state, fields))]
pub async fn get_user(
    State(state): State<AppState>,
    QueryFields(fields): QueryFields,
) -> Result<Json<PublicUser>, AccountError> {
    let user = services::lookup(&state, LookupQuery::from_fields(fields)).await?;
    Ok(Json(user))
}
