use axum::{
    Router,
    extract::{Path, State},
    http::header::CONTENT_TYPE,
    response::IntoResponse,
    routing::get,
};
use uuid::Uuid;

use crate::{
    error::AppError,
    services::{contest_service, settings_service},
    state::SharedState,
};

/// Unauthenticated read-only routes serving logo assets.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/contests/{id}/logo", get(contest_logo))
        .route("/settings/logo", get(default_logo))
}

/// Serve a contest's logo image, falling back to the platform default when
/// the contest has no uploaded logo of its own.
#[utoipa::path(
    get,
    path = "/contests/{id}/logo",
    tag = "public",
    params(("id" = Uuid, Path, description = "Contest identifier")),
    responses(
        (status = 200, description = "Logo image bytes"),
        (status = 404, description = "Neither the contest nor the platform has a logo")
    )
)]
pub async fn contest_logo(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let (content_type, data) = contest_service::contest_logo_bytes(&state, id).await?;
    Ok(([(CONTENT_TYPE, content_type)], data))
}

/// Serve the platform-wide default contest logo.
#[utoipa::path(
    get,
    path = "/settings/logo",
    tag = "public",
    responses(
        (status = 200, description = "Default logo image bytes"),
        (status = 404, description = "No default logo configured")
    )
)]
pub async fn default_logo(
    State(state): State<SharedState>,
) -> Result<impl IntoResponse, AppError> {
    let (content_type, data) = settings_service::default_logo_bytes(&state).await?;
    Ok(([(CONTENT_TYPE, content_type)], data))
}
