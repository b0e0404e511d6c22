use axum::{
    Json, Router,
    body::{Body, Bytes},
    extract::{Path, Query, State},
    http::{HeaderMap, Request, header::CONTENT_TYPE},
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{
        common::{ActionResponse, UploadResponse},
        contest::{
            ContestListQuery, ContestListResponse, ContestResponse, CreateContestRequest,
            DeleteContestQuery, UpdateContestRequest,
        },
        enrollment::{
            BulkEnrollRequest, BulkUnenrollRequest, EnrollmentResponse, UnenrollResponse,
        },
        points::{PlayerPointsItem, UpsertPlayerPointsRequest},
    },
    error::AppError,
    services::{contest_service, enrollment_service, points_service, settings_service},
    state::SharedState,
};

const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Admin-only management endpoints for contests, enrollments, and scoring.
pub fn router(state: SharedState) -> Router<SharedState> {
    Router::new()
        .route("/admin/contests", get(list_contests).post(create_contest))
        .route(
            "/admin/contests/{id}",
            get(get_contest).put(update_contest).delete(delete_contest),
        )
        .route("/admin/contests/{id}/enroll-teams", post(enroll_teams))
        .route("/admin/contests/{id}/enrollments", delete(unenroll))
        .route(
            "/admin/contests/{id}/player-points",
            get(get_player_points).put(upsert_player_points),
        )
        .route("/admin/contests/{id}/logo", post(upload_contest_logo))
        .route("/admin/settings/logo", post(upload_default_logo))
        .route_layer(middleware::from_fn_with_state(state, require_admin_token))
}

/// Page through contests with optional status and search filters.
#[utoipa::path(
    get,
    path = "/admin/contests",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Admin API token"),
    ContestListQuery),
    responses((status = 200, description = "One page of contests", body = ContestListResponse))
)]
pub async fn list_contests(
    State(state): State<SharedState>,
    Query(query): Query<ContestListQuery>,
) -> Result<Json<ContestListResponse>, AppError> {
    Ok(Json(contest_service::list_contests(&state, query).await?))
}

/// Create a contest.
#[utoipa::path(
    post,
    path = "/admin/contests",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Admin API token")),
    request_body = CreateContestRequest,
    responses(
        (status = 200, description = "Contest created", body = ContestResponse),
        (status = 409, description = "Contest code already exists")
    )
)]
pub async fn create_contest(
    State(state): State<SharedState>,
    Json(payload): Json<CreateContestRequest>,
) -> Result<Json<ContestResponse>, AppError> {
    payload.validate()?;
    Ok(Json(contest_service::create_contest(&state, payload).await?))
}

/// Fetch one contest.
#[utoipa::path(
    get,
    path = "/admin/contests/{id}",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Admin API token"),
    ("id" = Uuid, Path, description = "Contest identifier")),
    responses((status = 200, description = "Contest", body = ContestResponse))
)]
pub async fn get_contest(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ContestResponse>, AppError> {
    Ok(Json(contest_service::get_contest(&state, id).await?))
}

/// Partially update a contest; absent fields keep their stored values.
#[utoipa::path(
    put,
    path = "/admin/contests/{id}",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Admin API token"),
    ("id" = Uuid, Path, description = "Contest identifier")),
    request_body = UpdateContestRequest,
    responses((status = 200, description = "Contest updated", body = ContestResponse))
)]
pub async fn update_contest(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateContestRequest>,
) -> Result<Json<ContestResponse>, AppError> {
    payload.validate()?;
    Ok(Json(contest_service::update_contest(&state, id, payload).await?))
}

/// Delete a contest. With live enrollments the call is rejected unless
/// `force=true`, which removes them first.
#[utoipa::path(
    delete,
    path = "/admin/contests/{id}",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Admin API token"),
    ("id" = Uuid, Path, description = "Contest identifier"),
    DeleteContestQuery),
    responses(
        (status = 200, description = "Contest deleted", body = ActionResponse),
        (status = 409, description = "Contest has active enrollments and force is not set")
    )
)]
pub async fn delete_contest(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Query(query): Query<DeleteContestQuery>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(
        contest_service::delete_contest(&state, id, query.force).await?,
    ))
}

/// Enroll a batch of teams into a contest.
#[utoipa::path(
    post,
    path = "/admin/contests/{id}/enroll-teams",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Admin API token"),
    ("id" = Uuid, Path, description = "Contest identifier")),
    request_body = BulkEnrollRequest,
    responses((status = 200, description = "Enrollments created", body = [EnrollmentResponse]))
)]
pub async fn enroll_teams(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<BulkEnrollRequest>,
) -> Result<Json<Vec<EnrollmentResponse>>, AppError> {
    let outcome = enrollment_service::bulk_enroll(&state, id, payload).await?;
    Ok(Json(outcome.log_and_take("bulk_enroll")))
}

/// Remove a batch of enrollments from a contest.
#[utoipa::path(
    delete,
    path = "/admin/contests/{id}/enrollments",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Admin API token"),
    ("id" = Uuid, Path, description = "Contest identifier")),
    request_body = BulkUnenrollRequest,
    responses((status = 200, description = "Enrollments removed", body = UnenrollResponse))
)]
pub async fn unenroll(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<BulkUnenrollRequest>,
) -> Result<Json<UnenrollResponse>, AppError> {
    let outcome = enrollment_service::bulk_unenroll(&state, id, payload).await?;
    Ok(Json(outcome.log_and_take("bulk_unenroll")))
}

/// Every points override recorded for a contest.
#[utoipa::path(
    get,
    path = "/admin/contests/{id}/player-points",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Admin API token"),
    ("id" = Uuid, Path, description = "Contest identifier")),
    responses((status = 200, description = "Points overrides", body = [PlayerPointsItem]))
)]
pub async fn get_player_points(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<PlayerPointsItem>>, AppError> {
    Ok(Json(points_service::get_contest_points(&state, id).await?))
}

/// Upsert a batch of points overrides for a contest.
#[utoipa::path(
    put,
    path = "/admin/contests/{id}/player-points",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Admin API token"),
    ("id" = Uuid, Path, description = "Contest identifier")),
    request_body = UpsertPlayerPointsRequest,
    responses((status = 200, description = "Overrides upserted", body = [PlayerPointsItem]))
)]
pub async fn upsert_player_points(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpsertPlayerPointsRequest>,
) -> Result<Json<Vec<PlayerPointsItem>>, AppError> {
    let outcome = points_service::upsert_contest_points(&state, id, payload.updates).await?;
    Ok(Json(outcome.log_and_take("upsert_player_points")))
}

fn request_content_type(headers: &HeaderMap) -> String {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_owned()
}

/// Upload a logo image for a contest. The request body is the raw image.
#[utoipa::path(
    post,
    path = "/admin/contests/{id}/logo",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Admin API token"),
    ("id" = Uuid, Path, description = "Contest identifier")),
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses((status = 200, description = "Logo uploaded", body = UploadResponse))
)]
pub async fn upload_contest_logo(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<UploadResponse>, AppError> {
    let content_type = request_content_type(&headers);
    let outcome =
        contest_service::upload_logo(&state, id, content_type, body.to_vec()).await?;
    Ok(Json(outcome.log_and_take("upload_contest_logo")))
}

/// Upload the platform-wide default contest logo.
#[utoipa::path(
    post,
    path = "/admin/settings/logo",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Admin API token")),
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses((status = 200, description = "Default logo uploaded", body = UploadResponse))
)]
pub async fn upload_default_logo(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<UploadResponse>, AppError> {
    let content_type = request_content_type(&headers);
    let outcome =
        settings_service::upload_default_logo(&state, content_type, body.to_vec()).await?;
    Ok(Json(outcome.log_and_take("upload_default_logo")))
}

async fn require_admin_token(
    State(state): State<SharedState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let provided = req
        .headers()
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_owned())
        .ok_or_else(|| {
            AppError::Unauthorized("missing admin token header `X-Admin-Token`".into())
        })?;

    match state.config().admin_token() {
        Some(token) if token == provided => Ok(next.run(req).await),
        Some(_) => Err(AppError::Unauthorized("invalid admin token".into())),
        None => Err(AppError::Unauthorized("no admin token configured".into())),
    }
}
