use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the contest backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::admin::list_contests,
        crate::routes::admin::create_contest,
        crate::routes::admin::get_contest,
        crate::routes::admin::update_contest,
        crate::routes::admin::delete_contest,
        crate::routes::admin::enroll_teams,
        crate::routes::admin::unenroll,
        crate::routes::admin::get_player_points,
        crate::routes::admin::upsert_player_points,
        crate::routes::admin::upload_contest_logo,
        crate::routes::admin::upload_default_logo,
        crate::routes::public::contest_logo,
        crate::routes::public::default_logo,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::common::ActionResponse,
            crate::dto::common::UploadResponse,
            crate::dto::contest::CreateContestRequest,
            crate::dto::contest::UpdateContestRequest,
            crate::dto::contest::ContestResponse,
            crate::dto::contest::ContestListResponse,
            crate::dto::enrollment::BulkEnrollRequest,
            crate::dto::enrollment::BulkUnenrollRequest,
            crate::dto::enrollment::EnrollmentResponse,
            crate::dto::enrollment::UnenrollResponse,
            crate::dto::points::PlayerPointsUpdate,
            crate::dto::points::UpsertPlayerPointsRequest,
            crate::dto::points::PlayerPointsItem,
            crate::dao::models::ContestStatus,
            crate::dao::models::ContestVisibility,
            crate::dao::models::PointsScope,
            crate::dao::models::ContestType,
            crate::dao::models::EnrollmentStatus,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "admin", description = "Contest, enrollment, and scoring administration"),
        (name = "public", description = "Unauthenticated logo assets"),
    )
)]
pub struct ApiDoc;
