//! Contest lifecycle: creation, partial updates, listing, deletion (with the
//! forced enrollment sweep), and logo handling.

use std::sync::Arc;

use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    dao::{
        entity_store::{ContestQuery, EntityStore},
        models::{ContestEntity, EnrollmentStatus},
    },
    dto::{
        common::{ActionResponse, UploadResponse},
        contest::{
            ContestListQuery, ContestListResponse, ContestResponse, CreateContestRequest,
            UpdateContestRequest,
        },
    },
    error::ServiceError,
    ist::{now_ist, parse_ist},
    services::{
        settings_service,
        side_effects::{DegradedWrite, MutationOutcome},
    },
    state::SharedState,
};

const DEFAULT_PAGE_SIZE: u64 = 10;
const MAX_PAGE_SIZE: u64 = 100;

/// Parse a client-supplied timestamp or reject the request.
fn parse_timestamp(field: &str, raw: &str) -> Result<OffsetDateTime, ServiceError> {
    parse_ist(raw)
        .ok_or_else(|| ServiceError::InvalidInput(format!("invalid timestamp for `{field}`")))
}

/// Fetch a contest or report it missing. Shared with the enrollment and
/// points components, which resolve the contest before any mutation.
pub(crate) async fn resolve_contest(
    store: &Arc<dyn EntityStore>,
    id: Uuid,
) -> Result<ContestEntity, ServiceError> {
    store
        .find_contest(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("contest `{id}` not found")))
}

/// Render a contest with the default-logo fallback applied.
async fn shape(state: &SharedState, contest: ContestEntity) -> ContestResponse {
    let default_logo = settings_service::default_logo_url(state).await;
    ContestResponse::from_entity(contest, default_logo)
}

/// Create a contest after checking the window ordering and code uniqueness.
pub async fn create_contest(
    state: &SharedState,
    request: CreateContestRequest,
) -> Result<ContestResponse, ServiceError> {
    let store = state.require_entity_store().await?;

    let start_at = parse_timestamp("start_at", &request.start_at)?;
    let end_at = parse_timestamp("end_at", &request.end_at)?;
    if start_at >= end_at {
        return Err(ServiceError::InvalidInput(
            "start_at must be before end_at".into(),
        ));
    }

    if store
        .find_contest_by_code(request.code.clone())
        .await?
        .is_some()
    {
        return Err(ServiceError::Conflict(format!(
            "contest code `{}` already exists",
            request.code
        )));
    }

    let now = now_ist();
    let contest = ContestEntity {
        id: Uuid::new_v4(),
        code: request.code,
        name: request.name,
        description: request.description,
        logo_url: request.logo_url,
        logo_file_id: None,
        start_at,
        end_at,
        status: request.status,
        visibility: request.visibility,
        points_scope: request.points_scope,
        contest_type: request.contest_type,
        allowed_teams: request.allowed_teams,
        created_at: now,
        updated_at: now,
    };
    store.insert_contest(contest.clone()).await?;

    Ok(shape(state, contest).await)
}

/// Fetch one contest for administration.
pub async fn get_contest(state: &SharedState, id: Uuid) -> Result<ContestResponse, ServiceError> {
    let store = state.require_entity_store().await?;
    let contest = resolve_contest(&store, id).await?;
    Ok(shape(state, contest).await)
}

/// Page through contests, newest window first.
pub async fn list_contests(
    state: &SharedState,
    query: ContestListQuery,
) -> Result<ContestListResponse, ServiceError> {
    let store = state.require_entity_store().await?;

    let page = query.page.unwrap_or(1).max(1);
    let page_size = query
        .page_size
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);

    let result = store
        .list_contests(ContestQuery {
            status: query.status,
            search: query.search,
            page,
            page_size,
        })
        .await?;

    // Resolve the fallback once for the whole page.
    let default_logo = settings_service::default_logo_url(state).await;
    let contests = result
        .contests
        .into_iter()
        .map(|contest| ContestResponse::from_entity(contest, default_logo.clone()))
        .collect();

    Ok(ContestListResponse {
        contests,
        total: result.total,
        page,
        page_size,
    })
}

/// Apply a partial update. The stored `code` always wins; the merged window
/// must remain strictly ordered.
pub async fn update_contest(
    state: &SharedState,
    id: Uuid,
    request: UpdateContestRequest,
) -> Result<ContestResponse, ServiceError> {
    let store = state.require_entity_store().await?;
    let mut contest = resolve_contest(&store, id).await?;

    let start_at = match &request.start_at {
        Some(raw) => parse_timestamp("start_at", raw)?,
        None => contest.start_at,
    };
    let end_at = match &request.end_at {
        Some(raw) => parse_timestamp("end_at", raw)?,
        None => contest.end_at,
    };
    if start_at >= end_at {
        return Err(ServiceError::InvalidInput(
            "start_at must be before end_at".into(),
        ));
    }

    contest.start_at = start_at;
    contest.end_at = end_at;
    if let Some(name) = request.name {
        contest.name = name;
    }
    if let Some(description) = request.description {
        contest.description = Some(description);
    }
    if let Some(logo_url) = request.logo_url {
        contest.logo_url = Some(logo_url);
    }
    if let Some(status) = request.status {
        contest.status = status;
    }
    if let Some(visibility) = request.visibility {
        contest.visibility = visibility;
    }
    if let Some(points_scope) = request.points_scope {
        contest.points_scope = points_scope;
    }
    if let Some(contest_type) = request.contest_type {
        contest.contest_type = contest_type;
    }
    if let Some(allowed_teams) = request.allowed_teams {
        contest.allowed_teams = allowed_teams;
    }
    contest.updated_at = now_ist();

    store.save_contest(contest.clone()).await?;
    Ok(shape(state, contest).await)
}

/// Delete a contest. With live enrollments the call fails unless forced, in
/// which case every active enrollment is flipped to removed first, one
/// document at a time, and the contest record is deleted last. The sweep is
/// not transactional; each step is idempotent so a crashed delete can simply
/// be retried.
pub async fn delete_contest(
    state: &SharedState,
    id: Uuid,
    force: bool,
) -> Result<ActionResponse, ServiceError> {
    let store = state.require_entity_store().await?;
    resolve_contest(&store, id).await?;

    let active = store.count_active_enrollments(id).await?;
    if active > 0 {
        if !force {
            return Err(ServiceError::Conflict(
                "contest has active enrollments; use force=true to unenroll and delete".into(),
            ));
        }

        for mut enrollment in store.list_active_enrollments(id).await? {
            enrollment.status = EnrollmentStatus::Removed;
            enrollment.removed_at = Some(now_ist());
            store.save_enrollment(enrollment).await?;
        }
    }

    if !store.delete_contest(id).await? {
        return Err(ServiceError::NotFound(format!("contest `{id}` not found")));
    }
    Ok(ActionResponse::new("Contest deleted"))
}

/// Store a new logo for a contest and point the contest at it. Cleanup of the
/// previously stored object is best-effort.
pub async fn upload_logo(
    state: &SharedState,
    id: Uuid,
    content_type: String,
    data: Vec<u8>,
) -> Result<MutationOutcome<UploadResponse>, ServiceError> {
    if data.is_empty() {
        return Err(ServiceError::InvalidInput("empty logo upload".into()));
    }

    let store = state.require_entity_store().await?;
    let objects = state.require_object_store().await?;
    let mut contest = resolve_contest(&store, id).await?;

    let mut degraded = Vec::new();
    if let Some(old_id) = contest.logo_file_id
        && let Err(err) = objects.delete_object(old_id).await
    {
        degraded.push(DegradedWrite::new(format!("logo object {old_id}"), &err));
    }

    let file_id = Uuid::new_v4();
    objects.put_object(file_id, content_type, data).await?;

    let url = format!("/contests/{id}/logo");
    contest.logo_file_id = Some(file_id);
    contest.logo_url = Some(url.clone());
    contest.updated_at = now_ist();
    store.save_contest(contest).await?;

    Ok(MutationOutcome {
        value: UploadResponse {
            url,
            message: "Logo uploaded successfully".to_owned(),
        },
        degraded,
    })
}

/// Raw logo bytes for a contest, falling back to the platform default.
pub async fn contest_logo_bytes(
    state: &SharedState,
    id: Uuid,
) -> Result<(String, Vec<u8>), ServiceError> {
    let store = state.require_entity_store().await?;
    let contest = resolve_contest(&store, id).await?;

    if let Some(file_id) = contest.logo_file_id {
        let objects = state.require_object_store().await?;
        if let Some(object) = objects.get_object(file_id).await? {
            return Ok((object.content_type, object.data));
        }
    }

    settings_service::default_logo_bytes(state).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dao::models::{ContestStatus, ContestType, PlayerEntity, TeamEntity},
        dto::{enrollment::BulkEnrollRequest, points::PlayerPointsUpdate},
        services::{enrollment_service, points_service},
        state::test_support::memory_state,
    };
    use time::macros::datetime;

    fn create_request(code: &str) -> CreateContestRequest {
        CreateContestRequest {
            code: code.to_owned(),
            name: format!("Contest {code}"),
            description: None,
            logo_url: None,
            start_at: "2024-01-01T00:00:00".to_owned(),
            end_at: "2024-01-02T00:00:00".to_owned(),
            status: ContestStatus::default(),
            visibility: Default::default(),
            points_scope: Default::default(),
            contest_type: ContestType::Full,
            allowed_teams: Vec::new(),
        }
    }

    fn team(name: &str) -> TeamEntity {
        let now = now_ist();
        TeamEntity {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: name.to_owned(),
            total_points: 0.0,
            current_contest_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn player(name: &str) -> PlayerEntity {
        let now = now_ist();
        PlayerEntity {
            id: Uuid::new_v4(),
            name: name.to_owned(),
            team: Some("IND".to_owned()),
            points: 0.0,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn create_rejects_inverted_window() {
        let (state, _store) = memory_state().await;
        let mut request = create_request("C1");
        request.end_at = "2023-12-31T00:00:00".to_owned();

        let err = create_contest(&state, request).await.expect_err("rejects");
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn create_rejects_duplicate_code() {
        let (state, _store) = memory_state().await;
        create_contest(&state, create_request("C1")).await.expect("first");

        let err = create_contest(&state, create_request("C1"))
            .await
            .expect_err("duplicate");
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn create_parses_window_as_ist_and_stamps_now() {
        let (state, store) = memory_state().await;
        let response = create_contest(&state, create_request("C1")).await.expect("create");

        let stored = store.contest(response.id).expect("persisted");
        assert_eq!(stored.start_at, datetime!(2024-01-01 00:00 +5:30));
        assert_eq!(stored.end_at, datetime!(2024-01-02 00:00 +5:30));
        assert!(stored.start_at < stored.end_at);
        assert_eq!(stored.created_at, stored.updated_at);
    }

    #[tokio::test]
    async fn update_ignores_code_and_validates_merged_window() {
        let (state, store) = memory_state().await;
        let created = create_contest(&state, create_request("C1")).await.expect("create");

        let updated = update_contest(
            &state,
            created.id,
            UpdateContestRequest {
                code: Some("SOMETHING-ELSE".to_owned()),
                name: Some("Renamed".to_owned()),
                ..Default::default()
            },
        )
        .await
        .expect("update");
        assert_eq!(updated.code, "C1");
        assert_eq!(updated.name, "Renamed");
        assert_eq!(store.contest(created.id).expect("stored").code, "C1");

        // Moving the start past the existing end must be rejected.
        let err = update_contest(
            &state,
            created.id,
            UpdateContestRequest {
                start_at: Some("2024-02-01T00:00:00".to_owned()),
                ..Default::default()
            },
        )
        .await
        .expect_err("inverted");
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn update_unknown_contest_is_not_found() {
        let (state, _store) = memory_state().await;
        let err = update_contest(&state, Uuid::new_v4(), UpdateContestRequest::default())
            .await
            .expect_err("missing");
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn listing_filters_searches_and_paginates() {
        let (state, _store) = memory_state().await;
        let mut first = create_request("IPL-2024");
        first.name = "Premier League".to_owned();
        create_contest(&state, first).await.expect("first");

        let mut second = create_request("WC-2024");
        second.name = "World Cup".to_owned();
        second.start_at = "2024-03-01T00:00:00".to_owned();
        second.end_at = "2024-03-02T00:00:00".to_owned();
        create_contest(&state, second).await.expect("second");

        let all = list_contests(&state, ContestListQuery::default()).await.expect("list");
        assert_eq!(all.total, 2);
        // Newest window first.
        assert_eq!(all.contests[0].code, "WC-2024");

        let searched = list_contests(
            &state,
            ContestListQuery {
                search: Some("premier".to_owned()),
                ..Default::default()
            },
        )
        .await
        .expect("search");
        assert_eq!(searched.total, 1);
        assert_eq!(searched.contests[0].code, "IPL-2024");

        let paged = list_contests(
            &state,
            ContestListQuery {
                page: Some(2),
                page_size: Some(1),
                ..Default::default()
            },
        )
        .await
        .expect("page");
        assert_eq!(paged.total, 2);
        assert_eq!(paged.contests.len(), 1);
        assert_eq!(paged.contests[0].code, "IPL-2024");

        let clamped = list_contests(
            &state,
            ContestListQuery {
                page: Some(0),
                page_size: Some(1000),
                ..Default::default()
            },
        )
        .await
        .expect("clamped");
        assert_eq!(clamped.page, 1);
        assert_eq!(clamped.page_size, 100);

        // A page number near u64::MAX must not overflow the skip arithmetic.
        let far_out = list_contests(
            &state,
            ContestListQuery {
                page: Some(u64::MAX),
                page_size: Some(100),
                ..Default::default()
            },
        )
        .await
        .expect("huge page");
        assert_eq!(far_out.total, 2);
        assert!(far_out.contests.is_empty());
    }

    #[tokio::test]
    async fn delete_without_enrollments_removes_contest() {
        let (state, store) = memory_state().await;
        let created = create_contest(&state, create_request("C1")).await.expect("create");

        delete_contest(&state, created.id, false).await.expect("delete");
        assert!(store.contest(created.id).is_none());
    }

    #[tokio::test]
    async fn delete_with_enrollments_requires_force() {
        let (state, store) = memory_state().await;
        let created = create_contest(&state, create_request("C1")).await.expect("create");
        let roster = team("T1");
        store.seed_team(roster.clone());
        enrollment_service::bulk_enroll(
            &state,
            created.id,
            BulkEnrollRequest {
                team_ids: vec![roster.id.to_string()],
            },
        )
        .await
        .expect("enroll");

        let err = delete_contest(&state, created.id, false)
            .await
            .expect_err("blocked");
        assert!(matches!(err, ServiceError::Conflict(_)));
        assert!(store.contest(created.id).is_some());
        assert!(store.all_enrollments().iter().all(|e| e.is_active()));

        delete_contest(&state, created.id, true).await.expect("forced");
        assert!(store.contest(created.id).is_none());
        for enrollment in store.all_enrollments() {
            assert!(!enrollment.is_active());
            assert!(enrollment.removed_at.is_some());
        }
    }

    #[tokio::test]
    async fn logo_falls_back_to_default_when_unset() {
        let (state, _store) = memory_state().await;
        let created = create_contest(&state, create_request("C1")).await.expect("create");
        assert_eq!(created.logo_url, None);

        settings_service::upload_default_logo(&state, "image/png".into(), vec![0xff])
            .await
            .expect("default logo");
        let shaped = get_contest(&state, created.id).await.expect("get");
        assert_eq!(shaped.logo_url.as_deref(), Some("/settings/logo"));
    }

    #[tokio::test]
    async fn uploading_logo_replaces_object_and_url() {
        let (state, store) = memory_state().await;
        let created = create_contest(&state, create_request("C1")).await.expect("create");

        let outcome = upload_logo(&state, created.id, "image/png".into(), vec![1])
            .await
            .expect("upload");
        assert!(outcome.degraded.is_empty());
        assert_eq!(outcome.value.url, format!("/contests/{}/logo", created.id));

        let stored = store.contest(created.id).expect("stored");
        assert!(stored.logo_file_id.is_some());
        let (content_type, data) = contest_logo_bytes(&state, created.id).await.expect("bytes");
        assert_eq!(content_type, "image/png");
        assert_eq!(data, vec![1]);
    }

    /// End-to-end pass over the whole engine: create, enroll, score, and the
    /// two delete modes.
    #[tokio::test]
    async fn full_contest_lifecycle_scenario() {
        let (state, store) = memory_state().await;
        let contest = create_contest(&state, create_request("C1")).await.expect("create");

        let roster = team("T1");
        store.seed_team(roster.clone());
        let enrolled = enrollment_service::bulk_enroll(
            &state,
            contest.id,
            BulkEnrollRequest {
                team_ids: vec![roster.id.to_string()],
            },
        )
        .await
        .expect("enroll")
        .value;
        assert_eq!(enrolled.len(), 1);

        let scored = player("P1");
        store.seed_player(scored.clone());
        let points = points_service::upsert_contest_points(
            &state,
            contest.id,
            vec![PlayerPointsUpdate {
                player_id: scored.id.to_string(),
                points: 42.5,
            }],
        )
        .await
        .expect("upsert")
        .value;
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].points, 42.5);
        assert_eq!(
            store.player(scored.id).expect("player").points,
            42.5,
            "full contest mirrors into the global record"
        );

        let read_back = points_service::get_contest_points(&state, contest.id)
            .await
            .expect("read");
        assert_eq!(read_back.len(), 1);
        assert_eq!(read_back[0].points, 42.5);

        let err = delete_contest(&state, contest.id, false)
            .await
            .expect_err("blocked by enrollment");
        assert!(matches!(err, ServiceError::Conflict(_)));

        delete_contest(&state, contest.id, true).await.expect("forced");
        assert!(store.contest(contest.id).is_none());
        let enrollment = store.enrollment(enrolled[0].id).expect("still recorded");
        assert!(!enrollment.is_active());
    }
}
