//! Bulk enrollment and unenrollment. Enrollment records are the source of
//! truth; the `current_contest_id` field on teams is a best-effort cache
//! maintained alongside them, and cache write failures degrade the response
//! instead of aborting the batch.

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    dao::{
        entity_store::EntityStore,
        models::{EnrollmentEntity, EnrollmentStatus, TeamEntity},
    },
    dto::enrollment::{BulkEnrollRequest, BulkUnenrollRequest, EnrollmentResponse, UnenrollResponse},
    error::ServiceError,
    ist::now_ist,
    services::{
        contest_service::resolve_contest,
        side_effects::{DegradedWrite, MutationOutcome},
    },
    state::SharedState,
};

fn parse_id(field: &str, raw: &str) -> Result<Uuid, ServiceError> {
    Uuid::parse_str(raw)
        .map_err(|_| ServiceError::InvalidInput(format!("invalid uuid in `{field}`: {raw}")))
}

/// Point a team's cache at a contest (or clear it). Failures are reported as
/// degraded writes, never as batch errors.
async fn write_team_cache(
    store: &Arc<dyn EntityStore>,
    mut team: TeamEntity,
    contest_id: Option<Uuid>,
    degraded: &mut Vec<DegradedWrite>,
) {
    team.current_contest_id = contest_id;
    team.updated_at = now_ist();
    if let Err(err) = store.save_team(team.clone()).await {
        degraded.push(DegradedWrite::new(
            format!("team {} current_contest_id", team.id),
            &err,
        ));
    }
}

/// Enroll a batch of teams into a contest.
///
/// Teams are processed in request order, one enrollment document at a time.
/// A team already actively enrolled is skipped silently; an unknown team id
/// aborts the batch with the enrollments created so far left in place.
pub async fn bulk_enroll(
    state: &SharedState,
    contest_id: Uuid,
    request: BulkEnrollRequest,
) -> Result<MutationOutcome<Vec<EnrollmentResponse>>, ServiceError> {
    let store = state.require_entity_store().await?;
    resolve_contest(&store, contest_id).await?;

    let mut created = Vec::new();
    let mut degraded = Vec::new();
    for raw_id in &request.team_ids {
        let team_id = parse_id("team_ids", raw_id)?;
        let team = store
            .find_team(team_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("team `{team_id}` not found")))?;

        if store
            .find_active_enrollment(team_id, contest_id)
            .await?
            .is_some()
        {
            continue;
        }

        let enrollment = EnrollmentEntity {
            id: Uuid::new_v4(),
            team_id,
            user_id: team.user_id,
            contest_id,
            status: EnrollmentStatus::Active,
            enrolled_at: now_ist(),
            removed_at: None,
        };
        store.insert_enrollment(enrollment.clone()).await?;

        write_team_cache(&store, team, Some(contest_id), &mut degraded).await;
        created.push(EnrollmentResponse::from(enrollment));
    }

    Ok(MutationOutcome {
        value: created,
        degraded,
    })
}

/// Flip one enrollment to removed and refresh its team's cache. The cache is
/// cleared only when the team has no other active enrollment in this contest.
async fn remove_enrollment(
    store: &Arc<dyn EntityStore>,
    mut enrollment: EnrollmentEntity,
    degraded: &mut Vec<DegradedWrite>,
) -> Result<(), ServiceError> {
    enrollment.status = EnrollmentStatus::Removed;
    enrollment.removed_at = Some(now_ist());
    store.save_enrollment(enrollment.clone()).await?;

    let remaining = store
        .find_active_enrollment(enrollment.team_id, enrollment.contest_id)
        .await?;
    if remaining.is_none()
        && let Some(team) = store.find_team(enrollment.team_id).await?
        && team.current_contest_id == Some(enrollment.contest_id)
    {
        write_team_cache(store, team, None, degraded).await;
    }
    Ok(())
}

/// Remove a batch of enrollments from a contest.
///
/// `enrollment_ids` are handled first, then `team_ids` against whatever state
/// the first pass left behind. Ids that do not parse or do not resolve to an
/// active enrollment of this contest are ignored; the response counts the
/// enrollments actually flipped.
pub async fn bulk_unenroll(
    state: &SharedState,
    contest_id: Uuid,
    request: BulkUnenrollRequest,
) -> Result<MutationOutcome<UnenrollResponse>, ServiceError> {
    let store = state.require_entity_store().await?;
    resolve_contest(&store, contest_id).await?;

    let mut unenrolled = 0u64;
    let mut degraded = Vec::new();

    for raw_id in request.enrollment_ids.unwrap_or_default() {
        let Ok(enrollment_id) = Uuid::parse_str(&raw_id) else {
            continue;
        };
        let Some(enrollment) = store.find_enrollment(enrollment_id).await? else {
            continue;
        };
        if enrollment.contest_id != contest_id || !enrollment.is_active() {
            continue;
        }
        remove_enrollment(&store, enrollment, &mut degraded).await?;
        unenrolled += 1;
    }

    for raw_id in request.team_ids.unwrap_or_default() {
        let Ok(team_id) = Uuid::parse_str(&raw_id) else {
            continue;
        };
        let Some(enrollment) = store.find_active_enrollment(team_id, contest_id).await? else {
            continue;
        };
        remove_enrollment(&store, enrollment, &mut degraded).await?;
        unenrolled += 1;
    }

    Ok(MutationOutcome {
        value: UnenrollResponse { unenrolled },
        degraded,
    })
}
