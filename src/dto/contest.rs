use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::{ContestEntity, ContestStatus, ContestType, ContestVisibility, PointsScope},
    ist::format_ist,
};

/// Payload to create a contest. Timestamps are RFC3339 or naive ISO-8601
/// strings; naive values are read as IST wall-clock time.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateContestRequest {
    /// Immutable human-readable code, unique across contests.
    #[validate(length(min = 1, max = 100))]
    pub code: String,
    /// Display name.
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    /// Optional free-form description.
    pub description: Option<String>,
    /// Externally supplied logo URL.
    pub logo_url: Option<String>,
    /// Start of the contest window. Must be strictly before `end_at`.
    pub start_at: String,
    /// End of the contest window.
    pub end_at: String,
    /// Lifecycle status (defaults to draft).
    #[serde(default)]
    pub status: ContestStatus,
    /// Listing visibility (defaults to public).
    #[serde(default)]
    pub visibility: ContestVisibility,
    /// Scoring data slice (defaults to time_window).
    #[serde(default)]
    pub points_scope: PointsScope,
    /// Scoring category (defaults to full).
    #[serde(default)]
    pub contest_type: ContestType,
    /// Real-world team names eligible for daily contests.
    #[serde(default)]
    pub allowed_teams: Vec<String>,
}

/// Partial update of a contest. Absent fields keep their stored values; the
/// `code` field is accepted but ignored because codes are immutable.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct UpdateContestRequest {
    /// Ignored: contest codes never change after creation.
    pub code: Option<String>,
    /// New display name.
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New external logo URL.
    pub logo_url: Option<String>,
    /// New window start. The merged window must stay strictly ordered.
    pub start_at: Option<String>,
    /// New window end.
    pub end_at: Option<String>,
    /// New lifecycle status.
    pub status: Option<ContestStatus>,
    /// New visibility.
    pub visibility: Option<ContestVisibility>,
    /// New scoring data slice.
    pub points_scope: Option<PointsScope>,
    /// New scoring category.
    pub contest_type: Option<ContestType>,
    /// New allowed real-world team names.
    pub allowed_teams: Option<Vec<String>>,
}

/// Query parameters for the contest listing.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ContestListQuery {
    /// Restrict to contests with this status.
    pub status: Option<ContestStatus>,
    /// Case-insensitive substring match over code or name.
    pub search: Option<String>,
    /// 1-based page number (defaults to 1).
    pub page: Option<u64>,
    /// Rows per page (defaults to 10, capped at 100).
    pub page_size: Option<u64>,
}

/// Query flag controlling contest deletion with live enrollments.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct DeleteContestQuery {
    /// When true, active enrollments are removed before deletion.
    #[serde(default)]
    pub force: bool,
}

/// Contest as rendered to administrators. All timestamps are RFC3339 in IST.
#[derive(Debug, Serialize, ToSchema)]
pub struct ContestResponse {
    /// Contest identifier.
    pub id: Uuid,
    /// Immutable code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Effective logo URL after default fallback.
    pub logo_url: Option<String>,
    /// Object-store reference for an uploaded logo.
    pub logo_file_id: Option<Uuid>,
    /// Window start (IST).
    pub start_at: String,
    /// Window end (IST).
    pub end_at: String,
    /// Lifecycle status.
    pub status: ContestStatus,
    /// Listing visibility.
    pub visibility: ContestVisibility,
    /// Scoring data slice.
    pub points_scope: PointsScope,
    /// Scoring category.
    pub contest_type: ContestType,
    /// Allowed real-world team names.
    pub allowed_teams: Vec<String>,
    /// Creation timestamp (IST).
    pub created_at: String,
    /// Last mutation timestamp (IST).
    pub updated_at: String,
}

impl ContestResponse {
    /// Render a contest, substituting the platform default logo URL when the
    /// contest carries neither its own URL nor an uploaded file.
    pub fn from_entity(contest: ContestEntity, default_logo_url: Option<String>) -> Self {
        let logo_url = match (&contest.logo_url, contest.logo_file_id) {
            (Some(url), _) => Some(url.clone()),
            (None, Some(_)) => None,
            (None, None) => default_logo_url,
        };

        Self {
            id: contest.id,
            code: contest.code,
            name: contest.name,
            description: contest.description,
            logo_url,
            logo_file_id: contest.logo_file_id,
            start_at: format_ist(contest.start_at),
            end_at: format_ist(contest.end_at),
            status: contest.status,
            visibility: contest.visibility,
            points_scope: contest.points_scope,
            contest_type: contest.contest_type,
            allowed_teams: contest.allowed_teams,
            created_at: format_ist(contest.created_at),
            updated_at: format_ist(contest.updated_at),
        }
    }
}

/// One page of contests plus paging metadata.
#[derive(Debug, Serialize, ToSchema)]
pub struct ContestListResponse {
    /// Rows on this page, ordered by window start descending.
    pub contests: Vec<ContestResponse>,
    /// Total rows matching the filter.
    pub total: u64,
    /// 1-based page number served.
    pub page: u64,
    /// Page size served.
    pub page_size: u64,
}
