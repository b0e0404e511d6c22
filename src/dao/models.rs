use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;

/// Lifecycle status of a contest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum ContestStatus {
    /// Being configured, not yet visible to players.
    #[default]
    Draft,
    /// Open and scoring.
    Active,
    /// Temporarily halted.
    Paused,
    /// Finished; results are final.
    Completed,
    /// Kept for history only.
    Archived,
}

/// Who can see a contest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum ContestVisibility {
    /// Listed for everyone.
    #[default]
    Public,
    /// Only reachable by direct reference.
    Private,
}

/// Which slice of scoring data a contest considers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum PointsScope {
    /// Points accrued inside the contest window.
    #[default]
    TimeWindow,
    /// Points frozen at a single instant.
    Snapshot,
}

/// Scoring category of a contest. Only `full` contests mirror their overrides
/// into the player's global points field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum ContestType {
    /// Scoped single-day sub-view; never mirrored.
    Daily,
    /// Canonical season-long scoring context.
    #[default]
    Full,
}

/// Status of a team's enrollment into a contest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    /// Counts towards the contest.
    Active,
    /// Logically deleted; never reactivated.
    Removed,
}

/// Contest document persisted by the storage layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContestEntity {
    /// Primary key.
    pub id: Uuid,
    /// Immutable human-readable code, unique across contests.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Optional free-form description.
    pub description: Option<String>,
    /// Externally supplied logo URL, if any.
    pub logo_url: Option<String>,
    /// Reference into the object store for an uploaded logo.
    pub logo_file_id: Option<Uuid>,
    /// Start of the contest window (IST). Always strictly before `end_at`.
    #[serde(with = "time::serde::rfc3339")]
    pub start_at: OffsetDateTime,
    /// End of the contest window (IST).
    #[serde(with = "time::serde::rfc3339")]
    pub end_at: OffsetDateTime,
    /// Lifecycle status.
    pub status: ContestStatus,
    /// Listing visibility.
    pub visibility: ContestVisibility,
    /// Scoring data slice.
    pub points_scope: PointsScope,
    /// Scoring category (controls points mirroring).
    pub contest_type: ContestType,
    /// Real-world team names eligible for daily contests.
    pub allowed_teams: Vec<String>,
    /// Creation timestamp.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Last mutation timestamp.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Fantasy roster owned by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamEntity {
    /// Primary key.
    pub id: Uuid,
    /// Owning user.
    pub user_id: Uuid,
    /// Display name.
    pub name: String,
    /// Aggregate score across the roster.
    pub total_points: f64,
    /// Cache of the contest this team is actively enrolled in. May lag the
    /// enrollment records, which are the source of truth.
    pub current_contest_id: Option<Uuid>,
    /// Creation timestamp.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Last mutation timestamp.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Real-world player whose global points may be mirrored from a full contest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerEntity {
    /// Primary key.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Real-world team the player belongs to.
    pub team: Option<String>,
    /// Global headline score.
    pub points: f64,
    /// Creation timestamp.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Last mutation timestamp.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Link between one team and one contest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrollmentEntity {
    /// Primary key.
    pub id: Uuid,
    /// Enrolled team.
    pub team_id: Uuid,
    /// Owner of the enrolled team, denormalized for reporting.
    pub user_id: Uuid,
    /// Target contest.
    pub contest_id: Uuid,
    /// Active or removed. A removed enrollment is never reactivated.
    pub status: EnrollmentStatus,
    /// When the team was enrolled.
    #[serde(with = "time::serde::rfc3339")]
    pub enrolled_at: OffsetDateTime,
    /// Present iff `status` is removed.
    #[serde(with = "time::serde::rfc3339::option")]
    pub removed_at: Option<OffsetDateTime>,
}

impl EnrollmentEntity {
    /// Whether this enrollment still counts towards its contest.
    pub fn is_active(&self) -> bool {
        self.status == EnrollmentStatus::Active
    }
}

/// Contest-scoped points override for a single player. At most one per
/// (player, contest) pair; always upserted, never duplicated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerPointsEntity {
    /// Primary key.
    pub id: Uuid,
    /// Owning contest.
    pub contest_id: Uuid,
    /// Player the override applies to.
    pub player_id: Uuid,
    /// Contest-scoped points value.
    pub points: f64,
    /// Last upsert timestamp.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Fixed identity of the global settings singleton document.
pub const GLOBAL_SETTINGS_ID: &str = "global";

/// Process-wide settings singleton, lazily created on first read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsEntity {
    /// Always [`GLOBAL_SETTINGS_ID`].
    pub id: String,
    /// Object-store reference for the default contest logo.
    pub default_contest_logo_file_id: Option<Uuid>,
    /// Last mutation timestamp.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl SettingsEntity {
    /// Fresh singleton with no default logo configured.
    pub fn new(updated_at: OffsetDateTime) -> Self {
        Self {
            id: GLOBAL_SETTINGS_ID.to_owned(),
            default_contest_logo_file_id: None,
            updated_at,
        }
    }
}
