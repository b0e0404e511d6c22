use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dao::models::{EnrollmentEntity, EnrollmentStatus},
    ist::format_ist,
};

/// Payload enrolling a batch of teams into a contest.
#[derive(Debug, Deserialize, ToSchema)]
pub struct BulkEnrollRequest {
    /// Teams to enroll. Ids already actively enrolled are skipped silently.
    pub team_ids: Vec<String>,
}

/// Payload removing a batch of enrollments from a contest. Enrollment ids are
/// processed before team ids, against the state each step leaves behind.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct BulkUnenrollRequest {
    /// Enrollments to remove; must belong to the contest and be active,
    /// otherwise they are ignored.
    pub enrollment_ids: Option<Vec<String>>,
    /// Teams whose active enrollment in this contest should be removed.
    pub team_ids: Option<Vec<String>>,
}

/// Enrollment as rendered to administrators.
#[derive(Debug, Serialize, ToSchema)]
pub struct EnrollmentResponse {
    /// Enrollment identifier.
    pub id: Uuid,
    /// Enrolled team.
    pub team_id: Uuid,
    /// Owner of the enrolled team.
    pub user_id: Uuid,
    /// Target contest.
    pub contest_id: Uuid,
    /// Active or removed.
    pub status: EnrollmentStatus,
    /// When the team was enrolled (IST).
    pub enrolled_at: String,
    /// When the enrollment was removed (IST), if it was.
    pub removed_at: Option<String>,
}

impl From<EnrollmentEntity> for EnrollmentResponse {
    fn from(enrollment: EnrollmentEntity) -> Self {
        Self {
            id: enrollment.id,
            team_id: enrollment.team_id,
            user_id: enrollment.user_id,
            contest_id: enrollment.contest_id,
            status: enrollment.status,
            enrolled_at: format_ist(enrollment.enrolled_at),
            removed_at: enrollment.removed_at.map(format_ist),
        }
    }
}

/// Count of enrollments removed by a bulk unenroll call.
#[derive(Debug, Serialize, ToSchema)]
pub struct UnenrollResponse {
    /// Number of enrollments flipped to removed.
    pub unenrolled: u64,
}
