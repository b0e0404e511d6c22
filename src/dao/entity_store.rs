//! Persistence abstraction for the consistency engine. Each method maps to a
//! single-document read or write; the store offers no cross-document
//! transactions, so multi-step mutations in the service layer are sequences
//! of independently persisted steps.

use futures::future::BoxFuture;
use uuid::Uuid;

use crate::dao::{
    models::{
        ContestEntity, ContestStatus, EnrollmentEntity, PlayerEntity, PlayerPointsEntity,
        SettingsEntity, TeamEntity,
    },
    storage::StorageResult,
};

/// Filter and pagination parameters for the contest listing.
#[derive(Debug, Clone, Default)]
pub struct ContestQuery {
    /// Restrict to contests with this status.
    pub status: Option<ContestStatus>,
    /// Case-insensitive substring match over code or name.
    pub search: Option<String>,
    /// 1-based page number.
    pub page: u64,
    /// Rows per page.
    pub page_size: u64,
}

/// One page of contests ordered by `start_at` descending, plus the total
/// number of rows matching the filter.
#[derive(Debug, Clone)]
pub struct ContestPage {
    /// Rows on this page.
    pub contests: Vec<ContestEntity>,
    /// Total matching rows across all pages.
    pub total: u64,
}

/// Abstraction over the persistence layer for the engine's entities.
pub trait EntityStore: Send + Sync {
    /// Persist a brand-new contest.
    fn insert_contest(&self, contest: ContestEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Replace an existing contest document.
    fn save_contest(&self, contest: ContestEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Fetch a contest by id.
    fn find_contest(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<ContestEntity>>>;
    /// Fetch a contest by its immutable code.
    fn find_contest_by_code(
        &self,
        code: String,
    ) -> BoxFuture<'static, StorageResult<Option<ContestEntity>>>;
    /// Page through contests matching the query, newest window first.
    fn list_contests(&self, query: ContestQuery)
    -> BoxFuture<'static, StorageResult<ContestPage>>;
    /// Delete a contest document, reporting whether it existed.
    fn delete_contest(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>>;

    /// Fetch a team by id.
    fn find_team(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<TeamEntity>>>;
    /// Replace an existing team document.
    fn save_team(&self, team: TeamEntity) -> BoxFuture<'static, StorageResult<()>>;

    /// Persist a brand-new enrollment.
    fn insert_enrollment(
        &self,
        enrollment: EnrollmentEntity,
    ) -> BoxFuture<'static, StorageResult<()>>;
    /// Replace an existing enrollment document.
    fn save_enrollment(
        &self,
        enrollment: EnrollmentEntity,
    ) -> BoxFuture<'static, StorageResult<()>>;
    /// Fetch an enrollment by id.
    fn find_enrollment(
        &self,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<EnrollmentEntity>>>;
    /// The active enrollment for a (team, contest) pair, if any.
    fn find_active_enrollment(
        &self,
        team_id: Uuid,
        contest_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<EnrollmentEntity>>>;
    /// Every active enrollment for a contest.
    fn list_active_enrollments(
        &self,
        contest_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<EnrollmentEntity>>>;
    /// Number of active enrollments for a contest.
    fn count_active_enrollments(
        &self,
        contest_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<u64>>;

    /// Fetch a player by id.
    fn find_player(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>>;
    /// Fetch players by id for display joins; missing ids are simply absent.
    fn find_players(&self, ids: Vec<Uuid>)
    -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>>;
    /// Replace an existing player document.
    fn save_player(&self, player: PlayerEntity) -> BoxFuture<'static, StorageResult<()>>;

    /// The override for a (contest, player) pair, if any.
    fn find_contest_points(
        &self,
        contest_id: Uuid,
        player_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<PlayerPointsEntity>>>;
    /// Every override recorded for a contest.
    fn list_contest_points(
        &self,
        contest_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<PlayerPointsEntity>>>;
    /// Persist a brand-new override.
    fn insert_contest_points(
        &self,
        points: PlayerPointsEntity,
    ) -> BoxFuture<'static, StorageResult<()>>;
    /// Replace an existing override document.
    fn save_contest_points(
        &self,
        points: PlayerPointsEntity,
    ) -> BoxFuture<'static, StorageResult<()>>;

    /// Fetch the settings singleton, if it has been created.
    fn load_settings(&self) -> BoxFuture<'static, StorageResult<Option<SettingsEntity>>>;
    /// Upsert the settings singleton.
    fn save_settings(&self, settings: SettingsEntity) -> BoxFuture<'static, StorageResult<()>>;

    /// Ping the backend.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
}

/// A stored binary object together with its media type.
#[derive(Debug, Clone)]
pub struct StoredObject {
    /// MIME type recorded at upload time.
    pub content_type: String,
    /// Raw bytes.
    pub data: Vec<u8>,
}

/// Opaque byte-object store keyed by id, used for logo assets.
pub trait ObjectStore: Send + Sync {
    /// Store (or replace) an object under the given id.
    fn put_object(
        &self,
        id: Uuid,
        content_type: String,
        data: Vec<u8>,
    ) -> BoxFuture<'static, StorageResult<()>>;
    /// Fetch an object by id.
    fn get_object(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<StoredObject>>>;
    /// Delete an object, reporting whether it existed.
    fn delete_object(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>>;
}
