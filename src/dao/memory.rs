//! In-memory [`EntityStore`]/[`ObjectStore`] used by unit tests. Mirrors the
//! MongoDB store's query semantics (substring search, newest-window-first
//! ordering) and can simulate failing best-effort writes.

use std::{
    collections::HashMap,
    sync::{
        Mutex,
        atomic::{AtomicBool, Ordering},
    },
};

use futures::future::BoxFuture;
use uuid::Uuid;

use crate::dao::{
    entity_store::{ContestPage, ContestQuery, EntityStore, ObjectStore, StoredObject},
    models::{
        ContestEntity, EnrollmentEntity, PlayerEntity, PlayerPointsEntity, SettingsEntity,
        TeamEntity,
    },
    storage::{StorageError, StorageResult},
};

#[derive(Default)]
struct MemoryInner {
    contests: HashMap<Uuid, ContestEntity>,
    teams: HashMap<Uuid, TeamEntity>,
    players: HashMap<Uuid, PlayerEntity>,
    enrollments: HashMap<Uuid, EnrollmentEntity>,
    player_points: HashMap<Uuid, PlayerPointsEntity>,
    settings: Option<SettingsEntity>,
    objects: HashMap<Uuid, StoredObject>,
}

/// Test double for the persistence layer.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
    /// When set, every `save_team` fails, simulating a degraded cache write.
    pub fail_team_saves: AtomicBool,
    /// When set, every `save_player` fails, simulating a degraded mirror write.
    pub fail_player_saves: AtomicBool,
    /// When set, every `delete_object` fails, simulating stale-asset cleanup
    /// that could not run.
    pub fail_object_deletes: AtomicBool,
}

fn simulated_failure(target: &str) -> StorageError {
    StorageError::unavailable(
        format!("simulated {target} write failure"),
        std::io::Error::other("injected by test"),
    )
}

impl MemoryStore {
    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryInner> {
        self.inner.lock().expect("memory store lock poisoned")
    }

    /// Seed a team directly, bypassing the store trait.
    pub fn seed_team(&self, team: TeamEntity) {
        self.lock().teams.insert(team.id, team);
    }

    /// Seed a player directly, bypassing the store trait.
    pub fn seed_player(&self, player: PlayerEntity) {
        self.lock().players.insert(player.id, player);
    }

    /// Read a team back for assertions.
    pub fn team(&self, id: Uuid) -> Option<TeamEntity> {
        self.lock().teams.get(&id).cloned()
    }

    /// Read a player back for assertions.
    pub fn player(&self, id: Uuid) -> Option<PlayerEntity> {
        self.lock().players.get(&id).cloned()
    }

    /// Read an enrollment back for assertions.
    pub fn enrollment(&self, id: Uuid) -> Option<EnrollmentEntity> {
        self.lock().enrollments.get(&id).cloned()
    }

    /// Read a contest back for assertions.
    pub fn contest(&self, id: Uuid) -> Option<ContestEntity> {
        self.lock().contests.get(&id).cloned()
    }

    /// All enrollments, for invariant assertions across a whole scenario.
    pub fn all_enrollments(&self) -> Vec<EnrollmentEntity> {
        self.lock().enrollments.values().cloned().collect()
    }

    /// Read the settings singleton back for assertions.
    pub fn settings(&self) -> Option<SettingsEntity> {
        self.lock().settings.clone()
    }
}

fn matches_query(contest: &ContestEntity, query: &ContestQuery) -> bool {
    if let Some(status) = query.status
        && contest.status != status
    {
        return false;
    }
    if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
        let needle = search.to_lowercase();
        return contest.code.to_lowercase().contains(&needle)
            || contest.name.to_lowercase().contains(&needle);
    }
    true
}

impl EntityStore for MemoryStore {
    fn insert_contest(&self, contest: ContestEntity) -> BoxFuture<'static, StorageResult<()>> {
        self.lock().contests.insert(contest.id, contest);
        Box::pin(async { Ok(()) })
    }

    fn save_contest(&self, contest: ContestEntity) -> BoxFuture<'static, StorageResult<()>> {
        self.lock().contests.insert(contest.id, contest);
        Box::pin(async { Ok(()) })
    }

    fn find_contest(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<ContestEntity>>> {
        let found = self.lock().contests.get(&id).cloned();
        Box::pin(async move { Ok(found) })
    }

    fn find_contest_by_code(
        &self,
        code: String,
    ) -> BoxFuture<'static, StorageResult<Option<ContestEntity>>> {
        let found = self
            .lock()
            .contests
            .values()
            .find(|contest| contest.code == code)
            .cloned();
        Box::pin(async move { Ok(found) })
    }

    fn list_contests(
        &self,
        query: ContestQuery,
    ) -> BoxFuture<'static, StorageResult<ContestPage>> {
        let mut matching: Vec<ContestEntity> = self
            .lock()
            .contests
            .values()
            .filter(|contest| matches_query(contest, &query))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.start_at.cmp(&a.start_at));

        let total = matching.len() as u64;
        let skip = query
            .page
            .saturating_sub(1)
            .saturating_mul(query.page_size) as usize;
        let contests = matching
            .into_iter()
            .skip(skip)
            .take(query.page_size as usize)
            .collect();
        Box::pin(async move { Ok(ContestPage { contests, total }) })
    }

    fn delete_contest(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let existed = self.lock().contests.remove(&id).is_some();
        Box::pin(async move { Ok(existed) })
    }

    fn find_team(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<TeamEntity>>> {
        let found = self.lock().teams.get(&id).cloned();
        Box::pin(async move { Ok(found) })
    }

    fn save_team(&self, team: TeamEntity) -> BoxFuture<'static, StorageResult<()>> {
        if self.fail_team_saves.load(Ordering::SeqCst) {
            return Box::pin(async { Err(simulated_failure("team")) });
        }
        self.lock().teams.insert(team.id, team);
        Box::pin(async { Ok(()) })
    }

    fn insert_enrollment(
        &self,
        enrollment: EnrollmentEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        self.lock().enrollments.insert(enrollment.id, enrollment);
        Box::pin(async { Ok(()) })
    }

    fn save_enrollment(
        &self,
        enrollment: EnrollmentEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        self.lock().enrollments.insert(enrollment.id, enrollment);
        Box::pin(async { Ok(()) })
    }

    fn find_enrollment(
        &self,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<EnrollmentEntity>>> {
        let found = self.lock().enrollments.get(&id).cloned();
        Box::pin(async move { Ok(found) })
    }

    fn find_active_enrollment(
        &self,
        team_id: Uuid,
        contest_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<EnrollmentEntity>>> {
        let found = self
            .lock()
            .enrollments
            .values()
            .find(|e| e.team_id == team_id && e.contest_id == contest_id && e.is_active())
            .cloned();
        Box::pin(async move { Ok(found) })
    }

    fn list_active_enrollments(
        &self,
        contest_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<EnrollmentEntity>>> {
        let found: Vec<EnrollmentEntity> = self
            .lock()
            .enrollments
            .values()
            .filter(|e| e.contest_id == contest_id && e.is_active())
            .cloned()
            .collect();
        Box::pin(async move { Ok(found) })
    }

    fn count_active_enrollments(
        &self,
        contest_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<u64>> {
        let count = self
            .lock()
            .enrollments
            .values()
            .filter(|e| e.contest_id == contest_id && e.is_active())
            .count() as u64;
        Box::pin(async move { Ok(count) })
    }

    fn find_player(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>> {
        let found = self.lock().players.get(&id).cloned();
        Box::pin(async move { Ok(found) })
    }

    fn find_players(
        &self,
        ids: Vec<Uuid>,
    ) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>> {
        let guard = self.lock();
        let found: Vec<PlayerEntity> = ids
            .iter()
            .filter_map(|id| guard.players.get(id).cloned())
            .collect();
        drop(guard);
        Box::pin(async move { Ok(found) })
    }

    fn save_player(&self, player: PlayerEntity) -> BoxFuture<'static, StorageResult<()>> {
        if self.fail_player_saves.load(Ordering::SeqCst) {
            return Box::pin(async { Err(simulated_failure("player")) });
        }
        self.lock().players.insert(player.id, player);
        Box::pin(async { Ok(()) })
    }

    fn find_contest_points(
        &self,
        contest_id: Uuid,
        player_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<PlayerPointsEntity>>> {
        let found = self
            .lock()
            .player_points
            .values()
            .find(|p| p.contest_id == contest_id && p.player_id == player_id)
            .cloned();
        Box::pin(async move { Ok(found) })
    }

    fn list_contest_points(
        &self,
        contest_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<PlayerPointsEntity>>> {
        let found: Vec<PlayerPointsEntity> = self
            .lock()
            .player_points
            .values()
            .filter(|p| p.contest_id == contest_id)
            .cloned()
            .collect();
        Box::pin(async move { Ok(found) })
    }

    fn insert_contest_points(
        &self,
        points: PlayerPointsEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        self.lock().player_points.insert(points.id, points);
        Box::pin(async { Ok(()) })
    }

    fn save_contest_points(
        &self,
        points: PlayerPointsEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        self.lock().player_points.insert(points.id, points);
        Box::pin(async { Ok(()) })
    }

    fn load_settings(&self) -> BoxFuture<'static, StorageResult<Option<SettingsEntity>>> {
        let found = self.lock().settings.clone();
        Box::pin(async move { Ok(found) })
    }

    fn save_settings(&self, settings: SettingsEntity) -> BoxFuture<'static, StorageResult<()>> {
        self.lock().settings = Some(settings);
        Box::pin(async { Ok(()) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

impl ObjectStore for MemoryStore {
    fn put_object(
        &self,
        id: Uuid,
        content_type: String,
        data: Vec<u8>,
    ) -> BoxFuture<'static, StorageResult<()>> {
        self.lock().objects.insert(
            id,
            StoredObject {
                content_type,
                data,
            },
        );
        Box::pin(async { Ok(()) })
    }

    fn get_object(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<StoredObject>>> {
        let found = self.lock().objects.get(&id).cloned();
        Box::pin(async move { Ok(found) })
    }

    fn delete_object(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        if self.fail_object_deletes.load(Ordering::SeqCst) {
            return Box::pin(async { Err(simulated_failure("object delete")) });
        }
        let existed = self.lock().objects.remove(&id).is_some();
        Box::pin(async move { Ok(existed) })
    }
}
