//! MongoDB-backed implementation of [`EntityStore`] and [`ObjectStore`].
//!
//! Every document is keyed by `_id = id.to_string()` and written with
//! `replace_one(..).upsert(true)`, which is the single-document atomic
//! read-modify-write primitive the engine relies on. Nothing here spans
//! multiple documents.

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{
    Collection,
    bson::{Binary, Document, doc, spec::BinarySubtype},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{MongoDaoError, MongoManager};
use crate::dao::{
    entity_store::{ContestPage, ContestQuery, EntityStore, ObjectStore, StoredObject},
    models::{
        ContestEntity, ContestStatus, EnrollmentEntity, EnrollmentStatus, GLOBAL_SETTINGS_ID,
        PlayerEntity, PlayerPointsEntity, SettingsEntity, TeamEntity,
    },
    storage::StorageResult,
};

pub(super) const CONTESTS: &str = "contests";
pub(super) const TEAMS: &str = "teams";
pub(super) const PLAYERS: &str = "players";
pub(super) const ENROLLMENTS: &str = "enrollments";
pub(super) const PLAYER_POINTS: &str = "player_contest_points";
const SETTINGS: &str = "global_settings";
const LOGO_FILES: &str = "logo_files";

/// MongoDB-backed store for all engine entities and logo objects.
#[derive(Clone)]
pub struct MongoEntityStore {
    mongo: MongoManager,
}

/// Mongo-local wrapper storing logo bytes as a BSON binary payload.
#[derive(Serialize, Deserialize)]
struct LogoObjectDocument {
    id: Uuid,
    content_type: String,
    data: Binary,
}

fn doc_id(id: Uuid) -> Document {
    doc! {"_id": id.to_string()}
}

fn status_str(status: ContestStatus) -> &'static str {
    match status {
        ContestStatus::Draft => "draft",
        ContestStatus::Active => "active",
        ContestStatus::Paused => "paused",
        ContestStatus::Completed => "completed",
        ContestStatus::Archived => "archived",
    }
}

fn active_enrollment_filter(contest_id: Uuid) -> Document {
    doc! {"contest_id": contest_id.to_string(), "status": "active"}
}

impl MongoEntityStore {
    /// Wrap a supervised MongoDB connection.
    pub fn new(mongo: MongoManager) -> Self {
        Self { mongo }
    }

    async fn collection<T: Send + Sync>(&self, name: &'static str) -> Collection<T> {
        self.mongo.database().await.collection::<T>(name)
    }

    async fn upsert<T>(&self, name: &'static str, id: Uuid, entity: &T) -> Result<(), MongoDaoError>
    where
        T: Serialize + Send + Sync,
    {
        self.collection::<T>(name)
            .await
            .replace_one(doc_id(id), entity)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::Write {
                collection: name,
                source,
            })?;
        Ok(())
    }

    async fn find_one<T>(
        &self,
        name: &'static str,
        filter: Document,
    ) -> Result<Option<T>, MongoDaoError>
    where
        T: for<'de> Deserialize<'de> + Send + Sync,
    {
        self.collection::<T>(name)
            .await
            .find_one(filter)
            .await
            .map_err(|source| MongoDaoError::Read {
                collection: name,
                source,
            })
    }

    async fn find_many<T>(
        &self,
        name: &'static str,
        filter: Document,
    ) -> Result<Vec<T>, MongoDaoError>
    where
        T: for<'de> Deserialize<'de> + Send + Sync,
    {
        self.collection::<T>(name)
            .await
            .find(filter)
            .await
            .map_err(|source| MongoDaoError::Read {
                collection: name,
                source,
            })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::Read {
                collection: name,
                source,
            })
    }

    async fn list_contests(&self, query: ContestQuery) -> Result<ContestPage, MongoDaoError> {
        let mut filter = doc! {};
        if let Some(status) = query.status {
            filter.insert("status", status_str(status));
        }
        if let Some(search) = query.search.filter(|s| !s.is_empty()) {
            filter.insert(
                "$or",
                vec![
                    doc! {"code": {"$regex": &search, "$options": "i"}},
                    doc! {"name": {"$regex": &search, "$options": "i"}},
                ],
            );
        }

        let collection = self.collection::<ContestEntity>(CONTESTS).await;
        let total = collection
            .count_documents(filter.clone())
            .await
            .map_err(|source| MongoDaoError::Read {
                collection: CONTESTS,
                source,
            })?;

        let skip = query.page.saturating_sub(1).saturating_mul(query.page_size);
        // IST-normalized RFC3339 strings compare chronologically, so sorting
        // the raw field matches sorting by instant.
        let contests = collection
            .find(filter)
            .sort(doc! {"start_at": -1})
            .skip(skip)
            .limit(query.page_size as i64)
            .await
            .map_err(|source| MongoDaoError::Read {
                collection: CONTESTS,
                source,
            })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::Read {
                collection: CONTESTS,
                source,
            })?;

        Ok(ContestPage { contests, total })
    }

    async fn delete_by_id(&self, name: &'static str, id: Uuid) -> Result<bool, MongoDaoError> {
        let result = self
            .collection::<Document>(name)
            .await
            .delete_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::Write {
                collection: name,
                source,
            })?;
        Ok(result.deleted_count > 0)
    }

    async fn count_active_enrollments(&self, contest_id: Uuid) -> Result<u64, MongoDaoError> {
        self.collection::<EnrollmentEntity>(ENROLLMENTS)
            .await
            .count_documents(active_enrollment_filter(contest_id))
            .await
            .map_err(|source| MongoDaoError::Read {
                collection: ENROLLMENTS,
                source,
            })
    }

    async fn save_settings(&self, settings: SettingsEntity) -> Result<(), MongoDaoError> {
        self.collection::<SettingsEntity>(SETTINGS)
            .await
            .replace_one(doc! {"_id": GLOBAL_SETTINGS_ID}, &settings)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::Write {
                collection: SETTINGS,
                source,
            })?;
        Ok(())
    }
}

impl EntityStore for MongoEntityStore {
    fn insert_contest(&self, contest: ContestEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .upsert(CONTESTS, contest.id, &contest)
                .await
                .map_err(Into::into)
        })
    }

    fn save_contest(&self, contest: ContestEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .upsert(CONTESTS, contest.id, &contest)
                .await
                .map_err(Into::into)
        })
    }

    fn find_contest(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<ContestEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_one(CONTESTS, doc_id(id)).await.map_err(Into::into) })
    }

    fn find_contest_by_code(
        &self,
        code: String,
    ) -> BoxFuture<'static, StorageResult<Option<ContestEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_one(CONTESTS, doc! {"code": code})
                .await
                .map_err(Into::into)
        })
    }

    fn list_contests(
        &self,
        query: ContestQuery,
    ) -> BoxFuture<'static, StorageResult<ContestPage>> {
        let store = self.clone();
        Box::pin(async move { store.list_contests(query).await.map_err(Into::into) })
    }

    fn delete_contest(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.delete_by_id(CONTESTS, id).await.map_err(Into::into) })
    }

    fn find_team(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<TeamEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_one(TEAMS, doc_id(id)).await.map_err(Into::into) })
    }

    fn save_team(&self, team: TeamEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.upsert(TEAMS, team.id, &team).await.map_err(Into::into) })
    }

    fn insert_enrollment(
        &self,
        enrollment: EnrollmentEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .upsert(ENROLLMENTS, enrollment.id, &enrollment)
                .await
                .map_err(Into::into)
        })
    }

    fn save_enrollment(
        &self,
        enrollment: EnrollmentEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .upsert(ENROLLMENTS, enrollment.id, &enrollment)
                .await
                .map_err(Into::into)
        })
    }

    fn find_enrollment(
        &self,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<EnrollmentEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_one(ENROLLMENTS, doc_id(id))
                .await
                .map_err(Into::into)
        })
    }

    fn find_active_enrollment(
        &self,
        team_id: Uuid,
        contest_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<EnrollmentEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_one(
                    ENROLLMENTS,
                    doc! {
                        "team_id": team_id.to_string(),
                        "contest_id": contest_id.to_string(),
                        "status": "active",
                    },
                )
                .await
                .map_err(Into::into)
        })
    }

    fn list_active_enrollments(
        &self,
        contest_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<EnrollmentEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_many(ENROLLMENTS, active_enrollment_filter(contest_id))
                .await
                .map_err(Into::into)
        })
    }

    fn count_active_enrollments(
        &self,
        contest_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<u64>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .count_active_enrollments(contest_id)
                .await
                .map_err(Into::into)
        })
    }

    fn find_player(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_one(PLAYERS, doc_id(id)).await.map_err(Into::into) })
    }

    fn find_players(
        &self,
        ids: Vec<Uuid>,
    ) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let ids: Vec<String> = ids.iter().map(Uuid::to_string).collect();
            store
                .find_many(PLAYERS, doc! {"id": {"$in": ids}})
                .await
                .map_err(Into::into)
        })
    }

    fn save_player(&self, player: PlayerEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .upsert(PLAYERS, player.id, &player)
                .await
                .map_err(Into::into)
        })
    }

    fn find_contest_points(
        &self,
        contest_id: Uuid,
        player_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<PlayerPointsEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_one(
                    PLAYER_POINTS,
                    doc! {
                        "contest_id": contest_id.to_string(),
                        "player_id": player_id.to_string(),
                    },
                )
                .await
                .map_err(Into::into)
        })
    }

    fn list_contest_points(
        &self,
        contest_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<PlayerPointsEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_many(PLAYER_POINTS, doc! {"contest_id": contest_id.to_string()})
                .await
                .map_err(Into::into)
        })
    }

    fn insert_contest_points(
        &self,
        points: PlayerPointsEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .upsert(PLAYER_POINTS, points.id, &points)
                .await
                .map_err(Into::into)
        })
    }

    fn save_contest_points(
        &self,
        points: PlayerPointsEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .upsert(PLAYER_POINTS, points.id, &points)
                .await
                .map_err(Into::into)
        })
    }

    fn load_settings(&self) -> BoxFuture<'static, StorageResult<Option<SettingsEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_one(SETTINGS, doc! {"_id": GLOBAL_SETTINGS_ID})
                .await
                .map_err(Into::into)
        })
    }

    fn save_settings(&self, settings: SettingsEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_settings(settings).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.mongo.ping().await.map_err(Into::into) })
    }
}

impl ObjectStore for MongoEntityStore {
    fn put_object(
        &self,
        id: Uuid,
        content_type: String,
        data: Vec<u8>,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let document = LogoObjectDocument {
                id,
                content_type,
                data: Binary {
                    subtype: BinarySubtype::Generic,
                    bytes: data,
                },
            };
            store
                .upsert(LOGO_FILES, id, &document)
                .await
                .map_err(Into::into)
        })
    }

    fn get_object(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<StoredObject>>> {
        let store = self.clone();
        Box::pin(async move {
            let document: Option<LogoObjectDocument> =
                store.find_one(LOGO_FILES, doc_id(id)).await?;
            Ok(document.map(|doc| StoredObject {
                content_type: doc.content_type,
                data: doc.data.bytes,
            }))
        })
    }

    fn delete_object(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.delete_by_id(LOGO_FILES, id).await.map_err(Into::into) })
    }
}
