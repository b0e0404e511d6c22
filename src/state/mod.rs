//! Central application state shared across routes and services.

use std::sync::Arc;

use tokio::sync::{RwLock, watch};

use crate::{
    config::AppConfig,
    dao::{
        entity_store::{EntityStore, ObjectStore},
        models::SettingsEntity,
    },
    error::ServiceError,
};

/// Cheaply cloneable handle to [`AppState`].
pub type SharedState = Arc<AppState>;

/// Central application state storing the installed stores, the degraded-mode
/// flag, the runtime configuration, and the settings-singleton cache.
pub struct AppState {
    entities: RwLock<Option<Arc<dyn EntityStore>>>,
    objects: RwLock<Option<Arc<dyn ObjectStore>>>,
    settings: RwLock<Option<SettingsEntity>>,
    degraded: watch::Sender<bool>,
    config: AppConfig,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until stores are installed.
    pub fn new(config: AppConfig) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            entities: RwLock::new(None),
            objects: RwLock::new(None),
            settings: RwLock::new(None),
            degraded: degraded_tx,
            config,
        })
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Obtain a handle to the current entity store, if one is installed.
    pub async fn entity_store(&self) -> Option<Arc<dyn EntityStore>> {
        let guard = self.entities.read().await;
        guard.as_ref().cloned()
    }

    /// Entity store handle, or a degraded-mode error when none is installed.
    pub async fn require_entity_store(&self) -> Result<Arc<dyn EntityStore>, ServiceError> {
        self.entity_store().await.ok_or(ServiceError::Degraded)
    }

    /// Object store handle, or a degraded-mode error when none is installed.
    pub async fn require_object_store(&self) -> Result<Arc<dyn ObjectStore>, ServiceError> {
        let guard = self.objects.read().await;
        guard.as_ref().cloned().ok_or(ServiceError::Degraded)
    }

    /// Install fresh store implementations and leave degraded mode.
    pub async fn install_stores(
        &self,
        entities: Arc<dyn EntityStore>,
        objects: Arc<dyn ObjectStore>,
    ) {
        {
            let mut guard = self.entities.write().await;
            *guard = Some(entities);
        }
        {
            let mut guard = self.objects.write().await;
            *guard = Some(objects);
        }
        self.update_degraded(false).await;
    }

    /// Remove the current stores and enter degraded mode.
    pub async fn clear_stores(&self) {
        {
            let mut guard = self.entities.write().await;
            guard.take();
        }
        {
            let mut guard = self.objects.write().await;
            guard.take();
        }
        {
            let mut guard = self.settings.write().await;
            guard.take();
        }
        self.update_degraded(true).await;
    }

    /// Current degraded flag.
    pub async fn is_degraded(&self) -> bool {
        let guard = self.entities.read().await;
        guard.is_none()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Cached copy of the settings singleton, if it has been read already.
    pub async fn cached_settings(&self) -> Option<SettingsEntity> {
        let guard = self.settings.read().await;
        guard.clone()
    }

    /// Replace the cached settings singleton.
    pub async fn cache_settings(&self, settings: SettingsEntity) {
        let mut guard = self.settings.write().await;
        *guard = Some(settings);
    }

    /// Update and broadcast the degraded flag when the value changes.
    async fn update_degraded(&self, value: bool) {
        if *self.degraded.borrow() == value {
            return;
        }

        let _ = self.degraded.send(value);
    }
}
