//! Process-wide settings singleton. The document lives in storage under the
//! fixed id `"global"`, is created lazily on the first read, and is cached in
//! [`crate::state::AppState`] afterwards so callers never repeat the
//! get-or-create dance.

use uuid::Uuid;

use crate::{
    dao::models::SettingsEntity,
    dto::common::UploadResponse,
    error::ServiceError,
    ist::now_ist,
    services::side_effects::{DegradedWrite, MutationOutcome},
    state::SharedState,
};

/// Public URL the default contest logo is served from.
pub const DEFAULT_LOGO_URL: &str = "/settings/logo";

/// Fetch the settings singleton, creating it on first access.
pub async fn get_or_init(state: &SharedState) -> Result<SettingsEntity, ServiceError> {
    if let Some(cached) = state.cached_settings().await {
        return Ok(cached);
    }

    let store = state.require_entity_store().await?;
    let settings = match store.load_settings().await? {
        Some(existing) => existing,
        None => {
            let fresh = SettingsEntity::new(now_ist());
            store.save_settings(fresh.clone()).await?;
            fresh
        }
    };

    state.cache_settings(settings.clone()).await;
    Ok(settings)
}

/// Effective default logo URL, if a default logo has been uploaded.
///
/// Display concern only: lookup failures degrade to `None` rather than
/// failing the read that asked for the fallback.
pub async fn default_logo_url(state: &SharedState) -> Option<String> {
    match get_or_init(state).await {
        Ok(settings) => settings
            .default_contest_logo_file_id
            .map(|_| DEFAULT_LOGO_URL.to_owned()),
        Err(_) => None,
    }
}

/// Store a new default contest logo and point the singleton at it. Cleanup
/// of the previously stored object is best-effort; the new reference is
/// already live when it runs.
pub async fn upload_default_logo(
    state: &SharedState,
    content_type: String,
    data: Vec<u8>,
) -> Result<MutationOutcome<UploadResponse>, ServiceError> {
    if data.is_empty() {
        return Err(ServiceError::InvalidInput("empty logo upload".into()));
    }

    let store = state.require_entity_store().await?;
    let objects = state.require_object_store().await?;

    let mut settings = get_or_init(state).await?;
    let file_id = Uuid::new_v4();
    objects.put_object(file_id, content_type, data).await?;

    let previous = settings.default_contest_logo_file_id.replace(file_id);
    settings.updated_at = now_ist();
    store.save_settings(settings.clone()).await?;
    state.cache_settings(settings).await;

    let mut degraded = Vec::new();
    if let Some(old_id) = previous
        && let Err(err) = objects.delete_object(old_id).await
    {
        degraded.push(DegradedWrite::new(format!("logo object {old_id}"), &err));
    }

    Ok(MutationOutcome {
        value: UploadResponse {
            url: DEFAULT_LOGO_URL.to_owned(),
            message: "Default logo uploaded successfully".to_owned(),
        },
        degraded,
    })
}

/// Raw bytes of the default contest logo, if one is configured.
pub async fn default_logo_bytes(
    state: &SharedState,
) -> Result<(String, Vec<u8>), ServiceError> {
    let settings = get_or_init(state).await?;
    let Some(file_id) = settings.default_contest_logo_file_id else {
        return Err(ServiceError::NotFound("no default logo configured".into()));
    };

    let objects = state.require_object_store().await?;
    let Some(object) = objects.get_object(file_id).await? else {
        return Err(ServiceError::NotFound("default logo object missing".into()));
    };

    Ok((object.content_type, object.data))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::{dao::models::GLOBAL_SETTINGS_ID, state::test_support::memory_state};

    #[tokio::test]
    async fn singleton_is_created_lazily_on_first_read() {
        let (state, store) = memory_state().await;
        assert!(store.settings().is_none());

        let settings = get_or_init(&state).await.expect("get or init");
        assert_eq!(settings.id, GLOBAL_SETTINGS_ID);
        assert!(settings.default_contest_logo_file_id.is_none());
        assert_eq!(store.settings(), Some(settings));
    }

    #[tokio::test]
    async fn default_logo_url_reflects_uploaded_logo() {
        let (state, _store) = memory_state().await;
        assert_eq!(default_logo_url(&state).await, None);

        let outcome = upload_default_logo(&state, "image/png".into(), vec![1, 2, 3])
            .await
            .expect("upload");
        assert!(outcome.degraded.is_empty());
        assert_eq!(outcome.value.url, DEFAULT_LOGO_URL);
        assert_eq!(default_logo_url(&state).await, Some(DEFAULT_LOGO_URL.into()));

        let (content_type, data) = default_logo_bytes(&state).await.expect("bytes");
        assert_eq!(content_type, "image/png");
        assert_eq!(data, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn failed_stale_logo_cleanup_degrades_the_upload() {
        let (state, store) = memory_state().await;
        upload_default_logo(&state, "image/png".into(), vec![1])
            .await
            .expect("first upload");

        store.fail_object_deletes.store(true, Ordering::SeqCst);
        let outcome = upload_default_logo(&state, "image/png".into(), vec![2])
            .await
            .expect("replacement succeeds despite cleanup failure");
        assert_eq!(outcome.degraded.len(), 1);
        assert!(outcome.degraded[0].target.contains("logo object"));

        // The new logo is live; only the stale object lingers.
        let (_, data) = default_logo_bytes(&state).await.expect("bytes");
        assert_eq!(data, vec![2]);
    }

    #[tokio::test]
    async fn empty_default_logo_upload_is_rejected() {
        let (state, _store) = memory_state().await;
        let err = upload_default_logo(&state, "image/png".into(), Vec::new())
            .await
            .expect_err("should reject");
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }
}
