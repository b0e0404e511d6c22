use std::{sync::Arc, time::Duration};

use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::{
    dao::mongodb::{MongoEntityStore, connect, ensure_indexes},
    state::SharedState,
};

const INITIAL_DELAY: Duration = Duration::from_millis(1_000);
const MAX_DELAY: Duration = Duration::from_secs(10);
const HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Supervise the MongoDB connection in the background, toggling degraded mode
/// as connectivity comes and goes. The manager reconnects on its own; the
/// supervisor only decides when the stores are trustworthy enough to serve
/// requests.
pub async fn run(state: SharedState, uri: String, db_name: Option<String>) {
    let mut delay = INITIAL_DELAY;

    loop {
        match connect(&uri, db_name.as_deref()).await {
            Ok(manager) => match ensure_indexes(&manager.database().await).await {
                Ok(()) => {
                    let store = Arc::new(MongoEntityStore::new(manager.clone()));
                    state.install_stores(store.clone(), store).await;
                    info!("connected to MongoDB; leaving degraded mode");
                    delay = INITIAL_DELAY;

                    loop {
                        sleep(HEALTH_POLL_INTERVAL).await;
                        if let Err(err) = manager.ping().await {
                            warn!(error = %err, "MongoDB ping failed; entering degraded mode");
                            state.clear_stores().await;
                            break;
                        }
                    }
                }
                Err(err) => {
                    error!(%err, "failed to ensure MongoDB indexes; retrying");
                    sleep(delay).await;
                    delay = (delay * 2).min(MAX_DELAY);
                }
            },
            Err(err) => {
                warn!(error = %err, "MongoDB connection attempt failed");
                sleep(delay).await;
                delay = (delay * 2).min(MAX_DELAY);
            }
        }
    }
}
