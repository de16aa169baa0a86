//! PostgreSQL change feed over `LISTEN`/`NOTIFY`.

use async_trait::async_trait;
use fleet_core::change::{ChangeEvent, ChangeOperation};
use sqlx::postgres::PgListener;
use sqlx::PgPool;

use crate::error::StoreError;
use crate::repositories::PgVehicleStore;
use crate::store::{ChangeFeed, ChangeStream, VehicleStore};

/// Channel the `notify_vehicle_change` trigger publishes on.
pub const CHANGE_CHANNEL: &str = "vehicle_changes";

/// Change feed backed by a dedicated `LISTEN` connection.
///
/// The trigger sends a compact notice (operation, id, timestamp). Insert and
/// update notices are completed by loading the row, so events carry the
/// record as currently committed.
///
/// Each [`subscribe`](ChangeFeed::subscribe) opens a fresh listener. If its
/// connection drops, the listener reconnects on the next receive and the
/// stream carries on; notifications published in the gap are lost. The
/// stream yields an error only when reconnecting fails.
#[derive(Clone)]
pub struct PgChangeFeed {
    pool: PgPool,
}

impl PgChangeFeed {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

struct Listening {
    listener: PgListener,
    store: PgVehicleStore,
}

#[async_trait]
impl ChangeFeed for PgChangeFeed {
    async fn subscribe(&self) -> Result<ChangeStream, StoreError> {
        let mut listener = PgListener::connect_with(&self.pool).await?;
        listener.listen(CHANGE_CHANNEL).await?;
        tracing::debug!(channel = CHANGE_CHANNEL, "Listening for vehicle changes");

        let state = Listening {
            listener,
            store: PgVehicleStore::new(self.pool.clone()),
        };

        let stream = futures::stream::unfold(state, |mut state| async move {
            loop {
                match state.listener.try_recv().await {
                    Ok(Some(notification)) => {
                        match complete(&state.store, notification.payload()).await {
                            Ok(Some(event)) => return Some((Ok(event), state)),
                            Ok(None) => continue,
                            Err(e) => return Some((Err(e), state)),
                        }
                    }
                    Ok(None) => {
                        tracing::warn!(
                            channel = CHANGE_CHANNEL,
                            "Change listener lost its connection, reconnecting; \
                             changes made meanwhile will not be delivered"
                        );
                    }
                    Err(e) => return Some((Err(StoreError::Database(e)), state)),
                }
            }
        });

        Ok(Box::pin(stream))
    }
}

/// Turn a trigger notice into a full [`ChangeEvent`].
///
/// Returns `Ok(None)` for payloads that cannot be decoded and for rows
/// deleted before they could be read; a delete notice follows in that case.
async fn complete(
    store: &PgVehicleStore,
    payload: &str,
) -> Result<Option<ChangeEvent>, StoreError> {
    let mut event = match decode(payload) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!(error = %e, payload, "Skipping undecodable change notification");
            return Ok(None);
        }
    };

    if event.operation == ChangeOperation::Delete {
        return Ok(Some(event));
    }

    match store.get_by_id(event.vehicle_id).await? {
        Some(vehicle) => {
            event.vehicle = Some(vehicle);
            Ok(Some(event))
        }
        None => {
            tracing::debug!(
                vehicle_id = event.vehicle_id,
                "Vehicle removed before its change could be loaded"
            );
            Ok(None)
        }
    }
}

fn decode(payload: &str) -> Result<ChangeEvent, serde_json::Error> {
    serde_json::from_str(payload)
}
