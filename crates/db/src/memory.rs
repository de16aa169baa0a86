//! In-process [`VehicleStore`] and [`ChangeFeed`].
//!
//! Holds the collection in a `BTreeMap` behind a `tokio::sync::RwLock` and
//! publishes change events on a broadcast channel while the write lock is
//! held, so feed order always matches write order.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use fleet_core::change::ChangeEvent;
use fleet_core::types::{Timestamp, VehicleId};
use fleet_core::validation::validate_update;
use fleet_core::vehicle::{Vehicle, VehicleDraft, VehicleInput};
use futures::StreamExt;
use tokio::sync::{broadcast, RwLock};
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;

use crate::error::StoreError;
use crate::store::{ChangeFeed, ChangeStream, VehicleStore};

/// Buffer capacity for the change channel.
const CHANGE_CAPACITY: usize = 1024;

#[derive(Default)]
struct Collection {
    next_id: VehicleId,
    vehicles: BTreeMap<VehicleId, Vehicle>,
}

impl Collection {
    fn insert(&mut self, draft: VehicleDraft, now: Timestamp) -> Vehicle {
        self.next_id += 1;
        let vehicle = Vehicle::from_draft(self.next_id, draft, now);
        self.vehicles.insert(vehicle.id, vehicle.clone());
        vehicle
    }
}

/// Vehicle store living entirely in memory.
pub struct MemoryVehicleStore {
    collection: RwLock<Collection>,
    changes: broadcast::Sender<ChangeEvent>,
    available: AtomicBool,
}

impl MemoryVehicleStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
        Self {
            collection: RwLock::new(Collection::default()),
            changes,
            available: AtomicBool::new(true),
        }
    }

    /// Simulate losing (or regaining) the backend. While unavailable every
    /// operation fails with [`StoreError::Unavailable`].
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of open change-feed subscriptions.
    pub fn feed_subscriber_count(&self) -> usize {
        self.changes.receiver_count()
    }

    fn ensure_available(&self) -> Result<(), StoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("memory store offline".into()))
        }
    }

    fn publish(&self, event: ChangeEvent) {
        // Zero receivers only means nobody is listening.
        let _ = self.changes.send(event);
    }
}

impl Default for MemoryVehicleStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Next `last_updated` value: now, but never at or before `previous`.
fn next_timestamp(previous: Timestamp) -> Timestamp {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + chrono::Duration::microseconds(1)
    }
}

#[async_trait]
impl VehicleStore for MemoryVehicleStore {
    async fn list_all(&self) -> Result<Vec<Vehicle>, StoreError> {
        self.ensure_available()?;
        let mut all: Vec<Vehicle> = self.collection.read().await.vehicles.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(all)
    }

    async fn get_by_id(&self, id: VehicleId) -> Result<Option<Vehicle>, StoreError> {
        self.ensure_available()?;
        Ok(self.collection.read().await.vehicles.get(&id).cloned())
    }

    async fn insert_draft(&self, draft: &VehicleDraft) -> Result<Vehicle, StoreError> {
        self.ensure_available()?;
        let mut collection = self.collection.write().await;
        let vehicle = collection.insert(draft.clone(), Utc::now());
        self.publish(ChangeEvent::inserted(&vehicle));
        Ok(vehicle)
    }

    async fn update_by_id(
        &self,
        id: VehicleId,
        patch: &VehicleInput,
    ) -> Result<Option<Vehicle>, StoreError> {
        self.ensure_available()?;
        let mut collection = self.collection.write().await;
        let Some(current) = collection.vehicles.get_mut(&id) else {
            return Ok(None);
        };

        let draft = validate_update(current, patch)?;
        current.apply(draft);
        current.last_updated = next_timestamp(current.last_updated);

        let updated = current.clone();
        self.publish(ChangeEvent::updated(&updated));
        Ok(Some(updated))
    }

    async fn replace_all(&self, drafts: &[VehicleDraft]) -> Result<u64, StoreError> {
        self.ensure_available()?;
        let mut collection = self.collection.write().await;

        let removed = std::mem::take(&mut collection.vehicles);
        for id in removed.into_keys() {
            self.publish(ChangeEvent::deleted(id));
        }

        let now = Utc::now();
        for draft in drafts {
            let vehicle = collection.insert(draft.clone(), now);
            self.publish(ChangeEvent::inserted(&vehicle));
        }

        Ok(drafts.len() as u64)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        self.ensure_available()
    }
}

#[async_trait]
impl ChangeFeed for MemoryVehicleStore {
    async fn subscribe(&self) -> Result<ChangeStream, StoreError> {
        self.ensure_available()?;
        let stream = BroadcastStream::new(self.changes.subscribe()).filter_map(|item| async move {
            match item {
                Ok(event) => Some(Ok(event)),
                Err(BroadcastStreamRecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Memory change feed lagged");
                    None
                }
            }
        });
        Ok(Box::pin(stream))
    }
}
