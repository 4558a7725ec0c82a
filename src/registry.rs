use crate::model::{DeviceRecord, DeviceStatus};
use chrono::Utc;
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::net::IpAddr;
use tokio::sync::{broadcast, Mutex};

/// Discrete change notification pushed to subscribers
#[derive(Debug, Clone)]
pub enum RegistryEvent {
    /// A never-before-seen address entered the registry
    Added(DeviceRecord),
    /// A known address flipped between online and offline
    StatusChanged {
        address: IpAddr,
        old: DeviceStatus,
        new: DeviceStatus,
    },
}

/// What a call to [`Registry::apply`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Added,
    StatusChanged,
    /// Record already known with the same status; only `last_seen` moved
    Refreshed,
}

/// Authoritative in-memory map of known devices.
///
/// All mutation goes through `apply`/`mark_offline` so status transitions are
/// observable as discrete events. Mutations are short and serialized behind a
/// single lock; concurrent applies to the same address resolve last-write-wins
/// on `last_seen`. No internal logic ever deletes a record.
pub struct Registry {
    devices: Mutex<HashMap<IpAddr, DeviceRecord>>,
    events: broadcast::Sender<RegistryEvent>,
}

impl Registry {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(256);
        Self {
            devices: Mutex::new(HashMap::new()),
            events,
        }
    }

    /// Subscribe to the change event stream. Only events emitted after the
    /// call are delivered.
    pub fn subscribe(&self) -> broadcast::Receiver<RegistryEvent> {
        self.events.subscribe()
    }

    /// Insert or update a record from a successful probe.
    ///
    /// Unknown address: inserted as-is, emits `Added`. Known address: fields
    /// are replaced wholesale and `StatusChanged` is emitted when the status
    /// flipped. Applying an identical record twice is a refresh, not an event.
    pub async fn apply(&self, record: DeviceRecord) -> ApplyOutcome {
        let mut devices = self.devices.lock().await;
        match devices.entry(record.address) {
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                drop(devices);
                let _ = self.events.send(RegistryEvent::Added(record));
                ApplyOutcome::Added
            }
            Entry::Occupied(mut slot) => {
                let address = record.address;
                let old_status = slot.get().status;
                let new_status = record.status;
                *slot.get_mut() = record;
                drop(devices);
                if old_status != new_status {
                    let _ = self.events.send(RegistryEvent::StatusChanged {
                        address,
                        old: old_status,
                        new: new_status,
                    });
                    ApplyOutcome::StatusChanged
                } else {
                    ApplyOutcome::Refreshed
                }
            }
        }
    }

    /// Mark a device offline after a failed re-probe. Emits `StatusChanged`
    /// exactly once per transition; a no-op when already offline. Other
    /// fields, including `last_seen`, are left untouched.
    pub async fn mark_offline(&self, address: IpAddr) -> bool {
        let mut devices = self.devices.lock().await;
        let Some(record) = devices.get_mut(&address) else {
            return false;
        };
        if record.status == DeviceStatus::Offline {
            return false;
        }
        record.status = DeviceStatus::Offline;
        drop(devices);
        let _ = self.events.send(RegistryEvent::StatusChanged {
            address,
            old: DeviceStatus::Online,
            new: DeviceStatus::Offline,
        });
        true
    }

    /// Mark a known device online after a successful re-probe, refreshing
    /// `last_seen`. Emits `StatusChanged` when it was offline.
    pub async fn mark_online(&self, address: IpAddr) -> bool {
        let mut devices = self.devices.lock().await;
        let Some(record) = devices.get_mut(&address) else {
            return false;
        };
        record.last_seen = Utc::now();
        if record.status == DeviceStatus::Online {
            return false;
        }
        record.status = DeviceStatus::Online;
        drop(devices);
        let _ = self.events.send(RegistryEvent::StatusChanged {
            address,
            old: DeviceStatus::Offline,
            new: DeviceStatus::Online,
        });
        true
    }

    pub async fn get(&self, address: IpAddr) -> Option<DeviceRecord> {
        self.devices.lock().await.get(&address).cloned()
    }

    pub async fn contains(&self, address: IpAddr) -> bool {
        self.devices.lock().await.contains_key(&address)
    }

    /// All known records, sorted by address
    pub async fn list(&self) -> Vec<DeviceRecord> {
        let devices = self.devices.lock().await;
        let mut records: Vec<DeviceRecord> = devices.values().cloned().collect();
        records.sort_by_key(|r| r.address);
        records
    }

    /// Owned point-in-time copy of the full record set, keyed by address.
    /// Never a live reference: the monitor keeps mutating while readers hold
    /// the snapshot.
    pub async fn snapshot(&self) -> BTreeMap<IpAddr, DeviceRecord> {
        let devices = self.devices.lock().await;
        devices.iter().map(|(k, v)| (*k, v.clone())).collect()
    }

    /// Replace the record set wholesale, without emitting events. Used when
    /// loading a persisted snapshot at startup.
    pub async fn restore(&self, records: BTreeMap<IpAddr, DeviceRecord>) {
        let mut devices = self.devices.lock().await;
        *devices = records.into_iter().collect();
    }

    pub async fn len(&self) -> usize {
        self.devices.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.devices.lock().await.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
