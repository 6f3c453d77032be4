// libs/scheduling-cell/src/store.rs
//
// System of record for appointment rows. In-process engine with per-doctor
// shards and optimistic transactions: bookings for different doctors never
// contend, and two transactions racing on the same doctor's calendar are
// serialized by a version check at commit time.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};
use tracing::debug;
use uuid::Uuid;

use crate::models::{Appointment, AppointmentStatus};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    /// The doctor's calendar changed between `begin` and `commit`. The
    /// caller may retry the whole transaction against a fresh snapshot.
    #[error("write conflict on doctor calendar")]
    WriteConflict,

    #[error("appointment not found")]
    NotFound,

    #[error("appointment status is {actual}, not the expected one")]
    StatusMismatch { actual: AppointmentStatus },
}

/// Per-doctor partition of the appointment data.
#[derive(Debug, Default)]
struct DoctorShard {
    /// Bumped on every committed write to this calendar.
    version: u64,
    rows: HashMap<Uuid, Appointment>,
    /// Index over `Booked` rows keyed by start time. The doctor key is the
    /// shard itself and cancelled rows are excluded, so this is the
    /// (doctor, status, start, end) index the overlap query needs.
    booked: BTreeMap<DateTime<Utc>, Uuid>,
}

impl DoctorShard {
    /// Booked rows that can overlap `[start, end)`: the rows starting inside
    /// the window plus the one row starting before it that may reach into it.
    /// Keeps the snapshot (and the lock hold) at index-lookup scale instead
    /// of cloning the calendar's full booked history.
    fn booked_snapshot(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> BTreeMap<DateTime<Utc>, Appointment> {
        let mut snapshot: BTreeMap<DateTime<Utc>, Appointment> = self
            .booked
            .range(start..end)
            .filter_map(|(s, id)| self.rows.get(id).map(|a| (*s, a.clone())))
            .collect();

        if let Some((s, id)) = self.booked.range(..start).next_back() {
            if let Some(appointment) = self.rows.get(id) {
                if appointment.end_time > start {
                    snapshot.insert(*s, appointment.clone());
                }
            }
        }

        snapshot
    }
}

pub struct AppointmentStore {
    shards: RwLock<HashMap<Uuid, Arc<Mutex<DoctorShard>>>>,
    /// appointment id -> doctor id, for the by-id read paths.
    directory: Arc<RwLock<HashMap<Uuid, Uuid>>>,
}

impl AppointmentStore {
    pub fn new() -> Self {
        Self {
            shards: RwLock::new(HashMap::new()),
            directory: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    async fn shard(&self, doctor_id: Uuid) -> Arc<Mutex<DoctorShard>> {
        if let Some(shard) = self.shards.read().await.get(&doctor_id) {
            return Arc::clone(shard);
        }
        let mut shards = self.shards.write().await;
        Arc::clone(shards.entry(doctor_id).or_default())
    }

    /// Open a transaction on one doctor's calendar with snapshot-level read
    /// isolation over `[start, end)`. Reads within the transaction see that
    /// window of the calendar exactly as it was at this point; the version
    /// check at commit still covers the whole calendar.
    pub async fn begin(
        &self,
        doctor_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StoreTransaction {
        let shard = self.shard(doctor_id).await;
        let (snapshot_version, snapshot) = {
            let guard = shard.lock().await;
            (guard.version, guard.booked_snapshot(start, end))
        };
        StoreTransaction {
            shard,
            directory: Arc::clone(&self.directory),
            snapshot_version,
            snapshot,
            staged: None,
        }
    }

    pub async fn get(&self, id: Uuid) -> Option<Appointment> {
        let doctor_id = self.directory.read().await.get(&id).copied()?;
        let shard = self.shard(doctor_id).await;
        let guard = shard.lock().await;
        guard.rows.get(&id).cloned()
    }

    /// All `Booked` appointments for the doctor overlapping `[start, end)`,
    /// in chronological order. One indexed range read; does not participate
    /// in any transaction.
    pub async fn find_booked_in_range(
        &self,
        doctor_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Vec<Appointment> {
        let shard = self.shard(doctor_id).await;
        let guard = shard.lock().await;

        let mut appointments: Vec<Appointment> = guard
            .booked
            .range(start..end)
            .filter_map(|(_, id)| guard.rows.get(id).cloned())
            .collect();

        // A booked row starting before the window can still reach into it.
        if let Some((_, id)) = guard.booked.range(..start).next_back() {
            if let Some(appointment) = guard.rows.get(id) {
                if appointment.end_time > start {
                    appointments.insert(0, appointment.clone());
                }
            }
        }

        appointments
    }

    /// All appointments (any status) starting within `[start, end)`, sorted
    /// by start time ascending. Display path.
    pub async fn list_in_range(
        &self,
        doctor_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Vec<Appointment> {
        let shard = self.shard(doctor_id).await;
        let guard = shard.lock().await;

        let mut appointments: Vec<Appointment> = guard
            .rows
            .values()
            .filter(|a| a.start_time >= start && a.start_time < end)
            .cloned()
            .collect();
        appointments.sort_by_key(|a| a.start_time);
        appointments
    }

    /// Atomic compare-and-set on a single row's status. Fails without
    /// touching the row when the current status differs from `expected`.
    /// Leaving `Booked` also removes the row from the overlap index, and
    /// the version bump forces any in-flight booking transaction on this
    /// calendar to retry against a fresh snapshot.
    pub async fn update_status(
        &self,
        id: Uuid,
        expected: AppointmentStatus,
        new_status: AppointmentStatus,
    ) -> Result<Appointment, StoreError> {
        let doctor_id = self
            .directory
            .read()
            .await
            .get(&id)
            .copied()
            .ok_or(StoreError::NotFound)?;

        let shard = self.shard(doctor_id).await;
        let mut guard = shard.lock().await;

        let current = guard.rows.get(&id).ok_or(StoreError::NotFound)?;
        if current.status != expected {
            return Err(StoreError::StatusMismatch {
                actual: current.status,
            });
        }
        let start_time = current.start_time;

        if expected == AppointmentStatus::Booked && new_status != AppointmentStatus::Booked {
            guard.booked.remove(&start_time);
        }

        let row = guard.rows.get_mut(&id).ok_or(StoreError::NotFound)?;
        row.status = new_status;
        row.updated_at = Utc::now();
        let updated = row.clone();

        guard.version += 1;
        debug!("appointment {} status set to {}", id, new_status);
        Ok(updated)
    }
}

impl Default for AppointmentStore {
    fn default() -> Self {
        Self::new()
    }
}

/// A transaction scoped to one doctor's calendar and one time window.
/// Dropping it without committing discards the staged write and leaves
/// zero trace.
pub struct StoreTransaction {
    shard: Arc<Mutex<DoctorShard>>,
    directory: Arc<RwLock<HashMap<Uuid, Uuid>>>,
    snapshot_version: u64,
    snapshot: BTreeMap<DateTime<Utc>, Appointment>,
    staged: Option<Appointment>,
}

impl StoreTransaction {
    /// The `Booked` appointment overlapping `[start, end)`, if any, as seen
    /// by this transaction's snapshot. The queried range must lie within the
    /// window given to `begin`. Booked intervals are pairwise disjoint, so
    /// their end times increase with their start times and only the last row
    /// starting before `end` can overlap: a single index probe.
    pub fn find_overlapping(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Option<&Appointment> {
        match self.snapshot.range(..end).next_back() {
            Some((_, appointment)) if appointment.end_time > start => Some(appointment),
            _ => None,
        }
    }

    /// Stage a new row. Visible to nobody until `commit` succeeds.
    pub fn insert(&mut self, appointment: Appointment) {
        self.staged = Some(appointment);
    }

    /// Apply the staged write if the calendar is unchanged since `begin`.
    /// A version mismatch means another transaction committed in between;
    /// the write is discarded and `WriteConflict` returned.
    pub async fn commit(self) -> Result<(), StoreError> {
        let mut guard = self.shard.lock().await;

        if guard.version != self.snapshot_version {
            debug!(
                "commit rejected: calendar moved from version {} to {}",
                self.snapshot_version, guard.version
            );
            return Err(StoreError::WriteConflict);
        }

        if let Some(appointment) = self.staged {
            let id = appointment.id;
            let doctor_id = appointment.doctor_id;
            guard.booked.insert(appointment.start_time, id);
            guard.rows.insert(id, appointment);
            guard.version += 1;
            drop(guard);
            self.directory.write().await.insert(id, doctor_id);
        }

        Ok(())
    }
}
