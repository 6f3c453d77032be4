// libs/scheduling-cell/src/services/availability.rs
use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use tracing::debug;
use uuid::Uuid;

use shared_config::ClinicConfig;

use crate::models::TimeSlot;
use crate::store::AppointmentStore;

/// Derives open time slots for a doctor/day on demand: generate the full
/// slot grid over the working window, subtract booked intervals. Read-only;
/// runs outside any transaction. The result can go stale the moment another
/// booking lands, which is fine because the booking transaction re-validates
/// atomically regardless of what availability showed the caller.
pub struct AvailabilityService {
    store: Arc<AppointmentStore>,
    open_time: NaiveTime,
    close_time: NaiveTime,
    default_slot_minutes: i64,
}

impl AvailabilityService {
    pub fn new(store: Arc<AppointmentStore>, config: &ClinicConfig) -> Self {
        Self {
            store,
            open_time: config.open_time,
            close_time: config.close_time,
            default_slot_minutes: config.default_slot_minutes,
        }
    }

    /// Open slots of `slot_minutes` duration for the doctor on `date`, in
    /// chronological order. An empty list is a valid result: a fully booked
    /// day, or a slot duration longer than the working window.
    pub async fn get_available_slots(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        slot_minutes: Option<i64>,
    ) -> Vec<TimeSlot> {
        let slot_minutes = match slot_minutes {
            Some(m) if m > 0 => m,
            _ => self.default_slot_minutes,
        };

        let day_open = date.and_time(self.open_time).and_utc();
        let day_close = date.and_time(self.close_time).and_utc();
        let grid = slot_grid(day_open, day_close, Duration::minutes(slot_minutes));

        // One indexed range read, no write transaction involved.
        let booked = self
            .store
            .find_booked_in_range(doctor_id, day_open, day_close)
            .await;

        let available: Vec<TimeSlot> = grid
            .into_iter()
            .filter(|slot| !booked.iter().any(|appointment| slot.overlaps(appointment)))
            .collect();

        debug!(
            "doctor {} has {} open {}-minute slots on {} ({} booked)",
            doctor_id,
            available.len(),
            slot_minutes,
            date,
            booked.len()
        );
        available
    }
}

/// Contiguous, non-overlapping slots of `duration` covering `[open, close)`.
/// A trailing partial slot that would extend past `close` is discarded.
fn slot_grid(open: DateTime<Utc>, close: DateTime<Utc>, duration: Duration) -> Vec<TimeSlot> {
    let mut slots = Vec::new();
    let mut start = open;
    while start + duration <= close {
        slots.push(TimeSlot {
            start_time: start,
            end_time: start + duration,
        });
        start += duration;
    }
    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn grid_covers_the_window_without_partial_slots() {
        let open = Utc.with_ymd_and_hms(2030, 6, 3, 9, 0, 0).unwrap();
        let close = Utc.with_ymd_and_hms(2030, 6, 3, 17, 0, 0).unwrap();

        let grid = slot_grid(open, close, Duration::minutes(30));
        assert_eq!(grid.len(), 16);
        assert_eq!(grid[0].start_time, open);
        assert_eq!(grid[15].end_time, close);

        // 480 minutes / 45 leaves a trailing partial slot past close.
        let grid = slot_grid(open, close, Duration::minutes(45));
        assert_eq!(grid.len(), 10);
        assert_eq!(
            grid[9].end_time,
            Utc.with_ymd_and_hms(2030, 6, 3, 16, 30, 0).unwrap()
        );
    }

    #[test]
    fn oversized_duration_yields_an_empty_grid() {
        let open = Utc.with_ymd_and_hms(2030, 6, 3, 9, 0, 0).unwrap();
        let close = Utc.with_ymd_and_hms(2030, 6, 3, 17, 0, 0).unwrap();
        assert!(slot_grid(open, close, Duration::minutes(600)).is_empty());
    }
}
