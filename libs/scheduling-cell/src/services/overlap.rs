// libs/scheduling-cell/src/services/overlap.rs
use chrono::{DateTime, Utc};

use crate::models::{Appointment, TimeSlot};

/// Whether two half-open intervals `[a_start, a_end)` and `[b_start, b_end)`
/// share at least one instant.
///
/// The single inequality pair classifies every interval relationship:
/// partial overlap from either side, containment in either direction and
/// exact coincidence are overlaps; adjacency and disjoint ranges are not.
/// Back-to-back appointments are deliberately allowed. Both intervals must
/// already be normalized to UTC by the caller.
pub fn intervals_overlap(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && b_start < a_end
}

impl TimeSlot {
    pub fn overlaps(&self, appointment: &Appointment) -> bool {
        intervals_overlap(
            self.start_time,
            self.end_time,
            appointment.start_time,
            appointment.end_time,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 6, 3, hour, minute, 0).unwrap()
    }

    #[test]
    fn disjoint_before_and_after() {
        assert!(!intervals_overlap(at(9, 0), at(9, 30), at(10, 0), at(10, 30)));
        assert!(!intervals_overlap(at(10, 0), at(10, 30), at(9, 0), at(9, 30)));
    }

    #[test]
    fn adjacent_is_not_overlap() {
        assert!(!intervals_overlap(at(9, 0), at(9, 30), at(9, 30), at(10, 0)));
        assert!(!intervals_overlap(at(9, 30), at(10, 0), at(9, 0), at(9, 30)));
    }

    #[test]
    fn partial_overlap_from_either_side() {
        assert!(intervals_overlap(at(9, 0), at(9, 30), at(9, 15), at(9, 45)));
        assert!(intervals_overlap(at(9, 15), at(9, 45), at(9, 0), at(9, 30)));
    }

    #[test]
    fn containment_in_either_direction() {
        assert!(intervals_overlap(at(9, 0), at(10, 0), at(9, 15), at(9, 45)));
        assert!(intervals_overlap(at(9, 15), at(9, 45), at(9, 0), at(10, 0)));
    }

    #[test]
    fn exact_match_is_overlap() {
        assert!(intervals_overlap(at(9, 0), at(9, 30), at(9, 0), at(9, 30)));
    }
}
