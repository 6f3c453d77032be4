// libs/scheduling-cell/src/services/validation.rs
use chrono::{DateTime, NaiveTime, Utc};

use shared_config::ClinicConfig;

use crate::models::ValidationError;

/// Stateless pre-storage checks on a booking candidate. All four run before
/// any database interaction so doomed requests never reach the transactional
/// overlap check. `now` is a parameter to keep the checks pure.
#[derive(Debug, Clone)]
pub struct BookingValidator {
    open_time: NaiveTime,
    close_time: NaiveTime,
}

impl BookingValidator {
    pub fn new(open_time: NaiveTime, close_time: NaiveTime) -> Self {
        Self {
            open_time,
            close_time,
        }
    }

    pub fn from_config(config: &ClinicConfig) -> Self {
        Self::new(config.open_time, config.close_time)
    }

    pub fn validate(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<(), ValidationError> {
        if start >= end {
            return Err(ValidationError::InvalidRange);
        }

        if start.date_naive() != end.date_naive() {
            return Err(ValidationError::CrossesMidnight);
        }

        // Half-open working window: starting at open and ending exactly at
        // close are both allowed.
        if start.time() < self.open_time
            || start.time() >= self.close_time
            || end.time() > self.close_time
        {
            return Err(ValidationError::OutsideWorkingHours);
        }

        if start <= now {
            return Err(ValidationError::InThePast);
        }

        Ok(())
    }
}
