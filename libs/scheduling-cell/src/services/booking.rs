// libs/scheduling-cell/src/services/booking.rs
//
// Booking transaction coordinator. Executes validate -> overlap-check ->
// insert as one atomic unit against the store, so that among any number of
// concurrent bookings targeting overlapping ranges for the same doctor, at
// most one commits and the rest observe a conflict.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{Days, NaiveDate, NaiveTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::ClinicConfig;

use crate::models::{Appointment, AppointmentStatus, BookAppointmentRequest, SchedulingError};
use crate::services::validation::BookingValidator;
use crate::store::{AppointmentStore, StoreError};

const MAX_RETRY_ATTEMPTS: u32 = 3;
const RETRY_BASE_DELAY_MS: u64 = 100;

pub struct BookingService {
    store: Arc<AppointmentStore>,
    validator: BookingValidator,
}

impl BookingService {
    pub fn new(store: Arc<AppointmentStore>, config: &ClinicConfig) -> Self {
        Self {
            store,
            validator: BookingValidator::from_config(config),
        }
    }

    /// Book an appointment. Exactly one of any set of concurrent calls with
    /// overlapping ranges for the same doctor succeeds; which one wins is
    /// first-committed, not first-received.
    pub async fn book(
        &self,
        request: BookAppointmentRequest,
    ) -> Result<Appointment, SchedulingError> {
        self.validator
            .validate(request.start_time, request.end_time, Utc::now())?;

        for attempt in 1..=MAX_RETRY_ATTEMPTS {
            let mut tx = self
                .store
                .begin(request.doctor_id, request.start_time, request.end_time)
                .await;

            if let Some(existing) = tx.find_overlapping(request.start_time, request.end_time) {
                debug!(
                    "booking conflict for doctor {}: [{}, {}) overlaps appointment {}",
                    request.doctor_id, request.start_time, request.end_time, existing.id
                );
                return Err(SchedulingError::Conflict);
            }

            let now = Utc::now();
            let appointment = Appointment {
                id: Uuid::new_v4(),
                doctor_id: request.doctor_id,
                patient_id: request.patient_id,
                start_time: request.start_time,
                end_time: request.end_time,
                status: AppointmentStatus::Booked,
                reason: request.reason.clone(),
                created_at: now,
                updated_at: now,
            };
            tx.insert(appointment.clone());

            match tx.commit().await {
                Ok(()) => {
                    info!(
                        "appointment {} booked for doctor {} at [{}, {})",
                        appointment.id, appointment.doctor_id,
                        appointment.start_time, appointment.end_time
                    );
                    return Ok(appointment);
                }
                Err(StoreError::WriteConflict) if attempt < MAX_RETRY_ATTEMPTS => {
                    warn!(
                        "write conflict on doctor {} calendar, retrying attempt {}/{}",
                        request.doctor_id, attempt, MAX_RETRY_ATTEMPTS
                    );
                    let backoff = RETRY_BASE_DELAY_MS << (attempt - 1);
                    tokio::time::sleep(StdDuration::from_millis(backoff)).await;
                }
                Err(StoreError::WriteConflict) => break,
                Err(e) => return Err(SchedulingError::Transient(e.to_string())),
            }
        }

        Err(SchedulingError::Transient(
            "booking retries exhausted under write contention".to_string(),
        ))
    }

    /// Transition an appointment to its terminal cancelled state. Rejects a
    /// double cancel rather than silently succeeding, so the caller learns
    /// that nothing changed; the row is left untouched in that case.
    pub async fn cancel(&self, appointment_id: Uuid) -> Result<Appointment, SchedulingError> {
        match self
            .store
            .update_status(
                appointment_id,
                AppointmentStatus::Booked,
                AppointmentStatus::Cancelled,
            )
            .await
        {
            Ok(appointment) => {
                info!("appointment {} cancelled", appointment_id);
                Ok(appointment)
            }
            Err(StoreError::NotFound) => Err(SchedulingError::NotFound),
            Err(StoreError::StatusMismatch { .. }) => Err(SchedulingError::AlreadyCancelled),
            Err(e) => Err(SchedulingError::Transient(e.to_string())),
        }
    }

    pub async fn get_appointment(
        &self,
        appointment_id: Uuid,
    ) -> Result<Appointment, SchedulingError> {
        self.store
            .get(appointment_id)
            .await
            .ok_or(SchedulingError::NotFound)
    }

    /// All appointments for the doctor on `date`, any status, sorted by
    /// start time ascending. Display path.
    pub async fn list_appointments(&self, doctor_id: Uuid, date: NaiveDate) -> Vec<Appointment> {
        let day_start = date.and_time(NaiveTime::MIN).and_utc();
        let day_end = (date + Days::new(1)).and_time(NaiveTime::MIN).and_utc();
        self.store.list_in_range(doctor_id, day_start, day_end).await
    }
}
