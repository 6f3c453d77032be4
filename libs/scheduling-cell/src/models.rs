// libs/scheduling-cell/src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Booked,
    Cancelled,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Booked => write!(f, "booked"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Strictly-typed booking candidate. The transport layer converts its JSON
/// body into this before anything reaches the scheduling core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub reason: Option<String>,
}

/// A candidate appointment window derived during availability calculation.
/// Never persisted; carries no identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

/// Caller-input problems caught before any storage access. Always
/// recoverable by resubmitting corrected input; never retried automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum ValidationError {
    #[error("start time must be strictly before end time")]
    InvalidRange,

    #[error("appointment must start and end on the same day")]
    CrossesMidnight,

    #[error("appointment falls outside clinic working hours")]
    OutsideWorkingHours,

    #[error("appointment start time must be in the future")]
    InThePast,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchedulingError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Expected contention outcome, not a system failure. The caller should
    /// pick a different slot, not retry the same request.
    #[error("appointment conflicts with an existing booking")]
    Conflict,

    #[error("appointment not found")]
    NotFound,

    #[error("appointment is already cancelled")]
    AlreadyCancelled,

    /// Storage-layer failure. Safe to retry the whole call from the top.
    #[error("transient storage failure: {0}")]
    Transient(String),
}
