// libs/scheduling-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::ClinicConfig;
use shared_models::error::AppError;

use crate::models::{BookAppointmentRequest, SchedulingError};
use crate::services::availability::AvailabilityService;
use crate::services::booking::BookingService;
use crate::store::AppointmentStore;

/// Shared scheduling services, built once at startup around a single store.
pub struct SchedulingState {
    pub booking: BookingService,
    pub availability: AvailabilityService,
}

impl SchedulingState {
    pub fn new(config: &ClinicConfig) -> Self {
        let store = Arc::new(AppointmentStore::new());
        Self {
            booking: BookingService::new(Arc::clone(&store), config),
            availability: AvailabilityService::new(store, config),
        }
    }
}

// ==============================================================================
// QUERY PARAMETER STRUCTS
// ==============================================================================

#[derive(Debug, Deserialize)]
pub struct DayQuery {
    pub date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct SlotsQuery {
    pub date: NaiveDate,
    pub slot_minutes: Option<i64>,
}

// ==============================================================================
// HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<SchedulingState>>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let appointment = state.booking.book(request).await.map_err(to_app_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<SchedulingState>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let appointment = state
        .booking
        .cancel(appointment_id)
        .await
        .map_err(to_app_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<SchedulingState>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let appointment = state
        .booking
        .get_appointment(appointment_id)
        .await
        .map_err(to_app_error)?;

    Ok(Json(json!({ "appointment": appointment })))
}

#[axum::debug_handler]
pub async fn get_doctor_appointments(
    State(state): State<Arc<SchedulingState>>,
    Path(doctor_id): Path<Uuid>,
    Query(query): Query<DayQuery>,
) -> Result<Json<Value>, AppError> {
    let appointments = state.booking.list_appointments(doctor_id, query.date).await;

    Ok(Json(json!({
        "doctor_id": doctor_id,
        "date": query.date,
        "appointments": appointments
    })))
}

#[axum::debug_handler]
pub async fn get_available_slots(
    State(state): State<Arc<SchedulingState>>,
    Path(doctor_id): Path<Uuid>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<Value>, AppError> {
    let slots = state
        .availability
        .get_available_slots(doctor_id, query.date, query.slot_minutes)
        .await;

    Ok(Json(json!({
        "doctor_id": doctor_id,
        "date": query.date,
        "slots": slots
    })))
}

fn to_app_error(err: SchedulingError) -> AppError {
    match err {
        SchedulingError::Validation(e) => AppError::BadRequest(e.to_string()),
        SchedulingError::Conflict => {
            AppError::Conflict("appointment slot is no longer available".to_string())
        }
        SchedulingError::NotFound => AppError::NotFound("appointment not found".to_string()),
        SchedulingError::AlreadyCancelled => {
            AppError::Conflict("appointment is already cancelled".to_string())
        }
        SchedulingError::Transient(msg) => AppError::Unavailable(msg),
    }
}
