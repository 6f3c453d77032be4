// libs/scheduling-cell/src/router.rs
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{self, SchedulingState};

pub fn scheduling_routes(state: Arc<SchedulingState>) -> Router {
    Router::new()
        .route("/", post(handlers::book_appointment))
        .route("/{appointment_id}", get(handlers::get_appointment))
        .route("/{appointment_id}/cancel", post(handlers::cancel_appointment))
        .route("/doctors/{doctor_id}", get(handlers::get_doctor_appointments))
        .route("/doctors/{doctor_id}/slots", get(handlers::get_available_slots))
        .with_state(state)
}
