pub mod handlers;
pub mod models;
pub mod router;
pub mod services;
pub mod store;

pub use handlers::SchedulingState;
pub use models::{
    Appointment, AppointmentStatus, BookAppointmentRequest, SchedulingError, TimeSlot,
    ValidationError,
};
