pub mod availability;
pub mod booking;
pub mod overlap;
pub mod validation;
