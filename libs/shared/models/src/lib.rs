pub mod booking;
pub mod error;

pub use booking::{Appointment, AppointmentPatch, AppointmentStatus, Service};
pub use error::StorageError;
