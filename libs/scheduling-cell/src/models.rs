use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_models::{Appointment, AppointmentStatus, StorageError};

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

/// A booking request for one or more services attended back-to-back.
///
/// Inputs arrive already parsed and authenticated; string/format validation
/// is the boundary layer's job. `service_ids` keeps the caller's order - the
/// chain is laid out in exactly that order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequest {
    pub user_id: i64,
    pub professional_id: i64,
    pub starts_at: DateTime<Utc>,
    pub service_ids: Vec<i64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingReceipt {
    pub appointments: Vec<Appointment>,
    pub total_value: Decimal,
    pub total_duration_minutes: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancellationOutcome {
    pub appointment: Appointment,
    pub fee: Decimal,
    pub free_cancellation: bool,
}

/// A bookable grid cell offered to the caller. Presentation only - exact
/// interval math is re-run by the conflict resolver at commit time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FreeSlot {
    pub label: String,
    pub starts_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserAppointmentsQuery {
    pub user_id: i64,
    pub status: Option<AppointmentStatus>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Error, Debug, Clone)]
pub enum SchedulingError {
    #[error("invalid booking request: {0}")]
    Validation(String),

    #[error("service {0} not found")]
    ServiceNotFound(i64),

    #[error("appointment not found")]
    AppointmentNotFound,

    #[error("requested window conflicts with an existing appointment")]
    SlotConflict,

    #[error("appointment already cancelled")]
    AlreadyCancelled,

    #[error("cannot cancel a completed appointment")]
    CancelCompleted,

    #[error("appointment does not belong to the requesting user")]
    NotOwner,

    #[error("storage error: {0}")]
    Storage(String),
}

impl From<StorageError> for SchedulingError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Unavailable(msg) => SchedulingError::Storage(msg),
            StorageError::InvalidField(msg) => SchedulingError::Validation(msg),
        }
    }
}
