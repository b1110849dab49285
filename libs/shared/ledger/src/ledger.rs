use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use shared_models::{Appointment, AppointmentPatch, StorageError};

/// The appointment book for all professionals. Sole authority over the
/// appointment lifecycle; appointments are never removed, only transitioned.
#[async_trait]
pub trait BookingLedger: Send + Sync {
    async fn find_by_id(&self, appointment_id: Uuid)
        -> Result<Option<Appointment>, StorageError>;

    /// Every appointment a user ever booked, in storage order.
    async fn find_by_user(&self, user_id: i64) -> Result<Vec<Appointment>, StorageError>;

    /// Non-cancelled appointments of a professional on a UTC calendar day,
    /// ordered by `scheduled_at` ascending.
    async fn find_by_professional_on_date(
        &self,
        professional_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, StorageError>;

    /// Coarse conflict pre-filter: non-cancelled appointments of the
    /// professional with `scheduled_at < end`. The exact half-open overlap
    /// test happens in the conflict resolver, which knows each candidate's
    /// own computed end.
    async fn find_overlapping(
        &self,
        professional_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, StorageError>;

    /// Persist a booking chain as one atomic unit. Either every appointment
    /// in the slice becomes visible or none does, including under concurrent
    /// appends for the same professional.
    async fn append_chain(&self, appointments: &[Appointment]) -> Result<(), StorageError>;

    /// Apply a partial update. Fields outside the patch allow-list cannot be
    /// expressed; `Ok(None)` means the appointment does not exist.
    async fn update(
        &self,
        appointment_id: Uuid,
        patch: &AppointmentPatch,
    ) -> Result<Option<Appointment>, StorageError>;
}
