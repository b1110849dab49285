use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use shared_ledger::BookingLedger;
use shared_models::{AppointmentPatch, AppointmentStatus};

use crate::models::{CancellationOutcome, SchedulingError};

/// Graduated cancellation-fee policy.
pub struct CancellationService {
    ledger: Arc<dyn BookingLedger>,
}

impl CancellationService {
    pub fn new(ledger: Arc<dyn BookingLedger>) -> Self {
        Self { ledger }
    }

    /// Cancel an appointment on behalf of its owner.
    ///
    /// The fee is a percentage of the service price snapshotted on the
    /// appointment at booking time, tiered on how much advance notice the
    /// user gives. Cancellation is a status transition; the record stays in
    /// the ledger.
    pub async fn cancel(
        &self,
        appointment_id: Uuid,
        requesting_user_id: i64,
    ) -> Result<CancellationOutcome, SchedulingError> {
        let appointment = self
            .ledger
            .find_by_id(appointment_id)
            .await?
            .ok_or(SchedulingError::AppointmentNotFound)?;

        if appointment.user_id != requesting_user_id {
            return Err(SchedulingError::NotOwner);
        }

        match appointment.status {
            AppointmentStatus::Cancelled => return Err(SchedulingError::AlreadyCancelled),
            AppointmentStatus::Completed => return Err(SchedulingError::CancelCompleted),
            AppointmentStatus::Scheduled => {}
        }

        let advance_notice_minutes = (appointment.scheduled_at - Utc::now()).num_minutes();
        let fee = cancellation_fee(appointment.total_value, advance_notice_minutes);

        let patch = AppointmentPatch {
            status: Some(AppointmentStatus::Cancelled),
            cancellation_fee: Some(fee),
            ..Default::default()
        };
        let updated = self
            .ledger
            .update(appointment_id, &patch)
            .await?
            .ok_or(SchedulingError::AppointmentNotFound)?;

        info!(
            "Appointment {} cancelled with {} minute(s) notice, fee {}",
            appointment_id, advance_notice_minutes, fee
        );

        Ok(CancellationOutcome {
            free_cancellation: fee.is_zero(),
            fee,
            appointment: updated,
        })
    }
}

/// Fee schedule, tiered on advance notice. Tier bounds are user-facing
/// money: exactly 120 minutes is free, exactly 90 lands in the 40% tier.
/// Notice below zero (the attendance already started) charges in full.
pub fn cancellation_fee(service_price: Decimal, advance_notice_minutes: i64) -> Decimal {
    if advance_notice_minutes >= 120 {
        Decimal::ZERO
    } else if advance_notice_minutes >= 90 {
        service_price * dec!(0.40)
    } else if advance_notice_minutes >= 60 {
        service_price * dec!(0.45)
    } else if advance_notice_minutes >= 30 {
        service_price * dec!(0.50)
    } else {
        service_price
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fee_tiers_are_exact_at_their_boundaries() {
        let price = dec!(100.00);
        let expectations = [
            (120, dec!(0)),
            (119, dec!(40.0000)),
            (90, dec!(40.0000)),
            (89, dec!(45.0000)),
            (60, dec!(45.0000)),
            (59, dec!(50.0000)),
            (30, dec!(50.0000)),
            (29, dec!(100.00)),
            (0, dec!(100.00)),
        ];
        for (minutes, expected) in expectations {
            assert_eq!(
                cancellation_fee(price, minutes),
                expected,
                "notice of {} minute(s)",
                minutes
            );
        }
    }

    #[test]
    fn notice_in_the_past_charges_the_full_price() {
        assert_eq!(cancellation_fee(dec!(80.00), -15), dec!(80.00));
    }

    #[test]
    fn fee_scales_with_the_service_price() {
        assert_eq!(cancellation_fee(dec!(250.00), 95), dec!(100.0000));
    }
}
