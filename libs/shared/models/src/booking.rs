use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

use crate::error::StorageError;

/// A service offered by a professional. Owned by the catalog and immutable
/// once published; the engine only ever reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: i64,
    pub name: String,
    pub price: Decimal,
    /// Duration in minutes. Zero or negative means the duration was never
    /// set; callers must fall back to the configured default.
    pub duration_minutes: i64,
}

impl Service {
    pub fn effective_duration_minutes(&self, fallback_minutes: i64) -> i64 {
        if self.duration_minutes > 0 {
            self.duration_minutes
        } else {
            fallback_minutes
        }
    }
}

/// A booked attendance slot for one service.
///
/// `total_value` and `duration_minutes` are snapshots of the resolved service
/// taken at booking time, so later catalog edits never shift an existing
/// appointment's occupied interval `[scheduled_at, scheduled_at + duration)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub professional_id: i64,
    pub user_id: i64,
    pub service_id: i64,
    pub scheduled_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub total_value: Decimal,
    pub duration_minutes: i64,
    pub cancellation_fee: Decimal,
}

impl Appointment {
    pub fn effective_duration_minutes(&self, fallback_minutes: i64) -> i64 {
        if self.duration_minutes > 0 {
            self.duration_minutes
        } else {
            fallback_minutes
        }
    }

    /// End of the occupied interval, end-exclusive.
    pub fn occupied_until(&self, fallback_minutes: i64) -> DateTime<Utc> {
        self.scheduled_at + Duration::minutes(self.effective_duration_minutes(fallback_minutes))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    /// Terminal states accept no further transition.
    pub fn is_terminal(&self) -> bool {
        matches!(self, AppointmentStatus::Completed | AppointmentStatus::Cancelled)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "scheduled"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Typed partial update for an appointment.
///
/// Only the fields listed here are mutable after creation. Updates arriving
/// as JSON go through [`AppointmentPatch::from_json`], which rejects any
/// field outside this allow-list instead of silently applying it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppointmentPatch {
    pub scheduled_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub status: Option<AppointmentStatus>,
    pub cancellation_fee: Option<Decimal>,
    pub total_value: Option<Decimal>,
}

impl AppointmentPatch {
    pub fn from_json(value: Value) -> Result<Self, StorageError> {
        serde_json::from_value(value).map_err(|e| StorageError::InvalidField(e.to_string()))
    }

    pub fn is_empty(&self) -> bool {
        self.scheduled_at.is_none()
            && self.notes.is_none()
            && self.status.is_none()
            && self.cancellation_fee.is_none()
            && self.total_value.is_none()
    }

    /// Apply the patch to an appointment in place.
    pub fn apply_to(&self, appointment: &mut Appointment) {
        if let Some(scheduled_at) = self.scheduled_at {
            appointment.scheduled_at = scheduled_at;
        }
        if let Some(notes) = &self.notes {
            appointment.notes = Some(notes.clone());
        }
        if let Some(status) = self.status {
            appointment.status = status;
        }
        if let Some(fee) = self.cancellation_fee {
            appointment.cancellation_fee = fee;
        }
        if let Some(total_value) = self.total_value {
            appointment.total_value = total_value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn sample_appointment() -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            professional_id: 1,
            user_id: 1,
            service_id: 1,
            scheduled_at: "2026-09-01T10:00:00Z".parse().unwrap(),
            created_at: Utc::now(),
            status: AppointmentStatus::Scheduled,
            notes: None,
            total_value: dec!(80.00),
            duration_minutes: 45,
            cancellation_fee: Decimal::ZERO,
        }
    }

    #[test]
    fn unset_service_duration_falls_back() {
        let service = Service {
            id: 7,
            name: "eyebrow shaping".into(),
            price: dec!(25.00),
            duration_minutes: 0,
        };
        assert_eq!(service.effective_duration_minutes(60), 60);
    }

    #[test]
    fn occupied_interval_uses_the_snapshot_duration() {
        let appointment = sample_appointment();
        let end: DateTime<Utc> = "2026-09-01T10:45:00Z".parse().unwrap();
        assert_eq!(appointment.occupied_until(60), end);
    }

    #[test]
    fn patch_rejects_fields_outside_the_allow_list() {
        let result = AppointmentPatch::from_json(json!({ "created_at": "2026-01-01T00:00:00Z" }));
        assert!(matches!(result, Err(StorageError::InvalidField(_))));

        let result = AppointmentPatch::from_json(json!({ "user_id": 42 }));
        assert!(matches!(result, Err(StorageError::InvalidField(_))));
    }

    #[test]
    fn patch_applies_only_present_fields() {
        let mut appointment = sample_appointment();
        let patch = AppointmentPatch::from_json(json!({
            "status": "cancelled",
            "cancellation_fee": "32.00"
        }))
        .unwrap();

        patch.apply_to(&mut appointment);
        assert_eq!(appointment.status, AppointmentStatus::Cancelled);
        assert_eq!(appointment.cancellation_fee, dec!(32.00));
        assert_eq!(appointment.duration_minutes, 45);
    }
}
