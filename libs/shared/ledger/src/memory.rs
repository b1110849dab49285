use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use shared_models::{Appointment, AppointmentPatch, AppointmentStatus, Service, StorageError};

use crate::catalog::ServiceCatalog;
use crate::ledger::BookingLedger;

/// In-memory catalog backed by a plain map. Services are fixed at
/// construction time, matching the read-only contract of the seam.
pub struct InMemoryCatalog {
    services: HashMap<i64, Service>,
}

impl InMemoryCatalog {
    pub fn new(services: Vec<Service>) -> Self {
        Self {
            services: services.into_iter().map(|s| (s.id, s)).collect(),
        }
    }
}

#[async_trait]
impl ServiceCatalog for InMemoryCatalog {
    async fn resolve(&self, service_id: i64) -> Result<Option<Service>, StorageError> {
        Ok(self.services.get(&service_id).cloned())
    }
}

/// In-memory appointment book guarded by a single `RwLock`, which makes
/// `append_chain` trivially all-or-nothing: the whole slice is inserted
/// under one write guard.
#[derive(Default)]
pub struct InMemoryLedger {
    appointments: RwLock<HashMap<Uuid, Appointment>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookingLedger for InMemoryLedger {
    async fn find_by_id(
        &self,
        appointment_id: Uuid,
    ) -> Result<Option<Appointment>, StorageError> {
        Ok(self.appointments.read().await.get(&appointment_id).cloned())
    }

    async fn find_by_user(&self, user_id: i64) -> Result<Vec<Appointment>, StorageError> {
        Ok(self
            .appointments
            .read()
            .await
            .values()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_by_professional_on_date(
        &self,
        professional_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, StorageError> {
        let day_start = day_start_utc(date)?;
        let day_end = day_start + Duration::days(1);

        let mut on_date: Vec<Appointment> = self
            .appointments
            .read()
            .await
            .values()
            .filter(|a| {
                a.professional_id == professional_id
                    && a.status != AppointmentStatus::Cancelled
                    && a.scheduled_at >= day_start
                    && a.scheduled_at < day_end
            })
            .cloned()
            .collect();

        on_date.sort_by_key(|a| a.scheduled_at);
        Ok(on_date)
    }

    async fn find_overlapping(
        &self,
        professional_id: i64,
        _start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, StorageError> {
        Ok(self
            .appointments
            .read()
            .await
            .values()
            .filter(|a| {
                a.professional_id == professional_id
                    && a.status != AppointmentStatus::Cancelled
                    && a.scheduled_at < end
            })
            .cloned()
            .collect())
    }

    async fn append_chain(&self, appointments: &[Appointment]) -> Result<(), StorageError> {
        let mut book = self.appointments.write().await;
        for appointment in appointments {
            book.insert(appointment.id, appointment.clone());
        }
        debug!("Appended chain of {} appointment(s)", appointments.len());
        Ok(())
    }

    async fn update(
        &self,
        appointment_id: Uuid,
        patch: &AppointmentPatch,
    ) -> Result<Option<Appointment>, StorageError> {
        let mut book = self.appointments.write().await;
        match book.get_mut(&appointment_id) {
            Some(appointment) => {
                patch.apply_to(appointment);
                Ok(Some(appointment.clone()))
            }
            None => Ok(None),
        }
    }
}

fn day_start_utc(date: NaiveDate) -> Result<DateTime<Utc>, StorageError> {
    date.and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc())
        .ok_or_else(|| StorageError::Unavailable(format!("invalid date: {}", date)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn appointment(professional_id: i64, scheduled_at: &str) -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            professional_id,
            user_id: 10,
            service_id: 1,
            scheduled_at: scheduled_at.parse().unwrap(),
            created_at: Utc::now(),
            status: AppointmentStatus::Scheduled,
            notes: None,
            total_value: dec!(50.00),
            duration_minutes: 60,
            cancellation_fee: Decimal::ZERO,
        }
    }

    #[tokio::test]
    async fn day_query_excludes_cancelled_and_sorts_ascending() {
        let ledger = InMemoryLedger::new();
        let mut cancelled = appointment(1, "2026-09-01T09:00:00Z");
        cancelled.status = AppointmentStatus::Cancelled;
        let late = appointment(1, "2026-09-01T16:00:00Z");
        let early = appointment(1, "2026-09-01T10:00:00Z");
        let other_day = appointment(1, "2026-09-02T10:00:00Z");
        ledger
            .append_chain(&[cancelled, late.clone(), early.clone(), other_day])
            .await
            .unwrap();

        let date = "2026-09-01".parse().unwrap();
        let found = ledger.find_by_professional_on_date(1, date).await.unwrap();
        let ids: Vec<Uuid> = found.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![early.id, late.id]);
    }

    #[tokio::test]
    async fn overlap_prefilter_keeps_candidates_starting_before_end() {
        let ledger = InMemoryLedger::new();
        let before = appointment(1, "2026-09-01T10:00:00Z");
        let after = appointment(1, "2026-09-01T15:00:00Z");
        let other_professional = appointment(2, "2026-09-01T10:00:00Z");
        ledger
            .append_chain(&[before.clone(), after, other_professional])
            .await
            .unwrap();

        let start = "2026-09-01T11:00:00Z".parse().unwrap();
        let end = "2026-09-01T12:00:00Z".parse().unwrap();
        let candidates = ledger.find_overlapping(1, start, end).await.unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].id, before.id);
    }

    #[tokio::test]
    async fn update_returns_none_for_unknown_appointment() {
        let ledger = InMemoryLedger::new();
        let patch = AppointmentPatch {
            status: Some(AppointmentStatus::Cancelled),
            ..Default::default()
        };
        let updated = ledger.update(Uuid::new_v4(), &patch).await.unwrap();
        assert!(updated.is_none());
    }
}
