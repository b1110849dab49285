use chrono::{Duration, Timelike, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::SchedulingConfig;
use shared_ledger::{BookingLedger, ServiceCatalog};
use shared_models::{Appointment, AppointmentStatus, Service};

use crate::models::{BookingReceipt, BookingRequest, SchedulingError, UserAppointmentsQuery};
use crate::services::conflict::ConflictService;
use crate::services::consistency::ProfessionalLocks;

/// Orchestrates booking creation: validation, service resolution, one
/// conflict check over the whole requested span, and the atomic append of
/// the resulting appointment chain.
pub struct BookingService {
    ledger: Arc<dyn BookingLedger>,
    catalog: Arc<dyn ServiceCatalog>,
    conflict_service: ConflictService,
    locks: ProfessionalLocks,
    config: SchedulingConfig,
}

impl BookingService {
    pub fn new(
        ledger: Arc<dyn BookingLedger>,
        catalog: Arc<dyn ServiceCatalog>,
        config: SchedulingConfig,
    ) -> Self {
        let conflict_service = ConflictService::new(Arc::clone(&ledger), &config);
        Self {
            ledger,
            catalog,
            conflict_service,
            locks: ProfessionalLocks::new(),
            config,
        }
    }

    /// Book the requested services as a back-to-back chain.
    ///
    /// One appointment is created per service, each snapshotting that
    /// service's price and duration; `notes` attach to the first appointment
    /// only. The whole chain is checked and persisted as a unit - a conflict
    /// anywhere in the combined span rejects the entire request.
    pub async fn create_booking(
        &self,
        request: BookingRequest,
    ) -> Result<BookingReceipt, SchedulingError> {
        self.validate_request(&request)?;

        if request.starts_at <= Utc::now() {
            return Err(SchedulingError::Validation(
                "attendance must start in the future".to_string(),
            ));
        }

        // Checked against the start hour only; a long chain may run past
        // closing time.
        let start_hour = request.starts_at.hour();
        if !self.config.is_business_hour(start_hour) {
            return Err(SchedulingError::Validation(
                "attendance start falls outside business hours".to_string(),
            ));
        }

        let services = self.resolve_services(&request.service_ids).await?;

        let fallback = self.config.default_service_duration_minutes;
        let total_duration_minutes: i64 = services
            .iter()
            .map(|s| s.effective_duration_minutes(fallback))
            .sum();
        let total_value: Decimal = services.iter().map(|s| s.price).sum();
        let chain_end = request.starts_at + Duration::minutes(total_duration_minutes);

        debug!(
            "Booking {} service(s) for professional {} spanning {} to {}",
            services.len(),
            request.professional_id,
            request.starts_at,
            chain_end
        );

        // Critical section: the availability check and the append must not
        // interleave with another booking for the same professional.
        let _guard = self.locks.acquire(request.professional_id).await;

        let available = self
            .conflict_service
            .is_available(request.professional_id, request.starts_at, chain_end)
            .await?;
        if !available {
            warn!(
                "Rejected booking for professional {} at {}: span is occupied",
                request.professional_id, request.starts_at
            );
            return Err(SchedulingError::SlotConflict);
        }

        let created_at = Utc::now();
        let mut chain = Vec::with_capacity(services.len());
        let mut cursor = request.starts_at;
        for (index, service) in services.iter().enumerate() {
            let duration = service.effective_duration_minutes(fallback);
            chain.push(Appointment {
                id: Uuid::new_v4(),
                professional_id: request.professional_id,
                user_id: request.user_id,
                service_id: service.id,
                scheduled_at: cursor,
                created_at,
                status: AppointmentStatus::Scheduled,
                notes: if index == 0 { request.notes.clone() } else { None },
                total_value: service.price,
                duration_minutes: duration,
                cancellation_fee: Decimal::ZERO,
            });
            cursor += Duration::minutes(duration);
        }

        self.ledger.append_chain(&chain).await?;

        info!(
            "Booked chain of {} appointment(s) for professional {} starting {}",
            chain.len(),
            request.professional_id,
            request.starts_at
        );

        Ok(BookingReceipt {
            appointments: chain,
            total_value,
            total_duration_minutes,
        })
    }

    /// A user's appointments with optional status and attendance-window
    /// filters, ordered by attendance time.
    pub async fn list_user_appointments(
        &self,
        query: UserAppointmentsQuery,
    ) -> Result<Vec<Appointment>, SchedulingError> {
        let mut appointments = self.ledger.find_by_user(query.user_id).await?;

        if let Some(status) = query.status {
            appointments.retain(|a| a.status == status);
        }
        if let Some(from) = query.from {
            appointments.retain(|a| a.scheduled_at >= from);
        }
        if let Some(to) = query.to {
            appointments.retain(|a| a.scheduled_at <= to);
        }

        appointments.sort_by_key(|a| a.scheduled_at);
        Ok(appointments)
    }

    /// Resolve every requested service, aborting on the first missing id.
    async fn resolve_services(
        &self,
        service_ids: &[i64],
    ) -> Result<Vec<Service>, SchedulingError> {
        let mut services = Vec::with_capacity(service_ids.len());
        for service_id in service_ids {
            let service = self
                .catalog
                .resolve(*service_id)
                .await?
                .ok_or(SchedulingError::ServiceNotFound(*service_id))?;
            services.push(service);
        }
        Ok(services)
    }

    fn validate_request(&self, request: &BookingRequest) -> Result<(), SchedulingError> {
        if request.service_ids.is_empty() {
            return Err(SchedulingError::Validation(
                "at least one service is required".to_string(),
            ));
        }
        if request.user_id <= 0 {
            return Err(SchedulingError::Validation(
                "user id must be a positive identifier".to_string(),
            ));
        }
        if request.professional_id <= 0 {
            return Err(SchedulingError::Validation(
                "professional id must be a positive identifier".to_string(),
            ));
        }
        Ok(())
    }
}
