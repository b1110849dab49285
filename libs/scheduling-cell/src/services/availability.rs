use chrono::{DateTime, Duration, NaiveDate, Timelike, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

use shared_config::SchedulingConfig;
use shared_ledger::BookingLedger;

use crate::models::{FreeSlot, SchedulingError};

/// Computes free slots for a professional on a calendar day.
///
/// Works on a fixed grid of `slot_minutes` cells anchored at the opening
/// hour. A grid cell counts as occupied when any non-cancelled appointment
/// intersects it, so an appointment that starts off-grid still blocks every
/// cell it touches. This is a presentation aid: the booking path re-checks
/// the exact requested interval at commit time.
pub struct AvailabilityService {
    ledger: Arc<dyn BookingLedger>,
    config: SchedulingConfig,
}

impl AvailabilityService {
    pub fn new(ledger: Arc<dyn BookingLedger>, config: SchedulingConfig) -> Self {
        Self { ledger, config }
    }

    pub async fn list_free_slots(
        &self,
        professional_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<FreeSlot>, SchedulingError> {
        let appointments = self
            .ledger
            .find_by_professional_on_date(professional_id, date)
            .await?;

        debug!(
            "Computing free slots for professional {} on {} against {} appointment(s)",
            professional_id,
            date,
            appointments.len()
        );

        let day_open = hour_on(date, self.config.open_hour)?;
        let day_close = hour_on(date, self.config.close_hour)?;
        let slot = Duration::minutes(self.config.slot_minutes);
        let fallback = self.config.default_service_duration_minutes;

        let mut occupied: HashSet<DateTime<Utc>> = HashSet::new();
        for appointment in &appointments {
            let busy_from = appointment.scheduled_at;
            let busy_until = appointment.occupied_until(fallback);

            // Walk the grid cells intersecting [busy_from, busy_until).
            let mut cell = align_to_grid(busy_from, day_open, self.config.slot_minutes);
            while cell < busy_until {
                if cell + slot > busy_from {
                    occupied.insert(cell);
                }
                cell += slot;
            }
        }

        let mut free_slots = Vec::new();
        let mut cursor = day_open;
        while cursor < day_close {
            if !self.config.is_lunch_hour(cursor.hour()) && !occupied.contains(&cursor) {
                free_slots.push(FreeSlot {
                    label: cursor.format("%H:%M").to_string(),
                    starts_at: cursor,
                });
            }
            cursor += slot;
        }

        Ok(free_slots)
    }
}

fn hour_on(date: NaiveDate, hour: u32) -> Result<DateTime<Utc>, SchedulingError> {
    date.and_hms_opt(hour, 0, 0)
        .map(|naive| naive.and_utc())
        .ok_or_else(|| {
            SchedulingError::Validation(format!("hour {} is not valid on {}", hour, date))
        })
}

/// Snap an instant down to the grid cell containing it.
fn align_to_grid(
    instant: DateTime<Utc>,
    grid_anchor: DateTime<Utc>,
    slot_minutes: i64,
) -> DateTime<Utc> {
    let offset_minutes = (instant - grid_anchor).num_minutes();
    let floored = offset_minutes.div_euclid(slot_minutes) * slot_minutes;
    grid_anchor + Duration::minutes(floored)
}
