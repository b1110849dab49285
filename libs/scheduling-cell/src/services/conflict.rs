use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, warn};

use shared_config::SchedulingConfig;
use shared_ledger::BookingLedger;

use crate::models::SchedulingError;

/// Exact interval overlap detection against the ledger.
pub struct ConflictService {
    ledger: Arc<dyn BookingLedger>,
    fallback_duration_minutes: i64,
}

impl ConflictService {
    pub fn new(ledger: Arc<dyn BookingLedger>, config: &SchedulingConfig) -> Self {
        Self {
            ledger,
            fallback_duration_minutes: config.default_service_duration_minutes,
        }
    }

    /// Whether `[start, end)` is free for the professional.
    ///
    /// The ledger returns a coarse candidate set; each candidate's end is
    /// computed here from its own snapshot duration (with the configured
    /// fallback when the snapshot is unset) and tested with half-open
    /// interval math. An appointment ending exactly at `start` never
    /// conflicts.
    pub async fn is_available(
        &self,
        professional_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<bool, SchedulingError> {
        debug!(
            "Checking availability for professional {} from {} to {}",
            professional_id, start, end
        );

        let candidates = self
            .ledger
            .find_overlapping(professional_id, start, end)
            .await?;

        for candidate in candidates {
            let candidate_end = candidate.occupied_until(self.fallback_duration_minutes);
            if intervals_overlap(start, end, candidate.scheduled_at, candidate_end) {
                warn!(
                    "Professional {} is occupied by appointment {} between {} and {}",
                    professional_id, candidate.id, candidate.scheduled_at, candidate_end
                );
                return Ok(false);
            }
        }

        Ok(true)
    }
}

/// Half-open overlap test: `[start1, end1)` and `[start2, end2)` conflict
/// iff neither interval ends before the other begins.
pub fn intervals_overlap(
    start1: DateTime<Utc>,
    end1: DateTime<Utc>,
    start2: DateTime<Utc>,
    end2: DateTime<Utc>,
) -> bool {
    start1 < end2 && start2 < end1
}
