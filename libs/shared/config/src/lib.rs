use std::env;
use tracing::warn;

/// Business-hour and slot-grid rules for the scheduling engine.
///
/// Hours are expressed in the system reference time zone (UTC). The lunch
/// window is half-open: `[lunch_start_hour, lunch_end_hour)`.
#[derive(Debug, Clone)]
pub struct SchedulingConfig {
    pub open_hour: u32,
    pub close_hour: u32,
    pub lunch_start_hour: u32,
    pub lunch_end_hour: u32,
    pub slot_minutes: i64,
    pub default_service_duration_minutes: i64,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            open_hour: 9,
            close_hour: 20,
            lunch_start_hour: 12,
            lunch_end_hour: 13,
            slot_minutes: 30,
            default_service_duration_minutes: 60,
        }
    }
}

impl SchedulingConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let config = Self {
            open_hour: env_hour("BOOKING_OPEN_HOUR", defaults.open_hour),
            close_hour: env_hour("BOOKING_CLOSE_HOUR", defaults.close_hour),
            lunch_start_hour: env_hour("BOOKING_LUNCH_START_HOUR", defaults.lunch_start_hour),
            lunch_end_hour: env_hour("BOOKING_LUNCH_END_HOUR", defaults.lunch_end_hour),
            slot_minutes: env_minutes("BOOKING_SLOT_MINUTES", defaults.slot_minutes),
            default_service_duration_minutes: env_minutes(
                "BOOKING_DEFAULT_SERVICE_DURATION_MINUTES",
                defaults.default_service_duration_minutes,
            ),
        };

        if !config.is_consistent() {
            warn!("Scheduling configuration is inconsistent - falling back to defaults");
            return defaults;
        }

        config
    }

    pub fn is_consistent(&self) -> bool {
        self.open_hour < self.close_hour
            && self.close_hour <= 24
            && self.lunch_start_hour >= self.open_hour
            && self.lunch_end_hour <= self.close_hour
            && self.lunch_start_hour <= self.lunch_end_hour
            && self.slot_minutes > 0
            && self.default_service_duration_minutes > 0
    }

    /// Whether an hour of day falls inside the lunch window.
    pub fn is_lunch_hour(&self, hour: u32) -> bool {
        hour >= self.lunch_start_hour && hour < self.lunch_end_hour
    }

    /// Whether an hour of day is a valid attendance start hour.
    pub fn is_business_hour(&self, hour: u32) -> bool {
        hour >= self.open_hour && hour < self.close_hour && !self.is_lunch_hour(hour)
    }
}

fn env_hour(name: &str, default: u32) -> u32 {
    match env::var(name) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("{} is not a valid hour, using default {}", name, default);
            default
        }),
        Err(_) => default,
    }
}

fn env_minutes(name: &str, default: i64) -> i64 {
    match env::var(name) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("{} is not a valid minute count, using default {}", name, default);
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_the_standard_business_day() {
        let config = SchedulingConfig::default();
        assert!(config.is_consistent());
        assert!(config.is_business_hour(9));
        assert!(config.is_business_hour(19));
        assert!(!config.is_business_hour(20));
        assert!(!config.is_business_hour(8));
    }

    #[test]
    fn lunch_window_is_half_open() {
        let config = SchedulingConfig::default();
        assert!(config.is_lunch_hour(12));
        assert!(!config.is_lunch_hour(13));
        assert!(!config.is_business_hour(12));
        assert!(config.is_business_hour(13));
    }
}
