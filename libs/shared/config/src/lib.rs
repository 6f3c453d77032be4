use std::env;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Scheduling configuration for the clinic, loaded from the environment.
/// All times are UTC wall-clock; the clinic operates in a single zone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClinicConfig {
    pub open_time: NaiveTime,
    pub close_time: NaiveTime,
    pub default_slot_minutes: i64,
}

const DEFAULT_OPEN: &str = "09:00";
const DEFAULT_CLOSE: &str = "17:00";
const DEFAULT_SLOT_MINUTES: i64 = 30;

impl ClinicConfig {
    pub fn from_env() -> Self {
        let config = Self {
            open_time: parse_time_var("CLINIC_OPEN", DEFAULT_OPEN),
            close_time: parse_time_var("CLINIC_CLOSE", DEFAULT_CLOSE),
            default_slot_minutes: env::var("DEFAULT_SLOT_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(|| {
                    warn!("DEFAULT_SLOT_MINUTES not set or invalid, using {} minutes", DEFAULT_SLOT_MINUTES);
                    DEFAULT_SLOT_MINUTES
                }),
        };

        if !config.is_configured() {
            warn!("Clinic configuration invalid - open/close window is empty or slot duration non-positive");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        self.open_time < self.close_time && self.default_slot_minutes > 0
    }
}

impl Default for ClinicConfig {
    fn default() -> Self {
        Self {
            open_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            close_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            default_slot_minutes: DEFAULT_SLOT_MINUTES,
        }
    }
}

fn parse_time_var(name: &str, fallback: &str) -> NaiveTime {
    let raw = env::var(name).unwrap_or_else(|_| {
        warn!("{} not set, using {}", name, fallback);
        fallback.to_string()
    });

    NaiveTime::parse_from_str(&raw, "%H:%M").unwrap_or_else(|_| {
        warn!("{} value '{}' is not HH:MM, using {}", name, raw, fallback);
        NaiveTime::parse_from_str(fallback, "%H:%M").expect("fallback time is valid")
    })
}
