use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

pub const SOURCE: &str = "wheretheiss.at";

const SECONDS_PER_HOUR: f64 = 3600.0;

/// A coherent position fix. Either all of these are known or none are.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fix {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude_km: f64,
    pub velocity_kmh: f64,
}

/// A single observation, or a heartbeat when the upstream could not be read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Record {
    /// UTC, second precision, `Z` suffix.
    pub timestamp_utc: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub altitude_km: Option<f64>,
    pub velocity_kmh: Option<f64>,
    pub velocity_km_s: Option<f64>,
    pub source: String,
}

impl Record {
    pub fn heartbeat(at: DateTime<Utc>) -> Self {
        Self {
            timestamp_utc: format_timestamp(at),
            latitude: None,
            longitude: None,
            altitude_km: None,
            velocity_kmh: None,
            velocity_km_s: None,
            source: SOURCE.to_string(),
        }
    }

    pub fn observed(at: DateTime<Utc>, fix: Fix) -> Self {
        Self {
            timestamp_utc: format_timestamp(at),
            latitude: Some(fix.latitude),
            longitude: Some(fix.longitude),
            altitude_km: Some(fix.altitude_km),
            velocity_kmh: Some(fix.velocity_kmh),
            velocity_km_s: Some(fix.velocity_kmh / SECONDS_PER_HOUR),
            source: SOURCE.to_string(),
        }
    }

    pub fn is_heartbeat(&self) -> bool {
        self.latitude.is_none()
    }
}

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}
