use serde::Deserialize;

/// Bounds applied to future track queries. Inputs outside them are clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FutureLimits {
    pub min_minutes: i64,
    pub max_minutes: i64,
    pub min_step_seconds: i64,
    pub max_step_seconds: i64,
    pub default_minutes: i64,
    pub default_step_seconds: i64,
}

impl Default for FutureLimits {
    fn default() -> Self {
        Self {
            min_minutes: 1,
            max_minutes: 180,
            min_step_seconds: 10,
            max_step_seconds: 180,
            default_minutes: 45,
            default_step_seconds: 60,
        }
    }
}

/// A future track request after clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FutureQuery {
    pub minutes_ahead: i64,
    pub step_seconds: i64,
}

impl FutureQuery {
    pub fn clamped(minutes_ahead: i64, step_seconds: i64, limits: &FutureLimits) -> Self {
        Self {
            minutes_ahead: minutes_ahead.clamp(limits.min_minutes, limits.max_minutes),
            step_seconds: step_seconds.clamp(limits.min_step_seconds, limits.max_step_seconds),
        }
    }

    /// UNIX timestamps `now + k*step` for `k >= 1`, up to `now + minutes*60` inclusive.
    pub fn timestamps(&self, now: i64) -> Vec<i64> {
        let horizon = now + self.minutes_ahead * 60;
        let step = self.step_seconds.max(1);

        (1..)
            .map(|k| now + k * step)
            .take_while(|ts| *ts <= horizon)
            .collect()
    }
}
