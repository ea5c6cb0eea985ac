use axum::{extract::State, response::IntoResponse};

use crate::web::state::AppState;

use super::templates::IndexTemplate;

pub async fn index(State(state): State<AppState>) -> impl IntoResponse {
    let telemetry = &state.config.telemetry;
    IndexTemplate {
        poll_seconds: telemetry.poll_interval.as_secs().max(1),
        default_minutes: telemetry.future.default_minutes,
        default_step_seconds: telemetry.future.default_step_seconds,
    }
}
