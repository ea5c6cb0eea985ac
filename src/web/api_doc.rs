use utoipa::OpenApi;

use super::api::error::ErrorResponse;
use super::api::telemetry::StatusResponse;
use crate::telemetry::Record;

#[derive(OpenApi)]
#[openapi(
    paths(
        super::api::telemetry::latest,
        super::api::telemetry::history,
        super::api::telemetry::future,
        super::api::telemetry::status,
    ),
    components(schemas(Record, StatusResponse, ErrorResponse)),
    info(
        title = "ISS Tracker API",
        description = "Live ISS position, recent history and predicted ground track",
        version = "0.1.0"
    ),
    tags(
        (name = "telemetry", description = "Position telemetry")
    )
)]
pub struct ApiDoc;
