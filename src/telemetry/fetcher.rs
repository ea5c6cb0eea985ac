//! Client for the wheretheiss.at satellite API.

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;

use super::error::{FutureFetchError, UpstreamError};
use super::future::{FutureLimits, FutureQuery};
use super::record::{Fix, Record};

/// Anything that can produce the current position record.
///
/// Implementations never fail: an unreachable upstream yields a heartbeat.
pub trait PositionSource: Send + Sync + 'static {
    fn fetch_latest(&self) -> impl Future<Output = Record> + Send;
}

#[derive(Debug, Clone)]
pub struct FetcherSettings {
    pub latest_url: String,
    pub positions_url: String,
    pub latest_timeout: Duration,
    pub future_timeout: Duration,
    pub limits: FutureLimits,
}

/// Raw position element as served upstream.
#[derive(Debug, Deserialize)]
struct UpstreamPosition {
    latitude: f64,
    longitude: f64,
    altitude: Option<f64>,
    velocity: Option<f64>,
    timestamp: Option<i64>,
}

impl UpstreamPosition {
    /// Upstream omits altitude and velocity on occasion; those read as zero,
    /// while latitude and longitude are required.
    fn into_fix(self) -> Fix {
        Fix {
            latitude: self.latitude,
            longitude: self.longitude,
            altitude_km: self.altitude.unwrap_or(0.0),
            velocity_kmh: self.velocity.unwrap_or(0.0),
        }
    }
}

#[derive(Clone)]
pub struct PositionFetcher {
    client: Client,
    settings: FetcherSettings,
}

impl PositionFetcher {
    pub fn new(settings: FetcherSettings) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .user_agent(concat!("iss-tracker/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, settings })
    }

    pub fn limits(&self) -> &FutureLimits {
        &self.settings.limits
    }

    pub fn future_timeout(&self) -> Duration {
        self.settings.future_timeout
    }

    pub async fn fetch_latest(&self) -> Record {
        match self.try_fetch_latest().await {
            Ok(fix) => Record::observed(Utc::now(), fix),
            Err(e) => {
                log::warn!("Latest position unavailable, recording heartbeat: {}", e);
                Record::heartbeat(Utc::now())
            }
        }
    }

    async fn try_fetch_latest(&self) -> Result<Fix, UpstreamError> {
        let response = self
            .client
            .get(&self.settings.latest_url)
            .timeout(self.settings.latest_timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(UpstreamError::Status(response.status()));
        }

        let body = response.bytes().await?;
        let position: UpstreamPosition = serde_json::from_slice(&body)?;
        Ok(position.into_fix())
    }

    pub async fn fetch_future(
        &self,
        minutes_ahead: i64,
        step_seconds: i64,
    ) -> Result<Vec<Record>, FutureFetchError> {
        self.fetch_future_at(Utc::now().timestamp(), minutes_ahead, step_seconds)
            .await
    }

    /// Same as [`fetch_future`](Self::fetch_future) with an explicit "now" in UNIX seconds.
    pub async fn fetch_future_at(
        &self,
        now: i64,
        minutes_ahead: i64,
        step_seconds: i64,
    ) -> Result<Vec<Record>, FutureFetchError> {
        let query = FutureQuery::clamped(minutes_ahead, step_seconds, &self.settings.limits);
        let stamps = query.timestamps(now);
        if stamps.is_empty() {
            return Ok(Vec::new());
        }

        let joined = stamps
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(",");

        let elements = self.request_positions(&joined).await?;
        Ok(map_future_elements(elements))
    }

    async fn request_positions(
        &self,
        timestamps: &str,
    ) -> Result<Vec<serde_json::Value>, UpstreamError> {
        let response = self
            .client
            .get(&self.settings.positions_url)
            .query(&[("timestamps", timestamps), ("units", "kilometers")])
            .timeout(self.settings.future_timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(UpstreamError::Status(response.status()));
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

impl PositionSource for PositionFetcher {
    async fn fetch_latest(&self) -> Record {
        PositionFetcher::fetch_latest(self).await
    }
}

/// Map a future positions array, dropping elements that cannot be read.
fn map_future_elements(elements: Vec<serde_json::Value>) -> Vec<Record> {
    elements
        .into_iter()
        .filter_map(|element| match future_record(element) {
            Some(record) => Some(record),
            None => {
                log::debug!("Skipping unreadable future position element");
                None
            }
        })
        .collect()
}

fn future_record(element: serde_json::Value) -> Option<Record> {
    let position: UpstreamPosition = serde_json::from_value(element).ok()?;
    let at = DateTime::<Utc>::from_timestamp(position.timestamp?, 0)?;
    Some(Record::observed(at, position.into_fix()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const LATEST_PATH: &str = "/v1/satellites/25544";
    const POSITIONS_PATH: &str = "/v1/satellites/25544/positions";
    const T: i64 = 1_700_000_000;

    fn fetcher_for(base: &str) -> PositionFetcher {
        PositionFetcher::new(FetcherSettings {
            latest_url: format!("{}{}", base, LATEST_PATH),
            positions_url: format!("{}{}", base, POSITIONS_PATH),
            latest_timeout: Duration::from_secs(2),
            future_timeout: Duration::from_secs(2),
            limits: FutureLimits::default(),
        })
        .unwrap()
    }

    fn assert_heartbeat(record: &Record) {
        assert!(!record.timestamp_utc.is_empty());
        assert_eq!(record.source, "wheretheiss.at");
        assert!(record.latitude.is_none());
        assert!(record.longitude.is_none());
        assert!(record.altitude_km.is_none());
        assert!(record.velocity_kmh.is_none());
        assert!(record.velocity_km_s.is_none());
    }

    #[test]
    fn missing_altitude_and_velocity_read_as_zero() {
        let record = future_record(json!({
            "timestamp": T,
            "latitude": 10.0,
            "longitude": 20.0,
        }))
        .unwrap();

        assert_eq!(record.altitude_km, Some(0.0));
        assert_eq!(record.velocity_kmh, Some(0.0));
        assert_eq!(record.velocity_km_s, Some(0.0));
    }

    #[test]
    fn null_altitude_reads_as_zero() {
        let record = future_record(json!({
            "timestamp": T,
            "latitude": 10.0,
            "longitude": 20.0,
            "altitude": null,
            "velocity": 27000.0,
        }))
        .unwrap();

        assert_eq!(record.altitude_km, Some(0.0));
        assert_eq!(record.velocity_kmh, Some(27000.0));
    }

    #[test]
    fn future_element_uses_its_own_timestamp() {
        let record = future_record(json!({
            "timestamp": T,
            "latitude": 1.0,
            "longitude": 2.0,
        }))
        .unwrap();
        assert_eq!(record.timestamp_utc, "2023-11-14T22:13:20Z");
    }

    #[test]
    fn elements_without_timestamp_or_coordinates_are_dropped() {
        let records = map_future_elements(vec![
            json!({ "timestamp": T, "latitude": 1.0, "longitude": 2.0 }),
            json!({ "latitude": 1.0, "longitude": 2.0 }),
            json!({ "timestamp": T, "longitude": 2.0 }),
            json!({ "timestamp": T, "latitude": "north", "longitude": 2.0 }),
            json!("garbage"),
        ]);
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn fetch_latest_maps_successful_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(LATEST_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "iss",
                "id": 25544,
                "latitude": 50.11,
                "longitude": 118.07,
                "altitude": 408.05,
                "velocity": 27635.97,
                "visibility": "daylight",
                "timestamp": T,
                "units": "kilometers"
            })))
            .mount(&server)
            .await;

        let record = fetcher_for(&server.uri()).fetch_latest().await;

        assert_eq!(record.latitude, Some(50.11));
        assert_eq!(record.longitude, Some(118.07));
        assert_eq!(record.altitude_km, Some(408.05));
        assert_eq!(record.velocity_kmh, Some(27635.97));
        let kms = record.velocity_km_s.unwrap();
        assert!((kms - 27635.97 / 3600.0).abs() < 1e-9);
        assert!(record.timestamp_utc.ends_with('Z'));
        assert!(!record.timestamp_utc.contains('.'));
    }

    #[tokio::test]
    async fn fetch_latest_defaults_missing_altitude() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(LATEST_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "latitude": -3.5, "longitude": 7.25 })),
            )
            .mount(&server)
            .await;

        let record = fetcher_for(&server.uri()).fetch_latest().await;
        assert_eq!(record.latitude, Some(-3.5));
        assert_eq!(record.altitude_km, Some(0.0));
        assert_eq!(record.velocity_kmh, Some(0.0));
    }

    #[tokio::test]
    async fn fetch_latest_heartbeat_on_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(LATEST_PATH))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let record = fetcher_for(&server.uri()).fetch_latest().await;
        assert_heartbeat(&record);
    }

    #[tokio::test]
    async fn fetch_latest_heartbeat_on_missing_latitude() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(LATEST_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "longitude": 7.25, "altitude": 410.0 })),
            )
            .mount(&server)
            .await;

        let record = fetcher_for(&server.uri()).fetch_latest().await;
        assert_heartbeat(&record);
    }

    #[tokio::test]
    async fn fetch_latest_heartbeat_on_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(LATEST_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>busy</html>"))
            .mount(&server)
            .await;

        let record = fetcher_for(&server.uri()).fetch_latest().await;
        assert_heartbeat(&record);
    }

    #[tokio::test]
    async fn fetch_latest_heartbeat_on_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(LATEST_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "latitude": 1.0, "longitude": 1.0 }))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let record = fetcher_for(&server.uri()).fetch_latest().await;
        assert_heartbeat(&record);
    }

    #[tokio::test]
    async fn fetch_latest_heartbeat_when_unreachable() {
        let record = fetcher_for("http://127.0.0.1:9").fetch_latest().await;
        assert_heartbeat(&record);
    }

    #[tokio::test]
    async fn fetch_future_requests_exact_timestamps_in_kilometers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(POSITIONS_PATH))
            .and(query_param("timestamps", "1700000060,1700000120"))
            .and(query_param("units", "kilometers"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "timestamp": T + 60, "latitude": 1.0, "longitude": 2.0, "altitude": 410.0, "velocity": 27600.0 },
                { "timestamp": T + 120, "latitude": 3.0, "longitude": 4.0, "altitude": 411.0, "velocity": 27601.0 }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let records = fetcher_for(&server.uri())
            .fetch_future_at(T, 2, 60)
            .await
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].timestamp_utc, "2023-11-14T22:14:20Z");
        assert_eq!(records[1].latitude, Some(3.0));
        assert_eq!(records[1].altitude_km, Some(411.0));
    }

    #[tokio::test]
    async fn fetch_future_skips_element_without_latitude() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(POSITIONS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "timestamp": T + 60, "latitude": 1.0, "longitude": 2.0 },
                { "timestamp": T + 120, "longitude": 4.0 },
                { "timestamp": T + 180, "latitude": 5.0, "longitude": 6.0 }
            ])))
            .mount(&server)
            .await;

        let records = fetcher_for(&server.uri())
            .fetch_future_at(T, 3, 60)
            .await
            .unwrap();

        let latitudes: Vec<_> = records.iter().map(|r| r.latitude).collect();
        assert_eq!(latitudes, vec![Some(1.0), Some(5.0)]);
    }

    #[tokio::test]
    async fn fetch_future_clamps_before_requesting() {
        let server = MockServer::start().await;
        let expected = (1..=6)
            .map(|k| (T + k * 10).to_string())
            .collect::<Vec<_>>()
            .join(",");
        Mock::given(method("GET"))
            .and(path(POSITIONS_PATH))
            .and(query_param("timestamps", expected.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let records = fetcher_for(&server.uri())
            .fetch_future_at(T, 1, 5)
            .await
            .unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn fetch_future_fails_on_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(POSITIONS_PATH))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = fetcher_for(&server.uri())
            .fetch_future_at(T, 2, 60)
            .await
            .unwrap_err();
        assert!(err.detail.contains("500"));
    }

    #[tokio::test]
    async fn fetch_future_fails_when_body_is_not_an_array() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(POSITIONS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "error": "bad" })))
            .mount(&server)
            .await;

        let result = fetcher_for(&server.uri()).fetch_future_at(T, 2, 60).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn fetch_future_fails_when_unreachable() {
        let result = fetcher_for("http://127.0.0.1:9").fetch_future(5, 60).await;
        assert!(result.is_err());
    }
}
