//! Training backend: the three HTTP+JSON exchanges and a trait seam over them.
//!
//! `HttpBackend` is a thin `reqwest` wrapper. Transport failures map to
//! `BackendUnavailable`, non-2xx statuses to `BackendRejected` with the
//! response body attached. Nothing here retries; that decision belongs to
//! the caller.

#[cfg(test)]
#[path = "backend_test.rs"]
mod backend_test;

use serde::Serialize;

use super::SyncError;
use super::config::SyncConfig;
use super::dataset::{DatasetSeries, PlotRequest, parse_plot_response};
use super::payload::GraphPayload;

pub const CONSTRUCT_PATH: &str = "/receive_problem_data";
pub const TRAIN_PATH: &str = "/train_neuromancer_problem";
pub const PLOT_SYSTEM_PATH: &str = "/plot-system";

/// Opaque acknowledgment of a successful construct or train call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ack {
    pub status: u16,
    /// Response body as received; the backend documents no schema for it.
    pub body: String,
}

/// Backend exchanges used by [`super::GraphSync`]. Enables mocking in tests.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    /// `POST /receive_problem_data` with `{ "data": payload }`.
    async fn construct(&self, payload: &GraphPayload) -> Result<Ack, SyncError>;

    /// `POST /train_neuromancer_problem` with `{ "problemId": ... }`.
    async fn train(&self, problem_id: &str) -> Result<Ack, SyncError>;

    /// `POST /plot-system`, returning the validated trajectory.
    async fn plot_system(&self, request: &PlotRequest) -> Result<DatasetSeries, SyncError>;
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Serialize)]
struct ConstructRequest<'a> {
    data: &'a GraphPayload,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TrainRequest<'a> {
    problem_id: &'a str,
}

// =============================================================================
// HTTP CLIENT
// =============================================================================

pub struct HttpBackend {
    http: reqwest::Client,
    config: SyncConfig,
}

impl HttpBackend {
    /// # Errors
    ///
    /// Returns `HttpClientBuild` if the underlying client cannot be built.
    pub fn new(config: SyncConfig) -> Result<Self, SyncError> {
        let mut builder = reqwest::Client::builder().connect_timeout(config.timeouts.connect());
        if let Some(timeout) = config.timeouts.request() {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| SyncError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, config })
    }

    #[must_use]
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    async fn send_json(&self, path: &str, body: &impl Serialize) -> Result<Ack, SyncError> {
        let url = self.config.endpoint(path);
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| SyncError::BackendUnavailable(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| SyncError::BackendUnavailable(e.to_string()))?;
        if !status.is_success() {
            return Err(SyncError::BackendRejected { status: status.as_u16(), body: text });
        }
        Ok(Ack { status: status.as_u16(), body: text })
    }
}

#[async_trait::async_trait]
impl Backend for HttpBackend {
    async fn construct(&self, payload: &GraphPayload) -> Result<Ack, SyncError> {
        self.send_json(CONSTRUCT_PATH, &ConstructRequest { data: payload })
            .await
    }

    async fn train(&self, problem_id: &str) -> Result<Ack, SyncError> {
        self.send_json(TRAIN_PATH, &TrainRequest { problem_id })
            .await
    }

    async fn plot_system(&self, request: &PlotRequest) -> Result<DatasetSeries, SyncError> {
        let ack = self.send_json(PLOT_SYSTEM_PATH, request).await?;
        parse_plot_response(&ack.body)
    }
}
