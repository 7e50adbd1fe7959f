//! HTTP intake client.
//!
//! URL targets are sent as JSON `{"type":"url","value":...}`. Archive
//! targets are sent as `multipart/form-data` with a `type=archive` text part
//! and a `file` part carrying the original file name and bytes.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{header, Client, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::traits::*;
use crate::error::SubmitError;
use crate::report::{PingResponse, ScanReport};
use crate::target::{SubmissionTarget, TargetKind};

/// Header carrying the client-side submission id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Connection settings for the intake service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntakeConfig {
    /// Service base URL, without the `/v1/scan` suffix
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Whole-request timeout. Synchronous scans clone the repository first.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Sent as a bearer token when set
    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            api_key: None,
        }
    }
}

impl IntakeConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }
}

#[derive(Debug, Serialize)]
struct UrlScanBody<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    value: &'a str,
}

/// HTTP client for the intake service.
pub struct HttpIntakeClient {
    client: Client,
    config: IntakeConfig,
}

impl HttpIntakeClient {
    pub fn new(config: IntakeConfig) -> Result<Self, SubmitError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SubmitError::Config(e.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &IntakeConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn auth_header(&self) -> Option<String> {
        self.config.api_key.as_ref().map(|k| format!("Bearer {}", k))
    }

    async fn check_status(response: Response) -> Result<Response, SubmitError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(SubmitError::Service {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl IntakeService for HttpIntakeClient {
    fn id(&self) -> &str {
        &self.config.base_url
    }

    async fn submit(&self, request: ScanRequest) -> Result<ScanReport, SubmitError> {
        let mut http_request = self
            .client
            .post(self.endpoint("/v1/scan"))
            .header(REQUEST_ID_HEADER, request.submission_id.to_string());

        if let Some(auth) = self.auth_header() {
            http_request = http_request.header(header::AUTHORIZATION, auth);
        }

        http_request = match &request.target {
            SubmissionTarget::Url(value) => http_request.json(&UrlScanBody {
                kind: TargetKind::Url.as_str(),
                value,
            }),
            SubmissionTarget::Archive(archive) => {
                let file = Part::bytes(archive.bytes.to_vec())
                    .file_name(archive.file_name.clone())
                    .mime_str("application/zip")
                    .map_err(|e| SubmitError::Config(e.to_string()))?;
                let form = Form::new()
                    .text("type", TargetKind::Archive.as_str())
                    .part("file", file);
                http_request.multipart(form)
            }
        };

        debug!(
            submission_id = %request.submission_id,
            kind = %request.target.kind(),
            "Sending scan request"
        );

        let response = http_request
            .send()
            .await
            .map_err(|e| SubmitError::Transport(e.to_string()))?;
        let response = Self::check_status(response).await?;

        response
            .json::<ScanReport>()
            .await
            .map_err(|e| SubmitError::InvalidResponse(e.to_string()))
    }

    async fn ping(&self) -> Result<PingResponse, SubmitError> {
        let response = self
            .client
            .get(self.endpoint("/ping"))
            .send()
            .await
            .map_err(|e| SubmitError::Transport(e.to_string()))?;
        let response = Self::check_status(response).await?;

        response
            .json::<PingResponse>()
            .await
            .map_err(|e| SubmitError::InvalidResponse(e.to_string()))
    }
}
