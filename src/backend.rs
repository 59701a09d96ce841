use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::limits::MAX_DETAIL_LEN;
use crate::lookup::CandidateSheet;
use crate::model::{AllocationRequest, Bed, BedKey};

/// `Rejected` carries the backend's `detail` string verbatim (validation
/// failures, lost races); `Transport` is everything that never produced a
/// response.
#[derive(Debug)]
pub enum BackendError {
    Rejected(String),
    Transport(String),
}

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendError::Rejected(detail) => write!(f, "backend rejected request: {detail}"),
            BackendError::Transport(e) => write!(f, "transport error: {e}"),
        }
    }
}

impl std::error::Error for BackendError {}

impl From<reqwest::Error> for BackendError {
    fn from(e: reqwest::Error) -> Self {
        BackendError::Transport(e.to_string())
    }
}

/// The remote bed store. The engine talks only to this trait; tests swap in
/// an in-memory implementation.
#[async_trait]
pub trait BedBackend: Send + Sync {
    async fn fetch_beds(&self) -> Result<Vec<Bed>, BackendError>;
    async fn allocate(&self, req: &AllocationRequest) -> Result<(), BackendError>;
    async fn discharge(&self, key: &BedKey) -> Result<(), BackendError>;
    async fn update_discharge(
        &self,
        key: &BedKey,
        discharge_date: NaiveDate,
    ) -> Result<(), BackendError>;
    async fn fetch_candidates(&self, limit: usize) -> Result<CandidateSheet, BackendError>;
    async fn log_complaint(&self, message: &str) -> Result<(), BackendError>;
    async fn log_feedback(&self, message: &str) -> Result<(), BackendError>;
}

#[derive(Debug, Deserialize)]
struct BedsPayload {
    #[serde(default)]
    beds: Vec<Bed>,
}

#[derive(Debug, Default, Deserialize)]
struct FailureBody {
    #[serde(default)]
    detail: String,
}

/// Pull a human-readable rejection reason out of a non-2xx response body.
/// Falls back to the status line when the body carries no `detail`.
fn failure_detail(status: reqwest::StatusCode, body: &[u8]) -> String {
    let detail = serde_json::from_slice::<FailureBody>(body)
        .map(|b| b.detail)
        .unwrap_or_default();
    let mut out = if detail.is_empty() {
        status.to_string()
    } else {
        detail
    };
    if out.len() > MAX_DETAIL_LEN {
        let cut = (0..=MAX_DETAIL_LEN).rev().find(|i| out.is_char_boundary(*i));
        out.truncate(cut.unwrap_or(0));
    }
    out
}

/// REST client for the remote bed store.
pub struct HttpBackend {
    base: String,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    async fn expect_ok(&self, resp: reqwest::Response) -> Result<(), BackendError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let body = resp.bytes().await.unwrap_or_default();
        Err(BackendError::Rejected(failure_detail(status, &body)))
    }
}

#[async_trait]
impl BedBackend for HttpBackend {
    async fn fetch_beds(&self) -> Result<Vec<Bed>, BackendError> {
        let resp = self.client.get(self.url("/api/beds")).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.bytes().await.unwrap_or_default();
            return Err(BackendError::Rejected(failure_detail(status, &body)));
        }
        let payload: BedsPayload = resp.json().await?;
        Ok(payload.beds)
    }

    async fn allocate(&self, req: &AllocationRequest) -> Result<(), BackendError> {
        let resp = self
            .client
            .post(self.url("/api/beds/allocate"))
            .json(req)
            .send()
            .await?;
        self.expect_ok(resp).await
    }

    async fn discharge(&self, key: &BedKey) -> Result<(), BackendError> {
        let resp = self
            .client
            .post(self.url("/api/beds/discharge"))
            .query(&[
                ("room_no", key.room_no.as_str()),
                ("bed_index", &key.bed_index.to_string()),
            ])
            .send()
            .await?;
        self.expect_ok(resp).await
    }

    async fn update_discharge(
        &self,
        key: &BedKey,
        discharge_date: NaiveDate,
    ) -> Result<(), BackendError> {
        let resp = self
            .client
            .post(self.url("/api/beds/update-discharge"))
            .query(&[
                ("room_no", key.room_no.as_str()),
                ("bed_index", &key.bed_index.to_string()),
                (
                    "discharge_date",
                    &discharge_date.format("%Y-%m-%d").to_string(),
                ),
            ])
            .send()
            .await?;
        self.expect_ok(resp).await
    }

    async fn fetch_candidates(&self, limit: usize) -> Result<CandidateSheet, BackendError> {
        let resp = self
            .client
            .get(self.url("/search_data"))
            .query(&[("limit", limit.to_string())])
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.bytes().await.unwrap_or_default();
            return Err(BackendError::Rejected(failure_detail(status, &body)));
        }
        Ok(resp.json().await?)
    }

    async fn log_complaint(&self, message: &str) -> Result<(), BackendError> {
        let resp = self
            .client
            .post(self.url("/api/complaints"))
            .json(&serde_json::json!({ "message": message }))
            .send()
            .await?;
        self.expect_ok(resp).await
    }

    async fn log_feedback(&self, message: &str) -> Result<(), BackendError> {
        let resp = self
            .client
            .post(self.url("/api/feedback"))
            .json(&serde_json::json!({ "message": message }))
            .send()
            .await?;
        self.expect_ok(resp).await
    }
}
