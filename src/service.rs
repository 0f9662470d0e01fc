//! Attestation service RPC seam
//!
//! The client talks to the attestation backend through the
//! [`AttestationService`] trait so tests (and alternative transports) can
//! substitute the implementation. [`HttpAttestationService`] is the reqwest
//! implementation: submission is a POST of the signed request, polling is a
//! GET on the returned submission id. Polling the same submission id
//! repeatedly must not create duplicate attestation work server-side; the
//! client reuses the same signed request unchanged across polls.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::request::SignedAttRequest;
use crate::types::{Attestation, ErrorData};

/// One probe's answer from the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// No definitive answer yet; probe again later
    Pending,
    /// Attestation completed
    Complete(Attestation),
    /// The service rejected or failed the request; not retried by the client
    Rejected(ErrorData),
}

/// Abstract RPC contract consumed by the client
#[async_trait]
pub trait AttestationService: Send + Sync {
    /// Submit a signed request, returning a submission id to poll
    async fn submit(&self, request: &SignedAttRequest) -> Result<String>;

    /// Query the result of a previously submitted request
    async fn poll(&self, submission_id: &str) -> Result<PollOutcome>;
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    #[serde(rename = "submissionId")]
    submission_id: String,
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum PollStatus {
    Pending,
    Success,
    Failure,
}

#[derive(Debug, Deserialize)]
struct PollResponse {
    status: PollStatus,
    attestation: Option<Attestation>,
    #[serde(rename = "errorData")]
    error_data: Option<ErrorData>,
}

impl PollResponse {
    fn into_outcome(self) -> Result<PollOutcome> {
        match self.status {
            PollStatus::Pending => Ok(PollOutcome::Pending),
            PollStatus::Success => {
                let attestation = self.attestation.ok_or(Error::Service {
                    status: 200,
                    message: "success response without attestation payload".into(),
                })?;
                Ok(PollOutcome::Complete(attestation))
            }
            PollStatus::Failure => {
                let error_data = self.error_data.unwrap_or_else(|| {
                    ErrorData::new(
                        "ATTESTATION_FAILED",
                        "Attestation Failed",
                        "service reported failure without details",
                    )
                });
                Ok(PollOutcome::Rejected(error_data))
            }
        }
    }
}

/// HTTP implementation of the attestation service contract
pub struct HttpAttestationService {
    base_url: String,
    http: reqwest::Client,
}

impl HttpAttestationService {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl AttestationService for HttpAttestationService {
    async fn submit(&self, request: &SignedAttRequest) -> Result<String> {
        let url = format!("{}/attestations", self.base_url);

        let response = self.http.post(&url).json(request).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(Error::Service { status, message });
        }

        let submit: SubmitResponse = response.json().await?;
        Ok(submit.submission_id)
    }

    async fn poll(&self, submission_id: &str) -> Result<PollOutcome> {
        let url = format!("{}/attestations/{}", self.base_url, submission_id);

        let response = self.http.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(Error::Service { status, message });
        }

        let poll: PollResponse = response.json().await?;
        poll.into_outcome()
    }
}
