//! zkTLS attestation client
//!
//! Owns the client lifecycle: credential initialization, environment
//! selection, and the build → sign → submit → poll pipeline for one
//! attestation request. Configuration (app id, secret, environment) lives
//! behind a mutex so concurrent `init`/`set_env` calls never produce torn
//! reads in an in-flight request; each request snapshots the credentials
//! once before signing.

use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use crate::constants::{
    ATTESTATION_POLLING_INTERVAL_MS, ATTESTATION_POLLING_TIMEOUT_MS, DEFAULT_SERVICE_URL,
    MAX_CONSECUTIVE_TRANSPORT_FAILURES,
};
use crate::error::{Error, Result};
use crate::request::AttRequest;
use crate::service::{AttestationService, HttpAttestationService, PollOutcome};
use crate::signer;
use crate::types::{AttestationResult, Environment, ErrorData, InitResult};

/// Polling budget for one attestation request
#[derive(Debug, Clone, Copy)]
pub struct PollingConfig {
    /// Wait between result probes
    pub interval: Duration,
    /// Total budget before giving up with [`AttestationResult::Timeout`]
    pub timeout: Duration,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(ATTESTATION_POLLING_INTERVAL_MS),
            timeout: Duration::from_millis(ATTESTATION_POLLING_TIMEOUT_MS),
        }
    }
}

struct ClientConfig {
    app_id: String,
    app_secret: Option<String>,
    is_initialized: bool,
    env: Environment,
    contract_address: &'static str,
}

impl Default for ClientConfig {
    fn default() -> Self {
        let env = Environment::Production;
        Self {
            app_id: String::new(),
            app_secret: None,
            is_initialized: false,
            env,
            contract_address: env.contract_address(),
        }
    }
}

/// Client for requesting zkTLS attestations
///
/// Created uninitialized; [`init`](ZkTlsClient::init) must succeed before
/// requests can be signed and submitted. Independent
/// [`request_attestation`](ZkTlsClient::request_attestation) calls may run
/// concurrently; the polling loop suspends cooperatively between probes and
/// stops as soon as the returned future is dropped.
pub struct ZkTlsClient {
    config: Mutex<ClientConfig>,
    service: Arc<dyn AttestationService>,
    polling: PollingConfig,
}

impl Default for ZkTlsClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ZkTlsClient {
    /// Create a client talking to the default attestation service
    pub fn new() -> Self {
        Self::with_service_url(DEFAULT_SERVICE_URL)
    }

    /// Create a client talking to an attestation service at `base_url`
    pub fn with_service_url(base_url: impl Into<String>) -> Self {
        Self::with_service(Arc::new(HttpAttestationService::new(base_url)))
    }

    /// Create a client over a custom service implementation
    pub fn with_service(service: Arc<dyn AttestationService>) -> Self {
        Self {
            config: Mutex::new(ClientConfig::default()),
            service,
            polling: PollingConfig::default(),
        }
    }

    /// Override the polling interval and timeout
    pub fn with_polling(mut self, polling: PollingConfig) -> Self {
        self.polling = polling;
        self
    }

    /// Initialize the client with application credentials
    ///
    /// Without a secret the client stays uninitialized and the result
    /// carries an `INIT_ERROR`. Re-initializing an initialized client
    /// overwrites the stored credentials (last write wins).
    pub fn init(&self, app_id: impl Into<String>, app_secret: Option<&str>) -> InitResult {
        let secret = match app_secret {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => {
                return InitResult::err(ErrorData::new(
                    "INIT_ERROR",
                    "Initialization Error",
                    "app_secret is required for signing requests",
                ));
            }
        };

        let mut config = self.config_lock();
        config.app_id = app_id.into();
        config.app_secret = Some(secret);
        config.is_initialized = true;
        info!(app_id = %config.app_id, "client initialized");
        InitResult::ok()
    }

    pub fn is_initialized(&self) -> bool {
        self.config_lock().is_initialized
    }

    pub fn env(&self) -> Environment {
        self.config_lock().env
    }

    /// Contract address validating attestor signatures for the active
    /// environment
    pub fn contract_address(&self) -> &'static str {
        self.config_lock().contract_address
    }

    /// Select the active environment
    ///
    /// Fails with `InvalidEnvironment` on an unrecognized name, leaving both
    /// the environment and the derived contract address unchanged. On
    /// success both update together under one lock.
    pub fn set_env(&self, env: &str) -> Result<()> {
        let env = Environment::from_str(env)?;
        let mut config = self.config_lock();
        config.env = env;
        config.contract_address = env.contract_address();
        debug!(env = %env, contract = config.contract_address, "environment selected");
        Ok(())
    }

    /// Create a request builder carrying this client's app id
    pub fn create_attestation_request(
        &self,
        att_template_id: impl Into<String>,
        user_address: impl Into<String>,
    ) -> Result<AttRequest> {
        let app_id = {
            let config = self.config_lock();
            if !config.is_initialized {
                return Err(Error::NotInitialized);
            }
            config.app_id.clone()
        };
        AttRequest::new(app_id, att_template_id, user_address)
    }

    /// Sign a request, submit it, and poll until a definitive answer or the
    /// polling budget runs out
    ///
    /// Service rejection and timeout are expected outcomes and travel inside
    /// the returned [`AttestationResult`]; configuration, validation, and
    /// signing problems are `Err`.
    pub async fn request_attestation(&self, request: &AttRequest) -> Result<AttestationResult> {
        let app_secret = {
            let config = self.config_lock();
            if !config.is_initialized {
                return Err(Error::NotInitialized);
            }
            config.app_secret.clone().ok_or(Error::MissingSecret)?
        };

        let signed = signer::sign_request(request, &app_secret)?;

        let submission_id = self.service.submit(&signed).await?;
        info!(
            submission_id = %submission_id,
            template = request.att_template_id(),
            "attestation request submitted"
        );

        self.poll_attestation(&submission_id).await
    }

    /// Poll for the result of a submitted request
    ///
    /// The timeout is checked before every probe; once exceeded the loop
    /// returns Timeout without issuing one more probe. Transport failures
    /// are tolerated a bounded number of consecutive times, then escalated.
    async fn poll_attestation(&self, submission_id: &str) -> Result<AttestationResult> {
        let start = Instant::now();
        let mut consecutive_failures: u32 = 0;

        loop {
            if start.elapsed() > self.polling.timeout {
                warn!(submission_id, "attestation polling timed out");
                return Ok(AttestationResult::Timeout);
            }

            match self.service.poll(submission_id).await {
                Ok(PollOutcome::Complete(attestation)) => {
                    debug!(submission_id, "attestation completed");
                    return Ok(AttestationResult::Success(attestation));
                }
                Ok(PollOutcome::Rejected(error_data)) => {
                    debug!(submission_id, code = %error_data.code, "attestation rejected");
                    return Ok(AttestationResult::Failure(error_data));
                }
                Ok(PollOutcome::Pending) => {
                    consecutive_failures = 0;
                    debug!(submission_id, "attestation pending");
                }
                Err(e) => {
                    consecutive_failures += 1;
                    warn!(
                        submission_id,
                        attempt = consecutive_failures,
                        error = %e,
                        "poll attempt failed"
                    );
                    if consecutive_failures >= MAX_CONSECUTIVE_TRANSPORT_FAILURES {
                        return Err(e);
                    }
                }
            }

            sleep(self.polling.interval).await;
        }
    }

    fn config_lock(&self) -> MutexGuard<'_, ClientConfig> {
        // Poisoning means another thread panicked mid-update; that is a
        // programmer error, not a runtime condition.
        self.config.lock().expect("client config mutex poisoned")
    }
}
