//! # zkTLS Attestation Client
//!
//! Client SDK for requesting zero-knowledge TLS attestations:
//! cryptographically signed claims that an HTTPS interaction (for example a
//! user's balance on a third-party site) satisfied certain conditions,
//! without revealing the raw transcript.
//!
//! ## Request pipeline
//!
//! One attestation request runs as a single sequential pipeline:
//!
//! 1. **Build** — [`AttRequest`] accumulates the app id, template id, user
//!    address, attestation mode, conditions (OR of AND-groups), and optional
//!    addition params into a canonically ordered descriptor.
//! 2. **Sign** — the canonical JSON is hashed with the Ethereum
//!    personal-message convention and signed with the app secret
//!    (recoverable secp256k1), producing a [`SignedAttRequest`].
//! 3. **Submit & poll** — [`ZkTlsClient`] submits the signed request to the
//!    attestation service and polls for the result, returning
//!    [`AttestationResult::Timeout`] once the polling budget is exhausted.
//!
//! The signature covers the bytes exactly as transmitted; the canonical
//! field order is fixed and never derived from runtime reflection.
//!
//! ## Example
//!
//! ```rust,ignore
//! use zktls::{AttestationResult, ZkTlsClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ZkTlsClient::new();
//!     client.init("your_app_id", Some("0x...app secret..."));
//!     client.set_env("development")?;
//!
//!     let mut request = client.create_attestation_request(
//!         "balance_template",
//!         "0x742d35Cc6634C0532925a3b844Bc454e4438f44e",
//!     )?;
//!     request.set_att_conditions(vec![vec![zktls::SubCondition::new(
//!         "balance",
//!         zktls::Op::Gt,
//!         Some("1000".into()),
//!     )]])?;
//!
//!     match client.request_attestation(&request).await? {
//!         AttestationResult::Success(att) => println!("attested: {}", att.recipient),
//!         AttestationResult::Failure(err) => eprintln!("{}: {}", err.code, err.desc),
//!         AttestationResult::Timeout => eprintln!("no answer within the polling budget"),
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod constants;
pub mod error;
pub mod request;
pub mod service;
pub mod signer;
pub mod types;
pub mod utils;

pub use client::{PollingConfig, ZkTlsClient};
pub use error::{Error, Result};
pub use request::{AttRequest, FullAttestationParams, SignedAttRequest};
pub use service::{AttestationService, HttpAttestationService, PollOutcome};
pub use signer::{derive_address, recover_address, sign_request};
pub use types::{
    AlgorithmType, AttMode, Attestation, AttestationResult, Condition, ConditionSet, Environment,
    ErrorData, InitResult, Op, ResultType, SubCondition,
};
