//! Core types for attestation requests and results
//!
//! Wire field names are pinned with serde `rename` attributes; the canonical
//! serialization of a request is derived from the declaration order of these
//! structs, never from runtime reflection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{DEVELOPMENT_CONTRACT_ADDRESS, PRODUCTION_CONTRACT_ADDRESS};
use crate::error::Error;

/// Mechanism by which the attestation service observes the TLS session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlgorithmType {
    #[serde(rename = "mpctls")]
    MpcTls,

    #[serde(rename = "proxytls")]
    ProxyTls,
}

/// Whether the attested data is revealed in plain text or kept encrypted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResultType {
    #[serde(rename = "plain")]
    Plain,

    #[serde(rename = "cipher")]
    Cipher,
}

/// Attestation mode configuration
///
/// Attached to a request wholesale; replacing the mode never merges fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttMode {
    pub algorithm_type: AlgorithmType,
    pub result_type: ResultType,
}

impl Default for AttMode {
    fn default() -> Self {
        Self {
            algorithm_type: AlgorithmType::ProxyTls,
            result_type: ResultType::Plain,
        }
    }
}

/// Operator applied to a response field inside a condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Op {
    #[serde(rename = ">")]
    Gt,

    #[serde(rename = ">=")]
    Gte,

    #[serde(rename = "=")]
    Eq,

    #[serde(rename = "!=")]
    Neq,

    #[serde(rename = "<")]
    Lt,

    #[serde(rename = "<=")]
    Lte,

    #[serde(rename = "SHA256")]
    Sha256,

    #[serde(rename = "REVEAL_STRING")]
    RevealString,
}

impl Op {
    /// Comparison operators need a right-hand value; SHA256 and
    /// REVEAL_STRING act on the field alone.
    pub fn requires_value(&self) -> bool {
        !matches!(self, Op::Sha256 | Op::RevealString)
    }
}

/// A single predicate over one response field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubCondition {
    pub field: String,
    pub op: Op,
    pub value: Option<String>,
}

impl SubCondition {
    pub fn new(field: impl Into<String>, op: Op, value: Option<String>) -> Self {
        Self {
            field: field.into(),
            op,
            value,
        }
    }

    /// A comparison operator must carry a value
    pub fn validate(&self) -> Result<(), Error> {
        if self.op.requires_value() && self.value.is_none() {
            return Err(Error::InvalidCondition {
                field: self.field.clone(),
            });
        }
        Ok(())
    }
}

/// Conjunction of sub-conditions (logical AND)
pub type Condition = Vec<SubCondition>;

/// Disjunction of conditions (logical OR of ANDs)
///
/// Group order and within-group order are preserved exactly; they carry no
/// semantic weight but must round-trip identically for signature stability.
pub type ConditionSet = Vec<Condition>;

/// Validate every sub-condition in a condition set
pub fn validate_conditions(conditions: &ConditionSet) -> Result<(), Error> {
    for group in conditions {
        for sub in group {
            sub.validate()?;
        }
    }
    Ok(())
}

/// Network the client targets; selects the attestor-signature contract
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl Environment {
    /// On-chain contract address used to validate attestor signatures.
    /// Every environment maps to exactly one address.
    pub fn contract_address(&self) -> &'static str {
        match self {
            Environment::Development | Environment::Test => DEVELOPMENT_CONTRACT_ADDRESS,
            Environment::Production => PRODUCTION_CONTRACT_ADDRESS,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Test => "test",
            Environment::Production => "production",
        }
    }
}

impl FromStr for Environment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "development" => Ok(Environment::Development),
            "test" => Ok(Environment::Test),
            "production" => Ok(Environment::Production),
            other => Err(Error::InvalidEnvironment(other.to_string())),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The HTTP request the attestors observed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttNetworkRequest {
    pub url: String,
    /// JSON-encoded header map
    pub header: String,
    pub method: String,
    pub body: String,
}

/// How a value was extracted from the observed response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttNetworkResponseResolve {
    pub key_name: String,
    /// "json" or "html"
    pub parse_type: String,
    pub parse_path: String,
}

/// A network participant that co-signed the attestation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attestor {
    pub attestor_addr: String,
    pub url: String,
}

/// A completed attestation returned by the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attestation {
    /// Address of the user the attestation is about
    pub recipient: String,
    pub request: AttNetworkRequest,
    pub response_resolve: Vec<AttNetworkResponseResolve>,
    /// JSON-encoded attested data
    pub data: String,
    /// JSON-encoded conditions the data was checked against
    pub att_conditions: String,
    pub timestamp: u64,
    pub addition_params: String,
    pub attestors: Vec<Attestor>,
    pub signatures: Vec<String>,
}

/// Structured application error reported by the service or the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorData {
    pub code: String,
    pub title: String,
    pub desc: String,
}

impl ErrorData {
    pub fn new(
        code: impl Into<String>,
        title: impl Into<String>,
        desc: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            title: title.into(),
            desc: desc.into(),
        }
    }
}

/// Outcome of [`crate::ZkTlsClient::init`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitResult {
    pub result: bool,
    pub error_data: Option<ErrorData>,
}

impl InitResult {
    pub fn ok() -> Self {
        Self {
            result: true,
            error_data: None,
        }
    }

    pub fn err(error_data: ErrorData) -> Self {
        Self {
            result: false,
            error_data: Some(error_data),
        }
    }
}

/// Final outcome of one attestation request
///
/// Success and Failure are definitive answers from the service; Timeout means
/// no definitive answer arrived within the polling budget (the request may
/// still complete server-side later).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttestationResult {
    Success(Attestation),
    Failure(ErrorData),
    Timeout,
}

impl AttestationResult {
    pub fn is_success(&self) -> bool {
        matches!(self, AttestationResult::Success(_))
    }

    pub fn data(&self) -> Option<&Attestation> {
        match self {
            AttestationResult::Success(att) => Some(att),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorData> {
        match self {
            AttestationResult::Failure(err) => Some(err),
            _ => None,
        }
    }
}
