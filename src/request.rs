//! Attestation request builder and its canonical form
//!
//! The canonical form is the single deterministic serialization used for
//! both transmission and signing. Field order is fixed by the declaration
//! order of [`FullAttestationParams`]: appId, attTemplateID, userAddress,
//! timestamp, attMode, attConditions, additionParams. Reordering these
//! fields invalidates every previously produced signature.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{validate_conditions, AttMode, ConditionSet};
use crate::utils::canonical_json;

/// Mutable builder state for one attestation request
///
/// The timestamp is captured at construction and never recomputed; each
/// logical request attempt constructs a fresh `AttRequest` to get a fresh
/// timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttRequest {
    app_id: String,
    att_template_id: String,
    user_address: String,
    timestamp: u64,
    att_mode: AttMode,
    att_conditions: Option<ConditionSet>,
    addition_params: Option<String>,
}

impl AttRequest {
    /// Create a request with the default mode (proxytls/plain), no
    /// conditions, and the current millisecond timestamp
    pub fn new(
        app_id: impl Into<String>,
        att_template_id: impl Into<String>,
        user_address: impl Into<String>,
    ) -> Result<Self> {
        let app_id = app_id.into();
        let att_template_id = att_template_id.into();
        let user_address = user_address.into();

        for (name, value) in [
            ("appId", &app_id),
            ("attTemplateID", &att_template_id),
            ("userAddress", &user_address),
        ] {
            if value.is_empty() {
                return Err(Error::InvalidArgument(format!("{} must not be empty", name)));
            }
        }

        Ok(Self {
            app_id,
            att_template_id,
            user_address,
            timestamp: current_timestamp_ms(),
            att_mode: AttMode::default(),
            att_conditions: None,
            addition_params: None,
        })
    }

    /// Replace the attestation mode wholesale
    pub fn set_att_mode(&mut self, mode: AttMode) {
        self.att_mode = mode;
    }

    /// Replace the condition set wholesale
    ///
    /// Every sub-condition is validated: comparison operators must carry a
    /// value. Group order and within-group order are stored exactly as given.
    pub fn set_att_conditions(&mut self, conditions: ConditionSet) -> Result<()> {
        validate_conditions(&conditions)?;
        self.att_conditions = Some(conditions);
        Ok(())
    }

    /// Store caller-supplied parameters as canonical key-sorted JSON text.
    /// The contents are never interpreted.
    pub fn set_addition_params<T: Serialize>(&mut self, params: &T) -> Result<()> {
        let value = serde_json::to_value(params)?;
        self.addition_params = Some(canonical_json(&value));
        Ok(())
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub fn att_template_id(&self) -> &str {
        &self.att_template_id
    }

    pub fn user_address(&self) -> &str {
        &self.user_address
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn att_mode(&self) -> AttMode {
        self.att_mode
    }

    pub fn att_conditions(&self) -> Option<&ConditionSet> {
        self.att_conditions.as_ref()
    }

    pub fn addition_params(&self) -> Option<&str> {
        self.addition_params.as_deref()
    }

    /// Project the builder state into the ordered wire form
    pub fn to_full_params(&self) -> FullAttestationParams {
        FullAttestationParams {
            app_id: self.app_id.clone(),
            att_template_id: self.att_template_id.clone(),
            user_address: self.user_address.clone(),
            timestamp: self.timestamp,
            att_mode: self.att_mode,
            att_conditions: self.att_conditions.clone(),
            addition_params: self.addition_params.clone(),
        }
    }

    /// The exact bytes used for both transmission and signing.
    /// Pure: the same builder state yields byte-identical output every call.
    pub fn to_canonical_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_full_params())?)
    }
}

/// Fully populated request parameters in canonical wire order
///
/// Serde serializes struct fields in declaration order, which pins the
/// canonical field sequence without any runtime reflection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FullAttestationParams {
    #[serde(rename = "appId")]
    pub app_id: String,

    #[serde(rename = "attTemplateID")]
    pub att_template_id: String,

    #[serde(rename = "userAddress")]
    pub user_address: String,

    pub timestamp: u64,

    #[serde(rename = "attMode")]
    pub att_mode: AttMode,

    #[serde(rename = "attConditions")]
    pub att_conditions: Option<ConditionSet>,

    #[serde(rename = "additionParams")]
    pub addition_params: Option<String>,
}

/// A request plus the application signature over its canonical form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedAttRequest {
    #[serde(rename = "attRequest")]
    pub att_request: FullAttestationParams,

    #[serde(rename = "appSignature")]
    pub app_signature: String,
}

fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AlgorithmType, Op, ResultType, SubCondition};
    use serde_json::{json, Value};

    const USER: &str = "0x742d35Cc6634C0532925a3b844Bc454e4438f44e";

    fn request() -> AttRequest {
        AttRequest::new("test_app", "test_template", USER).unwrap()
    }

    /// The nested AND/OR fixture: two groups, first with two members
    fn conditions() -> ConditionSet {
        vec![
            vec![
                SubCondition::new("balance", Op::Gt, Some("1000".into())),
                SubCondition::new("age", Op::Gte, Some("18".into())),
            ],
            vec![SubCondition::new("verified", Op::Eq, Some("true".into()))],
        ]
    }

    #[test]
    fn test_new_request_defaults() {
        let request = request();
        assert_eq!(request.app_id(), "test_app");
        assert_eq!(request.att_template_id(), "test_template");
        assert_eq!(request.user_address(), USER);
        assert!(request.timestamp() > 0);
        assert_eq!(request.att_mode(), AttMode::default());
        assert!(request.att_conditions().is_none());
        assert!(request.addition_params().is_none());
    }

    #[test]
    fn test_empty_fields_rejected() {
        assert!(matches!(
            AttRequest::new("", "tmpl", USER),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            AttRequest::new("app", "", USER),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            AttRequest::new("app", "tmpl", ""),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_set_att_mode_replaces_wholesale() {
        let mut request = request();
        request.set_att_mode(AttMode {
            algorithm_type: AlgorithmType::MpcTls,
            result_type: ResultType::Cipher,
        });
        assert_eq!(request.att_mode().algorithm_type, AlgorithmType::MpcTls);
        assert_eq!(request.att_mode().result_type, ResultType::Cipher);
    }

    #[test]
    fn test_condition_round_trip() {
        let mut request = request();
        request.set_att_conditions(conditions()).unwrap();

        let stored = request.att_conditions().unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].len(), 2);
        assert_eq!(stored[1].len(), 1);
        assert_eq!(stored[0][0].field, "balance");
        assert_eq!(stored[0][1].field, "age");
        assert_eq!(stored[1][0].field, "verified");

        // Serializing and reading back yields an equivalent structure
        let json = request.to_canonical_json().unwrap();
        let parsed: FullAttestationParams = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.att_conditions.as_ref(), Some(&conditions()));
    }

    #[test]
    fn test_invalid_condition_names_field() {
        let mut request = request();
        let result = request.set_att_conditions(vec![vec![SubCondition::new(
            "balance",
            Op::Lt,
            None,
        )]]);
        match result {
            Err(Error::InvalidCondition { field }) => assert_eq!(field, "balance"),
            other => panic!("expected InvalidCondition, got {:?}", other),
        }
        // Rejected sets are not stored
        assert!(request.att_conditions().is_none());
    }

    #[test]
    fn test_addition_params_canonicalized() {
        let mut request = request();
        request
            .set_addition_params(&json!({"zeta": 1, "alpha": "x"}))
            .unwrap();
        assert_eq!(request.addition_params(), Some(r#"{"alpha":"x","zeta":1}"#));
    }

    #[test]
    fn test_canonical_json_deterministic() {
        let mut request = request();
        request.set_att_conditions(conditions()).unwrap();
        request.set_addition_params(&json!({"custom": "value"})).unwrap();

        let first = request.to_canonical_json().unwrap();
        let second = request.to_canonical_json().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_canonical_field_order() {
        let json = request().to_canonical_json().unwrap();
        assert!(json.starts_with(r#"{"appId":"test_app","attTemplateID":"test_template""#));

        let positions: Vec<usize> = [
            "\"appId\"",
            "\"attTemplateID\"",
            "\"userAddress\"",
            "\"timestamp\"",
            "\"attMode\"",
            "\"attConditions\"",
            "\"additionParams\"",
        ]
        .iter()
        .map(|name| json.find(name).expect(name))
        .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_wire_shape() {
        let mut request = request();
        request.set_att_conditions(conditions()).unwrap();
        let value: Value = serde_json::from_str(&request.to_canonical_json().unwrap()).unwrap();

        assert_eq!(value["appId"], "test_app");
        assert_eq!(value["attTemplateID"], "test_template");
        assert_eq!(value["userAddress"], USER);
        assert!(value["timestamp"].is_u64());
        assert_eq!(value["attMode"]["algorithm_type"], "proxytls");
        assert_eq!(value["attMode"]["result_type"], "plain");
        assert_eq!(value["attConditions"][0][0]["op"], ">");
        assert_eq!(value["attConditions"][0][0]["value"], "1000");
        assert_eq!(value["additionParams"], Value::Null);
    }

    #[test]
    fn test_timestamp_fixed_at_construction() {
        let mut request = request();
        let before = request.timestamp();
        request.set_att_mode(AttMode::default());
        request.set_addition_params(&json!({"k": "v"})).unwrap();
        assert_eq!(request.timestamp(), before);
    }
}
