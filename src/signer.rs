//! Application-key signing of attestation requests
//!
//! The request's canonical JSON is hashed with the Ethereum personal-message
//! convention (EIP-191: the digest is domain-separated by the
//! `"\x19Ethereum Signed Message:\n" + length` prefix, so the signature can
//! never be replayed as a raw transaction) and signed with the app secret
//! using recoverable secp256k1 ECDSA. Signing is a pure function of the
//! canonical bytes and the key: no network I/O, no request mutation.

use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use sha3::{Digest, Keccak256};

use crate::error::{Error, Result};
use crate::request::{AttRequest, SignedAttRequest};

const PERSONAL_MESSAGE_PREFIX: &str = "\x19Ethereum Signed Message:\n";

/// Sign a request with the application secret key
///
/// The signature covers the canonical serialization exactly as transmitted
/// and is hex-encoded as 65 bytes r || s || v with v in {27, 28}.
pub fn sign_request(request: &AttRequest, app_secret: &str) -> Result<SignedAttRequest> {
    let signing_key = parse_secret(app_secret)?;
    let message = request.to_canonical_json()?;
    let digest = personal_message_hash(message.as_bytes());

    let (signature, recovery_id) = signing_key
        .sign_prehash_recoverable(&digest)
        .map_err(|e| Error::SigningFailed(e.to_string()))?;

    let mut bytes = signature.to_bytes().to_vec();
    bytes.push(27 + recovery_id.to_byte());

    Ok(SignedAttRequest {
        att_request: request.to_full_params(),
        app_signature: format!("0x{}", hex::encode(bytes)),
    })
}

/// Address corresponding to an application secret key (lowercase hex)
pub fn derive_address(app_secret: &str) -> Result<String> {
    let signing_key = parse_secret(app_secret)?;
    Ok(address_of(signing_key.verifying_key()))
}

/// Recover the signer's address from a message and a recoverable signature
pub fn recover_address(message: &str, signature_hex: &str) -> Result<String> {
    let bytes = hex::decode(signature_hex.trim_start_matches("0x"))
        .map_err(|e| Error::SigningFailed(format!("invalid signature hex: {}", e)))?;
    if bytes.len() != 65 {
        return Err(Error::SigningFailed(format!(
            "signature must be 65 bytes, got {}",
            bytes.len()
        )));
    }

    let signature = Signature::from_slice(&bytes[..64])
        .map_err(|e| Error::SigningFailed(e.to_string()))?;
    let v = bytes[64];
    let recovery_id = RecoveryId::from_byte(if v >= 27 { v - 27 } else { v })
        .ok_or_else(|| Error::SigningFailed(format!("invalid recovery byte: {}", v)))?;

    let digest = personal_message_hash(message.as_bytes());
    let verifying_key = VerifyingKey::recover_from_prehash(&digest, &signature, recovery_id)
        .map_err(|e| Error::SigningFailed(e.to_string()))?;

    Ok(address_of(&verifying_key))
}

/// EIP-191 personal-message digest of arbitrary bytes
pub fn personal_message_hash(message: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(PERSONAL_MESSAGE_PREFIX.as_bytes());
    hasher.update(message.len().to_string().as_bytes());
    hasher.update(message);
    hasher.finalize().into()
}

fn parse_secret(app_secret: &str) -> Result<SigningKey> {
    let bytes = hex::decode(app_secret.trim_start_matches("0x"))
        .map_err(|e| Error::SigningFailed(format!("invalid secret hex: {}", e)))?;
    SigningKey::from_slice(&bytes).map_err(|e| Error::SigningFailed(e.to_string()))
}

/// Last 20 bytes of the Keccak-256 of the uncompressed public key
fn address_of(verifying_key: &VerifyingKey) -> String {
    let point = verifying_key.to_encoded_point(false);
    let hash = Keccak256::digest(&point.as_bytes()[1..]);
    format!("0x{}", hex::encode(&hash[12..]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::AttRequest;

    const SECRET: &str = "0x1111111111111111111111111111111111111111111111111111111111111111";

    fn request() -> AttRequest {
        AttRequest::new(
            "test_app",
            "test_template",
            "0x742d35Cc6634C0532925a3b844Bc454e4438f44e",
        )
        .unwrap()
    }

    #[test]
    fn test_signature_shape() {
        let signed = sign_request(&request(), SECRET).unwrap();
        // 0x + 65 bytes hex
        assert!(signed.app_signature.starts_with("0x"));
        assert_eq!(signed.app_signature.len(), 132);

        let v = u8::from_str_radix(&signed.app_signature[130..], 16).unwrap();
        assert!(v == 27 || v == 28);
    }

    #[test]
    fn test_recovered_address_matches_key() {
        let request = request();
        let signed = sign_request(&request, SECRET).unwrap();
        let message = request.to_canonical_json().unwrap();

        let recovered = recover_address(&message, &signed.app_signature).unwrap();
        assert_eq!(recovered, derive_address(SECRET).unwrap());
    }

    #[test]
    fn test_signature_deterministic() {
        // RFC 6979 nonces: same bytes + same key => same signature
        let request = request();
        let first = sign_request(&request, SECRET).unwrap();
        let second = sign_request(&request, SECRET).unwrap();
        assert_eq!(first.app_signature, second.app_signature);
    }

    #[test]
    fn test_signing_does_not_mutate_request() {
        let request = request();
        let before = request.to_canonical_json().unwrap();
        let signed = sign_request(&request, SECRET).unwrap();
        assert_eq!(request.to_canonical_json().unwrap(), before);
        assert_eq!(
            serde_json::to_string(&signed.att_request).unwrap(),
            before
        );
    }

    #[test]
    fn test_personal_message_domain_separation() {
        let plain: [u8; 32] = Keccak256::digest(b"hello").into();
        assert_ne!(personal_message_hash(b"hello"), plain);
        assert_ne!(personal_message_hash(b"hello"), personal_message_hash(b"hellp"));
    }

    #[test]
    fn test_malformed_secret() {
        assert!(matches!(
            sign_request(&request(), "not-hex"),
            Err(Error::SigningFailed(_))
        ));
        // All-zero scalar is not a valid secp256k1 key
        let zeros = format!("0x{}", "0".repeat(64));
        assert!(matches!(
            sign_request(&request(), &zeros),
            Err(Error::SigningFailed(_))
        ));
    }

    #[test]
    fn test_recover_rejects_truncated_signature() {
        assert!(matches!(
            recover_address("msg", "0xdeadbeef"),
            Err(Error::SigningFailed(_))
        ));
    }
}
