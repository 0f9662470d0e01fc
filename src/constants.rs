//! Protocol constants: polling budget and per-environment contract addresses

/// Milliseconds in one second.
pub const ONE_SECOND_MS: u64 = 1000;

/// Milliseconds in one minute.
pub const ONE_MINUTE_MS: u64 = 60 * ONE_SECOND_MS;

/// Default wait between result probes.
pub const ATTESTATION_POLLING_INTERVAL_MS: u64 = ONE_SECOND_MS;

/// Default total polling budget before the client gives up with a Timeout.
pub const ATTESTATION_POLLING_TIMEOUT_MS: u64 = 2 * ONE_MINUTE_MS;

/// Consecutive transport failures tolerated inside the polling loop before
/// the failure is escalated to the caller.
pub const MAX_CONSECUTIVE_TRANSPORT_FAILURES: u32 = 3;

/// Contract validating attestor signatures on the development network.
/// The test network shares this deployment.
pub const DEVELOPMENT_CONTRACT_ADDRESS: &str = "0xe02bd7a6c8aa401189aebb5bad755c2610940a73";

/// Contract validating attestor signatures on the production network.
pub const PRODUCTION_CONTRACT_ADDRESS: &str = "0xDB736B13E2f522dBE18B2015d0291E4b193D8eF6";

/// Default base URL of the attestation service.
pub const DEFAULT_SERVICE_URL: &str = "https://attestation.zktls.dev";
