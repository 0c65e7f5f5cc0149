// Deployment parameters and compatibility switches. Fees are deployment
// constants, not core design constants; the switches reproduce reference
// quirks by default and opt into the corrected behavior for new deployments.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SuretyConfig {
    /// Airlines registered directly, without votes, while the registered
    /// count stays below this.
    #[serde(default = "default_bootstrap_airlines")]
    pub bootstrap_airlines: u64,
    /// Register an enqueued airline once approvals reach *or exceed* the
    /// required consensus, instead of the reference's exact-equality check.
    #[serde(default)]
    pub vote_threshold_at_least: bool,
    /// Drop repeat votes from the same approver. The reference lets a voter
    /// inflate the approver count.
    #[serde(default)]
    pub dedup_votes: bool,
    /// Close a status request on first quorum. The reference never closes,
    /// so every later same-status response re-triggers finalization.
    #[serde(default)]
    pub close_on_finalize: bool,
    /// Minimum amount an airline must send to become funded.
    #[serde(default = "default_airline_funding_fee")]
    pub airline_funding_fee: u64,
    /// Minimum fee accompanying an oracle registration.
    #[serde(default = "default_oracle_registration_fee")]
    pub oracle_registration_fee: u64,
    /// Upper bound on a single insurance purchase.
    #[serde(default = "default_max_insure_fee")]
    pub max_insure_fee: u64,
    #[serde(default)]
    pub entropy: EntropyConfig,
}

fn default_bootstrap_airlines() -> u64 {
    4
}

fn default_airline_funding_fee() -> u64 {
    10_000_000_000 // 10 units at 1e9 resolution
}

fn default_oracle_registration_fee() -> u64 {
    1_000_000_000
}

fn default_max_insure_fee() -> u64 {
    1_000_000_000
}

impl Default for SuretyConfig {
    fn default() -> Self {
        Self {
            bootstrap_airlines: default_bootstrap_airlines(),
            vote_threshold_at_least: false,
            dedup_votes: false,
            close_on_finalize: false,
            airline_funding_fee: default_airline_funding_fee(),
            oracle_registration_fee: default_oracle_registration_fee(),
            max_insure_fee: default_max_insure_fee(),
            entropy: EntropyConfig::default(),
        }
    }
}

/// Bounds of the windowed entropy source: the sampler's lookback nonce
/// resets before it can leave the retention window.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EntropyConfig {
    #[serde(default = "default_retention_steps")]
    pub retention_steps: u64,
    #[serde(default = "default_nonce_reset")]
    pub nonce_reset: u64,
}

fn default_retention_steps() -> u64 {
    256
}

fn default_nonce_reset() -> u64 {
    250
}

impl Default for EntropyConfig {
    fn default() -> Self {
        Self {
            retention_steps: default_retention_steps(),
            nonce_reset: default_nonce_reset(),
        }
    }
}
