// Deterministic flight-insurance ledger: airline quorum governance, oracle
// status consensus, conserved insurance funds. Single authoritative state
// machine; external relays, front ends, and transports live elsewhere and
// call in through `app::SuretyApp`.

pub mod airlines;
pub mod app;
pub mod config;
pub mod entropy;
pub mod error;
pub mod events;
pub mod flights;
pub mod insurance;
pub mod keys;
pub mod oracles;
pub mod storage;

// Consensus constants; deployment-tunable values live in `config`.

/// Oracle indices are drawn from [0, 10).
pub const ORACLE_INDEX_DOMAIN: u8 = 10;
/// Each oracle holds exactly three distinct indices.
pub const ORACLE_INDEX_COUNT: usize = 3;
/// Matching responses required to finalize a status.
pub const ORACLE_QUORUM: usize = 3;
/// Payout is amount * 150 / 100, truncating.
pub const PAYOUT_NUMERATOR: u64 = 150;
pub const PAYOUT_DENOMINATOR: u64 = 100;

// Time is injected by callers; nothing here reads a wall clock.
