// Pseudo-random index assignment. The generator mixes a digest drawn from a
// bounded recent window of the entropy source with the caller's account id;
// the rotating nonce controls how far back the draw reaches and resets
// before it can leave the window. The source is a trait so tests inject
// scripted digests and stay deterministic.

use std::collections::VecDeque;

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use sha2::{Digest, Sha256};

use crate::config::EntropyConfig;
use crate::keys::AccountId;
use crate::{ORACLE_INDEX_COUNT, ORACLE_INDEX_DOMAIN};

pub trait EntropySource: Send {
    /// Current production step; advances once per ledger operation.
    fn step(&self) -> u64;
    /// Digest for a past step. Steps outside the retention window yield the
    /// zero digest.
    fn digest_at(&self, step: u64) -> [u8; 32];
    fn advance(&mut self);
}

/// Production source: a ChaCha20 stream chopped into per-step digests, with
/// only the most recent `retention` steps kept.
pub struct ChaChaEntropy {
    rng: ChaCha20Rng,
    window: VecDeque<[u8; 32]>,
    step: u64,
    retention: usize,
}

impl ChaChaEntropy {
    pub fn new(seed: u64, config: &EntropyConfig) -> Self {
        let retention = config.retention_steps.max(1) as usize;
        let mut source = Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
            window: VecDeque::with_capacity(retention),
            step: 0,
            retention,
        };
        source.push_digest();
        source
    }

    fn push_digest(&mut self) {
        let mut digest = [0u8; 32];
        self.rng.fill_bytes(&mut digest);
        if self.window.len() == self.retention {
            self.window.pop_front();
        }
        self.window.push_back(digest);
    }
}

impl EntropySource for ChaChaEntropy {
    fn step(&self) -> u64 {
        self.step
    }

    fn digest_at(&self, step: u64) -> [u8; 32] {
        if step > self.step {
            return [0u8; 32];
        }
        let back = (self.step - step) as usize;
        if back >= self.window.len() {
            return [0u8; 32];
        }
        self.window[self.window.len() - 1 - back]
    }

    fn advance(&mut self) {
        self.step += 1;
        self.push_digest();
    }
}

/// Test source cycling through a fixed digest script.
pub struct ScriptedEntropy {
    digests: Vec<[u8; 32]>,
    step: u64,
}

impl ScriptedEntropy {
    pub fn cycle(digests: Vec<[u8; 32]>) -> Self {
        assert!(!digests.is_empty(), "scripted entropy needs at least one digest");
        Self { digests, step: 0 }
    }

    pub fn constant(digest: [u8; 32]) -> Self {
        Self::cycle(vec![digest])
    }
}

impl EntropySource for ScriptedEntropy {
    fn step(&self) -> u64 {
        self.step
    }

    fn digest_at(&self, step: u64) -> [u8; 32] {
        self.digests[(step % self.digests.len() as u64) as usize]
    }

    fn advance(&mut self) {
        self.step += 1;
    }
}

/// Owns the rotating nonce shared by all index draws. Nonce issuance is
/// serialized by the facade's exclusive borrow.
#[derive(Clone, Debug)]
pub struct IndexSampler {
    pub nonce: u64,
    nonce_reset: u64,
}

impl IndexSampler {
    pub fn new(config: &EntropyConfig) -> Self {
        Self {
            nonce: 0,
            nonce_reset: config.nonce_reset,
        }
    }

    pub fn with_nonce(config: &EntropyConfig, nonce: u64) -> Self {
        Self {
            nonce,
            nonce_reset: config.nonce_reset,
        }
    }

    /// One index in [0, ORACLE_INDEX_DOMAIN).
    pub fn random_index(&mut self, source: &dyn EntropySource, account: &AccountId) -> u8 {
        let lookback = self.nonce;
        self.nonce += 1;
        if self.nonce > self.nonce_reset {
            self.nonce = 0;
        }
        let step = source.step().saturating_sub(lookback);
        let mut h = Sha256::new();
        h.update(source.digest_at(step));
        // The nonce is part of the preimage so consecutive draws differ even
        // when the window serves the same digest; the rejection loop in
        // assign_indices relies on that.
        h.update(lookback.to_le_bytes());
        h.update(account);
        let digest = h.finalize();
        let mut word = [0u8; 8];
        word.copy_from_slice(&digest[..8]);
        (u64::from_le_bytes(word) % u64::from(ORACLE_INDEX_DOMAIN)) as u8
    }

    /// Exactly ORACLE_INDEX_COUNT distinct indices, by rejection resampling.
    /// Terminates quickly: the domain (10) vastly exceeds the sample (3).
    pub fn assign_indices(
        &mut self,
        source: &dyn EntropySource,
        account: &AccountId,
    ) -> [u8; ORACLE_INDEX_COUNT] {
        let mut out = [0u8; ORACLE_INDEX_COUNT];
        let mut filled = 0;
        while filled < ORACLE_INDEX_COUNT {
            let candidate = self.random_index(source, account);
            if !out[..filled].contains(&candidate) {
                out[filled] = candidate;
                filled += 1;
            }
        }
        out
    }
}
