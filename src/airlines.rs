// Airline lifecycle and quorum voting. Approvers are a plain Vec: the
// reference does not deduplicate voters, so repeat votes inflate the count
// unless the dedup switch is on. The Enqueued -> Registered transition uses
// literal exact-equality against floor(registered/2) by default.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::SuretyConfig;
use crate::error::SuretyError;
use crate::keys::AccountId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AirlineStatus {
    Enqueued,
    Registered,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Airline {
    pub status: AirlineStatus,
    pub funding: u64,
    pub approvers: Vec<AccountId>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegisterOutcome {
    Registered,
    Enqueued,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VoteOutcome {
    pub approvals: u64,
    pub registered: bool,
}

#[derive(Clone, Debug, Default)]
pub struct AirlineRegistry {
    /// Absent id == Unregistered. Airlines are never deleted.
    pub airlines: HashMap<AccountId, Airline>,
    pub registered_count: u64,
}

impl AirlineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Direct registration below the bootstrap limit, enqueue afterwards.
    pub fn register(
        &mut self,
        airline: AccountId,
        config: &SuretyConfig,
    ) -> Result<RegisterOutcome, SuretyError> {
        if self.airlines.contains_key(&airline) {
            return Err(SuretyError::AlreadyExists);
        }
        let (status, outcome) = if self.registered_count < config.bootstrap_airlines {
            (AirlineStatus::Registered, RegisterOutcome::Registered)
        } else {
            (AirlineStatus::Enqueued, RegisterOutcome::Enqueued)
        };
        self.airlines.insert(
            airline,
            Airline {
                status,
                funding: 0,
                approvers: Vec::new(),
            },
        );
        if outcome == RegisterOutcome::Registered {
            self.registered_count += 1;
        }
        Ok(outcome)
    }

    pub fn required_consensus(&self) -> u64 {
        self.registered_count / 2
    }

    /// Append the voter and check the threshold. Any caller may vote; the
    /// target must be enqueued.
    pub fn vote(
        &mut self,
        voter: AccountId,
        target: AccountId,
        config: &SuretyConfig,
    ) -> Result<VoteOutcome, SuretyError> {
        let required = self.required_consensus();
        let entry = self.airlines.get_mut(&target).ok_or(SuretyError::NotFound)?;
        if entry.status == AirlineStatus::Registered {
            return Err(SuretyError::AlreadyExists);
        }
        if config.dedup_votes && entry.approvers.contains(&voter) {
            return Ok(VoteOutcome {
                approvals: entry.approvers.len() as u64,
                registered: false,
            });
        }
        entry.approvers.push(voter);
        let approvals = entry.approvers.len() as u64;
        let reached = if config.vote_threshold_at_least {
            approvals >= required
        } else {
            approvals == required
        };
        if reached {
            entry.status = AirlineStatus::Registered;
            self.registered_count += 1;
        }
        Ok(VoteOutcome {
            approvals,
            registered: reached,
        })
    }

    /// Accumulate funding. Open to enqueued and registered airlines alike;
    /// Funded is the derived predicate funding > 0.
    pub fn fund(
        &mut self,
        airline: AccountId,
        amount: u64,
        config: &SuretyConfig,
    ) -> Result<u64, SuretyError> {
        if amount < config.airline_funding_fee {
            return Err(SuretyError::InsufficientFunding);
        }
        let entry = self.airlines.get_mut(&airline).ok_or(SuretyError::NotFound)?;
        entry.funding = entry.funding.saturating_add(amount);
        Ok(entry.funding)
    }

    /// Payout debit. Rejects instead of underflowing.
    pub fn debit(&mut self, airline: AccountId, amount: u64) -> Result<(), SuretyError> {
        let entry = self.airlines.get_mut(&airline).ok_or(SuretyError::NotFound)?;
        if entry.funding < amount {
            return Err(SuretyError::InsufficientAirlineFunds);
        }
        entry.funding -= amount;
        Ok(())
    }

    pub fn get(&self, airline: &AccountId) -> Option<&Airline> {
        self.airlines.get(airline)
    }

    pub fn is_registered(&self, airline: &AccountId) -> bool {
        matches!(
            self.airlines.get(airline),
            Some(a) if a.status == AirlineStatus::Registered
        )
    }

    pub fn is_funded(&self, airline: &AccountId) -> bool {
        matches!(self.airlines.get(airline), Some(a) if a.funding > 0)
    }

    pub fn funding(&self, airline: &AccountId) -> u64 {
        self.airlines.get(airline).map(|a| a.funding).unwrap_or(0)
    }
}
