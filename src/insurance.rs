// Insurance policies and customer credit accounts. Storage is keyed by
// customer only — one policy slot each, later purchases overwrite the slot
// (reference limitation, kept). Payout marks the policy paid exactly once;
// credits accumulate until withdrawal drains them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::SuretyConfig;
use crate::error::SuretyError;
use crate::keys::{AccountId, Key};
use crate::{PAYOUT_DENOMINATOR, PAYOUT_NUMERATOR};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Policy {
    pub flight: Key,
    pub amount: u64,
    pub paid_out: bool,
}

#[derive(Clone, Debug, Default)]
pub struct InsuranceLedger {
    /// BTreeMaps keep payout and event order deterministic.
    pub policies: BTreeMap<AccountId, Policy>,
    pub credits: BTreeMap<AccountId, u64>,
}

impl InsuranceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bounds check and slot write. The caller verifies the flight exists.
    pub fn purchase(
        &mut self,
        customer: AccountId,
        flight: Key,
        amount: u64,
        config: &SuretyConfig,
    ) -> Result<(), SuretyError> {
        if amount == 0 || amount > config.max_insure_fee {
            return Err(SuretyError::InvalidAmount);
        }
        self.policies.insert(
            customer,
            Policy {
                flight,
                amount,
                paid_out: false,
            },
        );
        Ok(())
    }

    /// 1.5x credit, integer arithmetic truncating.
    pub fn payout_credit(amount: u64) -> u64 {
        amount.saturating_mul(PAYOUT_NUMERATOR) / PAYOUT_DENOMINATOR
    }

    /// Unpaid policies referencing the flight, with their computed credits.
    /// Read-only so the caller can validate the airline debit first.
    pub fn eligible_credits(&self, flight: &Key) -> Vec<(AccountId, u64)> {
        self.policies
            .iter()
            .filter(|(_, p)| &p.flight == flight && !p.paid_out)
            .map(|(customer, p)| (*customer, Self::payout_credit(p.amount)))
            .collect()
    }

    /// Flip paid_out and credit the accounts; pairs come from
    /// `eligible_credits` within the same operation.
    pub fn commit_credits(&mut self, credited: &[(AccountId, u64)]) {
        for (customer, credit) in credited {
            debug_assert!(
                self.policies.contains_key(customer),
                "credited customer has no policy slot"
            );
            if let Some(policy) = self.policies.get_mut(customer) {
                policy.paid_out = true;
            }
            let balance = self.credits.entry(*customer).or_insert(0);
            *balance = balance.saturating_add(*credit);
        }
    }

    /// Read-zero-return in one exclusive step.
    pub fn withdraw(&mut self, customer: AccountId) -> Result<u64, SuretyError> {
        match self.credits.get_mut(&customer) {
            Some(balance) if *balance > 0 => {
                let amount = *balance;
                *balance = 0;
                Ok(amount)
            }
            _ => Err(SuretyError::NothingToWithdraw),
        }
    }

    pub fn credit_balance(&self, customer: &AccountId) -> u64 {
        self.credits.get(customer).copied().unwrap_or(0)
    }

    pub fn policy(&self, customer: &AccountId) -> Option<&Policy> {
        self.policies.get(customer)
    }
}
