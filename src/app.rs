// Governance facade: the single entry surface over the registries. Owns the
// operational flag, the event journal, the entropy source, and the sampler
// nonce; every mutating operation runs under one exclusive borrow, so
// registry mutations, quorum checks, and debit/credit pairs are linearized
// per entity. Callers needing sharing wrap the app in Arc<Mutex<_>>.

use tracing::{debug, info};

use crate::airlines::{Airline, AirlineRegistry, RegisterOutcome, VoteOutcome};
use crate::config::SuretyConfig;
use crate::entropy::{EntropySource, IndexSampler};
use crate::error::SuretyError;
use crate::events::LedgerEvent;
use crate::flights::{Flight, FlightRegistry, FlightStatus};
use crate::insurance::InsuranceLedger;
use crate::keys::{flight_key, request_key, AccountId, Key};
use crate::oracles::{OracleBoard, StatusRequest, SubmitOutcome};
use crate::{ORACLE_INDEX_COUNT, ORACLE_QUORUM};

pub struct SuretyApp {
    pub config: SuretyConfig,
    pub(crate) owner: AccountId,
    pub(crate) operational: bool,
    pub airlines: AirlineRegistry,
    pub flights: FlightRegistry,
    pub oracles: OracleBoard,
    pub insurance: InsuranceLedger,
    pub(crate) sampler: IndexSampler,
    entropy: Box<dyn EntropySource>,
    events: Vec<LedgerEvent>,
}

impl SuretyApp {
    pub fn new(owner: AccountId, config: SuretyConfig, entropy: Box<dyn EntropySource>) -> Self {
        let sampler = IndexSampler::new(&config.entropy);
        Self {
            config,
            owner,
            operational: true,
            airlines: AirlineRegistry::new(),
            flights: FlightRegistry::new(),
            oracles: OracleBoard::new(),
            insurance: InsuranceLedger::new(),
            sampler,
            entropy,
            events: Vec::new(),
        }
    }

    /// Reassemble from persisted state; the entropy source is never
    /// persisted and arrives fresh.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        owner: AccountId,
        config: SuretyConfig,
        operational: bool,
        airlines: AirlineRegistry,
        flights: FlightRegistry,
        oracles: OracleBoard,
        insurance: InsuranceLedger,
        sampler_nonce: u64,
        entropy: Box<dyn EntropySource>,
    ) -> Self {
        let sampler = IndexSampler::with_nonce(&config.entropy, sampler_nonce);
        Self {
            config,
            owner,
            operational,
            airlines,
            flights,
            oracles,
            insurance,
            sampler,
            entropy,
            events: Vec::new(),
        }
    }

    fn begin_mutation(&mut self) -> Result<(), SuretyError> {
        if !self.operational {
            return Err(SuretyError::NotOperational);
        }
        // One production step per transaction keeps sampler lookback inside
        // the entropy window.
        self.entropy.advance();
        Ok(())
    }

    // --- administrative surface ---

    pub fn set_operational(&mut self, caller: AccountId, flag: bool) -> Result<(), SuretyError> {
        if caller != self.owner {
            return Err(SuretyError::Unauthorized);
        }
        self.operational = flag;
        info!(operational = flag, "operational flag set");
        Ok(())
    }

    pub fn is_operational(&self) -> bool {
        self.operational
    }

    pub fn owner(&self) -> AccountId {
        self.owner
    }

    // --- airline governance ---

    pub fn register_airline(&mut self, airline: AccountId) -> Result<RegisterOutcome, SuretyError> {
        self.begin_mutation()?;
        let outcome = self.airlines.register(airline, &self.config)?;
        match outcome {
            RegisterOutcome::Registered => {
                info!(airline = %hex::encode(airline), "airline registered directly");
                self.events.push(LedgerEvent::AirlineRegistered { airline });
            }
            RegisterOutcome::Enqueued => {
                info!(airline = %hex::encode(airline), "airline enqueued for votes");
                self.events.push(LedgerEvent::AirlineEnqueued { airline });
            }
        }
        Ok(outcome)
    }

    pub fn vote_airline(
        &mut self,
        voter: AccountId,
        target: AccountId,
    ) -> Result<VoteOutcome, SuretyError> {
        self.begin_mutation()?;
        let outcome = self.airlines.vote(voter, target, &self.config)?;
        debug!(
            target = %hex::encode(target),
            approvals = outcome.approvals,
            "vote recorded"
        );
        if outcome.registered {
            info!(
                airline = %hex::encode(target),
                approvals = outcome.approvals,
                "airline voted in"
            );
            self.events.push(LedgerEvent::VotedInAirline {
                airline: target,
                approvals: outcome.approvals,
            });
            self.events.push(LedgerEvent::AirlineRegistered { airline: target });
        }
        Ok(outcome)
    }

    pub fn fund_airline(&mut self, airline: AccountId, amount: u64) -> Result<u64, SuretyError> {
        self.begin_mutation()?;
        let balance = self.airlines.fund(airline, amount, &self.config)?;
        self.events.push(LedgerEvent::AirlineFunded { airline, amount });
        Ok(balance)
    }

    // --- flights ---

    pub fn register_flight(
        &mut self,
        airline: AccountId,
        flight_code: &str,
        timestamp: u64,
    ) -> Result<Key, SuretyError> {
        self.begin_mutation()?;
        if !self.airlines.is_registered(&airline) {
            return Err(SuretyError::Unauthorized);
        }
        if !self.airlines.is_funded(&airline) {
            return Err(SuretyError::InsufficientFunding);
        }
        let key = self.flights.register(airline, flight_code, timestamp)?;
        info!(flight = flight_code, timestamp, "flight registered");
        self.events.push(LedgerEvent::FlightRegistered {
            airline,
            flight_code: flight_code.to_string(),
            timestamp,
            key,
        });
        Ok(key)
    }

    // --- insurance ---

    pub fn purchase_insurance(
        &mut self,
        customer: AccountId,
        flight: Key,
        amount: u64,
    ) -> Result<(), SuretyError> {
        self.begin_mutation()?;
        if !self.flights.contains(&flight) {
            return Err(SuretyError::NotFound);
        }
        self.insurance.purchase(customer, flight, amount, &self.config)
    }

    pub fn withdraw(&mut self, customer: AccountId) -> Result<u64, SuretyError> {
        self.begin_mutation()?;
        let amount = self.insurance.withdraw(customer)?;
        info!(customer = %hex::encode(customer), amount, "credits withdrawn");
        self.events.push(LedgerEvent::CreditsWithdrawn { customer, amount });
        Ok(amount)
    }

    // --- oracle consensus ---

    pub fn register_oracle(
        &mut self,
        oracle: AccountId,
        fee: u64,
    ) -> Result<[u8; ORACLE_INDEX_COUNT], SuretyError> {
        self.begin_mutation()?;
        if fee < self.config.oracle_registration_fee {
            return Err(SuretyError::InsufficientFunding);
        }
        if self.oracles.oracles.contains_key(&oracle) {
            return Err(SuretyError::AlreadyExists);
        }
        let indices = self.sampler.assign_indices(self.entropy.as_ref(), &oracle);
        self.oracles.register(oracle, indices)?;
        debug!(oracle = %hex::encode(oracle), ?indices, "oracle registered");
        Ok(indices)
    }

    pub fn oracle_indices(
        &self,
        oracle: &AccountId,
    ) -> Result<[u8; ORACLE_INDEX_COUNT], SuretyError> {
        self.oracles.indices_of(oracle)
    }

    /// Raise a flight-status query. Picks one index for the requester and
    /// opens (or reopens, reference behavior) the request slot under it.
    pub fn open_status_request(
        &mut self,
        requester: AccountId,
        airline: AccountId,
        flight_code: &str,
        timestamp: u64,
    ) -> Result<u8, SuretyError> {
        self.begin_mutation()?;
        let index = self.sampler.random_index(self.entropy.as_ref(), &requester);
        let key = request_key(index, &airline, flight_code, timestamp);
        self.oracles
            .open_request(key, requester, airline, flight_code, timestamp);
        info!(flight = flight_code, index, "status request raised");
        self.events.push(LedgerEvent::OracleRequestRaised {
            index,
            airline,
            flight_code: flight_code.to_string(),
            timestamp,
        });
        Ok(index)
    }

    pub fn submit_oracle_response(
        &mut self,
        oracle: AccountId,
        index: u8,
        airline: AccountId,
        flight_code: &str,
        timestamp: u64,
        status: FlightStatus,
    ) -> Result<SubmitOutcome, SuretyError> {
        self.begin_mutation()?;
        let key = request_key(index, &airline, flight_code, timestamp);
        self.oracles.validate_submission(&oracle, index, &key)?;

        // If this append reaches quorum, the finalization hook runs inside
        // the same operation; validate its preconditions before mutating so
        // a failing submit records nothing.
        let fkey = flight_key(&airline, flight_code, timestamp);
        let will_finalize = self.oracles.response_count(&key, status) + 1 >= ORACLE_QUORUM;
        let mut pending: Vec<(AccountId, u64)> = Vec::new();
        if will_finalize {
            if !self.flights.contains(&fkey) {
                return Err(SuretyError::NotFound);
            }
            if status.is_payable() {
                pending = self.insurance.eligible_credits(&fkey);
                let total: u64 = pending.iter().map(|(_, c)| c).sum();
                if self.airlines.funding(&airline) < total {
                    return Err(SuretyError::InsufficientAirlineFunds);
                }
            }
        }

        let outcome = self.oracles.record_response(
            oracle,
            &key,
            status,
            ORACLE_QUORUM,
            self.config.close_on_finalize,
        )?;
        self.events.push(LedgerEvent::OracleResponseRecorded {
            airline,
            flight_code: flight_code.to_string(),
            timestamp,
            status,
        });

        if outcome.finalized {
            self.apply_status(fkey, airline, flight_code, timestamp, status, &pending)?;
        }
        Ok(outcome)
    }

    /// Finalization hook: record the agreed status and credit eligible
    /// policies, debiting the airline in the same step. Preconditions were
    /// validated by the caller, so the debit cannot fail here.
    fn apply_status(
        &mut self,
        fkey: Key,
        airline: AccountId,
        flight_code: &str,
        timestamp: u64,
        status: FlightStatus,
        pending: &[(AccountId, u64)],
    ) -> Result<(), SuretyError> {
        self.flights.set_status(&fkey, status)?;
        info!(flight = flight_code, ?status, "status finalized");
        self.events.push(LedgerEvent::StatusFinalized {
            airline,
            flight_code: flight_code.to_string(),
            timestamp,
            status,
        });
        if status.is_payable() && !pending.is_empty() {
            let total: u64 = pending.iter().map(|(_, c)| c).sum();
            self.airlines.debit(airline, total)?;
            self.insurance.commit_credits(pending);
            for (customer, amount) in pending {
                self.events.push(LedgerEvent::CustomerCredited {
                    customer: *customer,
                    amount: *amount,
                });
            }
        }
        Ok(())
    }

    // --- read surface ---

    pub fn airline(&self, id: &AccountId) -> Option<&Airline> {
        self.airlines.get(id)
    }

    pub fn registered_airlines(&self) -> u64 {
        self.airlines.registered_count
    }

    pub fn flight(&self, key: &Key) -> Option<&Flight> {
        self.flights.get(key)
    }

    pub fn request(&self, key: &Key) -> Option<&StatusRequest> {
        self.oracles.request(key)
    }

    pub fn credit_balance(&self, customer: &AccountId) -> u64 {
        self.insurance.credit_balance(customer)
    }

    /// Consume the pending notification journal (external relay surface).
    pub fn drain_events(&mut self) -> Vec<LedgerEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entropy::ScriptedEntropy;

    fn account(seed: u8) -> AccountId {
        [seed; 32]
    }

    fn app() -> SuretyApp {
        SuretyApp::new(
            account(255),
            SuretyConfig::default(),
            Box::new(ScriptedEntropy::constant([0x42; 32])),
        )
    }

    #[test]
    fn operational_gate_blocks_mutations_but_not_toggle() {
        let mut app = app();
        let owner = account(255);

        assert_eq!(
            app.set_operational(account(1), false),
            Err(SuretyError::Unauthorized)
        );
        app.set_operational(owner, false).unwrap();
        assert_eq!(
            app.register_airline(account(1)),
            Err(SuretyError::NotOperational)
        );
        assert_eq!(app.withdraw(account(1)), Err(SuretyError::NotOperational));

        app.set_operational(owner, true).unwrap();
        assert!(app.register_airline(account(1)).is_ok());
    }

    #[test]
    fn flight_registration_requires_registered_funded_airline() {
        let mut app = app();
        let airline = account(1);

        assert_eq!(
            app.register_flight(airline, "BA49", 1700),
            Err(SuretyError::Unauthorized)
        );
        app.register_airline(airline).unwrap();
        assert_eq!(
            app.register_flight(airline, "BA49", 1700),
            Err(SuretyError::InsufficientFunding)
        );
        app.fund_airline(airline, app.config.airline_funding_fee)
            .unwrap();
        let key = app.register_flight(airline, "BA49", 1700).unwrap();
        assert_eq!(
            app.register_flight(airline, "BA49", 1700),
            Err(SuretyError::AlreadyExists)
        );
        assert_eq!(app.flight(&key).unwrap().status, FlightStatus::Unknown);
    }

    #[test]
    fn purchase_requires_known_flight() {
        let mut app = app();
        assert_eq!(
            app.purchase_insurance(account(9), [1u8; 32], 100),
            Err(SuretyError::NotFound)
        );
    }

    #[test]
    fn oracle_registration_checks_fee_and_uniqueness() {
        let mut app = app();
        let fee = app.config.oracle_registration_fee;
        assert_eq!(
            app.register_oracle(account(1), fee - 1),
            Err(SuretyError::InsufficientFunding)
        );
        let indices = app.register_oracle(account(1), fee).unwrap();
        assert_eq!(app.oracle_indices(&account(1)), Ok(indices));
        assert_eq!(
            app.register_oracle(account(1), fee),
            Err(SuretyError::AlreadyExists)
        );
    }

    #[test]
    fn events_journal_drains_in_order() {
        let mut app = app();
        app.register_airline(account(1)).unwrap();
        app.fund_airline(account(1), app.config.airline_funding_fee)
            .unwrap();
        let events = app.drain_events();
        assert_eq!(
            events,
            vec![
                LedgerEvent::AirlineRegistered { airline: account(1) },
                LedgerEvent::AirlineFunded {
                    airline: account(1),
                    amount: app.config.airline_funding_fee,
                },
            ]
        );
        assert!(app.drain_events().is_empty());
    }

    #[test]
    fn vote_path_emits_voted_in_then_registered() {
        let mut app = app();
        for seed in 0..4u8 {
            app.register_airline(account(seed)).unwrap();
        }
        let target = account(10);
        app.register_airline(target).unwrap();
        app.drain_events();

        app.vote_airline(account(0), target).unwrap();
        assert!(app.drain_events().is_empty());
        let outcome = app.vote_airline(account(1), target).unwrap();
        assert!(outcome.registered);
        assert_eq!(
            app.drain_events(),
            vec![
                LedgerEvent::VotedInAirline {
                    airline: target,
                    approvals: 2,
                },
                LedgerEvent::AirlineRegistered { airline: target },
            ]
        );
    }
}
