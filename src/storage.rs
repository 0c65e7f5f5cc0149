// JSON snapshot persistence: write-temp-then-rename so a crash never leaves
// a torn snapshot. Account-keyed maps are persisted as row vectors; JSON
// object keys cannot carry byte arrays. The entropy source is not persisted;
// restore takes a fresh one.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::airlines::{Airline, AirlineRegistry};
use crate::app::SuretyApp;
use crate::config::SuretyConfig;
use crate::entropy::EntropySource;
use crate::flights::{Flight, FlightRegistry};
use crate::insurance::{InsuranceLedger, Policy};
use crate::keys::{AccountId, Key};
use crate::oracles::{OracleBoard, OracleRegistration, StatusRequest};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PersistedState {
    pub owner: AccountId,
    pub operational: bool,
    pub config: SuretyConfig,
    pub airlines: Vec<(AccountId, Airline)>,
    pub registered_count: u64,
    pub flights: Vec<(Key, Flight)>,
    pub oracles: Vec<(AccountId, OracleRegistration)>,
    pub requests: Vec<(Key, StatusRequest)>,
    pub policies: Vec<(AccountId, Policy)>,
    pub credits: Vec<(AccountId, u64)>,
    pub sampler_nonce: u64,
}

impl PersistedState {
    pub fn capture(app: &SuretyApp) -> Self {
        Self {
            owner: app.owner(),
            operational: app.is_operational(),
            config: app.config.clone(),
            airlines: app
                .airlines
                .airlines
                .iter()
                .map(|(id, a)| (*id, a.clone()))
                .collect(),
            registered_count: app.airlines.registered_count,
            flights: app
                .flights
                .flights
                .iter()
                .map(|(k, f)| (*k, f.clone()))
                .collect(),
            oracles: app
                .oracles
                .oracles
                .iter()
                .map(|(id, r)| (*id, *r))
                .collect(),
            requests: app
                .oracles
                .requests
                .iter()
                .map(|(k, r)| (*k, r.clone()))
                .collect(),
            policies: app
                .insurance
                .policies
                .iter()
                .map(|(id, p)| (*id, p.clone()))
                .collect(),
            credits: app
                .insurance
                .credits
                .iter()
                .map(|(id, c)| (*id, *c))
                .collect(),
            sampler_nonce: app.sampler.nonce,
        }
    }

    pub fn restore(self, entropy: Box<dyn EntropySource>) -> SuretyApp {
        let airlines = AirlineRegistry {
            airlines: self.airlines.into_iter().collect(),
            registered_count: self.registered_count,
        };
        let flights = FlightRegistry {
            flights: self.flights.into_iter().collect(),
        };
        let oracles = OracleBoard {
            oracles: self.oracles.into_iter().collect(),
            requests: self.requests.into_iter().collect(),
        };
        let insurance = InsuranceLedger {
            policies: self.policies.into_iter().collect(),
            credits: self.credits.into_iter().collect(),
        };
        SuretyApp::from_parts(
            self.owner,
            self.config,
            self.operational,
            airlines,
            flights,
            oracles,
            insurance,
            self.sampler_nonce,
            entropy,
        )
    }
}

pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Result<Self, String> {
        fs::create_dir_all(&data_dir).map_err(|e| format!("{}", e))?;
        Ok(Self {
            path: data_dir.as_ref().join("surety_snapshot.json"),
        })
    }

    pub fn load(&self) -> Result<Option<PersistedState>, String> {
        if !self.path.exists() {
            return Ok(None);
        }
        let data = fs::read(&self.path).map_err(|e| format!("{}", e))?;
        let state =
            serde_json::from_slice::<PersistedState>(&data).map_err(|e| format!("{}", e))?;
        Ok(Some(state))
    }

    pub fn save(&self, state: &PersistedState) -> Result<(), String> {
        let data = serde_json::to_vec_pretty(state).map_err(|e| format!("{}", e))?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, data).map_err(|e| format!("{}", e))?;
        fs::rename(&tmp_path, &self.path).map_err(|e| format!("{}", e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entropy::ScriptedEntropy;

    fn account(seed: u8) -> AccountId {
        [seed; 32]
    }

    fn entropy() -> Box<dyn EntropySource> {
        Box::new(ScriptedEntropy::constant([0x42; 32]))
    }

    #[test]
    fn snapshot_round_trips_through_disk() {
        let mut app = SuretyApp::new(account(255), SuretyConfig::default(), entropy());
        app.register_airline(account(1)).unwrap();
        app.fund_airline(account(1), app.config.airline_funding_fee)
            .unwrap();
        let flight = app.register_flight(account(1), "BA49", 1700).unwrap();
        app.purchase_insurance(account(9), flight, 500_000_000)
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path()).unwrap();
        assert!(store.load().unwrap().is_none());

        store.save(&PersistedState::capture(&app)).unwrap();
        let restored = store.load().unwrap().unwrap().restore(entropy());

        assert_eq!(restored.registered_airlines(), 1);
        assert_eq!(
            restored.airlines.funding(&account(1)),
            app.airlines.funding(&account(1))
        );
        assert_eq!(
            restored.insurance.policy(&account(9)).unwrap().amount,
            500_000_000
        );
        assert!(restored.flights.contains(&flight));
        assert!(restored.is_operational());
    }
}
