// Oracle registrations and the open status-request table. Responses are
// appended per status code without deduplication (reference behavior), and a
// request stays open after quorum unless the close-on-finalize switch is on.
//
// Submission is split into validate and record so the caller can run the
// finalization hook's own preconditions between the two and keep the whole
// operation validate-then-apply.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::SuretyError;
use crate::flights::FlightStatus;
use crate::keys::{AccountId, Key};
use crate::ORACLE_INDEX_COUNT;

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct OracleRegistration {
    /// Exactly three distinct indices in [0, 10), immutable after assignment.
    pub indices: [u8; ORACLE_INDEX_COUNT],
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StatusRequest {
    pub requester: AccountId,
    pub airline: AccountId,
    pub flight_code: String,
    pub timestamp: u64,
    pub is_open: bool,
    pub responses: BTreeMap<FlightStatus, Vec<AccountId>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub responses_for_status: usize,
    pub finalized: bool,
}

#[derive(Clone, Debug, Default)]
pub struct OracleBoard {
    pub oracles: HashMap<AccountId, OracleRegistration>,
    pub requests: HashMap<Key, StatusRequest>,
}

impl OracleBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        oracle: AccountId,
        indices: [u8; ORACLE_INDEX_COUNT],
    ) -> Result<(), SuretyError> {
        if self.oracles.contains_key(&oracle) {
            return Err(SuretyError::AlreadyExists);
        }
        self.oracles.insert(oracle, OracleRegistration { indices });
        Ok(())
    }

    pub fn indices_of(&self, oracle: &AccountId) -> Result<[u8; ORACLE_INDEX_COUNT], SuretyError> {
        self.oracles
            .get(oracle)
            .map(|r| r.indices)
            .ok_or(SuretyError::NotFound)
    }

    /// Create (or overwrite, as the reference does) the request slot.
    pub fn open_request(
        &mut self,
        key: Key,
        requester: AccountId,
        airline: AccountId,
        flight_code: &str,
        timestamp: u64,
    ) {
        self.requests.insert(
            key,
            StatusRequest {
                requester,
                airline,
                flight_code: flight_code.to_string(),
                timestamp,
                is_open: true,
                responses: BTreeMap::new(),
            },
        );
    }

    /// Everything that can reject a submission without touching state.
    pub fn validate_submission(
        &self,
        oracle: &AccountId,
        index: u8,
        key: &Key,
    ) -> Result<(), SuretyError> {
        let registration = self.oracles.get(oracle).ok_or(SuretyError::Unauthorized)?;
        if !registration.indices.contains(&index) {
            return Err(SuretyError::IndexMismatch);
        }
        match self.requests.get(key) {
            Some(request) if request.is_open => Ok(()),
            _ => Err(SuretyError::RequestNotOpen),
        }
    }

    pub fn response_count(&self, key: &Key, status: FlightStatus) -> usize {
        self.requests
            .get(key)
            .and_then(|r| r.responses.get(&status))
            .map(|v| v.len())
            .unwrap_or(0)
    }

    /// Append a validated response; the caller has already run
    /// `validate_submission` and the finalization preconditions.
    pub fn record_response(
        &mut self,
        oracle: AccountId,
        key: &Key,
        status: FlightStatus,
        quorum: usize,
        close_on_finalize: bool,
    ) -> Result<SubmitOutcome, SuretyError> {
        let request = self.requests.get_mut(key).ok_or(SuretyError::RequestNotOpen)?;
        let voters = request.responses.entry(status).or_default();
        voters.push(oracle);
        let responses_for_status = voters.len();
        let finalized = responses_for_status >= quorum;
        if finalized && close_on_finalize {
            request.is_open = false;
        }
        Ok(SubmitOutcome {
            responses_for_status,
            finalized,
        })
    }

    pub fn request(&self, key: &Key) -> Option<&StatusRequest> {
        self.requests.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(seed: u8) -> AccountId {
        [seed; 32]
    }

    fn open_board() -> (OracleBoard, Key) {
        let mut board = OracleBoard::new();
        let key = [7u8; 32];
        board.open_request(key, account(50), account(1), "BA49", 1700);
        (board, key)
    }

    #[test]
    fn registration_is_one_shot() {
        let mut board = OracleBoard::new();
        board.register(account(1), [0, 3, 7]).unwrap();
        assert_eq!(board.register(account(1), [1, 2, 3]), Err(SuretyError::AlreadyExists));
        assert_eq!(board.indices_of(&account(1)), Ok([0, 3, 7]));
        assert_eq!(board.indices_of(&account(2)), Err(SuretyError::NotFound));
    }

    #[test]
    fn validation_rejects_wrong_index_and_missing_request() {
        let (mut board, key) = open_board();
        board.register(account(1), [0, 3, 7]).unwrap();

        assert_eq!(
            board.validate_submission(&account(9), 3, &key),
            Err(SuretyError::Unauthorized)
        );
        assert_eq!(
            board.validate_submission(&account(1), 4, &key),
            Err(SuretyError::IndexMismatch)
        );
        assert_eq!(
            board.validate_submission(&account(1), 3, &[0u8; 32]),
            Err(SuretyError::RequestNotOpen)
        );
        assert!(board.validate_submission(&account(1), 3, &key).is_ok());
    }

    #[test]
    fn quorum_fires_at_three_and_refires_when_left_open() {
        let (mut board, key) = open_board();
        for seed in 0..2u8 {
            let outcome = board
                .record_response(account(seed), &key, FlightStatus::LateAirline, 3, false)
                .unwrap();
            assert!(!outcome.finalized);
        }
        let third = board
            .record_response(account(2), &key, FlightStatus::LateAirline, 3, false)
            .unwrap();
        assert!(third.finalized);
        assert_eq!(third.responses_for_status, 3);

        // Request left open: a fourth same-status response finalizes again.
        let fourth = board
            .record_response(account(3), &key, FlightStatus::LateAirline, 3, false)
            .unwrap();
        assert!(fourth.finalized);
        assert!(board.request(&key).unwrap().is_open);
    }

    #[test]
    fn close_on_finalize_shuts_the_request() {
        let (mut board, key) = open_board();
        board.register(account(0), [0, 3, 7]).unwrap();
        for seed in 0..3u8 {
            board
                .record_response(account(seed), &key, FlightStatus::LateWeather, 3, true)
                .unwrap();
        }
        assert!(!board.request(&key).unwrap().is_open);
        assert_eq!(
            board.validate_submission(&account(0), 3, &key),
            Err(SuretyError::RequestNotOpen)
        );
    }

    #[test]
    fn statuses_are_tallied_independently() {
        let (mut board, key) = open_board();
        board
            .record_response(account(0), &key, FlightStatus::LateAirline, 3, false)
            .unwrap();
        board
            .record_response(account(1), &key, FlightStatus::OnTime, 3, false)
            .unwrap();
        assert_eq!(board.response_count(&key, FlightStatus::LateAirline), 1);
        assert_eq!(board.response_count(&key, FlightStatus::OnTime), 1);
        assert_eq!(board.response_count(&key, FlightStatus::LateOther), 0);
    }
}
