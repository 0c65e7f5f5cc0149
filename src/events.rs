// Notification stream consumed by external collaborators. The oracle relay
// subscribes to OracleRequestRaised and drives simulated responses back in
// through submit_oracle_response.

use serde::{Deserialize, Serialize};

use crate::flights::FlightStatus;
use crate::keys::{AccountId, Key};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    AirlineEnqueued {
        airline: AccountId,
    },
    AirlineRegistered {
        airline: AccountId,
    },
    AirlineFunded {
        airline: AccountId,
        amount: u64,
    },
    /// An enqueued airline reached the required consensus and registered.
    VotedInAirline {
        airline: AccountId,
        approvals: u64,
    },
    FlightRegistered {
        airline: AccountId,
        flight_code: String,
        timestamp: u64,
        key: Key,
    },
    OracleRequestRaised {
        index: u8,
        airline: AccountId,
        flight_code: String,
        timestamp: u64,
    },
    OracleResponseRecorded {
        airline: AccountId,
        flight_code: String,
        timestamp: u64,
        status: FlightStatus,
    },
    StatusFinalized {
        airline: AccountId,
        flight_code: String,
        timestamp: u64,
        status: FlightStatus,
    },
    CustomerCredited {
        customer: AccountId,
        amount: u64,
    },
    CreditsWithdrawn {
        customer: AccountId,
        amount: u64,
    },
}
