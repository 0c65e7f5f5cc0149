// Flight registry: one-shot creation per derived key, no update path.
// Status is written only by the consensus-finalization path.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::SuretyError;
use crate::keys::{flight_key, AccountId, Key};

/// Reference status codes (multiples of ten).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FlightStatus {
    Unknown,
    OnTime,
    LateAirline,
    LateWeather,
    LateTechnical,
    LateOther,
}

impl FlightStatus {
    pub fn code(self) -> u8 {
        match self {
            FlightStatus::Unknown => 0,
            FlightStatus::OnTime => 10,
            FlightStatus::LateAirline => 20,
            FlightStatus::LateWeather => 30,
            FlightStatus::LateTechnical => 40,
            FlightStatus::LateOther => 50,
        }
    }

    /// Unknown and OnTime produce no payout.
    pub fn is_payable(self) -> bool {
        !matches!(self, FlightStatus::Unknown | FlightStatus::OnTime)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Flight {
    pub airline: AccountId,
    pub flight_code: String,
    pub timestamp: u64,
    pub status: FlightStatus,
}

#[derive(Clone, Debug, Default)]
pub struct FlightRegistry {
    pub flights: HashMap<Key, Flight>,
}

impl FlightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        airline: AccountId,
        flight_code: &str,
        timestamp: u64,
    ) -> Result<Key, SuretyError> {
        let key = flight_key(&airline, flight_code, timestamp);
        if self.flights.contains_key(&key) {
            return Err(SuretyError::AlreadyExists);
        }
        self.flights.insert(
            key,
            Flight {
                airline,
                flight_code: flight_code.to_string(),
                timestamp,
                status: FlightStatus::Unknown,
            },
        );
        Ok(key)
    }

    pub fn set_status(&mut self, key: &Key, status: FlightStatus) -> Result<(), SuretyError> {
        let flight = self.flights.get_mut(key).ok_or(SuretyError::NotFound)?;
        flight.status = status;
        Ok(())
    }

    pub fn get(&self, key: &Key) -> Option<&Flight> {
        self.flights.get(key)
    }

    pub fn contains(&self, key: &Key) -> bool {
        self.flights.contains_key(key)
    }
}
