// Composite key codec: canonical byte encoding -> SHA-256.
// Same inputs always produce the same key; no state, no IO.

use hex::FromHex;
use sha2::{Digest, Sha256};

/// Address-like participant identifier (airlines, customers, oracles, owner).
pub type AccountId = [u8; 32];

/// Derived lookup key for flights and status requests.
pub type Key = [u8; 32];

/// Canonical tuple encoding: fixed-width id, length-prefixed code bytes,
/// little-endian timestamp. The length prefix keeps ("AB", 1) and ("A", ...)
/// from colliding.
fn flight_tuple_bytes(airline: &AccountId, flight_code: &str, timestamp: u64) -> Vec<u8> {
    let code = flight_code.as_bytes();
    let mut out = Vec::with_capacity(32 + 8 + code.len() + 8);
    out.extend_from_slice(airline);
    out.extend_from_slice(&(code.len() as u64).to_le_bytes());
    out.extend_from_slice(code);
    out.extend_from_slice(&timestamp.to_le_bytes());
    out
}

/// Key addressing a registered flight.
pub fn flight_key(airline: &AccountId, flight_code: &str, timestamp: u64) -> Key {
    let mut h = Sha256::new();
    h.update(flight_tuple_bytes(airline, flight_code, timestamp));
    h.finalize().into()
}

/// Key addressing an open status request: the assigned index is part of the
/// identity, so requests for the same flight under different indices are
/// distinct slots.
pub fn request_key(index: u8, airline: &AccountId, flight_code: &str, timestamp: u64) -> Key {
    let mut h = Sha256::new();
    h.update([index]);
    h.update(flight_tuple_bytes(airline, flight_code, timestamp));
    h.finalize().into()
}

pub fn account_id_from_hex(hex_str: &str) -> Result<AccountId, String> {
    <[u8; 32]>::from_hex(hex_str).map_err(|_| "invalid account hex (expected 32 bytes)".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(seed: u8) -> AccountId {
        [seed; 32]
    }

    #[test]
    fn flight_key_is_deterministic() {
        let a = account(1);
        assert_eq!(flight_key(&a, "BA49", 1700), flight_key(&a, "BA49", 1700));
        assert_ne!(flight_key(&a, "BA49", 1700), flight_key(&a, "BA49", 1701));
        assert_ne!(flight_key(&a, "BA49", 1700), flight_key(&account(2), "BA49", 1700));
    }

    #[test]
    fn request_key_distinct_per_index() {
        let a = account(1);
        assert_ne!(
            request_key(3, &a, "BA49", 1700),
            request_key(4, &a, "BA49", 1700)
        );
        assert_ne!(request_key(3, &a, "BA49", 1700), flight_key(&a, "BA49", 1700));
    }

    #[test]
    fn code_length_is_part_of_identity() {
        let a = account(1);
        // "AB" + code-boundary ambiguity must not collide with "A" + shifted bytes.
        assert_ne!(flight_key(&a, "AB", 0), flight_key(&a, "A", 0));
    }

    #[test]
    fn parses_account_hex() {
        let hexed = "11".repeat(32);
        assert_eq!(account_id_from_hex(&hexed), Ok([0x11u8; 32]));
        assert!(account_id_from_hex("zz").is_err());
    }
}
