use thiserror::Error;

/// Every operation either commits or fails with one of these; there are no
/// silent no-ops and no partial mutation before a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SuretyError {
    /// Contract paused by the owner; only the operational toggle is allowed.
    #[error("contract is not operational")]
    NotOperational,
    /// Caller lacks the role the operation requires.
    #[error("caller is not authorized for this operation")]
    Unauthorized,
    /// Flight or oracle re-registration with an existing key.
    #[error("entity already exists")]
    AlreadyExists,
    /// Unknown airline, flight, request, or oracle.
    #[error("entity not found")]
    NotFound,
    /// Submitted index is not one of the oracle's assigned indices.
    #[error("index does not match oracle registration")]
    IndexMismatch,
    /// No open status request under the derived key.
    #[error("status request is not open")]
    RequestNotOpen,
    /// Insurance amount outside (0, max_insure_fee].
    #[error("insurance amount out of bounds")]
    InvalidAmount,
    /// Fee below the configured threshold, or airline not yet funded.
    #[error("funding below required fee")]
    InsufficientFunding,
    /// Airline funding cannot cover the total payout; the reference let the
    /// balance underflow instead.
    #[error("airline funds insufficient for payout")]
    InsufficientAirlineFunds,
    /// Withdraw on a zero or absent credit balance.
    #[error("nothing to withdraw")]
    NothingToWithdraw,
}
