//! Address and amount codec.
//!
//! Pure conversions between the ledger's native `shard.realm.num` entity
//! identifiers and the 20-byte hexadecimal addresses EVM-style signers expect,
//! plus exact decimal ↔ base-unit amount conversion. Nothing in here performs
//! I/O.

mod checksum;
mod entity;
mod units;

pub use checksum::{LedgerNetwork, checksum};
pub use entity::{AccountId, EntityId, TokenId};
pub use units::{from_base_units, to_base_units};

/// Error type for identifier and amount conversions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum CodecError {
    /// The identifier string is not `shard.realm.num` (optionally checksummed
    /// or in alias form).
    #[error("Invalid entity id: {0}")]
    InvalidEntityId(String),

    /// The checksum suffix does not match the identifier for the given ledger.
    #[error("Checksum mismatch for {id}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// Identifier without its checksum.
        id: String,
        /// Checksum computed for the ledger.
        expected: String,
        /// Checksum supplied by the caller.
        actual: String,
    },

    /// The hexadecimal address could not be parsed.
    #[error("Invalid hex address: {0}")]
    InvalidAddress(String),

    /// The decimal amount is malformed.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// The amount is negative.
    #[error("Negative amount: {0}")]
    NegativeAmount(String),

    /// The amount has more fractional digits than the currency supports.
    #[error("Amount {amount} exceeds {decimals} decimal places")]
    ExcessPrecision {
        /// The amount as supplied.
        amount: String,
        /// Decimal places supported by the currency.
        decimals: u8,
    },

    /// The amount does not fit the target integer width.
    #[error("Amount out of range: {0}")]
    OutOfRange(String),
}
