//! Native entity identifiers and their EVM address forms.

use std::fmt;
use std::str::FromStr;

use alloy::primitives::{Address, hex};
use serde::{Deserialize, Serialize};

use super::{CodecError, LedgerNetwork, checksum};

/// `shard.realm.num` triple shared by accounts, tokens and contracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct EntityId {
    /// Shard number (four bytes in the long-zero address).
    pub shard: u32,
    /// Realm number.
    pub realm: u64,
    /// Entity number.
    pub num: u64,
}

impl EntityId {
    /// Create an entity id from its components.
    #[must_use]
    pub const fn new(shard: u32, realm: u64, num: u64) -> Self {
        Self { shard, realm, num }
    }

    /// Long-zero solidity address: shard (4 bytes), realm (8), num (8), big-endian.
    #[must_use]
    pub fn to_solidity_address(&self) -> Address {
        let mut bytes = [0_u8; 20];
        bytes[..4].copy_from_slice(&self.shard.to_be_bytes());
        bytes[4..12].copy_from_slice(&self.realm.to_be_bytes());
        bytes[12..].copy_from_slice(&self.num.to_be_bytes());
        Address::from(bytes)
    }

    /// Decode a long-zero address into its shard, realm and num.
    ///
    /// Inverse of [`to_solidity_address`](Self::to_solidity_address). Any
    /// 20 bytes decode; whether they were a long-zero encoding in the first
    /// place is for the caller to decide.
    #[must_use]
    pub fn from_solidity_address(address: &Address) -> Self {
        let bytes = address.as_slice();
        let mut shard = [0_u8; 4];
        let mut realm = [0_u8; 8];
        let mut num = [0_u8; 8];
        shard.copy_from_slice(&bytes[..4]);
        realm.copy_from_slice(&bytes[4..12]);
        num.copy_from_slice(&bytes[12..]);
        Self::new(
            u32::from_be_bytes(shard),
            u64::from_be_bytes(realm),
            u64::from_be_bytes(num),
        )
    }

    /// Checksum of this id on `ledger`.
    #[must_use]
    pub fn checksum(&self, ledger: LedgerNetwork) -> String {
        checksum(ledger, &self.to_string())
    }

    /// Render as `shard.realm.num-xxxxx`.
    #[must_use]
    pub fn to_string_with_checksum(&self, ledger: LedgerNetwork) -> String {
        format!("{self}-{}", self.checksum(ledger))
    }

    /// Parse `shard.realm.num[-checksum]`, validating the checksum against
    /// `ledger` when both are present.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidEntityId`] for malformed input and
    /// [`CodecError::ChecksumMismatch`] when the suffix does not match.
    pub fn parse_checked(s: &str, ledger: Option<LedgerNetwork>) -> Result<Self, CodecError> {
        let (body, sum) = split_checksum(s)?;
        let id = parse_triple(body)?;
        if let (Some(sum), Some(ledger)) = (sum, ledger) {
            verify(&id.to_string(), sum, ledger)?;
        }
        Ok(id)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.shard, self.realm, self.num)
    }
}

impl FromStr for EntityId {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_checked(s, None)
    }
}

fn split_checksum(s: &str) -> Result<(&str, Option<&str>), CodecError> {
    let s = s.trim();
    match s.split_once('-') {
        None => Ok((s, None)),
        Some((body, sum)) if sum.len() == 5 && sum.chars().all(|c| c.is_ascii_lowercase()) => {
            Ok((body, Some(sum)))
        }
        Some(_) => Err(CodecError::InvalidEntityId(s.to_owned())),
    }
}

fn verify(body: &str, actual: &str, ledger: LedgerNetwork) -> Result<(), CodecError> {
    let expected = checksum(ledger, body);
    if expected == actual {
        Ok(())
    } else {
        Err(CodecError::ChecksumMismatch {
            id: body.to_owned(),
            expected,
            actual: actual.to_owned(),
        })
    }
}

fn parse_triple(body: &str) -> Result<EntityId, CodecError> {
    let invalid = || CodecError::InvalidEntityId(body.to_owned());
    let mut parts = body.split('.');
    let (Some(shard), Some(realm), Some(num), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(invalid());
    };
    Ok(EntityId {
        shard: parse_component(shard).ok_or_else(invalid)?,
        realm: parse_component(realm).ok_or_else(invalid)?,
        num: parse_component(num).ok_or_else(invalid)?,
    })
}

fn parse_component<T: FromStr>(s: &str) -> Option<T> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// A ledger account.
///
/// Accounts are addressed either by number (`0.0.1234`) or, for accounts
/// created from an ECDSA key, by an EVM alias (`0.0.<40 hex chars>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccountId {
    /// Shard number.
    pub shard: u32,
    /// Realm number.
    pub realm: u64,
    /// Account number; `0` for pure alias ids.
    pub num: u64,
    /// EVM alias, when the account is known by one.
    pub evm_address: Option<Address>,
}

impl AccountId {
    /// Numbered account in shard 0, realm 0.
    #[must_use]
    pub const fn from_num(num: u64) -> Self {
        Self {
            shard: 0,
            realm: 0,
            num,
            evm_address: None,
        }
    }

    /// Alias account in the given shard and realm.
    #[must_use]
    pub const fn from_evm_alias(shard: u32, realm: u64, evm_address: Address) -> Self {
        Self {
            shard,
            realm,
            num: 0,
            evm_address: Some(evm_address),
        }
    }

    /// The `shard.realm.num` part of this id.
    #[must_use]
    pub const fn entity(&self) -> EntityId {
        EntityId::new(self.shard, self.realm, self.num)
    }

    /// Address handed to EVM-style signers: the alias when present,
    /// otherwise the long-zero encoding.
    #[must_use]
    pub fn to_solidity_address(&self) -> Address {
        self.evm_address
            .unwrap_or_else(|| self.entity().to_solidity_address())
    }

    /// Lowercase, `0x`-prefixed, 42-character rendering of
    /// [`to_solidity_address`](Self::to_solidity_address).
    #[must_use]
    pub fn to_hex_address(&self) -> String {
        hex::encode_prefixed(self.to_solidity_address())
    }

    /// Recover a numbered account from a long-zero hex address.
    ///
    /// Only shard 0, realm 0 accounts are recognised: an address with any
    /// non-zero byte in its first twelve is indistinguishable from an EVM
    /// alias and yields `None`. Use [`EntityId::from_solidity_address`] to
    /// decode other shards and realms.
    #[must_use]
    pub fn from_solidity_address(address: &Address) -> Option<Self> {
        if address.as_slice()[..12].iter().any(|&b| b != 0) {
            return None;
        }
        Some(EntityId::from_solidity_address(address).into())
    }

    /// Parse a hex address (with or without `0x`) and recover the account.
    ///
    /// Same shard 0, realm 0 restriction as
    /// [`from_solidity_address`](Self::from_solidity_address).
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidAddress`] when `s` is not a 20-byte hex
    /// string. A well-formed address with no native mapping yields `Ok(None)`.
    pub fn from_hex_address(s: &str) -> Result<Option<Self>, CodecError> {
        let address = Address::from_str(s.trim())
            .map_err(|e| CodecError::InvalidAddress(format!("{s}: {e}")))?;
        Ok(Self::from_solidity_address(&address))
    }

    /// Parse an account id, validating a checksum suffix against `ledger`.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed ids or a checksum mismatch.
    pub fn parse_checked(s: &str, ledger: Option<LedgerNetwork>) -> Result<Self, CodecError> {
        let s = s.trim();
        if let Some(alias) = parse_alias(s)? {
            return Ok(alias);
        }
        EntityId::parse_checked(s, ledger).map(Self::from)
    }

    /// Render as `shard.realm.num-xxxxx`. Alias ids carry no checksum.
    #[must_use]
    pub fn to_string_with_checksum(&self, ledger: LedgerNetwork) -> String {
        if self.evm_address.is_some() {
            self.to_string()
        } else {
            self.entity().to_string_with_checksum(ledger)
        }
    }
}

fn parse_alias(s: &str) -> Result<Option<AccountId>, CodecError> {
    let mut parts = s.splitn(3, '.');
    let (Some(shard), Some(realm), Some(tail)) = (parts.next(), parts.next(), parts.next()) else {
        return Ok(None);
    };
    if tail.len() != 40 || !tail.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Ok(None);
    }
    let invalid = || CodecError::InvalidEntityId(s.to_owned());
    let address = Address::from_str(tail).map_err(|_| invalid())?;
    Ok(Some(AccountId::from_evm_alias(
        parse_component(shard).ok_or_else(invalid)?,
        parse_component(realm).ok_or_else(invalid)?,
        address,
    )))
}

impl From<EntityId> for AccountId {
    fn from(id: EntityId) -> Self {
        Self {
            shard: id.shard,
            realm: id.realm,
            num: id.num,
            evm_address: None,
        }
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.evm_address {
            Some(alias) => write!(f, "{}.{}.{}", self.shard, self.realm, hex::encode(alias)),
            None => write!(f, "{}", self.entity()),
        }
    }
}

impl FromStr for AccountId {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_checked(s, None)
    }
}

impl Serialize for AccountId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AccountId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A fungible or non-fungible token type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenId(pub EntityId);

impl TokenId {
    /// Token in shard 0, realm 0.
    #[must_use]
    pub const fn from_num(num: u64) -> Self {
        Self(EntityId::new(0, 0, num))
    }

    /// Address of the token's contract facade, used for contract invocation.
    #[must_use]
    pub fn to_contract_address(&self) -> Address {
        self.0.to_solidity_address()
    }

    /// Parse a token id, validating a checksum suffix against `ledger`.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed ids or a checksum mismatch.
    pub fn parse_checked(s: &str, ledger: Option<LedgerNetwork>) -> Result<Self, CodecError> {
        EntityId::parse_checked(s, ledger).map(Self)
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for TokenId {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

impl Serialize for TokenId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TokenId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
