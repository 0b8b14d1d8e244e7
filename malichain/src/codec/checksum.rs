//! Entity id checksums (HIP-15).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::CodecError;

const P3: u64 = 26 * 26 * 26;
const P5: u64 = 26 * 26 * 26 * 26 * 26;
const M: u64 = 1_000_003;
const W: u64 = 31;

/// Ledger network a checksum is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerNetwork {
    /// Production network (ledger id `0x00`).
    Mainnet,
    /// Public test network (ledger id `0x01`).
    #[default]
    Testnet,
    /// Preview network (ledger id `0x02`).
    Previewnet,
}

impl LedgerNetwork {
    /// Single-byte ledger id mixed into the checksum.
    #[must_use]
    pub const fn ledger_id(self) -> u8 {
        match self {
            Self::Mainnet => 0,
            Self::Testnet => 1,
            Self::Previewnet => 2,
        }
    }

    /// Lowercase network name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
            Self::Previewnet => "previewnet",
        }
    }
}

impl fmt::Display for LedgerNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LedgerNetwork {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Self::Mainnet),
            "testnet" => Ok(Self::Testnet),
            "previewnet" => Ok(Self::Previewnet),
            other => Err(CodecError::InvalidEntityId(format!(
                "unknown ledger network '{other}'"
            ))),
        }
    }
}

/// Compute the five-letter checksum of a `shard.realm.num` string.
///
/// `address` must consist of ASCII digits and dots only; callers pass the
/// canonical rendering of an [`EntityId`](super::EntityId).
#[must_use]
pub fn checksum(ledger: LedgerNetwork, address: &str) -> String {
    let digits: Vec<u64> = address
        .bytes()
        .map(|b| if b == b'.' { 10 } else { u64::from(b.wrapping_sub(b'0')) })
        .collect();

    let (mut sd0, mut sd1, mut sd) = (0_u64, 0_u64, 0_u64);
    for (i, d) in digits.iter().enumerate() {
        sd = (W * sd + d) % P3;
        if i % 2 == 0 {
            sd0 = (sd0 + d) % 11;
        } else {
            sd1 = (sd1 + d) % 11;
        }
    }

    // Ledger id followed by six zero bytes.
    let mut sh = 0_u64;
    for b in [ledger.ledger_id(), 0, 0, 0, 0, 0, 0] {
        sh = (W * sh + u64::from(b)) % P5;
    }

    let len = digits.len() as u64;
    let c = ((((len % 5) * 11 + sd0) * 11 + sd1) * P3 + sd + sh) % P5;
    let mut cp = (c * M) % P5;

    let mut letters = [b'a'; 5];
    for slot in letters.iter_mut().rev() {
        // cp % 26 < 26
        *slot = b'a' + u8::try_from(cp % 26).unwrap_or(0);
        cp /= 26;
    }
    letters.iter().map(|&b| char::from(b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_mainnet_checksum() {
        assert_eq!(checksum(LedgerNetwork::Mainnet, "0.0.123"), "vfmkw");
    }

    #[test]
    fn test_checksum_depends_on_ledger() {
        let main = checksum(LedgerNetwork::Mainnet, "0.0.123");
        let test = checksum(LedgerNetwork::Testnet, "0.0.123");
        let preview = checksum(LedgerNetwork::Previewnet, "0.0.123");
        assert_ne!(main, test);
        assert_ne!(test, preview);
    }

    #[test]
    fn test_checksum_shape() {
        let sum = checksum(LedgerNetwork::Testnet, "0.0.4515311");
        assert_eq!(sum.len(), 5);
        assert!(sum.chars().all(|c| c.is_ascii_lowercase()));
    }

    #[test]
    fn test_ledger_network_parse() {
        assert_eq!("Testnet".parse::<LedgerNetwork>().unwrap(), LedgerNetwork::Testnet);
        assert!("devnet".parse::<LedgerNetwork>().is_err());
    }
}
