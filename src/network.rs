//! Network identity — a passphrase hashed once into a 32-byte network id.
//!
//! The network id domain-separates every signature: the same key and
//! payload signed under two different networks produce different,
//! mutually unverifiable signatures.

use crate::crypto::hash;

/// Passphrase of the public production network.
pub const PUBLIC_NETWORK_PASSPHRASE: &str = "Public Global Stellar Network ; September 2015";

/// Passphrase of the test network.
pub const TESTNET_NETWORK_PASSPHRASE: &str = "Test SDF Network ; September 2015";

/// A named network, identified by its passphrase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Network {
    passphrase: String,
}

impl Network {
    pub fn new(passphrase: impl Into<String>) -> Self {
        Self {
            passphrase: passphrase.into(),
        }
    }

    pub fn public() -> Self {
        Self::new(PUBLIC_NETWORK_PASSPHRASE)
    }

    pub fn testnet() -> Self {
        Self::new(TESTNET_NETWORK_PASSPHRASE)
    }

    pub fn passphrase(&self) -> &str {
        &self.passphrase
    }

    /// SHA-256 of the UTF-8 passphrase bytes. Computed from nothing else.
    pub fn network_id(&self) -> [u8; 32] {
        hash(self.passphrase.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn testnet_network_id_known_answer() {
        assert_eq!(
            hex::encode(Network::testnet().network_id()),
            "cee0302d59844d32bdca915c8203dd44b33fbb7edc19051ea37abedf28ecd472"
        );
    }

    #[test]
    fn different_passphrases_produce_different_ids() {
        assert_ne!(
            Network::public().network_id(),
            Network::testnet().network_id()
        );
    }

    #[test]
    fn network_id_is_stable() {
        let n = Network::new("My Private Network ; 2026");
        assert_eq!(n.network_id(), n.network_id());
    }
}
