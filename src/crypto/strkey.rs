//! Strkey — the human-readable, checksummed address encoding.
//!
//! Layout: `[version byte][payload][CRC16-XMODEM, little-endian]`, rendered
//! as unpadded RFC 4648 base-32. The version byte encodes the key role and
//! determines the leading character (`G` accounts, `M` muxed accounts,
//! `S` seeds, `T` pre-auth-tx hashes, `X` hash-x signers, `C` contracts).

use std::fmt;
use std::str::FromStr;

use crate::error::StrkeyError;

const ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

/// A decoded strkey: role tag plus payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strkey {
    PublicKeyEd25519([u8; 32]),
    MuxedAccountEd25519 { ed25519: [u8; 32], id: u64 },
    PrivateKeyEd25519([u8; 32]),
    PreAuthTx([u8; 32]),
    HashX([u8; 32]),
    Contract([u8; 32]),
}

impl Strkey {
    pub const VERSION_ACCOUNT: u8 = 6 << 3; // G
    pub const VERSION_MUXED_ACCOUNT: u8 = 12 << 3; // M
    pub const VERSION_SEED: u8 = 18 << 3; // S
    pub const VERSION_PRE_AUTH_TX: u8 = 19 << 3; // T
    pub const VERSION_HASH_X: u8 = 23 << 3; // X
    pub const VERSION_CONTRACT: u8 = 2 << 3; // C

    pub fn version_byte(&self) -> u8 {
        match self {
            Strkey::PublicKeyEd25519(_) => Self::VERSION_ACCOUNT,
            Strkey::MuxedAccountEd25519 { .. } => Self::VERSION_MUXED_ACCOUNT,
            Strkey::PrivateKeyEd25519(_) => Self::VERSION_SEED,
            Strkey::PreAuthTx(_) => Self::VERSION_PRE_AUTH_TX,
            Strkey::HashX(_) => Self::VERSION_HASH_X,
            Strkey::Contract(_) => Self::VERSION_CONTRACT,
        }
    }

    fn payload(&self) -> Vec<u8> {
        match self {
            Strkey::PublicKeyEd25519(k)
            | Strkey::PrivateKeyEd25519(k)
            | Strkey::PreAuthTx(k)
            | Strkey::HashX(k)
            | Strkey::Contract(k) => k.to_vec(),
            Strkey::MuxedAccountEd25519 { ed25519, id } => {
                let mut p = Vec::with_capacity(40);
                p.extend_from_slice(ed25519);
                p.extend_from_slice(&id.to_be_bytes());
                p
            }
        }
    }

    pub fn from_string(s: &str) -> Result<Self, StrkeyError> {
        let raw = base32_decode(s.as_bytes())?;
        if raw.len() < 3 {
            return Err(StrkeyError::InvalidLength(raw.len()));
        }
        let (body, checksum_bytes) = raw.split_at(raw.len() - 2);
        let expected = crc16_xmodem(body);
        let actual = u16::from_le_bytes([checksum_bytes[0], checksum_bytes[1]]);
        if expected != actual {
            return Err(StrkeyError::ChecksumMismatch { expected, actual });
        }

        let version = body[0];
        let payload = &body[1..];
        match version {
            Self::VERSION_ACCOUNT => Ok(Strkey::PublicKeyEd25519(payload_32(payload)?)),
            Self::VERSION_SEED => Ok(Strkey::PrivateKeyEd25519(payload_32(payload)?)),
            Self::VERSION_PRE_AUTH_TX => Ok(Strkey::PreAuthTx(payload_32(payload)?)),
            Self::VERSION_HASH_X => Ok(Strkey::HashX(payload_32(payload)?)),
            Self::VERSION_CONTRACT => Ok(Strkey::Contract(payload_32(payload)?)),
            Self::VERSION_MUXED_ACCOUNT => {
                if payload.len() != 40 {
                    return Err(StrkeyError::InvalidLength(payload.len()));
                }
                let mut ed25519 = [0u8; 32];
                ed25519.copy_from_slice(&payload[..32]);
                let mut id_bytes = [0u8; 8];
                id_bytes.copy_from_slice(&payload[32..]);
                Ok(Strkey::MuxedAccountEd25519 {
                    ed25519,
                    id: u64::from_be_bytes(id_bytes),
                })
            }
            v => Err(StrkeyError::UnknownVersionByte(v)),
        }
    }
}

impl fmt::Display for Strkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut raw = Vec::with_capacity(43);
        raw.push(self.version_byte());
        raw.extend_from_slice(&self.payload());
        let checksum = crc16_xmodem(&raw);
        raw.extend_from_slice(&checksum.to_le_bytes());
        f.write_str(&base32_encode(&raw))
    }
}

impl FromStr for Strkey {
    type Err = StrkeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Strkey::from_string(s)
    }
}

fn payload_32(payload: &[u8]) -> Result<[u8; 32], StrkeyError> {
    if payload.len() != 32 {
        return Err(StrkeyError::InvalidLength(payload.len()));
    }
    let mut out = [0u8; 32];
    out.copy_from_slice(payload);
    Ok(out)
}

/// CRC16-XMODEM: polynomial 0x1021, initial value 0.
pub(crate) fn crc16_xmodem(data: &[u8]) -> u16 {
    let mut crc: u16 = 0;
    for &byte in data {
        crc ^= (byte as u16) << 8;
        for _ in 0..8 {
            if crc & 0x8000 != 0 {
                crc = (crc << 1) ^ 0x1021;
            } else {
                crc <<= 1;
            }
        }
    }
    crc
}

pub(crate) fn base32_encode(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len() * 8 / 5 + 1);
    let mut bits: u32 = 0;
    let mut bit_count: u32 = 0;
    for &byte in data {
        bits = (bits << 8) | byte as u32;
        bit_count += 8;
        while bit_count >= 5 {
            bit_count -= 5;
            out.push(ALPHABET[((bits >> bit_count) & 0x1f) as usize] as char);
        }
    }
    if bit_count > 0 {
        out.push(ALPHABET[((bits << (5 - bit_count)) & 0x1f) as usize] as char);
    }
    out
}

pub(crate) fn base32_decode(s: &[u8]) -> Result<Vec<u8>, StrkeyError> {
    let mut out = Vec::with_capacity(s.len() * 5 / 8);
    let mut bits: u32 = 0;
    let mut bit_count: u32 = 0;
    for &c in s {
        let value = ALPHABET
            .iter()
            .position(|&a| a == c)
            .ok_or(StrkeyError::InvalidBase32)? as u32;
        bits = (bits << 5) | value;
        bit_count += 5;
        if bit_count >= 8 {
            bit_count -= 8;
            out.push((bits >> bit_count) as u8);
        }
    }
    // Leftover bits are the encoder's zero fill; anything else means the
    // string was not produced by a canonical encoder.
    if bits & ((1 << bit_count) - 1) != 0 {
        return Err(StrkeyError::InvalidBase32);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_roundtrip() {
        let key = Strkey::PublicKeyEd25519([0x3f; 32]);
        let s = key.to_string();
        assert_eq!(s.len(), 56);
        assert!(s.starts_with('G'));
        assert_eq!(Strkey::from_string(&s).unwrap(), key);
    }

    #[test]
    fn seed_roundtrip() {
        let key = Strkey::PrivateKeyEd25519([0xa1; 32]);
        let s = key.to_string();
        assert!(s.starts_with('S'));
        assert_eq!(Strkey::from_string(&s).unwrap(), key);
    }

    #[test]
    fn muxed_account_roundtrip() {
        let key = Strkey::MuxedAccountEd25519 {
            ed25519: [0x11; 32],
            id: 9_223_372_036_854_775_808,
        };
        let s = key.to_string();
        assert_eq!(s.len(), 69);
        assert!(s.starts_with('M'));
        assert_eq!(Strkey::from_string(&s).unwrap(), key);
    }

    #[test]
    fn every_checksum_bit_flip_is_rejected() {
        let key = Strkey::PublicKeyEd25519([0x77; 32]);
        let mut raw = vec![key.version_byte()];
        raw.extend_from_slice(&key.payload());
        let checksum = crc16_xmodem(&raw);
        raw.extend_from_slice(&checksum.to_le_bytes());

        let len = raw.len();
        for byte_idx in len - 2..len {
            for bit in 0..8 {
                let mut corrupted = raw.clone();
                corrupted[byte_idx] ^= 1 << bit;
                let s = base32_encode(&corrupted);
                assert!(matches!(
                    Strkey::from_string(&s),
                    Err(StrkeyError::ChecksumMismatch { .. })
                ));
            }
        }
    }

    #[test]
    fn corrupted_payload_fails_checksum() {
        let key = Strkey::PreAuthTx([0x55; 32]);
        let mut raw = vec![key.version_byte()];
        raw.extend_from_slice(&key.payload());
        let checksum = crc16_xmodem(&raw);
        raw.extend_from_slice(&checksum.to_le_bytes());
        raw[5] ^= 0x01;
        let s = base32_encode(&raw);
        assert!(matches!(
            Strkey::from_string(&s),
            Err(StrkeyError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn invalid_characters_are_rejected() {
        assert_eq!(
            Strkey::from_string("G!!!"),
            Err(StrkeyError::InvalidBase32)
        );
        // 0 and 1 are not in the RFC 4648 base-32 alphabet.
        assert_eq!(
            Strkey::from_string("G0G1"),
            Err(StrkeyError::InvalidBase32)
        );
    }

    #[test]
    fn unknown_version_byte_is_rejected() {
        let mut raw = vec![11 << 3];
        raw.extend_from_slice(&[0u8; 32]);
        let checksum = crc16_xmodem(&raw);
        raw.extend_from_slice(&checksum.to_le_bytes());
        let s = base32_encode(&raw);
        assert_eq!(
            Strkey::from_string(&s),
            Err(StrkeyError::UnknownVersionByte(11 << 3))
        );
    }

    #[test]
    fn crc16_xmodem_known_answer() {
        // CRC-16/XMODEM check value for "123456789".
        assert_eq!(crc16_xmodem(b"123456789"), 0x31c3);
    }
}
