//! Cryptographic primitives — ed25519 key pairs, deterministic signing,
//! verification, and the SHA-256 content hash.
//!
//! Nothing here mutates caller-supplied buffers, and nothing holds shared
//! state: a `Keypair` is a plain value safe to use from any thread.

pub mod strkey;

use ed25519_dalek::{Signature, Signer as _, SigningKey, Verifier as _, VerifyingKey};
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

use crate::crypto::strkey::Strkey;
use crate::error::CryptoError;
use crate::xdr::DecoratedSignature;

/// SHA-256 content hash: transaction hashing, network ids, hash-x signers.
pub fn hash(data: &[u8]) -> [u8; 32] {
    let digest = Sha256::digest(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

/// An ed25519 signing key pair.
pub struct Keypair {
    signing: SigningKey,
}

impl Keypair {
    /// Generate a fresh key pair from the OS RNG.
    pub fn generate() -> Self {
        Self {
            signing: SigningKey::generate(&mut OsRng),
        }
    }

    /// Import from a strkey secret seed (`S...`).
    pub fn from_secret_seed(seed: &str) -> Result<Self, CryptoError> {
        match Strkey::from_string(seed) {
            Ok(Strkey::PrivateKeyEd25519(raw)) => Ok(Self::from_raw_seed(raw)),
            _ => Err(CryptoError::InvalidSecretSeed),
        }
    }

    pub fn from_raw_seed(seed: [u8; 32]) -> Self {
        Self {
            signing: SigningKey::from_bytes(&seed),
        }
    }

    /// Raw public key bytes.
    pub fn public_key(&self) -> [u8; 32] {
        self.signing.verifying_key().to_bytes()
    }

    /// The `G...` account address.
    pub fn account_id(&self) -> String {
        Strkey::PublicKeyEd25519(self.public_key()).to_string()
    }

    /// The `S...` secret seed.
    pub fn secret_seed(&self) -> String {
        Strkey::PrivateKeyEd25519(self.signing.to_bytes()).to_string()
    }

    /// Deterministic ed25519 signature over `payload`.
    pub fn sign(&self, payload: &[u8]) -> [u8; 64] {
        self.signing.sign(payload).to_bytes()
    }

    /// Verify a signature made by this key pair's public key.
    pub fn verify(&self, payload: &[u8], signature: &[u8]) -> bool {
        verify(&self.public_key(), payload, signature)
    }

    /// Trailing 4 bytes of the public key, used to tag decorated signatures.
    pub fn signature_hint(&self) -> [u8; 4] {
        signature_hint(&self.public_key())
    }

    /// Sign and pair the signature with this key's hint.
    pub fn sign_decorated(&self, payload: &[u8]) -> DecoratedSignature {
        DecoratedSignature {
            hint: self.signature_hint(),
            signature: self.sign(payload).to_vec(),
        }
    }
}

impl std::fmt::Debug for Keypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print the secret.
        f.debug_struct("Keypair")
            .field("account_id", &self.account_id())
            .finish()
    }
}

/// Verify `signature` over `payload` against a raw ed25519 public key.
///
/// Returns `false` for malformed keys or signatures rather than erroring:
/// an unverifiable signature is simply not valid.
pub fn verify(public_key: &[u8; 32], payload: &[u8], signature: &[u8]) -> bool {
    let Ok(key) = VerifyingKey::from_bytes(public_key) else {
        return false;
    };
    let Ok(sig_bytes) = <[u8; 64]>::try_from(signature) else {
        return false;
    };
    let sig = Signature::from_bytes(&sig_bytes);
    key.verify(payload, &sig).is_ok()
}

/// Trailing 4 bytes of a public key.
pub fn signature_hint(public_key: &[u8; 32]) -> [u8; 4] {
    let mut hint = [0u8; 4];
    hint.copy_from_slice(&public_key[28..]);
    hint
}
