//! # Lumen SDK
//!
//! A Rust SDK for Stellar-compatible ledger networks: XDR wire codec,
//! transaction construction and multi-signature collection, and SEP-10
//! style challenge-response web authentication.
//!
//! ## Architecture
//!
//! The SDK is organized in layers:
//!
//! 1. **XDR** — binary wire codec and the transaction schema types
//! 2. **Crypto** — ed25519 keypairs, SHA-256 hashing, strkey addresses
//! 3. **Transactions** — builder, network-bound signing hashes, fee bumps
//! 4. **HTTP** — thin JSON client with per-request retry policies
//! 5. **Auth** — `WebAuthClient`, the challenge-response engine
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use lumen_sdk::prelude::*;
//!
//! let engine = WebAuthClient::new(WebAuthConfig::new(
//!     "https://auth.example.com/auth",
//!     "GSERVER...",
//!     "example.com",
//!     Network::testnet(),
//! ))?;
//!
//! let keypair = Keypair::from_secret_seed("SCLIENT...")?;
//! let token = engine.authenticate(&[&keypair], None, None).await?;
//! ```

// ── Layer 1: XDR ─────────────────────────────────────────────────────────────

/// Binary wire codec and transaction schema types.
pub mod xdr;

/// Unified SDK error types.
pub mod error;

// ── Layer 2: Crypto ──────────────────────────────────────────────────────────

/// Keypairs, hashing, and strkey addresses.
pub mod crypto;

/// Network identity via passphrase hashing.
pub mod network;

// ── Layer 3: Transactions ────────────────────────────────────────────────────

/// Transaction construction, signing, and fee bumps.
pub mod tx;

// ── Layer 4: HTTP ────────────────────────────────────────────────────────────

/// HTTP client with retry policies.
pub mod http;

// ── Layer 5: Auth ────────────────────────────────────────────────────────────

/// `WebAuthClient` — the challenge-response authentication engine.
pub mod auth;

// ── Prelude ──────────────────────────────────────────────────────────────────

pub mod prelude {
    // Codec traits + common schema types
    pub use crate::xdr::{
        Asset, DecoratedSignature, Memo, MuxedAccount, Operation, OperationBody, Preconditions,
        PublicKey, ReadXdr, TimeBounds, TransactionEnvelope, WriteXdr,
    };

    // Crypto
    pub use crate::crypto::strkey::Strkey;
    pub use crate::crypto::Keypair;

    // Network identity
    pub use crate::network::{Network, PUBLIC_NETWORK_PASSPHRASE, TESTNET_NETWORK_PASSPHRASE};

    // Transactions
    pub use crate::tx::{ops, FeeBumpTransaction, Transaction, TransactionBuilder, BASE_FEE};

    // Errors
    pub use crate::error::{AuthError, SdkError, TxError, XdrError};

    // Auth engine
    pub use crate::auth::{
        AuthToken, ClientDomainSigner, ValidatedChallenge, WebAuthClient, WebAuthConfig,
    };

    // HTTP retry policies
    pub use crate::http::{RetryConfig, RetryPolicy};
    #[cfg(feature = "http")]
    pub use crate::http::HttpClient;
}
