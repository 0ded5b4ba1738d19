//! Web authentication — challenge-response proof of key control.
//!
//! ## Flow
//!
//! 1. **Request** — `GET <endpoint>?account=...` returns a server-signed
//!    challenge transaction (base64 XDR).
//! 2. **Validate** — a fixed 13-point checklist runs in order and aborts on
//!    the first failure. Each check defends against a specific attack
//!    (account substitution, domain substitution, replay, stale-challenge
//!    reuse, wrong-network anchoring), so each failure has its own error.
//! 3. **Sign** — one signature per caller key over the challenge's signing
//!    hash; a declared client domain requires exactly one more signature,
//!    from a local key or a delegated [`ClientDomainSigner`].
//! 4. **Submit** — `POST {"transaction": ...}` exchanges the signed
//!    challenge for a bearer token. The engine holds no token state and
//!    never renews; expiry is the caller's concern.
//!
//! Only a [`ValidatedChallenge`] can be signed: a challenge that failed any
//! check never reaches a key.

pub mod client;
pub mod validate;

pub use client::{WebAuthClient, WebAuthConfig};
pub use validate::ValidatedChallenge;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;
use crate::xdr::DecoratedSignature;

/// Data key of the operation carrying the client-domain proof.
pub const CLIENT_DOMAIN_DATA_KEY: &str = "client_domain";

/// Data key of the operation pinning the authentication endpoint's host.
pub const WEB_AUTH_DOMAIN_DATA_KEY: &str = "web_auth_domain";

/// Clock-skew allowance around the challenge's validity window.
pub const DEFAULT_GRACE_PERIOD_SECS: u64 = 300;

// ── Wire types ───────────────────────────────────────────────────────────────

/// Response to a challenge request.
#[derive(Debug, Clone, Deserialize)]
pub struct ChallengeResponse {
    /// Base64-encoded challenge transaction envelope.
    pub transaction: String,
    /// If present, must equal the configured network's passphrase.
    pub network_passphrase: Option<String>,
}

/// Body of a challenge submission.
#[derive(Debug, Clone, Serialize)]
pub struct ChallengeSubmission {
    pub transaction: String,
}

/// Success body of a challenge submission.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Error body accompanying a non-2xx submission response.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ── Token ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
struct TokenClaims {
    sub: Option<String>,
    iat: Option<i64>,
    exp: Option<i64>,
}

/// A bearer credential returned after successful authentication.
///
/// The token is opaque; when it happens to be a decodable JWT, the subject
/// and timestamps are surfaced so callers can check expiry before reuse.
/// The engine itself never caches or renews tokens.
#[derive(Debug, Clone)]
pub struct AuthToken {
    token: String,
    pub subject: Option<String>,
    pub issued_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl AuthToken {
    /// Wrap a raw token, best-effort decoding JWT claims.
    pub fn parse(token: String) -> Self {
        let claims = decode_claims(&token);
        Self {
            subject: claims.as_ref().and_then(|c| c.sub.clone()),
            issued_at: claims.as_ref().and_then(|c| c.iat).and_then(to_datetime),
            expires_at: claims.as_ref().and_then(|c| c.exp).and_then(to_datetime),
            token,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.token
    }

    pub fn into_string(self) -> String {
        self.token
    }

    /// Whether the declared expiry has passed. Tokens without a decodable
    /// expiry are treated as unexpired; the server remains the authority.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(exp) => Utc::now() >= exp,
            None => false,
        }
    }
}

fn decode_claims(token: &str) -> Option<TokenClaims> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
    serde_json::from_slice(&bytes).ok()
}

fn to_datetime(secs: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(secs, 0).single()
}

// ── Delegated signing ────────────────────────────────────────────────────────

/// Strategy for producing the client-domain signature outside this process
/// (remote signing service, hardware module, wallet backend).
///
/// Receives the full base64 challenge envelope and returns one decorated
/// signature over its signing hash. May suspend on I/O; must resolve or
/// fail exactly once.
pub trait ClientDomainSigner {
    fn sign_challenge(
        &self,
        transaction_xdr: &str,
    ) -> impl std::future::Future<Output = Result<DecoratedSignature, AuthError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jwt_with_claims(claims: &str) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(claims.as_bytes());
        format!("{header}.{payload}.c2lnbmF0dXJl")
    }

    #[test]
    fn parses_jwt_claims() {
        let token = jwt_with_claims(r#"{"sub":"GABC","iat":1700000000,"exp":1700000900}"#);
        let parsed = AuthToken::parse(token.clone());
        assert_eq!(parsed.as_str(), token);
        assert_eq!(parsed.subject.as_deref(), Some("GABC"));
        assert_eq!(parsed.issued_at.unwrap().timestamp(), 1_700_000_000);
        assert_eq!(parsed.expires_at.unwrap().timestamp(), 1_700_000_900);
        assert!(parsed.is_expired());
    }

    #[test]
    fn far_future_expiry_is_not_expired() {
        let token = jwt_with_claims(r#"{"exp":32503680000}"#);
        assert!(!AuthToken::parse(token).is_expired());
    }

    #[test]
    fn opaque_token_is_usable_without_claims() {
        let parsed = AuthToken::parse("not-a-jwt".to_string());
        assert_eq!(parsed.as_str(), "not-a-jwt");
        assert!(parsed.subject.is_none());
        assert!(parsed.expires_at.is_none());
        assert!(!parsed.is_expired());
    }
}
