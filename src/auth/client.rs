//! Challenge-response authentication engine.
//!
//! [`WebAuthClient`] drives the full flow against one endpoint: request a
//! challenge, validate it, counter-sign it, exchange it for a token. The
//! validation and signing phases are pure and always compiled; the two
//! network phases require the `http` feature.

use chrono::Utc;
use url::Url;

use crate::auth::validate::{validate_challenge_at, ChallengeExpectations, ValidatedChallenge};
use crate::auth::{ClientDomainSigner, DEFAULT_GRACE_PERIOD_SECS};
use crate::crypto::Keypair;
use crate::error::{AuthError, SdkError};
use crate::network::Network;
use crate::xdr::{MuxedAccount, PublicKey};

#[cfg(feature = "http")]
use crate::auth::{
    AuthToken, ChallengeResponse, ChallengeSubmission, ErrorResponse, TokenResponse,
};
#[cfg(feature = "http")]
use crate::error::HttpError;
#[cfg(feature = "http")]
use crate::http::{HttpClient, RetryPolicy};

/// Static configuration for one authentication endpoint.
///
/// `server_signing_key` is the `G...` address published by the server (for
/// example in its TOML metadata); every challenge must carry exactly one
/// signature by this key.
#[derive(Debug, Clone)]
pub struct WebAuthConfig {
    /// Full URL of the authentication endpoint.
    pub auth_endpoint: String,
    /// The server's published signing key, as a `G...` address.
    pub server_signing_key: String,
    /// Domain the challenge's first operation must name.
    pub home_domain: String,
    pub network: Network,
    /// Clock-skew allowance applied to the challenge's validity window.
    pub grace_period_secs: u64,
}

impl WebAuthConfig {
    pub fn new(
        auth_endpoint: impl Into<String>,
        server_signing_key: impl Into<String>,
        home_domain: impl Into<String>,
        network: Network,
    ) -> Self {
        Self {
            auth_endpoint: auth_endpoint.into(),
            server_signing_key: server_signing_key.into(),
            home_domain: home_domain.into(),
            network,
            grace_period_secs: DEFAULT_GRACE_PERIOD_SECS,
        }
    }

    pub fn grace_period_secs(mut self, secs: u64) -> Self {
        self.grace_period_secs = secs;
        self
    }
}

/// The authentication engine. Holds no token state; each call to
/// [`WebAuthClient::authenticate`] runs the whole flow from scratch.
#[derive(Debug, Clone)]
pub struct WebAuthClient {
    endpoint: Url,
    server_key: [u8; 32],
    server_account_id: String,
    home_domain: String,
    network: Network,
    grace_period_secs: u64,
    /// Endpoint host with any non-default port, pinned by the
    /// `web_auth_domain` operation.
    web_auth_host: String,
    #[cfg(feature = "http")]
    http: HttpClient,
}

impl WebAuthClient {
    pub fn new(config: WebAuthConfig) -> Result<Self, SdkError> {
        let endpoint = Url::parse(&config.auth_endpoint)
            .map_err(|e| SdkError::Other(format!("invalid auth endpoint: {e}")))?;
        let host = endpoint
            .host_str()
            .ok_or_else(|| SdkError::Other("auth endpoint has no host".to_string()))?;
        // Url::port() is None when the port is the scheme default.
        let web_auth_host = match endpoint.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        let PublicKey::Ed25519(server_key) = PublicKey::from_address(&config.server_signing_key)?;

        Ok(Self {
            endpoint,
            server_key,
            server_account_id: config.server_signing_key,
            home_domain: config.home_domain,
            network: config.network,
            grace_period_secs: config.grace_period_secs,
            web_auth_host,
            #[cfg(feature = "http")]
            http: HttpClient::new(),
        })
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn home_domain(&self) -> &str {
        &self.home_domain
    }

    /// Run the full checklist against a received challenge. The clock is
    /// sampled once, here.
    ///
    /// `memo` and `client_domain_account` must repeat what was sent with the
    /// challenge request; the challenge is rejected if it disagrees.
    pub fn validate_challenge(
        &self,
        challenge_xdr: &str,
        account: &str,
        memo: Option<u64>,
        client_domain_account: Option<&str>,
    ) -> Result<ValidatedChallenge, SdkError> {
        let client_account = MuxedAccount::from_address(account)?;
        let expectations = ChallengeExpectations {
            network: &self.network,
            server_signing_key: &self.server_key,
            server_account_id: &self.server_account_id,
            home_domain: &self.home_domain,
            web_auth_host: &self.web_auth_host,
            client_account: &client_account,
            expected_memo: memo,
            client_domain_account,
            grace_period_secs: self.grace_period_secs,
        };
        validate_challenge_at(&expectations, challenge_xdr, Utc::now())
    }

    /// Counter-sign a validated challenge with local keys, one signature
    /// per key, preserving the server's signature.
    ///
    /// Fails if the challenge declared a client domain; that signature must
    /// come from [`Self::sign_challenge_with_client_domain_key`] or
    /// [`Self::sign_challenge_with_client_domain_signer`].
    pub fn sign_challenge(
        &self,
        challenge: &ValidatedChallenge,
        signers: &[&Keypair],
    ) -> Result<String, SdkError> {
        if challenge.client_domain_account().is_some() {
            return Err(AuthError::ClientDomainSignerRequired.into());
        }
        let mut tx = challenge.transaction().clone();
        for kp in signers {
            tx.sign(kp, &self.network)?;
        }
        Ok(tx.to_xdr_base64()?)
    }

    /// Counter-sign with local keys plus a locally held client-domain key.
    pub fn sign_challenge_with_client_domain_key(
        &self,
        challenge: &ValidatedChallenge,
        signers: &[&Keypair],
        client_domain_key: &Keypair,
    ) -> Result<String, SdkError> {
        let declared = challenge
            .client_domain_account()
            .ok_or(AuthError::ClientDomainNotDeclared)?;
        if client_domain_key.account_id() != declared {
            return Err(AuthError::ClientDomainAccountMismatch {
                expected: declared.to_string(),
                actual: client_domain_key.account_id(),
            }
            .into());
        }
        let mut tx = challenge.transaction().clone();
        for kp in signers {
            tx.sign(kp, &self.network)?;
        }
        tx.sign(client_domain_key, &self.network)?;
        Ok(tx.to_xdr_base64()?)
    }

    /// Counter-sign with local keys plus a delegated client-domain signer.
    ///
    /// The signer receives the challenge exactly as received from the
    /// server, so it can run its own validation before signing.
    pub async fn sign_challenge_with_client_domain_signer<S: ClientDomainSigner>(
        &self,
        challenge: &ValidatedChallenge,
        signers: &[&Keypair],
        client_domain_signer: &S,
    ) -> Result<String, SdkError> {
        if challenge.client_domain_account().is_none() {
            return Err(AuthError::ClientDomainNotDeclared.into());
        }
        let signature = client_domain_signer
            .sign_challenge(challenge.transaction_xdr())
            .await
            .map_err(|e| AuthError::DelegatedSignerFailed(e.to_string()))?;
        let mut tx = challenge.transaction().clone();
        for kp in signers {
            tx.sign(kp, &self.network)?;
        }
        tx.append_signature(signature)?;
        Ok(tx.to_xdr_base64()?)
    }
}

#[cfg(feature = "http")]
impl WebAuthClient {
    /// Request a challenge for `account`. GET is idempotent, so transient
    /// failures are retried with backoff.
    ///
    /// `home_domain` overrides the configured domain for servers that issue
    /// challenges for several domains.
    pub async fn request_challenge(
        &self,
        account: &str,
        memo: Option<u64>,
        home_domain: Option<&str>,
        client_domain: Option<&str>,
    ) -> Result<String, SdkError> {
        // A memo cannot disambiguate a muxed account; refuse before any I/O.
        if memo.is_some() && MuxedAccount::from_address(account)?.is_muxed() {
            return Err(AuthError::MemoWithMuxedAccount.into());
        }

        let mut url = self.endpoint.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("account", account);
            query.append_pair("home_domain", home_domain.unwrap_or(&self.home_domain));
            if let Some(memo) = memo {
                query.append_pair("memo", &memo.to_string());
            }
            if let Some(domain) = client_domain {
                query.append_pair("client_domain", domain);
            }
        }

        tracing::debug!(account, home_domain = %self.home_domain, "requesting challenge");
        let response: ChallengeResponse = self
            .http
            .get_json(url.as_str(), RetryPolicy::Idempotent)
            .await
            .map_err(SdkError::Http)?;

        if let Some(passphrase) = &response.network_passphrase {
            if passphrase != self.network.passphrase() {
                return Err(AuthError::NetworkPassphraseMismatch {
                    expected: self.network.passphrase().to_string(),
                    actual: passphrase.clone(),
                }
                .into());
            }
        }

        Ok(response.transaction)
    }

    /// Exchange a fully signed challenge for a token. Never retried; the
    /// server decides whether a replayed challenge is acceptable.
    pub async fn submit_challenge(&self, signed_xdr: String) -> Result<AuthToken, SdkError> {
        tracing::debug!("submitting signed challenge");
        let body = ChallengeSubmission {
            transaction: signed_xdr,
        };
        let result: Result<TokenResponse, HttpError> =
            self.http.post_json(self.endpoint.as_str(), &body).await;

        match result {
            Ok(resp) => Ok(AuthToken::parse(resp.token)),
            Err(HttpError::BadRequest { status, body }) => {
                Err(AuthError::SubmissionRejected {
                    status,
                    message: rejection_message(&body),
                }
                .into())
            }
            Err(HttpError::Unauthorized { body }) => Err(AuthError::SubmissionRejected {
                status: 401,
                message: rejection_message(&body),
            }
            .into()),
            Err(e) => Err(SdkError::Http(e)),
        }
    }

    /// The whole flow in one call, for accounts without a client domain:
    /// request, validate, sign with every key in `signers`, submit.
    ///
    /// `account` defaults to the address of the first signer.
    pub async fn authenticate(
        &self,
        signers: &[&Keypair],
        account: Option<&str>,
        memo: Option<u64>,
    ) -> Result<AuthToken, SdkError> {
        let first = signers
            .first()
            .ok_or_else(|| SdkError::Other("authenticate requires at least one signer".into()))?;
        let account = match account {
            Some(a) => a.to_string(),
            None => first.account_id(),
        };

        let challenge_xdr = self.request_challenge(&account, memo, None, None).await?;
        let validated = self.validate_challenge(&challenge_xdr, &account, memo, None)?;
        let signed = self.sign_challenge(&validated, signers)?;
        self.submit_challenge(signed).await
    }
}

#[cfg(feature = "http")]
fn rejection_message(body: &str) -> String {
    serde_json::from_str::<ErrorResponse>(body)
        .map(|e| e.error)
        .unwrap_or_else(|_| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xdr::{Memo, MuxedAccount, Operation, OperationBody};
    use crate::tx::Transaction;

    fn server_keypair() -> Keypair {
        Keypair::from_raw_seed([91u8; 32])
    }

    fn client_keypair() -> Keypair {
        Keypair::from_raw_seed([92u8; 32])
    }

    fn engine(endpoint: &str) -> WebAuthClient {
        WebAuthClient::new(WebAuthConfig::new(
            endpoint,
            server_keypair().account_id(),
            "example.com",
            Network::testnet(),
        ))
        .unwrap()
    }

    fn challenge_xdr(
        server: &Keypair,
        client: &Keypair,
        web_auth_host: &str,
        client_domain_source: Option<&Keypair>,
    ) -> String {
        let now = Utc::now().timestamp() as u64;
        let mut builder = Transaction::builder(MuxedAccount::Ed25519(server.public_key()), 0)
            .time_bounds(now - 10, now + 300)
            .add_operation(Operation {
                source_account: Some(MuxedAccount::Ed25519(client.public_key())),
                body: OperationBody::ManageData {
                    data_name: "example.com auth".into(),
                    data_value: Some(vec![7u8; 48]),
                },
            })
            .add_operation(Operation {
                source_account: Some(MuxedAccount::Ed25519(server.public_key())),
                body: OperationBody::ManageData {
                    data_name: "web_auth_domain".into(),
                    data_value: Some(web_auth_host.as_bytes().to_vec()),
                },
            });
        if let Some(domain_kp) = client_domain_source {
            builder = builder.add_operation(Operation {
                source_account: Some(MuxedAccount::Ed25519(domain_kp.public_key())),
                body: OperationBody::ManageData {
                    data_name: "client_domain".into(),
                    data_value: Some(b"wallet.example".to_vec()),
                },
            });
        }
        let mut tx = builder.memo(Memo::None).build().unwrap();
        tx.sign(server, &Network::testnet()).unwrap();
        tx.to_xdr_base64().unwrap()
    }

    #[test]
    fn endpoint_host_keeps_a_non_default_port() {
        let with_port = engine("https://auth.example.com:8000/auth");
        assert_eq!(with_port.web_auth_host, "auth.example.com:8000");

        let default_port = engine("https://auth.example.com:443/auth");
        assert_eq!(default_port.web_auth_host, "auth.example.com");

        let no_port = engine("https://auth.example.com/auth");
        assert_eq!(no_port.web_auth_host, "auth.example.com");
    }

    #[test]
    fn engine_is_debug_formattable() {
        // The engine embeds the HTTP handle under the default feature set;
        // the whole chain must format.
        let repr = format!("{:?}", engine("https://auth.example.com/auth"));
        assert!(repr.contains("WebAuthClient"));
    }

    #[test]
    fn rejects_a_non_account_server_key() {
        let err = WebAuthClient::new(WebAuthConfig::new(
            "https://auth.example.com/auth",
            server_keypair().secret_seed(),
            "example.com",
            Network::testnet(),
        ))
        .unwrap_err();
        assert!(matches!(err, SdkError::Strkey(_)));
    }

    #[test]
    fn validates_and_signs_a_server_issued_challenge() {
        let server = server_keypair();
        let client = client_keypair();
        let engine = engine("https://auth.example.com/auth");
        let challenge = challenge_xdr(&server, &client, "auth.example.com", None);

        let validated = engine
            .validate_challenge(&challenge, &client.account_id(), None, None)
            .unwrap();
        let signed = engine.sign_challenge(&validated, &[&client]).unwrap();

        // Server signature first, then the client's.
        let tx = Transaction::from_xdr_base64(&signed).unwrap();
        assert_eq!(tx.signatures().len(), 2);
        assert_eq!(tx.signatures()[0].hint, server.signature_hint());
        assert_eq!(tx.signatures()[1].hint, client.signature_hint());
    }

    #[test]
    fn multisig_challenge_collects_one_signature_per_key() {
        let server = server_keypair();
        let client = client_keypair();
        let second = Keypair::from_raw_seed([93u8; 32]);
        let engine = engine("https://auth.example.com/auth");
        let challenge = challenge_xdr(&server, &client, "auth.example.com", None);

        let validated = engine
            .validate_challenge(&challenge, &client.account_id(), None, None)
            .unwrap();
        let signed = engine
            .sign_challenge(&validated, &[&client, &second])
            .unwrap();
        let tx = Transaction::from_xdr_base64(&signed).unwrap();
        assert_eq!(tx.signatures().len(), 3);
    }

    #[test]
    fn declared_client_domain_blocks_plain_signing() {
        let server = server_keypair();
        let client = client_keypair();
        let domain_kp = Keypair::from_raw_seed([94u8; 32]);
        let engine = engine("https://auth.example.com/auth");
        let challenge = challenge_xdr(&server, &client, "auth.example.com", Some(&domain_kp));

        let validated = engine
            .validate_challenge(
                &challenge,
                &client.account_id(),
                None,
                Some(&domain_kp.account_id()),
            )
            .unwrap();

        let err = engine.sign_challenge(&validated, &[&client]).unwrap_err();
        assert!(matches!(
            err,
            SdkError::Auth(AuthError::ClientDomainSignerRequired)
        ));

        let signed = engine
            .sign_challenge_with_client_domain_key(&validated, &[&client], &domain_kp)
            .unwrap();
        let tx = Transaction::from_xdr_base64(&signed).unwrap();
        assert_eq!(tx.signatures().len(), 3);
        assert_eq!(tx.signatures()[2].hint, domain_kp.signature_hint());
    }

    #[test]
    fn client_domain_key_is_refused_when_no_domain_was_declared() {
        let server = server_keypair();
        let client = client_keypair();
        let domain_kp = Keypair::from_raw_seed([94u8; 32]);
        let engine = engine("https://auth.example.com/auth");
        let challenge = challenge_xdr(&server, &client, "auth.example.com", None);

        let validated = engine
            .validate_challenge(&challenge, &client.account_id(), None, None)
            .unwrap();
        let err = engine
            .sign_challenge_with_client_domain_key(&validated, &[&client], &domain_kp)
            .unwrap_err();
        assert!(matches!(
            err,
            SdkError::Auth(AuthError::ClientDomainNotDeclared)
        ));
    }

    #[test]
    fn client_domain_key_must_match_the_declared_account() {
        let server = server_keypair();
        let client = client_keypair();
        let domain_kp = Keypair::from_raw_seed([94u8; 32]);
        let wrong_kp = Keypair::from_raw_seed([95u8; 32]);
        let engine = engine("https://auth.example.com/auth");
        let challenge = challenge_xdr(&server, &client, "auth.example.com", Some(&domain_kp));

        let validated = engine
            .validate_challenge(
                &challenge,
                &client.account_id(),
                None,
                Some(&domain_kp.account_id()),
            )
            .unwrap();
        let err = engine
            .sign_challenge_with_client_domain_key(&validated, &[&client], &wrong_kp)
            .unwrap_err();
        assert!(matches!(
            err,
            SdkError::Auth(AuthError::ClientDomainAccountMismatch { .. })
        ));
    }
}
