//! The challenge validation checklist.
//!
//! Checks run in a fixed order and the first failure aborts with its own
//! error kind; a challenge that would fail several checks always reports
//! the earliest one. The clock is sampled once per validation call so the
//! whole checklist sees one consistent instant.

use chrono::{DateTime, Utc};

use crate::auth::{CLIENT_DOMAIN_DATA_KEY, WEB_AUTH_DOMAIN_DATA_KEY};
use crate::crypto::verify;
use crate::error::{AuthError, SdkError};
use crate::network::Network;
use crate::tx::Transaction;
use crate::xdr::{Memo, MuxedAccount, OperationBody, ReadXdr, TransactionEnvelope};

/// What the caller and configuration expect the challenge to be bound to.
pub(crate) struct ChallengeExpectations<'a> {
    pub network: &'a Network,
    pub server_signing_key: &'a [u8; 32],
    pub server_account_id: &'a str,
    pub home_domain: &'a str,
    /// Authentication endpoint host, including any non-default port.
    pub web_auth_host: &'a str,
    pub client_account: &'a MuxedAccount,
    pub expected_memo: Option<u64>,
    pub client_domain_account: Option<&'a str>,
    pub grace_period_secs: u64,
}

/// Proof that a challenge passed every check. Only this type can be
/// counter-signed.
#[derive(Debug, Clone)]
pub struct ValidatedChallenge {
    pub(crate) tx: Transaction,
    transaction_xdr: String,
    client_domain_account: Option<String>,
}

impl ValidatedChallenge {
    /// The decoded challenge, including the server's signature.
    pub fn transaction(&self) -> &Transaction {
        &self.tx
    }

    /// The envelope exactly as received, for delegated signers.
    pub fn transaction_xdr(&self) -> &str {
        &self.transaction_xdr
    }

    /// The client-domain account declared at validation time, if any.
    pub fn client_domain_account(&self) -> Option<&str> {
        self.client_domain_account.as_deref()
    }
}

pub(crate) fn validate_challenge_at(
    exp: &ChallengeExpectations<'_>,
    challenge_xdr: &str,
    now: DateTime<Utc>,
) -> Result<ValidatedChallenge, SdkError> {
    // A structural parse failure is a decode error, not a checklist error.
    let envelope = TransactionEnvelope::from_xdr_base64(challenge_xdr)?;

    // (a) versioned transaction envelope only
    let env = match envelope {
        TransactionEnvelope::Tx(e) => e,
        other => {
            return Err(AuthError::UnsupportedEnvelopeType {
                found: other.type_name(),
            }
            .into())
        }
    };
    let tx = &env.tx;

    // (b) challenges are never submittable
    if tx.seq_num != 0 {
        return Err(AuthError::NonZeroSequence {
            sequence: tx.seq_num,
        }
        .into());
    }

    // (c) memo, when present, must be an id memo
    let actual_memo = match &tx.memo {
        Memo::None => None,
        Memo::Id(v) => Some(*v),
        other => {
            return Err(AuthError::InvalidMemoType {
                found: other.type_name(),
            }
            .into())
        }
    };

    // (d) the memo must match what the caller asked for
    if exp.expected_memo != actual_memo {
        return Err(AuthError::MemoMismatch {
            expected: exp.expected_memo,
            actual: actual_memo,
        }
        .into());
    }

    // (e) memo and multiplexed client account are mutually exclusive
    if actual_memo.is_some() && exp.client_account.is_muxed() {
        return Err(AuthError::MemoWithMuxedAccount.into());
    }

    // (f) nothing but manage-data operations
    if tx.operations.is_empty() {
        return Err(AuthError::InvalidOperationType {
            index: 0,
            found: "none",
        }
        .into());
    }
    for (index, op) in tx.operations.iter().enumerate() {
        if !matches!(op.body, OperationBody::ManageData { .. }) {
            return Err(AuthError::InvalidOperationType {
                index,
                found: op.body.type_name(),
            }
            .into());
        }
    }

    // (g) the first operation is bound to the client account
    let first = &tx.operations[0];
    let first_source = first
        .source_account
        .as_ref()
        .ok_or(AuthError::MissingOperationSource { index: 0 })?;
    if first_source.base_ed25519() != exp.client_account.base_ed25519() {
        return Err(AuthError::ClientAccountMismatch {
            expected: exp.client_account.base_account_id(),
            actual: first_source.base_account_id(),
        }
        .into());
    }

    // (h) the first operation names the server's home domain
    let expected_key = format!("{} auth", exp.home_domain);
    let OperationBody::ManageData { data_name, .. } = &first.body else {
        unreachable!("checked in (f)");
    };
    if data_name != &expected_key {
        return Err(AuthError::HomeDomainMismatch {
            expected: expected_key,
            actual: data_name.clone(),
        }
        .into());
    }

    // (i)-(k) remaining operations
    for (index, op) in tx.operations.iter().enumerate().skip(1) {
        let OperationBody::ManageData {
            data_name,
            data_value,
        } = &op.body
        else {
            unreachable!("checked in (f)");
        };
        let source = op
            .source_account
            .as_ref()
            .ok_or(AuthError::MissingOperationSource { index })?;

        if data_name == CLIENT_DOMAIN_DATA_KEY {
            // (i) client-domain proof must be anchored on the declared account
            let Some(declared) = exp.client_domain_account else {
                return Err(AuthError::UnexpectedClientDomain.into());
            };
            let declared_account = MuxedAccount::from_address(declared)?;
            if source.base_ed25519() != declared_account.base_ed25519() {
                return Err(AuthError::ClientDomainAccountMismatch {
                    expected: declared.to_string(),
                    actual: source.base_account_id(),
                }
                .into());
            }
            continue;
        }

        if data_name == WEB_AUTH_DOMAIN_DATA_KEY {
            // (j) pins the endpoint host the caller is actually talking to
            let actual = data_value
                .as_deref()
                .map(|v| String::from_utf8_lossy(v).into_owned())
                .unwrap_or_default();
            if actual != exp.web_auth_host {
                return Err(AuthError::WebAuthDomainMismatch {
                    expected: exp.web_auth_host.to_string(),
                    actual,
                }
                .into());
            }
        }

        // (k) everything else is the server talking to itself
        if source.base_ed25519() != exp.server_signing_key {
            return Err(AuthError::ServerAccountMismatch {
                index,
                expected: exp.server_account_id.to_string(),
                actual: source.base_account_id(),
            }
            .into());
        }
    }

    // (l) time bounds are mandatory and `now` must fall inside them
    let tb = tx.cond.time_bounds().ok_or(AuthError::MissingTimeBounds)?;
    let now_secs = now.timestamp().max(0) as u64;
    let grace = exp.grace_period_secs;
    if now_secs < tb.min_time.saturating_sub(grace)
        || now_secs > tb.max_time.saturating_add(grace)
    {
        return Err(AuthError::ChallengeExpired {
            min_time: tb.min_time,
            max_time: tb.max_time,
            now: now_secs,
        }
        .into());
    }

    // (m) exactly one signature, and it is the server's
    if env.signatures.len() != 1 {
        return Err(AuthError::SignatureCountMismatch {
            count: env.signatures.len(),
        }
        .into());
    }
    let challenge = Transaction::from_envelope(TransactionEnvelope::Tx(env))?;
    let payload_hash = challenge.hash(exp.network)?;
    let signature = &challenge.signatures()[0];
    if !verify(exp.server_signing_key, &payload_hash, &signature.signature) {
        return Err(AuthError::InvalidServerSignature.into());
    }

    Ok(ValidatedChallenge {
        tx: challenge,
        transaction_xdr: challenge_xdr.to_string(),
        client_domain_account: exp.client_domain_account.map(String::from),
    })
}
