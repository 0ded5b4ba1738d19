//! Unified SDK error types.

use thiserror::Error;

/// Top-level SDK error.
#[derive(Error, Debug)]
pub enum SdkError {
    #[error("XDR error: {0}")]
    Xdr(#[from] XdrError),

    #[error("Strkey error: {0}")]
    Strkey(#[from] StrkeyError),

    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Transaction error: {0}")]
    Tx(#[from] TxError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    #[error("{0}")]
    Other(String),
}

/// Structural decode/encode errors from the XDR layer.
///
/// Always fatal to the current call. A malformed artifact is never retried
/// and never partially accepted.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum XdrError {
    #[error("unexpected end of input: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof { needed: usize, remaining: usize },

    #[error("declared length {len} exceeds maximum {max}")]
    LengthExceedsMax { len: u32, max: u32 },

    #[error("unknown {ty} discriminant: {value}")]
    InvalidDiscriminant { ty: &'static str, value: i32 },

    #[error("non-zero padding byte")]
    NonZeroPadding,

    #[error("invalid boolean value: {0}")]
    InvalidBool(u32),

    #[error("invalid presence flag: {0}")]
    InvalidPresenceFlag(u32),

    #[error("invalid UTF-8 in string field")]
    InvalidUtf8,

    #[error("{remaining} trailing bytes after decode")]
    TrailingBytes { remaining: usize },

    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Address (strkey) encode/decode errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum StrkeyError {
    #[error("invalid base32 character")]
    InvalidBase32,

    #[error("invalid strkey length: {0}")]
    InvalidLength(usize),

    #[error("unknown version byte: {0:#04x}")]
    UnknownVersionByte(u8),

    #[error("version byte {actual:#04x} does not match expected role {expected:#04x}")]
    VersionMismatch { expected: u8, actual: u8 },

    #[error("checksum mismatch: expected {expected:#06x}, found {actual:#06x}")]
    ChecksumMismatch { expected: u16, actual: u16 },
}

/// Key import errors. Verification failures are not errors: `verify`
/// returns `bool`, treating malformed keys and signatures as non-matches.
#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("invalid secret seed")]
    InvalidSecretSeed,
}

/// Transaction construction and signing contract violations.
///
/// Raised at build time so a malformed transaction never reaches signing
/// or submission.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TxError {
    #[error("transaction must contain at least one operation")]
    NoOperations,

    #[error("transaction contains {count} operations, maximum is {max}")]
    TooManyOperations { count: usize, max: usize },

    #[error("memo text is {len} bytes, maximum is 28")]
    MemoTextTooLong { len: usize },

    #[error("data name is {len} bytes, maximum is 64")]
    DataNameTooLong { len: usize },

    #[error("data value is {len} bytes, maximum is 64")]
    DataValueTooLong { len: usize },

    #[error("{count} extra signers declared, maximum is 2")]
    TooManyExtraSigners { count: usize },

    #[error("fee overflows u32: {base_fee} per operation x {count} operations")]
    FeeOverflow { base_fee: u32, count: usize },

    #[error("envelope already carries the maximum of 20 signatures")]
    TooManySignatures,

    #[error("hash-x preimage is {len} bytes, maximum is 64")]
    PreimageTooLong { len: usize },

    #[error("expected a v1 transaction envelope, found {found}")]
    UnexpectedEnvelopeType { found: &'static str },
}

/// Web authentication errors — one variant per validation check, plus
/// caller-contract and submission failures.
///
/// Each checklist variant carries the expected and actual values so a
/// failure can be logged as a precise security diagnosis. A validation
/// failure is terminal for the challenge: it must never be signed after.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AuthError {
    // ── Challenge validation (fixed checklist order) ─────────────────────
    #[error("challenge is not a v1 transaction envelope (found {found})")]
    UnsupportedEnvelopeType { found: &'static str },

    #[error("challenge sequence number must be 0, found {sequence}")]
    NonZeroSequence { sequence: i64 },

    #[error("challenge memo must be an id memo, found {found}")]
    InvalidMemoType { found: &'static str },

    #[error("challenge memo mismatch: expected {expected:?}, found {actual:?}")]
    MemoMismatch {
        expected: Option<u64>,
        actual: Option<u64>,
    },

    #[error("a memo cannot be combined with a multiplexed client account")]
    MemoWithMuxedAccount,

    #[error("operation {index} is not a manage-data operation (found {found})")]
    InvalidOperationType { index: usize, found: &'static str },

    #[error("operation {index} has no source account")]
    MissingOperationSource { index: usize },

    #[error("challenge is bound to the wrong client account: expected {expected}, found {actual}")]
    ClientAccountMismatch { expected: String, actual: String },

    #[error("home domain mismatch: expected data key {expected:?}, found {actual:?}")]
    HomeDomainMismatch { expected: String, actual: String },

    #[error("client domain operation source mismatch: expected {expected}, found {actual}")]
    ClientDomainAccountMismatch { expected: String, actual: String },

    #[error("challenge carries a client_domain operation but no client domain was requested")]
    UnexpectedClientDomain,

    #[error("web auth domain mismatch: expected {expected:?}, found {actual:?}")]
    WebAuthDomainMismatch { expected: String, actual: String },

    #[error("operation {index} source must be the server signing account {expected}, found {actual}")]
    ServerAccountMismatch {
        index: usize,
        expected: String,
        actual: String,
    },

    #[error("challenge declares no time bounds")]
    MissingTimeBounds,

    #[error("challenge is outside its validity window: [{min_time}, {max_time}] at {now}")]
    ChallengeExpired {
        min_time: u64,
        max_time: u64,
        now: u64,
    },

    #[error("challenge must carry exactly one signature, found {count}")]
    SignatureCountMismatch { count: usize },

    #[error("challenge signature does not verify against the server signing key")]
    InvalidServerSignature,

    // ── Request/submission ───────────────────────────────────────────────
    #[error("network passphrase mismatch: expected {expected:?}, found {actual:?}")]
    NetworkPassphraseMismatch { expected: String, actual: String },

    #[error("challenge requested a client domain; a client-domain signer is required")]
    ClientDomainSignerRequired,

    #[error("challenge declares no client domain; a client-domain signature would be spurious")]
    ClientDomainNotDeclared,

    #[error("delegated signer failed: {0}")]
    DelegatedSignerFailed(String),

    #[error("challenge submission rejected (HTTP {status}): {message}")]
    SubmissionRejected { status: u16, message: String },
}

/// HTTP-layer errors.
///
/// Distinguished from validation errors because transport failures may be
/// legitimately retried by the caller; validation failures must not be.
#[derive(Error, Debug)]
pub enum HttpError {
    #[cfg(feature = "http")]
    #[error("Request failed: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Server error {status}: {body}")]
    ServerError { status: u16, body: String },

    #[error("Rate limited (retry after {retry_after_ms:?}ms)")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("Unauthorized: {body}")]
    Unauthorized { body: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request {status}: {body}")]
    BadRequest { status: u16, body: String },

    #[error("Max retries exceeded after {attempts} attempts: {last_error}")]
    MaxRetriesExceeded { attempts: u32, last_error: String },
}
