//! The transaction-relevant subset of the network's XDR schema.
//!
//! Every closed set of wire variants is a Rust enum with exhaustive
//! matching, so adding a protocol variant forces every consumer to handle
//! it. Decoding rejects any discriminant outside the schema.

use crate::crypto::strkey::Strkey;
use crate::error::{StrkeyError, XdrError};
use crate::xdr::codec::{ReadXdr, WriteXdr, XdrReader, XdrWriter};

// ── Schema size caps ─────────────────────────────────────────────────────────

pub const MAX_OPS_PER_TX: u32 = 100;
pub const MAX_MEMO_TEXT: u32 = 28;
pub const MAX_DATA_NAME: u32 = 64;
pub const MAX_DATA_VALUE: u32 = 64;
pub const MAX_SIGNATURES: u32 = 20;
pub const MAX_SIGNATURE_LEN: u32 = 64;
pub const MAX_EXTRA_SIGNERS: u32 = 2;
pub const MAX_SIGNED_PAYLOAD: u32 = 64;

// ── Envelope type tags ───────────────────────────────────────────────────────

pub const ENVELOPE_TYPE_TX_V0: i32 = 0;
pub const ENVELOPE_TYPE_TX: i32 = 2;
pub const ENVELOPE_TYPE_TX_FEE_BUMP: i32 = 5;

// Key type discriminants shared by PublicKey, MuxedAccount and SignerKey.
const KEY_TYPE_ED25519: i32 = 0;
const KEY_TYPE_PRE_AUTH_TX: i32 = 1;
const KEY_TYPE_HASH_X: i32 = 2;
const KEY_TYPE_ED25519_SIGNED_PAYLOAD: i32 = 3;
const KEY_TYPE_MUXED_ED25519: i32 = 0x100;

// A reserved extension point: `union switch (int v) { case 0: void; }`.
fn read_ext0(r: &mut XdrReader<'_>) -> Result<(), XdrError> {
    match r.read_i32()? {
        0 => Ok(()),
        value => Err(XdrError::InvalidDiscriminant { ty: "ext", value }),
    }
}

// ── Accounts and keys ────────────────────────────────────────────────────────

/// An account's signing key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicKey {
    Ed25519([u8; 32]),
}

impl PublicKey {
    pub fn ed25519(&self) -> &[u8; 32] {
        match self {
            PublicKey::Ed25519(k) => k,
        }
    }

    pub fn to_address(&self) -> String {
        Strkey::PublicKeyEd25519(*self.ed25519()).to_string()
    }

    pub fn from_address(address: &str) -> Result<Self, StrkeyError> {
        match Strkey::from_string(address)? {
            Strkey::PublicKeyEd25519(k) => Ok(PublicKey::Ed25519(k)),
            other => Err(StrkeyError::VersionMismatch {
                expected: Strkey::VERSION_ACCOUNT,
                actual: other.version_byte(),
            }),
        }
    }
}

impl WriteXdr for PublicKey {
    fn write_xdr(&self, w: &mut XdrWriter) -> Result<(), XdrError> {
        match self {
            PublicKey::Ed25519(k) => {
                w.write_i32(KEY_TYPE_ED25519);
                w.write_fixed(k);
            }
        }
        Ok(())
    }
}

impl ReadXdr for PublicKey {
    fn read_xdr(r: &mut XdrReader<'_>) -> Result<Self, XdrError> {
        match r.read_i32()? {
            KEY_TYPE_ED25519 => Ok(PublicKey::Ed25519(r.read_fixed::<32>()?)),
            value => Err(XdrError::InvalidDiscriminant {
                ty: "PublicKey",
                value,
            }),
        }
    }
}

/// A transaction source: either a plain account or a multiplexed account
/// carrying a 64-bit sub-account id over a shared signing key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MuxedAccount {
    Ed25519([u8; 32]),
    MuxedEd25519 { id: u64, ed25519: [u8; 32] },
}

impl MuxedAccount {
    /// The underlying signing key, ignoring any multiplexing id.
    pub fn base_ed25519(&self) -> &[u8; 32] {
        match self {
            MuxedAccount::Ed25519(k) => k,
            MuxedAccount::MuxedEd25519 { ed25519, .. } => ed25519,
        }
    }

    pub fn is_muxed(&self) -> bool {
        matches!(self, MuxedAccount::MuxedEd25519 { .. })
    }

    /// The `G...` address of the underlying signing key.
    pub fn base_account_id(&self) -> String {
        Strkey::PublicKeyEd25519(*self.base_ed25519()).to_string()
    }

    /// The full address: `G...` for plain accounts, `M...` for muxed.
    pub fn to_address(&self) -> String {
        match self {
            MuxedAccount::Ed25519(k) => Strkey::PublicKeyEd25519(*k).to_string(),
            MuxedAccount::MuxedEd25519 { id, ed25519 } => Strkey::MuxedAccountEd25519 {
                ed25519: *ed25519,
                id: *id,
            }
            .to_string(),
        }
    }

    /// Parse a `G...` or `M...` address.
    pub fn from_address(address: &str) -> Result<Self, StrkeyError> {
        match Strkey::from_string(address)? {
            Strkey::PublicKeyEd25519(k) => Ok(MuxedAccount::Ed25519(k)),
            Strkey::MuxedAccountEd25519 { ed25519, id } => {
                Ok(MuxedAccount::MuxedEd25519 { id, ed25519 })
            }
            other => Err(StrkeyError::VersionMismatch {
                expected: Strkey::VERSION_ACCOUNT,
                actual: other.version_byte(),
            }),
        }
    }
}

impl WriteXdr for MuxedAccount {
    fn write_xdr(&self, w: &mut XdrWriter) -> Result<(), XdrError> {
        match self {
            MuxedAccount::Ed25519(k) => {
                w.write_i32(KEY_TYPE_ED25519);
                w.write_fixed(k);
            }
            MuxedAccount::MuxedEd25519 { id, ed25519 } => {
                w.write_i32(KEY_TYPE_MUXED_ED25519);
                w.write_u64(*id);
                w.write_fixed(ed25519);
            }
        }
        Ok(())
    }
}

impl ReadXdr for MuxedAccount {
    fn read_xdr(r: &mut XdrReader<'_>) -> Result<Self, XdrError> {
        match r.read_i32()? {
            KEY_TYPE_ED25519 => Ok(MuxedAccount::Ed25519(r.read_fixed::<32>()?)),
            KEY_TYPE_MUXED_ED25519 => Ok(MuxedAccount::MuxedEd25519 {
                id: r.read_u64()?,
                ed25519: r.read_fixed::<32>()?,
            }),
            value => Err(XdrError::InvalidDiscriminant {
                ty: "MuxedAccount",
                value,
            }),
        }
    }
}

/// A key authorized to sign for an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignerKey {
    Ed25519([u8; 32]),
    PreAuthTx([u8; 32]),
    HashX([u8; 32]),
    Ed25519SignedPayload { ed25519: [u8; 32], payload: Vec<u8> },
}

impl WriteXdr for SignerKey {
    fn write_xdr(&self, w: &mut XdrWriter) -> Result<(), XdrError> {
        match self {
            SignerKey::Ed25519(k) => {
                w.write_i32(KEY_TYPE_ED25519);
                w.write_fixed(k);
            }
            SignerKey::PreAuthTx(h) => {
                w.write_i32(KEY_TYPE_PRE_AUTH_TX);
                w.write_fixed(h);
            }
            SignerKey::HashX(h) => {
                w.write_i32(KEY_TYPE_HASH_X);
                w.write_fixed(h);
            }
            SignerKey::Ed25519SignedPayload { ed25519, payload } => {
                w.write_i32(KEY_TYPE_ED25519_SIGNED_PAYLOAD);
                w.write_fixed(ed25519);
                w.write_var_opaque(MAX_SIGNED_PAYLOAD, payload)?;
            }
        }
        Ok(())
    }
}

impl ReadXdr for SignerKey {
    fn read_xdr(r: &mut XdrReader<'_>) -> Result<Self, XdrError> {
        match r.read_i32()? {
            KEY_TYPE_ED25519 => Ok(SignerKey::Ed25519(r.read_fixed::<32>()?)),
            KEY_TYPE_PRE_AUTH_TX => Ok(SignerKey::PreAuthTx(r.read_fixed::<32>()?)),
            KEY_TYPE_HASH_X => Ok(SignerKey::HashX(r.read_fixed::<32>()?)),
            KEY_TYPE_ED25519_SIGNED_PAYLOAD => Ok(SignerKey::Ed25519SignedPayload {
                ed25519: r.read_fixed::<32>()?,
                payload: r.read_var_opaque(MAX_SIGNED_PAYLOAD)?,
            }),
            value => Err(XdrError::InvalidDiscriminant {
                ty: "SignerKey",
                value,
            }),
        }
    }
}

/// A raw signature paired with the trailing 4 bytes of the signing public
/// key. The hint narrows candidate keys; it is never a substitute for full
/// verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoratedSignature {
    pub hint: [u8; 4],
    pub signature: Vec<u8>,
}

impl WriteXdr for DecoratedSignature {
    fn write_xdr(&self, w: &mut XdrWriter) -> Result<(), XdrError> {
        w.write_fixed(&self.hint);
        w.write_var_opaque(MAX_SIGNATURE_LEN, &self.signature)
    }
}

impl ReadXdr for DecoratedSignature {
    fn read_xdr(r: &mut XdrReader<'_>) -> Result<Self, XdrError> {
        Ok(Self {
            hint: r.read_fixed::<4>()?,
            signature: r.read_var_opaque(MAX_SIGNATURE_LEN)?,
        })
    }
}

// ── Assets ───────────────────────────────────────────────────────────────────

const ASSET_TYPE_NATIVE: i32 = 0;
const ASSET_TYPE_CREDIT_ALPHANUM4: i32 = 1;
const ASSET_TYPE_CREDIT_ALPHANUM12: i32 = 2;

/// An asset identifier: the native asset singleton or an issued credit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Asset {
    Native,
    CreditAlphanum4 { code: [u8; 4], issuer: PublicKey },
    CreditAlphanum12 { code: [u8; 12], issuer: PublicKey },
}

impl WriteXdr for Asset {
    fn write_xdr(&self, w: &mut XdrWriter) -> Result<(), XdrError> {
        match self {
            Asset::Native => {
                w.write_i32(ASSET_TYPE_NATIVE);
                Ok(())
            }
            Asset::CreditAlphanum4 { code, issuer } => {
                w.write_i32(ASSET_TYPE_CREDIT_ALPHANUM4);
                w.write_fixed(code);
                issuer.write_xdr(w)
            }
            Asset::CreditAlphanum12 { code, issuer } => {
                w.write_i32(ASSET_TYPE_CREDIT_ALPHANUM12);
                w.write_fixed(code);
                issuer.write_xdr(w)
            }
        }
    }
}

impl ReadXdr for Asset {
    fn read_xdr(r: &mut XdrReader<'_>) -> Result<Self, XdrError> {
        match r.read_i32()? {
            ASSET_TYPE_NATIVE => Ok(Asset::Native),
            ASSET_TYPE_CREDIT_ALPHANUM4 => Ok(Asset::CreditAlphanum4 {
                code: r.read_fixed::<4>()?,
                issuer: PublicKey::read_xdr(r)?,
            }),
            ASSET_TYPE_CREDIT_ALPHANUM12 => Ok(Asset::CreditAlphanum12 {
                code: r.read_fixed::<12>()?,
                issuer: PublicKey::read_xdr(r)?,
            }),
            value => Err(XdrError::InvalidDiscriminant { ty: "Asset", value }),
        }
    }
}

// ── Memo ─────────────────────────────────────────────────────────────────────

const MEMO_NONE: i32 = 0;
const MEMO_TEXT: i32 = 1;
const MEMO_ID: i32 = 2;
const MEMO_HASH: i32 = 3;
const MEMO_RETURN: i32 = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Memo {
    None,
    Text(String),
    Id(u64),
    Hash([u8; 32]),
    Return([u8; 32]),
}

impl Memo {
    pub fn type_name(&self) -> &'static str {
        match self {
            Memo::None => "none",
            Memo::Text(_) => "text",
            Memo::Id(_) => "id",
            Memo::Hash(_) => "hash",
            Memo::Return(_) => "return",
        }
    }
}

impl WriteXdr for Memo {
    fn write_xdr(&self, w: &mut XdrWriter) -> Result<(), XdrError> {
        match self {
            Memo::None => {
                w.write_i32(MEMO_NONE);
                Ok(())
            }
            Memo::Text(t) => {
                w.write_i32(MEMO_TEXT);
                w.write_string(MAX_MEMO_TEXT, t)
            }
            Memo::Id(id) => {
                w.write_i32(MEMO_ID);
                w.write_u64(*id);
                Ok(())
            }
            Memo::Hash(h) => {
                w.write_i32(MEMO_HASH);
                w.write_fixed(h);
                Ok(())
            }
            Memo::Return(h) => {
                w.write_i32(MEMO_RETURN);
                w.write_fixed(h);
                Ok(())
            }
        }
    }
}

impl ReadXdr for Memo {
    fn read_xdr(r: &mut XdrReader<'_>) -> Result<Self, XdrError> {
        match r.read_i32()? {
            MEMO_NONE => Ok(Memo::None),
            MEMO_TEXT => Ok(Memo::Text(r.read_string(MAX_MEMO_TEXT)?)),
            MEMO_ID => Ok(Memo::Id(r.read_u64()?)),
            MEMO_HASH => Ok(Memo::Hash(r.read_fixed::<32>()?)),
            MEMO_RETURN => Ok(Memo::Return(r.read_fixed::<32>()?)),
            value => Err(XdrError::InvalidDiscriminant { ty: "Memo", value }),
        }
    }
}

// ── Preconditions ────────────────────────────────────────────────────────────

const PRECOND_NONE: i32 = 0;
const PRECOND_TIME: i32 = 1;
const PRECOND_V2: i32 = 2;

/// Absolute validity window in Unix seconds. `max_time` 0 means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeBounds {
    pub min_time: u64,
    pub max_time: u64,
}

impl WriteXdr for TimeBounds {
    fn write_xdr(&self, w: &mut XdrWriter) -> Result<(), XdrError> {
        w.write_u64(self.min_time);
        w.write_u64(self.max_time);
        Ok(())
    }
}

impl ReadXdr for TimeBounds {
    fn read_xdr(r: &mut XdrReader<'_>) -> Result<Self, XdrError> {
        Ok(Self {
            min_time: r.read_u64()?,
            max_time: r.read_u64()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerBounds {
    pub min_ledger: u32,
    pub max_ledger: u32,
}

impl WriteXdr for LedgerBounds {
    fn write_xdr(&self, w: &mut XdrWriter) -> Result<(), XdrError> {
        w.write_u32(self.min_ledger);
        w.write_u32(self.max_ledger);
        Ok(())
    }
}

impl ReadXdr for LedgerBounds {
    fn read_xdr(r: &mut XdrReader<'_>) -> Result<Self, XdrError> {
        Ok(Self {
            min_ledger: r.read_u32()?,
            max_ledger: r.read_u32()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PreconditionsV2 {
    pub time_bounds: Option<TimeBounds>,
    pub ledger_bounds: Option<LedgerBounds>,
    pub min_seq_num: Option<i64>,
    pub min_seq_age: u64,
    pub min_seq_ledger_gap: u32,
    pub extra_signers: Vec<SignerKey>,
}

// Option<i64> has no ReadXdr impl for i64; wrap the sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SeqNum(i64);

impl WriteXdr for SeqNum {
    fn write_xdr(&self, w: &mut XdrWriter) -> Result<(), XdrError> {
        w.write_i64(self.0);
        Ok(())
    }
}

impl ReadXdr for SeqNum {
    fn read_xdr(r: &mut XdrReader<'_>) -> Result<Self, XdrError> {
        Ok(SeqNum(r.read_i64()?))
    }
}

impl WriteXdr for PreconditionsV2 {
    fn write_xdr(&self, w: &mut XdrWriter) -> Result<(), XdrError> {
        w.write_option(&self.time_bounds)?;
        w.write_option(&self.ledger_bounds)?;
        w.write_option(&self.min_seq_num.map(SeqNum))?;
        w.write_u64(self.min_seq_age);
        w.write_u32(self.min_seq_ledger_gap);
        w.write_vec(MAX_EXTRA_SIGNERS, &self.extra_signers)
    }
}

impl ReadXdr for PreconditionsV2 {
    fn read_xdr(r: &mut XdrReader<'_>) -> Result<Self, XdrError> {
        Ok(Self {
            time_bounds: r.read_option()?,
            ledger_bounds: r.read_option()?,
            min_seq_num: r.read_option::<SeqNum>()?.map(|s| s.0),
            min_seq_age: r.read_u64()?,
            min_seq_ledger_gap: r.read_u32()?,
            extra_signers: r.read_vec(MAX_EXTRA_SIGNERS)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Preconditions {
    None,
    Time(TimeBounds),
    V2(PreconditionsV2),
}

impl Preconditions {
    /// The declared validity window, whichever precondition form carries it.
    pub fn time_bounds(&self) -> Option<&TimeBounds> {
        match self {
            Preconditions::None => None,
            Preconditions::Time(tb) => Some(tb),
            Preconditions::V2(v2) => v2.time_bounds.as_ref(),
        }
    }
}

impl WriteXdr for Preconditions {
    fn write_xdr(&self, w: &mut XdrWriter) -> Result<(), XdrError> {
        match self {
            Preconditions::None => {
                w.write_i32(PRECOND_NONE);
                Ok(())
            }
            Preconditions::Time(tb) => {
                w.write_i32(PRECOND_TIME);
                tb.write_xdr(w)
            }
            Preconditions::V2(v2) => {
                w.write_i32(PRECOND_V2);
                v2.write_xdr(w)
            }
        }
    }
}

impl ReadXdr for Preconditions {
    fn read_xdr(r: &mut XdrReader<'_>) -> Result<Self, XdrError> {
        match r.read_i32()? {
            PRECOND_NONE => Ok(Preconditions::None),
            PRECOND_TIME => Ok(Preconditions::Time(TimeBounds::read_xdr(r)?)),
            PRECOND_V2 => Ok(Preconditions::V2(PreconditionsV2::read_xdr(r)?)),
            value => Err(XdrError::InvalidDiscriminant {
                ty: "Preconditions",
                value,
            }),
        }
    }
}

// ── Operations ───────────────────────────────────────────────────────────────

const OP_CREATE_ACCOUNT: i32 = 0;
const OP_PAYMENT: i32 = 1;
const OP_MANAGE_DATA: i32 = 10;
const OP_BUMP_SEQUENCE: i32 = 11;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationBody {
    CreateAccount {
        destination: PublicKey,
        starting_balance: i64,
    },
    Payment {
        destination: MuxedAccount,
        asset: Asset,
        amount: i64,
    },
    ManageData {
        data_name: String,
        data_value: Option<Vec<u8>>,
    },
    BumpSequence {
        bump_to: i64,
    },
}

impl OperationBody {
    pub fn type_name(&self) -> &'static str {
        match self {
            OperationBody::CreateAccount { .. } => "create_account",
            OperationBody::Payment { .. } => "payment",
            OperationBody::ManageData { .. } => "manage_data",
            OperationBody::BumpSequence { .. } => "bump_sequence",
        }
    }
}

// DataValue is opaque<64>; wrap it so Option encoding composes.
#[derive(Debug, Clone, PartialEq, Eq)]
struct DataValue(Vec<u8>);

impl WriteXdr for DataValue {
    fn write_xdr(&self, w: &mut XdrWriter) -> Result<(), XdrError> {
        w.write_var_opaque(MAX_DATA_VALUE, &self.0)
    }
}

impl ReadXdr for DataValue {
    fn read_xdr(r: &mut XdrReader<'_>) -> Result<Self, XdrError> {
        Ok(DataValue(r.read_var_opaque(MAX_DATA_VALUE)?))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub source_account: Option<MuxedAccount>,
    pub body: OperationBody,
}

impl WriteXdr for Operation {
    fn write_xdr(&self, w: &mut XdrWriter) -> Result<(), XdrError> {
        w.write_option(&self.source_account)?;
        match &self.body {
            OperationBody::CreateAccount {
                destination,
                starting_balance,
            } => {
                w.write_i32(OP_CREATE_ACCOUNT);
                destination.write_xdr(w)?;
                w.write_i64(*starting_balance);
            }
            OperationBody::Payment {
                destination,
                asset,
                amount,
            } => {
                w.write_i32(OP_PAYMENT);
                destination.write_xdr(w)?;
                asset.write_xdr(w)?;
                w.write_i64(*amount);
            }
            OperationBody::ManageData {
                data_name,
                data_value,
            } => {
                w.write_i32(OP_MANAGE_DATA);
                w.write_string(MAX_DATA_NAME, data_name)?;
                w.write_option(&data_value.clone().map(DataValue))?;
            }
            OperationBody::BumpSequence { bump_to } => {
                w.write_i32(OP_BUMP_SEQUENCE);
                w.write_i64(*bump_to);
            }
        }
        Ok(())
    }
}

impl ReadXdr for Operation {
    fn read_xdr(r: &mut XdrReader<'_>) -> Result<Self, XdrError> {
        let source_account = r.read_option()?;
        let body = match r.read_i32()? {
            OP_CREATE_ACCOUNT => OperationBody::CreateAccount {
                destination: PublicKey::read_xdr(r)?,
                starting_balance: r.read_i64()?,
            },
            OP_PAYMENT => OperationBody::Payment {
                destination: MuxedAccount::read_xdr(r)?,
                asset: Asset::read_xdr(r)?,
                amount: r.read_i64()?,
            },
            OP_MANAGE_DATA => OperationBody::ManageData {
                data_name: r.read_string(MAX_DATA_NAME)?,
                data_value: r.read_option::<DataValue>()?.map(|v| v.0),
            },
            OP_BUMP_SEQUENCE => OperationBody::BumpSequence {
                bump_to: r.read_i64()?,
            },
            value => {
                return Err(XdrError::InvalidDiscriminant {
                    ty: "OperationBody",
                    value,
                })
            }
        };
        Ok(Operation {
            source_account,
            body,
        })
    }
}

// ── Transactions ─────────────────────────────────────────────────────────────

/// A v1 transaction: the signable core of an envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub source_account: MuxedAccount,
    pub fee: u32,
    pub seq_num: i64,
    pub cond: Preconditions,
    pub memo: Memo,
    pub operations: Vec<Operation>,
}

impl WriteXdr for Transaction {
    fn write_xdr(&self, w: &mut XdrWriter) -> Result<(), XdrError> {
        self.source_account.write_xdr(w)?;
        w.write_u32(self.fee);
        w.write_i64(self.seq_num);
        self.cond.write_xdr(w)?;
        self.memo.write_xdr(w)?;
        w.write_vec(MAX_OPS_PER_TX, &self.operations)?;
        w.write_i32(0); // ext
        Ok(())
    }
}

impl ReadXdr for Transaction {
    fn read_xdr(r: &mut XdrReader<'_>) -> Result<Self, XdrError> {
        let tx = Self {
            source_account: MuxedAccount::read_xdr(r)?,
            fee: r.read_u32()?,
            seq_num: r.read_i64()?,
            cond: Preconditions::read_xdr(r)?,
            memo: Memo::read_xdr(r)?,
            operations: r.read_vec(MAX_OPS_PER_TX)?,
        };
        read_ext0(r)?;
        Ok(tx)
    }
}

/// The deprecated pre-v1 transaction shape. Decoded only so legacy
/// envelopes can be recognized and rejected by the layers above.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionV0 {
    pub source_account_ed25519: [u8; 32],
    pub fee: u32,
    pub seq_num: i64,
    pub time_bounds: Option<TimeBounds>,
    pub memo: Memo,
    pub operations: Vec<Operation>,
}

impl WriteXdr for TransactionV0 {
    fn write_xdr(&self, w: &mut XdrWriter) -> Result<(), XdrError> {
        w.write_fixed(&self.source_account_ed25519);
        w.write_u32(self.fee);
        w.write_i64(self.seq_num);
        w.write_option(&self.time_bounds)?;
        self.memo.write_xdr(w)?;
        w.write_vec(MAX_OPS_PER_TX, &self.operations)?;
        w.write_i32(0); // ext
        Ok(())
    }
}

impl ReadXdr for TransactionV0 {
    fn read_xdr(r: &mut XdrReader<'_>) -> Result<Self, XdrError> {
        let tx = Self {
            source_account_ed25519: r.read_fixed::<32>()?,
            fee: r.read_u32()?,
            seq_num: r.read_i64()?,
            time_bounds: r.read_option()?,
            memo: Memo::read_xdr(r)?,
            operations: r.read_vec(MAX_OPS_PER_TX)?,
        };
        read_ext0(r)?;
        Ok(tx)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionV1Envelope {
    pub tx: Transaction,
    pub signatures: Vec<DecoratedSignature>,
}

impl WriteXdr for TransactionV1Envelope {
    fn write_xdr(&self, w: &mut XdrWriter) -> Result<(), XdrError> {
        self.tx.write_xdr(w)?;
        w.write_vec(MAX_SIGNATURES, &self.signatures)
    }
}

impl ReadXdr for TransactionV1Envelope {
    fn read_xdr(r: &mut XdrReader<'_>) -> Result<Self, XdrError> {
        Ok(Self {
            tx: Transaction::read_xdr(r)?,
            signatures: r.read_vec(MAX_SIGNATURES)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionV0Envelope {
    pub tx: TransactionV0,
    pub signatures: Vec<DecoratedSignature>,
}

impl WriteXdr for TransactionV0Envelope {
    fn write_xdr(&self, w: &mut XdrWriter) -> Result<(), XdrError> {
        self.tx.write_xdr(w)?;
        w.write_vec(MAX_SIGNATURES, &self.signatures)
    }
}

impl ReadXdr for TransactionV0Envelope {
    fn read_xdr(r: &mut XdrReader<'_>) -> Result<Self, XdrError> {
        Ok(Self {
            tx: TransactionV0::read_xdr(r)?,
            signatures: r.read_vec(MAX_SIGNATURES)?,
        })
    }
}

/// A fee bump: an independent fee payer wrapped around a fully signed v1
/// envelope. The inner envelope is embedded verbatim and never altered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeBumpTransaction {
    pub fee_source: MuxedAccount,
    pub fee: i64,
    pub inner_tx: TransactionV1Envelope,
}

impl WriteXdr for FeeBumpTransaction {
    fn write_xdr(&self, w: &mut XdrWriter) -> Result<(), XdrError> {
        self.fee_source.write_xdr(w)?;
        w.write_i64(self.fee);
        w.write_i32(ENVELOPE_TYPE_TX);
        self.inner_tx.write_xdr(w)?;
        w.write_i32(0); // ext
        Ok(())
    }
}

impl ReadXdr for FeeBumpTransaction {
    fn read_xdr(r: &mut XdrReader<'_>) -> Result<Self, XdrError> {
        let fee_source = MuxedAccount::read_xdr(r)?;
        let fee = r.read_i64()?;
        let inner_tx = match r.read_i32()? {
            ENVELOPE_TYPE_TX => TransactionV1Envelope::read_xdr(r)?,
            value => {
                return Err(XdrError::InvalidDiscriminant {
                    ty: "FeeBumpInnerTx",
                    value,
                })
            }
        };
        read_ext0(r)?;
        Ok(Self {
            fee_source,
            fee,
            inner_tx,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeBumpTransactionEnvelope {
    pub tx: FeeBumpTransaction,
    pub signatures: Vec<DecoratedSignature>,
}

impl WriteXdr for FeeBumpTransactionEnvelope {
    fn write_xdr(&self, w: &mut XdrWriter) -> Result<(), XdrError> {
        self.tx.write_xdr(w)?;
        w.write_vec(MAX_SIGNATURES, &self.signatures)
    }
}

impl ReadXdr for FeeBumpTransactionEnvelope {
    fn read_xdr(r: &mut XdrReader<'_>) -> Result<Self, XdrError> {
        Ok(Self {
            tx: FeeBumpTransaction::read_xdr(r)?,
            signatures: r.read_vec(MAX_SIGNATURES)?,
        })
    }
}

/// The top-level wire envelope: legacy v0, current v1, or fee bump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionEnvelope {
    TxV0(TransactionV0Envelope),
    Tx(TransactionV1Envelope),
    TxFeeBump(FeeBumpTransactionEnvelope),
}

impl TransactionEnvelope {
    pub fn type_name(&self) -> &'static str {
        match self {
            TransactionEnvelope::TxV0(_) => "tx_v0",
            TransactionEnvelope::Tx(_) => "tx",
            TransactionEnvelope::TxFeeBump(_) => "tx_fee_bump",
        }
    }
}

impl WriteXdr for TransactionEnvelope {
    fn write_xdr(&self, w: &mut XdrWriter) -> Result<(), XdrError> {
        match self {
            TransactionEnvelope::TxV0(e) => {
                w.write_i32(ENVELOPE_TYPE_TX_V0);
                e.write_xdr(w)
            }
            TransactionEnvelope::Tx(e) => {
                w.write_i32(ENVELOPE_TYPE_TX);
                e.write_xdr(w)
            }
            TransactionEnvelope::TxFeeBump(e) => {
                w.write_i32(ENVELOPE_TYPE_TX_FEE_BUMP);
                e.write_xdr(w)
            }
        }
    }
}

impl ReadXdr for TransactionEnvelope {
    fn read_xdr(r: &mut XdrReader<'_>) -> Result<Self, XdrError> {
        match r.read_i32()? {
            ENVELOPE_TYPE_TX_V0 => Ok(TransactionEnvelope::TxV0(TransactionV0Envelope::read_xdr(
                r,
            )?)),
            ENVELOPE_TYPE_TX => Ok(TransactionEnvelope::Tx(TransactionV1Envelope::read_xdr(r)?)),
            ENVELOPE_TYPE_TX_FEE_BUMP => Ok(TransactionEnvelope::TxFeeBump(
                FeeBumpTransactionEnvelope::read_xdr(r)?,
            )),
            value => Err(XdrError::InvalidDiscriminant {
                ty: "TransactionEnvelope",
                value,
            }),
        }
    }
}

// ── Signature payload ────────────────────────────────────────────────────────

/// The transaction tagged with its envelope type for signing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaggedTransaction {
    Tx(Transaction),
    TxFeeBump(FeeBumpTransaction),
}

/// What actually gets hashed and signed: the network id domain-separates
/// every signature so a payload signed for one network never verifies on
/// another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionSignaturePayload {
    pub network_id: [u8; 32],
    pub tagged_transaction: TaggedTransaction,
}

impl WriteXdr for TransactionSignaturePayload {
    fn write_xdr(&self, w: &mut XdrWriter) -> Result<(), XdrError> {
        w.write_fixed(&self.network_id);
        match &self.tagged_transaction {
            TaggedTransaction::Tx(tx) => {
                w.write_i32(ENVELOPE_TYPE_TX);
                tx.write_xdr(w)
            }
            TaggedTransaction::TxFeeBump(tx) => {
                w.write_i32(ENVELOPE_TYPE_TX_FEE_BUMP);
                tx.write_xdr(w)
            }
        }
    }
}

impl ReadXdr for TransactionSignaturePayload {
    fn read_xdr(r: &mut XdrReader<'_>) -> Result<Self, XdrError> {
        let network_id = r.read_fixed::<32>()?;
        let tagged_transaction = match r.read_i32()? {
            ENVELOPE_TYPE_TX => TaggedTransaction::Tx(Transaction::read_xdr(r)?),
            ENVELOPE_TYPE_TX_FEE_BUMP => {
                TaggedTransaction::TxFeeBump(FeeBumpTransaction::read_xdr(r)?)
            }
            value => {
                return Err(XdrError::InvalidDiscriminant {
                    ty: "TaggedTransaction",
                    value,
                })
            }
        };
        Ok(Self {
            network_id,
            tagged_transaction,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tx() -> Transaction {
        Transaction {
            source_account: MuxedAccount::Ed25519([7u8; 32]),
            fee: 200,
            seq_num: 1234567,
            cond: Preconditions::Time(TimeBounds {
                min_time: 100,
                max_time: 200,
            }),
            memo: Memo::Text("hello".into()),
            operations: vec![
                Operation {
                    source_account: None,
                    body: OperationBody::Payment {
                        destination: MuxedAccount::MuxedEd25519 {
                            id: 42,
                            ed25519: [9u8; 32],
                        },
                        asset: Asset::Native,
                        amount: 10_000_000,
                    },
                },
                Operation {
                    source_account: Some(MuxedAccount::Ed25519([1u8; 32])),
                    body: OperationBody::ManageData {
                        data_name: "example.com auth".into(),
                        data_value: Some(vec![0xde, 0xad, 0xbe, 0xef]),
                    },
                },
            ],
        }
    }

    #[test]
    fn transaction_roundtrip() {
        let tx = sample_tx();
        let bytes = tx.to_xdr().unwrap();
        assert_eq!(bytes.len() % 4, 0);
        assert_eq!(Transaction::from_xdr(&bytes).unwrap(), tx);
    }

    #[test]
    fn envelope_roundtrip_via_base64() {
        let env = TransactionEnvelope::Tx(TransactionV1Envelope {
            tx: sample_tx(),
            signatures: vec![DecoratedSignature {
                hint: [1, 2, 3, 4],
                signature: vec![0xab; 64],
            }],
        });
        let b64 = env.to_xdr_base64().unwrap();
        assert_eq!(TransactionEnvelope::from_xdr_base64(&b64).unwrap(), env);
    }

    #[test]
    fn native_asset_decodes_to_singleton_repeatedly() {
        let bytes = Asset::Native.to_xdr().unwrap();
        assert_eq!(bytes, vec![0, 0, 0, 0]);
        for _ in 0..3 {
            assert_eq!(Asset::from_xdr(&bytes).unwrap(), Asset::Native);
        }
    }

    #[test]
    fn unknown_memo_discriminant_is_rejected() {
        let bytes = vec![0, 0, 0, 9];
        assert_eq!(
            Memo::from_xdr(&bytes),
            Err(XdrError::InvalidDiscriminant {
                ty: "Memo",
                value: 9
            })
        );
    }

    #[test]
    fn memo_text_over_28_bytes_is_rejected_by_encoder_and_decoder() {
        let long = "x".repeat(29);
        assert_eq!(
            Memo::Text(long.clone()).to_xdr(),
            Err(XdrError::LengthExceedsMax { len: 29, max: 28 })
        );

        let mut w = XdrWriter::new();
        w.write_i32(MEMO_TEXT);
        w.write_var_opaque(64, long.as_bytes()).unwrap();
        assert_eq!(
            Memo::from_xdr(&w.into_bytes()),
            Err(XdrError::LengthExceedsMax { len: 29, max: 28 })
        );
    }

    #[test]
    fn trailing_bytes_after_decode_are_rejected() {
        let mut bytes = Asset::Native.to_xdr().unwrap();
        bytes.extend_from_slice(&[0, 0, 0, 0]);
        assert_eq!(
            Asset::from_xdr(&bytes),
            Err(XdrError::TrailingBytes { remaining: 4 })
        );
    }

    #[test]
    fn preconditions_v2_roundtrip() {
        let cond = Preconditions::V2(PreconditionsV2 {
            time_bounds: Some(TimeBounds {
                min_time: 1,
                max_time: 99,
            }),
            ledger_bounds: Some(LedgerBounds {
                min_ledger: 10,
                max_ledger: 20,
            }),
            min_seq_num: Some(77),
            min_seq_age: 3600,
            min_seq_ledger_gap: 5,
            extra_signers: vec![SignerKey::HashX([3u8; 32])],
        });
        let bytes = cond.to_xdr().unwrap();
        assert_eq!(Preconditions::from_xdr(&bytes).unwrap(), cond);
    }

    #[test]
    fn more_than_two_extra_signers_is_rejected() {
        let cond = Preconditions::V2(PreconditionsV2 {
            extra_signers: vec![
                SignerKey::Ed25519([1u8; 32]),
                SignerKey::Ed25519([2u8; 32]),
                SignerKey::Ed25519([3u8; 32]),
            ],
            ..Default::default()
        });
        assert_eq!(
            cond.to_xdr(),
            Err(XdrError::LengthExceedsMax { len: 3, max: 2 })
        );
    }

    #[test]
    fn nonzero_ext_is_rejected() {
        let tx = sample_tx();
        let mut bytes = tx.to_xdr().unwrap();
        let last = bytes.len() - 1;
        bytes[last] = 1;
        assert_eq!(
            Transaction::from_xdr(&bytes),
            Err(XdrError::InvalidDiscriminant { ty: "ext", value: 1 })
        );
    }

    #[test]
    fn fee_bump_embeds_inner_envelope_verbatim() {
        let inner = TransactionV1Envelope {
            tx: sample_tx(),
            signatures: vec![DecoratedSignature {
                hint: [9, 9, 9, 9],
                signature: vec![1; 64],
            }],
        };
        let fb = FeeBumpTransaction {
            fee_source: MuxedAccount::Ed25519([5u8; 32]),
            fee: 400,
            inner_tx: inner.clone(),
        };
        let bytes = fb.to_xdr().unwrap();
        let decoded = FeeBumpTransaction::from_xdr(&bytes).unwrap();
        assert_eq!(decoded.inner_tx, inner);
    }
}
