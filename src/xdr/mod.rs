//! XDR wire codec — cursors, codec traits, and the network schema types.
//!
//! Big-endian, 4-byte aligned, length-prefixed. Pure data transformation:
//! no crypto, no transactions, no I/O.

pub mod codec;
pub mod types;

pub use codec::{ReadXdr, WriteXdr, XdrReader, XdrWriter};
pub use types::{
    Asset, DecoratedSignature, FeeBumpTransaction, FeeBumpTransactionEnvelope, LedgerBounds, Memo,
    MuxedAccount, Operation, OperationBody, Preconditions, PreconditionsV2, PublicKey, SignerKey,
    TaggedTransaction, TimeBounds, Transaction, TransactionEnvelope, TransactionSignaturePayload,
    TransactionV0, TransactionV0Envelope, TransactionV1Envelope,
};
