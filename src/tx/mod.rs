//! Transaction construction, network-bound hashing, and multi-signature
//! collection.
//!
//! A [`Transaction`] pairs the signable XDR body with an append-only list
//! of decorated signatures. The signing hash is
//! `sha256(network_id ++ envelope_type_tag ++ xdr(tx))`, so a signature is
//! only meaningful for one network.

pub mod fee_bump;

pub use fee_bump::FeeBumpTransaction;

use crate::crypto::{hash, Keypair};
use crate::error::{SdkError, TxError, XdrError};
use crate::network::Network;
use crate::xdr::types::{MAX_DATA_NAME, MAX_DATA_VALUE, MAX_EXTRA_SIGNERS, MAX_MEMO_TEXT,
    MAX_OPS_PER_TX, MAX_SIGNATURES};
use crate::xdr::{
    self, Asset, DecoratedSignature, LedgerBounds, Memo, MuxedAccount, Operation, OperationBody,
    Preconditions, PreconditionsV2, PublicKey, ReadXdr, SignerKey, TaggedTransaction, TimeBounds,
    TransactionEnvelope, TransactionSignaturePayload, TransactionV1Envelope, WriteXdr,
};

/// Base cost per operation, in stroops.
pub const BASE_FEE: u32 = 100;

/// A transaction plus its accumulated signatures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    tx: xdr::Transaction,
    signatures: Vec<DecoratedSignature>,
}

impl Transaction {
    pub fn builder(source: MuxedAccount, seq_num: i64) -> TransactionBuilder {
        TransactionBuilder::new(source, seq_num)
    }

    /// The signable XDR body.
    pub fn xdr(&self) -> &xdr::Transaction {
        &self.tx
    }

    pub fn signatures(&self) -> &[DecoratedSignature] {
        &self.signatures
    }

    /// The network-tagged payload whose hash is what signers sign.
    pub fn signature_payload(&self, network: &Network) -> TransactionSignaturePayload {
        TransactionSignaturePayload {
            network_id: network.network_id(),
            tagged_transaction: TaggedTransaction::Tx(self.tx.clone()),
        }
    }

    /// The signing hash for this transaction on the given network.
    pub fn hash(&self, network: &Network) -> Result<[u8; 32], XdrError> {
        Ok(hash(&self.signature_payload(network).to_xdr()?))
    }

    /// Append one decorated signature from `keypair`. Repeated calls with
    /// different keys accumulate signatures for threshold multi-sig; no
    /// dedup is performed.
    pub fn sign(&mut self, keypair: &Keypair, network: &Network) -> Result<(), SdkError> {
        let payload_hash = self.hash(network)?;
        self.append_signature(keypair.sign_decorated(&payload_hash))?;
        Ok(())
    }

    /// Append a hash-x signature: the signature bytes are the preimage and
    /// the hint is the trailing 4 bytes of its SHA-256 (the signer key).
    pub fn sign_hash_x(&mut self, preimage: &[u8]) -> Result<(), TxError> {
        if preimage.len() > 64 {
            return Err(TxError::PreimageTooLong {
                len: preimage.len(),
            });
        }
        let signer = hash(preimage);
        let mut hint = [0u8; 4];
        hint.copy_from_slice(&signer[28..]);
        self.append_signature(DecoratedSignature {
            hint,
            signature: preimage.to_vec(),
        })
    }

    /// Append an externally produced decorated signature.
    pub fn append_signature(&mut self, sig: DecoratedSignature) -> Result<(), TxError> {
        if self.signatures.len() as u32 >= MAX_SIGNATURES {
            return Err(TxError::TooManySignatures);
        }
        self.signatures.push(sig);
        Ok(())
    }

    pub fn to_envelope(&self) -> TransactionEnvelope {
        TransactionEnvelope::Tx(TransactionV1Envelope {
            tx: self.tx.clone(),
            signatures: self.signatures.clone(),
        })
    }

    pub fn to_xdr_base64(&self) -> Result<String, XdrError> {
        self.to_envelope().to_xdr_base64()
    }

    /// Unwrap a v1 envelope. Legacy and fee-bump envelopes are refused —
    /// callers that need them handle [`TransactionEnvelope`] directly.
    pub fn from_envelope(envelope: TransactionEnvelope) -> Result<Self, TxError> {
        match envelope {
            TransactionEnvelope::Tx(e) => Ok(Self {
                tx: e.tx,
                signatures: e.signatures,
            }),
            other => Err(TxError::UnexpectedEnvelopeType {
                found: other.type_name(),
            }),
        }
    }

    pub fn from_xdr_base64(s: &str) -> Result<Self, SdkError> {
        let envelope = TransactionEnvelope::from_xdr_base64(s)?;
        Ok(Self::from_envelope(envelope)?)
    }
}

/// Builder for [`Transaction`]. Cardinality invariants are checked in
/// [`TransactionBuilder::build`], before anything can be signed.
pub struct TransactionBuilder {
    source: MuxedAccount,
    seq_num: i64,
    base_fee: u32,
    fee_override: Option<u32>,
    operations: Vec<Operation>,
    memo: Memo,
    time_bounds: Option<TimeBounds>,
    ledger_bounds: Option<LedgerBounds>,
    min_seq_num: Option<i64>,
    min_seq_age: u64,
    min_seq_ledger_gap: u32,
    extra_signers: Vec<SignerKey>,
}

impl TransactionBuilder {
    pub fn new(source: MuxedAccount, seq_num: i64) -> Self {
        Self {
            source,
            seq_num,
            base_fee: BASE_FEE,
            fee_override: None,
            operations: Vec::new(),
            memo: Memo::None,
            time_bounds: None,
            ledger_bounds: None,
            min_seq_num: None,
            min_seq_age: 0,
            min_seq_ledger_gap: 0,
            extra_signers: Vec::new(),
        }
    }

    pub fn add_operation(mut self, op: Operation) -> Self {
        self.operations.push(op);
        self
    }

    /// Per-operation fee. The total fee is `base_fee * operations`.
    pub fn base_fee(mut self, base_fee: u32) -> Self {
        self.base_fee = base_fee;
        self
    }

    /// Explicit total fee, overriding the per-operation computation.
    pub fn fee(mut self, fee: u32) -> Self {
        self.fee_override = Some(fee);
        self
    }

    pub fn memo(mut self, memo: Memo) -> Self {
        self.memo = memo;
        self
    }

    pub fn time_bounds(mut self, min_time: u64, max_time: u64) -> Self {
        self.time_bounds = Some(TimeBounds { min_time, max_time });
        self
    }

    pub fn ledger_bounds(mut self, min_ledger: u32, max_ledger: u32) -> Self {
        self.ledger_bounds = Some(LedgerBounds {
            min_ledger,
            max_ledger,
        });
        self
    }

    pub fn min_seq_num(mut self, seq: i64) -> Self {
        self.min_seq_num = Some(seq);
        self
    }

    pub fn min_seq_age(mut self, seconds: u64) -> Self {
        self.min_seq_age = seconds;
        self
    }

    pub fn min_seq_ledger_gap(mut self, gap: u32) -> Self {
        self.min_seq_ledger_gap = gap;
        self
    }

    pub fn extra_signer(mut self, signer: SignerKey) -> Self {
        self.extra_signers.push(signer);
        self
    }

    pub fn build(self) -> Result<Transaction, TxError> {
        if self.operations.is_empty() {
            return Err(TxError::NoOperations);
        }
        if self.operations.len() as u32 > MAX_OPS_PER_TX {
            return Err(TxError::TooManyOperations {
                count: self.operations.len(),
                max: MAX_OPS_PER_TX as usize,
            });
        }
        if let Memo::Text(t) = &self.memo {
            if t.len() as u32 > MAX_MEMO_TEXT {
                return Err(TxError::MemoTextTooLong { len: t.len() });
            }
        }
        for op in &self.operations {
            if let OperationBody::ManageData {
                data_name,
                data_value,
            } = &op.body
            {
                if data_name.len() as u32 > MAX_DATA_NAME {
                    return Err(TxError::DataNameTooLong {
                        len: data_name.len(),
                    });
                }
                if let Some(v) = data_value {
                    if v.len() as u32 > MAX_DATA_VALUE {
                        return Err(TxError::DataValueTooLong { len: v.len() });
                    }
                }
            }
        }
        if self.extra_signers.len() as u32 > MAX_EXTRA_SIGNERS {
            return Err(TxError::TooManyExtraSigners {
                count: self.extra_signers.len(),
            });
        }

        let fee = match self.fee_override {
            Some(fee) => fee,
            None => self
                .base_fee
                .checked_mul(self.operations.len() as u32)
                .ok_or(TxError::FeeOverflow {
                    base_fee: self.base_fee,
                    count: self.operations.len(),
                })?,
        };

        let uses_v2 = self.ledger_bounds.is_some()
            || self.min_seq_num.is_some()
            || self.min_seq_age != 0
            || self.min_seq_ledger_gap != 0
            || !self.extra_signers.is_empty();
        let cond = if uses_v2 {
            Preconditions::V2(PreconditionsV2 {
                time_bounds: self.time_bounds,
                ledger_bounds: self.ledger_bounds,
                min_seq_num: self.min_seq_num,
                min_seq_age: self.min_seq_age,
                min_seq_ledger_gap: self.min_seq_ledger_gap,
                extra_signers: self.extra_signers,
            })
        } else {
            match self.time_bounds {
                Some(tb) => Preconditions::Time(tb),
                None => Preconditions::None,
            }
        };

        Ok(Transaction {
            tx: xdr::Transaction {
                source_account: self.source,
                fee,
                seq_num: self.seq_num,
                cond,
                memo: self.memo,
                operations: self.operations,
            },
            signatures: Vec::new(),
        })
    }
}

/// Operation constructors. Source accounts default to the transaction
/// source; set `source_account` on the returned value to override.
pub mod ops {
    use super::*;

    pub fn create_account(destination: PublicKey, starting_balance: i64) -> Operation {
        Operation {
            source_account: None,
            body: OperationBody::CreateAccount {
                destination,
                starting_balance,
            },
        }
    }

    pub fn payment(destination: MuxedAccount, asset: Asset, amount: i64) -> Operation {
        Operation {
            source_account: None,
            body: OperationBody::Payment {
                destination,
                asset,
                amount,
            },
        }
    }

    pub fn manage_data(data_name: impl Into<String>, data_value: Option<Vec<u8>>) -> Operation {
        Operation {
            source_account: None,
            body: OperationBody::ManageData {
                data_name: data_name.into(),
                data_value,
            },
        }
    }

    pub fn bump_sequence(bump_to: i64) -> Operation {
        Operation {
            source_account: None,
            body: OperationBody::BumpSequence { bump_to },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::verify;

    fn source() -> MuxedAccount {
        MuxedAccount::Ed25519(Keypair::from_raw_seed([1u8; 32]).public_key())
    }

    fn payment_op() -> Operation {
        ops::payment(MuxedAccount::Ed25519([2u8; 32]), Asset::Native, 5_000_000)
    }

    #[test]
    fn empty_operation_list_is_rejected() {
        let err = Transaction::builder(source(), 1).build().unwrap_err();
        assert_eq!(err, TxError::NoOperations);
    }

    #[test]
    fn more_than_100_operations_is_rejected() {
        let mut b = Transaction::builder(source(), 1);
        for _ in 0..101 {
            b = b.add_operation(payment_op());
        }
        assert_eq!(
            b.build().unwrap_err(),
            TxError::TooManyOperations {
                count: 101,
                max: 100
            }
        );
    }

    #[test]
    fn memo_text_cap_is_enforced_at_build() {
        let err = Transaction::builder(source(), 1)
            .add_operation(payment_op())
            .memo(Memo::Text("x".repeat(29)))
            .build()
            .unwrap_err();
        assert_eq!(err, TxError::MemoTextTooLong { len: 29 });
    }

    #[test]
    fn fee_sums_per_operation_base_cost() {
        let tx = Transaction::builder(source(), 1)
            .add_operation(payment_op())
            .add_operation(payment_op())
            .add_operation(payment_op())
            .build()
            .unwrap();
        assert_eq!(tx.xdr().fee, 3 * BASE_FEE);
    }

    #[test]
    fn explicit_fee_overrides_computation() {
        let tx = Transaction::builder(source(), 1)
            .add_operation(payment_op())
            .fee(12345)
            .build()
            .unwrap();
        assert_eq!(tx.xdr().fee, 12345);
    }

    #[test]
    fn time_bounds_alone_use_the_time_precondition() {
        let tx = Transaction::builder(source(), 1)
            .add_operation(payment_op())
            .time_bounds(10, 20)
            .build()
            .unwrap();
        assert_eq!(
            tx.xdr().cond,
            Preconditions::Time(TimeBounds {
                min_time: 10,
                max_time: 20
            })
        );
    }

    #[test]
    fn v2_fields_promote_preconditions_to_v2() {
        let tx = Transaction::builder(source(), 1)
            .add_operation(payment_op())
            .time_bounds(10, 20)
            .min_seq_age(3600)
            .build()
            .unwrap();
        match tx.xdr().cond {
            Preconditions::V2(ref v2) => {
                assert_eq!(v2.min_seq_age, 3600);
                assert!(v2.time_bounds.is_some());
            }
            ref other => panic!("expected v2 preconditions, got {other:?}"),
        }
    }

    #[test]
    fn multisig_accumulates_one_signature_per_key() {
        let network = Network::testnet();
        let keys: Vec<Keypair> = (1u8..=3).map(|i| Keypair::from_raw_seed([i; 32])).collect();
        let mut tx = Transaction::builder(source(), 7)
            .add_operation(payment_op())
            .build()
            .unwrap();

        for kp in &keys {
            tx.sign(kp, &network).unwrap();
        }
        assert_eq!(tx.signatures().len(), 3);

        let payload_hash = tx.hash(&network).unwrap();
        for (kp, sig) in keys.iter().zip(tx.signatures()) {
            assert_eq!(sig.hint, kp.signature_hint());
            assert!(verify(&kp.public_key(), &payload_hash, &sig.signature));
        }
    }

    #[test]
    fn signatures_are_domain_separated_by_network() {
        let kp = Keypair::from_raw_seed([5u8; 32]);
        let build = || {
            Transaction::builder(source(), 7)
                .add_operation(payment_op())
                .build()
                .unwrap()
        };

        let mut on_test = build();
        on_test.sign(&kp, &Network::testnet()).unwrap();
        let mut on_public = build();
        on_public.sign(&kp, &Network::public()).unwrap();

        assert_ne!(
            on_test.signatures()[0].signature,
            on_public.signatures()[0].signature
        );

        let test_hash = on_test.hash(&Network::testnet()).unwrap();
        let public_hash = on_public.hash(&Network::public()).unwrap();
        assert!(verify(
            &kp.public_key(),
            &test_hash,
            &on_test.signatures()[0].signature
        ));
        assert!(!verify(
            &kp.public_key(),
            &public_hash,
            &on_test.signatures()[0].signature
        ));
    }

    #[test]
    fn signed_envelope_roundtrips_losslessly() {
        let kp = Keypair::from_raw_seed([8u8; 32]);
        let mut tx = Transaction::builder(source(), 42)
            .add_operation(payment_op())
            .memo(Memo::Id(77))
            .time_bounds(0, 2_000_000_000)
            .build()
            .unwrap();
        tx.sign(&kp, &Network::testnet()).unwrap();

        let b64 = tx.to_xdr_base64().unwrap();
        let restored = Transaction::from_xdr_base64(&b64).unwrap();
        assert_eq!(restored, tx);
    }

    #[test]
    fn hash_x_signature_carries_the_preimage() {
        let mut tx = Transaction::builder(source(), 1)
            .add_operation(payment_op())
            .build()
            .unwrap();
        let preimage = b"open sesame";
        tx.sign_hash_x(preimage).unwrap();

        let sig = &tx.signatures()[0];
        assert_eq!(sig.signature, preimage.to_vec());
        let signer = hash(preimage);
        assert_eq!(sig.hint, [signer[28], signer[29], signer[30], signer[31]]);
    }

    #[test]
    fn preimage_over_64_bytes_is_rejected() {
        let mut tx = Transaction::builder(source(), 1)
            .add_operation(payment_op())
            .build()
            .unwrap();
        assert_eq!(
            tx.sign_hash_x(&[0u8; 65]).unwrap_err(),
            TxError::PreimageTooLong { len: 65 }
        );
    }
}
