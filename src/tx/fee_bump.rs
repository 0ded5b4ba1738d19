//! Fee-bump transactions — an independent fee payer wrapped around a fully
//! signed envelope.

use crate::crypto::{hash, Keypair};
use crate::error::{SdkError, TxError, XdrError};
use crate::network::Network;
use crate::tx::Transaction;
use crate::xdr::types::MAX_SIGNATURES;
use crate::xdr::{
    self, DecoratedSignature, MuxedAccount, ReadXdr, TaggedTransaction, TransactionEnvelope,
    TransactionSignaturePayload, TransactionV1Envelope, WriteXdr,
};

/// A fee bump plus its own signatures. The inner envelope is embedded as
/// received and is never re-signed or otherwise mutated by wrapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeBumpTransaction {
    tx: xdr::FeeBumpTransaction,
    signatures: Vec<DecoratedSignature>,
}

impl FeeBumpTransaction {
    /// Wrap `inner` with a new fee source. `base_fee` is per operation and
    /// covers the inner operations plus the fee bump itself.
    pub fn new(fee_source: MuxedAccount, base_fee: u32, inner: &Transaction) -> Self {
        let op_count = inner.xdr().operations.len() as i64 + 1;
        Self {
            tx: xdr::FeeBumpTransaction {
                fee_source,
                fee: base_fee as i64 * op_count,
                inner_tx: TransactionV1Envelope {
                    tx: inner.xdr().clone(),
                    signatures: inner.signatures().to_vec(),
                },
            },
            signatures: Vec::new(),
        }
    }

    pub fn xdr(&self) -> &xdr::FeeBumpTransaction {
        &self.tx
    }

    /// The wrapped envelope, exactly as it was when wrapped.
    pub fn inner(&self) -> &TransactionV1Envelope {
        &self.tx.inner_tx
    }

    pub fn signatures(&self) -> &[DecoratedSignature] {
        &self.signatures
    }

    /// The fee bump's own signing payload: tagged with the fee-bump
    /// envelope type, embedding the inner envelope's full encoding.
    pub fn signature_payload(&self, network: &Network) -> TransactionSignaturePayload {
        TransactionSignaturePayload {
            network_id: network.network_id(),
            tagged_transaction: TaggedTransaction::TxFeeBump(self.tx.clone()),
        }
    }

    pub fn hash(&self, network: &Network) -> Result<[u8; 32], XdrError> {
        Ok(hash(&self.signature_payload(network).to_xdr()?))
    }

    pub fn sign(&mut self, keypair: &Keypair, network: &Network) -> Result<(), SdkError> {
        let payload_hash = self.hash(network)?;
        self.append_signature(keypair.sign_decorated(&payload_hash))?;
        Ok(())
    }

    pub fn append_signature(&mut self, sig: DecoratedSignature) -> Result<(), TxError> {
        if self.signatures.len() as u32 >= MAX_SIGNATURES {
            return Err(TxError::TooManySignatures);
        }
        self.signatures.push(sig);
        Ok(())
    }

    pub fn to_envelope(&self) -> TransactionEnvelope {
        TransactionEnvelope::TxFeeBump(xdr::FeeBumpTransactionEnvelope {
            tx: self.tx.clone(),
            signatures: self.signatures.clone(),
        })
    }

    pub fn to_xdr_base64(&self) -> Result<String, XdrError> {
        self.to_envelope().to_xdr_base64()
    }

    pub fn from_envelope(envelope: TransactionEnvelope) -> Result<Self, TxError> {
        match envelope {
            TransactionEnvelope::TxFeeBump(e) => Ok(Self {
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
