use ed25519_dalek::{Signer, SigningKey, VerifyingKey};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use thiserror::Error;

/// Value carried by an output. Signed on purpose: negative values are
/// representable and rejected during validation.
pub type Amount = Decimal;

/// SHA-256 identity of a transaction
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TxHash(#[serde(with = "hex")] [u8; 32]);

impl TxHash {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxHash({self})")
    }
}

/// Owner of an output: the raw bytes of an Ed25519 public key
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address(#[serde(with = "hex")] [u8; 32]);

impl Address {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<&VerifyingKey> for Address {
    fn from(key: &VerifyingKey) -> Self {
        Self(key.to_bytes())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransactionError {
    #[error("input index {index} out of range (transaction has {len} inputs)")]
    InputOutOfRange { index: usize, len: usize },
}

/// Claim on a previously created output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Input {
    pub prev_tx_hash: TxHash,
    pub output_index: u32,
    /// Empty until the input is signed
    #[serde(with = "hex", default)]
    pub signature: Vec<u8>,
}

impl Input {
    pub const fn new(prev_tx_hash: TxHash, output_index: u32) -> Self {
        Self {
            prev_tx_hash,
            output_index,
            signature: Vec::new(),
        }
    }

    fn write_claim(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(self.prev_tx_hash.as_bytes());
        buf.extend_from_slice(&self.output_index.to_be_bytes());
    }
}

/// Value assigned to an address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Output {
    pub value: Amount,
    pub address: Address,
}

impl Output {
    pub const fn new(value: Amount, address: Address) -> Self {
        Self { value, address }
    }

    fn write_to(&self, buf: &mut Vec<u8>) {
        // 10 and 10.0 must hash and sign identically
        buf.extend_from_slice(&self.value.normalize().serialize());
        buf.extend_from_slice(self.address.as_bytes());
    }
}

/// A ledger transaction.
///
/// The hash is derived from [`Transaction::raw_bytes`]. It is cached by
/// [`Transaction::finalize`] and dropped by every mutation, so
/// [`Transaction::hash`] always reflects the current content.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(default)]
    inputs: Vec<Input>,
    #[serde(default)]
    outputs: Vec<Output>,
    #[serde(skip)]
    hash: Option<TxHash>,
}

impl Transaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_input(&mut self, prev_tx_hash: TxHash, output_index: u32) {
        self.inputs.push(Input::new(prev_tx_hash, output_index));
        self.hash = None;
    }

    pub fn add_output(&mut self, value: Amount, address: Address) {
        self.outputs.push(Output::new(value, address));
        self.hash = None;
    }

    pub fn remove_input(&mut self, index: usize) -> Result<Input, TransactionError> {
        self.check_input_index(index)?;
        self.hash = None;

        Ok(self.inputs.remove(index))
    }

    pub fn add_signature(
        &mut self,
        signature: Vec<u8>,
        index: usize,
    ) -> Result<(), TransactionError> {
        self.check_input_index(index)?;
        self.inputs[index].signature = signature;
        self.hash = None;

        Ok(())
    }

    /// Sign input `index` over its signable content
    pub fn sign_input(&mut self, key: &SigningKey, index: usize) -> Result<(), TransactionError> {
        let message = self
            .signable_bytes(index)
            .ok_or(TransactionError::InputOutOfRange {
                index,
                len: self.inputs.len(),
            })?;
        let signature = key.sign(&message);

        self.add_signature(signature.to_bytes().to_vec(), index)
    }

    /// Bytes the owner of the output claimed by input `index` must sign:
    /// that input's claim followed by every output. Returns `None` when the
    /// input does not exist.
    pub fn signable_bytes(&self, index: usize) -> Option<Vec<u8>> {
        let input = self.inputs.get(index)?;
        let mut buf = Vec::with_capacity(36 + self.outputs.len() * 48);

        input.write_claim(&mut buf);
        for output in &self.outputs {
            output.write_to(&mut buf);
        }

        Some(buf)
    }

    /// Full content of the transaction including signatures. Counts and
    /// signature lengths are encoded so distinct transactions never share
    /// an encoding.
    pub fn raw_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();

        write_len(&mut buf, self.inputs.len());
        for input in &self.inputs {
            input.write_claim(&mut buf);
            write_len(&mut buf, input.signature.len());
            buf.extend_from_slice(&input.signature);
        }

        write_len(&mut buf, self.outputs.len());
        for output in &self.outputs {
            output.write_to(&mut buf);
        }

        buf
    }

    pub fn finalize(&mut self) -> TxHash {
        let hash = self.compute_hash();
        self.hash = Some(hash);

        hash
    }

    pub fn hash(&self) -> TxHash {
        self.hash.unwrap_or_else(|| self.compute_hash())
    }

    pub fn inputs(&self) -> &[Input] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Output] {
        &self.outputs
    }

    pub fn input(&self, index: usize) -> Option<&Input> {
        self.inputs.get(index)
    }

    pub fn output(&self, index: usize) -> Option<&Output> {
        self.outputs.get(index)
    }

    pub fn num_inputs(&self) -> usize {
        self.inputs.len()
    }

    pub fn num_outputs(&self) -> usize {
        self.outputs.len()
    }

    fn compute_hash(&self) -> TxHash {
        TxHash(Sha256::digest(self.raw_bytes()).into())
    }

    fn check_input_index(&self, index: usize) -> Result<(), TransactionError> {
        if index < self.inputs.len() {
            return Ok(());
        }

        Err(TransactionError::InputOutOfRange {
            index,
            len: self.inputs.len(),
        })
    }
}

fn write_len(buf: &mut Vec<u8>, len: usize) {
    // u64 so no in-memory length can be truncated
    buf.extend_from_slice(&(len as u64).to_be_bytes());
}

impl PartialEq for Transaction {
    fn eq(&self, other: &Self) -> bool {
        self.inputs == other.inputs && self.outputs == other.outputs
    }
}

impl Eq for Transaction {}
