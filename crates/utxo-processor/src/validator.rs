use crate::crypto::{Ed25519Verifier, SignatureVerifier};
use crate::transaction::{Amount, Transaction, TxHash};
use crate::utxo::{Utxo, UtxoPool};
use rust_decimal::Decimal;
use std::collections::HashSet;
use thiserror::Error;

/// Why a transaction was not accepted
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("input {input} claims {utxo:?}, which is not in the pool")]
    MissingUtxo { input: usize, utxo: Utxo },

    #[error("input {input} claims {utxo:?} a second time")]
    DuplicateClaim { input: usize, utxo: Utxo },

    #[error("input {input} has no valid signature from the owner of the claimed output")]
    InvalidSignature { input: usize },

    #[error("output {output} has negative value {value}")]
    NegativeOutput { output: usize, value: Amount },

    /// Totals saturate at `Decimal::MAX`
    #[error("outputs ({outputs}) exceed inputs ({inputs})")]
    InsufficientInput { inputs: Amount, outputs: Amount },

    #[error("transaction {0} was already applied")]
    DuplicateTransaction(TxHash),
}

/// Stateless transaction rules. Pool state is always borrowed, never held.
#[derive(Debug, Clone, Default)]
pub struct Validator<V = Ed25519Verifier> {
    verifier: V,
}

impl<V: SignatureVerifier> Validator<V> {
    pub const fn new(verifier: V) -> Self {
        Self { verifier }
    }

    pub fn is_valid(&self, tx: &Transaction, pool: &UtxoPool) -> bool {
        self.check(tx, pool).is_ok()
    }

    /// Accepts `tx` iff every input claims a distinct pool entry with a valid
    /// signature from its owner, no output is negative, and the claimed value
    /// covers the declared outputs. The first failing rule is reported.
    pub fn check(&self, tx: &Transaction, pool: &UtxoPool) -> Result<(), ValidationError> {
        let claimed = self.check_inputs(tx, pool)?;
        let declared = Self::check_outputs(tx)?;

        if !covers(&claimed, &declared) {
            return Err(ValidationError::InsufficientInput {
                inputs: saturating_sum(&claimed),
                outputs: saturating_sum(&declared),
            });
        }

        Ok(())
    }

    /// Returns the values claimed by the inputs, in input order
    fn check_inputs(
        &self,
        tx: &Transaction,
        pool: &UtxoPool,
    ) -> Result<Vec<Amount>, ValidationError> {
        let mut claimed = HashSet::with_capacity(tx.num_inputs());
        let mut values = Vec::with_capacity(tx.num_inputs());

        for (index, input) in tx.inputs().iter().enumerate() {
            let utxo = Utxo::new(input.prev_tx_hash, input.output_index);

            let output = pool
                .get(&utxo)
                .ok_or(ValidationError::MissingUtxo { input: index, utxo })?;

            if !claimed.insert(utxo) {
                return Err(ValidationError::DuplicateClaim { input: index, utxo });
            }

            let authorized = tx.signable_bytes(index).is_some_and(|message| {
                self.verifier
                    .verify(&output.address, &message, &input.signature)
            });
            if !authorized {
                return Err(ValidationError::InvalidSignature { input: index });
            }

            values.push(output.value);
        }

        Ok(values)
    }

    /// Returns the declared output values once all are known to be non-negative
    fn check_outputs(tx: &Transaction) -> Result<Vec<Amount>, ValidationError> {
        let mut values = Vec::with_capacity(tx.num_outputs());

        for (index, output) in tx.outputs().iter().enumerate() {
            if output.value < Decimal::ZERO {
                return Err(ValidationError::NegativeOutput {
                    output: index,
                    value: output.value,
                });
            }

            values.push(output.value);
        }

        Ok(values)
    }
}

/// Whether `credits` sum to at least `debits`, decided without forming
/// either sum so that totals beyond `Decimal::MAX` still compare exactly.
///
/// Negative entries are moved to the opposite side first. The walk then
/// subtracts a debit while the balance is non-negative and adds a credit
/// while it is negative, which keeps the balance within `[-MAX, MAX]`.
fn covers(credits: &[Amount], debits: &[Amount]) -> bool {
    let (mut gains, mut losses): (Vec<Amount>, Vec<Amount>) = (Vec::new(), Vec::new());

    for &value in credits {
        if value < Decimal::ZERO {
            losses.push(-value);
        } else {
            gains.push(value);
        }
    }
    for &value in debits {
        if value < Decimal::ZERO {
            gains.push(-value);
        } else {
            losses.push(value);
        }
    }

    let mut gains = gains.into_iter();
    let mut losses = losses.into_iter();
    let mut balance = Decimal::ZERO;

    loop {
        if balance < Decimal::ZERO {
            match gains.next() {
                Some(value) => balance += value,
                None => return false,
            }
        } else {
            match losses.next() {
                Some(value) => balance -= value,
                None => return true,
            }
        }
    }
}

fn saturating_sum(values: &[Amount]) -> Amount {
    values
        .iter()
        .fold(Decimal::ZERO, |acc, value| acc.saturating_add(*value))
}
