use crate::crypto::{Ed25519Verifier, SignatureVerifier};
use crate::transaction::{Transaction, TxHash};
use crate::utxo::{Utxo, UtxoPool};
use crate::validator::{ValidationError, Validator};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

/// A candidate left out of an epoch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// Position of the candidate in the submitted batch
    pub position: usize,
    pub hash: TxHash,
    pub reason: ValidationError,
}

/// Outcome of one epoch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EpochReport {
    /// Accepted transactions in acceptance order
    pub accepted: Vec<Transaction>,
    pub rejected: Vec<Rejection>,
}

/// Owns the ledger's UTXO pool and applies epochs of candidate transactions to it.
///
/// Selection is greedy and order-sensitive: candidates are checked in the
/// order given, against the pool as left by every earlier acceptance of the
/// same epoch. Of two candidates claiming the same output, the first one
/// wins. Reordering a batch can change what is accepted.
#[derive(Debug, Clone)]
pub struct TxHandler<V = Ed25519Verifier> {
    pool: UtxoPool,
    validator: Validator<V>,
    /// Unspent output count per producing transaction
    producers: HashMap<TxHash, usize>,
}

impl TxHandler {
    /// Works on a copy of `pool`; the caller's pool is never modified
    pub fn new(pool: &UtxoPool) -> Self {
        Self::with_verifier(pool, Ed25519Verifier)
    }
}

impl<V: SignatureVerifier> TxHandler<V> {
    pub fn with_verifier(pool: &UtxoPool, verifier: V) -> Self {
        let pool = pool.clone();
        let mut producers = HashMap::new();
        for (utxo, _) in pool.iter() {
            *producers.entry(utxo.tx_hash).or_insert(0) += 1;
        }

        Self {
            pool,
            validator: Validator::new(verifier),
            producers,
        }
    }

    pub fn is_valid_tx(&self, tx: &Transaction) -> bool {
        self.validator.is_valid(tx, &self.pool)
    }

    pub fn check_tx(&self, tx: &Transaction) -> Result<(), ValidationError> {
        self.validator.check(tx, &self.pool)
    }

    /// Applies `candidates` in order and returns the accepted ones
    pub fn handle_txs(&mut self, candidates: &[Transaction]) -> Vec<Transaction> {
        self.handle_epoch(candidates).accepted
    }

    /// Applies `candidates` in order. Each accepted transaction immediately
    /// spends its claimed outputs and adds its own before the next candidate
    /// is checked. `report.accepted` is the accepted sequence in acceptance
    /// order, the same list [`TxHandler::handle_txs`] returns.
    ///
    /// A candidate is rejected as a duplicate when its hash still has
    /// unspent outputs in the pool or was already accepted in this epoch.
    pub fn handle_epoch(&mut self, candidates: &[Transaction]) -> EpochReport {
        let mut report = EpochReport::default();
        let mut accepted_hashes = HashSet::new();

        for (position, tx) in candidates.iter().enumerate() {
            let hash = tx.hash();

            match self.admit(tx, hash, &accepted_hashes) {
                Ok(()) => {
                    self.apply(tx, hash);
                    accepted_hashes.insert(hash);
                    report.accepted.push(tx.clone());
                }
                Err(reason) => {
                    debug!("Rejected candidate {position} ({hash}): {reason}");
                    report.rejected.push(Rejection {
                        position,
                        hash,
                        reason,
                    });
                }
            }
        }

        info!(
            "Epoch accepted {} of {} candidates, {} unspent outputs",
            report.accepted.len(),
            candidates.len(),
            self.pool.len(),
        );

        report
    }

    pub const fn pool(&self) -> &UtxoPool {
        &self.pool
    }

    pub fn into_pool(self) -> UtxoPool {
        self.pool
    }

    fn admit(
        &self,
        tx: &Transaction,
        hash: TxHash,
        accepted_hashes: &HashSet<TxHash>,
    ) -> Result<(), ValidationError> {
        if self.producers.contains_key(&hash) || accepted_hashes.contains(&hash) {
            warn!("Transaction {hash} submitted again after being applied");

            return Err(ValidationError::DuplicateTransaction(hash));
        }

        self.validator.check(tx, &self.pool)
    }

    fn apply(&mut self, tx: &Transaction, hash: TxHash) {
        for input in tx.inputs() {
            let spent = self
                .pool
                .remove(&Utxo::new(input.prev_tx_hash, input.output_index));

            if spent.is_some() {
                self.release(input.prev_tx_hash);
            }
        }

        for (index, output) in (0u32..).zip(tx.outputs()) {
            self.pool.insert(Utxo::new(hash, index), *output);
        }

        if !tx.outputs().is_empty() {
            self.producers.insert(hash, tx.num_outputs());
        }
    }

    fn release(&mut self, producer: TxHash) {
        if let Some(live) = self.producers.get_mut(&producer) {
            *live -= 1;

            if *live == 0 {
                self.producers.remove(&producer);
            }
        }
    }
}
