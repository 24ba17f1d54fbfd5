use crate::transaction::{Address, Amount, Output, TxHash};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Key of one spendable output: the producing transaction and the output's position in it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Utxo {
    pub tx_hash: TxHash,
    pub index: u32,
}

impl Utxo {
    pub const fn new(tx_hash: TxHash, index: u32) -> Self {
        Self { tx_hash, index }
    }
}

/// Flat UTXO row used for CSV import and export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtxoRecord {
    pub tx_hash: TxHash,
    pub index: u32,
    pub address: Address,
    pub value: Amount,
}

impl UtxoRecord {
    pub const fn new(utxo: Utxo, output: &Output) -> Self {
        Self {
            tx_hash: utxo.tx_hash,
            index: utxo.index,
            address: output.address,
            value: output.value,
        }
    }
}

/// Currently spendable outputs.
///
/// `Clone` is the defensive copy: outputs are plain values, so a cloned pool
/// shares nothing with its source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UtxoPool {
    utxos: HashMap<Utxo, Output>,
}

impl UtxoPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: impl IntoIterator<Item = UtxoRecord>) -> Self {
        let mut pool = Self::new();

        for record in records {
            pool.insert(
                Utxo::new(record.tx_hash, record.index),
                Output::new(record.value, record.address),
            );
        }

        pool
    }

    pub fn contains(&self, utxo: &Utxo) -> bool {
        self.utxos.contains_key(utxo)
    }

    pub fn get(&self, utxo: &Utxo) -> Option<&Output> {
        self.utxos.get(utxo)
    }

    /// Adds or overwrites the mapping for `utxo`
    pub fn insert(&mut self, utxo: Utxo, output: Output) {
        self.utxos.insert(utxo, output);
    }

    /// Removing an absent key is a no-op
    pub fn remove(&mut self, utxo: &Utxo) -> Option<Output> {
        self.utxos.remove(utxo)
    }

    /// All keys, in no particular order
    pub fn all_utxos(&self) -> Vec<Utxo> {
        self.utxos.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Utxo, &Output)> {
        self.utxos.iter()
    }

    pub fn len(&self) -> usize {
        self.utxos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utxos.is_empty()
    }

    /// Sum of every output value, `None` on overflow
    pub fn total_value(&self) -> Option<Amount> {
        self.utxos
            .values()
            .try_fold(Decimal::ZERO, |acc, output| acc.checked_add(output.value))
    }

    /// Rows ordered by transaction hash, then output index
    pub fn records(&self) -> Vec<UtxoRecord> {
        let mut records: Vec<_> = self
            .utxos
            .iter()
            .map(|(utxo, output)| UtxoRecord::new(*utxo, output))
            .collect();

        records.sort_by_key(|record| (record.tx_hash, record.index));
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{address, amount, genesis, pool_with};

    #[test]
    fn test_insert_lookup_remove() {
        let mut pool = UtxoPool::new();
        let output = Output::new(amount(10), address(1));

        pool.insert(genesis(1), output);

        assert!(pool.contains(&genesis(1)));
        assert_eq!(pool.get(&genesis(1)), Some(&output));
        assert_eq!(pool.remove(&genesis(1)), Some(output));
        assert!(!pool.contains(&genesis(1)));
        assert!(pool.get(&genesis(1)).is_none());
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut pool = pool_with(&[(1, 10)]);
        let before = pool.clone();

        assert!(pool.remove(&genesis(2)).is_none());
        assert_eq!(pool, before);
    }

    #[test]
    fn test_insert_overwrites() {
        let mut pool = pool_with(&[(1, 10)]);

        pool.insert(genesis(1), Output::new(amount(3), address(2)));

        assert_eq!(pool.len(), 1);
        assert_eq!(pool.get(&genesis(1)).unwrap().value, amount(3));
    }

    #[test]
    fn test_clone_is_independent() {
        let original = pool_with(&[(1, 10), (2, 5)]);
        let mut copy = original.clone();

        copy.remove(&genesis(1));
        copy.insert(genesis(3), Output::new(amount(7), address(3)));

        assert_eq!(original.len(), 2);
        assert!(original.contains(&genesis(1)));
        assert!(!original.contains(&genesis(3)));
    }

    #[test]
    fn test_all_utxos_and_total() {
        let pool = pool_with(&[(1, 10), (2, 5)]);

        let mut utxos = pool.all_utxos();
        utxos.sort();

        assert_eq!(utxos, vec![genesis(1), genesis(2)]);
        assert_eq!(pool.total_value(), Some(amount(15)));
        assert_eq!(UtxoPool::new().total_value(), Some(Decimal::ZERO));
    }

    #[test]
    fn test_records_are_sorted_and_reload() {
        let mut pool = pool_with(&[(2, 5), (1, 10)]);
        pool.insert(Utxo::new(TxHash::new([1; 32]), 1), Output::new(amount(1), address(3)));

        let records = pool.records();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].tx_hash, TxHash::new([1; 32]));
        assert_eq!(records[0].index, 0);
        assert_eq!(records[1].index, 1);
        assert_eq!(records[2].tx_hash, TxHash::new([2; 32]));
        assert_eq!(UtxoPool::from_records(records), pool);
    }
}
