use crate::transaction::{Address, Amount, Output, Transaction, TxHash};
use crate::utxo::{Utxo, UtxoPool};
use ed25519_dalek::SigningKey;
use rust_decimal::Decimal;

pub fn key(seed: u8) -> SigningKey {
    SigningKey::from_bytes(&[seed; 32])
}

pub fn address(seed: u8) -> Address {
    Address::from(&key(seed).verifying_key())
}

pub fn amount(value: i64) -> Amount {
    Decimal::from(value)
}

pub fn genesis(seed: u8) -> Utxo {
    Utxo::new(TxHash::new([seed; 32]), 0)
}

/// Pool holding one output of `value` per `(seed, value)` pair, owned by `address(seed)`
pub fn pool_with(entries: &[(u8, i64)]) -> UtxoPool {
    let mut pool = UtxoPool::new();

    for &(seed, value) in entries {
        pool.insert(genesis(seed), Output::new(amount(value), address(seed)));
    }

    pool
}

/// Spends `genesis(seed)` signed by `key(seed)` into the given outputs
pub fn spend(seed: u8, outputs: &[(u8, i64)]) -> Transaction {
    let mut tx = Transaction::new();
    tx.add_input(TxHash::new([seed; 32]), 0);

    for &(owner, value) in outputs {
        tx.add_output(amount(value), address(owner));
    }

    tx.sign_input(&key(seed), 0).unwrap();
    tx.finalize();
    tx
}
