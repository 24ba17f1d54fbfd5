pub mod crypto;
pub mod handler;
pub mod transaction;
pub mod utxo;
pub mod validator;

#[cfg(test)]
mod testing;

use handler::TxHandler;
use transaction::Transaction;
use utxo::UtxoPool;

/// Run one epoch over `candidates` starting from `pool` and return the
/// accepted transactions along with the resulting pool
pub fn process_epoch(pool: &UtxoPool, candidates: &[Transaction]) -> (Vec<Transaction>, UtxoPool) {
    let mut handler = TxHandler::new(pool);
    let accepted = handler.handle_txs(candidates);

    (accepted, handler.into_pool())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{pool_with, spend};

    #[test]
    fn test_process_epoch() {
        let pool = pool_with(&[(1, 10), (2, 5)]);
        let tx = spend(1, &[(3, 10)]);

        let (accepted, next) = process_epoch(&pool, &[tx.clone(), spend(1, &[(4, 1)])]);

        assert_eq!(accepted, vec![tx]);
        assert_eq!(next.len(), 2);
        assert_eq!(pool.len(), 2);
    }
}
