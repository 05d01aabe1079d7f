//! The transaction record shape the core hands back to callers and reads
//! back out of the transaction store during fork rebase.
//!
//! Grounded on the `TransactionRecord` construction in
//! `create_update_state_spend`/`generate_new_reporter`, trimmed to the
//! fields this core actually reads (`fee_amount`, `spend_bundle`,
//! `additions`, `removals`) rather than the full wallet-RPC record shape,
//! since persistence/wire format ownership belongs to the external
//! transaction store.

use crate::types::{Bytes32, Coin, SpendBundle};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRecord {
    pub name: Bytes32,
    pub to_puzzle_hash: Bytes32,
    pub amount: u64,
    pub fee_amount: u64,
    pub confirmed: bool,
    pub spend_bundle: Option<SpendBundle>,
    pub additions: Vec<Coin>,
    pub removals: Vec<Coin>,
}

impl TransactionRecord {
    pub fn fee(&self) -> u64 {
        self.fee_amount
    }
}
