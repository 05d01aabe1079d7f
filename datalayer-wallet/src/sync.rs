//! Component D: sync / removal handling (SPEC_FULL.md §4.D).
//!
//! Grounded on `singleton_removed` in the original wallet's syncing
//! section.

use std::sync::Arc;

use crate::collaborators::{ChainQuery, InterestRegistry, ScriptEvaluator};
use crate::fork::ForkDetector;
use crate::record::{recognize_singleton_layer, LineageProof, SingletonRecord};
use crate::store::{SingletonStore, TransactionStore};
use crate::types::{Bytes32, Coin, CoinSpend, Condition};

/// Cost cap applied when running a singleton's puzzle against the solution
/// of its observed spend.
const SYNC_COST_CAP: u64 = 11_000_000_000;

pub struct SyncHandler<S, Q, I, E, T, W, D, Si> {
    store: Arc<S>,
    chain: Arc<Q>,
    interests: Arc<I>,
    evaluator: Arc<E>,
    fork_detector: ForkDetector<S, T, W, D, Si>,
}

impl<S, Q, I, E, T, W, D, Si> SyncHandler<S, Q, I, E, T, W, D, Si>
where
    S: SingletonStore,
    Q: ChainQuery,
    I: InterestRegistry,
    E: ScriptEvaluator,
    T: TransactionStore,
{
    pub fn new(
        store: Arc<S>,
        chain: Arc<Q>,
        interests: Arc<I>,
        evaluator: Arc<E>,
        fork_detector: ForkDetector<S, T, W, D, Si>,
    ) -> Self {
        SyncHandler {
            store,
            chain,
            interests,
            evaluator,
            fork_detector,
        }
    }

    /// `singleton_removed` (SPEC_FULL.md §4.D). Never returns an error to
    /// the caller: every recoverable failure path is logged and absorbed,
    /// per SPEC_FULL.md §7's propagation policy.
    pub async fn singleton_removed(&self, parent_spend: CoinSpend, height: u32)
    where
        W: crate::collaborators::StandardWallet,
        D: crate::collaborators::DerivationIndex,
        Si: crate::collaborators::Signer,
    {
        let parent_name = parent_spend.coin.name();

        if !recognize_singleton_layer(&parent_spend.puzzle_reveal) {
            return;
        }

        let Some(parent_record) = self.store.get_singleton_record(parent_name).await else {
            log::warn!(
                "DL wallet received coin it does not have parent for. Expected parent {parent_name}."
            );
            return;
        };
        log::info!("DL singleton removed: {parent_name}");

        let conditions = match self
            .evaluator
            .run(
                &parent_spend.puzzle_reveal,
                &parent_spend.solution,
                SYNC_COST_CAP,
            )
            .await
        {
            Ok(conditions) => conditions,
            Err(err) => {
                log::warn!("failed to evaluate spend of {parent_name}: {err}");
                return;
            }
        };

        let successor = match find_successor(&conditions) {
            FoundSuccessor::None => {
                log::warn!(
                    "singleton with launcher ID {} was melted",
                    parent_record.launcher_id
                );
                return;
            }
            FoundSuccessor::MissingHint => {
                log::warn!(
                    "parent {parent_name} with launcher {} did not hint its child properly",
                    parent_record.launcher_id
                );
                return;
            }
            FoundSuccessor::Found {
                full_puzzle_hash,
                amount,
                root,
                inner_puzzle_hash,
            } => (full_puzzle_hash, amount, root, inner_puzzle_hash),
        };
        let (full_puzzle_hash, amount, root, inner_puzzle_hash) = successor;

        let new_singleton = Coin::new(parent_name, full_puzzle_hash, amount);
        let timestamp = match self.chain.get_timestamp_for_height(height).await {
            Ok(timestamp) => timestamp,
            Err(err) => {
                log::warn!("failed to fetch timestamp for height {height}: {err}");
                return;
            }
        };

        let record = match SingletonRecord::new(
            parent_record.launcher_id,
            root,
            inner_puzzle_hash,
            amount,
            LineageProof {
                parent_name,
                parent_inner_puzzle_hash: Some(parent_record.inner_puzzle_hash),
                parent_amount: parent_record.amount,
            },
            parent_record.generation + 1,
            true,
            height,
            timestamp,
            false,
        ) {
            Ok(record) => record,
            Err(err) => {
                log::warn!("refusing to insert inconsistent successor of {parent_name}: {err}");
                return;
            }
        };

        if record.coin_id != new_singleton.name() {
            log::error!(
                "store invariant violated: derived coin id for successor of {parent_name} disagrees with the observed coin"
            );
            panic!("singleton coin id derivation mismatch for parent {parent_name}");
        }

        if let Err(err) = self.store.add_singleton_record(record).await {
            log::error!("{err}");
            panic!("{err}");
        }
        if let Err(err) = self
            .interests
            .add_interested_coin_ids(&[record.coin_id])
            .await
        {
            log::warn!("failed to register interest in {}: {err}", record.coin_id);
        }

        self.fork_detector
            .potentially_handle_resubmit(parent_record.launcher_id)
            .await;
    }
}

enum FoundSuccessor {
    None,
    MissingHint,
    Found {
        full_puzzle_hash: Bytes32,
        amount: u64,
        root: Bytes32,
        inner_puzzle_hash: Bytes32,
    },
}

/// Scans a condition list for the first odd-amount `CREATE_COIN`, the
/// canonical successor per SPEC_FULL.md §4.D step 4.
fn find_successor(conditions: &[Condition]) -> FoundSuccessor {
    for condition in conditions {
        if let Condition::CreateCoin {
            puzzle_hash,
            amount,
            memos,
        } = condition
        {
            if *amount % 2 == 1 {
                return if memos.len() >= 2 {
                    FoundSuccessor::Found {
                        full_puzzle_hash: *puzzle_hash,
                        amount: *amount,
                        root: memos[0],
                        inner_puzzle_hash: memos[1],
                    }
                } else {
                    FoundSuccessor::MissingHint
                };
            }
        }
    }
    FoundSuccessor::None
}
