//! Component E: fork detection and automatic rebase (SPEC_FULL.md §4.E).
//!
//! Grounded on `potentially_handle_resubmit` in the original wallet's
//! syncing section.

use std::collections::HashSet;
use std::sync::Arc;

use crate::collaborators::{DerivationIndex, Signer, StandardWallet};
use crate::store::{SingletonStore, TransactionStore};
use crate::successor::{SuccessorAuthor, UpdateStateParams};
use crate::types::Bytes32;

pub struct ForkDetector<S, T, W, D, Si> {
    store: Arc<S>,
    tx_store: Arc<T>,
    successor_author: Arc<SuccessorAuthor<S, W, D, Si>>,
}

impl<S, T, W, D, Si> Clone for ForkDetector<S, T, W, D, Si> {
    fn clone(&self) -> Self {
        ForkDetector {
            store: self.store.clone(),
            tx_store: self.tx_store.clone(),
            successor_author: self.successor_author.clone(),
        }
    }
}

impl<S, T, W, D, Si> ForkDetector<S, T, W, D, Si>
where
    S: SingletonStore,
    T: TransactionStore,
    W: StandardWallet,
    D: DerivationIndex,
    Si: Signer,
{
    pub fn new(
        store: Arc<S>,
        tx_store: Arc<T>,
        successor_author: Arc<SuccessorAuthor<S, W, D, Si>>,
    ) -> Self {
        ForkDetector {
            store,
            tx_store,
            successor_author,
        }
    }

    /// `potentially_handle_resubmit` (SPEC_FULL.md §4.E). Never raises to
    /// its caller: rebase failures are absorbed into a warning log, per
    /// SPEC_FULL.md §7.
    pub async fn potentially_handle_resubmit(&self, launcher_id: Bytes32) {
        let mut pending = self.store.get_unconfirmed_singletons(launcher_id).await;
        if pending.is_empty() {
            return;
        }
        pending.sort_by_key(|r| r.generation);

        let branch = self
            .store
            .get_all_singletons_for_launcher(launcher_id, Some(pending[0].generation), None, None)
            .await;

        let pending_ids: HashSet<Bytes32> = pending.iter().map(|r| r.coin_id).collect();
        let branch_ids: HashSet<Bytes32> = branch.iter().map(|r| r.coin_id).collect();
        if pending_ids == branch_ids {
            return;
        }

        log::info!("fork detected for launcher {launcher_id}, attempting automatic rebase");

        let parent_name = pending[0].lineage_proof.parent_name;
        let parent_singleton = self.store.get_singleton_record(parent_name).await;
        let root_changed = match &parent_singleton {
            None => true,
            Some(parent) => branch.iter().any(|s| s.confirmed && s.root != parent.root),
        };

        // Regardless of whether the root changed, the old pending branch is
        // stale: find its transactions, delete them, then delete the
        // records themselves.
        let mut relevant_dl_txs = Vec::new();
        for singleton in &pending {
            if let Some(tx) = self.tx_store.get(singleton.lineage_proof.parent_name).await {
                relevant_dl_txs.push(tx);
            }
        }

        let all_removal_ids: HashSet<Bytes32> = relevant_dl_txs
            .iter()
            .flat_map(|tx| tx.removals.iter().map(|c| c.name()))
            .collect();
        let unconfirmed_std_txs = self.tx_store.get_unconfirmed_for_standard_wallet().await;
        let relevant_std_txs: Vec<_> = unconfirmed_std_txs
            .into_iter()
            .filter(|tx| {
                tx.removals
                    .iter()
                    .any(|c| all_removal_ids.contains(&c.name()))
            })
            .collect();

        for tx in relevant_dl_txs.iter().chain(relevant_std_txs.iter()) {
            self.tx_store.delete(tx.name).await;
        }
        for singleton in &pending {
            self.store.delete_singleton_record(singleton.coin_id).await;
        }

        if root_changed {
            log::info!(
                "root changed during fork for launcher {launcher_id}; pending state discarded"
            );
            return;
        }

        // Attempt the rebase: re-author each vanished pending singleton's
        // root on top of the new confirmed head, carrying its original fee
        // forward.
        let mut rebased_coin_ids = Vec::new();
        let mut failed = false;
        for singleton in &pending {
            let fee = relevant_dl_txs
                .iter()
                .find(|tx| tx.additions.iter().any(|c| c.name() == singleton.coin_id))
                .map(|tx| tx.fee_amount)
                .unwrap_or(0);

            let params = UpdateStateParams {
                new_root: Some(singleton.root),
                fee,
                sign: true,
                add_pending: true,
                ..Default::default()
            };
            match self
                .successor_author
                .create_update_state_spend(launcher_id, params)
                .await
            {
                Ok(txs) => {
                    for tx in txs {
                        self.tx_store.insert(tx).await;
                    }
                    if let Some(latest) = self.store.get_latest_singleton(launcher_id, false).await
                    {
                        rebased_coin_ids.push(latest.coin_id);
                    }
                }
                Err(err) => {
                    log::warn!("something went wrong during attempted DL resubmit: {err}");
                    failed = true;
                    break;
                }
            }
        }

        if failed {
            for coin_id in rebased_coin_ids {
                self.store.delete_singleton_record(coin_id).await;
            }
        }
    }
}
