//! Component C: successor authoring (SPEC_FULL.md §4.C).
//!
//! Grounded on `create_update_state_spend` in the original wallet's
//! transaction-building section.

use std::sync::Arc;

use crate::collaborators::{DerivationIndex, Signer, StandardWallet};
use crate::error::{DataLayerError, Result};
use crate::record::{canonical_singleton_layer_puzzle, LineageProof, SingletonRecord};
use crate::store::SingletonStore;
use crate::transaction::TransactionRecord;
use crate::types::{
    AggregatedSignature, Bytes32, Coin, CoinSpend, Condition, Program, SpendBundle,
};

/// The marker byte the fee-bearing coin announcement / ephemeral
/// announcement coin uses, matching the original's bare `b"$"` message.
const ROOT_ANNOUNCE_MESSAGE: &[u8] = b"$";

#[derive(Debug, Clone, Default)]
pub struct UpdateStateParams {
    pub new_root: Option<Bytes32>,
    pub new_inner_puzzle_hash: Option<Bytes32>,
    pub new_amount: Option<u64>,
    pub fee: u64,
    pub coin_announcements_to_consume: Vec<Bytes32>,
    pub puzzle_announcements_to_consume: Vec<Bytes32>,
    pub sign: bool,
    pub add_pending: bool,
    pub announce_new_state: bool,
}

pub struct SuccessorAuthor<S, W, D, Si> {
    store: Arc<S>,
    standard_wallet: Arc<W>,
    derivation_index: Arc<D>,
    signer: Arc<Si>,
}

impl<S, W, D, Si> SuccessorAuthor<S, W, D, Si>
where
    S: SingletonStore,
    W: StandardWallet,
    D: DerivationIndex,
    Si: Signer,
{
    pub fn new(
        store: Arc<S>,
        standard_wallet: Arc<W>,
        derivation_index: Arc<D>,
        signer: Arc<Si>,
    ) -> Self {
        SuccessorAuthor {
            store,
            standard_wallet,
            derivation_index,
            signer,
        }
    }

    /// Resolves the latest singleton for a launcher and the lineage proof
    /// needed to spend it, enforcing the preconditions of SPEC_FULL.md §4.C.
    async fn get_spendable_singleton_info(
        &self,
        launcher_id: Bytes32,
    ) -> Result<(SingletonRecord, LineageProof)> {
        let latest = self
            .store
            .get_latest_singleton(launcher_id, false)
            .await
            .ok_or(DataLayerError::NotTracked(launcher_id))?;

        if !latest.confirmed {
            return Err(DataLayerError::Pending(launcher_id));
        }

        if latest.generation == 0 {
            let launcher = self
                .store
                .get_launcher(launcher_id)
                .await
                .ok_or(DataLayerError::InsufficientLineage(launcher_id))?;
            return Ok((latest, launcher.genesis_lineage()));
        }

        let parent = self
            .store
            .get_singleton_record(latest.lineage_proof.parent_name)
            .await
            .ok_or(DataLayerError::InsufficientLineage(launcher_id))?;
        Ok((latest, parent.as_parent_lineage()))
    }

    /// `create_update_state_spend` (SPEC_FULL.md §4.C).
    pub async fn create_update_state_spend(
        &self,
        launcher_id: Bytes32,
        params: UpdateStateParams,
    ) -> Result<Vec<TransactionRecord>> {
        // `parent_lineage` is the lineage proof a real singleton puzzle's
        // solution would need to carry for this spend; since CLVM solution
        // encoding is out of scope (SPEC_FULL.md §1), this crate's solutions
        // only carry conditions, and resolving it here serves purely as the
        // validation side effect of confirming the parent is known.
        let (latest, _parent_lineage) = self.get_spendable_singleton_info(launcher_id).await?;

        if self
            .derivation_index
            .get_derivation_record_for_puzzle_hash(&latest.inner_puzzle_hash)
            .await
            .is_none()
        {
            return Err(DataLayerError::NotOwned(latest.inner_puzzle_hash));
        }

        let new_root = params.new_root.unwrap_or(latest.root);
        let new_inner_puzzle_hash = match params.new_inner_puzzle_hash {
            Some(ph) => ph,
            None => self.standard_wallet.get_new_puzzle_hash().await?,
        };
        let new_amount = params.new_amount.unwrap_or(latest.amount);
        if new_amount == 0 || new_amount.is_multiple_of(2) {
            return Err(DataLayerError::InvalidAmount(new_amount));
        }

        let current_coin = latest.coin();
        let final_full_puzzle_hash =
            SingletonRecord::full_puzzle_hash(&new_inner_puzzle_hash, &new_root, &launcher_id);

        // Step 5: optional ephemeral announce coin, inserted between
        // `latest` and the real successor. The current coin's own spend then
        // targets the ephemeral coin instead of the real successor, and the
        // ephemeral coin's (constant-emitter) spend creates the real one.
        let mut puzzle_announcements_to_consume = params.puzzle_announcements_to_consume.clone();
        let (ephemeral_record, ephemeral_spend, first_target, first_amount) =
            if params.announce_new_state {
                let announce_inner_puzzle_hash = ephemeral_inner_puzzle_hash(
                    &new_inner_puzzle_hash,
                    new_amount,
                    &launcher_id,
                    &new_root,
                );
                let ephemeral_full_puzzle_hash = SingletonRecord::full_puzzle_hash(
                    &announce_inner_puzzle_hash,
                    &new_root,
                    &launcher_id,
                );
                let ephemeral_coin = Coin::new(
                    current_coin.name(),
                    ephemeral_full_puzzle_hash,
                    latest.amount,
                );
                let ephemeral_record = SingletonRecord::new(
                    launcher_id,
                    new_root,
                    announce_inner_puzzle_hash,
                    latest.amount,
                    latest.as_parent_lineage(),
                    latest.generation + 1,
                    false,
                    0,
                    0,
                    true,
                )?;
                puzzle_announcements_to_consume.push(ephemeral_full_puzzle_hash);
                let ephemeral_solution = Program::from_conditions(&[
                    Condition::CreateCoin {
                        puzzle_hash: final_full_puzzle_hash,
                        amount: new_amount,
                        memos: vec![launcher_id, new_root, new_inner_puzzle_hash],
                    },
                    Condition::CreatePuzzleAnnouncement {
                        message: ROOT_ANNOUNCE_MESSAGE.to_vec(),
                    },
                ]);
                let ephemeral_spend = CoinSpend {
                    coin: ephemeral_coin,
                    puzzle_reveal: canonical_singleton_layer_puzzle(),
                    solution: ephemeral_solution,
                };
                (
                    Some(ephemeral_record),
                    Some(ephemeral_spend),
                    ephemeral_full_puzzle_hash,
                    latest.amount,
                )
            } else {
                (None, None, final_full_puzzle_hash, new_amount)
            };

        let successor_parent = ephemeral_record.as_ref().unwrap_or(&latest);
        let new_generation = successor_parent.generation + 1;
        let new_record = SingletonRecord::new(
            launcher_id,
            new_root,
            new_inner_puzzle_hash,
            new_amount,
            successor_parent.as_parent_lineage(),
            new_generation,
            false,
            0,
            0,
            false,
        )?;

        // Step 6/7: the inner solution, with the root-change magic
        // condition prepended when the root actually changes.
        let mut conditions = vec![Condition::CreateCoin {
            puzzle_hash: first_target,
            amount: first_amount,
            memos: vec![launcher_id, new_root, new_inner_puzzle_hash],
        }];
        if params.fee > 0 {
            conditions.push(Condition::CreateCoinAnnouncement {
                message: ROOT_ANNOUNCE_MESSAGE.to_vec(),
            });
        }
        for id in &params.coin_announcements_to_consume {
            conditions.push(Condition::AssertCoinAnnouncement {
                announcement_id: *id,
            });
        }
        for id in &puzzle_announcements_to_consume {
            conditions.push(Condition::AssertPuzzleAnnouncement {
                announcement_id: *id,
            });
        }
        if new_root != latest.root {
            conditions.insert(
                0,
                Condition::NewMetadata {
                    updater_puzzle_hash: Bytes32::ZERO,
                    new_root,
                },
            );
        }

        let coin_spend = CoinSpend {
            coin: current_coin,
            puzzle_reveal: canonical_singleton_layer_puzzle(),
            solution: Program::from_conditions(&conditions),
        };

        let mut spend_bundle = if params.sign {
            self.signer
                .sign_coin_spends(std::slice::from_ref(&coin_spend))
                .await?
        } else {
            SpendBundle::new(vec![coin_spend.clone()], AggregatedSignature::empty())
        };

        if let Some(ephemeral_spend) = ephemeral_spend.clone() {
            spend_bundle.coin_spends = vec![coin_spend, ephemeral_spend];
        }

        let mut additions = Vec::new();
        if let Some(ephemeral_record) = &ephemeral_record {
            additions.push(ephemeral_record.coin());
        }
        additions.push(new_record.coin());

        let dl_tx = TransactionRecord {
            name: latest.coin_id,
            to_puzzle_hash: new_inner_puzzle_hash,
            amount: new_amount,
            fee_amount: params.fee,
            confirmed: false,
            spend_bundle: Some(spend_bundle.clone()),
            additions,
            removals: spend_bundle.removals(),
        };

        let mut txs = vec![dl_tx];

        if params.fee > 0 {
            let announcement_coin_name = current_coin.name();
            let fee_bundle = self
                .standard_wallet
                .generate_signed_transaction(
                    0,
                    self.standard_wallet.get_new_puzzle_hash().await?,
                    params.fee,
                    None,
                    Vec::new(),
                    vec![announcement_coin_name],
                    Vec::new(),
                )
                .await?;
            let aggregate =
                SpendBundle::aggregate(vec![txs[0].spend_bundle.take().unwrap(), fee_bundle]);
            txs[0].spend_bundle = Some(aggregate.clone());
            txs[0].removals = aggregate.removals();
            txs.push(TransactionRecord {
                name: announcement_coin_name,
                to_puzzle_hash: Bytes32::ZERO,
                amount: 0,
                fee_amount: params.fee,
                confirmed: false,
                spend_bundle: None,
                additions: Vec::new(),
                removals: Vec::new(),
            });
        }

        if params.add_pending {
            if let Some(ephemeral_record) = ephemeral_record {
                self.store.add_singleton_record(ephemeral_record).await?;
            }
            self.store.add_singleton_record(new_record).await?;
        }

        Ok(txs)
    }
}

/// The inner puzzle hash used for the "constant emitter" ephemeral coin:
/// deterministic in its inputs so sync/fork can recompute it, standing in
/// for the announce-only CLVM puzzle the original source curries by hand.
fn ephemeral_inner_puzzle_hash(
    new_inner_puzzle_hash: &Bytes32,
    new_amount: u64,
    launcher_id: &Bytes32,
    new_root: &Bytes32,
) -> Bytes32 {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(b"dl-ephemeral-announce");
    hasher.update(new_inner_puzzle_hash.as_bytes());
    hasher.update(new_amount.to_be_bytes());
    hasher.update(launcher_id.as_bytes());
    hasher.update(new_root.as_bytes());
    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    Bytes32::new(out)
}
