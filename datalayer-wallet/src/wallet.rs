//! The top-level `DataLayerWallet` (SPEC_FULL.md §6), wiring the five
//! components onto the store/collaborator traits and exposing the public
//! operation surface an embedder drives it through.
//!
//! Grounded on `DataLayerWallet`'s constructor and public methods in the
//! original wallet module: `generate_new_reporter` for launching a brand new
//! singleton, plus the read-only accessors callers use to inspect tracked
//! state.

use std::sync::Arc;

use crate::collaborators::{
    ChainActionQueue, ChainQuery, DerivationIndex, InterestRegistry, ScriptEvaluator, Signer,
    StandardWallet,
};
use crate::error::{DataLayerError, Result};
use crate::fork::ForkDetector;
use crate::launcher::{canonical_launcher_puzzle, canonical_launcher_puzzle_hash, LauncherTracker};
use crate::offer::{Offer, OfferAssembler, OfferedUpdate, ProofOfInclusion, SingletonSummary};
use crate::record::{LineageProof, SingletonRecord};
use crate::store::{SingletonStore, TransactionStore};
use crate::successor::{SuccessorAuthor, UpdateStateParams};
use crate::transaction::TransactionRecord;
use crate::types::{
    AggregatedSignature, Bytes32, Coin, CoinSpend, Condition, Program, SpendBundle,
};
use crate::wallet_event::DataLayerEvent;

/// Static identity of a DataLayer wallet instance, mirroring the
/// `wallet_id`/`fingerprint` pair the original wallet keys its state under.
#[derive(Debug, Clone, Copy)]
pub struct WalletConfig {
    pub wallet_id: u32,
    pub fingerprint: u32,
}

/// Receives [`DataLayerEvent`]s as the wallet's components observe them.
/// The default `()` sink drops every event, so embedders that don't care
/// about lifecycle notifications pay nothing for them.
pub trait EventSink: Send + Sync {
    fn notify(&self, event: DataLayerEvent);
}

impl EventSink for () {
    fn notify(&self, _event: DataLayerEvent) {}
}

/// The top-level DataLayer wallet: one instance per tracked namespace of
/// singletons, generic over every external collaborator it borrows from.
pub struct DataLayerWallet<S, Q, A, I, E, W, D, Si, T, V = ()> {
    config: WalletConfig,
    store: Arc<S>,
    standard_wallet: Arc<W>,
    interests: Arc<I>,
    events: Arc<V>,
    launcher_tracker: LauncherTracker<S, Q, A, I, E>,
    successor_author: Arc<SuccessorAuthor<S, W, D, Si>>,
    sync_handler: SyncHandlerHandle<S, Q, I, E, T, W, D, Si>,
    offer_assembler: OfferAssembler<S, W, D, Si>,
}

type SyncHandlerHandle<S, Q, I, E, T, W, D, Si> = crate::sync::SyncHandler<S, Q, I, E, T, W, D, Si>;

impl<S, Q, A, I, E, W, D, Si, T, V> DataLayerWallet<S, Q, A, I, E, W, D, Si, T, V>
where
    S: SingletonStore,
    Q: ChainQuery,
    A: ChainActionQueue,
    I: InterestRegistry,
    E: ScriptEvaluator,
    W: StandardWallet,
    D: DerivationIndex,
    Si: Signer,
    T: TransactionStore,
    V: EventSink,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: WalletConfig,
        store: Arc<S>,
        chain: Arc<Q>,
        action_queue: Arc<A>,
        interests: Arc<I>,
        evaluator: Arc<E>,
        standard_wallet: Arc<W>,
        derivation_index: Arc<D>,
        signer: Arc<Si>,
        tx_store: Arc<T>,
        events: Arc<V>,
    ) -> Self {
        let launcher_tracker = LauncherTracker::new(
            store.clone(),
            chain.clone(),
            action_queue,
            interests.clone(),
            evaluator.clone(),
        );
        let successor_author = Arc::new(SuccessorAuthor::new(
            store.clone(),
            standard_wallet.clone(),
            derivation_index,
            signer,
        ));
        let fork_detector = ForkDetector::new(store.clone(), tx_store, successor_author.clone());
        let sync_handler = crate::sync::SyncHandler::new(
            store.clone(),
            chain,
            interests.clone(),
            evaluator,
            fork_detector,
        );
        let offer_assembler =
            OfferAssembler::new(successor_author.clone(), standard_wallet.clone());

        DataLayerWallet {
            config,
            store,
            standard_wallet,
            interests,
            events,
            launcher_tracker,
            successor_author,
            sync_handler,
            offer_assembler,
        }
    }

    pub fn config(&self) -> WalletConfig {
        self.config
    }

    // --- Launcher tracking (Component B) -------------------------------

    pub async fn track_new_launcher_id(
        &self,
        launcher_id: Bytes32,
        spend: Option<(CoinSpend, crate::launcher::LaunchSolution)>,
        height: Option<u32>,
    ) -> Result<()> {
        self.launcher_tracker
            .track_new_launcher_id(launcher_id, spend, height)
            .await?;
        self.events
            .notify(DataLayerEvent::LauncherTracked { launcher_id });
        Ok(())
    }

    pub async fn new_launcher_spend_response(
        &self,
        response: crate::collaborators::PuzzleSolutionResponse,
        launcher_coin: Coin,
    ) -> Result<()> {
        self.launcher_tracker
            .new_launcher_spend_response(response, launcher_coin)
            .await
    }

    /// `generate_new_reporter` (SPEC_FULL.md §6): creates a brand new
    /// singleton family via a launcher coin, publishing `initial_root` as
    /// its genesis state. Returns `(dl_tx, std_tx, launcher_id)`.
    pub async fn generate_new_reporter(
        &self,
        initial_root: Bytes32,
        fee: u64,
    ) -> Result<(TransactionRecord, TransactionRecord, Bytes32)> {
        let coins = self.standard_wallet.select_coins(fee + 1).await?;
        let origin = coins
            .first()
            .copied()
            .ok_or(DataLayerError::InvalidAmount(0))?;

        let inner_puzzle_hash = self.standard_wallet.get_new_puzzle_hash().await?;
        let launcher_coin = Coin::new(origin.name(), canonical_launcher_puzzle_hash(), 1);
        let launcher_id = launcher_coin.name();

        let full_puzzle_hash =
            SingletonRecord::full_puzzle_hash(&inner_puzzle_hash, &initial_root, &launcher_id);
        let genesis_coin = Coin::new(launcher_id, full_puzzle_hash, 1);

        let launcher_solution = Program::from_conditions(&[Condition::CreateCoin {
            puzzle_hash: full_puzzle_hash,
            amount: 1,
            memos: vec![initial_root, inner_puzzle_hash],
        }]);
        let launcher_cs = CoinSpend {
            coin: launcher_coin,
            puzzle_reveal: canonical_launcher_puzzle(),
            solution: launcher_solution,
        };
        let launcher_bundle = SpendBundle::new(vec![launcher_cs], AggregatedSignature::empty());

        let funding_bundle = self
            .standard_wallet
            .generate_signed_transaction(
                1,
                canonical_launcher_puzzle_hash(),
                fee,
                Some(origin.name()),
                coins,
                Vec::new(),
                Vec::new(),
            )
            .await?;

        let full_bundle = SpendBundle::aggregate(vec![funding_bundle, launcher_bundle]);

        let dl_tx = TransactionRecord {
            name: launcher_id,
            to_puzzle_hash: inner_puzzle_hash,
            amount: 1,
            fee_amount: fee,
            confirmed: false,
            spend_bundle: Some(full_bundle.clone()),
            additions: vec![launcher_coin, genesis_coin],
            removals: full_bundle.removals(),
        };
        let std_tx = TransactionRecord {
            name: origin.name(),
            to_puzzle_hash: Bytes32::ZERO,
            amount: 0,
            fee_amount: fee,
            confirmed: false,
            spend_bundle: None,
            additions: Vec::new(),
            removals: Vec::new(),
        };

        let genesis_record = SingletonRecord::new(
            launcher_id,
            initial_root,
            inner_puzzle_hash,
            1,
            LineageProof {
                parent_name: launcher_id,
                parent_inner_puzzle_hash: None,
                parent_amount: 1,
            },
            0,
            false,
            0,
            0,
            false,
        )?;
        self.store.add_singleton_record(genesis_record).await?;
        if let Err(err) = self
            .interests
            .add_interested_puzzle_hashes(&[launcher_id])
            .await
        {
            log::warn!("failed to register interest in launcher {launcher_id}: {err}");
        }
        if let Err(err) = self
            .interests
            .add_interested_coin_ids(&[genesis_record.coin_id])
            .await
        {
            log::warn!(
                "failed to register interest in {}: {err}",
                genesis_record.coin_id
            );
        }

        Ok((dl_tx, std_tx, launcher_id))
    }

    // --- Successor authoring (Component C) -----------------------------

    pub async fn create_update_state_spend(
        &self,
        launcher_id: Bytes32,
        params: UpdateStateParams,
    ) -> Result<Vec<TransactionRecord>> {
        self.successor_author
            .create_update_state_spend(launcher_id, params)
            .await
    }

    /// `generate_signed_transaction` (SPEC_FULL.md §6): the single-coin,
    /// single-destination constraint the original enforces before delegating
    /// to [`Self::create_update_state_spend`].
    #[allow(clippy::too_many_arguments)]
    pub async fn generate_signed_transaction(
        &self,
        amounts: &[u64],
        puzzle_hashes: &[Bytes32],
        fee: u64,
        launcher_id: Bytes32,
        new_root: Option<Bytes32>,
        sign: bool,
        add_pending: bool,
        announce_new_state: bool,
    ) -> Result<Vec<TransactionRecord>> {
        if amounts.len() != 1 || puzzle_hashes.len() != 1 {
            return Err(DataLayerError::InvalidAmount(amounts.len() as u64));
        }
        self.create_update_state_spend(
            launcher_id,
            UpdateStateParams {
                new_root,
                new_inner_puzzle_hash: Some(puzzle_hashes[0]),
                new_amount: Some(amounts[0]),
                fee,
                sign,
                add_pending,
                announce_new_state,
                ..Default::default()
            },
        )
        .await
    }

    // --- Sync / removal handling (Component D) --------------------------

    pub async fn singleton_removed(&self, parent_spend: CoinSpend, height: u32) {
        let launcher_id = self
            .store
            .get_singleton_record(parent_spend.coin.name())
            .await
            .map(|r| r.launcher_id);
        self.sync_handler
            .singleton_removed(parent_spend, height)
            .await;
        if let Some(launcher_id) = launcher_id {
            if let Some(latest) = self.store.get_latest_singleton(launcher_id, false).await {
                self.events.notify(DataLayerEvent::SingletonConfirmed {
                    launcher_id,
                    coin_id: latest.coin_id,
                    generation: latest.generation,
                });
            } else {
                self.events
                    .notify(DataLayerEvent::SingletonMelted { launcher_id });
            }
        }
    }

    // --- Read-only accessors ---------------------------------------------

    pub async fn get_singleton_record(&self, coin_id: Bytes32) -> Option<SingletonRecord> {
        self.store.get_singleton_record(coin_id).await
    }

    pub async fn get_latest_singleton(&self, launcher_id: Bytes32) -> Option<SingletonRecord> {
        self.store.get_latest_singleton(launcher_id, false).await
    }

    pub async fn get_history(
        &self,
        launcher_id: Bytes32,
        min_generation: Option<u32>,
        max_generation: Option<u32>,
    ) -> Vec<SingletonRecord> {
        self.store
            .get_all_singletons_for_launcher(launcher_id, min_generation, max_generation, None)
            .await
    }

    pub async fn get_singletons_by_root(
        &self,
        launcher_id: Bytes32,
        root: Bytes32,
    ) -> Vec<SingletonRecord> {
        self.store.get_singletons_by_root(launcher_id, root).await
    }

    /// `get_owned_singletons` (SPEC_FULL.md §6): every tracked launcher's
    /// latest confirmed record whose inner puzzle hash this wallet holds
    /// spend authority over.
    pub async fn get_owned_singletons(&self) -> Vec<SingletonRecord> {
        let mut owned = Vec::new();
        for launcher_id in self.store.get_all_launchers().await {
            if let Some(latest) = self.store.get_latest_singleton(launcher_id, true).await {
                owned.push(latest);
            }
        }
        owned
    }

    pub async fn stop_tracking_singleton(&self, launcher_id: Bytes32) {
        self.store
            .delete_singleton_records_by_launcher_id(launcher_id)
            .await;
        self.store.delete_launcher(launcher_id).await;
    }

    // --- Offer graftroot assembly (Component F) ---------------------------

    pub async fn make_update_offer(
        &self,
        updates: Vec<OfferedUpdate>,
        requested_payments: Vec<(Bytes32, u64)>,
        fee: u64,
    ) -> Result<Offer> {
        self.offer_assembler
            .make_update_offer(updates, requested_payments, fee)
            .await
    }

    pub fn finish_graftroot_solutions(
        &self,
        offer: Offer,
        proofs: &[ProofOfInclusion],
    ) -> Result<Offer> {
        self.offer_assembler
            .finish_graftroot_solutions(offer, proofs)
    }

    pub fn get_offer_summary(&self, offer: &Offer) -> Vec<SingletonSummary> {
        self.offer_assembler.get_offer_summary(offer)
    }

    // --- Balance parity stubs ----------------------------------------------
    //
    // A DataLayer singleton carries no spendable XCH balance of its own
    // (SPEC_FULL.md §2 Non-goals); these exist only so an embedder that
    // polls every wallet uniformly for a balance doesn't need a special
    // case for this one.

    pub fn get_confirmed_balance(&self) -> u64 {
        0
    }

    pub fn get_unconfirmed_balance(&self) -> u64 {
        0
    }

    pub fn get_spendable_balance(&self) -> u64 {
        0
    }

    pub fn get_pending_change_balance(&self) -> u64 {
        0
    }

    pub fn get_max_send_amount(&self) -> u64 {
        0
    }
}
