//! End-to-end scenario tests driving [`crate::wallet::DataLayerWallet`]
//! through its public operations against the in-memory stores and stub
//! collaborators, covering the scenario suite of SPEC_FULL.md §8.

use std::sync::Arc;

use crate::record::SingletonRecord;
use crate::store::{InMemorySingletonStore, InMemoryTransactionStore, SingletonStore};
use crate::successor::UpdateStateParams;
use crate::test_support::{
    NullSigner, StubActionQueue, StubChain, StubDerivationIndex, StubEvaluator,
    StubInterestRegistry, StubStandardWallet,
};
use crate::types::{Bytes32, Coin, CoinSpend, Condition, Program};
use crate::wallet::{DataLayerWallet, WalletConfig};

type TestWallet = DataLayerWallet<
    InMemorySingletonStore,
    StubChain,
    StubActionQueue,
    StubInterestRegistry,
    StubEvaluator,
    StubStandardWallet,
    StubDerivationIndex,
    NullSigner,
    InMemoryTransactionStore,
>;

fn id(byte: u8) -> Bytes32 {
    Bytes32::new([byte; 32])
}

struct Harness {
    wallet: TestWallet,
    store: Arc<InMemorySingletonStore>,
    standard_wallet: Arc<StubStandardWallet>,
    derivation_index: Arc<StubDerivationIndex>,
}

fn build_harness() -> Harness {
    let store = Arc::new(InMemorySingletonStore::new());
    let standard_wallet = Arc::new(StubStandardWallet::default());
    let derivation_index = Arc::new(StubDerivationIndex::default());
    let wallet = DataLayerWallet::new(
        WalletConfig {
            wallet_id: 1,
            fingerprint: 1,
        },
        store.clone(),
        Arc::new(StubChain::default()),
        Arc::new(StubActionQueue::default()),
        Arc::new(StubInterestRegistry::default()),
        Arc::new(StubEvaluator),
        standard_wallet.clone(),
        derivation_index.clone(),
        Arc::new(NullSigner),
        Arc::new(InMemoryTransactionStore::new()),
        Arc::new(()),
    );
    Harness {
        wallet,
        store,
        standard_wallet,
        derivation_index,
    }
}

/// Genesis adopt: `generate_new_reporter` followed by observing its own
/// launcher spend confirms the generation-0 record.
#[tokio::test]
async fn genesis_adopt() {
    let h = build_harness();
    *h.standard_wallet.coins.lock().unwrap() = vec![Coin::new(id(1), id(2), 1000)];
    let inner_puzzle_hash = id(3);
    *h.standard_wallet.next_puzzle_hash.lock().unwrap() = inner_puzzle_hash;
    h.derivation_index
        .known_puzzle_hashes
        .lock()
        .unwrap()
        .push(inner_puzzle_hash);

    let initial_root = id(42);
    let (dl_tx, _std_tx, launcher_id) = h
        .wallet
        .generate_new_reporter(initial_root, 0)
        .await
        .unwrap();
    assert_eq!(dl_tx.additions.len(), 2);

    let launcher_cs = dl_tx
        .spend_bundle
        .as_ref()
        .unwrap()
        .coin_spends
        .last()
        .unwrap()
        .clone();
    let solution = crate::launcher::LaunchSolution {
        inner_puzzle_hash,
        root: initial_root,
        amount: 1,
    };
    h.wallet
        .track_new_launcher_id(launcher_id, Some((launcher_cs, solution)), Some(10))
        .await
        .unwrap();

    let latest = h.wallet.get_latest_singleton(launcher_id).await.unwrap();
    assert!(latest.confirmed);
    assert_eq!(latest.generation, 0);
    assert_eq!(latest.root, initial_root);
}

/// Seeds a confirmed generation-0 singleton directly into the store,
/// bypassing `generate_new_reporter`, so advance/fork tests can start from
/// an already-confirmed launcher.
async fn seed_confirmed_genesis(
    h: &Harness,
    launcher_id: Bytes32,
    root: Bytes32,
    inner_puzzle_hash: Bytes32,
) {
    h.store
        .add_launcher(crate::record::LauncherInfo {
            launcher_id,
            parent_id: id(200),
            puzzle_hash: crate::launcher::canonical_launcher_puzzle_hash(),
            amount: 1,
        })
        .await
        .unwrap();
    let record = SingletonRecord::new(
        launcher_id,
        root,
        inner_puzzle_hash,
        1,
        crate::record::LineageProof {
            parent_name: launcher_id,
            parent_inner_puzzle_hash: None,
            parent_amount: 1,
        },
        0,
        true,
        10,
        1000,
        false,
    )
    .unwrap();
    h.store.add_singleton_record(record).await.unwrap();
    h.derivation_index
        .known_puzzle_hashes
        .lock()
        .unwrap()
        .push(inner_puzzle_hash);
}

/// Simple advance: authoring a root update against a confirmed genesis
/// enqueues a pending generation-1 record with the new root.
#[tokio::test]
async fn simple_advance() {
    let h = build_harness();
    let launcher_id = id(9);
    let genesis_inner = id(3);
    seed_confirmed_genesis(&h, launcher_id, id(1), genesis_inner).await;

    let new_root = id(7);
    *h.standard_wallet.next_puzzle_hash.lock().unwrap() = genesis_inner;
    let txs = h
        .wallet
        .create_update_state_spend(
            launcher_id,
            UpdateStateParams {
                new_root: Some(new_root),
                new_inner_puzzle_hash: Some(genesis_inner),
                sign: false,
                add_pending: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(txs.len(), 1);

    let pending = h.store.get_unconfirmed_singletons(launcher_id).await;
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].root, new_root);
    assert_eq!(pending[0].generation, 1);
}

/// Ephemeral announce: requesting `announce_new_state` enqueues both the
/// ephemeral constant-emitter coin and the real successor behind it.
#[tokio::test]
async fn ephemeral_announce() {
    let h = build_harness();
    let launcher_id = id(9);
    let genesis_inner = id(3);
    seed_confirmed_genesis(&h, launcher_id, id(1), genesis_inner).await;

    let new_root = id(7);
    *h.standard_wallet.next_puzzle_hash.lock().unwrap() = genesis_inner;
    h.wallet
        .create_update_state_spend(
            launcher_id,
            UpdateStateParams {
                new_root: Some(new_root),
                new_inner_puzzle_hash: Some(genesis_inner),
                sign: false,
                add_pending: true,
                announce_new_state: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let pending = h.store.get_unconfirmed_singletons(launcher_id).await;
    assert_eq!(pending.len(), 2);
    assert!(pending.iter().any(|r| r.ephemeral));
    assert!(pending.iter().any(|r| !r.ephemeral && r.root == new_root));
}

/// Melt: a parent spend that creates no odd-amount successor leaves the
/// tracked state untouched, recovered locally per SPEC_FULL.md §7.
#[tokio::test]
async fn melt_is_absorbed() {
    let h = build_harness();
    let launcher_id = id(9);
    let genesis_inner = id(3);
    seed_confirmed_genesis(&h, launcher_id, id(1), genesis_inner).await;
    let before = h.wallet.get_latest_singleton(launcher_id).await.unwrap();

    let parent_spend = CoinSpend {
        coin: before.coin(),
        puzzle_reveal: crate::record::canonical_singleton_layer_puzzle(),
        solution: Program::from_conditions(&[Condition::CreateCoinAnnouncement {
            message: b"melt".to_vec(),
        }]),
    };
    h.wallet.singleton_removed(parent_spend, 20).await;

    let after = h.wallet.get_latest_singleton(launcher_id).await.unwrap();
    assert_eq!(after.coin_id, before.coin_id);
}

/// A spend whose puzzle reveal isn't the DataLayer singleton layer (e.g. an
/// NFT or DID sharing the same outer singleton wrapper) is ignored outright,
/// without even attempting the parent lookup.
#[tokio::test]
async fn ignores_non_singleton_layer_spend() {
    let h = build_harness();
    let launcher_id = id(9);
    let genesis_inner = id(3);
    seed_confirmed_genesis(&h, launcher_id, id(1), genesis_inner).await;
    let before = h.wallet.get_latest_singleton(launcher_id).await.unwrap();

    let parent_spend = CoinSpend {
        coin: before.coin(),
        puzzle_reveal: Program::new(b"some-other-singleton-layer".to_vec()),
        solution: Program::from_conditions(&[Condition::CreateCoinAnnouncement {
            message: b"melt".to_vec(),
        }]),
    };
    h.wallet.singleton_removed(parent_spend, 20).await;

    let after = h.wallet.get_latest_singleton(launcher_id).await.unwrap();
    assert_eq!(after.coin_id, before.coin_id);
}

/// Builds a parent spend for `parent`'s coin that creates a successor with
/// the given root/inner puzzle hash, as an alternate branch sync discovers.
fn alternate_successor_spend(
    parent: &SingletonRecord,
    root: Bytes32,
    inner_puzzle_hash: Bytes32,
) -> CoinSpend {
    let full_puzzle_hash =
        SingletonRecord::full_puzzle_hash(&inner_puzzle_hash, &root, &parent.launcher_id);
    CoinSpend {
        coin: parent.coin(),
        puzzle_reveal: crate::record::canonical_singleton_layer_puzzle(),
        solution: Program::from_conditions(&[Condition::CreateCoin {
            puzzle_hash: full_puzzle_hash,
            amount: 1,
            memos: vec![root, inner_puzzle_hash],
        }]),
    }
}

/// Fork without root change: the chain confirms a different generation-1
/// coin carrying the same root the pending successor had queued. The
/// detector discards the stale pending record and rebases a fresh one on
/// top of the new confirmed head with the same root.
#[tokio::test]
async fn fork_without_root_change_rebases() {
    let h = build_harness();
    let launcher_id = id(9);
    let genesis_inner = id(3);
    seed_confirmed_genesis(&h, launcher_id, id(1), genesis_inner).await;

    let pending_root = id(7);
    *h.standard_wallet.next_puzzle_hash.lock().unwrap() = genesis_inner;
    h.wallet
        .create_update_state_spend(
            launcher_id,
            UpdateStateParams {
                new_root: Some(pending_root),
                new_inner_puzzle_hash: Some(genesis_inner),
                sign: false,
                add_pending: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(
        h.store.get_unconfirmed_singletons(launcher_id).await.len(),
        1
    );

    let genesis = h
        .store
        .get_latest_singleton(launcher_id, true)
        .await
        .unwrap();
    let other_inner = id(44);
    h.derivation_index
        .known_puzzle_hashes
        .lock()
        .unwrap()
        .push(other_inner);
    let parent_spend = alternate_successor_spend(&genesis, pending_root, other_inner);
    h.wallet.singleton_removed(parent_spend, 30).await;

    // The stale pending record is gone...
    let pending = h.store.get_unconfirmed_singletons(launcher_id).await;
    // ...replaced by a rebased one extending the newly confirmed head,
    // still carrying the original pending root forward.
    assert!(pending.iter().all(|r| r.root == pending_root));
    let latest = h
        .store
        .get_latest_singleton(launcher_id, true)
        .await
        .unwrap();
    assert_eq!(latest.root, pending_root);
    assert_eq!(latest.inner_puzzle_hash, other_inner);
}

/// Fork with root change: the confirmed successor published a different
/// root than the pending one. The detector discards the pending branch and
/// does not attempt to re-author it.
#[tokio::test]
async fn fork_with_root_change_discards_pending() {
    let h = build_harness();
    let launcher_id = id(9);
    let genesis_inner = id(3);
    seed_confirmed_genesis(&h, launcher_id, id(1), genesis_inner).await;

    let pending_root = id(7);
    *h.standard_wallet.next_puzzle_hash.lock().unwrap() = genesis_inner;
    h.wallet
        .create_update_state_spend(
            launcher_id,
            UpdateStateParams {
                new_root: Some(pending_root),
                new_inner_puzzle_hash: Some(genesis_inner),
                sign: false,
                add_pending: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let genesis = h
        .store
        .get_latest_singleton(launcher_id, true)
        .await
        .unwrap();
    let confirmed_root = id(99);
    let other_inner = id(44);
    h.derivation_index
        .known_puzzle_hashes
        .lock()
        .unwrap()
        .push(other_inner);
    let parent_spend = alternate_successor_spend(&genesis, confirmed_root, other_inner);
    h.wallet.singleton_removed(parent_spend, 30).await;

    assert!(h
        .store
        .get_unconfirmed_singletons(launcher_id)
        .await
        .is_empty());
    let latest = h
        .store
        .get_latest_singleton(launcher_id, true)
        .await
        .unwrap();
    assert_eq!(latest.root, confirmed_root);
}

/// `recognize_launcher_spend` rejects a solution whose puzzle reveal isn't
/// the canonical launcher puzzle.
#[tokio::test]
async fn rejects_non_canonical_launcher_puzzle() {
    let h = build_harness();
    let launcher_coin = Coin::new(id(1), crate::launcher::canonical_launcher_puzzle_hash(), 1);
    let launcher_id = launcher_coin.name();
    let spend = CoinSpend {
        coin: launcher_coin,
        puzzle_reveal: Program::new(b"not-a-launcher".to_vec()),
        solution: Program::default(),
    };
    let solution = crate::launcher::LaunchSolution {
        inner_puzzle_hash: id(3),
        root: id(1),
        amount: 1,
    };
    let err = h
        .wallet
        .track_new_launcher_id(launcher_id, Some((spend, solution)), Some(10))
        .await
        .unwrap_err();
    assert!(matches!(err, crate::error::DataLayerError::NotALauncher));
}
