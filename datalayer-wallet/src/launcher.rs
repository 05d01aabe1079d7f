//! Component B: the launcher tracker (SPEC_FULL.md §4.B).
//!
//! Grounded on `track_new_launcher_id` / `new_launcher_spend` /
//! `new_launcher_spend_response` in the original wallet's launcher-handling
//! section, re-expressed against this crate's store/collaborator traits.

use std::sync::Arc;

use crate::collaborators::{ChainActionQueue, ChainQuery, InterestRegistry, ScriptEvaluator};
use crate::error::{DataLayerError, Result};
use crate::record::{LauncherInfo, LineageProof, SingletonRecord};
use crate::store::SingletonStore;
use crate::types::{Bytes32, Coin, CoinSpend, Condition, Program};

/// The canonical launcher puzzle reveal every DataLayer launcher coin is
/// spent with. Standing in for the real CLVM launcher puzzle (out of scope
/// per SPEC_FULL.md §1), this is a fixed marker blob so `recognize_launcher_spend`
/// has something concrete to compare a claimed launcher spend's puzzle reveal
/// against.
pub fn canonical_launcher_puzzle() -> Program {
    Program::new(b"dl-launcher-puzzle".to_vec())
}

/// Full puzzle hash every launcher coin is created with.
pub fn canonical_launcher_puzzle_hash() -> Bytes32 {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(b"dl-launcher-puzzle-hash");
    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    Bytes32::new(out)
}

/// Cost cap applied to launcher-solution decoding. Decoding a launcher
/// solution is mechanically trivial (it's plain data, not a real program),
/// so this is a conservative constant rather than a configured value.
const LAUNCHER_DECODE_COST_CAP: u64 = 11_000_000_000;

/// Decodes a launcher solution into `(inner_puzzle_hash, root, amount)`.
///
/// The real launcher puzzle solution is CLVM; since puzzle evaluation is
/// out of scope, launcher solutions here are represented directly as this
/// decoded triple rather than as an opaque [`Program`] requiring a CLVM
/// evaluator to unpack — callers (the chain collaborator, or tests) are
/// expected to have already run the launcher puzzle to produce it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchSolution {
    pub inner_puzzle_hash: Bytes32,
    pub root: Bytes32,
    pub amount: u64,
}

/// Checks the canonical-launcher-puzzle predicate of SPEC_FULL.md §4.B.
///
/// `full_puzzle_hash` is what the launcher solution claims the resulting
/// singleton's full puzzle hash will be; this must agree with what this
/// crate's own (domain-separated, stand-in) hash derivation produces from
/// `(inner_puzzle_hash, root, coin.name())`, and `amount` must be odd.
pub fn recognize_launcher_spend(
    launcher_id: Bytes32,
    puzzle_reveal: &Program,
    claimed_full_puzzle_hash: Bytes32,
    solution: &LaunchSolution,
) -> Result<()> {
    if *puzzle_reveal != canonical_launcher_puzzle() {
        return Err(DataLayerError::NotALauncher);
    }
    if solution.amount == 0 || solution.amount.is_multiple_of(2) {
        return Err(DataLayerError::NotALauncher);
    }
    let expected = SingletonRecord::full_puzzle_hash(
        &solution.inner_puzzle_hash,
        &solution.root,
        &launcher_id,
    );
    if expected != claimed_full_puzzle_hash {
        return Err(DataLayerError::NotALauncher);
    }
    Ok(())
}

pub struct LauncherTracker<S, Q, A, I, E> {
    store: Arc<S>,
    chain: Arc<Q>,
    action_queue: Arc<A>,
    interests: Arc<I>,
    evaluator: Arc<E>,
}

impl<S, Q, A, I, E> LauncherTracker<S, Q, A, I, E>
where
    S: SingletonStore,
    Q: ChainQuery,
    A: ChainActionQueue,
    I: InterestRegistry,
    E: ScriptEvaluator,
{
    pub fn new(
        store: Arc<S>,
        chain: Arc<Q>,
        action_queue: Arc<A>,
        interests: Arc<I>,
        evaluator: Arc<E>,
    ) -> Self {
        LauncherTracker {
            store,
            chain,
            action_queue,
            interests,
            evaluator,
        }
    }

    /// Entry point for non-owned singletons: adopt a launcher identifier
    /// we've been told about but have not necessarily seen spent yet.
    pub async fn track_new_launcher_id(
        &self,
        launcher_id: Bytes32,
        spend: Option<(CoinSpend, LaunchSolution)>,
        height: Option<u32>,
    ) -> Result<()> {
        if self.store.get_launcher(launcher_id).await.is_some() {
            log::info!("spend of launcher {launcher_id} has already been processed");
            return Ok(());
        }

        if let Some((spend, solution)) = spend {
            if spend.coin.name() == launcher_id {
                let full_puzzle_hash = SingletonRecord::full_puzzle_hash(
                    &solution.inner_puzzle_hash,
                    &solution.root,
                    &launcher_id,
                );
                recognize_launcher_spend(
                    launcher_id,
                    &spend.puzzle_reveal,
                    full_puzzle_hash,
                    &solution,
                )?;
                self.new_launcher_spend(spend, solution, height).await?;
                return Ok(());
            }
        }

        let states = self.chain.get_coin_state(&[launcher_id]).await?;
        let launcher_state = states
            .into_iter()
            .next()
            .ok_or(DataLayerError::NotALauncher)?;
        let spent_height = launcher_state
            .spent_height
            .ok_or(DataLayerError::NotALauncher)?;

        let response = self
            .action_queue
            .request_puzzle_solution(launcher_id, spent_height)
            .await?;
        let solution = self.decode_launch_solution(&response).await?;
        let spend = CoinSpend {
            coin: launcher_state.coin,
            puzzle_reveal: response.puzzle.clone(),
            solution: response.solution.clone(),
        };
        self.new_launcher_spend(spend, solution, Some(response.height))
            .await
    }

    /// Callback counterpart of [`Self::track_new_launcher_id`]'s
    /// out-of-band request, invoked once the chain action queue resolves a
    /// puzzle+solution lookup.
    pub async fn new_launcher_spend_response(
        &self,
        response: crate::collaborators::PuzzleSolutionResponse,
        launcher_coin: Coin,
    ) -> Result<()> {
        let solution = self.decode_launch_solution(&response).await?;
        let spend = CoinSpend {
            coin: launcher_coin,
            puzzle_reveal: response.puzzle.clone(),
            solution: response.solution.clone(),
        };
        self.new_launcher_spend(spend, solution, Some(response.height))
            .await
    }

    async fn decode_launch_solution(
        &self,
        response: &crate::collaborators::PuzzleSolutionResponse,
    ) -> Result<LaunchSolution> {
        let conditions = self
            .evaluator
            .run(
                &response.puzzle,
                &response.solution,
                LAUNCHER_DECODE_COST_CAP,
            )
            .await?;
        let (claimed_full_puzzle_hash, solution) = launch_solution_from_conditions(&conditions)?;
        recognize_launcher_spend(
            response.coin_name,
            &response.puzzle,
            claimed_full_puzzle_hash,
            &solution,
        )?;
        Ok(solution)
    }

    /// Processes a launcher spend directly, per SPEC_FULL.md §4.B "Process
    /// launcher spend".
    pub async fn new_launcher_spend(
        &self,
        launcher_spend: CoinSpend,
        solution: LaunchSolution,
        height: Option<u32>,
    ) -> Result<()> {
        let launcher_id = launcher_spend.coin.name();
        let height = match height {
            Some(h) => h,
            None => {
                let states = self.chain.get_coin_state(&[launcher_id]).await?;
                states
                    .into_iter()
                    .next()
                    .and_then(|s| s.spent_height)
                    .ok_or(DataLayerError::NotALauncher)?
            }
        };

        let full_puzzle_hash = SingletonRecord::full_puzzle_hash(
            &solution.inner_puzzle_hash,
            &solution.root,
            &launcher_id,
        );
        let new_singleton = Coin::new(launcher_id, full_puzzle_hash, solution.amount);
        let new_coin_id = new_singleton.name();

        let existing = self.store.get_latest_singleton(launcher_id, false).await;
        match existing {
            Some(record) if record.coin_id == new_coin_id && !record.confirmed => {
                let timestamp = self.chain.get_timestamp_for_height(height).await?;
                self.store
                    .set_confirmed(record.coin_id, height, timestamp)
                    .await?;
            }
            Some(_) => {
                log::info!("spend of launcher {launcher_id} has already been processed");
                return Ok(());
            }
            None => {
                let timestamp = self.chain.get_timestamp_for_height(height).await?;
                let record = SingletonRecord::new(
                    launcher_id,
                    solution.root,
                    solution.inner_puzzle_hash,
                    solution.amount,
                    LineageProof {
                        parent_name: launcher_id,
                        parent_inner_puzzle_hash: None,
                        parent_amount: launcher_spend.coin.amount,
                    },
                    0,
                    true,
                    height,
                    timestamp,
                    false,
                )?;
                self.store.add_singleton_record(record).await?;
            }
        }

        self.store
            .add_launcher(LauncherInfo {
                launcher_id,
                parent_id: launcher_spend.coin.parent_coin_info,
                puzzle_hash: launcher_spend.coin.puzzle_hash,
                amount: launcher_spend.coin.amount,
            })
            .await?;
        self.interests
            .add_interested_puzzle_hashes(&[launcher_id])
            .await?;
        self.interests
            .add_interested_coin_ids(&[new_coin_id])
            .await?;
        log::info!("tracking launcher {launcher_id}, genesis coin {new_coin_id}");
        Ok(())
    }
}

/// Scans an evaluated condition list for the launcher's singleton-info
/// triple, mirroring `launch_solution_to_singleton_info`. Returns the
/// claimed full puzzle hash alongside the decoded solution so the caller
/// can check it against [`recognize_launcher_spend`].
pub fn launch_solution_from_conditions(
    conditions: &[Condition],
) -> Result<(Bytes32, LaunchSolution)> {
    for condition in conditions {
        if let Condition::CreateCoin {
            puzzle_hash,
            amount,
            memos,
        } = condition
        {
            if *amount % 2 == 1 && memos.len() >= 2 {
                return Ok((
                    *puzzle_hash,
                    LaunchSolution {
                        root: memos[0],
                        inner_puzzle_hash: memos[1],
                        amount: *amount,
                    },
                ));
            }
        }
    }
    Err(DataLayerError::NotALauncher)
}
