//! External collaborator traits (SPEC_FULL.md §6).
//!
//! The core never talks to the network, a signer, or a derivation index
//! directly — it suspends on these traits instead. Grounded on the shape of
//! `Peer::request(...)` calls in `wallet/wallet_state.rs`, generalized into
//! `async_trait` traits so the core can be driven by in-memory test doubles
//! as easily as by a real peer.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Bytes32, Coin, CoinSpend, CoinState, Condition, Program, SpendBundle};

/// Runs a puzzle reveal against a solution and returns the conditions it
/// produces, under a cost cap.
///
/// The script language itself is out of scope (SPEC_FULL.md §1); the core
/// only ever inspects the decoded condition list this collaborator hands
/// back, for both the singleton sync path (§4.D step 3) and for decoding a
/// launcher solution (which is, mechanically, just running the launcher
/// puzzle against its own solution).
#[async_trait]
pub trait ScriptEvaluator: Send + Sync {
    async fn run(
        &self,
        puzzle: &Program,
        solution: &Program,
        cost_cap: u64,
    ) -> Result<Vec<Condition>>;
}

/// Queries the chain for coin states and block timestamps.
#[async_trait]
pub trait ChainQuery: Send + Sync {
    async fn get_coin_state(&self, ids: &[Bytes32]) -> Result<Vec<CoinState>>;
    async fn get_timestamp_for_height(&self, height: u32) -> Result<u64>;
}

/// The result handed back to [`ChainActionQueue::request_puzzle_solution`]'s
/// caller once the action completes.
#[derive(Debug, Clone)]
pub struct PuzzleSolutionResponse {
    pub puzzle: Program,
    pub solution: Program,
    pub height: u32,
    pub coin_name: Bytes32,
}

/// Requests out-of-band puzzle+solution lookups for a coin at a height.
///
/// Mirrors `create_action(..., callback="new_launcher_spend_response", ...)`:
/// the real wallet dispatches this asynchronously and a later event invokes
/// [`crate::launcher::LauncherTracker::new_launcher_spend_response`]. Here
/// it's expressed directly as an async call the core awaits, since this
/// crate has no action-queue/callback machinery of its own to round-trip
/// through.
#[async_trait]
pub trait ChainActionQueue: Send + Sync {
    async fn request_puzzle_solution(
        &self,
        coin_name: Bytes32,
        height: u32,
    ) -> Result<PuzzleSolutionResponse>;
}

/// One `CREATE_COIN` a standard-wallet solution should produce, the
/// hash-level stand-in for the original's `AmountWithPuzzlehash` primaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Primary {
    pub puzzle_hash: Bytes32,
    pub amount: u64,
    pub memos: Vec<Bytes32>,
}

/// The fee-funding, address-issuing standard wallet this core borrows from.
#[async_trait]
pub trait StandardWallet: Send + Sync {
    /// A freshly derived puzzle reveal. The real puzzle is a curried CLVM
    /// program (out of scope per SPEC_FULL.md §1); here it's a `Program`
    /// wrapping the same bytes [`Self::get_new_puzzle_hash`] derives from,
    /// so the two stay trivially consistent for a collaborator that honors
    /// the contract.
    async fn get_new_puzzle(&self) -> Result<Program>;

    async fn get_new_puzzle_hash(&self) -> Result<Bytes32>;

    /// Resolves a public key (itself a domain-separated `Bytes32` stand-in,
    /// since BLS keys are out of scope) to the puzzle reveal it controls.
    async fn puzzle_for_public_key(&self, public_key: &Bytes32) -> Result<Program>;

    async fn select_coins(&self, amount: u64) -> Result<Vec<Coin>>;

    /// Builds and signs a zero-or-more amount transaction, optionally
    /// consuming coin/puzzle announcements. Used both for the genesis
    /// launcher funding transaction and for fee-only "tandem" transactions.
    #[allow(clippy::too_many_arguments)]
    async fn generate_signed_transaction(
        &self,
        amount: u64,
        puzzle_hash: Bytes32,
        fee: u64,
        origin_id: Option<Bytes32>,
        coins: Vec<Coin>,
        coin_announcements_to_consume: Vec<Bytes32>,
        puzzle_announcements_to_consume: Vec<Bytes32>,
    ) -> Result<SpendBundle>;

    /// Builds a standard-wallet inner solution from a set of primaries plus
    /// announcement conditions to create/assert, the collaborator-side
    /// counterpart of [`Program::from_conditions`] this crate uses for its
    /// own singleton-layer solutions.
    async fn make_solution(
        &self,
        primaries: &[Primary],
        coin_announcements: &[Vec<u8>],
        coin_announcements_to_assert: &[Bytes32],
        puzzle_announcements_to_assert: &[Bytes32],
    ) -> Result<Program>;
}

/// Resolves a puzzle hash to a known derivation, establishing spend
/// authority over it.
#[async_trait]
pub trait DerivationIndex: Send + Sync {
    async fn get_derivation_record_for_puzzle_hash(&self, puzzle_hash: &Bytes32) -> Option<u32>;
}

/// Registers puzzle hashes / coin ids the wallet now cares about hearing
/// about from the chain.
#[async_trait]
pub trait InterestRegistry: Send + Sync {
    async fn add_interested_puzzle_hashes(&self, puzzle_hashes: &[Bytes32]) -> Result<()>;
    async fn add_interested_coin_ids(&self, coin_ids: &[Bytes32]) -> Result<()>;
}

/// Produces a signed spend bundle for a set of coin spends.
#[async_trait]
pub trait Signer: Send + Sync {
    async fn sign_coin_spends(&self, spends: &[CoinSpend]) -> Result<SpendBundle>;
}
