//! In-memory collaborator stand-ins used by unit and scenario tests.
//!
//! Grounded on the teacher's preference for small, direct test doubles
//! (e.g. `chia-wallet`'s tests construct puzzle reveals/solutions by hand
//! rather than mocking) — these hold just enough state to drive the core
//! through the scenario suite in SPEC_FULL.md §8.

#![cfg(test)]

use std::sync::Mutex;

use async_trait::async_trait;

use crate::collaborators::{
    ChainActionQueue, ChainQuery, DerivationIndex, InterestRegistry, Primary,
    PuzzleSolutionResponse, ScriptEvaluator, Signer, StandardWallet,
};
use crate::error::Result;
use crate::types::{
    AggregatedSignature, Bytes32, Coin, CoinSpend, CoinState, Condition, Program, SpendBundle,
};

#[derive(Default)]
pub struct StubChain {
    pub coin_states: Mutex<Vec<CoinState>>,
    pub timestamp: Mutex<u64>,
}

#[async_trait]
impl ChainQuery for StubChain {
    async fn get_coin_state(&self, ids: &[Bytes32]) -> Result<Vec<CoinState>> {
        let states = self.coin_states.lock().unwrap();
        Ok(states
            .iter()
            .filter(|s| ids.contains(&s.coin.name()))
            .copied()
            .collect())
    }

    async fn get_timestamp_for_height(&self, _height: u32) -> Result<u64> {
        Ok(*self.timestamp.lock().unwrap())
    }
}

#[derive(Default)]
pub struct StubActionQueue {
    pub responses: Mutex<Vec<PuzzleSolutionResponse>>,
}

#[async_trait]
impl ChainActionQueue for StubActionQueue {
    async fn request_puzzle_solution(
        &self,
        coin_name: Bytes32,
        _height: u32,
    ) -> Result<PuzzleSolutionResponse> {
        let responses = self.responses.lock().unwrap();
        responses
            .iter()
            .find(|r| r.coin_name == coin_name)
            .cloned()
            .ok_or(crate::error::DataLayerError::NotALauncher)
    }
}

#[derive(Default)]
pub struct StubStandardWallet {
    pub next_puzzle_hash: Mutex<Bytes32>,
    pub coins: Mutex<Vec<Coin>>,
}

#[async_trait]
impl StandardWallet for StubStandardWallet {
    async fn get_new_puzzle(&self) -> Result<Program> {
        Ok(Program::new(
            self.next_puzzle_hash.lock().unwrap().as_bytes().to_vec(),
        ))
    }

    async fn get_new_puzzle_hash(&self) -> Result<Bytes32> {
        Ok(*self.next_puzzle_hash.lock().unwrap())
    }

    async fn puzzle_for_public_key(&self, public_key: &Bytes32) -> Result<Program> {
        Ok(Program::new(public_key.as_bytes().to_vec()))
    }

    async fn select_coins(&self, amount: u64) -> Result<Vec<Coin>> {
        let coins = self.coins.lock().unwrap();
        let selected: Vec<Coin> = coins
            .iter()
            .filter(|c| c.amount >= amount)
            .copied()
            .collect();
        Ok(selected)
    }

    async fn generate_signed_transaction(
        &self,
        amount: u64,
        puzzle_hash: Bytes32,
        _fee: u64,
        origin_id: Option<Bytes32>,
        coins: Vec<Coin>,
        _coin_announcements_to_consume: Vec<Bytes32>,
        _puzzle_announcements_to_consume: Vec<Bytes32>,
    ) -> Result<SpendBundle> {
        let parent = origin_id
            .or_else(|| coins.first().map(|c| c.name()))
            .unwrap_or(Bytes32::ZERO);
        let coin = Coin::new(parent, puzzle_hash, amount);
        Ok(SpendBundle::new(
            vec![CoinSpend {
                coin,
                puzzle_reveal: Program::default(),
                solution: Program::default(),
            }],
            AggregatedSignature::empty(),
        ))
    }

    async fn make_solution(
        &self,
        primaries: &[Primary],
        coin_announcements: &[Vec<u8>],
        coin_announcements_to_assert: &[Bytes32],
        puzzle_announcements_to_assert: &[Bytes32],
    ) -> Result<Program> {
        let mut conditions = Vec::new();
        for primary in primaries {
            conditions.push(Condition::CreateCoin {
                puzzle_hash: primary.puzzle_hash,
                amount: primary.amount,
                memos: primary.memos.clone(),
            });
        }
        for message in coin_announcements {
            conditions.push(Condition::CreateCoinAnnouncement {
                message: message.clone(),
            });
        }
        for announcement_id in coin_announcements_to_assert {
            conditions.push(Condition::AssertCoinAnnouncement {
                announcement_id: *announcement_id,
            });
        }
        for announcement_id in puzzle_announcements_to_assert {
            conditions.push(Condition::AssertPuzzleAnnouncement {
                announcement_id: *announcement_id,
            });
        }
        Ok(Program::from_conditions(&conditions))
    }
}

#[derive(Default)]
pub struct StubDerivationIndex {
    pub known_puzzle_hashes: Mutex<Vec<Bytes32>>,
}

#[async_trait]
impl DerivationIndex for StubDerivationIndex {
    async fn get_derivation_record_for_puzzle_hash(&self, puzzle_hash: &Bytes32) -> Option<u32> {
        let known = self.known_puzzle_hashes.lock().unwrap();
        known
            .iter()
            .position(|ph| ph == puzzle_hash)
            .map(|i| i as u32)
    }
}

#[derive(Default)]
pub struct StubInterestRegistry {
    pub puzzle_hashes: Mutex<Vec<Bytes32>>,
    pub coin_ids: Mutex<Vec<Bytes32>>,
}

#[async_trait]
impl InterestRegistry for StubInterestRegistry {
    async fn add_interested_puzzle_hashes(&self, puzzle_hashes: &[Bytes32]) -> Result<()> {
        self.puzzle_hashes
            .lock()
            .unwrap()
            .extend_from_slice(puzzle_hashes);
        Ok(())
    }

    async fn add_interested_coin_ids(&self, coin_ids: &[Bytes32]) -> Result<()> {
        self.coin_ids.lock().unwrap().extend_from_slice(coin_ids);
        Ok(())
    }
}

#[derive(Default)]
pub struct NullSigner;

#[async_trait]
impl Signer for NullSigner {
    async fn sign_coin_spends(&self, spends: &[CoinSpend]) -> Result<SpendBundle> {
        Ok(SpendBundle::new(
            spends.to_vec(),
            AggregatedSignature::empty(),
        ))
    }
}

/// Evaluates puzzles by reading conditions straight out of the solution's
/// encoding ([`Program::to_conditions`]), standing in for a real CLVM
/// evaluator.
#[derive(Default)]
pub struct StubEvaluator;

#[async_trait]
impl ScriptEvaluator for StubEvaluator {
    async fn run(
        &self,
        _puzzle: &Program,
        solution: &Program,
        _cost_cap: u64,
    ) -> Result<Vec<Condition>> {
        Ok(solution.to_conditions())
    }
}
