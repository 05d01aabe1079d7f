//! Minimal coin-set primitives the core operates on.
//!
//! Tree-hashing, CLVM evaluation and BLS signatures are explicitly out of
//! scope (see SPEC_FULL.md §1); the shapes here only carry the fields the
//! singleton state engine itself reasons about, and a coin's name is derived
//! with a plain domain-separated SHA-256 rather than the real consensus
//! serialization.

use sha2::{Digest, Sha256};
use std::fmt;

/// A 32-byte identifier: coin names, puzzle hashes, launcher ids, roots.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Bytes32(pub [u8; 32]);

impl Bytes32 {
    pub const ZERO: Bytes32 = Bytes32([0u8; 32]);

    pub fn new(bytes: [u8; 32]) -> Self {
        Bytes32(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for Bytes32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Display for Bytes32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl From<[u8; 32]> for Bytes32 {
    fn from(bytes: [u8; 32]) -> Self {
        Bytes32(bytes)
    }
}

/// A coin: the fundamental unit of value/identity on chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coin {
    pub parent_coin_info: Bytes32,
    pub puzzle_hash: Bytes32,
    pub amount: u64,
}

impl Coin {
    pub fn new(parent_coin_info: Bytes32, puzzle_hash: Bytes32, amount: u64) -> Self {
        Coin {
            parent_coin_info,
            puzzle_hash,
            amount,
        }
    }

    /// Deterministic coin identifier, `H(parent_coin_info, puzzle_hash, amount)`.
    ///
    /// Matches SPEC_FULL.md invariant (4): same inputs always yield the same
    /// name, and sync can recompute it to recognize a coin it's been told
    /// about by the chain collaborator.
    pub fn name(&self) -> Bytes32 {
        coin_id(&self.parent_coin_info, &self.puzzle_hash, self.amount)
    }
}

/// Computes the deterministic coin identifier used throughout this crate.
pub fn coin_id(parent_coin_info: &Bytes32, puzzle_hash: &Bytes32, amount: u64) -> Bytes32 {
    let mut hasher = Sha256::new();
    hasher.update(parent_coin_info.as_bytes());
    hasher.update(puzzle_hash.as_bytes());
    hasher.update(amount.to_be_bytes());
    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    Bytes32(out)
}

/// Reveal + solution for a coin observed or authored to be spent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoinSpend {
    pub coin: Coin,
    pub puzzle_reveal: Program,
    pub solution: Program,
}

/// An opaque serialized puzzle or solution.
///
/// The real script language (CLVM) is out of scope; this crate treats
/// programs as opaque byte blobs it passes to external collaborators
/// (the script evaluator, the signer) and only inspects the decoded
/// [`Condition`] list those collaborators hand back.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Program(pub Vec<u8>);

impl Program {
    pub fn new(bytes: Vec<u8>) -> Self {
        Program(bytes)
    }

    /// Encodes a condition list into a solution, in this crate's own
    /// minimal stand-in encoding (see [`Self::to_conditions`]).
    pub fn from_conditions(conditions: &[Condition]) -> Program {
        let mut out = Vec::new();
        for condition in conditions {
            match condition {
                Condition::CreateCoin {
                    puzzle_hash,
                    amount,
                    memos,
                } => {
                    out.push(1u8);
                    out.extend_from_slice(puzzle_hash.as_bytes());
                    out.extend_from_slice(&amount.to_be_bytes());
                    out.push(memos.len() as u8);
                    for memo in memos {
                        out.extend_from_slice(memo.as_bytes());
                    }
                }
                Condition::CreateCoinAnnouncement { message } => {
                    out.push(2u8);
                    out.push(message.len() as u8);
                    out.extend_from_slice(message);
                }
                Condition::AssertCoinAnnouncement { announcement_id } => {
                    out.push(3u8);
                    out.extend_from_slice(announcement_id.as_bytes());
                }
                Condition::CreatePuzzleAnnouncement { message } => {
                    out.push(4u8);
                    out.push(message.len() as u8);
                    out.extend_from_slice(message);
                }
                Condition::AssertPuzzleAnnouncement { announcement_id } => {
                    out.push(5u8);
                    out.extend_from_slice(announcement_id.as_bytes());
                }
                Condition::NewMetadata {
                    updater_puzzle_hash,
                    new_root,
                } => {
                    out.push(6u8);
                    out.extend_from_slice(updater_puzzle_hash.as_bytes());
                    out.extend_from_slice(new_root.as_bytes());
                }
                Condition::Other { .. } => {
                    // This crate never authors opaque conditions itself.
                }
            }
        }
        Program(out)
    }

    /// Decodes a solution produced by [`Self::from_conditions`] back into
    /// its condition list. Stands in for running a puzzle through a real
    /// CLVM evaluator, which is out of scope for this crate.
    pub fn to_conditions(&self) -> Vec<Condition> {
        let bytes = &self.0;
        let mut out = Vec::new();
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                1 => {
                    let puzzle_hash = read_bytes32(bytes, i + 1);
                    let amount = u64::from_be_bytes(bytes[i + 33..i + 41].try_into().unwrap());
                    let memo_count = bytes[i + 41] as usize;
                    let mut memos = Vec::new();
                    let mut j = i + 42;
                    for _ in 0..memo_count {
                        memos.push(read_bytes32(bytes, j));
                        j += 32;
                    }
                    out.push(Condition::CreateCoin {
                        puzzle_hash,
                        amount,
                        memos,
                    });
                    i = j;
                }
                2 => {
                    let len = bytes[i + 1] as usize;
                    let message = bytes[i + 2..i + 2 + len].to_vec();
                    out.push(Condition::CreateCoinAnnouncement { message });
                    i += 2 + len;
                }
                3 => {
                    out.push(Condition::AssertCoinAnnouncement {
                        announcement_id: read_bytes32(bytes, i + 1),
                    });
                    i += 33;
                }
                4 => {
                    let len = bytes[i + 1] as usize;
                    let message = bytes[i + 2..i + 2 + len].to_vec();
                    out.push(Condition::CreatePuzzleAnnouncement { message });
                    i += 2 + len;
                }
                5 => {
                    out.push(Condition::AssertPuzzleAnnouncement {
                        announcement_id: read_bytes32(bytes, i + 1),
                    });
                    i += 33;
                }
                6 => {
                    out.push(Condition::NewMetadata {
                        updater_puzzle_hash: read_bytes32(bytes, i + 1),
                        new_root: read_bytes32(bytes, i + 33),
                    });
                    i += 65;
                }
                _ => break,
            }
        }
        out
    }
}

fn read_bytes32(bytes: &[u8], offset: usize) -> Bytes32 {
    let mut out = [0u8; 32];
    out.copy_from_slice(&bytes[offset..offset + 32]);
    Bytes32(out)
}

/// A decoded condition from running a puzzle against its solution.
///
/// SPEC_FULL.md §9 calls for "a sum type for condition opcodes rather than
/// string comparison" — this is that sum type, grounded on
/// `chia-wallet`'s preference for small tagged enums over opcode constants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    CreateCoin {
        puzzle_hash: Bytes32,
        amount: u64,
        memos: Vec<Bytes32>,
    },
    CreateCoinAnnouncement {
        message: Vec<u8>,
    },
    AssertCoinAnnouncement {
        announcement_id: Bytes32,
    },
    CreatePuzzleAnnouncement {
        message: Vec<u8>,
    },
    AssertPuzzleAnnouncement {
        announcement_id: Bytes32,
    },
    /// The `-24` magic condition that carries the singleton's new root
    /// through the data-layer updater puzzle (SPEC_FULL.md §4.C step 7).
    NewMetadata {
        updater_puzzle_hash: Bytes32,
        new_root: Bytes32,
    },
    /// Anything else the evaluator produced; the core never needs to act on
    /// these so they're preserved opaquely instead of being dropped.
    Other {
        opcode: i64,
        args: Vec<u8>,
    },
}

/// `(coin, created_height?, spent_height?)` as reported by the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoinState {
    pub coin: Coin,
    pub created_height: Option<u32>,
    pub spent_height: Option<u32>,
}

/// A placeholder aggregate signature. Real BLS aggregation is out of scope;
/// the signer collaborator is the only thing that ever produces a non-empty
/// one, and this crate never inspects its contents.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AggregatedSignature(pub Vec<u8>);

impl AggregatedSignature {
    pub fn empty() -> Self {
        AggregatedSignature(Vec::new())
    }
}

/// A collection of coin spends sharing one aggregated signature.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpendBundle {
    pub coin_spends: Vec<CoinSpend>,
    pub aggregated_signature: AggregatedSignature,
}

impl SpendBundle {
    pub fn new(coin_spends: Vec<CoinSpend>, aggregated_signature: AggregatedSignature) -> Self {
        SpendBundle {
            coin_spends,
            aggregated_signature,
        }
    }

    pub fn aggregate(bundles: Vec<SpendBundle>) -> SpendBundle {
        let mut coin_spends = Vec::new();
        for bundle in bundles {
            coin_spends.extend(bundle.coin_spends);
        }
        SpendBundle {
            coin_spends,
            aggregated_signature: AggregatedSignature::empty(),
        }
    }

    pub fn removals(&self) -> Vec<Coin> {
        self.coin_spends.iter().map(|cs| cs.coin).collect()
    }
}
