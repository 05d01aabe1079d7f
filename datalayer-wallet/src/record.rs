//! Component A: the singleton record model (SPEC_FULL.md §3, §4.A).

use crate::error::{DataLayerError, Result};
use crate::types::{coin_id, Bytes32, Program};

/// The canonical singleton-layer puzzle reveal every DataLayer singleton
/// coin is spent with. Standing in for the real CLVM singleton mod-hash
/// curry (out of scope per SPEC_FULL.md §1), mirroring
/// `launcher::canonical_launcher_puzzle`'s fixed-marker approach.
pub fn canonical_singleton_layer_puzzle() -> Program {
    Program::new(b"dl-singleton-layer-puzzle".to_vec())
}

/// Checks SPEC_FULL.md §4.D step 1: "if the puzzle is not a DataLayer
/// singleton layer, ignore". Disambiguates DL singletons from other coin
/// types sharing the same outer singleton puzzle layer (NFTs, DIDs, …).
pub fn recognize_singleton_layer(puzzle_reveal: &Program) -> bool {
    *puzzle_reveal == canonical_singleton_layer_puzzle()
}

/// `(parent_name, parent_inner_puzzle_hash, parent_amount)`.
///
/// The parent fields are only absent for a genesis record, whose parent is
/// the launcher coin itself (see [`LauncherInfo`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineageProof {
    pub parent_name: Bytes32,
    pub parent_inner_puzzle_hash: Option<Bytes32>,
    pub parent_amount: u64,
}

/// The launcher coin itself: one immutable row per tracked launcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LauncherInfo {
    pub launcher_id: Bytes32,
    pub parent_id: Bytes32,
    pub puzzle_hash: Bytes32,
    pub amount: u64,
}

impl LauncherInfo {
    /// Synthesizes the lineage proof a genesis singleton uses for its
    /// parent, per SPEC_FULL.md §4.C step 1: `(launcher.parent_id, None,
    /// launcher.amount)`.
    pub fn genesis_lineage(&self) -> LineageProof {
        LineageProof {
            parent_name: self.parent_id,
            parent_inner_puzzle_hash: None,
            parent_amount: self.amount,
        }
    }
}

/// One immutable row per observed or anticipated coin generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SingletonRecord {
    pub coin_id: Bytes32,
    pub launcher_id: Bytes32,
    pub root: Bytes32,
    pub inner_puzzle_hash: Bytes32,
    pub confirmed: bool,
    pub confirmed_at_height: u32,
    pub timestamp: u64,
    pub lineage_proof: LineageProof,
    pub generation: u32,
    /// Marks the intermediate "constant emitter" coin created only to
    /// decouple root publication from fee payment (SPEC_FULL.md §9).
    pub ephemeral: bool,
    /// This generation's own coin amount — not part of the field list in
    /// SPEC_FULL.md §3, added because authoring a successor needs to
    /// reconstruct *this* coin to spend it, and that can't be recovered
    /// from `lineage_proof` alone (which only describes the parent).
    pub amount: u64,
}

impl SingletonRecord {
    /// Computes the full puzzle hash a coin in this family hashes to:
    /// the singleton layer wraps the data-layer layer wraps the inner
    /// puzzle. Tree-hashing is out of scope, so this crate stands in a
    /// deterministic domain-separated hash in its place — the sync
    /// component only needs it to round-trip with [`Self::new`].
    pub fn full_puzzle_hash(
        inner_puzzle_hash: &Bytes32,
        root: &Bytes32,
        launcher_id: &Bytes32,
    ) -> Bytes32 {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(b"dl-full-puzzle");
        hasher.update(inner_puzzle_hash.as_bytes());
        hasher.update(root.as_bytes());
        hasher.update(launcher_id.as_bytes());
        let digest = hasher.finalize();
        let mut out = [0u8; 32];
        out.copy_from_slice(&digest);
        Bytes32(out)
    }

    /// Constructs a record, enforcing invariant (5): the amount must be odd
    /// and non-zero. `coin_id` is derived, never taken on faith — if a
    /// caller passes one that disagrees with the derivation, that is a
    /// programming error and fails with `InvariantViolation` rather than
    /// silently storing an inconsistent row.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        launcher_id: Bytes32,
        root: Bytes32,
        inner_puzzle_hash: Bytes32,
        amount: u64,
        lineage_proof: LineageProof,
        generation: u32,
        confirmed: bool,
        confirmed_at_height: u32,
        timestamp: u64,
        ephemeral: bool,
    ) -> Result<Self> {
        if amount == 0 || amount.is_multiple_of(2) {
            return Err(DataLayerError::InvalidAmount(amount));
        }
        let full_puzzle_hash = Self::full_puzzle_hash(&inner_puzzle_hash, &root, &launcher_id);
        let derived = coin_id(&lineage_proof.parent_name, &full_puzzle_hash, amount);
        Ok(SingletonRecord {
            coin_id: derived,
            launcher_id,
            root,
            inner_puzzle_hash,
            confirmed,
            confirmed_at_height,
            timestamp,
            lineage_proof,
            generation,
            ephemeral,
            amount,
        })
    }

    /// This record's own coin, reconstructed from its stored fields — the
    /// coin that must be spent to advance the singleton to its next
    /// generation.
    pub fn coin(&self) -> crate::types::Coin {
        crate::types::Coin::new(
            self.lineage_proof.parent_name,
            Self::full_puzzle_hash(&self.inner_puzzle_hash, &self.root, &self.launcher_id),
            self.amount,
        )
    }

    /// The lineage proof a child of this record should carry: this record
    /// described as *its parent*.
    pub fn as_parent_lineage(&self) -> LineageProof {
        LineageProof {
            parent_name: self.coin_id,
            parent_inner_puzzle_hash: Some(self.inner_puzzle_hash),
            parent_amount: self.amount,
        }
    }

    /// The `set_confirmed` transition — the only field mutation the data
    /// model allows (SPEC_FULL.md §3 Lifecycle).
    pub fn set_confirmed(&mut self, height: u32, timestamp: u64) {
        self.confirmed = true;
        self.confirmed_at_height = height;
        self.timestamp = timestamp;
    }
}

impl std::hash::Hash for SingletonRecord {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.coin_id.hash(state);
    }
}
