use crate::types::Bytes32;
use thiserror::Error;

/// The error taxonomy of SPEC_FULL.md §7, one variant per kind.
///
/// Mirrors the shape of `chia_client::Error`: a flat `thiserror` enum with
/// one display message per failure kind, carrying whatever identifiers make
/// the message actionable for an RPC caller.
#[derive(Debug, Error)]
pub enum DataLayerError {
    #[error("coin spend does not match the canonical launcher puzzle")]
    NotALauncher,

    #[error("launcher {0} is not tracked")]
    NotTracked(Bytes32),

    #[error("launcher {0} is already tracked")]
    AlreadyTracked(Bytes32),

    #[error("launcher {0}'s latest singleton is still pending confirmation")]
    Pending(Bytes32),

    #[error("latest singleton for launcher {0} lacks a usable lineage proof")]
    InsufficientLineage(Bytes32),

    #[error("wallet has no spend authority over inner puzzle hash {0}")]
    NotOwned(Bytes32),

    #[error("amount {0} is not a valid singleton amount (must be odd and non-zero)")]
    InvalidAmount(u64),

    #[error("singleton for launcher {0} has melted")]
    Melted(Bytes32),

    #[error("coin {0} did not hint properly; refusing to guess its successor")]
    MissingHint(Bytes32),

    #[error("no supplied proof establishes the required root for value in launcher {0}")]
    MissingProof(Bytes32),

    #[error("supplied proofs for launcher {0} resolve to inconsistent roots")]
    InconsistentRoots(Bytes32),

    #[error("store invariant violated: {0}")]
    InvariantViolation(String),
}

pub type Result<T> = std::result::Result<T, DataLayerError>;
