//! Component F: the offer graftroot assembler (SPEC_FULL.md §4.F).
//!
//! Grounded on `make_update_offer` / `finish_graftroot_solutions` /
//! `get_offer_summary` in the original wallet's offer section. The graftroot
//! puzzle itself is CLVM and out of scope, so the structured data it would
//! otherwise carry curried into a puzzle — the peer launcher ids, the
//! values each depends on, and the eventual proofs — is carried directly as
//! a side-channel alongside the spend bundle instead of being encoded into
//! a [`Program`].

use std::sync::Arc;

use crate::collaborators::{DerivationIndex, Signer, StandardWallet};
use crate::error::{DataLayerError, Result};
use crate::successor::{SuccessorAuthor, UpdateStateParams};
use crate::types::{Bytes32, SpendBundle};

/// One peer singleton this update depends on, and the values from its root
/// that must be proven before the update can go through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub peer_launcher_id: Bytes32,
    pub values_to_prove: Vec<Bytes32>,
}

/// A proof, from some external merkle-tree implementation, that `value`
/// belongs to the tree with root `root`. Producing and verifying these is
/// out of scope; this crate only threads already-verified proofs through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofOfInclusion {
    pub value: Bytes32,
    pub root: Bytes32,
}

/// The graftroot side-channel for one offered launcher's update spend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraftrootSpend {
    pub launcher_id: Bytes32,
    pub new_root: Bytes32,
    pub dependencies: Vec<Dependency>,
    /// Filled in by [`OfferAssembler::finish_graftroot_solutions`]: one
    /// resolved root per dependency, in the same order.
    pub resolved_roots: Vec<Bytes32>,
}

/// A partially or fully assembled cross-singleton update offer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Offer {
    pub requested_payments: Vec<(Bytes32, u64)>,
    pub bundle: SpendBundle,
    pub graftroots: Vec<GraftrootSpend>,
}

/// One launcher's half of a [`OfferAssembler::make_update_offer`] request.
pub struct OfferedUpdate {
    pub launcher_id: Bytes32,
    pub new_root: Bytes32,
    pub dependencies: Vec<Dependency>,
}

#[derive(Debug, Clone)]
pub struct SingletonSummary {
    pub launcher_id: Bytes32,
    pub new_root: Bytes32,
    pub dependencies: Vec<Dependency>,
}

pub struct OfferAssembler<S, W, D, Si> {
    successor_author: Arc<SuccessorAuthor<S, W, D, Si>>,
    standard_wallet: Arc<W>,
}

impl<S, W, D, Si> OfferAssembler<S, W, D, Si>
where
    S: crate::store::SingletonStore,
    W: StandardWallet,
    D: DerivationIndex,
    Si: Signer,
{
    pub fn new(
        successor_author: Arc<SuccessorAuthor<S, W, D, Si>>,
        standard_wallet: Arc<W>,
    ) -> Self {
        OfferAssembler {
            successor_author,
            standard_wallet,
        }
    }

    /// `make_update_offer` (SPEC_FULL.md §4.F). Only the first offered
    /// launcher's update pays the requested fee, matching the original's
    /// `fee_left_to_pay` bookkeeping.
    pub async fn make_update_offer(
        &self,
        updates: Vec<OfferedUpdate>,
        requested_payments: Vec<(Bytes32, u64)>,
        fee: u64,
    ) -> Result<Offer> {
        let mut bundles = Vec::new();
        let mut graftroots = Vec::new();
        let mut fee_left_to_pay = fee;

        for update in updates {
            let new_puzzle_hash = self.standard_wallet.get_new_puzzle_hash().await?;
            let txs = self
                .successor_author
                .create_update_state_spend(
                    update.launcher_id,
                    UpdateStateParams {
                        new_root: Some(update.new_root),
                        new_inner_puzzle_hash: Some(new_puzzle_hash),
                        new_amount: Some(1),
                        fee: fee_left_to_pay,
                        sign: false,
                        add_pending: false,
                        announce_new_state: true,
                        ..Default::default()
                    },
                )
                .await?;
            fee_left_to_pay = 0;

            let bundle = txs[0]
                .spend_bundle
                .clone()
                .expect("authored spend always has a bundle");
            bundles.push(bundle);
            graftroots.push(GraftrootSpend {
                launcher_id: update.launcher_id,
                new_root: update.new_root,
                dependencies: update.dependencies,
                resolved_roots: Vec::new(),
            });
        }

        Ok(Offer {
            requested_payments,
            bundle: SpendBundle::aggregate(bundles),
            graftroots,
        })
    }

    /// `finish_graftroot_solutions` (SPEC_FULL.md §4.F): resolves each
    /// dependency's values against the caller's proofs of inclusion.
    pub fn finish_graftroot_solutions(
        &self,
        mut offer: Offer,
        proofs: &[ProofOfInclusion],
    ) -> Result<Offer> {
        for graftroot in &mut offer.graftroots {
            let mut resolved_roots = Vec::with_capacity(graftroot.dependencies.len());
            for dependency in &graftroot.dependencies {
                let mut asserted_root: Option<Bytes32> = None;
                for value in &dependency.values_to_prove {
                    let proof = proofs
                        .iter()
                        .find(|p| p.value == *value)
                        .ok_or(DataLayerError::MissingProof(dependency.peer_launcher_id))?;
                    match asserted_root {
                        None => asserted_root = Some(proof.root),
                        Some(root) if root == proof.root => {}
                        Some(_) => {
                            return Err(DataLayerError::InconsistentRoots(
                                dependency.peer_launcher_id,
                            ));
                        }
                    }
                }
                resolved_roots.push(
                    asserted_root.ok_or(DataLayerError::MissingProof(graftroot.launcher_id))?,
                );
            }
            graftroot.resolved_roots = resolved_roots;
        }
        Ok(offer)
    }

    /// `get_offer_summary` (SPEC_FULL.md §4.F).
    pub fn get_offer_summary(&self, offer: &Offer) -> Vec<SingletonSummary> {
        offer
            .graftroots
            .iter()
            .map(|g| SingletonSummary {
                launcher_id: g.launcher_id,
                new_root: g.new_root,
                dependencies: g.dependencies.clone(),
            })
            .collect()
    }
}
