//! # Proof Validator
//!
//! Gates every state-changing request on two checks:
//!
//! 1. **Root check.** The proof's root must equal the live root read from the
//!    ledger at validation time. The index is never trusted for the root; an
//!    index that lags the ledger serves proofs for roots the ledger has
//!    already replaced.
//! 2. **Ownership check.** The asset's current owner must be the signer.
//!
//! Both checks compare decoded bytes and have no side effects. Neither is
//! retried: a stale proof needs a fresh proof, not the same one again.
//!
//! A successful validation yields a [`ValidatedProof`]. It can only be
//! constructed here, and the builder will not assemble a transfer or burn
//! without one, so an unchecked proof cannot reach the ledger.

use cnft_core::{CompressedAsset, InclusionProof, LedgerReader, Pubkey, TreeState};

use crate::error::{Stage, TransitionError};

/// Evidence that a proof matched the live root and the signer owns the asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedProof {
    asset: CompressedAsset,
    proof: InclusionProof,
    tree: TreeState,
    signer: Pubkey,
}

impl ValidatedProof {
    /// The asset being transferred or burned.
    pub fn asset(&self) -> &CompressedAsset {
        &self.asset
    }

    /// The proof that matched the live root.
    pub fn proof(&self) -> &InclusionProof {
        &self.proof
    }

    /// Tree state observed during validation.
    pub fn tree(&self) -> &TreeState {
        &self.tree
    }

    /// Signer the ownership check passed for.
    pub fn signer(&self) -> Pubkey {
        self.signer
    }
}

/// Compare the proof root with the ledger's live root.
pub fn check_root(proof: &InclusionProof, tree: &TreeState) -> Result<(), TransitionError> {
    if proof.tree != tree.address {
        return Err(TransitionError::invalid(
            Stage::Validate,
            "tree",
            format!("proof is for tree {}, validating against {}", proof.tree, tree.address),
        ));
    }
    if proof.root != tree.root {
        return Err(TransitionError::StaleProof {
            asset_id: proof.asset_id,
            proof_root: proof.root,
            ledger_root: tree.root,
        });
    }
    Ok(())
}

/// Require `signer` to be the asset's current owner.
pub fn check_owner(asset: &CompressedAsset, signer: &Pubkey) -> Result<(), TransitionError> {
    if asset.owner != *signer {
        return Err(TransitionError::Ownership {
            asset_id: asset.id,
            owner: asset.owner,
            signer: *signer,
        });
    }
    Ok(())
}

/// Validate a transfer against an already-read tree state.
pub fn validate_against(
    asset: CompressedAsset,
    proof: InclusionProof,
    tree: TreeState,
    signer: Pubkey,
) -> Result<ValidatedProof, TransitionError> {
    if proof.asset_id != asset.id {
        return Err(TransitionError::invalid(
            Stage::Validate,
            "proof",
            format!("proof is for asset {}, not {}", proof.asset_id, asset.id),
        ));
    }
    if asset.tree != tree.address {
        return Err(TransitionError::invalid(
            Stage::Validate,
            "tree",
            format!("asset lives in tree {}, not {}", asset.tree, tree.address),
        ));
    }
    check_root(&proof, &tree)?;
    check_owner(&asset, &signer)?;

    Ok(ValidatedProof {
        asset,
        proof,
        tree,
        signer,
    })
}

/// Read the live tree state from the ledger and validate a transfer against it.
///
/// This performs its own ledger read even if the caller read the tree
/// earlier: freshness is judged now, not at proof fetch time.
pub async fn validate_transfer(
    ledger: &dyn LedgerReader,
    asset: CompressedAsset,
    proof: InclusionProof,
    signer: Pubkey,
) -> Result<ValidatedProof, TransitionError> {
    let tree = ledger
        .tree_state(&asset.tree)
        .await
        .map_err(|e| TransitionError::from_ledger(Stage::Validate, e))?;

    tracing::debug!(
        asset_id = %asset.id,
        proof_root = %proof.root,
        ledger_root = %tree.root,
        "validating inclusion proof"
    );
    validate_against(asset, proof, tree, signer)
}

/// Check that a mint can append to `tree`.
pub fn validate_mint(tree: &TreeState) -> Result<(), TransitionError> {
    if tree.is_full() {
        return Err(TransitionError::invalid(
            Stage::Validate,
            "tree",
            format!(
                "tree {} is full ({} of {} leaves)",
                tree.address,
                tree.next_leaf_index,
                tree.capacity()
            ),
        ));
    }
    Ok(())
}
