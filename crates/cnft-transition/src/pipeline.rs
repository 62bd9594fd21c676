//! # Transition Pipeline
//!
//! Runs one mint, transfer or burn end to end:
//!
//! ```text
//! transfer: resolve ─▶ fetch_proof ─▶ validate ─▶ build ─▶ prepare ─▶ submit
//! burn:     resolve ─▶ fetch_proof ─▶ validate ─▶ build ─▶ prepare ─▶ submit
//! mint:     read tree ─▶ validate ─▶ build ─▶ prepare ─▶ submit
//! ```
//!
//! Each stage either hands a value to the next or aborts the operation with a
//! [`TransitionError`] tagged with that stage. Only the submit stage retries.
//! Proof fetch and root validation stay separate steps: validation performs
//! its own ledger read so the root is judged as late as possible.
//!
//! The pipeline holds its collaborators as trait objects and has no global
//! state; independent operations may run concurrently on one pipeline.

use std::sync::Arc;

use cnft_core::{
    pda, AssetIndex, LedgerReader, LedgerSubmitter, Message, ProgramIds, Pubkey, Signature,
    SignedTransaction, SigningError, Transaction, TransactionSigner,
};
use tracing::Instrument;
use uuid::Uuid;

use crate::builder::{
    build_burn, build_mint, build_transfer, CollectionRefs, MintArgs, TransitionKind,
    TransitionRequest,
};
use crate::error::{Stage, TransitionError};
use crate::scheduler::Scheduler;
use crate::submission::{RetryPolicy, Submission, SubmissionEngine};
use crate::validator::{validate_mint, validate_transfer, ValidatedProof};

/// A confirmed mint, transfer or burn.
#[derive(Debug, Clone)]
pub struct TransitionOutcome {
    /// Correlation id carried on every log line of the operation.
    pub operation_id: Uuid,
    pub kind: TransitionKind,
    /// Transferred or burned asset, or the id the minted asset is expected to receive.
    pub asset_id: Pubkey,
    /// Signature of the confirmed transaction.
    pub signature: Signature,
    /// Attempt and transition history of the submission.
    pub submission: Submission,
}

/// Mint, transfer and burn orchestration over the index and ledger ports.
#[derive(Clone)]
pub struct TransitionPipeline {
    index: Arc<dyn AssetIndex>,
    ledger: Arc<dyn LedgerReader>,
    signer: Arc<dyn TransactionSigner>,
    engine: SubmissionEngine,
    programs: ProgramIds,
}

impl std::fmt::Debug for TransitionPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransitionPipeline")
            .field("signer", &self.signer.address())
            .field("programs", &self.programs)
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}

impl TransitionPipeline {
    pub fn new(
        index: Arc<dyn AssetIndex>,
        ledger: Arc<dyn LedgerReader>,
        submitter: Arc<dyn LedgerSubmitter>,
        signer: Arc<dyn TransactionSigner>,
        scheduler: Arc<dyn Scheduler>,
        programs: ProgramIds,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            index,
            ledger,
            signer,
            engine: SubmissionEngine::new(submitter, scheduler, policy),
            programs,
        }
    }

    /// Pubkey that signs and pays for every operation.
    pub fn signer_address(&self) -> Pubkey {
        self.signer.address()
    }

    pub fn programs(&self) -> &ProgramIds {
        &self.programs
    }

    /// Transfer the asset at `leaf_index` in `tree` to `new_owner`.
    ///
    /// # Errors
    ///
    /// Any [`TransitionError`]. Nothing is sent unless the proof matched the
    /// live root and the signer owns the asset.
    pub async fn transfer(
        &self,
        tree: &Pubkey,
        leaf_index: u64,
        new_owner: Pubkey,
    ) -> Result<TransitionOutcome, TransitionError> {
        let operation_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "transfer",
            %operation_id,
            %tree,
            leaf_index,
            %new_owner
        );
        self.run_transfer(operation_id, tree, leaf_index, new_owner)
            .instrument(span)
            .await
    }

    async fn run_transfer(
        &self,
        operation_id: Uuid,
        tree: &Pubkey,
        leaf_index: u64,
        new_owner: Pubkey,
    ) -> Result<TransitionOutcome, TransitionError> {
        let validated = self.resolve_and_validate(tree, leaf_index).await?;
        let request = build_transfer(&validated, new_owner, &self.programs)?;
        self.finish(operation_id, validated.asset().id, &request).await
    }

    /// Burn the asset at `leaf_index` in `tree`.
    ///
    /// Tokens locked in the asset's stake vault are released to
    /// `token_account` by the transition program.
    ///
    /// # Errors
    ///
    /// As [`Self::transfer`]: nothing is sent unless the proof matched the
    /// live root and the signer owns the asset.
    pub async fn burn(
        &self,
        tree: &Pubkey,
        leaf_index: u64,
        token_account: Pubkey,
    ) -> Result<TransitionOutcome, TransitionError> {
        let operation_id = Uuid::new_v4();
        let span = tracing::info_span!("burn", %operation_id, %tree, leaf_index, %token_account);
        self.run_burn(operation_id, tree, leaf_index, token_account)
            .instrument(span)
            .await
    }

    async fn run_burn(
        &self,
        operation_id: Uuid,
        tree: &Pubkey,
        leaf_index: u64,
        token_account: Pubkey,
    ) -> Result<TransitionOutcome, TransitionError> {
        let validated = self.resolve_and_validate(tree, leaf_index).await?;
        let request = build_burn(&validated, token_account, &self.programs)?;
        self.finish(operation_id, validated.asset().id, &request).await
    }

    /// Resolve, fetch a fresh proof and validate it against the live root.
    async fn resolve_and_validate(
        &self,
        tree: &Pubkey,
        leaf_index: u64,
    ) -> Result<ValidatedProof, TransitionError> {
        let asset = self
            .index
            .resolve(tree, leaf_index)
            .await
            .map_err(|e| TransitionError::from_index(Stage::Resolve, e))?;
        tracing::info!(asset_id = %asset.id, owner = %asset.owner, "asset resolved");

        let proof = self
            .index
            .fetch_proof(&asset.id)
            .await
            .map_err(|e| TransitionError::from_index(Stage::FetchProof, e))?;
        tracing::info!(root = %proof.root, nodes = proof.proof.len(), "proof fetched");

        let validated =
            validate_transfer(self.ledger.as_ref(), asset, proof, self.signer.address()).await?;
        tracing::info!("proof validated against live root");
        Ok(validated)
    }

    /// Mint a new asset into `tree` for `leaf_owner`, verified into `collection`.
    ///
    /// The signer pays and acts as tree delegate.
    pub async fn mint(
        &self,
        tree: &Pubkey,
        leaf_owner: Pubkey,
        collection: &CollectionRefs,
        args: &MintArgs,
    ) -> Result<TransitionOutcome, TransitionError> {
        let operation_id = Uuid::new_v4();
        let span = tracing::info_span!("mint", %operation_id, %tree, %leaf_owner, name = %args.name);
        self.run_mint(operation_id, tree, leaf_owner, collection, args)
            .instrument(span)
            .await
    }

    async fn run_mint(
        &self,
        operation_id: Uuid,
        tree: &Pubkey,
        leaf_owner: Pubkey,
        collection: &CollectionRefs,
        args: &MintArgs,
    ) -> Result<TransitionOutcome, TransitionError> {
        let state = self
            .ledger
            .tree_state(tree)
            .await
            .map_err(|e| TransitionError::from_ledger(Stage::Validate, e))?;
        validate_mint(&state)?;

        let asset_id = pda::leaf_asset_id(tree, state.next_leaf_index)
            .map_err(|e| TransitionError::invalid(Stage::Build, "tree", e.to_string()))?;
        let request = build_mint(
            args,
            &state,
            collection,
            self.signer.address(),
            leaf_owner,
            &self.programs,
        )?;
        tracing::info!(expected_asset_id = %asset_id, leaf_index = state.next_leaf_index, "mint built");
        self.finish(operation_id, asset_id, &request).await
    }

    async fn finish(
        &self,
        operation_id: Uuid,
        asset_id: Pubkey,
        request: &TransitionRequest,
    ) -> Result<TransitionOutcome, TransitionError> {
        let tx = self.prepare(request).await?;
        let mut submission = Submission::new();
        let signature = self.engine.drive(&mut submission, &tx).await?;
        tracing::info!(%signature, attempts = submission.attempts().len(), "operation complete");
        Ok(TransitionOutcome {
            operation_id,
            kind: request.kind(),
            asset_id,
            signature,
            submission,
        })
    }

    /// Anchor `request` to the latest blockhash, compile and sign it.
    ///
    /// The resulting transaction is sent verbatim on every retry.
    pub async fn prepare(&self, request: &TransitionRequest) -> Result<SignedTransaction, TransitionError> {
        let signer = self.signer.address();
        if request.signer() != signer {
            return Err(SigningError::SignerMismatch {
                signer,
                fee_payer: request.signer(),
            }
            .into());
        }

        let blockhash = self
            .ledger
            .latest_blockhash()
            .await
            .map_err(|e| TransitionError::from_ledger(Stage::Prepare, e))?;
        let message = Message::new_with_blockhash(&[request.instruction()], Some(&signer), &blockhash);
        let signature = self.signer.sign(&message.serialize())?;
        let tx = SignedTransaction::new(Transaction {
            signatures: vec![signature],
            message,
        })
        .map_err(TransitionError::from_wire)?;
        tracing::debug!(%blockhash, size = tx.wire_bytes().len(), "transaction signed");
        Ok(tx)
    }
}
