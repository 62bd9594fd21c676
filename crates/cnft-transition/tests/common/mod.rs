//! In-memory index, ledger, submitter and signer doubles.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use cnft_core::{
    pda, AssetIndex, CompressedAsset, Hash, Hash32, InclusionProof, IndexError, LedgerError,
    LedgerReader, LedgerSubmitter, Pubkey, Signature, SignedTransaction, SigningError,
    TransactionSigner, TreeState,
};

pub const TREE: Pubkey = Pubkey::new_from_array([7; 32]);
pub const ALICE: Pubkey = Pubkey::new_from_array([0xA1; 32]);
pub const BOB: Pubkey = Pubkey::new_from_array([0xB0; 32]);
pub const CAROL: Pubkey = Pubkey::new_from_array([0xC0; 32]);
pub const R0: Hash32 = Hash32([0x50; 32]);
pub const R1: Hash32 = Hash32([0x51; 32]);

pub fn tree_state(root: Hash32, next_leaf_index: u64) -> TreeState {
    TreeState {
        address: TREE,
        max_depth: 3,
        max_buffer_size: 8,
        canopy_depth: 0,
        root,
        authority: pda::tree_config(&TREE).unwrap(),
        creation_slot: 1,
        sequence_number: next_leaf_index,
        next_leaf_index,
    }
}

pub fn asset(owner: Pubkey) -> CompressedAsset {
    CompressedAsset {
        id: pda::leaf_asset_id(&TREE, 0).unwrap(),
        tree: TREE,
        leaf_index: 0,
        owner,
        delegate: None,
        data_hash: Hash32([1; 32]),
        creator_hash: Hash32([2; 32]),
        content_uri: "https://example.com/0.json".into(),
        collection: None,
    }
}

pub fn proof(root: Hash32, nodes: usize) -> InclusionProof {
    InclusionProof {
        asset_id: pda::leaf_asset_id(&TREE, 0).unwrap(),
        tree: TREE,
        root,
        proof: (0..nodes).map(|i| Hash32([0x20 + i as u8; 32])).collect(),
        leaf: Hash32([4; 32]),
        node_index: 8,
    }
}

// ── Index ────────────────────────────────────────────────────────────

pub struct FakeIndex {
    asset: Option<CompressedAsset>,
    proof: InclusionProof,
    pub resolves: AtomicUsize,
    pub proof_fetches: AtomicUsize,
}

impl FakeIndex {
    pub fn new(asset: CompressedAsset, proof: InclusionProof) -> Self {
        Self {
            asset: Some(asset),
            proof,
            resolves: AtomicUsize::new(0),
            proof_fetches: AtomicUsize::new(0),
        }
    }

    pub fn empty() -> Self {
        Self {
            asset: None,
            proof: proof(R0, 3),
            resolves: AtomicUsize::new(0),
            proof_fetches: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl AssetIndex for FakeIndex {
    async fn resolve(&self, tree: &Pubkey, leaf_index: u64) -> Result<CompressedAsset, IndexError> {
        self.resolves.fetch_add(1, Ordering::SeqCst);
        let asset_id = pda::leaf_asset_id(tree, leaf_index)?;
        self.asset
            .clone()
            .filter(|a| a.id == asset_id)
            .ok_or(IndexError::AssetNotFound { asset_id })
    }

    async fn fetch_proof(&self, asset_id: &Pubkey) -> Result<InclusionProof, IndexError> {
        self.proof_fetches.fetch_add(1, Ordering::SeqCst);
        if *asset_id != self.proof.asset_id {
            return Err(IndexError::AssetNotFound { asset_id: *asset_id });
        }
        Ok(self.proof.clone())
    }
}

// ── Ledger ───────────────────────────────────────────────────────────

pub struct FakeLedger {
    tree: Mutex<TreeState>,
    pub tree_reads: AtomicUsize,
    pub blockhash_reads: AtomicUsize,
}

impl FakeLedger {
    pub fn new(tree: TreeState) -> Self {
        Self {
            tree: Mutex::new(tree),
            tree_reads: AtomicUsize::new(0),
            blockhash_reads: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl LedgerReader for FakeLedger {
    async fn tree_state(&self, tree: &Pubkey) -> Result<TreeState, LedgerError> {
        self.tree_reads.fetch_add(1, Ordering::SeqCst);
        let state = self.tree.lock().unwrap().clone();
        if state.address != *tree {
            return Err(LedgerError::AccountNotFound { address: *tree });
        }
        Ok(state)
    }

    async fn latest_blockhash(&self) -> Result<Hash, LedgerError> {
        self.blockhash_reads.fetch_add(1, Ordering::SeqCst);
        Ok(Hash::new_from_array([0xBB; 32]))
    }
}

// ── Submitter ────────────────────────────────────────────────────────

/// Scripted result of one send-and-confirm attempt.
#[derive(Debug, Clone, Copy)]
pub enum Step {
    SendFails,
    ConfirmFails,
    Succeeds,
}

pub struct FakeSubmitter {
    script: Mutex<VecDeque<Step>>,
    pending_confirm: Mutex<Option<Step>>,
    pub sent: Mutex<Vec<Vec<u8>>>,
    pub confirms: AtomicUsize,
}

impl FakeSubmitter {
    /// Plays `script` in order, then succeeds forever.
    pub fn scripted(script: impl IntoIterator<Item = Step>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            pending_confirm: Mutex::new(None),
            sent: Mutex::new(Vec::new()),
            confirms: AtomicUsize::new(0),
        }
    }

    pub fn always_ok() -> Self {
        Self::scripted([])
    }

    pub fn always_failing() -> Self {
        Self::scripted(std::iter::repeat(Step::SendFails).take(100))
    }

    pub fn send_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl LedgerSubmitter for FakeSubmitter {
    async fn send(&self, tx: &SignedTransaction) -> Result<Signature, LedgerError> {
        self.sent.lock().unwrap().push(tx.wire_bytes().to_vec());
        let step = self.script.lock().unwrap().pop_front().unwrap_or(Step::Succeeds);
        if let Step::SendFails = step {
            return Err(LedgerError::Unavailable {
                endpoint: "sendTransaction".into(),
                reason: "connection reset".into(),
            });
        }
        *self.pending_confirm.lock().unwrap() = Some(step);
        Ok(tx.signature())
    }

    async fn confirm(&self, signature: &Signature) -> Result<(), LedgerError> {
        self.confirms.fetch_add(1, Ordering::SeqCst);
        match self.pending_confirm.lock().unwrap().take() {
            Some(Step::ConfirmFails) => Err(LedgerError::ConfirmationTimeout {
                signature: *signature,
                waited_ms: 30_000,
            }),
            _ => Ok(()),
        }
    }
}

// ── Signer ───────────────────────────────────────────────────────────

pub struct FakeSigner(pub Pubkey);

impl TransactionSigner for FakeSigner {
    fn address(&self) -> Pubkey {
        self.0
    }

    fn sign(&self, message: &[u8]) -> Result<Signature, SigningError> {
        let mut sig = [0u8; 64];
        sig[..32].copy_from_slice(self.0.as_ref());
        sig[32] = message.len() as u8;
        Ok(Signature::from(sig))
    }
}
