//! # cnft-transition: Validated Mint and Transfer of Compressed Assets
//!
//! Drives state-changing operations on compressed assets. A transfer resolves
//! the asset from the off-chain index, fetches a fresh inclusion proof,
//! validates that proof against the live tree root and the signer's
//! ownership, builds the instruction, signs it and submits it with bounded
//! exponential backoff.
//!
//! ## Modules
//!
//! - [`validator`]: root freshness and ownership checks, producing a
//!   [`ValidatedProof`].
//! - [`builder`]: instruction data and account lists for mint and transfer.
//! - [`submission`]: the retrying submission state machine.
//! - [`scheduler`]: the delay source used between retries.
//! - [`pipeline`]: stage-by-stage orchestration over the `cnft-core` ports.
//! - [`config`]: endpoints, credentials and retry tuning from the environment.
//!
//! ## Crate Policy
//!
//! - Depends on `cnft-core` only. Concrete index and ledger clients are
//!   injected as `Arc<dyn …>` by the binary.
//! - Only submission failures are retried. Every other failure aborts the
//!   operation with a stage-tagged [`TransitionError`].

pub mod builder;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod scheduler;
pub mod submission;
pub mod validator;

pub use builder::{
    build_burn, build_mint, build_transfer, discriminator, CollectionRefs, LeafParams, MintArgs,
    TransitionKind, TransitionParams, TransitionRequest,
};
pub use config::{CnftConfig, ConfigError};
pub use error::{Stage, SubmitError, TransitionError};
pub use pipeline::{TransitionOutcome, TransitionPipeline};
pub use scheduler::{ManualScheduler, Scheduler, TokioScheduler};
pub use submission::{
    AttemptOutcome, RetryPolicy, Submission, SubmissionAttempt, SubmissionEngine,
    SubmissionReceipt, SubmissionState, SubmissionTransitionRecord,
};
pub use validator::{check_owner, check_root, validate_mint, validate_transfer, ValidatedProof};
