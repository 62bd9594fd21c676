//! # Submission Engine
//!
//! Sends one signed transaction and waits for confirmation, retrying
//! transient failures with exponential backoff.
//!
//! ## States
//!
//! ```text
//! Idle ──▶ Sending ──▶ Confirmed (terminal)
//!             │  ▲
//!             ▼  │
//!           Retrying
//!             │
//!             └──▶ Failed (terminal, once retries reach max_retries)
//! ```
//!
//! A failed confirmation counts as a failed send. Every retry re-sends the
//! identical signed transaction: same blockhash, same signature. Every attempt
//! and every state change is recorded on the [`Submission`].

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use cnft_core::{LedgerSubmitter, Signature, SignedTransaction};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{Stage, SubmitError, TransitionError};
use crate::scheduler::Scheduler;

// ─── Retry Policy ────────────────────────────────────────────────────

/// Bounded exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Retries after the first attempt. Total sends are `max_retries + 1`.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Multiplier applied per retry.
    pub backoff_factor: u32,
    /// Upper bound on any single delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            initial_delay: Duration::from_millis(1000),
            backoff_factor: 2,
            max_delay: Duration::from_millis(5000),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retries + 1`:
    /// `min(initial_delay * backoff_factor^retries, max_delay)`.
    pub fn delay_for(&self, retries: u32) -> Duration {
        let initial = self.initial_delay.as_millis();
        let scaled = u128::from(self.backoff_factor)
            .checked_pow(retries)
            .and_then(|m| initial.checked_mul(m))
            .unwrap_or(u128::MAX);
        let capped = scaled.min(self.max_delay.as_millis());
        Duration::from_millis(u64::try_from(capped).unwrap_or(u64::MAX))
    }

    /// The full delay schedule, one entry per permitted retry.
    pub fn delays(&self) -> impl Iterator<Item = Duration> + '_ {
        (0..self.max_retries).map(move |r| self.delay_for(r))
    }
}

// ─── Submission State ────────────────────────────────────────────────

/// Lifecycle state of one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubmissionState {
    Idle,
    Sending,
    Retrying,
    /// The transaction reached the required commitment (terminal).
    Confirmed,
    /// Retries are exhausted (terminal).
    Failed,
}

impl SubmissionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Failed)
    }
}

impl std::fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Idle => "IDLE",
            Self::Sending => "SENDING",
            Self::Retrying => "RETRYING",
            Self::Confirmed => "CONFIRMED",
            Self::Failed => "FAILED",
        };
        f.write_str(s)
    }
}

/// Errors driving the submission state machine out of order.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionStateError {
    #[error("invalid submission transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("submission is in terminal state {state}")]
    TerminalState { state: String },
}

impl From<SubmissionStateError> for TransitionError {
    fn from(err: SubmissionStateError) -> Self {
        TransitionError::invalid(Stage::Submit, "submission", err.to_string())
    }
}

/// Result of a single send-and-confirm attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttemptOutcome {
    /// In flight.
    Pending,
    Confirmed,
    /// Failed; another attempt follows.
    TransientFailure { reason: String },
    /// Failed with no retries left.
    FatalFailure { reason: String },
}

/// One send-and-confirm attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionAttempt {
    /// 1-based attempt number.
    pub sequence: u32,
    /// Backoff waited before this attempt (zero for the first).
    pub delay: Duration,
    pub outcome: AttemptOutcome,
    /// Signature returned by the ledger, if the send itself succeeded.
    #[serde(with = "cnft_core::codec::base58::option")]
    pub signature: Option<Signature>,
    pub started_at: DateTime<Utc>,
}

/// Record of a submission state transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionTransitionRecord {
    pub from_state: SubmissionState,
    pub to_state: SubmissionState,
    pub timestamp: DateTime<Utc>,
    pub reason: String,
}

/// A submission with its state, attempt log and transition history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    state: SubmissionState,
    retries: u32,
    next_delay: Duration,
    attempts: Vec<SubmissionAttempt>,
    transitions: Vec<SubmissionTransitionRecord>,
}

impl Default for Submission {
    fn default() -> Self {
        Self::new()
    }
}

impl Submission {
    pub fn new() -> Self {
        Self {
            state: SubmissionState::Idle,
            retries: 0,
            next_delay: Duration::ZERO,
            attempts: Vec::new(),
            transitions: Vec::new(),
        }
    }

    pub fn state(&self) -> SubmissionState {
        self.state
    }

    /// Retries performed so far.
    pub fn retries(&self) -> u32 {
        self.retries
    }

    pub fn attempts(&self) -> &[SubmissionAttempt] {
        &self.attempts
    }

    pub fn transitions(&self) -> &[SubmissionTransitionRecord] {
        &self.transitions
    }

    /// Start an attempt (IDLE or RETRYING → SENDING).
    pub fn begin_attempt(&mut self) -> Result<u32, SubmissionStateError> {
        if self.state.is_terminal() {
            return Err(SubmissionStateError::TerminalState {
                state: self.state.to_string(),
            });
        }
        if !matches!(self.state, SubmissionState::Idle | SubmissionState::Retrying) {
            return Err(SubmissionStateError::InvalidTransition {
                from: self.state.to_string(),
                to: SubmissionState::Sending.to_string(),
            });
        }
        let sequence = self.attempts.len() as u32 + 1;
        self.attempts.push(SubmissionAttempt {
            sequence,
            delay: self.next_delay,
            outcome: AttemptOutcome::Pending,
            signature: None,
            started_at: Utc::now(),
        });
        self.do_transition(SubmissionState::Sending, &format!("attempt {sequence}"));
        Ok(sequence)
    }

    /// Record a confirmed attempt (SENDING → CONFIRMED).
    pub fn confirm(&mut self, signature: Signature) -> Result<(), SubmissionStateError> {
        self.require_state(SubmissionState::Sending, SubmissionState::Confirmed)?;
        self.finish_attempt(AttemptOutcome::Confirmed, Some(signature));
        self.do_transition(SubmissionState::Confirmed, &format!("confirmed {signature}"));
        Ok(())
    }

    /// Record a failed attempt to be retried after `delay` (SENDING → RETRYING).
    pub fn retry(
        &mut self,
        error: &SubmitError,
        signature: Option<Signature>,
        delay: Duration,
    ) -> Result<(), SubmissionStateError> {
        self.require_state(SubmissionState::Sending, SubmissionState::Retrying)?;
        let reason = error.to_string();
        self.finish_attempt(
            AttemptOutcome::TransientFailure {
                reason: reason.clone(),
            },
            signature,
        );
        self.retries += 1;
        self.next_delay = delay;
        self.do_transition(SubmissionState::Retrying, &reason);
        Ok(())
    }

    /// Record the final failed attempt (SENDING → FAILED).
    pub fn fail(
        &mut self,
        error: &SubmitError,
        signature: Option<Signature>,
    ) -> Result<(), SubmissionStateError> {
        self.require_state(SubmissionState::Sending, SubmissionState::Failed)?;
        let reason = error.to_string();
        self.finish_attempt(
            AttemptOutcome::FatalFailure {
                reason: reason.clone(),
            },
            signature,
        );
        self.do_transition(SubmissionState::Failed, &reason);
        Ok(())
    }

    fn finish_attempt(&mut self, outcome: AttemptOutcome, signature: Option<Signature>) {
        if let Some(attempt) = self.attempts.last_mut() {
            attempt.outcome = outcome;
            attempt.signature = signature;
        }
    }

    fn require_state(
        &self,
        expected: SubmissionState,
        target: SubmissionState,
    ) -> Result<(), SubmissionStateError> {
        if self.state.is_terminal() {
            return Err(SubmissionStateError::TerminalState {
                state: self.state.to_string(),
            });
        }
        if self.state != expected {
            return Err(SubmissionStateError::InvalidTransition {
                from: self.state.to_string(),
                to: target.to_string(),
            });
        }
        Ok(())
    }

    fn do_transition(&mut self, to: SubmissionState, reason: &str) {
        let from = self.state;
        self.state = to;
        self.transitions.push(SubmissionTransitionRecord {
            from_state: from,
            to_state: to,
            timestamp: Utc::now(),
            reason: reason.to_string(),
        });
    }
}

// ─── Engine ──────────────────────────────────────────────────────────

/// A confirmed submission.
#[derive(Debug, Clone)]
pub struct SubmissionReceipt {
    pub signature: Signature,
    pub submission: Submission,
}

/// Sends and confirms signed transactions under a [`RetryPolicy`].
#[derive(Clone)]
pub struct SubmissionEngine {
    submitter: Arc<dyn LedgerSubmitter>,
    scheduler: Arc<dyn Scheduler>,
    policy: RetryPolicy,
}

impl std::fmt::Debug for SubmissionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmissionEngine")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl SubmissionEngine {
    pub fn new(
        submitter: Arc<dyn LedgerSubmitter>,
        scheduler: Arc<dyn Scheduler>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            submitter,
            scheduler,
            policy,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Submit `tx` until it confirms or retries run out.
    ///
    /// # Errors
    ///
    /// [`TransitionError::SubmissionExhausted`] carrying the last
    /// [`SubmitError`] after `max_retries + 1` failed attempts.
    pub async fn submit(&self, tx: &SignedTransaction) -> Result<SubmissionReceipt, TransitionError> {
        let mut submission = Submission::new();
        let signature = self.drive(&mut submission, tx).await?;
        Ok(SubmissionReceipt {
            signature,
            submission,
        })
    }

    /// Drive `submission` to a terminal state, leaving its history readable
    /// to the caller whatever the outcome.
    pub async fn drive(
        &self,
        submission: &mut Submission,
        tx: &SignedTransaction,
    ) -> Result<Signature, TransitionError> {
        loop {
            let sequence = submission.begin_attempt()?;
            tracing::debug!(attempt = sequence, signature = %tx.signature(), "sending transaction");

            let (sent, result) = self.attempt(tx).await;
            let err = match result {
                Ok(signature) => {
                    submission.confirm(signature)?;
                    tracing::info!(attempt = sequence, %signature, "transaction confirmed");
                    return Ok(signature);
                }
                Err(err) => err,
            };

            if submission.retries() >= self.policy.max_retries {
                submission.fail(&err, sent)?;
                tracing::error!(
                    attempts = sequence,
                    max_retries = self.policy.max_retries,
                    error = %err,
                    "submission exhausted"
                );
                return Err(TransitionError::SubmissionExhausted {
                    attempts: sequence,
                    last: err,
                });
            }

            let delay = self.policy.delay_for(submission.retries());
            tracing::warn!(
                attempt = sequence,
                max_retries = self.policy.max_retries,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "submission attempt failed, retrying"
            );
            submission.retry(&err, sent, delay)?;
            self.scheduler.sleep(delay).await;
        }
    }

    /// One send followed by confirmation. Returns the signature the ledger
    /// acknowledged, if any, alongside the attempt's result.
    async fn attempt(&self, tx: &SignedTransaction) -> (Option<Signature>, Result<Signature, SubmitError>) {
        let signature = match self.submitter.send(tx).await {
            Ok(signature) => signature,
            Err(e) => return (None, Err(SubmitError::Send(e))),
        };
        match self.submitter.confirm(&signature).await {
            Ok(()) => (Some(signature), Ok(signature)),
            Err(e) => (Some(signature), Err(SubmitError::Confirm(e))),
        }
    }
}
