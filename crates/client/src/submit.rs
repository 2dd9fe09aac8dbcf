//! Pending/success/error tracking for network submissions.
//!
//! One [`SubmitTracker`] guards one entry. While a submission is pending a
//! second one is refused; the first is never cancelled.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ledgerdesk_shared::AppError;
use thiserror::Error;

/// State of the most recent submission.
#[derive(Debug, Clone, Default)]
pub enum SubmitState {
    /// Nothing submitted yet.
    #[default]
    Idle,
    /// A request is in flight.
    Pending,
    /// The last request succeeded.
    Succeeded,
    /// The last request failed.
    Failed(AppError),
}

impl SubmitState {
    /// True while a request is in flight.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// The error of a failed submission.
    #[must_use]
    pub fn error(&self) -> Option<&AppError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Submission refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitError {
    /// Another submission for this entry is still in flight.
    #[error("A submission is already in progress")]
    AlreadyPending,
}

impl From<SubmitError> for AppError {
    fn from(err: SubmitError) -> Self {
        Self::Conflict(err.to_string())
    }
}

/// Shared submission state; clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct SubmitTracker {
    state: Arc<Mutex<SubmitState>>,
}

impl SubmitTracker {
    /// A tracker in the `Idle` state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> SubmitState {
        self.lock().clone()
    }

    /// Marks a submission as started.
    ///
    /// The returned guard must be completed with the outcome; dropping it
    /// unfinished returns the tracker to `Idle`.
    ///
    /// # Errors
    ///
    /// `AlreadyPending` while another submission is in flight.
    pub fn begin(&self) -> Result<SubmitGuard, SubmitError> {
        let mut state = self.lock();
        if state.is_pending() {
            return Err(SubmitError::AlreadyPending);
        }
        *state = SubmitState::Pending;
        Ok(SubmitGuard {
            tracker: self.clone(),
            finished: false,
        })
    }

    fn lock(&self) -> MutexGuard<'_, SubmitState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// An in-flight submission.
#[derive(Debug)]
pub struct SubmitGuard {
    tracker: SubmitTracker,
    finished: bool,
}

impl SubmitGuard {
    /// Records the outcome of the submission.
    pub fn finish<T>(mut self, result: &Result<T, AppError>) {
        let next = match result {
            Ok(_) => SubmitState::Succeeded,
            Err(err) => SubmitState::Failed(err.clone()),
        };
        *self.tracker.lock() = next;
        self.finished = true;
    }
}

impl Drop for SubmitGuard {
    fn drop(&mut self) {
        if !self.finished {
            *self.tracker.lock() = SubmitState::Idle;
        }
    }
}
