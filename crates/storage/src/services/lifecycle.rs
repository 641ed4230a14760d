//! Attempt lifecycle rules.
//!
//! Every function here is pure: the caller loads the current attempt (if any)
//! and reads the clock once, then applies the returned transition atomically.
//! Nothing in this module retries or corrects a caller's mistake.

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::models::{Attempt, Task, User};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Not permitted: {0}")]
    NotPermitted(String),
}

/// Where a (user, task) pair stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptState {
    NoAttempt,
    Running { start_at: DateTime<Utc> },
    Finished,
}

impl AttemptState {
    pub fn of(attempt: Option<&Attempt>) -> Self {
        match attempt {
            None => Self::NoAttempt,
            Some(a) if a.is_finished() => Self::Finished,
            Some(a) => match a.start_at {
                Some(start_at) => Self::Running { start_at },
                // unreachable through the database CHECK; treat as terminal
                None => Self::Finished,
            },
        }
    }
}

/// Result of a flag submission that passed the eligibility check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Wrong flag. Nothing changes.
    Incorrect,
    /// A running attempt was finalized.
    Finished(Attempt),
    /// Correct flag on a freezed task with no prior start.
    UntimedSolve(Attempt),
}

impl SubmitOutcome {
    pub fn solved(&self) -> bool {
        !matches!(self, Self::Incorrect)
    }

    pub fn attempt(&self) -> Option<&Attempt> {
        match self {
            Self::Incorrect => None,
            Self::Finished(attempt) | Self::UntimedSolve(attempt) => Some(attempt),
        }
    }
}

/// Decides whether `actor` may start `task`, returning the attempt to insert.
pub fn start(
    actor: &User,
    task: &Task,
    existing: Option<&Attempt>,
    now: DateTime<Utc>,
) -> Result<Attempt, LifecycleError> {
    if existing.is_some() {
        return Err(LifecycleError::InvalidState(
            "an attempt already exists for this task".to_string(),
        ));
    }

    if !task.is_open && !actor.is_admin {
        return Err(LifecycleError::NotPermitted(
            "task is not open".to_string(),
        ));
    }

    Ok(Attempt::started(actor.user_id, task.task_id.clone(), now))
}

/// Decides the effect of submitting `candidate` for the pair owning `existing`.
///
/// `user_id` identifies the submitter so an untimed solve can be recorded when
/// no attempt exists yet.
pub fn submit(
    user_id: uuid::Uuid,
    task: &Task,
    existing: Option<&Attempt>,
    candidate: &str,
    now: DateTime<Utc>,
) -> Result<SubmitOutcome, LifecycleError> {
    match AttemptState::of(existing) {
        AttemptState::Finished => Err(LifecycleError::NotPermitted(
            "task already solved".to_string(),
        )),
        AttemptState::Running { start_at } => {
            if !task.flag_matches(candidate) {
                return Ok(SubmitOutcome::Incorrect);
            }
            Ok(SubmitOutcome::Finished(Attempt {
                user_id,
                task_id: task.task_id.clone(),
                start_at: Some(start_at),
                finish_at: Some(now.max(start_at)),
            }))
        }
        AttemptState::NoAttempt if task.is_freezed => {
            if !task.flag_matches(candidate) {
                return Ok(SubmitOutcome::Incorrect);
            }
            Ok(SubmitOutcome::UntimedSolve(Attempt::untimed_solve(
                user_id,
                task.task_id.clone(),
                now,
            )))
        }
        AttemptState::NoAttempt => Err(LifecycleError::NotPermitted(
            "nothing to submit to".to_string(),
        )),
    }
}

/// Renders a duration as seconds with two decimals, e.g. `42.37`.
pub fn format_elapsed(elapsed: Duration) -> String {
    format!("{:.2}", duration_seconds(elapsed))
}

pub fn duration_seconds(elapsed: Duration) -> f64 {
    elapsed.num_milliseconds() as f64 / 1000.0
}
