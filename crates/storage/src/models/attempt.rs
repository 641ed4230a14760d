use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One user's effort on one task.
///
/// `start_at` is absent only for an untimed solve: a correct submission on a
/// freezed task that was never started. Such an attempt is finished but has
/// no authoritative elapsed time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Attempt {
    pub user_id: Uuid,
    pub task_id: String,
    pub start_at: Option<DateTime<Utc>>,
    pub finish_at: Option<DateTime<Utc>>,
}

impl Attempt {
    pub fn started(user_id: Uuid, task_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            task_id: task_id.into(),
            start_at: Some(now),
            finish_at: None,
        }
    }

    pub fn untimed_solve(user_id: Uuid, task_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            task_id: task_id.into(),
            start_at: None,
            finish_at: Some(now),
        }
    }

    pub fn is_running(&self) -> bool {
        self.finish_at.is_none()
    }

    pub fn is_finished(&self) -> bool {
        self.finish_at.is_some()
    }

    pub fn is_timed(&self) -> bool {
        self.start_at.is_some()
    }

    /// Authoritative elapsed time, only once the attempt is finished and timed.
    pub fn elapsed(&self) -> Option<Duration> {
        match (self.start_at, self.finish_at) {
            (Some(start), Some(finish)) => Some(finish - start),
            _ => None,
        }
    }

    /// Advisory elapsed time for display. Finished attempts report their
    /// authoritative time; running ones report `now - start_at`, never negative.
    pub fn elapsed_at(&self, now: DateTime<Utc>) -> Option<Duration> {
        if self.is_finished() {
            return self.elapsed();
        }
        self.start_at
            .map(|start| (now - start).max(Duration::zero()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(millis: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(millis).unwrap()
    }

    #[test]
    fn test_running_attempt_has_no_authoritative_elapsed() {
        let attempt = Attempt::started(Uuid::new_v4(), "t", at(1_000_000));
        assert!(attempt.is_running());
        assert_eq!(attempt.elapsed(), None);
        assert_eq!(
            attempt.elapsed_at(at(1_005_500)),
            Some(Duration::milliseconds(5_500))
        );
    }

    #[test]
    fn test_advisory_elapsed_clamps_clock_skew() {
        let attempt = Attempt::started(Uuid::new_v4(), "t", at(1_000_000));
        assert_eq!(attempt.elapsed_at(at(999_000)), Some(Duration::zero()));
    }

    #[test]
    fn test_finished_attempt_reports_fixed_elapsed() {
        let mut attempt = Attempt::started(Uuid::new_v4(), "t", at(1_000_000));
        attempt.finish_at = Some(at(1_042_370));
        assert_eq!(attempt.elapsed(), Some(Duration::milliseconds(42_370)));
        assert_eq!(
            attempt.elapsed_at(at(9_999_999)),
            Some(Duration::milliseconds(42_370))
        );
    }

    #[test]
    fn test_untimed_solve_is_finished_without_elapsed() {
        let attempt = Attempt::untimed_solve(Uuid::new_v4(), "t", at(1_000_000));
        assert!(attempt.is_finished());
        assert!(!attempt.is_timed());
        assert_eq!(attempt.elapsed(), None);
        assert_eq!(attempt.elapsed_at(at(2_000_000)), None);
    }
}
