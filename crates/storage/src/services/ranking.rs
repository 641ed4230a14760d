//! Per-task speed ranking.
//!
//! Order: elapsed time ascending, then earlier `finish_at`, then `user_id`.
//! The key is total over distinct solvers, so the output never depends on the
//! order solves were read in. Runners stay in the order; `is_runner` is
//! carried along for display and never used as a key.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::Duration;

use crate::models::Solve;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedSolve {
    /// 1-based position.
    pub rank: usize,
    pub elapsed: Duration,
    pub solve: Solve,
}

fn ranking_order(a: &Solve, b: &Solve) -> Ordering {
    a.elapsed()
        .cmp(&b.elapsed())
        .then_with(|| a.finish_at.cmp(&b.finish_at))
        .then_with(|| a.user_id.cmp(&b.user_id))
}

pub fn rank<I>(solves: I) -> Vec<RankedSolve>
where
    I: IntoIterator<Item = Solve>,
{
    let mut solves: Vec<Solve> = solves.into_iter().collect();
    solves.sort_by(ranking_order);

    solves
        .into_iter()
        .enumerate()
        .map(|(idx, solve)| RankedSolve {
            rank: idx + 1,
            elapsed: solve.elapsed(),
            solve,
        })
        .collect()
}

/// Splits a multi-task snapshot by task and ranks each group.
pub fn rank_by_task<I>(solves: I) -> BTreeMap<String, Vec<RankedSolve>>
where
    I: IntoIterator<Item = Solve>,
{
    let mut grouped: BTreeMap<String, Vec<Solve>> = BTreeMap::new();
    for solve in solves {
        grouped.entry(solve.task_id.clone()).or_default().push(solve);
    }

    grouped
        .into_iter()
        .map(|(task_id, group)| (task_id, rank(group)))
        .collect()
}
