// src/scoring/leaderboard.rs

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use crate::models::{
    attempt::{AttemptSummary, LeaderboardEntry},
    user::PublicUser,
};

/// A user's standing within one category before the profile join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Standing {
    pub user_id: i64,
    pub best_score: i32,
    pub latest_attempt: AttemptSummary,
}

fn is_newer(candidate: &AttemptSummary, current: &AttemptSummary) -> bool {
    (candidate.created_at, candidate.id) > (current.created_at, current.id)
}

fn rank_order(a: &Standing, b: &Standing) -> Ordering {
    b.best_score
        .cmp(&a.best_score)
        .then_with(|| b.latest_attempt.created_at.cmp(&a.latest_attempt.created_at))
        .then_with(|| a.user_id.cmp(&b.user_id))
}

/// Groups attempts by user, keeps each user's best percentage and latest
/// attempt, and returns the top `limit` standings.
///
/// Ordering: best score descending, then latest attempt descending, then
/// user id ascending. The input order never affects the result.
pub fn rank(attempts: Vec<AttemptSummary>, limit: usize) -> Vec<Standing> {
    let mut groups: BTreeMap<i64, Standing> = BTreeMap::new();

    for attempt in attempts {
        match groups.get_mut(&attempt.user_id) {
            Some(standing) => {
                standing.best_score = standing.best_score.max(attempt.percentage);
                if is_newer(&attempt, &standing.latest_attempt) {
                    standing.latest_attempt = attempt;
                }
            }
            None => {
                groups.insert(
                    attempt.user_id,
                    Standing {
                        user_id: attempt.user_id,
                        best_score: attempt.percentage,
                        latest_attempt: attempt,
                    },
                );
            }
        }
    }

    let mut standings: Vec<Standing> = groups.into_values().collect();
    standings.sort_by(rank_order);
    standings.truncate(limit);
    standings
}

/// Attaches public profiles to ranked standings.
/// Standings whose user no longer exists are dropped.
pub fn join_users(
    standings: Vec<Standing>,
    users: &HashMap<i64, PublicUser>,
) -> Vec<LeaderboardEntry> {
    standings
        .into_iter()
        .filter_map(|s| {
            let user = users.get(&s.user_id)?.clone();
            Some(LeaderboardEntry {
                user_id: s.user_id,
                best_score: s.best_score,
                latest_attempt: s.latest_attempt,
                user,
            })
        })
        .collect()
}
