//! Task data structure and timing helpers.
//!
//! A task is a titled unit of work with a start time, a due time, and an
//! optional completion time. All timestamps are epoch milliseconds; a present
//! `completion_time` marks the task as done.

use serde::{Deserialize, Serialize};

/// A single tracked task.
///
/// No ordering is enforced between `start_time`, `due_time`, and
/// `completion_time`: a task may be completed before its nominal start or
/// after its due time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub title: String,
    pub start_time: i64,
    pub due_time: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_time: Option<i64>,
}

impl Task {
    pub fn is_completed(&self) -> bool {
        self.completion_time.is_some()
    }

    /// Milliseconds spent on this task: completion minus start for finished
    /// tasks, otherwise `now` minus start.
    pub fn elapsed_ms(&self, now: i64) -> i64 {
        self.completion_time.unwrap_or(now) - self.start_time
    }

    /// Completion duration for finished tasks, used by the leaderboard.
    pub fn completion_duration_ms(&self) -> Option<i64> {
        self.completion_time.map(|done| done - self.start_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(start: i64, done: Option<i64>) -> Task {
        Task {
            id: 1,
            title: "t".to_string(),
            start_time: start,
            due_time: start + 1000,
            completion_time: done,
        }
    }

    #[test]
    fn elapsed_uses_completion_when_done() {
        let t = task(1000, Some(4000));
        assert_eq!(t.elapsed_ms(9999), 3000);
        assert_eq!(t.completion_duration_ms(), Some(3000));
    }

    #[test]
    fn elapsed_tracks_now_while_running() {
        let t = task(1000, None);
        assert_eq!(t.elapsed_ms(2500), 1500);
        assert_eq!(t.completion_duration_ms(), None);
        assert!(!t.is_completed());
    }
}
