//! Tick scheduler identifiers and reports

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::impl_domain_enum_conversions;

/// Opaque identifier returned by the scheduling calls.
///
/// Ids are allocated from a per-scheduler counter, so two pending tasks can
/// never share one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(u64);

impl TaskId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task-{}", self.0)
    }
}

/// Whether a task fires once or keeps rescheduling itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    OneShot,
    Repeating,
}

impl_domain_enum_conversions!(TaskKind {
    OneShot => "one_shot",
    Repeating => "repeating",
});

/// A callback that returned an error or panicked during a tick pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFailure {
    pub task_id: TaskId,
    pub kind: TaskKind,
    /// Tick being processed when the callback failed.
    pub tick: u64,
    pub message: String,
}

/// Summary of one tick-processing pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickReport {
    /// Tick that was processed.
    pub tick: u64,
    /// Callbacks invoked, failed ones included.
    pub fired: usize,
    pub failed: usize,
    /// Published counter value after the pass.
    pub next_tick: u64,
}
