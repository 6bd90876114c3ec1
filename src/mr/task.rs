//! Task status table and the scheduling state machine.
//!
//! Each task moves `Idle -> InProgress -> Done`, or back from `InProgress` to
//! `Idle` when its lease times out. `Done` is terminal. The job phase is never
//! stored; it is recomputed from the table on every decision.

use super::{TaskId, TaskKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Idle,
    /// `generation` identifies the assignment that put the task here.
    InProgress { generation: u64 },
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Map,
    Reduce,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assignment {
    Map { file: String, index: usize, n_reduce: usize },
    Reduce { index: usize, n_map: usize },
    Retry,
    AllDone,
}

/// Handed out together with every Map/Reduce assignment. Expiring a lease only
/// rolls the task back if no later assignment superseded it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lease {
    pub task: TaskId,
    pub generation: u64,
}

#[derive(Debug)]
pub struct TaskTable {
    files: Vec<String>,
    n_reduce: usize,
    map: Vec<TaskStatus>,
    reduce: Vec<TaskStatus>,
    generation: u64,
}

impl TaskTable {
    pub fn new(files: Vec<String>, n_reduce: usize) -> Self {
        let n_map = files.len();
        TaskTable {
            files,
            n_reduce,
            map: vec![TaskStatus::Idle; n_map],
            reduce: vec![TaskStatus::Idle; n_reduce],
            generation: 0,
        }
    }

    pub fn n_map(&self) -> usize {
        self.map.len()
    }

    pub fn n_reduce(&self) -> usize {
        self.n_reduce
    }

    pub fn status(&self, task: TaskId) -> Option<TaskStatus> {
        self.slots(task.kind).get(task.index).copied()
    }

    pub fn phase(&self) -> Phase {
        if !all_done(&self.map) {
            Phase::Map
        } else if !all_done(&self.reduce) {
            Phase::Reduce
        } else {
            Phase::Done
        }
    }

    pub fn is_complete(&self) -> bool {
        self.phase() == Phase::Done
    }

    /// Picks the lowest Idle index of the current phase and marks it in
    /// progress. A lease is returned only for real assignments.
    pub fn assign(&mut self) -> (Assignment, Option<Lease>) {
        let kind = match self.phase() {
            Phase::Map => TaskKind::Map,
            Phase::Reduce => TaskKind::Reduce,
            Phase::Done => return (Assignment::AllDone, None),
        };

        let Some(index) = self.slots(kind).iter().position(|s| *s == TaskStatus::Idle) else {
            return (Assignment::Retry, None);
        };

        self.generation += 1;
        let generation = self.generation;
        self.slots_mut(kind)[index] = TaskStatus::InProgress { generation };

        let assignment = match kind {
            TaskKind::Map => Assignment::Map {
                file: self.files[index].clone(),
                index,
                n_reduce: self.n_reduce,
            },
            TaskKind::Reduce => Assignment::Reduce { index, n_map: self.n_map() },
        };
        let lease = Lease { task: TaskId::new(kind, index), generation };
        (assignment, Some(lease))
    }

    /// Marks a task done, whatever its current state. Returns the previous
    /// status, or `None` if the index is outside the table.
    pub fn complete(&mut self, task: TaskId) -> Option<TaskStatus> {
        let slot = self.slots_mut(task.kind).get_mut(task.index)?;
        let prev = *slot;
        *slot = TaskStatus::Done;
        Some(prev)
    }

    /// Rolls the leased task back to Idle if it is still in progress under
    /// the same generation. Returns whether a rollback happened.
    pub fn expire(&mut self, lease: Lease) -> bool {
        let Some(slot) = self.slots_mut(lease.task.kind).get_mut(lease.task.index) else {
            return false;
        };
        match *slot {
            TaskStatus::InProgress { generation } if generation == lease.generation => {
                *slot = TaskStatus::Idle;
                true
            }
            _ => false,
        }
    }

    fn slots(&self, kind: TaskKind) -> &[TaskStatus] {
        match kind {
            TaskKind::Map => &self.map,
            TaskKind::Reduce => &self.reduce,
        }
    }

    fn slots_mut(&mut self, kind: TaskKind) -> &mut [TaskStatus] {
        match kind {
            TaskKind::Map => &mut self.map,
            TaskKind::Reduce => &mut self.reduce,
        }
    }
}

fn all_done(slots: &[TaskStatus]) -> bool {
    slots.iter().all(|s| *s == TaskStatus::Done)
}
