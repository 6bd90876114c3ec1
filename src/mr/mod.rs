use std::{fmt, pin::Pin};

use serde::{Deserialize, Serialize};

pub mod config;
pub mod coordinator;
pub mod partition;
pub mod rpc;
pub mod store;
pub mod task;
pub mod worker;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        KeyValue { key: key.into(), value: value.into() }
    }
}

/// The two kinds of task a job is split into. Reduce work only starts once
/// every Map task is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskKind {
    Map,
    Reduce,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::Map => f.write_str("map"),
            TaskKind::Reduce => f.write_str("reduce"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId {
    pub kind: TaskKind,
    pub index: usize,
}

impl TaskId {
    pub fn new(kind: TaskKind, index: usize) -> Self {
        TaskId { kind, index }
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.kind, self.index)
    }
}

pub type BoxFuture<T> = Pin<Box<dyn Future<Output = Result<T, anyhow::Error>> + 'static>>;

/// User supplied transformation functions.
///
/// `map` receives the split name and its whole contents; `reduce` receives one
/// key together with every value emitted for it across all splits.
pub trait MRApp {
    fn map(&self, key: String, value: String) -> BoxFuture<Vec<KeyValue>>;
    fn reduce(&self, key: String, values: Vec<String>) -> BoxFuture<String>;
}
