use std::{path::PathBuf, time::Duration};

use super::rpc::coordinator_sock;

#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    pub socket: PathBuf,
    /// How long an assigned task may stay unreported before it is handed out again.
    pub task_timeout: Duration,
    /// How often `Coordinator::run` checks for job completion.
    pub poll_interval: Duration,
    /// Time left for polling workers to observe AllDone before the server stops.
    pub shutdown_grace: Duration,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        CoordinatorConfig {
            socket: coordinator_sock(),
            task_timeout: Duration::from_secs(10),
            poll_interval: Duration::from_secs(1),
            shutdown_grace: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub socket: PathBuf,
    /// Directory holding intermediate and output files.
    pub work_dir: PathBuf,
    pub retry_interval: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        WorkerConfig {
            socket: coordinator_sock(),
            work_dir: PathBuf::from("."),
            retry_interval: Duration::from_millis(100),
        }
    }
}
