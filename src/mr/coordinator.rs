use std::{collections::HashMap, sync::Arc};

use tokio::{net::UnixListener, sync::{Mutex, oneshot}, task::AbortHandle, time};
use tokio_stream::wrappers::UnixListenerStream;
use tonic::{Request, Response, Status, async_trait, transport::Server};

use super::{
    TaskId,
    config::CoordinatorConfig,
    rpc::proto,
    task::{Assignment, Lease, TaskStatus, TaskTable},
};

struct CoordinatorInner {
    table: TaskTable,
    // pending timeout per in-progress task
    timers: HashMap<TaskId, AbortHandle>,
}

/// Owns the task table and serves it over RPC. Every handler and every
/// timeout runs its whole read-decide-write sequence under one lock.
#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<Mutex<CoordinatorInner>>,
    config: CoordinatorConfig,
}

#[async_trait]
impl proto::coordinator_server::Coordinator for Coordinator {
    async fn request_task(&self, _request: Request<()>) -> Result<Response<proto::TaskReply>, Status> {
        let assignment = self.request_task().await;
        Ok(Response::new(assignment.into()))
    }

    async fn report_done(&self, request: Request<proto::ReportDoneRequest>) -> Result<Response<()>, Status> {
        let task = TaskId::try_from(request.into_inner())
            .map_err(|e| Status::invalid_argument(e.to_string()))?;
        if !self.report_done(task).await {
            return Err(Status::invalid_argument(format!("no such task {}", task)));
        }
        Ok(Response::new(()))
    }

    async fn is_job_complete(&self, _request: Request<()>) -> Result<Response<proto::JobStatus>, Status> {
        let complete = self.is_job_complete().await;
        Ok(Response::new(proto::JobStatus { complete }))
    }
}

impl Coordinator {
    pub fn new(files: Vec<String>, n_reduce: usize, config: CoordinatorConfig) -> Result<Self, anyhow::Error> {
        if n_reduce == 0 {
            anyhow::bail!("reduce count must be positive");
        }
        let inner = CoordinatorInner {
            table: TaskTable::new(files, n_reduce),
            timers: HashMap::new(),
        };
        Ok(Coordinator { inner: Arc::new(Mutex::new(inner)), config })
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Hands out the next Idle task of the current phase and arms its timeout.
    pub async fn request_task(&self) -> Assignment {
        let mut inner = self.inner.lock().await;
        let (assignment, lease) = inner.table.assign();
        if let Some(lease) = lease {
            log::debug!("Assigned task {} (generation {})", lease.task, lease.generation);
            let timer = tokio::spawn(self.clone().expire_after_timeout(lease));
            inner.timers.insert(lease.task, timer.abort_handle());
        }
        assignment
    }

    /// Marks a task done regardless of its current state. Returns false only if
    /// the task does not exist.
    pub async fn report_done(&self, task: TaskId) -> bool {
        let mut inner = self.inner.lock().await;
        let Some(prev) = inner.table.complete(task) else {
            log::warn!("Report for unknown task {}", task);
            return false;
        };
        match prev {
            TaskStatus::InProgress { .. } => log::info!("Task {} done", task),
            TaskStatus::Idle => log::warn!("Late report for task {} after timeout, accepting", task),
            TaskStatus::Done => log::debug!("Duplicate report for task {}", task),
        }
        if let Some(timer) = inner.timers.remove(&task) {
            timer.abort();
        }
        if inner.table.is_complete() {
            log::info!("All tasks completed");
        }
        true
    }

    pub async fn is_job_complete(&self) -> bool {
        self.inner.lock().await.table.is_complete()
    }

    pub async fn status(&self, task: TaskId) -> Option<TaskStatus> {
        self.inner.lock().await.table.status(task)
    }

    async fn expire_after_timeout(self, lease: Lease) {
        time::sleep(self.config.task_timeout).await;
        let mut inner = self.inner.lock().await;
        if inner.table.expire(lease) {
            log::warn!("Task {} timed out, making it available again", lease.task);
            inner.timers.remove(&lease.task);
        }
    }

    /// Serves RPCs on the configured unix socket until `shutdown` resolves.
    pub async fn serve<F>(&self, shutdown: F) -> Result<(), anyhow::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let sock = &self.config.socket;
        let _ = std::fs::remove_file(sock);
        let listener = UnixListener::bind(sock)?;
        log::info!("Coordinator listening on {}", sock.display());

        Server::builder()
            .add_service(proto::coordinator_server::CoordinatorServer::new(self.clone()))
            .serve_with_incoming_shutdown(UnixListenerStream::new(listener), shutdown)
            .await?;

        let _ = std::fs::remove_file(sock);
        log::info!("Coordinator exiting");
        Ok(())
    }

    /// Serves until the job is complete, then lingers for the grace period so
    /// polling workers get AllDone, and stops.
    pub async fn run(&self) -> Result<(), anyhow::Error> {
        let (shutdown_sender, shutdown_receiver) = oneshot::channel::<()>();
        let shutdown = async move { shutdown_receiver.await.unwrap_or(()) };

        let watcher = async {
            while !self.is_job_complete().await {
                time::sleep(self.config.poll_interval).await;
            }
            time::sleep(self.config.shutdown_grace).await;
            log::info!("Job complete, shutting down");
            let _ = shutdown_sender.send(());
            Ok::<_, anyhow::Error>(())
        };

        tokio::try_join!(self.serve(shutdown), watcher)?;
        Ok(())
    }
}
