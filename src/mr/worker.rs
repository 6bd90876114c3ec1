use std::{fmt::Write as _, path::Path};

use anyhow::Context;
use tokio::time;

use super::{
    KeyValue, MRApp, TaskId, TaskKind,
    config::WorkerConfig,
    partition, rpc,
    rpc::CoordinatorClient,
    store,
    task::Assignment,
};

/// Polls the coordinator for work until the job is done. Any I/O error ends
/// the worker; the coordinator hands the task to someone else after timeout.
pub struct Worker {
    app: Box<dyn MRApp>,
    config: WorkerConfig,
}

impl Worker {
    pub fn new(app: Box<dyn MRApp>, config: WorkerConfig) -> Self {
        Worker { app, config }
    }

    pub async fn run(self) -> Result<(), anyhow::Error> {
        let mut client = rpc::connect(&self.config.socket)
            .await
            .with_context(|| format!("cannot reach coordinator at {}", self.config.socket.display()))?;

        loop {
            let reply = client.request_task(()).await?.into_inner();
            match Assignment::try_from(reply)? {
                Assignment::Map { file, index, n_reduce } => {
                    self.run_map(&file, index, n_reduce).await?;
                    report(&mut client, TaskId::new(TaskKind::Map, index)).await?;
                }
                Assignment::Reduce { index, n_map } => {
                    self.run_reduce(index, n_map).await?;
                    report(&mut client, TaskId::new(TaskKind::Reduce, index)).await?;
                }
                Assignment::Retry => {
                    log::trace!("No task available, retrying");
                    time::sleep(self.config.retry_interval).await;
                }
                Assignment::AllDone => {
                    log::info!("Job done, worker exiting");
                    return Ok(());
                }
            }
        }
    }

    /// Maps one input split and publishes all `n_reduce` intermediate files,
    /// empty buckets included.
    pub async fn run_map(&self, file: &str, index: usize, n_reduce: usize) -> Result<(), anyhow::Error> {
        let contents = store::read_text(Path::new(file)).await?;
        let kvs = self.app.map(file.to_string(), contents).await?;
        log::debug!("map#{}: {} records from {}", index, kvs.len(), file);

        let buckets = partition::partition(kvs, n_reduce).with_context(|| format!("map task#{}", index))?;
        for (r, bucket) in buckets.iter().enumerate() {
            let bytes = partition::encode(bucket)?;
            store::publish(&self.config.work_dir, &partition::intermediate_name(index, r), bytes).await?;
        }
        log::info!("map task#{} finished", index);
        Ok(())
    }

    /// Gathers partition `index` from every map task, then reduces it into
    /// `mr-out-<index>`.
    pub async fn run_reduce(&self, index: usize, n_map: usize) -> Result<(), anyhow::Error> {
        let mut kvs = vec![];
        for m in 0..n_map {
            let path = self.config.work_dir.join(partition::intermediate_name(m, index));
            let bytes = store::read(&path).await?;
            let records = partition::decode(&bytes).with_context(|| format!("cannot decode {}", path.display()))?;
            kvs.extend(records);
        }

        let output = reduce_sorted(self.app.as_ref(), kvs).await?;
        store::publish(&self.config.work_dir, &partition::output_name(index), output).await?;
        log::info!("reduce task#{} finished", index);
        Ok(())
    }
}

async fn report(client: &mut CoordinatorClient, task: TaskId) -> Result<(), anyhow::Error> {
    client
        .report_done(rpc::proto::ReportDoneRequest::from(task))
        .await
        .with_context(|| format!("cannot report {} done", task))?;
    Ok(())
}

/// Sorts by key, calls `reduce` once per distinct key with all of its values
/// and renders one `key value` line per key, in key order.
pub(crate) async fn reduce_sorted(app: &dyn MRApp, mut kvs: Vec<KeyValue>) -> Result<Vec<u8>, anyhow::Error> {
    kvs.sort_by(|a, b| a.key.cmp(&b.key));

    let mut out = String::new();
    for group in kvs.chunk_by(|a, b| a.key == b.key) {
        let key = group[0].key.clone();
        let values = group.iter().map(|kv| kv.value.clone()).collect();
        let output = app.reduce(key.clone(), values).await?;
        writeln!(out, "{} {}", key, output)?;
    }
    Ok(out.into_bytes())
}
