use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    time::Duration,
};

use futures::future::join_all;
use tempfile::TempDir;
use tokio::time;

use crate::{
    mr::{
        TaskId, TaskKind,
        config::{CoordinatorConfig, WorkerConfig},
        coordinator::Coordinator,
        partition, rpc,
        task::Assignment,
        worker::Worker,
    },
    mrapps::get_app,
    mrrt::sequential,
};

const TEXTS: &[&str] = &[
    "It was the best of times, it was the worst of times.",
    "the age of wisdom; the age of foolishness! It was.",
    "Times change and we change with them.",
];

struct Job {
    dir: TempDir,
    inputs: Vec<String>,
}

impl Job {
    fn new(n_inputs: usize) -> Job {
        let dir = tempfile::tempdir().unwrap();
        let inputs = TEXTS[..n_inputs]
            .iter()
            .enumerate()
            .map(|(i, text)| {
                let path = dir.path().join(format!("pg-{}.txt", i));
                std::fs::write(&path, text).unwrap();
                path.to_str().unwrap().to_string()
            })
            .collect();
        Job { dir, inputs }
    }

    fn socket(&self) -> PathBuf {
        self.dir.path().join("mr.sock")
    }

    fn coordinator(&self, n_reduce: usize, task_timeout: Duration) -> Coordinator {
        let config = CoordinatorConfig {
            socket: self.socket(),
            task_timeout,
            poll_interval: Duration::from_millis(20),
            shutdown_grace: Duration::from_millis(300),
        };
        Coordinator::new(self.inputs.clone(), n_reduce, config).unwrap()
    }

    fn worker(&self, app: &str) -> Worker {
        let config = WorkerConfig {
            socket: self.socket(),
            work_dir: self.dir.path().to_path_buf(),
            retry_interval: Duration::from_millis(10),
        };
        Worker::new(get_app(app).unwrap(), config)
    }

    /// Lines of every reduce output, sorted.
    fn output_lines(&self, n_reduce: usize) -> Vec<String> {
        let mut lines = vec![];
        for r in 0..n_reduce {
            let out = std::fs::read_to_string(self.dir.path().join(partition::output_name(r))).unwrap();
            lines.extend(out.lines().map(str::to_string));
        }
        lines.sort();
        lines
    }

    async fn sequential_lines(&self, app: &str) -> Vec<String> {
        let out_dir = self.dir.path().join("seq");
        std::fs::create_dir(&out_dir).unwrap();
        let app = get_app(app).unwrap();
        let path = sequential::run(app.as_ref(), &self.inputs, &out_dir).await.unwrap();
        let mut lines: Vec<String> = std::fs::read_to_string(path).unwrap().lines().map(str::to_string).collect();
        lines.sort();
        lines
    }
}

async fn wait_for_socket(sock: &Path) {
    for _ in 0..200 {
        if sock.exists() {
            return;
        }
        time::sleep(Duration::from_millis(10)).await;
    }
    panic!("coordinator never bound {}", sock.display());
}

fn start(coordinator: &Coordinator) -> tokio::task::JoinHandle<Result<(), anyhow::Error>> {
    let c = coordinator.clone();
    tokio::spawn(async move { c.run().await })
}

#[tokio::test]
async fn test_wc() {
    let job = Job::new(2);
    let coordinator = job.coordinator(2, Duration::from_secs(10));
    let server = start(&coordinator);
    wait_for_socket(&job.socket()).await;

    let results = join_all((0..3).map(|_| job.worker("wc").run())).await;
    for res in results {
        res.unwrap();
    }
    assert!(coordinator.is_job_complete().await);
    time::timeout(Duration::from_secs(5), server).await.unwrap().unwrap().unwrap();

    let lines = job.output_lines(2);
    assert_eq!(lines, job.sequential_lines("wc").await);

    let counts: BTreeMap<&str, &str> = lines.iter().filter_map(|l| l.split_once(' ')).collect();
    assert_eq!(counts["the"], "4");
    assert_eq!(counts["was"], "3");
    assert_eq!(counts["It"], "2");
    assert_eq!(counts.len(), lines.len(), "a word appears in more than one line");
}

#[tokio::test]
async fn test_indexer() {
    let job = Job::new(3);
    let coordinator = job.coordinator(3, Duration::from_secs(10));
    let server = start(&coordinator);
    wait_for_socket(&job.socket()).await;

    let results = join_all((0..2).map(|_| job.worker("indexer").run())).await;
    for res in results {
        res.unwrap();
    }
    time::timeout(Duration::from_secs(5), server).await.unwrap().unwrap().unwrap();

    assert_eq!(job.output_lines(3), job.sequential_lines("indexer").await);
}

#[tokio::test]
async fn test_crash_recovery() {
    let job = Job::new(2);
    let coordinator = job.coordinator(2, Duration::from_millis(300));
    let server = start(&coordinator);
    wait_for_socket(&job.socket()).await;

    // a worker that takes map#0 and dies without reporting
    {
        let mut crashed = rpc::connect(&job.socket()).await.unwrap();
        let reply = crashed.request_task(()).await.unwrap().into_inner();
        let assignment = Assignment::try_from(reply).unwrap();
        assert!(matches!(assignment, Assignment::Map { index: 0, .. }));
    }

    job.worker("wc").run().await.unwrap();
    assert_eq!(
        coordinator.status(TaskId::new(TaskKind::Map, 0)).await,
        Some(crate::mr::task::TaskStatus::Done)
    );
    time::timeout(Duration::from_secs(5), server).await.unwrap().unwrap().unwrap();

    assert_eq!(job.output_lines(2), job.sequential_lines("wc").await);
}

#[tokio::test]
async fn test_rpc_rejects_unknown_task() {
    let job = Job::new(1);
    let coordinator = job.coordinator(1, Duration::from_secs(10));
    let (_stop, stopped) = tokio::sync::oneshot::channel::<()>();
    let c = coordinator.clone();
    let server = tokio::spawn(async move { c.serve(async move { stopped.await.unwrap_or(()) }).await });
    wait_for_socket(&job.socket()).await;

    let mut client = rpc::connect(&job.socket()).await.unwrap();
    let status = client
        .report_done(rpc::proto::ReportDoneRequest::from(TaskId::new(TaskKind::Map, 9)))
        .await
        .unwrap_err();
    assert_eq!(status.code(), tonic::Code::InvalidArgument);

    let status = client
        .report_done(rpc::proto::ReportDoneRequest { phase: 5, index: 0 })
        .await
        .unwrap_err();
    assert_eq!(status.code(), tonic::Code::InvalidArgument);

    let complete = client.is_job_complete(()).await.unwrap().into_inner().complete;
    assert!(!complete);
    server.abort();
}
