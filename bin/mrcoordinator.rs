use std::{path::PathBuf, time::Duration};

use clap::Parser;
use mrlab::mr::{self, config::CoordinatorConfig};

#[derive(Parser)]
#[command(name = "mrcoordinator")]
struct Args {
    #[arg(required = true)]
    input_files: Vec<String>,
    /// Number of reduce partitions.
    #[arg(short = 'r', long, default_value_t = 10)]
    n_reduce: usize,
    #[arg(long, default_value_os_t = mr::rpc::coordinator_sock())]
    socket: PathBuf,
    /// Seconds before an unreported task is handed out again.
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let config = CoordinatorConfig {
        socket: args.socket,
        task_timeout: Duration::from_secs(args.timeout_secs),
        ..CoordinatorConfig::default()
    };
    let coordinator = mr::coordinator::Coordinator::new(args.input_files, args.n_reduce, config)?;
    coordinator.run().await?;

    Ok(())
}
