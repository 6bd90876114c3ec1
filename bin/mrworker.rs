use std::{path::PathBuf, time::Duration};

use clap::Parser;
use mrlab::mr::{self, config::WorkerConfig};

#[derive(Parser)]
#[command(name = "mrworker")]
struct Args {
    app: String,
    #[arg(long, default_value_os_t = mr::rpc::coordinator_sock())]
    socket: PathBuf,
    /// Directory for intermediate and output files.
    #[arg(long, default_value = ".")]
    work_dir: PathBuf,
    /// Pause between polls when no task is available, in milliseconds.
    #[arg(long, default_value_t = 100)]
    retry_ms: u64,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let app = mrlab::mrapps::get_app(&args.app)?;
    let config = WorkerConfig {
        socket: args.socket,
        work_dir: args.work_dir,
        retry_interval: Duration::from_millis(args.retry_ms),
    };
    mr::worker::Worker::new(app, config).run().await?;

    Ok(())
}
