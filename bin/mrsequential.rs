use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(name = "mrsequential")]
struct Args {
    app: String,
    input_files: Vec<String>,
    /// Directory receiving mr-out-0.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let app = mrlab::mrapps::get_app(&args.app)?;
    let out = mrlab::mrrt::sequential::run(app.as_ref(), &args.input_files, &args.out_dir).await?;
    log::info!("wrote {}", out.display());
    Ok(())
}
