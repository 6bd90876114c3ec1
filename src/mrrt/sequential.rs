use std::path::{Path, PathBuf};

use crate::mr::{MRApp, partition, store, worker::reduce_sorted};

/// Runs a whole job in-process: maps every input, then reduces everything into
/// a single `mr-out-0` under `out_dir`. Distributed output, once concatenated
/// and sorted, must match this file.
pub async fn run(app: &dyn MRApp, input_files: &[String], out_dir: &Path) -> Result<PathBuf, anyhow::Error> {
    let mut intermediate = vec![];
    for file in input_files {
        let contents = store::read_text(Path::new(file)).await?;
        intermediate.extend(app.map(file.clone(), contents).await?);
    }
    log::info!("mapped {} records from {} files", intermediate.len(), input_files.len());

    let output = reduce_sorted(app, intermediate).await?;
    store::publish(out_dir, &partition::output_name(0), output).await
}
