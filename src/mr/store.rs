//! File access for task inputs and outputs.
//!
//! Outputs are published atomically: the bytes go to a fresh temp file in the
//! destination directory which is then renamed over the final name. A
//! straggler and its replacement may both publish; the reader sees one whole
//! file either way.

use std::{
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::Context;

pub async fn publish(dir: &Path, name: &str, contents: Vec<u8>) -> Result<PathBuf, anyhow::Error> {
    let dir = dir.to_path_buf();
    let target = dir.join(name);
    let prefix = format!(".{}.", name);
    let path = target.clone();
    tokio::task::spawn_blocking(move || -> Result<(), anyhow::Error> {
        let mut tmp = tempfile::Builder::new()
            .prefix(&prefix)
            .tempfile_in(&dir)
            .with_context(|| format!("cannot create temp file in {}", dir.display()))?;
        tmp.write_all(&contents)
            .with_context(|| format!("cannot write {}", tmp.path().display()))?;
        tmp.persist(&path)
            .map_err(|e| e.error)
            .with_context(|| format!("cannot publish {}", path.display()))?;
        Ok(())
    })
    .await??;
    Ok(target)
}

pub async fn read(path: &Path) -> Result<Vec<u8>, anyhow::Error> {
    tokio::fs::read(path)
        .await
        .with_context(|| format!("cannot read {}", path.display()))
}

/// Reads a whole file as text. Invalid UTF-8 is replaced rather than failing
/// the task.
pub async fn read_text(path: &Path) -> Result<String, anyhow::Error> {
    let bytes = read(path).await?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
