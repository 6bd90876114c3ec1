//! Layout of the data exchanged between Map and Reduce tasks.
//!
//! Map task `m` writes one file per reduce partition `r`, named
//! `mr-<m>-<r>.json`, holding one JSON encoded `KeyValue` per line. Reduce
//! task `r` reads `mr-<m>-<r>.json` for every `m` and writes `mr-out-<r>`.

use std::io::Write;

use anyhow::Context;

use super::KeyValue;
use crate::util::ihash;

pub(crate) fn partition_of(key: &str, n_reduce: usize) -> usize {
    ihash(key) as usize % n_reduce
}

pub fn intermediate_name(map_index: usize, reduce_index: usize) -> String {
    format!("mr-{}-{}.json", map_index, reduce_index)
}

pub fn output_name(reduce_index: usize) -> String {
    format!("mr-out-{}", reduce_index)
}

/// Splits map output into `n_reduce` buckets, keeping emission order inside
/// each bucket.
pub fn partition(kvs: Vec<KeyValue>, n_reduce: usize) -> Result<Vec<Vec<KeyValue>>, anyhow::Error> {
    anyhow::ensure!(n_reduce > 0, "cannot partition into zero buckets");
    let mut buckets = vec![Vec::new(); n_reduce];
    for kv in kvs {
        buckets[partition_of(&kv.key, n_reduce)].push(kv);
    }
    Ok(buckets)
}

pub fn encode(records: &[KeyValue]) -> Result<Vec<u8>, anyhow::Error> {
    let mut buf = Vec::new();
    for kv in records {
        serde_json::to_writer(&mut buf, kv)?;
        buf.write_all(b"\n")?;
    }
    Ok(buf)
}

pub fn decode(bytes: &[u8]) -> Result<Vec<KeyValue>, anyhow::Error> {
    serde_json::Deserializer::from_slice(bytes)
        .into_iter::<KeyValue>()
        .enumerate()
        .map(|(i, kv)| kv.with_context(|| format!("bad intermediate record #{}", i)))
        .collect()
}
