use std::collections::BTreeSet;

use crate::mr::{BoxFuture, KeyValue, MRApp};

/// Inverted index: for every word, how many documents contain it and which.
pub struct Indexer;

impl MRApp for Indexer {
    fn map(&self, key: String, value: String) -> BoxFuture<Vec<KeyValue>> {
        Box::pin(async move {
            let distinct: BTreeSet<&str> = super::words(&value).collect();
            Ok(distinct.into_iter().map(|w| KeyValue::new(w, key.clone())).collect())
        })
    }

    fn reduce(&self, _key: String, values: Vec<String>) -> BoxFuture<String> {
        Box::pin(async move {
            let docs: BTreeSet<String> = values.into_iter().collect();
            let docs: Vec<String> = docs.into_iter().collect();
            Ok(format!("{} {}", docs.len(), docs.join(",")))
        })
    }
}
