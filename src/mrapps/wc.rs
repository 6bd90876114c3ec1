use crate::mr::{BoxFuture, KeyValue, MRApp};

/// Word count: one `(word, "1")` per occurrence, reduced to the number of
/// occurrences.
pub struct WC;

impl MRApp for WC {
    fn map(&self, _key: String, value: String) -> BoxFuture<Vec<KeyValue>> {
        Box::pin(async move {
            // regex is an order of magnitude slower here
            Ok(super::words(&value).map(|w| KeyValue::new(w, "1")).collect())
        })
    }

    fn reduce(&self, _key: String, values: Vec<String>) -> BoxFuture<String> {
        Box::pin(async move { Ok(values.len().to_string()) })
    }
}
