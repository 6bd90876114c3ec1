pub mod indexer;
pub mod wc;

use crate::mr::MRApp;

pub fn get_app(app: &str) -> Result<Box<dyn MRApp>, anyhow::Error> {
    match app {
        "wc" => Ok(Box::new(wc::WC)),
        "indexer" => Ok(Box::new(indexer::Indexer)),
        _ => Err(anyhow::anyhow!("Unknown app: {}", app)),
    }
}

// maximal runs of alphabetic characters
pub(crate) fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_alphabetic()).filter(|w| !w.is_empty())
}
