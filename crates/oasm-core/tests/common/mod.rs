use std::cell::RefCell;
use std::collections::HashMap;

use oasm_core::SpecLoadError;
use oasm_core::resolve::DocumentFetcher;
use url::Url;

/// Serves documents from memory and records every fetch.
#[derive(Default)]
pub struct MemoryFetcher {
    documents: HashMap<String, String>,
    fetched: RefCell<Vec<String>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, uri: &str, text: &str) -> Self {
        self.documents.insert(uri.to_string(), text.to_string());
        self
    }

    pub fn fetch_count(&self, uri: &str) -> usize {
        self.fetched.borrow().iter().filter(|u| *u == uri).count()
    }

    pub fn total_fetches(&self) -> usize {
        self.fetched.borrow().len()
    }
}

impl DocumentFetcher for MemoryFetcher {
    fn fetch(&self, uri: &Url) -> Result<String, SpecLoadError> {
        let mut document = uri.clone();
        document.set_fragment(None);
        let key = document.to_string();
        self.fetched.borrow_mut().push(key.clone());
        self.documents
            .get(&key)
            .cloned()
            .ok_or_else(|| SpecLoadError::Fetch {
                uri: key,
                message: "HTTP 404 Not Found".to_string(),
            })
    }
}
