use std::collections::HashMap;

use crate::{DIDResolver, Document};

use super::Error;

/// A simple static DID resolver to perform tests.
#[derive(Debug, Default, Clone)]
pub struct StaticDIDResolver {
    map: HashMap<String, Document>,
}

impl StaticDIDResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Registers a document under its own `id`.
    pub fn insert(&mut self, document: Document) -> Option<Document> {
        self.map.insert(document.id.clone(), document)
    }

    /// Parses and registers a JSON DID document.
    pub fn insert_json(&mut self, json: &str) -> Result<Option<Document>, Error> {
        let document: Document = serde_json::from_str(json)?;
        Ok(self.insert(document))
    }
}

impl DIDResolver for StaticDIDResolver {
    async fn resolve(&self, did: &str) -> Result<Document, Error> {
        match self.map.get(did) {
            Some(document) => Ok(document.clone()),
            None => Err(Error::NotFound),
        }
    }
}
