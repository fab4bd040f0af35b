//! In-memory sink

use std::collections::BTreeMap;

use super::DatasetSink;
use crate::error::AnnotationError;

/// Keeps artifacts in a map, sorted by file name
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    artifacts: BTreeMap<String, String>,
    writes: Vec<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, file_name: &str) -> Option<&str> {
        self.artifacts.get(file_name).map(String::as_str)
    }

    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.artifacts.keys().map(String::as_str)
    }

    /// File names in the order they were written
    pub fn writes(&self) -> &[String] {
        &self.writes
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    pub fn into_artifacts(self) -> BTreeMap<String, String> {
        self.artifacts
    }
}

impl DatasetSink for MemorySink {
    fn write_artifact(&mut self, file_name: &str, contents: &str) -> Result<(), AnnotationError> {
        self.writes.push(file_name.to_string());
        self.artifacts
            .insert(file_name.to_string(), contents.to_string());
        Ok(())
    }
}
