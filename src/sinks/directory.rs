//! Filesystem sink

use std::fs;
use std::path::{Path, PathBuf};

use super::DatasetSink;
use crate::error::AnnotationError;

/// Writes artifacts as files inside one directory
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DatasetSink for DirectorySink {
    fn write_artifact(&mut self, file_name: &str, contents: &str) -> Result<(), AnnotationError> {
        fs::create_dir_all(&self.dir).map_err(|source| AnnotationError::Output {
            path: self.dir.clone(),
            source,
        })?;

        let path = self.dir.join(file_name);
        fs::write(&path, contents).map_err(|source| AnnotationError::Output {
            path: path.clone(),
            source,
        })?;

        tracing::debug!(path = %path.display(), bytes = contents.len(), "wrote artifact");
        Ok(())
    }
}
