//! Dataset sinks
//!
//! A sink receives the rendered artifacts of each dataset as soon as it is
//! complete. The pipeline never touches the filesystem directly.

mod directory;
mod memory;

pub use directory::DirectorySink;
pub use memory::MemorySink;

use crate::encoder::EncodedDataset;
use crate::error::AnnotationError;

/// Destination for rendered text artifacts
pub trait DatasetSink {
    /// Store one artifact under `file_name`, replacing any previous content
    fn write_artifact(&mut self, file_name: &str, contents: &str) -> Result<(), AnnotationError>;

    /// Store both files of a dataset, table first
    fn write_dataset(&mut self, dataset: &EncodedDataset) -> Result<(), AnnotationError> {
        self.write_artifact(&dataset.table_file(), &dataset.table)?;
        self.write_artifact(&dataset.script_file(), &dataset.script)
    }
}
