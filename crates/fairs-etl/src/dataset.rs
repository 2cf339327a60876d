//! Per-file import handlers
//!
//! Each [`SupportedFile`] maps to exactly one [`Dataset`] that knows how to
//! parse its text and load the result.

use async_trait::async_trait;
use fairs_common::FailureLog;

use crate::error::Result;
use crate::fairs::{Fairs2014, LoadSummary, Record};
use crate::store::FairStore;
use crate::supported::SupportedFile;

/// Parsed rows of one source file, in file order
pub type RecordSet = Vec<Record>;

#[async_trait]
pub trait Dataset: Send + Sync {
    fn file(&self) -> SupportedFile;

    /// Parse the decoded file contents. No side effects.
    fn parse(&self, content: &str) -> Result<RecordSet>;

    /// Persist `records` atomically
    async fn load(&self, records: &[Record]) -> Result<LoadSummary>;
}

/// Build the handler for `file`
pub fn dataset_for<S, L>(file: SupportedFile, store: S, failure_log: L) -> Box<dyn Dataset>
where
    S: FairStore + 'static,
    L: FailureLog + 'static,
{
    match file {
        SupportedFile::Fairs2014 => Box::new(Fairs2014::new(store, failure_log)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryFairStore;
    use fairs_common::TracingFailureLog;

    #[test]
    fn test_every_supported_file_has_a_dataset() {
        for file in SupportedFile::ALL {
            let dataset = dataset_for(file, MemoryFairStore::new(), TracingFailureLog);
            assert_eq!(dataset.file(), file);
        }
    }
}
