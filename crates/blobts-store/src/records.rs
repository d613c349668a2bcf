use std::path::PathBuf;

use blobts_pipeline::BlobPipeline;
use blobts_types::{Record, Timestamp};
use tracing::error;

use crate::error::StoreResult;

/// Lazily read records of a range query, in query order.
///
/// The set of files was fixed when the query ran; each `next()` reads one
/// file and reverses the pipeline. A record that fails to read or to
/// authenticate is yielded as an error and iteration may continue.
#[derive(Debug)]
pub struct Records {
    entries: std::vec::IntoIter<(Timestamp, PathBuf)>,
    pipeline: BlobPipeline,
}

impl Records {
    pub(crate) fn new(entries: Vec<(Timestamp, PathBuf)>, pipeline: BlobPipeline) -> Self {
        Self {
            entries: entries.into_iter(),
            pipeline,
        }
    }

    fn read(&self, time: Timestamp, path: &PathBuf) -> StoreResult<Record> {
        let token = std::fs::read(path).map_err(|e| {
            error!(path = %path.display(), error = %e, "failed to read record");
            e
        })?;
        let data = self.pipeline.egress(&token).map_err(|e| {
            error!(path = %path.display(), error = %e, "failed to restore record payload");
            e
        })?;
        Ok(Record::new(time, data))
    }
}

impl Iterator for Records {
    type Item = StoreResult<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        let (time, path) = self.entries.next()?;
        Some(self.read(time, &path))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl ExactSizeIterator for Records {}
