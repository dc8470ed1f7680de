use crate::error::{SyncError, SyncResult};

/// Lazily groups an iterator into batches of at most `size` items.
///
/// Every batch is non-empty; an exhausted source ends the sequence.
#[derive(Clone, Debug)]
pub struct Chunks<I> {
    iter: I,
    size: usize,
}

/// Batch `iter` for APIs that accept a bounded number of items per request.
pub fn chunks<I: IntoIterator>(iter: I, size: usize) -> SyncResult<Chunks<I::IntoIter>> {
    if size == 0 {
        return Err(SyncError::InvalidConfig("batch size must be at least 1".into()));
    }
    Ok(Chunks {
        iter: iter.into_iter(),
        size,
    })
}

impl<I: Iterator> Iterator for Chunks<I> {
    type Item = Vec<I::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        let batch: Vec<_> = self.iter.by_ref().take(self.size).collect();
        (!batch.is_empty()).then_some(batch)
    }
}
