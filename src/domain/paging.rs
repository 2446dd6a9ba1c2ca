//! Fixed-size paging over in-memory working sets.
//!
//! Responsibility:
//! - cursor that yields successive pages until the collection is exhausted
//! - chunking helper used by the bulk publisher to fragment id sets

use crate::SyncError;

use super::ProductId;

/// Cursor over a slice, yielding pages of at most `page_size` items.
///
/// An empty input yields no pages; the last page may be short.
#[derive(Debug, Clone)]
pub struct PageIter<'a, T> {
    items: &'a [T],
    page_size: usize,
    cursor: usize,
}

impl<'a, T> PageIter<'a, T> {
    /// A `page_size` of zero is a configuration error, rejected up front.
    pub fn new(items: &'a [T], page_size: usize) -> Result<Self, SyncError> {
        if page_size == 0 {
            return Err(SyncError::InvalidBatchSize(page_size));
        }
        Ok(Self {
            items,
            page_size,
            cursor: 0,
        })
    }

    /// Total number of pages this cursor will yield.
    pub fn page_count(&self) -> usize {
        self.items.len().div_ceil(self.page_size)
    }
}

impl<'a, T> Iterator for PageIter<'a, T> {
    type Item = &'a [T];

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.items.len() {
            return None;
        }
        let end = (self.cursor + self.page_size).min(self.items.len());
        let page = &self.items[self.cursor..end];
        self.cursor = end;
        Some(page)
    }
}

/// Split an id set into owned chunks of at most `chunk_size` ids.
pub fn chunk_ids(ids: &[ProductId], chunk_size: usize) -> Result<Vec<Vec<ProductId>>, SyncError> {
    if chunk_size == 0 {
        return Err(SyncError::InvalidBatchSize(chunk_size));
    }
    Ok(ids.chunks(chunk_size).map(<[ProductId]>::to_vec).collect())
}

/// De-duplicate an id set preserving first-seen order.
///
/// Bulk store operations and batch calls must tolerate duplicate ids from
/// callers; this is the single place that removes them.
pub fn dedup_ids(ids: &[ProductId]) -> Vec<ProductId> {
    let mut seen = std::collections::HashSet::with_capacity(ids.len());
    ids.iter()
        .copied()
        .filter(|id| seen.insert(*id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_cover_all_items_with_short_tail() {
        let items: Vec<i64> = (0..125).collect();
        let pages: Vec<&[i64]> = PageIter::new(&items, 50).unwrap().collect();
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].len(), 50);
        assert_eq!(pages[1].len(), 50);
        assert_eq!(pages[2].len(), 25);
        let flattened: Vec<i64> = pages.concat();
        assert_eq!(flattened, items);
    }

    #[test]
    fn empty_input_yields_no_pages() {
        let items: Vec<i64> = Vec::new();
        let mut iter = PageIter::new(&items, 50).unwrap();
        assert_eq!(iter.page_count(), 0);
        assert!(iter.next().is_none());
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let items = [1_i64, 2, 3];
        assert!(matches!(
            PageIter::new(&items, 0),
            Err(SyncError::InvalidBatchSize(0))
        ));
        assert!(chunk_ids(&items, 0).is_err());
    }

    #[test]
    fn exact_multiple_has_no_short_page() {
        let items: Vec<i64> = (0..100).collect();
        let iter = PageIter::new(&items, 50).unwrap();
        assert_eq!(iter.page_count(), 2);
        assert!(iter.clone().all(|p| p.len() == 50));
    }

    #[test]
    fn chunking_250_by_100_gives_100_100_50() {
        let ids: Vec<i64> = (1..=250).collect();
        let chunks = chunk_ids(&ids, 100).unwrap();
        let sizes: Vec<usize> = chunks.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![100, 100, 50]);
    }

    #[test]
    fn dedup_preserves_first_seen_order() {
        assert_eq!(dedup_ids(&[3, 1, 3, 2, 1]), vec![3, 1, 2]);
    }
}
