//! Ordered document index with keyed lookup.

use folio_source::DocumentMetadata;
use std::collections::{HashMap, VecDeque};

/// The loaded document index.
///
/// Records keep provider order. Lookups go through a key → position map, so
/// [`get`](Self::get) is O(1). Keys are supposed to be unique; if the provider
/// repeats one, the first record keeps the key and the duplicate is still
/// listed but unreachable by key.
#[derive(Debug, Default)]
pub(crate) struct Index {
    entries: Vec<DocumentMetadata>,
    positions: HashMap<String, usize>,
}

impl Index {
    pub(crate) fn new(entries: Vec<DocumentMetadata>) -> Self {
        let mut positions = HashMap::with_capacity(entries.len());
        for (position, entry) in entries.iter().enumerate() {
            if positions.contains_key(&entry.key) {
                tracing::warn!(key = %entry.key, position, "Duplicate document key in index, keeping first");
                continue;
            }
            positions.insert(entry.key.clone(), position);
        }
        Self { entries, positions }
    }

    pub(crate) fn get(&self, key: &str) -> Option<&DocumentMetadata> {
        self.positions.get(key).map(|&position| &self.entries[position])
    }

    pub(crate) fn entries(&self) -> &[DocumentMetadata] {
        &self.entries
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Documents bulk prefetch should fetch, in index order.
    pub(crate) fn prefetch_queue(&self) -> VecDeque<DocumentMetadata> {
        self.entries.iter().filter(|entry| entry.is_prefetchable()).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(key: &str, address: &str) -> DocumentMetadata {
        DocumentMetadata::new(key, key.to_uppercase(), address)
    }

    #[test]
    fn test_lookup_by_key() {
        let index = Index::new(vec![doc("a", "https://x/a.md"), doc("b", "https://x/b.md")]);
        assert_eq!(index.get("b").map(|d| d.title.as_str()), Some("B"));
        assert!(index.get("c").is_none());
        assert!(Index::default().get("a").is_none());
    }

    #[test]
    fn test_duplicate_keys_keep_first() {
        let index = Index::new(vec![doc("a", "https://x/first.md"), doc("a", "https://x/second.md")]);
        assert_eq!(index.len(), 2);
        assert_eq!(index.get("a").and_then(|d| d.address.as_deref()), Some("https://x/first.md"));
    }

    #[test]
    fn test_prefetch_queue_filters_and_keeps_order() {
        let index = Index::new(vec![
            doc("c", "https://x/c.md"),
            doc("sys", "https://x/sys.md").with_kind("system"),
            doc("img", "https://x/img.png"),
            doc("a", "https://x/a.md").with_kind("doc"),
        ]);
        let keys: Vec<_> = index.prefetch_queue().into_iter().map(|d| d.key).collect();
        assert_eq!(keys, ["c", "a"]);
    }
}
