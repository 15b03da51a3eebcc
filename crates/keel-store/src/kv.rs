/// Ordered byte-keyed store.
///
/// Implementations must iterate in ascending byte-lexicographic key order;
/// that ordering is consensus-visible wherever the staking module scans a
/// key range.
pub trait KvStore {
    /// Fetch the value stored under `key`, if any.
    fn get(&self, key: &[u8]) -> Option<Vec<u8>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &[u8], value: &[u8]);

    /// Remove `key`. Removing an absent key is a no-op.
    fn delete(&mut self, key: &[u8]);

    /// True if `key` currently holds a value.
    fn has(&self, key: &[u8]) -> bool {
        self.get(key).is_some()
    }

    /// All entries with `start <= key <= end`, ascending. Both bounds are
    /// inclusive. An empty range (start > end) yields nothing.
    fn range(&self, start: &[u8], end: &[u8]) -> Vec<(Vec<u8>, Vec<u8>)>;

    /// All entries whose key begins with `prefix`, ascending.
    fn prefix(&self, prefix: &[u8]) -> Vec<(Vec<u8>, Vec<u8>)>;
}
