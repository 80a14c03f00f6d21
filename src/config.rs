use crate::sizing::MAX_BUCKET_COUNT;
use crate::sizing::bucket_limit;
use crate::sizing::table_size;

/// Construction parameters for a [`ChainTable`](crate::ChainTable).
///
/// # Examples
///
/// ```rust
/// use chain_table::TableConfig;
///
/// let config = TableConfig::default().initial_capacity(100).max_bucket_count(1000);
/// assert_eq!(config.bucket_count(), 128);
/// assert_eq!(config.bucket_limit(), 512);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct TableConfig {
    initial_capacity: usize,
    max_bucket_count: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 16,
            max_bucket_count: MAX_BUCKET_COUNT,
        }
    }
}

impl TableConfig {
    /// Sets the requested number of buckets at construction. Rounded up to a
    /// power of two, at least 1.
    pub fn initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }

    /// Sets the bucket count past which the table refuses to grow. Rounded
    /// down to a power of two and clamped to [`MAX_BUCKET_COUNT`].
    pub fn max_bucket_count(mut self, max_bucket_count: usize) -> Self {
        self.max_bucket_count = max_bucket_count;
        self
    }

    /// The effective growth limit.
    pub fn bucket_limit(&self) -> usize {
        bucket_limit(self.max_bucket_count)
    }

    /// The bucket count a table built from this configuration starts with.
    pub fn bucket_count(&self) -> usize {
        table_size(self.initial_capacity, self.bucket_limit())
    }
}
