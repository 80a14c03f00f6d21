use core::fmt;

/// The reasons a [`try_put`](crate::ChainTable::try_put) can leave the
/// table untouched.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PutError {
    /// The key was the reserved null handle.
    NullKey,
    /// A resize was required but the table is already at its maximum
    /// bucket count.
    CapacityExhausted {
        /// The bucket count the table is stuck at.
        bucket_count: usize,
    },
}

impl fmt::Display for PutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PutError::NullKey => f.write_str("key is the null handle"),
            PutError::CapacityExhausted { bucket_count } => write!(
                f,
                "table cannot grow beyond {bucket_count} buckets"
            ),
        }
    }
}

impl core::error::Error for PutError {}
