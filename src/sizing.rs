//! Bucket-count arithmetic shared by construction and resize.

/// Largest bucket count any table may reach.
///
/// This is the largest power of two that still fits below `u32::MAX - 1`, so
/// bucket counts stay representable in 32 bits on every target and the
/// power-of-two masking in [`bucket_index`] stays valid.
pub const MAX_BUCKET_COUNT: usize = 1 << 31;

/// Rounds `requested` up to the next power of two, clamped to `max`.
///
/// `0` and `1` both give `1`. `max` must itself be a power of two; any request
/// above it (including requests whose next power of two is not representable)
/// returns `max`.
///
/// # Examples
///
/// ```rust
/// use chain_table::sizing::table_size;
///
/// assert_eq!(table_size(0, 1024), 1);
/// assert_eq!(table_size(100, 1024), 128);
/// assert_eq!(table_size(5000, 1024), 1024);
/// ```
#[inline]
pub fn table_size(requested: usize, max: usize) -> usize {
    debug_assert!(max.is_power_of_two());

    if requested <= 1 {
        return 1;
    }

    // Smear the highest set bit of `requested - 1` into every lower bit, then
    // step to the next power of two.
    let mut size = requested - 1;
    let mut shift = 1;
    while shift < usize::BITS {
        size |= size >> shift;
        shift <<= 1;
    }

    if size < max { size + 1 } else { max }
}

/// Largest power of two not exceeding `limit`, clamped to
/// [`MAX_BUCKET_COUNT`]. `0` gives `1`.
#[inline]
pub fn bucket_limit(limit: usize) -> usize {
    if limit <= 1 {
        return 1;
    }

    let floor = 1usize << (usize::BITS - 1 - limit.leading_zeros());
    floor.min(MAX_BUCKET_COUNT)
}

/// Number of entries at which an insertion of a new key triggers a resize
/// (75% of `bucket_count`, rounded down).
#[inline(always)]
pub(crate) fn load_threshold(bucket_count: usize) -> usize {
    ((bucket_count as u128 * 3) / 4) as usize
}

/// Maps a hash to its bucket. `bucket_count` must be a power of two.
#[inline(always)]
pub(crate) fn bucket_index(bucket_count: usize, hash: u32) -> usize {
    (bucket_count - 1) & hash as usize
}
