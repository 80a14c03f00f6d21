use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt::Debug;
use core::mem;

use log::trace;
use log::warn;

use crate::config::TableConfig;
use crate::error::PutError;
use crate::handle::Handle;
use crate::handle::is_pointer_sized;
use crate::sizing::bucket_index;
use crate::sizing::load_threshold;
use crate::sizing::table_size;
use crate::strategy::KeyStrategy;

/// One entry of a chain.
///
/// The first entry of a chain lives inline in its bucket slot; every
/// successor is boxed and owned by its predecessor.
struct Node<K, V> {
    key: K,
    hash: u32,
    value: V,
    next: Option<Box<Node<K, V>>>,
}

impl<K, V> Node<K, V> {
    #[inline]
    fn new(key: K, hash: u32, value: V) -> Self {
        Self {
            key,
            hash,
            value,
            next: None,
        }
    }
}

type Bucket<K, V> = Option<Node<K, V>>;

fn empty_buckets<K, V>(count: usize) -> Box<[Bucket<K, V>]> {
    core::iter::repeat_with(|| None).take(count).collect()
}

/// Appends `node` as the new tail of the chain starting at `head`.
#[inline]
fn append<K, V>(head: &mut Node<K, V>, node: Box<Node<K, V>>) {
    let mut link = &mut head.next;
    while let Some(next) = link {
        link = &mut next.next;
    }
    *link = Some(node);
}

/// Places a new node into its bucket: inline if the slot is empty, otherwise
/// boxed at the tail of the chain.
#[inline]
fn place<K, V>(buckets: &mut [Bucket<K, V>], node: Node<K, V>) {
    debug_assert!(node.next.is_none());
    let slot = &mut buckets[bucket_index(buckets.len(), node.hash)];
    if let Some(head) = slot {
        append(head, Box::new(node));
    } else {
        *slot = Some(node);
    }
}

/// Moves a boxed node into its bucket during resize. The node is linked
/// directly behind the chain head, so rehoming never walks a chain.
#[inline]
fn rehome<K, V>(buckets: &mut [Bucket<K, V>], mut node: Box<Node<K, V>>) {
    debug_assert!(node.next.is_none());
    let slot = &mut buckets[bucket_index(buckets.len(), node.hash)];
    if let Some(head) = slot {
        node.next = head.next.take();
        head.next = Some(node);
    } else {
        *slot = Some(*node);
    }
}

/// Moves a former chain head into its bucket during resize.
#[inline]
fn rehome_head<K, V>(buckets: &mut [Bucket<K, V>], node: Node<K, V>) {
    debug_assert!(node.next.is_none());
    let slot = &mut buckets[bucket_index(buckets.len(), node.hash)];
    if slot.is_none() {
        *slot = Some(node);
    } else {
        rehome(buckets, Box::new(node));
    }
}

fn chain_len<K, V>(slot: &Bucket<K, V>) -> usize {
    let mut len = 0;
    let mut cursor = slot.as_ref();
    while let Some(node) = cursor {
        len += 1;
        cursor = node.next.as_deref();
    }
    len
}

fn clone_chain<K: Copy, V: Copy>(head: &Node<K, V>) -> Node<K, V> {
    let mut successors = Vec::new();
    let mut cursor = head.next.as_deref();
    while let Some(node) = cursor {
        successors.push((node.key, node.hash, node.value));
        cursor = node.next.as_deref();
    }

    let mut next = None;
    for (key, hash, value) in successors.into_iter().rev() {
        next = Some(Box::new(Node {
            key,
            hash,
            value,
            next,
        }));
    }

    Node {
        key: head.key,
        hash: head.hash,
        value: head.value,
        next,
    }
}

/// Chain-length statistics for table analysis.
///
/// Available in tests and with the `stats` feature.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone)]
pub struct DebugStats {
    /// Number of entries in the table
    pub len: usize,
    /// Number of buckets allocated
    pub bucket_count: usize,
    /// Number of buckets holding at least one entry
    pub occupied_buckets: usize,
    /// Number of entries stored in boxed overflow nodes
    pub overflow_nodes: usize,
    /// Length of the longest chain
    pub longest_chain: usize,
    /// Load factor (len / bucket_count)
    pub load_factor: f64,
}

#[cfg(any(test, feature = "stats"))]
impl DebugStats {
    /// Pretty-print the statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Chain Table Statistics ===");
        println!(
            "Population: {}/{} buckets ({:.2}% load factor)",
            self.len,
            self.bucket_count,
            self.load_factor * 100.0
        );
        println!(
            "Occupied buckets: {} ({:.2}%)",
            self.occupied_buckets,
            if self.bucket_count == 0 {
                0.0
            } else {
                self.occupied_buckets as f64 / self.bucket_count as f64 * 100.0
            }
        );
        println!("Overflow nodes: {}", self.overflow_nodes);
        println!("Longest chain: {}", self.longest_chain);
    }
}

/// Histogram of chain lengths: `counts()[n]` is the number of buckets whose
/// chain holds exactly `n` entries.
///
/// Available in tests and with the `stats` feature.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainHistogram {
    counts: Vec<usize>,
}

#[cfg(any(test, feature = "stats"))]
impl ChainHistogram {
    /// Bucket counts indexed by chain length.
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// Pretty-prints the histogram as a horizontal bar chart.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        let max = self.counts.iter().copied().max().unwrap_or(0);
        if max == 0 {
            println!("chain histogram: empty");
            return;
        }

        let max_bar = 60usize;
        println!("chain histogram ({} buckets):", self.counts.iter().sum::<usize>());
        for (len, &count) in self.counts.iter().enumerate() {
            let width = (count as u128 * max_bar as u128).div_ceil(max as u128) as usize;
            println!("{:>3} | {} ({})", len, "█".repeat(width), count);
        }
    }
}

/// A hash table mapping pointer-sized key handles to pointer-sized value
/// handles, resolving collisions by chaining.
///
/// Buckets are kept in a power-of-two sized array; a key lives in bucket
/// `(bucket_count - 1) & hash(key)`. Inserting a new key when the table would
/// reach 75% of its bucket count doubles the bucket count first.
///
/// Keys and values are [`Handle`]s: the table copies them in and out but never
/// owns or dereferences what they point at. Equality and hashing come from the
/// [`KeyStrategy`] `S`.
///
/// There is no removal and no iteration; entries live until the table is
/// dropped.
///
/// # Examples
///
/// ```rust
/// use chain_table::AddressStrategy;
/// use chain_table::ChainTable;
///
/// let names = [String::from("left"), String::from("right")];
/// let scores = [10usize, 20];
///
/// let mut table: ChainTable<&String, &usize, _> = ChainTable::with_strategy(AddressStrategy);
/// assert_eq!(table.put(&names[0], &scores[0]), None);
/// assert_eq!(table.put(&names[1], &scores[1]), None);
/// assert_eq!(table.put(&names[0], &scores[1]), Some(&scores[0]));
///
/// assert_eq!(table.get(&names[0]), Some(&20));
/// assert_eq!(table.len(), 2);
/// ```
///
/// Non pointer-sized keys are rejected at compile time:
///
/// ```rust,compile_fail
/// use chain_table::AddressStrategy;
/// use chain_table::ChainTable;
///
/// let table: ChainTable<&str, usize, _> = ChainTable::with_strategy(AddressStrategy);
/// ```
pub struct ChainTable<K, V, S> {
    buckets: Box<[Bucket<K, V>]>,
    len: usize,
    max_bucket_count: usize,
    strategy: S,
}

impl<K, V, S> Debug for ChainTable<K, V, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ChainTable")
            .field("len", &self.len)
            .field("bucket_count", &self.buckets.len())
            .field("max_bucket_count", &self.max_bucket_count)
            .field(
                "chains",
                &self.buckets.iter().map(chain_len).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl<K, V, S> Clone for ChainTable<K, V, S>
where
    K: Handle,
    V: Handle,
    S: Clone,
{
    fn clone(&self) -> Self {
        Self {
            buckets: self
                .buckets
                .iter()
                .map(|slot| slot.as_ref().map(clone_chain))
                .collect(),
            len: self.len,
            max_bucket_count: self.max_bucket_count,
            strategy: self.strategy.clone(),
        }
    }
}

impl<K, V, S> Drop for ChainTable<K, V, S> {
    fn drop(&mut self) {
        // Unlink successors one at a time so long chains don't drop
        // recursively.
        for head in self.buckets.iter_mut().flatten() {
            let mut rest = head.next.take();
            while let Some(mut node) = rest {
                rest = node.next.take();
            }
        }
    }
}

impl<K, V, S> ChainTable<K, V, S>
where
    K: Handle,
    V: Handle,
    S: KeyStrategy<K> + Default,
{
    /// Creates a table with the default configuration (16 buckets) and the
    /// default strategy.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chain_table::AddressStrategy;
    /// use chain_table::ChainTable;
    ///
    /// let table: ChainTable<usize, usize, AddressStrategy> = ChainTable::new();
    /// assert_eq!(table.bucket_count(), 16);
    /// assert!(table.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::with_strategy(S::default())
    }

    /// Creates a table with room for `capacity` buckets (rounded up to a power
    /// of two) and the default strategy.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_strategy(capacity, S::default())
    }
}

impl<K, V, S> Default for ChainTable<K, V, S>
where
    K: Handle,
    V: Handle,
    S: KeyStrategy<K> + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> ChainTable<K, V, S>
where
    K: Handle,
    V: Handle,
    S: KeyStrategy<K>,
{
    /// Creates a table with the default configuration and `strategy`.
    pub fn with_strategy(strategy: S) -> Self {
        Self::with_config_and_strategy(TableConfig::default(), strategy)
    }

    /// Creates a table with `capacity` requested buckets and `strategy`.
    ///
    /// The bucket count is `capacity` rounded up to a power of two, at least
    /// 1.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chain_table::AddressStrategy;
    /// use chain_table::ChainTable;
    ///
    /// let table: ChainTable<usize, usize, _> =
    ///     ChainTable::with_capacity_and_strategy(100, AddressStrategy);
    /// assert_eq!(table.bucket_count(), 128);
    /// assert_eq!(table.capacity(), 95);
    /// ```
    pub fn with_capacity_and_strategy(capacity: usize, strategy: S) -> Self {
        Self::with_config_and_strategy(TableConfig::default().initial_capacity(capacity), strategy)
    }

    /// Creates a table from `config` and `strategy`.
    pub fn with_config_and_strategy(config: TableConfig, strategy: S) -> Self {
        const {
            assert!(
                is_pointer_sized::<K>(),
                "ChainTable keys must be pointer-sized handles"
            );
            assert!(
                is_pointer_sized::<V>(),
                "ChainTable values must be pointer-sized handles"
            );
        }

        Self {
            buckets: empty_buckets(config.bucket_count()),
            len: 0,
            max_bucket_count: config.bucket_limit(),
            strategy,
        }
    }

    /// Returns the number of entries in the table.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the table holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the current number of buckets. Always a power of two.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Returns the bucket count past which the table will not grow.
    pub fn max_bucket_count(&self) -> usize {
        self.max_bucket_count
    }

    /// Returns how many entries the table can hold before inserting another
    /// new key triggers a resize.
    pub fn capacity(&self) -> usize {
        load_threshold(self.buckets.len()).saturating_sub(1)
    }

    /// Returns the table's key strategy.
    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    /// Returns the value stored for `key`, or `None` if `key` is absent or
    /// null.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chain_table::AddressStrategy;
    /// use chain_table::ChainTable;
    ///
    /// let mut table: ChainTable<usize, usize, _> = ChainTable::with_strategy(AddressStrategy);
    /// table.put(0x10, 0x20);
    ///
    /// assert_eq!(table.get(0x10), Some(0x20));
    /// assert_eq!(table.get(0x30), None);
    /// assert_eq!(table.get(0), None);
    /// ```
    #[inline]
    pub fn get(&self, key: K) -> Option<V> {
        if key.is_null() {
            return None;
        }

        let hash = self.strategy.hash(&key);
        self.find_node(&key, hash).map(|node| node.value)
    }

    /// Returns `true` if the table holds an entry for `key`.
    #[inline]
    pub fn contains_key(&self, key: K) -> bool {
        self.get(key).is_some()
    }

    /// Associates `value` with `key`, returning the value it replaced.
    ///
    /// Returns `None` both when `key` was previously absent and when the
    /// insertion was refused (null key, or the table is full at its maximum
    /// bucket count). Use [`try_put`](Self::try_put) to tell these apart.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chain_table::AddressStrategy;
    /// use chain_table::ChainTable;
    ///
    /// let mut table: ChainTable<usize, usize, _> = ChainTable::with_strategy(AddressStrategy);
    /// assert_eq!(table.put(7, 1), None);
    /// assert_eq!(table.put(7, 2), Some(1));
    /// assert_eq!(table.len(), 1);
    /// ```
    #[inline]
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        self.try_put(key, value).unwrap_or(None)
    }

    /// Associates `value` with `key`, returning the value it replaced or the
    /// reason nothing was stored.
    ///
    /// Overwriting an existing key never resizes and never changes
    /// [`len`](Self::len). On error the table is unchanged.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chain_table::AddressStrategy;
    /// use chain_table::ChainTable;
    /// use chain_table::PutError;
    /// use chain_table::TableConfig;
    ///
    /// let config = TableConfig::default().initial_capacity(1).max_bucket_count(2);
    /// let mut table: ChainTable<usize, usize, _> =
    ///     ChainTable::with_config_and_strategy(config, AddressStrategy);
    ///
    /// assert_eq!(table.try_put(0, 1), Err(PutError::NullKey));
    /// assert_eq!(table.try_put(1, 1), Ok(None));
    /// assert_eq!(
    ///     table.try_put(2, 2),
    ///     Err(PutError::CapacityExhausted { bucket_count: 2 })
    /// );
    /// assert_eq!(table.try_put(1, 3), Ok(Some(1)));
    /// ```
    pub fn try_put(&mut self, key: K, value: V) -> Result<Option<V>, PutError> {
        if key.is_null() {
            return Err(PutError::NullKey);
        }

        let hash = self.strategy.hash(&key);
        if let Some(node) = self.find_node_mut(&key, hash) {
            return Ok(Some(mem::replace(&mut node.value, value)));
        }

        if self.len + 1 >= load_threshold(self.buckets.len()) {
            self.resize()?;
        }

        place(&mut self.buckets, Node::new(key, hash, value));
        self.len += 1;

        Ok(None)
    }

    fn find_node(&self, key: &K, hash: u32) -> Option<&Node<K, V>> {
        let mut cursor = self.buckets[bucket_index(self.buckets.len(), hash)].as_ref();
        while let Some(node) = cursor {
            if self.strategy.equals(&node.key, key) {
                return Some(node);
            }
            cursor = node.next.as_deref();
        }

        None
    }

    fn find_node_mut(&mut self, key: &K, hash: u32) -> Option<&mut Node<K, V>> {
        let index = bucket_index(self.buckets.len(), hash);
        let mut cursor = self.buckets[index].as_mut();
        while let Some(node) = cursor {
            if self.strategy.equals(&node.key, key) {
                return Some(node);
            }
            cursor = node.next.as_deref_mut();
        }

        None
    }

    /// Doubles the bucket count and rehomes every entry by its cached hash.
    #[cold]
    fn resize(&mut self) -> Result<(), PutError> {
        let old_count = self.buckets.len();
        let new_count = table_size(old_count.saturating_mul(2), self.max_bucket_count);
        if new_count <= old_count {
            warn!(
                "chain table cannot grow beyond {old_count} buckets with {} entries",
                self.len
            );
            return Err(PutError::CapacityExhausted {
                bucket_count: old_count,
            });
        }

        let old_buckets = mem::replace(&mut self.buckets, empty_buckets(new_count));
        for mut head in old_buckets.into_vec().into_iter().flatten() {
            let mut rest = head.next.take();
            rehome_head(&mut self.buckets, head);
            while let Some(mut node) = rest {
                rest = node.next.take();
                rehome(&mut self.buckets, node);
            }
        }

        trace!(
            "chain table resized from {old_count} to {new_count} buckets with {} entries",
            self.len
        );
        Ok(())
    }

    /// Computes a histogram of chain lengths for the current table state.
    ///
    /// Available in tests and with the `stats` feature.
    #[cfg(any(test, feature = "stats"))]
    pub fn chain_histogram(&self) -> ChainHistogram {
        let mut counts = alloc::vec![0usize; 1];
        for slot in self.buckets.iter() {
            let len = chain_len(slot);
            if counts.len() <= len {
                counts.resize(len + 1, 0);
            }
            counts[len] += 1;
        }

        ChainHistogram { counts }
    }

    /// Returns chain-length statistics for debugging.
    ///
    /// Available in tests and with the `stats` feature.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> DebugStats {
        let histogram = self.chain_histogram();
        let counts = histogram.counts();
        let occupied_buckets = self.buckets.len() - counts[0];

        DebugStats {
            len: self.len,
            bucket_count: self.buckets.len(),
            occupied_buckets,
            overflow_nodes: self.len - occupied_buckets,
            longest_chain: counts.len() - 1,
            load_factor: self.len as f64 / self.buckets.len() as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::string::ToString;
    use core::cell::Cell;
    use core::hash::Hasher;
    use core::ptr::NonNull;

    use rand::TryRngCore;
    use rand::rngs::OsRng;
    use siphasher::sip::SipHasher;

    use super::*;
    use crate::strategy::AddressStrategy;
    use crate::strategy::FnStrategy;
    use crate::strategy::StrStrategy;

    #[derive(Clone)]
    struct HashState {
        k0: u64,
        k1: u64,
    }

    impl HashState {
        fn default() -> Self {
            let mut rng = OsRng;
            Self {
                k0: rng.try_next_u64().unwrap(),
                k1: rng.try_next_u64().unwrap(),
            }
        }

        fn build_hasher(&self) -> SipHasher {
            SipHasher::new_with_keys(self.k0, self.k1)
        }
    }

    fn hash_key(state: &HashState, key: usize) -> u32 {
        let mut h = state.build_hasher();
        h.write_usize(key);
        h.finish() as u32
    }

    fn keyed_strategy() -> impl KeyStrategy<usize> + Clone {
        let state = HashState::default();
        FnStrategy::new(
            |a: &usize, b: &usize| a == b,
            move |k: &usize| hash_key(&state, *k),
        )
    }

    fn colliding_strategy() -> impl KeyStrategy<usize> + Clone {
        FnStrategy::new(|a: &usize, b: &usize| a == b, |_: &usize| 0)
    }

    #[test]
    fn insert_and_get() {
        let mut table = ChainTable::with_capacity_and_strategy(0, keyed_strategy());
        for k in 1..=32usize {
            assert_eq!(table.put(k, k * 2), None, "{:#?}", table);
            assert_eq!(table.get(k), Some(k * 2), "{:#?}", table);
        }

        assert_eq!(table.len(), 32);
        for k in 1..=32usize {
            assert_eq!(table.get(k), Some(k * 2), "{:#?}", table);
        }

        assert_eq!(table.get(999), None);
    }

    #[test]
    fn absent_before_put() {
        let table: ChainTable<usize, usize, _> = ChainTable::with_strategy(keyed_strategy());
        assert_eq!(table.get(1), None);
        assert!(!table.contains_key(1));
        assert!(table.is_empty());
    }

    #[test]
    fn overwrite_returns_previous_and_keeps_len() {
        let mut table = ChainTable::with_strategy(keyed_strategy());
        assert_eq!(table.put(42, 7), None);
        let bucket_count = table.bucket_count();

        assert_eq!(table.put(42, 11), Some(7));
        assert_eq!(table.len(), 1);
        assert_eq!(table.bucket_count(), bucket_count);
        assert_eq!(table.get(42), Some(11));
    }

    #[test]
    fn overwrite_never_resizes() {
        let mut table = ChainTable::with_capacity_and_strategy(8, keyed_strategy());
        for k in 1..=table.capacity() {
            table.put(k, k);
        }
        assert_eq!(table.bucket_count(), 8);
        assert_eq!(table.len(), 5);

        for round in 0..10 {
            for k in 1..=5usize {
                assert_eq!(table.put(k, k + round * 100 + 100), Some(k + round * 100));
            }
        }

        assert_eq!(table.bucket_count(), 8);
        assert_eq!(table.len(), 5);
    }

    #[test]
    fn null_key_rejected() {
        let mut table = ChainTable::with_capacity_and_strategy(1, keyed_strategy());

        assert_eq!(table.put(0, 5), None);
        assert_eq!(table.try_put(0, 5), Err(PutError::NullKey));
        assert_eq!(table.get(0), None);
        assert_eq!(table.len(), 0);
        assert_eq!(table.bucket_count(), 1);
    }

    #[test]
    fn null_values_are_stored() {
        let mut table: ChainTable<usize, *const u8, _> =
            ChainTable::with_strategy(AddressStrategy);

        assert_eq!(table.put(1, core::ptr::null()), None);
        assert_eq!(table.get(1), Some(core::ptr::null()));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn capacity_one_scenario() {
        let mut table = ChainTable::with_capacity_and_strategy(1, keyed_strategy());
        assert_eq!(table.bucket_count(), 1);

        let (a, b, c, d) = (0xA0, 0xB0, 0xC0, 0xD0);
        table.put(a, 1);
        table.put(b, 2);
        table.put(c, 3);
        table.put(d, 4);

        assert_eq!(table.len(), 4);
        assert_eq!(table.get(a), Some(1));
        assert_eq!(table.get(b), Some(2));
        assert_eq!(table.get(c), Some(3));
        assert_eq!(table.get(d), Some(4));
        assert!(table.bucket_count().is_power_of_two());
        assert_eq!(table.bucket_count(), 8);
    }

    #[test]
    fn growth_is_monotonic_and_bounded() {
        let mut table = ChainTable::with_capacity_and_strategy(0, keyed_strategy());
        let mut previous = table.bucket_count();
        for n in 1..=5000usize {
            table.put(n, n);

            let bucket_count = table.bucket_count();
            assert!(bucket_count.is_power_of_two());
            assert!(bucket_count >= previous);
            assert!(bucket_count * 3 >= n * 4, "{n} entries in {bucket_count} buckets");
            assert_eq!(table.len(), n);
            previous = bucket_count;
        }
    }

    #[test]
    fn capacity_predicts_next_resize() {
        let mut table = ChainTable::with_capacity_and_strategy(100, keyed_strategy());
        assert_eq!(table.bucket_count(), 128);
        assert_eq!(table.capacity(), 95);

        for k in 1..=95usize {
            table.put(k, k);
        }
        assert_eq!(table.bucket_count(), 128);

        table.put(96, 96);
        assert_eq!(table.bucket_count(), 256);
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn resize_preserves_contents() {
        let mut table = ChainTable::with_capacity_and_strategy(0, keyed_strategy());
        for k in 1..=100_000usize {
            table.put(k, k ^ 0x5555);
        }

        for k in (1..=100_000usize).step_by(3) {
            assert_eq!(table.put(k, k + 1), Some(k ^ 0x5555));
        }

        assert_eq!(table.len(), 100_000, "{:?}", table.debug_stats());
        for k in 1..=100_000usize {
            let expected = if (k - 1) % 3 == 0 { k + 1 } else { k ^ 0x5555 };
            assert_eq!(table.get(k), Some(expected));
        }
    }

    #[test]
    fn resize_reuses_cached_hashes() {
        let hash_calls = Cell::new(0usize);
        let strategy = FnStrategy::new(
            |a: &usize, b: &usize| a == b,
            |k: &usize| {
                hash_calls.set(hash_calls.get() + 1);
                k.wrapping_mul(0x9E37_79B9) as u32
            },
        );

        let mut table = ChainTable::with_capacity_and_strategy(1, strategy);
        let initial_buckets = table.bucket_count();
        for k in 1..=1000usize {
            assert_eq!(table.put(k, k), None);
            assert_eq!(hash_calls.get(), k);
        }
        assert!(table.bucket_count() >= 1024 && table.bucket_count() > initial_buckets);

        assert_eq!(table.put(7, 70), Some(7));
        assert_eq!(table.get(7), Some(70));
        assert_eq!(table.get(5000), None);
        assert_eq!(hash_calls.get(), 1003);

        assert_eq!(table.put(0, 1), None);
        assert_eq!(table.get(0), None);
        assert_eq!(hash_calls.get(), 1003);
    }

    #[test]
    fn two_colliding_keys_are_independent() {
        let mut table = ChainTable::with_strategy(colliding_strategy());
        assert_eq!(table.put(1, 100), None);
        assert_eq!(table.put(2, 200), None);

        assert_eq!(table.get(1), Some(100));
        assert_eq!(table.get(2), Some(200));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn explicit_collision() {
        let mut table = ChainTable::with_capacity_and_strategy(0, colliding_strategy());
        for k in 1..=65usize {
            assert_eq!(table.put(k, k * 10), None);
        }

        assert_eq!(table.len(), 65);
        for k in 1..=65usize {
            assert_eq!(table.get(k), Some(k * 10), "{:#?}", table);
        }

        assert_eq!(table.put(33, 0), Some(330));
        assert_eq!(table.get(33), Some(0));
        assert_eq!(table.len(), 65);

        let stats = table.debug_stats();
        assert_eq!(stats.occupied_buckets, 1);
        assert_eq!(stats.longest_chain, 65);
        assert_eq!(stats.overflow_nodes, 64);
    }

    #[test]
    fn capacity_exhausted() {
        let config = TableConfig::default()
            .initial_capacity(1)
            .max_bucket_count(4);
        let mut table = ChainTable::with_config_and_strategy(config, keyed_strategy());

        assert_eq!(table.put(1, 10), None);
        assert_eq!(table.put(2, 20), None);
        assert_eq!(table.bucket_count(), 4);
        assert_eq!(table.len(), table.capacity());

        assert_eq!(table.put(3, 30), None);
        assert_eq!(
            table.try_put(3, 30),
            Err(PutError::CapacityExhausted { bucket_count: 4 })
        );
        assert_eq!(table.get(3), None);
        assert_eq!(table.len(), 2);
        assert_eq!(table.bucket_count(), 4);

        assert_eq!(table.put(1, 11), Some(10));
        assert_eq!(table.get(1), Some(11));
        assert_eq!(table.get(2), Some(20));
    }

    #[test]
    fn string_keys_match_by_content() {
        let keys: Vec<String> = (0..200).map(|i| alloc::format!("key-{i}")).collect();
        let lookups: Vec<String> = (0..200).map(|i| alloc::format!("key-{i}")).collect();
        let values: Vec<usize> = (0..200).collect();
        let missing = "key-200".to_string();

        let mut table = ChainTable::with_capacity_and_strategy(0, StrStrategy::new());
        for (key, value) in keys.iter().zip(&values) {
            assert_eq!(table.put(key, value), None);
        }

        assert_eq!(table.len(), 200);
        for (key, value) in lookups.iter().zip(&values) {
            assert_eq!(table.get(key), Some(value));
        }

        assert_eq!(table.get(&missing), None);
    }

    #[test]
    fn address_keys_match_by_identity() {
        let first = alloc::boxed::Box::new(1u64);
        let second = alloc::boxed::Box::new(1u64);
        let labels = ["first".to_string(), "second".to_string()];

        let mut table = ChainTable::with_strategy(AddressStrategy);
        table.put(NonNull::from(&*first), &labels[0]);
        table.put(NonNull::from(&*second), &labels[1]);

        assert_eq!(table.len(), 2);
        assert_eq!(table.get(NonNull::from(&*first)), Some(&labels[0]));
        assert_eq!(table.get(NonNull::from(&*second)), Some(&labels[1]));
    }

    #[test]
    fn clone_is_independent() {
        let mut table = ChainTable::with_capacity_and_strategy(4, colliding_strategy());
        for k in 1..=10usize {
            table.put(k, k);
        }

        let mut cloned = table.clone();
        assert_eq!(cloned.len(), table.len());
        assert_eq!(cloned.bucket_count(), table.bucket_count());
        assert_eq!(cloned.chain_histogram(), table.chain_histogram());

        cloned.put(3, 300);
        cloned.put(11, 11);
        assert_eq!(table.get(3), Some(3));
        assert_eq!(table.get(11), None);
        assert_eq!(cloned.get(3), Some(300));
        assert_eq!(cloned.len(), 11);
        for k in 1..=10usize {
            assert_eq!(table.get(k), Some(k));
        }
    }

    #[test]
    fn clone_empty_table() {
        let table: ChainTable<usize, usize, _> = ChainTable::with_strategy(keyed_strategy());
        let cloned = table.clone();
        assert!(cloned.is_empty());
        assert_eq!(cloned.bucket_count(), 16);
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn long_chain_drops() {
        let mut table = ChainTable::with_capacity_and_strategy(0, colliding_strategy());
        for k in 1..=5_000usize {
            table.put(k, k);
        }
        assert_eq!(table.debug_stats().longest_chain, 5_000);
        drop(table);
    }

    #[test]
    fn histogram_output() {
        let mut table = ChainTable::with_capacity_and_strategy(0, keyed_strategy());
        for k in 1..=1000usize {
            table.put(k, k);
        }

        let histogram = table.chain_histogram();
        assert_eq!(histogram.counts().iter().sum::<usize>(), table.bucket_count());
        assert_eq!(
            histogram
                .counts()
                .iter()
                .enumerate()
                .map(|(len, count)| len * count)
                .sum::<usize>(),
            1000
        );

        #[cfg(feature = "std")]
        {
            histogram.print();
            table.debug_stats().print();
        }
    }

    #[test]
    fn debug_output_lists_chains() {
        let mut table = ChainTable::with_capacity_and_strategy(2, colliding_strategy());
        table.put(1, 1);

        let rendered = alloc::format!("{:?}", table);
        assert!(rendered.contains("len: 1"), "{rendered}");
        assert!(rendered.contains("chains: [1, 0, 0, 0]"), "{rendered}");
    }
}
