//! Key equality and hashing strategies.
//!
//! A [`KeyStrategy`] bundles the two functions a [`ChainTable`] is
//! parameterized by. The strategy must uphold one contract the type system
//! cannot check: if `equals(a, b)` then `hash(a) == hash(b)`. Violating it
//! does not cause undefined behavior, but lookups may miss entries that were
//! inserted.
//!
//! [`ChainTable`]: crate::ChainTable

use alloc::string::String;
use core::hash::BuildHasher;
use core::hash::Hash;
use core::marker::PhantomData;

use crate::handle::Handle;

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// The hasher builder used when none is given explicitly.
        pub type DefaultHashBuilder = foldhash::fast::RandomState;
    } else if #[cfg(feature = "std")] {
        /// The hasher builder used when none is given explicitly.
        pub type DefaultHashBuilder = std::hash::RandomState;
    }
}

/// Equality predicate and 32-bit hash function over keys of type `K`.
pub trait KeyStrategy<K> {
    /// Returns `true` if `a` and `b` denote the same key. Must be an
    /// equivalence relation.
    fn equals(&self, a: &K, b: &K) -> bool;

    /// Hashes `key`. Keys that compare equal must hash equally.
    fn hash(&self, key: &K) -> u32;
}

/// A strategy built from a pair of closures.
///
/// # Examples
///
/// ```rust
/// use chain_table::ChainTable;
/// use chain_table::FnStrategy;
///
/// let strategy = FnStrategy::new(|a: &usize, b: &usize| a == b, |k: &usize| *k as u32);
/// let mut table: ChainTable<usize, usize, _> = ChainTable::with_strategy(strategy);
/// table.put(8, 80);
/// assert_eq!(table.get(8), Some(80));
/// ```
#[derive(Clone, Copy)]
pub struct FnStrategy<E, H> {
    equals: E,
    hash: H,
}

impl<E, H> FnStrategy<E, H> {
    /// Wraps `equals` and `hash`. The pair must satisfy the strategy
    /// contract described in the [module documentation](self).
    pub fn new(equals: E, hash: H) -> Self {
        Self { equals, hash }
    }
}

impl<K, E, H> KeyStrategy<K> for FnStrategy<E, H>
where
    E: Fn(&K, &K) -> bool,
    H: Fn(&K) -> u32,
{
    #[inline]
    fn equals(&self, a: &K, b: &K) -> bool {
        (self.equals)(a, b)
    }

    #[inline]
    fn hash(&self, key: &K) -> u32 {
        (self.hash)(key)
    }
}

/// A strategy backed by [`Hash`], [`Eq`] and a [`BuildHasher`].
///
/// The 64-bit hash is folded to 32 bits by xoring its halves. Note that for
/// reference handles such as `&T`, both `Hash` and `Eq` look at the referent,
/// while for raw pointers they compare addresses.
#[derive(Clone, Default)]
pub struct BuildHasherStrategy<S> {
    hash_builder: S,
}

impl<S> BuildHasherStrategy<S> {
    /// Creates a strategy hashing through `hash_builder`.
    pub fn new(hash_builder: S) -> Self {
        Self { hash_builder }
    }

    /// Returns the underlying hasher builder.
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }
}

impl<K, S> KeyStrategy<K> for BuildHasherStrategy<S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    #[inline]
    fn equals(&self, a: &K, b: &K) -> bool {
        a == b
    }

    #[inline]
    fn hash(&self, key: &K) -> u32 {
        fold(self.hash_builder.hash_one(key))
    }
}

/// Identity strategy: two handles are equal iff they carry the same address.
///
/// The address goes through a 64-bit finalizer before folding, so aligned
/// pointers still spread across the low bits used for bucket selection.
#[derive(Clone, Copy, Default, Debug)]
pub struct AddressStrategy;

impl<K: Handle> KeyStrategy<K> for AddressStrategy {
    #[inline]
    fn equals(&self, a: &K, b: &K) -> bool {
        Handle::address(*a) == Handle::address(*b)
    }

    #[inline]
    fn hash(&self, key: &K) -> u32 {
        fold(mix_address(Handle::address(*key) as u64))
    }
}

/// 64-bit avalanche finalizer; every input bit affects every output bit.
#[inline]
fn mix_address(mut x: u64) -> u64 {
    x ^= x >> 33;
    x = x.wrapping_mul(0xFF51_AFD7_ED55_8CCD);
    x ^= x >> 33;
    x = x.wrapping_mul(0xC4CE_B9FE_1A85_EC53);
    x ^= x >> 33;
    x
}

/// Content strategy for `&String` keys: byte-wise equality and the classic
/// `h = 31 * h + byte` polynomial string hash.
///
/// # Examples
///
/// ```rust
/// use chain_table::ChainTable;
/// use chain_table::StrStrategy;
///
/// let alpha = String::from("alpha");
/// let alpha_again = String::from("alpha");
/// let value = 1usize;
///
/// let mut table = ChainTable::with_strategy(StrStrategy::new());
/// table.put(&alpha, &value);
/// assert_eq!(table.get(&alpha_again), Some(&value));
/// ```
#[derive(Clone, Copy, Default, Debug)]
pub struct StrStrategy<'a> {
    _keys: PhantomData<&'a String>,
}

impl StrStrategy<'_> {
    /// Creates the strategy.
    pub fn new() -> Self {
        Self { _keys: PhantomData }
    }
}

impl<'a> KeyStrategy<&'a String> for StrStrategy<'a> {
    #[inline]
    fn equals(&self, a: &&'a String, b: &&'a String) -> bool {
        a.as_bytes() == b.as_bytes()
    }

    #[inline]
    fn hash(&self, key: &&'a String) -> u32 {
        polynomial_hash(key.as_bytes())
    }
}

/// `h = 31 * h + byte` over `bytes`, wrapping.
#[inline]
pub fn polynomial_hash(bytes: &[u8]) -> u32 {
    bytes
        .iter()
        .fold(0u32, |hash, &byte| hash.wrapping_mul(31).wrapping_add(byte as u32))
}

#[inline(always)]
fn fold(hash: u64) -> u32 {
    (hash ^ (hash >> 32)) as u32
}
