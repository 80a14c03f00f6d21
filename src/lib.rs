#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

/// The separately chained hash table.
///
/// This module provides `ChainTable`, which maps pointer-sized key handles to
/// pointer-sized value handles using client-supplied equality and hashing.
pub mod chain_table;

mod config;
mod error;

pub mod handle;
pub mod sizing;

pub mod strategy;

pub use chain_table::ChainTable;
#[cfg(any(test, feature = "stats"))]
pub use chain_table::ChainHistogram;
#[cfg(any(test, feature = "stats"))]
pub use chain_table::DebugStats;
pub use config::TableConfig;
pub use error::PutError;
pub use handle::Handle;
pub use strategy::AddressStrategy;
pub use strategy::BuildHasherStrategy;
pub use strategy::FnStrategy;
pub use strategy::KeyStrategy;
pub use strategy::StrStrategy;

#[cfg(any(feature = "foldhash", feature = "std"))]
pub use strategy::DefaultHashBuilder;

/// A [`ChainTable`] hashing keys through their [`Hash`](core::hash::Hash)
/// implementation with the [`DefaultHashBuilder`].
///
/// # Examples
///
/// ```rust
/// use chain_table::HandleTable;
///
/// let mut table: HandleTable<usize, usize> = HandleTable::new();
/// table.put(0x1000, 1);
/// assert_eq!(table.get(0x1000), Some(1));
/// ```
#[cfg(any(feature = "foldhash", feature = "std"))]
pub type HandleTable<K, V> = ChainTable<K, V, BuildHasherStrategy<DefaultHashBuilder>>;
