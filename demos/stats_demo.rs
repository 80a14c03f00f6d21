use std::collections::hash_map::DefaultHasher;
use std::hash::Hash;
use std::hash::Hasher;

use chain_table::ChainTable;
use chain_table::FnStrategy;
use chain_table::TableConfig;

use clap::Parser;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'c', long = "initial_capacity", default_value_t = 16)]
    initial_capacity: usize,

    #[arg(short = 'n', long = "entries", default_value_t = 100_000)]
    entries: usize,

    #[arg(short = 'm', long = "max_buckets", default_value_t = 1 << 31)]
    max_buckets: usize,

    /// Keep only this many low bits of each hash, forcing collisions.
    #[arg(short = 'b', long = "hash_bits", default_value_t = 32)]
    hash_bits: u32,
}

fn hash_usize(value: usize) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

fn main() {
    let args = Args::parse();
    let mask = u32::MAX.checked_shr(32 - args.hash_bits.min(32)).unwrap_or(0);

    let config = TableConfig::default()
        .initial_capacity(args.initial_capacity)
        .max_bucket_count(args.max_buckets);
    let strategy = FnStrategy::new(
        |a: &usize, b: &usize| a == b,
        move |k: &usize| hash_usize(*k) as u32 & mask,
    );

    let mut table: ChainTable<usize, usize, _> =
        ChainTable::with_config_and_strategy(config, strategy);

    println!(
        "Created table with {} buckets (limit {})",
        table.bucket_count(),
        table.max_bucket_count()
    );
    println!("Inserting {} entries...", args.entries);

    let mut refused = 0;
    for key in 1..=args.entries {
        if table.try_put(key, key).is_err() {
            refused += 1;
        }
    }

    println!("Inserted {} entries into {} buckets", table.len(), table.bucket_count());
    println!(
        "Refused inserts: {} ({:.02}%)",
        refused,
        refused as f64 / args.entries.max(1) as f64 * 100.0
    );

    table.chain_histogram().print();
    table.debug_stats().print();
}
