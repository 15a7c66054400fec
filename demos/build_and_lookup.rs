//! Example demonstrating a VInt-valued trie.
//!
//! This example shows how to:
//! - Build a trie from `key|value` text lines
//! - Write it to a trie file
//! - Look keys up and dump every entry
//!
//! Pass a path to read your own `key|value` file (keys must be sorted).

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Cursor};
use tr13::{open_trie, BuildOptions, DelimitedSource, Result, TrieBuilder, VIntValues};

const SAMPLE_INPUT: &str = "\
# word frequencies
ab|10
abc|20
abe|3
afgh|4
foo|5
";

fn main() -> Result<()> {
    env_logger::init();
    println!("=== VInt Trie Example ===\n");

    let temp_dir = std::env::temp_dir().join("tr13_build_and_lookup");
    fs::create_dir_all(&temp_dir)?;
    let trie_path = temp_dir.join("example.tr13");

    // === Part 1: Building ===
    println!("1. Building a trie...");
    {
        let options = BuildOptions::default();
        let builder = TrieBuilder::<VIntValues>::new(options)?
            .with_observer(|stats| println!("   ... {} keys so far", stats.keys_added));
        let mut out = BufWriter::new(File::create(&trie_path)?);

        let stats = match std::env::args().nth(1) {
            Some(path) => {
                let mut source = DelimitedSource::new(BufReader::new(File::open(path)?));
                builder.build_and_write(&mut source, &mut out, true)?
            }
            None => {
                let mut source = DelimitedSource::new(Cursor::new(SAMPLE_INPUT));
                builder.build_and_write(&mut source, &mut out, true)?
            }
        };
        println!("   ✓ {} keys, {} payload bytes", stats.keys_added, stats.payload_length);
        println!("   ✓ {} suffix leaves, {} branches\n", stats.suffix_folds, stats.branches + stats.value_branches);
    }

    // === Part 2: Lookups ===
    println!("2. Looking keys up...");
    let trie = open_trie::<VIntValues, _>(&trie_path)?;
    for key in ["ab", "abc", "afgh", "fo", "foob", "xuz"] {
        match trie.find_value(key.as_bytes())? {
            Some(value) => println!("   ✓ {:<6} -> {}", key, value),
            None => println!("   ✗ {:<6} not found", key),
        }
    }
    println!();

    // === Part 3: Dumping ===
    println!("3. Dumping all entries...");
    trie.for_each_entry(|key, value| {
        println!("   {} -> {}", String::from_utf8_lossy(key), value);
    })?;

    fs::remove_dir_all(&temp_dir)?;
    println!("\n=== Example completed successfully! ===");
    Ok(())
}
