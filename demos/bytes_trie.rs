//! Example demonstrating a byte-valued trie on a shared buffer.
//!
//! This example shows how to:
//! - Build a trie with byte array values
//! - Load it zero-copy from a `bytes::Bytes` buffer
//! - Share one trie between threads

use bytes::Bytes;
use std::sync::Arc;
use std::thread;
use tr13::{load_trie_buffer, write_trie, BuildOptions, BytesValues, PairSource, Result, TrieBuilder};

fn main() -> Result<()> {
    env_logger::init();
    println!("=== Bytes Trie Example ===\n");

    let entries: Vec<(&str, &str)> = vec![
        ("de", "Hallo"),
        ("en", "Hello"),
        ("es", "Hola"),
        ("fi", "Hei"),
        ("fr", "Bonjour"),
        ("sv", "Hej"),
    ];

    // === Part 1: Building ===
    println!("1. Building a trie with byte values...");
    let mut source = PairSource::new(entries.iter().map(|(k, v)| (*k, v.as_bytes().to_vec())));
    let root = TrieBuilder::<BytesValues>::new(BuildOptions::default().reorder_children(true))?.build(&mut source)?;

    let mut file = Vec::new();
    let written = write_trie(&root, &mut file, true)?;
    println!("   ✓ {} entries in {} bytes\n", entries.len(), written);

    // === Part 2: Sharing ===
    println!("2. Looking up from several threads...");
    let trie = Arc::new(load_trie_buffer::<BytesValues>(Bytes::from(file))?);

    let mut handles = vec![];
    for (key, _) in entries.iter().copied() {
        let trie = Arc::clone(&trie);
        handles.push(thread::spawn(move || -> Result<String> {
            let value = trie.find_value(key.as_bytes())?.unwrap_or(b"?");
            Ok(format!("   ✓ {} -> {}", key, String::from_utf8_lossy(value)))
        }));
    }
    for handle in handles {
        match handle.join() {
            Ok(line) => println!("{}", line?),
            Err(_) => eprintln!("   lookup thread panicked"),
        }
    }

    println!("\n=== Example completed successfully! ===");
    Ok(())
}
