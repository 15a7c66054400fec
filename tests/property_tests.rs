// Property Tests for tr13
// Randomized checks of the VInt codec and of build/lookup agreement

use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use tr13::vint;
use tr13::{
    build_trie, load_trie, load_trie_buffer, write_trie, ArrayTrie, BuildOptions, BytesValues, TrieBuilder,
    TrieLookup, VIntValues,
};

/// Keys over a narrow alphabet so that random sets share long prefixes
fn key_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(prop::sample::select(vec![b'a', b'b', b'c', 0u8, 0xff]), 0..12)
}

fn vint_map() -> impl Strategy<Value = BTreeMap<Vec<u8>, u64>> {
    prop::collection::btree_map(key_strategy(), any::<u64>(), 0..200)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn vint_round_trip(value in any::<u64>(), bits in 1u32..=8, tag in any::<u8>()) {
        let mut buf = [0u8; vint::MAX_VINT_LENGTH + 2];
        let end = vint::unsigned_to_bytes(value, bits, &mut buf, 1);
        let len = end - 1;
        prop_assert_eq!(len, vint::length_for_unsigned(value, bits));

        // Bits above the first byte's data bits are free for tags
        if bits < 8 {
            buf[1] |= tag & !((1u8 << bits) - 1);
        }
        prop_assert_eq!(vint::bytes_to_unsigned(bits, &buf, 1), (value, 1 + len));
        prop_assert_eq!(vint::try_bytes_to_unsigned(bits, &buf[..1 + len], 1), Some((value, 1 + len)));
        prop_assert_eq!(vint::try_bytes_to_unsigned(bits, &buf[..len], 1), None);
    }

    #[test]
    fn build_lookup_agree(pairs in vint_map(), probes in prop::collection::vec(key_strategy(), 0..50)) {
        let payload = build_trie::<VIntValues, _, _>(pairs.clone()).unwrap();
        let trie: ArrayTrie<VIntValues> = TrieLookup::new(payload);

        for (key, value) in &pairs {
            prop_assert_eq!(trie.find_value(key).unwrap(), Some(*value));
        }
        for probe in &probes {
            prop_assert_eq!(trie.find_value(probe).unwrap(), pairs.get(probe).copied());
        }
        prop_assert_eq!(trie.entries().unwrap(), pairs.into_iter().collect::<Vec<_>>());
    }

    #[test]
    fn negative_lookups(keys in prop::collection::btree_set(key_strategy(), 1..100)) {
        let payload = build_trie::<VIntValues, _, _>(keys.iter().map(|k| (k.clone(), 1u64))).unwrap();
        let trie: ArrayTrie<VIntValues> = TrieLookup::new(payload);

        let mut misses = BTreeSet::new();
        for key in &keys {
            for cut in 0..key.len() {
                misses.insert(key[..cut].to_vec());
            }
            let mut longer = key.clone();
            longer.push(b'z');
            misses.insert(longer);
        }
        for miss in misses.difference(&keys) {
            prop_assert_eq!(trie.find_value(miss).unwrap(), None);
        }
    }

    #[test]
    fn backends_agree(pairs in vint_map(), probes in prop::collection::vec(key_strategy(), 1..50)) {
        let mut builder = TrieBuilder::<VIntValues>::new(BuildOptions::default()).unwrap();
        for (key, value) in &pairs {
            builder.add(key, *value).unwrap();
        }
        let mut file = Vec::new();
        write_trie(&builder.finish().unwrap(), &mut file, true).unwrap();

        let array = load_trie::<VIntValues>(&file).unwrap();
        let shared = load_trie_buffer::<VIntValues>(bytes::Bytes::from(file)).unwrap();
        for probe in &probes {
            prop_assert_eq!(array.find_value(probe).unwrap(), shared.find_value(probe).unwrap());
        }
    }

    #[test]
    fn options_do_not_change_lookups(pairs in vint_map(), reorder in any::<bool>(), threshold in 1u64..512) {
        let options = BuildOptions::default().reorder_children(reorder).serialize_threshold(threshold);
        let mut builder = TrieBuilder::<VIntValues>::new(options).unwrap();
        for (key, value) in &pairs {
            builder.add(key, *value).unwrap();
        }
        let trie: ArrayTrie<VIntValues> = TrieLookup::new(builder.finish().unwrap().serialize());

        for (key, value) in &pairs {
            prop_assert_eq!(trie.find_value(key).unwrap(), Some(*value));
        }
        prop_assert_eq!(trie.entry_count().unwrap(), pairs.len() as u64);
    }

    #[test]
    fn bytes_values_agree(
        pairs in prop::collection::btree_map(key_strategy(), prop::collection::vec(any::<u8>(), 0..40), 0..100)
    ) {
        let payload = build_trie::<BytesValues, _, _>(pairs.clone()).unwrap();
        let trie: ArrayTrie<BytesValues> = TrieLookup::new(payload);

        for (key, value) in &pairs {
            prop_assert_eq!(trie.find_value(key).unwrap(), Some(value.as_slice()));
        }
    }
}
