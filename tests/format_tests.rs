// File Format Tests for tr13
// These tests verify the header, file round trips and every loading path

use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, Write};
use tempfile::{NamedTempFile, TempDir};
use tr13::{
    load_trie, load_trie_buffer, open_trie, read_trie, write_trie, BuildOptions, BytesValues, DelimitedSource,
    Error, TrieBuilder, TrieHeader, ValueType, VIntValues, HEADER_LENGTH,
};

fn sample_file() -> Vec<u8> {
    let mut builder = TrieBuilder::<VIntValues>::new(BuildOptions::default()).unwrap();
    for (key, value) in [("ab", 10u64), ("abc", 20), ("abe", 3), ("afgh", 4), ("foo", 5)] {
        builder.add(key.as_bytes(), value).unwrap();
    }
    let root = builder.finish().unwrap();
    let mut out = Vec::new();
    write_trie(&root, &mut out, true).unwrap();
    out
}

/// Test the header bytes of a written trie
#[test]
fn test_header_bytes() {
    let file = sample_file();
    assert_eq!(&file[..5], b"TR13\n");
    assert_eq!(file[5], 0x90);
    assert_eq!(file[6], 1);
    assert_eq!(file[7], 0);

    let header = TrieHeader::read(&file, 0).unwrap();
    assert_eq!(header.value_type(), ValueType::VInt);
    assert_eq!(header.payload_length() as usize, file.len() - HEADER_LENGTH);
}

/// Test rejection of damaged headers
#[test]
fn test_bad_headers_rejected() {
    let file = sample_file();

    let mut bad_magic = file.clone();
    bad_magic[2] = b'X';
    assert!(matches!(load_trie::<VIntValues>(&bad_magic), Err(Error::InvalidFormat(_))));

    let mut bad_version = file.clone();
    bad_version[5] = 0x10;
    assert!(matches!(load_trie::<VIntValues>(&bad_version), Err(Error::InvalidFormat(_))));

    let mut bad_type = file.clone();
    bad_type[6] = 0;
    assert!(matches!(load_trie::<VIntValues>(&bad_type), Err(Error::InvalidFormat(_))));

    let mut oversized = file.clone();
    oversized[8..16].copy_from_slice(&u64::MAX.to_be_bytes());
    assert!(matches!(load_trie::<VIntValues>(&oversized), Err(Error::InvalidFormat(_))));

    assert!(matches!(load_trie::<VIntValues>(&file[..HEADER_LENGTH - 1]), Err(Error::InvalidFormat(_))));
}

/// Test that asking for the wrong value type fails before any traversal
#[test]
fn test_value_type_mismatch() {
    let file = sample_file();
    assert!(matches!(load_trie::<BytesValues>(&file), Err(Error::InvalidArgument(_))));
    assert!(matches!(
        load_trie_buffer::<BytesValues>(bytes::Bytes::from(file)),
        Err(Error::InvalidArgument(_))
    ));
}

/// Test writing to a file and reading it back through every loader
#[test]
fn test_file_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sample.tr13");
    std::fs::write(&path, sample_file()).unwrap();

    let opened = open_trie::<VIntValues, _>(&path).unwrap();
    let mut reader = BufReader::new(File::open(&path).unwrap());
    let streamed = read_trie::<VIntValues, _>(&mut reader).unwrap();

    for trie in [&opened, &streamed] {
        assert_eq!(trie.find_value(b"ab").unwrap(), Some(10));
        assert_eq!(trie.find_value(b"afgh").unwrap(), Some(4));
        assert_eq!(trie.find_value(b"af").unwrap(), None);
    }
    assert_eq!(opened.buffer(), streamed.buffer());
}

/// Test that a truncated file is rejected at load time
#[test]
fn test_truncated_file() {
    let mut file = sample_file();
    file.truncate(file.len() - 3);

    let temp_file = NamedTempFile::new().unwrap();
    std::fs::write(temp_file.path(), &file).unwrap();

    assert!(matches!(open_trie::<VIntValues, _>(temp_file.path()), Err(Error::InvalidFormat(_))));
    assert!(matches!(load_trie::<VIntValues>(&file), Err(Error::InvalidFormat(_))));
    assert!(matches!(read_trie::<VIntValues, _>(&mut Cursor::new(file)), Err(Error::Io(_))));
}

/// Test building straight from a delimited text file into a trie file
#[test]
fn test_build_from_text_file() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input.txt");
    let output = dir.path().join("output.tr13");
    std::fs::write(&input, "# generated\napple|3\napricot|17\nbanana|1000000\n\ncherry|0\n").unwrap();

    let mut source = DelimitedSource::new(BufReader::new(File::open(&input).unwrap()));
    let mut out = BufWriter::new(File::create(&output).unwrap());
    let stats = TrieBuilder::<VIntValues>::new(BuildOptions::default())
        .unwrap()
        .build_and_write(&mut source, &mut out, true)
        .unwrap();
    out.flush().unwrap();
    drop(out);

    assert_eq!(stats.keys_added, 4);
    assert_eq!(stats.input_position, Some(6));
    assert_eq!(std::fs::metadata(&output).unwrap().len(), HEADER_LENGTH as u64 + stats.payload_length);

    let trie = open_trie::<VIntValues, _>(&output).unwrap();
    assert_eq!(trie.find_value(b"apricot").unwrap(), Some(17));
    assert_eq!(trie.find_value(b"banana").unwrap(), Some(1_000_000));
    assert_eq!(trie.find_value(b"cherry").unwrap(), Some(0));
    assert_eq!(trie.find_value(b"apple ").unwrap(), None);
}

/// Test that ordering errors from text input report line numbers
#[test]
fn test_text_source_line_numbers() {
    let text = "# header\nb|1\n\na|2\n";
    let mut source = DelimitedSource::new(Cursor::new(text));
    let result = TrieBuilder::<VIntValues>::new(BuildOptions::default())
        .unwrap()
        .build(&mut source);
    assert!(matches!(result, Err(Error::OutOfOrder { position: 4, .. })));
}

/// Test a byte-valued trie through the shared buffer loader
#[test]
fn test_bytes_trie_buffer() {
    let mut source = DelimitedSource::new(Cursor::new("en|hello\nfi|hei\nsv|hej\n"));
    let mut file = Vec::new();
    TrieBuilder::<BytesValues>::new(BuildOptions::default())
        .unwrap()
        .build_and_write(&mut source, &mut file, true)
        .unwrap();
    assert_eq!(file[6], 2);

    let trie = load_trie_buffer::<BytesValues>(bytes::Bytes::from(file)).unwrap();
    assert_eq!(trie.find_value(b"fi").unwrap(), Some(&b"hei"[..]));
    assert_eq!(trie.find_value(b"de").unwrap(), None);
}

/// Test memory-mapped access against the in-memory loader
#[cfg(feature = "mmap")]
#[test]
fn test_mapped_trie_matches_loaded() {
    use tr13::open_mapped_trie;

    let temp_file = NamedTempFile::new().unwrap();
    std::fs::write(temp_file.path(), sample_file()).unwrap();

    let mapped = open_mapped_trie::<VIntValues, _>(temp_file.path()).unwrap();
    let loaded = open_trie::<VIntValues, _>(temp_file.path()).unwrap();

    assert_eq!(mapped.payload_len(), loaded.payload_len());
    assert_eq!(mapped.entries().unwrap(), loaded.entries().unwrap());
    for key in [&b"ab"[..], b"abc", b"abe", b"afgh", b"foo", b"fo", b"foob", b"xuz", b"", b"a"] {
        assert_eq!(mapped.find_value(key).unwrap(), loaded.find_value(key).unwrap());
    }
}

/// Test that a mapped file with a bad header is rejected
#[cfg(feature = "mmap")]
#[test]
fn test_mapped_trie_bad_header() {
    use tr13::open_mapped_trie;

    let mut file = sample_file();
    file[0] = b'X';
    let temp_file = NamedTempFile::new().unwrap();
    std::fs::write(temp_file.path(), &file).unwrap();

    assert!(matches!(open_mapped_trie::<VIntValues, _>(temp_file.path()), Err(Error::InvalidFormat(_))));
}
