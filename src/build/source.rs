//! Sources of key/value pairs for the builder.

use crate::error::{Error, Result};
use std::io::BufRead;

/// Separator between key and value in [`DelimitedSource`] lines.
pub const DEFAULT_SEPARATOR: u8 = b'|';

/// A producer of `(key, value)` pairs in ascending key order.
///
/// Sources push entries into a handler rather than being pulled, so a source
/// can hand out keys borrowed from its own read buffer.
pub trait KeyValueSource<V> {
    /// Feed every entry to `handler`, stopping at the first error.
    ///
    /// The third handler argument is the entry's position in the input (a
    /// line number, a record index) and is reported in ordering errors.
    fn read_all<F>(&mut self, handler: F) -> Result<()>
    where
        F: FnMut(&[u8], V, u64) -> Result<()>;

    /// Position of the last entry read, if the source tracks one.
    ///
    /// The builder records it in
    /// [`BuildStats::input_position`](crate::build::BuildStats::input_position)
    /// and logs it when reading stops on an error.
    fn position(&self) -> Option<u64>;
}

/// Source over any iterator of pairs; positions are 1-based entry indexes.
#[derive(Debug)]
pub struct PairSource<I> {
    iter: I,
    position: u64,
}

impl<I> PairSource<I> {
    /// Wrap an iterator (or anything iterable) of `(key, value)` pairs.
    pub fn new<T>(pairs: T) -> Self
    where
        T: IntoIterator<IntoIter = I>,
    {
        Self { iter: pairs.into_iter(), position: 0 }
    }
}

impl<I, K, V> KeyValueSource<V> for PairSource<I>
where
    I: Iterator<Item = (K, V)>,
    K: AsRef<[u8]>,
{
    fn read_all<F>(&mut self, mut handler: F) -> Result<()>
    where
        F: FnMut(&[u8], V, u64) -> Result<()>,
    {
        for (key, value) in self.iter.by_ref() {
            self.position += 1;
            handler(key.as_ref(), value, self.position)?;
        }
        Ok(())
    }

    fn position(&self) -> Option<u64> {
        Some(self.position)
    }
}

/// Line-oriented text source: one `key|value` entry per line.
///
/// Lines are trimmed; blank lines and lines starting with `#` are skipped.
/// The key is everything before the first separator and must not be empty.
/// Positions are 1-based line numbers.
///
/// For `u64` values the text after the separator must parse as an unsigned
/// integer; for byte values it is taken verbatim (trimmed).
#[derive(Debug)]
pub struct DelimitedSource<R> {
    reader: R,
    separator: u8,
    line_number: u64,
}

impl<R: BufRead> DelimitedSource<R> {
    /// Read `key|value` lines from `reader`.
    pub fn new(reader: R) -> Self {
        Self::with_separator(reader, DEFAULT_SEPARATOR)
    }

    /// Read lines using a custom separator byte.
    pub fn with_separator(reader: R, separator: u8) -> Self {
        Self { reader, separator, line_number: 0 }
    }

    fn for_each_line<V, P, F>(&mut self, parse: P, mut handler: F) -> Result<()>
    where
        P: Fn(&[u8]) -> Option<V>,
        F: FnMut(&[u8], V, u64) -> Result<()>,
    {
        let mut line = Vec::new();
        loop {
            line.clear();
            if self.reader.read_until(b'\n', &mut line)? == 0 {
                return Ok(());
            }
            self.line_number += 1;

            let trimmed = line.trim_ascii();
            if trimmed.is_empty() || trimmed.starts_with(b"#") {
                continue;
            }
            let entry = trimmed
                .iter()
                .position(|&b| b == self.separator)
                .filter(|&ix| ix > 0)
                .and_then(|ix| Some((&trimmed[..ix], parse(trimmed[ix + 1..].trim_ascii())?)));
            match entry {
                Some((key, value)) => handler(key, value, self.line_number)?,
                None => {
                    return Err(Error::invalid_format(format!(
                        "Invalid line #{}: '{}'",
                        self.line_number,
                        String::from_utf8_lossy(trimmed)
                    )))
                }
            }
        }
    }
}

impl<R: BufRead> KeyValueSource<u64> for DelimitedSource<R> {
    fn read_all<F>(&mut self, handler: F) -> Result<()>
    where
        F: FnMut(&[u8], u64, u64) -> Result<()>,
    {
        self.for_each_line(|text| std::str::from_utf8(text).ok()?.parse().ok(), handler)
    }

    fn position(&self) -> Option<u64> {
        Some(self.line_number)
    }
}

impl<R: BufRead> KeyValueSource<Vec<u8>> for DelimitedSource<R> {
    fn read_all<F>(&mut self, handler: F) -> Result<()>
    where
        F: FnMut(&[u8], Vec<u8>, u64) -> Result<()>,
    {
        self.for_each_line(|text| Some(text.to_vec()), handler)
    }

    fn position(&self) -> Option<u64> {
        Some(self.line_number)
    }
}
