//! Scatter lists
//!
//! An ordered list of byte spans describing one logical byte string. The
//! first empty span terminates the list; entries after it are ignored, so a
//! list built from fixed storage can carry a zero-length sentinel.

/// Count the entries in front of the zero-length sentinel.
pub fn terminated_len<I>(lens: I) -> usize
where
    I: IntoIterator<Item = usize>,
{
    lens.into_iter().take_while(|&len| len != 0).count()
}

/// Carve `buf` into consecutive regions of the given sizes.
///
/// Bytes beyond the sum of `sizes` are left out.
///
/// # Panics
///
/// Panics if the sizes add up to more than `buf.len()`.
pub fn split_regions<'a>(buf: &'a mut [u8], sizes: &[usize]) -> Vec<&'a mut [u8]> {
    let mut regions = Vec::with_capacity(sizes.len());
    let mut rest = buf;
    for &size in sizes {
        let (region, tail) = std::mem::take(&mut rest).split_at_mut(size);
        regions.push(region);
        rest = tail;
    }
    regions
}

/// Ordered list of borrowed byte spans
#[derive(Debug, Clone, Copy)]
pub struct ScatterList<'s, 'd> {
    entries: &'s [&'d [u8]],
}

impl<'s, 'd> ScatterList<'s, 'd> {
    /// Create a scatter list, cutting it at the first empty entry
    pub fn new(entries: &'s [&'d [u8]]) -> Self {
        let end = terminated_len(entries.iter().map(|entry| entry.len()));
        Self {
            entries: &entries[..end],
        }
    }

    /// Entries in front of the sentinel
    pub fn entries(&self) -> &'s [&'d [u8]] {
        self.entries
    }

    /// Number of entries in front of the sentinel
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the list describes no bytes at all
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Accumulated length of all entries
    pub fn total_len(&self) -> usize {
        self.entries.iter().map(|entry| entry.len()).sum()
    }

    /// Sequential reader over the bytes of all entries
    pub fn reader(&self) -> ScatterReader<'s, 'd> {
        ScatterReader {
            entries: self.entries,
            offset: 0,
        }
    }
}

impl<'s, 'd> From<&'s [&'d [u8]]> for ScatterList<'s, 'd> {
    fn from(entries: &'s [&'d [u8]]) -> Self {
        Self::new(entries)
    }
}

/// Reads the bytes of a [`ScatterList`] front to back.
///
/// Each call to [`take`](ScatterReader::take) hands out a contiguous chunk of
/// a single entry, so a caller that needs `n` bytes loops until it has them.
#[derive(Debug, Clone)]
pub struct ScatterReader<'s, 'd> {
    entries: &'s [&'d [u8]],
    offset: usize,
}

impl<'s, 'd> ScatterReader<'s, 'd> {
    /// Take up to `max` contiguous bytes from the current entry.
    ///
    /// Returns an empty slice once every entry has been consumed.
    pub fn take(&mut self, max: usize) -> &'d [u8] {
        while let Some((&entry, rest)) = self.entries.split_first() {
            let available = &entry[self.offset..];
            if available.is_empty() {
                self.entries = rest;
                self.offset = 0;
                continue;
            }
            let len = available.len().min(max);
            self.offset += len;
            return &available[..len];
        }
        &[]
    }

    /// Bytes not yet handed out
    pub fn remaining(&self) -> usize {
        let total: usize = self.entries.iter().map(|entry| entry.len()).sum();
        total - self.offset
    }
}
