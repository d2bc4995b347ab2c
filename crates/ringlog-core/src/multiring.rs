//! # Multiring
//!
//! Joins several independent memory regions into one logical circular
//! buffer. Positions are [`Cursor`] values, a region index plus an offset
//! inside that region; advancing past the end of a region continues at the
//! start of the next one, and the last region wraps back to the first.
//!
//! The multiring is a mechanism only. It never checks whether the write
//! cursor overtakes the read cursor; that policy belongs to its user.
//!
//! ## Example
//!
//! ```
//! use ringlog_core::multiring::MultiRing;
//!
//! let mut a = [0u8; 4];
//! let mut b = [0u8; 6];
//! let mut ring = MultiRing::new([&mut a[..], &mut b[..]]).unwrap();
//! assert_eq!(ring.capacity(), 10);
//!
//! ring.write(b"scattered");
//! let mut out = [0u8; 9];
//! ring.read(&mut out);
//! assert_eq!(&out, b"scattered");
//! ```

use std::fmt;

use tracing::debug;

use crate::error::RingError;

/// Smallest region that can carry a fragment header plus one payload byte.
///
/// At least one region must be this large, otherwise a writer could only
/// ever emit empty fragments and would never make progress.
pub const MIN_REGION_LEN: usize = 2;

/// A position in the logical address space of a [`MultiRing`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Cursor {
    region: usize,
    offset: usize,
}

impl Cursor {
    /// First byte of the first region
    pub const ORIGIN: Cursor = Cursor {
        region: 0,
        offset: 0,
    };

    /// Create a cursor from a region index and an offset inside that region
    pub const fn new(region: usize, offset: usize) -> Self {
        Self { region, offset }
    }

    /// Index of the region this cursor points into
    pub fn region(&self) -> usize {
        self.region
    }

    /// Offset inside the region
    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.region, self.offset)
    }
}

/// Circular buffer spanning several caller-owned regions.
///
/// The region table is built once by [`MultiRing::new`] and never resized.
pub struct MultiRing<'a> {
    regions: Box<[&'a mut [u8]]>,
    capacity: usize,
    read: Cursor,
    write: Cursor,
}

impl<'a> MultiRing<'a> {
    /// Create a multiring over `regions`, in list order.
    ///
    /// The first empty region acts as the list terminator; it and everything
    /// after it is ignored.
    ///
    /// # Errors
    ///
    /// - [`RingError::NoRegions`] if no region precedes the terminator
    /// - [`RingError::RegionTooSmall`] if no region reaches [`MIN_REGION_LEN`]
    pub fn new<I>(regions: I) -> Result<Self, RingError>
    where
        I: IntoIterator<Item = &'a mut [u8]>,
    {
        let regions: Box<[&'a mut [u8]]> = regions
            .into_iter()
            .take_while(|region| !region.is_empty())
            .collect();

        let largest = regions
            .iter()
            .map(|region| region.len())
            .max()
            .ok_or(RingError::NoRegions)?;
        if largest < MIN_REGION_LEN {
            return Err(RingError::RegionTooSmall {
                largest,
                required: MIN_REGION_LEN,
            });
        }

        let capacity = regions.iter().map(|region| region.len()).sum();
        debug!(
            regions = regions.len(),
            capacity = capacity,
            largest = largest,
            "Initialized multiring"
        );

        Ok(Self {
            regions,
            capacity,
            read: Cursor::ORIGIN,
            write: Cursor::ORIGIN,
        })
    }

    /// Total number of bytes across all regions
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of regions in the ring
    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    /// Length of one region
    pub fn region_len(&self, region: usize) -> usize {
        self.regions[region].len()
    }

    /// Raw bytes of one region
    pub fn region(&self, region: usize) -> &[u8] {
        &self.regions[region][..]
    }

    /// Current read position
    pub fn read_cursor(&self) -> Cursor {
        self.read
    }

    /// Current write position
    pub fn write_cursor(&self) -> Cursor {
        self.write
    }

    /// Reposition the read cursor, typically to a previously saved cursor
    pub fn set_read_cursor(&mut self, cursor: Cursor) {
        debug_assert!(self.is_valid(cursor), "cursor {cursor} outside ring");
        self.read = cursor;
    }

    /// Reposition the write cursor
    pub fn set_write_cursor(&mut self, cursor: Cursor) {
        debug_assert!(self.is_valid(cursor), "cursor {cursor} outside ring");
        self.write = cursor;
    }

    /// Whether `cursor` addresses a byte of this ring
    pub fn is_valid(&self, cursor: Cursor) -> bool {
        cursor.region < self.regions.len() && cursor.offset < self.regions[cursor.region].len()
    }

    /// Bytes left in the cursor's region, starting at the cursor
    pub fn contiguous(&self, cursor: Cursor) -> usize {
        self.regions[cursor.region].len() - cursor.offset
    }

    /// Start of the region following the cursor's region, wrapping after the last
    pub fn next_region(&self, cursor: Cursor) -> Cursor {
        Cursor::new((cursor.region + 1) % self.regions.len(), 0)
    }

    /// Move `cursor` forward by `count` bytes.
    ///
    /// For `count <= capacity` this rolls over at most `region_count` times.
    pub fn advance(&self, mut cursor: Cursor, mut count: usize) -> Cursor {
        while count > 0 {
            let span = self.contiguous(cursor);
            if span > count {
                cursor.offset += count;
                break;
            }
            count -= span;
            cursor = self.next_region(cursor);
        }
        cursor
    }

    /// Move the read cursor forward without copying
    pub fn advance_read(&mut self, count: usize) {
        self.read = self.advance(self.read, count);
    }

    /// Move the write cursor forward without copying
    pub fn advance_write(&mut self, count: usize) {
        self.write = self.advance(self.write, count);
    }

    /// Copy `data` into the ring at the write cursor
    pub fn write(&mut self, mut data: &[u8]) {
        while !data.is_empty() {
            let cursor = self.write;
            let len = data.len().min(self.contiguous(cursor));
            self.regions[cursor.region][cursor.offset..cursor.offset + len]
                .copy_from_slice(&data[..len]);
            self.write = self.advance(cursor, len);
            data = &data[len..];
        }
    }

    /// Write a single byte at the write cursor
    pub fn write_byte(&mut self, value: u8) {
        self.write(&[value]);
    }

    /// Set `len` bytes to `value`, starting at the write cursor
    pub fn fill(&mut self, value: u8, mut len: usize) {
        while len > 0 {
            let cursor = self.write;
            let chunk = len.min(self.contiguous(cursor));
            self.regions[cursor.region][cursor.offset..cursor.offset + chunk].fill(value);
            self.write = self.advance(cursor, chunk);
            len -= chunk;
        }
    }

    /// Fill `buf` from the ring at the read cursor
    pub fn read(&mut self, buf: &mut [u8]) {
        let mut done = 0;
        while done < buf.len() {
            let cursor = self.read;
            let len = (buf.len() - done).min(self.contiguous(cursor));
            buf[done..done + len]
                .copy_from_slice(&self.regions[cursor.region][cursor.offset..cursor.offset + len]);
            self.read = self.advance(cursor, len);
            done += len;
        }
    }

    /// Read a single byte at the read cursor
    pub fn read_byte(&mut self) -> u8 {
        let value = self.byte_at(self.read);
        self.advance_read(1);
        value
    }

    /// Byte at `cursor`, leaving both cursors untouched
    pub fn byte_at(&self, cursor: Cursor) -> u8 {
        self.regions[cursor.region][cursor.offset]
    }

    /// Borrow `len` contiguous bytes starting at `cursor`.
    ///
    /// # Panics
    ///
    /// Panics if `len` exceeds [`contiguous`](Self::contiguous) for the cursor.
    pub fn span(&self, cursor: Cursor, len: usize) -> &[u8] {
        &self.regions[cursor.region][cursor.offset..cursor.offset + len]
    }

    /// Bytes between the read and the write cursor
    pub fn available(&self) -> usize {
        self.distance(self.read, self.write)
    }

    /// Forward distance in bytes from `first` to `second`, wrapping.
    ///
    /// Equal cursors are zero bytes apart.
    pub fn distance(&self, first: Cursor, second: Cursor) -> usize {
        if first.region == second.region {
            if first.offset <= second.offset {
                return second.offset - first.offset;
            }
            return self.capacity - (first.offset - second.offset);
        }

        let mut len = self.contiguous(first);
        let mut region = (first.region + 1) % self.regions.len();
        while region != second.region {
            len += self.regions[region].len();
            region = (region + 1) % self.regions.len();
        }
        len + second.offset
    }
}

impl fmt::Debug for MultiRing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lens: Vec<usize> = self.regions.iter().map(|region| region.len()).collect();
        f.debug_struct("MultiRing")
            .field("regions", &lens)
            .field("capacity", &self.capacity)
            .field("read", &self.read)
            .field("write", &self.write)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scatter::split_regions;

    #[test]
    fn test_empty_region_list() {
        let result = MultiRing::new(Vec::<&mut [u8]>::new());
        assert!(matches!(result, Err(RingError::NoRegions)));
    }

    #[test]
    fn test_sentinel_first_means_no_regions() {
        let mut empty = [0u8; 0];
        let mut a = [0u8; 16];
        let result = MultiRing::new([&mut empty[..], &mut a[..]]);
        assert!(matches!(result, Err(RingError::NoRegions)));
    }

    #[test]
    fn test_regions_too_small() {
        let mut a = [0u8; 1];
        let mut b = [0u8; 1];
        let result = MultiRing::new([&mut a[..], &mut b[..]]);
        assert_eq!(
            result.unwrap_err(),
            RingError::RegionTooSmall {
                largest: 1,
                required: MIN_REGION_LEN
            }
        );
    }

    #[test]
    fn test_capacity_and_sentinel() {
        let mut storage = [0u8; 64];
        // Only the two regions in front of the empty one count
        let ring = MultiRing::new(split_regions(&mut storage, &[10, 5, 0, 20])).unwrap();

        assert_eq!(ring.region_count(), 2);
        assert_eq!(ring.capacity(), 15);
        assert_eq!(ring.read_cursor(), Cursor::ORIGIN);
        assert_eq!(ring.write_cursor(), Cursor::ORIGIN);
    }

    #[test]
    fn test_advance_rolls_over_regions() {
        let mut storage = [0u8; 30];
        let ring = MultiRing::new(split_regions(&mut storage, &[10, 5, 15])).unwrap();

        assert_eq!(ring.advance(Cursor::ORIGIN, 3), Cursor::new(0, 3));
        // Landing exactly on a region end continues in the next region
        assert_eq!(ring.advance(Cursor::ORIGIN, 10), Cursor::new(1, 0));
        assert_eq!(ring.advance(Cursor::new(0, 8), 9), Cursor::new(2, 2));
        assert_eq!(ring.advance(Cursor::new(2, 14), 1), Cursor::ORIGIN);
        // A full lap returns to the starting position
        assert_eq!(ring.advance(Cursor::new(1, 2), 30), Cursor::new(1, 2));
        assert_eq!(ring.advance(Cursor::new(1, 2), 0), Cursor::new(1, 2));
    }

    #[test]
    fn test_write_read_across_boundaries() {
        let mut storage = [0u8; 12];
        let mut ring = MultiRing::new(split_regions(&mut storage, &[3, 4, 5])).unwrap();

        ring.advance_write(2);
        ring.advance_read(2);
        ring.write(b"0123456789");
        assert_eq!(ring.write_cursor(), Cursor::ORIGIN);
        assert_eq!(ring.available(), 10);

        let mut out = [0u8; 10];
        ring.read(&mut out);
        assert_eq!(&out, b"0123456789");
        assert_eq!(ring.read_cursor(), ring.write_cursor());

        drop(ring);
        assert_eq!(&storage[..3], b"\0\x000");
        assert_eq!(&storage[3..7], b"1234");
        assert_eq!(&storage[7..], b"56789");
    }

    #[test]
    fn test_write_wraps_to_first_region() {
        let mut storage = [0u8; 8];
        let mut ring = MultiRing::new(split_regions(&mut storage, &[4, 4])).unwrap();

        ring.set_write_cursor(Cursor::new(1, 2));
        ring.write(b"wxyz");
        assert_eq!(ring.write_cursor(), Cursor::new(0, 2));

        ring.set_read_cursor(Cursor::new(1, 2));
        assert_eq!(ring.read_byte(), b'w');
        assert_eq!(ring.read_byte(), b'x');
        assert_eq!(ring.read_cursor(), Cursor::ORIGIN);
        assert_eq!(ring.byte_at(Cursor::new(0, 1)), b'z');
    }

    #[test]
    fn test_fill() {
        let mut storage = [0u8; 9];
        let mut ring = MultiRing::new(split_regions(&mut storage, &[2, 7])).unwrap();

        ring.fill(0xaa, 5);
        assert_eq!(ring.write_cursor(), Cursor::new(1, 3));
        drop(ring);
        assert_eq!(storage, [0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0, 0, 0, 0]);
    }

    #[test]
    fn test_distance_same_region() {
        let mut storage = [0u8; 20];
        let ring = MultiRing::new(split_regions(&mut storage, &[10, 10])).unwrap();

        assert_eq!(ring.distance(Cursor::new(0, 2), Cursor::new(0, 7)), 5);
        assert_eq!(ring.distance(Cursor::new(0, 7), Cursor::new(0, 7)), 0);
        // Going backwards inside a region means a trip around the ring
        assert_eq!(ring.distance(Cursor::new(0, 7), Cursor::new(0, 2)), 15);
    }

    #[test]
    fn test_distance_across_regions() {
        let mut storage = [0u8; 30];
        let ring = MultiRing::new(split_regions(&mut storage, &[10, 5, 15])).unwrap();

        assert_eq!(ring.distance(Cursor::new(0, 8), Cursor::new(1, 1)), 3);
        assert_eq!(ring.distance(Cursor::new(0, 8), Cursor::new(2, 4)), 11);
        assert_eq!(ring.distance(Cursor::new(2, 4), Cursor::new(0, 8)), 19);
        assert_eq!(ring.distance(Cursor::new(1, 4), Cursor::new(0, 0)), 16);
    }

    #[test]
    fn test_distance_matches_advance() {
        let mut storage = [0u8; 31];
        let ring = MultiRing::new(split_regions(&mut storage, &[7, 1, 11, 12])).unwrap();

        let start = Cursor::new(2, 5);
        for count in 0..ring.capacity() {
            let end = ring.advance(start, count);
            assert!(ring.is_valid(end));
            assert_eq!(ring.distance(start, end), count);
        }
    }

    #[test]
    fn test_span_and_contiguous() {
        let mut storage = *b"abcdefgh";
        let ring = MultiRing::new(split_regions(&mut storage, &[3, 5])).unwrap();

        assert_eq!(ring.contiguous(Cursor::new(0, 1)), 2);
        assert_eq!(ring.span(Cursor::new(0, 1), 2), b"bc");
        assert_eq!(ring.span(Cursor::new(1, 0), 5), b"defgh");
        assert!(ring.span(Cursor::new(1, 4), 0).is_empty());
        assert_eq!(ring.next_region(Cursor::new(1, 3)), Cursor::ORIGIN);
    }
}
