//! # Object Log
//!
//! Append-only log of variable-length objects on top of a [`MultiRing`].
//! Every object is stored as a chain of fragments (see [`crate::fragment`])
//! that never straddle a region boundary, so each fragment can be handed out
//! as a single borrowed slice.
//!
//! When a new object does not fit into the free space, the oldest objects are
//! dropped until it does. The survivors are therefore always the most recent
//! objects, in write order.
//!
//! ## Example
//!
//! ```
//! use ringlog_core::ObjectLog;
//!
//! let mut storage = [0u8; 256];
//! let mut log = ObjectLog::new(&mut storage).unwrap();
//!
//! log.write_string("Hello World!").unwrap();
//! log.write_scattered_object(&[b"scattered ", b"object"]).unwrap();
//!
//! assert_eq!(log.len(), 2);
//! assert_eq!(log.get_size(-1).unwrap(), 16);
//!
//! let mut iter = log.iterator(0);
//! let mut object = Vec::new();
//! while let Some(fragment) = log.get_fragment(&iter) {
//!     object.extend_from_slice(fragment);
//!     log.next(&mut iter);
//! }
//! assert_eq!(object, b"Hello World!");
//! ```

use std::fmt;

use tracing::{debug, trace};

use crate::error::LogError;
use crate::fragment::{fragments_for, FragmentHeader, MAX_FRAGMENT_LEN};
use crate::multiring::{Cursor, MultiRing};
use crate::scatter::ScatterList;

/// Position of a fragment inside an [`ObjectLog`].
///
/// Obtained from [`ObjectLog::iterator`] and moved forward with
/// [`ObjectLog::next`]. An exhausted iterator yields no further fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ObjectIter {
    position: Option<Cursor>,
}

impl ObjectIter {
    fn at(cursor: Cursor) -> Self {
        Self {
            position: Some(cursor),
        }
    }

    fn exhausted() -> Self {
        Self { position: None }
    }

    /// Whether the iterator has run past the final fragment, or never
    /// pointed at an object in the first place
    pub fn is_exhausted(&self) -> bool {
        self.position.is_none()
    }

    /// Header position of the current fragment
    pub fn position(&self) -> Option<Cursor> {
        self.position
    }
}

/// FIFO log of objects stored in caller-supplied memory
pub struct ObjectLog<'a> {
    ring: MultiRing<'a>,
    /// Header of the oldest live object
    first: Cursor,
    /// Header of the newest live object
    last: Cursor,
    entries: usize,
}

impl<'a> ObjectLog<'a> {
    /// Create a log over a single contiguous buffer
    pub fn new(storage: &'a mut [u8]) -> Result<Self, LogError> {
        Self::new_fragmented([storage])
    }

    /// Create a log over several regions, used in list order.
    ///
    /// The first empty region terminates the list. All storage is zeroed.
    pub fn new_fragmented<I>(regions: I) -> Result<Self, LogError>
    where
        I: IntoIterator<Item = &'a mut [u8]>,
    {
        let mut ring = MultiRing::new(regions)?;
        // A full lap leaves the write cursor back at the origin
        let capacity = ring.capacity();
        ring.fill(0, capacity);

        debug!(
            capacity = capacity,
            regions = ring.region_count(),
            "Created object log"
        );

        Ok(Self {
            ring,
            first: Cursor::ORIGIN,
            last: Cursor::ORIGIN,
            entries: 0,
        })
    }

    /// Number of live objects
    pub fn len(&self) -> usize {
        self.entries
    }

    /// Whether the log holds no objects
    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    /// Usable bytes across all regions
    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }

    /// Bytes occupied by live objects, headers included
    pub fn used(&self) -> usize {
        if self.entries == 0 {
            return 0;
        }
        match self.ring.distance(self.first, self.end_cursor()) {
            // Non-empty and the end caught up with the start: completely full
            0 => self.ring.capacity(),
            used => used,
        }
    }

    /// Bytes available before the oldest object would be overwritten
    pub fn free_space(&self) -> usize {
        self.ring.capacity() - self.used()
    }

    /// Header of the oldest live object
    pub fn first_cursor(&self) -> Cursor {
        self.first
    }

    /// Header of the most recently written object
    pub fn last_cursor(&self) -> Cursor {
        self.last
    }

    /// Position the next object will be written to
    pub fn end_cursor(&self) -> Cursor {
        self.ring.write_cursor()
    }

    /// The underlying multiring
    pub fn ring(&self) -> &MultiRing<'a> {
        &self.ring
    }

    /// Append an object made of a contiguous buffer
    pub fn write_object(&mut self, data: &[u8]) -> Result<(), LogError> {
        self.write_scattered_object(&[data])
    }

    /// Append the bytes of a string, without any terminator
    pub fn write_string(&mut self, s: &str) -> Result<(), LogError> {
        self.write_object(s.as_bytes())
    }

    /// Append one object assembled from several buffers.
    ///
    /// The object is the concatenation of `parts` up to the first empty part.
    /// Oldest objects are evicted until it fits.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::InsufficientCapacity`] if the object cannot fit
    /// even into an empty log. The log is left untouched in that case and
    /// [`LogError::deficit`] tells how many bytes are missing.
    pub fn write_scattered_object(&mut self, parts: &[&[u8]]) -> Result<(), LogError> {
        let data = ScatterList::new(parts);
        let data_len = data.total_len();

        // Every region boundary the object crosses may cost one more header
        let required = data_len + fragments_for(data_len) + self.ring.region_count();
        let capacity = self.ring.capacity();
        if required > capacity {
            debug!(
                required = required,
                capacity = capacity,
                "Object does not fit into log"
            );
            return Err(LogError::insufficient_capacity(required, capacity));
        }

        let mut evicted = 0usize;
        while self.free_space() < required && self.entries > 0 {
            self.drop_first();
            evicted += 1;
        }

        let header = self.ring.write_cursor();
        self.emit_fragments(data, data_len);

        if self.entries == 0 {
            self.first = header;
        }
        self.last = header;
        self.entries += 1;

        trace!(
            len = data_len,
            at = %header,
            evicted = evicted,
            entries = self.entries,
            "Committed object"
        );
        Ok(())
    }

    /// Iterator over the fragments of object `index`.
    ///
    /// Non-negative indices count from the oldest object (0), negative ones
    /// from the newest (-1). Out-of-range indices give an exhausted iterator.
    pub fn iterator(&self, index: isize) -> ObjectIter {
        let Some(position) = self.resolve_index(index) else {
            return ObjectIter::exhausted();
        };

        let mut cursor = self.first;
        for _ in 0..position {
            cursor = self.next_record_boundary(cursor);
        }
        ObjectIter::at(cursor)
    }

    /// Payload of the fragment the iterator points at.
    ///
    /// Returns `None` for an exhausted iterator. Calling this repeatedly
    /// without [`next`](Self::next) returns the same slice.
    pub fn get_fragment(&self, iter: &ObjectIter) -> Option<&[u8]> {
        let cursor = iter.position?;
        let header = FragmentHeader::from(self.ring.byte_at(cursor));
        let payload = self.ring.advance(cursor, 1);
        Some(self.ring.span(payload, header.payload_len()))
    }

    /// Move the iterator to the next fragment of the same object
    pub fn next(&self, iter: &mut ObjectIter) {
        let Some(cursor) = iter.position else {
            return;
        };

        let header = FragmentHeader::from(self.ring.byte_at(cursor));
        iter.position = if header.is_final() {
            None
        } else {
            Some(self.ring.advance(cursor, header.encoded_len()))
        };
    }

    /// Size in bytes of object `index`
    pub fn get_size(&self, index: isize) -> Result<usize, LogError> {
        let mut iter = self.iterator(index);
        if iter.is_exhausted() {
            return Err(LogError::index_out_of_range(index, self.entries));
        }

        let mut size = 0;
        while let Some(fragment) = self.get_fragment(&iter) {
            size += fragment.len();
            self.next(&mut iter);
        }
        Ok(size)
    }

    /// Fragments of object `index` as an iterator of slices
    pub fn fragments(&self, index: isize) -> Fragments<'_, 'a> {
        Fragments {
            log: self,
            iter: self.iterator(index),
        }
    }

    /// Append the bytes of object `index` to `out`, returning its size
    pub fn read_object(&self, index: isize, out: &mut Vec<u8>) -> Result<usize, LogError> {
        let size = self.get_size(index)?;
        out.reserve(size);
        for fragment in self.fragments(index) {
            out.extend_from_slice(fragment);
        }
        Ok(size)
    }

    /// All live objects, oldest first
    pub fn objects(&self) -> Objects<'_, 'a> {
        Objects {
            log: self,
            cursor: self.first,
            remaining: self.entries,
        }
    }

    fn resolve_index(&self, index: isize) -> Option<usize> {
        if index < 0 {
            let back = index.unsigned_abs();
            (back <= self.entries).then(|| self.entries - back)
        } else {
            let index = index as usize;
            (index < self.entries).then_some(index)
        }
    }

    /// Header of the object following the one at `cursor`.
    ///
    /// For the newest object this is the end cursor.
    fn next_record_boundary(&self, mut cursor: Cursor) -> Cursor {
        // A well-formed object never spans more than the whole ring
        let mut consumed = 0;
        while consumed < self.ring.capacity() {
            let header = FragmentHeader::from(self.ring.byte_at(cursor));
            cursor = self.ring.advance(cursor, header.encoded_len());
            consumed += header.encoded_len();
            if header.is_final() {
                break;
            }
        }
        cursor
    }

    fn drop_first(&mut self) {
        let dropped = self.first;
        self.first = self.next_record_boundary(dropped);
        self.entries -= 1;
        trace!(at = %dropped, entries = self.entries, "Evicted oldest object");
    }

    fn emit_fragments(&mut self, data: ScatterList<'_, '_>, mut remaining: usize) {
        let mut reader = data.reader();
        loop {
            // Header and payload must share a region
            let room = self.ring.contiguous(self.ring.write_cursor()) - 1;
            let len = remaining.min(MAX_FRAGMENT_LEN).min(room);
            let last = len == remaining;
            self.ring.write_byte(FragmentHeader::new(len, last).into());

            let mut left = len;
            while left > 0 {
                let chunk = reader.take(left);
                self.ring.write(chunk);
                left -= chunk.len();
            }

            remaining -= len;
            if last {
                break;
            }
        }
    }
}

impl fmt::Debug for ObjectLog<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectLog")
            .field("ring", &self.ring)
            .field("first", &self.first)
            .field("last", &self.last)
            .field("entries", &self.entries)
            .finish()
    }
}

/// Fragments of one object, see [`ObjectLog::fragments`]
pub struct Fragments<'l, 'a> {
    log: &'l ObjectLog<'a>,
    iter: ObjectIter,
}

impl<'l> Iterator for Fragments<'l, '_> {
    type Item = &'l [u8];

    fn next(&mut self) -> Option<Self::Item> {
        let fragment = self.log.get_fragment(&self.iter)?;
        self.log.next(&mut self.iter);
        Some(fragment)
    }
}

/// Live objects oldest first, see [`ObjectLog::objects`]
pub struct Objects<'l, 'a> {
    log: &'l ObjectLog<'a>,
    cursor: Cursor,
    remaining: usize,
}

impl<'l, 'a> Iterator for Objects<'l, 'a> {
    type Item = Fragments<'l, 'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let fragments = Fragments {
            log: self.log,
            iter: ObjectIter::at(self.cursor),
        };
        self.cursor = self.log.next_record_boundary(self.cursor);
        self.remaining -= 1;
        Some(fragments)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Objects<'_, '_> {}
