//! Log integrity walk
//!
//! Follows the fragment chain from the oldest object the same way a reader
//! would and confirms it lines up with the log's own bookkeeping: the
//! advertised number of objects ends exactly at the write position and no
//! fragment runs past the end of its region.

use ringlog_core::fragment::FragmentHeader;
use ringlog_core::{Cursor, MultiRing, ObjectLog};
use thiserror::Error;
use tracing::trace;

/// Ways the stored fragment chain can disagree with the log state
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrityError {
    /// A header claims more bytes than its region has left
    #[error("fragment at {at} with {len} payload bytes crosses the end of its region")]
    FragmentCrossesRegion { at: Cursor, len: usize },

    /// The walk used up the whole capacity before finding enough objects
    #[error("object {index} still open after walking the whole capacity")]
    Overrun { index: usize },

    /// The last object does not end where the next write will start
    #[error("walk ended at {found} but the log ends at {expected}")]
    EndMismatch { found: Cursor, expected: Cursor },
}

/// Totals collected during a successful walk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntegrityReport {
    pub objects: usize,
    pub fragments: usize,
    /// Object bytes, headers excluded
    pub payload_bytes: usize,
    /// Object bytes plus one byte per header
    pub stored_bytes: usize,
}

/// Walk every live object of `log`
pub fn check_integrity(log: &ObjectLog<'_>) -> Result<IntegrityReport, IntegrityError> {
    check_records(log.ring(), log.first_cursor(), log.len(), log.end_cursor())
}

/// Walk `count` objects in `ring` starting at `first` and expect the
/// chain to finish at `end`.
pub fn check_records(
    ring: &MultiRing<'_>,
    first: Cursor,
    count: usize,
    end: Cursor,
) -> Result<IntegrityReport, IntegrityError> {
    let mut report = IntegrityReport::default();
    let mut cursor = first;

    for index in 0..count {
        loop {
            if report.stored_bytes >= ring.capacity() {
                return Err(IntegrityError::Overrun { index });
            }

            let header = FragmentHeader::from(ring.byte_at(cursor));
            if ring.contiguous(cursor) < header.encoded_len() {
                return Err(IntegrityError::FragmentCrossesRegion {
                    at: cursor,
                    len: header.payload_len(),
                });
            }

            report.fragments += 1;
            report.payload_bytes += header.payload_len();
            report.stored_bytes += header.encoded_len();
            cursor = ring.advance(cursor, header.encoded_len());

            if header.is_final() {
                break;
            }
        }
        report.objects += 1;
    }

    if count > 0 && cursor != end {
        return Err(IntegrityError::EndMismatch {
            found: cursor,
            expected: end,
        });
    }

    trace!(
        objects = report.objects,
        fragments = report.fragments,
        stored = report.stored_bytes,
        "Integrity walk passed"
    );
    Ok(report)
}
