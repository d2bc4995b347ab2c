//! Fragment framing
//!
//! ```text
//! [header:1][payload:0..=127]
//!
//! header bit 7:    final fragment of the object
//! header bits 0-6: payload length
//! ```
//!
//! An object is stored as one or more fragments. Nothing separates two
//! objects besides the final flag, so scanning from the first header of an
//! object and following the lengths up to a final header lands on the first
//! header of the next object.

/// Largest payload a single fragment can carry
pub const MAX_FRAGMENT_LEN: usize = 0x7f;

/// Header flag marking the last fragment of an object
pub const FRAGMENT_FINAL: u8 = 0x80;

/// One-byte fragment header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FragmentHeader(u8);

impl FragmentHeader {
    /// Create a header for a payload of `len` bytes
    pub fn new(len: usize, last: bool) -> Self {
        debug_assert!(len <= MAX_FRAGMENT_LEN, "fragment payload of {len} bytes");
        let mut header = (len & MAX_FRAGMENT_LEN) as u8;
        if last {
            header |= FRAGMENT_FINAL;
        }
        Self(header)
    }

    /// Payload length following this header
    pub fn payload_len(self) -> usize {
        (self.0 as usize) & MAX_FRAGMENT_LEN
    }

    /// Whether this is the last fragment of its object
    pub fn is_final(self) -> bool {
        self.0 & FRAGMENT_FINAL != 0
    }

    /// Header plus payload size in bytes
    pub fn encoded_len(self) -> usize {
        1 + self.payload_len()
    }
}

impl From<u8> for FragmentHeader {
    fn from(byte: u8) -> Self {
        Self(byte)
    }
}

impl From<FragmentHeader> for u8 {
    fn from(header: FragmentHeader) -> Self {
        header.0
    }
}

/// Number of fragments an object of `len` bytes needs when no region
/// boundary interrupts it. An empty object still takes one header.
pub fn fragments_for(len: usize) -> usize {
    len.div_ceil(MAX_FRAGMENT_LEN).max(1)
}
