//! Raw storage dumps

use std::fmt::Write;

/// Bytes printed per line
pub const BYTES_PER_LINE: usize = 32;

/// Format `data` as two-digit hex bytes, 32 per line.
///
/// Every byte is followed by a space and the dump always ends with a newline.
pub fn hexdump(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len() * 3 + data.len() / BYTES_PER_LINE + 1);
    for (i, byte) in data.iter().enumerate() {
        let _ = write!(out, "{byte:02x} ");
        if (i + 1) % BYTES_PER_LINE == 0 {
            out.push('\n');
        }
    }
    out.push('\n');
    out
}
