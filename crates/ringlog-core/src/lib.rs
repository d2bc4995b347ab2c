//! # Ringlog Core
//!
//! Fixed-capacity, append-only object log for memory-constrained systems.
//!
//! Storage is handed over once as one buffer or as a list of disjoint
//! regions; the log never allocates object storage of its own. When the
//! storage runs full, the oldest objects are dropped to make room.
//!
//! ## Layers
//!
//! - **Scatter lists** ([`scatter`]): ordered byte spans terminated by the
//!   first empty span
//! - **Multiring** ([`multiring`]): one circular address space over several
//!   regions, addressed by [`Cursor`] values
//! - **Object log** ([`object_log`]): length-prefixed fragments, FIFO
//!   eviction and fragment iteration
//!
//! ## Example
//!
//! ```
//! use ringlog_core::ObjectLog;
//!
//! let mut storage0 = [0u8; 100];
//! let mut storage1 = [0u8; 150];
//! let mut log = ObjectLog::new_fragmented([&mut storage0[..], &mut storage1[..]]).unwrap();
//!
//! log.write_string("Hello World!").unwrap();
//! assert_eq!(log.get_size(0).unwrap(), 12);
//!
//! let err = log.write_object(&[0u8; 300]).unwrap_err();
//! assert!(err.deficit().unwrap() > 0);
//! ```
//!
//! ## Thread Safety
//!
//! An [`ObjectLog`] is plain single-owner state. Writes need `&mut`, reads
//! need `&`; share it between threads behind a `Mutex`.

pub mod error;
pub mod fragment;
pub mod multiring;
pub mod object_log;
pub mod scatter;

pub use error::{LogError, RingError};
pub use fragment::{FragmentHeader, MAX_FRAGMENT_LEN};
pub use multiring::{Cursor, MultiRing};
pub use object_log::{Fragments, ObjectIter, ObjectLog, Objects};
pub use scatter::{ScatterList, ScatterReader};
