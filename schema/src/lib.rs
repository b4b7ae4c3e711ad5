//! This is a Rust library with the low-level pieces for reading the NBT
//! binary tag format: a bounded streaming window over any [std::io::Read],
//! the tag kinds, and an optional in-memory tag tree.
//!
//! ```
//! use nbtrace_schema::*;
//!
//! let bytes: &[u8] = &[0x0a, 0x00, 0x00, 0x01, 0x00, 0x01, b'x', 0x05, 0x00];
//! let mut bb = WindowBuffer::new(bytes);
//! let root = read_root(&mut bb).unwrap().unwrap();
//! assert_eq!(root.value.get("x"), Some(&Value::Byte(5)));
//! assert_eq!(bb.consumed(), 9);
//! ```

pub mod bb;
pub mod error;
pub mod tag;
pub mod value;

pub use bb::*;
pub use error::{NbtError, Result};
pub use tag::{TagKind, MAX_DEPTH};
pub use value::*;
