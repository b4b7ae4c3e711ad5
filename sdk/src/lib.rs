//! nbtrace
//!
//! This crate dumps NBT-encoded data as an indented text trace.
//!
//! - [dump] streams any reader through a 64 KiB window into any writer
//! - [decode_tree] reads a root tag into memory instead
//! - everything else is re-exported from `nbtrace-schema` and `nbtrace-decoder`

use std::io::{Read, Write};

pub use nbtrace_decoder::{render_tree, trace_root, Summary};
pub use nbtrace_schema::{
    NamedTag, NbtError, Result, TagKind, Value, WindowBuffer, DEFAULT_CAPACITY,
};

/// Decode one root tag from `reader` and write its trace to `writer`.
pub fn dump<R: Read, W: Write + ?Sized>(reader: R, writer: &mut W) -> Result<Summary> {
    let mut bb = WindowBuffer::new(reader);
    trace_root(&mut bb, writer)
}

/// Decode one root tag from `bytes` into a string. Names and strings that are
/// not valid UTF-8 are converted lossily.
pub fn dump_to_string(bytes: &[u8]) -> Result<String> {
    let mut out = Vec::new();
    dump(bytes, &mut out)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Decode one root tag from `bytes` into memory. `None` means the data starts
/// with an End tag.
pub fn decode_tree(bytes: &[u8]) -> Result<Option<NamedTag>> {
    nbtrace_schema::read_root(&mut WindowBuffer::new(bytes))
}

pub mod error {
    pub use nbtrace_schema::error::{NbtError, Result};
}

pub mod schema {
    pub use nbtrace_schema::{NamedTag, TagKind, Value};
}
