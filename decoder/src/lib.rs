//! nbtrace-decoder
//!
//! This crate implements:
//!  1) `trace_root`: a single-pass decoder that writes the text trace of one
//!     root tag straight from the streaming window, without building a tree,
//!  2) `render_tree`: the same trace for an already decoded [NamedTag],
//!  3) the shared line formatting both of them use.
//!
//! [NamedTag]: nbtrace_schema::NamedTag

pub mod format;
pub mod render;
pub mod trace;

pub use render::render_tree;
pub use trace::{trace_root, Summary};

pub mod error {
    pub use nbtrace_schema::error::{NbtError, Result};
}
