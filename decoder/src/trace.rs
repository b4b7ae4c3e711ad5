use std::io::{Read, Write};

use log::debug;
use nbtrace_schema::{NbtError, Result, TagKind, WindowBuffer, MAX_DEPTH};

use crate::format::Line;

/// What a finished decode reports back to its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    /// Kind of the outermost tag. [TagKind::End] means the structure was empty.
    pub root: TagKind,
    /// Bytes consumed from the window for this root tag and all its children.
    pub consumed: u64,
}

/// Decodes one root tag from `bb` and writes its trace to `out` in a single
/// pass, without building a tree.
///
/// The root is always read as a named tag. A leading End tag is an empty
/// structure: nothing is written and the summary reports `TagKind::End`.
/// On error, lines already written for earlier nodes stay in `out`.
pub fn trace_root<R, W>(bb: &mut WindowBuffer<R>, out: &mut W) -> Result<Summary>
where
    R: Read,
    W: Write + ?Sized,
{
    let start = bb.consumed();
    debug!("tracing root tag at offset {}", start);

    let root = Tracer { bb: &mut *bb, out: &mut *out }.parse_one(0, true)?;
    out.flush().map_err(NbtError::Output)?;

    let consumed = bb.consumed() - start;
    debug!("traced {} root, {} bytes consumed", root, consumed);
    Ok(Summary { root, consumed })
}

struct Tracer<'a, R, W: ?Sized> {
    bb: &'a mut WindowBuffer<R>,
    out: &'a mut W,
}

impl<R: Read, W: Write + ?Sized> Tracer<'_, R, W> {
    // Reads a discriminant and processes the tag it starts.
    fn parse_one(&mut self, depth: usize, named: bool) -> Result<TagKind> {
        let kind = self.bb.read_kind()?;
        self.process(depth, kind, named)?;
        Ok(kind)
    }

    fn process(&mut self, depth: usize, kind: TagKind, named: bool) -> Result<()> {
        let mut line = Line::new(depth, kind);
        if kind != TagKind::End {
            if depth > MAX_DEPTH {
                return Err(NbtError::DepthLimitExceeded(MAX_DEPTH));
            }
            if named {
                let len = self.bb.read_u16()? as usize;
                line.name(self.bb.read_bytes(len)?);
            }
        }

        match kind {
            TagKind::End => {
                // An End at the root is the whole (empty) structure, not a closer.
                if depth == 0 {
                    return Ok(());
                }
                line = Line::end(depth);
            }
            TagKind::Byte => line.byte(self.bb.read_i8()?),
            TagKind::Short => line.short(self.bb.read_i16()?),
            TagKind::Int => line.int(self.bb.read_i32()?),
            TagKind::Long => line.long(self.bb.read_i64()?),
            TagKind::Float => line.float(self.bb.read_f32()?),
            TagKind::Double => line.double(self.bb.read_f64()?),
            TagKind::ByteArray => {
                let count = self.bb.read_i32()?;
                line.open_array();
                for _ in 0..count {
                    line.hex_item(self.bb.read_u8()?, 2);
                }
                line.close_array();
            }
            TagKind::String => {
                let len = self.bb.read_u16()? as usize;
                line.string(self.bb.read_bytes(len)?);
            }
            TagKind::List => {
                let element = self.bb.read_kind()?;
                let count = self.bb.read_i32()?;
                line.entries(count);
                line.finish(&mut *self.out)?;
                for _ in 0..count {
                    self.process(depth + 1, element, false)?;
                }
                return Ok(());
            }
            TagKind::Compound => {
                line.finish(&mut *self.out)?;
                while self.parse_one(depth + 1, true)? != TagKind::End {}
                return Ok(());
            }
            TagKind::IntArray => {
                let count = self.bb.read_i32()?;
                line.open_array();
                for _ in 0..count {
                    line.hex_item(self.bb.read_i32()?, 8);
                }
                line.close_array();
            }
            TagKind::LongArray => {
                let count = self.bb.read_i32()?;
                line.open_array();
                for _ in 0..count {
                    line.hex_item(self.bb.read_i64()?, 16);
                }
                line.close_array();
            }
        }

        line.finish(&mut *self.out)
    }
}
