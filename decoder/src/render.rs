use std::io::Write;

use nbtrace_schema::{NamedTag, NbtError, Result, TagKind, Value};

use crate::format::Line;

/// Writes the trace of an in-memory tag tree. The output is byte-for-byte
/// what [trace_root](crate::trace::trace_root) writes for the encoded tag.
pub fn render_tree<W: Write + ?Sized>(tag: &NamedTag, out: &mut W) -> Result<()> {
    render_value(0, name_of(tag), &tag.value, out)?;
    out.flush().map_err(NbtError::Output)
}

fn name_of(tag: &NamedTag) -> Option<&[u8]> {
    tag.name.as_ref().map(|name| name.as_slice())
}

fn render_value<W: Write + ?Sized>(
    depth: usize,
    name: Option<&[u8]>,
    value: &Value,
    out: &mut W,
) -> Result<()> {
    let mut line = Line::new(depth, value.kind());
    if let Some(name) = name {
        line.name(name);
    }

    match *value {
        Value::Byte(v) => line.byte(v),
        Value::Short(v) => line.short(v),
        Value::Int(v) => line.int(v),
        Value::Long(v) => line.long(v),
        Value::Float(v) => line.float(v),
        Value::Double(v) => line.double(v),
        Value::ByteArray(ref values) => {
            line.open_array();
            for v in values {
                line.hex_item(*v, 2);
            }
            line.close_array();
        }
        Value::String(ref text) => line.string(text),
        Value::List(_, ref values) => {
            line.entries(values.len() as i32);
            line.finish(out)?;
            for v in values {
                render_value(depth + 1, None, v, out)?;
            }
            return Ok(());
        }
        Value::HollowList(element, count) => {
            line.entries(count);
            line.finish(out)?;
            if element == TagKind::End {
                for _ in 0..count {
                    Line::end(depth + 1).finish(out)?;
                }
            }
            return Ok(());
        }
        Value::Compound(ref children) => {
            line.finish(out)?;
            for child in children {
                render_value(depth + 1, name_of(child), &child.value, out)?;
            }
            return Line::end(depth + 1).finish(out);
        }
        Value::IntArray(ref values) => {
            line.open_array();
            for v in values {
                line.hex_item(*v, 8);
            }
            line.close_array();
        }
        Value::LongArray(ref values) => {
            line.open_array();
            for v in values {
                line.hex_item(*v, 16);
            }
            line.close_array();
        }
    }

    line.finish(out)
}
