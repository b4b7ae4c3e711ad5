use std::fmt::{self, LowerHex};
use std::io::Write;

use nbtrace_schema::{NbtError, Result, TagKind};

/// One line of trace output, built completely before anything reaches the
/// sink so a node that fails half way through leaves no partial line behind.
///
/// ```
/// use nbtrace_decoder::format::Line;
/// use nbtrace_schema::TagKind;
///
/// let mut line = Line::new(1, TagKind::Int);
/// line.name(b"x");
/// line.int(5);
/// assert_eq!(line.as_bytes(), b"\tTAG_Int(\"x\"): 5 (0x00000005)");
/// ```
pub struct Line {
    buf: Vec<u8>,
    items: usize,
}

impl Line {
    /// Starts a line with `depth` tabs and the label for `kind`.
    pub fn new(depth: usize, kind: TagKind) -> Line {
        let mut buf = vec![b'\t'; depth];
        buf.extend_from_slice(kind.label().as_bytes());
        Line { buf, items: 0 }
    }

    /// The marker closing a compound, one level shallower than its children.
    pub fn end(depth: usize) -> Line {
        Line::new(depth.saturating_sub(1), TagKind::End)
    }

    /// Appends `("name")`. The name bytes are copied as-is.
    pub fn name(&mut self, name: &[u8]) {
        self.buf.extend_from_slice(b"(\"");
        self.buf.extend_from_slice(name);
        self.buf.extend_from_slice(b"\")");
    }

    pub fn byte(&mut self, value: i8) {
        self.push_fmt(format_args!(": {} (0x{:02x})", value, value as u8));
    }

    pub fn short(&mut self, value: i16) {
        self.push_fmt(format_args!(": {} (0x{:04x})", value, value));
    }

    pub fn int(&mut self, value: i32) {
        self.push_fmt(format_args!(": {} (0x{:08x})", value, value));
    }

    pub fn long(&mut self, value: i64) {
        self.push_fmt(format_args!(": {} (0x{:016x})", value, value));
    }

    pub fn float(&mut self, value: f32) {
        self.real(value.into(), value.is_nan() && value.is_sign_negative());
        self.push_fmt(format_args!(" (0x{:08x})", value.to_bits()));
    }

    pub fn double(&mut self, value: f64) {
        self.real(value, value.is_nan() && value.is_sign_negative());
        self.push_fmt(format_args!(" (0x{:016x})", value.to_bits()));
    }

    /// Appends `: "text"` with the text bytes untouched.
    pub fn string(&mut self, text: &[u8]) {
        self.buf.extend_from_slice(b": \"");
        self.buf.extend_from_slice(text);
        self.buf.push(b'"');
    }

    /// Appends the entry count shown on a list header, exactly as declared.
    pub fn entries(&mut self, count: i32) {
        self.push_fmt(format_args!(" {} entries", count));
    }

    pub fn open_array(&mut self) {
        self.buf.extend_from_slice(b": [");
        self.items = 0;
    }

    /// Appends one array element as zero-padded hex, `width` digits wide.
    pub fn hex_item(&mut self, value: impl LowerHex, width: usize) {
        if self.items > 0 {
            self.buf.extend_from_slice(b", ");
        }
        self.items += 1;
        self.push_fmt(format_args!("0x{:0width$x}", value, width = width));
    }

    pub fn close_array(&mut self) {
        self.buf.push(b']');
    }

    /// The line so far, without the trailing newline.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Terminates the line and writes it to `out` in one call.
    pub fn finish<W: Write + ?Sized>(mut self, out: &mut W) -> Result<()> {
        self.buf.push(b'\n');
        out.write_all(&self.buf).map_err(NbtError::Output)
    }

    // Two fraction digits, with NaN spelled `nan` or `-nan` like C's printf.
    fn real(&mut self, value: f64, negative_nan: bool) {
        if value.is_nan() {
            let text = if negative_nan { ": -nan" } else { ": nan" };
            self.buf.extend_from_slice(text.as_bytes());
        } else {
            self.push_fmt(format_args!(": {:.2}", value));
        }
    }

    fn push_fmt(&mut self, args: fmt::Arguments) {
        // Writing into a Vec cannot fail.
        let _ = self.buf.write_fmt(args);
    }
}
