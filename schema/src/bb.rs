use std::io::{ErrorKind, Read};

use log::trace;

use crate::error::{NbtError, Result};
use crate::tag::TagKind;

/// 64 KiB. The largest single extraction the format asks for is a name or
/// string with a 16-bit length, so every atomic payload fits in one window.
pub const DEFAULT_CAPACITY: usize = 64 * 1024;

/// Smallest window that still fits a 64-bit integer.
pub const MIN_CAPACITY: usize = 8;

/// A fixed-size window over a byte stream meant for reading.
///
/// The window refills itself from the source on demand, so the stream can be
/// arbitrarily long while memory stays bounded by the capacity.
///
/// Example usage:
///
/// ```
/// let bytes: &[u8] = &[0x00, 0x2a, 0xff, 0xff, 0xff, 0xfe];
/// let mut bb = nbtrace_schema::WindowBuffer::new(bytes);
/// assert_eq!(bb.read_i16().unwrap(), 42);
/// assert_eq!(bb.read_i32().unwrap(), -2);
/// assert_eq!(bb.consumed(), 6);
/// ```
///
pub struct WindowBuffer<R> {
    source: R,
    region: Box<[u8]>,
    // First byte not yet populated with valid data.
    limit: usize,
    // Next byte to hand out. Always <= limit.
    cursor: usize,
    // Bytes handed out so far. The source may have been read further ahead.
    consumed: u64,
}

impl<R: Read> WindowBuffer<R> {
    /// Create a new WindowBuffer with the default 64 KiB window.
    pub fn new(source: R) -> WindowBuffer<R> {
        WindowBuffer::with_capacity(source, DEFAULT_CAPACITY)
    }

    /// Create a new WindowBuffer whose window holds `capacity` bytes. Values
    /// below [MIN_CAPACITY] are raised to it.
    pub fn with_capacity(source: R, capacity: usize) -> WindowBuffer<R> {
        WindowBuffer {
            source,
            region: vec![0; capacity.max(MIN_CAPACITY)].into_boxed_slice(),
            limit: 0,
            cursor: 0,
            consumed: 0,
        }
    }

    /// The fixed size of the window.
    pub fn capacity(&self) -> usize {
        self.region.len()
    }

    /// Bytes already resident in the window and not yet consumed.
    pub fn available(&self) -> usize {
        self.limit - self.cursor
    }

    /// Total bytes consumed so far. This starts off as 0 and never decreases.
    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    /// Gives back the byte source. Bytes read ahead into the window are lost.
    pub fn into_inner(self) -> R {
        self.source
    }

    /// Guarantees the next `size` bytes are resident in the window, pulling
    /// from the source as many times as it takes.
    pub fn ensure_available(&mut self, size: usize) -> Result<()> {
        if size > self.capacity() {
            return Err(NbtError::RequestExceedsCapacity {
                requested: size,
                capacity:  self.capacity(),
            });
        }

        while self.available() < size {
            self.compact();
            if self.fill()? == 0 {
                return Err(NbtError::UnexpectedEndOfStream {
                    needed:    size,
                    available: self.available(),
                });
            }
        }

        Ok(())
    }

    /// Skips over the next `size` bytes, considering them consumed.
    pub fn skip(&mut self, size: usize) -> Result<()> {
        self.ensure_available(size)?;
        self.advance(size);
        Ok(())
    }

    /// Borrows the next `len` bytes straight out of the window and considers
    /// them consumed. The slice is only valid until the next read.
    pub fn read_bytes(&mut self, len: usize) -> Result<&[u8]> {
        self.skip(len)?;
        Ok(&self.region[self.cursor - len..self.cursor])
    }

    /// Read a single unsigned byte.
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    /// Read a single signed byte.
    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(i8::from_be_bytes(self.read_array()?))
    }

    /// Read a 2-byte big-endian signed integer.
    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(i16::from_be_bytes(self.read_array()?))
    }

    /// Read a 2-byte big-endian length. The wire stores it as a signed short
    /// but the value is always meant as an unsigned count.
    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(self.read_i16()? as u16)
    }

    /// Read a 4-byte big-endian signed integer.
    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(i32::from_be_bytes(self.read_array()?))
    }

    /// Read an 8-byte big-endian signed integer.
    pub fn read_i64(&mut self) -> Result<i64> {
        Ok(i64::from_be_bytes(self.read_array()?))
    }

    /// Read 4 bytes and reinterpret them bit for bit as an IEEE-754 single.
    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(f32::from_bits(self.read_i32()? as u32))
    }

    /// Read 8 bytes and reinterpret them bit for bit as an IEEE-754 double.
    pub fn read_f64(&mut self) -> Result<f64> {
        Ok(f64::from_bits(self.read_i64()? as u64))
    }

    /// Read a tag discriminant.
    pub fn read_kind(&mut self) -> Result<TagKind> {
        TagKind::try_from(self.read_u8()?)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        self.ensure_available(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.region[self.cursor..self.cursor + N]);
        self.advance(N);
        Ok(out)
    }

    fn advance(&mut self, size: usize) {
        self.cursor += size;
        self.consumed += size as u64;
    }

    // Move the unread tail to the front so the free space is contiguous.
    fn compact(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let pending = self.available();
        trace!("compacting window: moving {} unread bytes from offset {}", pending, self.cursor);
        self.region.copy_within(self.cursor..self.limit, 0);
        self.limit = pending;
        self.cursor = 0;
    }

    // One read into the free tail of the window.
    fn fill(&mut self) -> Result<usize> {
        loop {
            match self.source.read(&mut self.region[self.limit..]) {
                Ok(count) => {
                    let resident = self.limit + count;
                    trace!("refilled window with {} bytes ({} resident)", count, resident);
                    self.limit += count;
                    return Ok(count);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(NbtError::SourceReadFailure(e)),
            }
        }
    }
}

/// A big-endian byte buffer meant for writing test fixtures. Only built for
/// tests and with the `test-util` feature.
#[cfg(any(test, feature = "test-util"))]
#[derive(Default)]
pub struct ByteBufferMut {
    data: Vec<u8>,
}

#[cfg(any(test, feature = "test-util"))]
impl ByteBufferMut {
    /// Creates an empty ByteBufferMut ready for writing.
    pub fn new() -> ByteBufferMut {
        ByteBufferMut { data: vec![] }
    }

    /// Consumes this buffer and returns the underlying backing store.
    pub fn data(self) -> Vec<u8> {
        self.data
    }

    /// Returns the number of bytes written so far.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn write_u8(&mut self, value: u8) {
        self.data.push(value);
    }

    pub fn write_i8(&mut self, value: i8) {
        self.data.push(value as u8);
    }

    pub fn write_bytes(&mut self, value: &[u8]) {
        self.data.extend_from_slice(value);
    }

    pub fn write_i16(&mut self, value: i16) {
        self.data.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_i32(&mut self, value: i32) {
        self.data.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_i64(&mut self, value: i64) {
        self.data.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_f32(&mut self, value: f32) {
        self.data.extend_from_slice(&value.to_bits().to_be_bytes());
    }

    pub fn write_f64(&mut self, value: f64) {
        self.data.extend_from_slice(&value.to_bits().to_be_bytes());
    }

    /// Write a 16-bit length followed by the raw bytes.
    pub fn write_string(&mut self, value: &str) {
        self.write_raw_string(value.as_bytes());
    }

    pub fn write_raw_string(&mut self, value: &[u8]) {
        self.write_i16(value.len() as u16 as i16);
        self.data.extend_from_slice(value);
    }

    /// Write a tag header: discriminant, then the name if there is one.
    pub fn write_header(&mut self, kind: TagKind, name: Option<&str>) {
        self.write_u8(kind as u8);
        if let Some(name) = name {
            self.write_string(name);
        }
    }
}
