use std::fmt;
use std::io::Read;
use std::ops::Index;

use bstr::{BStr, BString, ByteSlice};
use log::debug;

use crate::{
    bb::WindowBuffer,
    error::{NbtError, Result},
    tag::{TagKind, MAX_DEPTH},
};

/// A tag together with the name it was read under. List elements are never
/// named, so they are stored as bare [Value]s instead.
#[derive(Clone, PartialEq)]
pub struct NamedTag {
    pub name: Option<BString>,
    pub value: Value,
}

/// This type holds a decoded NBT payload.
///
/// Names and strings are kept as the raw bytes from the wire. Compound
/// children keep the order they were read in.
#[derive(Clone, PartialEq)]
pub enum Value {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    ByteArray(Vec<u8>),
    String(BString),
    List(TagKind, Vec<Value>),
    /// A list whose declared count has no elements behind it: either the
    /// element kind is End, which has no payload, or the count is negative.
    /// Only the element kind and the count are kept.
    HollowList(TagKind, i32),
    Compound(Vec<NamedTag>),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
}

impl NamedTag {
    pub fn new(name: impl Into<BString>, value: Value) -> NamedTag {
        NamedTag { name: Some(name.into()), value }
    }

    pub fn unnamed(value: Value) -> NamedTag {
        NamedTag { name: None, value }
    }

    /// The name as a byte string, `""` when there is none.
    pub fn name(&self) -> &BStr {
        self.name.as_ref().map_or(b"".as_bstr(), |name| name.as_bstr())
    }
}

impl Value {
    /// The discriminant this value is written with.
    pub fn kind(&self) -> TagKind {
        match *self {
            Value::Byte(_) => TagKind::Byte,
            Value::Short(_) => TagKind::Short,
            Value::Int(_) => TagKind::Int,
            Value::Long(_) => TagKind::Long,
            Value::Float(_) => TagKind::Float,
            Value::Double(_) => TagKind::Double,
            Value::ByteArray(_) => TagKind::ByteArray,
            Value::String(_) => TagKind::String,
            Value::List(..) | Value::HollowList(..) => TagKind::List,
            Value::Compound(_) => TagKind::Compound,
            Value::IntArray(_) => TagKind::IntArray,
            Value::LongArray(_) => TagKind::LongArray,
        }
    }

    /// A convenience method to extract any integer value as an `i64`.
    /// Returns `0` for other value kinds.
    pub fn as_long(&self) -> i64 {
        match *self {
            Value::Byte(value) => value.into(),
            Value::Short(value) => value.into(),
            Value::Int(value) => value.into(),
            Value::Long(value) => value,
            _ => 0,
        }
    }

    /// A convenience method to extract a [Float](#variant.Float) or
    /// [Double](#variant.Double). Returns `0.0` for other value kinds.
    pub fn as_double(&self) -> f64 {
        match *self {
            Value::Float(value) => value.into(),
            Value::Double(value) => value,
            _ => 0.0,
        }
    }

    /// A convenience method to extract the bytes of a [String](#variant.String).
    /// Returns `""` for other value kinds.
    pub fn as_string(&self) -> &BStr {
        match *self {
            Value::String(ref value) => value.as_bstr(),
            _ => b"".as_bstr(),
        }
    }

    /// A convenience method to get the elements out of a [List](#variant.List).
    /// Returns an empty slice for other value kinds.
    pub fn as_list(&self) -> &[Value] {
        match *self {
            Value::List(_, ref values) => values.as_slice(),
            _ => &[],
        }
    }

    /// A convenience method to get the children out of a [Compound](#variant.Compound).
    /// Returns an empty slice for other value kinds.
    pub fn as_compound(&self) -> &[NamedTag] {
        match *self {
            Value::Compound(ref children) => children.as_slice(),
            _ => &[],
        }
    }

    /// Number of elements in a list or array, or children in a compound.
    /// Returns `0` for other value kinds.
    pub fn len(&self) -> usize {
        match *self {
            Value::ByteArray(ref values) => values.len(),
            Value::IntArray(ref values) => values.len(),
            Value::LongArray(ref values) => values.len(),
            Value::List(_, ref values) => values.len(),
            Value::HollowList(_, count) => usize::try_from(count).unwrap_or(0),
            Value::Compound(ref children) => children.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A convenience method to find the first child of a
    /// [Compound](#variant.Compound) with the given name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.as_compound()
            .iter()
            .find(|child| child.name() == name.as_bytes())
            .map(|child| &child.value)
    }
}

impl Index<usize> for Value {
    type Output = Value;

    /// Adds support for `self[index]` on lists. It will panic if this value
    /// isn't a [List](#variant.List) or if the index is out of bounds.
    fn index(&self, index: usize) -> &Value {
        match *self {
            Value::List(_, ref values) => &values[index],
            _ => panic!("cannot index into {}", self.kind()),
        }
    }
}

impl fmt::Debug for NamedTag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.name {
            Some(ref name) => write!(f, "{:?}: {:?}", name, self.value),
            None => self.value.fmt(f),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Value::Byte(value) => write!(f, "{}b", value),
            Value::Short(value) => write!(f, "{}s", value),
            Value::Int(value) => value.fmt(f),
            Value::Long(value) => write!(f, "{}L", value),
            Value::Float(value) => write!(f, "{:?}f", value),
            Value::Double(value) => write!(f, "{:?}d", value),
            Value::ByteArray(ref values) => write!(f, "[B; {:?}]", values),
            Value::String(ref value) => value.fmt(f),
            Value::List(kind, ref values) => write!(f, "{} {:?}", kind, values),
            Value::HollowList(kind, count) => write!(f, "{} x{}", kind, count),
            Value::IntArray(ref values) => write!(f, "[I; {:?}]", values),
            Value::LongArray(ref values) => write!(f, "[L; {:?}]", values),
            Value::Compound(ref children) => {
                write!(f, "{{")?;
                for (index, child) in children.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    child.fmt(f)?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// Decodes one root tag into memory. The root is always read as a named tag.
///
/// Returns `None` when the stream starts with an End tag, which is an empty
/// structure. The window is left positioned right after the root.
pub fn read_root<R: Read>(bb: &mut WindowBuffer<R>) -> Result<Option<NamedTag>> {
    let root = read_named(bb, 0)?;
    debug!("decoded root tag tree, {} bytes consumed", bb.consumed());
    Ok(root)
}

fn read_named<R: Read>(bb: &mut WindowBuffer<R>, depth: usize) -> Result<Option<NamedTag>> {
    let kind = bb.read_kind()?;
    if kind == TagKind::End {
        return Ok(None);
    }
    let len = bb.read_u16()? as usize;
    let name = BString::from(bb.read_bytes(len)?);
    let value = read_payload(bb, kind, depth)?;
    Ok(Some(NamedTag { name: Some(name), value }))
}

fn read_payload<R: Read>(bb: &mut WindowBuffer<R>, kind: TagKind, depth: usize) -> Result<Value> {
    if depth > MAX_DEPTH {
        return Err(NbtError::DepthLimitExceeded(MAX_DEPTH));
    }
    Ok(match kind {
        // Not reached: read_named stops at End and End lists never loop here.
        TagKind::End => Value::HollowList(TagKind::End, 0),
        TagKind::Byte => Value::Byte(bb.read_i8()?),
        TagKind::Short => Value::Short(bb.read_i16()?),
        TagKind::Int => Value::Int(bb.read_i32()?),
        TagKind::Long => Value::Long(bb.read_i64()?),
        TagKind::Float => Value::Float(bb.read_f32()?),
        TagKind::Double => Value::Double(bb.read_f64()?),
        TagKind::ByteArray => {
            let count = bb.read_i32()?;
            let mut values = Vec::new();
            for _ in 0..count {
                values.push(bb.read_u8()?);
            }
            Value::ByteArray(values)
        }
        TagKind::String => {
            let len = bb.read_u16()? as usize;
            Value::String(BString::from(bb.read_bytes(len)?))
        }
        TagKind::List => {
            let element = bb.read_kind()?;
            let count = bb.read_i32()?;
            if count < 0 || (count > 0 && element == TagKind::End) {
                return Ok(Value::HollowList(element, count));
            }
            let mut values = Vec::new();
            for _ in 0..count {
                values.push(read_payload(bb, element, depth + 1)?);
            }
            Value::List(element, values)
        }
        TagKind::Compound => {
            let mut children = Vec::new();
            while let Some(child) = read_named(bb, depth + 1)? {
                children.push(child);
            }
            Value::Compound(children)
        }
        TagKind::IntArray => {
            let count = bb.read_i32()?;
            let mut values = Vec::new();
            for _ in 0..count {
                values.push(bb.read_i32()?);
            }
            Value::IntArray(values)
        }
        TagKind::LongArray => {
            let count = bb.read_i32()?;
            let mut values = Vec::new();
            for _ in 0..count {
                values.push(bb.read_i64()?);
            }
            Value::LongArray(values)
        }
    })
}

#[cfg(any(test, feature = "test-util"))]
impl NamedTag {
    /// Encodes this tag as a root, the inverse of [read_root].
    pub fn encode(&self) -> Vec<u8> {
        let mut bb = crate::bb::ByteBufferMut::new();
        self.encode_bb(&mut bb);
        bb.data()
    }

    /// Writes the discriminant, the name if present, then the payload.
    pub fn encode_bb(&self, bb: &mut crate::bb::ByteBufferMut) {
        bb.write_u8(self.value.kind() as u8);
        if let Some(ref name) = self.name {
            bb.write_raw_string(name);
        }
        self.value.encode_bb(bb);
    }
}

#[cfg(any(test, feature = "test-util"))]
impl Value {
    /// Writes the payload alone, without a discriminant or name.
    pub fn encode_bb(&self, bb: &mut crate::bb::ByteBufferMut) {
        match *self {
            Value::Byte(value) => bb.write_i8(value),
            Value::Short(value) => bb.write_i16(value),
            Value::Int(value) => bb.write_i32(value),
            Value::Long(value) => bb.write_i64(value),
            Value::Float(value) => bb.write_f32(value),
            Value::Double(value) => bb.write_f64(value),
            Value::ByteArray(ref values) => {
                bb.write_i32(values.len() as i32);
                bb.write_bytes(values);
            }
            Value::String(ref value) => bb.write_raw_string(value),
            Value::List(element, ref values) => {
                bb.write_u8(element as u8);
                bb.write_i32(values.len() as i32);
                for value in values {
                    value.encode_bb(bb);
                }
            }
            Value::HollowList(element, count) => {
                bb.write_u8(element as u8);
                bb.write_i32(count);
            }
            Value::Compound(ref children) => {
                for child in children {
                    child.encode_bb(bb);
                }
                bb.write_u8(TagKind::End as u8);
            }
            Value::IntArray(ref values) => {
                bb.write_i32(values.len() as i32);
                for value in values {
                    bb.write_i32(*value);
                }
            }
            Value::LongArray(ref values) => {
                bb.write_i32(values.len() as i32);
                for value in values {
                    bb.write_i64(*value);
                }
            }
        }
    }
}
