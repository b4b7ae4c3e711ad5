use std::fmt;

use crate::error::NbtError;

/// Deepest nesting of lists and compounds accepted below the root tag.
pub const MAX_DEPTH: usize = 512;

/// The one-byte discriminant that starts every tag on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TagKind {
    End       = 0,
    Byte      = 1,
    Short     = 2,
    Int       = 3,
    Long      = 4,
    Float     = 5,
    Double    = 6,
    ByteArray = 7,
    String    = 8,
    List      = 9,
    Compound  = 10,
    IntArray  = 11,
    LongArray = 12,
}

impl TagKind {
    pub const ALL: [TagKind; 13] = [
        TagKind::End,
        TagKind::Byte,
        TagKind::Short,
        TagKind::Int,
        TagKind::Long,
        TagKind::Float,
        TagKind::Double,
        TagKind::ByteArray,
        TagKind::String,
        TagKind::List,
        TagKind::Compound,
        TagKind::IntArray,
        TagKind::LongArray,
    ];

    /// The label printed for this kind in a trace.
    pub fn label(self) -> &'static str {
        match self {
            TagKind::End => "TAG_End",
            TagKind::Byte => "TAG_Byte",
            TagKind::Short => "TAG_Short",
            TagKind::Int => "TAG_Int",
            TagKind::Long => "TAG_Long",
            TagKind::Float => "TAG_Float",
            TagKind::Double => "TAG_Double",
            TagKind::ByteArray => "TAG_Byte_Array",
            TagKind::String => "TAG_String",
            TagKind::List => "TAG_List",
            TagKind::Compound => "TAG_Compound",
            TagKind::IntArray => "TAG_Int_Array",
            TagKind::LongArray => "TAG_Long_Array",
        }
    }
}

impl TryFrom<u8> for TagKind {
    type Error = NbtError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        TagKind::ALL
            .get(value as usize)
            .copied()
            .ok_or(NbtError::UnknownTagKind(value))
    }
}

impl fmt::Display for TagKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.label())
    }
}
