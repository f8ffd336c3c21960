use num_derive::FromPrimitive;

use super::tag::{TagControl, TagType, TAG_MASK, TAG_SHIFT_BITS};
use crate::error::Error;

pub const TYPE_MASK: u8 = 0x1f;

/// The 5-bit element type field of a control byte.
#[derive(FromPrimitive, Debug, Copy, Clone, PartialEq, Eq)]
pub enum ElementType {
    S8 = 0,
    S16 = 1,
    S32 = 2,
    S64 = 3,
    U8 = 4,
    U16 = 5,
    U32 = 6,
    U64 = 7,
    False = 8,
    True = 9,
    F32 = 10,
    F64 = 11,
    Utf8l = 12,
    Utf16l = 13,
    Utf32l = 14,
    Utf64l = 15,
    Str8l = 16,
    Str16l = 17,
    Str32l = 18,
    Str64l = 19,
    Null = 20,
    Struct = 21,
    Array = 22,
    List = 23,
    EndCnt = 24,
}

// The array indices here correspond to the numeric value of the Element Type.
// For strings this is the width of the length prefix.
static VALUE_SIZE_MAP: [usize; 25] = [
    1, // S8   0
    2, // S16  1
    4, // S32  2
    8, // S64  3
    1, // U8   4
    2, // U16  5
    4, // U32  6
    8, // U64  7
    0, // False 8
    0, // True 9
    4, // F32  10
    8, // F64  11
    1, // Utf8l 12
    2, // Utf16l  13
    4, // Utf32l 14
    8, // Utf64l 15
    1, // Str8l 16
    2, // Str16l 17
    4, // Str32l 18
    8, // Str64l 19
    0, // Null  20
    0, // Struct 21
    0, // Array  22
    0, // List  23
    0, // EndCnt  24
];

impl ElementType {
    /// Fixed value width, or the length-prefix width for strings.
    pub fn value_size(self) -> usize {
        VALUE_SIZE_MAP[self as usize]
    }

    pub fn is_signed(self) -> bool {
        matches!(
            self,
            ElementType::S8 | ElementType::S16 | ElementType::S32 | ElementType::S64
        )
    }

    pub fn is_unsigned(self) -> bool {
        matches!(
            self,
            ElementType::U8 | ElementType::U16 | ElementType::U32 | ElementType::U64
        )
    }

    pub fn is_utf8(self) -> bool {
        matches!(
            self,
            ElementType::Utf8l | ElementType::Utf16l | ElementType::Utf32l | ElementType::Utf64l
        )
    }

    pub fn is_octets(self) -> bool {
        matches!(
            self,
            ElementType::Str8l | ElementType::Str16l | ElementType::Str32l | ElementType::Str64l
        )
    }

    pub fn container(self) -> Option<ContainerType> {
        match self {
            ElementType::Struct => Some(ContainerType::Struct),
            ElementType::Array => Some(ContainerType::Array),
            ElementType::List => Some(ContainerType::List),
            _ => None,
        }
    }

    /// Signed integer type for a standard width of 1, 2, 4 or 8 bytes.
    pub fn signed(width: usize) -> ElementType {
        match width {
            1 => ElementType::S8,
            2 => ElementType::S16,
            4 => ElementType::S32,
            _ => ElementType::S64,
        }
    }

    /// Unsigned integer type for a standard width of 1, 2, 4 or 8 bytes.
    pub fn unsigned(width: usize) -> ElementType {
        match width {
            1 => ElementType::U8,
            2 => ElementType::U16,
            4 => ElementType::U32,
            _ => ElementType::U64,
        }
    }

    /// UTF-8 string type with the smallest length prefix for `len`.
    pub fn utf8_for_len(len: usize) -> ElementType {
        match len_width(len) {
            1 => ElementType::Utf8l,
            2 => ElementType::Utf16l,
            4 => ElementType::Utf32l,
            _ => ElementType::Utf64l,
        }
    }

    /// Octet string type with the smallest length prefix for `len`.
    pub fn octets_for_len(len: usize) -> ElementType {
        match len_width(len) {
            1 => ElementType::Str8l,
            2 => ElementType::Str16l,
            4 => ElementType::Str32l,
            _ => ElementType::Str64l,
        }
    }
}

fn len_width(len: usize) -> usize {
    let len = len as u64;
    if len <= u8::MAX as u64 {
        1
    } else if len <= u16::MAX as u64 {
        2
    } else if len <= u32::MAX as u64 {
        4
    } else {
        8
    }
}

/// The standard wire width carrying a declared integer width of 1..=8 bytes.
pub fn wire_width(declared: usize) -> Result<usize, Error> {
    match declared {
        1 => Ok(1),
        2 => Ok(2),
        3 | 4 => Ok(4),
        5..=8 => Ok(8),
        _ => Err(Error::OutOfRange),
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ContainerType {
    Struct,
    Array,
    List,
}

impl ContainerType {
    pub fn element_type(self) -> ElementType {
        match self {
            ContainerType::Struct => ElementType::Struct,
            ContainerType::Array => ElementType::Array,
            ContainerType::List => ElementType::List,
        }
    }
}

pub fn control_byte(tag: TagControl, element: ElementType) -> u8 {
    ((tag as u8) << TAG_SHIFT_BITS) | (element as u8)
}

pub fn split_control(control: u8) -> Result<(TagControl, ElementType), Error> {
    let tag: Option<TagControl> =
        num::FromPrimitive::from_u8((control & TAG_MASK) >> TAG_SHIFT_BITS);
    let element: Option<ElementType> = num::FromPrimitive::from_u8(control & TYPE_MASK);
    match (tag, element) {
        // The end marker never carries a tag
        (Some(TagControl::Anonymous), Some(ElementType::EndCnt)) => {
            Ok((TagControl::Anonymous, ElementType::EndCnt))
        }
        (_, Some(ElementType::EndCnt)) => Err(Error::InvalidControl(control)),
        (Some(t), Some(e)) => Ok((t, e)),
        _ => Err(Error::InvalidControl(control)),
    }
}

/// Tag and type of an element, as seen before its value is consumed.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ElementHeader {
    pub tag: TagType,
    pub element_type: ElementType,
}

impl ElementHeader {
    pub fn is_null(&self) -> bool {
        self.element_type == ElementType::Null
    }

    pub fn container(&self) -> Option<ContainerType> {
        self.element_type.container()
    }
}

/// A decoded primitive value, borrowing strings from the input buffer.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ElementValue<'a> {
    Signed(i64, ElementType),
    Unsigned(u64, ElementType),
    Bool(bool),
    F32(f32),
    F64(f64),
    Utf8(&'a str),
    Octets(&'a [u8]),
    Null,
}
