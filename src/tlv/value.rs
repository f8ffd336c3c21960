use std::fmt;

use log::info;

use super::{
    ContainerType, ElementType, ElementValue, FromTLV, TLVReader, TLVWriter, TagType, ToTLV,
};
use crate::error::Error;

/// An owned TLV element tree.
///
/// Integers keep the width they were encoded with, so a value that was
/// read and then written again reproduces the same bytes.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int { value: i64, width: usize },
    UInt { value: u64, width: usize },
    Bool(bool),
    Float(f32),
    Double(f64),
    Bytes(Vec<u8>),
    String(String),
    Null,
    Struct(Vec<(TagType, Value)>),
    Array(Vec<Value>),
    List(Vec<(TagType, Value)>),
}

impl Value {
    /// Reads the element under the cursor, whatever its tag, returning the
    /// tag along with the value.
    pub fn read(tr: &mut TLVReader) -> Result<(TagType, Value), Error> {
        let header = tr.peek_element()?;
        let tag = header.tag;
        let value = match header.container() {
            Some(container) => {
                match container {
                    ContainerType::Struct => tr.enter_struct(tag)?,
                    ContainerType::Array => tr.enter_array(tag)?,
                    ContainerType::List => tr.enter_list(tag)?,
                }
                let mut members = Vec::new();
                while !tr.is_end_of_container() {
                    members.push(Value::read(tr)?);
                }
                tr.exit_container()?;
                match container {
                    ContainerType::Struct => Value::Struct(members),
                    ContainerType::Array => {
                        Value::Array(members.into_iter().map(|(_, v)| v).collect())
                    }
                    ContainerType::List => Value::List(members),
                }
            }
            None => match tr.get_any()?.1 {
                ElementValue::Signed(value, t) => Value::Int {
                    value,
                    width: t.value_size(),
                },
                ElementValue::Unsigned(value, t) => Value::UInt {
                    value,
                    width: t.value_size(),
                },
                ElementValue::Bool(b) => Value::Bool(b),
                ElementValue::F32(f) => Value::Float(f),
                ElementValue::F64(f) => Value::Double(f),
                ElementValue::Utf8(s) => Value::String(s.to_owned()),
                ElementValue::Octets(b) => Value::Bytes(b.to_vec()),
                ElementValue::Null => Value::Null,
            },
        };
        Ok((tag, value))
    }

    pub fn write(&self, tw: &mut TLVWriter, tag: TagType) -> Result<(), Error> {
        match self {
            Value::Int { value, width } => tw.put_int_sized(tag, *value, *width),
            Value::UInt { value, width } => tw.put_uint_sized(tag, *value, *width),
            Value::Bool(b) => tw.put_bool(tag, *b),
            Value::Float(f) => tw.put_f32(tag, *f),
            Value::Double(f) => tw.put_f64(tag, *f),
            Value::Bytes(b) => tw.put_str(tag, b),
            Value::String(s) => tw.put_utf8(tag, s),
            Value::Null => tw.put_null(tag),
            Value::Struct(members) => {
                tw.start_struct(tag)?;
                for (t, v) in members {
                    v.write(tw, *t)?;
                }
                tw.end_struct()
            }
            Value::Array(members) => {
                tw.start_array(tag)?;
                for v in members {
                    v.write(tw, TagType::Anonymous)?;
                }
                tw.end_array()
            }
            Value::List(members) => {
                tw.start_list(tag)?;
                for (t, v) in members {
                    v.write(tw, *t)?;
                }
                tw.end_list()
            }
        }
    }

    /// The element type this value is written with.
    pub fn element_type(&self) -> ElementType {
        match self {
            Value::Int { width, .. } => ElementType::signed(*width),
            Value::UInt { width, .. } => ElementType::unsigned(*width),
            Value::Bool(true) => ElementType::True,
            Value::Bool(false) => ElementType::False,
            Value::Float(_) => ElementType::F32,
            Value::Double(_) => ElementType::F64,
            Value::Bytes(b) => ElementType::octets_for_len(b.len()),
            Value::String(s) => ElementType::utf8_for_len(s.len()),
            Value::Null => ElementType::Null,
            Value::Struct(_) => ElementType::Struct,
            Value::Array(_) => ElementType::Array,
            Value::List(_) => ElementType::List,
        }
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, tag: TagType, indent: usize) -> fmt::Result {
        write!(f, "{:width$}", "", width = indent * 2)?;
        if !tag.is_anonymous() {
            write!(f, "{}: ", tag)?;
        }
        let members = |f: &mut fmt::Formatter<'_>, members: &[(TagType, Value)]| -> fmt::Result {
            for (t, v) in members {
                v.fmt_indented(f, *t, indent + 1)?;
            }
            Ok(())
        };
        match self {
            Value::Int { value, .. } => writeln!(f, "{}", value),
            Value::UInt { value, .. } => writeln!(f, "{}U", value),
            Value::Bool(b) => writeln!(f, "{}", b),
            Value::Float(v) => writeln!(f, "{}f", v),
            Value::Double(v) => writeln!(f, "{}", v),
            Value::Bytes(b) => writeln!(f, "len[{}]{:02x?}", b.len(), b),
            Value::String(s) => writeln!(f, "len[{}]\"{}\"", s.len(), s),
            Value::Null => writeln!(f, "null"),
            Value::Struct(m) => {
                writeln!(f, "{{")?;
                members(f, m)?;
                writeln!(f, "{:width$}}}", "", width = indent * 2)
            }
            Value::List(m) => {
                writeln!(f, "[[")?;
                members(f, m)?;
                writeln!(f, "{:width$}]]", "", width = indent * 2)
            }
            Value::Array(m) => {
                writeln!(f, "[")?;
                for v in m {
                    v.fmt_indented(f, TagType::Anonymous, indent + 1)?;
                }
                writeln!(f, "{:width$}]", "", width = indent * 2)
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, TagType::Anonymous, 0)
    }
}

impl ToTLV for Value {
    fn to_tlv(&self, tw: &mut TLVWriter, tag: TagType) -> Result<(), Error> {
        self.write(tw, tag)
    }
}

impl<'a> FromTLV<'a> for Value {
    fn from_tlv(tr: &mut TLVReader<'a>, tag: TagType) -> Result<Self, Error> {
        let found = tr.peek_element()?.tag;
        if found != tag {
            return Err(Error::TagMismatch {
                expected: tag,
                found,
            });
        }
        Ok(Value::read(tr)?.1)
    }
}

/// Decodes every top-level element of `b`.
pub fn decode_all(b: &[u8]) -> Result<Vec<(TagType, Value)>, Error> {
    let mut tr = TLVReader::new(b);
    let mut elements = Vec::new();
    while !tr.is_end_of_tlv() {
        elements.push(Value::read(&mut tr)?);
    }
    Ok(elements)
}

pub fn print_tlv_list(b: &[u8]) {
    info!("TLV list:");
    match decode_all(b) {
        Ok(elements) => {
            for (tag, value) in elements {
                if tag.is_anonymous() {
                    info!("{}", value);
                } else {
                    info!("{}: {}", tag, value);
                }
            }
        }
        Err(e) => info!("Decode failed: {}", e),
    }
    info!("---------");
}
