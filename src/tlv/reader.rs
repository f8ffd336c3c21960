use log::{error, trace};

use super::{
    container::{skip_value, ContainerStack, MAX_CONTAINER_DEPTH},
    element::{split_control, wire_width, ContainerType, ElementHeader, ElementType, ElementValue},
    tag::TagType,
    traits::FromTLV,
};
use crate::{error::Error, utils::parsebuf::ParseBuf};

/// Sequential TLV decoder over an immutable buffer.
///
/// The cursor only moves forward. Typed `get_*` calls check the tag and
/// type of the element under the cursor and step past it; containers are
/// walked with `enter_*` and [`TLVReader::exit_container`]. A failed call
/// does not move the cursor, but after a parsing error the input should be
/// considered unusable.
#[derive(Debug, Clone)]
pub struct TLVReader<'a> {
    pb: ParseBuf<'a>,
    stack: ContainerStack,
}

impl<'a> TLVReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            pb: ParseBuf::new(buf),
            stack: ContainerStack::new(),
        }
    }

    pub fn depth(&self) -> usize {
        self.stack.depth()
    }

    pub fn offset(&self) -> usize {
        self.pb.offset()
    }

    /// Reads the control byte and tag at `pb`, advancing it past them.
    fn read_header(pb: &mut ParseBuf<'a>) -> Result<ElementHeader, Error> {
        let control = pb.le_u8()?;
        let (tag_control, element_type) = split_control(control).map_err(|e| {
            error!("Invalid control byte {:#04x}", control);
            e
        })?;
        let tag = TagType::decode(tag_control, pb)?;
        Ok(ElementHeader { tag, element_type })
    }

    /// Tag and type of the element under the cursor. The cursor does not move.
    /// A tag that the open container does not allow is rejected here.
    pub fn peek_element(&self) -> Result<ElementHeader, Error> {
        if self.pb.is_empty() {
            if self.stack.is_empty() {
                return Err(Error::EndOfContainer);
            }
            error!("Buffer ends inside {:?}", self.stack.current());
            return Err(Error::TruncatedPacket);
        }
        let mut pb = self.pb;
        let header = Self::read_header(&mut pb)?;
        if header.element_type == ElementType::EndCnt {
            if self.stack.is_empty() {
                error!("End of container at top level");
                return Err(Error::NoOpenContainer);
            }
            return Err(Error::EndOfContainer);
        }
        self.stack.check_tag(header.tag)?;
        Ok(header)
    }

    /// True when the cursor sits on the end marker of the open container,
    /// or at the end of the buffer when no container is open.
    pub fn is_end_of_container(&self) -> bool {
        if self.stack.is_empty() {
            return self.pb.is_empty();
        }
        match self.pb.peek_u8() {
            Ok(c) => matches!(split_control(c), Ok((_, ElementType::EndCnt))),
            Err(_) => false,
        }
    }

    /// True once every top-level element has been read.
    pub fn is_end_of_tlv(&self) -> bool {
        self.stack.is_empty() && self.pb.is_empty()
    }

    /// True when the element under the cursor is Null.
    pub fn is_null(&self) -> bool {
        matches!(self.peek_element(), Ok(h) if h.is_null())
    }

    /// Checks tag and runs `f` on a scratch cursor positioned at the value.
    /// The real cursor advances only if `f` succeeds.
    fn read<T, F>(&mut self, tag: TagType, f: F) -> Result<T, Error>
    where
        F: FnOnce(ElementType, &mut ParseBuf<'a>) -> Result<T, Error>,
    {
        let header = self.peek_element()?;
        if header.tag != tag {
            error!("Expected tag {:?}, found {:?}", tag, header.tag);
            return Err(Error::TagMismatch {
                expected: tag,
                found: header.tag,
            });
        }
        let mut pb = self.pb;
        Self::read_header(&mut pb)?;
        let val = f(header.element_type, &mut pb)?;
        self.pb = pb;
        Ok(val)
    }

    fn read_unsigned(&mut self, tag: TagType, max: u64) -> Result<u64, Error> {
        self.read(tag, |element_type, pb| {
            if !element_type.is_unsigned() {
                return Err(mismatch("unsigned integer", element_type));
            }
            let val = pb.le_uint(element_type.value_size())?;
            if val > max {
                error!("{} is out of range", val);
                return Err(Error::OutOfRange);
            }
            Ok(val)
        })
    }

    fn read_signed(&mut self, tag: TagType, min: i64, max: i64) -> Result<i64, Error> {
        self.read(tag, |element_type, pb| {
            if !element_type.is_signed() {
                return Err(mismatch("signed integer", element_type));
            }
            let val = pb.le_int(element_type.value_size())?;
            if val < min || val > max {
                error!("{} is out of range", val);
                return Err(Error::OutOfRange);
            }
            Ok(val)
        })
    }

    pub fn get_u8(&mut self, tag: TagType) -> Result<u8, Error> {
        Ok(self.read_unsigned(tag, u8::MAX as u64)? as u8)
    }

    pub fn get_u16(&mut self, tag: TagType) -> Result<u16, Error> {
        Ok(self.read_unsigned(tag, u16::MAX as u64)? as u16)
    }

    pub fn get_u32(&mut self, tag: TagType) -> Result<u32, Error> {
        Ok(self.read_unsigned(tag, u32::MAX as u64)? as u32)
    }

    pub fn get_u64(&mut self, tag: TagType) -> Result<u64, Error> {
        self.read_unsigned(tag, u64::MAX)
    }

    pub fn get_i8(&mut self, tag: TagType) -> Result<i8, Error> {
        Ok(self.read_signed(tag, i8::MIN as i64, i8::MAX as i64)? as i8)
    }

    pub fn get_i16(&mut self, tag: TagType) -> Result<i16, Error> {
        Ok(self.read_signed(tag, i16::MIN as i64, i16::MAX as i64)? as i16)
    }

    pub fn get_i32(&mut self, tag: TagType) -> Result<i32, Error> {
        Ok(self.read_signed(tag, i32::MIN as i64, i32::MAX as i64)? as i32)
    }

    pub fn get_i64(&mut self, tag: TagType) -> Result<i64, Error> {
        self.read_signed(tag, i64::MIN, i64::MAX)
    }

    /// Unsigned integer with a declared width of 1..=8 bytes.
    pub fn get_uint_sized(&mut self, tag: TagType, bytes: usize) -> Result<u64, Error> {
        wire_width(bytes)?;
        let max = if bytes == 8 {
            u64::MAX
        } else {
            (1_u64 << (bytes * 8)) - 1
        };
        self.read_unsigned(tag, max)
    }

    /// Signed integer with a declared width of 1..=8 bytes.
    pub fn get_int_sized(&mut self, tag: TagType, bytes: usize) -> Result<i64, Error> {
        wire_width(bytes)?;
        let (min, max) = if bytes == 8 {
            (i64::MIN, i64::MAX)
        } else {
            let bits = bytes * 8 - 1;
            (-(1_i64 << bits), (1_i64 << bits) - 1)
        };
        self.read_signed(tag, min, max)
    }

    pub fn get_bool(&mut self, tag: TagType) -> Result<bool, Error> {
        self.read(tag, |element_type, _| match element_type {
            ElementType::True => Ok(true),
            ElementType::False => Ok(false),
            _ => Err(mismatch("boolean", element_type)),
        })
    }

    pub fn get_f32(&mut self, tag: TagType) -> Result<f32, Error> {
        self.read(tag, |element_type, pb| match element_type {
            ElementType::F32 => Ok(f32::from_bits(pb.le_u32()?)),
            _ => Err(mismatch("single precision float", element_type)),
        })
    }

    /// Accepts both single and double precision elements.
    pub fn get_f64(&mut self, tag: TagType) -> Result<f64, Error> {
        self.read(tag, |element_type, pb| match element_type {
            ElementType::F32 => Ok(f32::from_bits(pb.le_u32()?) as f64),
            ElementType::F64 => Ok(f64::from_bits(pb.le_u64()?)),
            _ => Err(mismatch("float", element_type)),
        })
    }

    pub fn get_utf8(&mut self, tag: TagType) -> Result<&'a str, Error> {
        self.read(tag, |element_type, pb| {
            if !element_type.is_utf8() {
                return Err(mismatch("UTF-8 string", element_type));
            }
            let s = read_len_prefixed(element_type, pb)?;
            Ok(std::str::from_utf8(s)?)
        })
    }

    /// Octet string.
    pub fn get_str(&mut self, tag: TagType) -> Result<&'a [u8], Error> {
        self.read(tag, |element_type, pb| {
            if !element_type.is_octets() {
                return Err(mismatch("octet string", element_type));
            }
            read_len_prefixed(element_type, pb)
        })
    }

    pub fn get_null(&mut self, tag: TagType) -> Result<(), Error> {
        self.read(tag, |element_type, _| match element_type {
            ElementType::Null => Ok(()),
            _ => Err(mismatch("null", element_type)),
        })
    }

    /// Reads any primitive element without checking its tag.
    pub fn get_any(&mut self) -> Result<(TagType, ElementValue<'a>), Error> {
        let header = self.peek_element()?;
        let value = self.read(header.tag, |element_type, pb| {
            let value = match element_type {
                ElementType::S8 | ElementType::S16 | ElementType::S32 | ElementType::S64 => {
                    ElementValue::Signed(pb.le_int(element_type.value_size())?, element_type)
                }
                ElementType::U8 | ElementType::U16 | ElementType::U32 | ElementType::U64 => {
                    ElementValue::Unsigned(pb.le_uint(element_type.value_size())?, element_type)
                }
                ElementType::False => ElementValue::Bool(false),
                ElementType::True => ElementValue::Bool(true),
                ElementType::F32 => ElementValue::F32(f32::from_bits(pb.le_u32()?)),
                ElementType::F64 => ElementValue::F64(f64::from_bits(pb.le_u64()?)),
                ElementType::Utf8l
                | ElementType::Utf16l
                | ElementType::Utf32l
                | ElementType::Utf64l => ElementValue::Utf8(std::str::from_utf8(
                    read_len_prefixed(element_type, pb)?,
                )?),
                ElementType::Str8l
                | ElementType::Str16l
                | ElementType::Str32l
                | ElementType::Str64l => {
                    ElementValue::Octets(read_len_prefixed(element_type, pb)?)
                }
                ElementType::Null => ElementValue::Null,
                ElementType::Struct
                | ElementType::Array
                | ElementType::List
                | ElementType::EndCnt => return Err(mismatch("primitive", element_type)),
            };
            Ok(value)
        })?;
        Ok((header.tag, value))
    }

    /// Decodes the element under the cursor through its [`FromTLV`] implementation.
    pub fn get<T: FromTLV<'a>>(&mut self, tag: TagType) -> Result<T, Error> {
        T::from_tlv(self, tag)
    }

    fn enter(&mut self, tag: TagType, container: ContainerType) -> Result<(), Error> {
        self.stack.check_room()?;
        self.read(tag, |element_type, _| {
            if element_type == container.element_type() {
                Ok(())
            } else {
                Err(mismatch(container_name(container), element_type))
            }
        })?;
        self.stack.push(container, tag)?;
        trace!("Enter {:?} {:?} at depth {}", container, tag, self.stack.depth());
        Ok(())
    }

    pub fn enter_struct(&mut self, tag: TagType) -> Result<(), Error> {
        self.enter(tag, ContainerType::Struct)
    }

    pub fn enter_array(&mut self, tag: TagType) -> Result<(), Error> {
        self.enter(tag, ContainerType::Array)
    }

    pub fn enter_list(&mut self, tag: TagType) -> Result<(), Error> {
        self.enter(tag, ContainerType::List)
    }

    /// Steps past whatever is left of the open container, including any
    /// unread nested containers, and past its end marker.
    pub fn exit_container(&mut self) -> Result<(), Error> {
        if self.stack.is_empty() {
            error!("Exit with no open container");
            return Err(Error::NoOpenContainer);
        }
        let mut pb = self.pb;
        skip_to_end(&mut pb, self.stack.depth())?;
        let frame = self.stack.pop(None)?;
        self.pb = pb;
        trace!("Exit {:?} {:?}", frame.container, frame.tag);
        Ok(())
    }

    /// Steps past the element under the cursor, containers included.
    pub fn skip_element(&mut self) -> Result<(), Error> {
        let header = self.peek_element()?;
        let mut pb = self.pb;
        Self::read_header(&mut pb)?;
        match header.container() {
            Some(_) => {
                if self.stack.depth() >= MAX_CONTAINER_DEPTH {
                    return Err(Error::MaxDepthExceeded);
                }
                skip_to_end(&mut pb, self.stack.depth() + 1)?
            }
            None => skip_value(header.element_type, &mut pb)?,
        }
        self.pb = pb;
        Ok(())
    }
}

/// Advances `pb` past the end marker that closes the innermost open
/// container, skipping nested containers along the way. `depth` is the
/// number of containers already open, used to bound nesting.
fn skip_to_end(pb: &mut ParseBuf, depth: usize) -> Result<(), Error> {
    let mut nest_level = 0_usize;
    loop {
        let (tag_control, element_type) = split_control(pb.le_u8()?)?;
        TagType::decode(tag_control, pb)?;
        match element_type {
            ElementType::EndCnt => {
                if nest_level == 0 {
                    return Ok(());
                }
                nest_level -= 1;
            }
            ElementType::Struct | ElementType::Array | ElementType::List => {
                nest_level += 1;
                if depth + nest_level > MAX_CONTAINER_DEPTH {
                    error!("Container nesting exceeds {}", MAX_CONTAINER_DEPTH);
                    return Err(Error::MaxDepthExceeded);
                }
            }
            _ => skip_value(element_type, pb)?,
        }
    }
}

fn read_len_prefixed<'a>(
    element_type: ElementType,
    pb: &mut ParseBuf<'a>,
) -> Result<&'a [u8], Error> {
    let len = pb.le_uint(element_type.value_size())?;
    let len = usize::try_from(len).map_err(|_| Error::InvalidLength(len))?;
    pb.slice(len)
}

fn mismatch(expected: &'static str, found: ElementType) -> Error {
    error!("Expected {}, found {:?}", expected, found);
    Error::TypeMismatch { expected, found }
}

fn container_name(container: ContainerType) -> &'static str {
    match container {
        ContainerType::Struct => "structure",
        ContainerType::Array => "array",
        ContainerType::List => "list",
    }
}

#[cfg(test)]
mod tests {
    use super::TLVReader;
    use crate::{
        error::{Error, ErrorKind},
        tlv::*,
    };

    #[test]
    fn test_short_length_tag() {
        // The 0x36 is an array with a tag, but we leave out the tag field
        let b = [0x15, 0x36];
        let mut tr = TLVReader::new(&b);
        tr.enter_struct(TagType::Anonymous).unwrap();
        assert_eq!(tr.peek_element(), Err(Error::TruncatedPacket));
        assert_eq!(tr.offset(), 1);
    }

    #[test]
    fn test_short_length_value_immediate() {
        // The 0x24 is a a tagged integer, here we leave out the integer value
        let b = [0x15, 0x24, 0x0];
        let mut tr = TLVReader::new(&b);
        tr.enter_struct(TagType::Anonymous).unwrap();
        assert_eq!(tr.get_u8(TagType::Context(0)), Err(Error::TruncatedPacket));
        // The cursor is left at the start of the failed element
        assert_eq!(tr.offset(), 1);
    }

    #[test]
    fn test_short_length_value_string() {
        // This is a tagged string, with tag 0 and length 0xb, but we only have 4 bytes in the string
        let b = [0x15, 0x30, 0x00, 0x0b, 0x73, 0x6d, 0x61, 0x72];
        let mut tr = TLVReader::new(&b);
        tr.enter_struct(TagType::Anonymous).unwrap();
        let err = tr.get_str(TagType::Context(0)).unwrap_err();
        assert_eq!(err, Error::TruncatedPacket);
        assert_eq!(err.kind(), ErrorKind::Parsing);
    }

    #[test]
    fn test_truncated_length_prefix() {
        // Str16l with only one of its two length bytes
        let b = [0x11, 0x05];
        let mut tr = TLVReader::new(&b);
        assert_eq!(tr.get_str(TagType::Anonymous), Err(Error::TruncatedPacket));
    }

    #[test]
    fn test_valid_value_string() {
        let b = [0x15, 0x30, 0x5, 0x04, 0x73, 0x6d, 0x61, 0x72, 0x18];
        let mut tr = TLVReader::new(&b);
        tr.enter_struct(TagType::Anonymous).unwrap();
        assert_eq!(
            tr.peek_element(),
            Ok(ElementHeader {
                tag: TagType::Context(5),
                element_type: ElementType::Str8l
            })
        );
        assert_eq!(
            tr.get_str(TagType::Context(5)),
            Ok(&[0x73, 0x6d, 0x61, 0x72][..])
        );
        assert!(tr.is_end_of_container());
        tr.exit_container().unwrap();
        assert!(tr.is_end_of_tlv());
    }

    #[test]
    fn test_struct_iteration_with_mix_values() {
        let b = [
            0x15, 0x24, 0x0, 0x2, 0x26, 0x2, 0x4e, 0x10, 0x02, 0x00, 0x2c, 0x3, 0x04, 0x73, 0x6d,
            0x61, 0x72, 0x18,
        ];
        let mut tr = TLVReader::new(&b);
        tr.enter_struct(TagType::Anonymous).unwrap();
        assert_eq!(tr.get_u8(TagType::Context(0)), Ok(2));
        assert_eq!(tr.get_u32(TagType::Context(2)), Ok(135246));
        assert_eq!(tr.get_utf8(TagType::Context(3)), Ok("smar"));
        tr.exit_container().unwrap();
    }

    #[test]
    fn test_widening_and_range() {
        // u8 2, then u64 0x1_0000
        let b = [0x04, 0x02, 0x07, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00];
        let mut tr = TLVReader::new(&b);
        assert_eq!(tr.get_u64(TagType::Anonymous), Ok(2));
        let err = tr.get_u16(TagType::Anonymous).unwrap_err();
        assert_eq!(err, Error::OutOfRange);
        assert_eq!(err.kind(), ErrorKind::Range);
        assert_eq!(tr.get_u32(TagType::Anonymous), Ok(0x1_0000));
    }

    #[test]
    fn test_signed_range() {
        // s16 -200
        let b = [0x01, 0x38, 0xff];
        let mut tr = TLVReader::new(&b);
        assert_eq!(tr.get_i8(TagType::Anonymous), Err(Error::OutOfRange));
        assert!(matches!(
            tr.get_u16(TagType::Anonymous),
            Err(Error::TypeMismatch { .. })
        ));
        assert_eq!(tr.get_i64(TagType::Anonymous), Ok(-200));
    }

    #[test]
    fn test_odd_sized() {
        // u32 0x00ffffff then u32 0x01000000
        let b = [0x06, 0xff, 0xff, 0xff, 0x00, 0x06, 0x00, 0x00, 0x00, 0x01];
        let mut tr = TLVReader::new(&b);
        assert_eq!(tr.get_uint_sized(TagType::Anonymous, 3), Ok(0xff_ffff));
        assert_eq!(
            tr.get_uint_sized(TagType::Anonymous, 3),
            Err(Error::OutOfRange)
        );
        assert_eq!(tr.get_uint_sized(TagType::Anonymous, 4), Ok(0x100_0000));
    }

    #[test]
    fn test_type_mismatch() {
        let b = [0x08];
        let mut tr = TLVReader::new(&b);
        let err = tr.get_u8(TagType::Anonymous).unwrap_err();
        assert_eq!(
            err,
            Error::TypeMismatch {
                expected: "unsigned integer",
                found: ElementType::False
            }
        );
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        assert_eq!(tr.get_bool(TagType::Anonymous), Ok(false));
    }

    #[test]
    fn test_tag_mismatch() {
        let b = [0x24, 0x01, 0x05];
        let mut tr = TLVReader::new(&b);
        let err = tr.get_u8(TagType::Context(2)).unwrap_err();
        assert_eq!(
            err,
            Error::TagMismatch {
                expected: TagType::Context(2),
                found: TagType::Context(1)
            }
        );
        assert_eq!(err.kind(), ErrorKind::TagMismatch);
        assert_eq!(tr.get_u8(TagType::Context(1)), Ok(5));
    }

    #[test]
    fn test_tagged_member_in_array() {
        let b = [0x16, 0x24, 0x01, 0x05, 0x18];
        let mut tr = TLVReader::new(&b);
        tr.enter_array(TagType::Anonymous).unwrap();
        let err = tr.peek_element().unwrap_err();
        assert_eq!(
            err,
            Error::TagNotAllowed {
                tag: TagType::Context(1),
                container: Some(ContainerType::Array)
            }
        );
        assert_eq!(err.kind(), ErrorKind::Structural);
        assert_eq!(tr.get_u8(TagType::Context(1)), Err(err));
        assert!(tr.skip_element().is_err());
        assert_eq!(tr.offset(), 1);
    }

    #[test]
    fn test_anonymous_member_in_struct() {
        let b = [0x15, 0x04, 0x05, 0x18];
        let mut tr = TLVReader::new(&b);
        tr.enter_struct(TagType::Anonymous).unwrap();
        let err = tr.get_u8(TagType::Anonymous).unwrap_err();
        assert_eq!(
            err,
            Error::TagNotAllowed {
                tag: TagType::Anonymous,
                container: Some(ContainerType::Struct)
            }
        );
        assert_eq!(err.kind(), ErrorKind::Structural);
        assert!(!tr.is_null());
        // The malformed member is still skipped when leaving the structure
        tr.exit_container().unwrap();
        assert!(tr.is_end_of_tlv());
    }

    #[test]
    fn test_null() {
        let b = [0x14];
        let mut tr = TLVReader::new(&b);
        assert!(tr.peek_element().unwrap().is_null());
        assert!(tr.is_null());
        assert_eq!(tr.offset(), 0);
        tr.get_null(TagType::Anonymous).unwrap();
        assert_eq!(tr.offset(), 1);
        assert!(tr.is_end_of_tlv());
        assert_eq!(tr.peek_element(), Err(Error::EndOfContainer));
    }

    #[test]
    fn test_floats() {
        let b = [
            0x0a, 0x00, 0x00, 0xc0, 0x3f, 0x0b, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xc0,
        ];
        let mut tr = TLVReader::new(&b);
        assert_eq!(tr.get_f64(TagType::Anonymous), Ok(1.5));
        assert!(tr.get_f32(TagType::Anonymous).is_err());
        assert_eq!(tr.get_f64(TagType::Anonymous), Ok(-2.0));
    }

    #[test]
    fn test_invalid_utf8() {
        let b = [0x0c, 0x02, 0xc3, 0x28];
        let mut tr = TLVReader::new(&b);
        assert_eq!(tr.get_utf8(TagType::Anonymous), Err(Error::InvalidUtf8));
        assert_eq!(tr.get_any().err(), Some(Error::InvalidUtf8));
    }

    #[test]
    fn test_invalid_control() {
        let b = [0x1d, 0x00];
        let tr = TLVReader::new(&b);
        assert_eq!(tr.peek_element(), Err(Error::InvalidControl(0x1d)));
    }

    #[test]
    fn test_enter_wrong_container() {
        let b = [0x17, 0x18];
        let mut tr = TLVReader::new(&b);
        assert!(matches!(
            tr.enter_struct(TagType::Anonymous),
            Err(Error::TypeMismatch { .. })
        ));
        assert_eq!(tr.depth(), 0);
        tr.enter_list(TagType::Anonymous).unwrap();
        assert!(tr.is_end_of_container());
        assert_eq!(tr.peek_element(), Err(Error::EndOfContainer));
        tr.exit_container().unwrap();
        assert_eq!(tr.exit_container(), Err(Error::NoOpenContainer));
    }

    #[test]
    fn test_complex_structure_invoke_cmd() {
        // This is what we typically get in an invoke command
        let b = [
            0x15, 0x36, 0x0, 0x15, 0x37, 0x0, 0x24, 0x0, 0x2, 0x24, 0x2, 0x6, 0x24, 0x3, 0x1, 0x18,
            0x35, 0x1, 0x18, 0x18, 0x18, 0x18,
        ];
        let mut tr = TLVReader::new(&b);
        tr.enter_struct(TagType::Anonymous).unwrap();
        tr.enter_array(TagType::Context(0)).unwrap();
        tr.enter_struct(TagType::Anonymous).unwrap();
        tr.enter_list(TagType::Context(0)).unwrap();
        assert_eq!(tr.get_u8(TagType::Context(0)), Ok(2));
        // Leave the rest of the command path unread
        tr.exit_container().unwrap();
        tr.enter_struct(TagType::Context(1)).unwrap();
        assert!(tr.is_end_of_container());
        tr.exit_container().unwrap();
        tr.exit_container().unwrap();
        assert!(tr.is_end_of_container());
        tr.exit_container().unwrap();
        tr.exit_container().unwrap();
        assert!(tr.is_end_of_tlv());
    }

    #[test]
    fn test_exit_skips_nested() {
        let b = [0x15, 0x35, 0x0, 0x24, 0x1, 0x2, 0x18, 0x24, 0x0, 0x2, 0x18, 0x04, 0x07];
        let mut tr = TLVReader::new(&b);
        tr.enter_struct(TagType::Anonymous).unwrap();
        tr.exit_container().unwrap();
        assert_eq!(tr.offset(), 11);
        assert_eq!(tr.get_u8(TagType::Anonymous), Ok(7));
    }

    #[test]
    fn test_exit_unterminated() {
        let b = [0x15, 0x36, 0x0, 0x04, 0x01];
        let mut tr = TLVReader::new(&b);
        tr.enter_struct(TagType::Anonymous).unwrap();
        assert_eq!(tr.exit_container(), Err(Error::TruncatedPacket));
        assert_eq!(tr.depth(), 1);
    }

    #[test]
    fn test_skip_element() {
        let b = [0x17, 0x35, 0x0, 0x24, 0x1, 0x2, 0x18, 0x30, 0x1, 0x1, 0xaa, 0x24, 0x2, 0x9, 0x18];
        let mut tr = TLVReader::new(&b);
        tr.enter_list(TagType::Anonymous).unwrap();
        tr.skip_element().unwrap();
        tr.skip_element().unwrap();
        assert_eq!(tr.get_u8(TagType::Context(2)), Ok(9));
        assert_eq!(tr.skip_element(), Err(Error::EndOfContainer));
    }

    #[test]
    fn test_get_any() {
        let b = [0x17, 0x21, 0x1, 0xfe, 0xff, 0x29, 0x2, 0x18];
        let mut tr = TLVReader::new(&b);
        tr.enter_list(TagType::Anonymous).unwrap();
        assert_eq!(
            tr.get_any(),
            Ok((TagType::Context(1), ElementValue::Signed(-2, ElementType::S16)))
        );
        assert_eq!(tr.get_any(), Ok((TagType::Context(2), ElementValue::Bool(true))));
        assert!(tr.get_any().is_err());
    }

    #[test]
    fn test_depth_limit() {
        let mut b = vec![0x17_u8; MAX_CONTAINER_DEPTH + 1];
        b.extend(std::iter::repeat(0x18).take(MAX_CONTAINER_DEPTH + 1));
        let mut tr = TLVReader::new(&b);
        for _ in 0..MAX_CONTAINER_DEPTH {
            tr.enter_list(TagType::Anonymous).unwrap();
        }
        assert_eq!(tr.enter_list(TagType::Anonymous), Err(Error::MaxDepthExceeded));

        let mut tr = TLVReader::new(&b);
        tr.enter_list(TagType::Anonymous).unwrap();
        assert_eq!(tr.exit_container(), Err(Error::MaxDepthExceeded));
    }
}
