use log::{error, trace};

use super::{
    container::{self, ContainerStack},
    element::{control_byte, wire_width, ContainerType, ElementType},
    tag::{TagControl, TagType},
    traits::ToTLV,
    value::Value,
};
use crate::{error::*, utils::writebuf::WriteBuf};

/// Sequential TLV encoder.
///
/// Elements are appended in order; containers are opened with one of the
/// `start_*` calls and closed with the matching `end_*`. A failed call
/// leaves nothing of the rejected element in the buffer.
#[derive(Debug, Default)]
pub struct TLVWriter {
    buf: WriteBuf,
    stack: ContainerStack,
}

impl TLVWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: WriteBuf::with_capacity(capacity),
            stack: ContainerStack::new(),
        }
    }

    /// Writes control byte and tag, after checking the tag suits the open container.
    fn put_control_tag(&mut self, tag_type: TagType, val_type: ElementType) -> Result<(), Error> {
        self.stack.check_tag(tag_type)?;
        self.buf.le_u8(control_byte(tag_type.control(), val_type));
        tag_type.encode(&mut self.buf);
        Ok(())
    }

    fn put_int(&mut self, tag_type: TagType, data: i64, width: usize) -> Result<(), Error> {
        self.put_control_tag(tag_type, ElementType::signed(width))?;
        self.buf.le_uint(width, data as u64);
        Ok(())
    }

    fn put_uint(&mut self, tag_type: TagType, data: u64, width: usize) -> Result<(), Error> {
        self.put_control_tag(tag_type, ElementType::unsigned(width))?;
        self.buf.le_uint(width, data);
        Ok(())
    }

    pub fn put_i8(&mut self, tag_type: TagType, data: i8) -> Result<(), Error> {
        self.put_int(tag_type, data as i64, 1)
    }

    pub fn put_i16(&mut self, tag_type: TagType, data: i16) -> Result<(), Error> {
        self.put_int(tag_type, data as i64, 2)
    }

    pub fn put_i32(&mut self, tag_type: TagType, data: i32) -> Result<(), Error> {
        self.put_int(tag_type, data as i64, 4)
    }

    pub fn put_i64(&mut self, tag_type: TagType, data: i64) -> Result<(), Error> {
        self.put_int(tag_type, data, 8)
    }

    pub fn put_u8(&mut self, tag_type: TagType, data: u8) -> Result<(), Error> {
        self.put_uint(tag_type, data as u64, 1)
    }

    pub fn put_u16(&mut self, tag_type: TagType, data: u16) -> Result<(), Error> {
        self.put_uint(tag_type, data as u64, 2)
    }

    pub fn put_u32(&mut self, tag_type: TagType, data: u32) -> Result<(), Error> {
        self.put_uint(tag_type, data as u64, 4)
    }

    pub fn put_u64(&mut self, tag_type: TagType, data: u64) -> Result<(), Error> {
        self.put_uint(tag_type, data, 8)
    }

    /// Signed integer with a declared width of 1..=8 bytes, carried in the
    /// next standard wire width.
    pub fn put_int_sized(
        &mut self,
        tag_type: TagType,
        data: i64,
        bytes: usize,
    ) -> Result<(), Error> {
        let width = wire_width(bytes)?;
        let bits = bytes as u32 * 8;
        if bits < 64 {
            let (min, max) = (-(1_i64 << (bits - 1)), (1_i64 << (bits - 1)) - 1);
            if data < min || data > max {
                error!("{} does not fit in {} bytes", data, bytes);
                return Err(Error::OutOfRange);
            }
        }
        self.put_int(tag_type, data, width)
    }

    /// Unsigned integer with a declared width of 1..=8 bytes, carried in the
    /// next standard wire width.
    pub fn put_uint_sized(
        &mut self,
        tag_type: TagType,
        data: u64,
        bytes: usize,
    ) -> Result<(), Error> {
        let width = wire_width(bytes)?;
        let bits = bytes as u32 * 8;
        if bits < 64 && data >> bits != 0 {
            error!("{} does not fit in {} bytes", data, bytes);
            return Err(Error::OutOfRange);
        }
        self.put_uint(tag_type, data, width)
    }

    pub fn put_bool(&mut self, tag_type: TagType, val: bool) -> Result<(), Error> {
        if val {
            self.put_control_tag(tag_type, ElementType::True)
        } else {
            self.put_control_tag(tag_type, ElementType::False)
        }
    }

    pub fn put_f32(&mut self, tag_type: TagType, data: f32) -> Result<(), Error> {
        self.put_control_tag(tag_type, ElementType::F32)?;
        self.buf.le_u32(data.to_bits());
        Ok(())
    }

    pub fn put_f64(&mut self, tag_type: TagType, data: f64) -> Result<(), Error> {
        self.put_control_tag(tag_type, ElementType::F64)?;
        self.buf.le_u64(data.to_bits());
        Ok(())
    }

    fn put_len_prefixed(
        &mut self,
        tag_type: TagType,
        element: ElementType,
        data: &[u8],
    ) -> Result<(), Error> {
        self.put_control_tag(tag_type, element)?;
        self.buf.le_uint(element.value_size(), data.len() as u64);
        self.buf.copy_from_slice(data);
        Ok(())
    }

    /// UTF-8 string, with the smallest length prefix that fits.
    pub fn put_utf8(&mut self, tag_type: TagType, data: &str) -> Result<(), Error> {
        self.put_len_prefixed(tag_type, ElementType::utf8_for_len(data.len()), data.as_bytes())
    }

    /// Octet string, with the smallest length prefix that fits.
    pub fn put_str(&mut self, tag_type: TagType, data: &[u8]) -> Result<(), Error> {
        self.put_len_prefixed(tag_type, ElementType::octets_for_len(data.len()), data)
    }

    pub fn put_null(&mut self, tag_type: TagType) -> Result<(), Error> {
        self.put_control_tag(tag_type, ElementType::Null)
    }

    fn start_container(&mut self, tag_type: TagType, container: ContainerType) -> Result<(), Error> {
        self.stack.check_room()?;
        self.put_control_tag(tag_type, container.element_type())?;
        self.stack.push(container, tag_type)?;
        trace!("Start {:?} {:?} at depth {}", container, tag_type, self.stack.depth());
        Ok(())
    }

    pub fn start_struct(&mut self, tag_type: TagType) -> Result<(), Error> {
        self.start_container(tag_type, ContainerType::Struct)
    }

    pub fn start_array(&mut self, tag_type: TagType) -> Result<(), Error> {
        self.start_container(tag_type, ContainerType::Array)
    }

    pub fn start_list(&mut self, tag_type: TagType) -> Result<(), Error> {
        self.start_container(tag_type, ContainerType::List)
    }

    fn end(&mut self, expected: Option<ContainerType>) -> Result<(), Error> {
        let frame = self.stack.pop(expected)?;
        trace!("End {:?} {:?}", frame.container, frame.tag);
        self.buf
            .le_u8(control_byte(TagControl::Anonymous, ElementType::EndCnt));
        Ok(())
    }

    pub fn end_struct(&mut self) -> Result<(), Error> {
        self.end(Some(ContainerType::Struct))
    }

    pub fn end_array(&mut self) -> Result<(), Error> {
        self.end(Some(ContainerType::Array))
    }

    pub fn end_list(&mut self) -> Result<(), Error> {
        self.end(Some(ContainerType::List))
    }

    /// Closes whichever container is open.
    pub fn end_container(&mut self) -> Result<(), Error> {
        self.end(None)
    }

    /// Writes an object through its [`ToTLV`] implementation. If it fails,
    /// the buffer and the container stack are restored to where they were.
    pub fn put_object(&mut self, tag_type: TagType, object: &dyn ToTLV) -> Result<(), Error> {
        let anchor = self.get_tail();
        let stack = self.stack.clone();
        let result = object.to_tlv(self, tag_type);
        if result.is_err() {
            self.rewind_to(anchor);
            self.stack = stack;
        }
        result
    }

    pub fn put_value(&mut self, tag_type: TagType, value: &Value) -> Result<(), Error> {
        self.put_object(tag_type, value)
    }

    /// Checks the bytes written so far: balanced containers, no duplicate
    /// structure tags, anonymous array members.
    pub fn validate(&mut self) -> Result<&mut Self, Error> {
        container::validate(self.buf.as_slice())?;
        Ok(self)
    }

    /// Finishes the encoding. Open containers, or any other structural
    /// problem, are reported instead of returning the bytes.
    pub fn get_encoded(self) -> Result<Vec<u8>, Error> {
        if !self.stack.is_empty() {
            error!("{} container(s) left open", self.stack.depth());
            return Err(Error::UnterminatedContainer(self.stack.depth()));
        }
        container::validate(self.buf.as_slice())?;
        Ok(self.buf.into_vec())
    }

    /// The bytes written so far, valid or not.
    pub fn as_slice(&self) -> &[u8] {
        self.buf.as_slice()
    }

    pub fn depth(&self) -> usize {
        self.stack.depth()
    }

    pub fn get_tail(&self) -> usize {
        self.buf.get_tail()
    }

    pub fn rewind_to(&mut self, anchor: usize) {
        self.buf.rewind_tail_to(anchor);
    }
}
