use super::{ElementType, TLVReader, TLVWriter, TagType};
use crate::error::Error;

pub trait ToTLV {
    fn to_tlv(&self, tw: &mut TLVWriter, tag: TagType) -> Result<(), Error>;
}

pub trait FromTLV<'a> {
    fn from_tlv(tr: &mut TLVReader<'a>, tag: TagType) -> Result<Self, Error>
    where
        Self: Sized;

    // I don't think anybody except Option<T> will define this
    fn tlv_not_found() -> Result<Self, Error>
    where
        Self: Sized,
    {
        Err(Error::TLVNotFound)
    }
}

macro_rules! tlv_for {
    ($(($t:ty, $put:ident, $get:ident))*) => {
        $(
            impl ToTLV for $t {
                fn to_tlv(&self, tw: &mut TLVWriter, tag: TagType) -> Result<(), Error> {
                    tw.$put(tag, *self)
                }
            }

            impl<'a> FromTLV<'a> for $t {
                fn from_tlv(tr: &mut TLVReader<'a>, tag: TagType) -> Result<Self, Error> {
                    tr.$get(tag)
                }
            }
        )*
    };
}

// Generate ToTLV and FromTLV for standard data types
tlv_for!(
    (i8, put_i8, get_i8)
    (i16, put_i16, get_i16)
    (i32, put_i32, get_i32)
    (i64, put_i64, get_i64)
    (u8, put_u8, get_u8)
    (u16, put_u16, get_u16)
    (u32, put_u32, get_u32)
    (u64, put_u64, get_u64)
    (bool, put_bool, get_bool)
    (f32, put_f32, get_f32)
    (f64, put_f64, get_f64)
);

/// Octet string borrowed from the buffer it was decoded from.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct OctetStr<'a>(pub &'a [u8]);

impl<'a> ToTLV for OctetStr<'a> {
    fn to_tlv(&self, tw: &mut TLVWriter, tag: TagType) -> Result<(), Error> {
        tw.put_str(tag, self.0)
    }
}

impl<'a> FromTLV<'a> for OctetStr<'a> {
    fn from_tlv(tr: &mut TLVReader<'a>, tag: TagType) -> Result<Self, Error> {
        tr.get_str(tag).map(OctetStr)
    }
}

/// Owned octet string.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OctetString(pub Vec<u8>);

impl ToTLV for OctetString {
    fn to_tlv(&self, tw: &mut TLVWriter, tag: TagType) -> Result<(), Error> {
        tw.put_str(tag, &self.0)
    }
}

impl<'a> FromTLV<'a> for OctetString {
    fn from_tlv(tr: &mut TLVReader<'a>, tag: TagType) -> Result<Self, Error> {
        Ok(OctetString(tr.get_str(tag)?.to_vec()))
    }
}

/// UTF-8 string borrowed from the buffer it was decoded from.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct UtfStr<'a>(pub &'a str);

impl<'a> ToTLV for UtfStr<'a> {
    fn to_tlv(&self, tw: &mut TLVWriter, tag: TagType) -> Result<(), Error> {
        tw.put_utf8(tag, self.0)
    }
}

impl<'a> FromTLV<'a> for UtfStr<'a> {
    fn from_tlv(tr: &mut TLVReader<'a>, tag: TagType) -> Result<Self, Error> {
        tr.get_utf8(tag).map(UtfStr)
    }
}

impl<'b> ToTLV for &'b str {
    fn to_tlv(&self, tw: &mut TLVWriter, tag: TagType) -> Result<(), Error> {
        tw.put_utf8(tag, self)
    }
}

impl<'a> FromTLV<'a> for &'a str {
    fn from_tlv(tr: &mut TLVReader<'a>, tag: TagType) -> Result<Self, Error> {
        tr.get_utf8(tag)
    }
}

impl ToTLV for String {
    fn to_tlv(&self, tw: &mut TLVWriter, tag: TagType) -> Result<(), Error> {
        tw.put_utf8(tag, self)
    }
}

impl<'a> FromTLV<'a> for String {
    fn from_tlv(tr: &mut TLVReader<'a>, tag: TagType) -> Result<Self, Error> {
        Ok(tr.get_utf8(tag)?.to_owned())
    }
}

/// An optional field: nothing is written for `None`, and a field missing
/// from the input decodes as `None`.
impl<T: ToTLV> ToTLV for Option<T> {
    fn to_tlv(&self, tw: &mut TLVWriter, tag: TagType) -> Result<(), Error> {
        match self {
            Some(s) => s.to_tlv(tw, tag),
            None => Ok(()),
        }
    }
}

impl<'a, T: FromTLV<'a>> FromTLV<'a> for Option<T> {
    fn from_tlv(tr: &mut TLVReader<'a>, tag: TagType) -> Result<Self, Error> {
        match tr.peek_element() {
            Ok(header) if header.tag == tag => Ok(Some(T::from_tlv(tr, tag)?)),
            Ok(_) | Err(Error::EndOfContainer) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn tlv_not_found() -> Result<Self, Error> {
        Ok(None)
    }
}

/// A value that may be Null on the wire.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Nullable<T> {
    Null,
    NotNull(T),
}

impl<T> Nullable<T> {
    pub fn is_null(&self) -> bool {
        matches!(self, Nullable::Null)
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Nullable::Null => None,
            Nullable::NotNull(v) => Some(v),
        }
    }
}

impl<T> From<Option<T>> for Nullable<T> {
    fn from(o: Option<T>) -> Self {
        match o {
            Some(v) => Nullable::NotNull(v),
            None => Nullable::Null,
        }
    }
}

impl<T: ToTLV> ToTLV for Nullable<T> {
    fn to_tlv(&self, tw: &mut TLVWriter, tag: TagType) -> Result<(), Error> {
        match self {
            Nullable::Null => tw.put_null(tag),
            Nullable::NotNull(v) => v.to_tlv(tw, tag),
        }
    }
}

impl<'a, T: FromTLV<'a>> FromTLV<'a> for Nullable<T> {
    fn from_tlv(tr: &mut TLVReader<'a>, tag: TagType) -> Result<Self, Error> {
        if tr.peek_element()?.element_type == ElementType::Null {
            tr.get_null(tag)?;
            Ok(Nullable::Null)
        } else {
            Ok(Nullable::NotNull(T::from_tlv(tr, tag)?))
        }
    }
}

impl<'b, T: ToTLV> ToTLV for &'b [T] {
    fn to_tlv(&self, tw: &mut TLVWriter, tag: TagType) -> Result<(), Error> {
        tw.start_array(tag)?;
        for i in self.iter() {
            i.to_tlv(tw, TagType::Anonymous)?;
        }
        tw.end_array()
    }
}

impl<T: ToTLV> ToTLV for Vec<T> {
    fn to_tlv(&self, tw: &mut TLVWriter, tag: TagType) -> Result<(), Error> {
        self.as_slice().to_tlv(tw, tag)
    }
}

impl<'a, T: FromTLV<'a>> FromTLV<'a> for Vec<T> {
    fn from_tlv(tr: &mut TLVReader<'a>, tag: TagType) -> Result<Self, Error> {
        tr.enter_array(tag)?;
        let mut v = Vec::new();
        while !tr.is_end_of_container() {
            v.push(T::from_tlv(tr, TagType::Anonymous)?);
        }
        tr.exit_container()?;
        Ok(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_skips_absent() {
        let mut tw = TLVWriter::new();
        tw.start_struct(TagType::Anonymous).unwrap();
        Some(5_u8).to_tlv(&mut tw, TagType::Context(0)).unwrap();
        None::<u8>.to_tlv(&mut tw, TagType::Context(1)).unwrap();
        7_u16.to_tlv(&mut tw, TagType::Context(2)).unwrap();
        tw.end_struct().unwrap();
        let b = tw.get_encoded().unwrap();
        assert_eq!(b, [0x15, 0x24, 0, 5, 0x25, 2, 7, 0, 0x18]);

        let mut tr = TLVReader::new(&b);
        tr.enter_struct(TagType::Anonymous).unwrap();
        assert_eq!(tr.get::<Option<u8>>(TagType::Context(0)), Ok(Some(5)));
        assert_eq!(tr.get::<Option<u8>>(TagType::Context(1)), Ok(None));
        assert_eq!(tr.get::<u16>(TagType::Context(2)), Ok(7));
        assert_eq!(tr.get::<Option<u8>>(TagType::Context(3)), Ok(None));
        tr.exit_container().unwrap();
    }

    #[test]
    fn test_nullable() {
        let mut tw = TLVWriter::new();
        tw.start_list(TagType::Anonymous).unwrap();
        Nullable::<u8>::Null.to_tlv(&mut tw, TagType::Context(0)).unwrap();
        Nullable::NotNull(3_u8).to_tlv(&mut tw, TagType::Context(1)).unwrap();
        tw.end_list().unwrap();
        let b = tw.get_encoded().unwrap();
        assert_eq!(b, [0x17, 0x34, 0, 0x24, 1, 3, 0x18]);

        let mut tr = TLVReader::new(&b);
        tr.enter_list(TagType::Anonymous).unwrap();
        assert!(tr.is_null());
        assert_eq!(tr.get::<Nullable<u8>>(TagType::Context(0)), Ok(Nullable::Null));
        assert_eq!(
            tr.get::<Nullable<u8>>(TagType::Context(1)),
            Ok(Nullable::NotNull(3))
        );
    }

    #[test]
    fn test_vec_as_array() {
        let v = vec![String::from("a"), String::from("bc")];
        let mut tw = TLVWriter::new();
        v.to_tlv(&mut tw, TagType::Context(9)).unwrap();
        let b = tw.get_encoded().unwrap();
        assert_eq!(b, [0x36, 9, 0x0c, 1, b'a', 0x0c, 2, b'b', b'c', 0x18]);

        let mut tr = TLVReader::new(&b);
        let decoded: Vec<&str> = tr.get(TagType::Context(9)).unwrap();
        assert_eq!(decoded, ["a", "bc"]);
        assert!(tr.is_end_of_tlv());
    }

    #[test]
    fn test_octets() {
        let mut tw = TLVWriter::new();
        OctetStr(&[1, 2]).to_tlv(&mut tw, TagType::Anonymous).unwrap();
        let b = tw.get_encoded().unwrap();
        let mut tr = TLVReader::new(&b);
        assert_eq!(
            OctetString::from_tlv(&mut tr, TagType::Anonymous),
            Ok(OctetString(vec![1, 2]))
        );
    }

    #[test]
    fn test_required_field_missing() {
        assert_eq!(u8::tlv_not_found(), Err(Error::TLVNotFound));
        assert_eq!(Option::<u8>::tlv_not_found(), Ok(None));
    }
}
