use std::fmt;

use num_derive::FromPrimitive;

use crate::{
    error::Error,
    utils::{parsebuf::ParseBuf, writebuf::WriteBuf},
};

pub const TAG_SHIFT_BITS: u8 = 5;
pub const TAG_MASK: u8 = 0xe0;
pub const MAX_TAG_INDEX: usize = 8;

pub static TAG_SIZE_MAP: [usize; MAX_TAG_INDEX] = [
    0, // Anonymous
    1, // Context
    2, // CommonPrf16
    4, // CommonPrf32
    2, // ImplPrf16
    4, // ImplPrf32
    6, // FullQual48
    8, // FullQual64
];

/// The 3-bit tag control field of a control byte.
#[derive(FromPrimitive, Debug, Copy, Clone, PartialEq, Eq)]
pub enum TagControl {
    Anonymous = 0,
    Context = 1,
    CommonPrf16 = 2,
    CommonPrf32 = 3,
    ImplPrf16 = 4,
    ImplPrf32 = 5,
    FullQual48 = 6,
    FullQual64 = 7,
}

impl TagControl {
    pub fn size(self) -> usize {
        TAG_SIZE_MAP[self as usize]
    }
}

/// A tag as the caller sees it. The wire size class is not part of the
/// tag: it is derived from the tag number, so equal tags always encode
/// identically.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TagType {
    Anonymous,
    Context(u8),
    CommonPrf(u32),
    ImplPrf(u32),
    FullQual {
        vendor_id: u16,
        profile: u16,
        tag: u32,
    },
}

impl TagType {
    pub fn is_anonymous(&self) -> bool {
        matches!(self, TagType::Anonymous)
    }

    pub fn is_context(&self) -> bool {
        matches!(self, TagType::Context(_))
    }

    pub fn is_profile(&self) -> bool {
        matches!(
            self,
            TagType::CommonPrf(_) | TagType::ImplPrf(_) | TagType::FullQual { .. }
        )
    }

    /// The smallest tag control able to carry this tag.
    pub fn control(&self) -> TagControl {
        let short = |t: u32| t <= u16::MAX as u32;
        match *self {
            TagType::Anonymous => TagControl::Anonymous,
            TagType::Context(_) => TagControl::Context,
            TagType::CommonPrf(t) if short(t) => TagControl::CommonPrf16,
            TagType::CommonPrf(_) => TagControl::CommonPrf32,
            TagType::ImplPrf(t) if short(t) => TagControl::ImplPrf16,
            TagType::ImplPrf(_) => TagControl::ImplPrf32,
            TagType::FullQual { tag, .. } if short(tag) => TagControl::FullQual48,
            TagType::FullQual { .. } => TagControl::FullQual64,
        }
    }

    /// Number of tag bytes following the control byte.
    pub fn encoded_len(&self) -> usize {
        self.control().size()
    }

    /// Writes the tag bytes (not the control byte).
    pub fn encode(&self, buf: &mut WriteBuf) {
        let size = self.encoded_len();
        match *self {
            TagType::Anonymous => (),
            TagType::Context(t) => buf.le_u8(t),
            TagType::CommonPrf(t) | TagType::ImplPrf(t) => buf.le_uint(size, t as u64),
            TagType::FullQual {
                vendor_id,
                profile,
                tag,
            } => {
                buf.le_u16(vendor_id);
                buf.le_u16(profile);
                buf.le_uint(size - 4, tag as u64);
            }
        }
    }

    /// Reads the tag bytes announced by `control`.
    pub fn decode(control: TagControl, pb: &mut ParseBuf) -> Result<TagType, Error> {
        let tag = match control {
            TagControl::Anonymous => TagType::Anonymous,
            TagControl::Context => TagType::Context(pb.le_u8()?),
            TagControl::CommonPrf16 => TagType::CommonPrf(pb.le_u16()? as u32),
            TagControl::CommonPrf32 => TagType::CommonPrf(pb.le_u32()?),
            TagControl::ImplPrf16 => TagType::ImplPrf(pb.le_u16()? as u32),
            TagControl::ImplPrf32 => TagType::ImplPrf(pb.le_u32()?),
            TagControl::FullQual48 | TagControl::FullQual64 => {
                let vendor_id = pb.le_u16()?;
                let profile = pb.le_u16()?;
                let tag = pb.le_uint(control.size() - 4)? as u32;
                TagType::FullQual {
                    vendor_id,
                    profile,
                    tag,
                }
            }
        };
        Ok(tag)
    }
}

impl Default for TagType {
    fn default() -> Self {
        TagType::Anonymous
    }
}

impl fmt::Display for TagType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagType::Anonymous => Ok(()),
            TagType::Context(t) => write!(f, "{}", t),
            TagType::CommonPrf(t) => write!(f, "Common({})", t),
            TagType::ImplPrf(t) => write!(f, "Implicit({})", t),
            TagType::FullQual {
                vendor_id,
                profile,
                tag,
            } => write!(f, "{:04x}:{:04x}:{}", vendor_id, profile, tag),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(tag: TagType) -> Vec<u8> {
        let mut buf = WriteBuf::new();
        tag.encode(&mut buf);
        buf.into_vec()
    }

    #[test]
    fn test_size_class_selection() {
        assert_eq!(TagType::Anonymous.control(), TagControl::Anonymous);
        assert_eq!(TagType::Context(255).control(), TagControl::Context);
        assert_eq!(TagType::CommonPrf(0xffff).control(), TagControl::CommonPrf16);
        assert_eq!(TagType::CommonPrf(0x10000).control(), TagControl::CommonPrf32);
        assert_eq!(TagType::ImplPrf(1).control(), TagControl::ImplPrf16);
        assert_eq!(TagType::ImplPrf(0x12345).control(), TagControl::ImplPrf32);
        let fq = |tag| TagType::FullQual {
            vendor_id: 0xfff1,
            profile: 5,
            tag,
        };
        assert_eq!(fq(1).control(), TagControl::FullQual48);
        assert_eq!(fq(0x1_0000).control(), TagControl::FullQual64);
    }

    #[test]
    fn test_encoding_is_stable() {
        let tag = TagType::CommonPrf(0x0102_0304);
        assert_eq!(encode(tag), encode(tag));
        assert_eq!(encode(tag), [4, 3, 2, 1]);
    }

    #[test]
    fn test_fully_qualified_bytes() {
        let tag = TagType::FullQual {
            vendor_id: 0,
            profile: 5,
            tag: 1,
        };
        assert_eq!(encode(tag), [0, 0, 5, 0, 1, 0]);

        let tag = TagType::FullQual {
            vendor_id: 0xfff1,
            profile: 0xdead,
            tag: 0xaabb_ccdd,
        };
        let b = encode(tag);
        assert_eq!(b, [0xf1, 0xff, 0xad, 0xde, 0xdd, 0xcc, 0xbb, 0xaa]);
        let mut pb = ParseBuf::new(&b);
        assert_eq!(TagType::decode(TagControl::FullQual64, &mut pb), Ok(tag));
    }

    #[test]
    fn test_decode_truncated_tag() {
        let b = [0x01];
        let mut pb = ParseBuf::new(&b);
        assert_eq!(
            TagType::decode(TagControl::CommonPrf32, &mut pb),
            Err(Error::TruncatedPacket)
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", TagType::Anonymous), "");
        assert_eq!(format!("{}", TagType::Context(3)), "3");
        let fq = TagType::FullQual {
            vendor_id: 0xfff1,
            profile: 5,
            tag: 9,
        };
        assert_eq!(format!("{}", fq), "fff1:0005:9");
    }
}
