//! A codec for the Tag-Length-Value format used by CHIP/Matter to carry
//! structured data between a controller and a device.
//!
//! ```
//! use chip_tlv::tlv::{TLVReader, TLVWriter, TagType};
//!
//! let mut tw = TLVWriter::new();
//! tw.start_struct(TagType::Anonymous).unwrap();
//! tw.put_u16(TagType::Context(1), 0xfff1).unwrap();
//! tw.end_struct().unwrap();
//! let bytes = tw.get_encoded().unwrap();
//!
//! let mut tr = TLVReader::new(&bytes);
//! tr.enter_struct(TagType::Anonymous).unwrap();
//! assert_eq!(tr.get_u16(TagType::Context(1)), Ok(0xfff1));
//! tr.exit_container().unwrap();
//! ```

extern crate self as chip_tlv;

pub mod error;
pub mod tlv;
pub mod utils;
