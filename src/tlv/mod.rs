//! Matter/CHIP Tag-Length-Value encoding.
//!
//! Every element starts with a control byte: the tag control in the top 3
//! bits and the element type in the low 5 bits, followed by the tag bytes
//! and the value. Containers have no length; they run until an
//! end-of-container control byte.

mod container;
mod element;
mod reader;
mod tag;
mod traits;
mod value;
mod writer;

pub use container::{validate, ContainerStack, Frame, MAX_CONTAINER_DEPTH};
pub use element::{
    control_byte, split_control, wire_width, ContainerType, ElementHeader, ElementType,
    ElementValue, TYPE_MASK,
};
pub use reader::*;
pub use tag::{TagControl, TagType, TAG_MASK, TAG_SHIFT_BITS, TAG_SIZE_MAP};
pub use traits::*;
pub use value::{decode_all, print_tlv_list, Value};
pub use writer::*;

#[cfg(feature = "derive")]
pub use tlv_macro_derive::{FromTLV, ToTLV};
