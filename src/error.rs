use thiserror::Error;

use crate::tlv::{ContainerType, ElementType, TagType};

/// The broad class an [`Error`] belongs to.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ErrorKind {
    Structural,
    Parsing,
    TypeMismatch,
    TagMismatch,
    Range,
    EndOfContainer,
}

#[derive(Error, Debug, PartialEq, Clone, Copy)]
pub enum Error {
    #[error("duplicate tag {0:?} in structure")]
    DuplicateTag(TagType),
    #[error("tag {tag:?} not allowed in {container:?}")]
    TagNotAllowed {
        tag: TagType,
        container: Option<ContainerType>,
    },
    #[error("expected end of {expected:?}, open container is {found:?}")]
    ContainerMismatch {
        expected: ContainerType,
        found: ContainerType,
    },
    #[error("no open container")]
    NoOpenContainer,
    #[error("{0} container(s) left open")]
    UnterminatedContainer(usize),
    #[error("container nesting deeper than the supported maximum")]
    MaxDepthExceeded,
    #[error("truncated packet")]
    TruncatedPacket,
    #[error("invalid control byte {0:#04x}")]
    InvalidControl(u8),
    #[error("invalid UTF-8 string")]
    InvalidUtf8,
    #[error("length {0} does not fit the platform")]
    InvalidLength(u64),
    #[error("expected {expected}, found {found:?}")]
    TypeMismatch {
        expected: &'static str,
        found: ElementType,
    },
    #[error("expected tag {expected:?}, found {found:?}")]
    TagMismatch { expected: TagType, found: TagType },
    #[error("value out of range")]
    OutOfRange,
    #[error("end of container")]
    EndOfContainer,
    #[error("TLV element not found")]
    TLVNotFound,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::DuplicateTag(_)
            | Error::TagNotAllowed { .. }
            | Error::ContainerMismatch { .. }
            | Error::NoOpenContainer
            | Error::UnterminatedContainer(_)
            | Error::MaxDepthExceeded => ErrorKind::Structural,
            Error::TruncatedPacket
            | Error::InvalidControl(_)
            | Error::InvalidUtf8
            | Error::InvalidLength(_) => ErrorKind::Parsing,
            Error::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            Error::TagMismatch { .. } | Error::TLVNotFound => ErrorKind::TagMismatch,
            Error::OutOfRange => ErrorKind::Range,
            Error::EndOfContainer => ErrorKind::EndOfContainer,
        }
    }
}

impl From<std::str::Utf8Error> for Error {
    fn from(_e: std::str::Utf8Error) -> Self {
        Self::InvalidUtf8
    }
}

impl From<std::num::TryFromIntError> for Error {
    fn from(_e: std::num::TryFromIntError) -> Self {
        Self::OutOfRange
    }
}
