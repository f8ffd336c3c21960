use log::error;

use super::{
    element::{split_control, ContainerType, ElementType},
    tag::TagType,
};
use crate::{error::Error, utils::parsebuf::ParseBuf};

/// Maximum number of simultaneously open containers.
pub const MAX_CONTAINER_DEPTH: usize = 32;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    pub container: ContainerType,
    pub tag: TagType,
}

/// The currently open containers, innermost last.
#[derive(Debug, Default, Clone)]
pub struct ContainerStack {
    frames: heapless::Vec<Frame, MAX_CONTAINER_DEPTH>,
}

impl ContainerStack {
    pub fn new() -> Self {
        Self {
            frames: heapless::Vec::new(),
        }
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn top(&self) -> Option<&Frame> {
        self.frames.last()
    }

    pub fn current(&self) -> Option<ContainerType> {
        self.top().map(|f| f.container)
    }

    /// Confirms that `tag` may appear directly inside the open container.
    pub fn check_tag(&self, tag: TagType) -> Result<(), Error> {
        check_tag_in(self.current(), tag)
    }

    /// Fails before mutating if the stack is already full.
    pub fn check_room(&self) -> Result<(), Error> {
        if self.frames.len() == MAX_CONTAINER_DEPTH {
            error!("Container nesting exceeds {}", MAX_CONTAINER_DEPTH);
            return Err(Error::MaxDepthExceeded);
        }
        Ok(())
    }

    pub fn push(&mut self, container: ContainerType, tag: TagType) -> Result<(), Error> {
        self.frames
            .push(Frame { container, tag })
            .map_err(|_| Error::MaxDepthExceeded)
    }

    /// Pops the innermost frame. With `expected`, the frame must be of that kind.
    pub fn pop(&mut self, expected: Option<ContainerType>) -> Result<Frame, Error> {
        let top = *self.top().ok_or(Error::NoOpenContainer)?;
        if let Some(expected) = expected {
            if top.container != expected {
                error!(
                    "Closing {:?} while {:?} is the open container",
                    expected, top.container
                );
                return Err(Error::ContainerMismatch {
                    expected,
                    found: top.container,
                });
            }
        }
        self.frames.pop().ok_or(Error::NoOpenContainer)
    }
}

pub fn check_tag_in(container: Option<ContainerType>, tag: TagType) -> Result<(), Error> {
    let allowed = match container {
        Some(ContainerType::Array) => tag.is_anonymous(),
        Some(ContainerType::Struct) => !tag.is_anonymous(),
        Some(ContainerType::List) | None => true,
    };
    if allowed {
        Ok(())
    } else {
        error!("Tag {:?} is not allowed in {:?}", tag, container);
        Err(Error::TagNotAllowed { tag, container })
    }
}

struct ValidationFrame {
    container: ContainerType,
    seen: Vec<TagType>,
}

/// Walks an encoded buffer and confirms it is structurally sound:
/// containers are balanced, tags suit their container, and no tag repeats
/// within a structure. Values are skipped, not interpreted.
pub fn validate(buf: &[u8]) -> Result<(), Error> {
    let mut pb = ParseBuf::new(buf);
    let mut stack: Vec<ValidationFrame> = Vec::new();

    while !pb.is_empty() {
        let (tag_control, element_type) = split_control(pb.le_u8()?)?;
        let tag = TagType::decode(tag_control, &mut pb)?;

        if element_type == ElementType::EndCnt {
            if stack.pop().is_none() {
                error!("End of container with no open container");
                return Err(Error::NoOpenContainer);
            }
            continue;
        }

        let frame = stack.last_mut();
        check_tag_in(frame.as_ref().map(|f| f.container), tag)?;
        if let Some(frame) = frame {
            if frame.container == ContainerType::Struct {
                if frame.seen.contains(&tag) {
                    error!("Duplicate tag {:?} in structure", tag);
                    return Err(Error::DuplicateTag(tag));
                }
                frame.seen.push(tag);
            }
        }

        match element_type.container() {
            Some(container) => {
                if stack.len() == MAX_CONTAINER_DEPTH {
                    return Err(Error::MaxDepthExceeded);
                }
                stack.push(ValidationFrame {
                    container,
                    seen: Vec::new(),
                });
            }
            None => skip_value(element_type, &mut pb)?,
        }
    }

    if !stack.is_empty() {
        error!("{} container(s) left open", stack.len());
        return Err(Error::UnterminatedContainer(stack.len()));
    }
    Ok(())
}

/// Advances past the value bytes of a primitive element.
pub(crate) fn skip_value(element_type: ElementType, pb: &mut ParseBuf) -> Result<(), Error> {
    let size = element_type.value_size();
    if element_type.is_utf8() || element_type.is_octets() {
        let len = pb.le_uint(size)?;
        let len = usize::try_from(len).map_err(|_| Error::InvalidLength(len))?;
        pb.slice(len)?;
    } else {
        pb.slice(size)?;
    }
    Ok(())
}
