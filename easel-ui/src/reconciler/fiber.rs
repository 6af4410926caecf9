use std::rc::Rc;

use smartstring::alias::String as SmartString;

use crate::host::{HostChild, HostConfig, InternalHandle};
use crate::props::Props;

/// Committed record of one host node.
pub(crate) struct HostFiber<H: HostConfig> {
    pub handle: InternalHandle,
    pub ty: SmartString,
    pub key: Option<SmartString>,
    pub props: Rc<Props>,
    pub instance: H::Instance,
    /// Children were supplied as text content instead of child nodes.
    pub text_content: bool,
    pub children: Vec<Fiber<H>>,
}

pub(crate) struct TextFiber<H: HostConfig> {
    pub handle: InternalHandle,
    pub text: SmartString,
    pub instance: H::TextInstance,
}

pub(crate) enum Fiber<H: HostConfig> {
    Host(HostFiber<H>),
    Text(TextFiber<H>),
}

impl<H: HostConfig> Fiber<H> {
    pub fn key(&self) -> Option<&str> {
        match self {
            Fiber::Host(fiber) => fiber.key.as_deref(),
            Fiber::Text(_) => None,
        }
    }

    pub fn handle(&self) -> InternalHandle {
        match self {
            Fiber::Host(fiber) => fiber.handle,
            Fiber::Text(fiber) => fiber.handle,
        }
    }

    pub fn host_child(&self) -> HostChild<H::Instance, H::TextInstance> {
        match self {
            Fiber::Host(fiber) => HostChild::Instance(fiber.instance),
            Fiber::Text(fiber) => HostChild::Text(fiber.instance.clone()),
        }
    }
}
