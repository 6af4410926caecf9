//! Retained scene graph the host adapter mutates.
//!
//! Instances live in a generational arena and are addressed by [`NodeId`];
//! a handle to a disposed instance stays detectable instead of aliasing a
//! newer one.

mod arena;
mod commands;
mod display_list;
mod event;
mod object;

use std::cell::RefCell;
use std::rc::Rc;

pub use arena::SceneGraph;
pub use commands::SceneCommand;
pub use display_list::DrawCommand;
pub use event::{dispatch, Event, EventHandler, EventType};
pub use object::{DisplayObject, NodeKind, Subscriptions};

/// Shared, single-threaded handle to a scene graph.
pub type SharedScene = Rc<RefCell<SceneGraph>>;

/// Handle to an instance in a [`SceneGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl NodeId {
    pub fn index(self) -> u32 {
        self.index
    }
}
