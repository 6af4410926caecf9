use smallvec::SmallVec;

use super::event::EventType;
use super::object::NodeKind;
use super::NodeId;

/// Journal entry for one scene mutation, recorded only while journaling is on.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneCommand {
    Create {
        node: NodeId,
        kind: NodeKind,
    },
    AddChild {
        parent: NodeId,
        child: NodeId,
    },
    AddChildAt {
        parent: NodeId,
        child: NodeId,
        index: usize,
    },
    RemoveChild {
        parent: NodeId,
        child: NodeId,
    },
    Set {
        node: NodeId,
        keys: SmallVec<[&'static str; 4]>,
    },
    On {
        node: NodeId,
        event: EventType,
    },
    Off {
        node: NodeId,
        event: EventType,
    },
    Dispose {
        node: NodeId,
    },
}
