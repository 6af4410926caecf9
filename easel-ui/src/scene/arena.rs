use smallvec::SmallVec;
use tracing::trace;

use super::commands::SceneCommand;
use super::event::{EventHandler, EventType};
use super::object::{DisplayObject, NodeKind, Subscriptions};
use super::NodeId;
use crate::error::{Error, Result};
use crate::props::{PropChanges, Props};

struct Slot {
    generation: u32,
    object: Option<DisplayObject>,
}

/// Arena-backed retained scene graph.
pub struct SceneGraph {
    slots: Vec<Slot>,
    free_list: Vec<u32>,
    journal: Option<Vec<SceneCommand>>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            journal: None,
        }
    }

    /// Constructs a detached instance.
    pub fn create(&mut self, kind: NodeKind, properties: Props) -> NodeId {
        let object = DisplayObject::new(kind, properties);
        let id = if let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index as usize];
            slot.object = Some(object);
            NodeId {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                object: Some(object),
            });
            NodeId {
                index,
                generation: 0,
            }
        };
        self.record(SceneCommand::Create { node: id, kind });
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&DisplayObject> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.object.as_ref()
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut DisplayObject> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.object.as_mut()
    }

    /// Like [`get`](Self::get) but a stale handle is an error.
    pub fn object(&self, id: NodeId) -> Result<&DisplayObject> {
        self.get(id).ok_or(Error::StaleNode(id))
    }

    fn object_mut(&mut self, id: NodeId) -> Result<&mut DisplayObject> {
        self.get_mut(id).ok_or(Error::StaleNode(id))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Number of live instances.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |o| o.children.as_slice())
    }

    /// Current position of `child` in `parent`'s child list.
    pub fn child_index(&self, parent: NodeId, child: NodeId) -> Option<usize> {
        self.get(parent)?.children.iter().position(|&c| c == child)
    }

    /// True when `ancestor` is `node` or one of its parents.
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Appends `child` to the end of `parent`'s list, detaching it from any
    /// previous parent first.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.prepare_insert(parent, child)?;
        self.object_mut(parent)?.children.push(child);
        self.object_mut(child)?.parent = Some(parent);
        self.record(SceneCommand::AddChild { parent, child });
        Ok(())
    }

    /// Inserts `child` at `index` (clamped to the list length), detaching it
    /// from any previous parent first.
    pub fn add_child_at(&mut self, parent: NodeId, child: NodeId, index: usize) -> Result<()> {
        self.prepare_insert(parent, child)?;
        let children = &mut self.object_mut(parent)?.children;
        let index = index.min(children.len());
        children.insert(index, child);
        self.object_mut(child)?.parent = Some(parent);
        self.record(SceneCommand::AddChildAt {
            parent,
            child,
            index,
        });
        Ok(())
    }

    fn prepare_insert(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let kind = self.object(parent)?.kind();
        if !kind.accepts_children() {
            return Err(Error::NotAContainer(parent));
        }
        let previous = self.object(child)?.parent;
        if self.is_ancestor(child, parent) {
            return Err(Error::CyclicInsert);
        }
        if let Some(previous) = previous {
            self.remove_child(previous, child)?;
        }
        Ok(())
    }

    /// Detaches `child` from `parent`. Returns `false` when it was not a child.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<bool> {
        let children = &mut self.object_mut(parent)?.children;
        let Some(index) = children.iter().position(|&c| c == child) else {
            return Ok(false);
        };
        children.remove(index);
        if let Some(object) = self.get_mut(child) {
            object.parent = None;
        }
        self.record(SceneCommand::RemoveChild { parent, child });
        Ok(true)
    }

    /// Registers a listener. The same handler may be registered twice.
    pub fn add_listener(&mut self, id: NodeId, event: EventType, handler: EventHandler) -> Result<()> {
        self.object_mut(id)?
            .listeners
            .entry(event)
            .or_default()
            .push(handler);
        self.record(SceneCommand::On { node: id, event });
        Ok(())
    }

    /// Removes one registration of `handler`, matched by identity.
    pub fn remove_listener(&mut self, id: NodeId, event: EventType, handler: &EventHandler) -> Result<bool> {
        let object = self.object_mut(id)?;
        let Some(list) = object.listeners.get_mut(&event) else {
            return Ok(false);
        };
        let Some(index) = list.iter().position(|h| h.ptr_eq(handler)) else {
            return Ok(false);
        };
        list.remove(index);
        if list.is_empty() {
            object.listeners.remove(&event);
        }
        self.record(SceneCommand::Off { node: id, event });
        Ok(true)
    }

    /// Snapshot of the listeners for one event; empty for stale handles.
    pub fn listeners(&self, id: NodeId, event: EventType) -> SmallVec<[EventHandler; 1]> {
        self.get(id)
            .and_then(|o| o.listeners.get(&event))
            .cloned()
            .unwrap_or_default()
    }

    pub fn listener_count(&self, id: NodeId, event: EventType) -> usize {
        self.get(id).map_or(0, |o| o.listener_count(event))
    }

    pub fn subscriptions(&self, id: NodeId) -> Option<&Subscriptions> {
        self.get(id).map(|o| &o.subscriptions)
    }

    pub(crate) fn subscriptions_mut(&mut self, id: NodeId) -> Result<&mut Subscriptions> {
        Ok(&mut self.object_mut(id)?.subscriptions)
    }

    /// Applies a bulk property change. `None` values unset the key.
    pub fn set(&mut self, id: NodeId, changes: &PropChanges) -> Result<()> {
        let object = self.object_mut(id)?;
        for (name, value) in changes.iter() {
            match value {
                Some(value) => {
                    object.properties.insert(name, value.clone());
                }
                None => {
                    object.properties.remove(name);
                }
            }
        }
        trace!(node = ?id, keys = changes.len(), "set");
        if self.journal.is_some() {
            self.record(SceneCommand::Set {
                node: id,
                keys: changes.keys().collect(),
            });
        }
        Ok(())
    }

    /// `node` followed by every descendant, children before their parents.
    pub fn descendants_post_order(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![(node, false)];
        while let Some((id, expanded)) = stack.pop() {
            if expanded {
                out.push(id);
                continue;
            }
            stack.push((id, true));
            for &child in self.children(id).iter().rev() {
                stack.push((child, false));
            }
        }
        out
    }

    /// Frees `node` and its whole subtree, detaching it from its parent if
    /// still attached. Returns the number of instances reclaimed.
    pub fn dispose_subtree(&mut self, node: NodeId) -> Result<usize> {
        if let Some(parent) = self.object(node)?.parent {
            self.remove_child(parent, node)?;
        }
        let doomed = self.descendants_post_order(node);
        for &id in &doomed {
            let slot = &mut self.slots[id.index as usize];
            slot.object = None;
            slot.generation = slot.generation.wrapping_add(1);
            self.free_list.push(id.index);
            self.record(SceneCommand::Dispose { node: id });
        }
        Ok(doomed.len())
    }

    /// Starts or stops journaling mutations. Stopping discards the journal.
    pub fn record_commands(&mut self, enabled: bool) {
        self.journal = enabled.then(Vec::new);
    }

    pub fn take_commands(&mut self) -> Vec<SceneCommand> {
        self.journal.as_mut().map(std::mem::take).unwrap_or_default()
    }

    fn record(&mut self, command: SceneCommand) {
        if let Some(journal) = &mut self.journal {
            journal.push(command);
        }
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}
