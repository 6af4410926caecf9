use std::fmt;
use std::rc::Rc;

use smartstring::alias::String as SmartString;
use tracing::{debug, trace, warn};

use super::{CommitMode, HostChild, HostConfig, InternalHandle, NoContext, UpdateSignal, create_instance};
use crate::error::{Error, Result};
use crate::props::{PropValue, Props, apply_props, unsubscribe_all};
use crate::scene::{NodeId, SceneGraph, SharedScene};
use crate::scheduler::{CallbackId, IdleCallback, IdleScheduler};

type Child = HostChild<NodeId, SmartString>;

/// Host adapter driving a shared [`SceneGraph`].
#[derive(Clone)]
pub struct EaselHost {
    scene: SharedScene,
    idle: Rc<dyn IdleScheduler>,
}

impl EaselHost {
    pub fn new(scene: SharedScene, idle: Rc<dyn IdleScheduler>) -> Self {
        Self { scene, idle }
    }

    pub fn scene(&self) -> &SharedScene {
        &self.scene
    }
}

impl fmt::Debug for EaselHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EaselHost")
            .field("instances", &self.scene.borrow().len())
            .finish_non_exhaustive()
    }
}

/// Text children must have been flattened into their parent's props.
fn instance(child: &Child) -> Result<NodeId> {
    match child {
        HostChild::Instance(id) => Ok(*id),
        HostChild::Text(_) => Err(Error::UnflattenedText),
    }
}

/// Moves `child` to the end of `parent`, detaching it first when it is
/// already there.
fn append(scene: &mut SceneGraph, parent: NodeId, child: NodeId) -> Result<()> {
    if scene.parent(child) == Some(parent) {
        scene.remove_child(parent, child)?;
    }
    scene.add_child(parent, child)
}

fn insert_before(scene: &mut SceneGraph, parent: NodeId, child: NodeId, before: NodeId) -> Result<()> {
    if child == before {
        return Err(Error::InsertBeforeSelf);
    }
    if scene.child_index(parent, before).is_none() {
        return Err(Error::ChildNotFound { parent, child: before });
    }
    if scene.parent(child) == Some(parent) {
        scene.remove_child(parent, child)?;
    }
    // Resolved after the detach so a move within `parent` lands before `before`
    let index = scene
        .child_index(parent, before)
        .ok_or(Error::ChildNotFound { parent, child: before })?;
    scene.add_child_at(parent, child, index)
}

/// Unbinds every handler in `child`'s subtree, detaches it, then frees it.
fn remove(scene: &mut SceneGraph, parent: NodeId, child: NodeId) -> Result<()> {
    if scene.child_index(parent, child).is_none() {
        return Err(Error::ChildNotFound { parent, child });
    }
    let mut unbound = 0;
    for id in scene.descendants_post_order(child) {
        unbound += unsubscribe_all(scene, id)?;
    }
    scene.remove_child(parent, child)?;
    let freed = scene.dispose_subtree(child)?;
    debug!(node = ?child, unbound, freed, "remove child");
    Ok(())
}

/// Unbinds and frees an instance that never reached the graph.
fn discard(scene: &mut SceneGraph, node: NodeId) -> Result<()> {
    for id in scene.descendants_post_order(node) {
        unsubscribe_all(scene, id)?;
    }
    let freed = scene.dispose_subtree(node)?;
    trace!(node = ?node, freed, "discard");
    Ok(())
}

impl HostConfig for EaselHost {
    type Instance = NodeId;
    type TextInstance = SmartString;
    type Container = NodeId;
    type HostContext = NoContext;
    type UpdatePayload = UpdateSignal;
    type PublicInstance = NodeId;

    fn get_root_host_context(&self, _root: &NodeId) -> NoContext {
        NoContext
    }

    fn get_child_host_context(&self, _parent: &NoContext, _ty: &str) -> NoContext {
        NoContext
    }

    fn get_public_instance(&self, instance: &NodeId) -> NodeId {
        *instance
    }

    fn create_instance(
        &self,
        ty: &str,
        props: &Props,
        _root: &NodeId,
        _context: &NoContext,
        handle: InternalHandle,
    ) -> Result<NodeId> {
        trace!(ty, handle = handle.0, "create_instance");
        create_instance(&mut self.scene.borrow_mut(), ty, props)
    }

    fn create_text_instance(
        &self,
        text: &str,
        _root: &NodeId,
        _context: &NoContext,
        _handle: InternalHandle,
    ) -> SmartString {
        text.into()
    }

    fn append_initial_child(&self, parent: &NodeId, child: &Child) -> Result<()> {
        let child = instance(child)?;
        self.scene.borrow_mut().add_child(*parent, child)
    }

    fn finalize_initial_children(&self, _instance: &NodeId, _ty: &str, _props: &Props) -> bool {
        false
    }

    fn should_set_text_content(&self, props: &Props) -> bool {
        matches!(props.get("children"), Some(PropValue::Str(_) | PropValue::Number(_)))
    }

    fn should_deprioritize_subtree(&self, _ty: &str, _props: &Props) -> bool {
        false
    }

    fn prepare_update(&self, _instance: &NodeId, _ty: &str, _old: &Props, _new: &Props) -> Option<UpdateSignal> {
        Some(UpdateSignal)
    }

    fn prepare_for_commit(&self) {}

    fn reset_after_commit(&self) {}

    fn commit_mount(&self, _instance: &NodeId, _ty: &str, _props: &Props) {}

    fn commit_update(
        &self,
        instance: &NodeId,
        _payload: &UpdateSignal,
        ty: &str,
        old_props: &Props,
        new_props: &Props,
    ) -> Result<()> {
        trace!(node = ?instance, ty, "commit_update");
        apply_props(&mut self.scene.borrow_mut(), *instance, new_props, Some(old_props))
    }

    fn commit_text_update(&self, _text: &SmartString, _old_text: &str, _new_text: &str) {}

    fn reset_text_content(&self, _instance: &NodeId) {}

    fn append_child(&self, parent: &NodeId, child: &Child) -> Result<()> {
        let child = instance(child)?;
        trace!(parent = ?parent, child = ?child, "append_child");
        append(&mut self.scene.borrow_mut(), *parent, child)
    }

    fn append_child_to_container(&self, container: &NodeId, child: &Child) -> Result<()> {
        let child = instance(child)?;
        trace!(container = ?container, child = ?child, "append_child_to_container");
        append(&mut self.scene.borrow_mut(), *container, child)
    }

    fn insert_before(&self, parent: &NodeId, child: &Child, before: &Child) -> Result<()> {
        let (child, before) = (instance(child)?, instance(before)?);
        trace!(parent = ?parent, child = ?child, before = ?before, "insert_before");
        insert_before(&mut self.scene.borrow_mut(), *parent, child, before)
    }

    fn insert_in_container_before(&self, container: &NodeId, child: &Child, before: &Child) -> Result<()> {
        let (child, before) = (instance(child)?, instance(before)?);
        trace!(container = ?container, child = ?child, before = ?before, "insert_in_container_before");
        insert_before(&mut self.scene.borrow_mut(), *container, child, before)
    }

    fn remove_child(&self, parent: &NodeId, child: &Child) -> Result<()> {
        let child = instance(child)?;
        trace!(parent = ?parent, child = ?child, "remove_child");
        remove(&mut self.scene.borrow_mut(), *parent, child)
    }

    fn remove_child_from_container(&self, container: &NodeId, child: &Child) -> Result<()> {
        let child = instance(child)?;
        trace!(container = ?container, child = ?child, "remove_child_from_container");
        remove(&mut self.scene.borrow_mut(), *container, child)
    }

    fn discard_instance(&self, instance: &NodeId) {
        let mut scene = self.scene.borrow_mut();
        if !scene.contains(*instance) {
            return;
        }
        if let Err(err) = discard(&mut scene, *instance) {
            warn!(node = ?instance, %err, "discard failed");
        }
    }

    fn clear_container(&self, container: &NodeId) -> Result<()> {
        let mut scene = self.scene.borrow_mut();
        let children = scene.children(*container).to_vec();
        debug!(container = ?container, children = children.len(), "clear_container");
        for child in children {
            remove(&mut scene, *container, child)?;
        }
        Ok(())
    }

    fn schedule_deferred_callback(&self, callback: IdleCallback) -> CallbackId {
        self.idle.request_idle_callback(callback)
    }

    fn commit_mode(&self) -> CommitMode {
        CommitMode::Synchronous
    }
}
