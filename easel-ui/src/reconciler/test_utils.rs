use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use smartstring::alias::String as SmartString;

use crate::error::{Error, Result};
use crate::host::{CommitMode, HostChild, HostConfig, InternalHandle, NoContext, UpdateSignal};
use crate::props::{PropValue, Props};
use crate::scene::NodeKind;
use crate::scheduler::{CallbackId, IdleCallback, IdleQueue, IdleScheduler};

pub const CONTAINER: u32 = 0;

/// Host operation captured by [`LogHost`].
#[derive(Debug, Clone, PartialEq)]
pub enum HostOp {
    Create { id: u32, ty: SmartString },
    CreateText { id: u32, text: SmartString },
    AppendInitial { parent: u32, child: u32 },
    Append { parent: u32, child: u32 },
    AppendToContainer { child: u32 },
    InsertBefore { parent: u32, child: u32, before: u32 },
    InsertInContainerBefore { child: u32, before: u32 },
    Remove { parent: u32, child: u32 },
    RemoveFromContainer { child: u32 },
    Update { id: u32 },
    TextUpdate { id: u32, text: SmartString },
    ResetText { id: u32 },
    Mount { id: u32 },
    Discard { id: u32 },
    ClearContainer,
    PrepareForCommit,
    ResetAfterCommit,
}

#[derive(Default)]
struct LogState {
    ops: RefCell<Vec<HostOp>>,
    next_id: Cell<u32>,
    children: RefCell<HashMap<u32, Vec<u32>>>,
}

/// Host that records every operation and keeps a bare id tree so tests can
/// check the resulting child order.
#[derive(Clone)]
pub struct LogHost {
    state: Rc<LogState>,
    idle: Rc<IdleQueue>,
    mode: CommitMode,
}

fn id(child: &HostChild<u32, u32>) -> u32 {
    match child {
        HostChild::Instance(id) | HostChild::Text(id) => *id,
    }
}

impl LogHost {
    pub fn new(mode: CommitMode) -> Self {
        Self {
            state: Rc::new(LogState::default()),
            idle: Rc::new(IdleQueue::new()),
            mode,
        }
    }

    pub fn idle(&self) -> &IdleQueue {
        &self.idle
    }

    pub fn take_ops(&self) -> Vec<HostOp> {
        std::mem::take(&mut *self.state.ops.borrow_mut())
    }

    pub fn children_of(&self, parent: u32) -> Vec<u32> {
        self.state
            .children
            .borrow()
            .get(&parent)
            .cloned()
            .unwrap_or_default()
    }

    fn log(&self, op: HostOp) {
        self.state.ops.borrow_mut().push(op);
    }

    fn allocate(&self) -> u32 {
        let id = self.state.next_id.get() + 1;
        self.state.next_id.set(id);
        id
    }

    fn detach(&self, parent: u32, child: u32) {
        if let Some(list) = self.state.children.borrow_mut().get_mut(&parent) {
            list.retain(|&c| c != child);
        }
    }

    fn insert(&self, parent: u32, child: u32, before: Option<u32>) {
        self.detach(parent, child);
        let mut children = self.state.children.borrow_mut();
        let list = children.entry(parent).or_default();
        let index = before
            .and_then(|b| list.iter().position(|&c| c == b))
            .unwrap_or(list.len());
        list.insert(index, child);
    }
}

impl HostConfig for LogHost {
    type Instance = u32;
    type TextInstance = u32;
    type Container = u32;
    type HostContext = NoContext;
    type UpdatePayload = UpdateSignal;
    type PublicInstance = u32;

    fn get_root_host_context(&self, _root: &u32) -> NoContext {
        NoContext
    }

    fn get_child_host_context(&self, _parent: &NoContext, _ty: &str) -> NoContext {
        NoContext
    }

    fn get_public_instance(&self, instance: &u32) -> u32 {
        *instance
    }

    fn create_instance(
        &self,
        ty: &str,
        _props: &Props,
        _root: &u32,
        _context: &NoContext,
        _handle: InternalHandle,
    ) -> Result<u32> {
        ty.parse::<NodeKind>()?;
        let id = self.allocate();
        self.log(HostOp::Create { id, ty: ty.into() });
        Ok(id)
    }

    fn create_text_instance(&self, text: &str, _root: &u32, _context: &NoContext, _handle: InternalHandle) -> u32 {
        let id = self.allocate();
        self.log(HostOp::CreateText { id, text: text.into() });
        id
    }

    fn append_initial_child(&self, parent: &u32, child: &HostChild<u32, u32>) -> Result<()> {
        self.insert(*parent, id(child), None);
        self.log(HostOp::AppendInitial {
            parent: *parent,
            child: id(child),
        });
        Ok(())
    }

    /// Asks for a mount callback when `autoMount` is set.
    fn finalize_initial_children(&self, _instance: &u32, _ty: &str, props: &Props) -> bool {
        props.get("autoMount").is_some_and(PropValue::is_truthy)
    }

    fn should_set_text_content(&self, props: &Props) -> bool {
        matches!(props.get("children"), Some(PropValue::Str(_) | PropValue::Number(_)))
    }

    fn should_deprioritize_subtree(&self, _ty: &str, _props: &Props) -> bool {
        false
    }

    fn prepare_update(&self, _instance: &u32, _ty: &str, _old: &Props, _new: &Props) -> Option<UpdateSignal> {
        Some(UpdateSignal)
    }

    fn prepare_for_commit(&self) {
        self.log(HostOp::PrepareForCommit);
    }

    fn reset_after_commit(&self) {
        self.log(HostOp::ResetAfterCommit);
    }

    fn commit_mount(&self, instance: &u32, _ty: &str, _props: &Props) {
        self.log(HostOp::Mount { id: *instance });
    }

    /// Fails when the new props carry a truthy `reject`.
    fn commit_update(&self, instance: &u32, _payload: &UpdateSignal, _ty: &str, _old: &Props, new: &Props) -> Result<()> {
        if new.get("reject").is_some_and(PropValue::is_truthy) {
            return Err(Error::InvalidProps("rejected update".into()));
        }
        self.log(HostOp::Update { id: *instance });
        Ok(())
    }

    fn commit_text_update(&self, text: &u32, _old_text: &str, new_text: &str) {
        self.log(HostOp::TextUpdate {
            id: *text,
            text: new_text.into(),
        });
    }

    fn reset_text_content(&self, instance: &u32) {
        self.log(HostOp::ResetText { id: *instance });
    }

    fn append_child(&self, parent: &u32, child: &HostChild<u32, u32>) -> Result<()> {
        self.insert(*parent, id(child), None);
        self.log(HostOp::Append {
            parent: *parent,
            child: id(child),
        });
        Ok(())
    }

    fn append_child_to_container(&self, container: &u32, child: &HostChild<u32, u32>) -> Result<()> {
        self.insert(*container, id(child), None);
        self.log(HostOp::AppendToContainer { child: id(child) });
        Ok(())
    }

    fn insert_before(&self, parent: &u32, child: &HostChild<u32, u32>, before: &HostChild<u32, u32>) -> Result<()> {
        self.insert(*parent, id(child), Some(id(before)));
        self.log(HostOp::InsertBefore {
            parent: *parent,
            child: id(child),
            before: id(before),
        });
        Ok(())
    }

    fn insert_in_container_before(
        &self,
        container: &u32,
        child: &HostChild<u32, u32>,
        before: &HostChild<u32, u32>,
    ) -> Result<()> {
        self.insert(*container, id(child), Some(id(before)));
        self.log(HostOp::InsertInContainerBefore {
            child: id(child),
            before: id(before),
        });
        Ok(())
    }

    fn remove_child(&self, parent: &u32, child: &HostChild<u32, u32>) -> Result<()> {
        self.detach(*parent, id(child));
        self.log(HostOp::Remove {
            parent: *parent,
            child: id(child),
        });
        Ok(())
    }

    fn remove_child_from_container(&self, container: &u32, child: &HostChild<u32, u32>) -> Result<()> {
        self.detach(*container, id(child));
        self.log(HostOp::RemoveFromContainer { child: id(child) });
        Ok(())
    }

    fn discard_instance(&self, instance: &u32) {
        self.state.children.borrow_mut().remove(instance);
        self.log(HostOp::Discard { id: *instance });
    }

    fn clear_container(&self, container: &u32) -> Result<()> {
        self.state.children.borrow_mut().remove(container);
        self.log(HostOp::ClearContainer);
        Ok(())
    }

    fn schedule_deferred_callback(&self, callback: IdleCallback) -> CallbackId {
        self.idle.request_idle_callback(callback)
    }

    fn commit_mode(&self) -> CommitMode {
        self.mode
    }
}
