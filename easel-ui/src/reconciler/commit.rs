use std::collections::VecDeque;
use std::rc::Rc;

use smartstring::alias::String as SmartString;
use tracing::debug;

use crate::error::Result;
use crate::host::{CommitMode, HostChild, HostConfig};
use crate::props::Props;
use crate::scheduler::Deadline;

/// Where a placement or deletion lands.
#[derive(Clone, Copy)]
pub(crate) enum ParentRef<I, C> {
    Instance(I),
    Container(C),
}

type Child<H> = HostChild<<H as HostConfig>::Instance, <H as HostConfig>::TextInstance>;

/// One host operation of the commit phase, in the order it must run.
pub(crate) enum Mutation<H: HostConfig> {
    Placement {
        parent: ParentRef<H::Instance, H::Container>,
        child: Child<H>,
        before: Option<Child<H>>,
    },
    Deletion {
        parent: ParentRef<H::Instance, H::Container>,
        child: Child<H>,
    },
    Update {
        instance: H::Instance,
        ty: SmartString,
        payload: H::UpdatePayload,
        old_props: Rc<Props>,
        new_props: Rc<Props>,
    },
    TextUpdate {
        text: H::TextInstance,
        old_text: SmartString,
        new_text: SmartString,
    },
    ResetText {
        instance: H::Instance,
    },
}

pub(crate) struct Mount<H: HostConfig> {
    pub instance: H::Instance,
    pub ty: SmartString,
    pub props: Rc<Props>,
}

pub(crate) struct CommitQueue<H: HostConfig> {
    pub mutations: VecDeque<Mutation<H>>,
    pub mounts: Vec<Mount<H>>,
}

impl<H: HostConfig> CommitQueue<H> {
    pub fn new() -> Self {
        Self {
            mutations: VecDeque::new(),
            mounts: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty() && self.mounts.is_empty()
    }
}

/// Applies queued mutations. `Synchronous` drains the queue regardless of
/// `deadline`; `Sliced` applies at least one and stops once the deadline
/// has expired. Returns true when the queue is drained and mounts have run.
///
/// On error the remaining mutations are dropped.
pub(crate) fn commit<H: HostConfig>(
    host: &H,
    queue: &mut CommitQueue<H>,
    mode: CommitMode,
    deadline: &Deadline,
) -> Result<bool> {
    host.prepare_for_commit();
    let applied = apply_mutations(host, queue, mode, deadline);
    host.reset_after_commit();

    let applied = match applied {
        Ok(applied) => applied,
        Err(err) => {
            queue.mutations.clear();
            queue.mounts.clear();
            return Err(err);
        }
    };
    debug!(applied, remaining = queue.mutations.len(), ?mode, "commit");

    if !queue.mutations.is_empty() {
        return Ok(false);
    }
    for mount in queue.mounts.drain(..) {
        host.commit_mount(&mount.instance, &mount.ty, &mount.props);
    }
    Ok(true)
}

fn apply_mutations<H: HostConfig>(
    host: &H,
    queue: &mut CommitQueue<H>,
    mode: CommitMode,
    deadline: &Deadline,
) -> Result<usize> {
    let mut applied = 0;
    while let Some(mutation) = queue.mutations.pop_front() {
        apply(host, mutation)?;
        applied += 1;
        if mode == CommitMode::Sliced && deadline.is_expired() {
            break;
        }
    }
    Ok(applied)
}

fn apply<H: HostConfig>(host: &H, mutation: Mutation<H>) -> Result<()> {
    match mutation {
        Mutation::Placement { parent, child, before } => match (parent, before) {
            (ParentRef::Instance(parent), Some(before)) => host.insert_before(&parent, &child, &before),
            (ParentRef::Instance(parent), None) => host.append_child(&parent, &child),
            (ParentRef::Container(container), Some(before)) => {
                host.insert_in_container_before(&container, &child, &before)
            }
            (ParentRef::Container(container), None) => host.append_child_to_container(&container, &child),
        },
        Mutation::Deletion { parent, child } => match parent {
            ParentRef::Instance(parent) => host.remove_child(&parent, &child),
            ParentRef::Container(container) => host.remove_child_from_container(&container, &child),
        },
        Mutation::Update {
            instance,
            ty,
            payload,
            old_props,
            new_props,
        } => host.commit_update(&instance, &payload, &ty, &old_props, &new_props),
        Mutation::TextUpdate {
            text,
            old_text,
            new_text,
        } => {
            host.commit_text_update(&text, &old_text, &new_text);
            Ok(())
        }
        Mutation::ResetText { instance } => {
            host.reset_text_content(&instance);
            Ok(())
        }
    }
}
