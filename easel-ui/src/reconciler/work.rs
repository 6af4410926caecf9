use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use smartstring::alias::String as SmartString;
use tracing::{debug, trace};

use super::commit::{CommitQueue, Mount, Mutation, ParentRef};
use super::element::Node;
use super::fiber::{Fiber, HostFiber, TextFiber};
use crate::error::Result;
use crate::host::{HostConfig, InternalHandle};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ChildKey {
    Explicit(SmartString),
    Index(usize),
}

impl ChildKey {
    fn new(key: Option<&str>, index: usize) -> Self {
        match key {
            Some(key) => ChildKey::Explicit(key.into()),
            None => ChildKey::Index(index),
        }
    }
}

fn node_key(node: &Node) -> Option<&str> {
    match node {
        Node::Element(element) => element.key.as_deref(),
        Node::Text(_) => None,
    }
}

fn same_type<H: HostConfig>(fiber: &Fiber<H>, node: &Node) -> bool {
    match (fiber, node) {
        (Fiber::Host(fiber), Node::Element(element)) => fiber.ty == element.ty,
        (Fiber::Text(_), Node::Text(_)) => true,
        _ => false,
    }
}

/// Discards `created` newest first, so a parent reclaims its initial
/// children before they are visited.
pub(crate) fn discard_all<H: HostConfig>(host: &H, created: &[H::Instance]) {
    if !created.is_empty() {
        debug!(instances = created.len(), "discarding uncommitted instances");
    }
    for instance in created.iter().rev() {
        host.discard_instance(instance);
    }
}

/// Render phase: diffs the committed fibers against a new tree, creating
/// instances for new subtrees and queueing every other host operation.
/// The committed tree is only read.
pub(crate) struct RenderPass<'a, H: HostConfig> {
    host: &'a H,
    container: H::Container,
    next_handle: &'a mut u64,
    queue: CommitQueue<H>,
    /// Instances created by this pass, in creation order.
    created: Vec<H::Instance>,
}

impl<'a, H: HostConfig> RenderPass<'a, H> {
    pub fn new(host: &'a H, container: H::Container, next_handle: &'a mut u64) -> Self {
        Self {
            host,
            container,
            next_handle,
            queue: CommitQueue::new(),
            created: Vec::new(),
        }
    }

    /// The queued mutations and every instance created for them.
    pub fn finish(self) -> (CommitQueue<H>, Vec<H::Instance>) {
        (self.queue, self.created)
    }

    /// Drops a failed pass, reclaiming everything it created.
    pub fn abort(self) {
        discard_all(self.host, &self.created);
    }

    fn next_handle(&mut self) -> InternalHandle {
        *self.next_handle += 1;
        InternalHandle(*self.next_handle)
    }

    pub fn reconcile_children(
        &mut self,
        parent: ParentRef<H::Instance, H::Container>,
        old: &[Fiber<H>],
        new: Vec<Node>,
        context: &H::HostContext,
    ) -> Result<Vec<Fiber<H>>> {
        let mut by_key: HashMap<ChildKey, usize> = old
            .iter()
            .enumerate()
            .map(|(index, fiber)| (ChildKey::new(fiber.key(), index), index))
            .collect();
        let matched: Vec<Option<usize>> = new
            .iter()
            .enumerate()
            .map(|(index, node)| {
                let key = ChildKey::new(node_key(node), index);
                let old_index = *by_key.get(&key)?;
                if !same_type(&old[old_index], node) {
                    return None;
                }
                by_key.remove(&key);
                Some(old_index)
            })
            .collect();

        let kept: HashSet<usize> = matched.iter().flatten().copied().collect();
        for (index, fiber) in old.iter().enumerate() {
            if !kept.contains(&index) {
                trace!(handle = fiber.handle().0, "delete");
                self.queue.mutations.push_back(Mutation::Deletion {
                    parent,
                    child: fiber.host_child(),
                });
            }
        }

        // A reused child that sits left of one already placed must move
        let mut last_placed = 0;
        let placed: Vec<bool> = matched
            .iter()
            .map(|slot| match *slot {
                Some(old_index) if old_index >= last_placed => {
                    last_placed = old_index;
                    false
                }
                _ => true,
            })
            .collect();

        // Insert before the next sibling that stays where it is
        let mut anchors = vec![None; new.len()];
        let mut anchor = None;
        for index in (0..new.len()).rev() {
            anchors[index] = anchor.clone();
            if let (false, Some(old_index)) = (placed[index], matched[index]) {
                anchor = Some(old[old_index].host_child());
            }
        }

        let mut fibers = Vec::with_capacity(new.len());
        for ((node, slot), (placed, before)) in new.into_iter().zip(matched).zip(placed.into_iter().zip(anchors)) {
            let fiber = match slot {
                Some(old_index) => self.update(&old[old_index], node, context)?,
                None => self.mount(node, context)?,
            };
            if placed {
                self.queue.mutations.push_back(Mutation::Placement {
                    parent,
                    child: fiber.host_child(),
                    before,
                });
            }
            fibers.push(fiber);
        }
        Ok(fibers)
    }

    fn update(&mut self, old: &Fiber<H>, node: Node, context: &H::HostContext) -> Result<Fiber<H>> {
        match (old, node) {
            (Fiber::Host(old), Node::Element(element)) => {
                let props = Rc::new(element.props);
                let child_context = self.host.get_child_host_context(context, &element.ty);
                let text_content = self.host.should_set_text_content(&props);
                if old.text_content && !text_content {
                    self.queue.mutations.push_back(Mutation::ResetText {
                        instance: old.instance,
                    });
                }
                let children = if text_content {
                    Vec::new()
                } else {
                    element.children
                };
                let children = self.reconcile_children(
                    ParentRef::Instance(old.instance),
                    &old.children,
                    children,
                    &child_context,
                )?;
                if let Some(payload) = self
                    .host
                    .prepare_update(&old.instance, &element.ty, &old.props, &props)
                {
                    self.queue.mutations.push_back(Mutation::Update {
                        instance: old.instance,
                        ty: element.ty.clone(),
                        payload,
                        old_props: old.props.clone(),
                        new_props: props.clone(),
                    });
                }
                Ok(Fiber::Host(HostFiber {
                    handle: old.handle,
                    ty: element.ty,
                    key: element.key,
                    props,
                    instance: old.instance,
                    text_content,
                    children,
                }))
            }
            (Fiber::Text(old), Node::Text(text)) => {
                if old.text != text {
                    self.queue.mutations.push_back(Mutation::TextUpdate {
                        text: old.instance.clone(),
                        old_text: old.text.clone(),
                        new_text: text.clone(),
                    });
                }
                Ok(Fiber::Text(TextFiber {
                    handle: old.handle,
                    text,
                    instance: old.instance.clone(),
                }))
            }
            // Matching already compared types
            (_, node) => self.mount(node, context),
        }
    }

    /// Builds a detached subtree, children first.
    fn mount(&mut self, node: Node, context: &H::HostContext) -> Result<Fiber<H>> {
        let handle = self.next_handle();
        let element = match node {
            Node::Text(text) => {
                let instance = self
                    .host
                    .create_text_instance(&text, &self.container, context, handle);
                return Ok(Fiber::Text(TextFiber {
                    handle,
                    text,
                    instance,
                }));
            }
            Node::Element(element) => element,
        };

        let props = Rc::new(element.props);
        if self.host.should_deprioritize_subtree(&element.ty, &props) {
            debug!(ty = %element.ty, "deprioritized subtree rendered eagerly");
        }
        let child_context = self.host.get_child_host_context(context, &element.ty);
        let text_content = self.host.should_set_text_content(&props);
        let children = if text_content {
            Vec::new()
        } else {
            element
                .children
                .into_iter()
                .map(|child| self.mount(child, &child_context))
                .collect::<Result<Vec<_>>>()?
        };

        let instance = self
            .host
            .create_instance(&element.ty, &props, &self.container, context, handle)?;
        self.created.push(instance);
        for child in &children {
            self.host.append_initial_child(&instance, &child.host_child())?;
        }
        if self
            .host
            .finalize_initial_children(&instance, &element.ty, &props)
        {
            self.queue.mounts.push(Mount {
                instance,
                ty: element.ty.clone(),
                props: props.clone(),
            });
        }

        Ok(Fiber::Host(HostFiber {
            handle,
            ty: element.ty,
            key: element.key,
            props,
            instance,
            text_content,
            children,
        }))
    }
}
