use tracing::{debug, trace};

use super::whitelist::{DISPLAY_OBJECT_PROPS, EVENT_TYPES};
use super::{EventHandler, PropChanges, Props};
use crate::error::Result;
use crate::scene::{EventType, NodeId, NodeKind, SceneGraph};

/// Whitelisted keys whose value in `props` is not strictly equal to the one in
/// `prev`. A key present only in `prev` is reported with `None`.
pub fn diff_props(whitelist: &'static [&'static str], props: &Props, prev: &Props) -> PropChanges {
    whitelist
        .iter()
        .filter_map(|&name| match (props.get(name), prev.get(name)) {
            (Some(current), Some(previous)) if current.strict_eq(previous) => None,
            (Some(current), _) => Some((name, Some(current.clone()))),
            (None, Some(_)) => Some((name, None)),
            (None, None) => None,
        })
        .collect()
}

/// Binds `handler` for `event` and records it in the subscription table.
pub fn subscribe(scene: &mut SceneGraph, id: NodeId, event: EventType, handler: &EventHandler) -> Result<()> {
    trace!(node = ?id, %event, "subscribe");
    scene.add_listener(id, event, handler.clone())?;
    scene.subscriptions_mut(id)?.record(event, handler.clone());
    Ok(())
}

pub fn unsubscribe(scene: &mut SceneGraph, id: NodeId, event: EventType, handler: &EventHandler) -> Result<()> {
    trace!(node = ?id, %event, "unsubscribe");
    scene.remove_listener(id, event, handler)?;
    scene.subscriptions_mut(id)?.forget(event, handler);
    Ok(())
}

/// Unbinds every handler recorded on `id`, leaving its table empty.
pub fn unsubscribe_all(scene: &mut SceneGraph, id: NodeId) -> Result<usize> {
    let entries = scene.subscriptions_mut(id)?.take();
    for (event, handler) in &entries {
        trace!(node = ?id, %event, "unsubscribe");
        scene.remove_listener(id, *event, handler)?;
    }
    Ok(entries.len())
}

/// Base step shared by every kind: event re-subscription by handler
/// identity, then one bulk set of the changed display-object props.
pub fn apply_display_object_props(scene: &mut SceneGraph, id: NodeId, props: &Props, prev: &Props) -> Result<()> {
    for (name, event) in EVENT_TYPES {
        let current = props.handler(name);
        let previous = prev.handler(name);
        let same = match (current, previous) {
            (Some(c), Some(p)) => c.ptr_eq(p),
            _ => false,
        };
        if same {
            continue;
        }
        if let Some(previous) = previous {
            unsubscribe(scene, id, event, previous)?;
        }
        if let Some(current) = current {
            subscribe(scene, id, event, current)?;
        }
    }
    set_changed(scene, id, DISPLAY_OBJECT_PROPS, props, prev)
}

fn set_changed(
    scene: &mut SceneGraph,
    id: NodeId,
    whitelist: &'static [&'static str],
    props: &Props,
    prev: &Props,
) -> Result<()> {
    let changes = diff_props(whitelist, props, prev);
    if changes.is_empty() {
        return Ok(());
    }
    debug!(node = ?id, keys = ?changes.keys().collect::<Vec<_>>(), "apply props");
    scene.set(id, &changes)
}

impl NodeKind {
    /// Applies `props` over `prev` (empty when absent): the display-object
    /// step first, then this kind's own whitelist.
    pub fn apply_props(self, scene: &mut SceneGraph, id: NodeId, props: &Props, prev: Option<&Props>) -> Result<()> {
        let empty = Props::new();
        let prev = prev.unwrap_or(&empty);
        apply_display_object_props(scene, id, props, prev)?;
        set_changed(scene, id, self.whitelist(), props, prev)
    }
}

/// Looks up the kind of `id` and runs its apply step.
pub fn apply_props(scene: &mut SceneGraph, id: NodeId, props: &Props, prev: Option<&Props>) -> Result<()> {
    let kind = scene.object(id)?.kind();
    kind.apply_props(scene, id, props, prev)
}
