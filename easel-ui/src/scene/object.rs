use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use smallvec::SmallVec;

use super::event::{EventHandler, EventType};
use super::NodeId;
use crate::error::Error;
use crate::props::{PropValue, Props};

/// The drawable kinds a tree can instantiate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Container,
    Bitmap,
    BitmapText,
    Shape,
    Sprite,
    Text,
}

impl NodeKind {
    pub const ALL: [NodeKind; 6] = [
        NodeKind::Container,
        NodeKind::Bitmap,
        NodeKind::BitmapText,
        NodeKind::Shape,
        NodeKind::Sprite,
        NodeKind::Text,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Container => "Container",
            NodeKind::Bitmap => "Bitmap",
            NodeKind::BitmapText => "BitmapText",
            NodeKind::Shape => "Shape",
            NodeKind::Sprite => "Sprite",
            NodeKind::Text => "Text",
        }
    }

    /// Only containers own a child list.
    pub fn accepts_children(self) -> bool {
        matches!(self, NodeKind::Container)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| Error::UnsupportedType(s.to_string()))
    }
}

/// Handlers the host adapter currently has bound on an instance, one per
/// event name. Used only to tear subscriptions down on removal.
#[derive(Debug, Clone, Default)]
pub struct Subscriptions {
    entries: SmallVec<[(EventType, EventHandler); 2]>,
}

impl Subscriptions {
    pub fn record(&mut self, event: EventType, handler: EventHandler) {
        match self.entries.iter_mut().find(|(ty, _)| *ty == event) {
            Some(slot) => slot.1 = handler,
            None => self.entries.push((event, handler)),
        }
    }

    /// Drops the entry for `event` if it still points at `handler`.
    pub fn forget(&mut self, event: EventType, handler: &EventHandler) {
        self.entries
            .retain(|(ty, h)| !(*ty == event && h.ptr_eq(handler)));
    }

    pub fn get(&self, event: EventType) -> Option<&EventHandler> {
        self.entries
            .iter()
            .find(|(ty, _)| *ty == event)
            .map(|(_, h)| h)
    }

    pub fn take(&mut self) -> SmallVec<[(EventType, EventHandler); 2]> {
        std::mem::take(&mut self.entries)
    }

    pub fn iter(&self) -> impl Iterator<Item = (EventType, &EventHandler)> {
        self.entries.iter().map(|(ty, h)| (*ty, h))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One scene-graph instance.
#[derive(Debug)]
pub struct DisplayObject {
    kind: NodeKind,
    pub(crate) properties: Props,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) listeners: HashMap<EventType, SmallVec<[EventHandler; 1]>>,
    pub(crate) subscriptions: Subscriptions,
}

impl DisplayObject {
    pub(crate) fn new(kind: NodeKind, properties: Props) -> Self {
        Self {
            kind,
            properties,
            parent: None,
            children: Vec::new(),
            listeners: HashMap::new(),
            subscriptions: Subscriptions::default(),
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn properties(&self) -> &Props {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&PropValue> {
        self.properties.get(name)
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        self.property(name).and_then(PropValue::as_number)
    }

    pub fn flag(&self, name: &str) -> Option<bool> {
        self.property(name).and_then(PropValue::as_bool)
    }

    pub fn string(&self, name: &str) -> Option<&str> {
        self.property(name).and_then(PropValue::as_str)
    }

    pub fn subscriptions(&self) -> &Subscriptions {
        &self.subscriptions
    }

    pub fn listener_count(&self, event: EventType) -> usize {
        self.listeners.get(&event).map_or(0, |l| l.len())
    }

    pub fn has_listeners(&self) -> bool {
        self.listeners.values().any(|l| !l.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trips_through_tag() {
        for kind in NodeKind::ALL {
            assert_eq!(kind.as_str().parse::<NodeKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_unknown_tag_is_unsupported() {
        let err = "Video".parse::<NodeKind>().unwrap_err();
        assert_eq!(err, Error::UnsupportedType("Video".to_string()));
    }

    #[test]
    fn test_subscriptions_keep_one_handler_per_event() {
        let first = EventHandler::new(|_| {});
        let second = EventHandler::new(|_| {});
        let mut subs = Subscriptions::default();

        subs.record(EventType::Click, first.clone());
        subs.record(EventType::Click, second.clone());
        assert_eq!(subs.len(), 1);
        assert!(subs.get(EventType::Click).unwrap().ptr_eq(&second));

        // Stale handler does not evict the current one
        subs.forget(EventType::Click, &first);
        assert_eq!(subs.len(), 1);

        subs.forget(EventType::Click, &second);
        assert!(subs.is_empty());
    }
}
