use std::fmt;
use std::rc::Rc;

use smallvec::SmallVec;
use tracing::trace;

use super::{NodeId, SharedScene};

/// Scene-graph event names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    Click,
    PressMove,
    PressUp,
    MouseOver,
    MouseOut,
    MouseDown,
    DblClick,
    RollOut,
    RollOver,
}

impl EventType {
    pub fn as_str(self) -> &'static str {
        match self {
            EventType::Click => "click",
            EventType::PressMove => "pressmove",
            EventType::PressUp => "pressup",
            EventType::MouseOver => "mouseover",
            EventType::MouseOut => "mouseout",
            EventType::MouseDown => "mousedown",
            EventType::DblClick => "dblclick",
            EventType::RollOut => "rollout",
            EventType::RollOver => "rollover",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pointer event delivered to listeners.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub kind: EventType,
    pub target: NodeId,
    pub stage_x: f64,
    pub stage_y: f64,
}

impl Event {
    pub fn new(kind: EventType, target: NodeId) -> Self {
        Self {
            kind,
            target,
            stage_x: 0.0,
            stage_y: 0.0,
        }
    }

    pub fn at(mut self, stage_x: f64, stage_y: f64) -> Self {
        self.stage_x = stage_x;
        self.stage_y = stage_y;
        self
    }
}

/// Event callback. Two handlers are equal only if they are the same closure
/// allocation; an identical-looking closure built on the next render is a
/// different handler.
#[derive(Clone)]
pub struct EventHandler(Rc<dyn Fn(&Event)>);

impl EventHandler {
    pub fn new(f: impl Fn(&Event) + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(&self, event: &Event) {
        (self.0)(event)
    }

    pub fn ptr_eq(&self, other: &EventHandler) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for EventHandler {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventHandler({:p})", Rc::as_ptr(&self.0) as *const ())
    }
}

/// Invokes every listener registered for `event.kind` on `event.target`.
///
/// Listeners are cloned out before any is called so a handler may mutate the
/// scene. Returns the number of handlers invoked.
pub fn dispatch(scene: &SharedScene, event: &Event) -> usize {
    let handlers: SmallVec<[EventHandler; 1]> = scene.borrow().listeners(event.target, event.kind);
    trace!(target_node = ?event.target, kind = %event.kind, count = handlers.len(), "dispatch");
    for handler in &handlers {
        handler.call(event);
    }
    handlers.len()
}
