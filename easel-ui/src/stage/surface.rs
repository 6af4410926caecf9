use std::fmt;

use tracing::trace;

use super::canvas::Canvas;
use crate::props::Props;
use crate::scene::{Event, EventType, NodeId, NodeKind, SharedScene};

/// Canvas-bound scene root: owns the root container and pointer input.
pub struct StageSurface {
    scene: SharedScene,
    root: NodeId,
    canvas: Box<dyn Canvas>,
    touch_enabled: bool,
    mouse_over_frequency: u32,
    /// Pointer events waiting for the next tick, oldest first.
    input: Vec<Event>,
    frames_drawn: u64,
}

impl StageSurface {
    pub fn new(scene: SharedScene, canvas: Box<dyn Canvas>) -> Self {
        let root = scene.borrow_mut().create(NodeKind::Container, Props::new());
        Self {
            scene,
            root,
            canvas,
            touch_enabled: false,
            mouse_over_frequency: 0,
            input: Vec::new(),
            frames_drawn: 0,
        }
    }

    pub fn scene(&self) -> &SharedScene {
        &self.scene
    }

    /// Root container every top-level instance is attached to.
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn size(&self) -> (u32, u32) {
        (self.canvas.width(), self.canvas.height())
    }

    pub fn enable_touch(&mut self) {
        self.touch_enabled = true;
    }

    pub fn disable_touch(&mut self) {
        self.touch_enabled = false;
    }

    pub fn is_touch_enabled(&self) -> bool {
        self.touch_enabled
    }

    /// Polls per second for mouse-over events; `0` disables them.
    pub fn enable_mouse_over(&mut self, frequency: u32) {
        trace!(frequency, "enable mouse over");
        self.mouse_over_frequency = frequency;
    }

    pub fn mouse_over_frequency(&self) -> u32 {
        self.mouse_over_frequency
    }

    /// Queues a pointer event for dispatch on the next tick. Hover events
    /// are dropped while mouse-over is disabled.
    pub fn queue_event(&mut self, target: NodeId, kind: EventType) -> bool {
        self.queue(Event::new(kind, target))
    }

    pub fn queue(&mut self, event: Event) -> bool {
        let hover = matches!(
            event.kind,
            EventType::MouseOver | EventType::MouseOut | EventType::RollOver | EventType::RollOut
        );
        if hover && self.mouse_over_frequency == 0 {
            return false;
        }
        self.input.push(event);
        true
    }

    pub(crate) fn take_input(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.input)
    }

    pub fn pending_input(&self) -> usize {
        self.input.len()
    }

    pub fn supports_update(&self) -> bool {
        self.canvas.supports_update()
    }

    /// Redraws the scene when the canvas can; returns whether it drew.
    pub fn update(&mut self) -> bool {
        if !self.canvas.supports_update() {
            return false;
        }
        let commands = self.scene.borrow().display_list(self.root);
        self.canvas.draw(&commands);
        self.frames_drawn += 1;
        true
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }
}

impl fmt::Debug for StageSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageSurface")
            .field("root", &self.root)
            .field("touch_enabled", &self.touch_enabled)
            .field("mouse_over_frequency", &self.mouse_over_frequency)
            .field("pending_input", &self.input.len())
            .finish()
    }
}
