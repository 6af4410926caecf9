use std::cell::RefCell;
use std::rc::Rc;

use crate::scene::DrawCommand;

/// Drawing surface a stage renders into.
pub trait Canvas {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Whether [`draw`](Self::draw) does anything. Surfaces without the
    /// capability are skipped on redraw.
    fn supports_update(&self) -> bool {
        true
    }

    fn draw(&mut self, commands: &[DrawCommand]);
}

/// Every frame a [`RecordingCanvas`] received, oldest first.
pub type Frames = Rc<RefCell<Vec<Vec<DrawCommand>>>>;

/// Canvas that keeps each frame's draw list for inspection.
#[derive(Debug)]
pub struct RecordingCanvas {
    width: u32,
    height: u32,
    frames: Frames,
}

impl RecordingCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            frames: Rc::default(),
        }
    }

    /// Shared handle that stays readable after the canvas is boxed.
    pub fn frames(&self) -> Frames {
        self.frames.clone()
    }
}

impl Canvas for RecordingCanvas {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn draw(&mut self, commands: &[DrawCommand]) {
        self.frames.borrow_mut().push(commands.to_vec());
    }
}

/// Canvas with no redraw capability, e.g. before the element is attached.
#[derive(Debug, Clone, Copy)]
pub struct DetachedCanvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas for DetachedCanvas {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn supports_update(&self) -> bool {
        false
    }

    fn draw(&mut self, _commands: &[DrawCommand]) {}
}
