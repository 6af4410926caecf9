//! Value objects shared between the scene graph and tree authors.
//!
//! Nothing here knows about reconciliation; these are passed through the
//! adapter untouched and only read when the scene is flattened for drawing.

mod filter;
mod geom;
mod graphics;
mod sprite_sheet;

pub use filter::{Filter, Shadow};
pub use geom::{Matrix2D, Point, Rectangle};
pub use graphics::{Graphics, GraphicsCommand};
pub use sprite_sheet::{Animation, Frame, SpriteSheet};

use serde::{Deserialize, Serialize};
use smartstring::alias::String as SmartString;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TypesError {
    #[error("invalid sprite sheet data: {0}")]
    InvalidSpriteSheet(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TypesError>;

/// A decoded bitmap source. Pixel data lives with whoever draws the canvas;
/// the scene only needs a name and the intrinsic size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub src: SmartString,
    pub width: u32,
    pub height: u32,
}

impl Image {
    pub fn new(src: impl Into<SmartString>, width: u32, height: u32) -> Self {
        Self {
            src: src.into(),
            width,
            height,
        }
    }

    pub fn bounds(&self) -> Rectangle {
        Rectangle::new(0.0, 0.0, self.width as f64, self.height as f64)
    }
}
