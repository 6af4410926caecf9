use crate::scene::{EventType, NodeKind};

/// Observable on every display object.
pub const DISPLAY_OBJECT_PROPS: &[&str] = &[
    "alpha",
    "cacheID",
    "compositeOperation",
    "cursor",
    "filters",
    "hitArea",
    "id",
    "mask",
    "mouseEnabled",
    "name",
    "regX",
    "regY",
    "rotation",
    "scaleX",
    "scaleY",
    "shadow",
    "skewX",
    "skewY",
    "snapToPixel",
    "tickEnabled",
    "transformMatrix",
    "visible",
    "x",
    "y",
];

pub const CONTAINER_PROPS: &[&str] = &["mouseChildren", "tickChildren"];

pub const BITMAP_PROPS: &[&str] = &["image", "sourceRect"];

pub const BITMAP_TEXT_PROPS: &[&str] = &["letterSpacing", "lineHeight", "spaceWidth", "spriteSheet", "text"];

pub const SHAPE_PROPS: &[&str] = &["graphics"];

pub const SPRITE_PROPS: &[&str] = &["currentAnimationFrame", "framerate", "paused"];

pub const TEXT_PROPS: &[&str] = &[
    "color",
    "font",
    "lineHeight",
    "lineWidth",
    "maxWidth",
    "outline",
    "text",
    "textAlign",
    "textBaseline",
];

/// Handler prop name to scene-graph event.
pub const EVENT_TYPES: [(&str, EventType); 9] = [
    ("onClick", EventType::Click),
    ("onDragmove", EventType::PressMove),
    ("onDragend", EventType::PressUp),
    ("onMouseOver", EventType::MouseOver),
    ("onMouseOut", EventType::MouseOut),
    ("onMouseDown", EventType::MouseDown),
    ("onDblclick", EventType::DblClick),
    ("onRollout", EventType::RollOut),
    ("onRollover", EventType::RollOver),
];

impl NodeKind {
    /// Kind-specific whitelist, applied on top of [`DISPLAY_OBJECT_PROPS`].
    pub fn whitelist(self) -> &'static [&'static str] {
        match self {
            NodeKind::Container => CONTAINER_PROPS,
            NodeKind::Bitmap => BITMAP_PROPS,
            NodeKind::BitmapText => BITMAP_TEXT_PROPS,
            NodeKind::Shape => SHAPE_PROPS,
            NodeKind::Sprite => SPRITE_PROPS,
            NodeKind::Text => TEXT_PROPS,
        }
    }
}
