pub mod config;
pub mod error;
pub mod host;
pub mod props;
pub mod reconciler;
pub mod scene;
pub mod scheduler;
pub mod stage;

// Value types pass through untouched
pub use easel_types::{
    Animation, Filter, Frame, Graphics, GraphicsCommand, Image, Matrix2D, Point, Rectangle, Shadow, SpriteSheet,
};

pub use config::{init_tracing, CanvasElement, EnableMouseOver, StageProps, TickerConfig};
pub use error::{Error, Result};
pub use host::{CommitMode, EaselHost, HostChild, HostConfig};
pub use props::{EventHandler, PropChanges, PropValue, Props};
pub use reconciler::{bitmap_text, text, Element, Node, Reconciler, Root};
pub use scene::{DrawCommand, Event, EventType, NodeId, NodeKind, SceneGraph, SharedScene};
pub use stage::{Canvas, DetachedCanvas, RecordingCanvas, Stage, StageSurface, Ticker};
