use std::rc::Rc;

use easel_types::{Graphics, Image, Matrix2D, Rectangle, SpriteSheet};
use smartstring::alias::String as SmartString;

use super::arena::SceneGraph;
use super::object::{DisplayObject, NodeKind};
use super::NodeId;
use crate::props::PropValue;

/// A drawable leaf with its concatenated transform and alpha.
#[derive(Debug, Clone)]
pub enum DrawCommand {
    Bitmap {
        node: NodeId,
        image: Rc<Image>,
        source: Option<Rectangle>,
        transform: Matrix2D,
        alpha: f64,
    },
    BitmapText {
        node: NodeId,
        text: SmartString,
        sheet: Rc<SpriteSheet>,
        transform: Matrix2D,
        alpha: f64,
    },
    Shape {
        node: NodeId,
        graphics: Rc<Graphics>,
        transform: Matrix2D,
        alpha: f64,
    },
    Sprite {
        node: NodeId,
        sheet: Rc<SpriteSheet>,
        frame: usize,
        transform: Matrix2D,
        alpha: f64,
    },
    Text {
        node: NodeId,
        text: SmartString,
        font: SmartString,
        color: SmartString,
        transform: Matrix2D,
        alpha: f64,
    },
}

impl DrawCommand {
    pub fn node(&self) -> NodeId {
        match self {
            DrawCommand::Bitmap { node, .. }
            | DrawCommand::BitmapText { node, .. }
            | DrawCommand::Shape { node, .. }
            | DrawCommand::Sprite { node, .. }
            | DrawCommand::Text { node, .. } => *node,
        }
    }

    pub fn transform(&self) -> &Matrix2D {
        match self {
            DrawCommand::Bitmap { transform, .. }
            | DrawCommand::BitmapText { transform, .. }
            | DrawCommand::Shape { transform, .. }
            | DrawCommand::Sprite { transform, .. }
            | DrawCommand::Text { transform, .. } => transform,
        }
    }

    pub fn alpha(&self) -> f64 {
        match self {
            DrawCommand::Bitmap { alpha, .. }
            | DrawCommand::BitmapText { alpha, .. }
            | DrawCommand::Shape { alpha, .. }
            | DrawCommand::Sprite { alpha, .. }
            | DrawCommand::Text { alpha, .. } => *alpha,
        }
    }
}

impl SceneGraph {
    /// Flattens the visible subtree under `root` in paint order.
    pub fn display_list(&self, root: NodeId) -> Vec<DrawCommand> {
        let mut out = Vec::new();
        self.collect(root, &Matrix2D::identity(), 1.0, &mut out);
        out
    }

    fn collect(&self, id: NodeId, parent_transform: &Matrix2D, parent_alpha: f64, out: &mut Vec<DrawCommand>) {
        let Some(object) = self.get(id) else {
            return;
        };
        let alpha = parent_alpha * object.number("alpha").unwrap_or(1.0);
        if object.flag("visible") == Some(false) || alpha <= 0.0 {
            return;
        }

        let mut transform = *parent_transform;
        transform.append_matrix(&local_transform(object));

        match object.kind() {
            NodeKind::Container => {
                for &child in object.children() {
                    self.collect(child, &transform, alpha, out);
                }
            }
            NodeKind::Bitmap => {
                if let Some(PropValue::Image(image)) = object.property("image") {
                    out.push(DrawCommand::Bitmap {
                        node: id,
                        image: image.clone(),
                        source: match object.property("sourceRect") {
                            Some(PropValue::Rect(rect)) => Some(**rect),
                            _ => None,
                        },
                        transform,
                        alpha,
                    });
                }
            }
            NodeKind::BitmapText => {
                if let Some(PropValue::SpriteSheet(sheet)) = object.property("spriteSheet") {
                    out.push(DrawCommand::BitmapText {
                        node: id,
                        text: object.string("text").unwrap_or_default().into(),
                        sheet: sheet.clone(),
                        transform,
                        alpha,
                    });
                }
            }
            NodeKind::Shape => {
                if let Some(PropValue::Graphics(graphics)) = object.property("graphics") {
                    out.push(DrawCommand::Shape {
                        node: id,
                        graphics: graphics.clone(),
                        transform,
                        alpha,
                    });
                }
            }
            NodeKind::Sprite => {
                if let Some(PropValue::SpriteSheet(sheet)) = object.property("spriteSheet") {
                    out.push(DrawCommand::Sprite {
                        node: id,
                        sheet: sheet.clone(),
                        frame: sprite_frame(object, sheet),
                        transform,
                        alpha,
                    });
                }
            }
            NodeKind::Text => out.push(DrawCommand::Text {
                node: id,
                text: object.string("text").unwrap_or_default().into(),
                font: object.string("font").unwrap_or_default().into(),
                color: object.string("color").unwrap_or_default().into(),
                transform,
                alpha,
            }),
        }
    }
}

fn local_transform(object: &DisplayObject) -> Matrix2D {
    if let Some(PropValue::Matrix(matrix)) = object.property("transformMatrix") {
        return **matrix;
    }
    let n = |name: &str, default: f64| object.number(name).unwrap_or(default);
    let mut m = Matrix2D::identity();
    m.append_transform(
        n("x", 0.0),
        n("y", 0.0),
        n("scaleX", 1.0),
        n("scaleY", 1.0),
        n("rotation", 0.0),
        n("skewX", 0.0),
        n("skewY", 0.0),
        n("regX", 0.0),
        n("regY", 0.0),
    );
    m
}

/// Resolves the sheet frame a sprite shows: an explicit `currentFrame`, or
/// `currentAnimationFrame` offset into `currentAnimation`.
fn sprite_frame(object: &DisplayObject, sheet: &SpriteSheet) -> usize {
    if let Some(frame) = object.number("currentFrame") {
        return frame.max(0.0) as usize;
    }
    let offset = object.number("currentAnimationFrame").unwrap_or(0.0).max(0.0) as usize;
    object
        .string("currentAnimation")
        .and_then(|name| sheet.animation(name))
        .and_then(|anim| {
            if anim.frames.is_empty() {
                None
            } else {
                Some(anim.frames[offset % anim.frames.len()])
            }
        })
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::props::{PropChanges, Props};

    #[test]
    fn test_nested_translation_accumulates() {
        let mut scene = SceneGraph::new();
        let root = scene.create(NodeKind::Container, Props::new().with("x", 10.0));
        let text = scene.create(
            NodeKind::Text,
            Props::new().with("x", 5.0).with("text", "hi").with("alpha", 0.5),
        );
        scene.add_child(root, text).unwrap();

        let list = scene.display_list(root);
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].node(), text);
        assert_eq!(list[0].transform().tx, 15.0);
        assert_eq!(list[0].alpha(), 0.5);
    }

    #[test]
    fn test_invisible_subtrees_are_skipped() {
        let mut scene = SceneGraph::new();
        let root = scene.create(NodeKind::Container, Props::new());
        let hidden = scene.create(NodeKind::Container, Props::new().with("visible", false));
        let text = scene.create(NodeKind::Text, Props::new());
        scene.add_child(root, hidden).unwrap();
        scene.add_child(hidden, text).unwrap();

        assert!(scene.display_list(root).is_empty());

        let changes: PropChanges = [("visible", None)].into_iter().collect();
        scene.set(hidden, &changes).unwrap();
        assert_eq!(scene.display_list(root).len(), 1);
    }

    #[test]
    fn test_sprite_resolves_animation_frame() {
        let sheet = SpriteSheet::from_json(
            r#"{ "frames": { "width": 4, "height": 4, "count": 6 },
                 "animations": { "walk": [2, 4] } }"#,
        )
        .unwrap();
        let mut scene = SceneGraph::new();
        let sprite = scene.create(
            NodeKind::Sprite,
            Props::new()
                .with("spriteSheet", sheet)
                .with("currentAnimation", "walk")
                .with("currentAnimationFrame", 1.0),
        );

        match &scene.display_list(sprite)[0] {
            DrawCommand::Sprite { frame, .. } => assert_eq!(*frame, 3),
            other => panic!("expected sprite, got {:?}", other),
        }
    }
}
