use easel_types::Graphics;
use tracing::trace;

use crate::error::Result;
use crate::props::{PropValue, Props};
use crate::scene::{NodeId, NodeKind, SceneGraph};

/// Builds the instance for `ty` and applies `props` against an empty
/// previous set. Unknown tags fail with [`Error::UnsupportedType`].
///
/// [`Error::UnsupportedType`]: crate::Error::UnsupportedType
pub fn create_instance(scene: &mut SceneGraph, ty: &str, props: &Props) -> Result<NodeId> {
    let kind: NodeKind = ty.parse()?;
    let id = scene.create(kind, constructor_props(kind, props));
    trace!(node = ?id, %kind, "create instance");
    if let Err(err) = kind.apply_props(scene, id, props, None) {
        scene.dispose_subtree(id)?;
        return Err(err);
    }
    Ok(id)
}

/// Properties a kind's constructor takes before the first prop application.
fn constructor_props(kind: NodeKind, props: &Props) -> Props {
    let mut init = Props::new();
    let copy = |from: &str, to: &'static str, init: &mut Props| {
        if let Some(value) = props.get(from) {
            init.insert(to, value.clone());
        }
    };
    match kind {
        NodeKind::Container => {}
        NodeKind::Bitmap => copy("image", "image", &mut init),
        NodeKind::BitmapText => {
            copy("children", "text", &mut init);
            copy("spriteSheet", "spriteSheet", &mut init);
        }
        NodeKind::Shape => match props.get("graphics") {
            Some(graphics) => {
                init.insert("graphics", graphics.clone());
            }
            None => {
                init.insert("graphics", Graphics::new());
            }
        },
        NodeKind::Sprite => {
            copy("spriteSheet", "spriteSheet", &mut init);
            match initial_frame_or_animation(props) {
                Some(PropValue::Str(name)) => {
                    init.insert("currentAnimation", name);
                    init.insert("currentAnimationFrame", 0.0);
                }
                Some(frame) => {
                    init.insert("currentFrame", frame);
                }
                None => {}
            }
        }
        NodeKind::Text => {
            copy("children", "text", &mut init);
            copy("font", "font", &mut init);
            copy("color", "color", &mut init);
        }
    }
    init
}

/// `initialFrame` when truthy, otherwise `initialAnimation`.
fn initial_frame_or_animation(props: &Props) -> Option<PropValue> {
    props
        .get("initialFrame")
        .filter(|frame| frame.is_truthy())
        .or_else(|| props.get("initialAnimation"))
        .cloned()
}
