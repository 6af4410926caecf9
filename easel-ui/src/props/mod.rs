//! Prop values, the per-kind whitelists and the diff/apply engine.

mod diff;
mod whitelist;

use std::collections::HashMap;
use std::rc::Rc;

use easel_types::{Filter, Graphics, Image, Matrix2D, Rectangle, Shadow, SpriteSheet};
use smallvec::SmallVec;
use smartstring::alias::String as SmartString;

pub use crate::scene::EventHandler;
use crate::scene::NodeId;
pub use diff::{apply_display_object_props, apply_props, diff_props, subscribe, unsubscribe, unsubscribe_all};
pub use whitelist::{
    BITMAP_PROPS, BITMAP_TEXT_PROPS, CONTAINER_PROPS, DISPLAY_OBJECT_PROPS, EVENT_TYPES,
    SHAPE_PROPS, SPRITE_PROPS, TEXT_PROPS,
};

/// One prop value. Object-like values are shared and compared by identity.
#[derive(Debug, Clone)]
pub enum PropValue {
    Bool(bool),
    Number(f64),
    Str(SmartString),
    Image(Rc<Image>),
    SpriteSheet(Rc<SpriteSheet>),
    Graphics(Rc<Graphics>),
    Shadow(Rc<Shadow>),
    Rect(Rc<Rectangle>),
    Matrix(Rc<Matrix2D>),
    Filters(Rc<[Filter]>),
    Node(NodeId),
    Handler(EventHandler),
}

impl PropValue {
    /// Strict equality: scalars by value, shared objects and handlers by
    /// identity. `NaN` is never equal to itself.
    pub fn strict_eq(&self, other: &PropValue) -> bool {
        match (self, other) {
            (PropValue::Bool(a), PropValue::Bool(b)) => a == b,
            (PropValue::Number(a), PropValue::Number(b)) => a == b,
            (PropValue::Str(a), PropValue::Str(b)) => a == b,
            (PropValue::Image(a), PropValue::Image(b)) => Rc::ptr_eq(a, b),
            (PropValue::SpriteSheet(a), PropValue::SpriteSheet(b)) => Rc::ptr_eq(a, b),
            (PropValue::Graphics(a), PropValue::Graphics(b)) => Rc::ptr_eq(a, b),
            (PropValue::Shadow(a), PropValue::Shadow(b)) => Rc::ptr_eq(a, b),
            (PropValue::Rect(a), PropValue::Rect(b)) => Rc::ptr_eq(a, b),
            (PropValue::Matrix(a), PropValue::Matrix(b)) => Rc::ptr_eq(a, b),
            (PropValue::Filters(a), PropValue::Filters(b)) => Rc::ptr_eq(a, b),
            (PropValue::Node(a), PropValue::Node(b)) => a == b,
            (PropValue::Handler(a), PropValue::Handler(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            PropValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_handler(&self) -> Option<&EventHandler> {
        match self {
            PropValue::Handler(h) => Some(h),
            _ => None,
        }
    }

    /// Loose truthiness: `false`, `0`, `NaN` and `""` are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            PropValue::Bool(b) => *b,
            PropValue::Number(n) => *n != 0.0 && !n.is_nan(),
            PropValue::Str(s) => !s.is_empty(),
            _ => true,
        }
    }

    /// String rendering used when flattening text children.
    pub fn to_text(&self) -> Option<SmartString> {
        match self {
            PropValue::Str(s) => Some(s.clone()),
            PropValue::Number(n) => Some(format_number(*n).into()),
            _ => None,
        }
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl From<bool> for PropValue {
    fn from(v: bool) -> Self {
        PropValue::Bool(v)
    }
}

impl From<f64> for PropValue {
    fn from(v: f64) -> Self {
        PropValue::Number(v)
    }
}

impl From<i32> for PropValue {
    fn from(v: i32) -> Self {
        PropValue::Number(v as f64)
    }
}

impl From<u32> for PropValue {
    fn from(v: u32) -> Self {
        PropValue::Number(v as f64)
    }
}

impl From<&str> for PropValue {
    fn from(v: &str) -> Self {
        PropValue::Str(v.into())
    }
}

impl From<String> for PropValue {
    fn from(v: String) -> Self {
        PropValue::Str(v.into())
    }
}

impl From<SmartString> for PropValue {
    fn from(v: SmartString) -> Self {
        PropValue::Str(v)
    }
}

impl From<NodeId> for PropValue {
    fn from(v: NodeId) -> Self {
        PropValue::Node(v)
    }
}

impl From<EventHandler> for PropValue {
    fn from(v: EventHandler) -> Self {
        PropValue::Handler(v)
    }
}

impl From<Vec<Filter>> for PropValue {
    fn from(v: Vec<Filter>) -> Self {
        PropValue::Filters(v.into())
    }
}

impl From<Rc<[Filter]>> for PropValue {
    fn from(v: Rc<[Filter]>) -> Self {
        PropValue::Filters(v)
    }
}

macro_rules! shared_value {
    ($($ty:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for PropValue {
                fn from(v: $ty) -> Self {
                    PropValue::$variant(Rc::new(v))
                }
            }

            impl From<Rc<$ty>> for PropValue {
                fn from(v: Rc<$ty>) -> Self {
                    PropValue::$variant(v)
                }
            }
        )*
    };
}

shared_value! {
    Image => Image,
    SpriteSheet => SpriteSheet,
    Graphics => Graphics,
    Shadow => Shadow,
    Rectangle => Rect,
    Matrix2D => Matrix,
}

/// Props for one element for one render.
#[derive(Debug, Clone, Default)]
pub struct Props {
    values: HashMap<SmartString, PropValue>,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<SmartString>, value: impl Into<PropValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<SmartString>, value: impl Into<PropValue>) -> Option<PropValue> {
        self.values.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<PropValue> {
        self.values.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn handler(&self, key: &str) -> Option<&EventHandler> {
        self.get(key).and_then(PropValue::as_handler)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Changed whitelisted keys, in whitelist order. `None` means the key was
/// set before and is now absent.
#[derive(Debug, Clone, Default)]
pub struct PropChanges {
    entries: SmallVec<[(&'static str, Option<PropValue>); 8]>,
}

impl PropChanges {
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, Option<&PropValue>)> {
        self.entries.iter().map(|(k, v)| (*k, v.as_ref()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(k, _)| *k)
    }

    /// `Some(None)` when the key is being unset.
    pub fn get(&self, key: &str) -> Option<Option<&PropValue>> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_ref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(&'static str, Option<PropValue>)> for PropChanges {
    fn from_iter<T: IntoIterator<Item = (&'static str, Option<PropValue>)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalars_compare_by_value() {
        assert!(PropValue::from(1.5).strict_eq(&PropValue::from(1.5)));
        assert!(PropValue::from("a").strict_eq(&PropValue::from("a")));
        assert!(!PropValue::from(1.0).strict_eq(&PropValue::from(true)));
        assert!(!PropValue::from(f64::NAN).strict_eq(&PropValue::from(f64::NAN)));
    }

    #[test]
    fn test_objects_compare_by_identity() {
        let image = Rc::new(Image::new("a.png", 4, 4));
        let same = PropValue::from(image.clone());
        assert!(same.strict_eq(&PropValue::from(image)));

        let twin = PropValue::from(Image::new("a.png", 4, 4));
        assert!(!same.strict_eq(&twin));
    }

    #[test]
    fn test_truthiness_and_text() {
        assert!(!PropValue::from(0).is_truthy());
        assert!(PropValue::from(3).is_truthy());
        assert!(!PropValue::from("").is_truthy());
        assert_eq!(PropValue::from(42).to_text().as_deref(), Some("42"));
        assert_eq!(PropValue::from(1.25).to_text().as_deref(), Some("1.25"));
        assert!(PropValue::from(true).to_text().is_none());
    }
}
