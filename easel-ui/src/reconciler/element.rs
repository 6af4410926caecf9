use smartstring::alias::String as SmartString;

use crate::props::{PropValue, Props};
use crate::scene::NodeKind;

/// Declarative description of one host node for one render.
#[derive(Debug, Clone)]
pub struct Element {
    pub ty: SmartString,
    pub key: Option<SmartString>,
    pub props: Props,
    pub children: Vec<Node>,
}

/// A child in a declarative tree.
#[derive(Debug, Clone)]
pub enum Node {
    Element(Element),
    Text(SmartString),
}

impl Element {
    pub fn new(kind: NodeKind, props: Props) -> Self {
        Self::host(kind.as_str(), props)
    }

    /// Element for an arbitrary host tag; unknown tags fail at creation.
    pub fn host(ty: impl Into<SmartString>, props: Props) -> Self {
        Self {
            ty: ty.into(),
            key: None,
            props,
            children: Vec::new(),
        }
    }

    pub fn key(mut self, key: impl Into<SmartString>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn children<I>(mut self, children: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Node>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Node::Text(text.into())
    }
}

impl From<String> for Node {
    fn from(text: String) -> Self {
        Node::Text(text.into())
    }
}

/// A `Text` element whose parts are flattened into one string.
pub fn text<I>(props: Props, parts: I) -> Element
where
    I: IntoIterator,
    I::Item: Into<PropValue>,
{
    flattened(NodeKind::Text, props, parts)
}

/// A `BitmapText` element whose parts are flattened into one string.
pub fn bitmap_text<I>(props: Props, parts: I) -> Element
where
    I: IntoIterator,
    I::Item: Into<PropValue>,
{
    flattened(NodeKind::BitmapText, props, parts)
}

fn flattened<I>(kind: NodeKind, mut props: Props, parts: I) -> Element
where
    I: IntoIterator,
    I::Item: Into<PropValue>,
{
    let mut joined = SmartString::new();
    for part in parts {
        if let Some(text) = part.into().to_text() {
            joined.push_str(&text);
        }
    }
    if !props.contains("text") {
        props.insert("text", joined.clone());
    }
    props.insert("children", joined);
    Element::new(kind, props)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_flattens_parts() {
        let element = text(Props::new(), [PropValue::from("Score: "), PropValue::from(12)]);
        assert_eq!(element.ty.as_str(), "Text");
        assert!(element.children.is_empty());
        assert_eq!(element.props.get("children").and_then(PropValue::as_str), Some("Score: 12"));
        assert_eq!(element.props.get("text").and_then(PropValue::as_str), Some("Score: 12"));
    }

    #[test]
    fn test_explicit_text_prop_wins() {
        let element = bitmap_text(Props::new().with("text", "fixed"), ["a", "b"]);
        assert_eq!(element.ty.as_str(), "BitmapText");
        assert_eq!(element.props.get("text").and_then(PropValue::as_str), Some("fixed"));
        assert_eq!(element.props.get("children").and_then(PropValue::as_str), Some("ab"));
    }

    #[test]
    fn test_builder_collects_children() {
        let element = Element::new(NodeKind::Container, Props::new())
            .key("root")
            .child(Element::new(NodeKind::Shape, Props::new()))
            .children(["loose"]);
        assert_eq!(element.key.as_deref(), Some("root"));
        assert_eq!(element.children.len(), 2);
        assert!(matches!(&element.children[1], Node::Text(t) if t.as_str() == "loose"));
    }
}
