use serde::{Deserialize, Serialize};
use smartstring::alias::String as SmartString;

use crate::Rectangle;

/// One recorded vector instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum GraphicsCommand {
    BeginFill { color: SmartString },
    EndFill,
    BeginStroke { color: SmartString },
    StrokeStyle { width: f64 },
    EndStroke,
    MoveTo { x: f64, y: f64 },
    LineTo { x: f64, y: f64 },
    Rect { x: f64, y: f64, w: f64, h: f64 },
    RoundRect { x: f64, y: f64, w: f64, h: f64, radius: f64 },
    Circle { x: f64, y: f64, radius: f64 },
    ClosePath,
}

/// Retained vector drawing instructions for a shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graphics {
    commands: Vec<GraphicsCommand>,
}

impl Graphics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[GraphicsCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn clear(&mut self) -> &mut Self {
        self.commands.clear();
        self
    }

    pub fn begin_fill(&mut self, color: impl Into<SmartString>) -> &mut Self {
        self.push(GraphicsCommand::BeginFill {
            color: color.into(),
        })
    }

    pub fn end_fill(&mut self) -> &mut Self {
        self.push(GraphicsCommand::EndFill)
    }

    pub fn begin_stroke(&mut self, color: impl Into<SmartString>) -> &mut Self {
        self.push(GraphicsCommand::BeginStroke {
            color: color.into(),
        })
    }

    pub fn set_stroke_style(&mut self, width: f64) -> &mut Self {
        self.push(GraphicsCommand::StrokeStyle { width })
    }

    pub fn end_stroke(&mut self) -> &mut Self {
        self.push(GraphicsCommand::EndStroke)
    }

    pub fn move_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.push(GraphicsCommand::MoveTo { x, y })
    }

    pub fn line_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.push(GraphicsCommand::LineTo { x, y })
    }

    pub fn draw_rect(&mut self, x: f64, y: f64, w: f64, h: f64) -> &mut Self {
        self.push(GraphicsCommand::Rect { x, y, w, h })
    }

    pub fn draw_round_rect(&mut self, x: f64, y: f64, w: f64, h: f64, radius: f64) -> &mut Self {
        self.push(GraphicsCommand::RoundRect { x, y, w, h, radius })
    }

    pub fn draw_circle(&mut self, x: f64, y: f64, radius: f64) -> &mut Self {
        self.push(GraphicsCommand::Circle { x, y, radius })
    }

    pub fn close_path(&mut self) -> &mut Self {
        self.push(GraphicsCommand::ClosePath)
    }

    /// Axis-aligned bounds of every positioned command, ignoring stroke width.
    pub fn bounds(&self) -> Option<Rectangle> {
        self.commands
            .iter()
            .filter_map(|cmd| match *cmd {
                GraphicsCommand::MoveTo { x, y } | GraphicsCommand::LineTo { x, y } => {
                    Some(Rectangle::new(x, y, 0.0, 0.0))
                }
                GraphicsCommand::Rect { x, y, w, h }
                | GraphicsCommand::RoundRect { x, y, w, h, .. } => Some(Rectangle::new(x, y, w, h)),
                GraphicsCommand::Circle { x, y, radius } => Some(Rectangle::new(
                    x - radius,
                    y - radius,
                    radius * 2.0,
                    radius * 2.0,
                )),
                _ => None,
            })
            .reduce(|acc, r| acc.union(&r))
    }

    fn push(&mut self, command: GraphicsCommand) -> &mut Self {
        self.commands.push(command);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_records_in_order() {
        let mut g = Graphics::new();
        g.begin_fill("red").draw_rect(0.0, 0.0, 10.0, 5.0).end_fill();

        assert_eq!(g.commands().len(), 3);
        assert_eq!(
            g.commands()[0],
            GraphicsCommand::BeginFill {
                color: "red".into()
            }
        );
        assert_eq!(g.commands()[2], GraphicsCommand::EndFill);
    }

    #[test]
    fn test_bounds_cover_circle_and_rect() {
        let mut g = Graphics::new();
        g.draw_circle(0.0, 0.0, 5.0).draw_rect(10.0, 10.0, 5.0, 5.0);
        assert_eq!(g.bounds(), Some(Rectangle::new(-5.0, -5.0, 20.0, 20.0)));
    }

    #[test]
    fn test_empty_graphics_has_no_bounds() {
        let mut g = Graphics::new();
        g.begin_fill("blue");
        assert!(g.bounds().is_none());
        g.clear();
        assert!(g.is_empty());
    }
}
