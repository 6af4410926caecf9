use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use smartstring::alias::String as SmartString;

use crate::{Rectangle, Result, TypesError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Index into [`SpriteSheet::images`].
    pub image: usize,
    pub rect: Rectangle,
    pub reg_x: f64,
    pub reg_y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animation {
    pub frames: Vec<usize>,
    /// Animation to continue with once this one ends; `None` stops.
    pub next: Option<SmartString>,
    pub speed: f64,
}

/// Frames cut from one or more images, plus named frame sequences.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpriteSheet {
    pub images: Vec<SmartString>,
    pub frames: Vec<Frame>,
    pub animations: HashMap<SmartString, Animation>,
    pub framerate: f64,
}

impl SpriteSheet {
    /// Parses the `{ images, frames, animations, framerate }` data object.
    ///
    /// `frames` is either a grid description (`width`, `height`, `count`,
    /// optional `regX`/`regY`/`spacing`/`margin`/`columns`) or an explicit list of
    /// `[x, y, width, height, imageIndex?, regX?, regY?]` arrays. Animations may
    /// be a single frame index, a `[start, end, next?, speed?]` range, or an
    /// object with `frames`, `next` and `speed`.
    pub fn from_json(data: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(data)?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| invalid("sprite sheet data must be an object"))?;

        let images = match obj.get("images") {
            Some(Value::Array(list)) => list
                .iter()
                .map(|v| {
                    v.as_str()
                        .map(SmartString::from)
                        .ok_or_else(|| invalid("image entries must be strings"))
                })
                .collect::<Result<Vec<_>>>()?,
            Some(_) => return Err(invalid("images must be an array")),
            None => Vec::new(),
        };

        let frames = match obj.get("frames") {
            Some(Value::Object(grid)) => grid_frames(grid)?,
            Some(Value::Array(list)) => list.iter().map(list_frame).collect::<Result<Vec<_>>>()?,
            Some(_) => return Err(invalid("frames must be an object or an array")),
            None => Vec::new(),
        };

        let mut animations = HashMap::new();
        if let Some(anims) = obj.get("animations") {
            let anims = anims
                .as_object()
                .ok_or_else(|| invalid("animations must be an object"))?;
            for (name, def) in anims {
                animations.insert(SmartString::from(name.as_str()), animation(name, def)?);
            }
        }

        let framerate = obj.get("framerate").and_then(Value::as_f64).unwrap_or(0.0);

        let sheet = Self {
            images,
            frames,
            animations,
            framerate,
        };
        sheet.validate()?;
        Ok(sheet)
    }

    pub fn frame(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    pub fn animation(&self, name: &str) -> Option<&Animation> {
        self.animations.get(name)
    }

    pub fn num_frames(&self) -> usize {
        self.frames.len()
    }

    fn validate(&self) -> Result<()> {
        for (name, anim) in &self.animations {
            if let Some(&bad) = anim.frames.iter().find(|&&f| f >= self.frames.len()) {
                return Err(invalid(&format!(
                    "animation '{}' references missing frame {}",
                    name, bad
                )));
            }
        }
        Ok(())
    }
}

fn invalid(msg: &str) -> TypesError {
    TypesError::InvalidSpriteSheet(msg.to_string())
}

fn number(obj: &serde_json::Map<String, Value>, key: &str) -> Option<f64> {
    obj.get(key).and_then(Value::as_f64)
}

fn grid_frames(grid: &serde_json::Map<String, Value>) -> Result<Vec<Frame>> {
    let width = number(grid, "width").ok_or_else(|| invalid("grid frames need a width"))?;
    let height = number(grid, "height").ok_or_else(|| invalid("grid frames need a height"))?;
    let count = number(grid, "count").ok_or_else(|| invalid("grid frames need a count"))? as usize;
    if width <= 0.0 || height <= 0.0 {
        return Err(invalid("grid frame size must be positive"));
    }
    let reg_x = number(grid, "regX").unwrap_or(0.0);
    let reg_y = number(grid, "regY").unwrap_or(0.0);
    let spacing = number(grid, "spacing").unwrap_or(0.0);
    let margin = number(grid, "margin").unwrap_or(0.0);
    let columns = number(grid, "columns").map(|c| c as usize).unwrap_or(count).max(1);

    Ok((0..count)
        .map(|i| {
            let col = (i % columns) as f64;
            let row = (i / columns) as f64;
            Frame {
                image: 0,
                rect: Rectangle::new(
                    margin + col * (width + spacing),
                    margin + row * (height + spacing),
                    width,
                    height,
                ),
                reg_x,
                reg_y,
            }
        })
        .collect())
}

fn list_frame(entry: &Value) -> Result<Frame> {
    let parts = entry
        .as_array()
        .ok_or_else(|| invalid("frame entries must be arrays"))?;
    if parts.len() < 4 {
        return Err(invalid("frame entries need x, y, width and height"));
    }
    let at = |i: usize| parts.get(i).and_then(Value::as_f64);
    let rect = Rectangle::new(
        at(0).ok_or_else(|| invalid("frame x must be a number"))?,
        at(1).ok_or_else(|| invalid("frame y must be a number"))?,
        at(2).ok_or_else(|| invalid("frame width must be a number"))?,
        at(3).ok_or_else(|| invalid("frame height must be a number"))?,
    );
    Ok(Frame {
        image: at(4).unwrap_or(0.0) as usize,
        rect,
        reg_x: at(5).unwrap_or(0.0),
        reg_y: at(6).unwrap_or(0.0),
    })
}

fn animation(name: &str, def: &Value) -> Result<Animation> {
    match def {
        Value::Number(n) => {
            let frame = n
                .as_u64()
                .ok_or_else(|| invalid(&format!("animation '{}' frame must be an index", name)))?;
            Ok(Animation {
                frames: vec![frame as usize],
                next: None,
                speed: 1.0,
            })
        }
        Value::Array(range) => {
            let start = range.first().and_then(Value::as_u64);
            let end = range.get(1).and_then(Value::as_u64).or(start);
            let (Some(start), Some(end)) = (start, end) else {
                return Err(invalid(&format!("animation '{}' needs a frame range", name)));
            };
            if end < start {
                return Err(invalid(&format!("animation '{}' range is reversed", name)));
            }
            Ok(Animation {
                frames: (start as usize..=end as usize).collect(),
                next: range.get(2).and_then(Value::as_str).map(SmartString::from),
                speed: range.get(3).and_then(Value::as_f64).unwrap_or(1.0),
            })
        }
        Value::Object(obj) => {
            let frames = obj
                .get("frames")
                .and_then(Value::as_array)
                .ok_or_else(|| invalid(&format!("animation '{}' needs frames", name)))?
                .iter()
                .map(|f| {
                    f.as_u64()
                        .map(|f| f as usize)
                        .ok_or_else(|| invalid(&format!("animation '{}' frames must be indices", name)))
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(Animation {
                frames,
                next: obj.get("next").and_then(Value::as_str).map(SmartString::from),
                speed: number(obj, "speed").unwrap_or(1.0),
            })
        }
        _ => Err(invalid(&format!("animation '{}' has an unknown shape", name))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_frames_wrap_by_columns() {
        let sheet = SpriteSheet::from_json(
            r#"{
                "images": ["hero.png"],
                "frames": { "width": 32, "height": 16, "count": 5, "columns": 2, "regX": 16 },
                "framerate": 12
            }"#,
        )
        .unwrap();

        assert_eq!(sheet.num_frames(), 5);
        assert_eq!(sheet.frame(3).unwrap().rect, Rectangle::new(32.0, 16.0, 32.0, 16.0));
        assert_eq!(sheet.frame(0).unwrap().reg_x, 16.0);
        assert_eq!(sheet.framerate, 12.0);
    }

    #[test]
    fn test_animation_forms() {
        let sheet = SpriteSheet::from_json(
            r#"{
                "frames": [[0,0,8,8], [8,0,8,8], [16,0,8,8], [24,0,8,8,0,4,4]],
                "animations": {
                    "stand": 0,
                    "run": [1, 3, "stand", 0.5],
                    "blink": { "frames": [0, 2, 0], "next": "run" }
                }
            }"#,
        )
        .unwrap();

        assert_eq!(sheet.animation("stand").unwrap().frames, vec![0]);
        let run = sheet.animation("run").unwrap();
        assert_eq!(run.frames, vec![1, 2, 3]);
        assert_eq!(run.next.as_deref(), Some("stand"));
        assert_eq!(run.speed, 0.5);
        assert_eq!(sheet.animation("blink").unwrap().next.as_deref(), Some("run"));
        assert_eq!(sheet.frame(3).unwrap().reg_y, 4.0);
    }

    #[test]
    fn test_animation_past_last_frame_is_rejected() {
        let err = SpriteSheet::from_json(
            r#"{ "frames": [[0,0,8,8]], "animations": { "run": [0, 4] } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, TypesError::InvalidSpriteSheet(_)));
    }

    #[test]
    fn test_grid_without_count_is_rejected() {
        assert!(SpriteSheet::from_json(r#"{ "frames": { "width": 8, "height": 8 } }"#).is_err());
    }

    #[test]
    fn test_malformed_json_surfaces_parse_error() {
        assert!(matches!(
            SpriteSheet::from_json("{ nope"),
            Err(TypesError::Json(_))
        ));
    }
}
