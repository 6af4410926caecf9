use serde::{Deserialize, Serialize};
use smartstring::alias::String as SmartString;

use crate::Image;

/// Pixel filters applied to a cached display object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Filter {
    AlphaMap {
        map: Image,
    },
    AlphaMask {
        mask: Image,
    },
    Blur {
        blur_x: f64,
        blur_y: f64,
        quality: u32,
    },
    Color {
        red_multiplier: f64,
        green_multiplier: f64,
        blue_multiplier: f64,
        alpha_multiplier: f64,
        red_offset: f64,
        green_offset: f64,
        blue_offset: f64,
        alpha_offset: f64,
    },
    ColorMatrix {
        matrix: Vec<f64>,
    },
}

impl Filter {
    pub fn blur(blur_x: f64, blur_y: f64, quality: u32) -> Self {
        Filter::Blur {
            blur_x,
            blur_y,
            quality,
        }
    }

    /// Multiplies each channel, leaving offsets at zero.
    pub fn color(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Filter::Color {
            red_multiplier: red,
            green_multiplier: green,
            blue_multiplier: blue,
            alpha_multiplier: alpha,
            red_offset: 0.0,
            green_offset: 0.0,
            blue_offset: 0.0,
            alpha_offset: 0.0,
        }
    }

    /// Pixels the filter bleeds past the source bounds on each side.
    pub fn margin(&self) -> f64 {
        match self {
            Filter::Blur {
                blur_x,
                blur_y,
                quality,
            } => blur_x.max(*blur_y) * (*quality).max(1) as f64,
            _ => 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shadow {
    pub color: SmartString,
    pub offset_x: f64,
    pub offset_y: f64,
    pub blur: f64,
}

impl Shadow {
    pub fn new(color: impl Into<SmartString>, offset_x: f64, offset_y: f64, blur: f64) -> Self {
        Self {
            color: color.into(),
            offset_x,
            offset_y,
            blur,
        }
    }
}

impl Default for Shadow {
    fn default() -> Self {
        Self::new("black", 0.0, 0.0, 0.0)
    }
}
