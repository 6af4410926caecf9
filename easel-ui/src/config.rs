//! Stage configuration and tracing setup.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use smartstring::alias::String as SmartString;

use crate::error::{Error, Result};

/// Mouse-over polling used when the prop is `true`.
pub const DEFAULT_MOUSE_OVER_FREQUENCY: u32 = 20;

/// `enableMouseOver` accepts either a polling frequency or a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnableMouseOver {
    Frequency(u32),
    Toggle(bool),
}

impl EnableMouseOver {
    /// Polls per second; `0` disables mouse-over events.
    pub fn frequency(self) -> u32 {
        match self {
            EnableMouseOver::Frequency(frequency) => frequency,
            EnableMouseOver::Toggle(true) => DEFAULT_MOUSE_OVER_FREQUENCY,
            EnableMouseOver::Toggle(false) => 0,
        }
    }
}

/// Props of the stage itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StageProps {
    pub access_key: Option<SmartString>,
    pub class_name: Option<SmartString>,
    pub width: u32,
    pub height: u32,
    pub role: Option<SmartString>,
    pub style: Option<BTreeMap<SmartString, SmartString>>,
    pub tab_index: Option<i32>,
    pub enable_mouse_over: Option<EnableMouseOver>,
    pub log_level: Option<String>,
}

impl Default for StageProps {
    fn default() -> Self {
        Self {
            access_key: None,
            class_name: None,
            width: 300,
            height: 150,
            role: None,
            style: None,
            tab_index: None,
            enable_mouse_over: None,
            log_level: None,
        }
    }
}

impl StageProps {
    pub fn from_json(data: &str) -> Result<Self> {
        serde_json::from_str(data).map_err(|err| Error::InvalidProps(err.to_string()))
    }

    /// Attributes forwarded verbatim to the hosted canvas element.
    pub fn canvas_element(&self) -> CanvasElement {
        CanvasElement {
            access_key: self.access_key.clone(),
            class_name: self.class_name.clone(),
            width: self.width,
            height: self.height,
            role: self.role.clone(),
            style: self.style.clone(),
            tab_index: self.tab_index,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasElement {
    pub access_key: Option<SmartString>,
    pub class_name: Option<SmartString>,
    pub width: u32,
    pub height: u32,
    pub role: Option<SmartString>,
    pub style: Option<BTreeMap<SmartString, SmartString>>,
    pub tab_index: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickerConfig {
    pub framerate: f64,
}

impl TickerConfig {
    /// Time between frames. A non-positive or NaN framerate ticks on every
    /// call; one too small to represent waits forever.
    pub fn interval(&self) -> Duration {
        if self.framerate > 0.0 {
            Duration::try_from_secs_f64(self.framerate.recip()).unwrap_or(Duration::MAX)
        } else {
            Duration::ZERO
        }
    }
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self { framerate: 60.0 }
    }
}

/// Installs a fmt subscriber filtered by `RUST_LOG`, falling back to
/// `level`. `"off"` skips installation; an already installed subscriber
/// is left in place.
pub fn init_tracing(level: &str) {
    if level == "off" {
        return;
    }
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();
}
