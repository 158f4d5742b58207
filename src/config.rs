use serde::{Deserialize, Serialize};
use std::path::Path;

/// Layout tunables. All distances are in geometric units (the same unit the
/// font metrics report), with y growing downward as in SVG.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Nominal horizontal spacing unit between peers in a layer. The tweak
    /// pass keeps a third of this as the minimum gap when it pushes nodes.
    pub x_spacing: i32,
    /// Nominal vertical spacing unit between layers. The cascading shift
    /// keeps a sixth of this as the minimum inter-layer gap.
    pub y_spacing: i32,
    /// Padding added around the text label block on every side.
    pub label_padding: i32,
    /// Minimum width of a shapeless placeholder node.
    pub dummy_width: i32,
    /// Minimum height of a shapeless placeholder node.
    pub dummy_height: i32,
    /// Base width reserved on a node's right side once it has a self-loop.
    pub self_loop_min_width: i32,
    /// Extra width reserved per additional self-loop.
    pub self_loop_x_gap: i32,
    /// Font family list used when measuring labels with system fonts.
    pub font_family: String,
    /// Font size used when measuring labels with system fonts.
    pub font_size: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            x_spacing: 30,
            y_spacing: 60,
            label_padding: 5,
            dummy_width: 30,
            dummy_height: 10,
            self_loop_min_width: 20,
            self_loop_x_gap: 10,
            font_family: "sans-serif".to_string(),
            font_size: 14.0,
        }
    }
}

impl LayoutConfig {
    /// Minimum horizontal gap enforced between pushed peers.
    pub fn x_gap(&self) -> i32 {
        self.x_spacing / 3
    }

    /// Minimum vertical gap enforced between cascaded layers.
    pub fn y_gap(&self) -> i32 {
        self.y_spacing / 6
    }
}

/// Loads config overrides from a JSON (or JSON5) file; `None` yields the
/// defaults. Missing keys keep their default values.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<LayoutConfig> {
    let Some(path) = path else {
        return Ok(LayoutConfig::default());
    };
    let contents = std::fs::read_to_string(path)?;
    let config = match serde_json::from_str(&contents) {
        Ok(config) => config,
        Err(_) => json5::from_str(&contents)?,
    };
    Ok(config)
}
