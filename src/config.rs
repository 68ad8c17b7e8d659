//! Editor tuning knobs.
//!
//! All values are in canvas units unless noted. The defaults are what the
//! editor ships with; hosts can override them from JSON:
//!
//! ```
//! use workflow_node_editor::EditorConfig;
//!
//! let config = EditorConfig::from_json(r#"{ "grid_size": 10, "history_depth": 100 }"#).unwrap();
//! assert_eq!(config.grid_size, 10.0);
//! assert_eq!(config.snap_radius, 40.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::coords::ScaleBounds;
use crate::error::ConfigError;
use crate::geometry::NodeMetrics;

/// What the editor does when a gesture starts while another is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GestureConflictPolicy {
    /// End the pending gesture as if the pointer had been released, then
    /// start the new one.
    #[default]
    Resolve,
    /// Keep the pending gesture and reject the new one.
    Refuse,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub grid_size: f32,
    pub snap_to_grid: bool,
    /// Radius within which a moving connection endpoint locks onto a port.
    pub snap_radius: f32,
    /// Radius for the hit-test at connection release. Must not exceed
    /// `snap_radius`.
    pub hit_radius: f32,
    /// Box-selects smaller than this in both dimensions count as clicks.
    pub box_select_threshold: f32,
    pub history_depth: usize,
    pub scale_bounds: ScaleBounds,
    /// Multiplicative step for zoom in/out shortcuts (screen-independent).
    pub zoom_step: f32,
    pub node_metrics: NodeMetrics,
    pub gesture_conflict: GestureConflictPolicy,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            grid_size: 20.0,
            snap_to_grid: true,
            snap_radius: 40.0,
            hit_radius: 30.0,
            box_select_threshold: 5.0,
            history_depth: 50,
            scale_bounds: ScaleBounds::default(),
            zoom_step: 1.2,
            node_metrics: NodeMetrics::default(),
            gesture_conflict: GestureConflictPolicy::default(),
        }
    }
}

impl EditorConfig {
    /// Parse a (possibly partial) JSON config and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: EditorConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("grid_size", self.grid_size)?;
        positive("snap_radius", self.snap_radius)?;
        positive("hit_radius", self.hit_radius)?;
        positive("box_select_threshold", self.box_select_threshold)?;
        positive("zoom_step", self.zoom_step)?;
        positive("scale_bounds.min", self.scale_bounds.min)?;
        positive("scale_bounds.max", self.scale_bounds.max)?;
        positive("node_metrics.width", self.node_metrics.width)?;
        positive("node_metrics.height", self.node_metrics.height)?;

        if self.scale_bounds.min > self.scale_bounds.max {
            return Err(ConfigError::InvertedScaleBounds {
                min: self.scale_bounds.min,
                max: self.scale_bounds.max,
            });
        }
        if self.hit_radius > self.snap_radius {
            return Err(ConfigError::HitRadiusExceedsSnap {
                hit: self.hit_radius,
                snap: self.snap_radius,
            });
        }
        if self.history_depth == 0 {
            return Err(ConfigError::ZeroHistoryDepth);
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}
