//! Editor configuration.
//!
//! Every tunable distance and size the engine uses lives here, with
//! defaults matching the behaviour users expect from the annotation tool.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Tunables for gestures, handles and view flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Euclidean screen distance below which a mesh/nothing press counts as a click.
    pub click_tolerance: f32,
    /// Padding (px) between the selected landmarks' bounds and the drawn selection box.
    pub selection_padding: f32,
    /// Radius (px) of the selection box corner and rotation handles.
    pub selection_handle_radius: f32,
    /// Extra grab radius (px) added around resize handles.
    pub resize_handle_padding: f32,
    /// Extra grab radius (px) added around the rotation handle.
    pub rotation_handle_padding: f32,
    /// Half width (px) of the bounding-box corner handles.
    pub bounding_box_handle_half_width: f32,
    /// Number of selected landmarks at which the selection box (group mode) appears.
    pub min_group_selection: usize,
    /// Landmarks tracked while hovering: the target plus the next closest.
    pub closest_landmarks: usize,
    /// Relative error allowed when checking that four landmarks form a rectangle.
    pub rectangle_tolerance: f32,
    pub landmark_size: f32,
    pub landmark_size_step: f32,
    pub min_landmark_size: f32,
    pub max_landmark_size: f32,
    /// Size used while in bounding-box mode (zero breaks symbol scaling).
    pub bounding_box_landmark_size: f32,
    /// Screen distance (px) moved per budge.
    pub budge_step: f32,
    pub editing_on: bool,
    pub connectivity_on: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            click_tolerance: 2.0,
            selection_padding: 10.0,
            selection_handle_radius: 4.0,
            resize_handle_padding: 1.0,
            rotation_handle_padding: 2.0,
            bounding_box_handle_half_width: 5.0,
            min_group_selection: 2,
            closest_landmarks: 4,
            rectangle_tolerance: 0.01,
            landmark_size: 0.2,
            landmark_size_step: 0.25,
            min_landmark_size: 0.05,
            max_landmark_size: 1.0,
            bounding_box_landmark_size: 0.000_01,
            budge_step: 1.0,
            editing_on: true,
            connectivity_on: true,
        }
    }
}

impl EditorConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON config file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}
