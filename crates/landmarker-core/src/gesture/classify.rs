//! Pointer-down classification.
//!
//! Pure functions over the hits gathered at press time. The precedence
//! order here decides what every click in the editor does.

use crate::bridge::Intersection;
use crate::geometry::Corner;
use crate::handles::HandleHits;

use super::GestureMode;

/// What was under the pointer when it went down.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PressHits {
    /// Nearest landmark symbol hit: index and ray distance.
    pub landmark: Option<(usize, f32)>,
    /// Nearest mesh hit.
    pub mesh: Option<Intersection>,
    pub handles: HandleHits,
}

/// Editor state that affects classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PressFlags {
    pub shift: bool,
    /// Editing (snap) mode is on.
    pub snap_enabled: bool,
    pub has_target: bool,
    pub bounding_box_mode: bool,
    /// Landmark 0 has not been placed yet.
    pub first_landmark_empty: bool,
}

/// The region a press landed on, with the data its gesture needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressTarget {
    BoundingBoxHandle(Corner),
    BoundingBoxCreate,
    ResizeHandle(Corner),
    Landmark(usize),
    SelectionBox,
    RotateHandle,
    ShiftSelect,
    Mesh,
    Nothing,
}

impl PressTarget {
    pub fn mode(self) -> GestureMode {
        match self {
            PressTarget::BoundingBoxHandle(_) => GestureMode::BoundingBoxHandle,
            PressTarget::BoundingBoxCreate => GestureMode::BoundingBoxCreate,
            PressTarget::ResizeHandle(_) => GestureMode::ResizeHandle,
            PressTarget::Landmark(_) => GestureMode::LandmarkPress,
            PressTarget::SelectionBox => GestureMode::SelectionBoxPress,
            PressTarget::RotateHandle => GestureMode::RotateHandle,
            PressTarget::ShiftSelect => GestureMode::ShiftSelect,
            PressTarget::Mesh => GestureMode::MeshPress,
            PressTarget::Nothing => GestureMode::NothingPress,
        }
    }
}

/// Classify a primary-button press.
///
/// When both a landmark and the mesh are hit, the landmark only wins if it
/// is strictly nearer and no grab handle is under the pointer.
pub fn classify_primary(hits: &PressHits, flags: &PressFlags) -> PressTarget {
    let handles = &hits.handles;

    if let (Some((index, landmark_distance)), Some(mesh)) = (hits.landmark, hits.mesh) {
        if landmark_distance < mesh.distance && !handles.any_handle() {
            return PressTarget::Landmark(index);
        }
        return if let Some(corner) = handles.bounding_box {
            PressTarget::BoundingBoxHandle(corner)
        } else if let Some(corner) = handles.resize {
            PressTarget::ResizeHandle(corner)
        } else if handles.body {
            PressTarget::SelectionBox
        } else if handles.rotate {
            PressTarget::RotateHandle
        } else if flags.shift && !flags.bounding_box_mode {
            PressTarget::ShiftSelect
        } else if flags.snap_enabled && flags.has_target {
            PressTarget::Mesh
        } else {
            PressTarget::Nothing
        };
    }

    if let Some(corner) = handles.bounding_box {
        PressTarget::BoundingBoxHandle(corner)
    } else if let Some(corner) = handles.resize {
        PressTarget::ResizeHandle(corner)
    } else if let Some((index, _)) = hits.landmark {
        PressTarget::Landmark(index)
    } else if handles.body {
        PressTarget::SelectionBox
    } else if handles.rotate {
        PressTarget::RotateHandle
    } else if flags.shift && !flags.bounding_box_mode {
        PressTarget::ShiftSelect
    } else if hits.mesh.is_some() && flags.snap_enabled && flags.has_target {
        PressTarget::Mesh
    } else {
        PressTarget::Nothing
    }
}

/// Classify a secondary-button press. `None` means the press is ignored.
///
/// Only a mesh hit with no landmark under the pointer does anything.
pub fn classify_secondary(hits: &PressHits, flags: &PressFlags) -> Option<PressTarget> {
    if hits.landmark.is_some() || hits.mesh.is_none() {
        return None;
    }
    Some(match (flags.bounding_box_mode, flags.first_landmark_empty) {
        (true, true) => PressTarget::BoundingBoxCreate,
        (true, false) => PressTarget::Nothing,
        (false, _) => PressTarget::Mesh,
    })
}
