//! Events the engine emits for the rendering collaborator.
//!
//! Every engine operation returns the events it produced, in order. The
//! renderer applies them; the engine never calls back into it.

use bevy::math::{Vec2, Vec3};

use crate::geometry::ScreenRect;
use crate::session::ViewFlags;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Warning,
}

/// A non-blocking message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Warning,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewportEvent {
    /// Camera interaction must stop until the matching unlock.
    CameraLocked,
    CameraUnlocked,
    /// Pointer input is captured by a gesture until the matching release.
    PointerCaptured,
    PointerReleased,
    /// Position or selection of these landmarks changed.
    LandmarksChanged(Vec<usize>),
    /// Shift-drag selection rectangle preview.
    SelectionRect(ScreenRect),
    /// Bounding-box creation preview.
    BoundingBoxPreview(ScreenRect),
    /// Previews and guide lines should be removed.
    OverlayCleared,
    RotationCircleShown { center: Vec2, radius: f32 },
    RotationCircleHidden,
    /// Guides from the pointer to the snap target and the next closest
    /// landmarks. `screen` is where the guides start; `pointer` is the
    /// surface point under it in model space.
    TargetingLines {
        screen: Vec2,
        pointer: Vec3,
        target: usize,
        next_closest: Vec<usize>,
    },
    Notification(Notification),
    FlagsChanged(ViewFlags),
    /// The navigator switched; landmarks for this asset are awaited.
    AssetRequested { index: usize, asset_id: String },
    /// A landmark group was bound for this asset.
    AssetBound { asset_id: String },
    HistoryChanged { can_undo: bool, can_redo: bool },
}
