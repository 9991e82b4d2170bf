//! Landmarker Core Library
//!
//! Interactive landmark editing: pointer gestures over a 3D mesh or a 2D
//! image, selection and snapping, resize/rotate/bounding-box handles, and
//! per-asset undo history.
//!
//! The engine is renderer-agnostic. Scene queries go through
//! [`CoordinateBridge`] and every operation returns the
//! [`ViewportEvent`]s a renderer should apply. The `bevy` module wires the
//! engine into a Bevy app.

#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod bridge;
pub mod config;
pub mod error;
pub mod events;
pub mod geometry;
pub mod gesture;
pub mod handles;
pub mod history;
pub mod landmark;
pub mod model;
pub mod navigator;
pub mod selection;
pub mod session;

// Bevy integration
pub mod bevy;

pub use ::bevy::math::{Vec2, Vec3};
pub use bridge::{CoordinateBridge, Intersection, PlaneBridge, find_closest_landmarks};
pub use config::EditorConfig;
pub use error::{LandmarkerError, Result};
pub use events::{Notification, NotificationLevel, ViewportEvent};
pub use geometry::{Corner, ScreenRect};
pub use gesture::{GestureContext, GestureMachine, GestureMode, GestureState, Modifiers, PointerButton, PointerEvent};
pub use handles::{HandleGeometry, HandleHits};
pub use history::{HistoryEntry, LandmarkChange, LandmarkTracker, TrackerKey, TrackerStore};
pub use landmark::{Label, Landmark, LandmarkGroup, LandmarkGroupJson, Template, TemplateLabel};
pub use model::AnnotationModel;
pub use navigator::{AssetList, AssetNavigator};
pub use selection::SelectionModel;
pub use session::{AnnotationSession, AssetMode, EditorCommand, ViewFlags};
