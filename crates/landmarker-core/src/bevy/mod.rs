//! Bevy integration for the landmark editor.
//!
//! The engine runs inside a Bevy app as a resource. Pointer and keyboard
//! input, editor commands and asset readiness arrive through a shared
//! [`InputQueue`]; engine output leaves as [`ViewportMessage`]s and as a
//! versioned snapshot in [`EditorStateStore`] for UI layers.

pub mod events;
pub mod plugin;
pub mod resources;
pub mod state_store;
pub mod systems;

#[cfg(test)]
pub(crate) mod test_utils;

pub use events::ViewportMessage;
pub use plugin::{LandmarkerHeadlessPlugin, LandmarkerPlugin};
pub use resources::*;
pub use state_store::{EditorStateStore, EditorStore, EditorSummary, LandmarkStore, NotificationStore};
