//! Bevy plugins for the landmark editor.
//!
//! Provides:
//! - `LandmarkerHeadlessPlugin`: Session logic only (no window dependencies) for headless use and tests
//! - `LandmarkerPlugin`: `LandmarkerHeadlessPlugin` + window pointer input and keyboard shortcuts

use bevy::prelude::*;

use crate::bevy::events::ViewportMessage;
use crate::bevy::resources::{BridgeRes, CursorState, EditorSessionRes, InputQueue};
use crate::bevy::state_store::EditorStateStore;
use crate::bevy::systems;
use crate::bridge::PlaneBridge;
use crate::config::EditorConfig;
use crate::navigator::AssetList;
use crate::session::{AnnotationSession, AssetMode};

/// Everything needed to start a session.
#[derive(Debug, Clone)]
pub struct SessionSetup {
    pub config: EditorConfig,
    pub mode: AssetMode,
    pub template: String,
    pub assets: Vec<String>,
    /// Size of the default image-plane bridge, in pixels.
    pub image_size: Vec2,
}

impl Default for SessionSetup {
    fn default() -> Self {
        Self {
            config: EditorConfig::default(),
            mode: AssetMode::Image,
            template: String::new(),
            assets: Vec::new(),
            image_size: Vec2::new(1024.0, 1024.0),
        }
    }
}

// ============================================================================
// Headless Plugin (logic only, no window dependencies)
// ============================================================================

/// Headless plugin containing the session and its queue processing.
///
/// Use this plugin with `MinimalPlugins` to drive the editor through the
/// [`InputQueue`] without a windowing backend. The bridge defaults to a
/// [`PlaneBridge`] of `image_size`; hosts with a camera insert their own
/// [`BridgeRes`] after adding the plugin.
#[derive(Default)]
pub struct LandmarkerHeadlessPlugin {
    pub setup: SessionSetup,
    pub input_queue: Option<InputQueue>,
    pub state_store: Option<EditorStateStore>,
}

impl Plugin for LandmarkerHeadlessPlugin {
    fn build(&self, app: &mut App) {
        let setup = &self.setup;
        tracing::info!(
            "[plugin] landmarker session: {:?} mode, template {:?}, {} asset(s)",
            setup.mode,
            setup.template,
            setup.assets.len()
        );

        // ====================================================================
        // Resources
        // ====================================================================
        let session = AnnotationSession::new(
            setup.config.clone(),
            setup.mode,
            setup.template.clone(),
            AssetList::new(setup.assets.clone()),
        );
        app.insert_resource(EditorSessionRes(session))
            .insert_resource(BridgeRes::new(PlaneBridge::new(setup.image_size.x, setup.image_size.y)))
            .insert_resource(self.input_queue.clone().unwrap_or_default())
            .insert_resource(self.state_store.clone().unwrap_or_default());

        // ====================================================================
        // Messages
        // ====================================================================
        app.add_message::<ViewportMessage>();

        // ====================================================================
        // Systems
        // ====================================================================
        app.add_systems(
            Update,
            (systems::process_input_queue, systems::sync_state_store).chain(),
        );
    }
}

// ============================================================================
// Windowed Plugin (headless + window input)
// ============================================================================

/// Headless plugin plus primary window mouse input and keyboard shortcuts.
#[derive(Default)]
pub struct LandmarkerPlugin {
    pub setup: SessionSetup,
    pub input_queue: Option<InputQueue>,
    pub state_store: Option<EditorStateStore>,
}

impl LandmarkerPlugin {
    pub fn new(setup: SessionSetup, input_queue: InputQueue, state_store: EditorStateStore) -> Self {
        Self {
            setup,
            input_queue: Some(input_queue),
            state_store: Some(state_store),
        }
    }
}

impl Plugin for LandmarkerPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(LandmarkerHeadlessPlugin {
            setup: self.setup.clone(),
            input_queue: self.input_queue.clone(),
            state_store: self.state_store.clone(),
        });

        app.init_resource::<CursorState>();
        app.add_systems(
            Update,
            (systems::collect_pointer_input, systems::collect_keyboard_shortcuts)
                .before(systems::process_input_queue),
        );
    }
}
