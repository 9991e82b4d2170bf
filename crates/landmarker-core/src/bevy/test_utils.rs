//! Test utilities for headless Bevy integration tests.
//!
//! Provides `TestApp`, a wrapper around `bevy::app::App` that uses
//! `MinimalPlugins` + `LandmarkerHeadlessPlugin` for testing the editor
//! without a windowing backend.

use bevy::prelude::*;

use crate::bevy::events::ViewportMessage;
use crate::bevy::plugin::{LandmarkerHeadlessPlugin, SessionSetup};
use crate::bevy::resources::{EditorInput, EditorSessionRes, InputQueue};
use crate::bevy::state_store::EditorStateStore;
use crate::bevy::systems;
use crate::events::ViewportEvent;
use crate::landmark::LandmarkGroup;
use crate::session::AnnotationSession;

/// Viewport messages seen during the last update.
#[derive(Resource, Default)]
struct SeenMessages(Vec<ViewportEvent>);

fn record_messages(mut reader: MessageReader<ViewportMessage>, mut seen: ResMut<SeenMessages>) {
    seen.0.extend(reader.read().map(|message| message.0.clone()));
}

/// A headless Bevy app wrapper for testing.
pub(crate) struct TestApp {
    pub app: App,
}

impl TestApp {
    /// Create a test app over an image of 500x500 with the given assets.
    pub fn new(assets: &[&str]) -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(bevy::input::InputPlugin);
        app.add_plugins(LandmarkerHeadlessPlugin {
            setup: SessionSetup {
                template: "default".to_string(),
                assets: assets.iter().map(ToString::to_string).collect(),
                image_size: Vec2::new(500.0, 500.0),
                ..SessionSetup::default()
            },
            input_queue: None,
            state_store: None,
        });
        app.init_resource::<SeenMessages>();
        app.add_systems(Update, record_messages.after(systems::process_input_queue));
        // Run one update to initialize all resources
        app.update();
        Self { app }
    }

    /// Run a single frame update.
    pub fn update(&mut self) {
        self.app.world_mut().resource_mut::<SeenMessages>().0.clear();
        self.app.update();
    }

    /// Push an input to the input queue.
    pub fn push(&mut self, input: EditorInput) {
        self.app.world().resource::<InputQueue>().push(input);
    }

    /// Report landmarks for `asset_id` ready and process it.
    pub fn ready(&mut self, asset_id: &str, group: LandmarkGroup) {
        self.push(EditorInput::AssetReady {
            asset_id: asset_id.to_string(),
            group,
        });
        self.update();
    }

    pub fn session(&self) -> &AnnotationSession {
        &self.app.world().resource::<EditorSessionRes>().0
    }

    pub fn stores(&self) -> &EditorStateStore {
        self.app.world().resource::<EditorStateStore>()
    }

    /// Messages written during the last update, in order.
    pub fn messages(&self) -> &[ViewportEvent] {
        &self.app.world().resource::<SeenMessages>().0
    }
}
