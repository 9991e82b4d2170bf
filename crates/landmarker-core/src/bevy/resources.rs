//! ECS Resources for the landmark editor.

use std::collections::VecDeque;
use std::sync::Arc;

use bevy::prelude::*;
use parking_lot::Mutex;

use crate::bridge::CoordinateBridge;
use crate::gesture::PointerEvent;
use crate::landmark::LandmarkGroup;
use crate::session::{AnnotationSession, EditorCommand};

/// The annotation session driven by the app.
#[derive(Resource)]
pub struct EditorSessionRes(pub AnnotationSession);

/// Scene queries for the session. Hosts with a real camera replace this
/// with their own bridge.
#[derive(Resource)]
pub struct BridgeRes(pub Box<dyn CoordinateBridge + Send + Sync>);

impl BridgeRes {
    pub fn new(bridge: impl CoordinateBridge + Send + Sync + 'static) -> Self {
        Self(Box::new(bridge))
    }
}

/// Input for the session, processed in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorInput {
    PointerDown(PointerEvent),
    PointerMove(PointerEvent),
    PointerUp(PointerEvent),
    Command(EditorCommand),
    /// The host finished loading landmarks for an asset.
    AssetReady { asset_id: String, group: LandmarkGroup },
    /// Stored undo history of an asset is stale.
    EvictAsset { asset_id: String },
}

/// Shared input queue, fed by input systems or from outside the app.
#[derive(Resource, Clone, Debug)]
pub struct InputQueue {
    inner: Arc<Mutex<VecDeque<EditorInput>>>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    pub fn push(&self, input: EditorInput) {
        self.inner.lock().push_back(input);
    }

    pub fn push_command(&self, command: EditorCommand) {
        self.push(EditorInput::Command(command));
    }

    /// Drain all pending inputs.
    pub fn drain(&self) -> Vec<EditorInput> {
        self.inner.lock().drain(..).collect()
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Last cursor position seen on the primary window.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct CursorState {
    pub position: Option<Vec2>,
}
