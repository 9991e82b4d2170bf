//! Shared state stores for UI layers.
//!
//! Each store holds one slice of editor state and bumps its version on
//! every write, so pollers can skip unchanged slices.

use std::collections::VecDeque;
use std::sync::Arc;

use bevy::prelude::Resource;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::events::Notification;
use crate::gesture::GestureMode;
use crate::landmark::LandmarkGroupJson;
use crate::session::{AnnotationSession, ViewFlags};

/// Maximum number of notifications to keep.
const MAX_NOTIFICATIONS: usize = 20;

// ============================================================================
// Data Types
// ============================================================================

/// Editor state summary for UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorSummary {
    pub asset_id: Option<String>,
    pub pending_asset: Option<String>,
    pub asset_index: Option<usize>,
    pub asset_count: usize,
    pub template: String,
    pub flags: ViewFlags,
    pub gesture: Option<GestureMode>,
    pub selected: Vec<usize>,
    pub target: Option<usize>,
    pub can_undo: bool,
    pub can_redo: bool,
    pub unsaved: bool,
}

impl EditorSummary {
    pub fn from_session(session: &AnnotationSession) -> Self {
        let model = session.model();
        Self {
            asset_id: session.bound_asset().map(str::to_string),
            pending_asset: session.pending_asset().map(str::to_string),
            asset_index: session.navigator().index(),
            asset_count: session.navigator().len(),
            template: session.template().to_string(),
            flags: session.flags(),
            gesture: session.gesture().mode(),
            selected: model.map(|m| m.selection().selected()).unwrap_or_default(),
            target: model.and_then(|m| m.target()),
            can_undo: model.is_some_and(|m| m.tracker().can_undo()),
            can_redo: model.is_some_and(|m| m.tracker().can_redo()),
            unsaved: session.has_unsaved_changes(),
        }
    }
}

// ============================================================================
// Individual Stores
// ============================================================================

#[derive(Debug, Default)]
pub struct EditorStore {
    summary: RwLock<Option<EditorSummary>>,
    version: RwLock<u64>,
}

impl EditorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_summary(&self) -> Option<EditorSummary> {
        self.summary.read().clone()
    }

    pub fn get_version(&self) -> u64 {
        *self.version.read()
    }

    /// Replace the summary. Identical summaries keep the version.
    pub fn update(&self, summary: EditorSummary) {
        let mut current = self.summary.write();
        if current.as_ref() == Some(&summary) {
            return;
        }
        *current = Some(summary);
        *self.version.write() += 1;
    }
}

/// Store for the bound landmark group.
#[derive(Debug, Default)]
pub struct LandmarkStore {
    landmarks: RwLock<Option<LandmarkGroupJson>>,
    version: RwLock<u64>,
}

impl LandmarkStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_landmarks(&self) -> Option<LandmarkGroupJson> {
        self.landmarks.read().clone()
    }

    pub fn get_version(&self) -> u64 {
        *self.version.read()
    }

    pub fn set_landmarks(&self, landmarks: Option<LandmarkGroupJson>) {
        *self.landmarks.write() = landmarks;
        *self.version.write() += 1;
    }
}

/// Store for user notifications, oldest first.
#[derive(Debug, Default)]
pub struct NotificationStore {
    notifications: RwLock<VecDeque<Notification>>,
    version: RwLock<u64>,
}

impl NotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_notifications(&self) -> Vec<Notification> {
        self.notifications.read().iter().cloned().collect()
    }

    pub fn get_version(&self) -> u64 {
        *self.version.read()
    }

    pub fn push(&self, notification: Notification) {
        let mut notifications = self.notifications.write();
        notifications.push_back(notification);

        // Trim old notifications
        while notifications.len() > MAX_NOTIFICATIONS {
            notifications.pop_front();
        }

        *self.version.write() += 1;
    }
}

// ============================================================================
// Combined State Stores
// ============================================================================

/// All editor stores combined for easy sharing.
#[derive(Debug, Clone, Resource)]
pub struct EditorStateStore {
    pub editor: Arc<EditorStore>,
    pub landmarks: Arc<LandmarkStore>,
    pub notifications: Arc<NotificationStore>,
}

impl EditorStateStore {
    pub fn new() -> Self {
        Self {
            editor: Arc::new(EditorStore::new()),
            landmarks: Arc::new(LandmarkStore::new()),
            notifications: Arc::new(NotificationStore::new()),
        }
    }
}

impl Default for EditorStateStore {
    fn default() -> Self {
        Self::new()
    }
}
