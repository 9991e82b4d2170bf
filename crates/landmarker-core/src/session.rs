//! The annotation session: view flags, asset switching and history
//! ownership around the gesture machine.
//!
//! The session binds one landmark group at a time. Switching assets or
//! templates unbinds it, checks its tracker back into the store and waits
//! for the host to report the next group ready.

use bevy::math::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::bridge::CoordinateBridge;
use crate::config::EditorConfig;
use crate::error::{LandmarkerError, Result};
use crate::events::{Notification, ViewportEvent};
use crate::geometry::makes_rectangle_shape;
use crate::gesture::{GestureContext, GestureMachine, PointerEvent};
use crate::handles::HandleGeometry;
use crate::history::{TrackerKey, TrackerStore};
use crate::landmark::{LandmarkGroup, LandmarkGroupJson};
use crate::model::AnnotationModel;
use crate::navigator::AssetNavigator;

/// What kind of asset is being annotated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetMode {
    Image,
    #[default]
    Mesh,
}

/// Display and editing flags shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewFlags {
    pub editing: bool,
    pub connectivity: bool,
    pub bounding_box: bool,
    pub landmark_size: f32,
    /// The editing toggle is disabled.
    pub editing_locked: bool,
    /// The connectivity toggle is disabled.
    pub connectivity_locked: bool,
    /// The landmark size controls are disabled.
    pub size_locked: bool,
}

impl ViewFlags {
    pub fn from_config(config: &EditorConfig) -> Self {
        Self {
            editing: config.editing_on,
            connectivity: config.connectivity_on,
            bounding_box: false,
            landmark_size: config.landmark_size,
            editing_locked: false,
            connectivity_locked: false,
            size_locked: false,
        }
    }

    fn set_locked(&mut self, locked: bool) {
        self.editing_locked = locked;
        self.connectivity_locked = locked;
        self.size_locked = locked;
    }
}

/// Flags put aside while bounding-box mode is on.
#[derive(Debug, Clone, Copy, PartialEq)]
struct FlagStash {
    editing: bool,
    connectivity: bool,
    landmark_size: f32,
}

/// Editor operations that are not pointer gestures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum EditorCommand {
    Undo,
    Redo,
    DeleteSelected,
    SelectAll,
    DeselectAll,
    Budge { dx: f32, dy: f32 },
    /// Place one landmark at a model-space point.
    SetLandmark {
        index: usize,
        x: f32,
        y: f32,
        #[serde(default)]
        z: f32,
    },
    ToggleBoundingBox,
    ToggleEditing,
    ToggleConnectivity,
    IncrementLandmarkSize,
    DecrementLandmarkSize,
    NextAsset,
    PreviousAsset,
    GoToAsset { index: usize },
    SetTemplate { name: String },
    MarkSaved,
}

#[derive(Debug)]
struct BoundAsset {
    asset_id: String,
    model: AnnotationModel,
}

pub struct AnnotationSession {
    config: EditorConfig,
    mode: AssetMode,
    flags: ViewFlags,
    stash: Option<FlagStash>,
    template: String,
    trackers: TrackerStore,
    navigator: Box<dyn AssetNavigator + Send + Sync>,
    bound: Option<BoundAsset>,
    /// Asset whose landmarks are awaited.
    pending: Option<String>,
    gesture: GestureMachine,
}

impl AnnotationSession {
    /// Start a session on the navigator's current asset, waiting for its
    /// landmarks.
    pub fn new(
        config: EditorConfig,
        mode: AssetMode,
        template: impl Into<String>,
        navigator: impl AssetNavigator + Send + Sync + 'static,
    ) -> Self {
        let pending = navigator.current_id();
        Self {
            flags: ViewFlags::from_config(&config),
            config,
            mode,
            stash: None,
            template: template.into(),
            trackers: TrackerStore::new(),
            navigator: Box::new(navigator),
            bound: None,
            pending,
            gesture: GestureMachine::new(),
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn mode(&self) -> AssetMode {
        self.mode
    }

    pub fn flags(&self) -> ViewFlags {
        self.flags
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn gesture(&self) -> &GestureMachine {
        &self.gesture
    }

    pub fn navigator(&self) -> &dyn AssetNavigator {
        self.navigator.as_ref()
    }

    pub fn model(&self) -> Option<&AnnotationModel> {
        self.bound.as_ref().map(|b| &b.model)
    }

    fn require_model(&self) -> Result<&AnnotationModel> {
        self.model().ok_or(LandmarkerError::NoLandmarks)
    }

    pub fn bound_asset(&self) -> Option<&str> {
        self.bound.as_ref().map(|b| b.asset_id.as_str())
    }

    pub fn pending_asset(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    /// Handle boxes to draw for the current selection.
    pub fn handles(&self, bridge: &dyn CoordinateBridge) -> HandleGeometry {
        self.model().map_or_else(HandleGeometry::default, |model| {
            HandleGeometry::compute(model, bridge, &self.config, self.flags.bounding_box)
        })
    }

    // ========================================================================
    // Pointer input
    // ========================================================================

    pub fn pointer_down(&mut self, bridge: &dyn CoordinateBridge, event: PointerEvent) -> Vec<ViewportEvent> {
        self.with_gesture(bridge, |machine, ctx| machine.pointer_down(ctx, event))
    }

    pub fn pointer_move(&mut self, bridge: &dyn CoordinateBridge, event: PointerEvent) -> Vec<ViewportEvent> {
        self.with_gesture(bridge, |machine, ctx| machine.pointer_move(ctx, event))
    }

    pub fn pointer_up(&mut self, bridge: &dyn CoordinateBridge, event: PointerEvent) -> Vec<ViewportEvent> {
        self.with_gesture(bridge, |machine, ctx| machine.pointer_up(ctx, event))
    }

    pub fn budge(&mut self, bridge: &dyn CoordinateBridge, delta: Vec2) -> Vec<ViewportEvent> {
        self.with_gesture(bridge, |machine, ctx| machine.budge(ctx, delta))
    }

    fn with_gesture(
        &mut self,
        bridge: &dyn CoordinateBridge,
        f: impl FnOnce(&mut GestureMachine, &mut GestureContext<'_>) -> Vec<ViewportEvent>,
    ) -> Vec<ViewportEvent> {
        let Some(bound) = self.bound.as_mut() else {
            return Vec::new();
        };
        let mut ctx = GestureContext {
            model: &mut bound.model,
            bridge,
            config: &self.config,
            editing: self.flags.editing,
            bounding_box_mode: self.flags.bounding_box,
        };
        f(&mut self.gesture, &mut ctx)
    }

    /// Run a model edit that must not interleave with a live gesture.
    fn edit_model(&mut self, f: impl FnOnce(&mut AnnotationModel)) -> Vec<ViewportEvent> {
        let mut events = Vec::new();
        if !self.gesture.is_idle() {
            tracing::debug!("[session] edit ignored during a gesture");
            return events;
        }
        if let Some(bound) = self.bound.as_mut() {
            f(&mut bound.model);
            bound.model.drain_events(&mut events);
        }
        events
    }

    // ========================================================================
    // Commands
    // ========================================================================

    pub fn apply_command(&mut self, bridge: &dyn CoordinateBridge, command: &EditorCommand) -> Result<Vec<ViewportEvent>> {
        tracing::debug!("[session] command {command:?}");
        Ok(match command {
            EditorCommand::Undo => self.undo(),
            EditorCommand::Redo => self.redo(),
            EditorCommand::DeleteSelected => self.delete_selected(),
            EditorCommand::SelectAll => self.edit_model(AnnotationModel::select_all),
            EditorCommand::DeselectAll => self.edit_model(AnnotationModel::deselect_all),
            EditorCommand::Budge { dx, dy } => self.budge(bridge, Vec2::new(*dx, *dy)),
            EditorCommand::SetLandmark { index, x, y, z } => self.set_landmark_point(*index, Vec3::new(*x, *y, *z))?,
            EditorCommand::ToggleBoundingBox => self.toggle_bounding_box(),
            EditorCommand::ToggleEditing => self.toggle_editing(),
            EditorCommand::ToggleConnectivity => self.toggle_connectivity(),
            EditorCommand::IncrementLandmarkSize => self.increment_landmark_size(),
            EditorCommand::DecrementLandmarkSize => self.decrement_landmark_size(),
            EditorCommand::NextAsset => self.next_asset(),
            EditorCommand::PreviousAsset => self.previous_asset(),
            EditorCommand::GoToAsset { index } => self.go_to_asset(*index)?,
            EditorCommand::SetTemplate { name } => self.set_template(name.clone()),
            EditorCommand::MarkSaved => {
                self.mark_saved();
                Vec::new()
            }
        })
    }

    pub fn undo(&mut self) -> Vec<ViewportEvent> {
        self.edit_model(|model| {
            model.undo();
        })
    }

    pub fn redo(&mut self) -> Vec<ViewportEvent> {
        self.edit_model(|model| {
            model.redo();
        })
    }

    pub fn delete_selected(&mut self) -> Vec<ViewportEvent> {
        self.edit_model(|model| {
            model.delete_selected();
        })
    }

    /// Place landmark `index` at a model-space point, with history.
    pub fn set_landmark_point(&mut self, index: usize, point: Vec3) -> Result<Vec<ViewportEvent>> {
        let count = self.require_model()?.len();
        if index >= count {
            return Err(LandmarkerError::LandmarkIndexOutOfRange { index, count });
        }
        Ok(self.edit_model(|model| model.set_landmark_point(index, point)))
    }

    // ========================================================================
    // View flags
    // ========================================================================

    /// Switch bounding-box annotation on or off.
    ///
    /// Turning it on requires an image asset whose group has one label and
    /// four landmarks, all empty or all placed as a rectangle. Refusals
    /// leave every flag untouched and notify the user.
    pub fn toggle_bounding_box(&mut self) -> Vec<ViewportEvent> {
        let mut events = Vec::new();
        if self.flags.bounding_box {
            if let Some(stash) = self.stash.take() {
                self.flags.editing = stash.editing;
                self.flags.connectivity = stash.connectivity;
                self.flags.landmark_size = stash.landmark_size;
            }
            self.flags.set_locked(false);
            self.flags.bounding_box = false;
            tracing::debug!("[session] bounding box mode off");
        } else {
            if let Err(message) = self.check_bounding_box() {
                tracing::warn!("[session] bounding box mode refused: {message}");
                events.push(ViewportEvent::Notification(Notification::warning(message)));
                return events;
            }
            self.stash = Some(FlagStash {
                editing: self.flags.editing,
                connectivity: self.flags.connectivity,
                landmark_size: self.flags.landmark_size,
            });
            self.flags.editing = false;
            self.flags.connectivity = false;
            self.flags.landmark_size = self.config.bounding_box_landmark_size;
            self.flags.set_locked(true);
            self.flags.bounding_box = true;
            tracing::debug!("[session] bounding box mode on");
        }
        events.push(ViewportEvent::FlagsChanged(self.flags));
        events
    }

    fn check_bounding_box(&self) -> std::result::Result<(), String> {
        if self.mode != AssetMode::Image {
            return Err("Bounding box annotation is only available for images.".to_string());
        }
        let Some(model) = self.model() else {
            return Err("No landmarks are loaded.".to_string());
        };
        let group = model.group();
        if group.labels().len() != 1 || group.len() != 4 {
            return Err("The current template does not match the format required for bounding box \
                        annotation. The template must consist of one label and four landmarks."
                .to_string());
        }
        match group.non_empty().count() {
            0 => Ok(()),
            4 => {
                let points = model
                    .bounding_box_points()
                    .map(|points| points.map(|(_, p)| p.truncate()));
                match points {
                    Some(points) if makes_rectangle_shape(points, self.config.rectangle_tolerance) => Ok(()),
                    _ => Err("These landmarks do not form a rectangle shape, bounding box annotation \
                              cannot be used."
                        .to_string()),
                }
            }
            _ => Err("Either 0 or 4 landmarks must be placed to switch on bounding box annotation.".to_string()),
        }
    }

    /// Turning editing off also deselects everything.
    pub fn toggle_editing(&mut self) -> Vec<ViewportEvent> {
        if self.flags.editing_locked {
            return Vec::new();
        }
        self.flags.editing = !self.flags.editing;
        let mut events = Vec::new();
        if !self.flags.editing {
            events = self.edit_model(|model| {
                model.deselect_all();
                model.reset_next_available();
            });
        }
        events.push(ViewportEvent::FlagsChanged(self.flags));
        events
    }

    pub fn toggle_connectivity(&mut self) -> Vec<ViewportEvent> {
        if self.flags.connectivity_locked {
            return Vec::new();
        }
        self.flags.connectivity = !self.flags.connectivity;
        vec![ViewportEvent::FlagsChanged(self.flags)]
    }

    /// Step up to the next multiple of the size step.
    pub fn increment_landmark_size(&mut self) -> Vec<ViewportEvent> {
        let step = self.config.landmark_size_step;
        let factor = (self.flags.landmark_size / step).floor() + 1.0;
        self.set_landmark_size((step * factor).min(self.config.max_landmark_size))
    }

    /// Step down to the previous multiple of the size step.
    pub fn decrement_landmark_size(&mut self) -> Vec<ViewportEvent> {
        let step = self.config.landmark_size_step;
        let factor = (self.flags.landmark_size / step).floor() - 1.0;
        self.set_landmark_size((step * factor).max(self.config.min_landmark_size))
    }

    fn set_landmark_size(&mut self, size: f32) -> Vec<ViewportEvent> {
        if self.flags.size_locked {
            return Vec::new();
        }
        self.flags.landmark_size = size;
        vec![ViewportEvent::FlagsChanged(self.flags)]
    }

    // ========================================================================
    // Assets and templates
    // ========================================================================

    /// Advance to the next asset. No-op on the last one.
    pub fn next_asset(&mut self) -> Vec<ViewportEvent> {
        match self.navigator.index() {
            Some(index) if self.navigator.has_next() => self.go_to_asset(index + 1).unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    /// Go back to the previous asset. No-op on the first one.
    pub fn previous_asset(&mut self) -> Vec<ViewportEvent> {
        match self.navigator.index() {
            Some(index) if self.navigator.has_previous() => self.go_to_asset(index - 1).unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    /// Switch to the asset at `index`. Out of range is an error and
    /// changes nothing.
    pub fn go_to_asset(&mut self, index: usize) -> Result<Vec<ViewportEvent>> {
        self.navigator.go_to(index)?;
        let mut events = self.unbind();
        if let Some(asset_id) = self.navigator.current_id() {
            tracing::info!("[session] switching to asset {index} ({asset_id})");
            self.pending = Some(asset_id.clone());
            events.push(ViewportEvent::AssetRequested { index, asset_id });
        }
        Ok(events)
    }

    /// Change the active template and reload the current asset's landmarks.
    pub fn set_template(&mut self, name: impl Into<String>) -> Vec<ViewportEvent> {
        let name = name.into();
        if name == self.template {
            return Vec::new();
        }
        let mut events = Vec::new();
        if self.flags.bounding_box {
            events.extend(self.toggle_bounding_box());
        }
        events.extend(self.unbind());
        tracing::info!("[session] template {} -> {name}", self.template);
        self.template = name;
        if let (Some(index), Some(asset_id)) = (self.navigator.index(), self.navigator.current_id()) {
            self.pending = Some(asset_id.clone());
            events.push(ViewportEvent::AssetRequested { index, asset_id });
        }
        events
    }

    /// The host reports the landmark group of `asset_id` loaded.
    ///
    /// Only the pending asset binds; anything else is a stale signal from
    /// an earlier switch and is dropped.
    pub fn asset_ready(&mut self, asset_id: &str, group: LandmarkGroup) -> Vec<ViewportEvent> {
        if self.pending.as_deref() != Some(asset_id) {
            tracing::warn!(
                "[session] ignoring landmarks for {asset_id}, waiting for {:?}",
                self.pending
            );
            return Vec::new();
        }
        self.pending = None;
        let mut events = self.unbind();

        let tracker = self.trackers.checkout(&TrackerKey::new(asset_id, &self.template));
        let mut model = AnnotationModel::new(group, tracker);
        tracing::info!("[session] bound {} landmark(s) for {asset_id}", model.len());

        events.push(ViewportEvent::AssetBound {
            asset_id: asset_id.to_string(),
        });
        let all: Vec<usize> = (0..model.len()).collect();
        events.push(ViewportEvent::LandmarksChanged(all));
        events.push(ViewportEvent::HistoryChanged {
            can_undo: model.tracker().can_undo(),
            can_redo: model.tracker().can_redo(),
        });
        model.take_changed();
        self.bound = Some(BoundAsset {
            asset_id: asset_id.to_string(),
            model,
        });
        events
    }

    /// Drop stored undo history for an asset, e.g. after it is reloaded
    /// from the server.
    pub fn evict_asset(&mut self, asset_id: &str) {
        self.trackers.evict_asset(asset_id);
    }

    fn unbind(&mut self) -> Vec<ViewportEvent> {
        let events = self.gesture.cancel();
        if let Some(bound) = self.bound.take() {
            let (_, tracker) = bound.model.into_parts();
            self.trackers
                .checkin(TrackerKey::new(bound.asset_id, &self.template), tracker);
        }
        events
    }

    // ========================================================================
    // Saving
    // ========================================================================

    pub fn has_unsaved_changes(&self) -> bool {
        self.model().is_some_and(|model| !model.tracker().is_up_to_date())
    }

    pub fn mark_saved(&mut self) {
        if let Some(bound) = self.bound.as_mut() {
            bound.model.tracker_mut().mark_saved();
        }
    }

    /// The bound group as landmark JSON.
    pub fn landmarks_json(&self) -> Result<LandmarkGroupJson> {
        Ok(self.require_model()?.group().to_json())
    }

    /// Model point of a bound landmark.
    pub fn point(&self, index: usize) -> Option<Vec3> {
        self.model().and_then(|model| model.point(index))
    }
}
