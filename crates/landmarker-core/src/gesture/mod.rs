//! The pointer gesture state machine.
//!
//! A press classifies intent into exactly one [`GestureMode`] and opens a
//! [`DragSession`]; moves drive that mode's geometry; the release closes
//! it and records at most one history entry. While no session is open,
//! moves retarget the snap landmark instead.
//!
//! The machine owns no model state. Each entry point gets a
//! [`GestureContext`] with the bound model and the scene bridge, and
//! returns the [`ViewportEvent`]s it produced.

mod classify;
mod drag;
mod hover;

pub use classify::{PressFlags, PressHits, PressTarget, classify_primary, classify_secondary};
pub use drag::DragSession;

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use crate::bridge::CoordinateBridge;
use crate::config::EditorConfig;
use crate::events::ViewportEvent;
use crate::handles::HandleGeometry;
use crate::history::LandmarkChange;
use crate::model::AnnotationModel;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerButton {
    #[default]
    Primary,
    Secondary,
    Middle,
}

/// Modifier keys held during a pointer event. `ctrl` covers meta as well.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    /// Screen position in pixels.
    pub position: Vec2,
    pub button: PointerButton,
    pub modifiers: Modifiers,
}

impl PointerEvent {
    pub fn new(position: Vec2, button: PointerButton, modifiers: Modifiers) -> Self {
        Self {
            position,
            button,
            modifiers,
        }
    }

    pub fn primary(x: f32, y: f32) -> Self {
        Self::new(Vec2::new(x, y), PointerButton::Primary, Modifiers::default())
    }

    pub fn secondary(x: f32, y: f32) -> Self {
        Self::new(Vec2::new(x, y), PointerButton::Secondary, Modifiers::default())
    }

    #[must_use]
    pub fn with_ctrl(mut self) -> Self {
        self.modifiers.ctrl = true;
        self
    }

    #[must_use]
    pub fn with_shift(mut self) -> Self {
        self.modifiers.shift = true;
        self
    }
}

/// The kind of gesture a press was classified into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureMode {
    MeshPress,
    LandmarkPress,
    ShiftSelect,
    ResizeHandle,
    RotateHandle,
    SelectionBoxPress,
    BoundingBoxHandle,
    BoundingBoxCreate,
    NothingPress,
}

/// Everything a gesture reads or writes besides its own session.
pub struct GestureContext<'a> {
    pub model: &'a mut AnnotationModel,
    pub bridge: &'a dyn CoordinateBridge,
    pub config: &'a EditorConfig,
    /// Editing (snap) mode.
    pub editing: bool,
    pub bounding_box_mode: bool,
}

impl GestureContext<'_> {
    /// Enough landmarks are selected for the selection box to appear.
    fn group_mode_active(&self) -> bool {
        self.model.selection().len() >= self.config.min_group_selection
    }

    /// Hover targeting runs only while editing a group with placed
    /// landmarks and no group selection.
    fn snap_permitted(&self) -> bool {
        self.editing && self.model.group().has_non_empty() && !self.group_mode_active()
    }

    /// Handle boxes for the current selection, as drawn.
    pub fn handles(&self) -> HandleGeometry {
        HandleGeometry::compute(&*self.model, self.bridge, self.config, self.bounding_box_mode)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum GestureState {
    #[default]
    Idle,
    Pressed(DragSession),
}

/// Interprets raw pointer input into editing operations.
#[derive(Debug, Clone, Default)]
pub struct GestureMachine {
    state: GestureState,
}

impl GestureMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, GestureState::Idle)
    }

    /// Mode of the live session, if any.
    pub fn mode(&self) -> Option<GestureMode> {
        match &self.state {
            GestureState::Idle => None,
            GestureState::Pressed(session) => Some(session.mode()),
        }
    }

    pub fn pointer_down(&mut self, ctx: &mut GestureContext<'_>, event: PointerEvent) -> Vec<ViewportEvent> {
        let mut events = Vec::new();
        if let GestureState::Pressed(session) = &self.state {
            tracing::debug!("[gesture] press ignored while {:?} is live", session.mode());
            return events;
        }

        let hits = gather_hits(ctx, event.position);
        let flags = PressFlags {
            shift: event.modifiers.shift,
            snap_enabled: ctx.editing,
            has_target: ctx.model.target().is_some(),
            bounding_box_mode: ctx.bounding_box_mode,
            first_landmark_empty: ctx.model.point(0).is_none(),
        };

        let target = match event.button {
            PointerButton::Primary => Some(classify_primary(&hits, &flags)),
            PointerButton::Secondary => {
                let target = classify_secondary(&hits, &flags);
                if target.is_some() {
                    ctx.model.deselect_all();
                    ctx.model.set_target(None);
                }
                target
            }
            PointerButton::Middle => None,
        };

        match target {
            Some(target) => {
                let mesh_hit = hits.mesh.map(|hit| ctx.bridge.world_to_local(hit.point));
                let session = DragSession::press(ctx, target, &event, mesh_hit, &mut events);
                self.state = GestureState::Pressed(session);
            }
            None => tracing::debug!("[gesture] {:?} press matched nothing", event.button),
        }

        ctx.model.drain_events(&mut events);
        events
    }

    pub fn pointer_move(&mut self, ctx: &mut GestureContext<'_>, event: PointerEvent) -> Vec<ViewportEvent> {
        let mut events = Vec::new();
        match &mut self.state {
            GestureState::Pressed(session) => session.drag(ctx, event.position, &mut events),
            GestureState::Idle => hover::hover(ctx, &event, &mut events),
        }
        ctx.model.drain_events(&mut events);
        events
    }

    pub fn pointer_up(&mut self, ctx: &mut GestureContext<'_>, event: PointerEvent) -> Vec<ViewportEvent> {
        let mut events = Vec::new();
        if let GestureState::Pressed(session) = std::mem::take(&mut self.state) {
            session.release(ctx, event.position, &mut events);
        }
        ctx.model.drain_events(&mut events);
        events
    }

    /// Close a live session without recording history, e.g. when the
    /// bound model goes away mid-drag.
    pub fn cancel(&mut self) -> Vec<ViewportEvent> {
        let mut events = Vec::new();
        if let GestureState::Pressed(session) = std::mem::take(&mut self.state) {
            session.cancel(&mut events);
        }
        events
    }

    /// Nudge the selected landmarks by a screen-space vector.
    pub fn budge(&mut self, ctx: &mut GestureContext<'_>, delta: Vec2) -> Vec<ViewportEvent> {
        let mut events = Vec::new();
        if !self.is_idle() {
            tracing::debug!("[gesture] budge ignored during a gesture");
            return events;
        }
        let before = ctx.model.selected_points();
        if before.is_empty() {
            return events;
        }
        drag::translate_selected(ctx, delta);
        let changes = before
            .into_iter()
            .map(|(i, p)| LandmarkChange::new(i, Some(p), ctx.model.point(i)))
            .collect();
        ctx.model.record_history(changes);
        ctx.model.drain_events(&mut events);
        events
    }
}

fn gather_hits(ctx: &GestureContext<'_>, position: Vec2) -> PressHits {
    let landmarks = ctx.model.non_empty_points();
    let landmark = ctx
        .bridge
        .intersect_landmarks(position, &landmarks)
        .into_iter()
        .find_map(|hit| hit.landmark.map(|index| (index, hit.distance)));
    let mesh = ctx.bridge.intersect_mesh(position).into_iter().next();
    let handles = ctx.handles().hit_test(position, ctx.config);
    PressHits {
        landmark,
        mesh,
        handles,
    }
}

#[cfg(test)]
mod tests {
    use bevy::math::Vec3;

    use super::*;
    use crate::bridge::PlaneBridge;
    use crate::history::LandmarkTracker;
    use crate::landmark::LandmarkGroup;

    struct Fixture {
        model: AnnotationModel,
        bridge: PlaneBridge,
        config: EditorConfig,
        machine: GestureMachine,
        editing: bool,
        bounding_box_mode: bool,
    }

    impl Fixture {
        fn new(points: &[Option<(f32, f32)>]) -> Self {
            let points = points
                .iter()
                .map(|p| p.map(|(x, y)| Vec3::new(x, y, 0.0)))
                .collect();
            let group = LandmarkGroup::new(points, vec![], vec![]).unwrap();
            Self {
                model: AnnotationModel::new(group, LandmarkTracker::new()),
                bridge: PlaneBridge::new(200.0, 200.0),
                config: EditorConfig::default(),
                machine: GestureMachine::new(),
                editing: true,
                bounding_box_mode: false,
            }
        }

        fn run(
            &mut self,
            f: impl FnOnce(&mut GestureMachine, &mut GestureContext<'_>) -> Vec<ViewportEvent>,
        ) -> Vec<ViewportEvent> {
            let mut ctx = GestureContext {
                model: &mut self.model,
                bridge: &self.bridge,
                config: &self.config,
                editing: self.editing,
                bounding_box_mode: self.bounding_box_mode,
            };
            f(&mut self.machine, &mut ctx)
        }

        fn down(&mut self, event: PointerEvent) -> Vec<ViewportEvent> {
            self.run(|m, ctx| m.pointer_down(ctx, event))
        }

        fn drag_to(&mut self, x: f32, y: f32) -> Vec<ViewportEvent> {
            self.run(|m, ctx| m.pointer_move(ctx, PointerEvent::primary(x, y)))
        }

        fn up(&mut self, x: f32, y: f32) -> Vec<ViewportEvent> {
            self.run(|m, ctx| m.pointer_up(ctx, PointerEvent::primary(x, y)))
        }

        fn click(&mut self, event: PointerEvent) {
            self.down(event);
            self.up(event.position.x, event.position.y);
        }

        fn point(&self, index: usize) -> Vec2 {
            self.model.point(index).unwrap().truncate()
        }
    }

    fn count(events: &[ViewportEvent], wanted: &ViewportEvent) -> usize {
        events.iter().filter(|e| *e == wanted).count()
    }

    fn close(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-3
    }

    #[test]
    fn test_click_and_ctrl_click_selection() {
        let mut fx = Fixture::new(&[Some((10.0, 10.0)), Some((50.0, 50.0)), Some((150.0, 150.0))]);

        fx.click(PointerEvent::primary(10.0, 10.0));
        assert_eq!(fx.model.selection().selected(), vec![0]);
        assert_eq!(fx.model.target(), None);

        fx.click(PointerEvent::primary(50.0, 50.0).with_ctrl());
        assert_eq!(fx.model.selection().selected(), vec![0, 1]);

        fx.click(PointerEvent::primary(10.0, 10.0).with_ctrl());
        assert_eq!(fx.model.selection().selected(), vec![1]);
        assert!(!fx.model.tracker().can_undo());
    }

    #[test]
    fn test_bounding_box_creation_places_corners() {
        let mut fx = Fixture::new(&[None, None, None, None]);
        fx.bounding_box_mode = true;

        let mut events = fx.down(PointerEvent::secondary(10.0, 10.0));
        assert_eq!(fx.machine.mode(), Some(GestureMode::BoundingBoxCreate));
        events.extend(fx.drag_to(60.0, 30.0));
        assert!(fx.model.point(0).is_none());
        events.extend(fx.up(110.0, 60.0));

        assert_eq!(fx.point(0), Vec2::new(10.0, 10.0));
        assert_eq!(fx.point(1), Vec2::new(110.0, 10.0));
        assert_eq!(fx.point(2), Vec2::new(10.0, 60.0));
        assert_eq!(fx.point(3), Vec2::new(110.0, 60.0));

        let entry = fx.model.tracker().last().unwrap();
        assert_eq!(fx.model.tracker().undo_len(), 1);
        assert_eq!(entry.indices(), vec![0, 1, 2, 3]);
        assert!(entry.changes.iter().all(|c| c.before.is_none()));

        assert!(events.iter().any(|e| matches!(e, ViewportEvent::BoundingBoxPreview(_))));
        assert_eq!(count(&events, &ViewportEvent::CameraLocked), 1);
        assert_eq!(count(&events, &ViewportEvent::CameraUnlocked), 1);
    }

    #[test]
    fn test_zero_movement_records_nothing() {
        let mut fx = Fixture::new(&[Some((20.0, 20.0)), Some((80.0, 60.0))]);
        fx.model.select_landmarks(&[0, 1]);

        let mut events = fx.down(PointerEvent::primary(50.0, 40.0));
        assert_eq!(fx.machine.mode(), Some(GestureMode::SelectionBoxPress));
        events.extend(fx.up(50.0, 40.0));

        assert!(!fx.model.tracker().can_undo());
        assert!(fx.machine.is_idle());
        assert_eq!(count(&events, &ViewportEvent::CameraLocked), 1);
        assert_eq!(count(&events, &ViewportEvent::CameraUnlocked), 1);
        assert_eq!(count(&events, &ViewportEvent::PointerCaptured), 1);
        assert_eq!(count(&events, &ViewportEvent::PointerReleased), 1);
    }

    #[test]
    fn test_resize_keeps_fixed_corner() {
        let mut fx = Fixture::new(&[Some((20.0, 20.0)), Some((80.0, 60.0)), Some((50.0, 40.0))]);
        fx.model.select_landmarks(&[0, 1, 2]);

        fx.down(PointerEvent::primary(10.0, 10.0));
        assert_eq!(fx.machine.mode(), Some(GestureMode::ResizeHandle));
        fx.drag_to(0.0, -10.0);
        fx.up(0.0, -10.0);

        assert_eq!(fx.point(1), Vec2::new(80.0, 60.0));
        assert!(close(fx.point(0), Vec2::new(10.0, 0.0)));
        assert!(close(fx.point(2), Vec2::new(45.0, 30.0)));
        assert_eq!(fx.model.tracker().undo_len(), 1);
        assert_eq!(fx.model.tracker().last().unwrap().indices(), vec![0, 2]);
    }

    #[test]
    fn test_rotation_and_back_returns_to_start() {
        let start = [Vec2::new(40.0, 40.0), Vec2::new(60.0, 40.0), Vec2::new(50.0, 60.0)];
        let mut fx = Fixture::new(&start.map(|p| Some((p.x, p.y))));
        fx.model.select_landmarks(&[0, 1, 2]);

        // Rotation grip sits 3 handle radii above the padded box.
        let events = fx.down(PointerEvent::primary(50.0, 18.0));
        assert_eq!(fx.machine.mode(), Some(GestureMode::RotateHandle));
        assert!(events.iter().any(|e| matches!(e, ViewportEvent::RotationCircleShown { .. })));

        fx.drag_to(82.0, 50.0);
        assert!(close(fx.point(0), Vec2::new(60.0, 40.0)));
        assert!(close(fx.point(1), Vec2::new(60.0, 60.0)));
        assert!(close(fx.point(2), Vec2::new(40.0, 50.0)));

        fx.drag_to(18.0, 50.0);
        fx.drag_to(50.0, 18.0);
        for (i, p) in start.iter().enumerate() {
            assert!(close(fx.point(i), *p));
        }

        let events = fx.up(50.0, 18.0);
        assert!(events.contains(&ViewportEvent::RotationCircleHidden));
        assert!(!fx.model.tracker().can_undo());
    }

    #[test]
    fn test_landmark_drag_is_one_history_entry() {
        let mut fx = Fixture::new(&[Some((20.0, 20.0)), Some((100.0, 100.0))]);

        fx.down(PointerEvent::primary(21.0, 20.0));
        assert_eq!(fx.machine.mode(), Some(GestureMode::LandmarkPress));
        fx.drag_to(30.0, 25.0);
        assert_eq!(fx.point(0), Vec2::new(30.0, 25.0));
        fx.drag_to(40.0, 30.0);
        fx.up(40.0, 30.0);

        assert_eq!(fx.point(0), Vec2::new(40.0, 30.0));
        assert_eq!(fx.model.tracker().undo_len(), 1);
        let change = fx.model.tracker().last().unwrap().changes[0];
        assert_eq!(change.before, Some(Vec3::new(20.0, 20.0, 0.0)));
        assert_eq!(fx.model.selection().selected(), vec![0]);
    }

    #[test]
    fn test_drag_off_surface_keeps_last_position() {
        let mut fx = Fixture::new(&[Some((20.0, 20.0))]);

        fx.down(PointerEvent::primary(20.0, 20.0));
        fx.drag_to(30.0, 30.0);
        fx.drag_to(-50.0, 30.0);
        assert_eq!(fx.point(0), Vec2::new(30.0, 30.0));
        fx.up(-50.0, 30.0);
        assert_eq!(fx.model.tracker().undo_len(), 1);
    }

    #[test]
    fn test_right_click_inserts_landmark() {
        let mut fx = Fixture::new(&[None, None]);

        fx.down(PointerEvent::secondary(5.0, 7.0));
        assert_eq!(fx.machine.mode(), Some(GestureMode::MeshPress));
        fx.up(5.0, 7.0);

        assert_eq!(fx.point(0), Vec2::new(5.0, 7.0));
        assert_eq!(fx.model.selection().selected(), vec![0]);
        assert_eq!(fx.model.tracker().undo_len(), 1);
    }

    #[test]
    fn test_right_click_off_mesh_stays_idle() {
        let mut fx = Fixture::new(&[None]);
        let events = fx.down(PointerEvent::secondary(-5.0, 7.0));
        assert!(fx.machine.is_idle());
        assert!(events.is_empty());
    }

    #[test]
    fn test_hover_targets_and_mesh_click_snaps() {
        let mut fx = Fixture::new(&[Some((10.0, 10.0)), Some((100.0, 100.0))]);

        let events = fx.drag_to(12.0, 12.0);
        assert_eq!(fx.model.target(), Some(0));
        assert_eq!(fx.model.selection().selected(), vec![0]);
        assert!(events.contains(&ViewportEvent::TargetingLines {
            screen: Vec2::new(12.0, 12.0),
            pointer: Vec3::new(12.0, 12.0, 0.0),
            target: 0,
            next_closest: vec![1],
        }));

        // Ctrl locks the target even near another landmark.
        fx.run(|m, ctx| m.pointer_move(ctx, PointerEvent::primary(98.0, 98.0).with_ctrl()));
        assert_eq!(fx.model.target(), Some(0));

        fx.click(PointerEvent::primary(50.0, 50.0));
        assert_eq!(fx.point(0), Vec2::new(50.0, 50.0));
        assert_eq!(fx.model.tracker().undo_len(), 1);
    }

    #[test]
    fn test_ctrl_hover_keeps_target_out_of_guides() {
        let mut fx = Fixture::new(&[
            Some((10.0, 10.0)),
            Some((30.0, 10.0)),
            Some((50.0, 10.0)),
            Some((70.0, 10.0)),
            Some((90.0, 10.0)),
        ]);
        fx.drag_to(11.0, 10.0);
        assert_eq!(fx.model.target(), Some(0));

        let events = fx.run(|m, ctx| m.pointer_move(ctx, PointerEvent::primary(88.0, 10.0).with_ctrl()));
        assert_eq!(fx.model.target(), Some(0));
        let Some(ViewportEvent::TargetingLines {
            target, next_closest, ..
        }) = events.iter().find(|e| matches!(e, ViewportEvent::TargetingLines { .. }))
        else {
            panic!("no targeting lines in {events:?}");
        };
        assert_eq!(*target, 0);
        assert_eq!(next_closest, &vec![4, 3, 2]);
    }

    #[test]
    fn test_still_click_on_selected_landmark_resnaps_it() {
        let mut fx = Fixture::new(&[Some((20.0, 20.0)), Some((100.0, 100.0))]);
        fx.model.select_landmarks(&[0]);

        fx.down(PointerEvent::primary(21.0, 20.0));
        assert_eq!(fx.machine.mode(), Some(GestureMode::LandmarkPress));
        fx.up(21.0, 20.0);

        assert_eq!(fx.point(0), Vec2::new(21.0, 20.0));
        assert_eq!(fx.model.selection().selected(), vec![0]);
        assert_eq!(fx.model.tracker().undo_len(), 1);
        let change = fx.model.tracker().last().unwrap().changes[0];
        assert_eq!(change.before, Some(Vec3::new(20.0, 20.0, 0.0)));
    }

    #[test]
    fn test_landmark_click_needs_zero_movement() {
        let mut fx = Fixture::new(&[Some((20.0, 20.0)), Some((100.0, 100.0))]);
        fx.model.select_landmarks(&[0]);

        // One pixel off is not a click: no re-snap, no deselect.
        fx.down(PointerEvent::primary(21.0, 20.0));
        fx.up(22.0, 20.0);
        assert_eq!(fx.point(0), Vec2::new(20.0, 20.0));
        assert!(!fx.model.tracker().can_undo());

        fx.down(PointerEvent::primary(21.0, 20.0).with_ctrl());
        fx.up(22.0, 20.0);
        assert_eq!(fx.model.selection().selected(), vec![0]);

        fx.down(PointerEvent::primary(21.0, 20.0).with_ctrl());
        fx.up(21.0, 20.0);
        assert!(fx.model.selection().is_empty());
    }

    #[test]
    fn test_mesh_and_nothing_clicks_allow_tolerance() {
        let mut fx = Fixture::new(&[Some((20.0, 20.0)), Some((100.0, 100.0))]);
        fx.model.set_target(Some(0));

        fx.down(PointerEvent::primary(50.0, 50.0));
        assert_eq!(fx.machine.mode(), Some(GestureMode::MeshPress));
        fx.up(51.0, 50.0);
        assert_eq!(fx.point(0), Vec2::new(50.0, 50.0));
        assert_eq!(fx.model.tracker().undo_len(), 1);

        fx.model.set_target(None);
        fx.model.select_landmarks(&[1]);
        fx.down(PointerEvent::primary(150.0, 20.0));
        assert_eq!(fx.machine.mode(), Some(GestureMode::NothingPress));
        fx.up(150.0, 21.0);
        assert!(fx.model.selection().is_empty());
    }

    #[test]
    fn test_hover_is_off_when_editing_disabled() {
        let mut fx = Fixture::new(&[Some((10.0, 10.0))]);
        fx.editing = false;
        assert!(fx.drag_to(12.0, 12.0).is_empty());
        assert_eq!(fx.model.target(), None);
    }

    #[test]
    fn test_click_on_nothing_deselects() {
        let mut fx = Fixture::new(&[Some((10.0, 10.0)), Some((100.0, 100.0))]);
        fx.model.select_landmarks(&[0]);

        fx.down(PointerEvent::primary(150.0, 20.0));
        assert_eq!(fx.machine.mode(), Some(GestureMode::NothingPress));
        fx.up(151.0, 20.0);
        assert!(fx.model.selection().is_empty());
    }

    #[test]
    fn test_shift_drag_selects_inside_rect() {
        let mut fx = Fixture::new(&[Some((10.0, 10.0)), Some((30.0, 30.0)), Some((100.0, 100.0))]);
        fx.model.select_landmarks(&[2]);

        fx.down(PointerEvent::primary(0.0, 0.0).with_shift());
        assert_eq!(fx.machine.mode(), Some(GestureMode::ShiftSelect));
        let events = fx.drag_to(50.0, 50.0);
        assert!(events.iter().any(|e| matches!(e, ViewportEvent::SelectionRect(_))));
        fx.up(50.0, 50.0);

        assert_eq!(fx.model.selection().selected(), vec![0, 1]);
    }

    #[test]
    fn test_bounding_box_handle_moves_three_corners() {
        let mut fx = Fixture::new(&[
            Some((10.0, 10.0)),
            Some((110.0, 10.0)),
            Some((10.0, 60.0)),
            Some((110.0, 60.0)),
        ]);
        fx.bounding_box_mode = true;

        fx.down(PointerEvent::primary(110.0, 60.0));
        assert_eq!(fx.machine.mode(), Some(GestureMode::BoundingBoxHandle));
        fx.drag_to(130.0, 80.0);
        fx.up(130.0, 80.0);

        assert_eq!(fx.point(0), Vec2::new(10.0, 10.0));
        assert_eq!(fx.point(1), Vec2::new(130.0, 10.0));
        assert_eq!(fx.point(2), Vec2::new(10.0, 80.0));
        assert_eq!(fx.point(3), Vec2::new(130.0, 80.0));
        assert_eq!(fx.model.tracker().last().unwrap().indices(), vec![1, 2, 3]);
    }

    #[test]
    fn test_second_press_is_ignored_while_captured() {
        let mut fx = Fixture::new(&[Some((20.0, 20.0))]);
        fx.down(PointerEvent::primary(20.0, 20.0));
        assert!(fx.down(PointerEvent::secondary(50.0, 50.0)).is_empty());
        assert_eq!(fx.machine.mode(), Some(GestureMode::LandmarkPress));

        let events = fx.run(|m, _| m.cancel());
        assert!(events.contains(&ViewportEvent::CameraUnlocked));
        assert!(fx.machine.is_idle());
    }

    #[test]
    fn test_budge_moves_selection() {
        let mut fx = Fixture::new(&[Some((20.0, 20.0)), Some((40.0, 20.0))]);
        fx.model.select_landmarks(&[1]);

        fx.run(|m, ctx| m.budge(ctx, Vec2::new(0.0, -1.0)));
        assert_eq!(fx.point(0), Vec2::new(20.0, 20.0));
        assert_eq!(fx.point(1), Vec2::new(40.0, 19.0));
        assert_eq!(fx.model.tracker().undo_len(), 1);
    }
}
