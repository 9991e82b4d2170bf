//! Press, drag and release for each gesture mode.
//!
//! Positions written mid-drag never touch history. The release step
//! compares the press snapshot with the final positions and records at
//! most one entry.

use bevy::math::{Vec2, Vec3};

use crate::events::ViewportEvent;
use crate::geometry::{
    Corner, ScreenRect, angle_from_up, remap_point, resize_rect, rotate_about, sort_by_position,
};
use crate::history::LandmarkChange;

use super::classify::PressTarget;
use super::{GestureContext, GestureMode, Modifiers, PointerButton, PointerEvent};

/// Number of landmarks that make up a bounding box.
const BOUNDING_BOX_LANDMARKS: usize = 4;

#[derive(Debug, Clone, PartialEq)]
enum DragKind {
    Mesh {
        hit: Option<Vec3>,
    },
    Landmark {
        index: usize,
        was_selected: bool,
        hit: Option<Vec3>,
        drag_position: Vec2,
    },
    ShiftSelect,
    Resize {
        corner: Corner,
    },
    Rotate {
        center: Vec2,
        start_angle: f32,
        start_screen: Vec<(usize, Vec2)>,
    },
    SelectionBox {
        drag_position: Vec2,
    },
    BoundingBoxHandle {
        corner: Corner,
    },
    BoundingBoxCreate,
    Nothing,
}

/// Transient state of one press-to-release gesture.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    kind: DragKind,
    button: PointerButton,
    modifiers: Modifiers,
    press_position: Vec2,
    /// Positions of the affected landmarks at press time.
    snapshot: Vec<(usize, Option<Vec3>)>,
    camera_locked: bool,
}

impl DragSession {
    pub fn mode(&self) -> GestureMode {
        match self.kind {
            DragKind::Mesh { .. } => GestureMode::MeshPress,
            DragKind::Landmark { .. } => GestureMode::LandmarkPress,
            DragKind::ShiftSelect => GestureMode::ShiftSelect,
            DragKind::Resize { .. } => GestureMode::ResizeHandle,
            DragKind::Rotate { .. } => GestureMode::RotateHandle,
            DragKind::SelectionBox { .. } => GestureMode::SelectionBoxPress,
            DragKind::BoundingBoxHandle { .. } => GestureMode::BoundingBoxHandle,
            DragKind::BoundingBoxCreate => GestureMode::BoundingBoxCreate,
            DragKind::Nothing => GestureMode::NothingPress,
        }
    }

    // ========================================================================
    // Press
    // ========================================================================

    /// Start the gesture for `target`. `mesh_hit` is the press-time mesh
    /// point in model space.
    pub(super) fn press(
        ctx: &mut GestureContext<'_>,
        target: PressTarget,
        event: &PointerEvent,
        mesh_hit: Option<Vec3>,
        events: &mut Vec<ViewportEvent>,
    ) -> Self {
        let target = match target {
            PressTarget::Mesh if ctx.group_mode_active() => PressTarget::Nothing,
            PressTarget::Mesh if event.button == PointerButton::Primary && event.modifiers.shift => {
                PressTarget::ShiftSelect
            }
            other => other,
        };
        let ctrl = event.modifiers.ctrl;

        let kind = match target {
            PressTarget::Mesh => DragKind::Mesh { hit: mesh_hit },
            PressTarget::Nothing => DragKind::Nothing,
            PressTarget::Landmark(index) => {
                let was_selected = ctx.model.is_selected(index);
                if !was_selected && !ctrl {
                    ctx.model.select_and_deselect_rest(index);
                } else if !was_selected {
                    ctx.model.select_landmarks(&[index]);
                }
                // Dragging starts from the symbol centre, so the first tick
                // snaps the landmark under the pointer.
                let drag_position = ctx
                    .model
                    .point(index)
                    .map_or(event.position, |p| ctx.bridge.local_to_screen(p));
                DragKind::Landmark {
                    index,
                    was_selected,
                    hit: mesh_hit,
                    drag_position,
                }
            }
            PressTarget::ShiftSelect => {
                if !ctrl {
                    ctx.model.deselect_all();
                }
                DragKind::ShiftSelect
            }
            PressTarget::ResizeHandle(corner) => DragKind::Resize { corner },
            PressTarget::SelectionBox => DragKind::SelectionBox {
                drag_position: event.position,
            },
            PressTarget::RotateHandle => {
                let start_screen: Vec<(usize, Vec2)> = ctx
                    .model
                    .selected_points()
                    .into_iter()
                    .map(|(i, p)| (i, ctx.bridge.local_to_screen(p)))
                    .collect();
                let center = ScreenRect::bounding(start_screen.iter().map(|&(_, s)| s))
                    .map_or(event.position, |rect| rect.center());
                let start_angle = angle_from_up(center, event.position).unwrap_or(0.0);
                events.push(ViewportEvent::OverlayCleared);
                events.push(ViewportEvent::RotationCircleShown {
                    center,
                    radius: center.distance(event.position),
                });
                DragKind::Rotate {
                    center,
                    start_angle,
                    start_screen,
                }
            }
            PressTarget::BoundingBoxHandle(corner) => DragKind::BoundingBoxHandle { corner },
            PressTarget::BoundingBoxCreate => DragKind::BoundingBoxCreate,
        };

        let snapshot = match kind {
            DragKind::BoundingBoxHandle { .. } | DragKind::BoundingBoxCreate => {
                let count = BOUNDING_BOX_LANDMARKS.min(ctx.model.len());
                (0..count).map(|i| (i, ctx.model.point(i))).collect()
            }
            DragKind::Mesh { .. } | DragKind::Nothing | DragKind::ShiftSelect => Vec::new(),
            _ => ctx
                .model
                .selected_points()
                .into_iter()
                .map(|(i, p)| (i, Some(p)))
                .collect(),
        };

        let camera_locked = !matches!(kind, DragKind::Mesh { .. } | DragKind::Nothing);
        if camera_locked {
            events.push(ViewportEvent::CameraLocked);
        }
        events.push(ViewportEvent::PointerCaptured);

        let session = Self {
            kind,
            button: event.button,
            modifiers: event.modifiers,
            press_position: event.position,
            snapshot,
            camera_locked,
        };
        tracing::debug!(
            "[gesture] press {:?} at ({}, {})",
            session.mode(),
            event.position.x,
            event.position.y
        );
        session
    }

    // ========================================================================
    // Drag
    // ========================================================================

    pub(super) fn drag(&mut self, ctx: &mut GestureContext<'_>, position: Vec2, events: &mut Vec<ViewportEvent>) {
        tracing::trace!("[gesture] drag {:?} to ({}, {})", self.mode(), position.x, position.y);
        match &mut self.kind {
            DragKind::Mesh { .. } | DragKind::Nothing => {}
            DragKind::Landmark { drag_position, .. } | DragKind::SelectionBox { drag_position } => {
                let delta = position - *drag_position;
                *drag_position = position;
                translate_selected(ctx, delta);
            }
            DragKind::ShiftSelect => {
                events.push(ViewportEvent::SelectionRect(ScreenRect::from_corners(
                    self.press_position,
                    position,
                )));
            }
            DragKind::Resize { corner } => resize_selected(ctx, *corner, position),
            DragKind::Rotate {
                center,
                start_angle,
                start_screen,
            } => {
                let Some(angle) = angle_from_up(*center, position) else {
                    return;
                };
                let theta = angle - *start_angle;
                for &(index, start) in start_screen.iter() {
                    move_to_screen(ctx, index, rotate_about(start, *center, theta));
                }
            }
            DragKind::BoundingBoxHandle { corner } => drag_bounding_box_corner(ctx, *corner, position),
            DragKind::BoundingBoxCreate => {
                events.push(ViewportEvent::BoundingBoxPreview(ScreenRect::from_corners(
                    self.press_position,
                    position,
                )));
            }
        }
    }

    // ========================================================================
    // Release
    // ========================================================================

    pub(super) fn release(self, ctx: &mut GestureContext<'_>, position: Vec2, events: &mut Vec<ViewportEvent>) {
        let distance = self.press_position.distance(position);
        let is_click = distance < ctx.config.click_tolerance;
        let ctrl = self.modifiers.ctrl;
        let mode = self.mode();

        match &self.kind {
            DragKind::Mesh { hit } => {
                if is_click && let Some(point) = *hit {
                    let target = ctx.model.target().filter(|&t| ctx.model.point(t).is_some());
                    match target {
                        Some(target) if ctx.editing => ctx.model.set_landmark_point(target, point),
                        _ if self.button == PointerButton::Secondary => {
                            ctx.model.insert_new_landmark(point);
                        }
                        _ => {}
                    }
                }
                events.push(ViewportEvent::OverlayCleared);
            }
            DragKind::Nothing => {
                if is_click {
                    ctx.model.deselect_all();
                }
                events.push(ViewportEvent::OverlayCleared);
            }
            DragKind::Landmark {
                index,
                was_selected,
                hit,
                ..
            } => {
                self.record_snapshot(ctx);
                // Landmark clicks use exact zero movement, not the click tolerance.
                if distance == 0.0 {
                    if *was_selected && ctrl {
                        ctx.model.deselect_landmarks(&[*index]);
                    } else if !*was_selected && !ctrl {
                        ctx.model.select_and_deselect_rest(*index);
                    } else if *was_selected && let Some(point) = *hit {
                        ctx.model.set_landmark_point(*index, point);
                    }
                }
            }
            DragKind::ShiftSelect => {
                let rect = ScreenRect::from_corners(self.press_position, position);
                let inside: Vec<usize> = ctx
                    .model
                    .non_empty_points()
                    .into_iter()
                    .filter(|&(i, p)| rect.contains(ctx.bridge.local_to_screen(p)) && ctx.bridge.is_landmark_visible(i))
                    .map(|(i, _)| i)
                    .collect();
                ctx.model.select_landmarks(&inside);
                events.push(ViewportEvent::OverlayCleared);
            }
            DragKind::Resize { .. } | DragKind::SelectionBox { .. } | DragKind::BoundingBoxHandle { .. } => {
                self.record_snapshot(ctx);
            }
            DragKind::Rotate { .. } => {
                self.record_snapshot(ctx);
                events.push(ViewportEvent::RotationCircleHidden);
            }
            DragKind::BoundingBoxCreate => {
                let rect = ScreenRect::from_corners(self.press_position, position);
                for (index, corner) in Corner::ALL.into_iter().enumerate() {
                    move_to_screen(ctx, index, rect.corner(corner));
                }
                self.record_snapshot(ctx);
                events.push(ViewportEvent::OverlayCleared);
            }
        }

        if self.camera_locked {
            events.push(ViewportEvent::CameraUnlocked);
        }
        events.push(ViewportEvent::PointerReleased);
        tracing::debug!("[gesture] release {mode:?} after {distance:.1}px");
    }

    /// End the gesture without recording anything.
    pub(super) fn cancel(self, events: &mut Vec<ViewportEvent>) {
        tracing::debug!("[gesture] cancel {:?}", self.mode());
        events.push(ViewportEvent::OverlayCleared);
        if matches!(self.kind, DragKind::Rotate { .. }) {
            events.push(ViewportEvent::RotationCircleHidden);
        }
        if self.camera_locked {
            events.push(ViewportEvent::CameraUnlocked);
        }
        events.push(ViewportEvent::PointerReleased);
    }

    /// One history entry for every snapshot landmark that moved.
    fn record_snapshot(&self, ctx: &mut GestureContext<'_>) {
        let changes: Vec<LandmarkChange> = self
            .snapshot
            .iter()
            .map(|&(index, before)| LandmarkChange::new(index, before, ctx.model.point(index)))
            .filter(|change| !change.is_noop())
            .collect();
        if changes.is_empty() {
            return;
        }
        tracing::debug!("[gesture] {:?} moved {} landmark(s)", self.mode(), changes.len());
        ctx.model.record_history(changes);
    }
}

// ============================================================================
// Geometry helpers
// ============================================================================

/// Re-project a landmark onto the surface under `screen`.
///
/// Returns `false` and leaves the landmark alone when `screen` misses.
pub(super) fn move_to_screen(ctx: &mut GestureContext<'_>, index: usize, screen: Vec2) -> bool {
    if let Some(point) = ctx.bridge.mesh_point(screen) {
        ctx.model.set_landmark_point_without_history(index, point);
        true
    } else {
        tracing::trace!("[gesture] landmark {index} would leave the surface at ({}, {})", screen.x, screen.y);
        false
    }
}

/// Shift every selected landmark by a screen-space delta.
pub(super) fn translate_selected(ctx: &mut GestureContext<'_>, delta: Vec2) {
    for (index, point) in ctx.model.selected_points() {
        let screen = ctx.bridge.local_to_screen(point) + delta;
        move_to_screen(ctx, index, screen);
    }
}

fn resize_selected(ctx: &mut GestureContext<'_>, corner: Corner, pointer: Vec2) {
    let screen: Vec<(usize, Vec2)> = ctx
        .model
        .selected_points()
        .into_iter()
        .map(|(i, p)| (i, ctx.bridge.local_to_screen(p)))
        .collect();
    let Some(old) = ScreenRect::bounding(screen.iter().map(|&(_, s)| s)) else {
        return;
    };
    let new = resize_rect(old, corner, pointer, ctx.config.selection_padding);
    for (index, s) in screen {
        move_to_screen(ctx, index, remap_point(s, old, new));
    }
}

/// Move the grabbed corner to the pointer; the two adjacent corners follow
/// on one axis each and the diagonal corner stays put.
fn drag_bounding_box_corner(ctx: &mut GestureContext<'_>, corner: Corner, pointer: Vec2) {
    let Some(points) = ctx.model.bounding_box_points() else {
        return;
    };
    let screen = points.map(|(_, p)| ctx.bridge.local_to_screen(p));
    let [tl, tr, bl, br] = sort_by_position(screen);

    let (grabbed, horizontal, vertical) = match corner {
        Corner::TopLeft => (tl, tr, bl),
        Corner::TopRight => (tr, tl, br),
        Corner::BottomLeft => (bl, br, tl),
        Corner::BottomRight => (br, bl, tr),
    };
    move_to_screen(ctx, grabbed, pointer);
    // Shares the grabbed corner's row: takes its Y.
    move_to_screen(ctx, horizontal, Vec2::new(screen[horizontal].x, pointer.y));
    // Shares the grabbed corner's column: takes its X.
    move_to_screen(ctx, vertical, Vec2::new(pointer.x, screen[vertical].y));
}
