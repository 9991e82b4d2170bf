//! Idle pointer movement: choosing the snap target.

use crate::bridge::find_closest_landmarks;
use crate::events::ViewportEvent;

use super::{GestureContext, PointerEvent};

/// Retarget on an idle pointer move.
///
/// Holding ctrl with a target already set locks it; only the guide lines
/// to the next closest landmarks follow the pointer.
pub(super) fn hover(ctx: &mut GestureContext<'_>, event: &PointerEvent, events: &mut Vec<ViewportEvent>) {
    if !ctx.snap_permitted() {
        return;
    }

    // A deleted or undone target is dropped before anything else.
    let current = ctx.model.target();
    ctx.model.set_target(current);
    let current = ctx.model.target();

    let Some(pointer) = ctx.bridge.mesh_point(event.position) else {
        return;
    };

    let candidates = ctx.model.non_empty_points();
    let n = ctx.config.closest_landmarks;
    let (target, next_closest) = match current {
        Some(locked) if event.modifiers.ctrl => {
            let others: Vec<_> = candidates.into_iter().filter(|&(i, _)| i != locked).collect();
            (locked, find_closest_landmarks(&others, pointer, n.saturating_sub(1)))
        }
        _ => {
            let mut closest = find_closest_landmarks(&candidates, pointer, n.max(1));
            if closest.is_empty() {
                return;
            }
            let target = closest.remove(0);
            (target, closest)
        }
    };

    events.push(ViewportEvent::TargetingLines {
        screen: event.position,
        pointer,
        target,
        next_closest,
    });

    if current != Some(target) {
        tracing::debug!("[gesture] snap target {current:?} -> {target}");
        ctx.model.select_and_deselect_rest(target);
        ctx.model.set_target(Some(target));
    }
}
