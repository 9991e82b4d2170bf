//! Session systems.
//!
//! Feed queued input into the annotation session and mirror its state
//! into the shared stores.

use bevy::prelude::*;

use crate::bevy::{BridgeRes, EditorInput, EditorSessionRes, EditorStateStore, EditorSummary, InputQueue, ViewportMessage};
use crate::events::ViewportEvent;

/// System to process all pending editor input, in order.
pub fn process_input_queue(
    queue: Res<InputQueue>,
    bridge: Res<BridgeRes>,
    mut session: ResMut<EditorSessionRes>,
    mut messages: MessageWriter<ViewportMessage>,
) {
    let inputs = queue.drain();
    if inputs.is_empty() {
        return;
    }

    let session = &mut session.0;
    let bridge = bridge.0.as_ref();
    for input in inputs {
        let events = match input {
            EditorInput::PointerDown(event) => session.pointer_down(bridge, event),
            EditorInput::PointerMove(event) => session.pointer_move(bridge, event),
            EditorInput::PointerUp(event) => session.pointer_up(bridge, event),
            EditorInput::Command(command) => match session.apply_command(bridge, &command) {
                Ok(events) => events,
                Err(e) => {
                    tracing::warn!("[session] {command:?} failed: {e}");
                    Vec::new()
                }
            },
            EditorInput::AssetReady { asset_id, group } => session.asset_ready(&asset_id, group),
            EditorInput::EvictAsset { asset_id } => {
                session.evict_asset(&asset_id);
                Vec::new()
            }
        };
        for event in events {
            messages.write(ViewportMessage(event));
        }
    }
}

/// System to sync session state to the state stores.
///
/// Must run after `process_input_queue` to see this frame's messages.
pub fn sync_state_store(
    session: Res<EditorSessionRes>,
    stores: Res<EditorStateStore>,
    mut messages: MessageReader<ViewportMessage>,
) {
    let mut landmarks_changed = false;
    for ViewportMessage(event) in messages.read() {
        match event {
            ViewportEvent::Notification(notification) => stores.notifications.push(notification.clone()),
            ViewportEvent::LandmarksChanged(_) | ViewportEvent::AssetRequested { .. } | ViewportEvent::AssetBound { .. } => {
                landmarks_changed = true;
            }
            _ => {}
        }
    }

    if !session.is_changed() {
        return;
    }
    let session = &session.0;
    stores.editor.update(EditorSummary::from_session(session));
    if landmarks_changed {
        stores
            .landmarks
            .set_landmarks(session.model().map(|model| model.group().to_json()));
    }
}
