//! Input collection systems.
//!
//! Both systems only translate raw Bevy input into [`EditorInput`]s; the
//! session itself runs in `process_input_queue`.

use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::bevy::{CursorState, EditorSessionRes, EditorInput, InputQueue};
use crate::gesture::{Modifiers, PointerButton, PointerEvent};
use crate::session::EditorCommand;

const BUTTONS: [(MouseButton, PointerButton); 3] = [
    (MouseButton::Left, PointerButton::Primary),
    (MouseButton::Right, PointerButton::Secondary),
    (MouseButton::Middle, PointerButton::Middle),
];

/// Modifier keys currently held. Super counts as ctrl.
pub fn current_modifiers(keyboard: &ButtonInput<KeyCode>) -> Modifiers {
    Modifiers {
        shift: keyboard.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]),
        ctrl: keyboard.any_pressed([
            KeyCode::ControlLeft,
            KeyCode::ControlRight,
            KeyCode::SuperLeft,
            KeyCode::SuperRight,
        ]),
    }
}

/// Pointer inputs for one frame: a move if the cursor moved, then presses,
/// then releases.
///
/// With the cursor outside the window no move is produced, but presses and
/// releases still go out at the last known position so a drag released
/// outside the window ends.
pub fn pointer_inputs(
    cursor_position: Option<Vec2>,
    cursor: &mut CursorState,
    mouse_button: &ButtonInput<MouseButton>,
    modifiers: Modifiers,
) -> Vec<EditorInput> {
    let mut inputs = Vec::new();
    if let Some(position) = cursor_position
        && cursor.position != Some(position)
    {
        cursor.position = Some(position);
        inputs.push(EditorInput::PointerMove(PointerEvent::new(
            position,
            PointerButton::Primary,
            modifiers,
        )));
    }

    let Some(position) = cursor_position.or(cursor.position) else {
        return inputs;
    };
    for (mouse, button) in BUTTONS {
        if mouse_button.just_pressed(mouse) {
            inputs.push(EditorInput::PointerDown(PointerEvent::new(position, button, modifiers)));
        }
    }
    for (mouse, button) in BUTTONS {
        if mouse_button.just_released(mouse) {
            inputs.push(EditorInput::PointerUp(PointerEvent::new(position, button, modifiers)));
        }
    }
    inputs
}

/// System to turn primary window mouse input into pointer inputs.
///
/// Window coordinates are already top-left origin with Y down.
pub fn collect_pointer_input(
    windows: Query<&Window, With<PrimaryWindow>>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    keyboard: Res<ButtonInput<KeyCode>>,
    mut cursor: ResMut<CursorState>,
    queue: Res<InputQueue>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let modifiers = current_modifiers(&keyboard);
    for input in pointer_inputs(window.cursor_position(), &mut cursor, &mouse_button, modifiers) {
        queue.push(input);
    }
}

/// Editor commands for the keys pressed this frame.
pub fn shortcut_commands(keyboard: &ButtonInput<KeyCode>, budge_step: f32) -> Vec<EditorCommand> {
    let modifiers = current_modifiers(keyboard);
    let mut commands = Vec::new();

    for key in keyboard.get_just_pressed() {
        let command = match (*key, modifiers.ctrl) {
            (KeyCode::KeyZ, true) if modifiers.shift => EditorCommand::Redo,
            (KeyCode::KeyZ, true) => EditorCommand::Undo,
            (KeyCode::KeyY, true) => EditorCommand::Redo,
            (KeyCode::KeyA, true) => EditorCommand::SelectAll,
            (KeyCode::ArrowUp, _) => EditorCommand::Budge { dx: 0.0, dy: -budge_step },
            (KeyCode::ArrowDown, _) => EditorCommand::Budge { dx: 0.0, dy: budge_step },
            (KeyCode::ArrowLeft, _) => EditorCommand::Budge { dx: -budge_step, dy: 0.0 },
            (KeyCode::ArrowRight, _) => EditorCommand::Budge { dx: budge_step, dy: 0.0 },
            (KeyCode::Delete | KeyCode::Backspace, _) => EditorCommand::DeleteSelected,
            (KeyCode::Escape, _) => EditorCommand::DeselectAll,
            (KeyCode::KeyB, false) => EditorCommand::ToggleBoundingBox,
            (KeyCode::KeyE, false) => EditorCommand::ToggleEditing,
            (KeyCode::KeyC, false) => EditorCommand::ToggleConnectivity,
            (KeyCode::Equal | KeyCode::NumpadAdd, _) => EditorCommand::IncrementLandmarkSize,
            (KeyCode::Minus | KeyCode::NumpadSubtract, _) => EditorCommand::DecrementLandmarkSize,
            (KeyCode::PageDown, _) => EditorCommand::NextAsset,
            (KeyCode::PageUp, _) => EditorCommand::PreviousAsset,
            _ => continue,
        };
        commands.push(command);
    }
    commands
}

/// System to queue editor commands for keyboard shortcuts.
pub fn collect_keyboard_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    session: Res<EditorSessionRes>,
    queue: Res<InputQueue>,
) {
    let budge_step = session.0.config().budge_step;
    for command in shortcut_commands(&keyboard, budge_step) {
        tracing::debug!("[input] shortcut {command:?}");
        queue.push_command(command);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pressed(keys: &[KeyCode]) -> ButtonInput<KeyCode> {
        let mut input = ButtonInput::<KeyCode>::default();
        for key in keys {
            input.press(*key);
        }
        input
    }

    #[test]
    fn test_undo_and_redo_shortcuts() {
        let keys = pressed(&[KeyCode::ControlLeft, KeyCode::KeyZ]);
        assert_eq!(shortcut_commands(&keys, 1.0), vec![EditorCommand::Undo]);

        let keys = pressed(&[KeyCode::ControlLeft, KeyCode::ShiftLeft, KeyCode::KeyZ]);
        assert_eq!(shortcut_commands(&keys, 1.0), vec![EditorCommand::Redo]);

        let keys = pressed(&[KeyCode::SuperLeft, KeyCode::KeyY]);
        assert_eq!(shortcut_commands(&keys, 1.0), vec![EditorCommand::Redo]);
    }

    #[test]
    fn test_plain_letters_need_no_ctrl() {
        assert_eq!(
            shortcut_commands(&pressed(&[KeyCode::KeyB]), 1.0),
            vec![EditorCommand::ToggleBoundingBox]
        );
        assert!(shortcut_commands(&pressed(&[KeyCode::ControlLeft, KeyCode::KeyB]), 1.0).is_empty());
        assert!(shortcut_commands(&pressed(&[KeyCode::KeyZ]), 1.0).is_empty());
    }

    #[test]
    fn test_release_outside_window_uses_last_position() {
        let mut cursor = CursorState::default();
        let mut mouse = ButtonInput::<MouseButton>::default();
        mouse.press(MouseButton::Left);
        let inputs = pointer_inputs(Some(Vec2::new(20.0, 20.0)), &mut cursor, &mouse, Modifiers::default());
        assert_eq!(inputs.len(), 2);
        assert!(matches!(inputs[1], EditorInput::PointerDown(_)));

        mouse.clear();
        mouse.release(MouseButton::Left);
        let inputs = pointer_inputs(None, &mut cursor, &mouse, Modifiers::default());
        assert_eq!(inputs, vec![EditorInput::PointerUp(PointerEvent::primary(20.0, 20.0))]);
        assert_eq!(cursor.position, Some(Vec2::new(20.0, 20.0)));
    }

    #[test]
    fn test_no_input_before_cursor_is_known() {
        let mut cursor = CursorState::default();
        let mut mouse = ButtonInput::<MouseButton>::default();
        mouse.press(MouseButton::Left);
        assert!(pointer_inputs(None, &mut cursor, &mouse, Modifiers::default()).is_empty());
    }

    #[test]
    fn test_arrows_budge_by_step() {
        let keys = pressed(&[KeyCode::ArrowUp]);
        assert_eq!(
            shortcut_commands(&keys, 3.0),
            vec![EditorCommand::Budge { dx: 0.0, dy: -3.0 }]
        );
    }
}
