//! ECS Messages for the landmark editor.
//!
//! Note: In Bevy 0.18+, buffered events use Message trait instead of Event.

use bevy::prelude::*;

use crate::events::ViewportEvent;

/// One engine output event, in the order the engine produced it.
#[derive(Message, Debug, Clone, PartialEq)]
pub struct ViewportMessage(pub ViewportEvent);
