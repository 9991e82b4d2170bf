//! Systems for the landmark editor.
//!
//! Organized by functionality:
//! - input: Window pointer input and keyboard shortcuts into the input queue
//! - session: Input queue processing and state store sync

pub mod input;
pub mod session;

pub use input::*;
pub use session::*;
