//! Conversation state machine
//!
//! State transitions are pure functions from (state, event) pairs to a new
//! state plus a list of effects. The controller in [`crate::chat`] executes
//! the effects and feeds completion events back in.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::{Effect, Notice, NoticeKind};
pub use event::Event;
pub use state::ChatState;
pub use transition::{transition, TransitionError, TransitionResult};
