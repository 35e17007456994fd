//! Conversation engine for a plant-disease diagnosis chat
//!
//! Keeps the full client-side conversation logic in one place: a pure state
//! machine for the flow, a session store compatible with the browser-storage
//! layout, and pluggable diagnosis backends. A host UI drives it through
//! [`ChatController`], then renders [`ChatController::messages`] and the
//! drained notices after every operation.

pub mod chat;
pub mod services;
pub mod session;
pub mod state_machine;

pub use chat::ChatController;
pub use services::{
    DiagnosisService, HttpService, LoggingService, OfflineService, ServiceError, ServiceErrorKind,
};
pub use session::{ChatSession, Message, Role, SessionManager, SessionStore};
pub use state_machine::{ChatState, Notice, NoticeKind, TransitionError};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging for a host binary. Call once at startup.
///
/// Respects `RUST_LOG`, defaulting to `leaf_whisper=info`.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "leaf_whisper=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
