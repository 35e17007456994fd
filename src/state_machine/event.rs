//! Events that drive the conversation

use crate::services::{ImageUpload, LocationInfoResponse, PredictionResponse, ServiceErrorKind};
use crate::session::ChatSession;

/// Everything that can happen to the conversation
#[derive(Debug, Clone)]
pub enum Event {
    // User events
    /// Load the current session, issued once at startup
    Hydrate,
    /// Submit a prediction round with text and/or an image
    SendMessage {
        text: String,
        image: Option<ImageUpload>,
    },
    /// Open the location dialog for a diagnosis turn
    RequestLocation { message_id: String },
    /// Confirm the location dialog with the typed location
    SubmitLocation { location: String },
    /// Close the location dialog without submitting
    CancelLocation,
    /// Discard the transcript and start a fresh session
    ClearChat,

    // Completion events
    /// A session finished loading or resetting
    SessionReady { session: ChatSession },
    /// The backend answered a prediction request
    PredictionArrived { response: PredictionResponse },
    /// The prediction request failed
    PredictionFailed {
        message: String,
        kind: ServiceErrorKind,
    },
    /// The backend answered a weather lookup
    LocationResolved { response: LocationInfoResponse },
    /// The weather lookup failed
    LocationFailed {
        message: String,
        kind: ServiceErrorKind,
    },
}
