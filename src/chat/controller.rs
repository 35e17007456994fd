//! Chat controller
//!
//! Owns the conversation state, the active session, and the diagnosis
//! backend. User operations become events, events run through the pure
//! transition function, and the resulting effects are executed here. The
//! controller takes `&mut self` throughout so a session always has exactly
//! one writer.

use crate::services::{DiagnosisService, ImageUpload, PredictionRequest, WeatherInfo};
use crate::session::{generate_id, ChatSession, Message, SessionManager, SessionStore};
use crate::state_machine::{transition, ChatState, Effect, Event, Notice, TransitionError};

pub struct ChatController<S: DiagnosisService> {
    store: SessionStore,
    manager: SessionManager,
    service: S,
    state: ChatState,
    session: ChatSession,
    pending_notices: Vec<Notice>,
}

impl<S: DiagnosisService> ChatController<S> {
    /// Build a controller and hydrate the most recent session
    pub async fn new(store: SessionStore, service: S) -> Self {
        let manager = SessionManager::new(store.clone());

        let mut controller = Self {
            store,
            manager,
            service,
            state: ChatState::Idle,
            // Replaced during hydration below, before new returns
            session: ChatSession::new(String::new()),
            pending_notices: Vec::new(),
        };

        if let Err(e) = controller.dispatch(Event::Hydrate).await {
            tracing::error!(error = %e, "Hydration failed");
        }

        controller
    }

    // ==================== Operations ====================

    /// Send a prediction round. Blank input with no image is a silent no-op.
    pub async fn send_message(
        &mut self,
        text: impl Into<String>,
        image: Option<ImageUpload>,
    ) -> Result<(), TransitionError> {
        self.dispatch(Event::SendMessage {
            text: text.into(),
            image,
        })
        .await
    }

    /// Open the location dialog for a diagnosis turn
    pub async fn request_location(
        &mut self,
        message_id: impl Into<String>,
    ) -> Result<(), TransitionError> {
        self.dispatch(Event::RequestLocation {
            message_id: message_id.into(),
        })
        .await
    }

    /// Confirm the location dialog. A blank location just closes it.
    pub async fn submit_location(
        &mut self,
        location: impl Into<String>,
    ) -> Result<(), TransitionError> {
        self.dispatch(Event::SubmitLocation {
            location: location.into(),
        })
        .await
    }

    /// Close the location dialog without submitting
    pub async fn dismiss_location(&mut self) -> Result<(), TransitionError> {
        self.dispatch(Event::CancelLocation).await
    }

    /// Discard the transcript and start a fresh session
    pub async fn clear_chat(&mut self) -> Result<(), TransitionError> {
        self.dispatch(Event::ClearChat).await
    }

    // ==================== Accessors ====================

    pub fn state(&self) -> &ChatState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    pub fn location_dialog_open(&self) -> bool {
        self.state.location_dialog_open()
    }

    pub fn pending_location_target(&self) -> Option<&str> {
        self.state.pending_location_target()
    }

    pub fn session_id(&self) -> &str {
        &self.session.id
    }

    pub fn messages(&self) -> &[Message] {
        &self.session.messages
    }

    /// Drain the notices accumulated since the last call
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.pending_notices)
    }

    // ==================== Event Loop ====================

    /// Run an event through the transition function, then execute its effects
    /// and any completion events they generate until the machine settles.
    async fn dispatch(&mut self, event: Event) -> Result<(), TransitionError> {
        let mut events_to_process = vec![event];
        let mut is_user_event = true;

        while let Some(current_event) = events_to_process.pop() {
            let result = match transition(&self.state, current_event) {
                Ok(result) => result,
                // The caller's own event can legitimately be rejected; a
                // rejected completion event means the machine and the
                // controller disagree, which is a bug worth logging loudly.
                Err(e) if is_user_event => return Err(e),
                Err(e) => {
                    tracing::error!(error = %e, state = ?self.state, "Completion event rejected");
                    continue;
                }
            };
            is_user_event = false;
            self.state = result.new_state;

            for effect in result.effects {
                if let Some(generated_event) = self.execute_effect(effect).await {
                    events_to_process.push(generated_event);
                }
            }
        }

        Ok(())
    }

    #[allow(clippy::too_many_lines)] // One arm per effect variant
    async fn execute_effect(&mut self, effect: Effect) -> Option<Event> {
        match effect {
            Effect::AppendUserMessage { content, image } => {
                let message = Message::user(generate_id(), content, image);
                self.push_message(message);
                None
            }

            Effect::AppendSystemMessage {
                content,
                disease_info,
                is_location_request,
            } => {
                let mut message = Message::system(generate_id(), content);
                message.disease_info = disease_info;
                message.is_location_request = is_location_request;
                self.push_message(message);
                None
            }

            Effect::ResolveLocationRequest {
                message_id,
                weather,
            } => {
                self.resolve_location_request(&message_id, weather);
                None
            }

            Effect::RequestPrediction { text, image } => {
                let request = PredictionRequest { text, image };
                match self.service.predict(&request).await {
                    Ok(response) => Some(Event::PredictionArrived { response }),
                    Err(e) => {
                        tracing::warn!(
                            error = %e.message,
                            kind = ?e.kind,
                            "Prediction request failed"
                        );
                        Some(Event::PredictionFailed {
                            message: e.message,
                            kind: e.kind,
                        })
                    }
                }
            }

            Effect::RequestLocationInfo { location } => {
                match self.service.fetch_location_info(&location).await {
                    Ok(response) => Some(Event::LocationResolved { response }),
                    Err(e) => {
                        tracing::warn!(
                            error = %e.message,
                            kind = ?e.kind,
                            "Weather lookup failed"
                        );
                        Some(Event::LocationFailed {
                            message: e.message,
                            kind: e.kind,
                        })
                    }
                }
            }

            Effect::LoadCurrentSession => {
                let session = self.manager.current_session();
                tracing::info!(
                    session_id = %session.id,
                    messages = session.messages.len(),
                    "Hydrated session"
                );
                self.session = session.clone();
                Some(Event::SessionReady { session })
            }

            Effect::ResetSession => {
                let session = self.manager.create_session();
                self.session = session.clone();
                Some(Event::SessionReady { session })
            }

            Effect::Notify(notice) => {
                self.pending_notices.push(notice);
                None
            }
        }
    }

    /// Append to the in-memory session and write through to the store
    fn push_message(&mut self, message: Message) {
        self.session.messages.push(message.clone());
        self.store.add_message(&self.session.id, message);
    }

    /// Clear the pending flag on the targeted diagnosis turn and attach
    /// whatever weather came back
    fn resolve_location_request(&mut self, message_id: &str, weather: Option<WeatherInfo>) {
        if let Some(message) = self
            .session
            .messages
            .iter_mut()
            .find(|m| m.id == message_id)
        {
            message.is_location_request = false;
            message.weather_info = weather;
            let patched = message.clone();
            self.store.update_message(&self.session.id, &patched);
        } else {
            tracing::warn!(message_id = %message_id, "Pending location message vanished");
        }
    }
}
