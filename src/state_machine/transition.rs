//! Pure state transition function
//!
//! Given the same state and event this always produces the same result; all
//! I/O happens in the effects the controller executes afterwards.

use super::effect::Effect;
use super::event::Event;
use super::state::ChatState;
use crate::services::{LocationInfoResponse, PredictionResponse};
use thiserror::Error;

/// The outcome of a successful transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ChatState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    fn new(new_state: ChatState) -> Self {
        Self {
            new_state,
            effects: Vec::new(),
        }
    }

    fn with_effect(new_state: ChatState, effect: Effect) -> Self {
        Self {
            new_state,
            effects: vec![effect],
        }
    }

    fn with_effects(new_state: ChatState, effects: Vec<Effect>) -> Self {
        Self { new_state, effects }
    }
}

#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("A request is already in flight, wait for it to finish")]
    Busy,
    #[error("Location dialog is open, close it first")]
    DialogOpen,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Apply one event to the current state
#[allow(clippy::too_many_lines)] // The transition matrix reads best as one match
pub fn transition(state: &ChatState, event: Event) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // ============================================================
        // Hydration
        // ============================================================

        // Idle + Hydrate -> Hydrating
        (ChatState::Idle, Event::Hydrate) => Ok(TransitionResult::with_effect(
            ChatState::Hydrating,
            Effect::LoadCurrentSession,
        )),

        // Hydrating + SessionReady -> Idle
        (ChatState::Hydrating, Event::SessionReady { .. }) => {
            Ok(TransitionResult::new(ChatState::Idle))
        }

        // ============================================================
        // Sending a message
        // ============================================================

        // Idle + SendMessage -> Sending, or stays Idle when the input is blank
        (ChatState::Idle, Event::SendMessage { text, image }) => {
            let trimmed = text.trim();
            if trimmed.is_empty() && image.is_none() {
                return Ok(TransitionResult::new(ChatState::Idle));
            }

            let content = trimmed.to_string();
            let request_text = if content.is_empty() {
                None
            } else {
                Some(content.clone())
            };
            let handle = image.as_ref().map(|i| i.handle.clone());

            Ok(TransitionResult::with_effects(
                ChatState::Sending,
                vec![
                    Effect::append_user_message(content, handle),
                    Effect::RequestPrediction {
                        text: request_text,
                        image,
                    },
                ],
            ))
        }

        // Sending + PredictionArrived -> Idle
        (ChatState::Sending, Event::PredictionArrived { response }) => {
            Ok(prediction_result(response))
        }

        // Sending + PredictionFailed -> Idle
        (ChatState::Sending, Event::PredictionFailed { .. }) => Ok(TransitionResult::with_effect(
            ChatState::Idle,
            Effect::notify_error("Lỗi", "Không thể nhận chẩn đoán. Vui lòng thử lại."),
        )),

        // ============================================================
        // Location flow
        // ============================================================

        // Idle + RequestLocation -> AwaitingLocation
        (ChatState::Idle, Event::RequestLocation { message_id }) => {
            Ok(TransitionResult::new(ChatState::AwaitingLocation {
                target_message_id: message_id,
            }))
        }

        // AwaitingLocation + RequestLocation -> AwaitingLocation, retargeted
        (ChatState::AwaitingLocation { .. }, Event::RequestLocation { message_id }) => {
            Ok(TransitionResult::new(ChatState::AwaitingLocation {
                target_message_id: message_id,
            }))
        }

        // AwaitingLocation + SubmitLocation -> ResolvingLocation, or Idle when blank
        (ChatState::AwaitingLocation { target_message_id }, Event::SubmitLocation { location }) => {
            let trimmed = location.trim();
            if trimmed.is_empty() {
                return Ok(TransitionResult::new(ChatState::Idle));
            }

            Ok(TransitionResult::with_effects(
                ChatState::ResolvingLocation {
                    target_message_id: target_message_id.clone(),
                    location: trimmed.to_string(),
                },
                vec![
                    Effect::append_user_message(format!("Vị trí của tôi: {trimmed}"), None),
                    Effect::RequestLocationInfo {
                        location: trimmed.to_string(),
                    },
                ],
            ))
        }

        // AwaitingLocation + CancelLocation -> Idle
        (ChatState::AwaitingLocation { .. }, Event::CancelLocation) => {
            Ok(TransitionResult::new(ChatState::Idle))
        }

        // ResolvingLocation + LocationResolved -> Idle
        (
            ChatState::ResolvingLocation {
                target_message_id,
                location,
            },
            Event::LocationResolved { response },
        ) => Ok(location_result(target_message_id, location, response)),

        // ResolvingLocation + LocationFailed -> Idle
        (ChatState::ResolvingLocation { .. }, Event::LocationFailed { .. }) => {
            Ok(TransitionResult::with_effect(
                ChatState::Idle,
                Effect::notify_error("Lỗi", "Không thể lấy thông tin thời tiết. Vui lòng thử lại."),
            ))
        }

        // ============================================================
        // Clearing the conversation
        // ============================================================

        // Idle + ClearChat -> ClearingChat
        (ChatState::Idle, Event::ClearChat) => Ok(TransitionResult::with_effect(
            ChatState::ClearingChat,
            Effect::ResetSession,
        )),

        // ClearingChat + SessionReady -> Idle
        (ChatState::ClearingChat, Event::SessionReady { .. }) => {
            Ok(TransitionResult::with_effect(
                ChatState::Idle,
                Effect::notify_info("Đã xóa cuộc trò chuyện", "Bắt đầu cuộc hội thoại mới"),
            ))
        }

        // ============================================================
        // Admission gates
        // ============================================================

        // A request in flight rejects new work outright
        (
            ChatState::Hydrating
            | ChatState::Sending
            | ChatState::ResolvingLocation { .. }
            | ChatState::ClearingChat,
            Event::SendMessage { .. } | Event::RequestLocation { .. } | Event::ClearChat,
        ) => Err(TransitionError::Busy),

        // The open dialog must be answered or dismissed first
        (
            ChatState::AwaitingLocation { .. },
            Event::SendMessage { .. } | Event::ClearChat,
        ) => Err(TransitionError::DialogOpen),

        // ============================================================
        // Invalid Transitions
        // ============================================================
        (state, event) => Err(TransitionError::InvalidTransition(format!(
            "No transition from {state:?} with event {event:?}"
        ))),
    }
}

// Helper functions

fn prediction_result(response: PredictionResponse) -> TransitionResult {
    match response {
        PredictionResponse::Diagnosis(info) => TransitionResult::with_effect(
            ChatState::Idle,
            Effect::append_diagnosis(format!("Kết quả chẩn đoán: {}", info.disease_name), info),
        ),
        PredictionResponse::Reply { message } => {
            TransitionResult::with_effect(ChatState::Idle, Effect::append_system_text(message))
        }
    }
}

fn location_result(
    target_message_id: &str,
    submitted_location: &str,
    response: LocationInfoResponse,
) -> TransitionResult {
    match response {
        LocationInfoResponse::Weather(mut info) => {
            // Backends may omit the echoed location, fall back to what the user typed
            if info.location.is_empty() {
                info.location = submitted_location.to_string();
            }
            let description = format!("Đã cập nhật thông tin thời tiết cho {}", info.location);

            TransitionResult::with_effects(
                ChatState::Idle,
                vec![
                    Effect::ResolveLocationRequest {
                        message_id: target_message_id.to_string(),
                        weather: Some(info),
                    },
                    Effect::notify_success("Thông tin thời tiết", description),
                ],
            )
        }
        LocationInfoResponse::Acknowledgment { message } => TransitionResult::with_effects(
            ChatState::Idle,
            vec![
                Effect::append_system_text(message),
                Effect::ResolveLocationRequest {
                    message_id: target_message_id.to_string(),
                    weather: None,
                },
            ],
        ),
    }
}
