//! Property-based tests for conversation transitions
//!
//! Checks structural invariants over arbitrary states and event sequences
//! instead of single hand-picked cases.

#![allow(clippy::collapsible_if)]
#![allow(clippy::single_match_else)]

use super::state::ChatState;
use super::transition::{transition, TransitionError, TransitionResult};
use super::{Effect, Event};
use crate::services::{
    DiseaseInfo, ImageUpload, LocationInfoResponse, PredictionResponse, ServiceErrorKind,
    WeatherInfo,
};
use crate::session::ChatSession;
use proptest::prelude::*;

// ============================================================================
// Test Helpers
// ============================================================================

/// Debug rendering used to compare results structurally
fn describe(result: &Result<TransitionResult, TransitionError>) -> String {
    format!("{result:?}")
}

/// Cross-check effects against the state the transition landed in
fn effects_are_valid(effects: &[Effect], new_state: &ChatState) -> bool {
    effects.iter().all(|effect| match effect {
        Effect::RequestPrediction { text, image } => {
            matches!(new_state, ChatState::Sending) && (text.is_some() || image.is_some())
        }
        Effect::RequestLocationInfo { location } => {
            matches!(new_state, ChatState::ResolvingLocation { .. }) && !location.is_empty()
        }
        Effect::LoadCurrentSession => matches!(new_state, ChatState::Hydrating),
        Effect::ResetSession => matches!(new_state, ChatState::ClearingChat),
        Effect::AppendUserMessage { content, image } => !content.is_empty() || image.is_some(),
        Effect::AppendSystemMessage { content, .. } => !content.is_empty(),
        Effect::ResolveLocationRequest { message_id, .. } => !message_id.is_empty(),
        Effect::Notify(notice) => !notice.title.is_empty(),
    })
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_disease_info() -> impl Strategy<Value = DiseaseInfo> {
    (
        "[a-zA-Z ]{1,24}",
        "[a-zA-Z ]{0,40}",
        "[a-zA-Z ]{0,40}",
        proptest::collection::vec("[a-zA-Z ]{1,20}", 0..4),
    )
        .prop_map(|(disease_name, details, treatment, medications)| DiseaseInfo {
            disease_name,
            details,
            treatment,
            medications,
        })
}

fn arb_weather_info() -> impl Strategy<Value = WeatherInfo> {
    (
        "[a-zA-Z ]{0,16}",
        -10.0f64..45.0,
        0.0f64..100.0,
        "[a-zA-Z ,]{1,16}",
        any::<bool>(),
        "[a-zA-Z ,.]{0,40}",
    )
        .prop_map(
            |(location, temperature, humidity, conditions, suitable_for_treatment, recommendation)| {
                WeatherInfo {
                    location,
                    temperature,
                    humidity,
                    conditions,
                    suitable_for_treatment,
                    recommendation,
                }
            },
        )
}

fn arb_prediction_response() -> impl Strategy<Value = PredictionResponse> {
    prop_oneof![
        arb_disease_info().prop_map(PredictionResponse::Diagnosis),
        "[a-zA-Z !?]{1,40}".prop_map(|message| PredictionResponse::Reply { message }),
    ]
}

fn arb_location_response() -> impl Strategy<Value = LocationInfoResponse> {
    prop_oneof![
        arb_weather_info().prop_map(LocationInfoResponse::Weather),
        "[a-zA-Z !?]{1,40}".prop_map(|message| LocationInfoResponse::Acknowledgment { message }),
    ]
}

fn arb_error_kind() -> impl Strategy<Value = ServiceErrorKind> {
    prop_oneof![
        Just(ServiceErrorKind::Network),
        Just(ServiceErrorKind::InvalidRequest),
        Just(ServiceErrorKind::Auth),
        Just(ServiceErrorKind::RateLimit),
        Just(ServiceErrorKind::ServerError),
        Just(ServiceErrorKind::Decode),
        Just(ServiceErrorKind::Unknown),
    ]
}

fn arb_message_id() -> impl Strategy<Value = String> {
    "[a-z0-9]{4,12}".prop_map(|suffix| format!("m-{suffix}"))
}

fn arb_image() -> impl Strategy<Value = ImageUpload> {
    proptest::collection::vec(any::<u8>(), 1..64).prop_map(|data| ImageUpload {
        handle: "blob:upload".to_string(),
        data,
        media_type: "image/png".to_string(),
    })
}

fn arb_state() -> impl Strategy<Value = ChatState> {
    prop_oneof![
        Just(ChatState::Idle),
        Just(ChatState::Hydrating),
        Just(ChatState::Sending),
        arb_message_id().prop_map(|target_message_id| ChatState::AwaitingLocation {
            target_message_id
        }),
        (arb_message_id(), "[a-zA-Z ]{1,12}").prop_map(|(target_message_id, location)| {
            ChatState::ResolvingLocation {
                target_message_id,
                location,
            }
        }),
        Just(ChatState::ClearingChat),
    ]
}

fn arb_busy_state() -> impl Strategy<Value = ChatState> {
    prop_oneof![
        Just(ChatState::Hydrating),
        Just(ChatState::Sending),
        (arb_message_id(), "[a-zA-Z ]{1,12}").prop_map(|(target_message_id, location)| {
            ChatState::ResolvingLocation {
                target_message_id,
                location,
            }
        }),
        Just(ChatState::ClearingChat),
    ]
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        Just(Event::Hydrate),
        ("[a-zA-Z ]{0,24}", proptest::option::of(arb_image()))
            .prop_map(|(text, image)| Event::SendMessage { text, image }),
        arb_message_id().prop_map(|message_id| Event::RequestLocation { message_id }),
        "[a-zA-Z ]{0,16}".prop_map(|location| Event::SubmitLocation { location }),
        Just(Event::CancelLocation),
        Just(Event::ClearChat),
        Just(Event::SessionReady {
            session: ChatSession::new("prop-session")
        }),
        arb_prediction_response().prop_map(|response| Event::PredictionArrived { response }),
        ("[a-z ]{1,20}", arb_error_kind())
            .prop_map(|(message, kind)| Event::PredictionFailed { message, kind }),
        arb_location_response().prop_map(|response| Event::LocationResolved { response }),
        ("[a-z ]{1,20}", arb_error_kind())
            .prop_map(|(message, kind)| Event::LocationFailed { message, kind }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    // Invariant 1: every accepted transition produces effects consistent with
    // the state it lands in, and rejected events leave the state untouched
    #[test]
    fn prop_transitions_preserve_validity(
        events in proptest::collection::vec(arb_event(), 0..20)
    ) {
        let mut state = ChatState::Idle;
        for event in events {
            match transition(&state, event) {
                Ok(result) => {
                    prop_assert!(
                        effects_are_valid(&result.effects, &result.new_state),
                        "Effects inconsistent with {:?}",
                        result.new_state
                    );
                    state = result.new_state;
                }
                Err(_) => {
                    // State only changes through Ok results
                }
            }
        }
    }

    // Invariant 2: a request in flight rejects new user work
    #[test]
    fn prop_busy_states_reject_new_work(
        state in arb_busy_state(),
        text in "[a-zA-Z]{1,16}",
    ) {
        let send = transition(&state, Event::SendMessage { text, image: None });
        prop_assert!(matches!(send, Err(TransitionError::Busy)));

        let clear = transition(&state, Event::ClearChat);
        prop_assert!(matches!(clear, Err(TransitionError::Busy)));
    }

    // Invariant 3: a blank send is a silent no-op
    #[test]
    fn prop_blank_send_is_noop(spaces in " {0,10}") {
        let result = transition(
            &ChatState::Idle,
            Event::SendMessage { text: spaces, image: None },
        ).unwrap();

        prop_assert_eq!(result.new_state, ChatState::Idle);
        prop_assert!(result.effects.is_empty());
    }

    // Invariant 4: a non-blank send produces exactly one user turn and one
    // prediction request
    #[test]
    fn prop_send_produces_one_round(text in "[a-zA-Z][a-zA-Z ]{0,20}") {
        let result = transition(
            &ChatState::Idle,
            Event::SendMessage { text, image: None },
        ).unwrap();

        prop_assert_eq!(&result.new_state, &ChatState::Sending);

        let user_turns = result.effects.iter()
            .filter(|e| matches!(e, Effect::AppendUserMessage { .. }))
            .count();
        let requests = result.effects.iter()
            .filter(|e| matches!(e, Effect::RequestPrediction { .. }))
            .count();
        prop_assert_eq!(user_turns, 1);
        prop_assert_eq!(requests, 1);
    }

    // Invariant 5: every resolved prediction appends exactly one system turn
    #[test]
    fn prop_resolution_appends_one_system_turn(response in arb_prediction_response()) {
        let result = transition(
            &ChatState::Sending,
            Event::PredictionArrived { response },
        ).unwrap();

        prop_assert_eq!(&result.new_state, &ChatState::Idle);

        let system_turns = result.effects.iter()
            .filter(|e| matches!(e, Effect::AppendSystemMessage { .. }))
            .count();
        prop_assert_eq!(system_turns, 1);
    }

    // Invariant 6: only diagnosis turns ask for the user's location
    #[test]
    fn prop_only_diagnoses_request_location(response in arb_prediction_response()) {
        let is_diagnosis = matches!(response, PredictionResponse::Diagnosis(_));
        let result = transition(
            &ChatState::Sending,
            Event::PredictionArrived { response },
        ).unwrap();

        let flagged = result.effects.iter().any(|e| matches!(
            e,
            Effect::AppendSystemMessage { is_location_request: true, .. }
        ));
        prop_assert_eq!(flagged, is_diagnosis);
    }

    // Invariant 7: a failed prediction only notifies, the transcript gains
    // nothing
    #[test]
    fn prop_prediction_failure_is_message_free(
        message in "[a-z ]{1,20}",
        kind in arb_error_kind(),
    ) {
        let result = transition(
            &ChatState::Sending,
            Event::PredictionFailed { message, kind },
        ).unwrap();

        prop_assert_eq!(result.effects.len(), 1);
        prop_assert!(matches!(result.effects[0], Effect::Notify(_)));
    }

    // Invariant 8: a resolved lookup always patches the turn it was aimed at
    #[test]
    fn prop_resolution_patches_target(
        target in arb_message_id(),
        location in "[a-zA-Z]{1,12}",
        response in arb_location_response(),
    ) {
        let state = ChatState::ResolvingLocation {
            target_message_id: target.clone(),
            location,
        };
        let result = transition(&state, Event::LocationResolved { response }).unwrap();

        let patched = result.effects.iter().any(|e| matches!(
            e,
            Effect::ResolveLocationRequest { message_id, .. } if message_id == &target
        ));
        prop_assert!(patched, "No patch aimed at {}", target);
    }

    // Invariant 9: the patch carries weather exactly when the backend sent it
    #[test]
    fn prop_weather_attachment_matches_variant(
        target in arb_message_id(),
        response in arb_location_response(),
    ) {
        let sent_weather = matches!(response, LocationInfoResponse::Weather(_));
        let state = ChatState::ResolvingLocation {
            target_message_id: target,
            location: "Hue".to_string(),
        };
        let result = transition(&state, Event::LocationResolved { response }).unwrap();

        let attached = result.effects.iter().any(|e| matches!(
            e,
            Effect::ResolveLocationRequest { weather: Some(_), .. }
        ));
        prop_assert_eq!(attached, sent_weather);
    }

    // Invariant 10: a weather report without a location echoes the one the
    // user submitted
    #[test]
    fn prop_empty_wire_location_falls_back(
        target in arb_message_id(),
        submitted in "[a-zA-Z]{1,12}",
        info in arb_weather_info(),
    ) {
        let mut info = info;
        info.location = String::new();

        let state = ChatState::ResolvingLocation {
            target_message_id: target,
            location: submitted.clone(),
        };
        let result = transition(
            &state,
            Event::LocationResolved {
                response: LocationInfoResponse::Weather(info),
            },
        ).unwrap();

        let patched_location = result.effects.iter().find_map(|e| match e {
            Effect::ResolveLocationRequest { weather: Some(w), .. } => Some(w.location.clone()),
            _ => None,
        });
        prop_assert_eq!(patched_location, Some(submitted));
    }

    // Invariant 11: a failed lookup leaves the target unresolved
    #[test]
    fn prop_location_failure_leaves_no_patch(
        target in arb_message_id(),
        message in "[a-z ]{1,20}",
        kind in arb_error_kind(),
    ) {
        let state = ChatState::ResolvingLocation {
            target_message_id: target,
            location: "Hue".to_string(),
        };
        let result = transition(&state, Event::LocationFailed { message, kind }).unwrap();

        let no_patch = result
            .effects
            .iter()
            .all(|e| !matches!(e, Effect::ResolveLocationRequest { .. }));
        prop_assert!(no_patch);
    }

    // Invariant 12: transitions are deterministic
    #[test]
    fn prop_transitions_are_deterministic(state in arb_state(), event in arb_event()) {
        let first = describe(&transition(&state, event.clone()));
        let second = describe(&transition(&state, event));
        prop_assert_eq!(first, second);
    }
}

// ============================================================================
// Sequence Tests
// ============================================================================

#[test]
fn test_full_diagnosis_and_location_sequence() {
    let mut state = ChatState::Idle;

    let result = transition(&state, Event::Hydrate).unwrap();
    state = result.new_state;
    let result = transition(
        &state,
        Event::SessionReady {
            session: ChatSession::new("s-1"),
        },
    )
    .unwrap();
    state = result.new_state;
    assert_eq!(state, ChatState::Idle);

    let result = transition(
        &state,
        Event::SendMessage {
            text: "lá vàng".to_string(),
            image: None,
        },
    )
    .unwrap();
    state = result.new_state;
    assert!(state.is_loading());

    let response = PredictionResponse::Diagnosis(DiseaseInfo {
        disease_name: "Bệnh vàng lá (Chlorosis)".to_string(),
        details: String::new(),
        treatment: String::new(),
        medications: Vec::new(),
    });
    let result = transition(&state, Event::PredictionArrived { response }).unwrap();
    state = result.new_state;
    assert_eq!(state, ChatState::Idle);

    let result = transition(
        &state,
        Event::RequestLocation {
            message_id: "m-2".to_string(),
        },
    )
    .unwrap();
    state = result.new_state;
    assert!(state.location_dialog_open());
    assert_eq!(state.pending_location_target(), Some("m-2"));

    let result = transition(
        &state,
        Event::SubmitLocation {
            location: "Hà Nội".to_string(),
        },
    )
    .unwrap();
    state = result.new_state;
    assert!(state.is_loading());
    assert_eq!(state.pending_location_target(), Some("m-2"));

    let result = transition(
        &state,
        Event::LocationResolved {
            response: LocationInfoResponse::Acknowledgment {
                message: "Hello Hà Nội!".to_string(),
            },
        },
    )
    .unwrap();
    state = result.new_state;
    assert_eq!(state, ChatState::Idle);
    assert!(state.pending_location_target().is_none());
}

#[test]
fn test_clear_round_trip() {
    let mut state = ChatState::Idle;

    let result = transition(&state, Event::ClearChat).unwrap();
    state = result.new_state;
    assert_eq!(state, ChatState::ClearingChat);
    assert!(!state.is_loading());

    let result = transition(
        &state,
        Event::SessionReady {
            session: ChatSession::new("s-fresh"),
        },
    )
    .unwrap();
    state = result.new_state;
    assert_eq!(state, ChatState::Idle);
    assert_eq!(result.effects.len(), 1);
    assert!(matches!(result.effects[0], Effect::Notify(_)));
}
