//! HTTP surface: the Twilio voice webhooks, the trigger page, and call
//! creation.
//!
//! Each voice route is bound to one logical call state at registration
//! time; the request body only ever contributes the single event datum for
//! that state. Nothing is looked up by call identity — correctness of
//! "where we are in the conversation" comes entirely from which endpoint
//! was hit, which is what lets the server run any number of calls with no
//! session store at all.
//!
//! Twilio delivers callbacks for one call strictly sequentially (it waits
//! for a response document before generating the next event); that
//! external guarantee is a precondition here, not something re-implemented.

use std::sync::Arc;

use axum::extract::rejection::FormRejection;
use axum::extract::{Form, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::{DEFAULT_MACHINE_VOICE, Script};
use crate::error::FlowError;
use crate::flow::render::{paths, render};
use crate::flow::{CallEvent, CallState, transition};
use crate::twilio::TwilioClient;
use crate::twiml::VoiceResponse;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub script: Arc<Script>,
    /// Call initiation client (None if Twilio credentials are not configured).
    pub twilio: Option<Arc<TwilioClient>>,
    /// Externally reachable base URL for the opening webhook.
    pub public_url: String,
}

/// The fields this server reads from a Twilio callback form body.
#[derive(Debug, Deserialize)]
pub struct VoiceCallback {
    #[serde(rename = "Digits")]
    digits: Option<String>,
}

impl VoiceCallback {
    /// The pressed digit, if one arrived. Twilio posts an empty `Digits`
    /// when a gather drains on `actionOnEmptyResult`.
    fn digit(&self) -> Option<char> {
        self.digits.as_deref().and_then(|d| d.chars().next())
    }
}

/// Build the router with the voice webhook and trigger routes.
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/calls", post(start_call))
        .route(paths::OPENING, get(opening).post(opening))
        .route(paths::MENU, post(menu))
        .route(paths::REPLY_DONE, post(reply_done))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state)
}

// ── Voice webhooks ──────────────────────────────────────────────────────

async fn opening(State(state): State<AppState>) -> Response {
    step(&state, CallState::Opening, CallEvent::Answered)
}

async fn menu(
    State(state): State<AppState>,
    callback: Result<Form<VoiceCallback>, FormRejection>,
) -> Response {
    let callback = match callback {
        Ok(Form(callback)) => callback,
        Err(rejection) => {
            warn!(error = %rejection, "Malformed menu callback body; replaying the menu");
            return twiml_response(render(CallState::Menu, &state.script));
        }
    };
    let event = match callback.digit() {
        Some(d) => CallEvent::Digit(d),
        None => CallEvent::Timeout,
    };
    step(&state, CallState::Menu, event)
}

async fn reply_done(
    State(state): State<AppState>,
    callback: Result<Form<VoiceCallback>, FormRejection>,
) -> Response {
    // Arrival is the completion signal; the payload (terminating key,
    // recording URL) is not inspected.
    let _ = callback;
    step(&state, CallState::Recording, CallEvent::RecordingDone)
}

/// Advance the flow one webhook step and render the reply document.
///
/// This is the only layer allowed to translate an error into a
/// caller-facing document: a protocol violation replays the current
/// state's document instead of failing the call.
fn step(state: &AppState, current: CallState, event: CallEvent) -> Response {
    let next = match transition(current, event) {
        Ok(next) => next,
        Err(FlowError::UnexpectedEvent { .. }) => {
            warn!(%current, %event, "Unexpected callback event; replaying current state");
            current
        }
    };
    info!(%current, %event, %next, "Call flow step");
    twiml_response(render(next, &state.script))
}

/// Serialize a document as the `text/xml` body Twilio expects.
fn twiml_response(doc: VoiceResponse) -> Response {
    ([(header::CONTENT_TYPE, "text/xml")], doc.to_xml()).into_response()
}

/// A handler panic becomes a spoken apology instead of an HTTP error; a
/// 500 has no way to be heard by the person on the line.
fn handle_panic(_err: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let mut doc = VoiceResponse::new();
    doc.say(
        DEFAULT_MACHINE_VOICE,
        "I am sorry, something went wrong on my end. Goodbye.",
    );
    doc.hangup();
    twiml_response(doc)
}

// ── Trigger surface ─────────────────────────────────────────────────────

/// One-button page to send the voice message.
async fn index() -> Html<&'static str> {
    Html(
        r#"<form method="POST" action="/calls">
  <input type="submit" value="Send interactive voice message">
</form>
"#,
    )
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "voicegram"
    }))
}

/// Start the outbound call. Recipient and message content come from the
/// loaded configuration; the only input is the button press.
async fn start_call(State(state): State<AppState>) -> Response {
    let Some(twilio) = &state.twilio else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            "Twilio credentials are not configured",
        )
            .into_response();
    };

    let opening_url = format!(
        "{}{}",
        state.public_url.trim_end_matches('/'),
        paths::OPENING
    );
    match twilio.start_call(&opening_url).await {
        Ok(sid) => {
            info!(%sid, "Initiated outbound call");
            (StatusCode::OK, format!("Initiated call with SID {sid}\n")).into_response()
        }
        Err(e) => {
            warn!(error = %e, "Call creation failed");
            (StatusCode::BAD_GATEWAY, format!("Call creation failed: {e}\n")).into_response()
        }
    }
}
