//! Call flow state machine.
//!
//! A call has no stored session. The current state is encoded by which
//! webhook endpoint Twilio was told to invoke next, so every request
//! carries exactly enough information to compute the next step, and the
//! server stays stateless across any number of concurrent calls.
//!
//! [`transition`] is the authoritative table for caller input; the
//! renderer ([`render::render`]) realizes the automatic follow-ups (Repeat
//! and Email return to the menu, the reply prompt arms the recorder) by
//! pointing each document's Gather or Record at the successor's endpoint.

pub mod render;

use std::fmt;

use crate::error::FlowError;

/// Where the conversation currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallState {
    /// The recipient just answered; greet, read the message, offer the menu.
    Opening,
    /// Waiting for a menu keypress.
    Menu,
    /// Replay the message, then back to the menu.
    Repeat,
    /// Read out the contact email, then back to the menu.
    Email,
    /// Explain how to record a reply, then start recording.
    ReplyPrompt,
    /// Twilio is recording the reply.
    Recording,
    /// Reply received; thank the recipient and hang up.
    LongParting,
    /// The menu timed out; say goodbye and hang up.
    ShortParting,
}

impl CallState {
    /// Terminal states end the call; no transition leaves them.
    pub fn is_terminal(&self) -> bool {
        matches!(self, CallState::LongParting | CallState::ShortParting)
    }
}

impl fmt::Display for CallState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CallState::Opening => "opening",
            CallState::Menu => "menu",
            CallState::Repeat => "repeat",
            CallState::Email => "email",
            CallState::ReplyPrompt => "reply-prompt",
            CallState::Recording => "recording",
            CallState::LongParting => "long-parting",
            CallState::ShortParting => "short-parting",
        };
        f.write_str(name)
    }
}

/// An event delivered by a webhook callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallEvent {
    /// The outbound call connected and Twilio fetched the opening document.
    Answered,
    /// A keypad digit arrived from a gather.
    Digit(char),
    /// A gather elapsed without input.
    Timeout,
    /// The reply recording finished.
    RecordingDone,
}

impl fmt::Display for CallEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallEvent::Answered => f.write_str("call answered"),
            CallEvent::Digit(d) => write!(f, "digit '{d}'"),
            CallEvent::Timeout => f.write_str("input timeout"),
            CallEvent::RecordingDone => f.write_str("recording completion"),
        }
    }
}

/// Compute the next state for a caller event.
///
/// Digits other than 1/2/3 at the menu are a self-loop: the caller hears
/// the same menu again, not the opening, so the call never appears to
/// restart. Any (state, event) pair outside the table is a protocol
/// violation surfaced as [`FlowError::UnexpectedEvent`]; only the menu
/// offers an open-ended wait, so a timeout anywhere else is one example.
pub fn transition(current: CallState, event: CallEvent) -> Result<CallState, FlowError> {
    use CallEvent::*;
    use CallState::*;

    match (current, event) {
        (Opening, Answered) => Ok(Menu),
        (Menu, Digit('1')) => Ok(Repeat),
        (Menu, Digit('2')) => Ok(Email),
        (Menu, Digit('3')) => Ok(ReplyPrompt),
        (Menu, Digit(_)) => Ok(Menu),
        (Menu, Timeout) => Ok(ShortParting),
        (Recording, RecordingDone) => Ok(LongParting),
        (state, event) => Err(FlowError::UnexpectedEvent { state, event }),
    }
}
