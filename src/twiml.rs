//! TwiML document model.
//!
//! A [`VoiceResponse`] is the ordered list of verbs a webhook handler
//! returns to Twilio: speak, pause, collect digits, record, hang up.
//! Prompts nest inside `Gather` so they are spoken while Twilio is already
//! listening and the caller can key through them.

use std::fmt::Write;

/// What a `<Say>` speaks: plain text, or a lead-in followed by text spelled
/// out character by character (used for the email readback).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SayBody {
    Plain(String),
    SpelledOut { lead_in: String, spelled: String },
}

/// A single `<Say>` element with its voice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Say {
    pub voice: String,
    pub body: SayBody,
}

impl Say {
    pub fn plain(voice: &str, text: impl Into<String>) -> Self {
        Self {
            voice: voice.to_string(),
            body: SayBody::Plain(text.into()),
        }
    }

    pub fn spelled(voice: &str, lead_in: impl Into<String>, spelled: impl Into<String>) -> Self {
        Self {
            voice: voice.to_string(),
            body: SayBody::SpelledOut {
                lead_in: lead_in.into(),
                spelled: spelled.into(),
            },
        }
    }
}

/// One TwiML verb.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verb {
    Say(Say),
    Pause {
        seconds: u32,
    },
    /// Collect keypad digits. `action` receives the result; the gather is
    /// rendered with `actionOnEmptyResult` so a timeout posts there too.
    Gather {
        num_digits: u32,
        timeout_seconds: u32,
        action: String,
        prompts: Vec<Say>,
    },
    Record {
        max_length_seconds: u32,
        action: String,
        play_beep: bool,
    },
    Hangup,
}

/// An ordered TwiML response document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoiceResponse {
    verbs: Vec<Verb>,
}

impl VoiceResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn say(&mut self, voice: &str, text: impl Into<String>) {
        self.verbs.push(Verb::Say(Say::plain(voice, text)));
    }

    pub fn say_spelled(
        &mut self,
        voice: &str,
        lead_in: impl Into<String>,
        spelled: impl Into<String>,
    ) {
        self.verbs.push(Verb::Say(Say::spelled(voice, lead_in, spelled)));
    }

    pub fn pause(&mut self, seconds: u32) {
        self.verbs.push(Verb::Pause { seconds });
    }

    pub fn gather(
        &mut self,
        num_digits: u32,
        timeout_seconds: u32,
        action: &str,
        prompts: Vec<Say>,
    ) {
        self.verbs.push(Verb::Gather {
            num_digits,
            timeout_seconds,
            action: action.to_string(),
            prompts,
        });
    }

    pub fn record(&mut self, max_length_seconds: u32, action: &str, play_beep: bool) {
        self.verbs.push(Verb::Record {
            max_length_seconds,
            action: action.to_string(),
            play_beep,
        });
    }

    pub fn hangup(&mut self) {
        self.verbs.push(Verb::Hangup);
    }

    pub fn verbs(&self) -> &[Verb] {
        &self.verbs
    }

    /// Serialize to the XML body Twilio executes.
    pub fn to_xml(&self) -> String {
        let mut out = String::from(r#"<?xml version="1.0" encoding="UTF-8"?><Response>"#);
        for verb in &self.verbs {
            write_verb(&mut out, verb);
        }
        out.push_str("</Response>");
        out
    }
}

fn write_verb(out: &mut String, verb: &Verb) {
    match verb {
        Verb::Say(say) => write_say(out, say),
        Verb::Pause { seconds } => {
            let _ = write!(out, r#"<Pause length="{seconds}"/>"#);
        }
        Verb::Gather {
            num_digits,
            timeout_seconds,
            action,
            prompts,
        } => {
            let _ = write!(
                out,
                r#"<Gather input="dtmf" numDigits="{num_digits}" timeout="{timeout_seconds}" action="{}" method="POST" actionOnEmptyResult="true">"#,
                escape(action)
            );
            for say in prompts {
                write_say(out, say);
            }
            out.push_str("</Gather>");
        }
        Verb::Record {
            max_length_seconds,
            action,
            play_beep,
        } => {
            let _ = write!(
                out,
                r#"<Record action="{}" method="POST" maxLength="{max_length_seconds}" playBeep="{play_beep}"/>"#,
                escape(action)
            );
        }
        Verb::Hangup => out.push_str("<Hangup/>"),
    }
}

fn write_say(out: &mut String, say: &Say) {
    let _ = write!(out, r#"<Say voice="{}">"#, escape(&say.voice));
    match &say.body {
        SayBody::Plain(text) => out.push_str(&escape(text)),
        SayBody::SpelledOut { lead_in, spelled } => {
            let _ = write!(
                out,
                r#"{} <say-as interpret-as="spell-out">{}</say-as>"#,
                escape(lead_in),
                escape(spelled)
            );
        }
    }
    out.push_str("</Say>");
}

/// Escape the five XML reserved characters.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
