//! Per-state TwiML rendering.
//!
//! [`render`] is pure: a (state, script) pair always produces the same
//! document, and every document ends in exactly one way for Twilio to
//! proceed — a Gather, a Record, or a Hangup. Menu and Repeat are the one
//! deliberate equivalence: both speak the message and re-offer the menu,
//! which is what makes "press 1 to hear it again" indistinguishable from
//! the menu the caller is already in.

use crate::config::Script;
use crate::twiml::{Say, VoiceResponse};

use super::CallState;

/// Webhook paths baked into rendered documents. Twilio resolves relative
/// URLs against the URL of the document it is currently executing.
pub mod paths {
    /// Initial document fetch for the outbound call.
    pub const OPENING: &str = "/voice/opening";
    /// Gather action for the interactive menu.
    pub const MENU: &str = "/voice/menu";
    /// Recording completion callback.
    pub const REPLY_DONE: &str = "/voice/reply-done";
}

/// Render the document for a state.
pub fn render(state: CallState, script: &Script) -> VoiceResponse {
    let mut doc = VoiceResponse::new();
    match state {
        // Opening shares one document with the menu so the recipient hears
        // the message immediately, without an extra webhook round trip.
        CallState::Opening => {
            doc.say(&script.machine_voice, greeting(script));
            doc.pause(1);
            append_message_and_menu(&mut doc, script);
        }
        CallState::Menu | CallState::Repeat => {
            append_message_and_menu(&mut doc, script);
        }
        CallState::Email => {
            doc.say_spelled(
                &script.human_voice,
                "My email address is,",
                script.contact_email.as_str(),
            );
            append_menu(&mut doc, script);
        }
        CallState::ReplyPrompt => {
            doc.say(
                &script.machine_voice,
                "Please leave a reply after you hear a beep. \
                 Press the pound sign to finish recording.",
            );
            doc.record(script.reply_max_seconds, paths::REPLY_DONE, true);
        }
        // Only reachable when a callback arrives while Twilio should still
        // be recording; re-arm the recorder rather than losing the reply.
        CallState::Recording => {
            doc.say(
                &script.machine_voice,
                "I am still listening. Please leave your reply after the beep.",
            );
            doc.record(script.reply_max_seconds, paths::REPLY_DONE, true);
        }
        CallState::LongParting => {
            doc.say(
                &script.machine_voice,
                format!(
                    "Thank you. Your reply will be delivered to {}. \
                     I hope you have a nice day.",
                    script.from_name
                ),
            );
            doc.pause(1);
            doc.hangup();
        }
        CallState::ShortParting => {
            doc.say(&script.machine_voice, "Okay, thank you very much. Goodbye.");
            doc.hangup();
        }
    }
    doc
}

fn greeting(script: &Script) -> String {
    format!(
        "Hello, this is a voice message from {} about {}.",
        script.from_name, script.subject
    )
}

fn menu_prompt(script: &Script) -> String {
    format!(
        "Please press 1 to hear the message again. \
         Press 2 for the sender's email address. \
         Press 3 to record a voice reply to be sent back. \
         Press any other key to repeat the options. \
         Or, please feel free to hang up now. \
         I will wait {} seconds before ending the call.",
        script.menu_timeout_seconds
    )
}

fn append_message_and_menu(doc: &mut VoiceResponse, script: &Script) {
    doc.say(&script.human_voice, script.main_message.as_str());
    doc.pause(1);
    append_menu(doc, script);
}

fn append_menu(doc: &mut VoiceResponse, script: &Script) {
    doc.gather(
        1,
        script.menu_timeout_seconds,
        paths::MENU,
        vec![Say::plain(&script.machine_voice, menu_prompt(script))],
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::twiml::Verb;

    const ALL_STATES: [CallState; 8] = [
        CallState::Opening,
        CallState::Menu,
        CallState::Repeat,
        CallState::Email,
        CallState::ReplyPrompt,
        CallState::Recording,
        CallState::LongParting,
        CallState::ShortParting,
    ];

    fn script() -> Script {
        Script {
            from_name: "Morgan".into(),
            subject: "the quarterly report".into(),
            main_message: "The report is ready for review.".into(),
            contact_email: "morgan@example.com".into(),
            menu_timeout_seconds: 120,
            reply_max_seconds: 90,
            machine_voice: "Polly.Matthew-Neural".into(),
            human_voice: "Polly.Salli-Neural".into(),
        }
    }

    /// Every document ends in exactly one of Gather, Record, or Hangup,
    /// and only the last verb may be one of them.
    #[test]
    fn every_document_ends_one_way() {
        let script = script();
        for state in ALL_STATES {
            let doc = render(state, &script);
            let closers = doc
                .verbs()
                .iter()
                .filter(|v| {
                    matches!(v, Verb::Gather { .. } | Verb::Record { .. } | Verb::Hangup)
                })
                .count();
            assert_eq!(closers, 1, "{state} must have exactly one closing verb");
            assert!(
                matches!(
                    doc.verbs().last(),
                    Some(Verb::Gather { .. } | Verb::Record { .. } | Verb::Hangup)
                ),
                "{state} must end with its closing verb"
            );
        }
    }

    #[test]
    fn terminal_states_hang_up_without_collecting() {
        let script = script();
        for state in [CallState::LongParting, CallState::ShortParting] {
            let doc = render(state, &script);
            assert!(matches!(doc.verbs().last(), Some(Verb::Hangup)));
            assert!(
                !doc.verbs()
                    .iter()
                    .any(|v| matches!(v, Verb::Gather { .. } | Verb::Record { .. })),
                "{state} must not collect further input"
            );
        }
    }

    #[test]
    fn non_terminal_states_never_hang_up() {
        let script = script();
        for state in ALL_STATES.iter().filter(|s| !s.is_terminal()) {
            let doc = render(*state, &script);
            assert!(
                !doc.verbs().iter().any(|v| matches!(v, Verb::Hangup)),
                "{state} must leave the call open"
            );
        }
    }

    /// Menu and Repeat deliberately render identically; every other pair
    /// of states must be distinguishable from the XML alone.
    #[test]
    fn renders_are_pairwise_distinct_except_menu_repeat() {
        let script = script();
        for a in ALL_STATES {
            for b in ALL_STATES {
                let same_by_design = a == b
                    || matches!(
                        (a, b),
                        (CallState::Menu, CallState::Repeat) | (CallState::Repeat, CallState::Menu)
                    );
                let equal = render(a, &script).to_xml() == render(b, &script).to_xml();
                assert_eq!(
                    equal, same_by_design,
                    "render({a}) vs render({b}) distinctness"
                );
            }
        }
    }

    #[test]
    fn repeat_is_indistinguishable_from_menu() {
        let script = script();
        assert_eq!(
            render(CallState::Repeat, &script).to_xml(),
            render(CallState::Menu, &script).to_xml()
        );
    }

    #[test]
    fn opening_speaks_greeting_message_and_menu() {
        let xml = render(CallState::Opening, &script()).to_xml();
        assert!(xml.contains("Hello, this is a voice message from Morgan about the quarterly report."));
        assert!(xml.contains("The report is ready for review."));
        assert!(xml.contains("Please press 1 to hear the message again."));
        assert!(xml.contains(&format!(r#"action="{}""#, paths::MENU)));
    }

    #[test]
    fn email_spells_out_the_address_and_returns_to_menu() {
        let xml = render(CallState::Email, &script()).to_xml();
        assert!(xml.contains(r#"<say-as interpret-as="spell-out">morgan@example.com</say-as>"#));
        assert!(xml.contains(&format!(r#"action="{}""#, paths::MENU)));
    }

    #[test]
    fn reply_prompt_arms_the_recorder() {
        let xml = render(CallState::ReplyPrompt, &script()).to_xml();
        assert!(xml.contains("after you hear a beep"));
        assert!(xml.contains(&format!(r#"action="{}""#, paths::REPLY_DONE)));
        assert!(xml.contains(r#"maxLength="90""#));
        assert!(xml.contains(r#"playBeep="true""#));
    }

    #[test]
    fn long_parting_names_the_sender() {
        let xml = render(CallState::LongParting, &script()).to_xml();
        assert!(xml.contains("Your reply will be delivered to Morgan."));
    }

    #[test]
    fn menu_gather_uses_script_timeout() {
        let xml = render(CallState::Menu, &script()).to_xml();
        assert!(xml.contains(r#"timeout="120""#));
        assert!(xml.contains("I will wait 120 seconds before ending the call."));
    }

    #[test]
    fn menu_prompt_spoken_inside_the_gather() {
        let doc = render(CallState::Menu, &script());
        let Some(Verb::Gather { prompts, .. }) = doc.verbs().last() else {
            panic!("menu must end in a gather");
        };
        assert_eq!(prompts.len(), 1);
    }
}
