//! Voicegram — delivers an interactive voice message over an outbound
//! phone call, driven entirely by Twilio webhook round-trips.

pub mod config;
pub mod error;
pub mod flow;
pub mod twilio;
pub mod twiml;
pub mod web;
