//! Script and server configuration.

use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

/// Voice used for scaffolding speech when no script is available
/// (also the default `machine_voice`).
pub const DEFAULT_MACHINE_VOICE: &str = "Polly.Matthew-Neural";

/// Default voice for the message content and email readback.
pub const DEFAULT_HUMAN_VOICE: &str = "Polly.Salli-Neural";

/// The message script: everything the call says, plus timing parameters.
///
/// Loaded once at startup from a TOML file and shared read-only across all
/// calls; nothing mutates it afterwards.
#[derive(Debug, Clone, Deserialize)]
pub struct Script {
    /// Whose message this is ("this is a voice message from ...").
    pub from_name: String,
    /// What the message is about.
    pub subject: String,
    /// The message body read to the recipient.
    pub main_message: String,
    /// Email address offered for a written reply, spelled out on request.
    pub contact_email: String,
    /// How long the menu waits for a keypress before giving up.
    #[serde(default = "default_menu_timeout")]
    pub menu_timeout_seconds: u32,
    /// Maximum length of a recorded voice reply.
    #[serde(default = "default_reply_max")]
    pub reply_max_seconds: u32,
    /// Voice for scaffolding speech (greeting, menu, partings).
    #[serde(default = "default_machine_voice")]
    pub machine_voice: String,
    /// Voice for the message content and the email readback.
    #[serde(default = "default_human_voice")]
    pub human_voice: String,
}

fn default_menu_timeout() -> u32 {
    120
}

fn default_reply_max() -> u32 {
    120
}

fn default_machine_voice() -> String {
    DEFAULT_MACHINE_VOICE.to_string()
}

fn default_human_voice() -> String {
    DEFAULT_HUMAN_VOICE.to_string()
}

impl Script {
    /// Load and validate the script from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let script: Script = toml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        script.validate()?;
        Ok(script)
    }

    /// Check the invariants every live call depends on: no empty spoken
    /// strings, no zero timeouts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let strings: [(&'static str, &str); 6] = [
            ("from_name", &self.from_name),
            ("subject", &self.subject),
            ("main_message", &self.main_message),
            ("contact_email", &self.contact_email),
            ("machine_voice", &self.machine_voice),
            ("human_voice", &self.human_voice),
        ];
        for (field, value) in strings {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field,
                    message: "must not be empty".into(),
                });
            }
        }
        if self.menu_timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "menu_timeout_seconds",
                message: "must be greater than zero".into(),
            });
        }
        if self.reply_max_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "reply_max_seconds",
                message: "must be greater than zero".into(),
            });
        }
        Ok(())
    }
}

/// Server settings, built from environment variables with defaults.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port the webhook server listens on.
    pub port: u16,
    /// Externally reachable base URL Twilio uses to fetch documents.
    pub public_url: String,
    /// Path to the script TOML file.
    pub script_path: String,
}

impl ServerConfig {
    /// Build config from environment variables.
    pub fn from_env() -> Self {
        let port: u16 = std::env::var("VOICEGRAM_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5000);

        let public_url = std::env::var("VOICEGRAM_PUBLIC_URL")
            .unwrap_or_else(|_| format!("http://localhost:{port}"));

        let script_path =
            std::env::var("VOICEGRAM_SCRIPT").unwrap_or_else(|_| "./script.toml".to_string());

        Self {
            port,
            public_url,
            script_path,
        }
    }
}
