//! Outbound call creation via the Twilio REST API.
//!
//! The orchestrator only needs one operation from Twilio's REST side:
//! create a call that fetches its first document from the opening webhook.
//! Everything after that is webhook-driven.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::error::CallError;

/// Twilio credentials and phone numbers, built from environment variables.
#[derive(Debug)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: SecretString,
    /// Number the call is placed from (a Twilio number on the account).
    pub from_number: String,
    /// Recipient of the voice message.
    pub to_number: String,
}

impl TwilioConfig {
    /// Build config from environment variables.
    /// Returns `None` if `TWILIO_ACCOUNT_SID` is not set (call initiation disabled).
    pub fn from_env() -> Option<Self> {
        let account_sid = std::env::var("TWILIO_ACCOUNT_SID").ok()?;
        let auth_token =
            SecretString::from(std::env::var("TWILIO_AUTH_TOKEN").unwrap_or_default());
        let from_number = std::env::var("TWILIO_FROM_NUMBER").unwrap_or_default();
        let to_number = std::env::var("TWILIO_TO_NUMBER").unwrap_or_default();

        Some(Self {
            account_sid,
            auth_token,
            from_number,
            to_number,
        })
    }
}

/// Subset of Twilio's call resource the orchestrator reads back.
#[derive(Debug, Deserialize)]
struct CallCreated {
    sid: String,
}

/// REST client for placing the outbound call.
pub struct TwilioClient {
    config: TwilioConfig,
    http: reqwest::Client,
}

impl TwilioClient {
    pub fn new(config: TwilioConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Create an outbound call that POSTs `opening_url` for its first
    /// document. Returns the Twilio call SID.
    pub async fn start_call(&self, opening_url: &str) -> Result<String, CallError> {
        let url = format!(
            "https://api.twilio.com/2010-04-01/Accounts/{}/Calls.json",
            self.config.account_sid
        );
        let params = [
            ("To", self.config.to_number.as_str()),
            ("From", self.config.from_number.as_str()),
            ("Url", opening_url),
            ("Method", "POST"),
        ];

        let response = self
            .http
            .post(&url)
            .basic_auth(
                &self.config.account_sid,
                Some(self.config.auth_token.expose_secret()),
            )
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CallError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let created: CallCreated = response
            .json()
            .await
            .map_err(|e| CallError::MalformedResponse(e.to_string()))?;
        Ok(created.sid)
    }
}
