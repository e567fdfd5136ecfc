//! OpenAI-style chat-completions gateway.
//!
//! Each batch travels as one JSON object in the user message; the
//! system instruction pins the model to translating that object into
//! the target language while leaving `$xxx$` and `[xxx]` tokens alone.

use std::fmt;
use std::time::Duration;

use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use ureq::http::StatusCode;
use ureq::{Agent, Proxy};

use crate::api::{TranslateBatch, with_retries};
use crate::config::Config;
use crate::error::Error;
use crate::utils::languages::Language;

const MAX_ATTEMPTS: u32 = 3;
const RETRY_DELAY: Duration = Duration::from_secs(20);

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// Blocking chat-completions client with bounded retry
pub struct ChatGateway {
    agent: Agent,
    api_key: String,
    api_base: String,
    model: String,
    attempts: u32,
    retry_delay: Duration,
    sleep: fn(Duration),
}

impl fmt::Debug for ChatGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatGateway")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("attempts", &self.attempts)
            .finish()
    }
}

impl ChatGateway {
    /// Builds the gateway from an explicit [`Config`].
    ///
    /// Fails when the configured proxy url cannot be parsed.
    pub fn new(config: &Config) -> Result<Self, Error> {
        let mut builder = Agent::config_builder().http_status_as_error(false);

        if let Some(url) = &config.proxy {
            let proxy = Proxy::new(url).map_err(|e| Error::InvalidProxy(e.to_string()))?;
            builder = builder.proxy(Some(proxy));
        }

        Ok(ChatGateway {
            agent: builder.build().new_agent(),
            api_key: config.api_key.clone(),
            api_base: config.api_base.clone(),
            model: config.model.clone(),
            attempts: MAX_ATTEMPTS,
            retry_delay: RETRY_DELAY,
            sleep: std::thread::sleep,
        })
    }

    fn request_translation(
        &self,
        payload: &str,
        language: Language,
    ) -> Result<IndexMap<String, String>, Error> {
        let system_message = build_system_message(language);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &system_message,
                },
                ChatMessage {
                    role: "user",
                    content: payload,
                },
            ],
        };

        let url = format!("{}/chat/completions", self.api_base);
        let mut response = self
            .agent
            .post(&url)
            .header("Authorization", &format!("Bearer {}", self.api_key))
            .send_json(&request)
            .map_err(|e| Error::Transport(e.to_string()))?;

        if response.status() != StatusCode::OK {
            return Err(Error::Transport(format!(
                "HTTP {}: {}",
                response.status(),
                response.body_mut().read_to_string().unwrap_or_default()
            )));
        }

        let completion = response
            .body_mut()
            .read_json::<ChatResponse>()
            .map_err(|e| Error::Transport(e.to_string()))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| Error::InvalidResponse("completion has no choices".to_string()))?;

        debug!("translate result: {content}");

        serde_json::from_str::<IndexMap<String, String>>(content.trim())
            .map_err(|e| Error::InvalidResponse(e.to_string()))
    }
}

impl TranslateBatch for ChatGateway {
    fn translate(
        &self,
        batch: &IndexMap<String, String>,
        language: Language,
    ) -> Result<IndexMap<String, String>, Error> {
        let payload =
            serde_json::to_string(batch).map_err(|e| Error::InvalidResponse(e.to_string()))?;

        debug!(
            "translating {payload} to {} using {}",
            language.display_name(),
            self.model
        );

        with_retries(self.attempts, self.retry_delay, self.sleep, |_attempt| {
            self.request_translation(&payload, language)
        })
    }
}

fn build_system_message(language: Language) -> String {
    let name = language.display_name();
    format!(
        "You are a historian from the Victorian era, a language expert and a geographer.\n\
Could you please help me with the {name} localization of a mod for the game Victoria 3?\n\
I will provide you with a JSON string.\n\
Your task is to translate the JSON string into {name} JSON string.\n\
Please note that some strings may contain formats such as `$xxx$` or `[xxx]`, which should not be translated.\n\
You should only output the translated JSON string, and you should assure that the translated JSON string is valid.\n\
Please assure that the translated string is composed by {name} characters.\n\
Pay attention to the difference between similar languages like Simplified Chinese and Traditional Chinese and Japanese, make sure you are translating to the correct language."
    )
}

#[test]
fn system_message_names_the_target_language() {
    let msg = build_system_message(Language::SimpChinese);
    assert!(msg.contains("Simplified Chinese localization"));
    assert!(msg.contains("$xxx$"));
    assert!(msg.contains("[xxx]"));

    let msg = build_system_message(Language::BrazPor);
    assert!(msg.contains("Brazilian Portuguese"));
}
