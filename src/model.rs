use anyhow::{Result, anyhow};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Config;
use crate::providers;
use crate::schema::FunctionSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// One question for the model, with the functions it may call.
#[derive(Debug, Clone, Default)]
pub struct QueryRequest {
    pub user: String,
    pub system: Option<String>,
    /// Overrides the configured `MODEL`.
    pub model: Option<String>,
    pub functions: Vec<FunctionSchema>,
}

impl QueryRequest {
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            ..Self::default()
        }
    }

    pub fn messages(&self) -> Vec<Message> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &self.system
            && !system.trim().is_empty()
        {
            messages.push(Message::system(system.clone()));
        }
        messages.push(Message::user(self.user.clone()));
        messages
    }

    pub fn model<'a>(&'a self, cfg: &'a Config) -> &'a str {
        self.model.as_deref().unwrap_or(&cfg.model)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatReply {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Choice {
    pub message: ReplyMessage,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ReplyMessage {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub function_call: Option<FunctionCall>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// JSON-encoded, but not guaranteed to be valid JSON.
    #[serde(default)]
    pub arguments: String,
}

impl ChatReply {
    fn first_message(&self) -> Option<&ReplyMessage> {
        self.choices.first().map(|choice| &choice.message)
    }

    pub fn function_call(&self) -> Option<&FunctionCall> {
        self.first_message()?.function_call.as_ref()
    }

    pub fn content(&self) -> Option<&str> {
        self.first_message()?.content.as_deref()
    }
}

pub async fn ask(client: &Client, cfg: &Config, request: &QueryRequest) -> Result<ChatReply> {
    let provider = cfg.model_provider.to_ascii_lowercase();

    match provider.as_str() {
        "openai" => {
            debug!(
                provider = "openai",
                model = %request.model(cfg),
                function_count = request.functions.len(),
                "dispatching model chat request"
            );
            providers::openai::ask(client, cfg, request).await
        }
        other => {
            warn!(provider = %other, "unsupported model provider configured");
            Err(anyhow!(
                "Unsupported MODEL_PROVIDER='{}'. Supported providers: openai.",
                other
            ))
        }
    }
}
