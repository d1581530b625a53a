use anyhow::{Context, Result};
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::Config;
use crate::model::{ChatReply, Message, QueryRequest};
use crate::providers::http_errors::{model_api_request_error, model_api_status_error};
use crate::schema::FunctionSchema;

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    functions: &'a [FunctionSchema],
}

fn chat_url(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

pub async fn ask(client: &Client, cfg: &Config, request: &QueryRequest) -> Result<ChatReply> {
    let api_url = chat_url(&cfg.model_base_url);
    let model = request.model(cfg);
    let body = ChatCompletionRequest {
        model,
        messages: request.messages(),
        functions: &request.functions,
    };
    debug!(
        api_url = %api_url,
        model = %model,
        message_count = body.messages.len(),
        function_count = body.functions.len(),
        "sending chat completion request"
    );

    let mut builder = client.post(&api_url).json(&body);
    if let Some(api_key) = &cfg.api_key {
        builder = builder.bearer_auth(api_key);
    }

    let response = builder.send().await.map_err(|err| {
        warn!(
            api_url = %api_url,
            model = %model,
            error = %err,
            "chat completion request failed"
        );
        model_api_request_error(err, &api_url, cfg.model_timeout_secs)
    })?;

    if !response.status().is_success() {
        let status = response.status();
        let response_body = response
            .text()
            .await
            .unwrap_or_else(|_| "<failed to read response body>".to_string());
        warn!(
            api_url = %api_url,
            model = %model,
            status = %status,
            response_body_len = response_body.len(),
            "model API returned non-success status"
        );
        return Err(model_api_status_error(status, &response_body));
    }

    let reply: ChatReply = response
        .json()
        .await
        .context("Failed to parse model chat response")?;
    debug!(
        model = %model,
        choice_count = reply.choices.len(),
        has_function_call = reply.function_call().is_some(),
        "received chat completion"
    );
    Ok(reply)
}
