use anyhow::Result;
use reqwest::Client;
use std::future::Future;
use std::pin::Pin;

use crate::config::Config;
use crate::model::{self, ChatReply, QueryRequest};

pub type ModelGatewayFuture<'a> = Pin<Box<dyn Future<Output = Result<ChatReply>> + 'a>>;

/// The agent's view of the remote model.
pub trait ModelGateway {
    fn ask<'a>(&'a self, request: &'a QueryRequest) -> ModelGatewayFuture<'a>;
}

pub trait ChatBackend {
    fn ask<'a>(
        &'a self,
        client: &'a Client,
        cfg: &'a Config,
        request: &'a QueryRequest,
    ) -> ModelGatewayFuture<'a>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProviderChatBackend;

impl ChatBackend for ProviderChatBackend {
    fn ask<'a>(
        &'a self,
        client: &'a Client,
        cfg: &'a Config,
        request: &'a QueryRequest,
    ) -> ModelGatewayFuture<'a> {
        Box::pin(model::ask(client, cfg, request))
    }
}

pub struct HostModelGateway<'a, B = ProviderChatBackend> {
    client: &'a Client,
    cfg: &'a Config,
    backend: B,
}

impl<'a> HostModelGateway<'a, ProviderChatBackend> {
    pub fn new(client: &'a Client, cfg: &'a Config) -> Self {
        Self::with_backend(client, cfg, ProviderChatBackend)
    }
}

impl<'a, B> HostModelGateway<'a, B> {
    pub fn with_backend(client: &'a Client, cfg: &'a Config, backend: B) -> Self {
        Self {
            client,
            cfg,
            backend,
        }
    }
}

impl<B> ModelGateway for HostModelGateway<'_, B>
where
    B: ChatBackend,
{
    fn ask<'b>(&'b self, request: &'b QueryRequest) -> ModelGatewayFuture<'b> {
        self.backend.ask(self.client, self.cfg, request)
    }
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;
    use std::cell::RefCell;

    use super::{ChatBackend, HostModelGateway, ModelGateway, ModelGatewayFuture};
    use crate::config::Config;
    use crate::model::{ChatReply, Choice, QueryRequest, ReplyMessage};

    #[derive(Debug)]
    enum StubOutcome {
        Ok(ChatReply),
        Err(String),
    }

    #[derive(Debug)]
    struct StubBackend {
        calls: RefCell<Vec<(String, usize)>>,
        outcome: StubOutcome,
    }

    impl StubBackend {
        fn ok(content: impl Into<String>) -> Self {
            let reply = ChatReply {
                choices: vec![Choice {
                    message: ReplyMessage {
                        content: Some(content.into()),
                        function_call: None,
                    },
                }],
            };
            Self {
                calls: RefCell::new(Vec::new()),
                outcome: StubOutcome::Ok(reply),
            }
        }

        fn err(message: impl Into<String>) -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                outcome: StubOutcome::Err(message.into()),
            }
        }
    }

    impl ChatBackend for StubBackend {
        fn ask<'a>(
            &'a self,
            _client: &'a reqwest::Client,
            cfg: &'a Config,
            request: &'a QueryRequest,
        ) -> ModelGatewayFuture<'a> {
            self.calls
                .borrow_mut()
                .push((request.model(cfg).to_string(), request.messages().len()));
            let result = match &self.outcome {
                StubOutcome::Ok(reply) => Ok(reply.clone()),
                StubOutcome::Err(message) => Err(anyhow!(message.clone())),
            };
            Box::pin(async move { result })
        }
    }

    fn test_config() -> Config {
        Config::from_env_with(|_| None)
    }

    #[tokio::test]
    async fn host_gateway_forwards_request_and_reply() {
        let client = reqwest::Client::new();
        let cfg = test_config();
        let gateway = HostModelGateway::with_backend(&client, &cfg, StubBackend::ok("hello"));
        let request = QueryRequest {
            system: Some("sys".to_string()),
            ..QueryRequest::new("hi")
        };

        let reply = gateway.ask(&request).await.expect("gateway ask should succeed");

        assert_eq!(reply.content(), Some("hello"));
        let calls = gateway.backend.calls.borrow();
        assert_eq!(calls.as_slice(), [("gpt-3.5-turbo".to_string(), 2)]);
    }

    #[tokio::test]
    async fn host_gateway_preserves_backend_errors() {
        let client = reqwest::Client::new();
        let cfg = test_config();
        let gateway =
            HostModelGateway::with_backend(&client, &cfg, StubBackend::err("backend failure"));

        let err = gateway
            .ask(&QueryRequest::new("ping"))
            .await
            .expect_err("gateway ask should fail");

        let msg = format!("{err:#}");
        assert!(
            msg.contains("backend failure"),
            "unexpected error message: {msg}"
        );
        assert_eq!(gateway.backend.calls.borrow().len(), 1);
    }
}
