pub mod confirm;
pub mod dispatch;
pub mod tools;

use std::fmt;

use anyhow::Result;
use tracing::{debug, info};

use crate::config::Config;
use crate::model::QueryRequest;
use crate::model_gateway::ModelGateway;

use dispatch::{CallOutcome, Dispatcher};

/// The printable result of one query.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    Reply(String),
    Call(CallOutcome),
}

impl fmt::Display for QueryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reply(text) => f.write_str(text),
            Self::Call(outcome) => write!(f, "{outcome}"),
        }
    }
}

pub struct Agent<'a, G> {
    gateway: &'a G,
    cfg: &'a Config,
    dispatcher: &'a Dispatcher<'a>,
}

impl<'a, G: ModelGateway> Agent<'a, G> {
    pub fn new(gateway: &'a G, cfg: &'a Config, dispatcher: &'a Dispatcher<'a>) -> Self {
        Self {
            gateway,
            cfg,
            dispatcher,
        }
    }

    /// Asks the model once, advertising the `python` function, and runs
    /// whatever call it makes.
    pub async fn run_query(&self, query: &str) -> Result<QueryOutcome> {
        let request = QueryRequest {
            system: Some(self.cfg.system_prompt.clone()),
            functions: self.dispatcher.advertised()?,
            ..QueryRequest::new(query)
        };
        info!(
            model = %request.model(self.cfg),
            query_len = query.len(),
            "sending query to model"
        );

        let reply = self.gateway.ask(&request).await?;

        match reply.function_call() {
            Some(call) => {
                debug!(function = %call.name, "model requested a function call");
                self.dispatcher
                    .dispatch(Some(call))
                    .map(QueryOutcome::Call)
            }
            None => {
                debug!("model replied with text");
                Ok(QueryOutcome::Reply(
                    reply.content().unwrap_or_default().to_string(),
                ))
            }
        }
    }
}
