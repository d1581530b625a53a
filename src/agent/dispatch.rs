use std::collections::BTreeMap;
use std::fmt;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::agent::confirm::ConfirmationGate;
use crate::agent::tools::{Execution, LocalFunction, PythonFunction, SumFunction};
use crate::model::FunctionCall;
use crate::schema::FunctionSchema;

pub const NO_FUNCTION_CALL: &str = "No function created, try again...";

/// Functions offered to the model. `sum` stays callable without being offered.
const ADVERTISED: &[&str] = &["python"];

#[derive(Debug, Clone, PartialEq)]
pub enum CallOutcome {
    NoFunctionCall,
    NotAllowed(String),
    Completed(Execution),
}

impl fmt::Display for CallOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoFunctionCall => f.write_str(NO_FUNCTION_CALL),
            Self::NotAllowed(name) => write!(f, "Not allowed: {name}"),
            Self::Completed(execution) => write!(f, "{execution}"),
        }
    }
}

/// Routes a model's function call to an allow-listed local function.
pub struct Dispatcher<'a> {
    functions: BTreeMap<&'static str, Box<dyn LocalFunction + 'a>>,
    gate: &'a ConfirmationGate<'a>,
    verbose: bool,
}

impl<'a> Dispatcher<'a> {
    pub fn new(gate: &'a ConfirmationGate<'a>, verbose: bool) -> Self {
        let allowed: [Box<dyn LocalFunction + 'a>; 2] =
            [Box::new(PythonFunction::new(gate)), Box::new(SumFunction)];
        let functions = allowed
            .into_iter()
            .map(|function| (function.name(), function))
            .collect();

        Self {
            functions,
            gate,
            verbose,
        }
    }

    pub fn allowed_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.functions.keys().copied()
    }

    /// Schemas for the functions listed in the request to the model.
    pub fn advertised(&self) -> Result<Vec<FunctionSchema>> {
        ADVERTISED
            .iter()
            .filter_map(|name| self.functions.get(name))
            .map(|function| function.schema())
            .collect()
    }

    pub fn dispatch(&self, call: Option<&FunctionCall>) -> Result<CallOutcome> {
        let Some(call) = call else {
            return Ok(CallOutcome::NoFunctionCall);
        };

        let Some(function) = self.functions.get(call.name.as_str()) else {
            warn!(function = %call.name, "model requested a function outside the allow-list");
            return Ok(CallOutcome::NotAllowed(call.name.clone()));
        };

        match serde_json::from_str::<serde_json::Value>(&call.arguments) {
            Ok(arguments) => {
                if self.verbose {
                    match arguments.get("code").and_then(serde_json::Value::as_str) {
                        Some(code) => info!("{code}"),
                        None => info!("{arguments}"),
                    }
                }
                debug!(function = %call.name, "dispatching function call");
                function.invoke(arguments).map(CallOutcome::Completed)
            }
            Err(err) => {
                if self.verbose {
                    info!("{}", call.arguments);
                }
                warn!(
                    function = %call.name,
                    error = %err,
                    "function arguments are not valid JSON; treating them as code"
                );
                self.gate.run(&call.arguments).map(CallOutcome::Completed)
            }
        }
    }
}
