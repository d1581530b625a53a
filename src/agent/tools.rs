use std::fmt;

use anyhow::{Context, Result, anyhow};
use schemars::JsonSchema;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::agent::confirm::ConfirmationGate;
use crate::schema::{self, FunctionSchema};
use crate::script::Value;

/// What a local function produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Execution {
    Value(Value),
    NoValue,
    Refused,
}

pub const REFUSED_SENTINEL: &str = "#FAIL#";

impl From<Option<Value>> for Execution {
    fn from(value: Option<Value>) -> Self {
        value.map_or(Self::NoValue, Self::Value)
    }
}

impl fmt::Display for Execution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => write!(f, "{value}"),
            Self::NoValue => f.write_str("None"),
            Self::Refused => f.write_str(REFUSED_SENTINEL),
        }
    }
}

/// A function the model may ask to call.
pub trait Function {
    const NAME: &'static str;
    const DESCRIPTION: Option<&'static str>;

    type Args: DeserializeOwned + JsonSchema;

    fn call(&self, args: Self::Args) -> Result<Execution>;
}

/// Object-safe view of a [`Function`] used by the dispatcher's allow-list.
pub trait LocalFunction {
    fn name(&self) -> &'static str;
    fn schema(&self) -> Result<FunctionSchema>;
    fn invoke(&self, arguments: serde_json::Value) -> Result<Execution>;
}

impl<F: Function> LocalFunction for F {
    fn name(&self) -> &'static str {
        F::NAME
    }

    fn schema(&self) -> Result<FunctionSchema> {
        schema::schema_for::<F>()
    }

    fn invoke(&self, arguments: serde_json::Value) -> Result<Execution> {
        let args: F::Args = serde_json::from_value(arguments)
            .with_context(|| format!("Invalid arguments for function '{}'", F::NAME))?;
        debug!(function = F::NAME, "invoking local function");
        self.call(args)
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct PythonArgs {
    pub code: String,
}

/// Runs model-written code after the user confirms it.
pub struct PythonFunction<'a> {
    gate: &'a ConfirmationGate<'a>,
}

impl<'a> PythonFunction<'a> {
    pub fn new(gate: &'a ConfirmationGate<'a>) -> Self {
        Self { gate }
    }
}

impl Function for PythonFunction<'_> {
    const NAME: &'static str = "python";
    const DESCRIPTION: Option<&'static str> =
        Some("Prompts the user to execute a Python code and returns the result.");

    type Args = PythonArgs;

    fn call(&self, args: PythonArgs) -> Result<Execution> {
        self.gate.run(&args.code)
    }
}

fn default_addend() -> i64 {
    1
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SumArgs {
    pub a: i64,
    #[serde(default = "default_addend")]
    pub b: i64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SumFunction;

impl Function for SumFunction {
    const NAME: &'static str = "sum";
    const DESCRIPTION: Option<&'static str> = Some("Adds two numbers together.");

    type Args = SumArgs;

    fn call(&self, args: SumArgs) -> Result<Execution> {
        let total = args
            .a
            .checked_add(args.b)
            .ok_or_else(|| anyhow!("sum of {} and {} overflows a 64-bit integer", args.a, args.b))?;
        Ok(Execution::Value(Value::Int(total)))
    }
}
