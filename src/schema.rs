use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::agent::tools::Function;

/// Function description advertised to the model in the `functions` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSchema {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub parameters: Value,
}

/// Builds the schema for `F` from its typed argument struct.
///
/// Fields with a serde default are optional and carry that default; every
/// other field is required.
pub fn schema_for<F: Function>() -> Result<FunctionSchema> {
    let mut root = schemars::schema_for!(F::Args);
    root.meta_schema = None;
    root.schema.metadata().title = Some(format!("Input for `{}`", F::NAME));

    let parameters = serde_json::to_value(&root)
        .with_context(|| format!("Failed to encode parameter schema for '{}'", F::NAME))?;

    Ok(FunctionSchema {
        name: F::NAME.to_string(),
        description: F::DESCRIPTION.map(str::to_string),
        parameters,
    })
}
