use rustpython_parser::{Parse, ast};

use super::error::{ExecError, ExecResult};
use super::{RESULT_NAME, SOURCE_PATH};

/// Turns a trailing top-level expression statement into an assignment to
/// [`RESULT_NAME`]. Other programs come back unchanged.
pub fn capture_trailing_expression(code: &str) -> ExecResult<String> {
    let suite = ast::Suite::parse(code, SOURCE_PATH)
        .map_err(|err| ExecError::Syntax(err.to_string()))?;

    let Some(ast::Stmt::Expr(ast::StmtExpr { range, .. })) = suite.last() else {
        return Ok(code.to_string());
    };

    // The statement range starts at its first token, parentheses included.
    let start = usize::from(range.start());
    match (code.get(..start), code.get(start..)) {
        (Some(head), Some(tail)) => Ok(format!("{head}{RESULT_NAME} = {tail}")),
        _ => Ok(code.to_string()),
    }
}
