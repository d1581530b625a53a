//! Runs model-generated Python in an embedded RustPython interpreter.
//!
//! Every call to [`run`] builds a fresh interpreter with an empty `__main__`
//! namespace. When the last top-level statement is a bare expression it is
//! rewritten into an assignment to [`RESULT_NAME`], and whatever that name
//! holds afterwards is the result. Anything the snippet prints is captured
//! rather than written to the process stdout.

pub mod error;
mod rewrite;
pub mod value;
pub mod worker;

use rustpython_vm::builtins::PyBaseExceptionRef;
use rustpython_vm::scope::Scope;
use rustpython_vm::{AsObject, Interpreter, PyObjectRef, PyResult, Settings, VirtualMachine};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use error::{ExecError, ExecResult};
pub use value::Value;

pub const RESULT_NAME: &str = "_result";

const SOURCE_PATH: &str = "<python>";

const CAPTURE_STDOUT: &str = "\
import io, sys
previous = sys.stdout
buffer = io.StringIO()
sys.stdout = buffer
";

const RESTORE_STDOUT: &str = "\
import sys
sys.stdout = previous
captured = buffer.getvalue()
";

/// What one snippet printed and produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub output: String,
    /// A captured `None` is reported as no result.
    pub result: ExecResult<Option<Value>>,
}

impl Report {
    fn failed(error: ExecError) -> Self {
        Self {
            output: String::new(),
            result: Err(error),
        }
    }
}

/// Runs `code` in a fresh interpreter.
pub fn run(code: &str) -> Report {
    let source = match rewrite::capture_trailing_expression(code) {
        Ok(source) => source,
        Err(err) => return Report::failed(err),
    };
    debug!(code_len = code.len(), "executing snippet");

    interpreter().enter(|vm| {
        let capture = vm.new_scope_with_builtins();
        if let Err(exc) = vm.run_code_string(capture.clone(), CAPTURE_STDOUT, "<capture>".to_owned())
        {
            return Report::failed(raised(vm, exc));
        }

        let result = main_scope(vm)
            .and_then(|scope| {
                vm.run_code_string(scope.clone(), &source, SOURCE_PATH.to_owned())?;
                captured_value(vm, &scope)
            })
            .map_err(|exc| raised(vm, exc));

        Report {
            output: restore_stdout(vm, &capture),
            result,
        }
    })
}

fn interpreter() -> Interpreter {
    Interpreter::with_init(Settings::default(), |vm| {
        vm.add_native_modules(rustpython_stdlib::get_module_inits());
        vm.add_frozen(rustpython_pylib::FROZEN_STDLIB);
    })
}

fn main_scope(vm: &VirtualMachine) -> PyResult<Scope> {
    let scope = vm.new_scope_with_builtins();
    scope
        .globals
        .set_item("__name__", vm.ctx.new_str("__main__").into(), vm)?;
    Ok(scope)
}

fn restore_stdout(vm: &VirtualMachine, capture: &Scope) -> String {
    if let Err(exc) = vm.run_code_string(capture.clone(), RESTORE_STDOUT, "<capture>".to_owned()) {
        debug!(error = %raised(vm, exc), "failed to restore stdout after snippet");
        return String::new();
    }
    capture
        .globals
        .get_item("captured", vm)
        .ok()
        .and_then(|value| value.try_to_value::<String>(vm).ok())
        .unwrap_or_default()
}

fn captured_value(vm: &VirtualMachine, scope: &Scope) -> PyResult<Option<Value>> {
    let Ok(object) = scope.globals.get_item(RESULT_NAME, vm) else {
        return Ok(None);
    };
    if vm.is_none(&object) {
        return Ok(None);
    }
    to_value(vm, object).map(Some)
}

fn to_value(vm: &VirtualMachine, object: PyObjectRef) -> PyResult<Value> {
    let types = &vm.ctx.types;
    let class = object.class();

    // Exact type checks: `bool` is a subclass of `int`.
    if class.is(types.int_type)
        && let Ok(value) = object.clone().try_to_value::<i64>(vm)
    {
        return Ok(Value::Int(value));
    }
    if class.is(types.str_type) {
        return object.try_to_value::<String>(vm).map(Value::Str);
    }

    Ok(Value::Object {
        type_name: class.name().to_string(),
        text: object.str(vm)?.as_str().to_owned(),
    })
}

fn raised(vm: &VirtualMachine, exc: PyBaseExceptionRef) -> ExecError {
    let kind = exc.class().name().to_string();
    let message = exc
        .as_object()
        .str(vm)
        .map(|text| text.as_str().to_owned())
        .unwrap_or_default();
    ExecError::Raised { kind, message }
}
