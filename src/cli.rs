//! Argument parsing and process-exit-code mapping for `wasmrun`, kept
//! separate from `src/bin/wasmrun.rs` so it can be unit tested without a
//! process boundary — the teacher's own `main.rs` was a thin, untested
//! driver; this crate pulls the parsing logic out so it is.

use std::fmt;

use crate::error::Error;
use crate::exec::Trap;
use crate::parse::ValType;

/// A parsed `wasmrun` invocation: the module path, the export to call, and
/// its arguments, still as strings (typed against the export's declared
/// signature once the module is compiled).
pub struct Invocation {
	pub path: String,
	pub export: String,
	pub raw_args: Vec<String>,
}

#[derive(Debug)]
pub struct UsageError(pub String);

impl fmt::Display for UsageError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl std::error::Error for UsageError {}

/// Parses `wasmrun <path.wasm> <export> [args...]`.
pub fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Invocation, UsageError> {
	args.next(); // argv[0]
	let path = args.next().ok_or_else(|| UsageError("usage: wasmrun <path.wasm> <export> [args...]".into()))?;
	let export = args.next().ok_or_else(|| UsageError("usage: wasmrun <path.wasm> <export> [args...]".into()))?;
	Ok(Invocation { path, export, raw_args: args.collect() })
}

/// Parses one CLI argument into a runtime value given the export's expected
/// type at that position: a bare decimal/float literal for `i32`/`f32`/`f64`,
/// or a `T:value` prefix (`i64:42`) to disambiguate when the type isn't
/// `i32`, per `spec.md` §6.
pub fn parse_value(raw: &str, expected: ValType) -> Result<crate::exec::Value, UsageError> {
	let body = match raw.split_once(':') {
		Some(("i32", v)) if expected == ValType::I32 => v,
		Some(("i64", v)) if expected == ValType::I64 => v,
		Some(("f32", v)) if expected == ValType::F32 => v,
		Some(("f64", v)) if expected == ValType::F64 => v,
		Some((prefix, _)) => return Err(UsageError(format!("argument type prefix {prefix:?} does not match expected type"))),
		None => raw,
	};
	match expected {
		ValType::I32 => body.parse::<i32>().map(crate::exec::Value::from).map_err(|e| e.to_string()),
		ValType::I64 => body.parse::<i64>().map(crate::exec::Value::from).map_err(|e| e.to_string()),
		ValType::F32 => body.parse::<f32>().map(crate::exec::Value::from).map_err(|e| e.to_string()),
		ValType::F64 => body.parse::<f64>().map(crate::exec::Value::from).map_err(|e| e.to_string()),
	}
	.map_err(|_| UsageError(format!("could not parse {raw:?} as {expected:?}")))
}

/// Process exit codes per `spec.md` §6.
pub const EXIT_OK: i32 = 0;
pub const EXIT_TRAP: i32 = 1;
pub const EXIT_LINK_ERROR: i32 = 2;
pub const EXIT_MALFORMED: i32 = 3;

pub fn exit_code_for(err: &Error) -> i32 {
	match err {
		Error::Malformed(_) => EXIT_MALFORMED,
		Error::Link(_) => EXIT_LINK_ERROR,
		Error::Trap(_) => EXIT_TRAP,
	}
}

pub fn exit_code_for_trap(_: &Trap) -> i32 {
	EXIT_TRAP
}
