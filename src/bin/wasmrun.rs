//! `wasmrun <path.wasm> <export> [args...]`: compiles, instantiates, and
//! invokes one export, printing its result and mapping failures to the
//! process exit codes `spec.md` §6 defines.

use std::fs::File;
use std::process::ExitCode;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use wasmlite::cli::{self, UsageError};
use wasmlite::{Imports, Instance};

fn main() -> ExitCode {
	tracing_subscriber::registry().with(tracing_tree::HierarchicalLayer::new(2)).init();

	let invocation = match cli::parse_args(std::env::args()) {
		Ok(invocation) => invocation,
		Err(UsageError(msg)) => {
			eprintln!("{msg}");
			return ExitCode::from(cli::EXIT_MALFORMED as u8);
		}
	};

	match run(&invocation) {
		Ok(()) => ExitCode::from(cli::EXIT_OK as u8),
		Err(code) => ExitCode::from(code as u8),
	}
}

fn run(invocation: &cli::Invocation) -> Result<(), i32> {
	let file = File::open(&invocation.path).map_err(|err| {
		eprintln!("{}: {err}", invocation.path);
		cli::EXIT_MALFORMED
	})?;

	let mut imports = Imports::new();
	wasmlite::wasi::add_to(&mut imports);

	let mut instance = wasmlite::instantiate(file, &imports).map_err(|err| {
		eprintln!("{err}");
		cli::exit_code_for(&err)
	})?;

	let args = coerce_args(&instance, &invocation.export, &invocation.raw_args).map_err(|msg| {
		eprintln!("{msg}");
		cli::EXIT_MALFORMED
	})?;

	match instance.call(&invocation.export, &args) {
		Ok(Some(result)) => {
			println!("{result:?}");
			Ok(())
		}
		Ok(None) => Ok(()),
		Err(err) => {
			eprintln!("{err}");
			Err(cli::exit_code_for(&err))
		}
	}
}

fn coerce_args(instance: &Instance, export: &str, raw_args: &[String]) -> Result<Vec<wasmlite::Value>, String> {
	let export_addr = instance
		.exports()
		.get(export)
		.copied()
		.ok_or_else(|| format!("no export named {export:?}"))?;
	let func_addr = match export_addr {
		wasmlite::exec::module_instance::ExternAddr::Func(addr) => addr,
		_ => return Err(format!("export {export:?} is not a function")),
	};
	let ty = instance.store().func(func_addr).ty();
	if ty.params.len() != raw_args.len() {
		return Err(format!("{export:?} expects {} argument(s), got {}", ty.params.len(), raw_args.len()));
	}
	ty.params
		.iter()
		.zip(raw_args)
		.map(|(expected, raw)| cli::parse_value(raw, *expected).map_err(|UsageError(msg)| msg))
		.collect()
}
