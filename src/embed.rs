//! The embedding-facing surface: `compile`/`instantiate` plus the
//! `Imports`/`Extern`/`Instance` types a host uses to supply functions and
//! call exports, per `spec.md` §6. This is the only place outside
//! `src/bin/wasmrun.rs` that is expected to be used from outside the crate.

use std::collections::HashMap;
use std::io::Read;

use crate::error::Error;
use crate::exec::host::HostFn;
use crate::exec::interpreter::DEFAULT_MAX_CALL_DEPTH;
use crate::exec::link::wrap_host_fn;
use crate::exec::module_instance::{ExternAddr, ModuleAddr};
use crate::exec::store::{GlobalAddr, MemAddr, Store, TableAddr};
use crate::exec::{Interpreter, Trap, Value};
use crate::parse::{decode_module, FunctionType, ParsedModule};

/// Something a host supplies to satisfy one of a module's imports.
#[derive(Clone)]
pub enum Extern {
	Func { ty: FunctionType, func: HostFn },
	Table(TableAddr),
	Memory(MemAddr),
	Global(GlobalAddr),
}

impl Extern {
	/// Wraps a Rust closure as a host function import with the declared
	/// signature `ty`.
	pub fn func<F>(ty: FunctionType, f: F) -> Self
	where
		F: Fn(&mut Store, ModuleAddr, &[Value], &[Value]) -> Result<Option<Value>, Trap> + Send + Sync + 'static,
	{
		Extern::Func { ty, func: wrap_host_fn(f) }
	}
}

/// A `module_name -> item_name -> Extern` map, built up with [`Imports::define`]
/// before a call to [`instantiate`].
#[derive(Default, Clone)]
pub struct Imports {
	entries: HashMap<(String, String), Extern>,
}

impl Imports {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn define(&mut self, module: impl Into<String>, name: impl Into<String>, item: Extern) -> &mut Self {
		self.entries.insert((module.into(), name.into()), item);
		self
	}

	pub(crate) fn get(&self, module: &str, name: &str) -> Option<&Extern> {
		self.entries.get(&(module.to_string(), name.to_string()))
	}
}

/// Tunable resource limits for instantiation and execution. Currently just
/// the interpreter's recursion bound; an embedder wanting a wall-clock
/// timeout runs the interpreter on its own thread and aborts it, per
/// `spec.md` §5.
#[derive(Debug, Clone, Copy)]
pub struct Limits {
	pub max_call_depth: u32,
}

impl Default for Limits {
	fn default() -> Self {
		Self { max_call_depth: DEFAULT_MAX_CALL_DEPTH }
	}
}

/// A linked, instantiated module: a [`Store`] plus the address of this
/// particular module instance inside it. Holds the store by value, so an
/// `Instance` can outlive the `instantiate` call that created it without an
/// embedder juggling lifetimes.
pub struct Instance {
	store: Store,
	module: ModuleAddr,
	limits: Limits,
}

impl Instance {
	/// Invokes the exported function named `name` with `args`, coercing the
	/// argument list against its declared signature first. Returns the
	/// callee's single result, or `None` for a function with no result
	/// type, per `spec.md` §6.
	pub fn call(&mut self, name: &str, args: &[Value]) -> Result<Option<Value>, Error> {
		let export = self
			.store
			.module_instance(self.module)
			.export(name)
			.ok_or_else(|| Trap::NoSuchExport(name.to_string()))?;
		let func_addr = match export {
			ExternAddr::Func(addr) => addr,
			_ => return Err(Trap::ExportNotCallable { name: name.to_string() }.into()),
		};
		let ty = self.store.func(func_addr).ty().clone();
		if ty.params.len() != args.len() || ty.params.iter().zip(args).any(|(t, v)| *t != v.val_type()) {
			return Err(Trap::ArgumentMismatch {
				name: name.to_string(),
				expected: format!("{:?}", ty.params),
				got: format!("{:?}", args.iter().map(|v| v.val_type()).collect::<Vec<_>>()),
			}
			.into());
		}
		let mut interp = Interpreter::with_max_depth(&mut self.store, self.limits.max_call_depth);
		Ok(interp.call(func_addr, self.module, &[], args)?)
	}

	/// Every export this module instance declares, by name.
	pub fn exports(&self) -> &HashMap<String, ExternAddr> {
		&self.store.module_instance(self.module).exports
	}

	pub fn store(&self) -> &Store {
		&self.store
	}

	pub fn store_mut(&mut self) -> &mut Store {
		&mut self.store
	}
}

/// Decodes `bytes` into a [`ParsedModule`] without linking or running it.
pub fn compile(bytes: impl Read) -> Result<ParsedModule, Error> {
	Ok(decode_module(bytes)?)
}

/// Decodes, links against `imports`, and instantiates `bytes`, running the
/// module's start function (if any) before returning. Uses
/// [`Limits::default`]; see [`instantiate_with_limits`] to override it.
pub fn instantiate(bytes: impl Read, imports: &Imports) -> Result<Instance, Error> {
	instantiate_with_limits(bytes, imports, Limits::default())
}

pub fn instantiate_with_limits(bytes: impl Read, imports: &Imports, limits: Limits) -> Result<Instance, Error> {
	let module = compile(bytes)?;
	let mut store = Store::new();
	let module_addr = crate::exec::link::instantiate(&mut store, &module, imports)?;
	Ok(Instance { store, module: module_addr, limits })
}
