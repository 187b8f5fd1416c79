//! The host-function ABI: how a Rust closure supplied at instantiation time
//! is invoked when a module calls an import. Kept as a boxed `Fn` behind a
//! closed wrapper type, the way the teacher's `Callable` enum let a function
//! table hold either a WASM-defined function or a native Rust one under one
//! type — generalized here to `spec.md`'s `(store, module, locals, args) ->
//! optional value` calling convention so a host function can read/write
//! memory through the calling module instance and see the calling frame's
//! locals as well as its own arguments.

use std::sync::Arc;

use crate::exec::module_instance::ModuleAddr;
use crate::exec::{Store, Trap, Value};

/// The calling convention every host (imported) function is invoked with:
/// the store, the calling module's address, the calling frame's locals
/// (empty when called with no WASM caller, e.g. from `Instance::call`
/// directly), and the argument list popped for this call.
pub type HostFn =
	Arc<dyn Fn(&mut Store, ModuleAddr, &[Value], &[Value]) -> Result<Option<Value>, Trap> + Send + Sync>;
