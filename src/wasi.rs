//! A worked example of the host-function ABI: a small `wasi_snapshot_preview1`
//! subset (`fd_write` only, the one most MVP-targeting toolchains' startup
//! code needs), adapted from the teacher's `fd_write` to the
//! `(store, module, locals, args)` calling convention. Not part of the
//! core interpreter — an embedder wanting WASI wires this up explicitly via
//! [`crate::embed::Imports`], the same way the teacher's `main.rs` registered
//! `fd_write` by hand.

use std::io::{self, IoSlice, Write};

use tracing::debug;

use crate::embed::{Extern, Imports};
use crate::exec::module_instance::ModuleAddr;
use crate::exec::store::Store;
use crate::exec::{Trap, Value};
use crate::parse::{FunctionType, ValType};

/// Registers `wasi_snapshot_preview1.fd_write` (the only syscall this crate
/// implements) into `imports`.
pub fn add_to(imports: &mut Imports) {
	let ty = FunctionType {
		params: vec![ValType::I32, ValType::I32, ValType::I32, ValType::I32],
		results: vec![ValType::I32],
	};
	imports.define("wasi_snapshot_preview1", "fd_write", Extern::func(ty, fd_write));
}

/// `fd_write(fd, iovs_ptr, iovs_len, nwritten_ptr) -> errno`. Only `fd == 1`
/// (stdout) is meaningful here; any other descriptor is accepted and simply
/// writes to stdout too, since this crate has no real file-descriptor table
/// to consult.
fn fd_write(
	store: &mut Store,
	module: ModuleAddr,
	_locals: &[Value],
	args: &[Value],
) -> Result<Option<Value>, Trap> {
	let fd = args[0].as_u32().expect("decoder/link-time signature check guarantees i32");
	let iovs_ptr = args[1].as_u32().expect("decoder/link-time signature check guarantees i32") as usize;
	let iovs_len = args[2].as_u32().expect("decoder/link-time signature check guarantees i32") as usize;
	let nwritten_ptr = args[3].as_u32().expect("decoder/link-time signature check guarantees i32") as usize;
	debug!(fd, iovs_ptr, iovs_len, nwritten_ptr, "wasi_snapshot_preview1.fd_write");

	let mem_addr = store.module_instance(module).memories[0];
	let mem = store.memory_mut(mem_addr);

	let mut slices: Vec<IoSlice> = Vec::with_capacity(iovs_len);
	let mut cursor = iovs_ptr;
	for _ in 0..iovs_len {
		let read_u32 = |mem_data: &[u8], at: usize| u32::from_le_bytes(mem_data[at..at + 4].try_into().unwrap());
		let buf_ptr = read_u32(&mem.data, cursor) as usize;
		let buf_len = read_u32(&mem.data, cursor + 4) as usize;
		cursor += 8;
		slices.push(IoSlice::new(&mem.data[buf_ptr..buf_ptr + buf_len]));
	}

	let (errno, written) = match io::stdout().write_vectored(&slices) {
		Ok(n) => (0u32, n as u32),
		Err(err) => (err.raw_os_error().unwrap_or(-1) as u32, 0),
	};
	mem.data[nwritten_ptr..nwritten_ptr + 4].copy_from_slice(&written.to_le_bytes());

	Ok(Some(Value::from(errno)))
}
