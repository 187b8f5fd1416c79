//! The stack machine: one [`Frame`] per function activation, each owning
//! its own operand stack and an explicit label stack distinct from it, so
//! branch unwinding is a pop-and-restore against recorded label heights
//! rather than host-language exceptions. Function calls still recurse
//! through Rust's own call stack (one Rust frame per WASM activation), but
//! a bounded depth counter turns runaway recursion into [`Trap::CallStackExhausted`]
//! instead of overflowing the real stack.

use tracing::{debug_span, trace};

use crate::exec::module_instance::ModuleAddr;
use crate::exec::numeric::{eval_cvt_op, eval_float_op, eval_int_op};
use crate::exec::store::{FuncAddr, FuncInstance, GlobalAddr, Store};
use crate::exec::{Trap, Value};
use crate::parse::{BlockType, Instruction, LoadKind, StoreKind};

/// Default value for [`crate::embed::Limits::max_call_depth`], also used
/// directly by tests that build an [`Interpreter`] without going through
/// the embedding API.
pub const DEFAULT_MAX_CALL_DEPTH: u32 = 512;

struct LabelFrame {
	stack_height: usize,
	arity: usize,
}

/// One function activation: its locals (parameters followed by declared
/// local slots, all zero-initialized per `spec.md` §4.4), its own operand
/// stack, and its own label stack.
struct Frame {
	module: ModuleAddr,
	locals: Vec<Value>,
	op_stack: Vec<Value>,
	labels: Vec<LabelFrame>,
	result_arity: usize,
}

impl Frame {
	fn push(&mut self, v: Value) {
		self.op_stack.push(v);
	}

	fn pop(&mut self) -> Result<Value, Trap> {
		self.op_stack.pop().ok_or(Trap::OperandStackUnderflow)
	}

	fn pop_n(&mut self, n: usize) -> Result<Vec<Value>, Trap> {
		if self.op_stack.len() < n {
			return Err(Trap::OperandStackUnderflow);
		}
		Ok(self.op_stack.split_off(self.op_stack.len() - n))
	}

	/// Discards everything above `height`, keeping (and re-pushing) the top
	/// `arity` values — the mechanics both `br` and `return` need: a branch
	/// or return target only cares about its own result values, not
	/// whatever the nested blocks left lying around beneath them.
	fn unwind_to(&mut self, height: usize, arity: usize) -> Result<(), Trap> {
		let kept = self.pop_n(arity)?;
		if self.op_stack.len() < height {
			return Err(Trap::OperandStackUnderflow);
		}
		self.op_stack.truncate(height);
		self.op_stack.extend(kept);
		Ok(())
	}
}

/// What finishing a sequence of instructions (a function body, a block
/// body, ...) resolved to: fell off the end, branched `n` labels up, or hit
/// `return`. Threaded back up through nested `Block`/`Loop`/`If` the way an
/// exception would be in a host-recursive interpreter, but as an ordinary
/// return value instead.
enum Flow {
	Normal,
	Branch(u32),
	Return,
}

/// Executes WASM code against a [`Store`]. Cheap to construct — it borrows
/// the store for the duration of one call tree and carries no state of its
/// own beyond the current recursion depth.
pub struct Interpreter<'s> {
	store: &'s mut Store,
	depth: u32,
	max_depth: u32,
}

impl<'s> Interpreter<'s> {
	pub fn new(store: &'s mut Store) -> Self {
		Self { store, depth: 0, max_depth: DEFAULT_MAX_CALL_DEPTH }
	}

	pub fn with_max_depth(store: &'s mut Store, max_depth: u32) -> Self {
		Self { store, depth: 0, max_depth }
	}

	/// Invokes `func_addr` with `args` on behalf of `caller_module` (the
	/// module instance making the call — used to resolve a host function's
	/// own memory/table/global access) and `caller_locals` (the calling
	/// frame's locals, empty when the call originates outside any WASM
	/// frame, e.g. the start function or a direct export invocation).
	/// Returns the callee's single result, or `None` for a function with no
	/// result type, per `spec.md` §6's "unit or single scalar" convention.
	pub fn call(
		&mut self,
		func_addr: FuncAddr,
		caller_module: ModuleAddr,
		caller_locals: &[Value],
		args: &[Value],
	) -> Result<Option<Value>, Trap> {
		if self.depth >= self.max_depth {
			return Err(Trap::CallStackExhausted { max_depth: self.max_depth });
		}
		self.depth += 1;
		let result = self.call_inner(func_addr, caller_module, caller_locals, args);
		self.depth -= 1;
		result
	}

	fn call_inner(
		&mut self,
		func_addr: FuncAddr,
		caller_module: ModuleAddr,
		caller_locals: &[Value],
		args: &[Value],
	) -> Result<Option<Value>, Trap> {
		// Cloning the function instance's shape out from under the shared
		// borrow keeps the store free for the body below to re-borrow
		// mutably (e.g. for memory/global access) without fighting the
		// borrow checker over one long-lived `&FuncInstance`.
		let (ty, module, code, host) = match self.store.func(func_addr) {
			FuncInstance::Local { ty, module, code } => {
				(ty.clone(), Some(*module), Some(code.clone()), None)
			}
			FuncInstance::Host { ty, func } => (ty.clone(), None, None, Some(func.clone())),
		};

		if let Some(host_fn) = host {
			return host_fn(self.store, caller_module, caller_locals, args);
		}

		let module = module.expect("local function always has a defining module");
		let code = code.expect("local function always has a body");
		let _span = debug_span!("call", func = tracing::field::debug(func_addr)).entered();

		let mut locals = args.to_vec();
		for (count, ty) in &code.locals {
			for _ in 0..*count {
				locals.push(Value::zero(*ty));
			}
		}

		let mut frame =
			Frame { module, locals, op_stack: Vec::new(), labels: Vec::new(), result_arity: ty.results.len() };

		match self.exec_instrs(&mut frame, &code.body)? {
			Flow::Normal | Flow::Return => {}
			Flow::Branch(_) => unreachable!("a function body cannot branch past its own end"),
		}

		Ok(frame.op_stack.pop())
	}

	fn exec_instrs(&mut self, frame: &mut Frame, body: &[Instruction]) -> Result<Flow, Trap> {
		for instr in body {
			match self.exec_instr(frame, instr)? {
				Flow::Normal => continue,
				other => return Ok(other),
			}
		}
		Ok(Flow::Normal)
	}

	fn exec_instr(&mut self, frame: &mut Frame, instr: &Instruction) -> Result<Flow, Trap> {
		trace!(?instr, "executing");
		let operand_snapshot: Vec<Value> = frame.op_stack.iter().rev().take(2).rev().copied().collect();
		self.exec_instr_inner(frame, instr).map_err(|e| match e {
			// Already carries the instruction that actually faulted; don't
			// relabel it with every enclosing call/block on the way back up.
			Trap::During { .. } => e,
			other => other.at(instr, operand_snapshot),
		})
	}

	fn exec_instr_inner(&mut self, frame: &mut Frame, instr: &Instruction) -> Result<Flow, Trap> {
		match instr {
			Instruction::Unreachable => return Err(Trap::Unreachable),
			Instruction::Nop => {}

			Instruction::Block { ty, body } => return self.exec_block(frame, *ty, body),
			Instruction::Loop { body, .. } => return self.exec_loop(frame, body),
			Instruction::If { ty, then_body, else_body } => {
				let cond = frame.pop()?.as_i32().expect("decoder guarantees i32 condition");
				let body = if cond != 0 { then_body } else { else_body };
				return self.exec_block(frame, *ty, body);
			}

			Instruction::Br(k) => return self.do_branch(frame, *k),
			Instruction::BrIf(k) => {
				let cond = frame.pop()?.as_i32().expect("decoder guarantees i32 condition");
				if cond != 0 {
					return self.do_branch(frame, *k);
				}
			}
			Instruction::BrTable { targets, default } => {
				let idx = frame.pop()?.as_i32().expect("decoder guarantees i32 index") as u32 as usize;
				let target = targets.get(idx).copied().unwrap_or(*default);
				return self.do_branch(frame, target);
			}
			Instruction::Return => {
				frame.unwind_to(0, frame.result_arity)?;
				return Ok(Flow::Return);
			}

			Instruction::Call(idx) => {
				let funcs = &self.store.module_instance(frame.module).funcs;
				let func_addr = *funcs
					.get(*idx as usize)
					.ok_or(Trap::FuncIndexOutOfBounds { index: *idx, len: funcs.len() })?;
				let ty = self.store.func(func_addr).ty().clone();
				let args = frame.pop_n(ty.params.len())?;
				if let Some(result) = self.call(func_addr, frame.module, &frame.locals, &args)? {
					frame.push(result);
				}
			}
			Instruction::CallIndirect { type_idx } => {
				let tables = &self.store.module_instance(frame.module).tables;
				let table_addr = *tables.first().ok_or(Trap::NoTable)?;
				let elem_idx = frame.pop()?.as_i32().expect("decoder guarantees i32 index") as u32 as usize;
				let table = self.store.table(table_addr);
				if elem_idx >= table.elements.len() {
					return Err(Trap::TableOutOfBounds { index: elem_idx as u32, table_len: table.elements.len() });
				}
				let func_addr = table.elements[elem_idx].ok_or(Trap::UninitializedElement { index: elem_idx as u32 })?;
				let types = &self.store.module_instance(frame.module).types;
				let expected = types
					.get(*type_idx as usize)
					.ok_or(Trap::TypeIndexOutOfBounds { index: *type_idx, len: types.len() })?
					.clone();
				let actual = self.store.func(func_addr).ty().clone();
				if !expected.matches(&actual) {
					return Err(Trap::IndirectCallTypeMismatch {
						expected: format!("{:?}", expected),
						actual: format!("{:?}", actual),
					});
				}
				let args = frame.pop_n(expected.params.len())?;
				if let Some(result) = self.call(func_addr, frame.module, &frame.locals, &args)? {
					frame.push(result);
				}
			}

			Instruction::Drop => {
				frame.pop()?;
			}
			Instruction::Select => {
				let cond = frame.pop()?.as_i32().expect("decoder guarantees i32 condition");
				let b = frame.pop()?;
				let a = frame.pop()?;
				frame.push(if cond != 0 { a } else { b });
			}

			Instruction::LocalGet(idx) => {
				let v = *frame
					.locals
					.get(*idx as usize)
					.ok_or(Trap::LocalIndexOutOfBounds { index: *idx, len: frame.locals.len() })?;
				frame.push(v);
			}
			Instruction::LocalSet(idx) => {
				let v = frame.pop()?;
				let len = frame.locals.len();
				let slot =
					frame.locals.get_mut(*idx as usize).ok_or(Trap::LocalIndexOutOfBounds { index: *idx, len })?;
				*slot = v;
			}
			Instruction::LocalTee(idx) => {
				let v = frame.pop()?;
				let len = frame.locals.len();
				let slot =
					frame.locals.get_mut(*idx as usize).ok_or(Trap::LocalIndexOutOfBounds { index: *idx, len })?;
				*slot = v;
				frame.push(v);
			}
			Instruction::GlobalGet(idx) => {
				let globals = &self.store.module_instance(frame.module).globals;
				let addr = *globals
					.get(*idx as usize)
					.ok_or(Trap::GlobalIndexOutOfBounds { index: *idx, len: globals.len() })?;
				frame.push(self.store.global(addr).value);
			}
			Instruction::GlobalSet(idx) => {
				let globals = &self.store.module_instance(frame.module).globals;
				let addr = *globals
					.get(*idx as usize)
					.ok_or(Trap::GlobalIndexOutOfBounds { index: *idx, len: globals.len() })?;
				if !self.store.global(addr).ty.mutable {
					return Err(Trap::ImmutableGlobal { index: *idx });
				}
				let v = frame.pop()?;
				self.store.global_mut(addr).value = v;
			}

			Instruction::Load { kind, memarg } => self.exec_load(frame, *kind, *memarg)?,
			Instruction::Store { kind, memarg } => self.exec_store(frame, *kind, *memarg)?,
			Instruction::MemorySize => {
				let addr = *self.store.module_instance(frame.module).memories.first().ok_or(Trap::NoMemory)?;
				frame.push(Value::from(self.store.memory(addr).size_pages()));
			}
			Instruction::MemoryGrow => {
				let addr = *self.store.module_instance(frame.module).memories.first().ok_or(Trap::NoMemory)?;
				let delta = frame.pop()?.as_u32().expect("decoder guarantees i32 operand");
				let result = self.store.memory_mut(addr).grow(delta).map(|n| n as i32).unwrap_or(-1);
				frame.push(Value::from(result));
			}

			Instruction::Const(v) => frame.push(*v),
			Instruction::IntOp(kind, op) => {
				let n = if matches!(op, crate::parse::IntOp::Clz | crate::parse::IntOp::Ctz | crate::parse::IntOp::Popcnt | crate::parse::IntOp::Eqz) { 1 } else { 2 };
				let operands = frame.pop_n(n)?;
				frame.push(eval_int_op(*kind, *op, &operands)?);
			}
			Instruction::FloatOp(kind, op) => {
				let n = if is_unary_float_op(*op) { 1 } else { 2 };
				let operands = frame.pop_n(n)?;
				frame.push(eval_float_op(*kind, *op, &operands)?);
			}
			Instruction::Cvt(op) => {
				let operand = frame.pop()?;
				frame.push(eval_cvt_op(*op, operand)?);
			}
		}
		Ok(Flow::Normal)
	}

	fn exec_block(&mut self, frame: &mut Frame, ty: BlockType, body: &[Instruction]) -> Result<Flow, Trap> {
		frame.labels.push(LabelFrame { stack_height: frame.op_stack.len(), arity: ty.result_arity() });
		let flow = self.exec_instrs(frame, body)?;
		frame.labels.pop();
		Ok(match flow {
			Flow::Branch(0) => Flow::Normal,
			Flow::Branch(n) => Flow::Branch(n - 1),
			other => other,
		})
	}

	fn exec_loop(&mut self, frame: &mut Frame, body: &[Instruction]) -> Result<Flow, Trap> {
		loop {
			// A loop's label arity for branch-to-start purposes is always 0
			// in WASM 1.0 (blocktypes carry no parameter list), regardless
			// of the loop's own result type.
			frame.labels.push(LabelFrame { stack_height: frame.op_stack.len(), arity: 0 });
			let flow = self.exec_instrs(frame, body)?;
			frame.labels.pop();
			match flow {
				Flow::Branch(0) => continue,
				Flow::Branch(n) => return Ok(Flow::Branch(n - 1)),
				Flow::Return => return Ok(Flow::Return),
				Flow::Normal => return Ok(Flow::Normal),
			}
		}
	}

	fn do_branch(&mut self, frame: &mut Frame, k: u32) -> Result<Flow, Trap> {
		let label_idx = frame.labels.len().checked_sub(1 + k as usize).ok_or(Trap::OperandStackUnderflow)?;
		let (height, arity) = {
			let label = &frame.labels[label_idx];
			(label.stack_height, label.arity)
		};
		frame.unwind_to(height, arity)?;
		Ok(Flow::Branch(k))
	}

	fn exec_load(&mut self, frame: &mut Frame, kind: LoadKind, memarg: crate::parse::MemArg) -> Result<(), Trap> {
		let mem_addr = *self.store.module_instance(frame.module).memories.first().ok_or(Trap::NoMemory)?;
		let base = frame.pop()?.as_u32().expect("decoder guarantees i32 address");
		let (width, load): (u32, fn(&[u8]) -> Value) = match kind {
			LoadKind::I32 => (4, |b| Value::from(i32::from_le_bytes(b.try_into().unwrap()))),
			LoadKind::I64 => (8, |b| Value::from(i64::from_le_bytes(b.try_into().unwrap()))),
			LoadKind::F32 => (4, |b| Value::from(f32::from_le_bytes(b.try_into().unwrap()))),
			LoadKind::F64 => (8, |b| Value::from(f64::from_le_bytes(b.try_into().unwrap()))),
			LoadKind::I32_8S => (1, |b| Value::from(b[0] as i8 as i32)),
			LoadKind::I32_8U => (1, |b| Value::from(b[0] as u32)),
			LoadKind::I32_16S => (2, |b| Value::from(i16::from_le_bytes(b.try_into().unwrap()) as i32)),
			LoadKind::I32_16U => (2, |b| Value::from(u16::from_le_bytes(b.try_into().unwrap()) as u32)),
			LoadKind::I64_8S => (1, |b| Value::from(b[0] as i8 as i64)),
			LoadKind::I64_8U => (1, |b| Value::from(b[0] as u64)),
			LoadKind::I64_16S => (2, |b| Value::from(i16::from_le_bytes(b.try_into().unwrap()) as i64)),
			LoadKind::I64_16U => (2, |b| Value::from(u16::from_le_bytes(b.try_into().unwrap()) as u64)),
			LoadKind::I64_32S => (4, |b| Value::from(i32::from_le_bytes(b.try_into().unwrap()) as i64)),
			LoadKind::I64_32U => (4, |b| Value::from(u32::from_le_bytes(b.try_into().unwrap()) as u64)),
		};
		let addr = (base as u64) + (memarg.offset as u64);
		let mem = self.store.memory(mem_addr);
		let end = addr + width as u64;
		if end > mem.data.len() as u64 {
			return Err(Trap::MemoryOutOfBounds { addr, size: width, mem_len: mem.data.len() });
		}
		let bytes = &mem.data[addr as usize..end as usize];
		frame.push(load(bytes));
		Ok(())
	}

	fn exec_store(&mut self, frame: &mut Frame, kind: StoreKind, memarg: crate::parse::MemArg) -> Result<(), Trap> {
		let mem_addr = *self.store.module_instance(frame.module).memories.first().ok_or(Trap::NoMemory)?;
		let value = frame.pop()?;
		let base = frame.pop()?.as_u32().expect("decoder guarantees i32 address");
		let (width, bytes): (u32, Vec<u8>) = match kind {
			StoreKind::I32 => (4, value.as_u32().unwrap().to_le_bytes().to_vec()),
			StoreKind::I64 => (8, value.as_u64().unwrap().to_le_bytes().to_vec()),
			StoreKind::F32 => (4, value.as_f32().unwrap().to_le_bytes().to_vec()),
			StoreKind::F64 => (8, value.as_f64().unwrap().to_le_bytes().to_vec()),
			StoreKind::I32_8 => (1, vec![value.as_u32().unwrap() as u8]),
			StoreKind::I32_16 => (2, (value.as_u32().unwrap() as u16).to_le_bytes().to_vec()),
			StoreKind::I64_8 => (1, vec![value.as_u64().unwrap() as u8]),
			StoreKind::I64_16 => (2, (value.as_u64().unwrap() as u16).to_le_bytes().to_vec()),
			StoreKind::I64_32 => (4, (value.as_u64().unwrap() as u32).to_le_bytes().to_vec()),
		};
		let addr = (base as u64) + (memarg.offset as u64);
		let mem = self.store.memory_mut(mem_addr);
		let end = addr + width as u64;
		if end > mem.data.len() as u64 {
			return Err(Trap::MemoryOutOfBounds { addr, size: width, mem_len: mem.data.len() });
		}
		mem.data[addr as usize..end as usize].copy_from_slice(&bytes);
		Ok(())
	}
}

fn is_unary_float_op(op: crate::parse::FloatOp) -> bool {
	use crate::parse::FloatOp::*;
	matches!(op, Abs | Neg | Ceil | Floor | Trunc | Nearest | Sqrt)
}

/// Evaluates a constant expression — the restricted instruction subset
/// (`const` and `global.get` of an already-initialized global) that global
/// initializers and element/data segment offsets are written in, per
/// `spec.md` §4.4. Never calls into [`Interpreter`], since constant
/// expressions by definition cannot call functions, branch, or touch
/// memory.
pub fn eval_const_expr(instrs: &[Instruction], globals: &[GlobalAddr], store: &Store) -> Result<Value, Trap> {
	let mut stack = Vec::new();
	for instr in instrs {
		match instr {
			Instruction::Const(v) => stack.push(*v),
			Instruction::GlobalGet(idx) => {
				let addr = *globals.get(*idx as usize).ok_or(Trap::OperandStackUnderflow)?;
				stack.push(store.global(addr).value);
			}
			_ => return Err(Trap::Unreachable),
		}
	}
	stack.pop().ok_or(Trap::OperandStackUnderflow)
}
