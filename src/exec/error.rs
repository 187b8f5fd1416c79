use thiserror::Error;

use crate::exec::Value;
use crate::parse::Instruction;

/// Raised during instantiation when imports cannot be reconciled or a
/// declared allocation's limits are self-contradictory. Reported to the
/// caller of `instantiate`.
#[derive(Debug, Error)]
pub enum LinkError {
	#[error("module {module:?} has no export named {name:?}")]
	ImportMissing { module: String, name: String },

	#[error("import {module}.{name} expected a {expected}, but the host supplied a {got}")]
	ImportKindMismatch { module: String, name: String, expected: &'static str, got: &'static str },

	#[error("import {module}.{name} expected function type {expected:?}, but the host supplied {got:?}")]
	ImportSignatureMismatch { module: String, name: String, expected: String, got: String },

	#[error("table import {module}.{name} requires min {required_min}, host table has min {actual_min}")]
	ImportLimitsMismatch { module: String, name: String, required_min: u32, actual_min: u32 },

	#[error("limits min {min} exceeds max {max}")]
	InvalidLimits { min: u32, max: u32 },

	#[error("global initializer is not a valid constant expression: {0}")]
	InvalidGlobalInitializer(String),

	#[error(transparent)]
	Trap(#[from] Trap),
}

/// A non-resumable execution failure that unwinds the current invocation,
/// per `spec.md` §7. Carries the faulting instruction (when there is one —
/// a trap triggered by instantiation's element/data/start step may not have
/// a single offending instruction) and a snapshot of the operands involved.
#[derive(Debug, Error)]
pub enum Trap {
	#[error("unreachable instruction executed")]
	Unreachable,

	#[error("integer division by zero")]
	DivideByZero,

	#[error("signed integer overflow in division")]
	IntegerOverflow,

	#[error("integer overflow converting float to integer")]
	TruncOverflow,

	#[error("out-of-bounds memory access at {addr}, size {size}, memory length {mem_len}")]
	MemoryOutOfBounds { addr: u64, size: u32, mem_len: usize },

	#[error("out-of-bounds table access at index {index}, table length {table_len}")]
	TableOutOfBounds { index: u32, table_len: usize },

	#[error("call_indirect target at index {index} has no function assigned")]
	UninitializedElement { index: u32 },

	#[error("call_indirect signature mismatch: expected {expected:?}, table holds {actual:?}")]
	IndirectCallTypeMismatch { expected: String, actual: String },

	#[error("global {index} is immutable")]
	ImmutableGlobal { index: u32 },

	#[error("call stack exhausted (exceeded depth {max_depth})")]
	CallStackExhausted { max_depth: u32 },

	#[error("operand stack unexpectedly empty")]
	OperandStackUnderflow,

	#[error("element segment write at offset {offset} length {len} overflows table of length {table_len}")]
	ElementSegmentOutOfBounds { offset: u32, len: usize, table_len: usize },

	#[error("data segment write at offset {offset} length {len} overflows memory of length {mem_len}")]
	DataSegmentOutOfBounds { offset: u32, len: usize, mem_len: usize },

	#[error("no function is exported with name {0:?}")]
	NoSuchExport(String),

	#[error("export {name:?} is not a function")]
	ExportNotCallable { name: String },

	#[error("call argument count/type mismatch calling {name:?}: expected {expected:?}, got {got:?}")]
	ArgumentMismatch { name: String, expected: String, got: String },

	#[error("function index {index} out of bounds (module has {len} functions)")]
	FuncIndexOutOfBounds { index: u32, len: usize },

	#[error("type index {index} out of bounds (module has {len} types)")]
	TypeIndexOutOfBounds { index: u32, len: usize },

	#[error("global index {index} out of bounds (module has {len} globals)")]
	GlobalIndexOutOfBounds { index: u32, len: usize },

	#[error("local index {index} out of bounds (frame has {len} locals)")]
	LocalIndexOutOfBounds { index: u32, len: usize },

	#[error("instruction requires a table, but the module has none")]
	NoTable,

	#[error("instruction requires a memory, but the module has none")]
	NoMemory,

	#[error("trap during instruction {instruction:?} (operands {operands:?}): {source}")]
	During { instruction: Box<Instruction>, operands: Vec<Value>, #[source] source: Box<Trap> },
}

impl Trap {
	/// Attaches the instruction that was executing, and the top of the
	/// operand stack at the time, to `self` — the "faulting instruction
	/// identity and operand snapshot" `spec.md` §7 asks traps to carry.
	pub fn at(self, instruction: &Instruction, operands: Vec<Value>) -> Trap {
		Trap::During { instruction: Box::new(instruction.clone()), operands, source: Box::new(self) }
	}
}
