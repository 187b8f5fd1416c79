use crate::exec::Value;
use crate::parse::types::BlockType;

/// The three families numeric opcodes fall into, keyed by `(kind, op)`
/// rather than given one enum variant per opcode — `i32.add` and `i64.add`
/// are the same shape at a different width, so the width is data, not a
/// type. See the numeric evaluator in [`crate::exec::numeric`].
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum NumKind {
	I32,
	I64,
	F32,
	F64,
}

impl NumKind {
	pub fn is_float(self) -> bool {
		matches!(self, NumKind::F32 | NumKind::F64)
	}

	pub fn bits(self) -> u32 {
		match self {
			NumKind::I32 | NumKind::F32 => 32,
			NumKind::I64 | NumKind::F64 => 64,
		}
	}
}

/// Integer unary/binary/test/relation operators, valid for both `i32` and
/// `i64` kinds.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum IntOp {
	Clz,
	Ctz,
	Popcnt,
	Add,
	Sub,
	Mul,
	DivS,
	DivU,
	RemS,
	RemU,
	And,
	Or,
	Xor,
	Shl,
	ShrS,
	ShrU,
	Rotl,
	Rotr,
	Eqz,
	Eq,
	Ne,
	LtS,
	LtU,
	GtS,
	GtU,
	LeS,
	LeU,
	GeS,
	GeU,
}

/// Float unary/binary/relation operators, valid for both `f32` and `f64`
/// kinds.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum FloatOp {
	Abs,
	Neg,
	Ceil,
	Floor,
	Trunc,
	Nearest,
	Sqrt,
	Add,
	Sub,
	Mul,
	Div,
	Min,
	Max,
	Copysign,
	Eq,
	Ne,
	Lt,
	Gt,
	Le,
	Ge,
}

/// Conversion and reinterpretation opcodes. Unlike [`IntOp`]/[`FloatOp`],
/// each variant here fixes both its source and destination width/kind
/// directly — a trunc or convert's destination isn't recoverable from the
/// popped operand the way a binary op's operand kind is, so there is one
/// variant per actual opcode rather than a `(kind, op)` pair.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum CvtOp {
	I32WrapI64,
	I32TruncF32S,
	I32TruncF32U,
	I32TruncF64S,
	I32TruncF64U,
	I64ExtendI32S,
	I64ExtendI32U,
	I64TruncF32S,
	I64TruncF32U,
	I64TruncF64S,
	I64TruncF64U,
	F32ConvertI32S,
	F32ConvertI32U,
	F32ConvertI64S,
	F32ConvertI64U,
	F32DemoteF64,
	F64ConvertI32S,
	F64ConvertI32U,
	F64ConvertI64S,
	F64ConvertI64U,
	F64PromoteF32,
	I32ReinterpretF32,
	I64ReinterpretF64,
	F32ReinterpretI32,
	F64ReinterpretI64,
	I32Extend8S,
	I32Extend16S,
	I64Extend8S,
	I64Extend16S,
	I64Extend32S,
}

/// Every load opcode, distinguishing the loaded width and, for narrow loads
/// into a wider destination, the sign extension to apply.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum LoadKind {
	I32,
	I64,
	F32,
	F64,
	I32_8S,
	I32_8U,
	I32_16S,
	I32_16U,
	I64_8S,
	I64_8U,
	I64_16S,
	I64_16U,
	I64_32S,
	I64_32U,
}

/// Every store opcode, distinguishing the stored width (a narrow store
/// wraps its operand down before writing).
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum StoreKind {
	I32,
	I64,
	F32,
	F64,
	I32_8,
	I32_16,
	I64_8,
	I64_16,
	I64_32,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub struct MemArg {
	pub align: u32,
	pub offset: u32,
}

/// Parsed instructions that can appear inside function bodies and constant
/// (initializer) expressions.
///
/// Block-structured instructions own their nested instruction lists
/// directly, matching how the decoder reads them: there is no separate
/// "end marker" instruction left in the tree once decoding finishes.
#[derive(PartialEq, Debug, Clone)]
pub enum Instruction {
	Unreachable,
	Nop,
	Block { ty: BlockType, body: Vec<Instruction> },
	Loop { ty: BlockType, body: Vec<Instruction> },
	If { ty: BlockType, then_body: Vec<Instruction>, else_body: Vec<Instruction> },
	Br(u32),
	BrIf(u32),
	BrTable { targets: Vec<u32>, default: u32 },
	Return,
	Call(u32),
	CallIndirect { type_idx: u32 },

	Drop,
	Select,

	LocalGet(u32),
	LocalSet(u32),
	LocalTee(u32),
	GlobalGet(u32),
	GlobalSet(u32),

	Load { kind: LoadKind, memarg: MemArg },
	Store { kind: StoreKind, memarg: MemArg },
	MemorySize,
	MemoryGrow,

	Const(Value),
	IntOp(NumKind, IntOp),
	FloatOp(NumKind, FloatOp),
	Cvt(CvtOp),
}
