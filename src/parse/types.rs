use num_enum::TryFromPrimitive;

/// <https://webassembly.github.io/spec/core/binary/modules.html#sections>
#[derive(Eq, PartialEq, Debug, Clone, Copy, TryFromPrimitive)]
#[repr(u8)]
pub enum SectionId {
	Custom = 0,
	Type = 1,
	Import = 2,
	Function = 3,
	Table = 4,
	Memory = 5,
	Global = 6,
	Export = 7,
	Start = 8,
	Element = 9,
	Code = 10,
	Data = 11,
	DataCount = 12,
}

/// <https://webassembly.github.io/spec/core/binary/types.html#value-types>
#[derive(Eq, PartialEq, Debug, Clone, Copy, TryFromPrimitive)]
#[repr(u8)]
pub enum ValType {
	I32 = 0x7F,
	I64 = 0x7E,
	F32 = 0x7D,
	F64 = 0x7C,
}

/// The element type of a table. WASM 1.0 only has `funcref`; `externref`
/// exists in the binary encoding of later reference-types proposals and is
/// rejected here as a Non-goal.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum RefType {
	FuncRef,
}

/// A blocktype as it can appear in the MVP binary format: either empty or a
/// single result value type. Indexed (multi-value) blocktypes are a
/// Non-goal.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum BlockType {
	Empty,
	Value(ValType),
}

impl BlockType {
	/// The block's result arity, for restoring the operand stack on exit.
	pub fn result_arity(&self) -> usize {
		match self {
			BlockType::Empty => 0,
			BlockType::Value(_) => 1,
		}
	}

	pub fn result_type(&self) -> Option<ValType> {
		match self {
			BlockType::Empty => None,
			BlockType::Value(v) => Some(*v),
		}
	}
}

#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct FunctionType {
	pub params: Vec<ValType>,
	pub results: Vec<ValType>,
}

impl FunctionType {
	/// Structural equality used by `call_indirect` to check a table slot's
	/// function type against the expected type at the call site.
	pub fn matches(&self, other: &FunctionType) -> bool {
		self.params == other.params && self.results == other.results
	}
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct Limits {
	pub min: u32,
	pub max: Option<u32>,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct TableType {
	pub elem: RefType,
	pub limits: Limits,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct GlobalType {
	pub val_type: ValType,
	pub mutable: bool,
}

/// <https://webassembly.github.io/spec/core/binary/modules.html#export-section>
#[derive(Eq, PartialEq, Debug, Clone, Copy, TryFromPrimitive)]
#[repr(u8)]
pub enum ExternalKind {
	Func = 0x00,
	Table = 0x01,
	Memory = 0x02,
	Global = 0x03,
}

#[derive(Debug, Clone)]
pub struct Import {
	pub module: String,
	pub name: String,
	pub desc: ImportDesc,
}

#[derive(Debug, Clone)]
pub enum ImportDesc {
	Func(u32),
	Table(TableType),
	Memory(Limits),
	Global(GlobalType),
}

impl ImportDesc {
	pub fn kind(&self) -> ExternalKind {
		match self {
			ImportDesc::Func(_) => ExternalKind::Func,
			ImportDesc::Table(_) => ExternalKind::Table,
			ImportDesc::Memory(_) => ExternalKind::Memory,
			ImportDesc::Global(_) => ExternalKind::Global,
		}
	}
}

#[derive(Debug, Clone)]
pub struct Export {
	pub name: String,
	pub kind: ExternalKind,
	pub index: u32,
}
