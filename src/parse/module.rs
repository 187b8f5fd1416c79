use crate::parse::instruction::Instruction;
use crate::parse::types::{Export, FunctionType, GlobalType, Import, Limits, TableType};

/// A function body as decoded from the code section: its declared local
/// slots (beyond its parameters, preserved as `(count, type)` runs the way
/// the binary format itself groups them) and its instruction list.
#[derive(Debug, Clone)]
pub struct Code {
	pub locals: Vec<(u32, crate::parse::types::ValType)>,
	pub body: Vec<Instruction>,
}

/// One local function: its resolved type index and decoded body. Imported
/// functions are represented separately, as `Import` entries — a
/// [`ParsedModule`] never synthesizes a placeholder `Function` for an
/// import the way the teacher's WIP code did.
#[derive(Debug, Clone)]
pub struct Function {
	pub type_idx: u32,
	pub code: Code,
}

#[derive(Debug, Clone)]
pub struct Global {
	pub ty: GlobalType,
	pub init: Vec<Instruction>,
}

/// An active element segment: table 0 only, per the MVP binary format and
/// `spec.md`'s "canonical spec only defines funcref at MVP" resolution.
#[derive(Debug, Clone)]
pub struct ElementSegment {
	pub offset: Vec<Instruction>,
	pub func_indices: Vec<u32>,
}

/// An active data segment: memory 0 only, per the MVP binary format.
#[derive(Debug, Clone)]
pub struct DataSegment {
	pub offset: Vec<Instruction>,
	pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct CustomSection {
	pub name: String,
	pub bytes: Vec<u8>,
}

/// The output of [`crate::parse::decoder::Decoder`]: a module description
/// with every section's content in its native typed form. Nothing here is
/// executable on its own — [`crate::exec::link`] turns it into runtime
/// entities inside a [`crate::exec::Store`].
#[derive(Debug, Clone, Default)]
pub struct ParsedModule {
	pub types: Vec<FunctionType>,
	pub imports: Vec<Import>,
	/// Type index for each locally defined function, in declaration order
	/// (parallel to `code`, checked equal in length at decode time).
	pub function_type_indices: Vec<u32>,
	pub tables: Vec<TableType>,
	pub memories: Vec<Limits>,
	pub globals: Vec<Global>,
	pub exports: Vec<Export>,
	pub start: Option<u32>,
	pub elements: Vec<ElementSegment>,
	pub code: Vec<Code>,
	pub data: Vec<DataSegment>,
	pub customs: Vec<CustomSection>,
}

impl ParsedModule {
	/// Local functions paired with their resolved type, in declaration
	/// order. The funcidx space places imported functions first, so a
	/// caller mapping these back to `funcidx` must offset by
	/// `imports.iter().filter(|i| matches!(i.desc, ImportDesc::Func(_))).count()`.
	pub fn functions(&self) -> impl Iterator<Item = Function> + '_ {
		self.function_type_indices
			.iter()
			.zip(self.code.iter())
			.map(|(&type_idx, code)| Function { type_idx, code: code.clone() })
	}
}
