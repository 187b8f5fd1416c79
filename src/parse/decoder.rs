use std::io::Read;

use tracing::{debug, trace, warn};

use crate::codec::ByteReader;
use crate::exec::Value;
use crate::parse::error::ParseError;
use crate::parse::instruction::{
	CvtOp, FloatOp, Instruction, IntOp, LoadKind, MemArg, NumKind, StoreKind,
};
use crate::parse::module::{Code, CustomSection, DataSegment, ElementSegment, Global, ParsedModule};
use crate::parse::types::{
	BlockType, Export, ExternalKind, FunctionType, GlobalType, Import, ImportDesc, Limits, RefType,
	SectionId, TableType, ValType,
};

const MAGIC: [u8; 4] = [0x00, 0x61, 0x73, 0x6D];
const VERSION: [u8; 4] = [0x01, 0x00, 0x00, 0x00];

/// Decodes a `.wasm` byte stream into a [`ParsedModule`]. One [`Decoder`] is
/// used for a single module; `decode_module` is the entry point.
pub struct Decoder<R> {
	reader: ByteReader<R>,
}

pub fn decode_module(bytes: impl Read) -> Result<ParsedModule, ParseError> {
	Decoder::new(bytes).decode()
}

impl<R: Read> Decoder<R> {
	fn new(bytes: R) -> Self {
		Self { reader: ByteReader::new(bytes) }
	}

	fn decode(mut self) -> Result<ParsedModule, ParseError> {
		let magic = self.reader.read_array::<4>()?;
		if magic != MAGIC {
			return Err(ParseError::BadMagic);
		}
		let version = self.reader.read_array::<4>()?;
		if version != VERSION {
			return Err(ParseError::UnsupportedVersion(version));
		}

		let mut module = ParsedModule::default();
		let mut seen = [false; 13];

		loop {
			let id = match self.reader.read_u8() {
				Ok(id) => id,
				Err(ParseError::UnexpectedEof) => break,
				Err(e) => return Err(e),
			};
			let size = self.reader.read_u32_leb()? as u64;
			let mut section = self.reader.bounded(size);

			if id != SectionId::Custom as u8 {
				if let Some(slot) = seen.get_mut(id as usize) {
					if *slot {
						return Err(ParseError::DuplicateSection { id });
					}
					*slot = true;
				}
			}

			match SectionId::try_from(id) {
				Ok(SectionId::Custom) => {
					let name = section.read_name()?;
					let consumed = section.bytes_consumed();
					let bytes = section.read_bytes((size - consumed) as usize)?;
					trace!(name, bytes = bytes.len(), "decoded custom section");
					module.customs.push(CustomSection { name, bytes });
				}
				Ok(SectionId::Type) => {
					module.types = decode_type_section(&mut section)?;
					debug!(count = module.types.len(), "decoded type section");
				}
				Ok(SectionId::Import) => {
					module.imports = decode_import_section(&mut section)?;
					debug!(count = module.imports.len(), "decoded import section");
				}
				Ok(SectionId::Function) => {
					module.function_type_indices = section.read_vec(|r| r.read_u32_leb())?;
					debug!(count = module.function_type_indices.len(), "decoded function section");
				}
				Ok(SectionId::Table) => {
					module.tables = section.read_vec(decode_table_type)?;
					debug!(count = module.tables.len(), "decoded table section");
				}
				Ok(SectionId::Memory) => {
					module.memories = section.read_vec(decode_limits)?;
					debug!(count = module.memories.len(), "decoded memory section");
				}
				Ok(SectionId::Global) => {
					module.globals = section.read_vec(|r| decode_global(r))?;
					debug!(count = module.globals.len(), "decoded global section");
				}
				Ok(SectionId::Export) => {
					module.exports = section.read_vec(decode_export)?;
					debug!(count = module.exports.len(), "decoded export section");
				}
				Ok(SectionId::Start) => {
					module.start = Some(section.read_u32_leb()?);
					debug!(start = module.start, "decoded start section");
				}
				Ok(SectionId::Element) => {
					module.elements = section.read_vec(decode_element)?;
					debug!(count = module.elements.len(), "decoded element section");
				}
				Ok(SectionId::Code) => {
					module.code = section.read_vec(decode_code)?;
					debug!(count = module.code.len(), "decoded code section");
				}
				Ok(SectionId::Data) => {
					module.data = section.read_vec(decode_data)?;
					debug!(count = module.data.len(), "decoded data section");
				}
				Ok(SectionId::DataCount) => {
					// Decoded and discarded: it has no runtime-observable
					// effect for an interpreter that does not implement
					// bulk-memory's validation-time data-count check.
					let _count = section.read_u32_leb()?;
				}
				Err(_) => {
					warn!(id, "skipping unknown section id");
					while !section.at_limit() {
						section.read_u8()?;
					}
				}
			}
		}

		if module.function_type_indices.len() != module.code.len() {
			return Err(ParseError::FunctionCodeCountMismatch {
				functions: module.function_type_indices.len(),
				code: module.code.len(),
			});
		}

		Ok(module)
	}
}

fn decode_valtype<R: Read>(r: &mut ByteReader<R>) -> Result<ValType, ParseError> {
	let byte = r.read_u8()?;
	ValType::try_from(byte).map_err(|_| ParseError::InvalidValType(byte))
}

fn decode_blocktype<R: Read>(r: &mut ByteReader<R>) -> Result<BlockType, ParseError> {
	let byte = r.read_u8()?;
	if byte == 0x40 {
		return Ok(BlockType::Empty);
	}
	ValType::try_from(byte)
		.map(BlockType::Value)
		.map_err(|_| ParseError::InvalidBlockType(byte))
}

fn decode_function_type<R: Read>(r: &mut ByteReader<R>) -> Result<FunctionType, ParseError> {
	const FUNC_TAG: u8 = 0x60;
	let tag = r.read_u8()?;
	if tag != FUNC_TAG {
		return Err(ParseError::InvalidBlockType(tag));
	}
	let params = r.read_vec(decode_valtype)?;
	let results = r.read_vec(decode_valtype)?;
	Ok(FunctionType { params, results })
}

fn decode_type_section<R: Read>(r: &mut ByteReader<R>) -> Result<Vec<FunctionType>, ParseError> {
	r.read_vec(decode_function_type)
}

fn decode_limits<R: Read>(r: &mut ByteReader<R>) -> Result<Limits, ParseError> {
	let flag = r.read_u8()?;
	match flag {
		0x00 => Ok(Limits { min: r.read_u32_leb()?, max: None }),
		0x01 => {
			let min = r.read_u32_leb()?;
			let max = r.read_u32_leb()?;
			Ok(Limits { min, max: Some(max) })
		}
		other => Err(ParseError::InvalidLimitsFlag(other)),
	}
}

fn decode_table_type<R: Read>(r: &mut ByteReader<R>) -> Result<TableType, ParseError> {
	const FUNCREF: u8 = 0x70;
	let elem_byte = r.read_u8()?;
	if elem_byte != FUNCREF {
		return Err(ParseError::InvalidBlockType(elem_byte));
	}
	let limits = decode_limits(r)?;
	Ok(TableType { elem: RefType::FuncRef, limits })
}

fn decode_global_type<R: Read>(r: &mut ByteReader<R>) -> Result<GlobalType, ParseError> {
	let val_type = decode_valtype(r)?;
	let mutable = match r.read_u8()? {
		0x00 => false,
		0x01 => true,
		other => return Err(ParseError::InvalidLimitsFlag(other)),
	};
	Ok(GlobalType { val_type, mutable })
}

fn decode_global<R: Read>(r: &mut ByteReader<R>) -> Result<Global, ParseError> {
	let ty = decode_global_type(r)?;
	let init = decode_expr(r)?;
	Ok(Global { ty, init })
}

fn decode_export_kind<R: Read>(r: &mut ByteReader<R>) -> Result<ExternalKind, ParseError> {
	let byte = r.read_u8()?;
	ExternalKind::try_from(byte).map_err(|_| ParseError::InvalidExportKind(byte))
}

fn decode_export<R: Read>(r: &mut ByteReader<R>) -> Result<Export, ParseError> {
	let name = r.read_name()?;
	let kind = decode_export_kind(r)?;
	let index = r.read_u32_leb()?;
	Ok(Export { name, kind, index })
}

fn decode_import<R: Read>(r: &mut ByteReader<R>) -> Result<Import, ParseError> {
	let module = r.read_name()?;
	let name = r.read_name()?;
	let kind_byte = r.read_u8()?;
	let desc = match kind_byte {
		0x00 => ImportDesc::Func(r.read_u32_leb()?),
		0x01 => ImportDesc::Table(decode_table_type(r)?),
		0x02 => ImportDesc::Memory(decode_limits(r)?),
		0x03 => ImportDesc::Global(decode_global_type(r)?),
		other => return Err(ParseError::InvalidImportKind(other)),
	};
	Ok(Import { module, name, desc })
}

fn decode_import_section<R: Read>(r: &mut ByteReader<R>) -> Result<Vec<Import>, ParseError> {
	r.read_vec(decode_import)
}

/// A constant expression, terminated by `0x0B`. Used for global
/// initializers and segment offsets; both are restricted by `spec.md` §4.4
/// to a handful of opcodes, but the decoder accepts any instruction stream
/// here and leaves enforcement of "only constant instructions" to the
/// restricted evaluator in `exec::link`.
fn decode_expr<R: Read>(r: &mut ByteReader<R>) -> Result<Vec<Instruction>, ParseError> {
	decode_instructions(r)
}

fn decode_element<R: Read>(r: &mut ByteReader<R>) -> Result<ElementSegment, ParseError> {
	let table_index = r.read_u32_leb()?;
	if table_index != 0 {
		return Err(ParseError::MultipleNotSupported { kind: "table", index: table_index });
	}
	let offset = decode_expr(r)?;
	let func_indices = r.read_vec(|r| r.read_u32_leb())?;
	Ok(ElementSegment { offset, func_indices })
}

fn decode_data<R: Read>(r: &mut ByteReader<R>) -> Result<DataSegment, ParseError> {
	let mem_index = r.read_u32_leb()?;
	if mem_index != 0 {
		return Err(ParseError::MultipleNotSupported { kind: "memory", index: mem_index });
	}
	let offset = decode_expr(r)?;
	let len = r.read_u32_leb()? as usize;
	let bytes = r.read_bytes(len)?;
	Ok(DataSegment { offset, bytes })
}

fn decode_code<R: Read>(r: &mut ByteReader<R>) -> Result<Code, ParseError> {
	let body_size = r.read_u32_leb()? as u64;
	let mut body_reader = r.bounded(body_size);
	let locals = body_reader.read_vec(|r| {
		let count = r.read_u32_leb()?;
		let ty = decode_valtype(r)?;
		Ok((count, ty))
	})?;
	let body = decode_instructions(&mut body_reader)?;
	Ok(Code { locals, body })
}

fn decode_memarg<R: Read>(r: &mut ByteReader<R>) -> Result<MemArg, ParseError> {
	Ok(MemArg { align: r.read_u32_leb()?, offset: r.read_u32_leb()? })
}

/// Reads instructions up to (and consuming) a terminating `0x0B` ("end"),
/// recursing into nested blocks. Returns the instruction list without the
/// terminator. Used both for top-level function bodies/expressions and,
/// recursively, for the bodies of `block`/`loop`/`if`.
fn decode_instructions<R: Read>(r: &mut ByteReader<R>) -> Result<Vec<Instruction>, ParseError> {
	let mut out = Vec::new();
	loop {
		let opcode = r.read_u8()?;
		if opcode == 0x0B {
			return Ok(out);
		}
		out.push(decode_one_instruction(r, opcode)?);
	}
}

/// Like [`decode_instructions`] but also stops at `0x05` ("else"), which
/// only ever appears inside an `if`'s then-branch. Returns the instructions
/// plus whether an else-branch follows (the terminator consumed was `0x05`
/// rather than `0x0B`).
fn decode_if_then<R: Read>(r: &mut ByteReader<R>) -> Result<(Vec<Instruction>, bool), ParseError> {
	let mut out = Vec::new();
	loop {
		let opcode = r.read_u8()?;
		match opcode {
			0x0B => return Ok((out, false)),
			0x05 => return Ok((out, true)),
			_ => out.push(decode_one_instruction(r, opcode)?),
		}
	}
}

fn decode_one_instruction<R: Read>(r: &mut ByteReader<R>, opcode: u8) -> Result<Instruction, ParseError> {
	use Instruction as I;
	Ok(match opcode {
		0x00 => I::Unreachable,
		0x01 => I::Nop,
		0x02 => {
			let ty = decode_blocktype(r)?;
			let body = decode_instructions(r)?;
			I::Block { ty, body }
		}
		0x03 => {
			let ty = decode_blocktype(r)?;
			let body = decode_instructions(r)?;
			I::Loop { ty, body }
		}
		0x04 => {
			let ty = decode_blocktype(r)?;
			let (then_body, has_else) = decode_if_then(r)?;
			let else_body = if has_else { decode_instructions(r)? } else { Vec::new() };
			I::If { ty, then_body, else_body }
		}
		0x0C => I::Br(r.read_u32_leb()?),
		0x0D => I::BrIf(r.read_u32_leb()?),
		0x0E => {
			let targets = r.read_vec(|r| r.read_u32_leb())?;
			let default = r.read_u32_leb()?;
			I::BrTable { targets, default }
		}
		0x0F => I::Return,
		0x10 => I::Call(r.read_u32_leb()?),
		0x11 => {
			let type_idx = r.read_u32_leb()?;
			let reserved = r.read_u8()?;
			if reserved != 0x00 {
				return Err(ParseError::ExpectedOpcode(0x00));
			}
			I::CallIndirect { type_idx }
		}

		0x1A => I::Drop,
		0x1B => I::Select,

		0x20 => I::LocalGet(r.read_u32_leb()?),
		0x21 => I::LocalSet(r.read_u32_leb()?),
		0x22 => I::LocalTee(r.read_u32_leb()?),
		0x23 => I::GlobalGet(r.read_u32_leb()?),
		0x24 => I::GlobalSet(r.read_u32_leb()?),

		0x28 => I::Load { kind: LoadKind::I32, memarg: decode_memarg(r)? },
		0x29 => I::Load { kind: LoadKind::I64, memarg: decode_memarg(r)? },
		0x2A => I::Load { kind: LoadKind::F32, memarg: decode_memarg(r)? },
		0x2B => I::Load { kind: LoadKind::F64, memarg: decode_memarg(r)? },
		0x2C => I::Load { kind: LoadKind::I32_8S, memarg: decode_memarg(r)? },
		0x2D => I::Load { kind: LoadKind::I32_8U, memarg: decode_memarg(r)? },
		0x2E => I::Load { kind: LoadKind::I32_16S, memarg: decode_memarg(r)? },
		0x2F => I::Load { kind: LoadKind::I32_16U, memarg: decode_memarg(r)? },
		0x30 => I::Load { kind: LoadKind::I64_8S, memarg: decode_memarg(r)? },
		0x31 => I::Load { kind: LoadKind::I64_8U, memarg: decode_memarg(r)? },
		0x32 => I::Load { kind: LoadKind::I64_16S, memarg: decode_memarg(r)? },
		0x33 => I::Load { kind: LoadKind::I64_16U, memarg: decode_memarg(r)? },
		0x34 => I::Load { kind: LoadKind::I64_32S, memarg: decode_memarg(r)? },
		0x35 => I::Load { kind: LoadKind::I64_32U, memarg: decode_memarg(r)? },
		0x36 => I::Store { kind: StoreKind::I32, memarg: decode_memarg(r)? },
		0x37 => I::Store { kind: StoreKind::I64, memarg: decode_memarg(r)? },
		0x38 => I::Store { kind: StoreKind::F32, memarg: decode_memarg(r)? },
		0x39 => I::Store { kind: StoreKind::F64, memarg: decode_memarg(r)? },
		0x3A => I::Store { kind: StoreKind::I32_8, memarg: decode_memarg(r)? },
		0x3B => I::Store { kind: StoreKind::I32_16, memarg: decode_memarg(r)? },
		0x3C => I::Store { kind: StoreKind::I64_8, memarg: decode_memarg(r)? },
		0x3D => I::Store { kind: StoreKind::I64_16, memarg: decode_memarg(r)? },
		0x3E => I::Store { kind: StoreKind::I64_32, memarg: decode_memarg(r)? },

		0x3F => {
			let reserved = r.read_u8()?;
			if reserved != 0x00 {
				return Err(ParseError::ExpectedOpcode(0x00));
			}
			I::MemorySize
		}
		0x40 => {
			let reserved = r.read_u8()?;
			if reserved != 0x00 {
				return Err(ParseError::ExpectedOpcode(0x00));
			}
			I::MemoryGrow
		}

		0x41 => I::Const(Value::I32(r.read_i32_leb()? as u32)),
		0x42 => I::Const(Value::I64(r.read_i64_leb()? as u64)),
		0x43 => I::Const(Value::F32(r.read_f32()?)),
		0x44 => I::Const(Value::F64(r.read_f64()?)),

		0x45 => I::IntOp(NumKind::I32, IntOp::Eqz),
		0x46 => I::IntOp(NumKind::I32, IntOp::Eq),
		0x47 => I::IntOp(NumKind::I32, IntOp::Ne),
		0x48 => I::IntOp(NumKind::I32, IntOp::LtS),
		0x49 => I::IntOp(NumKind::I32, IntOp::LtU),
		0x4A => I::IntOp(NumKind::I32, IntOp::GtS),
		0x4B => I::IntOp(NumKind::I32, IntOp::GtU),
		0x4C => I::IntOp(NumKind::I32, IntOp::LeS),
		0x4D => I::IntOp(NumKind::I32, IntOp::LeU),
		0x4E => I::IntOp(NumKind::I32, IntOp::GeS),
		0x4F => I::IntOp(NumKind::I32, IntOp::GeU),

		0x50 => I::IntOp(NumKind::I64, IntOp::Eqz),
		0x51 => I::IntOp(NumKind::I64, IntOp::Eq),
		0x52 => I::IntOp(NumKind::I64, IntOp::Ne),
		0x53 => I::IntOp(NumKind::I64, IntOp::LtS),
		0x54 => I::IntOp(NumKind::I64, IntOp::LtU),
		0x55 => I::IntOp(NumKind::I64, IntOp::GtS),
		0x56 => I::IntOp(NumKind::I64, IntOp::GtU),
		0x57 => I::IntOp(NumKind::I64, IntOp::LeS),
		0x58 => I::IntOp(NumKind::I64, IntOp::LeU),
		0x59 => I::IntOp(NumKind::I64, IntOp::GeS),
		0x5A => I::IntOp(NumKind::I64, IntOp::GeU),

		0x5B => I::FloatOp(NumKind::F32, FloatOp::Eq),
		0x5C => I::FloatOp(NumKind::F32, FloatOp::Ne),
		0x5D => I::FloatOp(NumKind::F32, FloatOp::Lt),
		0x5E => I::FloatOp(NumKind::F32, FloatOp::Gt),
		0x5F => I::FloatOp(NumKind::F32, FloatOp::Le),
		0x60 => I::FloatOp(NumKind::F32, FloatOp::Ge),

		0x61 => I::FloatOp(NumKind::F64, FloatOp::Eq),
		0x62 => I::FloatOp(NumKind::F64, FloatOp::Ne),
		0x63 => I::FloatOp(NumKind::F64, FloatOp::Lt),
		0x64 => I::FloatOp(NumKind::F64, FloatOp::Gt),
		0x65 => I::FloatOp(NumKind::F64, FloatOp::Le),
		0x66 => I::FloatOp(NumKind::F64, FloatOp::Ge),

		0x67 => I::IntOp(NumKind::I32, IntOp::Clz),
		0x68 => I::IntOp(NumKind::I32, IntOp::Ctz),
		0x69 => I::IntOp(NumKind::I32, IntOp::Popcnt),
		0x6A => I::IntOp(NumKind::I32, IntOp::Add),
		0x6B => I::IntOp(NumKind::I32, IntOp::Sub),
		0x6C => I::IntOp(NumKind::I32, IntOp::Mul),
		0x6D => I::IntOp(NumKind::I32, IntOp::DivS),
		0x6E => I::IntOp(NumKind::I32, IntOp::DivU),
		0x6F => I::IntOp(NumKind::I32, IntOp::RemS),
		0x70 => I::IntOp(NumKind::I32, IntOp::RemU),
		0x71 => I::IntOp(NumKind::I32, IntOp::And),
		0x72 => I::IntOp(NumKind::I32, IntOp::Or),
		0x73 => I::IntOp(NumKind::I32, IntOp::Xor),
		0x74 => I::IntOp(NumKind::I32, IntOp::Shl),
		0x75 => I::IntOp(NumKind::I32, IntOp::ShrS),
		0x76 => I::IntOp(NumKind::I32, IntOp::ShrU),
		0x77 => I::IntOp(NumKind::I32, IntOp::Rotl),
		0x78 => I::IntOp(NumKind::I32, IntOp::Rotr),

		0x79 => I::IntOp(NumKind::I64, IntOp::Clz),
		0x7A => I::IntOp(NumKind::I64, IntOp::Ctz),
		0x7B => I::IntOp(NumKind::I64, IntOp::Popcnt),
		0x7C => I::IntOp(NumKind::I64, IntOp::Add),
		0x7D => I::IntOp(NumKind::I64, IntOp::Sub),
		0x7E => I::IntOp(NumKind::I64, IntOp::Mul),
		0x7F => I::IntOp(NumKind::I64, IntOp::DivS),
		0x80 => I::IntOp(NumKind::I64, IntOp::DivU),
		0x81 => I::IntOp(NumKind::I64, IntOp::RemS),
		0x82 => I::IntOp(NumKind::I64, IntOp::RemU),
		0x83 => I::IntOp(NumKind::I64, IntOp::And),
		0x84 => I::IntOp(NumKind::I64, IntOp::Or),
		0x85 => I::IntOp(NumKind::I64, IntOp::Xor),
		0x86 => I::IntOp(NumKind::I64, IntOp::Shl),
		0x87 => I::IntOp(NumKind::I64, IntOp::ShrS),
		0x88 => I::IntOp(NumKind::I64, IntOp::ShrU),
		0x89 => I::IntOp(NumKind::I64, IntOp::Rotl),
		0x8A => I::IntOp(NumKind::I64, IntOp::Rotr),

		0x8B => I::FloatOp(NumKind::F32, FloatOp::Abs),
		0x8C => I::FloatOp(NumKind::F32, FloatOp::Neg),
		0x8D => I::FloatOp(NumKind::F32, FloatOp::Ceil),
		0x8E => I::FloatOp(NumKind::F32, FloatOp::Floor),
		0x8F => I::FloatOp(NumKind::F32, FloatOp::Trunc),
		0x90 => I::FloatOp(NumKind::F32, FloatOp::Nearest),
		0x91 => I::FloatOp(NumKind::F32, FloatOp::Sqrt),
		0x92 => I::FloatOp(NumKind::F32, FloatOp::Add),
		0x93 => I::FloatOp(NumKind::F32, FloatOp::Sub),
		0x94 => I::FloatOp(NumKind::F32, FloatOp::Mul),
		0x95 => I::FloatOp(NumKind::F32, FloatOp::Div),
		0x96 => I::FloatOp(NumKind::F32, FloatOp::Min),
		0x97 => I::FloatOp(NumKind::F32, FloatOp::Max),
		0x98 => I::FloatOp(NumKind::F32, FloatOp::Copysign),

		0x99 => I::FloatOp(NumKind::F64, FloatOp::Abs),
		0x9A => I::FloatOp(NumKind::F64, FloatOp::Neg),
		0x9B => I::FloatOp(NumKind::F64, FloatOp::Ceil),
		0x9C => I::FloatOp(NumKind::F64, FloatOp::Floor),
		0x9D => I::FloatOp(NumKind::F64, FloatOp::Trunc),
		0x9E => I::FloatOp(NumKind::F64, FloatOp::Nearest),
		0x9F => I::FloatOp(NumKind::F64, FloatOp::Sqrt),
		0xA0 => I::FloatOp(NumKind::F64, FloatOp::Add),
		0xA1 => I::FloatOp(NumKind::F64, FloatOp::Sub),
		0xA2 => I::FloatOp(NumKind::F64, FloatOp::Mul),
		0xA3 => I::FloatOp(NumKind::F64, FloatOp::Div),
		0xA4 => I::FloatOp(NumKind::F64, FloatOp::Min),
		0xA5 => I::FloatOp(NumKind::F64, FloatOp::Max),
		0xA6 => I::FloatOp(NumKind::F64, FloatOp::Copysign),

		0xA7 => I::Cvt(CvtOp::I32WrapI64),
		0xA8 => I::Cvt(CvtOp::I32TruncF32S),
		0xA9 => I::Cvt(CvtOp::I32TruncF32U),
		0xAA => I::Cvt(CvtOp::I32TruncF64S),
		0xAB => I::Cvt(CvtOp::I32TruncF64U),
		0xAC => I::Cvt(CvtOp::I64ExtendI32S),
		0xAD => I::Cvt(CvtOp::I64ExtendI32U),
		0xAE => I::Cvt(CvtOp::I64TruncF32S),
		0xAF => I::Cvt(CvtOp::I64TruncF32U),
		0xB0 => I::Cvt(CvtOp::I64TruncF64S),
		0xB1 => I::Cvt(CvtOp::I64TruncF64U),
		0xB2 => I::Cvt(CvtOp::F32ConvertI32S),
		0xB3 => I::Cvt(CvtOp::F32ConvertI32U),
		0xB4 => I::Cvt(CvtOp::F32ConvertI64S),
		0xB5 => I::Cvt(CvtOp::F32ConvertI64U),
		0xB6 => I::Cvt(CvtOp::F32DemoteF64),
		0xB7 => I::Cvt(CvtOp::F64ConvertI32S),
		0xB8 => I::Cvt(CvtOp::F64ConvertI32U),
		0xB9 => I::Cvt(CvtOp::F64ConvertI64S),
		0xBA => I::Cvt(CvtOp::F64ConvertI64U),
		0xBB => I::Cvt(CvtOp::F64PromoteF32),
		0xBC => I::Cvt(CvtOp::I32ReinterpretF32),
		0xBD => I::Cvt(CvtOp::I64ReinterpretF64),
		0xBE => I::Cvt(CvtOp::F32ReinterpretI32),
		0xBF => I::Cvt(CvtOp::F64ReinterpretI64),

		0xC0 => I::Cvt(CvtOp::I32Extend8S),
		0xC1 => I::Cvt(CvtOp::I32Extend16S),
		0xC2 => I::Cvt(CvtOp::I64Extend8S),
		0xC3 => I::Cvt(CvtOp::I64Extend16S),
		0xC4 => I::Cvt(CvtOp::I64Extend32S),

		other => return Err(ParseError::InvalidOpcode(other)),
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn type_section() {
		let wasm = [
			0x02, // num types
			// func type 0
			0x60, // func
			0x02, // num params
			0x7F, // i32
			0x7F, // i32
			0x01, // num results
			0x7F, // i32
			// func type 1
			0x60, // func
			0x01, // num params
			0x7F, // i32
			0x01, // num results
			0x7F, // i32
		];
		let mut r = ByteReader::new(wasm.as_slice());
		let actual = decode_type_section(&mut r).unwrap();
		let expected = [
			FunctionType { params: vec![ValType::I32, ValType::I32], results: vec![ValType::I32] },
			FunctionType { params: vec![ValType::I32], results: vec![ValType::I32] },
		];
		assert_eq!(actual, expected);
	}

	#[test]
	fn export() {
		let wasm = [
			0x06, // name length
			0x61, 0x64, 0x64, 0x54, 0x77, 0x6F, // "addTwo"
			0x00, // func
			0x03, // func index
		];
		let mut r = ByteReader::new(wasm.as_slice());
		let actual = decode_export(&mut r).unwrap();
		assert_eq!(actual.name, "addTwo");
		assert_eq!(actual.kind, ExternalKind::Func);
		assert_eq!(actual.index, 3);
	}

	#[test]
	fn limits_with_and_without_max() {
		let no_max = [0x00, 0x01];
		let mut r = ByteReader::new(no_max.as_slice());
		assert_eq!(decode_limits(&mut r).unwrap(), Limits { min: 1, max: None });

		let with_max = [0x01, 0x01, 0x05];
		let mut r = ByteReader::new(with_max.as_slice());
		assert_eq!(decode_limits(&mut r).unwrap(), Limits { min: 1, max: Some(5) });
	}

	#[test]
	fn bad_function_type_tag_is_rejected() {
		let wasm = [0x61]; // not 0x60
		let mut r = ByteReader::new(wasm.as_slice());
		assert!(matches!(decode_function_type(&mut r), Err(ParseError::InvalidBlockType(0x61))));
	}
}
