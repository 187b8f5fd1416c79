use std::str::Utf8Error;

use thiserror::Error;

/// Structural violations of the binary format, raised by [`crate::parse`]
/// and reported to the caller of `compile`/`instantiate`.
#[derive(Debug, Error)]
pub enum ParseError {
	#[error("module does not start with the magic constant 0x00 0x61 0x73 0x6D")]
	BadMagic,

	#[error("unsupported version {0:?}, only version 1 is supported")]
	UnsupportedVersion([u8; 4]),

	#[error("section {id} appears more than once")]
	DuplicateSection { id: u8 },

	#[error("section body did not match its declared size")]
	MalformedSection,

	#[error("unknown opcode byte 0x{0:02X}")]
	InvalidOpcode(u8),

	#[error("value-type byte 0x{0:02X} is not one of i32/i64/f32/f64")]
	InvalidValType(u8),

	#[error("blocktype byte 0x{0:02X} is not a valid empty/value/index blocktype")]
	InvalidBlockType(u8),

	#[error("export kind byte 0x{0:02X} is not func/table/mem/global")]
	InvalidExportKind(u8),

	#[error("import kind byte 0x{0:02X} is not func/table/mem/global")]
	InvalidImportKind(u8),

	#[error("limits flag byte 0x{0:02X} is neither 0x00 nor 0x01")]
	InvalidLimitsFlag(u8),

	#[error("{kind} index {index} is out of range: the MVP binary format permits only one {kind}")]
	MultipleNotSupported { kind: &'static str, index: u32 },

	#[error("expected opcode 0x{0:02X}")]
	ExpectedOpcode(u8),

	#[error("function section declares {functions} functions but code section has {code} bodies")]
	FunctionCodeCountMismatch { functions: usize, code: usize },

	#[error("LEB128 value exceeds the target {width}-bit width")]
	Leb128Overflow { width: u32 },

	#[error("invalid UTF-8 in a name: {0}")]
	InvalidUtf8(Utf8Error),

	#[error("unexpected end of input")]
	UnexpectedEof,

	#[error("I/O error: {0}")]
	Io(String),
}
