//! Decodes a `.wasm` byte stream into a [`ParsedModule`]: section readers,
//! the closed instruction set, and the handful of small value types
//! (`ValType`, `Limits`, `FunctionType`, ...) that describe a module's shape
//! without saying anything about how it executes.
//!
//! Nothing in this module runs code; see [`crate::exec`] for that.

mod decoder;
mod error;
mod instruction;
mod module;
mod types;

pub use decoder::decode_module;
pub use error::ParseError;
pub use instruction::{CvtOp, FloatOp, Instruction, IntOp, LoadKind, MemArg, NumKind, StoreKind};
pub use module::{Code, CustomSection, DataSegment, ElementSegment, Function, Global, ParsedModule};
pub use types::{
	BlockType, Export, ExternalKind, FunctionType, GlobalType, Import, ImportDesc, Limits, RefType,
	SectionId, TableType, ValType,
};
