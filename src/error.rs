//! The crate's unified error type: every fallible public entry point
//! (`compile`, `instantiate`, calling an export) returns `Result<_, Error>`,
//! while internal code keeps matching on the precise
//! [`ParseError`]/[`LinkError`]/[`Trap`] variants directly — the same split
//! the teacher's `ParsingError`/`ExecutionError` pair drew, completed here
//! to the three failure kinds `spec.md` §7 names.

use thiserror::Error;

use crate::exec::{LinkError, Trap};
use crate::parse::ParseError;

#[derive(Debug, Error)]
pub enum Error {
	#[error(transparent)]
	Malformed(#[from] ParseError),
	#[error(transparent)]
	Link(#[from] LinkError),
	#[error(transparent)]
	Trap(#[from] Trap),
}
