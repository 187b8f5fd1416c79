//! Runtime half of the crate: turns a [`crate::parse::ParsedModule`] into
//! live store entities and executes them. Nothing here parses bytes; see
//! [`crate::parse`] for that.

pub mod error;
pub mod host;
pub mod interpreter;
pub mod link;
pub mod module_instance;
pub mod numeric;
pub mod store;
mod value;

pub use error::{LinkError, Trap};
pub use interpreter::Interpreter;
pub use link::instantiate;
pub use store::{
	FuncAddr, FuncInstance, GlobalAddr, GlobalInstance, MemAddr, MemoryInstance, Store, TableAddr,
	TableInstance,
};
pub use value::Value;
