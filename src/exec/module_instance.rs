//! A module instance: the index-space mapping a parsed module's
//! `funcidx`/`tableidx`/`memidx`/`globalidx` resolve through at run time,
//! plus its export table. Imports occupy the low end of each index space,
//! exactly as the binary format lays them out, so a single `Vec<Addr>` per
//! kind is enough — no separate import/local split needs to survive past
//! linking.

use std::collections::HashMap;

use crate::exec::store::{Addr, FuncAddr, GlobalAddr, MemAddr, TableAddr};
use crate::parse::{ExternalKind, FunctionType};

pub type ModuleAddr = Addr;

#[derive(Debug, Clone, Copy)]
pub enum ExternAddr {
	Func(FuncAddr),
	Table(TableAddr),
	Memory(MemAddr),
	Global(GlobalAddr),
}

/// A single instantiated module's resolved address tables and types, held in
/// [`crate::exec::store::Store::module_instances`] and referenced by
/// [`ModuleAddr`] from local functions and the embedding API.
#[derive(Debug)]
pub struct ModuleInstance {
	pub types: Vec<FunctionType>,
	pub funcs: Vec<FuncAddr>,
	pub tables: Vec<TableAddr>,
	pub memories: Vec<MemAddr>,
	pub globals: Vec<GlobalAddr>,
	pub exports: HashMap<String, ExternAddr>,
}

impl ModuleInstance {
	pub fn export(&self, name: &str) -> Option<ExternAddr> {
		self.exports.get(name).copied()
	}
}

impl ExternAddr {
	pub fn kind(&self) -> ExternalKind {
		match self {
			ExternAddr::Func(_) => ExternalKind::Func,
			ExternAddr::Table(_) => ExternalKind::Table,
			ExternAddr::Memory(_) => ExternalKind::Memory,
			ExternAddr::Global(_) => ExternalKind::Global,
		}
	}
}
