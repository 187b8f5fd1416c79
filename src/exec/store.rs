//! The store: the arena that owns every runtime instance a linked module can
//! reference. Addresses are opaque, monotonically issued handles into the
//! store's per-kind vectors rather than `Rc`/`Arc` pointers, so a module
//! instance and a host-provided instance can point at the same store entry
//! without either owning the other — mirroring how the teacher's
//! `Instance`/`Memory` split kept execution state away from the parsed
//! module it came from, generalized to cover tables and globals too.

use crate::exec::Value;
use crate::parse::{FunctionType, GlobalType, Limits, TableType};

/// An index into one of [`Store`]'s arenas. Copy, not a reference — shared
/// freely between a module instance's index tables and any host code that
/// captured the address earlier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Addr(usize);

impl Addr {
	pub(crate) fn index(self) -> usize {
		self.0
	}
}

pub type FuncAddr = Addr;
pub type TableAddr = Addr;
pub type MemAddr = Addr;
pub type GlobalAddr = Addr;

/// A function instance: either a module-local function (closing over its
/// defining module instance, to resolve the type/function/table/memory/
/// global indices its body references) or a host function supplied through
/// [`crate::embed::Imports`].
pub enum FuncInstance {
	Local { ty: FunctionType, module: crate::exec::module_instance::ModuleAddr, code: crate::parse::Code },
	Host { ty: FunctionType, func: crate::exec::host::HostFn },
}

impl FuncInstance {
	pub fn ty(&self) -> &FunctionType {
		match self {
			FuncInstance::Local { ty, .. } => ty,
			FuncInstance::Host { ty, .. } => ty,
		}
	}
}

impl std::fmt::Debug for FuncInstance {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			FuncInstance::Local { ty, .. } => f.debug_struct("FuncInstance::Local").field("ty", ty).finish(),
			FuncInstance::Host { ty, .. } => f.debug_struct("FuncInstance::Host").field("ty", ty).finish(),
		}
	}
}

/// A table instance: a `funcref` vector, each slot either empty or holding
/// the [`FuncAddr`] an element segment wrote there.
#[derive(Debug)]
pub struct TableInstance {
	pub ty: TableType,
	pub elements: Vec<Option<FuncAddr>>,
}

impl TableInstance {
	pub fn new(ty: TableType) -> Self {
		Self { elements: vec![None; ty.limits.min as usize], ty }
	}
}

/// The number of bytes in one linear memory page, fixed by `spec.md`.
pub const PAGE_SIZE: usize = 65536;

/// A memory instance: a growable byte vector, always a whole number of
/// [`PAGE_SIZE`] pages.
#[derive(Debug)]
pub struct MemoryInstance {
	pub limits: Limits,
	pub data: Vec<u8>,
}

impl MemoryInstance {
	pub fn new(limits: Limits) -> Self {
		Self { data: vec![0u8; limits.min as usize * PAGE_SIZE], limits }
	}

	pub fn size_pages(&self) -> u32 {
		(self.data.len() / PAGE_SIZE) as u32
	}

	/// Grows the memory by `delta` pages, returning the previous size in
	/// pages, or `None` if the growth would exceed the declared maximum (or
	/// the implementation limit of `u32::MAX` pages).
	pub fn grow(&mut self, delta: u32) -> Option<u32> {
		let current = self.size_pages();
		let new_size = current.checked_add(delta)?;
		if let Some(max) = self.limits.max {
			if new_size > max {
				return None;
			}
		}
		self.data.resize(new_size as usize * PAGE_SIZE, 0);
		Some(current)
	}
}

/// A global instance: current value plus whether `global.set` is permitted.
#[derive(Debug)]
pub struct GlobalInstance {
	pub ty: GlobalType,
	pub value: Value,
}

/// Owns every function/table/memory/global instance created across every
/// module instantiated against it. A `Store` outlives the modules linked
/// into it — dropping the store drops everything it allocated.
#[derive(Debug, Default)]
pub struct Store {
	pub(crate) funcs: Vec<FuncInstance>,
	pub(crate) tables: Vec<TableInstance>,
	pub(crate) memories: Vec<MemoryInstance>,
	pub(crate) globals: Vec<GlobalInstance>,
	pub(crate) module_instances: Vec<crate::exec::module_instance::ModuleInstance>,
}

impl Store {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn alloc_func(&mut self, inst: FuncInstance) -> FuncAddr {
		self.funcs.push(inst);
		Addr(self.funcs.len() - 1)
	}

	pub fn alloc_table(&mut self, inst: TableInstance) -> TableAddr {
		self.tables.push(inst);
		Addr(self.tables.len() - 1)
	}

	pub fn alloc_memory(&mut self, inst: MemoryInstance) -> MemAddr {
		self.memories.push(inst);
		Addr(self.memories.len() - 1)
	}

	pub fn alloc_global(&mut self, inst: GlobalInstance) -> GlobalAddr {
		self.globals.push(inst);
		Addr(self.globals.len() - 1)
	}

	pub fn alloc_module_instance(
		&mut self,
		inst: crate::exec::module_instance::ModuleInstance,
	) -> crate::exec::module_instance::ModuleAddr {
		self.module_instances.push(inst);
		Addr(self.module_instances.len() - 1)
	}

	pub fn func(&self, addr: FuncAddr) -> &FuncInstance {
		&self.funcs[addr.0]
	}

	pub fn table(&self, addr: TableAddr) -> &TableInstance {
		&self.tables[addr.0]
	}

	pub fn table_mut(&mut self, addr: TableAddr) -> &mut TableInstance {
		&mut self.tables[addr.0]
	}

	pub fn memory(&self, addr: MemAddr) -> &MemoryInstance {
		&self.memories[addr.0]
	}

	pub fn memory_mut(&mut self, addr: MemAddr) -> &mut MemoryInstance {
		&mut self.memories[addr.0]
	}

	pub fn global(&self, addr: GlobalAddr) -> &GlobalInstance {
		&self.globals[addr.0]
	}

	pub fn global_mut(&mut self, addr: GlobalAddr) -> &mut GlobalInstance {
		&mut self.globals[addr.0]
	}

	pub fn module_instance(&self, addr: crate::exec::module_instance::ModuleAddr) -> &crate::exec::module_instance::ModuleInstance {
		&self.module_instances[addr.0]
	}
}
