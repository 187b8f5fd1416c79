//! The linker/instantiator: turns a [`ParsedModule`] plus host-supplied
//! imports into a live [`ModuleInstance`] inside a [`Store`]. Follows
//! `spec.md`'s seven-step instantiation order exactly; steps 1-3 (import
//! resolution and local allocation) fail with [`LinkError`], steps 6-7
//! (segment application and the start function) fail with [`Trap`].

use std::collections::HashMap;

use tracing::{debug, debug_span};

use crate::embed::{Extern, Imports};
use crate::exec::host::HostFn;
use crate::exec::interpreter::{eval_const_expr, Interpreter};
use crate::exec::module_instance::{ExternAddr, ModuleAddr, ModuleInstance};
use crate::exec::store::{FuncInstance, GlobalInstance, MemoryInstance, Store, TableInstance};
use crate::exec::{LinkError, Trap, Value};
use crate::parse::{ExternalKind, ImportDesc, ParsedModule};

/// Links `module` against `imports` and instantiates it into `store`,
/// running the start function (if any) before returning. A start-function
/// trap is returned directly — the caller never sees a partially-started
/// [`ModuleAddr`] in that case, matching `spec.md` §4.4 step 7's "the whole
/// instantiation fails" framing.
pub fn instantiate(
	store: &mut Store,
	module: &ParsedModule,
	imports: &Imports,
) -> Result<ModuleAddr, LinkError> {
	let _span = debug_span!("instantiate").entered();

	// Step 1-2: resolve and allocate imports, in declaration order, so the
	// low end of each index space matches the import section exactly.
	let mut funcs = Vec::new();
	let mut tables = Vec::new();
	let mut memories = Vec::new();
	let mut globals = Vec::new();

	for import in &module.imports {
		let resolved = imports
			.get(&import.module, &import.name)
			.ok_or_else(|| LinkError::ImportMissing {
				module: import.module.clone(),
				name: import.name.clone(),
			})?;
		match (&import.desc, resolved) {
			(ImportDesc::Func(type_idx), Extern::Func { ty, func }) => {
				let expected = &module.types[*type_idx as usize];
				if expected != ty {
					return Err(LinkError::ImportSignatureMismatch {
						module: import.module.clone(),
						name: import.name.clone(),
						expected: format!("{:?}", expected),
						got: format!("{:?}", ty),
					});
				}
				funcs.push(store.alloc_func(FuncInstance::Host { ty: ty.clone(), func: func.clone() }));
			}
			(ImportDesc::Table(expected), Extern::Table(addr)) => {
				let actual = store.table(*addr);
				if actual.ty.limits.min < expected.limits.min {
					return Err(LinkError::ImportLimitsMismatch {
						module: import.module.clone(),
						name: import.name.clone(),
						required_min: expected.limits.min,
						actual_min: actual.ty.limits.min,
					});
				}
				tables.push(*addr);
			}
			(ImportDesc::Memory(expected), Extern::Memory(addr)) => {
				let actual = store.memory(*addr);
				if actual.limits.min < expected.min {
					return Err(LinkError::ImportLimitsMismatch {
						module: import.module.clone(),
						name: import.name.clone(),
						required_min: expected.min,
						actual_min: actual.limits.min,
					});
				}
				memories.push(*addr);
			}
			(ImportDesc::Global(expected), Extern::Global(addr)) => {
				let actual = store.global(*addr);
				if actual.ty != *expected {
					return Err(LinkError::ImportKindMismatch {
						module: import.module.clone(),
						name: import.name.clone(),
						expected: "matching global type",
						got: "mismatched global type",
					});
				}
				globals.push(*addr);
			}
			(desc, _) => {
				return Err(LinkError::ImportKindMismatch {
					module: import.module.clone(),
					name: import.name.clone(),
					expected: kind_name(desc.kind()),
					got: "a different extern kind",
				})
			}
		}
	}

	// Reserve the module instance's own address before allocating local
	// functions, since each local function closes over it to resolve its
	// own module's index spaces at call time.
	let module_addr = store.alloc_module_instance(ModuleInstance {
		types: module.types.clone(),
		funcs: Vec::new(),
		tables: Vec::new(),
		memories: Vec::new(),
		globals: Vec::new(),
		exports: HashMap::new(),
	});

	// Step 2 (cont'd): allocate local functions.
	for function in module.functions() {
		let ty = module.types[function.type_idx as usize].clone();
		funcs.push(store.alloc_func(FuncInstance::Local { ty, module: module_addr, code: function.code }));
	}

	// Step 3: allocate local tables and memories.
	for table_ty in &module.tables {
		if let Some(max) = table_ty.limits.max {
			if table_ty.limits.min > max {
				return Err(LinkError::InvalidLimits { min: table_ty.limits.min, max });
			}
		}
		tables.push(store.alloc_table(TableInstance::new(*table_ty)));
	}
	for mem_limits in &module.memories {
		if let Some(max) = mem_limits.max {
			if mem_limits.min > max {
				return Err(LinkError::InvalidLimits { min: mem_limits.min, max });
			}
		}
		memories.push(store.alloc_memory(MemoryInstance::new(*mem_limits)));
	}

	// Step 4: allocate globals, evaluating each initializer in the
	// restricted context of imported globals only (a global initializer may
	// reference an earlier *imported* global but never a local one or any
	// function, table, or memory).
	for global in &module.globals {
		let value = eval_const_expr(&global.init, &globals, store)
			.map_err(|trap| LinkError::InvalidGlobalInitializer(trap.to_string()))?;
		globals.push(store.alloc_global(GlobalInstance { ty: global.ty, value }));
	}

	// Step 5: build the export table.
	let mut exports = HashMap::new();
	for export in &module.exports {
		let addr = match export.kind {
			ExternalKind::Func => ExternAddr::Func(funcs[export.index as usize]),
			ExternalKind::Table => ExternAddr::Table(tables[export.index as usize]),
			ExternalKind::Memory => ExternAddr::Memory(memories[export.index as usize]),
			ExternalKind::Global => ExternAddr::Global(globals[export.index as usize]),
		};
		exports.insert(export.name.clone(), addr);
	}

	{
		let instance = &mut store.module_instances[module_addr.index()];
		instance.funcs = funcs;
		instance.tables = tables;
		instance.memories = memories;
		instance.globals = globals;
		instance.exports = exports;
	}

	// Step 6: apply element and data segments, bounds-checked before any
	// byte/slot of a given segment is written; earlier segments already
	// applied are not rolled back if a later one fails.
	apply_element_segments(store, module, module_addr)?;
	apply_data_segments(store, module, module_addr)?;

	// Step 7: run the start function, if declared.
	if let Some(start_idx) = module.start {
		debug!(start_idx, "running start function");
		let func_addr = store.module_instance(module_addr).funcs[start_idx as usize];
		let mut interp = Interpreter::new(store);
		interp.call(func_addr, module_addr, &[], &[])?;
	}

	Ok(module_addr)
}

fn apply_element_segments(
	store: &mut Store,
	module: &ParsedModule,
	module_addr: ModuleAddr,
) -> Result<(), Trap> {
	for segment in &module.elements {
		let globals = store.module_instance(module_addr).globals.clone();
		let offset_value = eval_const_expr(&segment.offset, &globals, store)?;
		let offset = offset_value.as_i32().expect("i32 offset expression") as u32 as usize;

		let table_addr = store.module_instance(module_addr).tables[0];
		let table_len = store.table(table_addr).elements.len();
		if offset.checked_add(segment.func_indices.len()).map_or(true, |end| end > table_len) {
			return Err(Trap::ElementSegmentOutOfBounds { offset: offset as u32, len: segment.func_indices.len(), table_len });
		}

		let funcs = store.module_instance(module_addr).funcs.clone();
		let table = store.table_mut(table_addr);
		for (i, &func_idx) in segment.func_indices.iter().enumerate() {
			table.elements[offset + i] = Some(funcs[func_idx as usize]);
		}
	}
	Ok(())
}

fn apply_data_segments(
	store: &mut Store,
	module: &ParsedModule,
	module_addr: ModuleAddr,
) -> Result<(), Trap> {
	for segment in &module.data {
		let globals = store.module_instance(module_addr).globals.clone();
		let offset_value = eval_const_expr(&segment.offset, &globals, store)?;
		let offset = offset_value.as_i32().expect("i32 offset expression") as u32 as usize;

		let mem_addr = store.module_instance(module_addr).memories[0];
		let mem_len = store.memory(mem_addr).data.len();
		if offset.checked_add(segment.bytes.len()).map_or(true, |end| end > mem_len) {
			return Err(Trap::DataSegmentOutOfBounds { offset: offset as u32, len: segment.bytes.len(), mem_len });
		}

		let mem = store.memory_mut(mem_addr);
		mem.data[offset..offset + segment.bytes.len()].copy_from_slice(&segment.bytes);
	}
	Ok(())
}

fn kind_name(kind: ExternalKind) -> &'static str {
	match kind {
		ExternalKind::Func => "function",
		ExternalKind::Table => "table",
		ExternalKind::Memory => "memory",
		ExternalKind::Global => "global",
	}
}

/// Re-exported for [`crate::embed`], which needs to construct a `HostFn`
/// when it wraps a raw Rust closure into an [`Extern::Func`].
pub fn wrap_host_fn<F>(f: F) -> HostFn
where
	F: Fn(&mut Store, ModuleAddr, &[Value], &[Value]) -> Result<Option<Value>, Trap> + Send + Sync + 'static,
{
	std::sync::Arc::new(f)
}
