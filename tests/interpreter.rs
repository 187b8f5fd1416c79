mod common;

use common::*;
use wasmlite::{Imports, Value};

fn instance_of(bytes: Vec<u8>) -> wasmlite::Instance {
	wasmlite::instantiate(&bytes[..], &Imports::new()).unwrap()
}

#[test]
fn add_function_runs() {
	let bytes = module([
		(SEC_TYPE, vec_section([func_type(&[I32, I32], &[I32])])),
		(SEC_FUNCTION, vec_section([uleb(0)])),
		(SEC_EXPORT, vec_section([export_entry("add", 0x00, 0)])),
		(SEC_CODE, vec_section([code_entry(&[], vec![
			0x20, 0x00, // local.get 0
			0x20, 0x01, // local.get 1
			0x6A,       // i32.add
		])])),
	]);
	let mut instance = instance_of(bytes);
	let result = instance.call("add", &[Value::from(40i32), Value::from(2i32)]).unwrap();
	assert_eq!(result, Some(Value::from(42i32)));
}

#[test]
fn global_get_set_round_trips() {
	let bytes = module([
		(SEC_TYPE, vec_section([func_type(&[], &[I32])])),
		(SEC_FUNCTION, vec_section([uleb(0)])),
		(SEC_GLOBAL, vec_section([{
			let mut g = vec![I32, 0x01]; // mutable i32
			g.push(0x41); // i32.const
			g.extend(sleb(7));
			g.push(0x0B);
			g
		}])),
		(SEC_EXPORT, vec_section([export_entry("read", 0x00, 0)])),
		(SEC_CODE, vec_section([code_entry(&[], vec![0x23, 0x00])])), // global.get 0
	]);
	let mut instance = instance_of(bytes);
	let result = instance.call("read", &[]).unwrap();
	assert_eq!(result, Some(Value::from(7i32)));
}

#[test]
fn loop_with_branch_sums_to_n() {
	// locals: [0]=n (param), [1]=acc, [2]=i
	// acc = 0; i = 0;
	// loop: if i >= n, break; acc += i; i += 1; br 0 (continue loop)
	let mut b = Vec::new();
	// local 1 = 0
	b.extend([0x41]); b.extend(sleb(0)); b.extend([0x21, 0x01]);
	// local 2 = 0
	b.extend([0x41]); b.extend(sleb(0)); b.extend([0x21, 0x02]);
	// block $exit
	b.push(0x02); b.push(0x40); // block (empty)
	//   loop $continue
	b.push(0x03); b.push(0x40); // loop (empty)
	//     local.get 2; local.get 0; i32.ge_s; br_if 1 (exit)
	b.extend([0x20, 0x02, 0x20, 0x00, 0x4E, 0x0D, 0x01]);
	//     local.get 1; local.get 2; i32.add; local.set 1
	b.extend([0x20, 0x01, 0x20, 0x02, 0x6A, 0x21, 0x01]);
	//     local.get 2; i32.const 1; i32.add; local.set 2
	b.extend([0x20, 0x02, 0x41]); b.extend(sleb(1)); b.extend([0x6A, 0x21, 0x02]);
	//     br 0 (continue)
	b.extend([0x0C, 0x00]);
	b.push(0x0B); // end loop
	b.push(0x0B); // end block
	// local.get 1 (return acc)
	b.extend([0x20, 0x01]);

	let bytes = module([
		(SEC_TYPE, vec_section([func_type(&[I32], &[I32])])),
		(SEC_FUNCTION, vec_section([uleb(0)])),
		(SEC_EXPORT, vec_section([export_entry("sum_to", 0x00, 0)])),
		(SEC_CODE, vec_section([code_entry(&[(2, I32)], b)])),
	]);
	let mut instance = instance_of(bytes);
	let result = instance.call("sum_to", &[Value::from(5i32)]).unwrap();
	assert_eq!(result, Some(Value::from(10i32))); // 0+1+2+3+4
}

#[test]
fn memory_store_then_load_round_trips() {
	let bytes = module([
		(SEC_TYPE, vec_section([func_type(&[], &[I32])])),
		(SEC_FUNCTION, vec_section([uleb(0)])),
		(SEC_MEMORY, vec_section([limits_min(1)])),
		(SEC_EXPORT, vec_section([export_entry("probe", 0x00, 0)])),
		(SEC_CODE, vec_section([code_entry(&[], {
			let mut b = Vec::new();
			// i32.const 0; i32.const 1234; i32.store
			b.extend([0x41]); b.extend(sleb(0));
			b.extend([0x41]); b.extend(sleb(1234));
			b.extend([0x36, 0x02, 0x00]); // i32.store align=2 offset=0
			// i32.const 0; i32.load
			b.extend([0x41]); b.extend(sleb(0));
			b.extend([0x28, 0x02, 0x00]); // i32.load align=2 offset=0
			b
		})])),
	]);
	let mut instance = instance_of(bytes);
	let result = instance.call("probe", &[]).unwrap();
	assert_eq!(result, Some(Value::from(1234i32)));
}

#[test]
fn memory_out_of_bounds_traps() {
	let bytes = module([
		(SEC_TYPE, vec_section([func_type(&[], &[I32])])),
		(SEC_FUNCTION, vec_section([uleb(0)])),
		(SEC_MEMORY, vec_section([limits_min(1)])),
		(SEC_EXPORT, vec_section([export_entry("probe", 0x00, 0)])),
		(SEC_CODE, vec_section([code_entry(&[], {
			let mut b = Vec::new();
			b.extend([0x41]); b.extend(sleb(100_000));
			b.extend([0x28, 0x02, 0x00]); // i32.load at an address past one page
			b
		})])),
	]);
	let mut instance = instance_of(bytes);
	let err = instance.call("probe", &[]).unwrap_err();
	assert!(err.to_string().contains("out-of-bounds") || format!("{err:?}").contains("MemoryOutOfBounds"));
}

#[test]
fn call_indirect_through_table_dispatches_correctly() {
	// Two functions of the same type: one returns 1, the other returns 2.
	// An element segment puts func 1 at table slot 0. call_indirect(0)
	// should return 2.
	let bytes = module([
		(SEC_TYPE, vec_section([func_type(&[], &[I32])])),
		(SEC_FUNCTION, vec_section([uleb(0), uleb(0), uleb(0)])),
		(SEC_TABLE, vec_section([{
			let mut t = vec![0x70];
			t.extend(limits_min(1));
			t
		}])),
		(SEC_EXPORT, vec_section([export_entry("dispatch", 0x00, 2)])),
		(SEC_ELEMENT, vec_section([{
			let mut e = uleb(0);
			e.extend([0x41]); e.extend(sleb(0));
			e.push(0x0B);
			e.extend(vec_section([uleb(1)])); // table slot 0 -> func 1
			e
		}])),
		(SEC_CODE, vec_section([
			code_entry(&[], {
				let mut b = Vec::new();
				b.extend([0x41]); b.extend(sleb(1));
				b
			}),
			code_entry(&[], {
				let mut b = Vec::new();
				b.extend([0x41]); b.extend(sleb(2));
				b
			}),
			code_entry(&[], {
				// dispatch: call_indirect(type 0, table index 0)
				let mut b = Vec::new();
				b.extend([0x41]); b.extend(sleb(0));
				b.extend([0x11, 0x00, 0x00]); // call_indirect type_idx=0 reserved=0
				b
			}),
		])),
	]);
	let mut instance = instance_of(bytes);
	let result = instance.call("dispatch", &[]).unwrap();
	assert_eq!(result, Some(Value::from(2i32)));
}

#[test]
fn uninitialized_table_slot_traps() {
	let bytes = module([
		(SEC_TYPE, vec_section([func_type(&[], &[I32])])),
		(SEC_FUNCTION, vec_section([uleb(0)])),
		(SEC_TABLE, vec_section([{
			let mut t = vec![0x70];
			t.extend(limits_min(1));
			t
		}])),
		(SEC_EXPORT, vec_section([export_entry("dispatch", 0x00, 0)])),
		(SEC_CODE, vec_section([code_entry(&[], {
			let mut b = Vec::new();
			b.extend([0x41]); b.extend(sleb(0));
			b.extend([0x11, 0x00, 0x00]);
			b
		})])),
	]);
	let mut instance = instance_of(bytes);
	let err = instance.call("dispatch", &[]).unwrap_err();
	assert!(format!("{err:?}").contains("UninitializedElement"));
}

#[test]
fn start_function_runs_during_instantiation() {
	// A start function that stores a marker into memory, observable only
	// because instantiation succeeded and the memory holds the value.
	let bytes = module([
		(SEC_TYPE, vec_section([func_type(&[], &[])])),
		(SEC_FUNCTION, vec_section([uleb(0)])),
		(SEC_MEMORY, vec_section([limits_min(1)])),
		(SEC_START, uleb(0)),
		(SEC_EXPORT, vec_section([export_entry("mem", 0x02, 0)])),
		(SEC_CODE, vec_section([code_entry(&[], {
			let mut b = Vec::new();
			b.extend([0x41]); b.extend(sleb(0));
			b.extend([0x41]); b.extend(sleb(99));
			b.extend([0x36, 0x02, 0x00]);
			b
		})])),
	]);
	let instance = instance_of(bytes);
	let mem_addr = match instance.exports().get("mem").unwrap() {
		wasmlite::exec::module_instance::ExternAddr::Memory(addr) => *addr,
		_ => panic!("expected a memory export"),
	};
	assert_eq!(&instance.store().memory(mem_addr).data[0..4], &99i32.to_le_bytes());
}

#[test]
fn call_stack_exhaustion_traps_rather_than_overflowing() {
	// A function that calls itself unconditionally; with a small max depth
	// this must trap cleanly instead of blowing the real stack.
	let bytes = module([
		(SEC_TYPE, vec_section([func_type(&[], &[])])),
		(SEC_FUNCTION, vec_section([uleb(0)])),
		(SEC_EXPORT, vec_section([export_entry("recurse", 0x00, 0)])),
		(SEC_CODE, vec_section([code_entry(&[], vec![0x10, 0x00])])), // call 0
	]);
	let parsed = wasmlite::parse::decode_module(&bytes[..]).unwrap();
	let mut store = wasmlite::exec::Store::new();
	let module_addr = wasmlite::exec::link::instantiate(&mut store, &parsed, &Imports::new()).unwrap();
	let func_addr = store.module_instance(module_addr).funcs[0];
	let mut interp = wasmlite::exec::Interpreter::with_max_depth(&mut store, 16);
	let err = interp.call(func_addr, module_addr, &[], &[]).unwrap_err();
	assert!(format!("{err:?}").contains("CallStackExhausted { max_depth: 16 }"));
}
