mod common;

use common::*;
use wasmlite::exec::{LinkError, Store, Trap};
use wasmlite::parse::{decode_module, FunctionType, ValType};
use wasmlite::{Extern, Imports};

fn add_one_module_with_import() -> Vec<u8> {
	module([
		(SEC_TYPE, vec_section([func_type(&[I32], &[I32])])),
		(SEC_IMPORT, vec_section([{
			let mut entry = name("env");
			entry.extend(name("helper"));
			entry.push(0x00);
			entry.extend(uleb(0));
			entry
		}])),
	])
}

#[test]
fn missing_import_is_a_link_error() {
	let bytes = add_one_module_with_import();
	let parsed = decode_module(&bytes[..]).unwrap();
	let imports = Imports::new();
	let mut store = Store::new();
	let result = wasmlite::exec::link::instantiate(&mut store, &parsed, &imports);
	assert!(matches!(result, Err(LinkError::ImportMissing { .. })));
}

#[test]
fn import_signature_mismatch_is_a_link_error() {
	let bytes = add_one_module_with_import();
	let parsed = decode_module(&bytes[..]).unwrap();
	let mut imports = Imports::new();
	let wrong_ty = FunctionType { params: vec![ValType::I64], results: vec![ValType::I32] };
	imports.define("env", "helper", Extern::func(wrong_ty, |_, _, _, _| Ok(None)));
	let mut store = Store::new();
	let result = wasmlite::exec::link::instantiate(&mut store, &parsed, &imports);
	assert!(matches!(result, Err(LinkError::ImportSignatureMismatch { .. })));
}

#[test]
fn invalid_limits_is_a_link_error() {
	let bytes = module([(SEC_MEMORY, vec_section([limits_min_max(5, 2)]))]);
	let parsed = decode_module(&bytes[..]).unwrap();
	let imports = Imports::new();
	let mut store = Store::new();
	let result = wasmlite::exec::link::instantiate(&mut store, &parsed, &imports);
	assert!(matches!(result, Err(LinkError::InvalidLimits { min: 5, max: 2 })));
}

#[test]
fn element_segment_out_of_bounds_traps_during_instantiation() {
	let bytes = module([
		(SEC_TYPE, vec_section([func_type(&[], &[])])),
		(SEC_FUNCTION, vec_section([uleb(0)])),
		(SEC_TABLE, vec_section([{
			let mut t = vec![0x70];
			t.extend(limits_min(1));
			t
		}])),
		(SEC_ELEMENT, vec_section([{
			let mut e = uleb(0); // table index 0
			e.extend([0x41]); // i32.const
			e.extend(sleb(5)); // offset 5, past the table's single slot
			e.push(0x0B);
			e.extend(vec_section([uleb(0)])); // one func index: 0
			e
		}])),
		(SEC_CODE, vec_section([code_entry(&[], vec![])])),
	]);
	let parsed = decode_module(&bytes[..]).unwrap();
	let imports = Imports::new();
	let mut store = Store::new();
	let result = wasmlite::exec::link::instantiate(&mut store, &parsed, &imports);
	assert!(matches!(result, Err(Trap::ElementSegmentOutOfBounds { .. })));
}

#[test]
fn host_function_import_succeeds_and_is_callable() {
	let bytes = add_one_module_with_import();
	let parsed = decode_module(&bytes[..]).unwrap();
	let mut imports = Imports::new();
	let ty = FunctionType { params: vec![ValType::I32], results: vec![ValType::I32] };
	imports.define("env", "helper", Extern::func(ty, |_, _, _, args| {
		Ok(Some(wasmlite::Value::from(args[0].as_i32().unwrap() + 1)))
	}));
	let mut store = Store::new();
	let module_addr = wasmlite::exec::link::instantiate(&mut store, &parsed, &imports).unwrap();
	let func_addr = store.module_instance(module_addr).funcs[0];
	let mut interp = wasmlite::exec::Interpreter::new(&mut store);
	let result = interp.call(func_addr, module_addr, &[], &[wasmlite::Value::from(41i32)]).unwrap();
	assert_eq!(result, Some(wasmlite::Value::from(42i32)));
}
