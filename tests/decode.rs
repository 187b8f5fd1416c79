mod common;

use common::*;
use wasmlite::parse::{decode_module, ExternalKind, ParseError, ValType};

#[test]
fn empty_module_decodes() {
	let bytes = module([]);
	let parsed = decode_module(&bytes[..]).unwrap();
	assert!(parsed.types.is_empty());
	assert!(parsed.code.is_empty());
}

#[test]
fn bad_magic_is_rejected() {
	let bytes = vec![0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00];
	assert!(matches!(decode_module(&bytes[..]), Err(ParseError::BadMagic)));
}

#[test]
fn unsupported_version_is_rejected() {
	let bytes = vec![0x00, 0x61, 0x73, 0x6D, 0x02, 0x00, 0x00, 0x00];
	assert!(matches!(decode_module(&bytes[..]), Err(ParseError::UnsupportedVersion(_))));
}

#[test]
fn type_section_round_trips() {
	let bytes = module([(SEC_TYPE, vec_section([func_type(&[I32, I32], &[I32])]))]);
	let parsed = decode_module(&bytes[..]).unwrap();
	assert_eq!(parsed.types.len(), 1);
	assert_eq!(parsed.types[0].params, vec![ValType::I32, ValType::I32]);
	assert_eq!(parsed.types[0].results, vec![ValType::I32]);
}

#[test]
fn duplicate_section_is_rejected() {
	let mut bytes = module([(SEC_TYPE, vec_section([func_type(&[], &[])]))]);
	bytes.extend(section(SEC_TYPE, vec_section([func_type(&[], &[])])));
	assert!(matches!(decode_module(&bytes[..]), Err(ParseError::DuplicateSection { id: 1 })));
}

#[test]
fn unknown_section_id_is_skipped_not_fatal() {
	// Section id 63 is unassigned; the decoder must skip it rather than
	// error or panic (it used to index out of bounds on ids >= 13).
	let mut bytes = module([]);
	bytes.extend(section(63, vec![0xAA, 0xBB]));
	let parsed = decode_module(&bytes[..]).unwrap();
	assert!(parsed.types.is_empty());
}

#[test]
fn function_code_count_mismatch_is_rejected() {
	let bytes = module([
		(SEC_TYPE, vec_section([func_type(&[], &[])])),
		(SEC_FUNCTION, vec_section([uleb(0)])),
	]);
	assert!(matches!(decode_module(&bytes[..]), Err(ParseError::FunctionCodeCountMismatch { functions: 1, code: 0 })));
}

#[test]
fn invalid_opcode_is_rejected() {
	let bytes = module([
		(SEC_TYPE, vec_section([func_type(&[], &[])])),
		(SEC_FUNCTION, vec_section([uleb(0)])),
		(SEC_CODE, vec_section([code_entry(&[], vec![0xFF])])),
	]);
	assert!(matches!(decode_module(&bytes[..]), Err(ParseError::InvalidOpcode(0xFF))));
}

#[test]
fn export_section_decodes_kind_and_index() {
	let bytes = module([
		(SEC_TYPE, vec_section([func_type(&[], &[])])),
		(SEC_FUNCTION, vec_section([uleb(0)])),
		(SEC_EXPORT, vec_section([export_entry("run", 0x00, 0)])),
		(SEC_CODE, vec_section([code_entry(&[], vec![])])),
	]);
	let parsed = decode_module(&bytes[..]).unwrap();
	assert_eq!(parsed.exports.len(), 1);
	assert_eq!(parsed.exports[0].name, "run");
	assert_eq!(parsed.exports[0].kind, ExternalKind::Func);
	assert_eq!(parsed.exports[0].index, 0);
}

#[test]
fn custom_sections_are_retained() {
	let mut body = name("producers");
	body.extend([0x01, 0x02, 0x03]);
	let bytes = module([(0, body)]);
	let parsed = decode_module(&bytes[..]).unwrap();
	assert_eq!(parsed.customs.len(), 1);
	assert_eq!(parsed.customs[0].name, "producers");
	assert_eq!(parsed.customs[0].bytes, vec![0x01, 0x02, 0x03]);
}
