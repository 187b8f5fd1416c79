//! Hand-assembled `.wasm` byte builders for the integration suite, in the
//! teacher's own style of inlining raw byte arrays rather than shelling out
//! to an external `wat2wasm`.

pub const MAGIC_AND_VERSION: [u8; 8] = [0x00, 0x61, 0x73, 0x6D, 0x01, 0x00, 0x00, 0x00];

pub fn uleb(v: u64) -> Vec<u8> {
	let mut out = Vec::new();
	leb128::write::unsigned(&mut out, v).unwrap();
	out
}

pub fn sleb(v: i64) -> Vec<u8> {
	let mut out = Vec::new();
	leb128::write::signed(&mut out, v).unwrap();
	out
}

pub fn vec_section(items: impl IntoIterator<Item = Vec<u8>>) -> Vec<u8> {
	let items: Vec<Vec<u8>> = items.into_iter().collect();
	let mut out = uleb(items.len() as u64);
	for item in items {
		out.extend(item);
	}
	out
}

pub fn section(id: u8, body: Vec<u8>) -> Vec<u8> {
	let mut out = vec![id];
	out.extend(uleb(body.len() as u64));
	out.extend(body);
	out
}

pub fn name(s: &str) -> Vec<u8> {
	let mut out = uleb(s.len() as u64);
	out.extend(s.as_bytes());
	out
}

pub fn func_type(params: &[u8], results: &[u8]) -> Vec<u8> {
	let mut out = vec![0x60];
	out.extend(uleb(params.len() as u64));
	out.extend_from_slice(params);
	out.extend(uleb(results.len() as u64));
	out.extend_from_slice(results);
	out
}

pub fn limits_min(min: u32) -> Vec<u8> {
	let mut out = vec![0x00];
	out.extend(uleb(min as u64));
	out
}

pub fn limits_min_max(min: u32, max: u32) -> Vec<u8> {
	let mut out = vec![0x01];
	out.extend(uleb(min as u64));
	out.extend(uleb(max as u64));
	out
}

/// Assembles a complete module from an ordered list of `(id, body)` section
/// pairs, prefixed with the magic/version preamble.
pub fn module(sections: impl IntoIterator<Item = (u8, Vec<u8>)>) -> Vec<u8> {
	let mut out = MAGIC_AND_VERSION.to_vec();
	for (id, body) in sections {
		out.extend(section(id, body));
	}
	out
}

pub const I32: u8 = 0x7F;
pub const I64: u8 = 0x7E;
pub const F32: u8 = 0x7D;
pub const F64: u8 = 0x7C;

pub const SEC_TYPE: u8 = 1;
pub const SEC_IMPORT: u8 = 2;
pub const SEC_FUNCTION: u8 = 3;
pub const SEC_TABLE: u8 = 4;
pub const SEC_MEMORY: u8 = 5;
pub const SEC_GLOBAL: u8 = 6;
pub const SEC_EXPORT: u8 = 7;
pub const SEC_START: u8 = 8;
pub const SEC_ELEMENT: u8 = 9;
pub const SEC_CODE: u8 = 10;
pub const SEC_DATA: u8 = 11;

/// A code-section entry: `(local-decl-count-runs, body-bytes-without-trailing-end)`.
pub fn code_entry(locals: &[(u32, u8)], mut body: Vec<u8>) -> Vec<u8> {
	body.push(0x0B);
	let mut inner = uleb(locals.len() as u64);
	for (count, ty) in locals {
		inner.extend(uleb(*count as u64));
		inner.push(*ty);
	}
	inner.extend(body);
	let mut out = uleb(inner.len() as u64);
	out.extend(inner);
	out
}

pub fn export_entry(name_str: &str, kind: u8, index: u32) -> Vec<u8> {
	let mut out = name(name_str);
	out.push(kind);
	out.extend(uleb(index as u64));
	out
}
