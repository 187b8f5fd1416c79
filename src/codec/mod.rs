//! Low-level byte decoding primitives shared by the module decoder: LEB128,
//! little-endian IEEE-754, length-prefixed vectors and strings, and a
//! section-size-bounded sub-reader.

mod reader;

pub use reader::ByteReader;
