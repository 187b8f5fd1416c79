//! `wasmlite`: an embeddable interpreter for WebAssembly 1.0 (MVP) binary
//! modules.
//!
//! - [`parse`] decodes a `.wasm` byte stream into a [`parse::ParsedModule`].
//! - [`exec`] links a parsed module against host-supplied imports and runs
//!   it: [`exec::Store`], [`exec::instantiate`], [`exec::Interpreter`].
//! - [`embed`] is the surface most callers want: [`embed::compile`] and
//!   [`embed::instantiate`] plus the [`embed::Imports`]/[`embed::Instance`]
//!   types for supplying host functions and invoking exports.
//! - [`wasi`] is an optional, minimal `wasi_snapshot_preview1` import set
//!   (`fd_write` only) an embedder can register on top of [`embed::Imports`].
//! - [`cli`] backs the `wasmrun` binary; not meant for embedding.
//!
//! There is no `.wat` text front-end here — only the binary format, per
//! `spec.md`'s scope.

mod codec;
pub mod cli;
pub mod embed;
pub mod error;
pub mod exec;
pub mod parse;
pub mod wasi;

pub use embed::{compile, instantiate, instantiate_with_limits, Extern, Imports, Instance, Limits};
pub use error::Error;
pub use exec::Value;
