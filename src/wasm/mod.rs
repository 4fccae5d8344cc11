//! WebAssembly bindings.
//!
//! JavaScript-callable interface to the simulator and assembler, built with
//! the `wasm` feature.

pub mod api;

pub use api::Emulator;
