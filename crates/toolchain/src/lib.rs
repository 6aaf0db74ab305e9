//! # T6Inject Toolchain
//!
//! Drives the external gsc-tool compiler.
//!
//! ## Operations
//! - [`Toolchain::check_syntax`]: one `-m parse` run per script, results in
//!   input order
//! - [`Toolchain::compile`]: concatenate scripts into the staging file, run
//!   `-m comp` once, return the compiled bytes
//!
//! gsc-tool's exit code is never consulted. A run failed if it wrote a
//! diagnostic line to stderr (see [`t6inject_core::DiagnosticRule`]).
//!
//! Each operation returns only after every gsc-tool process it started has
//! exited and its output has been drained. Compiles against one toolchain
//! directory share fixed staging paths and must not overlap.

mod args;
mod process;
mod toolchain;

#[cfg(all(test, unix))]
mod testing;

pub use args::{build_args, Mode};
pub use toolchain::Toolchain;
