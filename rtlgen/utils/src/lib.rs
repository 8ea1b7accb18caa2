//! Shared utilities for the RTL code generator.
mod errors;
mod math;
mod out_file;

pub use errors::{Error, ErrorKind, RtlResult};
pub use math::{binary_literal, bits_needed_for, one_hot_literal};
pub use out_file::{OutputFile, write_file};
