use rtlgen_ir::Context;
use rtlgen_utils::{OutputFile, RtlResult};
use std::path::PathBuf;

/// A backend for the RTL generator.
pub trait Backend {
    /// The name of this backend.
    fn name(&self) -> &'static str;
    /// Validate the design for emission with this backend. Returns an
    /// Err(..) if the design has constructs the backend cannot express.
    fn validate(ctx: &Context) -> RtlResult<()>;
    /// Write the design to `file`. Returns the auxiliary files the design
    /// needs next to it.
    fn emit(ctx: &Context, file: &mut OutputFile) -> RtlResult<Vec<PathBuf>>;
    /// Convenience function to validate and emit the design.
    fn run(&self, ctx: &Context, mut file: OutputFile) -> RtlResult<Vec<PathBuf>>
    where
        Self: Sized,
    {
        Self::validate(ctx)?;
        Self::emit(ctx, &mut file)
    }
}
