//! Driver for the RTL generator.
use crate::cmdline::Opts;
use rtlgen_ir::Design;
use rtlgen_utils::RtlResult;

/// Run the generator from the command line.
pub fn run_generator() -> RtlResult<()> {
    // parse the command line arguments into Opts struct
    let opts: Opts = argh::from_env();

    // enable tracing
    env_logger::Builder::new()
        .format_timestamp(None)
        .filter_level(opts.log_level)
        .target(env_logger::Target::Stderr)
        .init();

    let design = Design::from_file(opts.design_path())?;
    let ctx = design.into_context(opts.backend_conf());
    log::debug!("Backend configuration: {:?}", ctx.bc);

    opts.run_backend(ctx)
}
