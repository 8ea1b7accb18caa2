//! Command line parsing for the RTL generator.
use argh::FromArgs;
use rtlgen_backend::{
    Backend, BackendOpt, LegacyBackend, SystemVerilogBackend, VerilogBackend,
    VhdlBackend,
};
use rtlgen_ir::{BackendConf, Context, Device, FsmEncoding, ResetType};
use rtlgen_utils::{OutputFile, RtlResult};
use std::path::{Path, PathBuf};

#[derive(FromArgs)]
/// Generate Verilog, SystemVerilog or VHDL from a structural design.
pub struct Opts {
    /// input design in JSON
    #[argh(positional)]
    pub file: PathBuf,

    /// output file, `-` for stdout
    #[argh(option, short = 'o', default = "OutputFile::Stdout")]
    pub output: OutputFile,

    /// select a backend
    #[argh(option, short = 'b', default = "BackendOpt::default()")]
    pub backend: BackendOpt,

    /// state assignment of FSMs: auto, one-hot or binary
    #[argh(option, default = "FsmEncoding::Auto")]
    pub fsm_encoding: FsmEncoding,

    /// reset of state registers: no, sync or async
    #[argh(option, default = "ResetType::Sync")]
    pub reset_type: ResetType,

    /// reset is active high
    #[argh(switch)]
    pub level_reset: bool,

    /// initialize registers to zero
    #[argh(switch)]
    pub reg_init_value: bool,

    /// emit timing annotations for functional units
    #[argh(switch)]
    pub timing_simulation: bool,

    /// the top module is memory mapped
    #[argh(switch)]
    pub memory_mapped_top: bool,

    /// interface protocol of the top module
    #[argh(option, default = "String::from(\"minimal\")")]
    pub interface_type: String,

    /// number of contexts of context-switch FSMs
    #[argh(option, default = "1")]
    pub context_switch: u64,

    /// one combinational process per FSM output
    #[argh(switch)]
    pub multi_proc_fsm: bool,

    /// drive datapath selectors to X while waiting for start
    #[argh(switch)]
    pub enable_fsmx: bool,

    /// never collapse FSM bit tests into casez
    #[argh(switch)]
    pub no_casez: bool,

    /// device vendor, overrides the design
    #[argh(option, default = "String::new()")]
    pub vendor: String,

    /// device family, overrides the design
    #[argh(option, default = "String::new()")]
    pub family: String,

    /// logging level
    #[argh(option, long = "log-level", default = "log::LevelFilter::Warn")]
    pub log_level: log::LevelFilter,
}

impl Opts {
    /// Given a context, calls the backend corresponding to the `BackendOpt` variant
    pub fn run_backend(self, ctx: Context) -> RtlResult<()> {
        let aux = match self.backend {
            BackendOpt::Verilog => VerilogBackend.run(&ctx, self.output),
            BackendOpt::SystemVerilog => {
                SystemVerilogBackend.run(&ctx, self.output)
            }
            BackendOpt::Vhdl => VhdlBackend.run(&ctx, self.output),
            BackendOpt::Legacy => LegacyBackend.run(&ctx, self.output),
        }?;
        for path in aux {
            log::info!("Auxiliary file: {}", path.display());
        }
        Ok(())
    }

    pub fn backend_conf(&self) -> BackendConf {
        BackendConf {
            fsm_encoding: self.fsm_encoding,
            reset_type: self.reset_type,
            level_reset: self.level_reset,
            reg_init_value: self.reg_init_value,
            timing_simulation: self.timing_simulation,
            memory_mapped_top: self.memory_mapped_top,
            interface_type: self.interface_type.clone(),
            context_switch: self.context_switch,
            multi_proc_fsm: self.multi_proc_fsm,
            enable_fsmx: self.enable_fsmx,
            fsm_casez: !self.no_casez,
            device: Device {
                vendor: self.vendor.clone(),
                family: self.family.clone(),
            },
        }
    }

    pub fn design_path(&self) -> &Path {
        &self.file
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Opts, argh::EarlyExit> {
        Opts::from_args(&["rtlgen"], args)
    }

    #[test]
    fn defaults() {
        let opts = parse(&["design.json"]).ok().unwrap();
        assert_eq!(opts.backend, BackendOpt::Verilog);
        assert_eq!(opts.backend_conf(), BackendConf::default());
    }

    #[test]
    fn configuration_options() {
        let opts = parse(&[
            "design.json",
            "-b",
            "vhdl",
            "--fsm-encoding",
            "one-hot",
            "--reset-type",
            "async",
            "--no-casez",
            "--context-switch",
            "4",
        ])
        .ok()
        .unwrap();
        let bc = opts.backend_conf();
        assert_eq!(opts.backend, BackendOpt::Vhdl);
        assert_eq!(bc.fsm_encoding, FsmEncoding::OneHot);
        assert_eq!(bc.reset_type, ResetType::Async);
        assert!(!bc.fsm_casez);
        assert_eq!(bc.context_switch, 4);
    }

    #[test]
    fn unknown_backend() {
        assert!(parse(&["design.json", "-b", "firrtl"]).is_err());
    }
}
