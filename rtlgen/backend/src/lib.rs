//! HDL backends of the RTL generator: Verilog, SystemVerilog and VHDL
//! writers over the structural design, including FSM synthesis.
mod backend_opt;
mod backends;
mod collector;
mod emitter;
pub mod fsm;
mod manager;
pub mod params;
pub mod sanitize;
mod traits;
mod verilog;
mod vhdl;
pub mod width;
mod writer;

pub use backend_opt::BackendOpt;
pub use backends::{LegacyBackend, SystemVerilogBackend, VerilogBackend, VhdlBackend};
pub use collector::{ComponentCollector, mod_typename};
pub use emitter::{ModuleEmitter, param_decls};
pub use manager::{GeneratedFile, HdlManager, HdlOutput, make_writer};
pub use traits::Backend;
pub use verilog::VerilogWriter;
pub use vhdl::{SUPPORT_PACKAGE, VhdlWriter};
pub use writer::{Actual, Binding, HdlWriter, Indented, ParamDecl, Segment};
