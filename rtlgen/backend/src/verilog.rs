//! Verilog and SystemVerilog writer.
use crate::fsm::{
    Action, Branches, Condition, FsmPlan, FsmProcess, GuardTest, InputTest, OutputBit,
    ProcessOwner, SELECTOR_REGISTER_FILE,
};
use crate::params::{LibraryRef, verilog_param_value};
use crate::width::{BitRange, Slice, WidthSource, port_range, signal_range, signal_vector_range};
use crate::writer::{Actual, Binding, HdlWriter, Indented, ParamDecl};
use itertools::Itertools;
use rtlgen_ir::{
    BackendConf, Direction, FuTiming, Internal, Language, Module, Port, ResetType, TypeKind,
};
use rtlgen_utils::{Error, RtlResult};
use std::fmt::Write;

/// Simulators known to provide `$clog2`.
const CLOG2_SIMULATORS: &[&str] = &[
    "__ICARUS__",
    "VERILATOR",
    "MODEL_TECH",
    "VCS",
    "NCVERILOG",
    "XILINX_SIMULATOR",
    "XILINX_ISIM",
];

/// Device families whose synthesis flow does not accept `?` in casez labels.
const NO_WILDCARD_FAMILIES: &[&str] = &["lattice", "nanoxplore", "yosys"];

const PRESENT_STATE: &str = "_present_state";
const NEXT_STATE: &str = "_next_state";

pub struct VerilogWriter {
    out: Indented,
    system_verilog: bool,
    /// Collapse single-input bit-test chains into `casez`.
    casez: bool,
    /// Use `0` instead of `?` in casez labels.
    no_wildcards: bool,
}

fn range_text(range: &BitRange, ascending: bool) -> String {
    if ascending {
        format!("[{}:{}] ", range.lsb, range.msb)
    } else {
        format!("[{}:{}] ", range.msb, range.lsb)
    }
}

fn slice_text(slice: &Slice, ascending: bool) -> String {
    match slice {
        Slice::Index(i) => format!("[{}]", i),
        Slice::Range(r) if ascending => format!("[{}:{}]", r.lsb, r.msb),
        Slice::Range(r) => format!("[{}:{}]", r.msb, r.lsb),
    }
}

fn signedness(kind: TypeKind) -> &'static str {
    match kind {
        TypeKind::Int | TypeKind::VectorInt => "signed ",
        _ => "",
    }
}

fn bit_value(bit: OutputBit) -> &'static str {
    match bit {
        OutputBit::One => "1'b1",
        OutputBit::Unknown => "1'bX",
        OutputBit::Zero | OutputBit::DontCare => "1'b0",
    }
}

impl VerilogWriter {
    pub fn new(language: Language, bc: &BackendConf) -> Self {
        let family = bc.device.family.to_lowercase();
        Self {
            out: Indented::default(),
            system_verilog: language == Language::SystemVerilog,
            casez: bc.fsm_casez,
            no_wildcards: NO_WILDCARD_FAMILIES.iter().any(|f| family.contains(f)),
        }
    }

    fn net(&self) -> &'static str {
        if self.system_verilog { "logic" } else { "wire" }
    }

    fn var(&self) -> &'static str {
        if self.system_verilog { "logic" } else { "reg" }
    }

    fn comb_block(&self) -> &'static str {
        if self.system_verilog {
            "always_comb"
        } else {
            "always @(*)"
        }
    }

    fn present_state(&self, plan: &FsmPlan) -> String {
        if plan.context_switch {
            format!("{}[{}]", PRESENT_STATE, SELECTOR_REGISTER_FILE)
        } else {
            PRESENT_STATE.to_string()
        }
    }

    fn state_literal(&self, plan: &FsmPlan, ordinal: u64) -> String {
        let width = plan.encoding.width();
        if plan.encoding.is_one_hot() {
            format!("{}'b{}", width, plan.encoding.code(ordinal))
        } else {
            format!("{}'d{}", width, ordinal)
        }
    }

    fn state_range(&self, plan: &FsmPlan) -> String {
        range_text(&BitRange::literal(plan.encoding.width() - 1, 0), false)
    }

    fn test(&self, test: &InputTest, alt: &GuardTest) -> String {
        let name = self.id(&test.port.name);
        match *alt {
            GuardTest::Bit(_) if test.width == 1 => format!("{} == 1'b1", name),
            GuardTest::Bit(k) => format!("{}[{}] == 1'b1", name, k),
            GuardTest::Value(v) if test.width == 1 => format!("{} == 1'b{}", name, v),
            GuardTest::Value(v) if v < 0 => {
                format!("{} == -{}'d{}", name, test.width, v.unsigned_abs())
            }
            GuardTest::Value(v) => format!("{} == {}'d{}", name, test.width, v),
        }
    }

    fn condition(&self, cond: &Condition) -> String {
        cond.iter()
            .map(|t| match t.alternatives.as_slice() {
                [alt] => self.test(t, alt),
                alts => format!("({})", alts.iter().map(|a| self.test(t, a)).join(" || ")),
            })
            .join(" && ")
    }

    fn action(&mut self, plan: &FsmPlan, action: &Action) -> RtlResult<()> {
        if let Some(next) = &action.next_state {
            writeln!(self.out, "{} = {};", NEXT_STATE, next)?;
        }
        for (i, bit) in &action.outputs {
            writeln!(self.out, "{} = {};", self.id(&plan.outputs[*i].name), bit_value(*bit))?;
        }
        Ok(())
    }

    fn block(&mut self, plan: &FsmPlan, action: &Action) -> RtlResult<()> {
        writeln!(self.out, "begin")?;
        self.out.indent();
        self.action(plan, action)?;
        self.out.dedent();
        writeln!(self.out, "end")?;
        Ok(())
    }

    fn casez_label(&self, width: u64, bit: u32) -> String {
        let wildcard = if self.no_wildcards { '0' } else { '?' };
        (0..width)
            .rev()
            .map(|j| match j.cmp(&(bit as u64)) {
                std::cmp::Ordering::Equal => '1',
                std::cmp::Ordering::Less => '0',
                std::cmp::Ordering::Greater => wildcard,
            })
            .collect()
    }

    fn branches(&mut self, plan: &FsmPlan, branches: &Branches) -> RtlResult<()> {
        match branches {
            Branches::None => Ok(()),
            Branches::Unconditional(action) => self.action(plan, action),
            Branches::Chain { arms, otherwise } => {
                if self.casez {
                    if let Some(case) = branches.as_priority_case() {
                        writeln!(self.out, "casez ({})", self.id(&case.port.name))?;
                        self.out.indent();
                        for (bit, action) in &case.arms {
                            writeln!(
                                self.out,
                                "{}'b{} :",
                                case.width,
                                self.casez_label(case.width, *bit)
                            )?;
                            self.block(plan, action)?;
                        }
                        writeln!(self.out, "default :")?;
                        self.block(plan, case.otherwise)?;
                        self.out.dedent();
                        writeln!(self.out, "endcase")?;
                        return Ok(());
                    }
                }
                for (i, (cond, action)) in arms.iter().enumerate() {
                    let kw = if i == 0 { "if" } else { "else if" };
                    writeln!(self.out, "{} ({})", kw, self.condition(cond))?;
                    self.block(plan, action)?;
                }
                writeln!(self.out, "else")?;
                self.block(plan, otherwise)
            }
        }
    }

    fn param_text(&self, param: &ParamDecl) -> String {
        match param {
            ParamDecl::Memory { name, value, .. } => {
                format!("{}={}", self.id(name), verilog_param_value(value))
            }
            ParamDecl::Value { name, default, .. } => format!(
                "{}={}",
                self.id(name),
                default.as_deref().map_or("0".to_string(), verilog_param_value)
            ),
            ParamDecl::Port(g) => format!("{}={}", self.id(&g.name), g.default),
        }
    }
}

impl HdlWriter for VerilogWriter {
    fn language(&self) -> Language {
        if self.system_verilog {
            Language::SystemVerilog
        } else {
            Language::Verilog
        }
    }

    fn take_text(&mut self) -> String {
        self.out.take()
    }

    fn needs_conversions(&self) -> bool {
        false
    }

    fn comment(&mut self, text: &str) -> RtlResult<()> {
        for line in text.lines() {
            writeln!(self.out, "// {}", line)?;
        }
        Ok(())
    }

    fn file_header(&mut self) -> RtlResult<()> {
        for sim in CLOG2_SIMULATORS {
            writeln!(self.out, "`ifdef {}\n  `define _SIM_HAVE_CLOG2\n`endif", sim)?;
        }
        writeln!(self.out)?;
        Ok(())
    }

    fn library_decl(&mut self, _module: &Module) -> RtlResult<()> {
        Ok(())
    }

    fn module_decl(&mut self, module: &Module, name: &str) -> RtlResult<()> {
        let ports = module
            .ordered_ports()
            .iter()
            .filter(|p| p.direction != Direction::Gen)
            .map(|p| self.id(&p.name).into_owned())
            .join(", ");
        writeln!(self.out, "`timescale 1ns / 1ps\nmodule {}({});", self.id(name), ports)?;
        self.out.indent();
        Ok(())
    }

    fn parametrization_decl(&mut self, params: &[ParamDecl]) -> RtlResult<()> {
        if params.is_empty() {
            return Ok(());
        }
        let text = params.iter().map(|p| self.param_text(p)).join(", ");
        writeln!(self.out, "parameter {};", text)?;
        Ok(())
    }

    fn param_value(&self, _kind: TypeKind, value: &str) -> String {
        verilog_param_value(value)
    }

    fn port_decl_header(&mut self) -> RtlResult<()> {
        Ok(())
    }

    fn port_decl(&mut self, port: &Port, lib: &LibraryRef, _last: bool) -> RtlResult<()> {
        let dir = match port.direction {
            Direction::In => "input",
            Direction::Out => "output",
            Direction::Inout => "inout",
            Direction::Gen => {
                return Err(Error::unsupported(format!(
                    "generic port `{}' cannot be declared",
                    port.name
                )));
            }
        };
        let ty = if port.ty.kind == TypeKind::Other {
            format!("{} ", port.ty.id_type)
        } else {
            let range = port_range(port, lib)?
                .map(|r| range_text(&r, port.reverse))
                .unwrap_or_default();
            format!("{}{}", signedness(port.ty.kind), range)
        };
        writeln!(self.out, "{} {}{};", dir, ty, self.id(&port.name))?;
        Ok(())
    }

    fn port_decl_tail(&mut self) -> RtlResult<()> {
        Ok(())
    }

    fn internal_decl(&mut self, _name: &str) -> RtlResult<()> {
        Ok(())
    }

    fn timing_spec(&mut self, module: &Module, timing: &FuTiming) -> RtlResult<()> {
        let ins: Vec<_> = module.ports_with(Direction::In).collect();
        let outs: Vec<_> = module.ports_with(Direction::Out).collect();
        writeln!(self.out)?;
        self.comment("Timing annotations")?;
        writeln!(self.out, "specify")?;
        self.out.indent();
        let selected = timing.operations.len() > 1;
        for op in &timing.operations {
            let guard = if selected {
                format!("if (sel_{} == 1'b1) ", op.name)
            } else {
                String::new()
            };
            if op.pin_delays.is_empty() {
                for out in &outs {
                    for input in &ins {
                        writeln!(
                            self.out,
                            "{}({} *> {}) = {};",
                            guard,
                            self.id(&input.name),
                            self.id(&out.name),
                            op.execution_time
                        )?;
                    }
                }
            } else {
                for d in &op.pin_delays {
                    writeln!(self.out, "{}({} *> {}) = {};", guard, d.from, d.to, d.delay)?;
                }
            }
        }
        self.out.dedent();
        writeln!(self.out, "endspecify\n")?;
        Ok(())
    }

    fn component_decl(
        &mut self,
        _name: &str,
        _def: &Module,
        _lib: &LibraryRef,
        _params: &[ParamDecl],
    ) -> RtlResult<()> {
        Ok(())
    }

    fn signal_decl(&mut self, internal: &Internal) -> RtlResult<()> {
        match internal {
            Internal::Signal(s) => {
                let ty = if s.ty.kind == TypeKind::Other {
                    format!("{} ", s.ty.id_type)
                } else {
                    let range = signal_range(s)?
                        .map(|r| range_text(&r, false))
                        .unwrap_or_default();
                    format!("{} {}{}", self.net(), signedness(s.ty.kind), range)
                };
                writeln!(self.out, "{}{};", ty, self.id(&s.name))?;
            }
            Internal::SignalVector(sv) => {
                writeln!(
                    self.out,
                    "{} {}{}{};",
                    self.net(),
                    signedness(sv.ty.kind),
                    range_text(&signal_vector_range(sv)?, false),
                    self.id(&sv.name)
                )?;
            }
            Internal::Bus(b) => {
                return Err(Error::unsupported(format!(
                    "bus connection `{}' is not supported",
                    b.name
                )));
            }
            Internal::Module(_) | Internal::Constant(_) => (),
        }
        Ok(())
    }

    fn definition_begin(&mut self) -> RtlResult<()> {
        writeln!(self.out)?;
        Ok(())
    }

    fn builtin(&mut self, inst: &Module, output: &Actual, inputs: &[Actual]) -> RtlResult<()> {
        let gate = match inst.type_name.as_str() {
            "AND_GATE" => "and",
            "NAND_GATE" => "nand",
            "OR_GATE" => "or",
            "NOR_GATE" => "nor",
            "XOR_GATE" => "xor",
            "XNOR_GATE" => "xnor",
            "NOT_GATE" => "not",
            "DFF_GATE" => "dff",
            "BUFF_GATE" => "buf",
            other => {
                return Err(Error::unsupported(format!(
                    "builtin gate `{}' has no Verilog primitive",
                    other
                )));
            }
        };
        let args = std::iter::once(output)
            .chain(inputs)
            .map(|a| self.render(a))
            .join(", ");
        writeln!(self.out, "{} {}_{}( {});", gate, gate, self.id(&inst.name), args)?;
        Ok(())
    }

    fn instance_begin(
        &mut self,
        inst_name: &str,
        def_name: &str,
        params: &[(String, String)],
    ) -> RtlResult<()> {
        write!(self.out, "{} ", self.id(def_name))?;
        if !params.is_empty() {
            let list = params
                .iter()
                .map(|(n, v)| format!(".{}({})", self.id(n), v))
                .join(", ");
            write!(self.out, "#({}) ", list)?;
        }
        write!(self.out, "{} (", self.id(inst_name))?;
        Ok(())
    }

    fn port_binding(&mut self, port: &Port, binding: &Binding, any_bound: &mut bool) -> RtlResult<()> {
        let Binding::Segments(segments) = binding else {
            return Ok(());
        };
        let expr = match segments.as_slice() {
            [single] => self.render(&single.actual),
            many => format!("{{{}}}", many.iter().map(|s| self.render(&s.actual)).join(", ")),
        };
        let sep = if *any_bound { ", " } else { "" };
        write!(self.out, "{}.{}({})", sep, self.id(&port.name), expr)?;
        *any_bound = true;
        Ok(())
    }

    fn instance_end(&mut self) -> RtlResult<()> {
        writeln!(self.out, ");")?;
        Ok(())
    }

    fn render(&self, actual: &Actual) -> String {
        match actual {
            Actual::Object {
                name,
                slice,
                ascending,
                ..
            } => {
                let slice = slice
                    .as_ref()
                    .map(|s| slice_text(s, *ascending))
                    .unwrap_or_default();
                format!("{}{}", self.id(name), slice)
            }
            Actual::Literal { bits, .. } => format!("{}'b{}", bits.len(), bits),
            Actual::Zero {
                bool_scalar: true, ..
            } => "1'b0".to_string(),
            Actual::Zero {
                width: WidthSource::Literal(w),
                ..
            } => format!("{}'b{}", w, "0".repeat(*w as usize)),
            Actual::Zero { width, .. } => format!("{{({}){{1'b0}}}}", width.expr()),
        }
    }

    fn assign(&mut self, lhs: &Actual, rhs: &Actual) -> RtlResult<()> {
        let (l, r) = (self.render(lhs), self.render(rhs));
        if l != r {
            writeln!(self.out, "assign {} = {};", l, r)?;
        }
        Ok(())
    }

    fn equation(&mut self, module: &Module, text: &str) -> RtlResult<()> {
        for stmt in text.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            if !stmt.contains('=') {
                return Err(Error::malformed(format!(
                    "equation `{}' of `{}' is not an assignment",
                    stmt, module.type_name
                )));
            }
            writeln!(self.out, "assign {};", stmt)?;
        }
        Ok(())
    }

    fn opaque_text(&mut self, text: &str, bc: &BackendConf) -> RtlResult<()> {
        let edge = match (bc.reset_type, bc.level_reset) {
            (ResetType::Async, false) => "or negedge reset",
            (ResetType::Async, true) => "or posedge reset",
            _ => "",
        };
        let value = if bc.level_reset {
            "reset == 1'b1"
        } else {
            "reset == 1'b0"
        };
        let init = if bc.reg_init_value { "=0" } else { "" };
        let text = text
            .replace("1RESET_EDGE", edge)
            .replace("1RESET_VALUE", value)
            .replace("1INIT_ZERO_VALUE", init);
        write!(self.out, "{}", text)?;
        if !text.ends_with('\n') {
            writeln!(self.out)?;
        }
        Ok(())
    }

    fn state_decl(&mut self, plan: &FsmPlan) -> RtlResult<()> {
        let range = self.state_range(plan);
        let states = plan
            .fsm
            .states
            .iter()
            .map(|s| format!("{} = {}", s.name, self.state_literal(plan, s.ordinal)))
            .join(",\n  ");
        writeln!(self.out, "parameter {}{};", range, states)?;
        if plan.context_switch {
            writeln!(
                self.out,
                "{} {}{}[{}:0];",
                self.var(),
                range,
                PRESENT_STATE,
                plan.contexts - 1
            )?;
            writeln!(self.out, "{} {}{};", self.var(), range, NEXT_STATE)?;
            writeln!(self.out, "integer i;\ninitial begin")?;
            self.out.indent();
            writeln!(self.out, "for (i = 0; i < {}; i = i + 1) begin", plan.contexts)?;
            writeln!(
                self.out,
                "  {}[i] = {}'b{};",
                PRESENT_STATE,
                plan.encoding.width(),
                plan.reset_code()
            )?;
            writeln!(self.out, "end")?;
            self.out.dedent();
            writeln!(self.out, "end")?;
        } else {
            writeln!(self.out, "{} {}{}, {};", self.var(), range, PRESENT_STATE, NEXT_STATE)?;
        }
        for port in &plan.outputs {
            let range = port_range(port, &plan.lib)?
                .map(|r| range_text(&r, port.reverse))
                .unwrap_or_default();
            writeln!(self.out, "{} {}{};", self.var(), range, self.id(&port.name))?;
        }
        Ok(())
    }

    fn present_state_update(&mut self, plan: &FsmPlan, bc: &BackendConf) -> RtlResult<()> {
        let clock = self.id(&plan.fsm.clock_port).into_owned();
        let reset = self.id(&plan.fsm.reset_port).into_owned();
        let edges = match (bc.reset_type, bc.level_reset) {
            (ResetType::Async, false) => format!("posedge {} or negedge {}", clock, reset),
            (ResetType::Async, true) => format!("posedge {} or posedge {}", clock, reset),
            _ => format!("posedge {}", clock),
        };
        let block = if self.system_verilog {
            "always_ff"
        } else {
            "always"
        };
        let present = self.present_state(plan);
        let reset_state = &plan.fsm.reset_state;
        writeln!(self.out, "// function that updates the present state\n{} @({})", block, edges)?;
        self.out.indent();
        let active = if bc.level_reset { "1'b1" } else { "1'b0" };
        writeln!(self.out, "if ({} == {})", reset, active)?;
        writeln!(self.out, "  {} <= {};", present, reset_state)?;
        writeln!(self.out, "else")?;
        writeln!(self.out, "  {} <= {};", present, NEXT_STATE)?;
        self.out.dedent();
        if plan.exports_state {
            writeln!(self.out, "assign present_state = {};", present)?;
            writeln!(self.out, "assign next_state = {};", NEXT_STATE)?;
        }
        Ok(())
    }

    fn transition_process(
        &mut self,
        index: usize,
        plan: &FsmPlan,
        process: &FsmProcess,
    ) -> RtlResult<()> {
        let what = match process.owner {
            ProcessOwner::All => "outputs and next state".to_string(),
            ProcessOwner::Output(i) => format!("output `{}'", plan.outputs[i].name),
            ProcessOwner::NextState => "next state".to_string(),
        };
        writeln!(self.out)?;
        self.comment(&format!("process {}: {}", index, what))?;
        writeln!(self.out, "{}\nbegin", self.comb_block())?;
        self.out.indent();
        for i in &process.default_outputs {
            writeln!(self.out, "{} = 1'b0;", self.id(&plan.outputs[*i].name))?;
        }
        if process.default_next_state {
            writeln!(self.out, "{} = {};", NEXT_STATE, plan.fsm.reset_state)?;
        }
        writeln!(self.out, "case ({})", self.present_state(plan))?;
        self.out.indent();
        let start = self.id(&plan.fsm.start_port).into_owned();
        for arm in &process.arms {
            writeln!(self.out, "{} :", arm.state.name)?;
            if arm.wait_for_start.is_some() {
                writeln!(self.out, "if({} == 1'b1)", start)?;
            }
            writeln!(self.out, "begin")?;
            self.out.indent();
            for (i, bit) in &arm.state_outputs {
                writeln!(self.out, "{} = {};", self.id(&plan.outputs[*i].name), bit_value(*bit))?;
            }
            self.branches(plan, &arm.branches)?;
            self.out.dedent();
            writeln!(self.out, "end")?;
            if let Some(wait) = &arm.wait_for_start {
                writeln!(self.out, "else")?;
                self.block(plan, wait)?;
            }
        }
        writeln!(self.out, "default :")?;
        self.block(plan, &process.default_arm)?;
        self.out.dedent();
        writeln!(self.out, "endcase")?;
        self.out.dedent();
        writeln!(self.out, "end")?;
        Ok(())
    }

    fn definition_end(&mut self, _name: &str) -> RtlResult<()> {
        self.out.dedent();
        writeln!(self.out, "\nendmodule\n")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::Segment;
    use rtlgen_ir::{FsmEncoding, OperationTiming, PinDelay, TypeDescriptor};

    fn writer() -> VerilogWriter {
        VerilogWriter::new(Language::Verilog, &BackendConf::default())
    }

    fn fsm_module(text: &str) -> Module {
        let mut m = Module::new("ctrl", "controller")
            .with_port(Port::new("clock", Direction::In, TypeDescriptor::bool()))
            .with_port(Port::new("reset", Direction::In, TypeDescriptor::bool()))
            .with_port(Port::new("start_port", Direction::In, TypeDescriptor::bool()))
            .with_port(Port::new("cond", Direction::In, TypeDescriptor::uint(4)))
            .with_port(Port::new("done_port", Direction::Out, TypeDescriptor::bool()));
        m.behavior.fsm = Some(text.to_string());
        m
    }

    const TEXT: &str = "S_0 reset start_port clock;\
        S_0 0:- S_1 0;\
        S_1 0:&0 S_2 1:&1 S_0 0:- S_1 0;\
        S_2 1:- S_0 0;";

    fn render_fsm(bc: &BackendConf) -> String {
        let m = fsm_module(TEXT);
        let plan = FsmPlan::new(&m, TEXT, false, bc).unwrap();
        let mut w = VerilogWriter::new(Language::Verilog, bc);
        w.fsm(&plan, bc).unwrap();
        w.take_text()
    }

    #[test]
    fn module_interface() {
        let m = Module::new("t", "adder")
            .with_port(Port::new("a", Direction::In, TypeDescriptor::int(8)))
            .with_port(Port::new("o", Direction::Out, TypeDescriptor::uint(8)));
        let mut w = writer();
        w.module_decl(&m, "adder").unwrap();
        for p in m.ordered_ports() {
            w.port_decl(p, &LibraryRef::default(), false).unwrap();
        }
        w.definition_end("adder").unwrap();
        assert_eq!(
            w.take_text(),
            "`timescale 1ns / 1ps\nmodule adder(a, o);\n  input signed [7:0] a;\n  output [7:0] o;\n\nendmodule\n\n"
        );
    }

    #[test]
    fn concatenated_binding() {
        let port = Port::new("d", Direction::In, TypeDescriptor::uint(8));
        let binding = Binding::Segments(vec![
            Segment {
                formal: None,
                actual: Actual::sliced("v", Some(Slice::Range(BitRange::literal(7, 4)))),
            },
            Segment {
                formal: None,
                actual: Actual::Zero {
                    width: WidthSource::Literal(4),
                    bool_scalar: false,
                },
            },
        ]);
        let mut w = writer();
        let mut any_bound = false;
        w.instance_begin("r0", "register", &[("BITSIZE_d".into(), "8".into())]).unwrap();
        w.port_binding(&port, &binding, &mut any_bound).unwrap();
        w.port_binding(&port, &Binding::Open, &mut any_bound).unwrap();
        w.instance_end().unwrap();
        assert_eq!(w.take_text(), "register #(.BITSIZE_d(8)) r0 (.d({v[7:4], 4'b0000}));\n");
    }

    #[test]
    fn symbolic_zero() {
        let zero = Actual::Zero {
            width: WidthSource::Symbolic("BITSIZE_a".into()),
            bool_scalar: false,
        };
        assert_eq!(writer().render(&zero), "{(BITSIZE_a){1'b0}}");
    }

    #[test]
    fn binary_fsm() {
        let text = render_fsm(&BackendConf::default());
        assert!(text.contains("parameter [1:0] S_0 = 2'd0,\n  S_1 = 2'd1,\n  S_2 = 2'd2;"));
        assert!(text.contains("reg [1:0] _present_state, _next_state;"));
        assert!(text.contains("always @(posedge clock)"));
        assert!(text.contains("if (reset == 1'b0)\n    _present_state <= S_0;"));
        assert!(text.contains("S_0 :\n    if(start_port == 1'b1)"));
        assert!(text.contains("casez (cond)\n"));
        assert!(text.contains("4'b???1 :"));
        assert!(text.contains("4'b??10 :"));
    }

    #[test]
    fn one_hot_async_fsm_without_casez() {
        let bc = BackendConf {
            fsm_encoding: FsmEncoding::OneHot,
            reset_type: ResetType::Async,
            fsm_casez: false,
            ..Default::default()
        };
        let text = render_fsm(&bc);
        assert!(text.contains("parameter [2:0] S_0 = 3'b001,\n  S_1 = 3'b010,\n  S_2 = 3'b100;"));
        assert!(text.contains("always @(posedge clock or negedge reset)"));
        assert!(text.contains("if (cond[0] == 1'b1)"));
        assert!(text.contains("else if (cond[1] == 1'b1)"));
        assert!(!text.contains("casez"));
    }

    #[test]
    fn timing_annotations() {
        let m = Module::new("t", "mul")
            .with_port(Port::new("a", Direction::In, TypeDescriptor::uint(8)))
            .with_port(Port::new("o", Direction::Out, TypeDescriptor::uint(8)));
        let timing = FuTiming {
            operations: vec![
                OperationTiming {
                    name: "mult".into(),
                    execution_time: 2.5,
                    pin_delays: vec![],
                },
                OperationTiming {
                    name: "add".into(),
                    execution_time: 1.0,
                    pin_delays: vec![PinDelay {
                        from: "a".into(),
                        to: "o".into(),
                        delay: 0.5,
                    }],
                },
            ],
        };
        let mut w = writer();
        w.timing_spec(&m, &timing).unwrap();
        let text = w.take_text();
        assert!(text.contains("specify\n  if (sel_mult == 1'b1) (a *> o) = 2.5;\n"));
        assert!(text.contains("  if (sel_add == 1'b1) (a *> o) = 0.5;\nendspecify\n"));
    }

    #[test]
    fn opaque_reset_placeholders() {
        let bc = BackendConf {
            reset_type: ResetType::Async,
            level_reset: true,
            reg_init_value: true,
            ..Default::default()
        };
        let mut w = writer();
        w.opaque_text(
            "reg q 1INIT_ZERO_VALUE;\nalways @(posedge clock 1RESET_EDGE)\n  if (1RESET_VALUE) q <= 0;",
            &bc,
        )
        .unwrap();
        assert_eq!(
            w.take_text(),
            "reg q =0;\nalways @(posedge clock or posedge reset)\n  if (reset == 1'b1) q <= 0;\n"
        );
    }

    #[test]
    fn fsm_outputs_sized_by_library_generics() {
        let text = "S_0 reset start_port clock;S_0 0:- S_1 0;S_1 1:- S_0 1;";
        let mut m = Module::new("ctrl", "counter")
            .with_port(Port::new("clock", Direction::In, TypeDescriptor::bool()))
            .with_port(Port::new("reset", Direction::In, TypeDescriptor::bool()))
            .with_port(Port::new("start_port", Direction::In, TypeDescriptor::bool()))
            .with_port(Port::new("count", Direction::Out, TypeDescriptor::uint(0)));
        m.behavior.fsm = Some(text.to_string());
        m.behavior.library = Some("counter count".to_string());
        let bc = BackendConf::default();
        let plan = FsmPlan::new(&m, text, false, &bc).unwrap();
        let mut w = writer();
        w.state_decl(&plan).unwrap();
        assert!(w.take_text().contains("reg [(BITSIZE_count)-1:0] count;\n"));
    }
}
