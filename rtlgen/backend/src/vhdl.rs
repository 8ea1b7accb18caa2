//! VHDL writer.
use crate::fsm::{
    Action, Branches, Condition, FsmPlan, FsmProcess, GuardTest, InputTest, OutputBit,
    ProcessOwner,
};
use crate::params::{LibraryRef, vhdl_param_value};
use crate::width::{
    BitRange, Conversion, Slice, WidthSource, port_range, signal_range, signal_vector_range,
};
use crate::writer::{Actual, Binding, HdlWriter, Indented, ParamDecl};
use itertools::Itertools;
use rtlgen_ir::{
    BackendConf, Direction, FuTiming, Internal, Language, Module, Port, ResetType, TypeKind,
};
use rtlgen_utils::{Error, RtlResult, binary_literal};
use std::collections::HashSet;
use std::fmt::Write;

/// Name of the support package emitted at the top of every VHDL file.
pub const SUPPORT_PACKAGE: &str = "rtlgen_pkg";

const DEFAULT_LIBRARIES: &[&str] = &[
    "library IEEE;",
    "use IEEE.std_logic_1164.all;",
    "use IEEE.numeric_std.all;",
    "use IEEE.math_real.all;",
    "use STD.textio.all;",
    "use IEEE.std_logic_textio.all;",
    "-- synthesis translate_off",
    "use STD.env.all;",
    "-- synthesis translate_on",
];

pub struct VhdlWriter {
    out: Indented,
    /// Components already declared in the current architecture. Cleared
    /// when a new entity starts.
    declared: HashSet<String>,
}

impl Default for VhdlWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn type_name(kind: TypeKind, id_type: &str) -> String {
    match kind {
        TypeKind::Bool => "std_logic".to_string(),
        TypeKind::Int => "signed".to_string(),
        TypeKind::Uint => "unsigned".to_string(),
        TypeKind::Other => id_type.to_string(),
        _ => "std_logic_vector".to_string(),
    }
}

fn range_text(range: &BitRange, ascending: bool) -> String {
    if ascending {
        format!("({} to {})", range.lsb, range.msb)
    } else {
        format!("({} downto {})", range.msb, range.lsb)
    }
}

fn slice_text(slice: &Slice, ascending: bool) -> String {
    match slice {
        Slice::Index(i) => format!("({})", i),
        Slice::Range(r) => range_text(r, ascending),
    }
}

fn generic_type(kind: TypeKind) -> &'static str {
    match kind {
        TypeKind::Other => "string",
        TypeKind::Bool | TypeKind::VectorBool => "std_logic_vector",
        _ => "integer",
    }
}

fn bit_value(bit: OutputBit) -> &'static str {
    match bit {
        OutputBit::One => "'1'",
        OutputBit::Unknown => "'X'",
        OutputBit::Zero | OutputBit::DontCare => "'0'",
    }
}

impl VhdlWriter {
    pub fn new() -> Self {
        Self {
            out: Indented::default(),
            declared: HashSet::new(),
        }
    }

    /// Names of the state registers. Exported state ports keep their names,
    /// the registers behind them are renamed.
    fn state_signals(plan: &FsmPlan) -> (&'static str, &'static str) {
        if plan.exports_state {
            ("present_state_r", "next_state_r")
        } else {
            ("present_state", "next_state")
        }
    }

    fn param_text(&self, param: &ParamDecl) -> String {
        match param {
            ParamDecl::Memory { name, value, kind } => format!(
                "{}: {} := {}",
                self.id(name),
                generic_type(*kind),
                vhdl_param_value(*kind, value)
            ),
            ParamDecl::Value {
                name,
                default: Some(value),
                kind,
            } => format!(
                "{}: {} := {}",
                self.id(name),
                generic_type(*kind),
                vhdl_param_value(*kind, value)
            ),
            ParamDecl::Value { name, kind, .. } => {
                format!("{}: {}", self.id(name), generic_type(*kind))
            }
            ParamDecl::Port(g) => format!("{}: integer := {}", self.id(&g.name), g.default),
        }
    }

    fn port_text(&self, port: &Port, lib: &LibraryRef) -> RtlResult<String> {
        let dir = match port.direction {
            Direction::In => "in",
            Direction::Out => "out",
            Direction::Inout => "inout",
            Direction::Gen => {
                return Err(Error::unsupported(format!(
                    "generic port `{}' cannot be declared",
                    port.name
                )));
            }
        };
        let ty = if port.is_vector() {
            "std_logic_vector".to_string()
        } else {
            type_name(port.ty.kind, &port.ty.id_type)
        };
        let range = port_range(port, lib)?
            .map(|r| range_text(&r, port.reverse))
            .unwrap_or_default();
        Ok(format!("{} : {} {}{}", self.id(&port.name), dir, ty, range))
    }

    fn test(&self, test: &InputTest, alt: &GuardTest) -> String {
        let name = self.id(&test.port.name);
        match *alt {
            GuardTest::Bit(_) if test.width == 1 => format!("{} = '1'", name),
            GuardTest::Bit(k) => format!("{}({}) = '1'", name, k),
            GuardTest::Value(v) if test.width == 1 => format!("{} = '{}'", name, v),
            GuardTest::Value(v) => {
                format!("{} = \"{}\"", name, binary_literal(v as u64, test.width))
            }
        }
    }

    fn condition(&self, cond: &Condition) -> String {
        cond.iter()
            .map(|t| match t.alternatives.as_slice() {
                [alt] => self.test(t, alt),
                alts => format!("({})", alts.iter().map(|a| self.test(t, a)).join(" or ")),
            })
            .join(" and ")
    }

    fn action(&mut self, plan: &FsmPlan, action: &Action) -> RtlResult<()> {
        let (_, next) = Self::state_signals(plan);
        if let Some(state) = &action.next_state {
            writeln!(self.out, "{} <= {};", next, state)?;
        }
        for (i, bit) in &action.outputs {
            writeln!(self.out, "{} <= {};", self.id(&plan.outputs[*i].name), bit_value(*bit))?;
        }
        Ok(())
    }

    fn nested(&mut self, plan: &FsmPlan, action: &Action) -> RtlResult<()> {
        self.out.indent();
        self.action(plan, action)?;
        self.out.dedent();
        Ok(())
    }

    fn branches(&mut self, plan: &FsmPlan, branches: &Branches) -> RtlResult<()> {
        match branches {
            Branches::None => Ok(()),
            Branches::Unconditional(action) => self.action(plan, action),
            Branches::Chain { arms, otherwise } => {
                for (i, (cond, action)) in arms.iter().enumerate() {
                    let kw = if i == 0 { "if" } else { "elsif" };
                    writeln!(self.out, "{} ({}) then", kw, self.condition(cond))?;
                    self.nested(plan, action)?;
                }
                writeln!(self.out, "else")?;
                self.nested(plan, otherwise)?;
                writeln!(self.out, "end if;")?;
                Ok(())
            }
        }
    }
}

impl HdlWriter for VhdlWriter {
    fn language(&self) -> Language {
        Language::Vhdl
    }

    fn take_text(&mut self) -> String {
        self.declared.clear();
        self.out.take()
    }

    fn needs_conversions(&self) -> bool {
        true
    }

    fn comment(&mut self, text: &str) -> RtlResult<()> {
        for line in text.lines() {
            writeln!(self.out, "-- {}", line)?;
        }
        Ok(())
    }

    fn file_header(&mut self) -> RtlResult<()> {
        let pkg = SUPPORT_PACKAGE;
        writeln!(self.out, "\nlibrary IEEE;\nuse IEEE.numeric_std.all;\n")?;
        writeln!(self.out, "package {} is", pkg)?;
        writeln!(
            self.out,
            "  function resize_signed(input : signed; size : integer) return signed;"
        )?;
        writeln!(self.out, "end;\n")?;
        writeln!(self.out, "package body {} is", pkg)?;
        self.out.indent();
        writeln!(
            self.out,
            "function resize_signed(input : signed; size : integer) return signed is"
        )?;
        writeln!(self.out, "begin")?;
        writeln!(self.out, "  if (size > input'length) then")?;
        writeln!(self.out, "    return resize(input, size);")?;
        writeln!(self.out, "  else")?;
        writeln!(self.out, "    return input(size-1+input'right downto input'right);")?;
        writeln!(self.out, "  end if;")?;
        writeln!(self.out, "end function;")?;
        self.out.dedent();
        writeln!(self.out, "end package body;\n")?;
        Ok(())
    }

    fn library_decl(&mut self, module: &Module) -> RtlResult<()> {
        match &module.behavior.ip_library {
            Some(clauses) => {
                for clause in clauses.split(';').map(str::trim).filter(|c| !c.is_empty()) {
                    writeln!(self.out, "{};", clause)?;
                }
            }
            None => {
                for line in DEFAULT_LIBRARIES {
                    writeln!(self.out, "{}", line)?;
                }
                writeln!(self.out, "use work.{}.all;", SUPPORT_PACKAGE)?;
            }
        }
        Ok(())
    }

    fn module_decl(&mut self, _module: &Module, name: &str) -> RtlResult<()> {
        self.declared.clear();
        writeln!(self.out, "entity {} is", self.id(name))?;
        Ok(())
    }

    fn parametrization_decl(&mut self, params: &[ParamDecl]) -> RtlResult<()> {
        if params.is_empty() {
            return Ok(());
        }
        let list = params.iter().map(|p| self.param_text(p)).join(";\n  ");
        writeln!(self.out, "generic(\n  {});", list)?;
        Ok(())
    }

    fn param_value(&self, kind: TypeKind, value: &str) -> String {
        vhdl_param_value(kind, value)
    }

    fn port_decl_header(&mut self) -> RtlResult<()> {
        writeln!(self.out, "port (")?;
        self.out.indent();
        Ok(())
    }

    fn port_decl(&mut self, port: &Port, lib: &LibraryRef, last: bool) -> RtlResult<()> {
        let text = self.port_text(port, lib)?;
        if last {
            write!(self.out, "{}", text)?;
        } else {
            writeln!(self.out, "{};", text)?;
        }
        Ok(())
    }

    fn port_decl_tail(&mut self) -> RtlResult<()> {
        self.out.dedent();
        writeln!(self.out, "\n);")?;
        Ok(())
    }

    fn internal_decl(&mut self, name: &str) -> RtlResult<()> {
        let arch = format!("{}_arch", name);
        writeln!(
            self.out,
            "end {};\n\narchitecture {} of {} is",
            self.id(name),
            self.id(&arch),
            self.id(name)
        )?;
        self.out.indent();
        Ok(())
    }

    fn timing_spec(&mut self, _module: &Module, _timing: &FuTiming) -> RtlResult<()> {
        Ok(())
    }

    fn component_decl(
        &mut self,
        name: &str,
        def: &Module,
        lib: &LibraryRef,
        params: &[ParamDecl],
    ) -> RtlResult<()> {
        if !self.declared.insert(name.to_string()) {
            return Ok(());
        }
        writeln!(self.out, "\ncomponent {}", self.id(name))?;
        self.parametrization_decl(params)?;
        let ports = def
            .ordered_ports()
            .into_iter()
            .filter(|p| p.direction != Direction::Gen)
            .map(|p| self.port_text(p, lib))
            .collect::<RtlResult<Vec<_>>>()?;
        if !ports.is_empty() {
            writeln!(self.out, "port (\n  {}\n);", ports.join(";\n  "))?;
        }
        writeln!(self.out, "end component;")?;
        Ok(())
    }

    fn signal_decl(&mut self, internal: &Internal) -> RtlResult<()> {
        match internal {
            Internal::Signal(s) => {
                let range = signal_range(s)?
                    .map(|r| range_text(&r, false))
                    .unwrap_or_default();
                writeln!(
                    self.out,
                    "signal {} : {}{};",
                    self.id(&s.name),
                    type_name(s.ty.kind, &s.ty.id_type),
                    range
                )?;
            }
            Internal::SignalVector(sv) => {
                writeln!(
                    self.out,
                    "signal {} : std_logic_vector {};",
                    self.id(&sv.name),
                    range_text(&signal_vector_range(sv)?, false)
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
        self.out.dedent();
        writeln!(self.out, "\nbegin")?;
        self.out.indent();
        Ok(())
    }

    fn builtin(&mut self, inst: &Module, output: &Actual, inputs: &[Actual]) -> RtlResult<()> {
        let op = match inst.type_name.as_str() {
            "AND_GATE" => "and",
            "OR_GATE" => "or",
            other => {
                return Err(Error::unsupported(format!(
                    "builtin gate `{}' is not supported in VHDL",
                    other
                )));
            }
        };
        let expr = inputs
            .iter()
            .map(|a| self.render(a))
            .join(&format!(" {} ", op));
        writeln!(self.out, "{} <= {};", self.render(output), expr)?;
        Ok(())
    }

    fn instance_begin(
        &mut self,
        inst_name: &str,
        def_name: &str,
        params: &[(String, String)],
    ) -> RtlResult<()> {
        write!(self.out, "{} : {}", self.id(inst_name), self.id(def_name))?;
        if !params.is_empty() {
            let list = params
                .iter()
                .map(|(n, v)| format!("{} => {}", self.id(n), v))
                .join(", ");
            write!(self.out, " generic map({})", list)?;
        }
        write!(self.out, " port map (")?;
        Ok(())
    }

    fn port_binding(&mut self, port: &Port, binding: &Binding, any_bound: &mut bool)
        -> RtlResult<()> {
        let name = self.id(&port.name).into_owned();
        let associations = match binding {
            Binding::Open => vec![format!("{} => open", name)],
            Binding::Segments(segments) => segments
                .iter()
                .map(|s| {
                    let formal = s
                        .formal
                        .as_ref()
                        .map(|f| slice_text(f, port.reverse))
                        .unwrap_or_default();
                    format!("{}{} => {}", name, formal, self.render(&s.actual))
                })
                .collect(),
        };
        for a in associations {
            let sep = if *any_bound { ", " } else { "" };
            write!(self.out, "{}{}", sep, a)?;
            *any_bound = true;
        }
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
                conversion,
            } => {
                let slice = slice
                    .as_ref()
                    .map(|s| slice_text(s, *ascending))
                    .unwrap_or_default();
                let text = format!("{}{}", self.id(name), slice);
                match conversion {
                    Conversion::Identity | Conversion::TargetBit0 => text,
                    Conversion::SourceBit0 => format!("{}(0)", text),
                    Conversion::Cast(TypeKind::Int) => format!("signed({})", text),
                    Conversion::Cast(TypeKind::Uint) => format!("unsigned({})", text),
                    Conversion::Cast(_) => format!("std_logic_vector({})", text),
                }
            }
            Actual::Literal {
                bits,
                bool_scalar: true,
            } => format!("'{}'", bits),
            Actual::Literal { bits, .. } => format!("\"{}\"", bits),
            Actual::Zero {
                bool_scalar: true, ..
            } => "'0'".to_string(),
            Actual::Zero {
                width: WidthSource::Literal(w),
                ..
            } => format!("\"{}\"", "0".repeat(*w as usize)),
            Actual::Zero { .. } => "(others => '0')".to_string(),
        }
    }

    fn assign(&mut self, lhs: &Actual, rhs: &Actual) -> RtlResult<()> {
        let (l, r) = (self.render(lhs), self.render(rhs));
        if l != r {
            writeln!(self.out, "{} <= {};", l, r)?;
        }
        Ok(())
    }

    fn equation(&mut self, module: &Module, _text: &str) -> RtlResult<()> {
        Err(Error::unsupported(format!(
            "equations of `{}' cannot be written in VHDL",
            module.type_name
        )))
    }

    fn opaque_text(&mut self, text: &str, bc: &BackendConf) -> RtlResult<()> {
        let value = if bc.level_reset {
            "reset = '1'"
        } else {
            "reset = '0'"
        };
        let (init_bit, init_vector) = if bc.reg_init_value {
            (":= '0'", ":= (others => '0')")
        } else {
            ("", "")
        };
        let text = text
            .replace("1RESET_VALUE", value)
            .replace("1INIT_ZERO_VALUEb", init_bit)
            .replace("1INIT_ZERO_VALUE", init_vector);
        write!(self.out, "{}", text)?;
        if !text.ends_with('\n') {
            writeln!(self.out)?;
        }
        Ok(())
    }

    fn state_decl(&mut self, plan: &FsmPlan) -> RtlResult<()> {
        if plan.context_switch {
            return Err(Error::unsupported(
                "FSMs with context switch cannot be written in VHDL",
            ));
        }
        let width = plan.encoding.width();
        let (present, next) = Self::state_signals(plan);
        self.comment("define the states of FSM model")?;
        for state in &plan.fsm.states {
            writeln!(
                self.out,
                "constant {}: std_logic_vector({} downto 0) := \"{}\";",
                state.name,
                width - 1,
                plan.encoding.code(state.ordinal)
            )?;
        }
        writeln!(
            self.out,
            "signal {}, {} : std_logic_vector({} downto 0);",
            present,
            next,
            width - 1
        )?;
        Ok(())
    }

    fn present_state_update(&mut self, plan: &FsmPlan, bc: &BackendConf) -> RtlResult<()> {
        let clock = self.id(&plan.fsm.clock_port).into_owned();
        let reset = self.id(&plan.fsm.reset_port).into_owned();
        let (present, next) = Self::state_signals(plan);
        let reset_state = &plan.fsm.reset_state;
        let active = if bc.level_reset { "'1'" } else { "'0'" };
        self.comment("concurrent process#1: state registers")?;
        if bc.reset_type == ResetType::Async {
            writeln!(self.out, "state_reg: process({}, {})\nbegin", clock, reset)?;
            self.out.indent();
            writeln!(self.out, "if ({}={}) then", reset, active)?;
            writeln!(self.out, "  {} <= {};", present, reset_state)?;
            writeln!(self.out, "elsif ({}'event and {}='1') then", clock, clock)?;
            writeln!(self.out, "  {} <= {};", present, next)?;
            writeln!(self.out, "end if;")?;
        } else {
            writeln!(self.out, "state_reg: process({})\nbegin", clock)?;
            self.out.indent();
            writeln!(self.out, "if ({}'event and {}='1') then", clock, clock)?;
            self.out.indent();
            writeln!(self.out, "if ({}={}) then", reset, active)?;
            writeln!(self.out, "  {} <= {};", present, reset_state)?;
            writeln!(self.out, "else")?;
            writeln!(self.out, "  {} <= {};", present, next)?;
            writeln!(self.out, "end if;")?;
            self.out.dedent();
            writeln!(self.out, "end if;")?;
        }
        self.out.dedent();
        writeln!(self.out, "end process;")?;
        if plan.exports_state {
            writeln!(self.out, "present_state <= {};", present)?;
            writeln!(self.out, "next_state <= {};", next)?;
        }
        Ok(())
    }

    fn transition_process(
        &mut self,
        index: usize,
        plan: &FsmPlan,
        process: &FsmProcess,
    ) -> RtlResult<()> {
        let (present, next) = Self::state_signals(plan);
        let start = self.id(&plan.fsm.start_port).into_owned();
        let sensitivity = std::iter::once(present.to_string())
            .chain(std::iter::once(start.clone()))
            .chain(plan.inputs.iter().map(|p| self.id(&p.name).into_owned()))
            .join(", ");
        let what = match process.owner {
            ProcessOwner::All => "outputs and next state".to_string(),
            ProcessOwner::Output(i) => format!("output {}", plan.outputs[i].name),
            ProcessOwner::NextState => "next state".to_string(),
        };
        writeln!(self.out)?;
        self.comment(&format!("concurrent process#{}: {}", index + 2, what))?;
        writeln!(self.out, "comb_logic{}: process({})\nbegin", index, sensitivity)?;
        self.out.indent();
        for i in &process.default_outputs {
            writeln!(self.out, "{} <= '0';", self.id(&plan.outputs[*i].name))?;
        }
        if process.owner.owns_next_state() {
            writeln!(self.out, "{} <= {};", next, plan.fsm.reset_state)?;
        }
        writeln!(self.out, "case {} is", present)?;
        self.out.indent();
        for arm in &process.arms {
            writeln!(self.out, "when {} =>", arm.state.name)?;
            self.out.indent();
            if arm.wait_for_start.is_some() {
                writeln!(self.out, "if ({} = '1') then", start)?;
                self.out.indent();
            }
            for (i, bit) in &arm.state_outputs {
                writeln!(self.out, "{} <= {};", self.id(&plan.outputs[*i].name), bit_value(*bit))?;
            }
            self.branches(plan, &arm.branches)?;
            if let Some(wait) = &arm.wait_for_start {
                self.out.dedent();
                writeln!(self.out, "else")?;
                self.nested(plan, wait)?;
                writeln!(self.out, "end if;")?;
            }
            self.out.dedent();
        }
        writeln!(self.out, "when others =>")?;
        self.nested(plan, &process.default_arm)?;
        self.out.dedent();
        writeln!(self.out, "end case;")?;
        self.out.dedent();
        writeln!(self.out, "end process;")?;
        Ok(())
    }

    fn definition_end(&mut self, name: &str) -> RtlResult<()> {
        self.out.dedent();
        let arch = format!("{}_arch", name);
        writeln!(self.out, "\nend {};\n", self.id(&arch))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::Segment;
    use rtlgen_ir::{FsmEncoding, TypeDescriptor};

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
        S_1 0:&0 S_2 1:5 S_0 0:- S_1 0;\
        S_2 1:- S_0 0;";

    #[test]
    fn entity_and_ports() {
        let mut m = Module::new("t", "adder")
            .with_port(Port::new("a", Direction::In, TypeDescriptor::int(8)))
            .with_port(Port::new("en", Direction::In, TypeDescriptor::bool()))
            .with_port(Port::new("o", Direction::Out, TypeDescriptor::uint(8)));
        m.ports[2].reverse = true;
        let mut w = VhdlWriter::new();
        w.module_decl(&m, "adder").unwrap();
        w.port_decl_header().unwrap();
        let ports = m.ordered_ports();
        for (i, p) in ports.iter().enumerate() {
            w.port_decl(p, &LibraryRef::default(), i + 1 == ports.len()).unwrap();
        }
        w.port_decl_tail().unwrap();
        w.internal_decl("adder").unwrap();
        w.definition_begin().unwrap();
        w.definition_end("adder").unwrap();
        assert_eq!(
            w.take_text(),
            "entity adder is\nport (\n  a : in signed(7 downto 0);\n  en : in std_logic;\n  \
             o : out unsigned(0 to 7)\n);\nend adder;\n\narchitecture adder_arch of adder is\n\
             \nbegin\n\nend adder_arch;\n\n"
        );
    }

    #[test]
    fn components_are_declared_once_per_entity() {
        let def = Module::new("d", "mux")
            .with_port(Port::new("s", Direction::In, TypeDescriptor::bool()));
        let m = Module::new("t", "top");
        let mut w = VhdlWriter::new();
        w.module_decl(&m, "top").unwrap();
        w.component_decl("mux", &def, &LibraryRef::default(), &[]).unwrap();
        w.component_decl("mux", &def, &LibraryRef::default(), &[]).unwrap();
        assert_eq!(w.take_text().matches("component mux").count(), 1);
        w.module_decl(&m, "top2").unwrap();
        w.component_decl("mux", &def, &LibraryRef::default(), &[]).unwrap();
        assert_eq!(w.take_text().matches("component mux").count(), 1);
    }

    #[test]
    fn open_outputs_and_sliced_formals() {
        let out = Port::new("o", Direction::Out, TypeDescriptor::uint(8));
        let input = Port::new("i", Direction::In, TypeDescriptor::vector_bool(8));
        let binding = Binding::Segments(vec![
            Segment {
                formal: Some(Slice::Range(BitRange::literal(7, 4))),
                actual: Actual::sliced("v", Some(Slice::Range(BitRange::literal(3, 0)))),
            },
            Segment {
                formal: Some(Slice::Range(BitRange::literal(3, 0))),
                actual: Actual::Zero {
                    width: WidthSource::Literal(4),
                    bool_scalar: false,
                },
            },
        ]);
        let mut w = VhdlWriter::new();
        let mut any_bound = false;
        w.instance_begin("r0", "regfile", &[("BITSIZE_i".into(), "8".into())]).unwrap();
        w.port_binding(&input, &binding, &mut any_bound).unwrap();
        w.port_binding(&out, &Binding::Open, &mut any_bound).unwrap();
        w.instance_end().unwrap();
        assert_eq!(
            w.take_text(),
            "r0 : regfile generic map(BITSIZE_i => 8) port map (i(7 downto 4) => v(3 downto 0), \
             i(3 downto 0) => \"0000\", o => open);\n"
        );
    }

    #[test]
    fn conversions_and_literals() {
        let w = VhdlWriter::new();
        let cast = Actual::Object {
            name: "s".into(),
            slice: None,
            ascending: false,
            conversion: Conversion::Cast(TypeKind::Uint),
        };
        assert_eq!(w.render(&cast), "unsigned(s)");
        let bit0 = Actual::Object {
            name: "v".into(),
            slice: None,
            ascending: false,
            conversion: Conversion::SourceBit0,
        };
        assert_eq!(w.render(&bit0), "v(0)");
        let zero = Actual::Zero {
            width: WidthSource::Generic("BITSIZE_a".into()),
            bool_scalar: false,
        };
        assert_eq!(w.render(&zero), "(others => '0')");
        let one = Actual::Literal {
            bits: "1".into(),
            bool_scalar: true,
        };
        assert_eq!(w.render(&one), "'1'");
    }

    #[test]
    fn binary_fsm() {
        let m = fsm_module(TEXT);
        let bc = BackendConf {
            fsm_encoding: FsmEncoding::Binary,
            ..Default::default()
        };
        let plan = FsmPlan::new(&m, TEXT, false, &bc).unwrap();
        let mut w = VhdlWriter::new();
        w.fsm(&plan, &bc).unwrap();
        let text = w.take_text();
        assert!(text.contains("constant S_2: std_logic_vector(1 downto 0) := \"10\";"));
        assert!(text.contains("signal present_state, next_state : std_logic_vector(1 downto 0);"));
        assert!(text.contains("state_reg: process(clock)"));
        assert!(text.contains("comb_logic0: process(present_state, start_port, cond)"));
        assert!(text.contains("if (start_port = '1') then"));
        assert!(text.contains("if (cond(0) = '1') then"));
        assert!(text.contains("elsif (cond = \"0101\") then"));
        assert!(text.contains("when others =>"));
        assert_eq!(text.matches("end case;").count(), 1);
    }

    #[test]
    fn async_reset_register() {
        let m = fsm_module(TEXT);
        let bc = BackendConf {
            reset_type: ResetType::Async,
            level_reset: true,
            ..Default::default()
        };
        let plan = FsmPlan::new(&m, TEXT, false, &bc).unwrap();
        let mut w = VhdlWriter::new();
        w.present_state_update(&plan, &bc).unwrap();
        let text = w.take_text();
        assert!(text.contains("state_reg: process(clock, reset)"));
        assert!(text.contains("if (reset='1') then\n    present_state <= S_0;\n  elsif (clock'event and clock='1') then"));
    }

    #[test]
    fn context_switch_is_unsupported() {
        let mut m = fsm_module(TEXT);
        m = m.with_port(Port::new(
            "selector_register_file",
            Direction::In,
            TypeDescriptor::uint(2),
        ));
        let bc = BackendConf::default();
        let plan = FsmPlan::new(&m, TEXT, true, &bc).unwrap();
        let err = VhdlWriter::new().fsm(&plan, &bc).unwrap_err();
        assert!(err.is_unsupported());
    }
}
