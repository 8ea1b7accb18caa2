//! The contract implemented by every HDL writer and the indented text
//! buffer writers render into.
use crate::fsm::{FsmPlan, FsmProcess};
use crate::params::LibraryRef;
use crate::sanitize;
use crate::width::{Conversion, GenericDecl, Slice, WidthSource};
use rtlgen_ir::{BackendConf, FuTiming, Internal, Language, Module, Port, TypeKind};
use rtlgen_utils::RtlResult;
use std::borrow::Cow;
use std::fmt;

const INDENT: &str = "  ";

/// A string buffer that indents every line it receives.
pub struct Indented {
    text: String,
    level: usize,
    line_start: bool,
}

impl Default for Indented {
    fn default() -> Self {
        Self {
            text: String::new(),
            level: 0,
            line_start: true,
        }
    }
}

impl Indented {
    pub fn indent(&mut self) {
        self.level += 1;
    }

    pub fn dedent(&mut self) {
        self.level = self.level.saturating_sub(1);
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Take the text written so far and reset the buffer.
    pub fn take(&mut self) -> String {
        self.level = 0;
        self.line_start = true;
        std::mem::take(&mut self.text)
    }
}

impl fmt::Write for Indented {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.chars() {
            if self.line_start && c != '\n' {
                for _ in 0..self.level {
                    self.text.push_str(INDENT);
                }
            }
            self.text.push(c);
            self.line_start = c == '\n';
        }
        Ok(())
    }
}

/// The value a formal is connected to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Actual {
    /// A named object, optionally sliced.
    Object {
        name: String,
        slice: Option<Slice>,
        /// The object is declared with an ascending range.
        ascending: bool,
        conversion: Conversion,
    },
    /// Constant bits, most-significant first.
    Literal { bits: String, bool_scalar: bool },
    /// All-zero value of the given width.
    Zero { width: WidthSource, bool_scalar: bool },
}

impl Actual {
    pub fn object<S: ToString>(name: S) -> Self {
        Actual::Object {
            name: name.to_string(),
            slice: None,
            ascending: false,
            conversion: Conversion::Identity,
        }
    }

    pub fn sliced<S: ToString>(name: S, slice: Option<Slice>) -> Self {
        Actual::Object {
            name: name.to_string(),
            slice,
            ascending: false,
            conversion: Conversion::Identity,
        }
    }
}

/// A piece of a binding: the part of the formal it drives and its actual.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// `None` when the segment covers the whole formal.
    pub formal: Option<Slice>,
    pub actual: Actual,
}

/// Connection of one port of an instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    Open,
    /// Segments ordered most-significant first.
    Segments(Vec<Segment>),
}

impl Binding {
    pub fn whole(actual: Actual) -> Self {
        Binding::Segments(vec![Segment {
            formal: None,
            actual,
        }])
    }
}

/// A parameter of a module declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamDecl {
    /// Entry of the memory-parameter list.
    Memory {
        name: String,
        value: String,
        kind: TypeKind,
    },
    /// Value parameter of a library reference.
    Value {
        name: String,
        default: Option<String>,
        kind: TypeKind,
    },
    /// Width or count generic of a library-parametrized port.
    Port(GenericDecl),
}

impl ParamDecl {
    pub fn name(&self) -> &str {
        match self {
            ParamDecl::Memory { name, .. } | ParamDecl::Value { name, .. } => name,
            ParamDecl::Port(g) => &g.name,
        }
    }
}

/// Writer of one hardware description language. A writer owns its output
/// buffer and any per-file state.
pub trait HdlWriter {
    fn language(&self) -> Language;

    /// Sanitized form of `name`.
    fn id<'a>(&self, name: &'a str) -> Cow<'a, str> {
        sanitize::identifier(self.language(), name)
    }

    /// Take the text generated so far.
    fn take_text(&mut self) -> String;

    /// Does this language need explicit conversions at binding sites?
    fn needs_conversions(&self) -> bool;

    fn comment(&mut self, text: &str) -> RtlResult<()>;

    /// Preamble emitted once per file.
    fn file_header(&mut self) -> RtlResult<()>;

    fn library_decl(&mut self, module: &Module) -> RtlResult<()>;

    /// Open the declaration of the module named `name`.
    fn module_decl(&mut self, module: &Module, name: &str) -> RtlResult<()>;

    fn parametrization_decl(&mut self, params: &[ParamDecl]) -> RtlResult<()>;

    /// Text of a parameter value of type `kind` in an instantiation.
    fn param_value(&self, kind: TypeKind, value: &str) -> String;

    fn port_decl_header(&mut self) -> RtlResult<()>;

    fn port_decl(&mut self, port: &Port, lib: &LibraryRef, last: bool) -> RtlResult<()>;

    fn port_decl_tail(&mut self) -> RtlResult<()>;

    /// Close the interface and open the implementation.
    fn internal_decl(&mut self, name: &str) -> RtlResult<()>;

    fn timing_spec(&mut self, module: &Module, timing: &FuTiming) -> RtlResult<()>;

    /// Forward declaration of a component, for languages that need one.
    fn component_decl(
        &mut self,
        name: &str,
        def: &Module,
        lib: &LibraryRef,
        params: &[ParamDecl],
    ) -> RtlResult<()>;

    fn signal_decl(&mut self, internal: &Internal) -> RtlResult<()>;

    fn definition_begin(&mut self) -> RtlResult<()>;

    /// A gate primitive driving `output` from `inputs`.
    fn builtin(&mut self, inst: &Module, output: &Actual, inputs: &[Actual]) -> RtlResult<()>;

    fn instance_begin(
        &mut self,
        inst_name: &str,
        def_name: &str,
        params: &[(String, String)],
    ) -> RtlResult<()>;

    /// Bind one formal. `any_bound` tracks whether an earlier formal of the
    /// same instance was written.
    fn port_binding(&mut self, port: &Port, binding: &Binding, any_bound: &mut bool)
        -> RtlResult<()>;

    fn instance_end(&mut self) -> RtlResult<()>;

    /// Text of an actual in expression position.
    fn render(&self, actual: &Actual) -> String;

    fn assign(&mut self, lhs: &Actual, rhs: &Actual) -> RtlResult<()>;

    /// `;` separated `lhs = rhs` equations.
    fn equation(&mut self, module: &Module, text: &str) -> RtlResult<()>;

    /// Verbatim behavior, after reset placeholder substitution.
    fn opaque_text(&mut self, text: &str, bc: &BackendConf) -> RtlResult<()>;

    /// State constants and state registers.
    fn state_decl(&mut self, plan: &FsmPlan) -> RtlResult<()>;

    fn present_state_update(&mut self, plan: &FsmPlan, bc: &BackendConf) -> RtlResult<()>;

    fn transition_process(
        &mut self,
        index: usize,
        plan: &FsmPlan,
        process: &FsmProcess,
    ) -> RtlResult<()>;

    /// Whole FSM body, from the state declarations on.
    fn fsm(&mut self, plan: &FsmPlan, bc: &BackendConf) -> RtlResult<()> {
        self.state_decl(plan)?;
        self.definition_begin()?;
        self.present_state_update(plan, bc)?;
        for (index, process) in plan.processes(bc)?.iter().enumerate() {
            self.transition_process(index, plan, process)?;
        }
        Ok(())
    }

    fn definition_end(&mut self, name: &str) -> RtlResult<()>;
}
