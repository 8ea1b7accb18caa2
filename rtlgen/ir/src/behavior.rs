//! Behavioral descriptor of a module and selection of the representation
//! used to emit it.
use crate::Module;
use rtlgen_utils::{Error, RtlResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Target hardware description languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Language {
    Verilog,
    SystemVerilog,
    Vhdl,
}

impl Language {
    pub const ALL: [Language; 3] =
        [Language::Verilog, Language::SystemVerilog, Language::Vhdl];

    pub fn extension(&self) -> &'static str {
        match self {
            Language::Verilog => ".v",
            Language::SystemVerilog => ".sv",
            Language::Vhdl => ".vhd",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Language::Verilog => "Verilog",
            Language::SystemVerilog => "SystemVerilog",
            Language::Vhdl => "VHDL",
        }
    }
}

/// Behavioral annotations of a module. Several may be present at once; the
/// one used for emission is chosen by [Module::representation].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Behavior {
    /// `lhs = rhs` assignments separated by `;`.
    pub equation: Option<String>,
    /// `TYPE p1 p2 ...` list of library parameters.
    pub library: Option<String>,
    pub graph: Option<String>,
    pub fsm: Option<String>,
    /// FSM with context switch.
    pub fsm_cs: Option<String>,
    pub verilog_provided: Option<String>,
    pub system_verilog_provided: Option<String>,
    pub vhdl_provided: Option<String>,
    pub verilog_file_provided: Option<PathBuf>,
    pub vhdl_file_provided: Option<PathBuf>,
    /// Comma separated `library:name` or `name` references.
    pub ip_component: Option<String>,
    /// `;` separated library clauses.
    pub ip_library: Option<String>,
    /// Request for an externally generated floating-point core.
    pub generator: Option<String>,
    pub unknown: Option<String>,
}

impl Behavior {
    /// Opaque text written for `lang`.
    pub fn provided_text(&self, lang: Language) -> Option<&str> {
        match lang {
            Language::Verilog => self.verilog_provided.as_deref(),
            Language::SystemVerilog => self.system_verilog_provided.as_deref(),
            Language::Vhdl => self.vhdl_provided.as_deref(),
        }
    }

    /// Externally provided file for `lang`.
    pub fn provided_file(&self, lang: Language) -> Option<&Path> {
        match lang {
            Language::Verilog | Language::SystemVerilog => {
                self.verilog_file_provided.as_deref()
            }
            Language::Vhdl => self.vhdl_file_provided.as_deref(),
        }
    }

    pub fn has_fsm(&self) -> bool {
        self.fsm.is_some() || self.fsm_cs.is_some()
    }
}

/// The representation selected for emitting a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Representation<'a> {
    ProvidedFile(&'a Path),
    Generator(&'a str),
    OpaqueText(&'a str),
    Fsm { text: &'a str, context_switch: bool },
    Structural,
    Equation(&'a str),
    BlackBox,
}

impl Module {
    /// Select the representation used to emit this module in `lang`.
    pub fn representation(&self, lang: Language) -> RtlResult<Representation<'_>> {
        let b = &self.behavior;
        let file = b.provided_file(lang).or_else(|| {
            b.verilog_file_provided
                .as_deref()
                .or(b.vhdl_file_provided.as_deref())
        });
        if let Some(path) = file {
            return Ok(Representation::ProvidedFile(path));
        }
        if let Some(g) = &b.generator {
            return Ok(Representation::Generator(g));
        }
        if let Some(text) = b.provided_text(lang) {
            return Ok(Representation::OpaqueText(text));
        }
        if let Some(text) = &b.fsm_cs {
            return Ok(Representation::Fsm {
                text,
                context_switch: true,
            });
        }
        if let Some(text) = &b.fsm {
            return Ok(Representation::Fsm {
                text,
                context_switch: false,
            });
        }
        if !self.internals.is_empty() {
            return Ok(Representation::Structural);
        }
        if let Some(eq) = &b.equation {
            return Ok(Representation::Equation(eq));
        }
        if self.black_box {
            return Ok(Representation::BlackBox);
        }
        Err(Error::unsupported(format!(
            "module `{}' of type `{}' has no behavioral representation",
            self.name, self.type_name
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_behavior_is_unsupported() {
        let m = Module::new("m", "empty");
        let err = m.representation(Language::Verilog).unwrap_err();
        assert!(err.is_unsupported());
    }

    #[test]
    fn black_box_is_accepted() {
        let mut m = Module::new("m", "bb");
        m.black_box = true;
        assert_eq!(
            m.representation(Language::Vhdl).unwrap(),
            Representation::BlackBox
        );
    }

    #[test]
    fn opaque_text_beats_fsm() {
        let mut m = Module::new("m", "t");
        m.behavior.fsm = Some("S_0 r s c;".into());
        m.behavior.verilog_provided = Some("assign o = 1'b0;".into());
        assert!(matches!(
            m.representation(Language::Verilog).unwrap(),
            Representation::OpaqueText(_)
        ));
        assert!(matches!(
            m.representation(Language::Vhdl).unwrap(),
            Representation::Fsm { .. }
        ));
    }
}
