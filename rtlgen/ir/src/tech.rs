//! Interface to the technology library that maps type names to reusable
//! functional-unit definitions.
use crate::Module;
use linked_hash_map::LinkedHashMap;
use serde::{Deserialize, Serialize};

/// Gate primitives every backend knows how to instantiate directly.
pub const BUILTIN_GATES: &[&str] = &[
    "AND_GATE",
    "NAND_GATE",
    "OR_GATE",
    "NOR_GATE",
    "XOR_GATE",
    "XNOR_GATE",
    "NOT_GATE",
    "DFF_GATE",
    "BUFF_GATE",
];

/// Lookup of functional units by type name.
pub trait TechnologyManager {
    /// Library that defines `type_name`.
    fn library_of(&self, type_name: &str) -> Option<&str>;
    /// Structural definition of `type_name` in `library`.
    fn get_fu(&self, type_name: &str, library: &str) -> Option<&Module>;
    /// Is `type_name` a primitive instantiated without a definition?
    fn is_builtin(&self, type_name: &str) -> bool;
    /// Timing characterization of `type_name`.
    fn timing(&self, type_name: &str) -> Option<&FuTiming>;
}

/// Pin-to-pin delay of an operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PinDelay {
    pub from: String,
    pub to: String,
    pub delay: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationTiming {
    pub name: String,
    #[serde(default)]
    pub execution_time: f64,
    #[serde(default)]
    pub pin_delays: Vec<PinDelay>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FuTiming {
    pub operations: Vec<OperationTiming>,
}

/// A technology library loaded from the design file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TechLibrary {
    /// Library name to the definitions it provides.
    pub libraries: LinkedHashMap<String, Vec<Module>>,
    /// Additional primitive type names.
    pub builtins: Vec<String>,
    pub timing: LinkedHashMap<String, FuTiming>,
}

impl TechLibrary {
    pub fn add(&mut self, library: &str, definition: Module) {
        self.libraries
            .entry(library.to_string())
            .or_insert_with(Vec::new)
            .push(definition);
    }
}

impl TechnologyManager for TechLibrary {
    fn library_of(&self, type_name: &str) -> Option<&str> {
        self.libraries
            .iter()
            .find(|(_, defs)| defs.iter().any(|d| d.type_name == type_name))
            .map(|(lib, _)| lib.as_str())
    }

    fn get_fu(&self, type_name: &str, library: &str) -> Option<&Module> {
        self.libraries
            .get(library)?
            .iter()
            .find(|d| d.type_name == type_name)
    }

    fn is_builtin(&self, type_name: &str) -> bool {
        BUILTIN_GATES.contains(&type_name)
            || self.builtins.iter().any(|b| b == type_name)
    }

    fn timing(&self, type_name: &str) -> Option<&FuTiming> {
        self.timing.get(type_name)
    }
}
