//! The generation context: the root circuits, the technology library and the
//! backend configuration.
use crate::{Module, TechLibrary, TechnologyManager};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// State assignment policy for FSMs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FsmEncoding {
    #[default]
    Auto,
    OneHot,
    Binary,
}

impl FromStr for FsmEncoding {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(FsmEncoding::Auto),
            "one-hot" => Ok(FsmEncoding::OneHot),
            "binary" => Ok(FsmEncoding::Binary),
            _ => Err(format!(
                "`{}` is not a valid FSM encoding.\nValid encodings: auto, one-hot, binary",
                s
            )),
        }
    }
}

/// Reset mode of state registers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResetType {
    No,
    #[default]
    Sync,
    Async,
}

impl FromStr for ResetType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "no" => Ok(ResetType::No),
            "sync" => Ok(ResetType::Sync),
            "async" => Ok(ResetType::Async),
            _ => Err(format!(
                "`{}` is not a valid reset type.\nValid reset types: no, sync, async",
                s
            )),
        }
    }
}

/// Target device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Device {
    pub vendor: String,
    pub family: String,
}

/// Configuration information for the backends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConf {
    /// State assignment policy.
    pub fsm_encoding: FsmEncoding,
    /// Synchronous, asynchronous or no reset.
    pub reset_type: ResetType,
    /// Reset is active high.
    pub level_reset: bool,
    /// Initialize registers to zero in provided text.
    pub reg_init_value: bool,
    /// Emit timing annotations.
    pub timing_simulation: bool,
    /// The top module is memory mapped.
    pub memory_mapped_top: bool,
    /// Interface protocol of the top module.
    pub interface_type: String,
    /// Number of contexts of context-switch FSMs.
    pub context_switch: u64,
    /// One combinational process per FSM output.
    pub multi_proc_fsm: bool,
    /// Drive datapath selectors to X while the FSM waits for start.
    pub enable_fsmx: bool,
    /// Collapse single-input bit-test chains into `casez`.
    pub fsm_casez: bool,
    pub device: Device,
}

impl Default for BackendConf {
    fn default() -> Self {
        Self {
            fsm_encoding: FsmEncoding::Auto,
            reset_type: ResetType::Sync,
            level_reset: false,
            reg_init_value: false,
            timing_simulation: false,
            memory_mapped_top: false,
            interface_type: "minimal".to_string(),
            context_switch: 1,
            multi_proc_fsm: false,
            enable_fsmx: false,
            fsm_casez: true,
            device: Device::default(),
        }
    }
}

/// Everything needed to generate a design.
pub struct Context {
    /// Top level circuits.
    pub roots: Vec<Module>,
    /// Technology library used to resolve functional units.
    pub tech: Box<dyn TechnologyManager>,
    /// Configuration flags for backends.
    pub bc: BackendConf,
}

impl Context {
    pub fn new(roots: Vec<Module>, tech: TechLibrary, bc: BackendConf) -> Self {
        Self {
            roots,
            tech: Box::new(tech),
            bc,
        }
    }

    pub fn tech(&self) -> &dyn TechnologyManager {
        self.tech.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_options() {
        assert_eq!("one-hot".parse::<FsmEncoding>(), Ok(FsmEncoding::OneHot));
        assert_eq!("async".parse::<ResetType>(), Ok(ResetType::Async));
        assert!("onehot".parse::<FsmEncoding>().is_err());
    }
}
