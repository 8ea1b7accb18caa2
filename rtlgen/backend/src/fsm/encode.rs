//! State assignment of FSMs.
use super::parse::FsmDescription;
use rtlgen_ir::{BackendConf, FsmEncoding};
use rtlgen_utils::{binary_literal, bits_needed_for, one_hot_literal};

/// Vendors whose synthesis tools prefer one-hot machines under `auto`.
const ONE_HOT_VENDOR: &str = "xilinx";
/// Machines with this many states or more stay binary under `auto`.
const ONE_HOT_STATE_LIMIT: usize = 256;

/// The encoding of the state register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateEncoding {
    /// Ordinal in two's complement.
    Binary { width: u64 },
    /// One bit per ordinal.
    OneHot { width: u64 },
}

impl StateEncoding {
    /// Select the encoding of `fsm` under the configured policy.
    pub fn choose(fsm: &FsmDescription, bc: &BackendConf) -> Self {
        let max = fsm.max_ordinal();
        let one_hot = match bc.fsm_encoding {
            FsmEncoding::OneHot => true,
            FsmEncoding::Binary => false,
            FsmEncoding::Auto => {
                bc.device.vendor.to_lowercase() == ONE_HOT_VENDOR
                    && fsm.states.len() < ONE_HOT_STATE_LIMIT
            }
        };
        if one_hot {
            StateEncoding::OneHot { width: max + 1 }
        } else {
            // Ordinals may be sparse: size on the largest one.
            StateEncoding::Binary {
                width: bits_needed_for(max + 1),
            }
        }
    }

    pub fn width(&self) -> u64 {
        match self {
            StateEncoding::Binary { width } | StateEncoding::OneHot { width } => *width,
        }
    }

    pub fn is_one_hot(&self) -> bool {
        matches!(self, StateEncoding::OneHot { .. })
    }

    /// Code of the state with `ordinal`, most-significant bit first.
    pub fn code(&self, ordinal: u64) -> String {
        match self {
            StateEncoding::Binary { width } => binary_literal(ordinal, *width),
            StateEncoding::OneHot { width } => one_hot_literal(ordinal, *width),
        }
    }

    /// Ordinal encoded by `code`, if it is a valid code.
    pub fn decode(&self, code: &str) -> Option<u64> {
        if code.len() as u64 != self.width() {
            return None;
        }
        match self {
            StateEncoding::Binary { .. } => u64::from_str_radix(code, 2).ok(),
            StateEncoding::OneHot { .. } => {
                let ones: Vec<_> = code.match_indices('1').collect();
                match ones.as_slice() {
                    [(pos, _)] => Some(self.width() - 1 - *pos as u64),
                    _ => None,
                }
            }
        }
    }
}
