use itertools::Itertools;
use std::str::FromStr;

/// Enumeration of valid backends
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub enum BackendOpt {
    #[default]
    Verilog,
    SystemVerilog,
    Vhdl,
    /// Experimental flow kept for command-line compatibility.
    Legacy,
}

/// Return a vector that maps strings to Backends.
#[inline(always)]
fn backends() -> Vec<(&'static str, BackendOpt)> {
    vec![
        ("verilog", BackendOpt::Verilog),
        ("system-verilog", BackendOpt::SystemVerilog),
        ("vhdl", BackendOpt::Vhdl),
        ("legacy", BackendOpt::Legacy),
    ]
}

/// Command line parsing for the Backend enum
impl FromStr for BackendOpt {
    type Err = String;
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let backends = backends();
        let found_backend = backends
            .iter()
            .find(|(backend_name, _)| &input == backend_name);
        if let Some((_, opt)) = found_backend {
            Ok(opt.clone())
        } else {
            let backend_str = backends
                .iter()
                .map(|(name, _)| (*name).to_string())
                .join(", ");
            Err(format!(
                "`{}` is not a valid backend.\nValid backends: {}",
                input, backend_str
            ))
        }
    }
}

/// Convert `BackendOpt` to a string
impl std::fmt::Display for BackendOpt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Verilog => "verilog",
            Self::SystemVerilog => "system-verilog",
            Self::Vhdl => "vhdl",
            Self::Legacy => "legacy",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_print() {
        for name in ["verilog", "system-verilog", "vhdl", "legacy"] {
            let opt: BackendOpt = name.parse().unwrap();
            assert_eq!(opt.to_string(), name);
        }
        let err = "firrtl".parse::<BackendOpt>().unwrap_err();
        assert!(err.starts_with("`firrtl` is not a valid backend."));
    }
}
