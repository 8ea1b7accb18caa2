//! Loading of a design from its JSON description.
use crate::{BackendConf, Context, Device, Module, TechLibrary};
use rtlgen_utils::{Error, RtlResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A whole design: root circuits, the technology library and the device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Design {
    pub top: Vec<Module>,
    #[serde(default)]
    pub library: TechLibrary,
    #[serde(default)]
    pub device: Device,
}

impl Design {
    pub fn from_file(path: &Path) -> RtlResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::invalid_file(format!("cannot read `{}': {}", path.display(), e))
        })?;
        let design = Self::parse(&text)
            .map_err(|e| e.with_post_msg(Some(format!("while loading {}", path.display()))))?;
        log::debug!(
            "Loaded {} root circuit(s) from {}",
            design.top.len(),
            path.display()
        );
        Ok(design)
    }

    pub fn parse(text: &str) -> RtlResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Build the generation context. A device given in `bc` takes precedence
    /// over the one in the design.
    pub fn into_context(self, mut bc: BackendConf) -> Context {
        if bc.device.vendor.is_empty() {
            bc.device.vendor = self.device.vendor;
        }
        if bc.device.family.is_empty() {
            bc.device.family = self.device.family;
        }
        Context::new(self.top, self.library, bc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Internal, TechnologyManager};

    #[test]
    fn parse_design() {
        let text = r#"{
            "top": [{
                "name": "top", "type_name": "top",
                "ports": [
                    {"name": "a", "direction": "in", "type": {"kind": "uint", "size": 8}, "wires": [{"kind": "signal", "name": "s"}]}
                ],
                "internals": [
                    {"object": "signal", "name": "s", "type": {"kind": "uint", "size": 8}}
                ]
            }],
            "library": {"libraries": {"STD": [{"name": "d", "type_name": "reg"}]}},
            "device": {"vendor": "Xilinx", "family": "xc7z020"}
        }"#;
        let design = Design::parse(text).unwrap();
        assert_eq!(design.top[0].ports[0].ty.size, 8);
        assert!(matches!(design.top[0].internals[0], Internal::Signal(_)));
        let ctx = design.into_context(BackendConf::default());
        assert_eq!(ctx.bc.device.vendor, "Xilinx");
        assert_eq!(ctx.tech().library_of("reg"), Some("STD"));
    }

    #[test]
    fn bad_json_is_invalid_file() {
        let err = Design::parse("{").unwrap_err();
        assert!(matches!(err.kind(), rtlgen_utils::ErrorKind::InvalidFile(_)));
    }
}
