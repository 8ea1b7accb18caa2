//! Parsers for the small string grammars attached to modules: memory
//! parameter lists, IP-component references and library references.
use rtlgen_ir::{Module, TypeKind};
use rtlgen_utils::{Error, RtlResult};

/// Generic holding the bit size of a library-parametrized port.
pub const BITSIZE_PREFIX: &str = "BITSIZE_";
/// Generic holding the element count of a parametrized port vector.
pub const PORTSIZE_PREFIX: &str = "PORTSIZE_";
/// Generic holding the element count of a parametrized vector type.
pub const NUM_ELEMENTS_PREFIX: &str = "NUM_ELEMENTS_";

/// One `name=value` entry of a memory-parameter list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryParam {
    pub name: String,
    pub value: String,
}

/// Parse `n1=v1;n2=v2;...`. Empty entries are ignored.
pub fn parse_memory_parameters(text: &str) -> RtlResult<Vec<MemoryParam>> {
    text.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|entry| {
            let fields: Vec<_> = entry.split('=').collect();
            match fields.as_slice() {
                [name, value] if !name.trim().is_empty() => Ok(MemoryParam {
                    name: name.trim().to_string(),
                    value: value.trim().to_string(),
                }),
                _ => Err(Error::malformed(format!(
                    "Malformed memory parameter \"{}\"",
                    entry
                ))),
            }
        })
        .collect()
}

/// Memory parameters of `module`, empty if it has none.
pub fn memory_parameters(module: &Module) -> RtlResult<Vec<MemoryParam>> {
    module
        .memory_parameters()
        .map_or(Ok(Vec::new()), parse_memory_parameters)
}

/// Reference to an IP component, optionally qualified by its library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpReference {
    pub library: Option<String>,
    pub name: String,
}

/// Parse a comma separated list of `library:name` or `name` entries.
pub fn parse_ip_components(text: &str) -> RtlResult<Vec<IpReference>> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|entry| {
            let fields: Vec<_> = entry.split(':').map(str::trim).collect();
            match fields.as_slice() {
                [name] => Ok(IpReference {
                    library: None,
                    name: name.to_string(),
                }),
                [library, name] => Ok(IpReference {
                    library: Some(library.to_string()),
                    name: name.to_string(),
                }),
                _ => Err(Error::malformed(format!(
                    "Malformed IP component definition \"{}\"",
                    entry
                ))),
            }
        })
        .collect()
}

/// `TYPE p1 p2 ...`: the library type and its parameters. A parameter named
/// like a port makes that port library-parametrized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LibraryRef {
    pub type_name: String,
    pub params: Vec<String>,
}

impl LibraryRef {
    pub fn parse(text: &str) -> RtlResult<Self> {
        let mut tokens = text.split_whitespace();
        let type_name = tokens.next().ok_or_else(|| {
            Error::malformed("empty library reference".to_string())
        })?;
        Ok(Self {
            type_name: type_name.to_string(),
            params: tokens.map(str::to_string).collect(),
        })
    }

    /// Library parameters of `module`, empty if it has none.
    pub fn of(module: &Module) -> RtlResult<Self> {
        match &module.behavior.library {
            Some(text) => Self::parse(text),
            None => Ok(Self::default()),
        }
    }

    pub fn is_port_param(&self, port: &str) -> bool {
        self.params.iter().any(|p| p == port)
    }

    /// Parameters that do not name a port of `module`.
    pub fn value_params<'a>(
        &'a self,
        module: &'a Module,
    ) -> impl Iterator<Item = &'a str> + 'a {
        self.params
            .iter()
            .filter(move |p| module.port(p).is_none())
            .map(String::as_str)
    }
}

/// Strip surrounding quotes.
fn unquote(value: &str) -> &str {
    value.trim_matches('"')
}

/// Render a parameter value for a Verilog parameter list.
pub fn verilog_param_value(value: &str) -> String {
    if value.contains("\"\"") {
        value.replace("\"\"", "\"")
    } else if value.contains('"') {
        let bits = unquote(value);
        format!("{}'b{}", bits.len(), bits)
    } else {
        value.to_string()
    }
}

/// Render a parameter value of type `kind` for a VHDL generic map.
pub fn vhdl_param_value(kind: TypeKind, value: &str) -> String {
    match kind {
        TypeKind::Other => value.replace("\"\"", "\""),
        TypeKind::Int | TypeKind::Uint if value.starts_with('"') => {
            let bits = unquote(value);
            u64::from_str_radix(bits, 2)
                .map_or_else(|_| value.to_string(), |v| v.to_string())
        }
        _ => value.to_string(),
    }
}
