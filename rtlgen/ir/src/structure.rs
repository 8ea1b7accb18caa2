//! Representation of the structural object graph: modules, ports, signals,
//! constants and the connections between them.
use crate::{Behavior, Direction, TypeDescriptor};
use linked_hash_map::LinkedHashMap;
use rtlgen_utils::{Error, RtlResult};
use serde::{Deserialize, Serialize};

/// Name of the composite memory-parameter entry in [Module::parameters].
pub const MEMORY_PARAMETER: &str = "MEMORY_PARAMETER";
/// Name of the pipelining parameter of generated cores.
pub const PIPE_PARAMETER: &str = "PIPE_PARAMETER";

/// Reference to the object a port (or a port element) is connected to.
/// Names are resolved in the scope of the module that owns the connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Bound {
    Signal { name: String },
    SignalElement { vector: String, index: u64 },
    Port { name: String },
    PortElement { vector: String, index: u64 },
    Constant { name: String },
    SignalVector { name: String },
    PortVector { name: String },
}

impl Bound {
    pub fn signal<S: ToString>(name: S) -> Self {
        Bound::Signal {
            name: name.to_string(),
        }
    }
    pub fn signal_element<S: ToString>(vector: S, index: u64) -> Self {
        Bound::SignalElement {
            vector: vector.to_string(),
            index,
        }
    }
    pub fn port<S: ToString>(name: S) -> Self {
        Bound::Port {
            name: name.to_string(),
        }
    }
    pub fn constant<S: ToString>(name: S) -> Self {
        Bound::Constant {
            name: name.to_string(),
        }
    }
}

/// One element of a port vector.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortElement {
    #[serde(default)]
    pub bound: Option<Bound>,
    #[serde(default)]
    pub wires: Vec<Bound>,
}

/// A port. When `elements` is present the port is a port vector and `ty`
/// describes a single element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    pub name: String,
    pub direction: Direction,
    #[serde(rename = "type")]
    pub ty: TypeDescriptor,
    /// Symbolic width propagated from an enclosing parametrized module.
    #[serde(default)]
    pub size_parameter: Option<String>,
    /// Ascending range (`0 to N-1`).
    #[serde(default)]
    pub reverse: bool,
    #[serde(default)]
    pub lsb: u64,
    #[serde(default)]
    pub elements: Option<Vec<PortElement>>,
    /// Connection in the scope of the module instantiating the owner.
    #[serde(default)]
    pub bound: Option<Bound>,
    /// Connections to internal objects of the owner itself.
    #[serde(default)]
    pub wires: Vec<Bound>,
}

impl Port {
    pub fn new<S: ToString>(name: S, direction: Direction, ty: TypeDescriptor) -> Self {
        Self {
            name: name.to_string(),
            direction,
            ty,
            size_parameter: None,
            reverse: false,
            lsb: 0,
            elements: None,
            bound: None,
            wires: Vec::new(),
        }
    }

    /// A port vector with `count` unbound elements of type `ty`.
    pub fn vector<S: ToString>(
        name: S,
        direction: Direction,
        ty: TypeDescriptor,
        count: usize,
    ) -> Self {
        Self {
            elements: Some(vec![PortElement::default(); count]),
            ..Self::new(name, direction, ty)
        }
    }

    pub fn bind(mut self, bound: Bound) -> Self {
        self.bound = Some(bound);
        self
    }

    pub fn wire(mut self, wire: Bound) -> Self {
        self.wires.push(wire);
        self
    }

    pub fn is_vector(&self) -> bool {
        self.elements.is_some()
    }

    /// Number of elements of a port vector, zero for scalars.
    pub fn element_count(&self) -> u64 {
        self.elements.as_ref().map_or(0, |e| e.len() as u64)
    }

    pub fn element(&self, index: u64) -> Option<&PortElement> {
        self.elements.as_ref()?.get(index as usize)
    }

    /// Total width in bits; element width times element count for vectors.
    pub fn total_size(&self) -> Option<u64> {
        let elem = self.ty.total_size()?;
        match &self.elements {
            Some(el) if el.is_empty() => None,
            Some(el) => Some(elem * el.len() as u64),
            None => Some(elem),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeDescriptor,
}

/// A vector of signals sharing the element type `ty`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalVector {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeDescriptor,
    pub len: u64,
    #[serde(default)]
    pub lsb: u64,
}

impl SignalVector {
    pub fn total_size(&self) -> Option<u64> {
        Some(self.ty.total_size()? * self.len)
    }
}

/// A typed literal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constant {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeDescriptor,
    pub value: String,
}

impl Constant {
    /// Value of the literal as an unsigned bit pattern.
    pub fn bits(&self) -> RtlResult<u64> {
        let v = self.value.trim();
        if let Ok(u) = v.parse::<u64>() {
            Ok(u)
        } else if let Ok(i) = v.parse::<i64>() {
            Ok(i as u64)
        } else {
            Err(Error::malformed(format!(
                "constant `{}' has a non-numeric value `{}'",
                self.name, self.value
            )))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusConnection {
    pub name: String,
}

/// Objects owned by a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "object", rename_all = "snake_case")]
pub enum Internal {
    Module(Box<Module>),
    Signal(Signal),
    SignalVector(SignalVector),
    Constant(Constant),
    Bus(BusConnection),
}

impl Internal {
    pub fn name(&self) -> &str {
        match self {
            Internal::Module(m) => &m.name,
            Internal::Signal(s) => &s.name,
            Internal::SignalVector(s) => &s.name,
            Internal::Constant(c) => &c.name,
            Internal::Bus(b) => &b.name,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleKind {
    #[default]
    Component,
    Channel,
}

/// A module or channel: an instance of `type_name` named `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub name: String,
    pub type_name: String,
    #[serde(default)]
    pub kind: ModuleKind,
    #[serde(default)]
    pub black_box: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub copyright: String,
    #[serde(default)]
    pub authors: String,
    #[serde(default)]
    pub license: String,
    #[serde(default)]
    pub ports: Vec<Port>,
    #[serde(default)]
    pub internals: Vec<Internal>,
    #[serde(default)]
    pub behavior: Behavior,
    #[serde(default)]
    pub parameters: LinkedHashMap<String, String>,
    #[serde(default)]
    pub parameter_types: LinkedHashMap<String, crate::TypeKind>,
}

/// A connection target resolved in the scope of its owner.
#[derive(Debug, Clone, Copy)]
pub enum BoundObject<'a> {
    Signal(&'a Signal),
    SignalElement(&'a SignalVector, u64),
    Port(&'a Port),
    PortElement(&'a Port, u64),
    Constant(&'a Constant),
    SignalVector(&'a SignalVector),
    PortVector(&'a Port),
}

impl<'a> BoundObject<'a> {
    /// Type of the object; element type for elements and whole vectors.
    pub fn ty(&self) -> &'a TypeDescriptor {
        match self {
            BoundObject::Signal(s) => &s.ty,
            BoundObject::SignalElement(v, _) => &v.ty,
            BoundObject::Port(p) => &p.ty,
            BoundObject::PortElement(p, _) => &p.ty,
            BoundObject::Constant(c) => &c.ty,
            BoundObject::SignalVector(v) => &v.ty,
            BoundObject::PortVector(p) => &p.ty,
        }
    }

    /// Name of the object, or of the enclosing vector for elements.
    pub fn name(&self) -> &'a str {
        match self {
            BoundObject::Signal(s) => &s.name,
            BoundObject::SignalElement(v, _) => &v.name,
            BoundObject::Port(p) => &p.name,
            BoundObject::PortElement(p, _) => &p.name,
            BoundObject::Constant(c) => &c.name,
            BoundObject::SignalVector(v) => &v.name,
            BoundObject::PortVector(p) => &p.name,
        }
    }
}

impl Module {
    pub fn new<S: ToString, T: ToString>(name: S, type_name: T) -> Self {
        Self {
            name: name.to_string(),
            type_name: type_name.to_string(),
            kind: ModuleKind::Component,
            black_box: false,
            description: String::new(),
            copyright: String::new(),
            authors: String::new(),
            license: String::new(),
            ports: Vec::new(),
            internals: Vec::new(),
            behavior: Behavior::default(),
            parameters: LinkedHashMap::new(),
            parameter_types: LinkedHashMap::new(),
        }
    }

    pub fn with_port(mut self, port: Port) -> Self {
        self.ports.push(port);
        self
    }

    pub fn with_internal(mut self, internal: Internal) -> Self {
        self.internals.push(internal);
        self
    }

    pub fn port(&self, name: &str) -> Option<&Port> {
        self.ports.iter().find(|p| p.name == name)
    }

    /// Ports with the given direction, in declaration order.
    pub fn ports_with(&self, dir: Direction) -> impl Iterator<Item = &Port> {
        self.ports.iter().filter(move |p| p.direction == dir)
    }

    /// All ports ordered input, output, inout, generic.
    pub fn ordered_ports(&self) -> Vec<&Port> {
        Direction::ORDER
            .iter()
            .flat_map(|dir| self.ports_with(*dir))
            .collect()
    }

    pub fn submodules(&self) -> impl Iterator<Item = &Module> {
        self.internals.iter().filter_map(|i| match i {
            Internal::Module(m) => Some(m.as_ref()),
            _ => None,
        })
    }

    pub fn internal(&self, name: &str) -> Option<&Internal> {
        self.internals.iter().find(|i| i.name() == name)
    }

    pub fn memory_parameters(&self) -> Option<&str> {
        self.parameters.get(MEMORY_PARAMETER).map(String::as_str)
    }

    /// Resolve a connection in the scope of this module.
    pub fn resolve<'a>(&'a self, bound: &Bound) -> RtlResult<BoundObject<'a>> {
        let missing = |what: &str, name: &str| {
            Error::malformed(format!(
                "{} `{}' not found in module `{}'",
                what, name, self.name
            ))
        };
        let obj = match bound {
            Bound::Signal { name } => match self.internal(name) {
                Some(Internal::Signal(s)) => BoundObject::Signal(s),
                _ => return Err(missing("signal", name)),
            },
            Bound::SignalVector { name } => match self.internal(name) {
                Some(Internal::SignalVector(s)) => BoundObject::SignalVector(s),
                _ => return Err(missing("signal vector", name)),
            },
            Bound::SignalElement { vector, index } => match self.internal(vector) {
                Some(Internal::SignalVector(s)) if *index < s.len => {
                    BoundObject::SignalElement(s, *index)
                }
                _ => {
                    return Err(missing(
                        "signal element",
                        &format!("{}[{}]", vector, index),
                    ));
                }
            },
            Bound::Constant { name } => match self.internal(name) {
                Some(Internal::Constant(c)) => BoundObject::Constant(c),
                _ => return Err(missing("constant", name)),
            },
            Bound::Port { name } => match self.port(name) {
                Some(p) if !p.is_vector() => BoundObject::Port(p),
                _ => return Err(missing("port", name)),
            },
            Bound::PortVector { name } => match self.port(name) {
                Some(p) if p.is_vector() => BoundObject::PortVector(p),
                _ => return Err(missing("port vector", name)),
            },
            Bound::PortElement { vector, index } => match self.port(vector) {
                Some(p) if *index < p.element_count() => {
                    BoundObject::PortElement(p, *index)
                }
                _ => {
                    return Err(missing(
                        "port element",
                        &format!("{}[{}]", vector, index),
                    ));
                }
            },
        };
        Ok(obj)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TypeKind;

    fn sample() -> Module {
        Module::new("top", "top")
            .with_port(Port::new("o", Direction::Out, TypeDescriptor::bool()))
            .with_port(Port::new("i", Direction::In, TypeDescriptor::bool()))
            .with_port(Port::new("io", Direction::Inout, TypeDescriptor::bool()))
            .with_internal(Internal::SignalVector(SignalVector {
                name: "sv".into(),
                ty: TypeDescriptor::uint(8),
                len: 4,
                lsb: 0,
            }))
    }

    #[test]
    fn ports_are_ordered_by_direction() {
        let m = sample();
        let names: Vec<_> =
            m.ordered_ports().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["i", "o", "io"]);
    }

    #[test]
    fn resolve_checks_element_range() {
        let m = sample();
        assert!(m.resolve(&Bound::signal_element("sv", 3)).is_ok());
        assert!(m.resolve(&Bound::signal_element("sv", 4)).is_err());
        assert!(m.resolve(&Bound::signal("sv")).is_err());
    }

    #[test]
    fn port_vector_width() {
        let p = Port::vector(
            "v",
            Direction::In,
            TypeDescriptor::vector(TypeKind::VectorUint, 8, 2),
            3,
        );
        assert_eq!(p.total_size(), Some(48));
    }
}
