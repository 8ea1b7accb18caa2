//! Width resolution shared by every backend: where a width comes from,
//! bit ranges of ports and signals, element slices, library generics and
//! the conversion table used at binding sites.
use crate::params::{
    BITSIZE_PREFIX, LibraryRef, NUM_ELEMENTS_PREFIX, PORTSIZE_PREFIX,
};
use rtlgen_ir::{
    BoundObject, Module, Port, Signal, SignalVector, TypeDescriptor, TypeKind,
};
use rtlgen_utils::{Error, RtlResult};

/// Where the width of a scalar (or of one vector element) comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidthSource {
    /// Explicit size on the type descriptor.
    Literal(u64),
    /// Size expression propagated from an enclosing module.
    Symbolic(String),
    /// Library generic supplied at instantiation.
    Generic(String),
}

impl WidthSource {
    pub fn literal(&self) -> Option<u64> {
        match self {
            WidthSource::Literal(w) => Some(*w),
            _ => None,
        }
    }

    /// The width as an expression.
    pub fn expr(&self) -> String {
        match self {
            WidthSource::Literal(w) => w.to_string(),
            WidthSource::Symbolic(e) | WidthSource::Generic(e) => e.clone(),
        }
    }
}

/// An inclusive, descending bit range. Bounds are expressions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitRange {
    pub msb: String,
    pub lsb: String,
}

impl BitRange {
    pub fn literal(msb: u64, lsb: u64) -> Self {
        Self {
            msb: msb.to_string(),
            lsb: lsb.to_string(),
        }
    }
}

/// Selection of one element of a vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slice {
    /// A single bit.
    Index(u64),
    Range(BitRange),
}

/// `expr - 1 + offset`, folded when `expr` is a literal.
fn minus_one_plus(expr: &str, offset: u64) -> String {
    match expr.parse::<u64>() {
        Ok(v) => (v + offset).saturating_sub(1).to_string(),
        Err(_) if offset == 0 => format!("({})-1", expr),
        Err(_) => format!("({})+{}", expr, offset - 1),
    }
}

/// Width of one scalar of `port`, following the priority: explicit size,
/// symbolic size expression, library generic.
pub fn element_width(port: &Port, lib: &LibraryRef) -> RtlResult<WidthSource> {
    if let Some(w) = port.ty.total_size() {
        return Ok(WidthSource::Literal(w));
    }
    if let Some(expr) = &port.size_parameter {
        return Ok(WidthSource::Symbolic(expr.clone()));
    }
    if lib.is_port_param(&port.name) {
        let generic = if port.ty.kind.is_element_vector() {
            format!(
                "{}{}*{}{}",
                BITSIZE_PREFIX, port.name, NUM_ELEMENTS_PREFIX, port.name
            )
        } else {
            format!("{}{}", BITSIZE_PREFIX, port.name)
        };
        return Ok(WidthSource::Generic(generic));
    }
    Err(Error::malformed(format!(
        "width of port `{}' is not specified",
        port.name
    )))
}

/// Number of elements of a port vector.
fn element_count(port: &Port, lib: &LibraryRef) -> RtlResult<WidthSource> {
    match port.element_count() {
        0 if lib.is_port_param(&port.name) => Ok(WidthSource::Generic(format!(
            "{}{}",
            PORTSIZE_PREFIX, port.name
        ))),
        0 => Err(Error::malformed(format!(
            "port vector `{}' has no elements",
            port.name
        ))),
        n => Ok(WidthSource::Literal(n)),
    }
}

/// Bit range of a port declaration. `None` for single-bit booleans and
/// opaque types.
pub fn port_range(port: &Port, lib: &LibraryRef) -> RtlResult<Option<BitRange>> {
    if port.ty.kind == TypeKind::Other {
        return Ok(None);
    }
    if port.is_vector() {
        let w = element_width(port, lib)?;
        let n = element_count(port, lib)?;
        let range = match (w.literal(), n.literal()) {
            (Some(w), Some(n)) => BitRange::literal(w * n + port.lsb - 1, port.lsb),
            _ => BitRange {
                msb: minus_one_plus(
                    &format!("{}*{}", n.expr(), w.expr()),
                    port.lsb,
                ),
                lsb: port.lsb.to_string(),
            },
        };
        return Ok(Some(range));
    }
    if port.ty.kind == TypeKind::Bool {
        return Ok(None);
    }
    let w = element_width(port, lib)?;
    Ok(Some(BitRange {
        msb: minus_one_plus(&w.expr(), 0),
        lsb: "0".to_string(),
    }))
}

/// Bit range of a signal declaration.
pub fn signal_range(sig: &Signal) -> RtlResult<Option<BitRange>> {
    match sig.ty.kind {
        TypeKind::Bool | TypeKind::Other => Ok(None),
        _ => {
            let w = sig.ty.total_size().ok_or_else(|| {
                Error::malformed(format!("width of signal `{}' is not specified", sig.name))
            })?;
            Ok(Some(BitRange::literal(w - 1, 0)))
        }
    }
}

/// Bit range of a signal vector declaration.
pub fn signal_vector_range(sv: &SignalVector) -> RtlResult<BitRange> {
    let total = sv.total_size().filter(|t| *t > 0).ok_or_else(|| {
        Error::malformed(format!("width of signal vector `{}' is not specified", sv.name))
    })?;
    Ok(BitRange::literal(total + sv.lsb - 1, sv.lsb))
}

/// Slice of element `index` of a vector whose elements are `width` wide.
pub fn element_slice(
    width: &WidthSource,
    index: u64,
    lsb: u64,
    bool_elements: bool,
) -> Slice {
    if bool_elements {
        return Slice::Index(index + lsb);
    }
    match width.literal() {
        Some(w) => Slice::Range(BitRange::literal((index + 1) * w - 1 + lsb, index * w + lsb)),
        None => {
            let w = width.expr();
            let lo = if index == 0 {
                lsb.to_string()
            } else if lsb == 0 {
                format!("{}*{}", index, w)
            } else {
                format!("({}*{})+{}", index, w, lsb)
            };
            Slice::Range(BitRange {
                msb: minus_one_plus(&format!("{}*{}", index + 1, w), lsb),
                lsb: lo,
            })
        }
    }
}

/// Slice selected by an element connection target, `None` for whole objects.
pub fn bound_slice(obj: &BoundObject, owner_lib: &LibraryRef) -> RtlResult<Option<Slice>> {
    match obj {
        BoundObject::SignalElement(sv, index) => {
            let w = sv.ty.total_size().ok_or_else(|| {
                Error::malformed(format!(
                    "width of signal vector `{}' is not specified",
                    sv.name
                ))
            })?;
            Ok(Some(element_slice(
                &WidthSource::Literal(w),
                *index,
                sv.lsb,
                sv.ty.kind == TypeKind::Bool,
            )))
        }
        BoundObject::PortElement(port, index) => {
            let w = element_width(port, owner_lib)?;
            Ok(Some(element_slice(
                &w,
                *index,
                port.lsb,
                port.ty.kind == TypeKind::Bool,
            )))
        }
        _ => Ok(None),
    }
}

/// Width in bits of a connection target.
pub fn bound_width(obj: &BoundObject) -> Option<u64> {
    match obj {
        BoundObject::SignalVector(sv) => sv.total_size(),
        BoundObject::PortVector(p) => p.total_size(),
        _ => obj.ty().total_size(),
    }
}

/// A generic of a module declaration with its default value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericDecl {
    pub name: String,
    pub default: String,
}

/// Generics declared for the library-parametrized ports of `module`.
pub fn declared_port_generics(module: &Module, lib: &LibraryRef) -> Vec<GenericDecl> {
    let mut decls = Vec::new();
    for port in module.ordered_ports() {
        if !lib.is_port_param(&port.name) {
            continue;
        }
        let size = port.ty.explicit_size().unwrap_or(1);
        decls.push(GenericDecl {
            name: format!("{}{}", BITSIZE_PREFIX, port.name),
            default: size.to_string(),
        });
        if port.ty.kind.is_element_vector() {
            decls.push(GenericDecl {
                name: format!("{}{}", NUM_ELEMENTS_PREFIX, port.name),
                default: port.ty.vector_size.max(1).to_string(),
            });
        } else if port.is_vector() {
            let count = match port.element_count() {
                0 => 2,
                n => n,
            };
            decls.push(GenericDecl {
                name: format!("{}{}", PORTSIZE_PREFIX, port.name),
                default: count.to_string(),
            });
        }
    }
    decls
}

/// Generic values passed when instantiating `inst`, computed from the
/// instance's own port descriptors.
pub fn instance_port_generics(
    inst: &Module,
    def_lib: &LibraryRef,
) -> RtlResult<Vec<(String, String)>> {
    let missing = |port: &Port| {
        Error::malformed(format!(
            "Parameter is missing for port {} in module {}",
            port.name, inst.name
        ))
    };
    let mut values = Vec::new();
    for port in inst.ordered_ports() {
        if !def_lib.is_port_param(&port.name) {
            continue;
        }
        if port.ty.kind.is_element_vector() {
            let size = port.ty.explicit_size().ok_or_else(|| missing(port))?;
            values.push((format!("{}{}", BITSIZE_PREFIX, port.name), size.to_string()));
            values.push((
                format!("{}{}", NUM_ELEMENTS_PREFIX, port.name),
                port.ty.vector_size.max(1).to_string(),
            ));
            continue;
        }
        let width = match (port.ty.total_size(), &port.size_parameter) {
            (Some(w), _) => w.to_string(),
            (None, Some(expr)) => expr.clone(),
            (None, None) => return Err(missing(port)),
        };
        values.push((format!("{}{}", BITSIZE_PREFIX, port.name), width));
        if port.is_vector() {
            values.push((
                format!("{}{}", PORTSIZE_PREFIX, port.name),
                port.element_count().to_string(),
            ));
        }
    }
    Ok(values)
}

/// How a value of one type is adapted to a destination of another type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    /// Representation compatible, no wrapper.
    Identity,
    /// Wrap the source in the cast to the destination kind.
    Cast(TypeKind),
    /// Select bit 0 of the source.
    SourceBit0,
    /// Drive bit 0 of the destination.
    TargetBit0,
}

fn is_bit_vector(kind: TypeKind) -> bool {
    matches!(
        kind,
        TypeKind::VectorBool
            | TypeKind::Real
            | TypeKind::VectorInt
            | TypeKind::VectorUint
            | TypeKind::VectorReal
    )
}

/// Conversion needed to drive `target` from `source`.
pub fn conversion(target: &TypeDescriptor, source: &TypeDescriptor) -> RtlResult<Conversion> {
    use TypeKind as K;
    let single_bit = |t: &TypeDescriptor| t.total_size().is_none_or(|w| w == 1);
    let conv = match (target.kind, source.kind) {
        (t, s) if t == s => Conversion::Identity,
        (K::Bool, K::VectorBool | K::Uint | K::Int) if single_bit(source) => Conversion::SourceBit0,
        (K::VectorBool | K::Uint | K::Int, K::Bool) if single_bit(target) => Conversion::TargetBit0,
        (K::Int, K::Uint) | (K::Uint, K::Int) => Conversion::Cast(target.kind),
        (K::Int | K::Uint, s) if is_bit_vector(s) => Conversion::Cast(target.kind),
        (t, K::Int | K::Uint) if is_bit_vector(t) => Conversion::Cast(K::VectorBool),
        (t, s) if is_bit_vector(t) && is_bit_vector(s) => Conversion::Identity,
        (t, s) => {
            return Err(Error::unsupported(format!(
                "Conversion required on port binding from {:?} to {:?}",
                s, t
            )));
        }
    };
    Ok(conv)
}
