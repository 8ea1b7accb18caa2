//! Emission of one module definition through an [HdlWriter]: interface,
//! declarations, instances with their bindings and the assignments that
//! connect the module's ports to its internals.
use crate::collector::mod_typename;
use crate::fsm::FsmPlan;
use crate::params::{LibraryRef, memory_parameters, parse_ip_components};
use crate::width::{
    BitRange, Conversion, Slice, WidthSource, bound_slice, conversion, declared_port_generics,
    element_slice, element_width, instance_port_generics,
};
use crate::writer::{Actual, Binding, HdlWriter, ParamDecl, Segment};
use rtlgen_ir::{
    BackendConf, Bound, BoundObject, Direction, Internal, Module, Port, Representation,
    TechnologyManager, TypeDescriptor, TypeKind,
};
use rtlgen_utils::{Error, RtlResult, binary_literal};

/// Writes module definitions through `writer`.
pub struct ModuleEmitter<'a> {
    writer: &'a mut dyn HdlWriter,
    tm: &'a dyn TechnologyManager,
    bc: &'a BackendConf,
}

/// Declared parameters of `module`: memory parameters, library value
/// parameters and the generics of library-parametrized ports.
pub fn param_decls(module: &Module, lib: &LibraryRef) -> RtlResult<Vec<ParamDecl>> {
    let kind_of = |name: &str| {
        module
            .parameter_types
            .get(name)
            .copied()
            .unwrap_or(TypeKind::Int)
    };
    let mut decls: Vec<ParamDecl> = memory_parameters(module)?
        .into_iter()
        .map(|p| ParamDecl::Memory {
            kind: kind_of(&p.name),
            name: p.name,
            value: p.value,
        })
        .collect();
    for name in lib.value_params(module) {
        if decls.iter().any(|d| d.name() == name) {
            continue;
        }
        decls.push(ParamDecl::Value {
            name: name.to_string(),
            default: module.parameters.get(name).cloned(),
            kind: kind_of(name),
        });
    }
    decls.extend(
        declared_port_generics(module, lib)
            .into_iter()
            .map(ParamDecl::Port),
    );
    Ok(decls)
}

/// Is `port` declared with an ascending range?
fn is_ascending(obj: &BoundObject) -> bool {
    match obj {
        BoundObject::Port(p) | BoundObject::PortElement(p, _) | BoundObject::PortVector(p) => {
            p.reverse
        }
        _ => false,
    }
}

/// Bounds of a slice as expressions, most-significant first.
fn bounds(slice: &Slice) -> (String, String) {
    match slice {
        Slice::Index(i) => (i.to_string(), i.to_string()),
        Slice::Range(r) => (r.msb.clone(), r.lsb.clone()),
    }
}

/// The slice from the top of `hi` to the bottom of `lo`.
fn span(hi: &Slice, lo: &Slice) -> Slice {
    if hi == lo {
        return hi.clone();
    }
    let ((msb, _), (_, lsb)) = (bounds(hi), bounds(lo));
    Slice::Range(BitRange { msb, lsb })
}

/// Elements of one vector bound to consecutive elements of another.
struct Run<'m> {
    /// Formal element indices, `hi >= lo`.
    hi: u64,
    lo: u64,
    piece: Piece<'m>,
}

enum Piece<'m> {
    /// Actual elements `hi..=lo` of a signal or port vector.
    Elements {
        hi: BoundObject<'m>,
        lo: BoundObject<'m>,
    },
    Single(Actual),
}

/// Vector and element index of an element connection target.
fn element_of<'m>(obj: &BoundObject<'m>) -> Option<(&'m str, u64, bool)> {
    match obj {
        BoundObject::SignalElement(sv, i) => Some((sv.name.as_str(), *i, false)),
        BoundObject::PortElement(p, i) => Some((p.name.as_str(), *i, true)),
        _ => None,
    }
}

/// Element count of the vector an element belongs to.
fn vector_len(obj: &BoundObject) -> u64 {
    match obj {
        BoundObject::SignalElement(sv, _) => sv.len,
        BoundObject::PortElement(p, _) => p.element_count(),
        _ => 1,
    }
}

impl<'a> ModuleEmitter<'a> {
    pub fn new(
        writer: &'a mut dyn HdlWriter,
        tm: &'a dyn TechnologyManager,
        bc: &'a BackendConf,
    ) -> Self {
        Self { writer, tm, bc }
    }

    /// Library definition standing for `inst`, or `inst` itself.
    fn definition_of<'m>(&self, inst: &'m Module) -> &'m Module
    where
        'a: 'm,
    {
        self.tm
            .library_of(&inst.type_name)
            .and_then(|lib| self.tm.get_fu(&inst.type_name, lib))
            .unwrap_or(inst)
    }

    /// Write the definition of `module`.
    pub fn write_module(&mut self, module: &Module) -> RtlResult<()> {
        self.write(module)
            .map_err(|e| e.with_module(&module.type_name))
    }

    fn write(&mut self, module: &Module) -> RtlResult<()> {
        let lang = self.writer.language();
        let rep = module.representation(lang)?;
        let name = mod_typename(module);
        log::debug!("Writing `{}' as {:?}", name, rep);

        for (label, text) in [
            ("", &module.description),
            ("", &module.copyright),
            ("Author(s): ", &module.authors),
            ("License: ", &module.license),
        ] {
            if !text.is_empty() {
                self.writer.comment(&format!("{}{}", label, text))?;
            }
        }

        let lib = LibraryRef::of(module)?;
        self.writer.library_decl(module)?;
        self.writer.module_decl(module, &name)?;
        self.writer.parametrization_decl(&param_decls(module, &lib)?)?;
        let ports: Vec<&Port> = module
            .ordered_ports()
            .into_iter()
            .filter(|p| p.direction != Direction::Gen)
            .collect();
        if !ports.is_empty() {
            self.writer.port_decl_header()?;
            for (i, port) in ports.iter().enumerate() {
                self.writer.port_decl(port, &lib, i + 1 == ports.len())?;
            }
            self.writer.port_decl_tail()?;
        }
        self.writer.internal_decl(&name)?;

        if self.bc.timing_simulation
            && !matches!(rep, Representation::Structural | Representation::Fsm { .. })
        {
            if let Some(timing) = self.tm.timing(&module.type_name) {
                self.writer.timing_spec(module, timing)?;
            }
        }

        match rep {
            Representation::Structural => self.structural(module, &lib)?,
            Representation::Fsm {
                text,
                context_switch,
            } => {
                let plan = FsmPlan::new(module, text, context_switch, self.bc)?;
                self.writer.fsm(&plan, self.bc)?;
            }
            Representation::OpaqueText(text) => {
                self.ip_components(module)?;
                self.writer.opaque_text(text, self.bc)?;
            }
            Representation::Equation(text) => {
                self.writer.definition_begin()?;
                self.writer.equation(module, text)?;
            }
            Representation::BlackBox => self.writer.definition_begin()?,
            Representation::ProvidedFile(path) => {
                return Err(Error::misc(format!(
                    "`{}' is provided by `{}' and has no generated definition",
                    module.type_name,
                    path.display()
                )));
            }
            Representation::Generator(core) => {
                return Err(Error::missing_feature(format!(
                    "generation of core `{}' is not available",
                    core
                )));
            }
        }
        self.writer.definition_end(&name)
    }

    /// Component declarations for the IP cores used by opaque text.
    fn ip_components(&mut self, module: &Module) -> RtlResult<()> {
        let Some(ips) = &module.behavior.ip_component else {
            return Ok(());
        };
        for ip in parse_ip_components(ips)? {
            let library = ip
                .library
                .as_deref()
                .or_else(|| self.tm.library_of(&ip.name));
            let def = library.and_then(|lib| self.tm.get_fu(&ip.name, lib));
            let Some(def) = def else {
                return Err(Error::malformed(format!(
                    "IP component `{}' not found",
                    ip.name
                )));
            };
            let lib = LibraryRef::of(def)?;
            let params = param_decls(def, &lib)?;
            self.writer
                .component_decl(&mod_typename(def), def, &lib, &params)?;
        }
        Ok(())
    }

    fn structural(&mut self, module: &Module, lib: &LibraryRef) -> RtlResult<()> {
        let mut submodules: Vec<&Module> = module.submodules().collect();
        submodules.sort_by(|a, b| a.name.cmp(&b.name));

        self.writer.comment("Component and signal declarations")?;
        for sub in &submodules {
            if self.tm.is_builtin(&sub.type_name) {
                continue;
            }
            let def = self.definition_of(sub);
            let def_lib = LibraryRef::of(def)?;
            let params = param_decls(def, &def_lib)?;
            self.writer
                .component_decl(&mod_typename(sub), def, &def_lib, &params)?;
        }
        let mut signals: Vec<&Internal> = module
            .internals
            .iter()
            .filter(|i| {
                matches!(
                    i,
                    Internal::Signal(_) | Internal::SignalVector(_) | Internal::Bus(_)
                )
            })
            .collect();
        signals.sort_by(|a, b| a.name().cmp(b.name()));
        for signal in signals {
            self.writer.signal_decl(signal)?;
        }

        self.writer.definition_begin()?;
        for sub in &submodules {
            if self.tm.is_builtin(&sub.type_name) {
                self.builtin(module, lib, sub)?;
            } else {
                self.instance(module, lib, sub)?;
            }
        }
        self.post_fix(module, lib)
    }

    /// Actual text of a resolved connection target.
    fn actual(&self, obj: &BoundObject, owner_lib: &LibraryRef) -> RtlResult<Actual> {
        if let BoundObject::Constant(c) = obj {
            let width = c.ty.total_size().ok_or_else(|| {
                Error::malformed(format!("width of constant `{}' is not specified", c.name))
            })?;
            return Ok(Actual::Literal {
                bits: binary_literal(c.bits()?, width),
                bool_scalar: c.ty.kind == TypeKind::Bool,
            });
        }
        Ok(Actual::Object {
            name: obj.name().to_string(),
            slice: bound_slice(obj, owner_lib)?,
            ascending: is_ascending(obj),
            conversion: Conversion::Identity,
        })
    }

    fn zero(&self, port: &Port, width: WidthSource) -> Actual {
        Actual::Zero {
            width,
            bool_scalar: port.ty.kind == TypeKind::Bool && !port.is_vector(),
        }
    }

    /// Width of the whole of `port` as an instance formal.
    fn whole_width(&self, port: &Port, def_lib: &LibraryRef) -> RtlResult<WidthSource> {
        match port.total_size() {
            Some(w) => Ok(WidthSource::Literal(w)),
            None if port.is_vector() => {
                let elem = element_width(port, def_lib)?;
                Ok(WidthSource::Symbolic(format!(
                    "{}*({})",
                    port.element_count(),
                    elem.expr()
                )))
            }
            None => element_width(port, def_lib),
        }
    }

    fn binding(
        &self,
        owner: &Module,
        owner_lib: &LibraryRef,
        port: &Port,
        def_lib: &LibraryRef,
    ) -> RtlResult<Binding> {
        if port.is_vector() && port.bound.is_none() {
            return self.vector_binding(owner, owner_lib, port, def_lib);
        }
        let Some(bound) = &port.bound else {
            return Ok(match port.direction {
                Direction::In => Binding::whole(self.zero(port, self.whole_width(port, def_lib)?)),
                _ => Binding::Open,
            });
        };
        let obj = owner.resolve(bound)?;
        let mut actual = self.actual(&obj, owner_lib)?;
        let mut formal = None;
        if self.writer.needs_conversions() && !port.is_vector() && !matches!(obj, BoundObject::Constant(_)) {
            let ty = if matches!(obj, BoundObject::SignalVector(_) | BoundObject::PortVector(_)) {
                TypeDescriptor::vector_bool(0)
            } else {
                obj.ty().clone()
            };
            let conv = conversion(&port.ty, &ty)?;
            match conv {
                Conversion::Cast(_) if port.direction != Direction::In => {
                    return Err(Error::unsupported(format!(
                        "output port `{}' of `{}' needs a type conversion",
                        port.name, owner.name
                    )));
                }
                Conversion::TargetBit0 => formal = Some(Slice::Index(0)),
                _ => (),
            }
            if let Actual::Object { conversion, .. } = &mut actual {
                *conversion = conv;
            }
        }
        Ok(Binding::Segments(vec![Segment { formal, actual }]))
    }

    /// Bindings of the elements of a port vector, grouped into runs of
    /// consecutive elements of the same actual vector.
    fn vector_binding(
        &self,
        owner: &Module,
        owner_lib: &LibraryRef,
        port: &Port,
        def_lib: &LibraryRef,
    ) -> RtlResult<Binding> {
        let elements = port.elements.as_deref().unwrap_or_default();
        if elements.iter().all(|e| e.bound.is_none()) {
            return Ok(match port.direction {
                Direction::In => Binding::whole(self.zero(port, self.whole_width(port, def_lib)?)),
                _ => Binding::Open,
            });
        }
        let elem_width = element_width(port, def_lib)?;
        let bool_elements = port.ty.kind == TypeKind::Bool;

        let mut runs: Vec<Run> = Vec::new();
        for (i, element) in elements.iter().enumerate().rev() {
            let i = i as u64;
            let Some(bound) = &element.bound else {
                if port.direction != Direction::In {
                    return Err(Error::malformed(format!(
                        "element {} of output port vector `{}' of `{}' is not bound",
                        i, port.name, owner.name
                    )));
                }
                runs.push(Run {
                    hi: i,
                    lo: i,
                    piece: Piece::Single(Actual::Zero {
                        width: elem_width.clone(),
                        bool_scalar: bool_elements,
                    }),
                });
                continue;
            };
            let obj = owner.resolve(bound)?;
            if let (Some((name, idx, is_port)), Some(run)) = (element_of(&obj), runs.last_mut()) {
                if let Piece::Elements { lo, .. } = &mut run.piece {
                    let extends = element_of(lo)
                        .is_some_and(|(n, l, p)| n == name && p == is_port && idx + 1 == l);
                    if extends {
                        *lo = obj;
                        run.lo = i;
                        continue;
                    }
                }
            }
            let piece = if element_of(&obj).is_some() {
                Piece::Elements { hi: obj, lo: obj }
            } else {
                let mut actual = self.actual(&obj, owner_lib)?;
                if self.writer.needs_conversions() {
                    if let (BoundObject::Signal(_) | BoundObject::Port(_), Actual::Object { conversion, .. }) =
                        (&obj, &mut actual)
                    {
                        if matches!(obj.ty().kind, TypeKind::Int | TypeKind::Uint) {
                            *conversion = Conversion::Cast(TypeKind::VectorBool);
                        }
                    }
                }
                Piece::Single(actual)
            };
            runs.push(Run { hi: i, lo: i, piece });
        }

        let count = elements.len() as u64;
        let whole_port = runs.len() == 1;
        let segments = runs
            .into_iter()
            .map(|run| -> RtlResult<Segment> {
                let formal = if whole_port {
                    None
                } else {
                    let hi = element_slice(&elem_width, run.hi, port.lsb, bool_elements);
                    let lo = element_slice(&elem_width, run.lo, port.lsb, bool_elements);
                    Some(span(&hi, &lo))
                };
                let actual = match run.piece {
                    Piece::Single(actual) => actual,
                    Piece::Elements { hi, lo } => {
                        let (name, hi_idx, _) = element_of(&hi).unwrap_or_default();
                        let lo_idx = element_of(&lo).map_or(0, |(_, l, _)| l);
                        let slice = if lo_idx == 0 && hi_idx + 1 == vector_len(&hi) {
                            None
                        } else {
                            match (bound_slice(&hi, owner_lib)?, bound_slice(&lo, owner_lib)?) {
                                (Some(h), Some(l)) => Some(span(&h, &l)),
                                _ => None,
                            }
                        };
                        Actual::Object {
                            name: name.to_string(),
                            slice,
                            ascending: is_ascending(&hi),
                            conversion: Conversion::Identity,
                        }
                    }
                };
                Ok(Segment { formal, actual })
            })
            .collect::<RtlResult<Vec<_>>>()?;
        log::trace!(
            "`{}' of `{}': {} elements in {} segments",
            port.name,
            owner.name,
            count,
            segments.len()
        );
        Ok(Binding::Segments(segments))
    }

    fn instance(&mut self, owner: &Module, owner_lib: &LibraryRef, inst: &Module) -> RtlResult<()> {
        let def = self.definition_of(inst);
        let def_lib = LibraryRef::of(def)?;

        let owner_memory = memory_parameters(owner)?;
        let mut params: Vec<(String, String)> = Vec::new();
        for p in memory_parameters(inst)? {
            let value = if owner_memory.iter().any(|o| o.name == p.name) {
                p.name.clone()
            } else {
                let kind = inst.parameter_types.get(&p.name).copied().unwrap_or(TypeKind::Int);
                self.writer.param_value(kind, &p.value)
            };
            params.push((p.name, value));
        }
        for name in def_lib.value_params(def) {
            if params.iter().any(|(n, _)| n == name) {
                continue;
            }
            if let Some(value) = inst.parameters.get(name) {
                let kind = inst
                    .parameter_types
                    .get(name)
                    .or_else(|| def.parameter_types.get(name))
                    .copied()
                    .unwrap_or(TypeKind::Int);
                params.push((name.to_string(), self.writer.param_value(kind, value)));
            }
        }
        params.extend(instance_port_generics(inst, &def_lib)?);

        self.writer
            .instance_begin(&inst.name, &mod_typename(inst), &params)?;
        let mut any_bound = false;
        for port in inst.ordered_ports() {
            if port.direction == Direction::Gen {
                continue;
            }
            let binding = self.binding(owner, owner_lib, port, &def_lib)?;
            self.writer.port_binding(port, &binding, &mut any_bound)?;
        }
        self.writer.instance_end()
    }

    fn builtin(&mut self, owner: &Module, owner_lib: &LibraryRef, inst: &Module) -> RtlResult<()> {
        let unbound = |port: &Port| {
            Error::malformed(format!(
                "port `{}' of gate `{}' is not bound",
                port.name, inst.name
            ))
        };
        let out = inst
            .ports_with(Direction::Out)
            .next()
            .ok_or_else(|| Error::malformed(format!("gate `{}' has no output", inst.name)))?;
        let out_bound = out.bound.as_ref().ok_or_else(|| unbound(out))?;
        let output = self.actual(&owner.resolve(out_bound)?, owner_lib)?;
        let mut inputs = Vec::new();
        for port in inst.ports_with(Direction::In) {
            match (&port.bound, &port.elements) {
                (Some(b), _) => inputs.push(self.actual(&owner.resolve(b)?, owner_lib)?),
                (None, Some(elements)) => {
                    for e in elements {
                        let b = e.bound.as_ref().ok_or_else(|| unbound(port))?;
                        inputs.push(self.actual(&owner.resolve(b)?, owner_lib)?);
                    }
                }
                (None, None) => return Err(unbound(port)),
            }
        }
        self.writer.builtin(inst, &output, &inputs)
    }

    /// Assignments between the ports of `module` and the internal objects
    /// they are wired to.
    fn post_fix(&mut self, module: &Module, lib: &LibraryRef) -> RtlResult<()> {
        for port in module.ordered_ports() {
            if port.direction == Direction::Gen {
                continue;
            }
            for wire in &port.wires {
                self.wire(module, lib, port, None, wire)?;
            }
            for (i, element) in port.elements.iter().flatten().enumerate() {
                for wire in &element.wires {
                    self.wire(module, lib, port, Some(i as u64), wire)?;
                }
            }
        }
        Ok(())
    }

    fn wire(
        &mut self,
        module: &Module,
        lib: &LibraryRef,
        port: &Port,
        element: Option<u64>,
        wire: &Bound,
    ) -> RtlResult<()> {
        let port_obj = match element {
            Some(i) => BoundObject::PortElement(port, i),
            None if port.is_vector() => BoundObject::PortVector(port),
            None => BoundObject::Port(port),
        };
        let port_actual = self.actual(&port_obj, lib)?;
        let obj = module.resolve(wire)?;
        match obj {
            BoundObject::Constant(_) => {
                if port.direction != Direction::In {
                    let value = self.actual(&obj, lib)?;
                    self.writer.assign(&port_actual, &value)?;
                }
            }
            BoundObject::Port(other) | BoundObject::PortVector(other) | BoundObject::PortElement(other, _) => {
                if port.direction == Direction::In && other.direction != Direction::In {
                    let target = self.actual(&obj, lib)?;
                    self.writer.assign(&target, &port_actual)?;
                }
            }
            BoundObject::Signal(_) | BoundObject::SignalVector(_) | BoundObject::SignalElement(..) => {
                let signal = self.actual(&obj, lib)?;
                let (mut lhs, mut rhs, target_ty, source_ty) = match port.direction {
                    Direction::In => (signal, port_actual, obj.ty(), &port.ty),
                    Direction::Out => (port_actual, signal, &port.ty, obj.ty()),
                    Direction::Inout | Direction::Gen => {
                        log::debug!(
                            "`{}' of `{}' is bidirectional, no assignment written",
                            port.name,
                            module.type_name
                        );
                        return Ok(());
                    }
                };
                let scalars = element.is_none()
                    && !port.is_vector()
                    && matches!(obj, BoundObject::Signal(_));
                if self.writer.needs_conversions() && scalars {
                    match conversion(target_ty, source_ty)? {
                        Conversion::Identity => (),
                        Conversion::TargetBit0 => {
                            if let Actual::Object { slice, .. } = &mut lhs {
                                *slice = Some(Slice::Index(0));
                            }
                        }
                        conv => {
                            if let Actual::Object { conversion, .. } = &mut rhs {
                                *conversion = conv;
                            }
                        }
                    }
                }
                self.writer.assign(&lhs, &rhs)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verilog::VerilogWriter;
    use crate::vhdl::VhdlWriter;
    use rtlgen_ir::{Language, Signal, SignalVector, TechLibrary};

    fn emit(writer: &mut dyn HdlWriter, module: &Module) -> RtlResult<String> {
        let tm = TechLibrary::default();
        let bc = BackendConf::default();
        ModuleEmitter::new(writer, &tm, &bc).write_module(module)?;
        Ok(writer.take_text())
    }

    fn leaf(inst: &str) -> Module {
        let mut m = Module::new(inst, "leaf")
            .with_port(Port::new("a", Direction::In, TypeDescriptor::uint(8)))
            .with_port(Port::new("o", Direction::Out, TypeDescriptor::uint(8)));
        m.behavior.verilog_provided = Some("assign o = a;".into());
        m
    }

    #[test]
    fn instances_are_sorted_and_ports_assigned() {
        let mut top = Module::new("top", "top")
            .with_port(Port::new("x", Direction::In, TypeDescriptor::uint(8)).wire(Bound::signal("s0")))
            .with_port(Port::new("y", Direction::Out, TypeDescriptor::uint(8)).wire(Bound::signal("s1")));
        let mut b = leaf("b");
        b.ports[0].bound = Some(Bound::signal("s0"));
        b.ports[1].bound = Some(Bound::signal("s1"));
        let a = leaf("a");
        top = top
            .with_internal(Internal::Module(Box::new(b)))
            .with_internal(Internal::Module(Box::new(a)))
            .with_internal(Internal::Signal(Signal {
                name: "s1".into(),
                ty: TypeDescriptor::uint(8),
            }))
            .with_internal(Internal::Signal(Signal {
                name: "s0".into(),
                ty: TypeDescriptor::uint(8),
            }));
        let mut w = VerilogWriter::new(Language::Verilog, &BackendConf::default());
        let text = emit(&mut w, &top).unwrap();
        let a_at = text.find("leaf a (").unwrap();
        let b_at = text.find("leaf b (").unwrap();
        assert!(a_at < b_at);
        assert!(text.find("wire [7:0] s0;").unwrap() < text.find("wire [7:0] s1;").unwrap());
        assert!(text.contains("leaf a (.a(8'b00000000));"));
        assert!(text.contains("leaf b (.a(s0), .o(s1));"));
        assert!(text.contains("assign s0 = x;"));
        assert!(text.contains("assign y = s1;"));
    }

    #[test]
    fn missing_behavior_is_unsupported() {
        let m = Module::new("m", "nothing")
            .with_port(Port::new("a", Direction::In, TypeDescriptor::bool()));
        let mut w = VerilogWriter::new(Language::Verilog, &BackendConf::default());
        let err = emit(&mut w, &m).unwrap_err();
        assert!(err.is_unsupported());
        assert_eq!(err.module(), Some("nothing"));
    }

    fn signal(name: &str, ty: TypeDescriptor) -> Internal {
        Internal::Signal(Signal {
            name: name.into(),
            ty,
        })
    }

    #[test]
    fn vhdl_port_assignments_convert_between_types() {
        let top = Module::new("top", "top")
            .with_port(Port::new("x", Direction::In, TypeDescriptor::bool()).wire(Bound::signal("b")))
            .with_port(Port::new("flag", Direction::Out, TypeDescriptor::bool()).wire(Bound::signal("n")))
            .with_port(Port::new("o", Direction::Out, TypeDescriptor::int(8)).wire(Bound::signal("u")))
            .with_port(Port::new("a", Direction::In, TypeDescriptor::int(8)).wire(Bound::signal("v")))
            .with_internal(signal("b", TypeDescriptor::uint(1)))
            .with_internal(signal("n", TypeDescriptor::uint(1)))
            .with_internal(signal("u", TypeDescriptor::uint(8)))
            .with_internal(signal("v", TypeDescriptor::vector_bool(8)));
        let mut w = VhdlWriter::new();
        let text = emit(&mut w, &top).unwrap();
        assert!(text.contains("b(0) <= x;"), "{}", text);
        assert!(text.contains("flag <= n(0);"), "{}", text);
        assert!(text.contains("o <= signed(u);"), "{}", text);
        assert!(text.contains("v <= std_logic_vector(a);"), "{}", text);

        let mut w = VerilogWriter::new(Language::Verilog, &BackendConf::default());
        let text = emit(&mut w, &top).unwrap();
        assert!(text.contains("assign o = u;"), "{}", text);
    }

    #[test]
    fn inconvertible_port_assignment_names_the_component() {
        let top = Module::new("top", "top")
            .with_port(Port::new("flag", Direction::Out, TypeDescriptor::bool()).wire(Bound::signal("r")))
            .with_internal(signal("r", TypeDescriptor::real(64)));
        let mut w = VhdlWriter::new();
        let err = emit(&mut w, &top).unwrap_err();
        assert!(err.is_unsupported());
        assert_eq!(err.module(), Some("top"));
        assert!(
            err.to_string()
                .starts_with("[top] Unsupported construct: Conversion required on port binding"),
            "{}",
            err
        );
    }

    fn vector_top(indices: [u64; 4]) -> Module {
        let mut inst = Module::new("r0", "sink")
            .with_port(Port::vector("d", Direction::In, TypeDescriptor::uint(4), 4));
        inst.behavior.verilog_provided = Some("".into());
        for (e, idx) in inst.ports[0].elements.as_mut().unwrap().iter_mut().zip(indices) {
            e.bound = Some(Bound::signal_element("sv", idx));
        }
        Module::new("top", "top")
            .with_internal(Internal::Module(Box::new(inst)))
            .with_internal(Internal::SignalVector(SignalVector {
                name: "sv".into(),
                ty: TypeDescriptor::uint(4),
                len: 8,
                lsb: 0,
            }))
    }

    #[test]
    fn contiguous_elements_collapse_into_one_slice() {
        let mut w = VerilogWriter::new(Language::Verilog, &BackendConf::default());
        let text = emit(&mut w, &vector_top([1, 2, 3, 4])).unwrap();
        assert!(text.contains("sink r0 (.d(sv[19:4]));"), "{}", text);
    }

    #[test]
    fn scattered_elements_are_bound_one_by_one() {
        let mut w = VerilogWriter::new(Language::Verilog, &BackendConf::default());
        let text = emit(&mut w, &vector_top([6, 0, 3, 5])).unwrap();
        assert!(
            text.contains("sink r0 (.d({sv[23:20], sv[15:12], sv[3:0], sv[27:24]}));"),
            "{}",
            text
        );

        let mut w = VhdlWriter::new();
        let text = emit(&mut w, &vector_top([6, 0, 3, 5])).unwrap();
        assert!(text.contains("d(15 downto 12) => sv(23 downto 20)"), "{}", text);
        assert!(text.contains("d(3 downto 0) => sv(27 downto 24)"), "{}", text);
    }

    #[test]
    fn unbound_inputs_get_zero_of_their_width() {
        let mut inst = Module::new("g", "sink")
            .with_port(Port::new("en", Direction::In, TypeDescriptor::bool()))
            .with_port(Port::new("d", Direction::In, TypeDescriptor::int(5)))
            .with_port(Port::new("q", Direction::Out, TypeDescriptor::int(5)));
        inst.behavior.vhdl_provided = Some("begin\n".into());
        let top = Module::new("top", "top").with_internal(Internal::Module(Box::new(inst)));
        let mut w = VhdlWriter::new();
        let text = emit(&mut w, &top).unwrap();
        assert!(
            text.contains("g : sink port map (en => '0', d => \"00000\", q => open);"),
            "{}",
            text
        );
    }

    #[test]
    fn vhdl_casts_at_binding_sites() {
        let mut inst = Module::new("g", "sink")
            .with_port(Port::new("d", Direction::In, TypeDescriptor::vector_bool(8)));
        inst.ports[0].bound = Some(Bound::signal("s"));
        let top = Module::new("top", "top")
            .with_internal(Internal::Module(Box::new(inst)))
            .with_internal(Internal::Signal(Signal {
                name: "s".into(),
                ty: TypeDescriptor::uint(8),
            }));
        let mut w = VhdlWriter::new();
        let text = emit(&mut w, &top).unwrap();
        assert!(text.contains("d => std_logic_vector(s)"), "{}", text);
    }

    #[test]
    fn memory_parameters_pass_through() {
        let mut inst = leaf("m0");
        inst.parameters.insert(
            rtlgen_ir::MEMORY_PARAMETER.into(),
            "MEM_A=\"0101\";MEM_B=4".into(),
        );
        let mut top = Module::new("top", "top").with_internal(Internal::Module(Box::new(inst)));
        top.parameters
            .insert(rtlgen_ir::MEMORY_PARAMETER.into(), "MEM_A=\"0000\"".into());
        let mut w = VerilogWriter::new(Language::Verilog, &BackendConf::default());
        let text = emit(&mut w, &top).unwrap();
        assert!(text.contains("parameter MEM_A=4'b0000;"), "{}", text);
        assert!(text.contains("leaf #(.MEM_A(MEM_A), .MEM_B(4)) m0"), "{}", text);
    }
}
