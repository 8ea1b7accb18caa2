//! Collection of the components that need a definition in the output.
use crate::params::parse_ip_components;
use rtlgen_ir::{Direction, Module, PIPE_PARAMETER, TechnologyManager};
use rtlgen_utils::{Error, RtlResult};

/// Type name used to decide whether two components share a definition.
/// Generated cores are specialized on their widths and pipelining.
pub fn mod_typename(module: &Module) -> String {
    if module.behavior.generator.is_none() {
        return module.type_name.clone();
    }
    let max_width = |dir: Direction| {
        module
            .ports_with(dir)
            .filter_map(|p| p.ty.total_size())
            .max()
            .unwrap_or(0)
    };
    let mut name = format!(
        "{}_{}_{}",
        module.type_name,
        max_width(Direction::In),
        max_width(Direction::Out)
    );
    if let Some(pipe) = module
        .parameters
        .get(PIPE_PARAMETER)
        .filter(|p| !p.is_empty())
    {
        name.push('_');
        name.push_str(pipe);
    }
    name
}

/// Depth-first, post-order walk producing each distinct component once.
pub struct ComponentCollector<'a> {
    tm: &'a dyn TechnologyManager,
    list: Vec<&'a Module>,
}

impl<'a> ComponentCollector<'a> {
    pub fn new(tm: &'a dyn TechnologyManager) -> Self {
        Self {
            tm,
            list: Vec::new(),
        }
    }

    fn is_collected(&self, module: &Module) -> bool {
        let name = mod_typename(module);
        self.list
            .iter()
            .any(|m| std::ptr::eq(*m, module) || mod_typename(m) == name)
    }

    fn visit(&mut self, module: &'a Module) -> RtlResult<()> {
        for sub in module.submodules() {
            if sub.black_box || self.tm.is_builtin(&sub.type_name) {
                continue;
            }
            self.visit(sub)?;
        }
        if let Some(ips) = &module.behavior.ip_component {
            for ip in parse_ip_components(ips)? {
                let library = match &ip.library {
                    Some(lib) => lib.as_str(),
                    None => self.tm.library_of(&ip.name).ok_or_else(|| {
                        Error::malformed(format!(
                            "IP component `{}' is not in any library",
                            ip.name
                        ))
                    })?,
                };
                let def = self.tm.get_fu(&ip.name, library).ok_or_else(|| {
                    Error::malformed(format!(
                        "IP component `{}' not found in library `{}'",
                        ip.name, library
                    ))
                })?;
                self.visit(def)?;
            }
        }
        if !self.is_collected(module) {
            log::debug!("Collected `{}'", mod_typename(module));
            self.list.push(module);
        }
        Ok(())
    }

    /// Collect the components reachable from `roots`, referenced components
    /// first.
    pub fn collect(mut self, roots: &[&'a Module]) -> RtlResult<Vec<&'a Module>> {
        for &root in roots {
            self.visit(root).map_err(|e| e.with_module(&root.name))?;
        }
        Ok(self.list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtlgen_ir::{Internal, TechLibrary};

    fn leaf(inst: &str, ty: &str) -> Internal {
        let mut m = Module::new(inst, ty);
        m.behavior.verilog_provided = Some("".into());
        Internal::Module(Box::new(m))
    }

    fn names(list: &[&Module]) -> Vec<String> {
        list.iter().map(|m| m.type_name.clone()).collect()
    }

    #[test]
    fn each_type_once_in_dependency_order() {
        let mid = Module::new("m0", "mid")
            .with_internal(leaf("a0", "adder"))
            .with_internal(leaf("a1", "adder"));
        let top = Module::new("top", "top")
            .with_internal(Internal::Module(Box::new(mid.clone())))
            .with_internal(leaf("a2", "adder"))
            .with_internal(leaf("r0", "reg"))
            .with_internal(Internal::Module(Box::new(Module {
                name: "m1".into(),
                ..mid
            })));
        let lib = TechLibrary::default();
        let list = ComponentCollector::new(&lib).collect(&[&top]).unwrap();
        assert_eq!(names(&list), vec!["adder", "mid", "reg", "top"]);

        let again = ComponentCollector::new(&lib).collect(&[&top]).unwrap();
        assert_eq!(names(&list), names(&again));
    }

    #[test]
    fn skips_black_boxes_and_builtins() {
        let mut bb = Module::new("bb0", "ext");
        bb.black_box = true;
        let top = Module::new("top", "top")
            .with_internal(Internal::Module(Box::new(bb)))
            .with_internal(leaf("g0", "AND_GATE"));
        let lib = TechLibrary::default();
        let list = ComponentCollector::new(&lib).collect(&[&top]).unwrap();
        assert_eq!(names(&list), vec!["top"]);
    }

    #[test]
    fn ip_components_are_resolved() {
        let mut lib = TechLibrary::default();
        let mut core = Module::new("core", "fifo");
        core.behavior.verilog_provided = Some("".into());
        lib.add("IPS", core);
        let mut top = Module::new("top", "top");
        top.behavior.verilog_provided = Some("fifo f();".into());
        top.behavior.ip_component = Some("fifo".into());
        let list = ComponentCollector::new(&lib).collect(&[&top]).unwrap();
        assert_eq!(names(&list), vec!["fifo", "top"]);

        top.behavior.ip_component = Some("a:b:c".into());
        let err = ComponentCollector::new(&lib).collect(&[&top]).unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn generated_cores_are_specialized_by_width() {
        use rtlgen_ir::{Port, TypeDescriptor};
        let mut core = Module::new("f0", "FPAdd")
            .with_port(Port::new("a", Direction::In, TypeDescriptor::real(32)))
            .with_port(Port::new("o", Direction::Out, TypeDescriptor::real(32)));
        core.behavior.generator = Some("FPAdd".into());
        assert_eq!(mod_typename(&core), "FPAdd_32_32");
        core.parameters.insert(PIPE_PARAMETER.into(), String::new());
        assert_eq!(mod_typename(&core), "FPAdd_32_32");
        core.parameters.insert(PIPE_PARAMETER.into(), "2".into());
        assert_eq!(mod_typename(&core), "FPAdd_32_32_2");
    }
}
