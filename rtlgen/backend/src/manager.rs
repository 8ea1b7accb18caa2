//! Top-level HDL generation: collects the components reachable from the
//! roots, routes each one to a language and writes the files.
use crate::collector::{ComponentCollector, mod_typename};
use crate::emitter::ModuleEmitter;
use crate::verilog::VerilogWriter;
use crate::vhdl::VhdlWriter;
use crate::writer::HdlWriter;
use rtlgen_ir::{BackendConf, Context, Language, Module, Representation};
use rtlgen_utils::{Error, RtlResult};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Text generated for one language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub language: Language,
    /// Where the text belongs. The primary file has no path of its own.
    pub path: Option<PathBuf>,
    pub text: String,
}

/// Result of a generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HdlOutput {
    /// Text in the target language.
    pub primary: GeneratedFile,
    /// Components that are only available in another language.
    pub generated_aux: Vec<GeneratedFile>,
    /// Every auxiliary file the design needs: provided files and the
    /// generated ones, without duplicates.
    pub aux_files: Vec<PathBuf>,
}

/// Build the writer for `language`.
pub fn make_writer(language: Language, bc: &BackendConf) -> Box<dyn HdlWriter> {
    match language {
        Language::Verilog | Language::SystemVerilog => Box::new(VerilogWriter::new(language, bc)),
        Language::Vhdl => Box::new(VhdlWriter::new()),
    }
}

pub struct HdlManager<'a> {
    ctx: &'a Context,
}

impl<'a> HdlManager<'a> {
    pub fn new(ctx: &'a Context) -> Self {
        Self { ctx }
    }

    /// Language `module` is written in when `target` is requested.
    fn language_of(&self, module: &Module, target: Language) -> Language {
        let b = &module.behavior;
        if !module.internals.is_empty()
            || b.provided_text(target).is_some()
            || b.has_fsm()
            || b.equation.is_some()
            || module.black_box
        {
            return target;
        }
        // Verilog first: most library cores are written in it.
        let fallback = [Language::Verilog, Language::Vhdl, Language::SystemVerilog]
            .into_iter()
            .find(|l| b.provided_text(*l).is_some());
        match fallback {
            Some(lang) => {
                log::warn!(
                    "`{}' has no {} description, writing it in {}",
                    module.type_name,
                    target.name(),
                    lang.name()
                );
                lang
            }
            None => target,
        }
    }

    fn banner(&self, writer: &mut dyn HdlWriter) -> RtlResult<()> {
        let bc = &self.ctx.bc;
        writer.comment(&format!(
            "Generated by {} {}\nmemory mapped top: {}, interface: {}",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION"),
            bc.memory_mapped_top,
            bc.interface_type
        ))?;
        writer.file_header()
    }

    /// Generate the design in `language`. Components only available in
    /// other languages go to files next to `basename`.
    pub fn hdl_gen(&self, basename: &Path, language: Language) -> RtlResult<HdlOutput> {
        let tm = self.ctx.tech();
        let bc = &self.ctx.bc;
        if self.ctx.roots.is_empty() {
            return Err(Error::misc("there is no top component to generate"));
        }
        let roots: Vec<&Module> = self.ctx.roots.iter().collect();
        let components = ComponentCollector::new(tm).collect(&roots)?;
        log::info!("{} components to write", components.len());

        let mut aux_files: Vec<PathBuf> = Vec::new();
        let mut groups: Vec<(Language, Vec<&Module>)> = vec![(language, Vec::new())];
        for &component in &components {
            let is_root = roots.iter().any(|r| std::ptr::eq(*r, component));
            let def = if is_root {
                component
            } else {
                tm.library_of(&component.type_name)
                    .and_then(|lib| tm.get_fu(&component.type_name, lib))
                    .unwrap_or(component)
            };
            match def.representation(language) {
                Ok(Representation::ProvidedFile(path)) => {
                    if !aux_files.iter().any(|p| p == path) {
                        aux_files.push(path.to_path_buf());
                    }
                    continue;
                }
                Ok(Representation::Generator(core)) => {
                    return Err(Error::missing_feature(format!(
                        "generation of core `{}' is not available",
                        core
                    ))
                    .with_module(mod_typename(def)));
                }
                _ => (),
            }
            let lang = self.language_of(def, language);
            match groups.iter_mut().find(|(l, _)| *l == lang) {
                Some((_, list)) => list.push(def),
                None => groups.push((lang, vec![def])),
            }
        }

        let mut files = Vec::new();
        for (lang, modules) in groups {
            let mut writer = make_writer(lang, bc);
            self.banner(writer.as_mut())?;
            for module in modules {
                let time = Instant::now();
                ModuleEmitter::new(writer.as_mut(), tm, bc).write_module(module)?;
                log::info!("Generated `{}` in {:?}", mod_typename(module), time.elapsed());
            }
            let path = (lang != language).then(|| {
                let mut name = basename.as_os_str().to_owned();
                name.push(lang.extension());
                PathBuf::from(name)
            });
            files.push(GeneratedFile {
                language: lang,
                path,
                text: writer.take_text(),
            });
        }

        let mut files = files.into_iter();
        let primary = files
            .next()
            .ok_or_else(|| Error::misc("no output was generated"))?;
        let generated_aux: Vec<GeneratedFile> = files.collect();
        for path in generated_aux.iter().filter_map(|f| f.path.as_ref()) {
            if !aux_files.contains(path) {
                aux_files.push(path.clone());
            }
        }
        Ok(HdlOutput {
            primary,
            generated_aux,
            aux_files,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtlgen_ir::{Direction, Internal, Port, TechLibrary, TypeDescriptor};

    fn context(roots: Vec<Module>, tech: TechLibrary) -> Context {
        Context::new(roots, tech, BackendConf::default())
    }

    fn verilog_leaf(inst: &str, ty: &str) -> Module {
        let mut m = Module::new(inst, ty)
            .with_port(Port::new("a", Direction::In, TypeDescriptor::bool()))
            .with_port(Port::new("o", Direction::Out, TypeDescriptor::bool()));
        m.behavior.verilog_provided = Some("assign o = a;".into());
        m
    }

    #[test]
    fn no_roots_is_an_error() {
        let ctx = context(vec![], TechLibrary::default());
        assert!(HdlManager::new(&ctx).hdl_gen(Path::new("out"), Language::Verilog).is_err());
    }

    #[test]
    fn foreign_components_go_to_auxiliary_files() {
        let top = Module::new("top", "top").with_internal(Internal::Module(Box::new(verilog_leaf(
            "l0", "leaf",
        ))));
        let ctx = context(vec![top], TechLibrary::default());
        let out = HdlManager::new(&ctx)
            .hdl_gen(Path::new("design"), Language::Vhdl)
            .unwrap();
        assert_eq!(out.primary.language, Language::Vhdl);
        assert!(out.primary.text.contains("entity top is"));
        assert!(out.primary.text.contains("component leaf"));
        assert_eq!(out.generated_aux.len(), 1);
        assert!(out.generated_aux[0].text.contains("module leaf(a, o);"));
        assert_eq!(out.aux_files, vec![PathBuf::from("design.v")]);
    }

    #[test]
    fn provided_files_are_listed_once() {
        let mut ext = Module::new("x0", "ext");
        ext.behavior.verilog_file_provided = Some(PathBuf::from("ext.v"));
        let mut ext1 = ext.clone();
        ext1.name = "x1".into();
        let top = Module::new("top", "top")
            .with_internal(Internal::Module(Box::new(ext)))
            .with_internal(Internal::Module(Box::new(ext1)));
        let ctx = context(vec![top], TechLibrary::default());
        let out = HdlManager::new(&ctx)
            .hdl_gen(Path::new("design"), Language::Verilog)
            .unwrap();
        assert_eq!(out.aux_files, vec![PathBuf::from("ext.v")]);
        assert!(!out.primary.text.contains("module ext"));
    }

    #[test]
    fn generators_are_a_missing_feature() {
        let mut core = Module::new("f0", "FPAdd")
            .with_port(Port::new("a", Direction::In, TypeDescriptor::real(32)));
        core.behavior.generator = Some("FPAdd".into());
        let top = Module::new("top", "top").with_internal(Internal::Module(Box::new(core)));
        let ctx = context(vec![top], TechLibrary::default());
        let err = HdlManager::new(&ctx)
            .hdl_gen(Path::new("design"), Language::Verilog)
            .unwrap_err();
        assert!(err.is_missing_feature());
    }

    #[test]
    fn library_definitions_replace_instances() {
        let mut lib = TechLibrary::default();
        lib.add("STD", verilog_leaf("def", "leaf"));
        let mut inst = Module::new("l0", "leaf")
            .with_port(Port::new("a", Direction::In, TypeDescriptor::bool()))
            .with_port(Port::new("o", Direction::Out, TypeDescriptor::bool()));
        inst.behavior.verilog_provided = None;
        let top = Module::new("top", "top").with_internal(Internal::Module(Box::new(inst)));
        let ctx = context(vec![top], lib);
        let out = HdlManager::new(&ctx)
            .hdl_gen(Path::new("design"), Language::Verilog)
            .unwrap();
        assert!(out.primary.text.contains("assign o = a;"));
    }
}
