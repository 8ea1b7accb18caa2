//! The backends selectable from the command line.
use crate::manager::{HdlManager, HdlOutput};
use crate::traits::Backend;
use rtlgen_ir::{Context, Direction, Language};
use rtlgen_utils::{Error, OutputFile, RtlResult, write_file};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Checks shared by every HDL backend.
fn validate_design(ctx: &Context) -> RtlResult<()> {
    if ctx.roots.is_empty() {
        return Err(Error::misc("there is no top component to generate"));
    }
    for root in &ctx.roots {
        if let Some(port) = root.ports_with(Direction::Gen).next() {
            return Err(Error::unsupported(format!(
                "top component `{}' has the generic port `{}'",
                root.type_name, port.name
            )));
        }
    }
    Ok(())
}

fn emit_language(
    ctx: &Context,
    file: &mut OutputFile,
    language: Language,
) -> RtlResult<Vec<PathBuf>> {
    let basename = file.basename("rtlgen_out");
    let output = HdlManager::new(ctx).hdl_gen(&basename, language)?;
    write_outputs(&output, file)?;
    Ok(output.aux_files)
}

/// Write the auxiliary files, then the primary one. Auxiliary files already
/// written are removed when a later write fails.
fn write_outputs(output: &HdlOutput, file: &mut OutputFile) -> RtlResult<()> {
    let mut written = Vec::new();
    let result = write_in_order(output, file, &mut written);
    if result.is_err() {
        for path in written {
            if let Err(e) = std::fs::remove_file(path) {
                log::warn!("cannot remove `{}': {}", path.display(), e);
            }
        }
    }
    result
}

fn write_in_order<'a>(
    output: &'a HdlOutput,
    file: &mut OutputFile,
    written: &mut Vec<&'a Path>,
) -> RtlResult<()> {
    for aux in &output.generated_aux {
        if let Some(path) = &aux.path {
            log::info!("Writing {} components to `{}'", aux.language.name(), path.display());
            write_file(path, &aux.text)?;
            written.push(path);
        }
    }
    let mut out = file.get_write()?;
    out.write_all(output.primary.text.as_bytes())?;
    out.flush()?;
    Ok(())
}

#[derive(Default)]
pub struct VerilogBackend;

impl Backend for VerilogBackend {
    fn name(&self) -> &'static str {
        "verilog"
    }

    fn validate(ctx: &Context) -> RtlResult<()> {
        validate_design(ctx)
    }

    fn emit(ctx: &Context, file: &mut OutputFile) -> RtlResult<Vec<PathBuf>> {
        emit_language(ctx, file, Language::Verilog)
    }
}

#[derive(Default)]
pub struct SystemVerilogBackend;

impl Backend for SystemVerilogBackend {
    fn name(&self) -> &'static str {
        "system-verilog"
    }

    fn validate(ctx: &Context) -> RtlResult<()> {
        validate_design(ctx)
    }

    fn emit(ctx: &Context, file: &mut OutputFile) -> RtlResult<Vec<PathBuf>> {
        emit_language(ctx, file, Language::SystemVerilog)
    }
}

#[derive(Default)]
pub struct VhdlBackend;

impl Backend for VhdlBackend {
    fn name(&self) -> &'static str {
        "vhdl"
    }

    fn validate(ctx: &Context) -> RtlResult<()> {
        validate_design(ctx)?;
        if let Some(root) = ctx.roots.iter().find(|r| r.behavior.fsm_cs.is_some()) {
            return Err(Error::unsupported(format!(
                "`{}' uses a context-switch FSM, which has no VHDL form",
                root.type_name
            )));
        }
        Ok(())
    }

    fn emit(ctx: &Context, file: &mut OutputFile) -> RtlResult<Vec<PathBuf>> {
        emit_language(ctx, file, Language::Vhdl)
    }
}

/// The experimental flow. It is recognized but cannot generate anything.
#[derive(Default)]
pub struct LegacyBackend;

impl Backend for LegacyBackend {
    fn name(&self) -> &'static str {
        "legacy"
    }

    fn validate(_ctx: &Context) -> RtlResult<()> {
        Err(Error::unsupported("the legacy backend is not available"))
    }

    fn emit(_ctx: &Context, _file: &mut OutputFile) -> RtlResult<Vec<PathBuf>> {
        Err(Error::unsupported("the legacy backend is not available"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::GeneratedFile;
    use rtlgen_ir::{BackendConf, Module, Port, TechLibrary, TypeDescriptor};

    #[test]
    fn legacy_is_rejected() {
        let ctx = Context::new(vec![Module::new("t", "t")], TechLibrary::default(), BackendConf::default());
        let err = LegacyBackend.run(&ctx, OutputFile::Null).unwrap_err();
        assert!(err.is_unsupported());
    }

    #[test]
    fn generic_ports_on_the_top_are_rejected() {
        let top = Module::new("t", "t").with_port(Port::new(
            "g",
            Direction::Gen,
            TypeDescriptor::uint(8),
        ));
        let ctx = Context::new(vec![top], TechLibrary::default(), BackendConf::default());
        assert!(VerilogBackend::validate(&ctx).unwrap_err().is_unsupported());
    }

    #[test]
    fn writes_to_the_null_stream() {
        let mut top = Module::new("t", "top")
            .with_port(Port::new("a", Direction::In, TypeDescriptor::bool()));
        top.black_box = true;
        let ctx = Context::new(vec![top], TechLibrary::default(), BackendConf::default());
        let aux = VhdlBackend.run(&ctx, OutputFile::Null).unwrap();
        assert!(aux.is_empty());
    }

    #[test]
    fn failed_aux_write_leaves_no_output_behind() {
        let dir = std::env::temp_dir().join(format!("rtlgen_write_order_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let primary = dir.join("top.vhd");
        let written_aux = dir.join("top.v");
        let aux = |path: PathBuf| GeneratedFile {
            language: Language::Verilog,
            path: Some(path),
            text: "module leaf();\nendmodule\n".into(),
        };
        let output = HdlOutput {
            primary: GeneratedFile {
                language: Language::Vhdl,
                path: None,
                text: "entity top is\nend top;\n".into(),
            },
            generated_aux: vec![
                aux(written_aux.clone()),
                aux(dir.join("missing").join("top.v")),
            ],
            aux_files: Vec::new(),
        };
        let err = write_outputs(&output, &mut OutputFile::file(primary.clone())).unwrap_err();
        assert!(err.to_string().starts_with("Write error: cannot write"), "{}", err);
        assert!(!primary.exists());
        assert!(!written_aux.exists());

        let output = HdlOutput {
            generated_aux: vec![aux(written_aux.clone())],
            ..output
        };
        write_outputs(&output, &mut OutputFile::file(primary.clone())).unwrap();
        assert_eq!(std::fs::read_to_string(&primary).unwrap(), "entity top is\nend top;\n");
        assert!(written_aux.exists());
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
