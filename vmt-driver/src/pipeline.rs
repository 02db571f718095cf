//! Translation pipeline: locate sources, read every unit, then generate

use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};
use vmt_codegen::{generate_assembly, TranslationUnit, TranslatorOptions};
use vmt_common::ErrorReporter;
use vmt_frontend::Frontend;

/// When to emit the bootstrap prologue
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BootstrapMode {
    /// Only if some unit declares the entry function
    Auto,
    Always,
    Never,
}

/// The `.vm` files named by `input`: the file itself, or every `*.vm` in a directory
pub fn collect_sources(input: &Path) -> Result<Vec<PathBuf>> {
    if input.is_dir() {
        let pattern = input.join("*.vm");
        let pattern = pattern.to_string_lossy();
        let mut sources = Vec::new();
        for entry in glob::glob(&pattern)? {
            sources.push(entry?);
        }
        sources.sort();
        if sources.is_empty() {
            bail!("no .vm files in {}", input.display());
        }
        Ok(sources)
    } else if input.extension().is_some_and(|ext| ext == "vm") {
        Ok(vec![input.to_path_buf()])
    } else {
        bail!("{} is neither a .vm file nor a directory", input.display());
    }
}

/// `<stem>.asm` next to a file, `<dir>/<dirname>.asm` for a directory
pub fn default_output(input: &Path) -> Result<PathBuf> {
    if input.is_dir() {
        let dir = fs::canonicalize(input)
            .with_context(|| format!("resolving {}", input.display()))?;
        let name = dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "out".to_string());
        Ok(input.join(format!("{}.asm", name)))
    } else {
        Ok(input.with_extension("asm"))
    }
}

/// Read every source; all diagnostics are printed before failing
pub fn load_units(sources: &[PathBuf]) -> Result<Vec<TranslationUnit>> {
    let mut reporter = ErrorReporter::new();
    let mut units = Vec::new();

    for path in sources {
        match Frontend::parse_file(path) {
            Ok(instructions) => {
                debug!("{}: {} instructions", path.display(), instructions.len());
                units.push(TranslationUnit::new(&Frontend::unit_name(path), instructions));
            }
            Err(errors) => {
                for err in &errors {
                    reporter.report(err);
                }
            }
        }
    }

    if reporter.has_errors() {
        reporter.print_diagnostics();
        bail!("translation failed: {}", reporter.summary());
    }
    Ok(units)
}

pub fn should_bootstrap(mode: BootstrapMode, units: &[TranslationUnit], entry_point: &str) -> bool {
    match mode {
        BootstrapMode::Always => true,
        BootstrapMode::Never => false,
        BootstrapMode::Auto => units.iter().any(|unit| unit.declares(entry_point)),
    }
}

/// Translate `input` to assembly text without writing anything
pub fn translate(input: &Path, options: &TranslatorOptions, mode: BootstrapMode) -> Result<String> {
    let sources = collect_sources(input)?;
    let units = load_units(&sources)?;

    let bootstrap = should_bootstrap(mode, &units, &options.entry_point);
    if mode == BootstrapMode::Always && !units.iter().any(|unit| unit.declares(&options.entry_point)) {
        let mut reporter = ErrorReporter::new();
        reporter.warning(
            format!("bootstrap calls {} but no unit declares it", options.entry_point),
            None,
        );
        reporter.print_diagnostics();
    }
    info!(
        "Translating {} units (bootstrap: {})",
        units.len(),
        bootstrap
    );

    Ok(generate_assembly(&units, options, bootstrap))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, source: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, source).unwrap();
        path
    }

    #[test]
    fn test_directory_sources_are_sorted() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "Sys.vm", "function Sys.init 0\n");
        write(dir.path(), "Main.vm", "function Main.main 0\n");
        write(dir.path(), "notes.txt", "ignored");

        let sources = collect_sources(dir.path()).unwrap();
        let names: Vec<String> = sources
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["Main.vm", "Sys.vm"]);
    }

    #[test]
    fn test_default_output_paths() {
        let dir = TempDir::new().unwrap();
        let program = dir.path().join("FibonacciElement");
        fs::create_dir(&program).unwrap();
        assert_eq!(
            default_output(&program).unwrap(),
            program.join("FibonacciElement.asm")
        );
        assert_eq!(
            default_output(Path::new("dir/Basic.vm")).unwrap(),
            PathBuf::from("dir/Basic.asm")
        );
    }

    #[test]
    fn test_rejects_non_vm_file() {
        assert!(collect_sources(Path::new("Main.jack")).is_err());
    }

    #[test]
    fn test_auto_bootstrap_follows_entry_declaration() {
        let dir = TempDir::new().unwrap();
        let basic = write(dir.path(), "Basic.vm", "push constant 1\n");
        let options = TranslatorOptions::default();

        let asm = translate(&basic, &options, BootstrapMode::Auto).unwrap();
        assert!(!asm.contains("@256"));

        write(dir.path(), "Sys.vm", "function Sys.init 0\nlabel L\ngoto L\n");
        let asm = translate(dir.path(), &options, BootstrapMode::Auto).unwrap();
        assert!(asm.contains("(Sys.init$ret.0)"));

        let asm = translate(&basic, &options, BootstrapMode::Never).unwrap();
        assert!(!asm.contains("Sys.init"));
    }

    #[test]
    fn test_any_bad_unit_fails_the_whole_translation() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "Good.vm", "push constant 1\n");
        write(dir.path(), "Bad.vm", "push nowhere 1\n");
        let err = translate(dir.path(), &TranslatorOptions::default(), BootstrapMode::Never).unwrap_err();
        assert!(err.to_string().contains("1 error"));
    }
}
