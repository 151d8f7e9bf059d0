//! The `xmlui` command-line interface.
//!
//! Every subcommand reads files from disk, runs one stage of the front end
//! and prints the result. Imports are loaded from disk relative to the
//! importing file. The process exits with 1 when an error-category
//! diagnostic was reported and with 2 when the command itself failed.

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use serde_json::json;
use termcolor::ColorChoice;
use thiserror::Error;
use walkdir::WalkDir;

use crate::cli::args::{ColorMode, Command, XmluiArgs};
use crate::cli::output::{print_diagnostics, print_json, print_reports, print_summary, print_tokens, Tally};
use crate::component::{BuildResult, ComponentBuilder};
use crate::diagnostics::{has_errors, Diagnostic};
use crate::markup::parse_markup;
use crate::modules::{normalize_module_path, resolve_module, ModuleErrors, ModuleGraph};
use crate::script::{parse_script, tokenize};

pub mod args;
pub mod output;

/// Extension of markup files.
pub const MARKUP_EXTENSION: &str = "xmlui";
/// Extension of script module files.
pub const SCRIPT_EXTENSION: &str = "xs";

#[derive(Debug, Error)]
pub enum CliError {
    #[error("cannot read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot walk directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("cannot write JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Whether a command reported error-category diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Clean,
    Failed,
}

impl Status {
    fn of(failed: bool) -> Self {
        if failed {
            Status::Failed
        } else {
            Status::Clean
        }
    }
}

/// The main entry point for the CLI.
pub fn run() {
    let args = XmluiArgs::parse();
    init_logging(args.verbose);
    install_report_hook(args.color);
    let color = args.color.choice();

    let result = match args.command {
        Command::Lex { file, trivia } => lex(&file, trivia, color),
        Command::Parse { file } => parse(&file, color),
        Command::Build { file, file_id } => build(&file, file_id, color),
        Command::Resolve { file } => resolve(&file, color),
        Command::Check { path } => check(&path, color),
    };

    match result {
        Ok(Status::Clean) => {}
        Ok(Status::Failed) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(2);
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "error",
        1 => "debug",
        _ => "trace",
    };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .try_init();
}

fn install_report_hook(color: ColorMode) {
    let colored = match color {
        ColorMode::Auto => return,
        ColorMode::Always => true,
        ColorMode::Never => false,
    };
    let _ = miette::set_hook(Box::new(move |_| {
        Box::new(miette::MietteHandlerOpts::new().color(colored).build())
    }));
}

// ============================================================================
// SUBCOMMANDS
// ============================================================================

fn lex(file: &Path, trivia: bool, color: ColorChoice) -> Result<Status, CliError> {
    let source = read_file(file)?;
    let (tokens, diagnostics) = tokenize(&source, trivia);
    print_tokens(&tokens);
    print_diagnostics(color, &module_name(file), &diagnostics);
    Ok(Status::of(has_errors(&diagnostics)))
}

fn parse(file: &Path, color: ColorChoice) -> Result<Status, CliError> {
    let source = read_file(file)?;
    let diagnostics = if is_markup(file) {
        let result = parse_markup(&source);
        print_json(&result.tree)?;
        result.errors
    } else {
        let result = parse_script(&source);
        print_json(&result.statements)?;
        result.errors
    };
    print_diagnostics(color, &module_name(file), &diagnostics);
    Ok(Status::of(has_errors(&diagnostics)))
}

fn build(file: &Path, file_id: u32, color: ColorChoice) -> Result<Status, CliError> {
    let source = read_file(file)?;
    let name = module_name(file);
    let result = build_file(&name, &source, file_id);
    if let Some(component) = &result.component {
        print_json(component)?;
    } else if let Some(reusable) = &result.erroneous_reusable_component_name {
        eprintln!("component '{}' could not be built", reusable);
    }
    print_diagnostics(color, &name, &result.errors);
    let mut failed = has_errors(&result.errors);
    for error in result.script_errors() {
        print_module_errors(color, &error.errors);
        failed = true;
    }
    Ok(Status::of(failed))
}

fn resolve(file: &Path, color: ColorChoice) -> Result<Status, CliError> {
    let source = read_file(file)?;
    let name = module_name(file);
    match resolve_module(&name, &source, load_from_disk) {
        Ok(graph) => {
            print_json(&graph_summary(&graph))?;
            for module in graph.modules.values() {
                print_diagnostics(color, &module.name, &module.diagnostics);
            }
            Ok(Status::Clean)
        }
        Err(errors) => {
            print_module_errors(color, &errors);
            Ok(Status::Failed)
        }
    }
}

fn check(path: &Path, color: ColorChoice) -> Result<Status, CliError> {
    let mut tally = Tally::default();
    for file in discover_files(path)? {
        let source = read_file(&file)?;
        let name = module_name(&file);
        log::debug!("checking {}", name);
        tally.files += 1;

        if is_markup(&file) {
            let result = build_file(&name, &source, tally.files as u32);
            report(color, &name, &source, &result.errors, &mut tally);
            for error in result.script_errors() {
                for (module, diagnostics) in &error.errors {
                    print_diagnostics(color, module, diagnostics);
                    tally.add(diagnostics);
                }
            }
        } else {
            match resolve_module(&name, &source, load_from_disk) {
                Ok(graph) => {
                    if let Some(root) = graph.root_module() {
                        report(color, &name, &source, &root.diagnostics, &mut tally);
                    }
                }
                Err(errors) => {
                    for (module, diagnostics) in &errors {
                        let module_source = if *module == name {
                            Some(source.clone())
                        } else {
                            fs::read_to_string(module).ok()
                        };
                        match module_source {
                            Some(text) => report(color, module, &text, diagnostics, &mut tally),
                            None => {
                                print_diagnostics(color, module, diagnostics);
                                tally.add(diagnostics);
                            }
                        }
                    }
                }
            }
        }
    }
    print_summary(color, tally);
    Ok(Status::of(tally.errors > 0))
}

// ============================================================================
// HELPERS
// ============================================================================

fn report(color: ColorChoice, name: &str, source: &str, diagnostics: &[Diagnostic], tally: &mut Tally) {
    print_diagnostics(color, name, diagnostics);
    print_reports(name, source, diagnostics);
    tally.add(diagnostics);
}

fn print_module_errors(color: ColorChoice, errors: &ModuleErrors) {
    for (module, diagnostics) in errors {
        print_diagnostics(color, module, diagnostics);
    }
}

fn build_file(name: &str, source: &str, file_id: u32) -> BuildResult {
    ComponentBuilder::new(source, file_id)
        .module_name(name)
        .module_loader(load_from_disk)
        .build()
}

/// Module loader reading imports relative to the importing file.
fn load_from_disk(from: &str, path: &str) -> Option<String> {
    let target = normalize_module_path(from, path);
    log::trace!("loading module '{}' (imported from '{}')", target, from);
    fs::read_to_string(target).ok()
}

fn graph_summary(graph: &ModuleGraph) -> serde_json::Value {
    let modules: serde_json::Map<String, serde_json::Value> = graph
        .modules
        .values()
        .map(|module| {
            (
                module.name.clone(),
                json!({
                    "exports": module.exports.keys().collect::<Vec<_>>(),
                    "functions": module.functions.keys().collect::<Vec<_>>(),
                    "importedModules": module.imported_modules,
                }),
            )
        })
        .collect();
    json!({ "root": graph.root, "modules": modules })
}

/// Markup and script files under `root`, sorted.
fn discover_files(root: &Path) -> Result<Vec<PathBuf>, CliError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if is_markup(path) || has_extension(path, SCRIPT_EXTENSION) {
            files.push(path.to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

fn read_file(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn is_markup(path: &Path) -> bool {
    has_extension(path, MARKUP_EXTENSION)
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension().is_some_and(|e| e == extension)
}

/// Module name of a file: its path with forward slashes.
fn module_name(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
