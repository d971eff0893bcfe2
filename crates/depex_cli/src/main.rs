use std::path::Path;

use clap::{CommandFactory, Parser};
use depex_lib::{DisassembleOptions, PexFile};
use serde::Serialize;

use crate::cli::{Cli, TopLevel};

mod cli;

#[derive(Serialize)]
struct ObjectSummary {
    name: String,
    parent: String,
    structs: usize,
    variables: usize,
    properties: usize,
    states: usize,
    functions: usize,
}

#[derive(Serialize)]
struct FileSummary<'a> {
    header: &'a depex_lib::header::Header,
    extended: bool,
    strings: usize,
    has_debug_info: bool,
    user_flags: Vec<&'a str>,
    objects: Vec<ObjectSummary>,
}

fn summarize(file: &PexFile) -> FileSummary<'_> {
    let objects = file
        .objects
        .iter()
        .map(|o| ObjectSummary {
            name: file.strings.get(o.name).to_string(),
            parent: file.strings.get(o.parent).to_string(),
            structs: o.structs.len(),
            variables: o.variables.len(),
            properties: o.properties.len(),
            states: o.states.len(),
            functions: o.function_count(),
        })
        .collect();
    FileSummary {
        header: &file.header,
        extended: file.game().is_extended(),
        strings: file.strings.len(),
        has_debug_info: file.debug.is_some(),
        user_flags: file.user_flags.iter().map(|f| file.strings.get(f.name)).collect(),
        objects,
    }
}

fn load(path: &Path) -> (Vec<u8>, PexFile) {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("failed to read {path:?}: {e}");
            std::process::exit(1);
        }
    };
    log::debug!("read {} bytes from {path:?}", bytes.len());
    match depex_lib::parse(&bytes) {
        Ok(file) => (bytes, file),
        Err(e) => {
            eprintln!("parse error in {path:?}: {e}");
            std::process::exit(1);
        }
    }
}

fn check(path: &Path) {
    let (bytes, file) = load(path);
    let written = match file.write() {
        Ok(written) => written,
        Err(e) => {
            eprintln!("write error: {e}");
            std::process::exit(1);
        }
    };
    let predicted = file.calculate_size();
    if written != bytes {
        let at = written.iter().zip(&bytes).position(|(a, b)| a != b).unwrap_or(written.len().min(bytes.len()));
        eprintln!("round trip differs at byte {at} ({} bytes in, {} bytes out)", bytes.len(), written.len());
        std::process::exit(1);
    }
    if predicted != written.len() {
        eprintln!("calculated size {predicted} does not match written size {}", written.len());
        std::process::exit(1);
    }
    println!("ok: {} bytes", written.len());
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::init_from_env(env_logger::Env::default().default_filter_or(default_filter));

    match cli.command {
        Some(TopLevel::Disassemble { path, level, show_autovars, no_locals }) => {
            let (_, file) = load(&path);
            let options = DisassembleOptions {
                level: level.into(),
                declare_locals: !no_locals,
                hide_autovars: !show_autovars,
            };
            for line in depex_lib::disassemble_with_options(&file, options) {
                println!("{line}");
            }
        }
        Some(TopLevel::Info { path, pretty }) => {
            let (_, file) = load(&path);
            let summary = summarize(&file);
            let json = if pretty { serde_json::to_string_pretty(&summary) } else { serde_json::to_string(&summary) };
            match json {
                Ok(json) => println!("{json}"),
                Err(e) => {
                    eprintln!("failed to encode summary: {e}");
                    std::process::exit(1);
                }
            }
        }
        Some(TopLevel::Check { path }) => check(&path),
        Some(TopLevel::Completion { shell }) => {
            let mut cmd = Cli::command();
            let bin_name = cmd.get_name().to_string();
            clap_complete::generate(shell, &mut cmd, bin_name, &mut std::io::stdout());
        }
        None => {
            if let Err(e) = Cli::command().print_help() {
                eprintln!("{e}");
            }
        }
    }
}
