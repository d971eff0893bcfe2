use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum, builder::{Styles, styling::{AnsiColor, Effects}}, crate_description, crate_version};
use clap_complete::Shell;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AssemblyLevelCli {
    Full,
    Stripped,
    Bytecode,
}

impl From<AssemblyLevelCli> for depex_lib::AssemblyLevel {
    fn from(level: AssemblyLevelCli) -> Self {
        match level {
            AssemblyLevelCli::Full => depex_lib::AssemblyLevel::Full,
            AssemblyLevelCli::Stripped => depex_lib::AssemblyLevel::Stripped,
            AssemblyLevelCli::Bytecode => depex_lib::AssemblyLevel::Bytecode,
        }
    }
}

#[derive(Parser)]
#[command(name = "depex",
    version = crate_version!(),
    about = crate_description!(),
    styles = Styles::styled()
        .header(AnsiColor::BrightGreen.on_default() | Effects::BOLD | Effects::UNDERLINE)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightCyan.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Cyan.on_default()))]
pub struct Cli {
    /// Log parse and decompile progress to stderr
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<TopLevel>,
}

#[derive(Subcommand)]
pub enum TopLevel {
    /// Decompiles a compiled script into pseudo-source
    Disassemble {
        /// Path to the .pex file
        path: PathBuf,

        /// How far function bodies are recovered
        #[arg(long, value_enum, default_value_t = AssemblyLevelCli::Full)]
        level: AssemblyLevelCli,

        /// List auto-property backing variables with the other variables
        #[arg(long, default_value_t = false)]
        show_autovars: bool,

        /// Do not declare locals at the top of function bodies
        #[arg(long, default_value_t = false)]
        no_locals: bool,
    },
    /// Prints a JSON summary of a compiled script
    Info {
        /// Path to the .pex file
        path: PathBuf,

        /// Indent the JSON output
        #[arg(long, default_value_t = false)]
        pretty: bool,
    },
    /// Verifies that a compiled script re-serializes byte for byte
    Check {
        /// Path to the .pex file
        path: PathBuf,
    },
    /// Generate shell completion
    Completion {
        #[arg(value_enum)]
        shell: Shell,
    },
}
