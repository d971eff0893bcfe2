//! Reader, writer and decompiler for compiled Papyrus scripts (`.pex`).

use serde::{Deserialize, Serialize};

pub mod debug;
pub mod disasm;
pub mod error;
pub mod expr;
pub mod file;
pub mod flow;
pub mod function;
pub mod header;
pub mod instruction;
mod io;
pub mod names;
pub mod opcode;
pub mod premap;
pub mod render;
pub mod script;
pub mod strings;
pub mod vdata;

pub use error::{DepexError, DisassemblyError, DisassemblyFailure};
pub use file::PexFile;
pub use header::Game;
pub use instruction::{Instruction, Slot};
pub use opcode::Opcode;
pub use strings::{StringTable, TString};
pub use vdata::VData;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssemblyLevel {
    Bytecode,
    Stripped,
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisassembleOptions {
    pub level: AssemblyLevel,
    pub declare_locals: bool,
    pub hide_autovars: bool,
}

impl Default for DisassembleOptions {
    fn default() -> Self {
        Self {
            level: AssemblyLevel::Full,
            declare_locals: true,
            hide_autovars: true,
        }
    }
}

pub fn parse(bytes: &[u8]) -> Result<PexFile, DepexError> {
    PexFile::read(bytes)
}

pub fn disassemble_with_options(file: &PexFile, options: DisassembleOptions) -> Vec<String> {
    render::render_file(file, options)
}

pub fn disassemble(file: &PexFile) -> Vec<String> {
    disassemble_with_options(file, DisassembleOptions::default())
}
