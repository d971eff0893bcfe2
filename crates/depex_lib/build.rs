use std::env;
use std::fs;
use std::path::PathBuf;

fn take_until_paren_close(s: &str) -> Option<&str> {
    let s = s.trim();
    let j = s.find(')')?;
    Some(s[..j].trim())
}

fn main() {
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());
    let def_path = manifest_dir.join("opcodes.def");

    println!("cargo:rerun-if-changed={}", def_path.display());

    let def_src = fs::read_to_string(&def_path).expect("read opcodes.def");

    let mut ops: Vec<(String, String, i8, bool, u8)> = Vec::new();
    for line in def_src.lines() {
        let l = line.trim();
        let rest = match l.strip_prefix("DEF(") {
            Some(v) => v,
            None => continue,
        };
        let inner = match take_until_paren_close(rest) {
            Some(v) => v,
            None => continue,
        };
        let parts: Vec<&str> = inner.split(',').map(|p| p.trim()).collect();
        if parts.len() != 5 {
            continue;
        }
        let id = parts[0].to_string();
        let mnemonic = parts[1].to_string();
        let arity: i8 = parts[2].parse().expect("opcode arity");
        let conditional = parts[3] == "1";
        let dialect: u8 = parts[4].parse().expect("opcode dialect");
        ops.push((id, mnemonic, arity, conditional, dialect));
    }
    assert!(ops.len() <= 256, "too many opcodes");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let out_path = out_dir.join("pex_opcodes.rs");

    let mut out = String::new();

    out.push_str("#[allow(non_camel_case_types, clippy::upper_case_acronyms)]\n");
    out.push_str("#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]\n");
    out.push_str("#[repr(u8)]\n");
    out.push_str("pub enum Opcode {\n");
    for (i, (id, _, _, _, _)) in ops.iter().enumerate() {
        out.push_str(&format!("    {} = 0x{:02x},\n", id, i));
    }
    out.push_str("}\n\n");

    out.push_str("#[derive(Debug, Clone, Copy)]\n");
    out.push_str("pub struct OpInfo {\n");
    out.push_str("    pub name: &'static str,\n");
    out.push_str("    pub arity: i8,\n");
    out.push_str("    pub conditional: bool,\n");
    out.push_str("    pub dialect: u8,\n");
    out.push_str("}\n\n");

    out.push_str("pub const OPCODES: &[Opcode] = &[\n");
    for (id, _, _, _, _) in &ops {
        out.push_str(&format!("    Opcode::{},\n", id));
    }
    out.push_str("];\n\n");

    out.push_str("pub const OPCODE_INFO: &[OpInfo] = &[\n");
    for (_, mnemonic, arity, conditional, dialect) in &ops {
        out.push_str(&format!(
            "    OpInfo {{ name: \"{}\", arity: {}, conditional: {}, dialect: {} }},\n",
            mnemonic, arity, conditional, dialect
        ));
    }
    out.push_str("];\n");

    fs::write(out_path, out).expect("write generated opcode tables");
}
