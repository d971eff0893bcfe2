use crate::DepexError;
use crate::header::Game;
use crate::io::{Reader, Writer};
use crate::opcode::Opcode;
use crate::strings::StringTable;
use crate::vdata::VData;

/// One bytecode instruction. For variadic opcodes `args` holds the fixed
/// operands followed by the counted tail; the count itself is implied.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    pub opcode: Opcode,
    pub args: Vec<VData>,
}

impl Instruction {
    pub fn new(opcode: Opcode, args: Vec<VData>) -> Self {
        Self { opcode, args }
    }

    pub fn var_args(&self) -> &[VData] {
        let fixed = self.opcode.fixed_args().min(self.args.len());
        &self.args[fixed..]
    }

    pub fn dest(&self) -> Option<&VData> {
        self.opcode.dest_index().and_then(|i| self.args.get(i))
    }

    pub fn jump_offset(&self) -> Option<i32> {
        match self.opcode {
            Opcode::JMP => self.args.first().and_then(VData::as_int),
            Opcode::JMPT | Opcode::JMPF => self.args.get(1).and_then(VData::as_int),
            _ => None,
        }
    }

    pub(crate) fn read(r: &mut Reader<'_>, strings: &StringTable, game: Game) -> Result<Self, DepexError> {
        let op = r.get_u8()?;
        let opcode = Opcode::from_u8(op, game).ok_or(DepexError::InvalidOpcode(op))?;
        let mut args = Vec::with_capacity(opcode.fixed_args());
        for _ in 0..opcode.fixed_args() {
            args.push(VData::read(r, strings)?);
        }
        if opcode.is_variadic() {
            let count = match VData::read(r, strings)? {
                VData::Integer(n) if n >= 0 => n as usize,
                _ => return Err(DepexError::InvalidVarArgCount { opcode: opcode.name() }),
            };
            for _ in 0..count {
                args.push(VData::read(r, strings)?);
            }
        }
        Ok(Instruction { opcode, args })
    }

    pub(crate) fn write(&self, w: &mut Writer) -> Result<(), DepexError> {
        w.put_u8(self.opcode as u8);
        let fixed = self.opcode.fixed_args();
        for (i, a) in self.args.iter().enumerate() {
            if i == fixed && self.opcode.is_variadic() {
                VData::Integer(self.var_args().len() as i32).write(w)?;
            }
            a.write(w)?;
        }
        if self.opcode.is_variadic() && self.args.len() <= fixed {
            VData::Integer(0).write(w)?;
        }
        Ok(())
    }

    pub fn calculate_size(&self) -> usize {
        let count_size = if self.opcode.is_variadic() { VData::Integer(0).calculate_size() } else { 0 };
        1 + count_size + self.args.iter().map(VData::calculate_size).sum::<usize>()
    }

    pub fn render_raw(&self, strings: &StringTable) -> String {
        let mut out = self.opcode.name().to_string();
        for a in &self.args {
            out.push(' ');
            out.push_str(&a.render(strings));
        }
        out
    }
}

/// Position in a function body during decompilation. Folded instructions are
/// elided in place so jump offsets computed from the binary stay valid.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    Active(Instruction),
    Elided(Instruction),
}

impl Slot {
    pub fn active(&self) -> Option<&Instruction> {
        match self {
            Slot::Active(i) => Some(i),
            Slot::Elided(_) => None,
        }
    }

    pub fn is_elided(&self) -> bool {
        matches!(self, Slot::Elided(_))
    }

    pub(crate) fn instruction(&self) -> &Instruction {
        match self {
            Slot::Active(i) | Slot::Elided(i) => i,
        }
    }
}
