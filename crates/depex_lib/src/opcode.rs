use std::fmt;

use crate::header::Game;

mod tables {
    include!(concat!(env!("OUT_DIR"), "/pex_opcodes.rs"));
}

pub use tables::Opcode;

impl Opcode {
    pub fn from_u8(op: u8, game: Game) -> Option<Opcode> {
        let opcode = *tables::OPCODES.get(op as usize)?;
        if opcode.info().dialect > game.dialect() {
            return None;
        }
        Some(opcode)
    }

    fn info(self) -> &'static tables::OpInfo {
        &tables::OPCODE_INFO[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.info().name
    }

    pub fn is_conditional(self) -> bool {
        self.info().conditional
    }

    pub fn arity(self) -> i8 {
        self.info().arity
    }

    pub fn fixed_args(self) -> usize {
        self.arity().unsigned_abs() as usize
    }

    pub fn is_variadic(self) -> bool {
        self.arity() < 0
    }

    pub fn dest_index(self) -> Option<usize> {
        use Opcode::*;
        match self {
            IADD | FADD | ISUB | FSUB | IMUL | FMUL | IDIV | FDIV | IMOD | NOT | INEG | FNEG | ASSIGN | CAST
            | CMP_EQ | CMP_LT | CMP_LE | CMP_GT | CMP_GE | STRCAT | ARR_CREATE | ARR_LENGTH | ARR_GET | IS
            | STRUCT_CREATE | STRUCT_GET => Some(0),
            CALLPARENT | ARR_FIND | ARR_RFIND | ARR_FINDSTRUCT | ARR_RFINDSTRUCT => Some(1),
            CALLMETHOD | CALLSTATIC | PROPGET => Some(2),
            NOP | JMP | JMPT | JMPF | RETURN | PROPSET | ARR_SET | STRUCT_SET | ARR_ADD | ARR_INSERT
            | ARR_REMOVELAST | ARR_REMOVE | ARR_CLEAR => None,
        }
    }

    pub fn is_inlinable(self) -> bool {
        self.dest_index().is_some()
    }

    pub fn all() -> &'static [Opcode] {
        tables::OPCODES
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opcode_values_follow_declaration_order() {
        assert_eq!(Opcode::NOP as u8, 0x00);
        assert_eq!(Opcode::JMP as u8, 0x14);
        assert_eq!(Opcode::JMPF as u8, 0x16);
        assert_eq!(Opcode::CALLMETHOD as u8, 0x17);
        assert_eq!(Opcode::ARR_RFIND as u8, 0x23);
        assert_eq!(Opcode::ARR_CLEAR as u8, 0x2e);
        for (i, op) in Opcode::all().iter().enumerate() {
            assert_eq!(*op as usize, i);
        }
    }

    #[test]
    fn extended_opcodes_need_extended_dialect() {
        assert_eq!(Opcode::from_u8(0x24, Game::Skyrim), None);
        assert_eq!(Opcode::from_u8(0x24, Game::Fallout4), Some(Opcode::IS));
        assert_eq!(Opcode::from_u8(0x16, Game::Skyrim), Some(Opcode::JMPF));
        assert_eq!(Opcode::from_u8(0xff, Game::Fallout4), None);
    }

    #[test]
    fn arity_and_destinations() {
        assert_eq!(Opcode::CALLMETHOD.arity(), -3);
        assert!(Opcode::CALLMETHOD.is_variadic());
        assert_eq!(Opcode::CALLPARENT.fixed_args(), 2);
        assert_eq!(Opcode::CALLMETHOD.dest_index(), Some(2));
        assert_eq!(Opcode::ARR_FIND.dest_index(), Some(1));
        assert_eq!(Opcode::IADD.dest_index(), Some(0));
        assert!(Opcode::JMPT.is_conditional() && Opcode::JMPF.is_conditional());
        assert!(!Opcode::JMP.is_conditional());
        for op in [Opcode::JMP, Opcode::JMPT, Opcode::JMPF, Opcode::ARR_SET, Opcode::PROPSET, Opcode::RETURN] {
            assert!(!op.is_inlinable(), "{op}");
        }
    }
}
