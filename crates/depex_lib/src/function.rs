use serde::{Deserialize, Serialize};

use crate::DepexError;
use crate::header::Game;
use crate::instruction::Instruction;
use crate::io::{Reader, Writer};
use crate::strings::{StringTable, TString};

pub const FUNCTION_FLAG_GLOBAL: u8 = 0x01;
pub const FUNCTION_FLAG_NATIVE: u8 = 0x02;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VarRole {
    Param,
    Local,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableType {
    pub name: TString,
    pub type_name: TString,
    pub role: VarRole,
}

impl VariableType {
    pub(crate) fn read(r: &mut Reader<'_>, strings: &StringTable, role: VarRole) -> Result<Self, DepexError> {
        let name = strings.read_tstring(r)?;
        let type_name = strings.read_tstring(r)?;
        Ok(VariableType { name, type_name, role })
    }

    pub(crate) fn write(&self, w: &mut Writer) {
        self.name.write(w);
        self.type_name.write(w);
    }

    pub fn calculate_size(&self) -> usize {
        2 * TString::SIZE
    }
}

/// A function body. Unnamed functions are property getters and setters.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: Option<TString>,
    pub return_type: TString,
    pub doc: TString,
    pub user_flags: u32,
    pub flags: u8,
    pub params: Vec<VariableType>,
    pub locals: Vec<VariableType>,
    pub instructions: Vec<Instruction>,
}

impl Function {
    pub fn is_global(&self) -> bool {
        self.flags & FUNCTION_FLAG_GLOBAL != 0
    }

    pub fn is_native(&self) -> bool {
        self.flags & FUNCTION_FLAG_NATIVE != 0
    }

    pub fn variables(&self) -> impl Iterator<Item = &VariableType> {
        self.params.iter().chain(self.locals.iter())
    }

    pub(crate) fn read(
        r: &mut Reader<'_>,
        strings: &StringTable,
        game: Game,
        named: bool,
    ) -> Result<Self, DepexError> {
        let name = if named { Some(strings.read_tstring(r)?) } else { None };
        let return_type = strings.read_tstring(r)?;
        let doc = strings.read_tstring(r)?;
        let user_flags = r.get_u32()?;
        let flags = r.get_u8()?;
        let params = r.get_list(|r| VariableType::read(r, strings, VarRole::Param))?;
        let locals = r.get_list(|r| VariableType::read(r, strings, VarRole::Local))?;
        let instructions = r.get_list(|r| Instruction::read(r, strings, game))?;
        Ok(Function { name, return_type, doc, user_flags, flags, params, locals, instructions })
    }

    pub(crate) fn write(&self, w: &mut Writer) -> Result<(), DepexError> {
        if let Some(name) = self.name {
            name.write(w);
        }
        self.return_type.write(w);
        self.doc.write(w);
        w.put_u32(self.user_flags);
        w.put_u8(self.flags);
        w.put_count("params", self.params.len())?;
        for p in &self.params {
            p.write(w);
        }
        w.put_count("locals", self.locals.len())?;
        for l in &self.locals {
            l.write(w);
        }
        w.put_count("instructions", self.instructions.len())?;
        for ins in &self.instructions {
            ins.write(w)?;
        }
        Ok(())
    }

    pub fn calculate_size(&self) -> usize {
        let mut sum = if self.name.is_some() { TString::SIZE } else { 0 };
        sum += 2 * TString::SIZE + 4 + 1;
        sum += 2 + self.params.iter().map(VariableType::calculate_size).sum::<usize>();
        sum += 2 + self.locals.iter().map(VariableType::calculate_size).sum::<usize>();
        sum += 2 + self.instructions.iter().map(Instruction::calculate_size).sum::<usize>();
        sum
    }
}
