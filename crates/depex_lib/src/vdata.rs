use serde::{Deserialize, Serialize};

use crate::DepexError;
use crate::io::{Reader, Writer};
use crate::strings::{StringTable, TString};

const TAG_NONE: u8 = 0;
const TAG_IDENTIFIER: u8 = 1;
const TAG_STRING: u8 = 2;
const TAG_INTEGER: u8 = 3;
const TAG_FLOAT: u8 = 4;
const TAG_BOOLEAN: u8 = 5;

/// `Term` and `StrLit` only exist while a function body is being decompiled;
/// they hold already-rendered text and refuse to serialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum VData {
    None,
    Identifier(TString),
    Str(TString),
    Integer(i32),
    Float(f32),
    Boolean(bool),
    Term(String),
    StrLit(String),
}

impl VData {
    pub(crate) fn read(r: &mut Reader<'_>, strings: &StringTable) -> Result<Self, DepexError> {
        let tag = r.get_u8()?;
        match tag {
            TAG_NONE => Ok(VData::None),
            TAG_IDENTIFIER => Ok(VData::Identifier(strings.read_tstring(r)?)),
            TAG_STRING => Ok(VData::Str(strings.read_tstring(r)?)),
            TAG_INTEGER => Ok(VData::Integer(r.get_i32()?)),
            TAG_FLOAT => Ok(VData::Float(r.get_f32()?)),
            TAG_BOOLEAN => Ok(VData::Boolean(r.get_bool()?)),
            other => Err(DepexError::InvalidOperandTag(other)),
        }
    }

    pub(crate) fn write(&self, w: &mut Writer) -> Result<(), DepexError> {
        match self {
            VData::None => w.put_u8(TAG_NONE),
            VData::Identifier(t) => {
                w.put_u8(TAG_IDENTIFIER);
                t.write(w);
            }
            VData::Str(t) => {
                w.put_u8(TAG_STRING);
                t.write(w);
            }
            VData::Integer(v) => {
                w.put_u8(TAG_INTEGER);
                w.put_i32(*v);
            }
            VData::Float(v) => {
                w.put_u8(TAG_FLOAT);
                w.put_f32(*v);
            }
            VData::Boolean(b) => {
                w.put_u8(TAG_BOOLEAN);
                w.put_u8(*b as u8);
            }
            VData::Term(s) | VData::StrLit(s) => return Err(DepexError::DisplayOnlyOperand(s.clone())),
        }
        Ok(())
    }

    pub fn calculate_size(&self) -> usize {
        match self {
            VData::None | VData::Term(_) | VData::StrLit(_) => 1,
            VData::Identifier(_) | VData::Str(_) => 1 + TString::SIZE,
            VData::Integer(_) | VData::Float(_) => 5,
            VData::Boolean(_) => 2,
        }
    }

    pub fn as_identifier(&self) -> Option<TString> {
        match self {
            VData::Identifier(t) => Some(*t),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            VData::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_display_only(&self) -> bool {
        matches!(self, VData::Term(_) | VData::StrLit(_))
    }

    pub fn render(&self, strings: &StringTable) -> String {
        match self {
            VData::None => "none".to_string(),
            VData::Identifier(t) => strings.get(*t).to_string(),
            VData::Str(t) => quote(strings.get(*t)),
            VData::Integer(v) => v.to_string(),
            VData::Float(v) => format!("{v:?}"),
            VData::Boolean(b) => b.to_string(),
            VData::Term(s) => s.clone(),
            VData::StrLit(s) => quote(s),
        }
    }
}

pub(crate) fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
