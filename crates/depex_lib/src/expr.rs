//! Source-text builders for single instructions.

use crate::function::{Function, VariableType};
use crate::instruction::Instruction;
use crate::names;
use crate::opcode::Opcode;
use crate::script::Pex;
use crate::strings::{StringTable, TString};
use crate::vdata::VData;

pub struct Scope<'a> {
    pub strings: &'a StringTable,
    vars: Vec<(TString, TString)>,
}

impl<'a> Scope<'a> {
    pub fn new(strings: &'a StringTable, vars: impl IntoIterator<Item = (TString, TString)>) -> Self {
        Self { strings, vars: vars.into_iter().collect() }
    }

    pub fn for_function(strings: &'a StringTable, object: Option<&Pex>, function: &Function) -> Self {
        let locals = function.variables().map(|v: &VariableType| (v.name, v.type_name));
        let members = object.into_iter().flat_map(|o| o.variables.iter().map(|v| (v.name, v.type_name)));
        Self::new(strings, locals.chain(members))
    }

    pub fn name(&self, t: TString) -> &'a str {
        self.strings.get(t)
    }

    pub fn type_of(&self, v: &VData) -> Option<&'a str> {
        let found = match v {
            VData::Identifier(t) => self.vars.iter().find(|(name, _)| name == t),
            // autovar already renamed to its property
            VData::Term(prop) => self.vars.iter().find(|(name, _)| {
                names::autovar_property(self.name(*name)).is_some_and(|p| p.eq_ignore_ascii_case(prop))
            }),
            _ => None,
        };
        found.map(|(_, ty)| self.strings.get(*ty))
    }

    fn show(&self, v: &VData) -> String {
        v.render(self.strings)
    }
}

fn arg<'v>(ins: &'v Instruction, i: usize) -> &'v VData {
    ins.args.get(i).unwrap_or(&VData::None)
}

fn binary_operator(op: Opcode) -> &'static str {
    use Opcode::*;
    match op {
        IADD | FADD | STRCAT => "+",
        ISUB | FSUB => "-",
        IMUL | FMUL => "*",
        IDIV | FDIV => "/",
        IMOD => "%",
        CMP_EQ => "==",
        CMP_LT => "<",
        CMP_LE => "<=",
        CMP_GT => ">",
        CMP_GE => ">=",
        _ => "?",
    }
}

fn call_args(scope: &Scope<'_>, ins: &Instruction) -> String {
    ins.var_args().iter().map(|a| scope.show(a)).collect::<Vec<_>>().join(", ")
}

fn element_type(ty: &str) -> &str {
    ty.strip_suffix("[]").unwrap_or(ty)
}

pub fn rhs(scope: &Scope<'_>, ins: &Instruction) -> Option<String> {
    use Opcode::*;
    let a = |i: usize| scope.show(arg(ins, i));
    let op = ins.opcode;
    Some(match op {
        IADD | FADD | ISUB | FSUB | IMUL | FMUL | IDIV | FDIV | IMOD | STRCAT | CMP_EQ | CMP_LT | CMP_LE
        | CMP_GT | CMP_GE => format!("({}) {} ({})", a(1), binary_operator(op), a(2)),
        NOT => format!("!({})", a(1)),
        INEG | FNEG => format!("-({})", a(1)),
        ASSIGN => a(1),
        CAST => {
            let ty = scope.type_of(arg(ins, 0));
            match ty {
                Some(ty) if ty.eq_ignore_ascii_case("bool") || ty.eq_ignore_ascii_case("string") => a(1),
                Some(ty) => format!("({}) as {}", a(1), ty),
                None => a(1),
            }
        }
        CALLMETHOD => format!("{}.{}({})", a(1), a(0), call_args(scope, ins)),
        CALLPARENT => format!("parent.{}({})", a(0), call_args(scope, ins)),
        CALLSTATIC => format!("{}.{}({})", a(0), a(1), call_args(scope, ins)),
        PROPGET => format!("{}.{}", a(1), a(0)),
        ARR_CREATE => {
            let ty = scope.type_of(arg(ins, 0)).map(element_type).unwrap_or("Var");
            format!("new {}[{}]", ty, a(1))
        }
        ARR_LENGTH => format!("{}.length", a(1)),
        ARR_GET => format!("{}[{}]", a(1), a(2)),
        ARR_FIND => format!("{}.find({}, {})", a(0), a(2), a(3)),
        ARR_RFIND => format!("{}.rfind({}, {})", a(0), a(2), a(3)),
        IS => format!("({}) is {}", a(1), a(2)),
        STRUCT_CREATE => format!("new {}", scope.type_of(arg(ins, 0)).unwrap_or("Var")),
        STRUCT_GET => format!("{}.{}", a(1), a(2)),
        ARR_FINDSTRUCT => format!("{}.findstruct({}, {}, {})", a(0), a(2), a(3), a(4)),
        ARR_RFINDSTRUCT => format!("{}.rfindstruct({}, {}, {})", a(0), a(2), a(3), a(4)),
        NOP | JMP | JMPT | JMPF | RETURN | PROPSET | ARR_SET | STRUCT_SET | ARR_ADD | ARR_INSERT
        | ARR_REMOVELAST | ARR_REMOVE | ARR_CLEAR => return None,
    })
}

pub fn term(scope: &Scope<'_>, ins: &Instruction) -> Option<VData> {
    if ins.opcode == Opcode::ASSIGN {
        return Some(match arg(ins, 1) {
            VData::Str(t) => VData::StrLit(scope.name(*t).to_string()),
            v @ (VData::Term(_) | VData::StrLit(_)) => v.clone(),
            v => VData::Term(scope.show(v)),
        });
    }
    rhs(scope, ins).map(VData::Term)
}

fn is_discarded(scope: &Scope<'_>, dest: &VData) -> bool {
    match dest {
        VData::None => true,
        VData::Identifier(t) => names::is_none_var(scope.name(*t)),
        _ => false,
    }
}

/// Statement text for one instruction; `None` for jumps, which only exist
/// as structure.
pub fn line(scope: &Scope<'_>, ins: &Instruction) -> Option<String> {
    use Opcode::*;
    let a = |i: usize| scope.show(arg(ins, i));
    if let Some(value) = rhs(scope, ins) {
        let dest = ins.dest().unwrap_or(&VData::None);
        if is_discarded(scope, dest) {
            return Some(value);
        }
        return Some(format!("{} = {}", scope.show(dest), value));
    }
    Some(match ins.opcode {
        NOP => "; nop".to_string(),
        RETURN => match arg(ins, 0) {
            VData::None => "RETURN".to_string(),
            v => format!("RETURN {}", scope.show(v)),
        },
        PROPSET => format!("{}.{} = {}", a(1), a(0), a(2)),
        ARR_SET => format!("{}[{}] = {}", a(0), a(1), a(2)),
        STRUCT_SET => format!("{}.{} = {}", a(0), a(1), a(2)),
        ARR_ADD => format!("{}.add({}, {})", a(0), a(1), a(2)),
        ARR_INSERT => format!("{}.insert({}, {})", a(0), a(1), a(2)),
        ARR_REMOVELAST => format!("{}.removelast()", a(0)),
        ARR_REMOVE => format!("{}.remove({}, {})", a(0), a(1), a(2)),
        ARR_CLEAR => format!("{}.clear()", a(0)),
        _ => return None,
    })
}
