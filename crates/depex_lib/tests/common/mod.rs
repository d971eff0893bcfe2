#![allow(dead_code)]

use depex_lib::debug::{DebugFunction, DebugInfo, FunctionKind, PropertyGroup, StructOrder};
use depex_lib::file::UserFlag;
use depex_lib::function::{FUNCTION_FLAG_GLOBAL, Function, VarRole, VariableType};
use depex_lib::header::Header;
use depex_lib::script::{
    PROPERTY_FLAG_AUTOVAR, PROPERTY_FLAG_READ, PROPERTY_FLAG_WRITE, Pex, Property, State, Struct, StructMember, Variable,
};
use depex_lib::{Game, Instruction, Opcode, PexFile, StringTable, TString, VData};

/// Interns strings while a fixture is being assembled.
pub struct Strings(pub StringTable);

impl Strings {
    pub fn new() -> Self {
        Strings(StringTable::new())
    }

    pub fn s(&mut self, text: &str) -> TString {
        self.0.add_string(text).unwrap()
    }

    pub fn id(&mut self, text: &str) -> VData {
        VData::Identifier(self.s(text))
    }
}

pub fn ins(op: Opcode, args: Vec<VData>) -> Instruction {
    Instruction::new(op, args)
}

pub fn local(st: &mut Strings, name: &str, ty: &str) -> VariableType {
    VariableType { name: st.s(name), type_name: st.s(ty), role: VarRole::Local }
}

pub fn param(st: &mut Strings, name: &str, ty: &str) -> VariableType {
    VariableType { name: st.s(name), type_name: st.s(ty), role: VarRole::Param }
}

pub fn function(st: &mut Strings, name: Option<&str>, ret: &str, instructions: Vec<Instruction>) -> Function {
    Function {
        name: name.map(|n| st.s(n)),
        return_type: st.s(ret),
        doc: st.s(""),
        user_flags: 0,
        flags: 0,
        params: Vec::new(),
        locals: Vec::new(),
        instructions,
    }
}

pub fn header(game: Game) -> Header {
    Header {
        game,
        version: 0x0302,
        compilation_time: 1_600_000_000,
        source: "Counter.psc".into(),
        user: "builder".into(),
        machine: "WORKSTATION".into(),
    }
}

pub fn file(game: Game, st: Strings, debug: Option<DebugInfo>, user_flags: Vec<UserFlag>, objects: Vec<Pex>) -> PexFile {
    PexFile { header: header(game), strings: st.0, debug, user_flags, objects }
}

/// A script exercising every layout feature of `game`.
pub fn sample(game: Game) -> PexFile {
    let mut st = Strings::new();
    let empty = st.s("");

    let body = vec![
        ins(Opcode::IADD, vec![st.id("::temp0"), st.id("a"), VData::Integer(1)]),
        ins(Opcode::ASSIGN, vec![st.id("count"), st.id("::temp0")]),
        ins(
            Opcode::CALLSTATIC,
            vec![st.id("Debug"), st.id("Trace"), st.id("::NoneVar"), VData::Str(st.s("added")), VData::Integer(0)],
        ),
        ins(Opcode::CMP_GT, vec![st.id("::temp1"), st.id("count"), VData::Float(2.5)]),
        ins(Opcode::JMPF, vec![st.id("::temp1"), VData::Integer(3)]),
        ins(Opcode::ASSIGN, vec![st.id("done"), VData::Boolean(true)]),
        ins(Opcode::JMP, vec![VData::Integer(1)]),
        ins(Opcode::RETURN, vec![st.id("count")]),
    ];
    let mut add = function(&mut st, Some("Add"), "Int", body);
    add.flags = FUNCTION_FLAG_GLOBAL;
    add.params.push(param(&mut st, "a", "Int"));
    add.locals.push(local(&mut st, "::temp0", "Int"));
    add.locals.push(local(&mut st, "::temp1", "Bool"));

    let body = vec![ins(Opcode::RETURN, vec![st.id("count")])];
    let getter = function(&mut st, None, "Int", body);
    let body = vec![ins(Opcode::ASSIGN, vec![st.id("count"), st.id("value")])];
    let mut setter = function(&mut st, None, "None", body);
    setter.params.push(param(&mut st, "value", "Int"));

    let structs = if game.is_extended() {
        vec![Struct {
            name: st.s("Point"),
            members: vec![StructMember {
                name: st.s("X"),
                type_name: st.s("Float"),
                user_flags: 0,
                value: VData::Float(0.0),
                is_const: false,
                doc: st.s("horizontal"),
            }],
        }]
    } else {
        Vec::new()
    };

    let object = Pex {
        name: st.s("Counter"),
        parent: st.s("Quest"),
        doc: st.s("Counts things."),
        is_const: false,
        user_flags: 0b11,
        auto_state: empty,
        structs,
        variables: vec![
            Variable { name: st.s("count"), type_name: st.s("Int"), user_flags: 0, value: VData::Integer(0), is_const: false },
            Variable { name: st.s("::Gold_var"), type_name: st.s("Int"), user_flags: 0, value: VData::None, is_const: game.is_extended() },
        ],
        properties: vec![
            Property {
                name: st.s("Gold"),
                type_name: st.s("Int"),
                doc: empty,
                user_flags: 1,
                flags: PROPERTY_FLAG_READ | PROPERTY_FLAG_WRITE | PROPERTY_FLAG_AUTOVAR,
                autovar: Some(st.s("::Gold_var")),
                getter: None,
                setter: None,
            },
            Property {
                name: st.s("Total"),
                type_name: st.s("Int"),
                doc: st.s("Current count."),
                user_flags: 0,
                flags: PROPERTY_FLAG_READ | PROPERTY_FLAG_WRITE,
                autovar: None,
                getter: Some(getter),
                setter: Some(setter),
            },
        ],
        states: vec![
            State { name: empty, functions: vec![add] },
            State { name: st.s("Waiting"), functions: vec![function(&mut st, Some("OnBegin"), "None", Vec::new())] },
        ],
    };

    let debug = DebugInfo {
        modification_time: 1_600_000_100,
        functions: vec![DebugFunction {
            object_name: st.s("Counter"),
            state_name: empty,
            function_name: st.s("Add"),
            kind: FunctionKind::Method,
            line_numbers: vec![3, 3, 4, 5, 5, 6, 6, 8],
        }],
        property_groups: if game.is_extended() {
            vec![PropertyGroup {
                object_name: st.s("Counter"),
                group_name: st.s("Main"),
                doc: empty,
                user_flags: 0,
                names: vec![st.s("Gold"), st.s("Total")],
            }]
        } else {
            Vec::new()
        },
        struct_orders: if game.is_extended() {
            vec![StructOrder { object_name: st.s("Counter"), order_name: st.s("Point"), names: vec![st.s("X")] }]
        } else {
            Vec::new()
        },
    };

    let user_flags = vec![UserFlag { name: st.s("hidden"), bit: 0 }, UserFlag { name: st.s("conditional"), bit: 1 }];
    file(game, st, Some(debug), user_flags, vec![object])
}
