//! Pseudo-source rendering of whole script objects.

use crate::disasm::function_body;
use crate::expr::Scope;
use crate::file::PexFile;
use crate::function::Function;
use crate::names;
use crate::script::{Pex, Property, State, Struct, Variable};
use crate::strings::TString;
use crate::vdata::VData;
use crate::DisassembleOptions;

struct Renderer<'a> {
    file: &'a PexFile,
    object: &'a Pex,
    options: DisassembleOptions,
    out: Vec<String>,
}

impl<'a> Renderer<'a> {
    fn name(&self, t: TString) -> &'a str {
        self.file.strings.get(t)
    }

    fn push(&mut self, indent: usize, text: String) {
        self.out.push(format!("{}{}", "\t".repeat(indent), text));
    }

    fn with_flags(&self, mut text: String, flags: u32) -> String {
        for flag in self.file.flag_names(flags) {
            text.push(' ');
            text.push_str(flag);
        }
        text
    }

    fn doc(&mut self, indent: usize, doc: TString) {
        let text = self.name(doc);
        if !text.is_empty() {
            self.push(indent, format!("{{{text}}}"));
        }
    }

    fn header(&mut self) {
        let o = self.object;
        let mut line = format!("ScriptName {}", self.name(o.name));
        let parent = self.name(o.parent);
        if !parent.is_empty() {
            line.push_str(" extends ");
            line.push_str(parent);
        }
        if o.is_const {
            line.push_str(" Const");
        }
        let line = self.with_flags(line, o.user_flags);
        self.push(0, line);
        self.doc(0, o.doc);
    }

    fn structure(&mut self, s: &Struct) {
        self.out.push(String::new());
        self.push(0, format!("Struct {}", self.name(s.name)));
        for m in &s.members {
            let mut line = format!("{} {}", self.name(m.type_name), self.name(m.name));
            if m.value != VData::None {
                line.push_str(&format!(" = {}", m.value.render(&self.file.strings)));
            }
            if m.is_const {
                line.push_str(" Const");
            }
            let line = self.with_flags(line, m.user_flags);
            self.push(1, line);
            self.doc(1, m.doc);
        }
        self.push(0, "EndStruct".to_string());
    }

    fn is_visible(&self, v: &Variable) -> bool {
        !(self.options.hide_autovars && names::autovar_property(self.name(v.name)).is_some())
    }

    fn variable(&mut self, v: &Variable) {
        let mut line = format!("{} {}", self.name(v.type_name), self.name(v.name));
        if v.value != VData::None {
            line.push_str(&format!(" = {}", v.value.render(&self.file.strings)));
        }
        if v.is_const {
            line.push_str(" Const");
        }
        let line = self.with_flags(line, v.user_flags);
        self.push(0, line);
    }

    fn property(&mut self, p: &Property) {
        let head = format!("{} Property {}", self.name(p.type_name), self.name(p.name));
        if p.is_auto() {
            let line = self.with_flags(format!("{head} Auto"), p.user_flags);
            self.push(0, line);
            self.doc(0, p.doc);
            return;
        }
        let line = self.with_flags(head, p.user_flags);
        self.push(0, line);
        self.doc(0, p.doc);
        if let Some(getter) = &p.getter {
            self.function(getter, "Get", 1);
        }
        if let Some(setter) = &p.setter {
            self.function(setter, "Set", 1);
        }
        self.push(0, "EndProperty".to_string());
    }

    fn function(&mut self, f: &Function, fallback_name: &str, indent: usize) {
        let file = self.file;
        let name = f.name.map_or(fallback_name, |n| self.name(n));
        let params: Vec<String> =
            f.params.iter().map(|p| format!("{} {}", self.name(p.type_name), self.name(p.name))).collect();

        let mut line = String::new();
        let ret = self.name(f.return_type);
        if !ret.is_empty() && !ret.eq_ignore_ascii_case("none") {
            line.push_str(ret);
            line.push(' ');
        }
        line.push_str(&format!("Function {}({})", name, params.join(", ")));
        if f.is_global() {
            line.push_str(" Global");
        }
        if f.is_native() {
            line.push_str(" Native");
        }
        let line = self.with_flags(line, f.user_flags);
        self.push(indent, line);
        self.doc(indent, f.doc);
        if f.is_native() {
            return;
        }

        if self.options.declare_locals {
            for l in &f.locals {
                let local = self.name(l.name);
                if names::is_temp(local) || names::is_none_var(local) {
                    continue;
                }
                self.push(indent + 1, format!("{} {}", self.name(l.type_name), local));
            }
        }
        let scope = Scope::for_function(&file.strings, Some(self.object), f);
        let body = function_body(&f.instructions, &scope, self.options.level, indent + 1);
        self.out.extend(body);
        self.push(indent, "EndFunction".to_string());
    }

    fn state(&mut self, s: &State) {
        let name = self.name(s.name);
        if name.is_empty() {
            for f in &s.functions {
                self.out.push(String::new());
                self.function(f, "", 0);
            }
            return;
        }
        self.out.push(String::new());
        if name.eq_ignore_ascii_case(self.name(self.object.auto_state)) {
            self.push(0, format!("Auto State {name}"));
        } else {
            self.push(0, format!("State {name}"));
        }
        for (i, f) in s.functions.iter().enumerate() {
            if i > 0 {
                self.out.push(String::new());
            }
            self.function(f, "", 1);
        }
        self.push(0, "EndState".to_string());
    }

    fn render(mut self) -> Vec<String> {
        let o = self.object;
        self.header();
        for s in &o.structs {
            self.structure(s);
        }
        let visible: Vec<&Variable> = o.variables.iter().filter(|v| self.is_visible(v)).collect();
        if !visible.is_empty() {
            self.out.push(String::new());
            for v in visible {
                self.variable(v);
            }
        }
        if !o.properties.is_empty() {
            self.out.push(String::new());
            for p in &o.properties {
                self.property(p);
            }
        }
        // The empty-named default state first, so its functions read as
        // top-level definitions.
        let (default, named): (Vec<&State>, Vec<&State>) =
            o.states.iter().partition(|s| self.file.strings.get(s.name).is_empty());
        for s in default.into_iter().chain(named) {
            self.state(s);
        }
        self.out
    }
}

pub fn render_object(file: &PexFile, object: &Pex, options: DisassembleOptions) -> Vec<String> {
    Renderer { file, object, options, out: Vec::new() }.render()
}

pub fn render_file(file: &PexFile, options: DisassembleOptions) -> Vec<String> {
    let mut out = Vec::new();
    for (i, object) in file.objects.iter().enumerate() {
        if i > 0 {
            out.push(String::new());
        }
        out.extend(render_object(file, object, options));
    }
    out
}
