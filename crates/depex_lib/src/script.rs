use crate::DepexError;
use crate::function::Function;
use crate::header::Game;
use crate::io::{Reader, Writer};
use crate::strings::{StringTable, TString};
use crate::vdata::VData;

pub const PROPERTY_FLAG_READ: u8 = 0x01;
pub const PROPERTY_FLAG_WRITE: u8 = 0x02;
pub const PROPERTY_FLAG_AUTOVAR: u8 = 0x04;

#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: TString,
    pub type_name: TString,
    pub user_flags: u32,
    pub value: VData,
    pub is_const: bool,
}

impl Variable {
    fn read(r: &mut Reader<'_>, strings: &StringTable, game: Game) -> Result<Self, DepexError> {
        let name = strings.read_tstring(r)?;
        let type_name = strings.read_tstring(r)?;
        let user_flags = r.get_u32()?;
        let value = VData::read(r, strings)?;
        let is_const = if game.is_extended() { r.get_bool()? } else { false };
        Ok(Variable { name, type_name, user_flags, value, is_const })
    }

    fn write(&self, w: &mut Writer, game: Game) -> Result<(), DepexError> {
        self.name.write(w);
        self.type_name.write(w);
        w.put_u32(self.user_flags);
        self.value.write(w)?;
        if game.is_extended() {
            w.put_u8(self.is_const as u8);
        }
        Ok(())
    }

    pub fn calculate_size(&self, game: Game) -> usize {
        2 * TString::SIZE + 4 + self.value.calculate_size() + usize::from(game.is_extended())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructMember {
    pub name: TString,
    pub type_name: TString,
    pub user_flags: u32,
    pub value: VData,
    pub is_const: bool,
    pub doc: TString,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Struct {
    pub name: TString,
    pub members: Vec<StructMember>,
}

impl Struct {
    fn read(r: &mut Reader<'_>, strings: &StringTable) -> Result<Self, DepexError> {
        let name = strings.read_tstring(r)?;
        let members = r.get_list(|r| {
            let name = strings.read_tstring(r)?;
            let type_name = strings.read_tstring(r)?;
            let user_flags = r.get_u32()?;
            let value = VData::read(r, strings)?;
            let is_const = r.get_bool()?;
            let doc = strings.read_tstring(r)?;
            Ok(StructMember { name, type_name, user_flags, value, is_const, doc })
        })?;
        Ok(Struct { name, members })
    }

    fn write(&self, w: &mut Writer) -> Result<(), DepexError> {
        self.name.write(w);
        w.put_count("struct members", self.members.len())?;
        for m in &self.members {
            m.name.write(w);
            m.type_name.write(w);
            w.put_u32(m.user_flags);
            m.value.write(w)?;
            w.put_u8(m.is_const as u8);
            m.doc.write(w);
        }
        Ok(())
    }

    pub fn calculate_size(&self) -> usize {
        TString::SIZE
            + 2
            + self
                .members
                .iter()
                .map(|m| 3 * TString::SIZE + 4 + m.value.calculate_size() + 1)
                .sum::<usize>()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: TString,
    pub type_name: TString,
    pub doc: TString,
    pub user_flags: u32,
    pub flags: u8,
    pub autovar: Option<TString>,
    pub getter: Option<Function>,
    pub setter: Option<Function>,
}

impl Property {
    pub fn is_auto(&self) -> bool {
        self.flags & PROPERTY_FLAG_AUTOVAR != 0
    }

    fn read(r: &mut Reader<'_>, strings: &StringTable, game: Game) -> Result<Self, DepexError> {
        let name = strings.read_tstring(r)?;
        let type_name = strings.read_tstring(r)?;
        let doc = strings.read_tstring(r)?;
        let user_flags = r.get_u32()?;
        let flags = r.get_u8()?;
        let mut prop = Property { name, type_name, doc, user_flags, flags, autovar: None, getter: None, setter: None };
        if flags & PROPERTY_FLAG_AUTOVAR != 0 {
            prop.autovar = Some(strings.read_tstring(r)?);
        } else {
            if flags & PROPERTY_FLAG_READ != 0 {
                prop.getter = Some(Function::read(r, strings, game, false)?);
            }
            if flags & PROPERTY_FLAG_WRITE != 0 {
                prop.setter = Some(Function::read(r, strings, game, false)?);
            }
        }
        Ok(prop)
    }

    fn write(&self, w: &mut Writer) -> Result<(), DepexError> {
        self.name.write(w);
        self.type_name.write(w);
        self.doc.write(w);
        w.put_u32(self.user_flags);
        w.put_u8(self.flags);
        if let Some(autovar) = self.autovar {
            autovar.write(w);
        }
        if let Some(getter) = &self.getter {
            getter.write(w)?;
        }
        if let Some(setter) = &self.setter {
            setter.write(w)?;
        }
        Ok(())
    }

    pub fn calculate_size(&self) -> usize {
        let mut sum = 3 * TString::SIZE + 4 + 1;
        if self.autovar.is_some() {
            sum += TString::SIZE;
        }
        sum += self.getter.as_ref().map_or(0, Function::calculate_size);
        sum += self.setter.as_ref().map_or(0, Function::calculate_size);
        sum
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct State {
    pub name: TString,
    pub functions: Vec<Function>,
}

impl State {
    fn read(r: &mut Reader<'_>, strings: &StringTable, game: Game) -> Result<Self, DepexError> {
        let name = strings.read_tstring(r)?;
        let functions = r.get_list(|r| Function::read(r, strings, game, true))?;
        Ok(State { name, functions })
    }

    fn write(&self, w: &mut Writer) -> Result<(), DepexError> {
        self.name.write(w);
        w.put_count("functions", self.functions.len())?;
        for f in &self.functions {
            f.write(w)?;
        }
        Ok(())
    }

    pub fn calculate_size(&self) -> usize {
        TString::SIZE + 2 + self.functions.iter().map(Function::calculate_size).sum::<usize>()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pex {
    pub name: TString,
    pub parent: TString,
    pub doc: TString,
    pub is_const: bool,
    pub user_flags: u32,
    pub auto_state: TString,
    pub structs: Vec<Struct>,
    pub variables: Vec<Variable>,
    pub properties: Vec<Property>,
    pub states: Vec<State>,
}

impl Pex {
    pub(crate) fn read(r: &mut Reader<'_>, strings: &StringTable, game: Game) -> Result<Self, DepexError> {
        let name = strings.read_tstring(r)?;
        let parent = strings.read_tstring(r)?;
        let doc = strings.read_tstring(r)?;
        let is_const = if game.is_extended() { r.get_bool()? } else { false };
        let user_flags = r.get_u32()?;
        let auto_state = strings.read_tstring(r)?;
        let structs = if game.is_extended() { r.get_list(|r| Struct::read(r, strings))? } else { Vec::new() };
        let variables = r.get_list(|r| Variable::read(r, strings, game))?;
        let properties = r.get_list(|r| Property::read(r, strings, game))?;
        let states = r.get_list(|r| State::read(r, strings, game))?;
        log::debug!(
            "read object {} ({} variables, {} properties, {} states)",
            strings.get(name),
            variables.len(),
            properties.len(),
            states.len()
        );
        Ok(Pex { name, parent, doc, is_const, user_flags, auto_state, structs, variables, properties, states })
    }

    pub(crate) fn write(&self, w: &mut Writer, game: Game) -> Result<(), DepexError> {
        self.name.write(w);
        self.parent.write(w);
        self.doc.write(w);
        if game.is_extended() {
            w.put_u8(self.is_const as u8);
        }
        w.put_u32(self.user_flags);
        self.auto_state.write(w);
        if game.is_extended() {
            w.put_count("structs", self.structs.len())?;
            for s in &self.structs {
                s.write(w)?;
            }
        }
        w.put_count("variables", self.variables.len())?;
        for v in &self.variables {
            v.write(w, game)?;
        }
        w.put_count("properties", self.properties.len())?;
        for p in &self.properties {
            p.write(w)?;
        }
        w.put_count("states", self.states.len())?;
        for s in &self.states {
            s.write(w)?;
        }
        Ok(())
    }

    pub fn calculate_size(&self, game: Game) -> usize {
        let mut sum = 3 * TString::SIZE + 4 + TString::SIZE;
        if game.is_extended() {
            sum += 1;
            sum += 2 + self.structs.iter().map(Struct::calculate_size).sum::<usize>();
        }
        sum += 2 + self.variables.iter().map(|v| v.calculate_size(game)).sum::<usize>();
        sum += 2 + self.properties.iter().map(Property::calculate_size).sum::<usize>();
        sum += 2 + self.states.iter().map(State::calculate_size).sum::<usize>();
        sum
    }

    pub fn function_count(&self) -> usize {
        self.states.iter().map(|s| s.functions.len()).sum::<usize>()
            + self
                .properties
                .iter()
                .map(|p| usize::from(p.getter.is_some()) + usize::from(p.setter.is_some()))
                .sum::<usize>()
    }
}
