use crate::DepexError;
use crate::header::Game;
use crate::io::{Reader, Writer};
use crate::strings::{StringTable, TString};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    Method,
    Getter,
    Setter,
    Other(u8),
}

impl FunctionKind {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => FunctionKind::Method,
            1 => FunctionKind::Getter,
            2 => FunctionKind::Setter,
            other => FunctionKind::Other(other),
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            FunctionKind::Method => 0,
            FunctionKind::Getter => 1,
            FunctionKind::Setter => 2,
            FunctionKind::Other(v) => v,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DebugFunction {
    pub object_name: TString,
    pub state_name: TString,
    pub function_name: TString,
    pub kind: FunctionKind,
    pub line_numbers: Vec<u16>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyGroup {
    pub object_name: TString,
    pub group_name: TString,
    pub doc: TString,
    pub user_flags: u32,
    pub names: Vec<TString>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructOrder {
    pub object_name: TString,
    pub order_name: TString,
    pub names: Vec<TString>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DebugInfo {
    pub modification_time: i64,
    pub functions: Vec<DebugFunction>,
    pub property_groups: Vec<PropertyGroup>,
    pub struct_orders: Vec<StructOrder>,
}

fn write_names(w: &mut Writer, names: &[TString]) -> Result<(), DepexError> {
    w.put_count("debug names", names.len())?;
    for n in names {
        n.write(w);
    }
    Ok(())
}

impl DebugInfo {
    pub(crate) fn read(r: &mut Reader<'_>, strings: &StringTable, game: Game) -> Result<Option<Self>, DepexError> {
        if !r.get_bool()? {
            return Ok(None);
        }
        let modification_time = r.get_i64()?;
        let functions = r.get_list(|r| {
            let object_name = strings.read_tstring(r)?;
            let state_name = strings.read_tstring(r)?;
            let function_name = strings.read_tstring(r)?;
            let kind = FunctionKind::from_u8(r.get_u8()?);
            let line_numbers = r.get_list(|r| r.get_u16())?;
            Ok(DebugFunction { object_name, state_name, function_name, kind, line_numbers })
        })?;

        let mut info = DebugInfo { modification_time, functions, property_groups: Vec::new(), struct_orders: Vec::new() };
        if game.is_extended() {
            info.property_groups = r.get_list(|r| {
                let object_name = strings.read_tstring(r)?;
                let group_name = strings.read_tstring(r)?;
                let doc = strings.read_tstring(r)?;
                let user_flags = r.get_u32()?;
                let names = r.get_list(|r| strings.read_tstring(r))?;
                Ok(PropertyGroup { object_name, group_name, doc, user_flags, names })
            })?;
            info.struct_orders = r.get_list(|r| {
                let object_name = strings.read_tstring(r)?;
                let order_name = strings.read_tstring(r)?;
                let names = r.get_list(|r| strings.read_tstring(r))?;
                Ok(StructOrder { object_name, order_name, names })
            })?;
        }
        Ok(Some(info))
    }

    pub(crate) fn write(info: Option<&Self>, w: &mut Writer, game: Game) -> Result<(), DepexError> {
        let Some(info) = info else {
            w.put_u8(0);
            return Ok(());
        };
        w.put_u8(1);
        w.put_i64(info.modification_time);
        w.put_count("debug functions", info.functions.len())?;
        for f in &info.functions {
            f.object_name.write(w);
            f.state_name.write(w);
            f.function_name.write(w);
            w.put_u8(f.kind.as_u8());
            w.put_count("line numbers", f.line_numbers.len())?;
            for line in &f.line_numbers {
                w.put_u16(*line);
            }
        }
        if game.is_extended() {
            w.put_count("property groups", info.property_groups.len())?;
            for g in &info.property_groups {
                g.object_name.write(w);
                g.group_name.write(w);
                g.doc.write(w);
                w.put_u32(g.user_flags);
                write_names(w, &g.names)?;
            }
            w.put_count("struct orders", info.struct_orders.len())?;
            for o in &info.struct_orders {
                o.object_name.write(w);
                o.order_name.write(w);
                write_names(w, &o.names)?;
            }
        }
        Ok(())
    }

    pub fn calculate_size(info: Option<&Self>, game: Game) -> usize {
        let Some(info) = info else {
            return 1;
        };
        let mut sum = 1 + 8 + 2;
        sum += info
            .functions
            .iter()
            .map(|f| 3 * TString::SIZE + 1 + 2 + 2 * f.line_numbers.len())
            .sum::<usize>();
        if game.is_extended() {
            sum += 2 + info
                .property_groups
                .iter()
                .map(|g| 3 * TString::SIZE + 4 + 2 + TString::SIZE * g.names.len())
                .sum::<usize>();
            sum += 2 + info
                .struct_orders
                .iter()
                .map(|o| 2 * TString::SIZE + 2 + TString::SIZE * o.names.len())
                .sum::<usize>();
        }
        sum
    }

    pub fn find_function(&self, object: TString, state: TString, function: TString) -> Option<&DebugFunction> {
        self.functions
            .iter()
            .find(|f| f.object_name == object && f.state_name == state && f.function_name == function)
    }
}
