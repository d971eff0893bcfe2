use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::DepexError;
use crate::io::{Reader, Writer, wstring_size};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TString(u16);

impl TString {
    pub fn index(self) -> u16 {
        self.0
    }

    pub(crate) fn write(self, w: &mut Writer) {
        w.put_u16(self.0);
    }

    pub(crate) const SIZE: usize = 2;
}

#[derive(Debug, Clone, Default)]
pub struct StringTable {
    entries: Vec<String>,
    lookup: HashMap<String, u16>,
}

impl StringTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn add_string(&mut self, text: &str) -> Result<TString, DepexError> {
        if let Some(t) = self.find(text) {
            return Ok(t);
        }
        let count = self.entries.len();
        let idx = u16::try_from(count).map_err(|_| DepexError::TooManyEntries { what: "string table", count: count + 1 })?;
        self.entries.push(text.to_string());
        self.lookup.insert(text.to_lowercase(), idx);
        Ok(TString(idx))
    }

    pub fn find(&self, text: &str) -> Option<TString> {
        self.lookup.get(&text.to_lowercase()).copied().map(TString)
    }

    pub fn resolve(&self, t: TString) -> Option<&str> {
        self.entries.get(t.0 as usize).map(String::as_str)
    }

    pub fn get(&self, t: TString) -> &str {
        self.resolve(t).unwrap_or("")
    }

    pub(crate) fn read(r: &mut Reader<'_>) -> Result<Self, DepexError> {
        let count = r.get_u16()? as usize;
        let mut table = StringTable {
            entries: Vec::with_capacity(count),
            lookup: HashMap::with_capacity(count),
        };
        for idx in 0..count {
            let s = r.get_wstring()?;
            // Files may carry case-variant duplicates; the first one wins lookups.
            table.lookup.entry(s.to_lowercase()).or_insert(idx as u16);
            table.entries.push(s);
        }
        log::debug!("read string table with {} entries", count);
        Ok(table)
    }

    pub(crate) fn read_tstring(&self, r: &mut Reader<'_>) -> Result<TString, DepexError> {
        let index = r.get_u16()?;
        if (index as usize) >= self.entries.len() {
            return Err(DepexError::InvalidStringIndex { index, len: self.entries.len() });
        }
        Ok(TString(index))
    }

    pub(crate) fn write(&self, w: &mut Writer) -> Result<(), DepexError> {
        w.put_count("string table", self.entries.len())?;
        for s in &self.entries {
            w.put_wstring(s)?;
        }
        Ok(())
    }

    pub fn calculate_size(&self) -> usize {
        2 + self.entries.iter().map(|s| wstring_size(s)).sum::<usize>()
    }
}
