use crate::DepexError;
use crate::debug::DebugInfo;
use crate::header::{Game, Header};
use crate::io::{Reader, Writer};
use crate::script::Pex;
use crate::strings::{StringTable, TString};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserFlag {
    pub name: TString,
    pub bit: u8,
}

#[derive(Debug, Clone)]
pub struct PexFile {
    pub header: Header,
    pub strings: StringTable,
    pub debug: Option<DebugInfo>,
    pub user_flags: Vec<UserFlag>,
    pub objects: Vec<Pex>,
}

impl PexFile {
    pub fn game(&self) -> Game {
        self.header.game
    }

    pub fn read(bytes: &[u8]) -> Result<Self, DepexError> {
        let mut r = Reader::new(bytes);
        let header = Header::read(&mut r)?;
        let game = header.game;
        let strings = StringTable::read(&mut r)?;
        let debug = DebugInfo::read(&mut r, &strings, game)?;
        let user_flags = r.get_list(|r| {
            let name = strings.read_tstring(r)?;
            let bit = r.get_u8()?;
            Ok(UserFlag { name, bit })
        })?;
        let objects = r.get_list(|r| Pex::read(r, &strings, game))?;
        if r.remaining() > 0 {
            return Err(DepexError::TrailingData(r.remaining()));
        }
        log::debug!("parsed {} ({:?}, {} objects)", header.source, game, objects.len());
        Ok(PexFile { header, strings, debug, user_flags, objects })
    }

    pub fn write(&self) -> Result<Vec<u8>, DepexError> {
        let game = self.game();
        let mut w = Writer::new();
        self.header.write(&mut w)?;
        self.strings.write(&mut w)?;
        DebugInfo::write(self.debug.as_ref(), &mut w, game)?;
        w.put_count("user flags", self.user_flags.len())?;
        for f in &self.user_flags {
            f.name.write(&mut w);
            w.put_u8(f.bit);
        }
        w.put_count("objects", self.objects.len())?;
        for o in &self.objects {
            o.write(&mut w, game)?;
        }
        Ok(w.into_inner())
    }

    pub fn calculate_size(&self) -> usize {
        let game = self.game();
        self.header.calculate_size()
            + self.strings.calculate_size()
            + DebugInfo::calculate_size(self.debug.as_ref(), game)
            + 2
            + self.user_flags.len() * (TString::SIZE + 1)
            + 2
            + self.objects.iter().map(|o| o.calculate_size(game)).sum::<usize>()
    }

    pub fn flag_names(&self, flags: u32) -> Vec<&str> {
        self.user_flags
            .iter()
            .filter(|f| f.bit < 32 && flags & (1u32 << f.bit) != 0)
            .map(|f| self.strings.get(f.name))
            .collect()
    }
}
