use serde::{Deserialize, Serialize};

use crate::DepexError;
use crate::io::{Reader, Writer, wstring_size};

pub const MAGIC_SKYRIM: u32 = 0xFA57_C0DE;
pub const MAGIC_FALLOUT4: u32 = 0xDEC0_57FA;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Game {
    Skyrim,
    Fallout4,
}

impl Game {
    pub fn from_magic(magic: u32) -> Option<Game> {
        match magic {
            MAGIC_SKYRIM => Some(Game::Skyrim),
            MAGIC_FALLOUT4 => Some(Game::Fallout4),
            _ => None,
        }
    }

    pub fn magic(self) -> u32 {
        match self {
            Game::Skyrim => MAGIC_SKYRIM,
            Game::Fallout4 => MAGIC_FALLOUT4,
        }
    }

    pub(crate) fn dialect(self) -> u8 {
        match self {
            Game::Skyrim => 1,
            Game::Fallout4 => 2,
        }
    }

    pub fn is_extended(self) -> bool {
        self == Game::Fallout4
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    pub game: Game,
    pub version: i32,
    pub compilation_time: i64,
    pub source: String,
    pub user: String,
    pub machine: String,
}

impl Header {
    pub(crate) fn read(r: &mut Reader<'_>) -> Result<Self, DepexError> {
        let magic = r.get_u32()?;
        let game = Game::from_magic(magic).ok_or(DepexError::BadMagic(magic))?;
        let version = r.get_i32()?;
        let compilation_time = r.get_i64()?;
        let source = r.get_wstring()?;
        let user = r.get_wstring()?;
        let machine = r.get_wstring()?;
        Ok(Header { game, version, compilation_time, source, user, machine })
    }

    pub(crate) fn write(&self, w: &mut Writer) -> Result<(), DepexError> {
        w.put_u32(self.game.magic());
        w.put_i32(self.version);
        w.put_i64(self.compilation_time);
        w.put_wstring(&self.source)?;
        w.put_wstring(&self.user)?;
        w.put_wstring(&self.machine)?;
        Ok(())
    }

    pub fn calculate_size(&self) -> usize {
        4 + 4 + 8 + wstring_size(&self.source) + wstring_size(&self.user) + wstring_size(&self.machine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_round_trip() {
        let h = Header {
            game: Game::Fallout4,
            version: 0x0309,
            compilation_time: 1_500_000_000,
            source: "Quest01.psc".into(),
            user: "builder".into(),
            machine: "WORKSTATION".into(),
        };
        let mut w = Writer::new();
        h.write(&mut w).unwrap();
        assert_eq!(w.len(), h.calculate_size());
        let bytes = w.into_inner();
        assert_eq!(&bytes[..4], &[0xfa, 0x57, 0xc0, 0xde]);
        let mut r = Reader::new(&bytes);
        assert_eq!(Header::read(&mut r).unwrap(), h);
    }

    #[test]
    fn bad_magic_stops_after_four_bytes() {
        let bytes = [0u8, 0, 0, 0, 1, 0, 0, 0, 0, 0];
        let mut r = Reader::new(&bytes);
        assert!(matches!(Header::read(&mut r), Err(DepexError::BadMagic(0))));
        assert_eq!(r.pos(), 4);
    }
}
