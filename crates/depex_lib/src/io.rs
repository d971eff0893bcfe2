use byteorder::{ByteOrder, LittleEndian};

use crate::DepexError;

pub(crate) struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub(crate) fn pos(&self) -> usize {
        self.pos
    }

    pub(crate) fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], DepexError> {
        if self.remaining() < n {
            return Err(DepexError::Eof(self.pos));
        }
        let s = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(s)
    }

    pub(crate) fn get_u8(&mut self) -> Result<u8, DepexError> {
        Ok(self.take(1)?[0])
    }

    pub(crate) fn get_bool(&mut self) -> Result<bool, DepexError> {
        let at = self.pos;
        match self.get_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            value => Err(DepexError::InvalidBool { offset: at, value }),
        }
    }

    pub(crate) fn get_u16(&mut self) -> Result<u16, DepexError> {
        Ok(LittleEndian::read_u16(self.take(2)?))
    }

    pub(crate) fn get_u32(&mut self) -> Result<u32, DepexError> {
        Ok(LittleEndian::read_u32(self.take(4)?))
    }

    pub(crate) fn get_i32(&mut self) -> Result<i32, DepexError> {
        Ok(LittleEndian::read_i32(self.take(4)?))
    }

    pub(crate) fn get_i64(&mut self) -> Result<i64, DepexError> {
        Ok(LittleEndian::read_i64(self.take(8)?))
    }

    pub(crate) fn get_f32(&mut self) -> Result<f32, DepexError> {
        Ok(LittleEndian::read_f32(self.take(4)?))
    }

    pub(crate) fn get_list<T>(
        &mut self,
        mut f: impl FnMut(&mut Reader<'a>) -> Result<T, DepexError>,
    ) -> Result<Vec<T>, DepexError> {
        let count = self.get_u16()? as usize;
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            out.push(f(self)?);
        }
        Ok(out)
    }

    pub(crate) fn get_wstring(&mut self) -> Result<String, DepexError> {
        let len = self.get_u16()? as usize;
        let at = self.pos;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| DepexError::InvalidUtf8(at))
    }
}

#[derive(Debug, Default)]
pub(crate) struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn len(&self) -> usize {
        self.buf.len()
    }

    pub(crate) fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    pub(crate) fn put_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub(crate) fn put_u16(&mut self, v: u16) {
        let mut b = [0u8; 2];
        LittleEndian::write_u16(&mut b, v);
        self.buf.extend_from_slice(&b);
    }

    pub(crate) fn put_u32(&mut self, v: u32) {
        let mut b = [0u8; 4];
        LittleEndian::write_u32(&mut b, v);
        self.buf.extend_from_slice(&b);
    }

    pub(crate) fn put_i32(&mut self, v: i32) {
        let mut b = [0u8; 4];
        LittleEndian::write_i32(&mut b, v);
        self.buf.extend_from_slice(&b);
    }

    pub(crate) fn put_i64(&mut self, v: i64) {
        let mut b = [0u8; 8];
        LittleEndian::write_i64(&mut b, v);
        self.buf.extend_from_slice(&b);
    }

    pub(crate) fn put_f32(&mut self, v: f32) {
        let mut b = [0u8; 4];
        LittleEndian::write_f32(&mut b, v);
        self.buf.extend_from_slice(&b);
    }

    pub(crate) fn put_wstring(&mut self, s: &str) -> Result<(), DepexError> {
        let len = u16::try_from(s.len()).map_err(|_| DepexError::StringTooLong(s.len()))?;
        self.put_u16(len);
        self.buf.extend_from_slice(s.as_bytes());
        Ok(())
    }

    pub(crate) fn put_count(&mut self, what: &'static str, count: usize) -> Result<(), DepexError> {
        let n = u16::try_from(count).map_err(|_| DepexError::TooManyEntries { what, count })?;
        self.put_u16(n);
        Ok(())
    }
}

pub(crate) fn wstring_size(s: &str) -> usize {
    2 + s.len()
}
