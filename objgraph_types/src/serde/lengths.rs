use anyhow::{anyhow, Result};
use derive_more::{Deref, From};
use std::io::{self, Read, Write};
use std::mem;

const COUNT_MARKER: u8 = u8::MAX;

/// Number of bytes written by one serialization step.
#[derive(Deref, Clone, Copy, PartialEq, Eq, Debug)]
pub struct WriteLen(usize);
impl WriteLen {
    pub fn new_manual(i: usize) -> Self {
        Self(i)
    }
}
impl std::ops::AddAssign for WriteLen {
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// An element count or raw buffer length, encoded "mostly below 255".
///
/// Values below 255 take a single byte. Anything else takes the marker byte `0xFF`
/// followed by the count as a 4 byte signed integer.
#[derive(From, Deref, Clone, Copy, PartialEq, Eq, Debug)]
pub struct Count(usize);
impl Count {
    pub fn ser(&self, w: &mut impl Write) -> Result<WriteLen> {
        if self.0 < COUNT_MARKER as usize {
            w.write_all(&[self.0 as u8])?;
            return Ok(WriteLen(1));
        }
        let int = i32::try_from(self.0)
            .map_err(|_| anyhow!("Count {} does not fit the count encoding", self.0))?;
        w.write_all(&[COUNT_MARKER])?;
        w.write_all(&int.to_le_bytes())?;
        Ok(WriteLen(1 + mem::size_of::<i32>()))
    }

    pub fn deser(r: &mut impl Read) -> Result<Self> {
        let mut buf = [0u8; 1];
        r.read_exact(&mut buf)?;
        if buf[0] != COUNT_MARKER {
            return Ok(Self(buf[0] as usize));
        }
        let mut buf = [0u8; mem::size_of::<i32>()];
        r.read_exact(&mut buf)?;
        let int = i32::from_le_bytes(buf);
        let count = usize::try_from(int).map_err(|_| anyhow!("Negative count {int}"))?;
        Ok(Self(count))
    }
}

/// Byte length of a UTF-8 string body, in groups of 7 bits, low group first.
/// The high bit of each byte signals that another group follows.
#[derive(Deref, Clone, Copy)]
pub struct StringByteLen(u32);
impl StringByteLen {
    pub fn from_body_buf(buf: &[u8]) -> Result<Self> {
        let int = u32::try_from(buf.len())?;
        Ok(Self(int))
    }

    pub fn ser(&self, w: &mut impl Write) -> Result<WriteLen, io::Error> {
        let mut int = self.0;
        let mut w_len = 0;
        while int >= 0x80 {
            w.write_all(&[(int as u8) | 0x80])?;
            int >>= 7;
            w_len += 1;
        }
        w.write_all(&[int as u8])?;
        Ok(WriteLen(w_len + 1))
    }

    pub fn deser(r: &mut impl Read) -> Result<Self> {
        let mut int = 0u32;
        for group_i in 0..5 {
            let mut buf = [0u8; 1];
            r.read_exact(&mut buf)?;
            int |= ((buf[0] & 0x7F) as u32) << (7 * group_i);
            if buf[0] & 0x80 == 0 {
                return Ok(Self(int));
            }
        }
        Err(anyhow!("String length prefix is longer than 5 bytes"))
    }
}
