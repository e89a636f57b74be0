use crate::serde::{Decimal, StringByteLen, WriteLen};
use anyhow::{anyhow, Result};
use std::fmt;
use std::io::{Read, Write};
use std::mem;

#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug)]
pub enum PrimitiveKind {
    Boolean,
    Byte,
    SByte,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Single,
    Double,
    Decimal,
    Char,
    String,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 14] = [
        Self::Boolean,
        Self::Byte,
        Self::SByte,
        Self::Int16,
        Self::UInt16,
        Self::Int32,
        Self::UInt32,
        Self::Int64,
        Self::UInt64,
        Self::Single,
        Self::Double,
        Self::Decimal,
        Self::Char,
        Self::String,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Boolean => "Boolean",
            Self::Byte => "Byte",
            Self::SByte => "SByte",
            Self::Int16 => "Int16",
            Self::UInt16 => "UInt16",
            Self::Int32 => "Int32",
            Self::UInt32 => "UInt32",
            Self::Int64 => "Int64",
            Self::UInt64 => "UInt64",
            Self::Single => "Single",
            Self::Double => "Double",
            Self::Decimal => "Decimal",
            Self::Char => "Char",
            Self::String => "String",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// `None` for the one variable-length kind, [`PrimitiveKind::String`].
    pub fn fixed_len(&self) -> Option<usize> {
        let len = match self {
            Self::Boolean | Self::Byte | Self::SByte => 1,
            Self::Int16 | Self::UInt16 | Self::Char => 2,
            Self::Int32 | Self::UInt32 | Self::Single => 4,
            Self::Int64 | Self::UInt64 | Self::Double => 8,
            Self::Decimal => Decimal::BYTE_LEN,
            Self::String => return None,
        };
        Some(len)
    }

    /// Kinds that may underlie an enum.
    pub fn is_integral(&self) -> bool {
        matches!(
            self,
            Self::Byte
                | Self::SByte
                | Self::Int16
                | Self::UInt16
                | Self::Int32
                | Self::UInt32
                | Self::Int64
                | Self::UInt64
        )
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(PartialEq, Clone, Debug)]
pub enum Primitive {
    Boolean(bool),
    Byte(u8),
    SByte(i8),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Single(f32),
    Double(f64),
    Decimal(Decimal),
    /// A single UTF-16 code unit; characters outside the basic multilingual plane are not representable.
    Char(char),
    String(String),
}

impl Primitive {
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Self::Boolean(_) => PrimitiveKind::Boolean,
            Self::Byte(_) => PrimitiveKind::Byte,
            Self::SByte(_) => PrimitiveKind::SByte,
            Self::Int16(_) => PrimitiveKind::Int16,
            Self::UInt16(_) => PrimitiveKind::UInt16,
            Self::Int32(_) => PrimitiveKind::Int32,
            Self::UInt32(_) => PrimitiveKind::UInt32,
            Self::Int64(_) => PrimitiveKind::Int64,
            Self::UInt64(_) => PrimitiveKind::UInt64,
            Self::Single(_) => PrimitiveKind::Single,
            Self::Double(_) => PrimitiveKind::Double,
            Self::Decimal(_) => PrimitiveKind::Decimal,
            Self::Char(_) => PrimitiveKind::Char,
            Self::String(_) => PrimitiveKind::String,
        }
    }

    /// The zero value of a kind. Strings default to empty rather than absent.
    pub fn zero(kind: PrimitiveKind) -> Self {
        match kind {
            PrimitiveKind::Boolean => Self::Boolean(false),
            PrimitiveKind::Byte => Self::Byte(0),
            PrimitiveKind::SByte => Self::SByte(0),
            PrimitiveKind::Int16 => Self::Int16(0),
            PrimitiveKind::UInt16 => Self::UInt16(0),
            PrimitiveKind::Int32 => Self::Int32(0),
            PrimitiveKind::UInt32 => Self::UInt32(0),
            PrimitiveKind::Int64 => Self::Int64(0),
            PrimitiveKind::UInt64 => Self::UInt64(0),
            PrimitiveKind::Single => Self::Single(0.0),
            PrimitiveKind::Double => Self::Double(0.0),
            PrimitiveKind::Decimal => Self::Decimal(Decimal::default()),
            PrimitiveKind::Char => Self::Char('\0'),
            PrimitiveKind::String => Self::String(String::new()),
        }
    }

    /// Integral value, for mapping enum raw values to variants.
    pub fn as_i128(&self) -> Option<i128> {
        let int = match self {
            Self::Byte(i) => *i as i128,
            Self::SByte(i) => *i as i128,
            Self::Int16(i) => *i as i128,
            Self::UInt16(i) => *i as i128,
            Self::Int32(i) => *i as i128,
            Self::UInt32(i) => *i as i128,
            Self::Int64(i) => *i as i128,
            Self::UInt64(i) => *i as i128,
            _ => return None,
        };
        Some(int)
    }

    pub fn ser(&self, w: &mut impl Write) -> Result<WriteLen> {
        if let Self::String(s) = self {
            let mut w_len = StringByteLen::from_body_buf(s.as_bytes())?.ser(w)?;
            w.write_all(s.as_bytes())?;
            w_len += WriteLen::new_manual(s.len());
            return Ok(w_len);
        }
        let buf = self.fixed_len_bytes()?;
        w.write_all(&buf)?;
        Ok(WriteLen::new_manual(buf.len()))
    }

    pub fn deser(kind: PrimitiveKind, r: &mut impl Read) -> Result<Self> {
        match kind.fixed_len() {
            None => {
                // The prefix is untrusted. Read no more than what is actually there.
                let body_len = *StringByteLen::deser(r)? as usize;
                let mut buf = vec![];
                r.by_ref().take(body_len as u64).read_to_end(&mut buf)?;
                if buf.len() != body_len {
                    return Err(anyhow!(
                        "Expected a string body of {body_len} bytes, found {}",
                        buf.len()
                    ));
                }
                Ok(Self::String(String::from_utf8(buf)?))
            }
            Some(len) => {
                let mut buf = vec![0u8; len];
                r.read_exact(&mut buf)?;
                Self::from_fixed_len_bytes(kind, &buf)
            }
        }
    }

    /// Reads the stored bits of `self` as another fixed-width kind, the way two fields
    /// sharing one storage offset observe each other. Missing high bytes are zero.
    pub fn reinterpret(&self, kind: PrimitiveKind) -> Result<Self> {
        let target_len = kind
            .fixed_len()
            .ok_or_else(|| anyhow!("Cannot reinterpret {} as {kind}", self.kind()))?;
        let mut buf = self.fixed_len_bytes()?;
        buf.resize(target_len, 0);
        Self::from_fixed_len_bytes(kind, &buf)
    }

    fn fixed_len_bytes(&self) -> Result<Vec<u8>> {
        let buf = match self {
            Self::Boolean(b) => vec![*b as u8],
            Self::Byte(i) => i.to_le_bytes().to_vec(),
            Self::SByte(i) => i.to_le_bytes().to_vec(),
            Self::Int16(i) => i.to_le_bytes().to_vec(),
            Self::UInt16(i) => i.to_le_bytes().to_vec(),
            Self::Int32(i) => i.to_le_bytes().to_vec(),
            Self::UInt32(i) => i.to_le_bytes().to_vec(),
            Self::Int64(i) => i.to_le_bytes().to_vec(),
            Self::UInt64(i) => i.to_le_bytes().to_vec(),
            Self::Single(f) => f.to_le_bytes().to_vec(),
            Self::Double(f) => f.to_le_bytes().to_vec(),
            Self::Decimal(d) => d.to_le_bytes().to_vec(),
            Self::Char(c) => {
                let unit = u16::try_from(u32::from(*c))
                    .map_err(|_| anyhow!("Char {c:?} is outside the basic multilingual plane"))?;
                unit.to_le_bytes().to_vec()
            }
            Self::String(_) => return Err(anyhow!("String has no fixed-width encoding")),
        };
        Ok(buf)
    }

    fn from_fixed_len_bytes(kind: PrimitiveKind, buf: &[u8]) -> Result<Self> {
        let prim = match kind {
            PrimitiveKind::Boolean => Self::Boolean(buf[0] != 0),
            PrimitiveKind::Byte => Self::Byte(buf[0]),
            PrimitiveKind::SByte => Self::SByte(i8::from_le_bytes(le_array(buf))),
            PrimitiveKind::Int16 => Self::Int16(i16::from_le_bytes(le_array(buf))),
            PrimitiveKind::UInt16 => Self::UInt16(u16::from_le_bytes(le_array(buf))),
            PrimitiveKind::Int32 => Self::Int32(i32::from_le_bytes(le_array(buf))),
            PrimitiveKind::UInt32 => Self::UInt32(u32::from_le_bytes(le_array(buf))),
            PrimitiveKind::Int64 => Self::Int64(i64::from_le_bytes(le_array(buf))),
            PrimitiveKind::UInt64 => Self::UInt64(u64::from_le_bytes(le_array(buf))),
            PrimitiveKind::Single => Self::Single(f32::from_le_bytes(le_array(buf))),
            PrimitiveKind::Double => Self::Double(f64::from_le_bytes(le_array(buf))),
            PrimitiveKind::Decimal => Self::Decimal(Decimal::from_le_bytes(le_array(buf))?),
            PrimitiveKind::Char => {
                let unit = u16::from_le_bytes(le_array(buf));
                let c = char::from_u32(unit as u32)
                    .ok_or_else(|| anyhow!("Char code unit {unit:#06x} is a lone surrogate"))?;
                Self::Char(c)
            }
            PrimitiveKind::String => return Err(anyhow!("String has no fixed-width encoding")),
        };
        Ok(prim)
    }
}

/// Copies the leading `N` bytes. Callers size `buf` from [`PrimitiveKind::fixed_len`].
fn le_array<const N: usize>(buf: &[u8]) -> [u8; N] {
    let mut arr = [0u8; N];
    arr.copy_from_slice(&buf[..N]);
    arr
}

pub fn ser_presence(w: &mut impl Write, is_present: bool) -> Result<WriteLen> {
    Primitive::Boolean(is_present).ser(w)
}

pub fn deser_presence(r: &mut impl Read) -> Result<bool> {
    let mut buf = [0u8; mem::size_of::<bool>()];
    r.read_exact(&mut buf)?;
    Ok(buf[0] != 0)
}
