use anyhow::{anyhow, Result};
use std::fmt;

const BYTE_LEN: usize = 16;
const MAX_SCALE: u8 = 28;
const MANTISSA_BITS: u32 = 96;
const SCALE_SHIFT: u32 = 16;
const SIGN_MASK: u32 = 0x8000_0000;
const SCALE_MASK: u32 = 0x00FF_0000;

/// A 128 bit decimal floating point number: a 96 bit unsigned mantissa, a sign, and a
/// base-10 scale of at most 28.
///
/// The in-memory layout is the wire layout: four little-endian 32 bit words
/// `lo, mid, hi, flags`, where `flags` holds the scale in bits 16..24 and the sign in bit 31.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Default, Debug)]
pub struct Decimal {
    lo: u32,
    mid: u32,
    hi: u32,
    flags: u32,
}

impl Decimal {
    pub const BYTE_LEN: usize = BYTE_LEN;

    pub fn new(mantissa: i128, scale: u8) -> Result<Self> {
        if scale > MAX_SCALE {
            return Err(anyhow!("Decimal scale {scale} exceeds {MAX_SCALE}"));
        }
        let magnitude = mantissa.unsigned_abs();
        if magnitude >> MANTISSA_BITS != 0 {
            return Err(anyhow!("Decimal mantissa {mantissa} exceeds 96 bits"));
        }
        let mut flags = (scale as u32) << SCALE_SHIFT;
        if mantissa < 0 {
            flags |= SIGN_MASK;
        }
        Ok(Self {
            lo: magnitude as u32,
            mid: (magnitude >> 32) as u32,
            hi: (magnitude >> 64) as u32,
            flags,
        })
    }

    pub fn mantissa(&self) -> i128 {
        let magnitude =
            (self.lo as i128) | ((self.mid as i128) << 32) | ((self.hi as i128) << 64);
        if self.is_negative() {
            -magnitude
        } else {
            magnitude
        }
    }

    pub fn scale(&self) -> u8 {
        ((self.flags & SCALE_MASK) >> SCALE_SHIFT) as u8
    }

    pub fn is_negative(&self) -> bool {
        self.flags & SIGN_MASK != 0
    }

    pub fn to_le_bytes(&self) -> [u8; BYTE_LEN] {
        let mut buf = [0u8; BYTE_LEN];
        for (i, word) in [self.lo, self.mid, self.hi, self.flags].iter().enumerate() {
            buf[i * 4..(i + 1) * 4].copy_from_slice(&word.to_le_bytes());
        }
        buf
    }

    pub fn from_le_bytes(buf: [u8; BYTE_LEN]) -> Result<Self> {
        let word = |i: usize| {
            let mut w = [0u8; 4];
            w.copy_from_slice(&buf[i * 4..(i + 1) * 4]);
            u32::from_le_bytes(w)
        };
        let dec = Self {
            lo: word(0),
            mid: word(1),
            hi: word(2),
            flags: word(3),
        };
        if dec.flags & !(SIGN_MASK | SCALE_MASK) != 0 || dec.scale() > MAX_SCALE {
            return Err(anyhow!("Invalid decimal flags {:#010x}", dec.flags));
        }
        Ok(dec)
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.mantissa().unsigned_abs().to_string();
        let scale = self.scale() as usize;
        let sign = if self.is_negative() { "-" } else { "" };
        if scale == 0 {
            return write!(f, "{sign}{digits}");
        }
        let digits = format!("{digits:0>width$}", width = scale + 1);
        let (int_part, frac_part) = digits.split_at(digits.len() - scale);
        write!(f, "{sign}{int_part}.{frac_part}")
    }
}
