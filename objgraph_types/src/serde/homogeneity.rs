use crate::serde::WriteLen;
use anyhow::{anyhow, Result};
use derive_more::{Deref, From};
use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::{FromPrimitive, ToPrimitive};
use std::any;
use std::io::{Read, Write};
use std::mem;

#[derive(From, Deref, Clone, Copy)]
pub struct HomogeneityTagInt(u8);
impl From<HomogeneityTag> for HomogeneityTagInt {
    fn from(tag: HomogeneityTag) -> Self {
        // Discriminants are all u8.
        Self(tag.to_u8().unwrap_or_default())
    }
}
impl HomogeneityTagInt {
    pub fn deser(r: &mut impl Read) -> Result<Self> {
        let mut buf = [0u8; mem::size_of::<u8>()];
        r.read_exact(&mut buf)?;
        Ok(Self(u8::from_le_bytes(buf)))
    }
}

/// Precedes the elements of a non-empty sequence, or the entries of a non-empty dictionary,
/// and tells how much per-element type information follows.
///
/// Discriminants are part of the wire format. Do not reorder.
#[repr(u8)]
#[derive(PartialEq, Eq, Hash, Clone, Copy, FromPrimitive, ToPrimitive, Debug)]
pub enum HomogeneityTag {
    /// Every element is null. Nothing follows.
    AllNull = 0,
    /// One type name follows, shared by all elements, which differs from the declared one.
    AllSameRuntimeType = 1,
    /// One type name follows; it is the declared element type.
    AllDeclaredType = 2,
    /// Each element carries a presence byte, then its own type name if present.
    AllDifferentTypes = 3,
    /// Each element is itself a type, written as its type name.
    AllAreTypeValues = 4,
}
impl TryFrom<HomogeneityTagInt> for HomogeneityTag {
    type Error = anyhow::Error;
    fn try_from(int: HomogeneityTagInt) -> Result<Self> {
        HomogeneityTag::from_u8(int.0).ok_or(anyhow!(
            "Unknown {} {}",
            any::type_name::<HomogeneityTag>(),
            int.0
        ))
    }
}
impl HomogeneityTag {
    pub fn ser(&self, w: &mut impl Write) -> Result<WriteLen> {
        let int = HomogeneityTagInt::from(*self);
        w.write_all(&int.to_le_bytes())?;
        Ok(WriteLen::new_manual(mem::size_of::<u8>()))
    }

    pub fn deser(r: &mut impl Read) -> Result<Self> {
        let int = HomogeneityTagInt::deser(r)?;
        Self::try_from(int)
    }
}
