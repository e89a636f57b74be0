use crate::loader::load_string;
use crate::{Loaded, ObjectCodec, PersistError};
use anyhow::{anyhow, Context, Result};
use objgraph_types::serde::{Primitive, WriteLen};
use objgraph_types::types::{TypeRef, Value, Version};
use std::io::{Cursor, Read, Write};

/// Convenience entry points over in-memory buffers and self-describing streams.
impl ObjectCodec {
    pub fn save_to_vec(&self, value: &Value, declared: &TypeRef) -> Result<Vec<u8>> {
        let mut buf = vec![];
        self.save(value, declared, &mut buf)?;
        Ok(buf)
    }

    /// Fails if bytes remain after the value.
    pub fn load_from_slice(&self, declared: &TypeRef, buf: &[u8]) -> Result<Value> {
        let mut r = Cursor::new(buf);
        let loaded = self.load(declared, &mut r, None)?;
        let trailing = buf.len() as u64 - r.position();
        if trailing != 0 {
            return Err(anyhow!("{trailing} trailing bytes after '{declared}'"));
        }
        Ok(loaded.value)
    }

    /// Prefixes the data with its declared type name and the module version,
    /// so that [`Self::load_with_header`] needs neither.
    pub fn save_with_header<W: Write>(
        &self,
        value: &Value,
        declared: &TypeRef,
        w: &mut W,
    ) -> Result<WriteLen> {
        let type_name = self.registry().type_name(declared);
        let mut w_len = Primitive::String(type_name).ser(w)?;
        w_len += Primitive::String(self.config().module_version.to_string()).ser(w)?;
        w_len += self.save(value, declared, w)?;
        Ok(w_len)
    }

    pub fn load_with_header<R: Read>(&self, r: &mut R) -> Result<Loaded> {
        let type_name = load_string(r).context("Failed to read the type name header")?;
        let declared = self
            .registry()
            .resolve_type_name(&type_name)
            .ok_or(PersistError::TypeResolutionFailure(type_name))?;
        let version = load_string(r).context("Failed to read the version header")?;
        let version = version.parse::<Version>()?;
        self.load(&declared, r, Some(&version))
    }
}
