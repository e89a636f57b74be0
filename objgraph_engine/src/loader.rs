use crate::content::{self, ContentLoader};
use crate::context::Context;
use crate::fields;
use crate::instance;
use crate::shape::{self, SequenceKind, Shape};
use crate::PersistError;
use anyhow::{anyhow, Result};
use log::{debug, trace};
use objgraph_types::serde::{deser_presence, Count, HomogeneityTag, Primitive, PrimitiveKind};
use objgraph_types::types::{
    DictionaryValue, EnumValue, Fields, SequenceValue, StreamValue, TypeName, TypeRef, Value,
};
use std::io::Read;

pub(crate) struct Loader<'a> {
    pub ctx: Context<'a>,
    content_loader: &'a dyn ContentLoader,
}

impl<'a> Loader<'a> {
    pub fn new(ctx: Context<'a>, content_loader: &'a dyn ContentLoader) -> Self {
        Self {
            ctx,
            content_loader,
        }
    }

    /// Mirrors the saving side: the runtime type name first, if `declared` cannot tell it.
    pub fn load_top_level<R: Read>(&mut self, declared: &TypeRef, r: &mut R) -> Result<Value> {
        self.load_typed(declared, r)
    }

    fn load_field<R: Read>(&mut self, declared: &TypeRef, r: &mut R) -> Result<Value> {
        if self.ctx.registry.is_reference_type(declared) && !deser_presence(r)? {
            return Ok(Value::Null);
        }
        self.load_typed(declared, r)
    }

    fn load_typed<R: Read>(&mut self, declared: &TypeRef, r: &mut R) -> Result<Value> {
        if self.ctx.registry.needs_type_name(declared) {
            let runtime = self.load_type_name_of(declared, r)?;
            return self.load_value(&runtime, r);
        }
        self.load_value(declared, r)
    }

    fn load_value<R: Read>(&mut self, ty: &TypeRef, r: &mut R) -> Result<Value> {
        self.ctx.record(ty);
        let value = match shape::classify(ty, self.ctx.registry)? {
            Shape::Content(name) => self.load_content(&name, r)?,
            Shape::TypeValue => Value::Type(self.load_type_name(r)?),
            Shape::Enum { name, underlying } => Value::Enum(EnumValue {
                ty: name,
                raw: Primitive::deser(underlying, r)?,
            }),
            Shape::Primitive(kind) => Value::Primitive(Primitive::deser(kind, r)?),
            Shape::MemoryStream => Value::Stream(StreamValue::memory(load_raw_bytes(r)?)),
            Shape::ByteBuffer => Value::Bytes(load_raw_bytes(r)?),
            Shape::CharBuffer => {
                let count = *Count::deser(r)?;
                let mut chars = Vec::with_capacity(count.min(u16::MAX as usize));
                for _ in 0..count {
                    match Primitive::deser(PrimitiveKind::Char, r)? {
                        Primitive::Char(c) => chars.push(c),
                        prim => return Err(anyhow!("Expected a char, read {prim:?}")),
                    }
                }
                Value::Chars(chars)
            }
            Shape::Sequence { kind, element } => {
                self.ctx.enter()?;
                let items = self.load_elements(&element, r)?;
                self.ctx.exit();
                let seq = SequenceValue { element, items };
                match kind {
                    SequenceKind::Array => Value::Array(seq),
                    SequenceKind::List => Value::List(seq),
                }
            }
            Shape::Dictionary { key, value } => {
                self.ctx.enter()?;
                let entries = self.load_dictionary(&key, &value, r)?;
                self.ctx.exit();
                Value::Dictionary(DictionaryValue {
                    key,
                    value,
                    entries,
                })
            }
            Shape::Object(ty) => {
                self.ctx.enter()?;
                let fields = self.load_fields(&ty, r)?;
                self.ctx.exit();
                Value::object(ty, fields)
            }
        };
        Ok(value)
    }

    /// A name to look up, unless it marks an instance generated at runtime,
    /// whose fields then follow the name.
    fn load_content<R: Read>(&mut self, ty: &TypeName, r: &mut R) -> Result<Value> {
        let name = load_string(r)?;
        if !self.ctx.config.is_generated_content_name(&name) {
            return content::resolve(self.content_loader, self.ctx.registry, ty, &name);
        }
        debug!("Loading generated content '{name}' inline");
        self.ctx.enter()?;
        let fields = self.load_fields(&TypeRef::Named(ty.clone()), r)?;
        self.ctx.exit();
        Ok(Value::content(ty.clone(), name, fields))
    }

    /// Starts from a zero-valued instance, then assigns the persisted fields.
    fn load_fields<R: Read>(&mut self, ty: &TypeRef, r: &mut R) -> Result<Fields> {
        let registry = self.ctx.registry;
        let mut fields = instance::instantiate(ty, registry)?.fields;
        for slot in fields::resolve_fields(ty, registry)? {
            trace!("Loading field '{}' of '{ty}'", slot.name);
            let value = self.load_field(&slot.ty, r)?;
            for (alias, alias_ty) in slot.aliases.iter() {
                fields.set(alias.clone(), fields::alias_value(&value, alias_ty, registry)?);
            }
            fields.set(slot.name, value);
            self.ctx.record(ty);
        }
        Ok(fields)
    }

    fn load_elements<R: Read>(&mut self, element: &TypeRef, r: &mut R) -> Result<Vec<Value>> {
        let count = *Count::deser(r)?;
        if count == 0 {
            return Ok(vec![]);
        }
        let items = match HomogeneityTag::deser(r)? {
            HomogeneityTag::AllNull => {
                let max = self.ctx.config.max_null_elements;
                if count > max {
                    return Err(anyhow!("{count} null elements exceed the limit of {max}"));
                }
                let mut items = vec![];
                items
                    .try_reserve_exact(count)
                    .map_err(|err| anyhow!("Cannot hold {count} null elements: {err}"))?;
                items.resize(count, Value::Null);
                items
            }
            HomogeneityTag::AllAreTypeValues => (0..count)
                .map(|_| self.load_type_name(r).map(Value::Type))
                .collect::<Result<Vec<_>>>()?,
            HomogeneityTag::AllSameRuntimeType | HomogeneityTag::AllDeclaredType => {
                let shared = self.load_type_name_of(element, r)?;
                (0..count)
                    .map(|_| self.load_value(&shared, r))
                    .collect::<Result<Vec<_>>>()?
            }
            HomogeneityTag::AllDifferentTypes => (0..count)
                .map(|_| self.load_tagged(element, r))
                .collect::<Result<Vec<_>>>()?,
        };
        Ok(items)
    }

    fn load_dictionary<R: Read>(
        &mut self,
        key_ty: &TypeRef,
        value_ty: &TypeRef,
        r: &mut R,
    ) -> Result<Vec<(Value, Value)>> {
        let count = *Count::deser(r)?;
        if count == 0 {
            return Ok(vec![]);
        }
        let tag = HomogeneityTag::deser(r)?;
        let shared_key = self.load_type_name_of(key_ty, r)?;
        let mut entries = Vec::with_capacity(count.min(u16::MAX as usize));
        match tag {
            HomogeneityTag::AllSameRuntimeType | HomogeneityTag::AllDeclaredType => {
                let shared = self.load_type_name_of(value_ty, r)?;
                for _ in 0..count {
                    let key = self.load_value(&shared_key, r)?;
                    let value = self.load_value(&shared, r)?;
                    entries.push((key, value));
                }
            }
            HomogeneityTag::AllDifferentTypes => {
                for _ in 0..count {
                    let runtime = if deser_presence(r)? {
                        Some(self.load_type_name_of(value_ty, r)?)
                    } else {
                        None
                    };
                    let key = self.load_value(&shared_key, r)?;
                    let value = match runtime {
                        Some(runtime) => self.load_value(&runtime, r)?,
                        None => Value::Null,
                    };
                    entries.push((key, value));
                }
            }
            HomogeneityTag::AllNull | HomogeneityTag::AllAreTypeValues => {
                return Err(anyhow!("{tag:?} does not apply to dictionary values"));
            }
        }
        Ok(entries)
    }

    /// An element preceded by a presence byte and, if present, its own type name.
    fn load_tagged<R: Read>(&mut self, element: &TypeRef, r: &mut R) -> Result<Value> {
        if !deser_presence(r)? {
            return Ok(Value::Null);
        }
        let runtime = self.load_type_name_of(element, r)?;
        self.load_value(&runtime, r)
    }

    /// Reads a type name that must denote `declared` or one of its subtypes.
    fn load_type_name_of<R: Read>(&mut self, declared: &TypeRef, r: &mut R) -> Result<TypeRef> {
        let ty = self.load_type_name(r)?;
        let registry = self.ctx.registry;
        if !registry.is_assignable(&ty, declared) {
            return Err(PersistError::ValueMismatch {
                declared: registry.type_name(declared),
                actual: registry.type_name(&ty),
            }
            .into());
        }
        Ok(ty)
    }

    fn load_type_name<R: Read>(&mut self, r: &mut R) -> Result<TypeRef> {
        let name = load_string(r)?;
        self.ctx
            .registry
            .resolve_type_name(&name)
            .ok_or_else(|| PersistError::TypeResolutionFailure(name).into())
    }
}

pub(crate) fn load_string<R: Read>(r: &mut R) -> Result<String> {
    match Primitive::deser(PrimitiveKind::String, r)? {
        Primitive::String(s) => Ok(s),
        prim => Err(anyhow!("Expected a string, read {prim:?}")),
    }
}

fn load_raw_bytes<R: Read>(r: &mut R) -> Result<Vec<u8>> {
    let count = *Count::deser(r)?;
    let mut buf = vec![];
    r.by_ref().take(count as u64).read_to_end(&mut buf)?;
    if buf.len() != count {
        return Err(anyhow!("Expected {count} raw bytes, found {}", buf.len()));
    }
    Ok(buf)
}
