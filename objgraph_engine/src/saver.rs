use crate::context::Context;
use crate::fields;
use crate::instance;
use crate::shape::{self, SequenceKind, Shape};
use crate::tagger::{self, ElementTagging};
use crate::PersistError;
use anyhow::Result;
use log::{debug, trace};
use objgraph_types::serde::{ser_presence, Count, Primitive, WriteLen};
use objgraph_types::types::{ContentValue, Fields, StreamKind, TypeRef, Value};
use std::io::Write;

/// XML documents are content, loaded by name. Inline XML trees are never persisted.
const XML_TYPE_PREFIX: &str = "Xml";

pub(crate) struct Saver<'a> {
    pub ctx: Context<'a>,
}

impl<'a> Saver<'a> {
    pub fn new(ctx: Context<'a>) -> Self {
        Self { ctx }
    }

    /// The top level is a slot without a presence byte, so it cannot be null.
    pub fn save_top_level<W: Write>(
        &mut self,
        value: &Value,
        declared: &TypeRef,
        w: &mut W,
    ) -> Result<WriteLen> {
        if value.is_null() {
            return Err(PersistError::UnableToSave {
                ty: self.ctx.registry.type_name(declared),
                reason: String::from("the value is null"),
            }
            .into());
        }
        self.save_typed(value, declared, w)
    }

    fn save_field<W: Write>(
        &mut self,
        value: &Value,
        declared: &TypeRef,
        w: &mut W,
    ) -> Result<WriteLen> {
        let mut w_len = WriteLen::new_manual(0);
        if self.ctx.registry.is_reference_type(declared) {
            w_len += ser_presence(w, !value.is_null())?;
            if value.is_null() {
                return Ok(w_len);
            }
        }
        w_len += self.save_typed(value, declared, w)?;
        Ok(w_len)
    }

    /// The runtime type name, if `declared` cannot tell it, then the value.
    fn save_typed<W: Write>(
        &mut self,
        value: &Value,
        declared: &TypeRef,
        w: &mut W,
    ) -> Result<WriteLen> {
        let runtime = self
            .checked_runtime_type(value, declared)?
            .ok_or_else(|| PersistError::Internal(String::from("Null reached a typed slot")))?;
        let mut w_len = WriteLen::new_manual(0);
        if self.ctx.registry.needs_type_name(declared) {
            w_len += self.save_type_name(&runtime, w)?;
        }
        w_len += self.save_value(value, &runtime, w)?;
        Ok(w_len)
    }

    /// `ty` is the exact runtime type of `value`.
    fn save_value<W: Write>(&mut self, value: &Value, ty: &TypeRef, w: &mut W) -> Result<WriteLen> {
        self.ctx.record(ty);
        if let TypeRef::Named(name) = ty {
            if name.short().starts_with(XML_TYPE_PREFIX) {
                return Err(PersistError::UnableToSave {
                    ty: name.to_string(),
                    reason: String::from("XML data must be saved as named content"),
                }
                .into());
            }
        }

        match (shape::classify(ty, self.ctx.registry)?, value) {
            (Shape::Content(_), Value::Content(content)) => self.save_content(content, w),
            (Shape::TypeValue, Value::Type(ty)) => self.save_type_name(ty, w),
            (Shape::Enum { underlying, .. }, Value::Enum(en)) if en.raw.kind() == underlying => {
                en.raw.ser(w)
            }
            (Shape::Primitive(kind), Value::Primitive(prim)) if prim.kind() == kind => prim.ser(w),
            (Shape::MemoryStream, Value::Stream(stream)) => {
                if stream.kind != StreamKind::Memory {
                    return Err(PersistError::UnsupportedStreamKind(stream.kind).into());
                }
                save_raw_bytes(&stream.bytes, w)
            }
            (Shape::ByteBuffer, Value::Bytes(bytes)) => save_raw_bytes(bytes, w),
            (Shape::CharBuffer, Value::Chars(chars)) => {
                let mut w_len = Count::from(chars.len()).ser(w)?;
                for c in chars.iter() {
                    w_len += Primitive::Char(*c).ser(w)?;
                }
                Ok(w_len)
            }
            (
                Shape::Sequence {
                    kind: SequenceKind::Array,
                    element,
                },
                Value::Array(seq),
            )
            | (
                Shape::Sequence {
                    kind: SequenceKind::List,
                    element,
                },
                Value::List(seq),
            ) => {
                self.ctx.enter()?;
                let w_len = self.save_elements(&seq.items, &element, w)?;
                self.ctx.exit();
                Ok(w_len)
            }
            (Shape::Dictionary { key, value }, Value::Dictionary(dict)) => {
                self.ctx.enter()?;
                let w_len = self.save_dictionary(&dict.entries, &key, &value, w)?;
                self.ctx.exit();
                Ok(w_len)
            }
            (Shape::Object(ty), Value::Object(obj)) => {
                self.ctx.enter()?;
                let w_len = self.save_fields(&ty, &obj.fields, w)?;
                self.ctx.exit();
                Ok(w_len)
            }
            _ => Err(self.mismatch(ty, value.runtime_type().as_ref())),
        }
    }

    /// The name, then the fields if the instance was generated at runtime.
    fn save_content<W: Write>(&mut self, content: &ContentValue, w: &mut W) -> Result<WriteLen> {
        let mut w_len = Primitive::String(content.name.clone()).ser(w)?;
        if self.ctx.config.is_generated_content_name(&content.name) {
            debug!("Saving generated content '{}' inline", content.name);
            let ty = TypeRef::Named(content.ty.clone());
            self.ctx.enter()?;
            w_len += self.save_fields(&ty, &content.fields, w)?;
            self.ctx.exit();
        }
        Ok(w_len)
    }

    /// Fields missing from `fields` are saved as their zero value.
    fn save_fields<W: Write>(&mut self, ty: &TypeRef, fields: &Fields, w: &mut W) -> Result<WriteLen> {
        let mut w_len = WriteLen::new_manual(0);
        for slot in fields::resolve_fields(ty, self.ctx.registry)? {
            trace!("Saving field '{}' of '{ty}'", slot.name);
            let zero;
            let value = match fields.get(&slot.name) {
                Some(value) => value,
                None => {
                    zero = instance::zero_value(&slot.ty, self.ctx.registry)?;
                    &zero
                }
            };
            w_len += self.save_field(value, &slot.ty, w)?;
            self.ctx.record(ty);
        }
        Ok(w_len)
    }

    fn save_elements<W: Write>(
        &mut self,
        items: &[Value],
        element: &TypeRef,
        w: &mut W,
    ) -> Result<WriteLen> {
        let mut w_len = Count::from(items.len()).ser(w)?;
        if items.is_empty() {
            return Ok(w_len);
        }
        let runtimes = items
            .iter()
            .map(|item| self.checked_runtime_type(item, element))
            .collect::<Result<Vec<_>>>()?;
        let tagging = tagger::tag_elements(&runtimes, element, self.ctx.registry);
        w_len += tagging.tag().ser(w)?;
        match tagging {
            ElementTagging::AllNull => {}
            ElementTagging::AllAreTypeValues => {
                for item in items.iter() {
                    w_len += self.save_value(item, &TypeRef::TypeValue, w)?;
                }
            }
            ElementTagging::AllDeclaredType(shared) | ElementTagging::AllSameRuntimeType(shared) => {
                w_len += self.save_type_name(&shared, w)?;
                for item in items.iter() {
                    w_len += self.save_value(item, &shared, w)?;
                }
            }
            ElementTagging::AllDifferentTypes => {
                for (item, runtime) in items.iter().zip(runtimes.iter()) {
                    w_len += ser_presence(w, runtime.is_some())?;
                    if let Some(runtime) = runtime {
                        w_len += self.save_type_name(runtime, w)?;
                        w_len += self.save_value(item, runtime, w)?;
                    }
                }
            }
        }
        Ok(w_len)
    }

    fn save_dictionary<W: Write>(
        &mut self,
        entries: &[(Value, Value)],
        key_ty: &TypeRef,
        value_ty: &TypeRef,
        w: &mut W,
    ) -> Result<WriteLen> {
        let mut w_len = Count::from(entries.len()).ser(w)?;
        if entries.is_empty() {
            return Ok(w_len);
        }
        let key_runtimes = entries
            .iter()
            .map(|(key, _)| self.checked_runtime_type(key, key_ty))
            .collect::<Result<Vec<_>>>()?;
        let shared_key = tagger::shared_key_type(&key_runtimes, self.ctx.registry)?;
        let value_runtimes = entries
            .iter()
            .map(|(_, value)| self.checked_runtime_type(value, value_ty))
            .collect::<Result<Vec<_>>>()?;
        let tagging = tagger::tag_dictionary_values(&value_runtimes, value_ty, self.ctx.registry);

        w_len += tagging.tag().ser(w)?;
        w_len += self.save_type_name(&shared_key, w)?;
        match &tagging {
            ElementTagging::AllDeclaredType(shared) | ElementTagging::AllSameRuntimeType(shared) => {
                w_len += self.save_type_name(shared, w)?;
                for (key, value) in entries.iter() {
                    w_len += self.save_value(key, &shared_key, w)?;
                    w_len += self.save_value(value, shared, w)?;
                }
            }
            ElementTagging::AllDifferentTypes => {
                for ((key, value), runtime) in entries.iter().zip(value_runtimes.iter()) {
                    w_len += ser_presence(w, runtime.is_some())?;
                    if let Some(runtime) = runtime {
                        w_len += self.save_type_name(runtime, w)?;
                    }
                    w_len += self.save_value(key, &shared_key, w)?;
                    if let Some(runtime) = runtime {
                        w_len += self.save_value(value, runtime, w)?;
                    }
                }
            }
            ElementTagging::AllNull | ElementTagging::AllAreTypeValues => {
                let msg = format!("{tagging:?} does not apply to dictionary values");
                return Err(PersistError::Internal(msg).into());
            }
        }
        Ok(w_len)
    }

    /// Refuses names the loading side could not map back.
    fn save_type_name<W: Write>(&self, ty: &TypeRef, w: &mut W) -> Result<WriteLen> {
        let name = self.ctx.registry.type_name(ty);
        if self.ctx.registry.resolve_type_name(&name).as_ref() != Some(ty) {
            return Err(PersistError::TypeResolutionFailure(name).into());
        }
        Primitive::String(name).ser(w)
    }

    /// `None` for an absent value where `declared` allows one.
    fn checked_runtime_type(&self, value: &Value, declared: &TypeRef) -> Result<Option<TypeRef>> {
        let registry = self.ctx.registry;
        match value.runtime_type() {
            None if registry.is_reference_type(declared) => Ok(None),
            Some(runtime) if registry.is_assignable(&runtime, declared) => Ok(Some(runtime)),
            runtime => Err(self.mismatch(declared, runtime.as_ref())),
        }
    }

    fn mismatch(&self, declared: &TypeRef, actual: Option<&TypeRef>) -> anyhow::Error {
        let registry = self.ctx.registry;
        PersistError::ValueMismatch {
            declared: registry.type_name(declared),
            actual: actual.map_or_else(|| String::from("null"), |ty| registry.type_name(ty)),
        }
        .into()
    }
}

fn save_raw_bytes<W: Write>(bytes: &[u8], w: &mut W) -> Result<WriteLen> {
    let mut w_len = Count::from(bytes.len()).ser(w)?;
    w.write_all(bytes)?;
    w_len += WriteLen::new_manual(bytes.len());
    Ok(w_len)
}
