use crate::serde::PrimitiveKind;
use crate::types::{StructLayout, TypeDescriptor, TypeKind, TypeName, TypeRef};
use anyhow::{anyhow, Result};
use itertools::Itertools;
use std::collections::HashMap;


/// All user-defined types known to the codec.
///
/// Immutable once handed to a codec, so one registry can serve concurrent calls.
#[derive(Default, Debug)]
pub struct TypeRegistry {
    by_full_name: HashMap<TypeName, TypeDescriptor>,
    full_names_by_short_name: HashMap<String, Vec<TypeName>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`Self::register`].
    pub fn with(mut self, desc: TypeDescriptor) -> Result<Self> {
        self.register(desc)?;
        Ok(self)
    }

    /// A base type must be registered before any type that extends it.
    pub fn register(&mut self, desc: TypeDescriptor) -> Result<()> {
        let name = &desc.full_name;
        if name.is_empty() || self.by_full_name.contains_key(name) {
            return Err(anyhow!("Type name '{name}' is empty or already registered"));
        }
        if let Some(base) = desc.base.as_ref() {
            if !desc.is_class_like() {
                return Err(anyhow!("Only classes may extend a base, but '{name}' extends '{base}'"));
            }
            match self.by_full_name.get(base) {
                Some(base_desc) if !base_desc.is_class_like() => {
                    return Err(anyhow!("Base '{base}' of '{name}' is not a class"))
                }
                Some(base_desc) if base_desc.sealed => {
                    return Err(anyhow!("Base '{base}' of '{name}' is sealed"))
                }
                Some(_) => {}
                None => return Err(anyhow!("Base '{base}' of '{name}' is not registered")),
            }
        }
        if let Some(dup) = desc.fields.iter().map(|field| &field.name).duplicates().next() {
            return Err(anyhow!("Field '{dup}' is declared twice in '{name}'"));
        }
        match &desc.kind {
            TypeKind::Enum {
                underlying,
                variants,
            } => {
                if !underlying.is_integral() {
                    return Err(anyhow!("Enum '{name}' has non-integral underlying kind {underlying}"));
                }
                if !desc.fields.is_empty() {
                    return Err(anyhow!("Enum '{name}' cannot declare fields"));
                }
                if let Some((variant, _)) = variants
                    .iter()
                    .find(|(_, value)| !fits_integral(*underlying, *value))
                {
                    return Err(anyhow!("Variant '{variant}' of '{name}' overflows {underlying}"));
                }
            }
            TypeKind::Struct {
                layout: StructLayout::Explicit,
            } => {
                if let Some(field) = desc.fields.iter().find(|field| field.offset.is_none()) {
                    return Err(anyhow!(
                        "Field '{}' of explicit-layout '{name}' has no offset",
                        field.name
                    ));
                }
            }
            _ => {}
        }

        self.full_names_by_short_name
            .entry(String::from(desc.short_name()))
            .or_default()
            .push(desc.full_name.clone());
        self.by_full_name.insert(desc.full_name.clone(), desc);
        Ok(())
    }

    pub fn get(&self, name: &TypeName) -> Option<&TypeDescriptor> {
        self.by_full_name.get(name)
    }

    pub fn get_or_err(&self, name: &TypeName) -> Result<&TypeDescriptor> {
        self.get(name)
            .ok_or_else(|| anyhow!("Type '{name}' is not registered"))
    }

    /// Maps a short name, if it is unambiguous, or else a full name, to a registered name.
    pub fn resolve_named(&self, s: &str) -> Option<TypeName> {
        if let Some([full_name]) = self.full_names_by_short_name.get(s).map(Vec::as_slice) {
            return Some(full_name.clone());
        }
        let name = TypeName::from(s);
        self.by_full_name.contains_key(&name).then_some(name)
    }

    /// Parses a type name as written on the wire.
    pub fn resolve_type_name(&self, s: &str) -> Option<TypeRef> {
        TypeRef::parse_with(s, &|named: &str| self.resolve_named(named))
    }

    /// Formats a type name for the wire: registered names are short unless ambiguous,
    /// either among registered types or with a built-in name such as `Type` or `Int32`.
    pub fn type_name(&self, ty: &TypeRef) -> String {
        ty.format_with(&|name: &TypeName| {
            let short = name.short();
            let is_builtin = TypeRef::parse_with(short, &|_: &str| None).is_some();
            match self.full_names_by_short_name.get(short).map(Vec::len) {
                Some(1) if !is_builtin => String::from(short),
                _ => String::from(name.full()),
            }
        })
    }

    /// The type followed by its bases, derived first.
    pub fn ancestry<'a>(&'a self, name: &TypeName) -> Result<Vec<&'a TypeDescriptor>> {
        let mut chain = vec![];
        let mut next = Some(name);
        while let Some(name) = next {
            let desc = self.get_or_err(name)?;
            chain.push(desc);
            next = desc.base.as_ref();
        }
        Ok(chain)
    }

    /// Whether the type, or one of its bases, is a content type.
    pub fn is_content_family(&self, ty: &TypeRef) -> bool {
        match ty {
            TypeRef::Named(name) => self.ancestry(name).map_or(false, |chain| {
                chain
                    .iter()
                    .any(|desc| matches!(desc.kind, TypeKind::Content))
            }),
            _ => false,
        }
    }

    /// Values of reference types may be absent, so they are preceded by a presence byte.
    pub fn is_reference_type(&self, ty: &TypeRef) -> bool {
        match ty {
            TypeRef::Primitive(kind) => *kind == PrimitiveKind::String,
            TypeRef::Named(name) => self.get(name).map_or(true, TypeDescriptor::is_class_like),
            _ => true,
        }
    }

    /// Whether a value declared as `ty` may have a different runtime type,
    /// so its own type name has to precede it.
    pub fn needs_type_name(&self, ty: &TypeRef) -> bool {
        match ty {
            TypeRef::Object => true,
            TypeRef::Named(name) => self
                .get(name)
                .map_or(false, |desc| desc.is_class_like() && (!desc.sealed || desc.is_abstract)),
            _ => false,
        }
    }

    /// Whether a value of runtime type `runtime` may stand where `declared` is expected.
    pub fn is_assignable(&self, runtime: &TypeRef, declared: &TypeRef) -> bool {
        if runtime == declared || *declared == TypeRef::Object {
            return true;
        }
        match (runtime, declared) {
            (TypeRef::Named(runtime), TypeRef::Named(declared)) => self
                .ancestry(runtime)
                .map_or(false, |chain| {
                    chain.iter().any(|desc| &desc.full_name == declared)
                }),
            _ => false,
        }
    }
}

fn fits_integral(kind: PrimitiveKind, value: i128) -> bool {
    let (min, max) = match kind {
        PrimitiveKind::Byte => (u8::MIN as i128, u8::MAX as i128),
        PrimitiveKind::SByte => (i8::MIN as i128, i8::MAX as i128),
        PrimitiveKind::Int16 => (i16::MIN as i128, i16::MAX as i128),
        PrimitiveKind::UInt16 => (u16::MIN as i128, u16::MAX as i128),
        PrimitiveKind::Int32 => (i32::MIN as i128, i32::MAX as i128),
        PrimitiveKind::UInt32 => (u32::MIN as i128, u32::MAX as i128),
        PrimitiveKind::Int64 => (i64::MIN as i128, i64::MAX as i128),
        PrimitiveKind::UInt64 => (u64::MIN as i128, u64::MAX as i128),
        _ => return false,
    };
    (min..=max).contains(&value)
}
