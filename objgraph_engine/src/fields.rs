use crate::instance;
use crate::PersistError;
use anyhow::Result;
use objgraph_types::types::{EnumValue, StructLayout, TypeRef, TypeRegistry, Value};


/// One persisted field of an object shape.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct FieldSlot {
    pub name: String,
    pub ty: TypeRef,
    pub offset: Option<u32>,
    /// Fields of an explicit-layout struct that share this slot's offset.
    /// They are not persisted; on load they observe the bits of this slot.
    pub aliases: Vec<(String, TypeRef)>,
}

/// The persisted fields of an object type, in wire order.
///
/// 1. Base fields come before derived fields. A derived field named like a base field is dropped.
/// 1. In explicit-layout structs, only the first field at each offset is kept.
/// 1. Fields typed as the resolved type itself, and transient fields, are excluded.
pub fn resolve_fields(ty: &TypeRef, registry: &TypeRegistry) -> Result<Vec<FieldSlot>> {
    let name = match ty {
        TypeRef::Object => return Ok(vec![]),
        TypeRef::Named(name) => name,
        _ => {
            let msg = format!("'{ty}' has no fields to resolve");
            return Err(PersistError::Internal(msg).into());
        }
    };
    let ancestry = registry.ancestry(name)?;
    if let Some(desc) = ancestry
        .iter()
        .find(|desc| !desc.is_class_like() && desc.layout().is_none())
    {
        let msg = format!("'{}' is not an object type", desc.full_name);
        return Err(PersistError::Internal(msg).into());
    }

    let mut merged: Vec<(FieldSlot, bool)> = vec![];
    for desc in ancestry.iter().rev() {
        for field in desc.fields.iter() {
            if merged.iter().all(|(slot, _)| slot.name != field.name) {
                merged.push((
                    FieldSlot {
                        name: field.name.clone(),
                        ty: field.ty.clone(),
                        offset: field.offset,
                        aliases: vec![],
                    },
                    field.transient,
                ));
            }
        }
    }

    let layout = ancestry.first().and_then(|desc| desc.layout());
    if layout == Some(StructLayout::Explicit) {
        let mut deduped: Vec<(FieldSlot, bool)> = vec![];
        for (slot, transient) in merged {
            match deduped.iter_mut().find(|(kept, _)| kept.offset == slot.offset) {
                Some((kept, _)) => kept.aliases.push((slot.name, slot.ty)),
                None => deduped.push((slot, transient)),
            }
        }
        merged = deduped;
    }

    let slots = merged
        .into_iter()
        .filter(|(slot, transient)| !transient && slot.ty != *ty)
        .map(|(slot, _)| slot)
        .collect();
    Ok(slots)
}

/// What an alias field observes after the field sharing its storage was set to `kept`.
///
/// Fixed-width primitives, and enums over them, see the same bits.
/// Any other alias keeps its zero value.
pub fn alias_value(kept: &Value, alias_ty: &TypeRef, registry: &TypeRegistry) -> Result<Value> {
    let raw = match kept {
        Value::Primitive(prim) => Some(prim),
        Value::Enum(en) => Some(&en.raw),
        _ => None,
    };
    let target = match alias_ty {
        TypeRef::Primitive(kind) => Some((*kind, None)),
        TypeRef::Named(name) => registry
            .get(name)
            .and_then(|desc| desc.enum_underlying())
            .map(|underlying| (underlying, Some(name))),
        _ => None,
    };
    match (raw, target) {
        (Some(raw), Some((kind, enum_name)))
            if raw.kind().fixed_len().is_some() && kind.fixed_len().is_some() =>
        {
            let prim = raw.reinterpret(kind)?;
            let value = match enum_name {
                None => Value::Primitive(prim),
                Some(name) => Value::Enum(EnumValue {
                    ty: name.clone(),
                    raw: prim,
                }),
            };
            Ok(value)
        }
        _ => instance::zero_value(alias_ty, registry),
    }
}
