use crate::context::MAX_NESTING_DEPTH;
use crate::fields;
use crate::PersistError;
use anyhow::Result;
use objgraph_types::serde::Primitive;
use objgraph_types::types::{EnumValue, Fields, ObjectValue, TypeRef, TypeRegistry, Value};

/// Creates a zero-valued instance of an object type, as a constructor without arguments would.
///
/// Every persisted field, alias fields included, starts at its [`zero_value`].
pub fn instantiate(ty: &TypeRef, registry: &TypeRegistry) -> Result<ObjectValue> {
    instantiate_at(ty, registry, 0)
}

/// The default of a field: absent for reference types, zero for value types.
pub fn zero_value(ty: &TypeRef, registry: &TypeRegistry) -> Result<Value> {
    zero_value_at(ty, registry, 0)
}

fn instantiate_at(ty: &TypeRef, registry: &TypeRegistry, depth: usize) -> Result<ObjectValue> {
    if let TypeRef::Named(name) = ty {
        let desc = registry.get_or_err(name)?;
        if !desc.instantiable {
            return Err(PersistError::MissingAccessibleConstructor(name.to_string()).into());
        }
    }
    let mut obj_fields = Fields::new();
    for slot in fields::resolve_fields(ty, registry)? {
        for (alias, alias_ty) in slot.aliases.iter() {
            obj_fields.set(alias.clone(), zero_value_at(alias_ty, registry, depth)?);
        }
        obj_fields.set(slot.name, zero_value_at(&slot.ty, registry, depth)?);
    }
    Ok(ObjectValue {
        ty: ty.clone(),
        fields: obj_fields,
    })
}

fn zero_value_at(ty: &TypeRef, registry: &TypeRegistry, depth: usize) -> Result<Value> {
    if registry.is_reference_type(ty) {
        return Ok(Value::Null);
    }
    match ty {
        TypeRef::Primitive(kind) => Ok(Value::Primitive(Primitive::zero(*kind))),
        TypeRef::Named(name) => {
            let desc = registry.get_or_err(name)?;
            if let Some(underlying) = desc.enum_underlying() {
                return Ok(Value::Enum(EnumValue {
                    ty: name.clone(),
                    raw: Primitive::zero(underlying),
                }));
            }
            // Structs embed their struct fields by value.
            if depth >= MAX_NESTING_DEPTH {
                let msg = format!("Struct '{name}' embeds itself");
                return Err(PersistError::Internal(msg).into());
            }
            Ok(Value::Object(instantiate_at(ty, registry, depth + 1)?))
        }
        _ => {
            let msg = format!("'{ty}' has no zero value");
            Err(PersistError::Internal(msg).into())
        }
    }
}
