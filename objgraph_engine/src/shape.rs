use crate::PersistError;
use anyhow::Result;
use objgraph_types::serde::PrimitiveKind;
use objgraph_types::types::{TypeKind, TypeName, TypeRef, TypeRegistry};

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum SequenceKind {
    Array,
    List,
}

/// How values of one type are persisted.
#[derive(PartialEq, Eq, Clone, Debug)]
pub enum Shape {
    /// Persisted by name and resolved through a content loader.
    Content(TypeName),
    /// A type, persisted as its type name.
    TypeValue,
    /// The underlying primitive, reinterpreted as the enum.
    Enum {
        name: TypeName,
        underlying: PrimitiveKind,
    },
    Primitive(PrimitiveKind),
    /// Count, then raw bytes.
    MemoryStream,
    /// Count, then raw bytes.
    ByteBuffer,
    /// Count, then 2 byte code units.
    CharBuffer,
    Sequence {
        kind: SequenceKind,
        element: TypeRef,
    },
    Dictionary {
        key: TypeRef,
        value: TypeRef,
    },
    /// Field by field. Either a registered class or struct, or the bare root object.
    Object(TypeRef),
}

/// First match wins. The result depends on nothing but `ty` and the registry.
pub fn classify(ty: &TypeRef, registry: &TypeRegistry) -> Result<Shape> {
    if registry.is_content_family(ty) {
        if let TypeRef::Named(name) = ty {
            return Ok(Shape::Content(name.clone()));
        }
    }
    let shape = match ty {
        TypeRef::TypeValue => Shape::TypeValue,
        TypeRef::Primitive(kind) => Shape::Primitive(*kind),
        TypeRef::MemoryStream => Shape::MemoryStream,
        TypeRef::ByteBuffer => Shape::ByteBuffer,
        TypeRef::CharBuffer => Shape::CharBuffer,
        TypeRef::Array(element) => Shape::Sequence {
            kind: SequenceKind::Array,
            element: (**element).clone(),
        },
        TypeRef::List(element) => Shape::Sequence {
            kind: SequenceKind::List,
            element: (**element).clone(),
        },
        TypeRef::Dictionary(key, value) => Shape::Dictionary {
            key: (**key).clone(),
            value: (**value).clone(),
        },
        TypeRef::Object => Shape::Object(TypeRef::Object),
        TypeRef::Named(name) => {
            let desc = registry
                .get(name)
                .ok_or_else(|| PersistError::TypeResolutionFailure(name.to_string()))?;
            match desc.kind {
                TypeKind::Enum { underlying, .. } => Shape::Enum {
                    name: name.clone(),
                    underlying,
                },
                TypeKind::Class | TypeKind::Content | TypeKind::Struct { .. } => {
                    Shape::Object(ty.clone())
                }
            }
        }
    };
    Ok(shape)
}
