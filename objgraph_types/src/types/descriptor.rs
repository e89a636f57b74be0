use crate::serde::PrimitiveKind;
use crate::types::{TypeName, TypeRef};

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum StructLayout {
    Sequential,
    /// Every field has an explicit storage offset; fields may alias each other.
    Explicit,
}

#[derive(PartialEq, Eq, Clone, Debug)]
pub enum TypeKind {
    Class,
    /// A class whose instances are loaded by name from an external content system.
    /// Classes deriving from it belong to the same content family.
    Content,
    Struct {
        layout: StructLayout,
    },
    Enum {
        underlying: PrimitiveKind,
        variants: Vec<(String, i128)>,
    },
}

#[derive(PartialEq, Eq, Clone, Debug)]
pub struct FieldDesc {
    pub name: String,
    pub ty: TypeRef,
    /// Storage offset. Only meaningful in [`StructLayout::Explicit`] structs.
    pub offset: Option<u32>,
    /// Computed or cached state that is never persisted.
    pub transient: bool,
}

/// Static description of a user-defined type: what reflection would tell about it.
///
/// Built with the chained constructors below and handed to
/// [`crate::types::TypeRegistry::register`], which validates it.
///
/// ```text
/// TypeDescriptor::class("Game.Sprite")
///     .extends("Game.Entity")
///     .field("image", TypeRef::named("Game.Image"))
///     .transient_field("cached_bounds", TypeRef::named("Game.Rectangle"))
/// ```
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct TypeDescriptor {
    pub full_name: TypeName,
    pub kind: TypeKind,
    /// Only classes may have a base.
    pub base: Option<TypeName>,
    pub is_abstract: bool,
    /// Sealed classes need no inline type name, because no subtype can stand in for them.
    pub sealed: bool,
    /// Own fields in declaration order; base fields are not repeated here.
    pub fields: Vec<FieldDesc>,
    /// Whether a zero-valued instance can be created without constructor arguments.
    pub instantiable: bool,
}

impl TypeDescriptor {
    fn new<N: Into<TypeName>>(full_name: N, kind: TypeKind) -> Self {
        Self {
            full_name: full_name.into(),
            kind,
            base: None,
            is_abstract: false,
            sealed: true,
            fields: vec![],
            instantiable: true,
        }
    }

    pub fn class<N: Into<TypeName>>(full_name: N) -> Self {
        Self::new(full_name, TypeKind::Class)
    }

    /// Content roots are open: concrete content classes derive from them.
    pub fn content<N: Into<TypeName>>(full_name: N) -> Self {
        Self::new(full_name, TypeKind::Content).open()
    }

    pub fn structure<N: Into<TypeName>>(full_name: N) -> Self {
        let layout = StructLayout::Sequential;
        Self::new(full_name, TypeKind::Struct { layout })
    }

    pub fn explicit_struct<N: Into<TypeName>>(full_name: N) -> Self {
        let layout = StructLayout::Explicit;
        Self::new(full_name, TypeKind::Struct { layout })
    }

    pub fn enumeration<N: Into<TypeName>>(full_name: N, underlying: PrimitiveKind) -> Self {
        let variants = vec![];
        Self::new(full_name, TypeKind::Enum { underlying, variants })
    }

    pub fn extends<N: Into<TypeName>>(mut self, base: N) -> Self {
        self.base = Some(base.into());
        self
    }

    /// Allows subtypes, so values declared as this type carry their runtime type name.
    pub fn open(mut self) -> Self {
        self.sealed = false;
        self
    }

    pub fn make_abstract(mut self) -> Self {
        self.is_abstract = true;
        self.sealed = false;
        self.instantiable = false;
        self
    }

    pub fn without_default_constructor(mut self) -> Self {
        self.instantiable = false;
        self
    }

    pub fn field<S: Into<String>>(mut self, name: S, ty: TypeRef) -> Self {
        self.fields.push(FieldDesc {
            name: name.into(),
            ty,
            offset: None,
            transient: false,
        });
        self
    }

    pub fn field_at<S: Into<String>>(mut self, offset: u32, name: S, ty: TypeRef) -> Self {
        self.fields.push(FieldDesc {
            name: name.into(),
            ty,
            offset: Some(offset),
            transient: false,
        });
        self
    }

    pub fn transient_field<S: Into<String>>(mut self, name: S, ty: TypeRef) -> Self {
        self.fields.push(FieldDesc {
            name: name.into(),
            ty,
            offset: None,
            transient: true,
        });
        self
    }

    pub fn variant<S: Into<String>>(mut self, name: S, value: i128) -> Self {
        if let TypeKind::Enum { variants, .. } = &mut self.kind {
            variants.push((name.into(), value));
        }
        self
    }

    pub fn short_name(&self) -> &str {
        self.full_name.short()
    }

    pub fn is_class_like(&self) -> bool {
        matches!(self.kind, TypeKind::Class | TypeKind::Content)
    }

    pub fn layout(&self) -> Option<StructLayout> {
        match self.kind {
            TypeKind::Struct { layout } => Some(layout),
            _ => None,
        }
    }

    pub fn enum_underlying(&self) -> Option<PrimitiveKind> {
        match self.kind {
            TypeKind::Enum { underlying, .. } => Some(underlying),
            _ => None,
        }
    }

    pub fn enum_variant_name(&self, raw: i128) -> Option<&str> {
        match &self.kind {
            TypeKind::Enum { variants, .. } => variants
                .iter()
                .find(|(_, value)| *value == raw)
                .map(|(name, _)| name.as_str()),
            _ => None,
        }
    }

    pub fn enum_variant_value(&self, name: &str) -> Option<i128> {
        match &self.kind {
            TypeKind::Enum { variants, .. } => variants
                .iter()
                .find(|(variant, _)| variant == name)
                .map(|(_, value)| *value),
            _ => None,
        }
    }
}
