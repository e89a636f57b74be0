use crate::serde::{Decimal, Primitive};
use crate::types::{TypeName, TypeRef};
use anyhow::{anyhow, Result};
use derive_more::From;

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum StreamKind {
    Memory,
    Buffered,
    File,
}

/// A byte stream captured as a value. Only memory streams can be persisted.
#[derive(PartialEq, Clone, Debug)]
pub struct StreamValue {
    pub kind: StreamKind,
    pub bytes: Vec<u8>,
}
impl StreamValue {
    pub fn memory(bytes: Vec<u8>) -> Self {
        Self {
            kind: StreamKind::Memory,
            bytes,
        }
    }
}

#[derive(PartialEq, Clone, Debug)]
pub struct EnumValue {
    pub ty: TypeName,
    /// Stored as the enum's underlying kind.
    pub raw: Primitive,
}

/// Array or list contents, with the element type the container was created for.
#[derive(PartialEq, Clone, Debug)]
pub struct SequenceValue {
    pub element: TypeRef,
    pub items: Vec<Value>,
}

#[derive(PartialEq, Clone, Debug)]
pub struct DictionaryValue {
    pub key: TypeRef,
    pub value: TypeRef,
    pub entries: Vec<(Value, Value)>,
}

/// Named fields, in no particular order. Lookups are by name.
#[derive(Clone, Default, Debug)]
pub struct Fields(Vec<(String, Value)>);
impl PartialEq for Fields {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(name, value)| other.get(name) == Some(value))
    }
}
impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    pub fn set<S: Into<String>>(&mut self, name: S, value: Value) {
        let name = name.into();
        match self.0.iter_mut().find(|(field, _)| *field == name) {
            Some((_, slot)) => *slot = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn with<S: Into<String>, V: Into<Value>>(mut self, name: S, value: V) -> Self {
        self.set(name, value.into());
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(PartialEq, Clone, Debug)]
pub struct ObjectValue {
    /// A registered class or struct, or [`TypeRef::Object`] for a bare object.
    pub ty: TypeRef,
    pub fields: Fields,
}

/// An instance of a content type. It is persisted by `name` alone,
/// unless the name marks it as generated at runtime.
#[derive(PartialEq, Clone, Debug)]
pub struct ContentValue {
    pub ty: TypeName,
    pub name: String,
    pub fields: Fields,
}

/// A node of a dynamic object graph.
#[derive(PartialEq, Clone, Debug, From)]
pub enum Value {
    #[from(ignore)]
    Null,
    Primitive(Primitive),
    Enum(EnumValue),
    /// `byte[]`
    #[from(ignore)]
    Bytes(Vec<u8>),
    /// `char[]`
    #[from(ignore)]
    Chars(Vec<char>),
    Stream(StreamValue),
    /// A type, used as a value.
    Type(TypeRef),
    #[from(ignore)]
    Array(SequenceValue),
    #[from(ignore)]
    List(SequenceValue),
    Dictionary(DictionaryValue),
    Object(ObjectValue),
    Content(ContentValue),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn array(element: TypeRef, items: Vec<Value>) -> Self {
        Self::Array(SequenceValue { element, items })
    }

    pub fn list(element: TypeRef, items: Vec<Value>) -> Self {
        Self::List(SequenceValue { element, items })
    }

    pub fn dictionary(key: TypeRef, value: TypeRef, entries: Vec<(Value, Value)>) -> Self {
        Self::Dictionary(DictionaryValue {
            key,
            value,
            entries,
        })
    }

    pub fn object(ty: TypeRef, fields: Fields) -> Self {
        Self::Object(ObjectValue { ty, fields })
    }

    pub fn content<N: Into<TypeName>, S: Into<String>>(ty: N, name: S, fields: Fields) -> Self {
        Self::Content(ContentValue {
            ty: ty.into(),
            name: name.into(),
            fields,
        })
    }

    /// `None` for [`Value::Null`], which has no runtime type.
    ///
    /// Every stream reports [`TypeRef::MemoryStream`]; other stream kinds are rejected on save.
    pub fn runtime_type(&self) -> Option<TypeRef> {
        let ty = match self {
            Self::Null => return None,
            Self::Primitive(prim) => TypeRef::Primitive(prim.kind()),
            Self::Enum(en) => TypeRef::Named(en.ty.clone()),
            Self::Bytes(_) => TypeRef::ByteBuffer,
            Self::Chars(_) => TypeRef::CharBuffer,
            Self::Stream(_) => TypeRef::MemoryStream,
            Self::Type(_) => TypeRef::TypeValue,
            Self::Array(seq) => TypeRef::array(seq.element.clone()),
            Self::List(seq) => TypeRef::list(seq.element.clone()),
            Self::Dictionary(dict) => TypeRef::dictionary(dict.key.clone(), dict.value.clone()),
            Self::Object(obj) => obj.ty.clone(),
            Self::Content(content) => TypeRef::Named(content.ty.clone()),
        };
        Some(ty)
    }

    pub fn fields(&self) -> Option<&Fields> {
        match self {
            Self::Object(obj) => Some(&obj.fields),
            Self::Content(content) => Some(&content.fields),
            _ => None,
        }
    }

    /// Shorthand for a field of an object or content value.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields()?.get(name)
    }
}

macro_rules! primitive_conversions {
    ($($variant:ident($t:ty)),* $(,)?) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Self::Primitive(Primitive::$variant(v))
                }
            }

            impl TryFrom<Value> for $t {
                type Error = anyhow::Error;
                fn try_from(value: Value) -> Result<Self> {
                    match value {
                        Value::Primitive(Primitive::$variant(v)) => Ok(v),
                        value => Err(anyhow!(
                            "Expected {}, found {:?}",
                            stringify!($variant),
                            value.runtime_type()
                        )),
                    }
                }
            }
        )*
    };
}

primitive_conversions!(
    Boolean(bool),
    Byte(u8),
    SByte(i8),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Single(f32),
    Double(f64),
    Decimal(Decimal),
    Char(char),
    String(String),
);

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Primitive(Primitive::String(String::from(s)))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Self::Null, Into::into)
    }
}
