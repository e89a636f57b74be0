use crate::serde::PrimitiveKind;
use derive_more::{Deref, Display, From};
use std::fmt;


const OBJECT_NAME: &str = "Object";
const TYPE_VALUE_NAME: &str = "Type";
const MEMORY_STREAM_NAME: &str = "MemoryStream";
const ARRAY_SUFFIX: &str = "[]";
const LIST_PREFIX: &str = "List<";
const DICTIONARY_PREFIX: &str = "Dictionary<";

/// Full, dot separated name of a registered type, eg `Game.Datatypes.Point`.
#[derive(From, Deref, Display, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Debug)]
pub struct TypeName(String);
impl From<&str> for TypeName {
    fn from(s: &str) -> Self {
        Self(String::from(s))
    }
}
impl TypeName {
    pub fn full(&self) -> &str {
        &self.0
    }

    /// The last dot separated segment.
    pub fn short(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }
}

/// A type, as requested by a reader or declared by a field, element or dictionary slot.
///
/// Built-in shapes are variants. Everything user-defined is [`TypeRef::Named`] and is
/// looked up in a [`crate::types::TypeRegistry`].
#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub enum TypeRef {
    /// The universal root. Values declared as `Object` always carry their runtime type name.
    Object,
    Primitive(PrimitiveKind),
    /// `byte[]`
    ByteBuffer,
    /// `char[]`
    CharBuffer,
    MemoryStream,
    /// The type of types.
    TypeValue,
    Array(Box<TypeRef>),
    List(Box<TypeRef>),
    Dictionary(Box<TypeRef>, Box<TypeRef>),
    Named(TypeName),
}

impl TypeRef {
    pub fn named<N: Into<TypeName>>(name: N) -> Self {
        Self::Named(name.into())
    }

    /// Arrays of bytes and of chars are raw buffers.
    pub fn array(elem: TypeRef) -> Self {
        match elem {
            Self::Primitive(PrimitiveKind::Byte) => Self::ByteBuffer,
            Self::Primitive(PrimitiveKind::Char) => Self::CharBuffer,
            elem => Self::Array(Box::new(elem)),
        }
    }

    pub fn list(elem: TypeRef) -> Self {
        Self::List(Box::new(elem))
    }

    pub fn dictionary(key: TypeRef, value: TypeRef) -> Self {
        Self::Dictionary(Box::new(key), Box::new(value))
    }

    pub fn string() -> Self {
        Self::Primitive(PrimitiveKind::String)
    }

    /// Formats in the wire grammar, letting the caller choose how named types are spelled.
    pub fn format_with<F>(&self, named: &F) -> String
    where
        F: Fn(&TypeName) -> String,
    {
        match self {
            Self::Object => String::from(OBJECT_NAME),
            Self::Primitive(kind) => String::from(kind.name()),
            Self::ByteBuffer => format!("{}{ARRAY_SUFFIX}", PrimitiveKind::Byte.name()),
            Self::CharBuffer => format!("{}{ARRAY_SUFFIX}", PrimitiveKind::Char.name()),
            Self::MemoryStream => String::from(MEMORY_STREAM_NAME),
            Self::TypeValue => String::from(TYPE_VALUE_NAME),
            Self::Array(elem) => format!("{}{ARRAY_SUFFIX}", elem.format_with(named)),
            Self::List(elem) => format!("{LIST_PREFIX}{}>", elem.format_with(named)),
            Self::Dictionary(key, value) => format!(
                "{DICTIONARY_PREFIX}{},{}>",
                key.format_with(named),
                value.format_with(named)
            ),
            Self::Named(name) => named(name),
        }
    }

    /// Parses the wire grammar. `resolve_named` maps any non built-in name to a registered one.
    pub fn parse_with<F>(s: &str, resolve_named: &F) -> Option<Self>
    where
        F: Fn(&str) -> Option<TypeName>,
    {
        let s = s.trim();
        if let Some(elem) = s.strip_suffix(ARRAY_SUFFIX) {
            let elem = Self::parse_with(elem, resolve_named)?;
            return Some(Self::array(elem));
        }
        if let Some(args) = strip_generic(s, LIST_PREFIX) {
            let elem = Self::parse_with(args, resolve_named)?;
            return Some(Self::list(elem));
        }
        if let Some(args) = strip_generic(s, DICTIONARY_PREFIX) {
            let (key, value) = split_top_level_comma(args)?;
            let key = Self::parse_with(key, resolve_named)?;
            let value = Self::parse_with(value, resolve_named)?;
            return Some(Self::dictionary(key, value));
        }
        let ty = match s {
            OBJECT_NAME => Self::Object,
            TYPE_VALUE_NAME => Self::TypeValue,
            MEMORY_STREAM_NAME => Self::MemoryStream,
            _ => match PrimitiveKind::from_name(s) {
                Some(kind) => Self::Primitive(kind),
                None => Self::Named(resolve_named(s)?),
            },
        };
        Some(ty)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_with(&|name: &TypeName| String::from(name.full())))
    }
}

fn strip_generic<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    s.strip_prefix(prefix)?.strip_suffix('>')
}

fn split_top_level_comma(args: &str) -> Option<(&str, &str)> {
    let mut depth = 0usize;
    for (i, c) in args.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.checked_sub(1)?,
            ',' if depth == 0 => return Some((&args[..i], &args[i + 1..])),
            _ => {}
        }
    }
    None
}
