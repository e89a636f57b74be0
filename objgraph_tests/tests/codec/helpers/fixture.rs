use anyhow::Result;
use objgraph_engine::config::CodecConfig;
use objgraph_engine::{InMemoryContentLoader, ObjectCodec};
use objgraph_types::serde::PrimitiveKind;
use objgraph_types::types::{
    ContentValue, Fields, TypeDescriptor, TypeRef, TypeRegistry, Version,
};
use std::sync::Arc;

/// `Nest.W1` holds `Nest.W2`, and so on down to `Nest.W{NEST_LEVELS}`, which holds an `Int32`.
pub const NEST_LEVELS: usize = 7;

pub fn module_version() -> Version {
    Version::new(1, 2, 0, 0)
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn int32() -> TypeRef {
    TypeRef::Primitive(PrimitiveKind::Int32)
}

pub fn single() -> TypeRef {
    TypeRef::Primitive(PrimitiveKind::Single)
}

pub fn registry() -> Result<TypeRegistry> {
    let mut registry = TypeRegistry::new()
        .with(TypeDescriptor::content("Engine.Content"))?
        .with(
            TypeDescriptor::class("Engine.Image")
                .extends("Engine.Content")
                .field("width", int32())
                .field("height", int32()),
        )?
        .with(TypeDescriptor::class("Engine.XmlDocument").field("text", TypeRef::string()))?
        .with(
            TypeDescriptor::class("Game.Shape")
                .make_abstract()
                .field("id", int32()),
        )?
        .with(
            TypeDescriptor::class("Game.Circle")
                .extends("Game.Shape")
                .field("radius", single()),
        )?
        .with(
            TypeDescriptor::class("Game.Square")
                .extends("Game.Shape")
                .field("side", single()),
        )?
        .with(
            TypeDescriptor::structure("Game.Point")
                .field("x", int32())
                .field("y", int32()),
        )?
        .with(
            TypeDescriptor::enumeration("Game.Color", PrimitiveKind::Byte)
                .variant("Red", 0)
                .variant("Green", 1)
                .variant("Blue", 2),
        )?
        .with(
            TypeDescriptor::explicit_struct("Game.Bits")
                .field_at(0, "as_int", int32())
                .field_at(0, "as_float", single()),
        )?
        .with(
            TypeDescriptor::class("Game.Sprite")
                .field("name", TypeRef::string())
                .field("position", TypeRef::named("Game.Point"))
                .field("tint", TypeRef::named("Game.Color"))
                .field("image", TypeRef::named("Engine.Image"))
                .field("shapes", TypeRef::list(TypeRef::named("Game.Shape")))
                .field(
                    "tags",
                    TypeRef::dictionary(TypeRef::string(), int32()),
                )
                .field("extra", TypeRef::Object)
                .field("parent", TypeRef::named("Game.Sprite"))
                .transient_field("cached", int32()),
        )?
        .with(
            TypeDescriptor::class("Game.Service")
                .without_default_constructor()
                .field("port", int32()),
        )?
        // Short names that collide with built-in type names.
        .with(TypeDescriptor::structure("Game.Type").field("id", int32()))?
        .with(TypeDescriptor::class("Game.Holder").field("payload", TypeRef::Object))?;

    for level in 1..=NEST_LEVELS {
        let desc = TypeDescriptor::class(format!("Nest.W{level}"));
        let desc = if level < NEST_LEVELS {
            desc.field("inner", TypeRef::named(format!("Nest.W{}", level + 1)))
        } else {
            desc.field("value", int32())
        };
        registry.register(desc)?;
    }

    Ok(registry)
}

/// Knows one image asset, `SomeXml`.
pub fn content_loader() -> InMemoryContentLoader {
    InMemoryContentLoader::new().with(ContentValue {
        ty: "Engine.Image".into(),
        name: String::from("SomeXml"),
        fields: Fields::new().with("width", 1024i32).with("height", 768i32),
    })
}

pub fn codec_with_version(module_version: Version) -> Result<ObjectCodec> {
    init_logging();
    let config = CodecConfig::default().with_module_version(module_version);
    let codec = ObjectCodec::new(Arc::new(registry()?), Arc::new(content_loader()));
    Ok(codec.with_config(config))
}

pub fn codec() -> Result<ObjectCodec> {
    codec_with_version(module_version())
}
