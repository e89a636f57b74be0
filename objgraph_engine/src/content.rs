use crate::PersistError;
use anyhow::{anyhow, Context, Result};
use objgraph_types::types::{ContentValue, TypeName, TypeRef, TypeRegistry, Value};
use std::collections::HashMap;

/// The external content system: resolves named assets of the content family.
pub trait ContentLoader: Send + Sync {
    fn load_content(&self, ty: &TypeName, name: &str) -> Result<Value>;
}

/// Serves content values registered up front, keyed by their type and name.
#[derive(Default)]
pub struct InMemoryContentLoader {
    contents: HashMap<(TypeName, String), ContentValue>,
}

impl InMemoryContentLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, content: ContentValue) -> Self {
        self.insert(content);
        self
    }

    pub fn insert(&mut self, content: ContentValue) {
        let key = (content.ty.clone(), content.name.clone());
        self.contents.insert(key, content);
    }
}

impl ContentLoader for InMemoryContentLoader {
    fn load_content(&self, ty: &TypeName, name: &str) -> Result<Value> {
        let key = (ty.clone(), String::from(name));
        match self.contents.get(&key) {
            Some(content) => Ok(Value::Content(content.clone())),
            None => Err(anyhow!("No content '{name}' of type '{ty}'")),
        }
    }
}

/// Asks the loader for a named content instance and checks that it is what was asked for.
pub(crate) fn resolve(
    loader: &dyn ContentLoader,
    registry: &TypeRegistry,
    ty: &TypeName,
    name: &str,
) -> Result<Value> {
    let value = loader
        .load_content(ty, name)
        .with_context(|| format!("Content '{name}' could not be loaded"))?;
    let declared = TypeRef::Named(ty.clone());
    match &value {
        Value::Content(content)
            if content.name == name
                && registry.is_assignable(&TypeRef::Named(content.ty.clone()), &declared) =>
        {
            Ok(value)
        }
        _ => Err(PersistError::ValueMismatch {
            declared: registry.type_name(&declared),
            actual: format!("{value:?}"),
        }
        .into()),
    }
}
