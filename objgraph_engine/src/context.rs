use crate::config::CodecConfig;
use crate::PersistError;
use anyhow::Result;
use objgraph_types::types::{TypeRef, TypeRegistry};

/// Legitimate data shapes are shallow. Deeper graphs indicate a cycle or a non-data type.
pub const MAX_NESTING_DEPTH: usize = 6;

/// State of one top-level save or load call, threaded through its recursion.
///
/// Depth counts the objects and containers (arrays, lists, dictionaries, generated content)
/// currently entered. Primitives, buffers, enums, type values and content references are leaves.
pub(crate) struct Context<'a> {
    pub registry: &'a TypeRegistry,
    pub config: &'a CodecConfig,
    top_level: TypeRef,
    innermost: TypeRef,
    depth: usize,
}

impl<'a> Context<'a> {
    pub fn new(registry: &'a TypeRegistry, config: &'a CodecConfig, top_level: &TypeRef) -> Self {
        Self {
            registry,
            config,
            top_level: top_level.clone(),
            innermost: top_level.clone(),
            depth: 0,
        }
    }

    pub fn record(&mut self, ty: &TypeRef) {
        self.innermost = ty.clone();
    }

    pub fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            let innermost = self.registry.type_name(&self.innermost);
            return Err(PersistError::NestingTooDeep {
                max: MAX_NESTING_DEPTH,
                innermost,
            }
            .into());
        }
        Ok(())
    }

    pub fn exit(&mut self) {
        self.depth -= 1;
    }

    /// `", innermost '<type>'"` when the failure happened below the top level.
    pub fn describe_innermost(&self) -> String {
        if self.innermost == self.top_level {
            return String::new();
        }
        format!(", innermost '{}'", self.registry.type_name(&self.innermost))
    }
}
