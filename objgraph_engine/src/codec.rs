use crate::config::CodecConfig;
use crate::content::ContentLoader;
use crate::context::Context;
use crate::loader::Loader;
use crate::saver::Saver;
use crate::{PersistError, VersionMismatch};
use anyhow::Result;
use log::{debug, warn};
use objgraph_types::serde::WriteLen;
use objgraph_types::types::{TypeRef, TypeRegistry, Value, Version};
use std::io::{Read, Write};
use std::sync::Arc;

/// Outcome of a successful load.
#[derive(Debug)]
pub struct Loaded {
    pub value: Value,
    /// Set when the data was written by another module version. Loading went ahead regardless.
    pub version_mismatch: Option<VersionMismatch>,
}

/// Saves and loads object graphs of the types in one registry.
///
/// Every call keeps its own nesting guard and diagnostics, so one codec may serve
/// concurrent calls.
pub struct ObjectCodec {
    registry: Arc<TypeRegistry>,
    content_loader: Arc<dyn ContentLoader>,
    config: CodecConfig,
}

impl ObjectCodec {
    pub fn new(registry: Arc<TypeRegistry>, content_loader: Arc<dyn ContentLoader>) -> Self {
        Self {
            registry,
            content_loader,
            config: CodecConfig::default(),
        }
    }

    pub fn with_config(mut self, config: CodecConfig) -> Self {
        self.config = config;
        self
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Writes `value` so that loading it as `declared` restores it.
    pub fn save<W: Write>(&self, value: &Value, declared: &TypeRef, w: &mut W) -> Result<WriteLen> {
        debug!("Saving '{declared}'");
        let ctx = Context::new(&self.registry, &self.config, declared);
        let mut saver = Saver::new(ctx);
        saver.save_top_level(value, declared, w).map_err(|err| {
            let msg = format!(
                "Failed to save '{}'{}",
                self.registry.type_name(declared),
                saver.ctx.describe_innermost()
            );
            err.context(msg)
        })
    }

    /// Reads a value of the `declared` type.
    ///
    /// `data_version` is the module version that wrote the data, if known. A version other than
    /// the configured module version is a warning, not a failure.
    pub fn load<R: Read>(
        &self,
        declared: &TypeRef,
        r: &mut R,
        data_version: Option<&Version>,
    ) -> Result<Loaded> {
        debug!("Loading '{declared}'");
        let version_mismatch = data_version
            .filter(|data_version| **data_version != self.config.module_version)
            .map(|data_version| VersionMismatch {
                data_version: *data_version,
                module_version: self.config.module_version,
            });
        if let Some(mismatch) = version_mismatch.as_ref() {
            if self.config.warn_version_mismatch {
                warn!(
                    "Loading '{}': {mismatch}. The content might be outdated",
                    self.registry.type_name(declared)
                );
            }
        }

        let ctx = Context::new(&self.registry, &self.config, declared);
        let mut loader = Loader::new(ctx, self.content_loader.as_ref());
        let value = loader.load_top_level(declared, r).map_err(|err| {
            let version = data_version.map_or_else(|| String::from("unknown"), Version::to_string);
            let hint = match err.downcast_ref::<PersistError>() {
                Some(PersistError::TypeResolutionFailure(_)) => ". The data might be outdated",
                _ => "",
            };
            let msg = format!(
                "Failed to load '{}' (Version {version}){}{hint}",
                self.registry.type_name(declared),
                loader.ctx.describe_innermost()
            );
            err.context(msg)
        })?;
        Ok(Loaded {
            value,
            version_mismatch,
        })
    }
}
