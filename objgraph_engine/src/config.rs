use anyhow::{Context, Result};
use objgraph_types::types::Version;
use std::env;

/// Version of the module consuming the data. Defaults to this crate's version.
pub const ENV_VAR_MODULE_VERSION: &str = "OBJGRAPH_MODULE_VERSION";

/// Set to `0` or `false` to silence version mismatch warnings.
pub const ENV_VAR_WARN_VERSION_MISMATCH: &str = "OBJGRAPH_WARN_VERSION_MISMATCH";

/// Names of content instances created at runtime, rather than loaded from an asset, start with this.
pub const GENERATED_CONTENT_PREFIX: &str = "<Generated";

/// Longest run of nulls a loaded sequence may declare. Such a run has no bytes behind it.
pub const MAX_NULL_ELEMENTS: usize = 1 << 20;

#[derive(Clone, Debug)]
pub struct CodecConfig {
    pub module_version: Version,
    pub warn_version_mismatch: bool,
    pub generated_content_prefix: String,
    pub max_null_elements: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            module_version: crate_version(),
            warn_version_mismatch: true,
            generated_content_prefix: String::from(GENERATED_CONTENT_PREFIX),
            max_null_elements: MAX_NULL_ELEMENTS,
        }
    }
}

impl CodecConfig {
    pub fn from_env() -> Result<Self> {
        let module_version = match env::var(ENV_VAR_MODULE_VERSION) {
            Err(_) => crate_version(),
            Ok(s) => s
                .parse()
                .with_context(|| format!("Invalid {ENV_VAR_MODULE_VERSION} {s:?}"))?,
        };
        let warn_version_mismatch = env::var(ENV_VAR_WARN_VERSION_MISMATCH)
            .map_or(true, |s| !(s == "0" || s.eq_ignore_ascii_case("false")));
        Ok(Self {
            module_version,
            warn_version_mismatch,
            ..Self::default()
        })
    }

    pub fn with_module_version(mut self, module_version: Version) -> Self {
        self.module_version = module_version;
        self
    }

    pub fn is_generated_content_name(&self, name: &str) -> bool {
        name.starts_with(&self.generated_content_prefix)
    }
}

fn crate_version() -> Version {
    env!("CARGO_PKG_VERSION").parse().unwrap_or_default()
}
