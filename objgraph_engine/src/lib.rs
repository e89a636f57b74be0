//! Saves an object graph to a byte stream, and loads it back given only its declared type.

mod codec;
pub mod config;
mod content;
mod context;
mod error;
mod extensions;
pub mod fields;
pub mod instance;
mod loader;
mod saver;
pub mod shape;
pub mod tagger;

pub use codec::*;
pub use content::*;
pub use context::MAX_NESTING_DEPTH;
pub use error::*;
