pub mod collections;
pub mod content;
pub mod malformed;
pub mod nesting;
pub mod primitives;
pub mod versions;
