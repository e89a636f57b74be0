//! # Serialization format
//!
//! The stream carries no schema. The reader is always told, out of band, which type
//! it is reconstructing; only where the declared type cannot determine the runtime
//! type is a type name written inline.
//!
//! Primitives have fixed little-endian widths and no tag byte.
//! Strings are prefixed with their UTF-8 byte length in 7-bit groups.
//!
//! Counts of elements, and lengths of raw buffers, use the "mostly below 255" encoding:
//!
//! ```text
//! struct Count (n < 255) {
//!     n:          u8,
//! }
//!
//! struct Count (n >= 255) {
//!     marker:     u8,     // 0xFF
//!     n:          i32,
//! }
//! ```
//!
//! A non-empty array or list is followed by a [`HomogeneityTag`], which decides how much
//! per-element type information follows:
//!
//! ```text
//! struct Sequence {
//!     count:          Count,
//!     // Below are absent if count == 0.
//!     tag:            u8,
//!     body:           match tag {
//!         AllNull             => {},
//!         AllAreTypeValues    => { elem_0: String, elem_1: String, ... },
//!         AllSameRuntimeType
//!         | AllDeclaredType   => { type_name: String, elem_0: T, elem_1: T, ... },
//!         AllDifferentTypes   => {
//!             elem_0: { present: bool, type_name: String, value: T0 },   // only `present` if null
//!             ...
//!         },
//!     },
//! }
//!
//! struct Dictionary {
//!     count:          Count,
//!     // Below are absent if count == 0.
//!     tag:            u8,     // AllSameRuntimeType, AllDeclaredType or AllDifferentTypes
//!     key_type_name:  String,
//!     body:           match tag {
//!         AllDifferentTypes => {
//!             entry_0: { present: bool, value_type_name: String, key: K, value: V0 },
//!             ...
//!         },
//!         _ => { value_type_name: String, key_0: K, value_0: V, ... },
//!     },
//! }
//! ```

mod decimal;
mod homogeneity;
mod lengths;
mod primitive;

pub use decimal::*;
pub use homogeneity::*;
pub use lengths::*;
pub use primitive::*;
