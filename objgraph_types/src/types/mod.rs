mod descriptor;
mod registry;
mod type_ref;
mod value;
mod version;

pub use descriptor::*;
pub use registry::*;
pub use type_ref::*;
pub use value::*;
pub use version::*;
