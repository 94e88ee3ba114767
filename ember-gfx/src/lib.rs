pub mod device;
pub mod event;
pub mod memory;
pub mod name;
pub mod surface_format;
pub mod thread_bound;
pub mod value;

pub use crate::device::*;
pub use crate::name::Name;
pub use crate::surface_format::*;
pub use crate::value::*;

pub mod prelude {
	pub use crate::device::*;
	pub use crate::name::Name;
	pub use crate::surface_format::{SurfaceFormat, SurfaceFormatType};
	pub use crate::value::{Value, ValueType};
}
