pub mod backend;
pub mod buffer;
pub mod encapsulator;
pub mod entity;
pub mod geometry;
pub mod headless;
pub mod pool;
pub mod presentation;
pub mod resource;
pub mod shader;
pub mod sharable;
pub mod state;
pub mod texture;

pub use backend::*;
pub use buffer::*;
pub use encapsulator::*;
pub use entity::*;
pub use geometry::*;
pub use headless::*;
pub use pool::*;
pub use presentation::*;
pub use resource::*;
pub use shader::*;
pub use sharable::*;
pub use state::*;
pub use texture::*;


/// Which concrete backend a device talks to. `Headless` is a CPU-only
/// reference backend used when no GPU is wanted (tools, tests, servers).
#[repr(u32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DeviceApi {
	DirectX11 = 0,
	OpenGl4 = 1,
	Headless = 2,
}

impl DeviceApi {
	pub fn as_str(self) -> &'static str {
		match self {
			DeviceApi::DirectX11 => "DirectX11",
			DeviceApi::OpenGl4 => "OpenGL4",
			DeviceApi::Headless => "Headless",
		}
	}

	pub(crate) fn from_u32(value: u32) -> DeviceApi {
		match value {
			0 => DeviceApi::DirectX11,
			1 => DeviceApi::OpenGl4,
			2 => DeviceApi::Headless,
			_ => panic!("invalid device api tag {value}"),
		}
	}
}


/// Device life cycle. `Create`, `Reset` and `Destroy` are transient and
/// only observable from inside the corresponding call; `Lost` is reserved
/// for backends that can report device removal and is never entered by the
/// built-in backend.
#[repr(u32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DeviceStatus {
	Invalid = 0,
	Create,
	Normal,
	Reset,
	Destroy,
	Lost,
}

impl DeviceStatus {
	pub fn as_str(self) -> &'static str {
		match self {
			DeviceStatus::Invalid => "Invalid",
			DeviceStatus::Create => "Create",
			DeviceStatus::Normal => "Normal",
			DeviceStatus::Reset => "Reset",
			DeviceStatus::Destroy => "Destroy",
			DeviceStatus::Lost => "Lost",
		}
	}
}


/// Frame counter advanced by `Present`. Entities are stamped with the
/// revision they were created at and last bound at, which is what the pool
/// eviction policy keys on.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeviceRevision(pub u32);

impl DeviceRevision {
	pub const INVALID: DeviceRevision = DeviceRevision(u32::MAX);

	pub fn is_valid(self) -> bool {
		self != DeviceRevision::INVALID
	}
}
