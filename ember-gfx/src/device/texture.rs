use glam::UVec2;

use crate::device::buffer::{BufferMode, BufferUsage};
use crate::device::entity::TerminalEntity;
use crate::device::resource::DeviceResourceBase;
use crate::surface_format::SurfaceFormat;

pub mod depth_stencil;
pub mod render_target;
pub mod texture2d;
pub mod texture_cube;

pub use depth_stencil::*;
pub use render_target::*;
pub use texture2d::*;
pub use texture_cube::*;


/// Axis-aligned texel box with an exclusive max corner.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Aabb2u {
	pub min: UVec2,
	pub max: UVec2,
}

impl Aabb2u {
	pub fn new(min: UVec2, max: UVec2) -> Aabb2u {
		Aabb2u { min, max }
	}

	pub fn extents(&self) -> UVec2 {
		self.max - self.min
	}

	pub fn has_positive_extents(&self) -> bool {
		self.max.x > self.min.x && self.max.y > self.min.y
	}
}


#[repr(u32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CubeFace {
	PositiveX = 0,
	NegativeX,
	PositiveY,
	NegativeY,
	PositiveZ,
	NegativeZ,
}

pub const CUBE_FACE_COUNT: usize = 6;

impl CubeFace {
	pub const ALL: [CubeFace; CUBE_FACE_COUNT] = [
		CubeFace::PositiveX,
		CubeFace::NegativeX,
		CubeFace::PositiveY,
		CubeFace::NegativeY,
		CubeFace::PositiveZ,
		CubeFace::NegativeZ,
	];
}


/// What every texture flavor exposes to binding and validation code.
pub trait Texture {
	fn resource_base(&self) -> &DeviceResourceBase;
	fn format(&self) -> &'static SurfaceFormat;
	fn mode(&self) -> BufferMode;
	fn usage(&self) -> BufferUsage;
	fn level_count(&self) -> u32;
	fn size_in_bytes(&self) -> usize;
	fn available(&self) -> bool;
	fn terminal_entity(&self) -> Option<&TerminalEntity>;

	fn frozen(&self) -> bool {
		self.resource_base().frozen()
	}
}
