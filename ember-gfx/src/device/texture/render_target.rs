use std::ops::{Deref, DerefMut};

use crate::device::backend::{DeviceApiEncapsulator, DeviceResult};
use crate::device::buffer::{BufferMode, BufferUsage};
use crate::device::resource::DeviceResourceType;
use crate::device::texture::{Texture, Texture2d};
use crate::surface_format::{SurfaceFormat, SurfaceFormatType};


/// A color target the device can render into; a `Texture2d` whose format
/// carries render-target support.
#[derive(Debug)]
pub struct RenderTarget {
	texture: Texture2d,
}

impl RenderTarget {
	pub fn new(
		width: u32,
		height: u32,
		format: SurfaceFormatType,
		mode: BufferMode,
		usage: BufferUsage,
		sharable: bool,
	) -> RenderTarget {
		assert!(SurfaceFormat::from_type(format).support_render_target());

		RenderTarget {
			texture: Texture2d::with_resource_type(
				DeviceResourceType::RenderTarget,
				width,
				height,
				1,
				format,
				mode,
				usage,
				sharable,
			),
		}
	}

	pub fn texture(&self) -> &Texture2d {
		&self.texture
	}

	pub fn create(
		&mut self,
		device: &mut dyn DeviceApiEncapsulator,
		initial_data: Option<&[u8]>,
	) -> DeviceResult<()> {
		self.texture.resource_base().check_thread_id();
		assert!(self.texture.resource_base().frozen());
		assert!(!self.texture.available());

		let api = device.api();
		let entity = device.create_render_target(self, initial_data)?;
		self.texture.attach_created_entity(api, entity);
		Ok(())
	}

	pub fn destroy(&mut self, device: &mut dyn DeviceApiEncapsulator) -> DeviceResult<()> {
		self.texture.resource_base().check_thread_id();

		let entity = self.texture.take_entity(device.api());
		device.destroy_render_target(self, entity)
	}
}

impl Deref for RenderTarget {
	type Target = Texture2d;

	fn deref(&self) -> &Texture2d {
		&self.texture
	}
}

impl DerefMut for RenderTarget {
	fn deref_mut(&mut self) -> &mut Texture2d {
		&mut self.texture
	}
}
