use std::hash::Hasher;

use glam::UVec2;

use crate::device::backend::{DeviceApiEncapsulator, DeviceResult};
use crate::device::buffer::{buffer_mode_allowed_for_usage, BufferMode, BufferUsage};
use crate::device::entity::{EntityDesc, TerminalEntity, TextureEntityDesc};
use crate::device::resource::{DeviceResourceBase, DeviceResourceType};
use crate::device::sharable::{DeviceResourceSharable, SharedKey};
use crate::device::texture::texture2d::{validate_copy_sub_part, CopySubPartSide};
use crate::device::texture::{Aabb2u, CubeFace, Texture, CUBE_FACE_COUNT};
use crate::surface_format::{SurfaceFormat, SurfaceFormatType};


/// Six-faced cube texture; all faces share the same dimensions and mip
/// chain. Sub-resources are addressed as `level + face * level_count`.
#[derive(Debug)]
pub struct TextureCube {
	resource: DeviceResourceBase,
	format: &'static SurfaceFormat,
	mode: BufferMode,
	usage: BufferUsage,
	width: u32,
	height: u32,
	level_count: u32,
	entity: Option<TerminalEntity>,
}

impl TextureCube {
	pub fn new(
		width: u32,
		height: u32,
		level_count: u32,
		format: SurfaceFormatType,
		mode: BufferMode,
		usage: BufferUsage,
		sharable: bool,
	) -> TextureCube {
		let format = SurfaceFormat::from_type(format);

		assert!(width > 0 && height > 0);
		assert!(level_count > 0);
		assert!(width.max(height) >> (level_count - 1) > 0, "mip chain is too deep");
		assert!(width % format.block_size() == 0);
		assert!(height % format.block_size() == 0);
		assert!(buffer_mode_allowed_for_usage(mode, usage));

		TextureCube {
			resource: DeviceResourceBase::with_sharable(DeviceResourceType::TextureCube, sharable),
			format,
			mode,
			usage,
			width,
			height,
			level_count,
			entity: None,
		}
	}

	pub fn resource_base(&self) -> &DeviceResourceBase {
		&self.resource
	}

	pub fn resource_base_mut(&mut self) -> &mut DeviceResourceBase {
		&mut self.resource
	}

	pub fn width(&self) -> u32 {
		self.width
	}

	pub fn height(&self) -> u32 {
		self.height
	}

	pub fn level_dimensions(&self, level: u32) -> UVec2 {
		assert!(level < self.level_count);
		UVec2::new((self.width >> level).max(1), (self.height >> level).max(1))
	}

	pub fn face_size_in_bytes(&self) -> usize {
		self.format
			.size_of_texture_2d_mip_chain_in_bytes(self.width, self.height, self.level_count)
	}

	pub fn sub_resource_index(&self, face: CubeFace, level: u32) -> u32 {
		assert!(level < self.level_count);
		level + face as u32 * self.level_count
	}

	pub fn entity_desc(&self) -> TextureEntityDesc {
		TextureEntityDesc {
			format: self.format.format_type(),
			mode: self.mode,
			usage: self.usage,
			width: self.width,
			height: self.height,
			level_count: self.level_count,
		}
	}

	pub fn freeze(&mut self) {
		self.resource.freeze();

		if self.resource.sharable() {
			let key = SharedKey::make(self.resource.resource_type(), self.shared_key_hash());
			self.resource.set_shared_key(key);
		}
	}

	pub fn create(
		&mut self,
		device: &mut dyn DeviceApiEncapsulator,
		initial_data: Option<&[u8]>,
	) -> DeviceResult<()> {
		self.resource.check_thread_id();
		assert!(self.resource.frozen());
		assert!(self.entity.is_none());

		if let Some(data) = initial_data {
			assert!(data.len() == self.size_in_bytes());
		}
		if self.usage == BufferUsage::Immutable {
			assert!(initial_data.is_some(), "immutable textures need complete initial data");
		}

		let mut entity = device.create_texture_cube(self, initial_data)?;
		assert!(entity.match_api(device.api()));
		entity.attach_resource(&self.resource);
		self.entity = Some(entity);
		Ok(())
	}

	pub fn destroy(&mut self, device: &mut dyn DeviceApiEncapsulator) -> DeviceResult<()> {
		self.resource.check_thread_id();
		assert!(self.resource.frozen());

		let mut entity = self.entity.take().expect("texture is not available");
		entity.detach_resource(&self.resource);
		device.destroy_texture_cube(self, entity)
	}

	/// Raw read-back; offsets address the packed face-major layout.
	pub fn get_data(
		&self,
		device: &mut dyn DeviceApiEncapsulator,
		offset: usize,
		dst: &mut [u8],
	) -> DeviceResult<()> {
		self.resource.check_thread_id();
		assert!(self.resource.frozen());
		assert!(!dst.is_empty());
		assert!(offset + dst.len() <= self.size_in_bytes());
		assert!(self.mode.contains(BufferMode::READ));

		let entity = self.entity.as_ref().expect("texture is not available");
		device.texture_get_data(entity, offset, dst)
	}

	pub fn set_data(
		&mut self,
		device: &mut dyn DeviceApiEncapsulator,
		offset: usize,
		src: &[u8],
	) -> DeviceResult<()> {
		self.resource.check_thread_id();
		assert!(self.resource.frozen());
		assert!(!src.is_empty());
		assert!(offset + src.len() <= self.size_in_bytes());
		assert!(self.mode.contains(BufferMode::WRITE));

		let entity = self.entity.as_mut().expect("texture is not available");
		device.texture_set_data(entity, offset, src)
	}

	pub fn copy_from(
		&mut self,
		device: &mut dyn DeviceApiEncapsulator,
		source: &TextureCube,
	) -> DeviceResult<()> {
		self.resource.check_thread_id();
		assert!(self.resource.frozen());
		assert!(self.mode.contains(BufferMode::WRITE));
		assert!(source.resource.frozen());
		assert!(source.available());
		assert!(source.mode.contains(BufferMode::READ));
		assert!(source.size_in_bytes() == self.size_in_bytes());

		let dst = self.entity.as_mut().expect("texture is not available");
		device.texture_copy(dst, source.terminal_entity().unwrap())
	}

	/// Same shape as the 2D sub-region copy with a face selector per side.
	#[allow(clippy::too_many_arguments)]
	pub fn copy_sub_part(
		&mut self,
		device: &mut dyn DeviceApiEncapsulator,
		dst_face: CubeFace,
		dst_level: u32,
		dst_pos: UVec2,
		source: &TextureCube,
		src_face: CubeFace,
		src_level: u32,
		src_box: Aabb2u,
	) -> DeviceResult<()> {
		self.resource.check_thread_id();
		assert!(dst_level < self.level_count);
		assert!(src_level < source.level_count);

		validate_copy_sub_part(
			&CopySubPartSide {
				frozen: self.resource.frozen(),
				available: self.available(),
				mode: self.mode,
				format: self.format,
				level_count: self.level_count,
				level_dimensions: self.level_dimensions(dst_level),
			},
			dst_level,
			dst_pos,
			&CopySubPartSide {
				frozen: source.resource.frozen(),
				available: source.available(),
				mode: source.mode,
				format: source.format,
				level_count: source.level_count,
				level_dimensions: source.level_dimensions(src_level),
			},
			src_level,
			src_box,
		);

		let dst_sub_resource = self.sub_resource_index(dst_face, dst_level);
		let src_sub_resource = source.sub_resource_index(src_face, src_level);

		let dst = self.entity.as_mut().expect("texture is not available");
		device.texture_copy_sub_part(
			dst,
			dst_sub_resource,
			dst_pos,
			source.terminal_entity().unwrap(),
			src_sub_resource,
			src_box,
		)
	}
}

impl Texture for TextureCube {
	fn resource_base(&self) -> &DeviceResourceBase {
		&self.resource
	}

	fn format(&self) -> &'static SurfaceFormat {
		self.format
	}

	fn mode(&self) -> BufferMode {
		self.mode
	}

	fn usage(&self) -> BufferUsage {
		self.usage
	}

	fn level_count(&self) -> u32 {
		self.level_count
	}

	fn size_in_bytes(&self) -> usize {
		self.face_size_in_bytes() * CUBE_FACE_COUNT
	}

	fn available(&self) -> bool {
		self.entity.is_some()
	}

	fn terminal_entity(&self) -> Option<&TerminalEntity> {
		self.entity.as_ref()
	}
}

impl DeviceResourceSharable for TextureCube {
	fn base(&self) -> &DeviceResourceBase {
		&self.resource
	}

	fn shared_key_hash(&self) -> u64 {
		let desc = self.entity_desc();
		let mut hasher = fnv::FnvHasher::default();
		hasher.write_u32(desc.format as u32);
		hasher.write_u32(desc.mode.bits());
		hasher.write_u32(desc.usage as u32);
		hasher.write_u32(desc.width);
		hasher.write_u32(desc.height);
		hasher.write_u32(desc.level_count);
		hasher.finish()
	}

	fn match_entity_desc(&self, entity: &TerminalEntity) -> bool {
		matches!(entity.desc(), EntityDesc::TextureCube(desc) if *desc == self.entity_desc())
	}
}

impl Drop for TextureCube {
	fn drop(&mut self) {
		if !std::thread::panicking() {
			debug_assert!(
				self.entity.is_none(),
				"texture dropped while still bound to a device"
			);
		}
	}
}


#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn sub_resource_indices_interleave_face_and_level() {
		let cube = TextureCube::new(
			16, 16, 3,
			SurfaceFormatType::R8G8B8A8,
			BufferMode::NONE,
			BufferUsage::Default,
			false,
		);

		assert_eq!(cube.sub_resource_index(CubeFace::PositiveX, 0), 0);
		assert_eq!(cube.sub_resource_index(CubeFace::PositiveX, 2), 2);
		assert_eq!(cube.sub_resource_index(CubeFace::NegativeX, 0), 3);
		assert_eq!(cube.sub_resource_index(CubeFace::NegativeZ, 2), 17);
	}

	#[test]
	fn total_size_covers_six_faces() {
		let cube = TextureCube::new(
			8, 8, 1,
			SurfaceFormatType::R8G8B8A8,
			BufferMode::NONE,
			BufferUsage::Default,
			false,
		);

		assert_eq!(cube.face_size_in_bytes(), 8 * 8 * 4);
		assert_eq!(cube.size_in_bytes(), 8 * 8 * 4 * 6);
	}
}
